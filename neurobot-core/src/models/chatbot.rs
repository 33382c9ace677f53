use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle moves training -> active/inactive; deletion is explicit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ChatbotStatus {
    Active,
    Inactive,
    Training,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Chatbot {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub sector: String,
    pub status: ChatbotStatus,
    pub avatar_url: Option<String>,
    pub api_key: String,
    pub created_at: DateTime<Utc>,
}
