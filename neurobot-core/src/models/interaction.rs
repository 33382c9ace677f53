use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One logged user-message/bot-response exchange. Append-only, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Interaction {
    pub id: i64,
    pub chatbot_id: i64,
    pub user_input: String,
    pub bot_response: String,
    pub timestamp: DateTime<Utc>,
}
