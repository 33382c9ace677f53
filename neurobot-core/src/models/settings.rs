use serde::{Deserialize, Serialize};

/// Widget appearance settings, one-to-one with a bot. Last write wins.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Settings {
    pub chatbot_id: i64,
    pub theme_color: String,
    pub font: String,
    pub style: String,
    pub attendant_name: String,
}
