//! Chatbot bookkeeping: API key generation and widget credential checks.

use neurobot_core::models::Chatbot;
use neurobot_core::store;
use sqlx::SqlitePool;
use uuid::Uuid;

/// Generate the API key embedded in a bot's widget snippet.
pub fn generate_api_key() -> String {
    format!("nb_ak_{}", Uuid::new_v4().simple())
}

/// Check a widget credential pair. Returns the bot only when the id exists
/// AND the key matches; callers must answer both failure modes with the
/// same response so the widget API never reveals which part was wrong.
pub async fn validate_widget_key(
    pool: &SqlitePool,
    chatbot_id: i64,
    api_key: &str,
) -> Result<Option<Chatbot>, sqlx::Error> {
    if api_key.is_empty() {
        return Ok(None);
    }
    let bot = store::get_chatbot(pool, chatbot_id).await?;
    Ok(bot.filter(|b| b.api_key == api_key))
}
