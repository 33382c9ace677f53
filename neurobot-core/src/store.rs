//! Typed access to the five object collections.
//!
//! Every write is independently atomic per record; nothing here spans a
//! transaction across multiple fragments, so a concurrent reader may observe
//! a partially-ingested bot. That is the documented isolation level.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::{Chatbot, ChatbotStatus, Interaction, KnowledgeFragment, Settings, User};

// ============================================================================
// Users
// ============================================================================

pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub company: String,
}

pub async fn create_user(pool: &SqlitePool, user: NewUser) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO users (email, password, name, company, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.name)
    .bind(&user.company)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_user_by_email(
    pool: &SqlitePool,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

// ============================================================================
// Chatbots
// ============================================================================

pub struct NewChatbot {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub sector: String,
    pub avatar_url: Option<String>,
    pub api_key: String,
}

/// New bots start in `training` status.
pub async fn create_chatbot(pool: &SqlitePool, bot: NewChatbot) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO chatbots (user_id, name, description, sector, status, avatar_url, api_key, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(bot.user_id)
    .bind(&bot.name)
    .bind(&bot.description)
    .bind(&bot.sector)
    .bind(ChatbotStatus::Training)
    .bind(&bot.avatar_url)
    .bind(&bot.api_key)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn get_chatbot(pool: &SqlitePool, id: i64) -> Result<Option<Chatbot>, sqlx::Error> {
    sqlx::query_as::<_, Chatbot>("SELECT * FROM chatbots WHERE id = ?1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_chatbots_by_user(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<Chatbot>, sqlx::Error> {
    sqlx::query_as::<_, Chatbot>("SELECT * FROM chatbots WHERE user_id = ?1 ORDER BY id")
        .bind(user_id)
        .fetch_all(pool)
        .await
}

pub struct ChatbotUpdate {
    pub name: String,
    pub description: String,
    pub sector: String,
    pub status: ChatbotStatus,
    pub avatar_url: Option<String>,
}

pub async fn update_chatbot(
    pool: &SqlitePool,
    id: i64,
    update: ChatbotUpdate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE chatbots SET name = ?1, description = ?2, sector = ?3, status = ?4, avatar_url = ?5 \
         WHERE id = ?6",
    )
    .bind(&update.name)
    .bind(&update.description)
    .bind(&update.sector)
    .bind(update.status)
    .bind(&update.avatar_url)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes the bot row only. Knowledge, interactions and settings referencing
/// it are left behind — referential integrity is advisory in this store.
pub async fn delete_chatbot(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM chatbots WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Knowledge fragments
// ============================================================================

pub struct NewKnowledge {
    pub chatbot_id: i64,
    pub source_type: crate::models::SourceType,
    pub content: String,
    pub file_name: String,
}

pub async fn add_knowledge(pool: &SqlitePool, knowledge: NewKnowledge) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO knowledge_base (chatbot_id, source_type, content, file_name, uploaded_at) \
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(knowledge.chatbot_id)
    .bind(knowledge.source_type)
    .bind(&knowledge.content)
    .bind(&knowledge.file_name)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// All fragments for a bot in insertion order — stable under repeated reads.
pub async fn knowledge_by_chatbot(
    pool: &SqlitePool,
    chatbot_id: i64,
) -> Result<Vec<KnowledgeFragment>, sqlx::Error> {
    sqlx::query_as::<_, KnowledgeFragment>(
        "SELECT * FROM knowledge_base WHERE chatbot_id = ?1 ORDER BY id",
    )
    .bind(chatbot_id)
    .fetch_all(pool)
    .await
}

/// Idempotent: deleting an absent id is a no-op, reported as `false`.
pub async fn delete_knowledge(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM knowledge_base WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn knowledge_count(pool: &SqlitePool, chatbot_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM knowledge_base WHERE chatbot_id = ?1")
        .bind(chatbot_id)
        .fetch_one(pool)
        .await
}

// ============================================================================
// Interactions
// ============================================================================

pub async fn add_interaction(
    pool: &SqlitePool,
    chatbot_id: i64,
    user_input: &str,
    bot_response: &str,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO interactions (chatbot_id, user_input, bot_response, timestamp) \
         VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(chatbot_id)
    .bind(user_input)
    .bind(bot_response)
    .bind(Utc::now())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn interactions_by_chatbot(
    pool: &SqlitePool,
    chatbot_id: i64,
) -> Result<Vec<Interaction>, sqlx::Error> {
    sqlx::query_as::<_, Interaction>(
        "SELECT * FROM interactions WHERE chatbot_id = ?1 ORDER BY id",
    )
    .bind(chatbot_id)
    .fetch_all(pool)
    .await
}

// ============================================================================
// Settings
// ============================================================================

/// Upsert keyed by chatbot id; last write wins.
pub async fn save_settings(pool: &SqlitePool, settings: &Settings) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO settings (chatbot_id, theme_color, font, style, attendant_name) \
         VALUES (?1, ?2, ?3, ?4, ?5) \
         ON CONFLICT(chatbot_id) DO UPDATE SET \
         theme_color = excluded.theme_color, font = excluded.font, \
         style = excluded.style, attendant_name = excluded.attendant_name",
    )
    .bind(settings.chatbot_id)
    .bind(&settings.theme_color)
    .bind(&settings.font)
    .bind(&settings.style)
    .bind(&settings.attendant_name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_settings(
    pool: &SqlitePool,
    chatbot_id: i64,
) -> Result<Option<Settings>, sqlx::Error> {
    sqlx::query_as::<_, Settings>("SELECT * FROM settings WHERE chatbot_id = ?1")
        .bind(chatbot_id)
        .fetch_optional(pool)
        .await
}

// ============================================================================
// Tests
// ============================================================================
