//! Chat subsystem: prompt assembly and response generation.
//!
//! `answer` never propagates a model failure to the end user. The backend
//! dying mid-conversation degrades to a fixed apology, and every exchange
//! is persisted as exactly one interaction regardless of outcome.

use neurobot_core::llm::{GenerationOptions, ModelBackend};
use neurobot_core::models::Chatbot;
use neurobot_core::store;
use neurobot_core::NeurobotError;
use neurobot_ingest::TrainingPipeline;
use serde::Serialize;
use sqlx::SqlitePool;

/// The only degraded-mode text an end user ever sees.
pub const APOLOGY: &str =
    "I'm sorry, I'm having technical difficulties right now. Please try again in a few moments.";

/// Fixed sentence the model is instructed to use when the knowledge base
/// cannot answer the question.
pub const NOT_ENOUGH_INFORMATION: &str =
    "I don't have enough information to answer that. Can I help you with anything else?";

/// Where a chat reply came from. Callers and tests branch on this; the
/// end user only ever sees `reply`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplySource {
    /// The backend produced the text.
    Model,
    /// Transport failure: the backend could not be reached at all.
    BackendUnavailable,
    /// The backend answered but the call failed in-protocol.
    Failed,
}

#[derive(Debug)]
pub struct ChatOutcome {
    pub reply: String,
    pub via: ReplySource,
}

/// Build the system instruction: persona, knowledge verbatim, and the
/// only-from-knowledge directive.
pub fn system_instruction(display_name: &str, knowledge: &str) -> String {
    format!(
        "You are {}, an intelligent virtual assistant.\n\n\
         KNOWLEDGE BASE:\n{}\n\n\
         INSTRUCTIONS:\n\
         - Use ONLY the information from the knowledge base above to answer\n\
         - If the question cannot be answered from the knowledge base, say: \"{}\"\n\
         - Be cordial, professional and direct\n\
         - Keep answers concise but complete",
        display_name, knowledge, NOT_ENOUGH_INFORMATION
    )
}

/// The name the bot speaks as: the configured attendant name when set,
/// otherwise the bot's own name.
pub async fn resolve_display_name(
    pool: &SqlitePool,
    bot: &Chatbot,
) -> Result<String, NeurobotError> {
    let settings = store::get_settings(pool, bot.id).await?;
    Ok(match settings {
        Some(s) if !s.attendant_name.trim().is_empty() => s.attendant_name,
        _ => bot.name.clone(),
    })
}

/// Answer one user message against a bot's knowledge base.
///
/// Model failures degrade to the fixed apology instead of erroring; only
/// storage failures propagate. Exactly one interaction row is appended in
/// every case.
pub async fn answer(
    pool: &SqlitePool,
    pipeline: &TrainingPipeline,
    backend: &dyn ModelBackend,
    options: &GenerationOptions,
    chatbot_id: i64,
    message: &str,
    display_name: &str,
) -> Result<ChatOutcome, NeurobotError> {
    let knowledge = pipeline.assemble_knowledge(chatbot_id).await?;
    let system = system_instruction(display_name, &knowledge);

    let outcome = match backend.complete(&system, message, options).await {
        Ok(reply) => ChatOutcome {
            reply,
            via: ReplySource::Model,
        },
        Err(e) if e.is_unreachable() => {
            tracing::warn!(chatbot_id, backend = backend.name(), error = %e, "model backend unreachable");
            ChatOutcome {
                reply: APOLOGY.to_string(),
                via: ReplySource::BackendUnavailable,
            }
        }
        Err(e) => {
            tracing::error!(chatbot_id, backend = backend.name(), error = %e, "model call failed");
            ChatOutcome {
                reply: APOLOGY.to_string(),
                via: ReplySource::Failed,
            }
        }
    };

    store::add_interaction(pool, chatbot_id, message, &outcome.reply).await?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neurobot_core::config::{DatabaseConfig, GenerationParams, IngestConfig, ProxyConfig};
    use neurobot_core::llm::OllamaClient;
    use neurobot_core::models::Settings;
    use neurobot_core::store::NewChatbot;
    use neurobot_ingest::{PageFetcher, TrainingPipeline};
    use std::sync::Arc;

    async fn memory_pool() -> SqlitePool {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        };
        let pool = neurobot_core::db::create_pool(&config).await.expect("pool");
        neurobot_core::db::init_schema(&pool).await.expect("schema");
        pool
    }

    /// An Ollama client pointed at a port nothing listens on.
    fn unreachable_backend() -> OllamaClient {
        OllamaClient::new("http://127.0.0.1:1".to_string(), "llama3".to_string(), 2)
            .expect("client")
    }

    fn options() -> GenerationOptions {
        GenerationParams {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 500,
        }
        .into()
    }

    fn pipeline(pool: SqlitePool, backend: Arc<dyn ModelBackend>) -> TrainingPipeline {
        TrainingPipeline::new(
            pool,
            backend,
            PageFetcher::new(&ProxyConfig::default()).expect("fetcher"),
            IngestConfig::default(),
            GenerationParams {
                temperature: 0.3,
                top_p: 1.0,
                max_tokens: 1000,
            },
        )
    }

    async fn make_bot(pool: &SqlitePool, name: &str) -> i64 {
        store::create_chatbot(
            pool,
            NewChatbot {
                user_id: 1,
                name: name.to_string(),
                description: String::new(),
                sector: "retail".to_string(),
                avatar_url: None,
                api_key: "nb_ak_test".to_string(),
            },
        )
        .await
        .expect("create bot")
    }

    #[test]
    fn test_system_instruction_embeds_persona_and_knowledge() {
        let prompt = system_instruction("Clara", "=== DOCUMENT: faq ===\nrefunds in 30 days");
        assert!(prompt.starts_with("You are Clara, an intelligent virtual assistant."));
        assert!(prompt.contains("refunds in 30 days"));
        assert!(prompt.contains(NOT_ENOUGH_INFORMATION));
        assert!(prompt.contains("Use ONLY the information"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_degrades_to_apology_and_persists_once() {
        let pool = memory_pool().await;
        let bot_id = make_bot(&pool, "Support").await;
        let backend = unreachable_backend();
        let pipe = pipeline(pool.clone(), Arc::new(backend.clone()));

        let outcome = answer(&pool, &pipe, &backend, &options(), bot_id, "Hello?", "Support")
            .await
            .expect("answer");

        assert_eq!(outcome.via, ReplySource::BackendUnavailable);
        assert_eq!(outcome.reply, APOLOGY);

        let history = store::interactions_by_chatbot(&pool, bot_id).await.expect("history");
        assert_eq!(history.len(), 1, "exactly one interaction per exchange");
        assert_eq!(history[0].user_input, "Hello?");
        assert_eq!(history[0].bot_response, APOLOGY);
    }

    #[tokio::test]
    async fn test_resolve_display_name_prefers_attendant_name() {
        let pool = memory_pool().await;
        let bot_id = make_bot(&pool, "Support Bot").await;
        let bot = store::get_chatbot(&pool, bot_id).await.expect("get").expect("bot");

        assert_eq!(resolve_display_name(&pool, &bot).await.expect("resolve"), "Support Bot");

        store::save_settings(
            &pool,
            &Settings {
                chatbot_id: bot_id,
                theme_color: "#4a90d9".to_string(),
                font: "Inter".to_string(),
                style: "modern".to_string(),
                attendant_name: "Clara".to_string(),
            },
        )
        .await
        .expect("settings");

        assert_eq!(resolve_display_name(&pool, &bot).await.expect("resolve"), "Clara");
    }
}
