//! NeuroBot HTTP REST API
//!
//! Axum-based HTTP server exposing bot bookkeeping, training, chat and the
//! widget validation surface.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! pure inner function. The inner functions are directly testable without
//! axum dispatch machinery.
//!
//! Endpoints:
//! - GET    /health                — DB + model backend reachability
//! - GET    /version               — server version info
//! - POST   /users                 — create an account record
//! - POST   /bots                  — create a bot (generates api_key)
//! - GET    /bots?user_id=         — list a user's bots
//! - GET    /bots/:id              — read one bot
//! - PUT    /bots/:id              — update a bot
//! - DELETE /bots/:id              — delete a bot
//! - PUT    /bots/:id/settings     — upsert widget settings
//! - GET    /bots/:id/settings     — read widget settings
//! - POST   /train                 — ingest one tagged source
//! - POST   /train/batch           — ingest a multi-file batch
//! - GET    /bots/:id/documents    — list knowledge fragments
//! - DELETE /documents/:id         — remove a fragment (idempotent)
//! - POST   /chat                  — answer a message
//! - GET    /bots/:id/interactions — conversation history
//! - GET    /models                — backend model discovery
//! - GET    /proxy?url=            — server-side content fetch
//! - GET    /chatbot/:id           — widget credential validation
//! - POST   /chatbot/:id/message   — widget chat (validates, then answers)

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use neurobot_core::config::NeurobotConfig;
use neurobot_core::llm::{GenerationOptions, ModelBackend};
use neurobot_core::store::{self, ChatbotUpdate, NewChatbot, NewUser};
use neurobot_core::NeurobotError;
use neurobot_ingest::{BatchFile, BatchReport, PageFetcher, TrainingPipeline};
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::subsystems::{bots, chat};

/// Shared state for all HTTP handlers.
pub struct HttpState {
    pub pool: SqlitePool,
    pub config: NeurobotConfig,
    pub backend: Arc<dyn ModelBackend>,
    pub pipeline: TrainingPipeline,
    proxy_client: reqwest::Client,
}

impl HttpState {
    pub fn new(
        pool: SqlitePool,
        config: NeurobotConfig,
        backend: Arc<dyn ModelBackend>,
    ) -> Result<Self, NeurobotError> {
        let fetcher = PageFetcher::new(&config.proxy)?;
        let proxy_client = reqwest::Client::builder()
            .user_agent(config.proxy.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NeurobotError::Fetch(e.to_string()))?;
        let pipeline = TrainingPipeline::new(
            pool.clone(),
            backend.clone(),
            fetcher,
            config.ingest.clone(),
            config.model.organize,
        );
        Ok(Self {
            pool,
            config,
            backend,
            pipeline,
            proxy_client,
        })
    }

    fn chat_options(&self) -> GenerationOptions {
        self.config.model.chat.into()
    }
}

/// Build the Axum router with all endpoints.
pub fn build_router(state: Arc<HttpState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        .route("/users", post(create_user_handler))
        .route("/bots", post(create_bot_handler).get(list_bots_handler))
        .route(
            "/bots/:id",
            get(get_bot_handler).put(update_bot_handler).delete(delete_bot_handler),
        )
        .route(
            "/bots/:id/settings",
            put(put_settings_handler).get(get_settings_handler),
        )
        .route("/bots/:id/documents", get(list_documents_handler))
        .route("/bots/:id/interactions", get(list_interactions_handler))
        .route("/documents/:id", delete(delete_document_handler))
        .route("/train", post(train_handler))
        .route("/train/batch", post(train_batch_handler))
        .route("/chat", post(chat_handler))
        .route("/models", get(models_handler))
        .route("/proxy", get(proxy_handler))
        .route("/chatbot/:id", get(widget_validate_handler))
        .route("/chatbot/:id/message", post(widget_message_handler))
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", state.config.service.host, state.config.service.port);
    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("NeuroBot HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Request DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub company: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateBotRequest {
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sector: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBotRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sector: String,
    pub status: neurobot_core::models::ChatbotStatus,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    pub theme_color: String,
    pub font: String,
    pub style: String,
    pub attendant_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListBotsParams {
    pub user_id: i64,
}

/// One tagged training source.
#[derive(Debug, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum TrainSource {
    /// An uploaded file, base64-encoded.
    File {
        file_name: String,
        media_type: String,
        data: String,
    },
    Url {
        url: String,
    },
    Faq {
        question: String,
        answer: String,
    },
    Custom {
        content: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct TrainRequest {
    pub chatbot_id: i64,
    #[serde(flatten)]
    pub source: TrainSource,
}

#[derive(Debug, Deserialize)]
pub struct BatchFileRequest {
    pub file_name: String,
    pub media_type: String,
    /// Base64-encoded file content.
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct TrainBatchRequest {
    pub chatbot_id: i64,
    pub files: Vec<BatchFileRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub chatbot_id: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ProxyParams {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct WidgetParams {
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Deserialize)]
pub struct WidgetMessageRequest {
    pub api_key: String,
    pub message: String,
}

// ============================================================================
// Error mapping
// ============================================================================

/// Taxonomy name reported alongside error messages.
fn error_kind(e: &NeurobotError) -> &'static str {
    match e {
        NeurobotError::Validation(_) => "validation",
        NeurobotError::Extraction(_) => "extraction",
        NeurobotError::Fetch(_) => "fetch",
        NeurobotError::Model(_) => "model",
        NeurobotError::Database(_) => "database",
        NeurobotError::Config(_) => "config",
        NeurobotError::Io(_) => "io",
    }
}

fn error_body(e: &NeurobotError) -> serde_json::Value {
    serde_json::json!({
        "error": e.to_string(),
        "kind": error_kind(e),
        "status": "error",
    })
}

/// Input-taxonomy failures are the caller's fault; everything else is ours.
fn error_status(e: &NeurobotError) -> StatusCode {
    match e {
        NeurobotError::Validation(_) | NeurobotError::Extraction(_) | NeurobotError::Fetch(_) => {
            StatusCode::BAD_REQUEST
        }
        NeurobotError::Model(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn db_error(e: sqlx::Error) -> (StatusCode, serde_json::Value) {
    let e = NeurobotError::Database(e);
    (error_status(&e), error_body(&e))
}

fn not_found(what: &str) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::NOT_FOUND,
        serde_json::json!({
            "error": format!("{} not found", what),
            "status": "error",
        }),
    )
}

/// The one and only widget rejection. Wrong id and wrong key must be
/// indistinguishable from outside.
fn widget_denied() -> (StatusCode, serde_json::Value) {
    (
        StatusCode::FORBIDDEN,
        serde_json::json!({
            "error": "invalid chatbot or api key",
            "status": "error",
        }),
    )
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check — DB reachability decides healthy/unhealthy; model
/// backend state is reported but never fails the check.
pub async fn health_inner(state: &HttpState) -> (StatusCode, serde_json::Value) {
    let sqlite_ver = match neurobot_core::db::health_check(&state.pool).await {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                serde_json::json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                }),
            );
        }
    };

    let (reachable, models) = match state.backend.list_models().await {
        Ok(m) => (true, m),
        Err(_) => (false, Vec::new()),
    };

    (
        StatusCode::OK,
        serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "sqlite": sqlite_ver,
            "model_backend": state.backend.name(),
            "model_reachable": reachable,
            "models": models,
        }),
    )
}

/// Inner version — returns version info (pure, no IO).
pub fn version_inner() -> serde_json::Value {
    serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "protocol": "neurobot/1",
    })
}

pub async fn create_user_inner(
    pool: &SqlitePool,
    req: CreateUserRequest,
) -> (StatusCode, serde_json::Value) {
    if req.email.trim().is_empty() || req.password.is_empty() {
        let e = NeurobotError::Validation("email and password are required".to_string());
        return (error_status(&e), error_body(&e));
    }

    match store::create_user(
        pool,
        NewUser {
            email: req.email.clone(),
            password: req.password,
            name: req.name,
            company: req.company,
        },
    )
    .await
    {
        Ok(id) => (
            StatusCode::CREATED,
            serde_json::json!({ "id": id, "email": req.email, "status": "ok" }),
        ),
        // The unique index on email surfaces as a database error.
        Err(sqlx::Error::Database(db)) if db.message().contains("UNIQUE") => {
            let e = NeurobotError::Validation(format!("email '{}' is already registered", req.email));
            (StatusCode::CONFLICT, error_body(&e))
        }
        Err(e) => db_error(e),
    }
}

pub async fn create_bot_inner(
    pool: &SqlitePool,
    req: CreateBotRequest,
) -> (StatusCode, serde_json::Value) {
    if req.name.trim().is_empty() {
        let e = NeurobotError::Validation("bot name is required".to_string());
        return (error_status(&e), error_body(&e));
    }

    let api_key = bots::generate_api_key();
    let result = store::create_chatbot(
        pool,
        NewChatbot {
            user_id: req.user_id,
            name: req.name,
            description: req.description,
            sector: req.sector,
            avatar_url: req.avatar_url,
            api_key,
        },
    )
    .await;

    let id = match result {
        Ok(id) => id,
        Err(e) => return db_error(e),
    };

    match store::get_chatbot(pool, id).await {
        Ok(Some(bot)) => {
            tracing::info!(bot_id = id, user_id = bot.user_id, "created chatbot");
            (StatusCode::CREATED, serde_json::json!(bot))
        }
        Ok(None) => not_found("chatbot"),
        Err(e) => db_error(e),
    }
}

pub async fn list_bots_inner(
    pool: &SqlitePool,
    user_id: i64,
) -> (StatusCode, serde_json::Value) {
    match store::get_chatbots_by_user(pool, user_id).await {
        Ok(bots) => (StatusCode::OK, serde_json::json!({ "bots": bots })),
        Err(e) => db_error(e),
    }
}

pub async fn get_bot_inner(pool: &SqlitePool, id: i64) -> (StatusCode, serde_json::Value) {
    match store::get_chatbot(pool, id).await {
        Ok(Some(bot)) => (StatusCode::OK, serde_json::json!(bot)),
        Ok(None) => not_found("chatbot"),
        Err(e) => db_error(e),
    }
}

pub async fn update_bot_inner(
    pool: &SqlitePool,
    id: i64,
    req: UpdateBotRequest,
) -> (StatusCode, serde_json::Value) {
    let update = ChatbotUpdate {
        name: req.name,
        description: req.description,
        sector: req.sector,
        status: req.status,
        avatar_url: req.avatar_url,
    };

    match store::update_chatbot(pool, id, update).await {
        Ok(true) => get_bot_inner(pool, id).await,
        Ok(false) => not_found("chatbot"),
        Err(e) => db_error(e),
    }
}

pub async fn delete_bot_inner(pool: &SqlitePool, id: i64) -> (StatusCode, serde_json::Value) {
    match store::delete_chatbot(pool, id).await {
        Ok(true) => {
            tracing::info!(bot_id = id, "deleted chatbot");
            (StatusCode::OK, serde_json::json!({ "status": "ok" }))
        }
        Ok(false) => not_found("chatbot"),
        Err(e) => db_error(e),
    }
}

pub async fn put_settings_inner(
    pool: &SqlitePool,
    chatbot_id: i64,
    req: SettingsRequest,
) -> (StatusCode, serde_json::Value) {
    match store::get_chatbot(pool, chatbot_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("chatbot"),
        Err(e) => return db_error(e),
    }

    let settings = neurobot_core::models::Settings {
        chatbot_id,
        theme_color: req.theme_color,
        font: req.font,
        style: req.style,
        attendant_name: req.attendant_name,
    };

    match store::save_settings(pool, &settings).await {
        Ok(()) => (StatusCode::OK, serde_json::json!(settings)),
        Err(e) => db_error(e),
    }
}

pub async fn get_settings_inner(
    pool: &SqlitePool,
    chatbot_id: i64,
) -> (StatusCode, serde_json::Value) {
    match store::get_settings(pool, chatbot_id).await {
        Ok(Some(settings)) => (StatusCode::OK, serde_json::json!(settings)),
        Ok(None) => not_found("settings"),
        Err(e) => db_error(e),
    }
}

/// Inner train — dispatches one tagged source into the pipeline.
pub async fn train_inner(state: &HttpState, req: TrainRequest) -> (StatusCode, serde_json::Value) {
    match store::get_chatbot(&state.pool, req.chatbot_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("chatbot"),
        Err(e) => return db_error(e),
    }

    let result = match req.source {
        TrainSource::File {
            file_name,
            media_type,
            data,
        } => match BASE64.decode(data.as_bytes()) {
            Ok(bytes) => {
                state
                    .pipeline
                    .ingest_file(&bytes, &file_name, &media_type, req.chatbot_id, None)
                    .await
            }
            Err(e) => Err(NeurobotError::Validation(format!("invalid base64 file data: {}", e))),
        },
        TrainSource::Url { url } => {
            state.pipeline.ingest_url(&url, req.chatbot_id, None).await
        }
        TrainSource::Faq { question, answer } => {
            state.pipeline.ingest_faq(&question, &answer, req.chatbot_id).await
        }
        TrainSource::Custom { content } => {
            state.pipeline.ingest_custom(&content, req.chatbot_id).await
        }
    };

    match result {
        Ok(id) => (StatusCode::CREATED, serde_json::json!({ "id": id, "status": "ok" })),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

/// Inner batch train — decodes every file up front, then runs the batch
/// under the configured policy.
pub async fn train_batch_inner(
    state: &HttpState,
    req: TrainBatchRequest,
) -> (StatusCode, serde_json::Value) {
    match store::get_chatbot(&state.pool, req.chatbot_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found("chatbot"),
        Err(e) => return db_error(e),
    }

    let mut files = Vec::with_capacity(req.files.len());
    for f in req.files {
        match BASE64.decode(f.data.as_bytes()) {
            Ok(bytes) => files.push(BatchFile {
                file_name: f.file_name,
                media_type: f.media_type,
                bytes,
            }),
            Err(e) => {
                let e = NeurobotError::Validation(format!(
                    "invalid base64 data for '{}': {}",
                    f.file_name, e
                ));
                return (error_status(&e), error_body(&e));
            }
        }
    }

    let report = state.pipeline.ingest_files(files, req.chatbot_id, None).await;
    (StatusCode::OK, batch_report_json(&report))
}

fn batch_report_json(report: &BatchReport) -> serde_json::Value {
    serde_json::json!({
        "stored": report.stored,
        "failures": report
            .failures
            .iter()
            .map(|f| serde_json::json!({ "file_name": f.file_name, "error": f.error }))
            .collect::<Vec<_>>(),
        "aborted": report.aborted,
        "status": "ok",
    })
}

pub async fn list_documents_inner(
    state: &HttpState,
    chatbot_id: i64,
) -> (StatusCode, serde_json::Value) {
    let count = match store::knowledge_count(&state.pool, chatbot_id).await {
        Ok(c) => c,
        Err(e) => return db_error(e),
    };
    match state.pipeline.list_documents(chatbot_id).await {
        Ok(docs) => (
            StatusCode::OK,
            serde_json::json!({ "documents": docs, "count": count }),
        ),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

pub async fn delete_document_inner(state: &HttpState, id: i64) -> (StatusCode, serde_json::Value) {
    match state.pipeline.remove_document(id).await {
        Ok(()) => (StatusCode::OK, serde_json::json!({ "status": "ok" })),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

/// Inner chat — resolves the bot, runs the full answer path, returns the
/// reply with its source tag.
pub async fn chat_inner(state: &HttpState, req: ChatRequest) -> (StatusCode, serde_json::Value) {
    if req.message.trim().is_empty() {
        let e = NeurobotError::Validation("message is required".to_string());
        return (error_status(&e), error_body(&e));
    }

    let bot = match store::get_chatbot(&state.pool, req.chatbot_id).await {
        Ok(Some(bot)) => bot,
        Ok(None) => return not_found("chatbot"),
        Err(e) => return db_error(e),
    };

    let display_name = match chat::resolve_display_name(&state.pool, &bot).await {
        Ok(name) => name,
        Err(e) => return (error_status(&e), error_body(&e)),
    };

    match chat::answer(
        &state.pool,
        &state.pipeline,
        state.backend.as_ref(),
        &state.chat_options(),
        bot.id,
        &req.message,
        &display_name,
    )
    .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            serde_json::json!({
                "response": outcome.reply,
                "via": outcome.via,
                "status": "ok",
            }),
        ),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

pub async fn list_interactions_inner(
    pool: &SqlitePool,
    chatbot_id: i64,
) -> (StatusCode, serde_json::Value) {
    match store::interactions_by_chatbot(pool, chatbot_id).await {
        Ok(items) => (StatusCode::OK, serde_json::json!({ "interactions": items })),
        Err(e) => db_error(e),
    }
}

pub async fn models_inner(state: &HttpState) -> (StatusCode, serde_json::Value) {
    match state.backend.list_models().await {
        Ok(models) => (
            StatusCode::OK,
            serde_json::json!({
                "backend": state.backend.name(),
                "models": models,
                "status": "ok",
            }),
        ),
        Err(e) => {
            let e = NeurobotError::Model(e);
            (StatusCode::BAD_GATEWAY, error_body(&e))
        }
    }
}

/// Inner proxy — server-side fetch returning the raw body. This is the
/// endpoint the URL-ingestion fetcher and the widget embed flow call.
pub async fn proxy_inner(
    state: &HttpState,
    url: Option<String>,
) -> Result<String, (StatusCode, serde_json::Value)> {
    let url = match url {
        Some(u) if !u.trim().is_empty() => u,
        _ => {
            let e = NeurobotError::Validation("url query parameter is required".to_string());
            return Err((StatusCode::BAD_REQUEST, error_body(&e)));
        }
    };

    let response = state.proxy_client.get(&url).send().await.map_err(|e| {
        let e = NeurobotError::Fetch(format!("{}: {}", url, e));
        (StatusCode::BAD_GATEWAY, error_body(&e))
    })?;

    let status = response.status();
    if !status.is_success() {
        let e = NeurobotError::Fetch(format!("{}: upstream returned HTTP {}", url, status));
        return Err((StatusCode::BAD_GATEWAY, error_body(&e)));
    }

    response.text().await.map_err(|e| {
        let e = NeurobotError::Fetch(format!("{}: {}", url, e));
        (StatusCode::BAD_GATEWAY, error_body(&e))
    })
}

/// Inner widget validation — 200 with widget config on a correct pair,
/// the generic 403 otherwise.
pub async fn widget_validate_inner(
    state: &HttpState,
    chatbot_id: i64,
    api_key: &str,
) -> (StatusCode, serde_json::Value) {
    let bot = match bots::validate_widget_key(&state.pool, chatbot_id, api_key).await {
        Ok(Some(bot)) => bot,
        Ok(None) => return widget_denied(),
        Err(e) => return db_error(e),
    };

    let settings = match store::get_settings(&state.pool, bot.id).await {
        Ok(s) => s,
        Err(e) => return db_error(e),
    };

    let display_name = match chat::resolve_display_name(&state.pool, &bot).await {
        Ok(name) => name,
        Err(e) => return (error_status(&e), error_body(&e)),
    };

    (
        StatusCode::OK,
        serde_json::json!({
            "status": "ok",
            "name": bot.name,
            "bot_status": bot.status,
            "greeting": format!("Hello! I'm {}. How can I help you today?", display_name),
            "settings": settings,
        }),
    )
}

/// Inner widget message — validates the credential pair, then runs the
/// same answer path as /chat.
pub async fn widget_message_inner(
    state: &HttpState,
    chatbot_id: i64,
    req: WidgetMessageRequest,
) -> (StatusCode, serde_json::Value) {
    let bot = match bots::validate_widget_key(&state.pool, chatbot_id, &req.api_key).await {
        Ok(Some(bot)) => bot,
        Ok(None) => return widget_denied(),
        Err(e) => return db_error(e),
    };

    if req.message.trim().is_empty() {
        let e = NeurobotError::Validation("message is required".to_string());
        return (error_status(&e), error_body(&e));
    }

    let display_name = match chat::resolve_display_name(&state.pool, &bot).await {
        Ok(name) => name,
        Err(e) => return (error_status(&e), error_body(&e)),
    };

    match chat::answer(
        &state.pool,
        &state.pipeline,
        state.backend.as_ref(),
        &state.chat_options(),
        bot.id,
        &req.message,
        &display_name,
    )
    .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            serde_json::json!({
                "response": outcome.reply,
                "via": outcome.via,
                "status": "ok",
            }),
        ),
        Err(e) => (error_status(&e), error_body(&e)),
    }
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

pub async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state).await;
    (status, Json(body))
}

pub async fn version_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(version_inner()))
}

pub async fn create_user_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let (status, body) = create_user_inner(&state.pool, req).await;
    (status, Json(body))
}

pub async fn create_bot_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<CreateBotRequest>,
) -> impl IntoResponse {
    let (status, body) = create_bot_inner(&state.pool, req).await;
    (status, Json(body))
}

pub async fn list_bots_handler(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<ListBotsParams>,
) -> impl IntoResponse {
    let (status, body) = list_bots_inner(&state.pool, params.user_id).await;
    (status, Json(body))
}

pub async fn get_bot_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (status, body) = get_bot_inner(&state.pool, id).await;
    (status, Json(body))
}

pub async fn update_bot_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBotRequest>,
) -> impl IntoResponse {
    let (status, body) = update_bot_inner(&state.pool, id, req).await;
    (status, Json(body))
}

pub async fn delete_bot_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (status, body) = delete_bot_inner(&state.pool, id).await;
    (status, Json(body))
}

pub async fn put_settings_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
    Json(req): Json<SettingsRequest>,
) -> impl IntoResponse {
    let (status, body) = put_settings_inner(&state.pool, id, req).await;
    (status, Json(body))
}

pub async fn get_settings_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (status, body) = get_settings_inner(&state.pool, id).await;
    (status, Json(body))
}

pub async fn train_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<TrainRequest>,
) -> impl IntoResponse {
    let (status, body) = train_inner(&state, req).await;
    (status, Json(body))
}

pub async fn train_batch_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<TrainBatchRequest>,
) -> impl IntoResponse {
    let (status, body) = train_batch_inner(&state, req).await;
    (status, Json(body))
}

pub async fn list_documents_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (status, body) = list_documents_inner(&state, id).await;
    (status, Json(body))
}

pub async fn delete_document_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (status, body) = delete_document_inner(&state, id).await;
    (status, Json(body))
}

pub async fn chat_handler(
    State(state): State<Arc<HttpState>>,
    Json(req): Json<ChatRequest>,
) -> impl IntoResponse {
    let (status, body) = chat_inner(&state, req).await;
    (status, Json(body))
}

pub async fn list_interactions_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let (status, body) = list_interactions_inner(&state.pool, id).await;
    (status, Json(body))
}

pub async fn models_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = models_inner(&state).await;
    (status, Json(body))
}

pub async fn proxy_handler(
    State(state): State<Arc<HttpState>>,
    Query(params): Query<ProxyParams>,
) -> axum::response::Response {
    match proxy_inner(&state, params.url).await {
        Ok(body) => (StatusCode::OK, body).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn widget_validate_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
    Query(params): Query<WidgetParams>,
) -> impl IntoResponse {
    let (status, body) = widget_validate_inner(&state, id, &params.api_key).await;
    (status, Json(body))
}

pub async fn widget_message_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<i64>,
    Json(req): Json<WidgetMessageRequest>,
) -> impl IntoResponse {
    let (status, body) = widget_message_inner(&state, id, req).await;
    (status, Json(body))
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================
