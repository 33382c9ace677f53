use thiserror::Error;

/// Error taxonomy shared across the workspace.
///
/// Ingestion failures (`Extraction`, `Fetch`, `Validation`) abort the single
/// fragment being processed and surface to the caller — nothing is partially
/// committed. Model failures during response generation are converted into a
/// fixed user-facing reply by the chat subsystem and never reach end users
/// as hard errors.
#[derive(Error, Debug)]
pub enum NeurobotError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document has no usable text: {0}")]
    Extraction(String),

    #[error("could not fetch url content: {0}")]
    Fetch(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("model backend error: {0}")]
    Model(#[from] crate::llm::ModelError),
}
