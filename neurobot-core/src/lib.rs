pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod models;
pub mod store;

pub use config::NeurobotConfig;
pub use error::NeurobotError;
pub use llm::{
    create_backend, GenerationOptions, ModelBackend, ModelError, OllamaClient, OpenAiClient,
};
