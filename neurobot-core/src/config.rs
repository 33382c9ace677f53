use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct NeurobotConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// Which backend answers chat messages: "ollama" or "openai".
    pub backend: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub openai_url: String,
    pub openai_model: String,
    /// Bearer token for the cloud backend. Empty means "read OPENAI_API_KEY".
    #[serde(default)]
    pub openai_api_key: String,
    pub request_timeout_seconds: u64,
    pub chat: GenerationParams,
    pub organize: GenerationParams,
}

/// Numeric generation parameters are configuration, not logic.
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Extracted text shorter than this is treated as "no usable text".
    pub min_text_chars: usize,
    /// Multi-file batch failure policy: "best_effort" or "fail_fast".
    pub batch_policy: BatchPolicy,
    /// Character budget for assembled knowledge; oldest fragments are
    /// dropped first once the budget is exceeded.
    pub max_knowledge_chars: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            min_text_chars: 10,
            batch_policy: BatchPolicy::BestEffort,
            max_knowledge_chars: 24_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchPolicy {
    /// Keep processing remaining files after one fails.
    BestEffort,
    /// Stop the batch at the first failing file.
    FailFast,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProxyConfig {
    /// Base URL of the content-fetch proxy used by URL ingestion. Empty
    /// means fetch the target URL directly.
    pub fetch_proxy_url: String,
    pub user_agent: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            fetch_proxy_url: String::new(),
            user_agent: "Mozilla/5.0".to_string(),
        }
    }
}

impl NeurobotConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}
