//! Model backends for NeuroBot — text generation over HTTP
//!
//! Provides a `ModelBackend` trait with implementations for:
//! - **Ollama** — a locally-run model-serving daemon (`/api/generate`)
//! - **OpenAI** — an OpenAI-style cloud chat-completion API
//!
//! The training pipeline and the chat subsystem are written against the
//! trait only, so either backend can be substituted without touching them.
//! Calls are retry-less by design; a failure surfaces immediately and the
//! caller decides whether to degrade.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{GenerationParams, ModelConfig};

// ============================================================================
// ModelBackend trait
// ============================================================================

/// Numeric generation parameters passed per call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl From<GenerationParams> for GenerationOptions {
    fn from(p: GenerationParams) -> Self {
        Self {
            temperature: p.temperature,
            top_p: p.top_p,
            max_tokens: p.max_tokens,
        }
    }
}

/// Abstraction over text-generation providers.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Send a system instruction plus a user message and return the
    /// generated text.
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError>;

    /// Which models the backend has available.
    async fn list_models(&self) -> Result<Vec<String>, ModelError>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

// ============================================================================
// Error types
// ============================================================================

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    Api { code: u16, message: String },

    #[error("Backend returned no generated text")]
    EmptyResponse,

    #[error("Missing API key for cloud backend")]
    MissingApiKey,

    #[error("Unknown model backend '{0}' (expected 'ollama' or 'openai')")]
    UnknownBackend(String),
}

impl ModelError {
    /// True when the backend could not be reached at all (connection refused
    /// or timed out), as opposed to an in-protocol failure. The chat
    /// subsystem uses this to tag its degraded outcome.
    pub fn is_unreachable(&self) -> bool {
        match self {
            ModelError::Http(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}

/// Create the configured backend.
pub fn create_backend(config: &ModelConfig) -> Result<Box<dyn ModelBackend>, ModelError> {
    match config.backend.as_str() {
        "ollama" => Ok(Box::new(OllamaClient::new(
            config.ollama_url.clone(),
            config.ollama_model.clone(),
            config.request_timeout_seconds,
        )?)),
        "openai" => {
            let api_key = if config.openai_api_key.is_empty() {
                std::env::var("OPENAI_API_KEY").unwrap_or_default()
            } else {
                config.openai_api_key.clone()
            };
            Ok(Box::new(OpenAiClient::new(
                config.openai_url.clone(),
                config.openai_model.clone(),
                api_key,
                config.request_timeout_seconds,
            )?))
        }
        other => Err(ModelError::UnknownBackend(other.to_string())),
    }
}

// ============================================================================
// Ollama API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    #[allow(dead_code)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<OllamaModelTag>,
}

#[derive(Debug, Deserialize)]
struct OllamaModelTag {
    name: String,
}

// ============================================================================
// OllamaClient
// ============================================================================

/// Client for a local model-serving daemon speaking the Ollama protocol.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(
        base_url: String,
        model: String,
        timeout_seconds: u64,
    ) -> Result<Self, ModelError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }
}

#[async_trait]
impl ModelBackend for OllamaClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError> {
        // The generate endpoint takes one flat prompt, so the system
        // instruction and user turn are concatenated.
        let prompt = format!("{}\n\nUser: {}\nAssistant:", system, user);

        let request = OllamaRequest {
            model: self.model.clone(),
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                top_p: options.top_p,
                max_tokens: options.max_tokens,
            },
        };

        let url = format!("{}/api/generate", self.base_url);
        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(code = status.as_u16(), message = %message, "Ollama API error");
            return Err(ModelError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: OllamaResponse = response.json().await?;
        if body.response.is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        Ok(body.response)
    }

    async fn list_models(&self) -> Result<Vec<String>, ModelError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Api {
                code: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let body: OllamaTagsResponse = response.json().await?;
        Ok(body.models.into_iter().map(|m| m.name).collect())
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

// ============================================================================
// OpenAI API structs (private)
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

// ============================================================================
// OpenAiClient
// ============================================================================

/// Client for an OpenAI-style chat-completion endpoint, bearer-token
/// authenticated.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(
        base_url: String,
        model: String,
        api_key: String,
        timeout_seconds: u64,
    ) -> Result<Self, ModelError> {
        if api_key.is_empty() {
            return Err(ModelError::MissingApiKey);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_key,
        })
    }
}

#[async_trait]
impl ModelBackend for OpenAiClient {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &GenerationOptions,
    ) -> Result<String, ModelError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user.to_string(),
                },
            ],
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
        };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::error!(code = status.as_u16(), message = %message, "OpenAI API error");
            return Err(ModelError::Api {
                code: status.as_u16(),
                message,
            });
        }

        let body: ChatCompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(ModelError::EmptyResponse)
    }

    /// Cloud model discovery is out of scope; reports the configured model.
    async fn list_models(&self) -> Result<Vec<String>, ModelError> {
        Ok(vec![self.model.clone()])
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options() -> GenerationOptions {
        GenerationOptions {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 500,
        }
    }

    #[tokio::test]
    async fn test_ollama_complete_sends_flat_prompt_and_options() {
        let mock_server = MockServer::start().await;
        let client = OllamaClient::new(mock_server.uri(), "llama3.2:3b".to_string(), 30)
            .expect("client");

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3.2:3b",
                "stream": false,
                "options": { "temperature": 0.7, "top_p": 0.9, "max_tokens": 500 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "Hello there!",
                "done": true
            })))
            .mount(&mock_server)
            .await;

        let result = client
            .complete("You are Ana.", "hi", &options())
            .await
            .expect("completion");
        assert_eq!(result, "Hello there!");
    }

    #[tokio::test]
    async fn test_ollama_complete_api_error_maps_to_api_variant() {
        let mock_server = MockServer::start().await;
        let client = OllamaClient::new(mock_server.uri(), "llama3.2:3b".to_string(), 30)
            .expect("client");

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&mock_server)
            .await;

        let err = client
            .complete("sys", "msg", &options())
            .await
            .expect_err("should fail");
        match err {
            ModelError::Api { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "model crashed");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ollama_connection_refused_is_unreachable() {
        // Nothing listens on this port.
        let client = OllamaClient::new(
            "http://127.0.0.1:1".to_string(),
            "llama3.2:3b".to_string(),
            2,
        )
        .expect("client");

        let err = client
            .complete("sys", "msg", &options())
            .await
            .expect_err("should fail");
        assert!(err.is_unreachable(), "connection refused must tag unreachable");
    }

    #[tokio::test]
    async fn test_ollama_list_models_parses_tags() {
        let mock_server = MockServer::start().await;
        let client = OllamaClient::new(mock_server.uri(), "llama3.2:3b".to_string(), 30)
            .expect("client");

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "models": [{ "name": "llama3.2:3b" }, { "name": "mistral:7b" }]
            })))
            .mount(&mock_server)
            .await;

        let models = client.list_models().await.expect("models");
        assert_eq!(models, vec!["llama3.2:3b", "mistral:7b"]);
    }

    #[tokio::test]
    async fn test_ollama_list_models_unreachable_is_transport_error() {
        let client = OllamaClient::new(
            "http://127.0.0.1:1".to_string(),
            "llama3.2:3b".to_string(),
            2,
        )
        .expect("client");
        let err = client.list_models().await.expect_err("should fail");
        assert!(err.is_unreachable(), "connection refused must tag unreachable");
    }

    #[tokio::test]
    async fn test_openai_complete_sends_bearer_and_messages() {
        let mock_server = MockServer::start().await;
        let client = OpenAiClient::new(
            mock_server.uri(),
            "gpt-3.5-turbo".to_string(),
            "sk-test".to_string(),
            30,
        )
        .expect("client");

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({
                "model": "gpt-3.5-turbo",
                "messages": [
                    { "role": "system", "content": "You are Ana." },
                    { "role": "user", "content": "hi" }
                ],
                "max_tokens": 500
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "Hi! How can I help?" } }]
            })))
            .mount(&mock_server)
            .await;

        let result = client
            .complete("You are Ana.", "hi", &options())
            .await
            .expect("completion");
        assert_eq!(result, "Hi! How can I help?");
    }

    #[tokio::test]
    async fn test_openai_empty_choices_is_empty_response() {
        let mock_server = MockServer::start().await;
        let client = OpenAiClient::new(
            mock_server.uri(),
            "gpt-3.5-turbo".to_string(),
            "sk-test".to_string(),
            30,
        )
        .expect("client");

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "choices": [] })),
            )
            .mount(&mock_server)
            .await;

        let err = client
            .complete("sys", "msg", &options())
            .await
            .expect_err("should fail");
        assert!(matches!(err, ModelError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_openai_requires_api_key() {
        let result = OpenAiClient::new(
            "https://api.openai.com/v1".to_string(),
            "gpt-3.5-turbo".to_string(),
            String::new(),
            30,
        );
        assert!(matches!(result, Err(ModelError::MissingApiKey)));
    }

    #[test]
    fn test_create_backend_rejects_unknown_name() {
        let config = ModelConfig {
            backend: "bard".to_string(),
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3.2:3b".to_string(),
            openai_url: "https://api.openai.com/v1".to_string(),
            openai_model: "gpt-3.5-turbo".to_string(),
            openai_api_key: String::new(),
            request_timeout_seconds: 30,
            chat: crate::config::GenerationParams {
                temperature: 0.7,
                top_p: 0.9,
                max_tokens: 500,
            },
            organize: crate::config::GenerationParams {
                temperature: 0.3,
                top_p: 1.0,
                max_tokens: 1000,
            },
        };
        let result = create_backend(&config);
        assert!(matches!(result, Err(ModelError::UnknownBackend(_))));
    }
}
