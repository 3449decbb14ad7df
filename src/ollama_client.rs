//! Client for a locally hosted Ollama model.

use std::env;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default Ollama server URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default model for conversational replies.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.2:1b";

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Ollama API error: {0}")]
    Api(String),
    #[error("Ollama server not running at {0}. Start it with: ollama serve")]
    ServerNotRunning(String),
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    system: Option<String>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    #[allow(dead_code)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}

pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    /// Create a client from `OLLAMA_URL` and `OLLAMA_MODEL`, with defaults.
    pub fn from_env() -> Self {
        let base_url = env::var("OLLAMA_URL").unwrap_or_else(|_| DEFAULT_OLLAMA_URL.to_string());
        let model = env::var("OLLAMA_MODEL").unwrap_or_else(|_| DEFAULT_OLLAMA_MODEL.to_string());
        Self::with_config(base_url, model)
    }

    pub fn with_config(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Send one non-streaming completion request and return the reply text.
    pub async fn generate(&self, system: &str, prompt: &str) -> Result<String, OllamaError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            system: Some(system.to_string()),
            stream: false,
        };

        let url = format!("{}/api/generate", self.base_url);

        debug!("Sending completion request to {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    OllamaError::ServerNotRunning(self.base_url.clone())
                } else {
                    OllamaError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(OllamaError::Api(format!("{}: {}", status, text)));
        }

        let body: GenerateResponse = response.json().await?;

        if let Some(error) = body.error {
            return Err(OllamaError::Api(error));
        }

        Ok(body.response)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_config() {
        let client = OllamaClient::with_config("http://localhost:8080", "llama3.2:3b");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.model(), "llama3.2:3b");
    }

    #[test]
    fn error_messages_name_the_server() {
        let err = OllamaError::ServerNotRunning("http://localhost:11434".to_string());
        assert!(err.to_string().contains("ollama serve"));
    }
}
