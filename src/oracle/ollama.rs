use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use super::{OracleClient, OracleError};
use crate::config::PipelineConfig;

/// Ollama HTTP client for local reasoning-model inference.
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client pointing at an Ollama instance.
    ///
    /// The model and the per-call timeout bind here; extractors never see
    /// either.
    pub fn new(base_url: &str, model: &str, timeout_secs: u64) -> Result<Self, OracleError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Build a client from pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, OracleError> {
        Self::new(
            &config.oracle_base_url,
            &config.oracle_model,
            config.oracle_timeout_secs,
        )
    }
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: GenerateOptions,
}

/// Sampling temperature 0.0: extraction must be reproducible.
#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

impl OracleClient for OllamaClient {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, OracleError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model: &self.model,
            prompt,
            system,
            stream: false,
            options: GenerateOptions { temperature: 0.0 },
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                OracleError::Connection(self.base_url.clone())
            } else if e.is_timeout() {
                OracleError::Timeout(self.timeout_secs)
            } else {
                OracleError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OracleError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| OracleError::Decode(e.to_string()))?;

        Ok(parsed.response)
    }
}

/// Mock oracle for testing — returns a configured response or failure,
/// counting calls so tests can assert how often the pipeline consulted it.
pub struct MockOracleClient {
    response: Result<String, String>,
    calls: AtomicUsize,
}

impl MockOracleClient {
    /// A mock that always answers with `response`.
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// A mock whose every call fails as if the service were down.
    pub fn failing() -> Self {
        Self {
            response: Err("mock oracle configured to fail".to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times `generate` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OracleClient for MockOracleClient {
    fn generate(&self, _system: &str, _prompt: &str) -> Result<String, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(text) => Ok(text.clone()),
            Err(reason) => Err(OracleError::Connection(reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_client_returns_configured_response() {
        let client = MockOracleClient::new("test response");
        let result = client.generate("system", "prompt").unwrap();
        assert_eq!(result, "test response");
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn mock_client_counts_calls() {
        let client = MockOracleClient::new("x");
        let _ = client.generate("s", "p");
        let _ = client.generate("s", "p");
        assert_eq!(client.calls(), 2);
    }

    #[test]
    fn failing_mock_reports_connection_error() {
        let client = MockOracleClient::failing();
        let result = client.generate("system", "prompt");
        assert!(matches!(result, Err(OracleError::Connection(_))));
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn ollama_client_trims_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", "medgemma", 60).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
        assert_eq!(client.model, "medgemma");
    }

    #[test]
    fn ollama_client_from_config() {
        let config = PipelineConfig::default();
        let client = OllamaClient::from_config(&config).unwrap();
        assert_eq!(client.base_url, config.oracle_base_url);
        assert_eq!(client.timeout_secs, config.oracle_timeout_secs);
    }
}
