use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::provider::CompletionProvider;
use crate::errors::VigilError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "llama3.1:8b";

/// A hung model server becomes a definite error after this long; the
/// analyzer treats it as a fall-through to the heuristic branch.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(base_url: Option<&str>, model: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, VigilError> {
        let body = json!({
            "model": self.model,
            "prompt": prompt,
            "temperature": temperature,
            "stream": false,
        });

        let resp = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VigilError::Timeout(format!("Model request timed out: {}", e))
                } else {
                    VigilError::ModelUnavailable(format!("Model request failed: {}", e))
                }
            })?;

        if !resp.status().is_success() {
            return Err(VigilError::ModelUnavailable(format!(
                "Model server returned {}",
                resp.status()
            )));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| VigilError::ModelUnavailable(format!("Model response parse error: {}", e)))?;

        let content = data["response"].as_str().unwrap_or("").to_string();
        if content.trim().is_empty() {
            return Err(VigilError::ModelUnavailable("Empty model response body".into()));
        }

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
