//! HTTP client for the Gemini generateContent API.
//!
//! Every generative step in the pipeline goes through this client. Calls are
//! best-effort: callers catch errors and substitute fallback structures.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors from a single model invocation.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Request timed out after {0}s")]
    Timeout(u64),
    #[error("Cannot connect to Gemini API at {0}")]
    Connect(String),
    #[error("Failed to send request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Model returned no candidates")]
    EmptyResponse,
    #[error("Failed to parse model response as JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for the Gemini client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub model_name: String,
    pub api_key: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Client for the hosted generative-text API.
pub struct GeminiClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            http_client,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    /// Send a prompt using the configured temperature.
    pub async fn generate(&self, prompt: &str) -> Result<String, AgentError> {
        self.generate_with_temperature(prompt, self.config.temperature)
            .await
    }

    /// Send a prompt with an explicit temperature (the creative step runs hotter).
    pub async fn generate_with_temperature(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> Result<String, AgentError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.api_url, self.config.model_name, self.config.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        debug!(
            "Sending generateContent request ({} chars) to model {}",
            prompt.len(),
            self.config.model_name
        );

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AgentError::Timeout(self.config.timeout_seconds)
                } else if e.is_connect() {
                    AgentError::Connect(self.config.api_url.clone())
                } else {
                    AgentError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Api { status, body });
        }

        let generate_response: GenerateResponse = response.json().await?;

        generate_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or(AgentError::EmptyResponse)
    }
}

/// Strip a wrapping Markdown code fence from a model response.
///
/// Responses frequently arrive as ```json ... ``` blocks; the JSON parser
/// wants the bare payload.
pub fn strip_code_fence(text: &str) -> &str {
    let mut text = text.trim();

    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fence() {
        let wrapped = "```json\n{\"objective\": \"test\"}\n```";
        assert_eq!(strip_code_fence(wrapped), "{\"objective\": \"test\"}");
    }

    #[test]
    fn test_strip_plain_fence() {
        let wrapped = "```\n[1, 2, 3]\n```";
        assert_eq!(strip_code_fence(wrapped), "[1, 2, 3]");
    }

    #[test]
    fn test_strip_no_fence() {
        let plain = "{\"key\": \"value\"}";
        assert_eq!(strip_code_fence(plain), plain);
    }

    #[test]
    fn test_strip_fence_with_surrounding_whitespace() {
        let wrapped = "  \n```json\n{}\n```  \n";
        assert_eq!(strip_code_fence(wrapped), "{}");
    }

    #[test]
    fn test_parse_generate_response() {
        let json = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "hello"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.candidates[0].content.parts[0].text, "hello");
    }

    #[test]
    fn test_parse_empty_response() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(response.candidates.is_empty());
    }
}
