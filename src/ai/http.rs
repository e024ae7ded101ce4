//! Gemini-style `generateContent` client with JSON output.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::{ModelClient, SERVICE};
use crate::boundary::{BoundaryError, http_client};
use crate::config::AiConfig;

pub struct HttpModelClient {
    config: AiConfig,
}

impl HttpModelClient {
    pub fn new(config: AiConfig) -> Self {
        Self { config }
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl std::fmt::Debug for HttpModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpModelClient")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Deserialize, Serialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize, Serialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[async_trait]
impl ModelClient for HttpModelClient {
    async fn generate_json(&self, prompt: &str) -> Result<serde_json::Value, BoundaryError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| BoundaryError::MissingConfig {
                service: SERVICE,
                detail: format!("set ai.api_key or {}", crate::config::AI_API_KEY_ENV),
            })?;

        let client = http_client(SERVICE, self.config.timeout())?;
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        });

        let response = client
            .post(self.url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| BoundaryError::from_reqwest(SERVICE, err))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                warn!(status = status.as_u16(), "model rejected credentials");
            }
            return Err(BoundaryError::Status {
                service: SERVICE,
                status: status.as_u16(),
                message,
            });
        }

        let decoded: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BoundaryError::malformed(SERVICE, e.to_string()))?;
        let text = decoded
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<String>()
            })
            .ok_or_else(|| BoundaryError::malformed(SERVICE, "no candidates in response"))?;
        debug!(chars = text.len(), "model answered");

        parse_json_answer(&text)
    }
}

/// Parses the model's text part, tolerating a fenced ```json block.
fn parse_json_answer(text: &str) -> Result<serde_json::Value, BoundaryError> {
    let trimmed = text.trim();
    let unfenced = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"))
        .unwrap_or(trimmed);
    serde_json::from_str(unfenced.trim())
        .map_err(|e| BoundaryError::malformed(SERVICE, format!("answer is not JSON: {}", e)))
}
