// ABOUTME: Generic OpenAI-compatible chat completions client for hosted and local endpoints
// ABOUTME: Supports JSON mode and image parts so one client serves analysis and label OCR
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # `OpenAI`-Compatible Provider
//!
//! Works with any endpoint implementing the chat completions API (`OpenAI`,
//! Groq, Ollama, vLLM, `LocalAI`).
//!
//! ## Configuration
//!
//! - `FOODSCORE_LLM_BASE_URL`: base URL, e.g. <http://localhost:11434/v1>
//! - `FOODSCORE_LLM_MODEL`: model used for medical analysis
//! - `FOODSCORE_LLM_API_KEY`: API key (optional for local servers)
//! - `FOODSCORE_OCR_MODEL`: vision-capable model used for label OCR

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, LlmProvider};
use crate::errors::{AppError, ErrorCode};

/// Environment variable for the endpoint base URL
pub const LLM_BASE_URL_ENV: &str = "FOODSCORE_LLM_BASE_URL";

/// Environment variable for the analysis model
pub const LLM_MODEL_ENV: &str = "FOODSCORE_LLM_MODEL";

/// Environment variable for the API key
pub const LLM_API_KEY_ENV: &str = "FOODSCORE_LLM_API_KEY";

/// Environment variable for the vision model used for OCR
pub const OCR_MODEL_ENV: &str = "FOODSCORE_OCR_MODEL";

/// Default analysis model
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Connection timeout
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Request timeout; the pipeline applies its own, shorter, collaborator timeout
const REQUEST_TIMEOUT_SECS: u64 = 120;

const SERVICE: &str = "LLM";

// ============================================================================
// API Request/Response Types (OpenAI-compatible format)
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: Value,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        let content = if msg.images.is_empty() {
            Value::String(msg.content.clone())
        } else {
            let mut parts = vec![json!({ "type": "text", "text": msg.content })];
            parts.extend(
                msg.images
                    .iter()
                    .map(|url| json!({ "type": "image_url", "image_url": { "url": url } })),
            );
            Value::Array(parts)
        };
        Self {
            role: msg.role.as_str(),
            content,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    #[serde(default)]
    model: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorResponse {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Configuration for the `OpenAI`-compatible provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiCompatibleConfig {
    /// Base URL for the API (e.g., <https://api.openai.com/v1>)
    pub base_url: String,
    /// API key (optional for local servers)
    pub api_key: Option<String>,
    /// Default model to use
    pub default_model: String,
}

impl OpenAiCompatibleConfig {
    /// Read the analysis endpoint from the environment
    ///
    /// Returns `None` when no base URL is configured, which disables the
    /// medical analyst.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var(LLM_BASE_URL_ENV).ok().filter(|u| !u.trim().is_empty())?;
        Some(Self {
            base_url,
            api_key: env::var(LLM_API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            default_model: env::var(LLM_MODEL_ENV).unwrap_or_else(|_| DEFAULT_MODEL.to_owned()),
        })
    }

    /// Same endpoint with the vision model from `FOODSCORE_OCR_MODEL`, if set
    #[must_use]
    pub fn vision_from_env(&self) -> Self {
        Self {
            default_model: env::var(OCR_MODEL_ENV)
                .ok()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| self.default_model.clone()),
            ..self.clone()
        }
    }
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Generic `OpenAI`-compatible LLM provider
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: OpenAiCompatibleConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        info!(
            "Initializing LLM provider: base_url={}, model={}",
            config.base_url, config.default_model
        );
        Ok(Self { client, config })
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'))
    }

    fn add_auth_header(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref api_key) = self.config.api_key {
            request.header("Authorization", format!("Bearer {api_key}"))
        } else {
            request
        }
    }

    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<OpenAiErrorResponse>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |e| e.error.message,
        );
        match status.as_u16() {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE} authentication failed: {message}"),
            ),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("{SERVICE} rate limit reached: {message}"),
            ),
            502..=504 => AppError::external_unavailable(SERVICE, message),
            _ => AppError::external_service(SERVICE, format!("API error ({status}): {message}")),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &'static str {
        "openai-compatible"
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(
        skip(self, request),
        fields(model = %request.model.as_deref().unwrap_or(&self.config.default_model))
    )]
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);

        let openai_request = OpenAiRequest {
            model: model.to_owned(),
            messages: request.messages.iter().map(OpenAiMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_mode
                .then(|| json!({ "type": "json_object" })),
        };
        debug!(
            messages = openai_request.messages.len(),
            json_mode = request.json_mode,
            "Sending chat completion request"
        );

        let http_request = self
            .client
            .post(self.api_url("chat/completions"))
            .json(&openai_request);

        let response = self
            .add_auth_header(http_request)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {}: {}", self.config.base_url, e);
                if e.is_connect() || e.is_timeout() {
                    AppError::external_unavailable(
                        SERVICE,
                        format!("Cannot reach {}: {e}", self.config.base_url),
                    )
                } else {
                    AppError::external_service(SERVICE, format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| {
                AppError::external_service(SERVICE, format!("Failed to read response: {e}"))
            })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &body));
        }

        let parsed: OpenAiResponse = serde_json::from_str(&body)
            .map_err(|e| {
                AppError::external_service(SERVICE, format!("Failed to parse response: {e}"))
            })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::external_service(SERVICE, "API returned no choices"))?;
        let content = choice.message.content.unwrap_or_default();

        debug!(
            chars = content.len(),
            finish_reason = ?choice.finish_reason,
            "Received chat completion"
        );

        Ok(ChatResponse {
            content,
            model: if parsed.model.is_empty() {
                model.to_owned()
            } else {
                parsed.model
            },
            finish_reason: choice.finish_reason,
        })
    }
}
