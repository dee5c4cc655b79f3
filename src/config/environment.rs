// ABOUTME: Environment-based server configuration for the HTTP listener and external collaborators
// ABOUTME: Parses ports, timeouts, history capacity, demo mode and LLM/OCR endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::external::OpenFoodFactsConfig;
use crate::llm::OpenAiCompatibleConfig;

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u16 = 8000;

/// Default per-collaborator timeout in seconds
pub const DEFAULT_COLLABORATOR_TIMEOUT_SECS: u64 = 20;

/// Default number of analyses kept in history
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Default maximum upload size for label photos
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,
    /// HTTP port
    pub http_port: u16,
    /// Timeout applied to each external collaborator call
    pub collaborator_timeout_secs: u64,
    /// Number of analyses kept in the history log
    pub history_capacity: usize,
    /// Maximum accepted image upload
    pub max_upload_bytes: usize,
    /// Serve products from the built-in demo catalogue instead of `OpenFoodFacts`
    pub demo_mode: bool,
    /// `OpenFoodFacts` client settings
    pub openfoodfacts: OpenFoodFactsConfig,
    /// Medical analyst endpoint; `None` disables the analyst
    pub llm: Option<OpenAiCompatibleConfig>,
    /// Vision endpoint used for OCR; `None` disables image analysis
    pub ocr: Option<OpenAiCompatibleConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            http_port: DEFAULT_HTTP_PORT,
            collaborator_timeout_secs: DEFAULT_COLLABORATOR_TIMEOUT_SECS,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            demo_mode: false,
            openfoodfacts: OpenFoodFactsConfig::default(),
            llm: None,
            ocr: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a variable is present but cannot be parsed
    pub fn from_env() -> AppResult<Self> {
        info!("Loading configuration from environment variables");
        let defaults = Self::default();

        let mut openfoodfacts = defaults.openfoodfacts;
        if let Ok(base_url) = env::var("OPENFOODFACTS_BASE_URL") {
            openfoodfacts.base_url = base_url;
        }

        let llm = OpenAiCompatibleConfig::from_env();
        let ocr = llm.as_ref().map(OpenAiCompatibleConfig::vision_from_env);

        let config = Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            http_port: parse_env("HTTP_PORT", defaults.http_port)?,
            collaborator_timeout_secs: parse_env(
                "FOODSCORE_COLLABORATOR_TIMEOUT_SECS",
                defaults.collaborator_timeout_secs,
            )?,
            history_capacity: parse_env("FOODSCORE_HISTORY_CAPACITY", defaults.history_capacity)?,
            max_upload_bytes: parse_env("FOODSCORE_MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            demo_mode: parse_env("FOODSCORE_DEMO_MODE", defaults.demo_mode)?,
            openfoodfacts,
            llm,
            ocr,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero timeout or history capacity
    pub fn validate(&self) -> AppResult<()> {
        if self.collaborator_timeout_secs == 0 {
            return Err(AppError::config(
                "FOODSCORE_COLLABORATOR_TIMEOUT_SECS must be greater than zero",
            ));
        }
        if self.history_capacity == 0 {
            return Err(AppError::config(
                "FOODSCORE_HISTORY_CAPACITY must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Collaborator timeout as a `Duration`
    #[must_use]
    pub const fn collaborator_timeout(&self) -> Duration {
        Duration::from_secs(self.collaborator_timeout_secs)
    }

    /// `host:port` to bind
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.http_port)
    }

    /// Human-readable configuration summary for startup logs
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "FoodScore Configuration:\n\
             - Listen: {}\n\
             - Product database: {}\n\
             - Medical analyst: {}\n\
             - Label OCR: {}\n\
             - Collaborator timeout: {}s\n\
             - History capacity: {}",
            self.bind_address(),
            if self.demo_mode {
                "demo catalogue".to_owned()
            } else {
                self.openfoodfacts.base_url.clone()
            },
            self.llm
                .as_ref()
                .map_or_else(|| "disabled".to_owned(), |c| c.default_model.clone()),
            self.ocr
                .as_ref()
                .map_or_else(|| "disabled".to_owned(), |c| c.default_model.clone()),
            self.collaborator_timeout_secs,
            self.history_capacity,
        )
    }
}

/// Parse an environment variable, falling back to `default` when unset
fn parse_env<T>(name: &str, default: T) -> AppResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| AppError::config(format!("Invalid {name} value '{raw}': {e}"))),
        _ => Ok(default),
    }
}
