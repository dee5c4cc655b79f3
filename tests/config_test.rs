// ABOUTME: Tests for server and scoring configuration loading from the environment
// ABOUTME: Validates defaults, overrides, parse failures and range validation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::env;

use foodscore::config::ServerConfig;
use foodscore::errors::{AppError, ErrorCode};
use foodscore_intelligence::config::ConfigError;
use foodscore_intelligence::ScoringConfig;
use serial_test::serial;

const SERVER_VARS: &[&str] = &[
    "HOST",
    "HTTP_PORT",
    "FOODSCORE_COLLABORATOR_TIMEOUT_SECS",
    "FOODSCORE_HISTORY_CAPACITY",
    "FOODSCORE_MAX_UPLOAD_BYTES",
    "FOODSCORE_DEMO_MODE",
    "OPENFOODFACTS_BASE_URL",
    "FOODSCORE_LLM_BASE_URL",
    "FOODSCORE_LLM_MODEL",
    "FOODSCORE_LLM_API_KEY",
    "FOODSCORE_OCR_MODEL",
];

const SCORING_VARS: &[&str] = &[
    "FOODSCORE_SCORING_SODIUM_THRESHOLD_MG",
    "FOODSCORE_SCORING_SUGAR_SOLID_THRESHOLD_G",
    "FOODSCORE_SCORING_INSIGHT_WEIGHT",
    "FOODSCORE_SCORING_TRANS_FAT_PENALTY",
    "FOODSCORE_SCORING_MAX_SIMPLE_INGREDIENTS",
];

fn clear(vars: &[&str]) {
    for var in vars {
        env::remove_var(var);
    }
}

// ============================================================================
// Server configuration
// ============================================================================

#[test]
#[serial]
fn test_server_defaults() {
    common::init_test_logging();
    clear(SERVER_VARS);

    let config = ServerConfig::from_env().unwrap();
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.bind_address(), "0.0.0.0:8000");
    assert!(config.llm.is_none());
    assert!(config.ocr.is_none());
    assert!(!config.demo_mode);
}

#[test]
#[serial]
fn test_server_overrides() {
    clear(SERVER_VARS);
    env::set_var("HOST", "127.0.0.1");
    env::set_var("HTTP_PORT", "9090");
    env::set_var("FOODSCORE_COLLABORATOR_TIMEOUT_SECS", "3");
    env::set_var("FOODSCORE_HISTORY_CAPACITY", "5");
    env::set_var("FOODSCORE_DEMO_MODE", "true");
    env::set_var("FOODSCORE_LLM_BASE_URL", "http://localhost:11434/v1");
    env::set_var("FOODSCORE_LLM_MODEL", "llama3.1");
    env::set_var("FOODSCORE_OCR_MODEL", "llava");

    let config = ServerConfig::from_env().unwrap();
    clear(SERVER_VARS);

    assert_eq!(config.bind_address(), "127.0.0.1:9090");
    assert_eq!(config.collaborator_timeout().as_secs(), 3);
    assert_eq!(config.history_capacity, 5);
    assert!(config.demo_mode);

    let llm = config.llm.as_ref().unwrap();
    assert_eq!(llm.base_url, "http://localhost:11434/v1");
    assert_eq!(llm.default_model, "llama3.1");
    assert!(llm.api_key.is_none());
    let ocr = config.ocr.as_ref().unwrap();
    assert_eq!(ocr.base_url, llm.base_url);
    assert_eq!(ocr.default_model, "llava");

    let summary = config.summary();
    assert!(summary.contains("demo catalogue"));
    assert!(summary.contains("llama3.1"));
}

#[test]
#[serial]
fn test_server_rejects_bad_values() {
    clear(SERVER_VARS);

    env::set_var("HTTP_PORT", "not-a-port");
    let err = ServerConfig::from_env().unwrap_err();
    assert_eq!(err.code, ErrorCode::ConfigError);
    assert!(err.message.contains("HTTP_PORT"));
    clear(SERVER_VARS);

    env::set_var("FOODSCORE_COLLABORATOR_TIMEOUT_SECS", "0");
    assert!(ServerConfig::from_env().is_err());
    clear(SERVER_VARS);

    env::set_var("FOODSCORE_HISTORY_CAPACITY", "0");
    assert!(ServerConfig::from_env().is_err());
    clear(SERVER_VARS);
}

// ============================================================================
// Scoring configuration
// ============================================================================

#[test]
fn test_scoring_defaults_are_valid() {
    let config = ScoringConfig::default();
    config.validate().unwrap();
    assert!((config.sugar.solid_threshold_g - 5.0).abs() < f64::EPSILON);
    assert!((config.sugar.liquid_threshold_g - 2.5).abs() < f64::EPSILON);
    assert!((config.sodium.threshold_mg - 400.0).abs() < f64::EPSILON);
    assert!((config.insight.weight - 0.2).abs() < f64::EPSILON);
}

#[test]
#[serial]
fn test_scoring_env_overrides() {
    clear(SCORING_VARS);
    env::set_var("FOODSCORE_SCORING_SODIUM_THRESHOLD_MG", "600");
    env::set_var("FOODSCORE_SCORING_MAX_SIMPLE_INGREDIENTS", "20");

    let config = ScoringConfig::load().unwrap();
    clear(SCORING_VARS);

    assert!((config.sodium.threshold_mg - 600.0).abs() < f64::EPSILON);
    assert_eq!(config.ingredients.max_simple_count, 20);
}

#[test]
#[serial]
fn test_scoring_env_errors() {
    clear(SCORING_VARS);

    env::set_var("FOODSCORE_SCORING_SODIUM_THRESHOLD_MG", "lots");
    assert!(matches!(ScoringConfig::load(), Err(ConfigError::Parse(_))));
    clear(SCORING_VARS);

    env::set_var("FOODSCORE_SCORING_TRANS_FAT_PENALTY", "-1");
    assert!(matches!(
        ScoringConfig::load(),
        Err(ConfigError::InvalidRange(_))
    ));
    clear(SCORING_VARS);

    env::set_var("FOODSCORE_SCORING_INSIGHT_WEIGHT", "1.5");
    assert!(matches!(
        ScoringConfig::load(),
        Err(ConfigError::ValueOutOfRange(_))
    ));
    clear(SCORING_VARS);
}

#[test]
fn test_config_error_maps_to_app_error() {
    let err: AppError = ConfigError::Parse("Invalid X".to_owned()).into();
    assert_eq!(err.code, ErrorCode::ConfigInvalid);
    assert!(err.message.contains("Invalid X"));
}
