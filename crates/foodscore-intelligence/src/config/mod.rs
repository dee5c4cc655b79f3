// ABOUTME: Configuration module for foodscore-intelligence crate
// ABOUTME: Re-exports scoring configuration and its error type
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Configuration error types
pub mod error;
/// Scoring rule thresholds, rates and caps
pub mod scoring;

pub use error::ConfigError;
pub use scoring::{
    FiberRuleConfig, IngredientRuleConfig, InsightBlendConfig, ProteinRuleConfig,
    SaturatedFatRuleConfig, ScoringConfig, SodiumRuleConfig, SugarRuleConfig, TransFatRuleConfig,
};
