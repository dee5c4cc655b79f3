// ABOUTME: Nutrition normalization and health scoring engine for FoodScore
// ABOUTME: Pure, deterministic parse -> normalize -> merge -> score pipeline stages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FoodScore` Intelligence
//!
//! Stateless building blocks of the analysis pipeline. Nothing in this crate
//! performs I/O; collaborators (OCR, product databases, language models) live
//! in the main crate and feed their results in as `SourceFragment`s.
//!
//! ## Modules
//!
//! - **`label_parser`**: noisy label text to structured nutrients and ingredients
//! - **normalizer**: per-serving values to per-100 g/ml
//! - **merger**: per-nutrient resolution across sources
//! - **ingredients**: ultra-processing marker detection
//! - **`scoring_engine`**: rule-based 0-100 score with explanations
//! - **explanations**: rule catalog with guideline sources and recommendations
//! - **config**: scoring thresholds with environment overrides

/// Scoring configuration
pub mod config;
/// Rule catalog and user-facing texts
pub mod explanations;
/// Ingredient list analysis
pub mod ingredients;
/// Label text parsing
pub mod label_parser;
/// Multi-source merging
pub mod merger;
/// Per-100 normalization
pub mod normalizer;
/// Health scoring
pub mod scoring_engine;

pub use config::ScoringConfig;
pub use label_parser::{parse_label, split_ingredients, ParsedLabel};
pub use merger::{merge, MergedProduct};
pub use normalizer::{normalize, NormalizationOutcome, NormalizationStatus, ServingSize};
pub use scoring_engine::{score, score_with_config, ScoreResult};
