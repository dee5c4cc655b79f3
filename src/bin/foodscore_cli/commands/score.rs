// ABOUTME: Scoring commands for foodscore-cli
// ABOUTME: Scores label text files and manual nutrition documents, and prints the rule catalogue
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fs;
use std::path::Path;
use std::sync::Arc;

use foodscore::config::{ScoringConfig, ServerConfig};
use foodscore::errors::{AppError, AppResult, ErrorCode};
use foodscore::llm::{LlmMedicalAnalyst, OpenAiCompatibleProvider};
use foodscore::pipeline::{AnalysisPipeline, ManualEntry};
use foodscore::routes::analysis::ScoringRulesResponse;
use tracing::info;

use crate::helpers::display::{print_json, print_report};

fn read_input(path: &Path) -> AppResult<String> {
    fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorCode::InvalidInput,
            format!("Cannot read {}: {e}", path.display()),
        )
        .with_source(e)
    })
}

/// Pipeline for offline scoring; only the medical analyst is consulted when configured
fn offline_pipeline() -> AppResult<AnalysisPipeline> {
    let config = ServerConfig::from_env()?;
    let mut pipeline = AnalysisPipeline::new(config.collaborator_timeout());
    if let Some(llm) = config.llm {
        let provider = Arc::new(OpenAiCompatibleProvider::new(llm)?);
        pipeline = pipeline.with_analyst(Arc::new(LlmMedicalAnalyst::new(provider)));
    }
    Ok(pipeline)
}

/// Score label text read from `path`
pub async fn score_text(path: &Path, summary: bool) -> AppResult<()> {
    let text = read_input(path)?;
    info!("Scoring label text from {}", path.display());
    let report = offline_pipeline()?.analyze_label_text(&text).await;
    print_report(&report, summary)
}

/// Score a manual nutrition document read from `path`
pub async fn score_json(path: &Path, summary: bool) -> AppResult<()> {
    let raw = read_input(path)?;
    let entry: ManualEntry = serde_json::from_str(&raw)
        .map_err(|e| AppError::invalid_input(format!("Invalid nutrition document: {e}")))?;
    info!("Scoring manual nutrition from {}", path.display());
    let report = offline_pipeline()?.analyze_manual(entry).await;
    print_report(&report, summary)
}

/// Print the effective scoring configuration
pub fn rules() -> AppResult<()> {
    print_json(&ScoringRulesResponse::describe(ScoringConfig::global()))
}
