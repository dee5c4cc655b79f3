// ABOUTME: Barcode lookup command for foodscore-cli
// ABOUTME: Queries OpenFoodFacts or the demo catalogue and scores the product
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use foodscore::config::ServerConfig;
use foodscore::errors::AppResult;
use foodscore::pipeline::{AnalysisPipeline, AnalysisRequest};
use tracing::{info, warn};

use crate::helpers::display::print_report;

/// Look up `barcode` and print the scored report
pub async fn lookup(barcode: &str, demo: bool, summary: bool) -> AppResult<()> {
    let request = AnalysisRequest::from_parts(None, Some(barcode), None)?;

    let mut config = ServerConfig::from_env()?;
    config.demo_mode |= demo;
    info!(
        "Looking up {barcode} in {}",
        if config.demo_mode { "demo catalogue" } else { "OpenFoodFacts" }
    );

    let pipeline = AnalysisPipeline::from_config(&config)?;
    let report = pipeline.analyze(request).await;
    for warning in &report.warnings {
        warn!("{warning}");
    }
    print_report(&report, summary)
}
