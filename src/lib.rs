// ABOUTME: Main library entry point for the FoodScore nutrition scoring service
// ABOUTME: Wires collaborators, the analysis pipeline, history and HTTP routes together
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FoodScore`
//!
//! Turns noisy food label data into a normalized nutrition record and an
//! explainable 0-100 health score.
//!
//! ## Features
//!
//! - **Label photos**: OCR and barcode decoding through a vision model
//! - **Product lookup**: `OpenFoodFacts` by barcode or name, or a demo catalogue
//! - **Medical analysis**: optional advisory insight from a chat model
//! - **Explainable scoring**: every deduction and bonus cites its guideline
//!
//! ## Architecture
//!
//! The deterministic stages (parse, normalize, merge, score) live in
//! `foodscore-intelligence`. This crate adds the I/O around them:
//! - **external**: collaborator traits, `OpenFoodFacts` and the demo catalogue
//! - **llm**: OpenAI-compatible chat provider, vision OCR, medical analyst
//! - **pipeline**: orchestration with per-collaborator timeouts
//! - **history**: bounded log of recent analyses
//! - **routes** / **server**: axum HTTP surface
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use foodscore::pipeline::{AnalysisPipeline, AnalysisRequest};
//! use foodscore::external::DemoProductDatabase;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> foodscore::errors::AppResult<()> {
//!     let pipeline = AnalysisPipeline::new(Duration::from_secs(5))
//!         .with_database(Arc::new(DemoProductDatabase));
//!     let request = AnalysisRequest::from_parts(None, Some("5449000000996"), None)?;
//!     let report = pipeline.analyze(request).await;
//!     let name = report.product_name.unwrap_or_default();
//!     println!("{name} scored {} ({})", report.score, report.band);
//!     Ok(())
//! }
//! ```

/// Server and scoring configuration
pub mod config;

/// Unified error handling
pub mod errors;

/// External collaborators: OCR, barcode decoding, product databases, medical analysis
pub mod external;

/// Bounded history of analysis reports
pub mod history;

/// Chat model provider, prompts, vision OCR and medical analyst
pub mod llm;

/// Structured logging setup
pub mod logging;

/// Analysis pipeline orchestration
pub mod pipeline;

/// HTTP route handlers
pub mod routes;

/// HTTP server assembly
pub mod server;
