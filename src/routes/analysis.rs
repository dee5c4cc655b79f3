// ABOUTME: Analysis route handlers for label images, barcodes, product names and manual nutrition
// ABOUTME: Every successful analysis is appended to the server history before it is returned
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Analysis routes
//!
//! Only malformed requests are rejected here. Anything that goes wrong inside
//! the pipeline (unreadable label, unknown barcode, collaborator outage)
//! still produces a report with warnings.

use std::sync::Arc;

use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use foodscore_core::constants::guidelines::{BAND_EXCELLENT_MIN, BAND_GOOD_MIN, BAND_MODERATE_MIN};
use foodscore_intelligence::explanations::ScoringRule;
use foodscore_intelligence::ScoringConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{AppError, AppResult};
use crate::pipeline::{AnalysisReport, AnalysisRequest, ManualEntry};
use crate::server::ServerResources;

/// Body of POST /search-name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchNameRequest {
    /// Product name to search for
    pub name: String,
}

/// One entry of GET /scoring-rules
#[derive(Debug, Clone, Serialize)]
pub struct RuleDescription {
    /// Rule identifier
    pub rule: ScoringRule,
    /// Guideline the rule follows
    pub guideline: &'static str,
    /// Recommendation shown when the rule fires
    pub recommendation: Option<&'static str>,
}

/// Band lower bounds
#[derive(Debug, Clone, Serialize)]
pub struct BandCutpoints {
    /// Minimum score for Excellent
    pub excellent: u8,
    /// Minimum score for Good
    pub good: u8,
    /// Minimum score for Moderate
    pub moderate: u8,
}

/// Body of GET /scoring-rules
#[derive(Debug, Clone, Serialize)]
pub struct ScoringRulesResponse {
    /// Thresholds, rates and caps in effect
    pub config: ScoringConfig,
    /// Band cutpoints
    pub bands: BandCutpoints,
    /// Every rule with its guideline source
    pub rules: Vec<RuleDescription>,
}

impl ScoringRulesResponse {
    /// Describe a scoring configuration
    #[must_use]
    pub fn describe(config: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
            bands: BandCutpoints {
                excellent: BAND_EXCELLENT_MIN,
                good: BAND_GOOD_MIN,
                moderate: BAND_MODERATE_MIN,
            },
            rules: ScoringRule::ALL
                .into_iter()
                .map(|rule| RuleDescription {
                    rule,
                    guideline: rule.guideline(),
                    recommendation: rule.recommendation(),
                })
                .collect(),
        }
    }
}

/// Analysis routes handler
pub struct AnalysisRoutes;

impl AnalysisRoutes {
    /// Create all analysis routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/analyze-image", post(Self::handle_analyze_image))
            .route("/search-barcode/:barcode", get(Self::handle_search_barcode))
            .route("/search-name", post(Self::handle_search_name))
            .route("/health-score", post(Self::handle_health_score))
            .route("/scoring-rules", get(Self::handle_scoring_rules))
            .with_state(resources)
    }

    /// Handle POST /analyze-image - multipart upload with an `image` field
    ///
    /// Optional `barcode` and `product_name` text fields are used when no
    /// image is attached.
    async fn handle_analyze_image(
        State(resources): State<Arc<ServerResources>>,
        mut multipart: Multipart,
    ) -> AppResult<Json<AnalysisReport>> {
        let mut image: Option<Bytes> = None;
        let mut barcode: Option<String> = None;
        let mut product_name: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::invalid_input(format!("Malformed multipart body: {e}")))?
        {
            let name = field.name().map(ToOwned::to_owned);
            match name.as_deref() {
                Some("image" | "file") => {
                    image = Some(field.bytes().await.map_err(|e| {
                        AppError::invalid_input(format!("Failed to read image upload: {e}"))
                    })?);
                }
                Some("barcode") => barcode = Some(Self::read_text(field).await?),
                Some("product_name" | "name") => product_name = Some(Self::read_text(field).await?),
                other => debug!(field = ?other, "Ignoring multipart field"),
            }
        }

        let request =
            AnalysisRequest::from_parts(image, barcode.as_deref(), product_name.as_deref())?;
        let report = resources.pipeline.analyze(request).await;
        Ok(Json(resources.record(report).await))
    }

    async fn read_text(field: Field<'_>) -> AppResult<String> {
        field
            .text()
            .await
            .map_err(|e| AppError::invalid_input(format!("Malformed multipart field: {e}")))
    }

    /// Handle GET /search-barcode/:barcode
    async fn handle_search_barcode(
        State(resources): State<Arc<ServerResources>>,
        Path(barcode): Path<String>,
    ) -> AppResult<Json<AnalysisReport>> {
        let request = AnalysisRequest::from_parts(None, Some(&barcode), None)?;
        let report = resources.pipeline.analyze(request).await;
        Ok(Json(resources.record(report).await))
    }

    /// Handle POST /search-name
    async fn handle_search_name(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<SearchNameRequest>,
    ) -> AppResult<Json<AnalysisReport>> {
        let request = AnalysisRequest::from_parts(None, None, Some(&body.name))?;
        let report = resources.pipeline.analyze(request).await;
        Ok(Json(resources.record(report).await))
    }

    /// Handle POST /health-score - score caller-supplied nutrition
    async fn handle_health_score(
        State(resources): State<Arc<ServerResources>>,
        Json(entry): Json<ManualEntry>,
    ) -> AppResult<Json<AnalysisReport>> {
        if entry.nutrition.is_empty() && entry.ingredients.is_empty() {
            return Err(AppError::invalid_input(
                "Provide nutrition values or an ingredient list",
            ));
        }
        let report = resources.pipeline.analyze_manual(entry).await;
        Ok(Json(resources.record(report).await))
    }

    /// Handle GET /scoring-rules
    async fn handle_scoring_rules(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<ScoringRulesResponse> {
        Json(ScoringRulesResponse::describe(
            resources.pipeline.scoring_config(),
        ))
    }
}
