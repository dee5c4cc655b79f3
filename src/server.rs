// ABOUTME: HTTP server assembly: shared resources, middleware stack and listener lifecycle
// ABOUTME: Wires the analysis pipeline and history log into the axum router
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # HTTP Server
//!
//! [`ServerResources`] is the only state shared between requests. The
//! pipeline itself is stateless; the history log sits behind a `RwLock`.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request};
use axum::Router;
use http::{header::HeaderName, Method};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::RwLock;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span};

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::history::HistoryLog;
use crate::pipeline::{AnalysisPipeline, AnalysisReport};
use crate::routes::{AnalysisRoutes, HealthRoutes, HistoryRoutes};

/// State shared by every handler
pub struct ServerResources {
    /// Analysis pipeline
    pub pipeline: AnalysisPipeline,
    /// Recent analyses
    pub history: RwLock<HistoryLog>,
    /// Effective configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Bundle a pipeline with an empty history sized from `config`
    #[must_use]
    pub fn new(pipeline: AnalysisPipeline, config: ServerConfig) -> Self {
        Self {
            pipeline,
            history: RwLock::new(HistoryLog::new(config.history_capacity)),
            config,
        }
    }

    /// Build resources with the production collaborators
    ///
    /// # Errors
    ///
    /// Returns an error if a collaborator client cannot be created
    pub fn from_config(config: ServerConfig) -> AppResult<Self> {
        let pipeline = AnalysisPipeline::from_config(&config)?;
        Ok(Self::new(pipeline, config))
    }

    /// Append a report to history and hand it back for the response
    pub async fn record(&self, report: AnalysisReport) -> AnalysisReport {
        let entry = self.history.write().await.append(report);
        entry.report
    }
}

fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
}

/// Assemble every route with tracing, CORS and upload limits
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let max_upload = resources.config.max_upload_bytes;
    let trace_layer = TraceLayer::new_for_http().make_span_with(|request: &Request| {
        info_span!(
            "http_request",
            method = %request.method(),
            uri = %request.uri()
        )
    });

    Router::new()
        .merge(HealthRoutes::routes(resources.clone()))
        .merge(AnalysisRoutes::routes(resources.clone()))
        .merge(HistoryRoutes::routes(resources))
        .layer(DefaultBodyLimit::max(max_upload))
        .layer(RequestBodyLimitLayer::new(max_upload))
        .layer(setup_cors())
        .layer(trace_layer)
}

/// Bind and serve until Ctrl+C
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails
pub async fn run(resources: Arc<ServerResources>) -> AppResult<()> {
    let address = resources.config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {address}: {e}")))?;
    info!(%address, "FoodScore HTTP server listening");

    axum::serve(listener, build_router(resources))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("HTTP server error: {e}")))?;

    info!("FoodScore HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
