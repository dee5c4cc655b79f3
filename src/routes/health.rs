// ABOUTME: Health check route handler reporting service status and configured collaborators
// ABOUTME: Lets operators see whether OCR, product lookup and the medical analyst are wired
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Health check routes for service monitoring

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::server::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .with_state(resources)
    }

    /// Handle GET /health
    async fn handle_health(State(resources): State<Arc<ServerResources>>) -> Json<Value> {
        let history_entries = resources.history.read().await.len();
        Json(json!({
            "status": "healthy",
            "service": "foodscore",
            "version": env!("CARGO_PKG_VERSION"),
            "timestamp": Utc::now().to_rfc3339(),
            "demo_mode": resources.config.demo_mode,
            "collaborators": resources.pipeline.collaborators(),
            "history_entries": history_entries,
        }))
    }
}
