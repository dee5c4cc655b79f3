// ABOUTME: History route handlers to list, fetch and delete stored analyses
// ABOUTME: Reads take the history read lock; deletions take the write lock
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::history::HistoryEntry;
use crate::server::ServerResources;

/// Body of GET /history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryListResponse {
    /// Entries, most recent first
    pub entries: Vec<HistoryEntry>,
    /// Number of entries
    pub total: usize,
    /// Maximum number of entries kept
    pub capacity: usize,
}

/// Body of DELETE /history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearHistoryResponse {
    /// Number of entries removed
    pub removed: usize,
}

/// History routes handler
pub struct HistoryRoutes;

impl HistoryRoutes {
    /// Create all history routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/history",
                get(Self::handle_list).delete(Self::handle_clear),
            )
            .route(
                "/history/:id",
                get(Self::handle_get).delete(Self::handle_delete),
            )
            .with_state(resources)
    }

    fn parse_id(raw: &str) -> AppResult<Uuid> {
        Uuid::parse_str(raw)
            .map_err(|_| AppError::invalid_input(format!("Invalid history id: {raw}")))
    }

    /// Handle GET /history
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<HistoryListResponse> {
        let history = resources.history.read().await;
        let entries = history.list();
        Json(HistoryListResponse {
            total: entries.len(),
            capacity: history.capacity(),
            entries,
        })
    }

    /// Handle GET /history/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<HistoryEntry>> {
        let id = Self::parse_id(&id)?;
        resources
            .history
            .read()
            .await
            .get(id)
            .cloned()
            .map(Json)
            .ok_or_else(|| AppError::not_found(format!("History entry {id}")))
    }

    /// Handle DELETE /history/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Response> {
        let id = Self::parse_id(&id)?;
        if !resources.history.write().await.delete(id) {
            return Err(AppError::not_found(format!("History entry {id}")));
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle DELETE /history
    async fn handle_clear(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<ClearHistoryResponse> {
        let removed = resources.history.write().await.clear();
        Json(ClearHistoryResponse { removed })
    }
}
