// ABOUTME: Route module organization for the FoodScore HTTP API
// ABOUTME: Groups analysis, history and health endpoints by domain
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for `FoodScore`
//!
//! Each domain module contains route definitions and thin handlers that
//! delegate to the analysis pipeline or the history log.

/// Label image, barcode, name and manual scoring routes
pub mod analysis;
/// Health check routes
pub mod health;
/// Analysis history routes
pub mod history;

/// Analysis route handlers
pub use analysis::AnalysisRoutes;
/// Product name search payload
pub use analysis::SearchNameRequest;
/// Health check route handlers
pub use health::HealthRoutes;
/// History route handlers
pub use history::HistoryRoutes;
