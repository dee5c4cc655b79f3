// ABOUTME: Error types for the FoodScore service, re-exported from the core crate
// ABOUTME: Keeps `crate::errors::AppError` as the single error path for the server and collaborators
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling
//!
//! `AppError` carries an [`ErrorCode`] that maps to an HTTP status, a message
//! safe to show to callers, and optional context. Handlers return
//! `AppResult<T>` and axum renders failures as [`ErrorResponse`] JSON.

pub use foodscore_core::errors::{
    AppError, AppResult, ErrorCode, ErrorContext, ErrorResponse, ErrorResponseDetails,
};
