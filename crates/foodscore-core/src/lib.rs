// ABOUTME: Core types and constants for the FoodScore nutrition engine
// ABOUTME: Foundation crate with error handling, nutrition models, and constants
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # `FoodScore` Core
//!
//! Foundation crate providing shared types and constants for the `FoodScore`
//! nutrition engine. This crate is designed to change infrequently, enabling
//! incremental compilation benefits in the workspace.
//!
//! ## Modules
//!
//! - **errors**: Unified error handling with `AppError` and `ErrorCode`
//! - **constants**: Nutrition guideline constants and unit conversion factors
//! - **models**: Nutrient records, product records, medical insights, and score results

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (`NutritionRecord`, `ProductRecord`, `ScoreResult`, etc.)
pub mod models;
