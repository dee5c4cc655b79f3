// ABOUTME: Configuration module for the FoodScore server and CLI
// ABOUTME: Server settings come from the environment; scoring thresholds live in the intelligence crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration for `FoodScore`
//!
//! - **environment**: HTTP listener, collaborator endpoints, timeouts and history size
//! - scoring thresholds: [`ScoringConfig`], re-exported from `foodscore-intelligence`

/// Environment and server configuration
pub mod environment;

pub use environment::ServerConfig;
pub use foodscore_intelligence::ScoringConfig;
