// ABOUTME: Re-exports command modules for foodscore-cli
// ABOUTME: Provides access to scoring and barcode lookup commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod lookup;
pub mod score;
