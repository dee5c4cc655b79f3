// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Nutrition guideline thresholds and measurement conversion factors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single large file.

/// Dietary guideline thresholds (WHO, FDA, FSSAI) expressed per 100 g / 100 ml
pub mod guidelines;
/// Unit conversion and household measure constants
pub mod units;
