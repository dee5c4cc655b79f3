// ABOUTME: Dietary guideline thresholds used as scoring defaults
// ABOUTME: Values are per 100 g of solid food or per 100 ml of beverage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Free sugar level above which a solid food is considered high in sugar (g/100g).
///
/// Reference: WHO Guideline: Sugars intake for adults and children (2015)
pub const FREE_SUGAR_SOLID_G: f64 = 5.0;

/// Free sugar level above which a beverage is considered high in sugar (g/100ml)
pub const FREE_SUGAR_LIQUID_G: f64 = 2.5;

/// Sodium level above which a food is "high sodium" (mg/100g).
///
/// Reference: FDA daily value 2300 mg, "high" at 20% DV per typical serving
pub const SODIUM_HIGH_MG: f64 = 400.0;

/// Saturated fat level above which a food is "high saturated fat" (g/100g)
pub const SATURATED_FAT_HIGH_G: f64 = 5.0;

/// Fiber level that qualifies as a "source of fiber" (g/100g).
///
/// Reference: Codex Alimentarius nutrition claims, 3 g/100 g
pub const FIBER_SOURCE_G: f64 = 3.0;

/// Protein level above which protein earns a bonus (g/100g)
pub const PROTEIN_SOURCE_G: f64 = 5.0;

/// Ingredient count above which a product is considered highly processed
pub const MAX_SIMPLE_INGREDIENTS: usize = 15;

/// Lower bound (inclusive) of the Moderate band
pub const BAND_MODERATE_MIN: u8 = 40;

/// Lower bound (inclusive) of the Good band
pub const BAND_GOOD_MIN: u8 = 60;

/// Lower bound (inclusive) of the Excellent band
pub const BAND_EXCELLENT_MIN: u8 = 80;
