// ABOUTME: Unit conversion constants for nutrient amounts and serving sizes
// ABOUTME: Mass scaling factors and household measure equivalents in grams or millilitres
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Milligrams per gram
pub const MG_PER_G: f64 = 1_000.0;
/// Micrograms per milligram
pub const MCG_PER_MG: f64 = 1_000.0;

/// Grams per avoirdupois ounce
pub const GRAMS_PER_OUNCE: f64 = 28.35;
/// Millilitres per US fluid ounce
pub const ML_PER_FLUID_OUNCE: f64 = 29.57;
/// Millilitres per US cup (nutrition labelling)
pub const ML_PER_CUP: f64 = 240.0;
/// Millilitres per tablespoon
pub const ML_PER_TABLESPOON: f64 = 15.0;
/// Millilitres per teaspoon
pub const ML_PER_TEASPOON: f64 = 5.0;
/// Millilitres per litre
pub const ML_PER_LITRE: f64 = 1_000.0;
/// Millilitres per centilitre
pub const ML_PER_CENTILITRE: f64 = 10.0;
/// Millilitres per decilitre
pub const ML_PER_DECILITRE: f64 = 100.0;
/// Grams per kilogram
pub const GRAMS_PER_KG: f64 = 1_000.0;

/// Reference quantity that every normalized record is expressed against
pub const REFERENCE_QUANTITY: f64 = 100.0;
