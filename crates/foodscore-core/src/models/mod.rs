// ABOUTME: Core data models for the FoodScore nutrition engine
// ABOUTME: Re-exports nutrition, product, provenance, insight and band types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Data Models
//!
//! Shared data structures that flow through the parse, normalize, merge and
//! score pipeline.
//!
//! ## Design Principles
//!
//! - **Unknown is not zero**: a missing nutrient is absent from the record and
//!   only becomes `0.0` at the output boundary, where it is listed as unverified
//! - **Tagged provenance**: every value carries its `SourceKind`
//! - **Serializable**: all models support JSON serialization for the HTTP API

mod band;
mod insight;
mod nutrition;
mod product;
mod source;

pub use band::HealthBand;
pub use insight::{MedicalInsight, NutrientRisk};
pub use nutrition::{
    Basis, Nutrient, NutrientValue, NutritionFacts, NutritionRecord, Unit, ValueFlags,
};
pub use product::{IngredientList, ProductRecord, SourceFragment};
pub use source::SourceKind;
