// ABOUTME: Collaborator contracts for OCR, barcode decoding, product databases and medical analysis
// ABOUTME: Implementations return AppResult and the pipeline absorbs their failures
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! External collaborators
//!
//! Every collaborator sits behind an `async_trait` so the pipeline can be
//! driven by real services, the demo catalogue, or scripted test doubles.
//!
//! - [`TextRecognizer`]: label photo to raw text
//! - [`BarcodeDecoder`]: label photo to a barcode
//! - [`ProductDatabase`]: barcode or name to a product fragment
//! - [`MedicalAnalyst`]: merged product to advisory insight

/// Built-in demo product catalogue
pub mod demo;
/// GTIN/EAN barcode validation and extraction from text
pub mod gtin;
/// `OpenFoodFacts` product database client
pub mod openfoodfacts;

pub use demo::DemoProductDatabase;
pub use openfoodfacts::{OpenFoodFactsClient, OpenFoodFactsConfig};

use async_trait::async_trait;
use foodscore_core::models::{
    IngredientList, MedicalInsight, Nutrient, NutritionRecord, SourceFragment,
};
use foodscore_intelligence::MergedProduct;

use crate::errors::AppResult;

/// Recognizes printed text in a label photo
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Raw recognized text, lines separated by `\n`
    async fn recognize(&self, image: &[u8]) -> AppResult<String>;
}

/// Decodes a barcode from a label photo
#[async_trait]
pub trait BarcodeDecoder: Send + Sync {
    /// Check-digit-valid barcode, or `None` when none is readable
    async fn decode(&self, image: &[u8]) -> AppResult<Option<String>>;
}

/// Structured product database
#[async_trait]
pub trait ProductDatabase: Send + Sync {
    /// Name used in logs and warnings
    fn name(&self) -> &'static str;

    /// Look up a product by barcode; `None` when the database has no record
    async fn lookup_barcode(&self, barcode: &str) -> AppResult<Option<SourceFragment>>;

    /// Best match for a free-text product name
    async fn search_by_name(&self, name: &str) -> AppResult<Option<SourceFragment>>;
}

/// Product facts handed to the medical analyst
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    /// Product name
    pub product_name: Option<String>,
    /// Brand name
    pub brand: Option<String>,
    /// Merged nutrition, per 100 g/ml where normalization succeeded
    pub nutrition: NutritionRecord,
    /// Merged ingredients
    pub ingredients: IngredientList,
    /// Nutrients no source reported
    pub unknown: Vec<Nutrient>,
}

impl AnalysisContext {
    /// Build the context from a preliminary merge
    #[must_use]
    pub fn from_merged(merged: &MergedProduct) -> Self {
        Self {
            product_name: merged.product.product_name.clone(),
            brand: merged.product.brand.clone(),
            nutrition: merged.product.nutrition.clone(),
            ingredients: merged.product.ingredients.clone(),
            unknown: merged.unknown.clone(),
        }
    }

    /// True when there is nothing to analyze
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.product_name.is_none() && self.nutrition.is_empty() && self.ingredients.is_empty()
    }
}

/// Result of a medical analysis
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicalAnalysis {
    /// Advisory insight
    pub insight: MedicalInsight,
    /// Estimated values for nutrients no measured source reported
    pub nutrition_estimate: Option<NutritionRecord>,
}

/// Produces advisory insight for a product
#[async_trait]
pub trait MedicalAnalyst: Send + Sync {
    /// Analyze a product
    async fn analyze(&self, context: &AnalysisContext) -> AppResult<MedicalAnalysis>;
}
