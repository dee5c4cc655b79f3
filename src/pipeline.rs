// ABOUTME: Analysis pipeline orchestrating OCR, barcode lookup, parsing, normalization, merging and scoring
// ABOUTME: Collaborator calls are time-boxed and their failures degrade the report instead of failing it
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Analysis Pipeline
//!
//! One request flows through these stages:
//!
//! 1. Acquire fragments: OCR and barcode decoding for images (concurrently),
//!    product database lookups for barcodes and names
//! 2. Parse recognized label text into an OCR fragment
//! 3. Normalize every fragment to per 100 g/ml
//! 4. Preliminary merge, handed to the medical analyst
//! 5. Final merge including the analyst's estimates and insight
//! 6. Score and assemble the [`AnalysisReport`]
//!
//! The pipeline holds no mutable state; one instance is shared behind an `Arc`.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use foodscore_core::models::{
    Basis, HealthBand, IngredientList, Nutrient, NutrientValue, NutritionFacts, NutritionRecord,
    SourceFragment, SourceKind,
};
use foodscore_intelligence::{
    merge, normalize, parse_label, score_with_config, MergedProduct, ScoreResult, ScoringConfig,
};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::config::ServerConfig;
use crate::errors::{AppError, AppResult};
use crate::external::{
    gtin, AnalysisContext, BarcodeDecoder, DemoProductDatabase, MedicalAnalysis, MedicalAnalyst,
    OpenFoodFactsClient, ProductDatabase, TextRecognizer,
};
use crate::llm::{LlmMedicalAnalyst, OpenAiCompatibleProvider, VisionOcrClient};

/// Confidence of caller-supplied values
const MANUAL_CONFIDENCE: f64 = 1.0;

/// What the caller asked to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisRequest {
    /// Photo of a product label
    Image(Bytes),
    /// Barcode (EAN-8, UPC-A, EAN-13, GTIN-14)
    Barcode(String),
    /// Free-text product name
    ProductName(String),
}

impl AnalysisRequest {
    /// Build a request from optional parts, preferring image over barcode over name
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when nothing usable was supplied or the barcode
    /// fails its check digit.
    pub fn from_parts(
        image: Option<Bytes>,
        barcode: Option<&str>,
        product_name: Option<&str>,
    ) -> AppResult<Self> {
        if let Some(image) = image.filter(|i| !i.is_empty()) {
            return Ok(Self::Image(image));
        }
        if let Some(raw) = barcode.map(str::trim).filter(|b| !b.is_empty()) {
            return gtin::normalize(raw)
                .map(Self::Barcode)
                .ok_or_else(|| AppError::invalid_input(format!("Invalid barcode: {raw}")));
        }
        if let Some(name) = product_name.map(str::trim).filter(|n| !n.is_empty()) {
            return Ok(Self::ProductName(name.to_owned()));
        }
        Err(AppError::invalid_input(
            "Provide a label image, a barcode or a product name",
        ))
    }

    const fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => "image",
            Self::Barcode(_) => "barcode",
            Self::ProductName(_) => "product_name",
        }
    }
}

/// Nutrition supplied directly by the caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    /// Product name
    #[serde(default)]
    pub product_name: Option<String>,
    /// Brand
    #[serde(default)]
    pub brand: Option<String>,
    /// Barcode
    #[serde(default)]
    pub barcode: Option<String>,
    /// Nutrient amounts in canonical units, keyed by nutrient name
    #[serde(default)]
    pub nutrition: BTreeMap<String, f64>,
    /// Ingredients in label order
    #[serde(default)]
    pub ingredients: Vec<String>,
    /// Serving size the values refer to
    #[serde(default)]
    pub serving_size: Option<String>,
    /// Basis of the values; per serving when a serving size is given, per 100 g otherwise
    #[serde(default)]
    pub basis: Option<Basis>,
}

impl ManualEntry {
    /// Convert into a manual source fragment, returning warnings for ignored keys
    #[must_use]
    pub fn into_fragment(self) -> (SourceFragment, Vec<String>) {
        let basis = self.basis.unwrap_or(if self.serving_size.is_some() {
            Basis::PerServing
        } else {
            Basis::Per100Grams
        });

        let mut warnings = Vec::new();
        let mut nutrition = NutritionRecord::new(basis);
        for (key, amount) in &self.nutrition {
            match Nutrient::from_str_lossy(key) {
                Some(nutrient) => nutrition.insert(
                    nutrient,
                    NutrientValue::new(
                        *amount,
                        nutrient.canonical_unit(),
                        MANUAL_CONFIDENCE,
                        SourceKind::Manual,
                    ),
                ),
                None => warnings.push(format!("Unknown nutrient '{key}' ignored")),
            }
        }

        let mut fragment = SourceFragment::new(SourceKind::Manual);
        fragment.product_name = self.product_name;
        fragment.brand = self.brand;
        fragment.barcode = self.barcode;
        fragment.serving_size = self.serving_size;
        fragment.nutrition = nutrition;
        fragment.ingredients = self.ingredients.into_iter().collect::<IngredientList>();
        (fragment, warnings)
    }
}

/// Final, serializable outcome of one analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Product name
    pub product_name: Option<String>,
    /// Brand
    pub brand: Option<String>,
    /// Barcode
    pub barcode: Option<String>,
    /// Per-100 nutrition; unknown nutrients are 0 and listed in `unverified`
    pub nutrition: NutritionFacts,
    /// Ingredients in label order
    pub ingredients: IngredientList,
    /// Serving size as printed
    pub serving_size: Option<String>,
    /// Most trusted contributing source
    pub source: Option<SourceKind>,
    /// Every contributing source, most trusted first
    pub sources: Vec<SourceKind>,
    /// Health score, 0-100
    pub score: u8,
    /// Band of the score
    pub band: HealthBand,
    /// Ordered explanations
    pub explanations: Vec<String>,
    /// Recommendations
    pub recommendations: Vec<String>,
    /// Guideline sources
    pub evidence: Vec<String>,
    /// Nutrients that are unknown, estimated or not normalized
    pub unverified: Vec<Nutrient>,
    /// Data quality and collaborator warnings
    pub warnings: Vec<String>,
}

impl AnalysisReport {
    fn assemble(merged: MergedProduct, result: &ScoreResult, notes: Notes) -> Self {
        let (nutrition, unverified) = NutritionFacts::from_record(&merged.product.nutrition);

        let mut explanations = result.explanations().to_vec();
        explanations.extend(notes.degraded.iter().map(|d| format!("Reduced confidence: {d}")));

        let product = merged.product;
        Self {
            product_name: product.product_name.or(notes.product_name_hint),
            brand: product.brand,
            barcode: product.barcode.or(notes.barcode_hint),
            nutrition,
            ingredients: product.ingredients,
            serving_size: product.serving_size,
            source: product.source,
            sources: merged.contributing_sources,
            score: result.score(),
            band: result.band(),
            explanations,
            recommendations: result.recommendations().to_vec(),
            evidence: result.evidence().to_vec(),
            unverified,
            warnings: notes.warnings,
        }
    }
}

/// Warnings and identity hints gathered while running one request
#[derive(Debug, Default)]
struct Notes {
    warnings: Vec<String>,
    degraded: Vec<String>,
    barcode_hint: Option<String>,
    product_name_hint: Option<String>,
}

impl Notes {
    fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Label text yielded no nutrient; scored, but with reduced confidence
    fn extraction_failed(&mut self, warning: &str) {
        self.degraded.push("Label text unreadable".to_owned());
        self.warnings.push(warning.to_owned());
    }

    fn collaborator_failed(&mut self, failure: CollaboratorFailure) {
        self.degraded.push(format!("{} unavailable", failure.collaborator));
        self.warnings.push(failure.to_string());
    }
}

/// A collaborator call that errored or timed out
#[derive(Debug)]
struct CollaboratorFailure {
    collaborator: &'static str,
    reason: String,
}

impl fmt::Display for CollaboratorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} unavailable: {}", self.collaborator, self.reason)
    }
}

/// Stateless analysis pipeline with pluggable collaborators
pub struct AnalysisPipeline {
    recognizer: Option<Arc<dyn TextRecognizer>>,
    barcode_decoder: Option<Arc<dyn BarcodeDecoder>>,
    database: Option<Arc<dyn ProductDatabase>>,
    analyst: Option<Arc<dyn MedicalAnalyst>>,
    timeout: Duration,
    scoring: ScoringConfig,
}

impl AnalysisPipeline {
    /// Pipeline with no collaborators and the process-wide scoring configuration
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            recognizer: None,
            barcode_decoder: None,
            database: None,
            analyst: None,
            timeout,
            scoring: ScoringConfig::global().clone(),
        }
    }

    /// Build the production pipeline from server configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be created
    pub fn from_config(config: &ServerConfig) -> AppResult<Self> {
        let mut pipeline = Self::new(config.collaborator_timeout());

        pipeline = if config.demo_mode {
            pipeline.with_database(Arc::new(DemoProductDatabase))
        } else {
            pipeline.with_database(Arc::new(OpenFoodFactsClient::new(
                config.openfoodfacts.clone(),
            )?))
        };

        if let Some(llm) = &config.llm {
            let provider = Arc::new(OpenAiCompatibleProvider::new(llm.clone())?);
            pipeline = pipeline.with_analyst(Arc::new(LlmMedicalAnalyst::new(provider)));
        }
        if let Some(ocr) = &config.ocr {
            let provider = Arc::new(OpenAiCompatibleProvider::new(ocr.clone())?);
            let vision = Arc::new(VisionOcrClient::new(provider));
            pipeline = pipeline
                .with_recognizer(vision.clone())
                .with_barcode_decoder(vision);
        }
        Ok(pipeline)
    }

    /// Set the label text recognizer
    #[must_use]
    pub fn with_recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Set the image barcode decoder
    #[must_use]
    pub fn with_barcode_decoder(mut self, decoder: Arc<dyn BarcodeDecoder>) -> Self {
        self.barcode_decoder = Some(decoder);
        self
    }

    /// Set the product database
    #[must_use]
    pub fn with_database(mut self, database: Arc<dyn ProductDatabase>) -> Self {
        self.database = Some(database);
        self
    }

    /// Set the medical analyst
    #[must_use]
    pub fn with_analyst(mut self, analyst: Arc<dyn MedicalAnalyst>) -> Self {
        self.analyst = Some(analyst);
        self
    }

    /// Use an explicit scoring configuration
    #[must_use]
    pub fn with_scoring_config(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Scoring configuration in effect
    #[must_use]
    pub const fn scoring_config(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Which collaborators are wired, for health reporting
    #[must_use]
    pub fn collaborators(&self) -> BTreeMap<&'static str, bool> {
        BTreeMap::from([
            ("ocr", self.recognizer.is_some()),
            ("barcode_decoder", self.barcode_decoder.is_some()),
            ("product_database", self.database.is_some()),
            ("medical_analyst", self.analyst.is_some()),
        ])
    }

    /// Run one analysis request
    ///
    /// Collaborator failures never fail the request; they surface as warnings
    /// and reduced-confidence explanations.
    #[instrument(skip(self, request), fields(request = request.kind()))]
    pub async fn analyze(&self, request: AnalysisRequest) -> AnalysisReport {
        let mut notes = Notes::default();
        let mut fragments = Vec::new();

        match request {
            AnalysisRequest::Image(image) => {
                self.acquire_from_image(&image, &mut fragments, &mut notes)
                    .await;
            }
            AnalysisRequest::Barcode(barcode) => {
                notes.barcode_hint = Some(barcode.clone());
                if let Some(fragment) = self.lookup_barcode(&barcode, &mut notes).await {
                    fragments.push(fragment);
                }
            }
            AnalysisRequest::ProductName(name) => {
                notes.product_name_hint = Some(name.clone());
                if let Some(fragment) = self.search_name(&name, &mut notes).await {
                    fragments.push(fragment);
                }
            }
        }

        self.complete(fragments, notes).await
    }

    /// Score caller-supplied nutrition as a manual source
    #[instrument(skip(self, entry))]
    pub async fn analyze_manual(&self, entry: ManualEntry) -> AnalysisReport {
        let (fragment, warnings) = entry.into_fragment();
        let notes = Notes {
            warnings,
            ..Notes::default()
        };
        self.complete(vec![fragment], notes).await
    }

    /// Score recognized label text without calling any collaborator except the analyst
    #[instrument(skip(self, text), fields(chars = text.len()))]
    pub async fn analyze_label_text(&self, text: &str) -> AnalysisReport {
        let mut notes = Notes::default();
        let parsed = parse_label(text);
        let fragment = parsed.into_fragment();
        if fragment.nutrition.is_empty() {
            notes.extraction_failed("No nutrition facts recognized in the label text");
        }
        self.complete(vec![fragment], notes).await
    }

    async fn acquire_from_image(
        &self,
        image: &[u8],
        fragments: &mut Vec<SourceFragment>,
        notes: &mut Notes,
    ) {
        let (text, decoded) = tokio::join!(
            self.guarded("Label OCR", self.recognizer.as_deref(), |r| r.recognize(image)),
            self.guarded("Barcode decoder", self.barcode_decoder.as_deref(), |d| d
                .decode(image)),
        );

        let mut barcode = match decoded {
            Ok(found) => found.flatten(),
            Err(failure) => {
                notes.collaborator_failed(failure);
                None
            }
        };

        match text {
            Ok(Some(text)) => {
                let parsed = parse_label(&text);
                if barcode.is_none() {
                    barcode = gtin::find_in_text(&text);
                }
                let fragment = parsed.into_fragment();
                if fragment.nutrition.is_empty() {
                    notes.extraction_failed("No nutrition facts recognized in the image");
                }
                fragments.push(fragment);
            }
            Ok(None) => notes.warn("Label OCR is not configured"),
            Err(failure) => notes.collaborator_failed(failure),
        }

        if let Some(barcode) = barcode {
            debug!(%barcode, "Barcode found in image");
            notes.barcode_hint = Some(barcode.clone());
            if let Some(fragment) = self.lookup_barcode(&barcode, notes).await {
                fragments.push(fragment);
            }
        }
    }

    async fn lookup_barcode(&self, barcode: &str, notes: &mut Notes) -> Option<SourceFragment> {
        match self
            .guarded("Product database", self.database.as_deref(), |db| {
                db.lookup_barcode(barcode)
            })
            .await
        {
            Ok(Some(Some(mut fragment))) => {
                fragment.barcode.get_or_insert_with(|| barcode.to_owned());
                Some(fragment)
            }
            Ok(Some(None)) => {
                info!(%barcode, "Barcode not found in product database");
                notes.warn(format!("Product {barcode} not found in product database"));
                None
            }
            Ok(None) => {
                notes.warn("Product database is not configured");
                None
            }
            Err(failure) => {
                notes.collaborator_failed(failure);
                None
            }
        }
    }

    async fn search_name(&self, name: &str, notes: &mut Notes) -> Option<SourceFragment> {
        match self
            .guarded("Product database", self.database.as_deref(), |db| {
                db.search_by_name(name)
            })
            .await
        {
            Ok(Some(Some(fragment))) => Some(fragment),
            Ok(Some(None)) => {
                info!(%name, "No product matched name");
                notes.warn(format!("No product named '{name}' found in product database"));
                None
            }
            Ok(None) => {
                notes.warn("Product database is not configured");
                None
            }
            Err(failure) => {
                notes.collaborator_failed(failure);
                None
            }
        }
    }

    /// Normalize, merge, consult the analyst, merge again and score
    async fn complete(&self, fragments: Vec<SourceFragment>, mut notes: Notes) -> AnalysisReport {
        let mut fragments: Vec<SourceFragment> = fragments
            .into_iter()
            .map(|mut fragment| {
                let outcome = normalize(&fragment.nutrition, fragment.serving_size.as_deref());
                fragment.nutrition = outcome.record;
                notes.warnings.extend(outcome.warnings);
                fragment
            })
            .collect();

        let preliminary = merge(fragments.clone(), None);
        let analysis = self.consult_analyst(&preliminary, &mut notes).await;

        let insight = analysis.map(|analysis| {
            if let Some(estimate) = analysis.nutrition_estimate {
                let mut fragment = SourceFragment::new(SourceKind::Llm);
                fragment.nutrition = estimate;
                fragments.push(fragment);
            }
            analysis.insight
        });

        let merged = merge(fragments, insight.filter(|i| !i.is_empty()));
        notes.warnings.extend(merged.warnings.iter().cloned());
        let result = score_with_config(
            &merged.product.nutrition,
            &merged.product.ingredients,
            merged.insight.as_ref(),
            &self.scoring,
        );

        info!(
            score = result.score(),
            band = %result.band(),
            sources = ?merged.contributing_sources,
            warnings = notes.warnings.len(),
            "Analysis complete"
        );
        AnalysisReport::assemble(merged, &result, notes)
    }

    async fn consult_analyst(
        &self,
        preliminary: &MergedProduct,
        notes: &mut Notes,
    ) -> Option<MedicalAnalysis> {
        let context = AnalysisContext::from_merged(preliminary);
        if context.is_empty() {
            return None;
        }
        match self
            .guarded("Medical analyst", self.analyst.as_deref(), |a| {
                a.analyze(&context)
            })
            .await
        {
            Ok(analysis) => analysis,
            Err(failure) => {
                notes.collaborator_failed(failure);
                None
            }
        }
    }

    /// Run a collaborator call under the timeout
    ///
    /// `Ok(None)` means the collaborator is not configured.
    async fn guarded<'a, C, T, F, Fut>(
        &self,
        collaborator: &'static str,
        target: Option<&'a C>,
        call: F,
    ) -> Result<Option<T>, CollaboratorFailure>
    where
        C: ?Sized,
        F: FnOnce(&'a C) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let Some(target) = target else {
            return Ok(None);
        };
        match timeout(self.timeout, call(target)).await {
            Ok(Ok(value)) => Ok(Some(value)),
            Ok(Err(error)) => {
                warn!(collaborator, error = %error, "Collaborator failed");
                Err(CollaboratorFailure {
                    collaborator,
                    reason: error.message,
                })
            }
            Err(_) => {
                warn!(
                    collaborator,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "Collaborator timed out"
                );
                Err(CollaboratorFailure {
                    collaborator,
                    reason: format!("timed out after {:.1}s", self.timeout.as_secs_f64()),
                })
            }
        }
    }
}
