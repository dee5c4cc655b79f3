// ABOUTME: Shared test utilities, fixtures and scripted collaborators for integration tests
// ABOUTME: Provides quiet logging setup, nutrition fixtures and test doubles for every collaborator trait
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
//! Shared test utilities for `foodscore`
//!
//! Every collaborator trait has a scripted double here so pipeline and route
//! tests never touch the network.

use std::env;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;
use foodscore::errors::{AppError, AppResult};
use foodscore::external::{
    AnalysisContext, BarcodeDecoder, DemoProductDatabase, MedicalAnalysis, MedicalAnalyst,
    ProductDatabase, TextRecognizer,
};
use foodscore::llm::{ChatRequest, ChatResponse, LlmProvider};
use foodscore::pipeline::AnalysisPipeline;
use foodscore_core::models::{
    Basis, Nutrient, NutrientValue, NutritionRecord, SourceFragment, SourceKind,
};
use tokio::time::sleep;
use tracing::Level;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        // TEST_LOG controls the level; quiet by default
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => Level::TRACE,
            Ok("DEBUG") => Level::DEBUG,
            Ok("INFO") => Level::INFO,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Timeout used by test pipelines
pub const TEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Pipeline backed by the demo catalogue
pub fn demo_pipeline() -> AnalysisPipeline {
    init_test_logging();
    AnalysisPipeline::new(TEST_TIMEOUT).with_database(Arc::new(DemoProductDatabase))
}

// ============================================================================
// Nutrition fixtures
// ============================================================================

/// Build a record from `(nutrient, amount)` pairs in canonical units
pub fn record(
    basis: Basis,
    source: SourceKind,
    confidence: f64,
    values: &[(Nutrient, f64)],
) -> NutritionRecord {
    let mut record = NutritionRecord::new(basis);
    for &(nutrient, amount) in values {
        record.insert(
            nutrient,
            NutrientValue::new(amount, nutrient.canonical_unit(), confidence, source),
        );
    }
    record
}

/// Cola per 100 ml: 10.6 g added sugar, no fiber
pub fn cola_record() -> NutritionRecord {
    record(
        Basis::Per100Milliliters,
        SourceKind::BarcodeDatabase,
        1.0,
        &[
            (Nutrient::Calories, 42.0),
            (Nutrient::Sodium, 1.0),
            (Nutrient::SaturatedFat, 0.0),
            (Nutrient::TransFat, 0.0),
            (Nutrient::DietaryFiber, 0.0),
            (Nutrient::TotalSugars, 10.6),
            (Nutrient::AddedSugars, 10.6),
            (Nutrient::Protein, 0.0),
        ],
    )
}

/// Whole-grain bread per 100 g with salty dough
pub fn bread_record() -> NutritionRecord {
    record(
        Basis::Per100Grams,
        SourceKind::Manual,
        1.0,
        &[
            (Nutrient::DietaryFiber, 7.0),
            (Nutrient::AddedSugars, 2.0),
            (Nutrient::Sodium, 681.0),
            (Nutrient::Protein, 13.4),
        ],
    )
}

/// Fragment with the given source and nutrition
pub fn fragment(source: SourceKind, nutrition: NutritionRecord) -> SourceFragment {
    let mut fragment = SourceFragment::new(source);
    fragment.nutrition = nutrition;
    fragment
}

// ============================================================================
// Scripted collaborators
// ============================================================================

/// Recognizer returning fixed text
pub struct StaticRecognizer(pub String);

#[async_trait]
impl TextRecognizer for StaticRecognizer {
    async fn recognize(&self, _image: &[u8]) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

/// Recognizer that always fails
pub struct FailingRecognizer;

#[async_trait]
impl TextRecognizer for FailingRecognizer {
    async fn recognize(&self, _image: &[u8]) -> AppResult<String> {
        Err(AppError::external_unavailable("Vision OCR", "service returned 503"))
    }
}

/// Decoder returning a fixed result
pub struct StaticBarcodeDecoder(pub Option<String>);

#[async_trait]
impl BarcodeDecoder for StaticBarcodeDecoder {
    async fn decode(&self, _image: &[u8]) -> AppResult<Option<String>> {
        Ok(self.0.clone())
    }
}

/// Database that answers after a delay, used to trip the pipeline timeout
pub struct SlowDatabase(pub Duration);

#[async_trait]
impl ProductDatabase for SlowDatabase {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn lookup_barcode(&self, barcode: &str) -> AppResult<Option<SourceFragment>> {
        sleep(self.0).await;
        DemoProductDatabase.lookup_barcode(barcode).await
    }

    async fn search_by_name(&self, name: &str) -> AppResult<Option<SourceFragment>> {
        sleep(self.0).await;
        DemoProductDatabase.search_by_name(name).await
    }
}

/// Database that always errors
pub struct FailingDatabase;

#[async_trait]
impl ProductDatabase for FailingDatabase {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn lookup_barcode(&self, _barcode: &str) -> AppResult<Option<SourceFragment>> {
        Err(AppError::external_service("OpenFoodFacts API", "HTTP 500"))
    }

    async fn search_by_name(&self, _name: &str) -> AppResult<Option<SourceFragment>> {
        Err(AppError::external_service("OpenFoodFacts API", "HTTP 500"))
    }
}

/// Analyst returning a scripted analysis and recording what it was asked
#[derive(Default)]
pub struct ScriptedAnalyst {
    pub analysis: MedicalAnalysis,
    pub calls: AtomicUsize,
    pub last_context: Mutex<Option<AnalysisContext>>,
}

impl ScriptedAnalyst {
    pub fn new(analysis: MedicalAnalysis) -> Self {
        Self {
            analysis,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MedicalAnalyst for ScriptedAnalyst {
    async fn analyze(&self, context: &AnalysisContext) -> AppResult<MedicalAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_context.lock().unwrap() = Some(context.clone());
        Ok(self.analysis.clone())
    }
}

/// Analyst that always fails
pub struct FailingAnalyst;

#[async_trait]
impl MedicalAnalyst for FailingAnalyst {
    async fn analyze(&self, _context: &AnalysisContext) -> AppResult<MedicalAnalysis> {
        Err(AppError::external_service("Medical analyst", "reply contained no usable analysis"))
    }
}

/// Chat provider replying with fixed content and keeping every request
pub struct ScriptedProvider {
    pub reply: String,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedProvider {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn last_request(&self) -> Option<ChatRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(ChatResponse {
            content: self.reply.clone(),
            model: "scripted-model".to_owned(),
            finish_reason: Some("stop".to_owned()),
        })
    }
}
