// ABOUTME: HTTP route tests for analysis, scoring rules, history and health endpoints
// ABOUTME: Runs requests against the assembled router backed by the demo catalogue
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::sync::Arc;

use axum::Router;
use common::demo_pipeline;
use foodscore::config::ServerConfig;
use foodscore::external::demo::DEMO_COLA_BARCODE;
use foodscore::history::HistoryEntry;
use foodscore::pipeline::AnalysisReport;
use foodscore::routes::history::{ClearHistoryResponse, HistoryListResponse};
use foodscore::server::{build_router, ServerResources};
use foodscore_core::models::{HealthBand, SourceKind};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};

const IMAGE: &[u8] = &[0xff, 0xd8, 0xff, 0xe0];

fn setup() -> (Arc<ServerResources>, Router) {
    let resources = Arc::new(ServerResources::new(
        demo_pipeline(),
        ServerConfig::default(),
    ));
    let router = build_router(resources.clone());
    (resources, router)
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_reports_collaborators() {
    let (_, router) = setup();
    let response = AxumTestRequest::get("/health").send(router).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "foodscore");
    assert_eq!(body["collaborators"]["product_database"], true);
    assert_eq!(body["collaborators"]["ocr"], false);
    assert_eq!(body["history_entries"], 0);
}

// ============================================================================
// Analysis
// ============================================================================

#[tokio::test]
async fn test_search_barcode_scores_and_records() {
    let (resources, router) = setup();
    let response = AxumTestRequest::get(&format!("/search-barcode/{DEMO_COLA_BARCODE}"))
        .send(router)
        .await;
    assert_eq!(response.status(), 200);

    let report: AnalysisReport = response.json();
    assert_eq!(report.product_name.as_deref(), Some("Coca-Cola Classic"));
    assert_eq!(report.score, 36);
    assert_eq!(report.band, HealthBand::Poor);
    assert_eq!(report.source, Some(SourceKind::BarcodeDatabase));
    assert_eq!(resources.history.read().await.len(), 1);
}

#[tokio::test]
async fn test_search_barcode_rejects_bad_check_digit() {
    let (resources, router) = setup();
    let response = AxumTestRequest::get("/search-barcode/5449000000997")
        .send(router)
        .await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json();
    assert_eq!(error_code(&body), "INVALID_INPUT");
    assert!(resources.history.read().await.is_empty());
}

#[tokio::test]
async fn test_search_name() {
    let (_, router) = setup();
    let response = AxumTestRequest::post("/search-name")
        .json(&json!({"name": "whole grain bread"}))
        .send(router.clone())
        .await;
    assert_eq!(response.status(), 200);
    let report: AnalysisReport = response.json();
    assert_eq!(report.product_name.as_deref(), Some("Whole Grain Bread"));

    let blank = AxumTestRequest::post("/search-name")
        .json(&json!({"name": "   "}))
        .send(router)
        .await;
    assert_eq!(blank.status(), 400);
}

#[tokio::test]
async fn test_health_score_from_manual_nutrition() {
    let (_, router) = setup();
    let response = AxumTestRequest::post("/health-score")
        .json(&json!({
            "product_name": "Home bread",
            "nutrition": {
                "fiber": 7.0,
                "added_sugars": 2.0,
                "sodium": 681.0,
                "protein": 13.4
            },
            "ingredients": ["Whole wheat flour", "Water"]
        }))
        .send(router)
        .await;
    assert_eq!(response.status(), 200);

    let report: AnalysisReport = response.json();
    assert_eq!(report.score, 74);
    assert_eq!(report.band, HealthBand::Good);
    assert_eq!(report.source, Some(SourceKind::Manual));
}

#[tokio::test]
async fn test_health_score_requires_data() {
    let (_, router) = setup();
    let response = AxumTestRequest::post("/health-score")
        .json(&json!({"product_name": "Nothing"}))
        .send(router)
        .await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json();
    assert_eq!(error_code(&body), "INVALID_INPUT");
}

#[tokio::test]
async fn test_scoring_rules_lists_every_rule() {
    let (_, router) = setup();
    let response = AxumTestRequest::get("/scoring-rules").send(router).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json();
    assert_eq!(body["bands"]["excellent"], 80);
    assert_eq!(body["bands"]["good"], 60);
    assert_eq!(body["bands"]["moderate"], 40);
    assert_eq!(body["rules"].as_array().map(Vec::len), Some(11));
    assert_eq!(body["config"]["sodium"]["threshold_mg"], 400.0);
    assert!(body["rules"]
        .as_array()
        .unwrap()
        .iter()
        .all(|rule| rule["guideline"].as_str().is_some_and(|g| !g.is_empty())));
}

#[tokio::test]
async fn test_analyze_image_with_barcode_field() {
    let (_, router) = setup();
    let response = AxumTestRequest::post("/analyze-image")
        .multipart(&[("barcode", None, DEMO_COLA_BARCODE.as_bytes())])
        .send(router)
        .await;
    assert_eq!(response.status(), 200);
    let report: AnalysisReport = response.json();
    assert_eq!(report.score, 36);
}

#[tokio::test]
async fn test_analyze_image_without_ocr_degrades() {
    let (_, router) = setup();
    let response = AxumTestRequest::post("/analyze-image")
        .multipart(&[("image", Some("label.jpg"), IMAGE)])
        .send(router)
        .await;
    assert_eq!(response.status(), 200);

    let report: AnalysisReport = response.json();
    assert_eq!(report.score, 50);
    assert!(report
        .warnings
        .iter()
        .any(|w| w == "Label OCR is not configured"));
}

#[tokio::test]
async fn test_analyze_image_requires_some_input() {
    let (_, router) = setup();
    let response = AxumTestRequest::post("/analyze-image")
        .multipart(&[("comment", None, b"hello".as_slice())])
        .send(router)
        .await;
    assert_eq!(response.status(), 400);
}

// ============================================================================
// History
// ============================================================================

#[tokio::test]
async fn test_history_list_get_and_delete() {
    let (_, router) = setup();
    for path in ["/search-barcode/5449000000996", "/search-barcode/3017620422003"] {
        let response = AxumTestRequest::get(path).send(router.clone()).await;
        assert_eq!(response.status(), 200);
    }

    let list: HistoryListResponse = AxumTestRequest::get("/history")
        .send(router.clone())
        .await
        .json();
    assert_eq!(list.total, 2);
    assert_eq!(list.capacity, ServerConfig::default().history_capacity);
    assert_eq!(list.entries[0].report.barcode.as_deref(), Some("3017620422003"));

    let id = list.entries[1].id;
    let entry: HistoryEntry = AxumTestRequest::get(&format!("/history/{id}"))
        .send(router.clone())
        .await
        .json();
    assert_eq!(entry.report.barcode.as_deref(), Some(DEMO_COLA_BARCODE));

    let deleted = AxumTestRequest::delete(&format!("/history/{id}"))
        .send(router.clone())
        .await;
    assert_eq!(deleted.status(), 204);

    let again = AxumTestRequest::delete(&format!("/history/{id}"))
        .send(router.clone())
        .await;
    assert_eq!(again.status(), 404);

    let missing = AxumTestRequest::get(&format!("/history/{id}"))
        .send(router)
        .await;
    assert_eq!(missing.status(), 404);
    let body: Value = missing.json();
    assert_eq!(error_code(&body), "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_history_rejects_malformed_id() {
    let (_, router) = setup();
    let response = AxumTestRequest::get("/history/not-a-uuid").send(router).await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_history_clear() {
    let (resources, router) = setup();
    let response = AxumTestRequest::get(&format!("/search-barcode/{DEMO_COLA_BARCODE}"))
        .send(router.clone())
        .await;
    assert_eq!(response.status(), 200);

    let cleared: ClearHistoryResponse = AxumTestRequest::delete("/history")
        .send(router)
        .await
        .json();
    assert_eq!(cleared.removed, 1);
    assert!(resources.history.read().await.is_empty());
}
