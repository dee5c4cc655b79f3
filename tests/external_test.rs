// ABOUTME: Tests for product database collaborators and barcode handling
// ABOUTME: OpenFoodFacts response parsing, GTIN validation and the demo catalogue
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use foodscore::errors::ErrorCode;
use foodscore::external::demo::{DEMO_COLA_BARCODE, DEMO_SPREAD_BARCODE};
use foodscore::external::openfoodfacts::{parse_product_response, parse_search_response};
use foodscore::external::{gtin, DemoProductDatabase, ProductDatabase};
use foodscore_core::models::{Basis, Nutrient, SourceKind};
use serde_json::json;

fn close(actual: Option<f64>, expected: f64) -> bool {
    actual.is_some_and(|a| (a - expected).abs() < 1e-6)
}

// ============================================================================
// GTIN
// ============================================================================

#[test]
fn test_gtin_lengths_and_check_digits() {
    for code in ["5449000000996", "3017620422003", "96385074", "036000291452"] {
        assert!(gtin::is_valid(code), "{code} should be valid");
    }
    assert!(!gtin::is_valid("96385075"));
    assert!(!gtin::is_valid(""));
    assert_eq!(gtin::normalize("5449 0000 00996").as_deref(), Some(DEMO_COLA_BARCODE));
}

#[test]
fn test_gtin_found_in_label_text() {
    let text = "Nutrition Facts\nSodium 45mg\nEAN 3017620422003";
    assert_eq!(gtin::find_in_text(text).as_deref(), Some(DEMO_SPREAD_BARCODE));
    assert_eq!(gtin::find_in_text("Best before 12 2026"), None);
}

// ============================================================================
// OpenFoodFacts parsing
// ============================================================================

#[test]
fn test_off_product_response() {
    common::init_test_logging();
    let body = json!({
        "status": 1,
        "product": {
            "code": "5449000000996",
            "product_name": "Coca-Cola",
            "brands": "Coca-Cola, The Coca-Cola Company",
            "quantity": "330 ml",
            "serving_size": "330 ml",
            "ingredients_text": "Carbonated water, sugar, _caramel_ colour, phosphoric acid",
            "nutriments": {
                "energy-kcal_100g": 42,
                "sugars_100g": "10,6",
                "sodium_100g": 0.001,
                "proteins_100g": 0
            }
        }
    })
    .to_string();

    let fragment = parse_product_response(&body).unwrap().unwrap();
    assert_eq!(fragment.source, SourceKind::BarcodeDatabase);
    assert_eq!(fragment.product_name.as_deref(), Some("Coca-Cola"));
    assert_eq!(fragment.brand.as_deref(), Some("Coca-Cola"));
    assert_eq!(fragment.barcode.as_deref(), Some("5449000000996"));
    assert_eq!(fragment.nutrition.basis, Basis::Per100Milliliters);

    assert!(close(fragment.nutrition.amount(Nutrient::Calories), 42.0));
    assert!(close(fragment.nutrition.amount(Nutrient::TotalSugars), 10.6));
    assert!(close(fragment.nutrition.amount(Nutrient::Sodium), 1.0));
    let sugars = fragment.nutrition.get(Nutrient::TotalSugars).unwrap();
    assert!((sugars.confidence - 0.9).abs() < 1e-9);

    assert_eq!(
        fragment.ingredients.as_slice(),
        ["Carbonated water", "sugar", "caramel colour", "phosphoric acid"]
    );
}

#[test]
fn test_off_fallbacks_for_salt_and_kilojoules() {
    let body = json!({
        "status": 1,
        "product": {
            "product_name": "Crackers",
            "quantity": "200 g",
            "nutriments": {
                "energy_100g": 1841.6,
                "salt_100g": 1.5,
                "fat_100g": "bad"
            }
        }
    })
    .to_string();

    let fragment = parse_product_response(&body).unwrap().unwrap();
    assert_eq!(fragment.nutrition.basis, Basis::Per100Grams);
    assert!(close(fragment.nutrition.amount(Nutrient::Calories), 1841.6 / 4.184));
    assert!(close(fragment.nutrition.amount(Nutrient::Sodium), 600.0));
    assert!(fragment.nutrition.get(Nutrient::TotalFat).is_none());
}

#[test]
fn test_off_unknown_product_and_bad_json() {
    let missing = json!({"status": 0, "status_verbose": "product not found"}).to_string();
    assert!(parse_product_response(&missing).unwrap().is_none());

    let err = parse_product_response("<html>").unwrap_err();
    assert_eq!(err.code, ErrorCode::ExternalServiceError);
    assert!(err.message.starts_with("OpenFoodFacts API"));
}

#[test]
fn test_off_search_prefers_products_with_nutrition() {
    let body = json!({
        "products": [
            {"product_name": "Hazelnut thing"},
            {"product_name": "Nutella", "nutriments": {"sugars_100g": 56.3}}
        ]
    })
    .to_string();
    let fragment = parse_search_response(&body).unwrap().unwrap();
    assert_eq!(fragment.product_name.as_deref(), Some("Nutella"));

    let empty = json!({"products": []}).to_string();
    assert!(parse_search_response(&empty).unwrap().is_none());

    let bare = json!({"products": [{"product_name": "Mystery"}]}).to_string();
    let fragment = parse_search_response(&bare).unwrap().unwrap();
    assert_eq!(fragment.product_name.as_deref(), Some("Mystery"));
    assert!(fragment.nutrition.is_empty());
}

// ============================================================================
// Demo catalogue
// ============================================================================

#[tokio::test]
async fn test_demo_barcode_lookup() {
    let db = DemoProductDatabase;
    let cola = db.lookup_barcode(DEMO_COLA_BARCODE).await.unwrap().unwrap();
    assert_eq!(cola.product_name.as_deref(), Some("Coca-Cola Classic"));
    assert_eq!(cola.nutrition.basis, Basis::Per100Milliliters);
    assert!(close(cola.nutrition.amount(Nutrient::AddedSugars), 10.6));

    let spread = db.lookup_barcode("3017620-422003").await.unwrap().unwrap();
    assert_eq!(spread.brand.as_deref(), Some("Ferrero"));

    assert!(db.lookup_barcode("96385074").await.unwrap().is_none());
}

#[tokio::test]
async fn test_demo_name_search() {
    let db = DemoProductDatabase;
    let bread = db.search_by_name("whole grain BREAD").await.unwrap().unwrap();
    assert_eq!(bread.product_name.as_deref(), Some("Whole Grain Bread"));
    assert!(bread.barcode.is_none());

    let spread = db.search_by_name("hazelnut spread").await.unwrap().unwrap();
    assert_eq!(spread.barcode.as_deref(), Some(DEMO_SPREAD_BARCODE));

    assert!(db.search_by_name("kale chips").await.unwrap().is_none());
}
