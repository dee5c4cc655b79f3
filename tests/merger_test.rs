// ABOUTME: Tests for multi-source product merging
// ABOUTME: Validates confidence selection, precedence tie-breaks, LLM gap filling and identity resolution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::{fragment, record};
use foodscore_core::models::{Basis, MedicalInsight, Nutrient, SourceKind, ValueFlags};
use foodscore_intelligence::merge;

// ============================================================================
// Nutrient resolution
// ============================================================================

#[test]
fn test_manual_wins_tie_over_database() {
    common::init_test_logging();
    let db = fragment(
        SourceKind::BarcodeDatabase,
        record(Basis::Per100Grams, SourceKind::BarcodeDatabase, 1.0, &[(Nutrient::Sodium, 200.0)]),
    );
    let manual = fragment(
        SourceKind::Manual,
        record(Basis::Per100Grams, SourceKind::Manual, 1.0, &[(Nutrient::Sodium, 100.0)]),
    );

    // Caller order must not matter
    let merged = merge(vec![db, manual], None);
    let sodium = merged.product.nutrition.get(Nutrient::Sodium).unwrap();
    assert!((sodium.amount - 100.0).abs() < 1e-9);
    assert_eq!(sodium.source, SourceKind::Manual);
    assert_eq!(merged.product.provenance[&Nutrient::Sodium], SourceKind::Manual);
}

#[test]
fn test_database_wins_tie_over_ocr() {
    let ocr = fragment(
        SourceKind::Ocr,
        record(Basis::Per100Grams, SourceKind::Ocr, 0.9, &[(Nutrient::Protein, 9.0)]),
    );
    let db = fragment(
        SourceKind::BarcodeDatabase,
        record(Basis::Per100Grams, SourceKind::BarcodeDatabase, 0.9, &[(Nutrient::Protein, 8.0)]),
    );

    let merged = merge(vec![ocr, db], None);
    assert_eq!(
        merged.product.nutrition.get(Nutrient::Protein).unwrap().source,
        SourceKind::BarcodeDatabase
    );
}

#[test]
fn test_more_confident_ocr_displaces_database() {
    let db = fragment(
        SourceKind::BarcodeDatabase,
        record(
            Basis::Per100Grams,
            SourceKind::BarcodeDatabase,
            0.5,
            &[(Nutrient::TotalSugars, 5.0)],
        ),
    );
    let ocr = fragment(
        SourceKind::Ocr,
        record(Basis::Per100Grams, SourceKind::Ocr, 0.9, &[(Nutrient::TotalSugars, 7.0)]),
    );

    let merged = merge(vec![db, ocr], None);
    let sugars = merged.product.nutrition.get(Nutrient::TotalSugars).unwrap();
    assert!((sugars.amount - 7.0).abs() < 1e-9);
    assert_eq!(sugars.source, SourceKind::Ocr);
}

#[test]
fn test_llm_only_fills_gaps_and_is_unverified() {
    let db = fragment(
        SourceKind::BarcodeDatabase,
        record(Basis::Per100Grams, SourceKind::BarcodeDatabase, 0.3, &[(Nutrient::Sodium, 500.0)]),
    );
    let llm = fragment(
        SourceKind::Llm,
        record(
            Basis::Per100Grams,
            SourceKind::Llm,
            0.9,
            &[(Nutrient::Sodium, 50.0), (Nutrient::DietaryFiber, 2.0)],
        ),
    );

    let merged = merge(vec![llm, db], None);
    let sodium = merged.product.nutrition.get(Nutrient::Sodium).unwrap();
    assert!((sodium.amount - 500.0).abs() < 1e-9);
    assert_eq!(sodium.source, SourceKind::BarcodeDatabase);
    assert!(!sodium.flags.contains(ValueFlags::UNVERIFIED));

    let fiber = merged.product.nutrition.get(Nutrient::DietaryFiber).unwrap();
    assert_eq!(fiber.source, SourceKind::Llm);
    assert!(fiber.flags.contains(ValueFlags::UNVERIFIED));
}

#[test]
fn test_unknown_nutrients_are_listed() {
    let db = fragment(
        SourceKind::BarcodeDatabase,
        record(Basis::Per100Grams, SourceKind::BarcodeDatabase, 1.0, &[(Nutrient::Sodium, 10.0)]),
    );
    let merged = merge(vec![db], None);

    assert_eq!(merged.unknown.len(), Nutrient::ALL.len() - 1);
    assert!(!merged.unknown.contains(&Nutrient::Sodium));
    assert!(merged.unknown.contains(&Nutrient::AddedSugars));
}

// ============================================================================
// Identity, ingredients and provenance
// ============================================================================

#[test]
fn test_identity_ingredients_and_sources() {
    let mut ocr = fragment(
        SourceKind::Ocr,
        record(Basis::Per100Grams, SourceKind::Ocr, 0.8, &[(Nutrient::Protein, 6.0)]),
    );
    ocr.product_name = Some("Choco Spread (label)".to_owned());
    ocr.ingredients = ["Sugar", "Cocoa", "Emulsifier E322"].iter().collect();

    let mut db = fragment(
        SourceKind::BarcodeDatabase,
        record(Basis::Per100Grams, SourceKind::BarcodeDatabase, 0.9, &[(Nutrient::Sodium, 40.0)]),
    );
    db.product_name = Some("Choco Spread".to_owned());
    db.brand = Some("Acme".to_owned());
    db.ingredients = ["Sugar", "Palm Oil"].iter().collect();

    let merged = merge(vec![ocr, db], None);

    assert_eq!(merged.product.product_name.as_deref(), Some("Choco Spread"));
    assert_eq!(merged.product.brand.as_deref(), Some("Acme"));
    assert_eq!(
        merged.product.ingredients.as_slice(),
        ["Sugar", "Palm Oil", "Cocoa", "Emulsifier E322"]
    );
    assert_eq!(
        merged.contributing_sources,
        vec![SourceKind::BarcodeDatabase, SourceKind::Ocr]
    );
    assert_eq!(merged.product.source, Some(SourceKind::BarcodeDatabase));
}

#[test]
fn test_insight_is_carried_not_merged() {
    let insight = MedicalInsight {
        health_score: Some(20.0),
        concerns: vec!["High sugar".to_owned()],
        ..MedicalInsight::default()
    };
    let merged = merge(Vec::new(), Some(insight.clone()));

    assert_eq!(merged.insight, Some(insight));
    assert!(merged.product.nutrition.is_empty());
    assert_eq!(merged.product.source, None);
    assert!(merged.contributing_sources.is_empty());
    assert_eq!(merged.unknown.len(), Nutrient::ALL.len());
}

#[test]
fn test_basis_comes_from_first_normalized_fragment() {
    let liquid = fragment(
        SourceKind::BarcodeDatabase,
        record(
            Basis::Per100Milliliters,
            SourceKind::BarcodeDatabase,
            1.0,
            &[(Nutrient::AddedSugars, 10.6)],
        ),
    );
    let merged = merge(vec![liquid], None);
    assert_eq!(merged.product.nutrition.basis, Basis::Per100Milliliters);
}

// ============================================================================
// Basis consistency
// ============================================================================

#[test]
fn test_values_on_another_basis_are_left_out() {
    let db = fragment(
        SourceKind::BarcodeDatabase,
        record(Basis::Per100Grams, SourceKind::BarcodeDatabase, 0.9, &[(Nutrient::Sodium, 300.0)]),
    );
    // Label read without a serving size: values stay per serving
    let ocr = fragment(
        SourceKind::Ocr,
        record(Basis::PerServing, SourceKind::Ocr, 0.8, &[(Nutrient::AddedSugars, 12.0)]),
    );

    let merged = merge(vec![ocr, db], None);
    let nutrition = &merged.product.nutrition;
    assert_eq!(nutrition.basis, Basis::Per100Grams);
    assert!(nutrition.get(Nutrient::AddedSugars).is_none());
    assert!(nutrition.get(Nutrient::Sodium).is_some());
    assert_eq!(
        merged.warnings,
        ["Ignored ocr nutrition values stated per serving; product values are per 100 g"]
    );
}

#[test]
fn test_millilitre_values_do_not_mix_with_grams() {
    let db = fragment(
        SourceKind::BarcodeDatabase,
        record(Basis::Per100Grams, SourceKind::BarcodeDatabase, 0.9, &[(Nutrient::Sodium, 300.0)]),
    );
    let ocr = fragment(
        SourceKind::Ocr,
        record(Basis::Per100Milliliters, SourceKind::Ocr, 1.0, &[(Nutrient::Sodium, 20.0)]),
    );

    let merged = merge(vec![ocr, db], None);
    let sodium = merged.product.nutrition.get(Nutrient::Sodium).unwrap();
    assert_eq!(merged.product.nutrition.basis, Basis::Per100Grams);
    assert!((sodium.amount - 300.0).abs() < 1e-9);
    assert_eq!(merged.warnings.len(), 1);
}

#[test]
fn test_unnormalized_values_used_when_nothing_else_exists() {
    let ocr = fragment(
        SourceKind::Ocr,
        record(Basis::PerServing, SourceKind::Ocr, 0.8, &[(Nutrient::AddedSugars, 12.0)]),
    );

    let merged = merge(vec![ocr], None);
    assert_eq!(merged.product.nutrition.basis, Basis::PerServing);
    assert!(merged.product.nutrition.get(Nutrient::AddedSugars).is_some());
    assert!(merged.warnings.is_empty());
}

#[test]
fn test_measured_basis_decides_over_estimates() {
    let ocr = fragment(
        SourceKind::Ocr,
        record(Basis::PerServing, SourceKind::Ocr, 0.8, &[(Nutrient::Sodium, 90.0)]),
    );
    let llm = fragment(
        SourceKind::Llm,
        record(Basis::Per100Grams, SourceKind::Llm, 0.4, &[(Nutrient::Calcium, 2.0)]),
    );

    let merged = merge(vec![llm, ocr], None);
    assert_eq!(merged.product.nutrition.basis, Basis::PerServing);
    assert!(merged.product.nutrition.get(Nutrient::Calcium).is_none());
    assert_eq!(merged.warnings.len(), 1);
}
