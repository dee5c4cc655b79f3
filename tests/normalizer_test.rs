// ABOUTME: Tests for per-serving to per-100 g/ml normalization
// ABOUTME: Validates rescaling, pass-through, unnormalized flagging and implausible value handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use common::record;
use foodscore_core::models::{Basis, Nutrient, SourceKind, ValueFlags};
use foodscore_intelligence::normalizer::ServingKind;
use foodscore_intelligence::{normalize, NormalizationStatus, ServingSize};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

// ============================================================================
// Serving size parsing
// ============================================================================

#[test]
fn test_serving_size_units() {
    let grams = ServingSize::parse("30 g").unwrap();
    assert_eq!(grams.kind, ServingKind::Mass);
    assert!(close(grams.quantity, 30.0));

    let fl_oz = ServingSize::parse("12 fl oz").unwrap();
    assert_eq!(fl_oz.kind, ServingKind::Volume);
    assert!(close(fl_oz.quantity, 12.0 * 29.57));

    let cups = ServingSize::parse("1 1/2 cup").unwrap();
    assert_eq!(cups.kind, ServingKind::Volume);
    assert!(close(cups.quantity, 360.0));

    let bottle = ServingSize::parse("1 bottle (500 ml)").unwrap();
    assert_eq!(bottle.kind, ServingKind::Volume);
    assert!(close(bottle.quantity, 500.0));
}

#[test]
fn test_unparseable_serving_sizes() {
    assert!(ServingSize::parse("a handful").is_none());
    assert!(ServingSize::parse("").is_none());
    assert!(ServingSize::parse("0 g").is_none());
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn test_per_100_record_passes_through() {
    common::init_test_logging();
    let input = record(
        Basis::Per100Grams,
        SourceKind::BarcodeDatabase,
        0.9,
        &[(Nutrient::TotalSugars, 12.0), (Nutrient::Sodium, 300.0)],
    );
    let outcome = normalize(&input, Some("30 g"));

    assert_eq!(outcome.status, NormalizationStatus::PassedThrough);
    assert_eq!(outcome.record, input);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_per_serving_mass_is_rescaled() {
    let input = record(
        Basis::PerServing,
        SourceKind::Ocr,
        0.9,
        &[(Nutrient::TotalSugars, 3.0), (Nutrient::Sodium, 120.0)],
    );
    let outcome = normalize(&input, Some("30 g"));

    match outcome.status {
        NormalizationStatus::Rescaled { factor } => assert!(close(factor, 100.0 / 30.0)),
        other => panic!("expected rescaling, got {other:?}"),
    }
    assert_eq!(outcome.record.basis, Basis::Per100Grams);
    assert!(close(outcome.record.amount(Nutrient::TotalSugars).unwrap(), 10.0));
    assert!(close(outcome.record.amount(Nutrient::Sodium).unwrap(), 400.0));
}

#[test]
fn test_per_serving_volume_targets_100ml() {
    let input = record(
        Basis::PerServing,
        SourceKind::Ocr,
        0.9,
        &[(Nutrient::AddedSugars, 26.5)],
    );
    let outcome = normalize(&input, Some("250 ml"));

    assert_eq!(outcome.record.basis, Basis::Per100Milliliters);
    assert!(close(outcome.record.amount(Nutrient::AddedSugars).unwrap(), 10.6));
}

#[test]
fn test_reference_quantity_serving_only_sets_basis() {
    let input = record(
        Basis::PerServing,
        SourceKind::Ocr,
        0.9,
        &[(Nutrient::Protein, 8.0)],
    );
    let outcome = normalize(&input, Some("100 g"));

    assert_eq!(outcome.status, NormalizationStatus::PassedThrough);
    assert_eq!(outcome.record.basis, Basis::Per100Grams);
    assert!(close(outcome.record.amount(Nutrient::Protein).unwrap(), 8.0));
}

#[test]
fn test_missing_serving_flags_every_value() {
    let input = record(
        Basis::Unspecified,
        SourceKind::Ocr,
        0.9,
        &[(Nutrient::TotalSugars, 5.0), (Nutrient::Sodium, 50.0)],
    );
    let outcome = normalize(&input, None);

    assert_eq!(outcome.status, NormalizationStatus::Unnormalized);
    assert!(outcome
        .record
        .iter()
        .all(|(_, v)| v.flags.contains(ValueFlags::UNNORMALIZED | ValueFlags::SUSPECT)));
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].starts_with("Serving size missing"));
    // Amounts are left as printed
    assert!(close(outcome.record.amount(Nutrient::TotalSugars).unwrap(), 5.0));
}

#[test]
fn test_unparseable_serving_is_named_in_warning() {
    let input = record(
        Basis::PerServing,
        SourceKind::Ocr,
        0.9,
        &[(Nutrient::Protein, 2.0)],
    );
    let outcome = normalize(&input, Some("a handful"));

    assert_eq!(outcome.status, NormalizationStatus::Unnormalized);
    assert!(outcome.warnings[0].contains("'a handful'"));
}

#[test]
fn test_empty_record_without_serving_has_no_warning() {
    let input = record(Basis::Unspecified, SourceKind::Ocr, 0.9, &[]);
    let outcome = normalize(&input, None);
    assert!(outcome.warnings.is_empty());
}

#[test]
fn test_negative_values_are_zeroed_and_flagged() {
    let input = record(
        Basis::Per100Grams,
        SourceKind::Manual,
        1.0,
        &[(Nutrient::Sodium, -20.0), (Nutrient::Protein, 4.0)],
    );
    let outcome = normalize(&input, None);

    let sodium = outcome.record.get(Nutrient::Sodium).unwrap();
    assert!(close(sodium.amount, 0.0));
    assert!(sodium.flags.contains(ValueFlags::SUSPECT));
    assert!(!outcome
        .record
        .get(Nutrient::Protein)
        .unwrap()
        .flags
        .contains(ValueFlags::SUSPECT));
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].starts_with("Implausible"));
}
