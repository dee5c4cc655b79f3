// ABOUTME: Tests for ingredient list analysis
// ABOUTME: Marker categories, E-number detection, added sugar sources and natural ratio
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use foodscore_intelligence::ingredients::{IngredientProfile, MarkerCategory};

#[test]
fn test_marker_categories() {
    let profile = IngredientProfile::analyze(&[
        "Wheat flour",
        "Calcium propionate",
        "Red 40",
        "Sucralose",
        "Monosodium glutamate",
        "Partially hydrogenated soybean oil",
    ]);

    assert_eq!(profile.ingredient_count, 6);
    assert_eq!(profile.marker_count(), 5);
    assert_eq!(
        profile.in_category(MarkerCategory::Preservative).collect::<Vec<_>>(),
        ["Calcium propionate"]
    );
    assert_eq!(
        profile.in_category(MarkerCategory::ArtificialColor).collect::<Vec<_>>(),
        ["Red 40"]
    );
    assert_eq!(
        profile.in_category(MarkerCategory::ArtificialSweetener).count(),
        1
    );
    assert_eq!(profile.in_category(MarkerCategory::FlavorEnhancer).count(), 1);
    assert_eq!(profile.in_category(MarkerCategory::HydrogenatedFat).count(), 1);
}

#[test]
fn test_e_numbers_and_ins_codes() {
    let profile =
        IngredientProfile::analyze(&["Emulsifier E322", "Acid (INS 330)", "E 160a", "Water"]);
    assert_eq!(profile.in_category(MarkerCategory::ENumber).count(), 3);
}

#[test]
fn test_terms_need_word_boundaries() {
    // "lake" must not match "flakes", "bha" must not match "bhatura"
    let profile = IngredientProfile::analyze(&["Corn flakes", "Bhatura dough", "Sea salt"]);
    assert_eq!(profile.marker_count(), 0);
}

#[test]
fn test_each_ingredient_counted_once() {
    // Preservative wins over the E-number fallback
    let profile = IngredientProfile::analyze(&["Preservative (E211)"]);
    assert_eq!(profile.marker_count(), 1);
    assert_eq!(profile.markers[0].category, MarkerCategory::Preservative);
}

#[test]
fn test_added_sugar_sources_and_natural_ratio() {
    let profile = IngredientProfile::analyze(&[
        "Sugar",
        "Glucose syrup",
        "Cocoa butter",
        "Whole milk powder",
        "Sorbitol (sugar alcohol)",
    ]);

    assert_eq!(profile.added_sugar_sources, ["Sugar", "Glucose syrup"]);
    // Sugar, cocoa butter, whole milk powder and the sugar alcohol line are natural terms
    assert!((profile.natural_ratio - 0.8).abs() < 1e-9);
}

#[test]
fn test_empty_list() {
    let profile = IngredientProfile::analyze::<&str>(&[]);
    assert_eq!(profile, IngredientProfile::default());
}
