// ABOUTME: Ingredient list analysis for ultra-processing markers
// ABOUTME: Detects preservatives, artificial colours and sweeteners, flavour enhancers and E-numbers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Kind of ultra-processing marker found in an ingredient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    /// Chemical preservative (benzoates, sorbates, nitrites, ...)
    Preservative,
    /// Synthetic colouring
    ArtificialColor,
    /// Non-nutritive sweetener
    ArtificialSweetener,
    /// Glutamates and ribonucleotides
    FlavorEnhancer,
    /// Partially hydrogenated or interesterified fats
    HydrogenatedFat,
    /// Any other coded additive (E-number)
    ENumber,
}

impl MarkerCategory {
    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preservative => "preservative",
            Self::ArtificialColor => "artificial colour",
            Self::ArtificialSweetener => "artificial sweetener",
            Self::FlavorEnhancer => "flavour enhancer",
            Self::HydrogenatedFat => "hydrogenated fat",
            Self::ENumber => "coded additive",
        }
    }
}

// Checked in order; an ingredient is counted once, under its first matching category
const MARKER_TERMS: &[(MarkerCategory, &[&str])] = &[
    (
        MarkerCategory::Preservative,
        &[
            "preservative",
            "sodium benzoate",
            "potassium sorbate",
            "calcium propionate",
            "calcium sorbate",
            "sorbic acid",
            "benzoic acid",
            "bht",
            "bha",
            "sodium nitrite",
            "sodium nitrate",
            "sodium sulfite",
            "sodium bisulfite",
            "sodium metabisulfite",
        ],
    ),
    (
        MarkerCategory::ArtificialColor,
        &[
            "artificial color",
            "artificial colour",
            "red 40",
            "red 3",
            "yellow 5",
            "yellow 6",
            "blue 1",
            "blue 2",
            "green 3",
            "tartrazine",
            "sunset yellow",
            "allura red",
            "brilliant blue",
            "indigo carmine",
            "fd&c",
            "lake",
        ],
    ),
    (
        MarkerCategory::ArtificialSweetener,
        &[
            "aspartame",
            "sucralose",
            "saccharin",
            "acesulfame",
            "neotame",
            "advantame",
        ],
    ),
    (
        MarkerCategory::FlavorEnhancer,
        &[
            "flavor enhancer",
            "flavour enhancer",
            "monosodium glutamate",
            "msg",
            "disodium inosinate",
            "disodium guanylate",
        ],
    ),
    (
        MarkerCategory::HydrogenatedFat,
        &["hydrogenated", "interesterified", "shortening"],
    ),
];

const ADDED_SUGAR_TERMS: &[&str] = &[
    "sugar",
    "cane sugar",
    "glucose",
    "fructose",
    "sucrose",
    "dextrose",
    "maltose",
    "corn syrup",
    "high fructose corn syrup",
    "hfcs",
    "glucose syrup",
    "invert syrup",
    "honey",
    "maple syrup",
    "agave",
];

const NATURAL_TERMS: &[&str] = &[
    "water",
    "salt",
    "flour",
    "milk",
    "egg",
    "eggs",
    "butter",
    "oil",
    "sugar",
    "honey",
    "vanilla",
    "cocoa",
    "chocolate",
    "fruit",
    "vegetable",
    "herb",
    "herbs",
    "spice",
    "spices",
    "natural",
    "organic",
    "whole grain",
    "wholegrain",
    "oats",
    "nuts",
    "hazelnuts",
];

/// An ingredient flagged as an ultra-processing marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientMarker {
    /// Ingredient as printed
    pub ingredient: String,
    /// Marker category
    pub category: MarkerCategory,
}

/// Summary of an ingredient list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientProfile {
    /// Number of distinct ingredients
    pub ingredient_count: usize,
    /// Ultra-processing markers, in label order
    pub markers: Vec<IngredientMarker>,
    /// Ingredients that are a form of added sugar
    pub added_sugar_sources: Vec<String>,
    /// Share of ingredients recognised as minimally processed, rounded to two decimals
    pub natural_ratio: f64,
}

impl IngredientProfile {
    /// Classify every ingredient of a list
    #[must_use]
    pub fn analyze<S: AsRef<str>>(ingredients: &[S]) -> Self {
        let mut markers = Vec::new();
        let mut added_sugar_sources = Vec::new();
        let mut natural = 0_usize;

        for ingredient in ingredients {
            let original = ingredient.as_ref();
            let lowered = original.to_lowercase();

            if let Some(category) = classify(&lowered) {
                markers.push(IngredientMarker {
                    ingredient: original.to_owned(),
                    category,
                });
            } else if NATURAL_TERMS.iter().any(|t| contains_term(&lowered, t)) {
                natural += 1;
            }

            if ADDED_SUGAR_TERMS.iter().any(|t| contains_term(&lowered, t))
                && !lowered.contains("sugar alcohol")
            {
                added_sugar_sources.push(original.to_owned());
            }
        }

        let natural_ratio = if ingredients.is_empty() {
            0.0
        } else {
            ((natural as f64 / ingredients.len() as f64) * 100.0).round() / 100.0
        };

        Self {
            ingredient_count: ingredients.len(),
            markers,
            added_sugar_sources,
            natural_ratio,
        }
    }

    /// Number of ultra-processing markers
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Markers of one category
    pub fn in_category(&self, category: MarkerCategory) -> impl Iterator<Item = &str> {
        self.markers
            .iter()
            .filter(move |m| m.category == category)
            .map(|m| m.ingredient.as_str())
    }
}

fn e_number_regex() -> Option<&'static Regex> {
    static E_NUMBER_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    E_NUMBER_REGEX
        .get_or_init(|| Regex::new(r"(?i)\b(?:e|ins)\s?-?\d{3}[a-z]?\b").ok())
        .as_ref()
}

fn classify(lowered: &str) -> Option<MarkerCategory> {
    MARKER_TERMS
        .iter()
        .find(|(_, terms)| terms.iter().any(|t| contains_term(lowered, t)))
        .map(|(category, _)| *category)
        .or_else(|| {
            e_number_regex()
                .is_some_and(|re| re.is_match(lowered))
                .then_some(MarkerCategory::ENumber)
        })
}

/// Substring match that requires non-alphanumeric characters around the term
fn contains_term(haystack: &str, term: &str) -> bool {
    haystack.match_indices(term).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + term.len()..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}
