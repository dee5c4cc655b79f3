// ABOUTME: Merges partial product data from several sources into one ProductRecord
// ABOUTME: Per-nutrient confidence selection with a single source precedence table for ties
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Source Merger
//!
//! Resolution rules, applied per nutrient independently:
//!
//! 1. Among measured sources (manual entry, barcode database, OCR) the most
//!    confident value wins.
//! 2. Equal confidence is broken by [`SourceKind::precedence`].
//! 3. Advisory (LLM) values only fill nutrients no measured source reported and
//!    are flagged `UNVERIFIED`.
//!
//! The merged record has one basis: the first per-100 basis among the
//! fragments, or the basis of the first fragment with nutrition when none was
//! normalized. Values stated on any other basis are left out and reported in
//! [`MergedProduct::warnings`].
//!
//! Ingredients are unioned in precedence order and identity fields take the
//! first non-empty value in precedence order.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use foodscore_core::models::{
    Basis, IngredientList, MedicalInsight, Nutrient, NutrientValue, NutritionRecord,
    ProductRecord, SourceFragment, SourceKind, ValueFlags,
};
use serde::Serialize;
use tracing::debug;

/// Confidence values closer than this are considered tied
const CONFIDENCE_EPSILON: f64 = 1e-9;

/// Result of merging every available source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedProduct {
    /// Consolidated product
    pub product: ProductRecord,
    /// Advisory insight, carried alongside and never merged numerically
    pub insight: Option<MedicalInsight>,
    /// Nutrients no source reported
    pub unknown: Vec<Nutrient>,
    /// Sources that contributed at least one field, most trusted first
    pub contributing_sources: Vec<SourceKind>,
    /// Fragments whose values were left out because their basis differs
    pub warnings: Vec<String>,
}

/// Merge source fragments and an optional advisory insight
#[must_use]
pub fn merge(mut fragments: Vec<SourceFragment>, insight: Option<MedicalInsight>) -> MergedProduct {
    // Stable sort keeps caller order among fragments of the same kind
    fragments.sort_by_key(|f| Reverse(f.source.precedence()));
    fragments.retain(|f| !f.is_empty() || f.serving_size.is_some());

    let (nutrition, warnings) = merge_nutrition(&fragments);
    let provenance: BTreeMap<Nutrient, SourceKind> =
        nutrition.iter().map(|(n, v)| (n, v.source)).collect();

    let mut ingredients = IngredientList::new();
    for fragment in &fragments {
        ingredients.extend_from(&fragment.ingredients);
    }

    let contributing_sources: Vec<SourceKind> = SourceKind::PRECEDENCE_ORDER
        .into_iter()
        .filter(|kind| fragments.iter().any(|f| f.source == *kind))
        .collect();

    let product = ProductRecord {
        product_name: first_present(&fragments, |f| f.product_name.as_deref()),
        brand: first_present(&fragments, |f| f.brand.as_deref()),
        barcode: first_present(&fragments, |f| f.barcode.as_deref()),
        serving_size: first_present(&fragments, |f| f.serving_size.as_deref()),
        source: contributing_sources.first().copied(),
        nutrition,
        ingredients,
        provenance,
    };

    let unknown = product.nutrition.unknown_nutrients();
    debug!(
        sources = ?contributing_sources,
        known = product.nutrition.len(),
        unknown = unknown.len(),
        ingredients = product.ingredients.len(),
        "Merged product sources"
    );

    MergedProduct {
        product,
        insight,
        unknown,
        contributing_sources,
        warnings,
    }
}

/// Basis of the merged record; measured sources decide before advisory ones
fn merged_basis(fragments: &[SourceFragment]) -> Basis {
    let bases = |advisory: bool| -> Vec<Basis> {
        fragments
            .iter()
            .filter(|f| f.source.is_advisory() == advisory && !f.nutrition.is_empty())
            .map(|f| f.nutrition.basis)
            .collect()
    };
    let pick = |bases: Vec<Basis>| {
        bases
            .iter()
            .copied()
            .find(|b| b.is_per_hundred())
            .or_else(|| bases.first().copied())
    };
    pick(bases(false))
        .or_else(|| pick(bases(true)))
        .unwrap_or(Basis::Unspecified)
}

fn merge_nutrition(fragments: &[SourceFragment]) -> (NutritionRecord, Vec<String>) {
    let basis = merged_basis(fragments);
    let mut merged = NutritionRecord::new(basis);
    let mut warnings = Vec::new();

    let (compatible, mismatched): (Vec<&SourceFragment>, Vec<&SourceFragment>) = fragments
        .iter()
        .filter(|f| !f.nutrition.is_empty())
        .partition(|f| f.nutrition.basis == basis);
    for fragment in mismatched {
        debug!(
            source = %fragment.source,
            fragment_basis = ?fragment.nutrition.basis,
            merged_basis = ?basis,
            "Skipping nutrition stated on a different basis"
        );
        warnings.push(format!(
            "Ignored {} nutrition values stated {}; product values are {}",
            fragment.source,
            fragment.nutrition.basis.describe(),
            basis.describe()
        ));
    }

    // Fragments arrive most trusted first, so only a strictly higher confidence displaces
    for fragment in compatible.iter().filter(|f| !f.source.is_advisory()) {
        for (nutrient, value) in fragment.nutrition.iter() {
            let candidate = NutrientValue {
                source: fragment.source,
                ..*value
            };
            let replace = merged
                .get(nutrient)
                .is_none_or(|best| candidate.confidence > best.confidence + CONFIDENCE_EPSILON);
            if replace {
                merged.insert(nutrient, candidate);
            }
        }
    }

    for fragment in compatible.iter().filter(|f| f.source.is_advisory()) {
        for (nutrient, value) in fragment.nutrition.iter() {
            let existing = merged.get(nutrient);
            let fills_gap = existing.is_none_or(|best| {
                best.source.is_advisory() && value.confidence > best.confidence + CONFIDENCE_EPSILON
            });
            if fills_gap {
                let candidate = NutrientValue {
                    source: fragment.source,
                    ..*value
                }
                .with_flags(ValueFlags::UNVERIFIED);
                merged.insert(nutrient, candidate);
            }
        }
    }

    (merged, warnings)
}

fn first_present<'a, F>(fragments: &'a [SourceFragment], field: F) -> Option<String>
where
    F: Fn(&'a SourceFragment) -> Option<&'a str>,
{
    fragments
        .iter()
        .filter_map(field)
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}
