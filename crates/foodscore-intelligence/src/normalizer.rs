// ABOUTME: Normalizes nutrition records to a per-100 g or per-100 ml basis
// ABOUTME: Serving size parsing, household measure conversion and value sanitation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Normalizer
//!
//! Rescales per-serving values to the reference quantity of 100 g (solids) or
//! 100 ml (beverages) so that scoring thresholds apply uniformly. A record that
//! cannot be rescaled is returned as-is, with every value flagged so that no
//! downstream consumer mistakes it for normalized data.

use std::sync::OnceLock;

use foodscore_core::constants::units::{
    GRAMS_PER_KG, GRAMS_PER_OUNCE, MG_PER_G, ML_PER_CENTILITRE, ML_PER_CUP, ML_PER_DECILITRE,
    ML_PER_FLUID_OUNCE, ML_PER_LITRE, ML_PER_TABLESPOON, ML_PER_TEASPOON, REFERENCE_QUANTITY,
};
use foodscore_core::models::{Basis, NutritionRecord, ValueFlags};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const UNNORMALIZED_SUFFIX: &str = "nutrition values could not be normalized to 100 g/ml";

/// Whether a serving is weighed or measured by volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingKind {
    /// Grams
    Mass,
    /// Millilitres
    Volume,
}

/// A parsed serving size in grams or millilitres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ServingSize {
    /// Quantity in grams (mass) or millilitres (volume)
    pub quantity: f64,
    /// Measurement kind
    pub kind: ServingKind,
}

impl ServingSize {
    /// Parse free-text serving sizes such as `"30 g"`, `"1 cup (228g)"`, `"12 fl oz"` or `"1/2 cup"`
    ///
    /// A metric quantity in parentheses wins over the household measure in front of it.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let re = serving_amount_regex()?;
        let candidates: Vec<Self> = re
            .captures_iter(text)
            .filter_map(|c| Self::from_captures(&c))
            .collect();

        let parenthesized = re
            .captures_iter(text)
            .filter(|caps| caps.get(0).is_some_and(|m| text[..m.start()].trim_end().ends_with('(')))
            .find_map(|caps| Self::from_captures(&caps));

        parenthesized.or_else(|| candidates.first().copied())
    }

    fn from_captures(caps: &Captures<'_>) -> Option<Self> {
        let amount = parse_quantity(caps.name("qty")?.as_str())?;
        let unit = caps.name("unit")?.as_str().to_lowercase();
        let unit = unit.replace(['.', ' '], "");
        let (factor, kind) = match unit.as_str() {
            "g" | "gm" | "gram" | "grams" => (1.0, ServingKind::Mass),
            "kg" => (GRAMS_PER_KG, ServingKind::Mass),
            "mg" => (1.0 / MG_PER_G, ServingKind::Mass),
            "oz" | "ounce" | "ounces" => (GRAMS_PER_OUNCE, ServingKind::Mass),
            "ml" | "millilitre" | "millilitres" | "milliliter" | "milliliters" => {
                (1.0, ServingKind::Volume)
            }
            "l" | "litre" | "litres" | "liter" | "liters" => (ML_PER_LITRE, ServingKind::Volume),
            "cl" => (ML_PER_CENTILITRE, ServingKind::Volume),
            "dl" => (ML_PER_DECILITRE, ServingKind::Volume),
            "floz" => (ML_PER_FLUID_OUNCE, ServingKind::Volume),
            "cup" | "cups" => (ML_PER_CUP, ServingKind::Volume),
            "tbsp" | "tablespoon" | "tablespoons" => (ML_PER_TABLESPOON, ServingKind::Volume),
            "tsp" | "teaspoon" | "teaspoons" => (ML_PER_TEASPOON, ServingKind::Volume),
            _ => return None,
        };
        let quantity = amount * factor;
        (quantity.is_finite() && quantity > 0.0).then_some(Self { quantity, kind })
    }

    /// Basis that values rescaled from this serving are expressed against
    #[must_use]
    pub const fn target_basis(&self) -> Basis {
        match self.kind {
            ServingKind::Mass => Basis::Per100Grams,
            ServingKind::Volume => Basis::Per100Milliliters,
        }
    }

    /// True when the serving already equals the reference quantity
    #[must_use]
    pub fn is_reference_quantity(&self) -> bool {
        (self.quantity - REFERENCE_QUANTITY).abs() < 1e-9
    }
}

fn serving_amount_regex() -> Option<&'static Regex> {
    static SERVING_AMOUNT_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    SERVING_AMOUNT_REGEX
        .get_or_init(|| {
            Regex::new(
                r"(?i)(?P<qty>\d+\s+\d+/\d+|\d+/\d+|\d+(?:[.,]\d+)?)\s*(?P<unit>fl\.?\s*oz|tablespoons?|teaspoons?|millilit(?:re|er)s?|litres?|liters?|grams?|ounces?|cups?|tbsp|tsp|kg|mg|ml|cl|dl|gm|oz|g|l)\b",
            )
            .ok()
        })
        .as_ref()
}

fn parse_quantity(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Some((whole, fraction)) = raw.split_once(char::is_whitespace) {
        return Some(whole.parse::<f64>().ok()? + parse_quantity(fraction)?);
    }
    if let Some((num, den)) = raw.split_once('/') {
        let den: f64 = den.parse().ok()?;
        return (den != 0.0).then_some(num.parse::<f64>().ok()? / den);
    }
    raw.replace(',', ".").parse().ok()
}

/// How a record was normalized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NormalizationStatus {
    /// Record was already per-100 and is returned unchanged
    PassedThrough,
    /// Values were multiplied by `factor`
    Rescaled {
        /// `100 / serving quantity`
        factor: f64,
    },
    /// No usable serving size; values are flagged `UNNORMALIZED | SUSPECT`
    Unnormalized,
}

/// Result of normalization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationOutcome {
    /// Normalized (or flagged) record
    pub record: NutritionRecord,
    /// What happened
    pub status: NormalizationStatus,
    /// Human-readable data quality warnings
    pub warnings: Vec<String>,
}

/// Normalize a record to a per-100 basis using an optional serving size text
#[must_use]
pub fn normalize(record: &NutritionRecord, serving_size: Option<&str>) -> NormalizationOutcome {
    let mut record = record.clone();
    let mut warnings = sanitize(&mut record);

    if record.basis.is_per_hundred() {
        return NormalizationOutcome {
            record,
            status: NormalizationStatus::PassedThrough,
            warnings,
        };
    }

    match serving_size.and_then(ServingSize::parse) {
        Some(serving) if serving.is_reference_quantity() => {
            record.basis = serving.target_basis();
            NormalizationOutcome {
                record,
                status: NormalizationStatus::PassedThrough,
                warnings,
            }
        }
        Some(serving) => {
            let factor = REFERENCE_QUANTITY / serving.quantity;
            for (_, value) in record.iter_mut() {
                value.amount *= factor;
            }
            record.basis = serving.target_basis();
            debug!(factor, basis = ?record.basis, "Rescaled nutrition to reference quantity");
            NormalizationOutcome {
                record,
                status: NormalizationStatus::Rescaled { factor },
                warnings,
            }
        }
        None => {
            if !record.is_empty() {
                for (_, value) in record.iter_mut() {
                    value.flags |= ValueFlags::UNNORMALIZED | ValueFlags::SUSPECT;
                }
                let message = serving_size.map_or_else(
                    || format!("Serving size missing; {UNNORMALIZED_SUFFIX}"),
                    |s| format!("Serving size '{s}' not understood; {UNNORMALIZED_SUFFIX}"),
                );
                warn!(serving = ?serving_size, "Nutrition record left unnormalized");
                warnings.push(message);
            }
            NormalizationOutcome {
                record,
                status: NormalizationStatus::Unnormalized,
                warnings,
            }
        }
    }
}

/// Clamp negative or non-finite amounts to zero and flag them
fn sanitize(record: &mut NutritionRecord) -> Vec<String> {
    let mut warnings = Vec::new();
    for (nutrient, value) in record.iter_mut() {
        if !value.amount.is_finite() || value.amount < 0.0 {
            warnings.push(format!(
                "Implausible {} value {} replaced with 0",
                nutrient.label(),
                value.amount
            ));
            value.amount = 0.0;
            value.flags |= ValueFlags::SUSPECT;
        }
    }
    warnings
}
