// ABOUTME: Catalog of scoring rules with guideline sources and recommendation texts
// ABOUTME: Keeps every user-facing string of the scoring engine in one place
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt;

use foodscore_core::models::HealthBand;
use serde::{Deserialize, Serialize};

/// Stable identifier of every rule that can move the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringRule {
    /// Free sugars above threshold
    FreeSugar,
    /// Sodium above threshold
    Sodium,
    /// Saturated fat above threshold
    SaturatedFat,
    /// Any trans fat
    TransFat,
    /// Fiber below target
    LowFiber,
    /// Too many ingredients
    LongIngredientList,
    /// Preservatives, colours, sweeteners, enhancers, E-numbers
    ProcessingMarkers,
    /// Fiber above target
    FiberBonus,
    /// Protein above threshold
    ProteinBonus,
    /// Blending toward a model-suggested score
    MedicalInsight,
    /// No scoring nutrient known
    InsufficientData,
}

impl ScoringRule {
    /// Every rule, in evaluation order
    pub const ALL: [Self; 11] = [
        Self::FreeSugar,
        Self::Sodium,
        Self::SaturatedFat,
        Self::TransFat,
        Self::LowFiber,
        Self::LongIngredientList,
        Self::ProcessingMarkers,
        Self::FiberBonus,
        Self::ProteinBonus,
        Self::MedicalInsight,
        Self::InsufficientData,
    ];

    /// Guideline the rule is derived from, used as evidence
    #[must_use]
    pub const fn guideline(self) -> &'static str {
        match self {
            Self::FreeSugar => "WHO Guideline: Sugars intake for adults and children (2015)",
            Self::Sodium => {
                "WHO Guideline: Sodium intake for adults and children (2012); FDA Daily Value 2,300 mg"
            }
            Self::SaturatedFat | Self::TransFat => {
                "WHO Guideline: Saturated fatty acid and trans-fatty acid intake (2023)"
            }
            Self::LowFiber | Self::FiberBonus => {
                "Codex Alimentarius CAC/GL 23-1997: source of fibre claim, 3 g per 100 g"
            }
            Self::ProteinBonus => "FSSAI (Labelling and Display) Regulations 2020: protein claims",
            Self::LongIngredientList | Self::ProcessingMarkers => {
                "FSSAI Food Additive Regulations; NOVA classification of ultra-processed foods"
            }
            Self::MedicalInsight => "Advisory medical analysis (not a clinical assessment)",
            Self::InsufficientData => "FDA 21 CFR 101.9: Nutrition labeling of food",
        }
    }

    /// Fixed recommendation shown when the rule is triggered
    #[must_use]
    pub const fn recommendation(self) -> Option<&'static str> {
        match self {
            Self::FreeSugar => {
                Some("Choose products with less added sugar, or fresh fruit instead of sugary snacks")
            }
            Self::Sodium => Some("Look for low-sodium or no-salt-added versions"),
            Self::SaturatedFat => {
                Some("Choose products with less than 5 g saturated fat per 100 g")
            }
            Self::TransFat => Some("Avoid products containing partially hydrogenated oils"),
            Self::LowFiber => {
                Some("Choose whole grain products or add vegetables and fruit for fiber")
            }
            Self::LongIngredientList => {
                Some("Choose products with fewer, recognizable ingredients")
            }
            Self::ProcessingMarkers => {
                Some("Prefer minimally processed foods without artificial additives")
            }
            Self::InsufficientData => {
                Some("Scan the nutrition panel or barcode to get a reliable score")
            }
            Self::FiberBonus | Self::ProteinBonus | Self::MedicalInsight => None,
        }
    }
}

impl fmt::Display for ScoringRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FreeSugar => "free_sugar",
            Self::Sodium => "sodium",
            Self::SaturatedFat => "saturated_fat",
            Self::TransFat => "trans_fat",
            Self::LowFiber => "low_fiber",
            Self::LongIngredientList => "long_ingredient_list",
            Self::ProcessingMarkers => "processing_markers",
            Self::FiberBonus => "fiber_bonus",
            Self::ProteinBonus => "protein_bonus",
            Self::MedicalInsight => "medical_insight",
            Self::InsufficientData => "insufficient_data",
        };
        f.write_str(name)
    }
}

/// Recommendation attached to every result of a band
#[must_use]
pub const fn band_recommendation(band: HealthBand) -> &'static str {
    match band {
        HealthBand::Poor => {
            "Limit consumption of this product and choose less processed alternatives"
        }
        HealthBand::Moderate => "Enjoy occasionally as part of a balanced diet",
        HealthBand::Good => "A reasonable choice as part of a balanced diet",
        HealthBand::Excellent => "A healthy choice that fits well in a regular diet",
    }
}

/// Explanation used when no rule fired
pub const NO_CONCERNS: &str = "No significant concerns identified against WHO/FDA thresholds";

/// Evidence used when no rule fired
pub const DEFAULT_EVIDENCE: &str = "WHO/FDA nutrient thresholds per 100 g or 100 ml";

/// Explanation prefix for the insufficient-data outcome
pub const INSUFFICIENT_DATA: &str = "Insufficient data";

/// Explanation noting values flagged as suspect or unnormalized
pub const SUSPECT_DATA: &str =
    "Some nutrition values look implausible or could not be normalized to 100 g/ml; treat the score with caution";

/// Render a point change with its sign ("-4.5 points", "+3 points")
#[must_use]
pub fn format_points(points: f64) -> String {
    let rounded = (points * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:+.0} points")
    } else {
        format!("{rounded:+.1} points")
    }
}

/// Render an amount without trailing zeros
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{rounded:.0}")
    } else {
        format!("{rounded:.1}")
    }
}

/// Reference quantity wording for a basis
#[must_use]
pub const fn per_reference(liquid: bool) -> &'static str {
    if liquid {
        "per 100 ml"
    } else {
        "per 100 g"
    }
}
