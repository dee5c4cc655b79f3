// ABOUTME: Nutrition record models for packaged food analysis
// ABOUTME: Nutrient, Unit, Basis, NutrientValue, ValueFlags, NutritionRecord and NutritionFacts
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::source::SourceKind;
use crate::constants::units::{MCG_PER_MG, MG_PER_G};

/// The closed set of nutrients tracked by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    /// Energy in kilocalories
    Calories,
    /// Protein
    Protein,
    /// Total fat
    TotalFat,
    /// Saturated fat
    SaturatedFat,
    /// Trans fat
    TransFat,
    /// Cholesterol
    Cholesterol,
    /// Sodium
    Sodium,
    /// Total carbohydrate
    TotalCarbohydrate,
    /// Dietary fiber
    DietaryFiber,
    /// Total sugars (intrinsic and added)
    TotalSugars,
    /// Added sugars
    AddedSugars,
    /// Calcium
    Calcium,
    /// Iron
    Iron,
    /// Potassium
    Potassium,
}

impl Nutrient {
    /// Every nutrient in label order
    pub const ALL: [Self; 14] = [
        Self::Calories,
        Self::Protein,
        Self::TotalFat,
        Self::SaturatedFat,
        Self::TransFat,
        Self::Cholesterol,
        Self::Sodium,
        Self::TotalCarbohydrate,
        Self::DietaryFiber,
        Self::TotalSugars,
        Self::AddedSugars,
        Self::Calcium,
        Self::Iron,
        Self::Potassium,
    ];

    /// Unit every value of this nutrient is stored in
    #[must_use]
    pub const fn canonical_unit(self) -> Unit {
        match self {
            Self::Calories => Unit::Kilocalorie,
            Self::Protein
            | Self::TotalFat
            | Self::SaturatedFat
            | Self::TransFat
            | Self::TotalCarbohydrate
            | Self::DietaryFiber
            | Self::TotalSugars
            | Self::AddedSugars => Unit::Gram,
            Self::Cholesterol | Self::Sodium | Self::Calcium | Self::Iron | Self::Potassium => {
                Unit::Milligram
            }
        }
    }

    /// Snake-case identifier, matching the serialized form
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::TotalFat => "total_fat",
            Self::SaturatedFat => "saturated_fat",
            Self::TransFat => "trans_fat",
            Self::Cholesterol => "cholesterol",
            Self::Sodium => "sodium",
            Self::TotalCarbohydrate => "total_carbohydrate",
            Self::DietaryFiber => "dietary_fiber",
            Self::TotalSugars => "total_sugars",
            Self::AddedSugars => "added_sugars",
            Self::Calcium => "calcium",
            Self::Iron => "iron",
            Self::Potassium => "potassium",
        }
    }

    /// Human-readable label used in explanations
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Calories => "calories",
            Self::Protein => "protein",
            Self::TotalFat => "total fat",
            Self::SaturatedFat => "saturated fat",
            Self::TransFat => "trans fat",
            Self::Cholesterol => "cholesterol",
            Self::Sodium => "sodium",
            Self::TotalCarbohydrate => "total carbohydrate",
            Self::DietaryFiber => "dietary fiber",
            Self::TotalSugars => "total sugars",
            Self::AddedSugars => "added sugars",
            Self::Calcium => "calcium",
            Self::Iron => "iron",
            Self::Potassium => "potassium",
        }
    }

    /// Parse a nutrient key as found in JSON payloads or LLM output
    ///
    /// Accepts the canonical snake-case names plus common aliases
    /// (`sugar`, `fibre`, `carbs`, `energy_kcal`, `saturated-fat`, ...).
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Option<Self> {
        let key = s.trim().to_lowercase().replace(['-', ' '], "_");
        let nutrient = match key.as_str() {
            "calories" | "energy" | "energy_kcal" | "kcal" | "calorie" => Self::Calories,
            "protein" | "proteins" => Self::Protein,
            "total_fat" | "fat" | "fats" => Self::TotalFat,
            "saturated_fat" | "saturated_fats" | "sat_fat" => Self::SaturatedFat,
            "trans_fat" | "trans_fats" => Self::TransFat,
            "cholesterol" => Self::Cholesterol,
            "sodium" => Self::Sodium,
            "total_carbohydrate" | "total_carbohydrates" | "carbohydrate" | "carbohydrates"
            | "carbs" => Self::TotalCarbohydrate,
            "dietary_fiber" | "fiber" | "fibre" | "dietary_fibre" => Self::DietaryFiber,
            "total_sugars" | "total_sugar" | "sugars" | "sugar" => Self::TotalSugars,
            "added_sugars" | "added_sugar" => Self::AddedSugars,
            "calcium" => Self::Calcium,
            "iron" => Self::Iron,
            "potassium" => Self::Potassium,
            _ => return None,
        };
        Some(nutrient)
    }
}

impl fmt::Display for Nutrient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of a nutrient amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Grams
    Gram,
    /// Milligrams
    Milligram,
    /// Micrograms
    Microgram,
    /// Kilocalories
    Kilocalorie,
}

impl Unit {
    /// Label symbol
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Gram => "g",
            Self::Milligram => "mg",
            Self::Microgram => "mcg",
            Self::Kilocalorie => "kcal",
        }
    }

    /// Parse a label unit token. Daily-value percentages and kilojoules are not units we resolve.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "g" | "gm" | "gram" | "grams" => Some(Self::Gram),
            "mg" | "milligram" | "milligrams" => Some(Self::Milligram),
            "mcg" | "µg" | "μg" | "ug" | "microgram" | "micrograms" => Some(Self::Microgram),
            "kcal" | "cal" | "calories" => Some(Self::Kilocalorie),
            _ => None,
        }
    }

    /// Grams represented by one unit of mass, `None` for energy
    const fn grams_per_unit(self) -> Option<f64> {
        match self {
            Self::Gram => Some(1.0),
            Self::Milligram => Some(1.0 / MG_PER_G),
            Self::Microgram => Some(1.0 / (MG_PER_G * MCG_PER_MG)),
            Self::Kilocalorie => None,
        }
    }

    /// Convert `amount` from this unit into `target`
    ///
    /// Only identity and mass scaling are defined; energy never converts to mass.
    #[must_use]
    pub fn convert(self, amount: f64, target: Self) -> Option<f64> {
        if self == target {
            return Some(amount);
        }
        let from = self.grams_per_unit()?;
        let to = target.grams_per_unit()?;
        Some(amount * from / to)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Reference quantity a record's values are expressed against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Per 100 grams of product
    Per100Grams,
    /// Per 100 millilitres of product
    Per100Milliliters,
    /// Per declared serving
    PerServing,
    /// No basis could be established
    #[default]
    Unspecified,
}

impl Basis {
    /// True for the two normalized bases
    #[must_use]
    pub const fn is_per_hundred(self) -> bool {
        matches!(self, Self::Per100Grams | Self::Per100Milliliters)
    }

    /// True when values describe a beverage
    #[must_use]
    pub const fn is_liquid(self) -> bool {
        matches!(self, Self::Per100Milliliters)
    }

    /// Wording used in warnings ("per 100 g", "per serving")
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Per100Grams => "per 100 g",
            Self::Per100Milliliters => "per 100 ml",
            Self::PerServing => "per serving",
            Self::Unspecified => "on an unstated basis",
        }
    }
}

bitflags! {
    /// Quality markers attached to an individual nutrient value
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ValueFlags: u8 {
        /// Value was clamped or otherwise looks implausible
        const SUSPECT = 0b0000_0001;
        /// Value comes from an advisory source and was not cross-checked
        const UNVERIFIED = 0b0000_0010;
        /// Value could not be rescaled to a per-100 basis
        const UNNORMALIZED = 0b0000_0100;
        /// Value was converted from the unit printed on the label
        const CONVERTED = 0b0000_1000;
        /// Label printed an upper bound ("<0.5 g") rather than an amount
        const UPPER_BOUND = 0b0001_0000;
    }
}

/// A single nutrient amount with provenance and confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientValue {
    /// Non-negative amount in `unit`
    pub amount: f64,
    /// Unit of `amount`
    pub unit: Unit,
    /// Extraction confidence in `[0, 1]`
    pub confidence: f64,
    /// Where the value came from
    pub source: SourceKind,
    /// Quality markers
    #[serde(default)]
    pub flags: ValueFlags,
}

impl NutrientValue {
    /// Build a value, clamping confidence into `[0, 1]`
    #[must_use]
    pub fn new(amount: f64, unit: Unit, confidence: f64, source: SourceKind) -> Self {
        Self {
            amount,
            unit,
            confidence: confidence.clamp(0.0, 1.0),
            source,
            flags: ValueFlags::empty(),
        }
    }

    /// Add quality flags
    #[must_use]
    pub fn with_flags(mut self, flags: ValueFlags) -> Self {
        self.flags |= flags;
        self
    }
}

/// Nutrient values for one product, all against a single basis
///
/// A nutrient missing from the map is unknown. The map type guarantees at
/// most one value per nutrient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionRecord {
    /// Basis every value is expressed against
    pub basis: Basis,
    values: BTreeMap<Nutrient, NutrientValue>,
}

impl NutritionRecord {
    /// Empty record with the given basis
    #[must_use]
    pub const fn new(basis: Basis) -> Self {
        Self {
            basis,
            values: BTreeMap::new(),
        }
    }

    /// Value for a nutrient, if known
    #[must_use]
    pub fn get(&self, nutrient: Nutrient) -> Option<&NutrientValue> {
        self.values.get(&nutrient)
    }

    /// Amount for a nutrient, if known
    #[must_use]
    pub fn amount(&self, nutrient: Nutrient) -> Option<f64> {
        self.values.get(&nutrient).map(|v| v.amount)
    }

    /// Set a value, replacing any previous one
    pub fn insert(&mut self, nutrient: Nutrient, value: NutrientValue) {
        self.values.insert(nutrient, value);
    }

    /// Set a value only if none exists or the new one is strictly more confident
    ///
    /// Returns true when the value was stored.
    pub fn insert_if_more_confident(&mut self, nutrient: Nutrient, value: NutrientValue) -> bool {
        match self.values.get(&nutrient) {
            Some(existing) if existing.confidence >= value.confidence => false,
            _ => {
                self.values.insert(nutrient, value);
                true
            }
        }
    }

    /// Remove a value
    pub fn remove(&mut self, nutrient: Nutrient) -> Option<NutrientValue> {
        self.values.remove(&nutrient)
    }

    /// Iterate over known values in nutrient order
    pub fn iter(&self) -> impl Iterator<Item = (Nutrient, &NutrientValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    /// Mutable iteration over known values
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Nutrient, &mut NutrientValue)> {
        self.values.iter_mut().map(|(n, v)| (*n, v))
    }

    /// Number of known nutrients
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no nutrient is known
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Nutrients with no value, in label order
    #[must_use]
    pub fn unknown_nutrients(&self) -> Vec<Nutrient> {
        Nutrient::ALL
            .into_iter()
            .filter(|n| !self.values.contains_key(n))
            .collect()
    }

    /// True when any value carries one of `flags`
    #[must_use]
    pub fn any_flagged(&self, flags: ValueFlags) -> bool {
        self.values.values().any(|v| v.flags.intersects(flags))
    }
}

/// Flat nutrition projection used at the output boundary
///
/// Unknown nutrients are reported as `0.0`; callers must consult the
/// accompanying `unverified` list before trusting a zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct NutritionFacts {
    pub calories: f64,
    pub protein: f64,
    pub total_fat: f64,
    pub saturated_fat: f64,
    pub trans_fat: f64,
    pub cholesterol: f64,
    pub sodium: f64,
    pub total_carbohydrate: f64,
    pub dietary_fiber: f64,
    pub total_sugars: f64,
    pub added_sugars: f64,
    pub calcium: f64,
    pub iron: f64,
    pub potassium: f64,
}

impl NutritionFacts {
    /// Project a record, returning the facts and the nutrients that were defaulted or unverified
    #[must_use]
    pub fn from_record(record: &NutritionRecord) -> (Self, Vec<Nutrient>) {
        let mut facts = Self::default();
        let mut unverified = Vec::new();
        for nutrient in Nutrient::ALL {
            match record.get(nutrient) {
                Some(value) => {
                    *facts.slot_mut(nutrient) = round_amount(value.amount);
                    if value.flags.intersects(ValueFlags::UNVERIFIED | ValueFlags::UNNORMALIZED) {
                        unverified.push(nutrient);
                    }
                }
                None => unverified.push(nutrient),
            }
        }
        (facts, unverified)
    }

    /// Amount for a nutrient
    #[must_use]
    pub const fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Calories => self.calories,
            Nutrient::Protein => self.protein,
            Nutrient::TotalFat => self.total_fat,
            Nutrient::SaturatedFat => self.saturated_fat,
            Nutrient::TransFat => self.trans_fat,
            Nutrient::Cholesterol => self.cholesterol,
            Nutrient::Sodium => self.sodium,
            Nutrient::TotalCarbohydrate => self.total_carbohydrate,
            Nutrient::DietaryFiber => self.dietary_fiber,
            Nutrient::TotalSugars => self.total_sugars,
            Nutrient::AddedSugars => self.added_sugars,
            Nutrient::Calcium => self.calcium,
            Nutrient::Iron => self.iron,
            Nutrient::Potassium => self.potassium,
        }
    }

    fn slot_mut(&mut self, nutrient: Nutrient) -> &mut f64 {
        match nutrient {
            Nutrient::Calories => &mut self.calories,
            Nutrient::Protein => &mut self.protein,
            Nutrient::TotalFat => &mut self.total_fat,
            Nutrient::SaturatedFat => &mut self.saturated_fat,
            Nutrient::TransFat => &mut self.trans_fat,
            Nutrient::Cholesterol => &mut self.cholesterol,
            Nutrient::Sodium => &mut self.sodium,
            Nutrient::TotalCarbohydrate => &mut self.total_carbohydrate,
            Nutrient::DietaryFiber => &mut self.dietary_fiber,
            Nutrient::TotalSugars => &mut self.total_sugars,
            Nutrient::AddedSugars => &mut self.added_sugars,
            Nutrient::Calcium => &mut self.calcium,
            Nutrient::Iron => &mut self.iron,
            Nutrient::Potassium => &mut self.potassium,
        }
    }
}

// Two decimals is the precision printed on labels
fn round_amount(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
