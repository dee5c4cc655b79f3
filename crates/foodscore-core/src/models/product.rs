// ABOUTME: Product-level models assembled per analysis request
// ABOUTME: IngredientList, SourceFragment (one source's partial view) and the merged ProductRecord
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::nutrition::{Nutrient, NutritionRecord};
use super::source::SourceKind;

/// Ordered ingredient names, as printed on the label (descending proportion)
///
/// Duplicates are collapsed case-insensitively, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct IngredientList(Vec<String>);

impl IngredientList {
    /// Empty list
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append an ingredient unless blank or already present
    ///
    /// Returns true when the ingredient was added.
    pub fn push(&mut self, ingredient: impl AsRef<str>) -> bool {
        let trimmed = ingredient.as_ref().trim();
        if trimmed.is_empty() || self.contains(trimmed) {
            return false;
        }
        self.0.push(trimmed.to_owned());
        true
    }

    /// Append every ingredient of `other` that is not already present
    pub fn extend_from(&mut self, other: &Self) {
        for ingredient in &other.0 {
            self.push(ingredient);
        }
    }

    /// Case-insensitive membership test
    #[must_use]
    pub fn contains(&self, ingredient: &str) -> bool {
        let needle = ingredient.trim().to_lowercase();
        self.0.iter().any(|i| i.to_lowercase() == needle)
    }

    /// Ingredients in label order
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Iterate in label order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of ingredients
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for IngredientList {
    fn from(items: Vec<String>) -> Self {
        items.into_iter().collect()
    }
}

impl From<IngredientList> for Vec<String> {
    fn from(list: IngredientList) -> Self {
        list.0
    }
}

impl<S: AsRef<str>> FromIterator<S> for IngredientList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.push(item);
        }
        list
    }
}

/// Everything a single source contributed for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFragment {
    /// Which source produced this fragment
    pub source: SourceKind,
    /// Product name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    /// Brand name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Barcode (EAN/UPC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    /// Serving size as printed ("30 g", "1 cup (240ml)")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serving_size: Option<String>,
    /// Nutrition values (normalized before merging)
    pub nutrition: NutritionRecord,
    /// Ingredients
    pub ingredients: IngredientList,
}

impl SourceFragment {
    /// Empty fragment for a source
    #[must_use]
    pub fn new(source: SourceKind) -> Self {
        Self {
            source,
            product_name: None,
            brand: None,
            barcode: None,
            serving_size: None,
            nutrition: NutritionRecord::default(),
            ingredients: IngredientList::new(),
        }
    }

    /// True when the fragment carries no nutrition, ingredients or identity
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nutrition.is_empty()
            && self.ingredients.is_empty()
            && self.product_name.is_none()
            && self.barcode.is_none()
    }
}

/// Consolidated product view after merging every available source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Product name
    pub product_name: Option<String>,
    /// Brand name
    pub brand: Option<String>,
    /// Barcode (EAN/UPC)
    pub barcode: Option<String>,
    /// Serving size as printed
    pub serving_size: Option<String>,
    /// Highest-precedence source that contributed data, `None` when nothing did
    pub source: Option<SourceKind>,
    /// Merged nutrition
    pub nutrition: NutritionRecord,
    /// Merged ingredients
    pub ingredients: IngredientList,
    /// Source that supplied each known nutrient
    pub provenance: BTreeMap<Nutrient, SourceKind>,
}
