// ABOUTME: Fixed demo product catalogue used when the server runs without network lookups
// ABOUTME: Serves Coca-Cola, Nutella and a whole-grain bread as barcode-database fragments
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use async_trait::async_trait;
use foodscore_core::models::{
    Basis, IngredientList, Nutrient, NutrientValue, NutritionRecord, SourceFragment, SourceKind,
};

use super::{gtin, ProductDatabase};
use crate::errors::AppResult;

/// Barcode of the demo cola
pub const DEMO_COLA_BARCODE: &str = "5449000000996";

/// Barcode of the demo hazelnut spread
pub const DEMO_SPREAD_BARCODE: &str = "3017620422003";

struct DemoProduct {
    name: &'static str,
    brand: &'static str,
    barcode: Option<&'static str>,
    basis: Basis,
    serving_size: &'static str,
    nutrition: &'static [(Nutrient, f64)],
    ingredients: &'static [&'static str],
}

static COLA: DemoProduct = DemoProduct {
    name: "Coca-Cola Classic",
    brand: "The Coca-Cola Company",
    barcode: Some(DEMO_COLA_BARCODE),
    basis: Basis::Per100Milliliters,
    serving_size: "100 ml",
    nutrition: &[
        (Nutrient::Calories, 42.0),
        (Nutrient::Protein, 0.0),
        (Nutrient::TotalFat, 0.0),
        (Nutrient::SaturatedFat, 0.0),
        (Nutrient::TransFat, 0.0),
        (Nutrient::Sodium, 1.0),
        (Nutrient::TotalCarbohydrate, 10.6),
        (Nutrient::DietaryFiber, 0.0),
        (Nutrient::TotalSugars, 10.6),
        (Nutrient::AddedSugars, 10.6),
    ],
    ingredients: &[
        "Carbonated Water",
        "Sugar",
        "Caramel Color",
        "Phosphoric Acid",
        "Natural Flavors",
        "Caffeine",
    ],
};

static SPREAD: DemoProduct = DemoProduct {
    name: "Nutella Hazelnut Spread",
    brand: "Ferrero",
    barcode: Some(DEMO_SPREAD_BARCODE),
    basis: Basis::Per100Grams,
    serving_size: "15 g",
    nutrition: &[
        (Nutrient::Calories, 539.0),
        (Nutrient::Protein, 6.3),
        (Nutrient::TotalFat, 30.9),
        (Nutrient::SaturatedFat, 10.6),
        (Nutrient::TransFat, 0.0),
        (Nutrient::Sodium, 43.0),
        (Nutrient::TotalCarbohydrate, 57.5),
        (Nutrient::DietaryFiber, 3.4),
        (Nutrient::TotalSugars, 56.3),
    ],
    ingredients: &[
        "Sugar",
        "Palm Oil",
        "Hazelnuts",
        "Skimmed Milk Powder",
        "Fat-Reduced Cocoa",
        "Emulsifier: Lecithins (Soya)",
        "Vanillin",
    ],
};

static BREAD: DemoProduct = DemoProduct {
    name: "Whole Grain Bread",
    brand: "Demo Bakery",
    barcode: None,
    basis: Basis::Per100Grams,
    serving_size: "1 slice (38 g)",
    nutrition: &[
        (Nutrient::Calories, 247.0),
        (Nutrient::Protein, 13.4),
        (Nutrient::TotalFat, 4.2),
        (Nutrient::SaturatedFat, 0.9),
        (Nutrient::TransFat, 0.0),
        (Nutrient::Cholesterol, 0.0),
        (Nutrient::Sodium, 450.0),
        (Nutrient::TotalCarbohydrate, 41.0),
        (Nutrient::DietaryFiber, 7.0),
        (Nutrient::TotalSugars, 5.0),
        (Nutrient::AddedSugars, 2.0),
        (Nutrient::Calcium, 100.0),
        (Nutrient::Iron, 2.5),
        (Nutrient::Potassium, 200.0),
    ],
    ingredients: &[
        "Whole Wheat Flour",
        "Water",
        "Yeast",
        "Salt",
        "Sugar",
        "Vegetable Oil",
        "Calcium Propionate (Preservative)",
    ],
};

impl DemoProduct {
    fn to_fragment(&self) -> SourceFragment {
        let mut nutrition = NutritionRecord::new(self.basis);
        for &(nutrient, amount) in self.nutrition {
            nutrition.insert(
                nutrient,
                NutrientValue::new(
                    amount,
                    nutrient.canonical_unit(),
                    1.0,
                    SourceKind::BarcodeDatabase,
                ),
            );
        }

        let mut fragment = SourceFragment::new(SourceKind::BarcodeDatabase);
        fragment.product_name = Some(self.name.to_owned());
        fragment.brand = Some(self.brand.to_owned());
        fragment.barcode = self.barcode.map(ToOwned::to_owned);
        fragment.serving_size = Some(self.serving_size.to_owned());
        fragment.nutrition = nutrition;
        fragment.ingredients = self.ingredients.iter().collect::<IngredientList>();
        fragment
    }
}

/// In-memory product database with a fixed demo catalogue
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoProductDatabase;

#[async_trait]
impl ProductDatabase for DemoProductDatabase {
    fn name(&self) -> &'static str {
        "demo"
    }

    async fn lookup_barcode(&self, barcode: &str) -> AppResult<Option<SourceFragment>> {
        let code = gtin::normalize(barcode);
        let product = match code.as_deref() {
            Some(DEMO_COLA_BARCODE) => Some(&COLA),
            Some(DEMO_SPREAD_BARCODE) => Some(&SPREAD),
            _ => None,
        };
        Ok(product.map(DemoProduct::to_fragment))
    }

    async fn search_by_name(&self, name: &str) -> AppResult<Option<SourceFragment>> {
        let lowered = name.to_lowercase();
        let product = if lowered.contains("coca") || lowered.contains("cola") {
            Some(&COLA)
        } else if lowered.contains("nutella") || lowered.contains("hazelnut") {
            Some(&SPREAD)
        } else if lowered.contains("bread") {
            Some(&BREAD)
        } else {
            None
        };
        Ok(product.map(DemoProduct::to_fragment))
    }
}
