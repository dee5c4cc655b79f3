// ABOUTME: OpenFoodFacts API client for barcode lookup and product name search
// ABOUTME: Converts per-100 g/ml nutriments into a barcode-database SourceFragment
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! `OpenFoodFacts` API Client
//!
//! `OpenFoodFacts` is a free, open product database. No API key is needed, but
//! the service asks clients to identify themselves with a `User-Agent`.
//!
//! # API Reference
//! - Product by barcode: `GET /api/v0/product/{barcode}.json`
//! - Search: `GET /cgi/search.pl?search_terms=...&json=1`
//!
//! Nutriments are reported per 100 g or 100 ml with mass in grams, so sodium,
//! cholesterol and minerals are converted to milligrams here.

use std::time::Duration;

use async_trait::async_trait;
use foodscore_core::constants::units::MG_PER_G;
use foodscore_core::models::{
    Basis, Nutrient, NutrientValue, NutritionRecord, SourceFragment, SourceKind,
};
use foodscore_intelligence::normalizer::ServingKind;
use foodscore_intelligence::{split_ingredients, ServingSize};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use super::{gtin, ProductDatabase};
use crate::errors::{AppError, AppResult};

const SERVICE: &str = "OpenFoodFacts API";

/// Confidence assigned to database values
const DATABASE_CONFIDENCE: f64 = 0.9;

/// Kilojoules per kilocalorie
const KJ_PER_KCAL: f64 = 4.184;

/// Sodium is 40% of salt by mass
const SODIUM_PER_SALT: f64 = 0.4;

/// `_100g` nutriment keys, the nutrient they map to, and the factor to canonical units
const NUTRIMENT_KEYS: &[(&str, Nutrient, f64)] = &[
    ("energy-kcal_100g", Nutrient::Calories, 1.0),
    ("proteins_100g", Nutrient::Protein, 1.0),
    ("fat_100g", Nutrient::TotalFat, 1.0),
    ("saturated-fat_100g", Nutrient::SaturatedFat, 1.0),
    ("trans-fat_100g", Nutrient::TransFat, 1.0),
    ("cholesterol_100g", Nutrient::Cholesterol, MG_PER_G),
    ("sodium_100g", Nutrient::Sodium, MG_PER_G),
    ("carbohydrates_100g", Nutrient::TotalCarbohydrate, 1.0),
    ("fiber_100g", Nutrient::DietaryFiber, 1.0),
    ("sugars_100g", Nutrient::TotalSugars, 1.0),
    ("added-sugars_100g", Nutrient::AddedSugars, 1.0),
    ("calcium_100g", Nutrient::Calcium, MG_PER_G),
    ("iron_100g", Nutrient::Iron, MG_PER_G),
    ("potassium_100g", Nutrient::Potassium, MG_PER_G),
];

/// `OpenFoodFacts` client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenFoodFactsConfig {
    /// Base URL (default: <https://world.openfoodfacts.org>)
    pub base_url: String,
    /// `User-Agent` sent with every request
    pub user_agent: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of search results to consider
    pub search_page_size: u32,
}

impl Default for OpenFoodFactsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://world.openfoodfacts.org".to_owned(),
            user_agent: format!("FoodScore/{} (nutrition scoring)", env!("CARGO_PKG_VERSION")),
            timeout_secs: 10,
            search_page_size: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    product: Option<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    products: Vec<OffProduct>,
}

#[derive(Debug, Default, Deserialize)]
struct OffProduct {
    code: Option<String>,
    product_name: Option<String>,
    brands: Option<String>,
    quantity: Option<String>,
    serving_size: Option<String>,
    ingredients_text: Option<String>,
    #[serde(default)]
    nutriments: Map<String, Value>,
}

/// `OpenFoodFacts` API client
pub struct OpenFoodFactsClient {
    config: OpenFoodFactsConfig,
    http_client: reqwest::Client,
}

impl OpenFoodFactsClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: OpenFoodFactsConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn get_json(&self, url: &str, query: &[(&str, &str)]) -> AppResult<String> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    AppError::external_unavailable(SERVICE, e.to_string())
                } else {
                    AppError::external_service(SERVICE, e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                SERVICE,
                format!(
                    "HTTP {}: {}",
                    response.status(),
                    response
                        .text()
                        .await
                        .unwrap_or_default()
                        .chars()
                        .take(200)
                        .collect::<String>()
                ),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| AppError::external_service(SERVICE, format!("Failed to read body: {e}")))
    }
}

#[async_trait]
impl ProductDatabase for OpenFoodFactsClient {
    fn name(&self) -> &'static str {
        "openfoodfacts"
    }

    #[instrument(skip(self))]
    async fn lookup_barcode(&self, barcode: &str) -> AppResult<Option<SourceFragment>> {
        let code = gtin::normalize(barcode)
            .ok_or_else(|| AppError::invalid_input(format!("Invalid barcode: {barcode}")))?;
        let url = format!(
            "{}/api/v0/product/{code}.json",
            self.config.base_url.trim_end_matches('/')
        );
        let body = self.get_json(&url, &[]).await?;
        parse_product_response(&body)
    }

    #[instrument(skip(self))]
    async fn search_by_name(&self, name: &str) -> AppResult<Option<SourceFragment>> {
        let query = name.trim();
        if query.is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }
        let url = format!(
            "{}/cgi/search.pl",
            self.config.base_url.trim_end_matches('/')
        );
        let page_size = self.config.search_page_size.to_string();
        let body = self
            .get_json(
                &url,
                &[
                    ("search_terms", query),
                    ("search_simple", "1"),
                    ("action", "process"),
                    ("json", "1"),
                    ("page_size", &page_size),
                ],
            )
            .await?;
        parse_search_response(&body)
    }
}

/// Parse a `/api/v0/product` body; `None` when the product is unknown
///
/// # Errors
///
/// Returns an error when the body is not valid JSON
pub fn parse_product_response(body: &str) -> AppResult<Option<SourceFragment>> {
    let response: ProductResponse = serde_json::from_str(body)
        .map_err(|e| AppError::external_service(SERVICE, format!("JSON parse error: {e}")))?;
    if response.status != 1 {
        debug!("Product not found in OpenFoodFacts");
        return Ok(None);
    }
    Ok(response.product.map(|p| to_fragment(&p)))
}

/// Parse a search body, returning the first result that carries nutrition
///
/// # Errors
///
/// Returns an error when the body is not valid JSON
pub fn parse_search_response(body: &str) -> AppResult<Option<SourceFragment>> {
    let response: SearchResponse = serde_json::from_str(body)
        .map_err(|e| AppError::external_service(SERVICE, format!("JSON parse error: {e}")))?;
    let fragments: Vec<SourceFragment> = response.products.iter().map(to_fragment).collect();
    let best = fragments
        .iter()
        .position(|f| !f.nutrition.is_empty())
        .or_else(|| (!fragments.is_empty()).then_some(0));
    Ok(best.and_then(|i| fragments.into_iter().nth(i)))
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

fn nutriment(nutriments: &Map<String, Value>, key: &str) -> Option<f64> {
    let amount = match nutriments.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse().ok(),
        _ => None,
    }?;
    (amount.is_finite() && amount >= 0.0).then_some(amount)
}

fn is_liquid(product: &OffProduct) -> bool {
    [product.quantity.as_deref(), product.serving_size.as_deref()]
        .into_iter()
        .flatten()
        .filter_map(ServingSize::parse)
        .next()
        .is_some_and(|s| s.kind == ServingKind::Volume)
}

fn to_fragment(product: &OffProduct) -> SourceFragment {
    let basis = if is_liquid(product) {
        Basis::Per100Milliliters
    } else {
        Basis::Per100Grams
    };

    let mut nutrition = NutritionRecord::new(basis);
    let mut store = |nutrient: Nutrient, amount: f64| {
        nutrition.insert(
            nutrient,
            NutrientValue::new(
                amount,
                nutrient.canonical_unit(),
                DATABASE_CONFIDENCE,
                SourceKind::BarcodeDatabase,
            ),
        );
    };
    for (key, nutrient, factor) in NUTRIMENT_KEYS {
        if let Some(amount) = nutriment(&product.nutriments, key) {
            store(*nutrient, amount * factor);
        }
    }

    // Older records only carry kJ energy or salt
    if !product.nutriments.contains_key("energy-kcal_100g") {
        if let Some(kj) = nutriment(&product.nutriments, "energy_100g") {
            store(Nutrient::Calories, kj / KJ_PER_KCAL);
        }
    }
    if !product.nutriments.contains_key("sodium_100g") {
        if let Some(salt) = nutriment(&product.nutriments, "salt_100g") {
            store(Nutrient::Sodium, salt * SODIUM_PER_SALT * MG_PER_G);
        }
    }

    let ingredients = product
        .ingredients_text
        .as_deref()
        .map(|text| split_ingredients(&text.replace('_', "")))
        .unwrap_or_default();

    let mut fragment = SourceFragment::new(SourceKind::BarcodeDatabase);
    fragment.product_name = non_empty(product.product_name.as_ref());
    fragment.brand = product
        .brands
        .as_deref()
        .and_then(|b| b.split(',').next())
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(ToOwned::to_owned);
    fragment.barcode = non_empty(product.code.as_ref());
    fragment.serving_size = non_empty(product.serving_size.as_ref());
    fragment.nutrition = nutrition;
    fragment.ingredients = ingredients;
    fragment
}
