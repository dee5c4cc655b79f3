// ABOUTME: Heuristic parser turning noisy nutrition-label text into structured fields
// ABOUTME: Synonym-driven nutrient extraction with per-field confidence plus ingredient splitting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Label Parser
//!
//! Extracts nutrient amounts, the ingredient list, the serving size and the
//! declared basis from recognized label text. Parsing never fails: lines that
//! cannot be interpreted are skipped and the result is simply less complete.
//!
//! ## Confidence model
//!
//! Each synonym carries a base confidence reflecting how specific it is
//! ("added sugars" is unambiguous, "sugar" is not). The base is then reduced
//! when the unit had to be assumed, converted, or when the label only printed
//! an upper bound.

use std::cmp::Reverse;
use std::sync::OnceLock;

use foodscore_core::models::{
    Basis, IngredientList, Nutrient, NutrientValue, NutritionRecord, SourceFragment, SourceKind,
    Unit, ValueFlags,
};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Multiplier applied when the unit was missing and assumed canonical
const ASSUMED_UNIT_FACTOR: f64 = 0.8;
/// Multiplier applied when the printed unit was converted
const CONVERTED_UNIT_FACTOR: f64 = 0.95;
/// Multiplier applied to "<x" upper-bound values
const UPPER_BOUND_FACTOR: f64 = 0.7;
/// Multiplier applied when the amount was printed before the label
const LEADING_VALUE_FACTOR: f64 = 0.9;

/// Label synonyms, base confidence, and the nutrient they name (`None` = recognised but ignored)
const SYNONYMS: &[(&str, Option<Nutrient>, f64)] = &[
    ("calories from fat", None, 0.0),
    ("calories", Some(Nutrient::Calories), 0.85),
    ("energy", Some(Nutrient::Calories), 0.75),
    ("total fat", Some(Nutrient::TotalFat), 0.9),
    ("fat", Some(Nutrient::TotalFat), 0.7),
    ("saturated fat", Some(Nutrient::SaturatedFat), 0.9),
    ("sat. fat", Some(Nutrient::SaturatedFat), 0.85),
    ("sat fat", Some(Nutrient::SaturatedFat), 0.85),
    ("saturates", Some(Nutrient::SaturatedFat), 0.85),
    ("trans fat", Some(Nutrient::TransFat), 0.9),
    ("polyunsaturated fat", None, 0.0),
    ("monounsaturated fat", None, 0.0),
    ("cholesterol", Some(Nutrient::Cholesterol), 0.85),
    ("sodium", Some(Nutrient::Sodium), 0.85),
    ("total carbohydrate", Some(Nutrient::TotalCarbohydrate), 0.9),
    ("total carbohydrates", Some(Nutrient::TotalCarbohydrate), 0.9),
    ("total carbs", Some(Nutrient::TotalCarbohydrate), 0.85),
    ("carbohydrate", Some(Nutrient::TotalCarbohydrate), 0.75),
    ("carbohydrates", Some(Nutrient::TotalCarbohydrate), 0.75),
    ("carbs", Some(Nutrient::TotalCarbohydrate), 0.7),
    ("dietary fiber", Some(Nutrient::DietaryFiber), 0.9),
    ("dietary fibre", Some(Nutrient::DietaryFiber), 0.9),
    ("fiber", Some(Nutrient::DietaryFiber), 0.75),
    ("fibre", Some(Nutrient::DietaryFiber), 0.75),
    ("total sugars", Some(Nutrient::TotalSugars), 0.9),
    ("total sugar", Some(Nutrient::TotalSugars), 0.9),
    ("sugars", Some(Nutrient::TotalSugars), 0.75),
    ("sugar", Some(Nutrient::TotalSugars), 0.7),
    ("added sugars", Some(Nutrient::AddedSugars), 0.9),
    ("added sugar", Some(Nutrient::AddedSugars), 0.9),
    ("protein", Some(Nutrient::Protein), 0.85),
    ("calcium", Some(Nutrient::Calcium), 0.85),
    ("iron", Some(Nutrient::Iron), 0.85),
    ("potassium", Some(Nutrient::Potassium), 0.85),
];

/// Headings that end an ingredient block
const SECTION_HEADINGS: &[&str] = &[
    "nutrition",
    "allergen",
    "contains",
    "may contain",
    "storage",
    "store ",
    "serving",
    "best before",
    "use by",
    "manufactured",
    "packed",
    "distributed",
];

/// Structured result of parsing one label
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedLabel {
    /// Nutrients found, tagged as OCR-sourced
    pub nutrition: NutritionRecord,
    /// Ingredients in label order
    pub ingredients: IngredientList,
    /// Serving size text, if printed
    pub serving_size: Option<String>,
    /// Best guess at the product name
    pub product_name: Option<String>,
}

impl ParsedLabel {
    /// Convert into an OCR source fragment
    #[must_use]
    pub fn into_fragment(self) -> SourceFragment {
        let mut fragment = SourceFragment::new(SourceKind::Ocr);
        fragment.product_name = self.product_name;
        fragment.serving_size = self.serving_size;
        fragment.nutrition = self.nutrition;
        fragment.ingredients = self.ingredients;
        fragment
    }
}

/// Parse recognized label text
#[must_use]
pub fn parse_label(text: &str) -> ParsedLabel {
    let mut nutrition = NutritionRecord::new(Basis::Unspecified);

    for line in text.lines() {
        for (nutrient, value) in parse_nutrient_line(line) {
            nutrition.insert_if_more_confident(nutrient, value);
        }
    }

    let serving_size = extract_serving_size(text);
    nutrition.basis = detect_basis(text).unwrap_or(if serving_size.is_some() {
        Basis::PerServing
    } else {
        Basis::Unspecified
    });

    let ingredients = extract_ingredients(text);
    let product_name = extract_product_name(text);

    debug!(
        nutrients = nutrition.len(),
        ingredients = ingredients.len(),
        basis = ?nutrition.basis,
        serving = ?serving_size,
        "Parsed label text"
    );

    ParsedLabel {
        nutrition,
        ingredients,
        serving_size,
        product_name,
    }
}

fn synonym_regex() -> Option<&'static Regex> {
    static SYNONYM_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    SYNONYM_REGEX
        .get_or_init(|| {
            let mut names: Vec<&str> = SYNONYMS.iter().map(|(name, _, _)| *name).collect();
            // Leftmost-first alternation: longer synonyms must be tried first
            names.sort_by_key(|name| Reverse(name.len()));
            let alternation = names
                .iter()
                .map(|name| regex::escape(name))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).ok()
        })
        .as_ref()
}

fn amount_regex() -> Option<&'static Regex> {
    static AMOUNT_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    AMOUNT_REGEX
        .get_or_init(|| {
            Regex::new(
                r"(?i)(?P<lt><|less than)?\s*(?P<num>\d+(?:[.,]\d+)*)\s*(?:(?P<unit>kcal|kj|mcg|µg|μg|mg|g)\b|(?P<pct>%))?",
            )
            .ok()
        })
        .as_ref()
}

fn basis_phrase_regex() -> Option<&'static Regex> {
    static BASIS_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    BASIS_REGEX
        .get_or_init(|| {
            Regex::new(r"(?i)\bper\s*100\s*(?P<unit>g|gm|grams?|ml|millilit(?:re|er)s?)\b").ok()
        })
        .as_ref()
}

fn serving_regex() -> Option<&'static Regex> {
    static SERVING_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    SERVING_REGEX
        .get_or_init(|| Regex::new(r"(?i)\bserving\s*size\b\s*[:\-]?\s*(?P<value>[^\n]+)").ok())
        .as_ref()
}

/// One numeric token found near a label
#[derive(Debug, Clone, Copy)]
struct AmountToken<'a> {
    amount: f64,
    unit: Option<&'a str>,
    percent: bool,
    upper_bound: bool,
    /// Byte span of the whole token within the searched window
    start: usize,
    end: usize,
}

impl<'a> AmountToken<'a> {
    fn from_captures(caps: &Captures<'a>) -> Option<Self> {
        let amount = parse_number(caps.name("num")?.as_str())?;
        let whole = caps.get(0)?;
        Some(Self {
            amount,
            unit: caps.name("unit").map(|m| m.as_str()),
            percent: caps.name("pct").is_some(),
            upper_bound: caps.name("lt").is_some(),
            start: whole.start(),
            end: whole.end(),
        })
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let normalized = match raw.rsplit_once(',') {
        // "1,200" is a thousands separator, "2,5" a decimal comma
        Some((_, tail)) if tail.len() == 3 && !raw.contains('.') => raw.replace(',', ""),
        Some(_) => raw.replace(',', "."),
        None => raw.to_owned(),
    };
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn amount_tokens(window: &str) -> Vec<AmountToken<'_>> {
    amount_regex().map_or_else(Vec::new, |re| {
        re.captures_iter(window)
            .filter_map(|caps| AmountToken::from_captures(&caps))
            .collect()
    })
}

/// Blank out "per 100 g" style phrases so their digits are not read as amounts
fn mask_basis_phrases(line: &str) -> String {
    basis_phrase_regex().map_or_else(
        || line.to_owned(),
        |re| {
            re.replace_all(line, |caps: &Captures<'_>| " ".repeat(caps[0].len()))
                .into_owned()
        },
    )
}

fn lookup_synonym(matched: &str) -> Option<(Option<Nutrient>, f64)> {
    let lowered = matched.to_lowercase();
    SYNONYMS
        .iter()
        .find(|(name, _, _)| *name == lowered)
        .map(|(_, nutrient, confidence)| (*nutrient, *confidence))
}

fn parse_nutrient_line(raw_line: &str) -> Vec<(Nutrient, NutrientValue)> {
    let Some(re) = synonym_regex() else {
        return Vec::new();
    };
    let line = mask_basis_phrases(raw_line);
    let labels: Vec<_> = re.find_iter(&line).collect();
    let mut results = Vec::new();
    // End of the last amount claimed by a label; one printed number feeds one nutrient
    let mut consumed_end = 0;

    for (idx, label) in labels.iter().enumerate() {
        let Some((Some(nutrient), base_confidence)) = lookup_synonym(label.as_str()) else {
            continue;
        };
        let after_end = labels.get(idx + 1).map_or(line.len(), |next| next.start());
        let before_start = idx
            .checked_sub(1)
            .map_or(0, |prev| labels[prev].end())
            .max(consumed_end)
            .min(label.start());

        let after = amount_tokens(&line[label.end()..after_end]);
        let chosen = pick_after(nutrient, &after)
            .map(|t| (t, 1.0, label.end() + t.end))
            .or_else(|| {
                amount_tokens(&line[before_start..label.start()])
                    .into_iter()
                    .rev()
                    .find(|t| !t.percent)
                    .map(|t| (t, LEADING_VALUE_FACTOR, label.end()))
            });

        let Some((token, position_factor, claimed_end)) = chosen else {
            debug!(nutrient = %nutrient, line = raw_line, "No amount found for nutrient label");
            continue;
        };
        consumed_end = claimed_end;
        if let Some(value) = resolve_value(nutrient, token, base_confidence * position_factor) {
            results.push((nutrient, value));
        }
    }

    results
}

fn pick_after<'a>(nutrient: Nutrient, tokens: &[AmountToken<'a>]) -> Option<AmountToken<'a>> {
    let first = *tokens.first()?;
    if first.percent {
        return None;
    }
    // "Energy 1046 kJ / 250 kcal": prefer the kilocalorie figure
    if nutrient == Nutrient::Calories && first.unit.is_some_and(|u| u.eq_ignore_ascii_case("kj")) {
        return tokens
            .iter()
            .find(|t| t.unit.is_some_and(|u| u.eq_ignore_ascii_case("kcal")))
            .copied();
    }
    Some(first)
}

fn resolve_value(nutrient: Nutrient, token: AmountToken<'_>, base: f64) -> Option<NutrientValue> {
    let canonical = nutrient.canonical_unit();
    let mut confidence = base;
    let mut flags = ValueFlags::empty();

    let amount = match token.unit {
        None => {
            if nutrient != Nutrient::Calories {
                confidence *= ASSUMED_UNIT_FACTOR;
            }
            token.amount
        }
        Some(symbol) => {
            // kJ and unknown units are unresolved rather than guessed
            let unit = Unit::parse(symbol)?;
            let converted = unit.convert(token.amount, canonical)?;
            if unit != canonical {
                confidence *= CONVERTED_UNIT_FACTOR;
                flags |= ValueFlags::CONVERTED;
            }
            converted
        }
    };

    if token.upper_bound {
        confidence *= UPPER_BOUND_FACTOR;
        flags |= ValueFlags::UPPER_BOUND;
    }

    Some(NutrientValue::new(amount, canonical, confidence, SourceKind::Ocr).with_flags(flags))
}

fn detect_basis(text: &str) -> Option<Basis> {
    let caps = basis_phrase_regex()?.captures(text)?;
    let unit = caps.name("unit")?.as_str().to_lowercase();
    Some(if unit.starts_with('m') {
        Basis::Per100Milliliters
    } else {
        Basis::Per100Grams
    })
}

fn extract_serving_size(text: &str) -> Option<String> {
    let caps = serving_regex()?.captures(text)?;
    let value = caps.name("value")?.as_str();
    // Labels often run "Serving Size 30g Servings Per Container 8" on one line
    let value = value
        .split_once("Servings")
        .or_else(|| value.split_once("servings"))
        .map_or(value, |(head, _)| head);
    let cleaned = value.trim().trim_end_matches(['.', ',', ';']).trim();
    (!cleaned.is_empty()).then(|| cleaned.to_owned())
}

fn is_section_heading(line: &str) -> bool {
    let lowered = line.trim().to_lowercase();
    SECTION_HEADINGS.iter().any(|h| lowered.starts_with(h))
}

/// True when the line opens with a nutrient label directly followed by an amount
///
/// Ingredient lists mention nutrients too ("sugar (12%)", "vitamin B6"), so a
/// synonym anywhere on the line is not enough to end an ingredient block.
fn is_nutrient_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    let Some(label) = synonym_regex().and_then(|re| re.find(trimmed)) else {
        return false;
    };
    if label.start() != 0 {
        return false;
    }
    let rest = trimmed[label.end()..].trim_start_matches(|c: char| c.is_whitespace() || c == ':');
    amount_tokens(rest)
        .first()
        .is_some_and(|token| token.start == 0 && !token.percent)
}

fn ingredient_heading(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let lowered = trimmed.to_lowercase();
    let heading_len = ["ingredient list", "ingredients", "ingredient"]
        .iter()
        .find(|h| lowered.starts_with(*h))
        .map(|h| h.len())?;
    let rest = trimmed.get(heading_len..)?;
    Some(rest.trim_start().trim_start_matches([':', '-']).trim_start())
}

fn extract_ingredients(text: &str) -> IngredientList {
    let lines: Vec<&str> = text.lines().collect();
    let Some((start, first)) = lines
        .iter()
        .enumerate()
        .find_map(|(i, line)| ingredient_heading(line).map(|rest| (i, rest)))
    else {
        return IngredientList::new();
    };

    let mut block = String::from(first);
    for line in lines.iter().skip(start + 1) {
        if line.trim().is_empty() || is_section_heading(line) || is_nutrient_line(line) {
            break;
        }
        block.push(' ');
        block.push_str(line.trim());
    }

    // Inline allergen statements follow the list on the same line
    let lowered = block.to_lowercase();
    if let Some(cut) = ["contains:", "allergens:", "allergen advice"]
        .iter()
        .filter_map(|marker| lowered.find(marker))
        .min()
    {
        block.truncate(cut);
    }

    split_ingredients(&block)
}

/// Split a comma-separated ingredient statement, keeping bracketed sub-lists intact
///
/// Used for label blocks and for ingredient text supplied by product databases.
#[must_use]
pub fn split_ingredients(statement: &str) -> IngredientList {
    split_top_level(statement)
        .into_iter()
        .map(clean_ingredient)
        .filter(|item| item.chars().count() >= 2)
        .collect()
}

/// Split on commas and semicolons that are not nested inside brackets
fn split_top_level(block: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    for (idx, ch) in block.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' | ';' if depth == 0 => {
                parts.push(&block[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&block[start..]);
    parts
}

fn clean_ingredient(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c == '.' || c == '*' || c.is_whitespace())
        .to_owned()
}

fn extract_product_name(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(3)
        .find(|line| {
            let len = line.chars().count();
            (3..=60).contains(&len)
                && !line.chars().any(|c| c.is_ascii_digit())
                && !is_section_heading(line)
                && ingredient_heading(line).is_none()
                && !synonym_regex().is_some_and(|re| re.is_match(line))
                && !line.to_lowercase().contains("facts")
        })
        .map(ToOwned::to_owned)
}
