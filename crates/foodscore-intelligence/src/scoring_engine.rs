// ABOUTME: Deterministic rule-based health scoring of normalized nutrition records
// ABOUTME: Guideline penalties, bounded rewards, ingredient markers and advisory score blending
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! Health Scoring Engine
//!
//! Computes a 0-100 health score for a product from its per-100 g/ml nutrition,
//! its ingredient list and an optional advisory medical insight. The function
//! is pure: identical inputs always produce the identical result.
//!
//! # Scientific References
//!
//! - World Health Organization (2015). Guideline: Sugars intake for adults and children.
//!   <https://www.who.int/publications/i/item/9789241549028>
//!
//! - World Health Organization (2012). Guideline: Sodium intake for adults and children.
//!   <https://www.who.int/publications/i/item/9789241504836>
//!
//! - World Health Organization (2023). Saturated fatty acid and trans-fatty acid intake
//!   for adults and children. <https://www.who.int/publications/i/item/9789240073630>
//!
//! - Monteiro, C.A., et al. (2019). Ultra-processed foods: what they are and how to
//!   identify them. *Public Health Nutrition*, 22(5), 936-941.
//!   <https://doi.org/10.1017/S1368980018003762>
//!
//! # Rule order
//!
//! 1. Baseline (100)
//! 2. Nutrient penalties, each capped independently
//! 3. Ingredient penalties
//! 4. Rewards, capped in total and never lifting the score above 100
//! 5. Advisory blending toward the model's suggested score, bounded
//! 6. Clamp, round, band

use foodscore_core::models::{
    HealthBand, IngredientList, MedicalInsight, Nutrient, NutritionRecord, ValueFlags,
};
use serde::Serialize;
use tracing::debug;

use crate::config::ScoringConfig;
use crate::explanations::{
    band_recommendation, format_amount, format_points, per_reference, ScoringRule,
    DEFAULT_EVIDENCE, INSUFFICIENT_DATA, NO_CONCERNS, SUSPECT_DATA,
};
use crate::ingredients::IngredientProfile;

/// Upper bound of the score scale
const MAX_SCORE: f64 = 100.0;

/// One rule's contribution to the final score
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreAdjustment {
    /// Rule that fired
    pub rule: ScoringRule,
    /// Signed point change (negative for penalties)
    pub points: f64,
}

/// Immutable outcome of scoring one product
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    score: u8,
    band: HealthBand,
    explanations: Vec<String>,
    recommendations: Vec<String>,
    evidence: Vec<String>,
    adjustments: Vec<ScoreAdjustment>,
}

impl ScoreResult {
    /// Score in `[0, 100]`
    #[must_use]
    pub const fn score(&self) -> u8 {
        self.score
    }

    /// Band derived from the score
    #[must_use]
    pub const fn band(&self) -> HealthBand {
        self.band
    }

    /// Ordered explanations (never empty)
    #[must_use]
    pub fn explanations(&self) -> &[String] {
        &self.explanations
    }

    /// Ordered recommendations
    #[must_use]
    pub fn recommendations(&self) -> &[String] {
        &self.recommendations
    }

    /// Guideline sources supporting the explanations (never empty)
    #[must_use]
    pub fn evidence(&self) -> &[String] {
        &self.evidence
    }

    /// Per-rule point changes, in application order
    #[must_use]
    pub fn adjustments(&self) -> &[ScoreAdjustment] {
        &self.adjustments
    }
}

/// Score a product using the process-wide scoring configuration
#[must_use]
pub fn score(
    record: &NutritionRecord,
    ingredients: &IngredientList,
    insight: Option<&MedicalInsight>,
) -> ScoreResult {
    score_with_config(record, ingredients, insight, ScoringConfig::global())
}

/// Score a product with an explicit configuration
#[must_use]
pub fn score_with_config(
    record: &NutritionRecord,
    ingredients: &IngredientList,
    insight: Option<&MedicalInsight>,
    config: &ScoringConfig,
) -> ScoreResult {
    let mut ledger = Ledger::new(config.baseline);
    let liquid = record.basis.is_liquid();

    if has_scoring_nutrient(record) {
        note_missing_nutrients(record, &mut ledger);
        apply_sugar_rule(record, config, liquid, &mut ledger);
        apply_sodium_rule(record, config, liquid, &mut ledger);
        apply_fat_rules(record, config, liquid, &mut ledger);
        apply_fiber_penalty(record, config, liquid, &mut ledger);
    } else {
        ledger.adjust(
            ScoringRule::InsufficientData,
            -config.insufficient_data_penalty,
            format!(
                "{INSUFFICIENT_DATA}: no scoring nutrients could be determined, so the score reflects missing information ({})",
                format_points(-config.insufficient_data_penalty)
            ),
        );
    }

    let profile = IngredientProfile::analyze(ingredients.as_slice());
    apply_ingredient_rules(&profile, config, &mut ledger);
    apply_rewards(record, config, liquid, &mut ledger);

    if record.any_flagged(ValueFlags::SUSPECT | ValueFlags::UNNORMALIZED) {
        ledger.explain(SUSPECT_DATA.to_owned());
    }

    if let Some(insight) = insight {
        apply_insight(insight, config, &mut ledger);
    }

    ledger.finish()
}

/// Scoring-relevant nutrients; sugar counts when either sugar figure is known
fn has_scoring_nutrient(record: &NutritionRecord) -> bool {
    free_sugar(record).is_some()
        || [
            Nutrient::Sodium,
            Nutrient::SaturatedFat,
            Nutrient::TransFat,
            Nutrient::DietaryFiber,
            Nutrient::Protein,
        ]
        .into_iter()
        .any(|n| record.get(n).is_some())
}

/// Added sugars when known, total sugars otherwise
fn free_sugar(record: &NutritionRecord) -> Option<(Nutrient, f64)> {
    record
        .amount(Nutrient::AddedSugars)
        .map(|a| (Nutrient::AddedSugars, a))
        .or_else(|| {
            record
                .amount(Nutrient::TotalSugars)
                .map(|a| (Nutrient::TotalSugars, a))
        })
}

fn note_missing_nutrients(record: &NutritionRecord, ledger: &mut Ledger) {
    let mut missing: Vec<&str> = Vec::new();
    if free_sugar(record).is_none() {
        missing.push("sugars");
    }
    for nutrient in [
        Nutrient::Sodium,
        Nutrient::SaturatedFat,
        Nutrient::TransFat,
        Nutrient::DietaryFiber,
        Nutrient::Protein,
    ] {
        if record.get(nutrient).is_none() {
            missing.push(nutrient.label());
        }
    }
    if !missing.is_empty() {
        ledger.explain(format!(
            "Reduced confidence: no data for {}, so those rules were skipped",
            missing.join(", ")
        ));
    }
}

fn apply_sugar_rule(
    record: &NutritionRecord,
    config: &ScoringConfig,
    liquid: bool,
    ledger: &mut Ledger,
) {
    let Some((nutrient, amount)) = free_sugar(record) else {
        return;
    };
    let rule = &config.sugar;
    let (threshold, multiplier) = if liquid {
        (rule.liquid_threshold_g, rule.liquid_multiplier)
    } else {
        (rule.solid_threshold_g, 1.0)
    };
    let excess = amount - threshold;
    if excess <= 0.0 {
        return;
    }
    let penalty = (excess * rule.points_per_gram * multiplier).min(rule.max_penalty);
    ledger.adjust(
        ScoringRule::FreeSugar,
        -penalty,
        format!(
            "High sugar: {} g {} {} exceeds the WHO-aligned limit of {} g ({})",
            format_amount(amount),
            nutrient.label(),
            per_reference(liquid),
            format_amount(threshold),
            format_points(-penalty)
        ),
    );
}

fn apply_sodium_rule(
    record: &NutritionRecord,
    config: &ScoringConfig,
    liquid: bool,
    ledger: &mut Ledger,
) {
    let Some(sodium) = record.amount(Nutrient::Sodium) else {
        return;
    };
    let rule = &config.sodium;
    let excess = sodium - rule.threshold_mg;
    if excess <= 0.0 {
        return;
    }
    let penalty = (excess * rule.points_per_mg).min(rule.max_penalty);
    ledger.adjust(
        ScoringRule::Sodium,
        -penalty,
        format!(
            "High sodium: {} mg {} exceeds {} mg ({})",
            format_amount(sodium),
            per_reference(liquid),
            format_amount(rule.threshold_mg),
            format_points(-penalty)
        ),
    );
}

fn apply_fat_rules(
    record: &NutritionRecord,
    config: &ScoringConfig,
    liquid: bool,
    ledger: &mut Ledger,
) {
    if let Some(saturated) = record.amount(Nutrient::SaturatedFat) {
        let rule = &config.saturated_fat;
        let excess = saturated - rule.threshold_g;
        if excess > 0.0 {
            let penalty = (excess * rule.points_per_gram).min(rule.max_penalty);
            ledger.adjust(
                ScoringRule::SaturatedFat,
                -penalty,
                format!(
                    "High saturated fat: {} g {} exceeds {} g ({})",
                    format_amount(saturated),
                    per_reference(liquid),
                    format_amount(rule.threshold_g),
                    format_points(-penalty)
                ),
            );
        }
    }

    if let Some(trans) = record.amount(Nutrient::TransFat) {
        if trans > 0.0 {
            let penalty = config.trans_fat.penalty;
            ledger.adjust(
                ScoringRule::TransFat,
                -penalty,
                format!(
                    "Contains trans fat ({} g {}); no intake level is considered safe ({})",
                    format_amount(trans),
                    per_reference(liquid),
                    format_points(-penalty)
                ),
            );
        }
    }
}

fn apply_fiber_penalty(
    record: &NutritionRecord,
    config: &ScoringConfig,
    liquid: bool,
    ledger: &mut Ledger,
) {
    let Some(fiber) = record.amount(Nutrient::DietaryFiber) else {
        return;
    };
    let rule = &config.fiber;
    let deficit = rule.target_g - fiber;
    if deficit <= 0.0 {
        return;
    }
    let penalty = (deficit * rule.deficit_points_per_gram).min(rule.max_penalty);
    ledger.adjust(
        ScoringRule::LowFiber,
        -penalty,
        format!(
            "Low fiber: {} g {} is below the {} g source-of-fiber level ({})",
            format_amount(fiber),
            per_reference(liquid),
            format_amount(rule.target_g),
            format_points(-penalty)
        ),
    );
}

fn apply_ingredient_rules(
    profile: &IngredientProfile,
    config: &ScoringConfig,
    ledger: &mut Ledger,
) {
    let rule = &config.ingredients;

    if profile.ingredient_count > rule.max_simple_count {
        ledger.adjust(
            ScoringRule::LongIngredientList,
            -rule.long_list_penalty,
            format!(
                "Long ingredient list ({} ingredients) suggests heavy processing ({})",
                profile.ingredient_count,
                format_points(-rule.long_list_penalty)
            ),
        );
    }

    if profile.marker_count() > 0 {
        let penalty =
            (profile.marker_count() as f64 * rule.points_per_marker).min(rule.max_marker_penalty);
        let listed = profile
            .markers
            .iter()
            .map(|m| format!("{} ({})", m.ingredient, m.category.label()))
            .collect::<Vec<_>>()
            .join(", ");
        ledger.adjust(
            ScoringRule::ProcessingMarkers,
            -penalty,
            format!(
                "Ultra-processing markers found: {listed} ({})",
                format_points(-penalty)
            ),
        );
    }
}

fn apply_rewards(
    record: &NutritionRecord,
    config: &ScoringConfig,
    liquid: bool,
    ledger: &mut Ledger,
) {
    let mut budget = config.max_total_bonus;

    if let Some(fiber) = record.amount(Nutrient::DietaryFiber) {
        let rule = &config.fiber;
        let excess = fiber - rule.target_g;
        if excess > 0.0 && budget > 0.0 {
            let bonus = (excess * rule.bonus_points_per_gram).min(rule.max_bonus).min(budget);
            budget -= bonus;
            ledger.reward(
                ScoringRule::FiberBonus,
                bonus,
                format!(
                    "Good source of fiber: {} g {} ({})",
                    format_amount(fiber),
                    per_reference(liquid),
                    format_points(bonus)
                ),
            );
        }
    }

    if let Some(protein) = record.amount(Nutrient::Protein) {
        let rule = &config.protein;
        let excess = protein - rule.threshold_g;
        if excess > 0.0 && budget > 0.0 {
            let bonus = (excess * rule.bonus_points_per_gram).min(rule.max_bonus).min(budget);
            ledger.reward(
                ScoringRule::ProteinBonus,
                bonus,
                format!(
                    "Good source of protein: {} g {} ({})",
                    format_amount(protein),
                    per_reference(liquid),
                    format_points(bonus)
                ),
            );
        }
    }
}

fn apply_insight(insight: &MedicalInsight, config: &ScoringConfig, ledger: &mut Ledger) {
    if let Some(suggested) = insight.suggested_score() {
        let current = ledger.score.clamp(0.0, MAX_SCORE);
        let limit = config.insight.max_adjustment;
        let delta = ((suggested - current) * config.insight.weight).clamp(-limit, limit);
        if delta.abs() >= 0.05 {
            ledger.adjust(
                ScoringRule::MedicalInsight,
                delta,
                format!(
                    "Medical analysis suggests a score of {} ({})",
                    format_amount(suggested),
                    format_points(delta)
                ),
            );
        } else {
            ledger.cite(ScoringRule::MedicalInsight);
        }
    }

    for concern in &insight.concerns {
        ledger.explain(format!("Medical concern: {concern}"));
    }
    for risk in &insight.nutrient_risks {
        ledger.explain(format!("{}: {}", risk.nutrient, risk.note));
    }
    for condition in &insight.contraindications {
        ledger.explain(format!("Not recommended for: {condition}"));
    }
    for recommendation in &insight.recommendations {
        ledger.recommend(recommendation.clone());
    }
    for source in &insight.evidence {
        push_unique(&mut ledger.evidence, source.clone());
    }
}

/// Accumulates score changes and texts in application order
struct Ledger {
    score: f64,
    explanations: Vec<String>,
    recommendations: Vec<String>,
    evidence: Vec<String>,
    adjustments: Vec<ScoreAdjustment>,
}

impl Ledger {
    const fn new(baseline: f64) -> Self {
        Self {
            score: baseline,
            explanations: Vec::new(),
            recommendations: Vec::new(),
            evidence: Vec::new(),
            adjustments: Vec::new(),
        }
    }

    fn adjust(&mut self, rule: ScoringRule, points: f64, explanation: String) {
        self.score += points;
        self.record(rule, points, explanation);
    }

    /// Rewards never lift the score above the scale maximum
    fn reward(&mut self, rule: ScoringRule, points: f64, explanation: String) {
        let applied = points.min((MAX_SCORE - self.score).max(0.0));
        self.score += applied;
        self.record(rule, applied, explanation);
    }

    fn record(&mut self, rule: ScoringRule, points: f64, explanation: String) {
        self.adjustments.push(ScoreAdjustment { rule, points });
        self.explain(explanation);
        self.cite(rule);
        if let Some(recommendation) = rule.recommendation() {
            self.recommend(recommendation.to_owned());
        }
    }

    fn cite(&mut self, rule: ScoringRule) {
        push_unique(&mut self.evidence, rule.guideline().to_owned());
    }

    fn explain(&mut self, explanation: String) {
        push_unique(&mut self.explanations, explanation);
    }

    fn recommend(&mut self, recommendation: String) {
        push_unique(&mut self.recommendations, recommendation);
    }

    fn finish(mut self) -> ScoreResult {
        let score = self.score.clamp(0.0, MAX_SCORE).round() as u8;
        let band = HealthBand::from_score(score);

        if self.explanations.is_empty() {
            self.explanations.push(NO_CONCERNS.to_owned());
        }
        if self.evidence.is_empty() {
            self.evidence.push(DEFAULT_EVIDENCE.to_owned());
        }
        push_unique(&mut self.recommendations, band_recommendation(band).to_owned());

        debug!(
            score,
            band = %band,
            rules = self.adjustments.len(),
            "Computed health score"
        );

        ScoreResult {
            score,
            band,
            explanations: self.explanations,
            recommendations: self.recommendations,
            evidence: self.evidence,
            adjustments: self.adjustments,
        }
    }
}

fn push_unique(items: &mut Vec<String>, item: String) {
    let trimmed = item.trim();
    if trimmed.is_empty() {
        return;
    }
    let lowered = trimmed.to_lowercase();
    if !items.iter().any(|existing| existing.to_lowercase() == lowered) {
        items.push(trimmed.to_owned());
    }
}
