// ABOUTME: Scoring rule configuration with documented guideline defaults
// ABOUTME: Environment overrides, validation and a process-wide lazily loaded instance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Scoring configuration.
//!
//! Every threshold is expressed per 100 g (solids) or per 100 ml (beverages).
//! Defaults follow WHO free-sugar guidance, FDA daily values and Codex
//! nutrition-claim levels; see `foodscore_core::constants::guidelines`.

use std::env;
use std::str::FromStr;
use std::sync::OnceLock;

use foodscore_core::constants::guidelines::{
    FIBER_SOURCE_G, FREE_SUGAR_LIQUID_G, FREE_SUGAR_SOLID_G, MAX_SIMPLE_INGREDIENTS,
    PROTEIN_SOURCE_G, SATURATED_FAT_HIGH_G, SODIUM_HIGH_MG,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::error::ConfigError;

static SCORING_CONFIG: OnceLock<ScoringConfig> = OnceLock::new();

/// Complete scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Starting score before any rule applies
    pub baseline: f64,
    /// Fixed deduction when no scoring nutrient is known
    pub insufficient_data_penalty: f64,
    /// Ceiling on the sum of all rewards
    pub max_total_bonus: f64,
    /// Free sugar rule
    pub sugar: SugarRuleConfig,
    /// Sodium rule
    pub sodium: SodiumRuleConfig,
    /// Saturated fat rule
    pub saturated_fat: SaturatedFatRuleConfig,
    /// Trans fat rule
    pub trans_fat: TransFatRuleConfig,
    /// Fiber deficit penalty and fiber reward
    pub fiber: FiberRuleConfig,
    /// Protein reward
    pub protein: ProteinRuleConfig,
    /// Ingredient list complexity and additive markers
    pub ingredients: IngredientRuleConfig,
    /// Blending of a model-suggested score
    pub insight: InsightBlendConfig,
}

/// Free sugar penalty configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SugarRuleConfig {
    /// Threshold for solids (g/100g)
    pub solid_threshold_g: f64,
    /// Threshold for beverages (g/100ml)
    pub liquid_threshold_g: f64,
    /// Points deducted per gram above threshold
    pub points_per_gram: f64,
    /// Multiplier applied to beverages, whose sugar is absorbed faster
    pub liquid_multiplier: f64,
    /// Maximum deduction
    pub max_penalty: f64,
}

/// Sodium penalty configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SodiumRuleConfig {
    /// Threshold (mg/100g)
    pub threshold_mg: f64,
    /// Points deducted per milligram above threshold
    pub points_per_mg: f64,
    /// Maximum deduction
    pub max_penalty: f64,
}

/// Saturated fat penalty configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaturatedFatRuleConfig {
    /// Threshold (g/100g)
    pub threshold_g: f64,
    /// Points deducted per gram above threshold
    pub points_per_gram: f64,
    /// Maximum deduction
    pub max_penalty: f64,
}

/// Trans fat penalty configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransFatRuleConfig {
    /// Flat deduction for any trans fat above zero
    pub penalty: f64,
}

/// Fiber configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiberRuleConfig {
    /// Fiber density that counts as a "source of fiber" (g/100g)
    pub target_g: f64,
    /// Points deducted per gram below target
    pub deficit_points_per_gram: f64,
    /// Maximum deficit deduction
    pub max_penalty: f64,
    /// Points awarded per gram above target
    pub bonus_points_per_gram: f64,
    /// Maximum fiber bonus
    pub max_bonus: f64,
}

/// Protein reward configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinRuleConfig {
    /// Protein density above which a bonus applies (g/100g)
    pub threshold_g: f64,
    /// Points awarded per gram above threshold
    pub bonus_points_per_gram: f64,
    /// Maximum protein bonus
    pub max_bonus: f64,
}

/// Ingredient analysis configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientRuleConfig {
    /// Ingredient count above which the long-list penalty applies
    pub max_simple_count: usize,
    /// Deduction for a long ingredient list
    pub long_list_penalty: f64,
    /// Deduction per ultra-processing marker
    pub points_per_marker: f64,
    /// Maximum marker deduction
    pub max_marker_penalty: f64,
}

/// Model-suggested score blending configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightBlendConfig {
    /// Fraction of the gap between rule score and suggested score to close
    pub weight: f64,
    /// Maximum absolute adjustment in points
    pub max_adjustment: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            baseline: 100.0,
            insufficient_data_penalty: 50.0,
            max_total_bonus: 12.0,
            sugar: SugarRuleConfig {
                solid_threshold_g: FREE_SUGAR_SOLID_G,
                liquid_threshold_g: FREE_SUGAR_LIQUID_G,
                points_per_gram: 3.0,
                liquid_multiplier: 2.0,
                max_penalty: 50.0,
            },
            sodium: SodiumRuleConfig {
                threshold_mg: SODIUM_HIGH_MG,
                points_per_mg: 0.12,
                max_penalty: 35.0,
            },
            saturated_fat: SaturatedFatRuleConfig {
                threshold_g: SATURATED_FAT_HIGH_G,
                points_per_gram: 2.0,
                max_penalty: 25.0,
            },
            trans_fat: TransFatRuleConfig { penalty: 15.0 },
            fiber: FiberRuleConfig {
                target_g: FIBER_SOURCE_G,
                deficit_points_per_gram: 5.0,
                max_penalty: 15.0,
                bonus_points_per_gram: 1.0,
                max_bonus: 8.0,
            },
            protein: ProteinRuleConfig {
                threshold_g: PROTEIN_SOURCE_G,
                bonus_points_per_gram: 0.4,
                max_bonus: 6.0,
            },
            ingredients: IngredientRuleConfig {
                max_simple_count: MAX_SIMPLE_INGREDIENTS,
                long_list_penalty: 5.0,
                points_per_marker: 2.0,
                max_marker_penalty: 10.0,
            },
            insight: InsightBlendConfig {
                weight: 0.2,
                max_adjustment: 5.0,
            },
        }
    }
}

impl ScoringConfig {
    /// Get the global configuration instance
    pub fn global() -> &'static Self {
        SCORING_CONFIG.get_or_init(|| {
            Self::load().unwrap_or_else(|e| {
                warn!("Failed to load scoring config: {}, using defaults", e);
                Self::default()
            })
        })
    }

    /// Load configuration from environment
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values or validation fails
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::default().apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any threshold, rate or cap is negative or not finite,
    /// or if the blend weight is outside `[0, 1]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baseline.is_nan() || self.baseline <= 0.0 || self.baseline > 100.0 {
            return Err(ConfigError::ValueOutOfRange("baseline must be in (0, 100]"));
        }
        if !(0.0..=self.baseline).contains(&self.insufficient_data_penalty) {
            return Err(ConfigError::ValueOutOfRange(
                "insufficient_data_penalty must be in [0, baseline]",
            ));
        }

        let non_negative = [
            (self.max_total_bonus, "max_total_bonus must be >= 0"),
            (self.sugar.solid_threshold_g, "sugar.solid_threshold_g must be >= 0"),
            (self.sugar.liquid_threshold_g, "sugar.liquid_threshold_g must be >= 0"),
            (self.sugar.points_per_gram, "sugar.points_per_gram must be >= 0"),
            (self.sugar.liquid_multiplier, "sugar.liquid_multiplier must be >= 0"),
            (self.sugar.max_penalty, "sugar.max_penalty must be >= 0"),
            (self.sodium.threshold_mg, "sodium.threshold_mg must be >= 0"),
            (self.sodium.points_per_mg, "sodium.points_per_mg must be >= 0"),
            (self.sodium.max_penalty, "sodium.max_penalty must be >= 0"),
            (self.saturated_fat.threshold_g, "saturated_fat.threshold_g must be >= 0"),
            (self.saturated_fat.points_per_gram, "saturated_fat.points_per_gram must be >= 0"),
            (self.saturated_fat.max_penalty, "saturated_fat.max_penalty must be >= 0"),
            (self.trans_fat.penalty, "trans_fat.penalty must be >= 0"),
            (self.fiber.target_g, "fiber.target_g must be >= 0"),
            (self.fiber.deficit_points_per_gram, "fiber.deficit_points_per_gram must be >= 0"),
            (self.fiber.max_penalty, "fiber.max_penalty must be >= 0"),
            (self.fiber.bonus_points_per_gram, "fiber.bonus_points_per_gram must be >= 0"),
            (self.fiber.max_bonus, "fiber.max_bonus must be >= 0"),
            (self.protein.threshold_g, "protein.threshold_g must be >= 0"),
            (self.protein.bonus_points_per_gram, "protein.bonus_points_per_gram must be >= 0"),
            (self.protein.max_bonus, "protein.max_bonus must be >= 0"),
            (self.ingredients.long_list_penalty, "ingredients.long_list_penalty must be >= 0"),
            (self.ingredients.points_per_marker, "ingredients.points_per_marker must be >= 0"),
            (self.ingredients.max_marker_penalty, "ingredients.max_marker_penalty must be >= 0"),
            (self.insight.max_adjustment, "insight.max_adjustment must be >= 0"),
        ];
        if let Some((_, message)) = non_negative
            .iter()
            .find(|(value, _)| !value.is_finite() || *value < 0.0)
        {
            return Err(ConfigError::InvalidRange(message));
        }

        if !(0.0..=1.0).contains(&self.insight.weight) {
            return Err(ConfigError::ValueOutOfRange("insight.weight must be in [0, 1]"));
        }

        Ok(())
    }

    /// Helper function to parse and apply an environment variable override
    fn apply_env_var<T: FromStr>(env_var_name: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Ok(val) = env::var(env_var_name) {
            *target = val
                .parse()
                .map_err(|_| ConfigError::Parse(format!("Invalid {env_var_name}")))?;
        }
        Ok(())
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut self) -> Result<Self, ConfigError> {
        Self::apply_env_var("FOODSCORE_SCORING_BASELINE", &mut self.baseline)?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_INSUFFICIENT_DATA_PENALTY",
            &mut self.insufficient_data_penalty,
        )?;
        Self::apply_env_var("FOODSCORE_SCORING_MAX_TOTAL_BONUS", &mut self.max_total_bonus)?;

        // Sugar
        Self::apply_env_var(
            "FOODSCORE_SCORING_SUGAR_SOLID_THRESHOLD_G",
            &mut self.sugar.solid_threshold_g,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_SUGAR_LIQUID_THRESHOLD_G",
            &mut self.sugar.liquid_threshold_g,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_SUGAR_POINTS_PER_GRAM",
            &mut self.sugar.points_per_gram,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_SUGAR_MAX_PENALTY",
            &mut self.sugar.max_penalty,
        )?;

        // Sodium
        Self::apply_env_var(
            "FOODSCORE_SCORING_SODIUM_THRESHOLD_MG",
            &mut self.sodium.threshold_mg,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_SODIUM_POINTS_PER_MG",
            &mut self.sodium.points_per_mg,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_SODIUM_MAX_PENALTY",
            &mut self.sodium.max_penalty,
        )?;

        // Fats
        Self::apply_env_var(
            "FOODSCORE_SCORING_SATURATED_FAT_THRESHOLD_G",
            &mut self.saturated_fat.threshold_g,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_SATURATED_FAT_MAX_PENALTY",
            &mut self.saturated_fat.max_penalty,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_TRANS_FAT_PENALTY",
            &mut self.trans_fat.penalty,
        )?;

        // Rewards
        Self::apply_env_var("FOODSCORE_SCORING_FIBER_TARGET_G", &mut self.fiber.target_g)?;
        Self::apply_env_var("FOODSCORE_SCORING_FIBER_MAX_BONUS", &mut self.fiber.max_bonus)?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_PROTEIN_THRESHOLD_G",
            &mut self.protein.threshold_g,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_PROTEIN_MAX_BONUS",
            &mut self.protein.max_bonus,
        )?;

        // Ingredients
        Self::apply_env_var(
            "FOODSCORE_SCORING_MAX_SIMPLE_INGREDIENTS",
            &mut self.ingredients.max_simple_count,
        )?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_POINTS_PER_MARKER",
            &mut self.ingredients.points_per_marker,
        )?;

        // Model blending
        Self::apply_env_var("FOODSCORE_SCORING_INSIGHT_WEIGHT", &mut self.insight.weight)?;
        Self::apply_env_var(
            "FOODSCORE_SCORING_INSIGHT_MAX_ADJUSTMENT",
            &mut self.insight.max_adjustment,
        )?;

        Ok(self)
    }
}
