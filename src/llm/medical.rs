// ABOUTME: Medical analyst backed by an LLM producing advisory insight and nutrient estimates
// ABOUTME: Extracts the JSON object from replies and falls back to labelled-section parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::fmt::Write as _;
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use foodscore_core::models::{
    Basis, MedicalInsight, Nutrient, NutrientValue, NutritionRecord, SourceKind,
};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::prompts::MEDICAL_ANALYST_PROMPT;
use super::{ChatMessage, ChatRequest, LlmProvider};
use crate::errors::{AppError, AppResult};
use crate::external::{AnalysisContext, MedicalAnalysis, MedicalAnalyst};

/// Confidence attached to model-estimated nutrient values
const ESTIMATE_CONFIDENCE: f64 = 0.4;

const SERVICE: &str = "Medical analyst";

/// [`MedicalAnalyst`] that asks a chat model for a JSON assessment
pub struct LlmMedicalAnalyst {
    provider: Arc<dyn LlmProvider>,
}

impl LlmMedicalAnalyst {
    /// Wrap a provider
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    fn build_user_message(context: &AnalysisContext) -> String {
        let mut message = String::new();
        let _ = writeln!(
            message,
            "Product: {}",
            context.product_name.as_deref().unwrap_or("unknown")
        );
        if let Some(brand) = &context.brand {
            let _ = writeln!(message, "Brand: {brand}");
        }
        if !context.ingredients.is_empty() {
            let _ = writeln!(
                message,
                "Ingredients: {}",
                context.ingredients.as_slice().join(", ")
            );
        }

        let reference = if context.nutrition.basis.is_liquid() {
            "per 100 ml"
        } else {
            "per 100 g"
        };
        if !context.nutrition.is_empty() {
            let _ = writeln!(message, "Nutrition facts ({reference}):");
            for (nutrient, value) in context.nutrition.iter() {
                let _ = writeln!(
                    message,
                    "- {}: {} {}",
                    nutrient.as_str(),
                    value.amount,
                    value.unit.symbol()
                );
            }
        }
        if !context.unknown.is_empty() {
            let names: Vec<&str> = context.unknown.iter().map(|n| n.as_str()).collect();
            let _ = writeln!(message, "Unknown nutrients: {}", names.join(", "));
        }
        message
    }
}

#[async_trait]
impl MedicalAnalyst for LlmMedicalAnalyst {
    #[instrument(skip(self, context), fields(provider = self.provider.name()))]
    async fn analyze(&self, context: &AnalysisContext) -> AppResult<MedicalAnalysis> {
        let request = ChatRequest::new(vec![
            ChatMessage::system(MEDICAL_ANALYST_PROMPT),
            ChatMessage::user(Self::build_user_message(context)),
        ])
        .with_temperature(0.2)
        .with_max_tokens(1200)
        .with_json_mode();

        let response = self.provider.complete(&request).await?;
        let basis = if context.nutrition.basis.is_liquid() {
            Basis::Per100Milliliters
        } else {
            Basis::Per100Grams
        };

        let mut analysis = parse_analysis_reply(&response.content, basis)?;
        if analysis.insight.model.is_none() {
            analysis.insight.model = Some(response.model);
        }
        debug!(
            score = ?analysis.insight.suggested_score(),
            concerns = analysis.insight.concerns.len(),
            estimated = analysis.nutrition_estimate.as_ref().map_or(0, NutritionRecord::len),
            "Medical analysis parsed"
        );
        Ok(analysis)
    }
}

/// Outermost `{ ... }` span of a reply, if any
#[must_use]
pub fn extract_json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (end > start).then(|| &reply[start..=end])
}

/// Parse a model reply into an analysis
///
/// Estimated nutrients are tagged with `basis` and a low confidence.
///
/// # Errors
///
/// Returns an error when the reply contains neither a JSON object nor a
/// recognizable `HEALTH SCORE` / `MEDICAL CONCERNS` section.
pub fn parse_analysis_reply(reply: &str, basis: Basis) -> AppResult<MedicalAnalysis> {
    if let Some(value) = extract_json_object(reply)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .filter(Value::is_object)
    {
        match serde_json::from_value::<MedicalInsight>(value.clone()) {
            Ok(insight) => {
                let nutrition_estimate = value
                    .get("nutrition_estimate")
                    .or_else(|| value.get("nutrition"))
                    .and_then(|estimate| parse_estimate(estimate, basis));
                return Ok(MedicalAnalysis {
                    insight,
                    nutrition_estimate,
                });
            }
            Err(e) => warn!("Medical analysis JSON did not match the expected shape: {e}"),
        }
    }

    let insight = fallback_parse(reply);
    if insight.is_empty() {
        return Err(AppError::external_service(
            SERVICE,
            "reply contained no usable analysis",
        ));
    }
    Ok(MedicalAnalysis {
        insight,
        nutrition_estimate: None,
    })
}

fn parse_estimate(estimate: &Value, basis: Basis) -> Option<NutritionRecord> {
    let map = estimate.as_object()?;
    let mut record = NutritionRecord::new(basis);
    for (key, raw) in map {
        let Some(nutrient) = Nutrient::from_str_lossy(key) else {
            continue;
        };
        let amount = match raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        if let Some(amount) = amount.filter(|a| a.is_finite() && *a >= 0.0) {
            record.insert(
                nutrient,
                NutrientValue::new(
                    amount,
                    nutrient.canonical_unit(),
                    ESTIMATE_CONFIDENCE,
                    SourceKind::Llm,
                ),
            );
        }
    }
    (!record.is_empty()).then_some(record)
}

fn score_regex() -> Option<&'static Regex> {
    static SCORE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    SCORE_REGEX
        .get_or_init(|| Regex::new(r"(?i)HEALTH\s+SCORE[:\s]*(\d{1,3})").ok())
        .as_ref()
}

fn concerns_regex() -> Option<&'static Regex> {
    static CONCERNS_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    CONCERNS_REGEX
        .get_or_init(|| {
            Regex::new(
                r"(?is)MEDICAL\s+CONCERNS[:\s]*(.*?)(?:NUTRIENT\s+ANALYSIS|CLINICAL\s+RECOMMENDATIONS|CONTRAINDICATIONS|EVIDENCE|$)",
            )
            .ok()
        })
        .as_ref()
}

fn fallback_parse(reply: &str) -> MedicalInsight {
    let health_score = score_regex()
        .and_then(|re| re.captures(reply))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok());

    let concerns = concerns_regex()
        .and_then(|re| re.captures(reply))
        .and_then(|caps| caps.get(1))
        .map(|m| {
            m.as_str()
                .lines()
                .map(|line| line.trim().trim_start_matches(['-', '*', '•']).trim())
                .filter(|line| line.chars().any(char::is_alphabetic))
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default();

    MedicalInsight {
        health_score,
        concerns,
        ..MedicalInsight::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_object_ignores_prose() {
        let reply = "Here is the analysis:\n```json\n{\"health_score\": 40}\n```\nThanks";
        assert_eq!(extract_json_object(reply), Some("{\"health_score\": 40}"));
        assert_eq!(extract_json_object("no json here"), None);
    }

    #[test]
    fn test_fallback_sections() {
        let reply = "1. HEALTH SCORE: 35/100\n2. MEDICAL CONCERNS:\n- Very high sugar\n- Caffeine\n3. NUTRIENT ANALYSIS: ...";
        let insight = fallback_parse(reply);
        assert_eq!(insight.health_score, Some(35.0));
        assert_eq!(insight.concerns, vec!["Very high sugar", "Caffeine"]);
    }
}
