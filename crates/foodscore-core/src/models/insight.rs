// ABOUTME: Advisory medical insight produced by an external reasoning model
// ABOUTME: Lenient deserialization accepts both canonical and legacy response keys
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A note about one nutrient's health relevance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutrientRisk {
    /// Nutrient the note refers to, as named by the model
    pub nutrient: String,
    /// Free-text assessment
    pub note: String,
}

/// Structured, advisory output of the medical analyst
///
/// Never merged numerically into nutrition data. The scoring engine may use
/// it to adjust the score within a bounded range and to enrich explanations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalInsight {
    /// Suggested health score, 0-100
    #[serde(
        default,
        alias = "medical_health_score",
        deserialize_with = "lenient_score"
    )]
    pub health_score: Option<f64>,
    /// Health concerns raised by the model
    #[serde(
        default,
        alias = "medical_concerns",
        alias = "key_concerns",
        deserialize_with = "string_or_list"
    )]
    pub concerns: Vec<String>,
    /// Per-nutrient notes
    #[serde(default, alias = "nutrient_analysis", deserialize_with = "risk_entries")]
    pub nutrient_risks: Vec<NutrientRisk>,
    /// Conditions for which the product is contraindicated
    #[serde(default, deserialize_with = "string_or_list")]
    pub contraindications: Vec<String>,
    /// Recommendations
    #[serde(
        default,
        alias = "clinical_recommendations",
        alias = "medical_recommendations",
        deserialize_with = "string_or_list"
    )]
    pub recommendations: Vec<String>,
    /// Cited evidence or guideline sources
    #[serde(default, alias = "evidence_sources", deserialize_with = "string_or_list")]
    pub evidence: Vec<String>,
    /// Model that produced the insight
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl MedicalInsight {
    /// Suggested score clamped to `[0, 100]`, ignoring non-finite values
    #[must_use]
    pub fn suggested_score(&self) -> Option<f64> {
        self.health_score
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(0.0, 100.0))
    }

    /// True when the insight carries nothing usable
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suggested_score().is_none()
            && self.concerns.is_empty()
            && self.nutrient_risks.is_empty()
            && self.contraindications.is_empty()
            && self.recommendations.is_empty()
            && self.evidence.is_empty()
    }
}

fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_owned(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.iter().filter_map(value_to_text).collect(),
        other => value_to_text(&other).into_iter().collect(),
    })
}

fn risk_entries<'de, D>(deserializer: D) -> Result<Vec<NutrientRisk>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let risks = match value {
        Value::Object(map) => map
            .iter()
            .filter_map(|(nutrient, note)| {
                value_to_text(note).map(|note| NutrientRisk {
                    nutrient: nutrient.clone(),
                    note,
                })
            })
            .collect(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<NutrientRisk>(item).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(risks)
}

fn lenient_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches("/100").trim().parse().ok(),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_keys_are_accepted() {
        let insight: MedicalInsight = serde_json::from_value(serde_json::json!({
            "health_score": "42",
            "medical_concerns": "High sugar content",
            "nutrient_analysis": { "sugar": "Exceeds WHO limit", "sodium": null },
            "clinical_recommendations": ["Limit intake"],
            "evidence_sources": "WHO 2015"
        }))
        .unwrap();

        assert_eq!(insight.suggested_score(), Some(42.0));
        assert_eq!(insight.concerns, vec!["High sugar content".to_owned()]);
        assert_eq!(insight.nutrient_risks.len(), 1);
        assert_eq!(insight.recommendations, vec!["Limit intake".to_owned()]);
        assert_eq!(insight.evidence, vec!["WHO 2015".to_owned()]);
        assert!(insight.contraindications.is_empty());
    }

    #[test]
    fn test_out_of_range_score_is_clamped() {
        let insight = MedicalInsight {
            health_score: Some(180.0),
            ..MedicalInsight::default()
        };
        assert_eq!(insight.suggested_score(), Some(100.0));
        assert!(!insight.is_empty());
    }
}
