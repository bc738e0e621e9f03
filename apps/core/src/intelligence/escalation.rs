//! Escalation risk prediction.
//!
//! Additive factor model: a base risk plus sentiment, urgency, category and
//! anger contributions, clamped to 0..=100. Several triggered factors
//! saturate the score quickly; the weights are a tunable heuristic, not a
//! validated risk model.

use crate::config::{lookup, EscalationConfig, RiskThreshold};
use crate::error::AppError;

use super::report::{Categorization, EscalationPrediction, SentimentResult, Urgency};

/// Individual factor contributions, kept for reasoning and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskFactors {
    pub sentiment: i32,
    pub urgency: i32,
    pub category: i32,
    pub emotion: i32,
}

impl RiskFactors {
    pub fn total(&self) -> i32 {
        self.sentiment + self.urgency + self.category + self.emotion
    }
}

pub struct EscalationPredictor {
    config: EscalationConfig,
}

impl EscalationPredictor {
    pub fn new(config: &EscalationConfig) -> Self {
        let mut config = config.clone();
        // Threshold rows are tested highest first.
        config
            .time_to_escalation
            .sort_by(|a, b| b.min_risk.cmp(&a.min_risk));
        config.priorities.sort_by(|a, b| b.min_risk.cmp(&a.min_risk));
        Self { config }
    }

    pub fn factors(
        &self,
        sentiment: &SentimentResult,
        categorization: &Categorization,
    ) -> Result<RiskFactors, AppError> {
        let c = &self.config;
        Ok(RiskFactors {
            sentiment: *lookup(
                &c.sentiment_scores,
                "escalation.sentiment_scores",
                sentiment.sentiment.as_str(),
            )?,
            urgency: *lookup(
                &c.urgency_scores,
                "escalation.urgency_scores",
                sentiment.urgency.as_str(),
            )?,
            category: *lookup(
                &c.category_scores,
                "escalation.category_scores",
                &categorization.category,
            )?,
            emotion: if sentiment.emotions.contains(&c.anger_emotion) {
                c.anger_score
            } else {
                0
            },
        })
    }

    pub fn predict(
        &self,
        sentiment: &SentimentResult,
        categorization: &Categorization,
    ) -> Result<EscalationPrediction, AppError> {
        let factors = self.factors(sentiment, categorization)?;
        let risk_level = (self.config.base_risk + factors.total()).clamp(0, 100) as u8;

        let priority = *threshold(&self.config.priorities, risk_level, "escalation.priorities")?;
        let time_to_escalation_minutes = *threshold(
            &self.config.time_to_escalation,
            risk_level,
            "escalation.time_to_escalation",
        )?;
        let suggested_actions =
            lookup(&self.config.actions, "escalation.actions", priority.as_str())?.clone();

        Ok(EscalationPrediction {
            risk_level,
            escalation_probability: probability(risk_level, self.config.max_probability),
            suggested_actions,
            time_to_escalation_minutes,
            priority,
            reasoning: self.reasoning(&factors, sentiment, categorization),
        })
    }

    fn reasoning(
        &self,
        factors: &RiskFactors,
        sentiment: &SentimentResult,
        categorization: &Categorization,
    ) -> String {
        let triggers = &self.config.triggers;
        let mut reasons = Vec::new();

        if factors.sentiment > triggers.sentiment {
            reasons.push(format!(
                "Sentiment {} (+{})",
                sentiment.sentiment.as_str(),
                factors.sentiment
            ));
        }
        if factors.urgency > triggers.urgency {
            reasons.push(format!(
                "Urgency {} (+{})",
                sentiment.urgency.as_str(),
                factors.urgency
            ));
        }
        if factors.category > triggers.category {
            reasons.push(format!(
                "Sensitive category {} (+{})",
                categorization.category, factors.category
            ));
        }
        if factors.emotion > triggers.emotion {
            reasons.push(format!(
                "Customer expresses {} (+{})",
                self.config.anger_emotion, factors.emotion
            ));
        }

        if reasons.is_empty() {
            "No significant escalation factor".to_string()
        } else {
            reasons.join("; ")
        }
    }
}

/// `min(max_probability, risk / 100)`
pub fn probability(risk_level: u8, max_probability: f32) -> f32 {
    (risk_level as f32 / 100.0).min(max_probability)
}

fn threshold<'a, T>(
    rows: &'a [RiskThreshold<T>],
    risk_level: u8,
    table: &'static str,
) -> Result<&'a T, AppError> {
    rows.iter()
        .find(|row| risk_level >= row.min_risk)
        .map(|row| &row.value)
        .ok_or_else(|| AppError::missing(table, risk_level.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntelligenceConfig;
    use crate::intelligence::report::Sentiment;
    use std::collections::BTreeSet;

    fn predictor() -> EscalationPredictor {
        EscalationPredictor::new(&IntelligenceConfig::builtin().unwrap().escalation)
    }

    fn sentiment(sentiment: Sentiment, urgency: Urgency, emotions: &[&str]) -> SentimentResult {
        SentimentResult {
            sentiment,
            confidence: 0.7,
            emotions: emotions.iter().map(|e| e.to_string()).collect::<BTreeSet<_>>(),
            urgency,
        }
    }

    fn category(name: &str) -> Categorization {
        Categorization {
            category: name.to_string(),
            subcategory: "other".to_string(),
            confidence: 0.6,
            themes: vec![],
            issues: vec![],
        }
    }

    #[test]
    fn test_factor_tables() {
        let factors = predictor()
            .factors(
                &sentiment(Sentiment::Negative, Urgency::High, &["anger"]),
                &category("complaint"),
            )
            .unwrap();
        assert_eq!(
            factors,
            RiskFactors {
                sentiment: 30,
                urgency: 15,
                category: 20,
                emotion: 25
            }
        );
    }

    #[test]
    fn test_saturates_at_100() {
        let prediction = predictor()
            .predict(
                &sentiment(Sentiment::Negative, Urgency::Critical, &["anger"]),
                &category("complaint"),
            )
            .unwrap();

        assert_eq!(prediction.risk_level, 100);
        assert_eq!(prediction.escalation_probability, 0.9);
        assert_eq!(prediction.priority, Urgency::Critical);
        assert_eq!(prediction.time_to_escalation_minutes, 30);
        assert!(prediction.reasoning.contains("Sentiment negative"));
        assert!(prediction.reasoning.contains("anger"));
    }

    #[test]
    fn test_low_risk() {
        // 50 - 10 + 0 + 5
        let prediction = predictor()
            .predict(
                &sentiment(Sentiment::Positive, Urgency::Low, &[]),
                &category("general"),
            )
            .unwrap();

        assert_eq!(prediction.risk_level, 45);
        assert_eq!(prediction.escalation_probability, 45.0 / 100.0);
        assert_eq!(prediction.priority, Urgency::Medium);
        assert_eq!(prediction.time_to_escalation_minutes, 480);
        assert_eq!(prediction.reasoning, "No significant escalation factor");
    }

    #[test]
    fn test_threshold_boundaries() {
        // 50 + 0 + 5 + 5 = 60
        let prediction = predictor()
            .predict(
                &sentiment(Sentiment::Neutral, Urgency::Medium, &[]),
                &category("general"),
            )
            .unwrap();
        assert_eq!(prediction.risk_level, 60);
        assert_eq!(prediction.priority, Urgency::High);
        assert_eq!(prediction.time_to_escalation_minutes, 120);
    }

    #[test]
    fn test_clamps_at_zero() {
        let mut config = IntelligenceConfig::builtin().unwrap().escalation;
        config.base_risk = -200;
        let prediction = EscalationPredictor::new(&config)
            .predict(
                &sentiment(Sentiment::Positive, Urgency::Low, &[]),
                &category("general"),
            )
            .unwrap();
        assert_eq!(prediction.risk_level, 0);
        assert_eq!(prediction.escalation_probability, 0.0);
        assert_eq!(prediction.priority, Urgency::Low);
        assert_eq!(prediction.time_to_escalation_minutes, 1440);
    }

    #[test]
    fn test_unknown_category_is_error() {
        let err = predictor()
            .predict(
                &sentiment(Sentiment::Neutral, Urgency::Low, &[]),
                &category("shipping"),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::MissingTableEntry {
                table: "escalation.category_scores",
                ..
            }
        ));
    }
}
