//! Intelligence configuration.
//!
//! Every keyword lexicon and every weight/threshold table used by the
//! pipeline lives here, loaded from JSON so it can be tuned or localized
//! without recompiling. The shipped defaults are in
//! `config/intelligence.default.json`.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};
use validator::Validate;

use crate::error::AppError;
use crate::intelligence::categorizer::REVIEW_CATEGORIES;
use crate::intelligence::report::{Sentiment, Urgency};

/// Environment variable holding the path of a configuration override file
pub const CONFIG_ENV_VAR: &str = "HELPDESK_INTEL_CONFIG";

const BUILTIN_CONFIG: &str = include_str!("../config/intelligence.default.json");

/// Fallback cell of the `(category, urgency)` tables
pub const FALLBACK_CATEGORY: &str = "general";
pub const FALLBACK_URGENCY: Urgency = Urgency::Medium;

/// A named list of keywords (an emotion, a theme, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordGroup {
    pub name: String,
    pub keywords: Vec<String>,
}

/// `(category -> urgency -> value)` lookup table
pub type CategoryUrgencyTable<T> = BTreeMap<String, BTreeMap<String, T>>;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IntelligenceConfig {
    pub lexicon: Lexicon,
    #[validate(nested)]
    pub sentiment: SentimentConfig,
    #[validate(nested)]
    pub categorization: CategorizationConfig,
    #[validate(nested)]
    pub response: ResponseConfig,
    #[validate(nested)]
    pub escalation: EscalationConfig,
    #[validate(nested)]
    pub workflow: WorkflowConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub urgent: Vec<String>,
    /// Emotion tag -> keywords. Membership is not exclusive.
    pub emotions: Vec<KeywordGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SentimentConfig {
    #[validate(range(min = 0.0, max = 1.0))]
    pub base_confidence: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub per_hit_bonus: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_confidence: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub neutral_confidence: f32,
    /// Urgent keyword hits at or above which urgency is critical
    #[validate(range(min = 1))]
    pub critical_urgent_hits: usize,
    /// Urgent keyword hits at or above which urgency is high
    #[validate(range(min = 1))]
    pub high_urgent_hits: usize,
    /// Reviews rated at or below this are high urgency
    #[validate(range(min = 1, max = 5))]
    pub review_high_max_rating: u8,
    /// Reviews rated at or above this are low urgency
    #[validate(range(min = 1, max = 5))]
    pub review_low_min_rating: u8,
    /// Declared ticket priority -> urgency tier
    pub ticket_priorities: BTreeMap<String, Urgency>,
    /// Tier for tickets whose declared priority is absent or unmapped
    pub default_urgency: Urgency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
    pub subcategories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategorizationConfig {
    /// Candidates in tie-break order
    pub categories: Vec<CategoryRule>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub base_confidence: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub per_match_bonus: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_confidence: f32,
    /// A candidate must exceed this confidence to be picked
    #[validate(range(min = 0.0, max = 1.0))]
    pub floor: f32,
    #[validate(length(min = 1))]
    pub fallback_category: String,
    #[validate(length(min = 1))]
    pub fallback_subcategory: String,
    pub themes: Vec<KeywordGroup>,
    pub issues: Vec<String>,
    #[validate(nested)]
    pub review: ReviewRules,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewRules {
    #[validate(range(min = 1, max = 5))]
    pub positive_min_rating: u8,
    #[validate(range(min = 1, max = 5))]
    pub negative_max_rating: u8,
    /// Issues are only extracted for ratings at or below this
    #[validate(range(min = 1, max = 5))]
    pub issues_max_rating: u8,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: f32,
    /// Subcategory used when no theme is detected
    #[validate(length(min = 1))]
    pub default_subcategory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResponseConfig {
    /// `(category, urgency)` -> template text
    pub templates: CategoryUrgencyTable<String>,
    /// Review category -> template text
    pub review_templates: BTreeMap<String, String>,
    /// `(category, urgency)` -> minutes
    pub resolution_minutes: CategoryUrgencyTable<u32>,
    /// Review category -> minutes
    pub review_resolution_minutes: BTreeMap<String, u32>,
    /// Category -> actions
    pub suggested_actions: BTreeMap<String, Vec<String>>,
    /// Appended when urgency is critical
    pub critical_actions: Vec<String>,
    /// Reviews rated at or below this always need a human
    #[validate(range(min = 1, max = 5))]
    pub review_human_max_rating: u8,
    #[validate(nested)]
    pub weights: ResponseWeights,
    #[validate(length(min = 1))]
    pub default_customer_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResponseWeights {
    #[validate(range(min = 0.0, max = 1.0))]
    pub base_confidence: f32,
    pub expert_categories: Vec<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub expert_bonus: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub critical_penalty: f32,
    pub short_message_chars: usize,
    #[validate(range(min = 0.0, max = 1.0))]
    pub short_message_bonus: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub min_confidence: f32,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_confidence: f32,
    /// Below this confidence a human must review the response
    #[validate(range(min = 0.0, max = 1.0))]
    pub human_threshold: f32,
}

/// A `min_risk -> value` threshold row; rows are tested highest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskThreshold<T> {
    pub min_risk: u8,
    pub value: T,
}

/// Factor scores above which the factor is cited in the reasoning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorTriggers {
    pub sentiment: i32,
    pub urgency: i32,
    pub category: i32,
    pub emotion: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EscalationConfig {
    pub base_risk: i32,
    pub sentiment_scores: BTreeMap<String, i32>,
    pub urgency_scores: BTreeMap<String, i32>,
    pub category_scores: BTreeMap<String, i32>,
    #[validate(length(min = 1))]
    pub anger_emotion: String,
    pub anger_score: i32,
    pub triggers: FactorTriggers,
    #[validate(length(min = 1))]
    pub time_to_escalation: Vec<RiskThreshold<u32>>,
    #[validate(length(min = 1))]
    pub priorities: Vec<RiskThreshold<Urgency>>,
    /// Priority tier -> recommended actions
    pub actions: BTreeMap<String, Vec<String>>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub max_probability: f32,
    /// Escalation priority at which the notifier collaborator is called
    pub notify_at: Urgency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutomationTrigger {
    pub pattern: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkflowConfig {
    /// Category -> agent pool
    pub agent_pools: BTreeMap<String, String>,
    #[validate(length(min = 1))]
    pub senior_suffix: String,
    /// Urgency from which the senior pool variant is recommended
    pub senior_from: Urgency,
    pub resolution_minutes: CategoryUrgencyTable<u32>,
    pub urgency_points: BTreeMap<String, i32>,
    pub category_points: BTreeMap<String, i32>,
    #[validate(range(min = 1, max = 10))]
    pub min_priority_score: u8,
    #[validate(range(min = 1, max = 10))]
    pub max_priority_score: u8,
    pub next_steps: BTreeMap<String, Vec<String>>,
    pub automation: Vec<AutomationTrigger>,
}

impl IntelligenceConfig {
    /// Parses the configuration shipped with the crate.
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_json_str(BUILTIN_CONFIG)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        let config: IntelligenceConfig = serde_json::from_str(raw)
            .map_err(|e| AppError::Config(format!("Failed to parse configuration: {}", e)))?;
        config.check()?;
        Ok(config)
    }

    /// Loads a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(AppError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        info!("Loaded intelligence configuration from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by `HELPDESK_INTEL_CONFIG` (after reading `.env`),
    /// or the built-in configuration when the variable is unset.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim()),
            _ => {
                debug!("{} not set, using built-in configuration", CONFIG_ENV_VAR);
                Self::builtin()
            }
        }
    }

    /// Serializes back to pretty JSON, e.g. to seed an override file.
    pub fn to_json_string(&self) -> Result<String, AppError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize configuration: {}", e)))
    }

    /// Runs range validation and cross-table consistency checks.
    pub fn check(&self) -> Result<(), AppError> {
        self.validate()?;

        let errors = self.table_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Config(errors.join("; ")))
        }
    }

    /// Every category name a run can produce.
    pub fn all_categories(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> = self
            .categorization
            .categories
            .iter()
            .map(|c| c.name.clone())
            .collect();
        names.insert(self.categorization.fallback_category.clone());
        names.extend(REVIEW_CATEGORIES.iter().map(|s| s.to_string()));
        names
    }

    fn table_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let categories = self.all_categories();
        let sentiments = [Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral];

        let cat = &self.categorization;
        if cat.categories.is_empty() {
            errors.push("At least one category rule required".to_string());
        }
        let mut seen = BTreeSet::new();
        for rule in &cat.categories {
            if !seen.insert(rule.name.as_str()) {
                errors.push(format!("Duplicate category '{}'", rule.name));
            }
            if rule.subcategories.is_empty() {
                errors.push(format!("Category '{}' declares no subcategory", rule.name));
            }
        }
        if self.sentiment.high_urgent_hits > self.sentiment.critical_urgent_hits {
            errors.push("high_urgent_hits must not exceed critical_urgent_hits".to_string());
        }
        if cat.review.negative_max_rating >= cat.review.positive_min_rating {
            errors.push("Review negative_max_rating must be below positive_min_rating".to_string());
        }

        let resp = &self.response;
        require_cell(&mut errors, "response.templates", &resp.templates);
        require_cell(&mut errors, "response.resolution_minutes", &resp.resolution_minutes);
        for name in REVIEW_CATEGORIES {
            require_key(&mut errors, "response.review_templates", &resp.review_templates, name);
            require_key(
                &mut errors,
                "response.review_resolution_minutes",
                &resp.review_resolution_minutes,
                name,
            );
        }
        for name in &categories {
            require_key(&mut errors, "response.suggested_actions", &resp.suggested_actions, name);
        }
        if resp.weights.min_confidence > resp.weights.max_confidence {
            errors.push("response min_confidence exceeds max_confidence".to_string());
        }

        let esc = &self.escalation;
        for s in sentiments {
            require_key(&mut errors, "escalation.sentiment_scores", &esc.sentiment_scores, s.as_str());
        }
        for u in Urgency::ALL {
            require_key(&mut errors, "escalation.urgency_scores", &esc.urgency_scores, u.as_str());
            require_key(&mut errors, "escalation.actions", &esc.actions, u.as_str());
            require_key(&mut errors, "workflow.urgency_points", &self.workflow.urgency_points, u.as_str());
        }
        for name in &categories {
            require_key(&mut errors, "escalation.category_scores", &esc.category_scores, name);
            require_key(&mut errors, "workflow.category_points", &self.workflow.category_points, name);
            require_key(&mut errors, "workflow.next_steps", &self.workflow.next_steps, name);
        }
        if !esc.time_to_escalation.iter().any(|t| t.min_risk == 0) {
            errors.push("escalation.time_to_escalation needs a min_risk 0 row".to_string());
        }
        if !esc.priorities.iter().any(|t| t.min_risk == 0) {
            errors.push("escalation.priorities needs a min_risk 0 row".to_string());
        }

        let wf = &self.workflow;
        require_cell(&mut errors, "workflow.resolution_minutes", &wf.resolution_minutes);
        if wf.min_priority_score > wf.max_priority_score {
            errors.push("workflow min_priority_score exceeds max_priority_score".to_string());
        }
        for trigger in &wf.automation {
            if let Err(e) = Regex::new(&trigger.pattern) {
                errors.push(format!("Invalid automation pattern '{}': {}", trigger.pattern, e));
            }
        }

        errors
    }
}

fn require_key<V>(errors: &mut Vec<String>, table: &str, map: &BTreeMap<String, V>, key: &str) {
    if !map.contains_key(key) {
        errors.push(format!("{} is missing '{}'", table, key));
    }
}

fn require_cell<V>(errors: &mut Vec<String>, table: &str, map: &CategoryUrgencyTable<V>) {
    let present = map
        .get(FALLBACK_CATEGORY)
        .is_some_and(|row| row.contains_key(FALLBACK_URGENCY.as_str()));
    if !present {
        errors.push(format!(
            "{} is missing the fallback cell ({}, {})",
            table,
            FALLBACK_CATEGORY,
            FALLBACK_URGENCY.as_str()
        ));
    }
}

/// Looks up `(category, urgency)`, falling back to `(general, medium)`.
pub fn lookup_cell<'a, V>(
    table: &'a CategoryUrgencyTable<V>,
    table_name: &'static str,
    category: &str,
    urgency: Urgency,
) -> Result<&'a V, AppError> {
    table
        .get(category)
        .and_then(|row| row.get(urgency.as_str()))
        .or_else(|| {
            table
                .get(FALLBACK_CATEGORY)
                .and_then(|row| row.get(FALLBACK_URGENCY.as_str()))
        })
        .ok_or_else(|| {
            AppError::missing(
                table_name,
                format!("{}/{}", FALLBACK_CATEGORY, FALLBACK_URGENCY.as_str()),
            )
        })
}

/// Strict keyed lookup; a missing key is a configuration error.
pub fn lookup<'a, V>(
    table: &'a BTreeMap<String, V>,
    table_name: &'static str,
    key: &str,
) -> Result<&'a V, AppError> {
    table.get(key).ok_or_else(|| AppError::missing(table_name, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_config_is_valid() {
        let config = IntelligenceConfig::builtin().unwrap();
        assert!(!config.lexicon.positive.is_empty());
        assert!(config.all_categories().contains("technical"));
        assert!(config.all_categories().contains("positive_feedback"));
    }

    #[test]
    fn test_lookup_cell_falls_back() {
        let config = IntelligenceConfig::builtin().unwrap();
        let table = &config.response.resolution_minutes;

        let fallback = lookup_cell(table, "resolution", "unknown", Urgency::Low).unwrap();
        let general = lookup_cell(table, "resolution", "general", Urgency::Medium).unwrap();
        assert_eq!(fallback, general);
    }

    #[test]
    fn test_lookup_cell_without_fallback_errors() {
        let table: CategoryUrgencyTable<u32> = BTreeMap::new();
        let err = lookup_cell(&table, "resolution", "technical", Urgency::High).unwrap_err();
        assert!(matches!(err, AppError::MissingTableEntry { table: "resolution", .. }));
    }

    #[test]
    fn test_missing_score_rejected() {
        let mut config = IntelligenceConfig::builtin().unwrap();
        config.escalation.category_scores.remove("billing");

        let err = config.check().unwrap_err();
        assert!(err.to_string().contains("escalation.category_scores is missing 'billing'"));
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let mut config = IntelligenceConfig::builtin().unwrap();
        config.response.weights.base_confidence = 1.5;
        assert!(matches!(config.check(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_automation_pattern_rejected() {
        let mut config = IntelligenceConfig::builtin().unwrap();
        config.workflow.automation.push(AutomationTrigger {
            pattern: "(unclosed".to_string(),
            suggestion: "never".to_string(),
        });
        let err = config.check().unwrap_err();
        assert!(err.to_string().contains("Invalid automation pattern"));
    }

    #[test]
    fn test_garbage_json_rejected() {
        let err = IntelligenceConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
