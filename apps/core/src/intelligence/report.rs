//! Analysis Report - Output structures for the intelligence pipeline.
//!
//! Every value here is built fresh per analysis and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::models::SubjectKind;

/// Coarse emotional polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Ordinal severity tier. Ordering follows severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub const ALL: [Urgency; 4] = [
        Urgency::Low,
        Urgency::Medium,
        Urgency::High,
        Urgency::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stylistic register of a generated response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Formal,
    Friendly,
    Apologetic,
    Professional,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub sentiment: Sentiment,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    pub emotions: BTreeSet<String>,
    pub urgency: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub category: String,
    pub subcategory: String,
    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,
    pub themes: Vec<String>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmartResponse {
    pub text: String,
    pub confidence: f32,
    pub tone: Tone,
    pub requires_human: bool,
    pub suggested_actions: Vec<String>,
    pub estimated_resolution_minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationPrediction {
    /// Risk score (0 - 100)
    pub risk_level: u8,
    /// `min(0.9, risk_level / 100)`
    pub escalation_probability: f32,
    pub suggested_actions: Vec<String>,
    pub time_to_escalation_minutes: u32,
    pub priority: Urgency,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOptimization {
    pub recommended_agent: Option<String>,
    pub estimated_resolution_minutes: u32,
    /// Work ordering score (1 - 10)
    pub priority_score: u8,
    pub suggested_next_steps: Vec<String>,
    pub automation_opportunities: Vec<String>,
}

/// Publication decision for reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewModeration {
    pub auto_publish: bool,
    pub requires_moderation: bool,
}

/// Complete output of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub subject_kind: SubjectKind,
    pub sentiment: SentimentResult,
    pub categorization: Categorization,
    pub response: SmartResponse,
    pub escalation: EscalationPrediction,
    pub workflow: WorkflowOptimization,
    /// Present for reviews only
    pub moderation: Option<ReviewModeration>,
}

impl AnalysisReport {
    /// Get a summary for logging
    pub fn summary(&self) -> String {
        format!(
            "Sentiment: {} ({:.0}%), Urgency: {}, Category: {}/{}, Risk: {} ({}), Priority score: {}, Human: {}",
            self.sentiment.sentiment.as_str(),
            self.sentiment.confidence * 100.0,
            self.sentiment.urgency,
            self.categorization.category,
            self.categorization.subcategory,
            self.escalation.risk_level,
            self.escalation.priority,
            self.workflow.priority_score,
            if self.response.requires_human { "yes" } else { "no" }
        )
    }

    pub fn needs_attention(&self) -> bool {
        self.response.requires_human || self.escalation.priority >= Urgency::High
    }
}
