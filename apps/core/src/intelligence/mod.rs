//! # Intelligence Module
//!
//! Deterministic, lexicon-driven analysis of support tickets and reviews.
//! No model calls: every decision comes from keyword tables and thresholds
//! loaded through [`crate::config::IntelligenceConfig`].
//!
//! ## Components
//! - `signals`: Text normalization and lexicon hits
//! - `sentiment`: Polarity, confidence, emotions and urgency
//! - `categorizer`: Category, subcategory, themes and issues
//! - `response`: Templated reply, tone and human-review flag
//! - `escalation`: Additive risk model
//! - `workflow`: Agent routing, priority score and automation hints
//! - `report`: Output data structures
//! - `analyzer`: Main orchestrator

pub mod analyzer;
pub mod categorizer;
pub mod escalation;
pub mod report;
pub mod response;
pub mod sentiment;
pub mod signals;
pub mod workflow;

pub use analyzer::{AnalysisOrchestrator, PipelineStage};
pub use categorizer::{CandidateScore, Categorizer};
pub use escalation::{EscalationPredictor, RiskFactors};
pub use report::{
    AnalysisReport, Categorization, EscalationPrediction, ReviewModeration, Sentiment,
    SentimentResult, SmartResponse, Tone, Urgency, WorkflowOptimization,
};
pub use response::ResponseComposer;
pub use sentiment::SentimentClassifier;
pub use signals::{SignalExtractor, Signals};
pub use workflow::WorkflowOptimizer;
