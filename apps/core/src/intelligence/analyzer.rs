//! Analysis Orchestrator - Main entry point of the intelligence pipeline.
//!
//! Runs one linear pass per subject:
//! `Start -> SignalsExtracted -> SentimentAndCategoryComputed ->
//! ResponseAndRiskComputed -> WorkflowComputed -> Done`.
//! Any stage error is returned as-is; nothing is retried or defaulted here.

use std::fmt;
use std::time::Instant;
use tracing::{debug, instrument};

use crate::config::IntelligenceConfig;
use crate::error::AppError;
use crate::models::AnalysisSubject;

use super::categorizer::Categorizer;
use super::escalation::EscalationPredictor;
use super::report::AnalysisReport;
use super::response::ResponseComposer;
use super::sentiment::SentimentClassifier;
use super::signals::SignalExtractor;
use super::workflow::WorkflowOptimizer;

/// Pipeline progress, used for tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    SignalsExtracted,
    SentimentAndCategoryComputed,
    ResponseAndRiskComputed,
    WorkflowComputed,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PipelineStage::Start => "start",
            PipelineStage::SignalsExtracted => "signals_extracted",
            PipelineStage::SentimentAndCategoryComputed => "sentiment_and_category_computed",
            PipelineStage::ResponseAndRiskComputed => "response_and_risk_computed",
            PipelineStage::WorkflowComputed => "workflow_computed",
            PipelineStage::Done => "done",
        };
        f.write_str(label)
    }
}

/// Stateless orchestrator; one instance can serve any number of threads.
pub struct AnalysisOrchestrator {
    signal_extractor: SignalExtractor,
    sentiment_classifier: SentimentClassifier,
    categorizer: Categorizer,
    response_composer: ResponseComposer,
    escalation_predictor: EscalationPredictor,
    workflow_optimizer: WorkflowOptimizer,
}

impl AnalysisOrchestrator {
    /// Validates the configuration and builds every stage.
    pub fn new(config: &IntelligenceConfig) -> Result<Self, AppError> {
        config.check()?;

        Ok(Self {
            signal_extractor: SignalExtractor::new(&config.lexicon),
            sentiment_classifier: SentimentClassifier::new(&config.sentiment),
            categorizer: Categorizer::new(&config.categorization),
            response_composer: ResponseComposer::new(&config.response),
            escalation_predictor: EscalationPredictor::new(&config.escalation),
            workflow_optimizer: WorkflowOptimizer::new(&config.workflow)?,
        })
    }

    /// Orchestrator over the shipped configuration.
    pub fn with_builtin_config() -> Result<Self, AppError> {
        Self::new(&IntelligenceConfig::builtin()?)
    }

    /// Analyze one subject and produce the combined report
    #[instrument(skip(self, subject), fields(kind = ?subject.kind()))]
    pub fn analyze(&self, subject: &AnalysisSubject) -> Result<AnalysisReport, AppError> {
        let start = Instant::now();
        subject.validate()?;
        trace_stage(PipelineStage::Start);

        let signals = self.signal_extractor.extract(&subject.combined_text());
        trace_stage(PipelineStage::SignalsExtracted);

        let sentiment = self.sentiment_classifier.classify(&signals, subject);
        let categorization = self.categorizer.categorize(&signals, subject);
        trace_stage(PipelineStage::SentimentAndCategoryComputed);

        let (response, moderation) =
            self.response_composer
                .compose(subject, &sentiment, &categorization)?;
        let escalation = self
            .escalation_predictor
            .predict(&sentiment, &categorization)?;
        trace_stage(PipelineStage::ResponseAndRiskComputed);

        let workflow = self.workflow_optimizer.optimize(
            &categorization,
            sentiment.urgency,
            &signals.normalized_text,
        )?;
        trace_stage(PipelineStage::WorkflowComputed);

        let report = AnalysisReport {
            subject_kind: subject.kind(),
            sentiment,
            categorization,
            response,
            escalation,
            workflow,
            moderation,
        };
        trace_stage(PipelineStage::Done);

        debug!(
            elapsed_us = start.elapsed().as_micros() as u64,
            "{}",
            report.summary()
        );
        Ok(report)
    }
}

fn trace_stage(stage: PipelineStage) {
    debug!(%stage, "pipeline stage reached");
}
