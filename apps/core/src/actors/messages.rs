use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Duration;
use uuid::Uuid;

use crate::intelligence::AnalysisReport;
use crate::models::AnalysisSubject;

// Re-export AppError for convenience
pub use crate::error::AppError;

/// A completed analysis, as handed to the report sink.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub request_id: Uuid,
    /// Repository identifier, when the subject came from storage.
    pub subject_id: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    pub report: AnalysisReport,
}

impl AnalysisRecord {
    pub fn new(subject_id: Option<String>, report: AnalysisReport) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            subject_id,
            analyzed_at: Utc::now(),
            report,
        }
    }
}

/// Messages that can be sent to the intelligence service.
#[derive(Debug)]
pub enum IntelligenceMessage {
    /// Analyze a subject supplied by the caller.
    Analyze {
        subject: AnalysisSubject,
        responder: oneshot::Sender<Result<AnalysisReport, AppError>>,
    },
    /// Fetch a subject from the repository, analyze it, store the record
    /// and notify when the escalation tier is reached.
    AnalyzeStored {
        subject_id: String,
        /// Budget for fetching and analyzing; nothing is stored past it.
        deadline: Duration,
        responder: oneshot::Sender<Result<AnalysisRecord, AppError>>,
    },
    /// Analyze several subjects concurrently; one result per subject, in order.
    AnalyzeBatch {
        subjects: Vec<AnalysisSubject>,
        responder: oneshot::Sender<Vec<Result<AnalysisReport, AppError>>>,
    },
    /// Stop the service loop.
    Shutdown,
}
