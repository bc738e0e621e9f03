use crate::actors::messages::{AnalysisRecord, AppError};
use crate::intelligence::EscalationPrediction;
use crate::models::AnalysisSubject;
use async_trait::async_trait;

/// Source of stored tickets and reviews.
///
/// Abstracts whatever persistence holds the subjects so the service can be
/// driven by a database, a queue consumer or an in-memory fixture.
#[async_trait]
pub trait SubjectRepository: Send + Sync + 'static {
    /// Fetches one subject by its identifier.
    async fn fetch_subject(&self, subject_id: &str) -> Result<AnalysisSubject, AppError>;
}

/// Destination of completed analyses.
#[async_trait]
pub trait ReportSink: Send + Sync + 'static {
    async fn store_report(&self, record: &AnalysisRecord) -> Result<(), AppError>;
}

/// Alerting hook for subjects whose escalation priority reaches the
/// configured notification tier.
#[async_trait]
pub trait EscalationNotifier: Send + Sync + 'static {
    async fn notify(
        &self,
        record: &AnalysisRecord,
        escalation: &EscalationPrediction,
    ) -> Result<(), AppError>;
}
