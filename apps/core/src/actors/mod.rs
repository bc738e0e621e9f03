//! Async service boundary around the analysis pipeline.

pub mod messages;
pub mod supervisor;
pub mod traits;

pub use messages::{AnalysisRecord, IntelligenceMessage};
pub use supervisor::{IntelligenceHandle, DEFAULT_REQUEST_TIMEOUT};
pub use traits::{EscalationNotifier, ReportSink, SubjectRepository};
