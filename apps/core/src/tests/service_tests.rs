use crate::actors::messages::{AnalysisRecord, AppError};
use crate::actors::supervisor::IntelligenceHandle;
use crate::actors::traits::{EscalationNotifier, ReportSink, SubjectRepository};
use crate::config::IntelligenceConfig;
use crate::intelligence::{EscalationPrediction, Urgency};
use crate::models::{AnalysisSubject, ReviewSubject, TicketSubject};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration};
use uuid::Uuid;

// --- Mock Components ---

struct MockRepository {
    subjects: HashMap<String, AnalysisSubject>,
    delay: Option<Duration>,
}

impl MockRepository {
    fn seeded() -> Self {
        let mut subjects = HashMap::new();
        subjects.insert(
            "T-1".to_string(),
            AnalysisSubject::Ticket(
                TicketSubject::new("Panne", "URGENT, panne totale, impossible de continuer")
                    .with_priority("urgent"),
            ),
        );
        subjects.insert(
            "R-1".to_string(),
            AnalysisSubject::Review(ReviewSubject::new("", "Excellent service, merci beaucoup", 5)),
        );
        Self {
            subjects,
            delay: None,
        }
    }
}

#[async_trait]
impl SubjectRepository for MockRepository {
    async fn fetch_subject(&self, subject_id: &str) -> Result<AnalysisSubject, AppError> {
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        self.subjects
            .get(subject_id)
            .cloned()
            .ok_or_else(|| AppError::Collaborator(format!("Subject {} not found", subject_id)))
    }
}

#[derive(Default)]
struct MockSink {
    records: Mutex<Vec<AnalysisRecord>>,
}

#[async_trait]
impl ReportSink for MockSink {
    async fn store_report(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
struct MockNotifier {
    notified: Mutex<Vec<(Uuid, Urgency)>>,
}

#[async_trait]
impl EscalationNotifier for MockNotifier {
    async fn notify(
        &self,
        record: &AnalysisRecord,
        escalation: &EscalationPrediction,
    ) -> Result<(), AppError> {
        self.notified
            .lock()
            .unwrap()
            .push((record.request_id, escalation.priority));
        Ok(())
    }
}

struct Harness {
    handle: IntelligenceHandle,
    sink: Arc<MockSink>,
    notifier: Arc<MockNotifier>,
}

fn harness_with(repository: MockRepository, request_timeout: Duration) -> Harness {
    let sink = Arc::new(MockSink::default());
    let notifier = Arc::new(MockNotifier::default());
    let handle = IntelligenceHandle::new_with_timeout(
        &IntelligenceConfig::builtin().unwrap(),
        Arc::new(repository),
        sink.clone(),
        notifier.clone(),
        request_timeout,
    )
    .unwrap();
    Harness {
        handle,
        sink,
        notifier,
    }
}

fn harness() -> Harness {
    harness_with(MockRepository::seeded(), Duration::from_secs(5))
}

#[tokio::test]
async fn test_analyze_supplied_subject() {
    let h = harness();
    let report = h
        .handle
        .analyze(AnalysisSubject::Ticket(TicketSubject::new("", "")))
        .await
        .unwrap();

    assert_eq!(report.categorization.category, "general");
    assert!(h.sink.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_stored_critical_ticket_is_recorded_and_notified() {
    let h = harness();
    let record = h.handle.analyze_stored("T-1".to_string()).await.unwrap();

    assert_eq!(record.subject_id.as_deref(), Some("T-1"));
    assert_eq!(record.report.escalation.priority, Urgency::Critical);

    let records = h.sink.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].request_id, record.request_id);

    let notified = h.notifier.notified.lock().unwrap();
    assert_eq!(notified.as_slice(), &[(record.request_id, Urgency::Critical)]);
}

#[tokio::test]
async fn test_stored_review_below_tier_is_not_notified() {
    let h = harness();
    let record = h.handle.analyze_stored("R-1".to_string()).await.unwrap();

    assert!(record.report.escalation.priority < Urgency::Critical);
    assert_eq!(h.sink.records.lock().unwrap().len(), 1);
    assert!(h.notifier.notified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_subject_propagates_collaborator_error() {
    let h = harness();
    let err = h
        .handle
        .analyze_stored("missing".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Collaborator(_)));
    assert!(h.sink.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_batch_results_are_independent() {
    let h = harness();
    let subjects = vec![
        AnalysisSubject::Ticket(TicketSubject::new("Facture", "Ma facture est fausse")),
        AnalysisSubject::Review(ReviewSubject::new("", "Note invalide", 0)),
        AnalysisSubject::Review(ReviewSubject::new("", "Produit cassé", 1)),
    ];

    let results = h.handle.analyze_batch(subjects).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().categorization.category, "billing");
    assert!(matches!(results[1], Err(AppError::MalformedSubject(_))));
    assert_eq!(
        results[2].as_ref().unwrap().categorization.category,
        "negative_feedback"
    );
}

#[tokio::test]
async fn test_concurrent_requests_share_one_service() {
    let h = harness();
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let handle = h.handle.clone();
        tasks.push(tokio::spawn(async move {
            handle.analyze_stored("T-1".to_string()).await
        }));
    }
    for task in tasks {
        assert!(task.await.unwrap().is_ok());
    }
    assert_eq!(h.sink.records.lock().unwrap().len(), 8);
    assert_eq!(h.notifier.notified.lock().unwrap().len(), 8);
}

#[tokio::test]
async fn test_fail_soft_entry_point() {
    let h = harness();

    let invalid = AnalysisSubject::Review(ReviewSubject::new("", "Trop bien", 9));
    assert!(h.handle.analyze_or_none(invalid).await.is_none());

    let valid = AnalysisSubject::Review(ReviewSubject::new("", "Trop bien", 5));
    assert!(h.handle.analyze_or_none(valid).await.is_some());
}

#[tokio::test]
async fn test_timed_out_request_stores_and_notifies_nothing() {
    let mut repository = MockRepository::seeded();
    repository.delay = Some(Duration::from_millis(500));
    let h = harness_with(repository, Duration::from_millis(50));

    let err = h
        .handle
        .analyze_stored("T-1".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Timeout(_)));

    // Well past the repository delay: the abandoned request left no trace.
    sleep(Duration::from_millis(700)).await;
    assert!(h.sink.records.lock().unwrap().is_empty());
    assert!(h.notifier.notified.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_requests_after_shutdown_fail() {
    let h = harness();
    h.handle.shutdown().await.unwrap();

    let err = h
        .handle
        .analyze(AnalysisSubject::Ticket(TicketSubject::new("", "")))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Actor(_)));
}

#[tokio::test]
async fn test_invalid_config_refused_at_startup() {
    let mut config = IntelligenceConfig::builtin().unwrap();
    config.workflow.next_steps.clear();

    let result = IntelligenceHandle::new(
        &config,
        Arc::new(MockRepository::seeded()),
        Arc::new(MockSink::default()),
        Arc::new(MockNotifier::default()),
    );
    assert!(matches!(result, Err(AppError::Config(_))));
}
