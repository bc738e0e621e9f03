use crate::actors::messages::{AnalysisRecord, AppError, IntelligenceMessage};
use crate::actors::traits::{EscalationNotifier, ReportSink, SubjectRepository};
use crate::config::IntelligenceConfig;
use crate::intelligence::{AnalysisOrchestrator, AnalysisReport, Urgency};
use crate::models::AnalysisSubject;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{timeout, Duration};
use tracing::{error, info, instrument, warn};

/// Per-request timeout used by [`IntelligenceHandle::new`].
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CHANNEL_CAPACITY: usize = 32;

/// A handle to the intelligence service.
///
/// This is the API boundary of the crate: it owns the request timeout and
/// the single fail-soft entry point. Cloning the handle is cheap; every
/// clone talks to the same service loop.
#[derive(Clone)]
pub struct IntelligenceHandle {
    sender: mpsc::Sender<IntelligenceMessage>,
    request_timeout: Duration,
}

impl IntelligenceHandle {
    /// Validates the configuration, spawns the service loop and returns a handle.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new<R, S, N>(
        config: &IntelligenceConfig,
        repository: Arc<R>,
        sink: Arc<S>,
        notifier: Arc<N>,
    ) -> Result<Self, AppError>
    where
        R: SubjectRepository,
        S: ReportSink,
        N: EscalationNotifier,
    {
        Self::new_with_timeout(config, repository, sink, notifier, DEFAULT_REQUEST_TIMEOUT)
    }

    /// Same as [`IntelligenceHandle::new`] with an explicit per-request timeout.
    pub fn new_with_timeout<R, S, N>(
        config: &IntelligenceConfig,
        repository: Arc<R>,
        sink: Arc<S>,
        notifier: Arc<N>,
        request_timeout: Duration,
    ) -> Result<Self, AppError>
    where
        R: SubjectRepository,
        S: ReportSink,
        N: EscalationNotifier,
    {
        let context = ServiceContext {
            orchestrator: Arc::new(AnalysisOrchestrator::new(config)?),
            repository,
            sink,
            notifier,
            notify_at: config.escalation.notify_at,
        };

        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let runner = IntelligenceRunner {
            receiver,
            context: Arc::new(context),
        };
        tokio::spawn(async move { runner.run().await });

        Ok(Self {
            sender,
            request_timeout,
        })
    }

    /// Analyzes a subject supplied by the caller.
    #[instrument(skip(self, subject))]
    pub async fn analyze(&self, subject: AnalysisSubject) -> Result<AnalysisReport, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = IntelligenceMessage::Analyze {
            subject,
            responder: send,
        };
        self.request(msg, recv).await?
    }

    /// Fetches a stored subject, analyzes it, hands the record to the report
    /// sink and notifies when the escalation tier is reached.
    ///
    /// The timeout covers fetching and analysis and is enforced by the
    /// service itself. A `Timeout` error means nothing was stored or notified.
    #[instrument(skip(self))]
    pub async fn analyze_stored(&self, subject_id: String) -> Result<AnalysisRecord, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = IntelligenceMessage::AnalyzeStored {
            subject_id,
            deadline: self.request_timeout,
            responder: send,
        };
        self.exchange(msg, recv).await?
    }

    /// Analyzes subjects concurrently. Results come back in input order and a
    /// failing subject does not affect the others. The timeout covers the
    /// whole batch.
    #[instrument(skip(self, subjects), fields(count = subjects.len()))]
    pub async fn analyze_batch(
        &self,
        subjects: Vec<AnalysisSubject>,
    ) -> Result<Vec<Result<AnalysisReport, AppError>>, AppError> {
        let (send, recv) = oneshot::channel();
        let msg = IntelligenceMessage::AnalyzeBatch {
            subjects,
            responder: send,
        };
        self.request(msg, recv).await
    }

    /// Fail-soft variant of [`IntelligenceHandle::analyze`]: any error is
    /// logged and turned into `None`.
    pub async fn analyze_or_none(&self, subject: AnalysisSubject) -> Option<AnalysisReport> {
        match self.analyze(subject).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, "Analysis failed, continuing without a report");
                None
            }
        }
    }

    /// Stops the service loop. Requests already in flight still complete.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.sender
            .send(IntelligenceMessage::Shutdown)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))
    }

    async fn request<T>(
        &self,
        msg: IntelligenceMessage,
        recv: oneshot::Receiver<T>,
    ) -> Result<T, AppError> {
        timeout(self.request_timeout, self.exchange(msg, recv)).await?
    }

    async fn exchange<T>(
        &self,
        msg: IntelligenceMessage,
        recv: oneshot::Receiver<T>,
    ) -> Result<T, AppError> {
        self.sender
            .send(msg)
            .await
            .map_err(|e| AppError::Actor(e.to_string()))?;
        recv.await.map_err(|e| AppError::Actor(e.to_string()))
    }
}

// --- Service Runner ---
struct ServiceContext<R, S, N> {
    orchestrator: Arc<AnalysisOrchestrator>,
    repository: Arc<R>,
    sink: Arc<S>,
    notifier: Arc<N>,
    notify_at: Urgency,
}

struct IntelligenceRunner<R, S, N> {
    receiver: mpsc::Receiver<IntelligenceMessage>,
    context: Arc<ServiceContext<R, S, N>>,
}

impl<R, S, N> IntelligenceRunner<R, S, N>
where
    R: SubjectRepository,
    S: ReportSink,
    N: EscalationNotifier,
{
    async fn run(mut self) {
        info!("Intelligence service started");
        while let Some(msg) = self.receiver.recv().await {
            if let IntelligenceMessage::Shutdown = msg {
                info!("Intelligence service shutting down...");
                break;
            }
            self.dispatch(msg);
        }
        info!("Intelligence service stopped");
    }

    /// Each request runs on its own task so a slow collaborator never blocks the loop.
    fn dispatch(&self, msg: IntelligenceMessage) {
        let context = Arc::clone(&self.context);
        match msg {
            IntelligenceMessage::Analyze { subject, responder } => {
                tokio::spawn(async move {
                    let result = analyze_blocking(Arc::clone(&context.orchestrator), subject).await;
                    if let Err(e) = &result {
                        error!("Error analyzing subject: {}", e);
                    }
                    let _ = responder.send(result);
                });
            }
            IntelligenceMessage::AnalyzeStored {
                subject_id,
                deadline,
                responder,
            } => {
                tokio::spawn(async move {
                    let result = context.analyze_stored(subject_id, deadline).await;
                    if let Err(e) = &result {
                        error!("Error analyzing stored subject: {}", e);
                    }
                    let _ = responder.send(result);
                });
            }
            IntelligenceMessage::AnalyzeBatch {
                subjects,
                responder,
            } => {
                tokio::spawn(async move {
                    let tasks = subjects
                        .into_iter()
                        .map(|subject| analyze_blocking(Arc::clone(&context.orchestrator), subject));
                    let results = join_all(tasks).await;
                    let failed = results.iter().filter(|r| r.is_err()).count();
                    info!(total = results.len(), failed, "Batch analysis finished");
                    let _ = responder.send(results);
                });
            }
            IntelligenceMessage::Shutdown => {}
        }
    }
}

impl<R, S, N> ServiceContext<R, S, N>
where
    R: SubjectRepository,
    S: ReportSink,
    N: EscalationNotifier,
{
    /// Side effects start only once the report exists within the deadline;
    /// store and notify then run to completion.
    #[instrument(skip(self))]
    async fn analyze_stored(
        &self,
        subject_id: String,
        deadline: Duration,
    ) -> Result<AnalysisRecord, AppError> {
        let report = timeout(deadline, async {
            let subject = self.repository.fetch_subject(&subject_id).await?;
            analyze_blocking(Arc::clone(&self.orchestrator), subject).await
        })
        .await??;

        let record = AnalysisRecord::new(Some(subject_id), report);
        self.sink.store_report(&record).await?;
        info!(request_id = %record.request_id, "{}", record.report.summary());

        let escalation = &record.report.escalation;
        if escalation.priority >= self.notify_at {
            info!(
                request_id = %record.request_id,
                priority = %escalation.priority,
                "Escalation tier reached, notifying"
            );
            self.notifier.notify(&record, escalation).await?;
        }

        Ok(record)
    }
}

/// Runs the CPU-bound pipeline on the blocking pool.
async fn analyze_blocking(
    orchestrator: Arc<AnalysisOrchestrator>,
    subject: AnalysisSubject,
) -> Result<AnalysisReport, AppError> {
    tokio::task::spawn_blocking(move || orchestrator.analyze(&subject))
        .await
        .map_err(|e| AppError::Actor(format!("Analysis task failed: {}", e)))?
}
