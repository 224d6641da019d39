//! Service wiring: session store, task registry, collaborators and the
//! realtime notice channel.

use std::{convert::Infallible, future::Future, sync::Arc, time::Duration};

use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use billzy_core::{DomainError, DomainResult, SessionId};
use billzy_events::{Event, EventEnvelope};
use billzy_infra::{
    BillExtractor, DescriptorExportGenerator, ExportGenerator, InMemorySessionStore, PortalClient,
    SampleExtractor, SessionStore, SessionStoreError, SharedWorkspace, SimulatedPortal, TaskError,
    TaskHandle, TaskKind, TaskStore, spawn_simulated,
};
use billzy_workflow::{Credentials, ExportKind, WorkflowEvent, Workspace};

use crate::config::ApiConfig;
use crate::context::SessionContext;

/// Realtime message broadcasted via SSE.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RealtimeMessage {
    pub session_id: SessionId,
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Why a login could not open a session.
#[derive(Debug, thiserror::Error)]
pub enum OpenSessionError {
    #[error(transparent)]
    Store(#[from] SessionStoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub struct AppServices {
    sessions: Arc<dyn SessionStore>,
    tasks: TaskStore,
    extractor: Arc<dyn BillExtractor>,
    exporter: Arc<dyn ExportGenerator>,
    portal: Arc<dyn PortalClient>,
    time_scale: f64,
    session_idle_timeout: Duration,
    realtime_tx: broadcast::Sender<RealtimeMessage>,
}

impl AppServices {
    /// In-memory sessions with the simulated collaborators.
    pub fn simulated(config: &ApiConfig) -> Self {
        Self::with_collaborators(
            Arc::new(SampleExtractor),
            Arc::new(DescriptorExportGenerator),
            Arc::new(SimulatedPortal),
            config,
        )
    }

    pub fn with_collaborators(
        extractor: Arc<dyn BillExtractor>,
        exporter: Arc<dyn ExportGenerator>,
        portal: Arc<dyn PortalClient>,
        config: &ApiConfig,
    ) -> Self {
        let (realtime_tx, _rx) = broadcast::channel(1024);
        Self {
            sessions: Arc::new(InMemorySessionStore::new()),
            tasks: TaskStore::new(),
            extractor,
            exporter,
            portal,
            time_scale: config.time_scale,
            session_idle_timeout: config.session_idle_timeout,
            realtime_tx,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn tasks(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn realtime_tx(&self) -> &broadcast::Sender<RealtimeMessage> {
        &self.realtime_tx
    }

    /// Create a session and log it in. Idle sessions are swept first.
    pub async fn open_session(
        &self,
        credentials: &Credentials,
    ) -> Result<SessionContext, OpenSessionError> {
        self.evict_idle_sessions().await;

        let (session_id, workspace) = self.sessions.create()?;
        if let Err(err) = self.apply(&workspace, |ws| ws.login(credentials)).await {
            self.sessions.remove(session_id);
            return Err(err.into());
        }
        Ok(SessionContext::new(session_id, workspace))
    }

    async fn evict_idle_sessions(&self) {
        for session_id in self.sessions.evict_idle(self.session_idle_timeout) {
            let cancelled = self.tasks.cancel_session(session_id).await;
            tracing::info!(session_id = %session_id, cancelled, "idle session evicted");
        }
    }

    /// Cancel the session's tasks, log out, and forget the session.
    pub async fn close_session(&self, ctx: &SessionContext) -> DomainResult<()> {
        let cancelled = self.tasks.cancel_session(ctx.session_id()).await;
        self.apply(ctx.workspace(), Workspace::logout).await?;
        self.sessions.remove(ctx.session_id());
        tracing::info!(session_id = %ctx.session_id(), cancelled, "session closed");
        Ok(())
    }

    /// Run one workspace operation, then fan out whatever it recorded.
    pub async fn apply<T, F>(&self, workspace: &SharedWorkspace, op: F) -> DomainResult<T>
    where
        F: FnOnce(&mut Workspace) -> DomainResult<T>,
    {
        let mut ws = workspace.lock().await;
        let result = op(&mut *ws);
        let events = ws.drain_events();
        drop(ws);

        self.publish(events);
        result
    }

    /// Commit a task's result unless the task was cancelled. The flag is read
    /// under the workspace lock, so a cancel that wins the lock is honoured.
    async fn apply_task_result<F>(
        &self,
        handle: &TaskHandle,
        workspace: &SharedWorkspace,
        op: F,
    ) -> Result<(), TaskError>
    where
        F: FnOnce(&mut Workspace) -> DomainResult<()>,
    {
        let applied = self
            .apply(workspace, |ws| {
                if handle.is_cancelled() {
                    return Ok(false);
                }
                op(ws).map(|()| true)
            })
            .await
            .map_err(task_failure)?;
        if applied { Ok(()) } else { Err(TaskError::Cancelled) }
    }

    fn publish(&self, events: Vec<EventEnvelope<WorkflowEvent>>) {
        for envelope in events {
            let payload = serde_json::json!({
                "id": envelope.event_id(),
                "sequence": envelope.sequence_number(),
                "notice": envelope.payload().notice(),
                "event": envelope.payload(),
            });
            // Lossy: no subscribers is fine.
            let _ = self.realtime_tx.send(RealtimeMessage {
                session_id: envelope.session_id(),
                topic: envelope.event_type().to_string(),
                payload,
            });
        }
    }

    /// Simulated OCR over `files`; on success the extracted invoices replace
    /// the working set.
    pub async fn start_extraction(self: &Arc<Self>, ctx: &SessionContext, files: Vec<String>) -> TaskHandle {
        let services = Arc::clone(self);
        let workspace = ctx.workspace().clone();
        self.start_task(ctx.session_id(), TaskKind::BillExtraction, move |handle| async move {
            let invoices = services.extractor.extract(&files).await?;
            services
                .apply_task_result(&handle, &workspace, |ws| ws.load_invoices(invoices, files.len()))
                .await
        })
        .await
    }

    /// Generate an export of the working set as it is now.
    pub async fn start_export(self: &Arc<Self>, ctx: &SessionContext, kind: ExportKind) -> TaskHandle {
        let services = Arc::clone(self);
        let workspace = ctx.workspace().clone();
        let invoices = workspace.lock().await.invoices().to_vec();
        let task_kind = match kind {
            ExportKind::Tally => TaskKind::TallyExport,
            ExportKind::GstJson => TaskKind::GstExport,
        };
        self.start_task(ctx.session_id(), task_kind, move |handle| async move {
            let artifact = services.exporter.generate(kind, &invoices).await?;
            services
                .apply_task_result(&handle, &workspace, |ws| ws.record_export(artifact))
                .await
        })
        .await
    }

    /// Submit the working set to the portal as it is now.
    pub async fn start_portal_upload(self: &Arc<Self>, ctx: &SessionContext) -> TaskHandle {
        let services = Arc::clone(self);
        let workspace = ctx.workspace().clone();
        let invoices = workspace.lock().await.invoices().to_vec();
        self.start_task(ctx.session_id(), TaskKind::PortalUpload, move |handle| async move {
            let receipt = services.portal.upload(&invoices).await?;
            services
                .apply_task_result(&handle, &workspace, |ws| ws.record_portal_upload(receipt))
                .await
        })
        .await
    }

    async fn start_task<F, Fut>(&self, session_id: SessionId, kind: TaskKind, work: F) -> TaskHandle
    where
        F: FnOnce(TaskHandle) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        let handle = TaskHandle::new(session_id, kind);
        self.tasks.insert(handle.clone()).await;
        tracing::info!(session_id = %session_id, task_id = %handle.id(), kind = kind.as_str(), "task started");

        let profile = kind.profile().scaled(self.time_scale);
        let worker = handle.clone();
        // Outcome is observed through the handle.
        drop(spawn_simulated(handle.clone(), profile, move || work(worker)));
        handle
    }
}

fn task_failure(err: DomainError) -> TaskError {
    TaskError::Failed(err.message())
}

/// Build an SSE stream for a session (used by `/stream`).
pub fn session_sse_stream(
    services: Arc<AppServices>,
    session_id: SessionId,
) -> Sse<impl tokio_stream::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = services.realtime_tx().subscribe();
    let stream = BroadcastStream::new(rx).filter_map(move |msg| match msg {
        Ok(m) if m.session_id == session_id => {
            let data = serde_json::to_string(&m.payload).unwrap_or_else(|_| "{}".to_string());
            Some(Ok(SseEvent::default().event(m.topic).data(data)))
        }
        _ => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[cfg(test)]
mod tests {
    use billzy_infra::sample_invoices;

    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            email: "accounts@example.com".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn cancelled_task_results_are_discarded() {
        let services = AppServices::simulated(&ApiConfig::instant());
        let ctx = services.open_session(&credentials()).await.unwrap();
        let handle = TaskHandle::new(ctx.session_id(), TaskKind::BillExtraction);
        // Cancel lands after the runner's checks but before the result is committed.
        handle.cancel();

        let result = services
            .apply_task_result(&handle, ctx.workspace(), |ws| ws.load_invoices(sample_invoices(), 2))
            .await;

        assert_eq!(result, Err(TaskError::Cancelled));
        assert!(ctx.workspace().lock().await.invoices().is_empty());
    }

    #[tokio::test]
    async fn live_task_results_are_committed() {
        let services = AppServices::simulated(&ApiConfig::instant());
        let ctx = services.open_session(&credentials()).await.unwrap();
        let handle = TaskHandle::new(ctx.session_id(), TaskKind::BillExtraction);

        services
            .apply_task_result(&handle, ctx.workspace(), |ws| ws.load_invoices(sample_invoices(), 2))
            .await
            .unwrap();

        assert_eq!(ctx.workspace().lock().await.invoices().len(), 5);
    }

    #[tokio::test]
    async fn logins_sweep_idle_sessions() {
        let config = ApiConfig {
            session_idle_timeout: Duration::ZERO,
            ..ApiConfig::instant()
        };
        let services = AppServices::simulated(&config);
        let first = services.open_session(&credentials()).await.unwrap();
        let second = services.open_session(&credentials()).await.unwrap();

        assert!(services.sessions().get(first.session_id()).is_none());
        assert!(services.sessions().get(second.session_id()).is_some());
        assert_eq!(services.sessions().len(), 1);
    }
}
