use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use chrono::Utc;
use tokio::sync::RwLock;

use billzy_core::SessionId;

use super::types::{TaskError, TaskId, TaskKind, TaskPhase, TaskProgress};

/// Handle for monitoring and controlling a simulated task.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    id: TaskId,
    session_id: SessionId,
    kind: TaskKind,
    progress: Arc<RwLock<TaskProgress>>,
    cancellation: Arc<AtomicBool>,
}

impl TaskHandle {
    pub fn new(session_id: SessionId, kind: TaskKind) -> Self {
        let id = TaskId::new();
        let progress = TaskProgress {
            task_id: id,
            kind,
            percent: 0,
            phase: TaskPhase::Running,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        };
        Self {
            id,
            session_id,
            kind,
            progress: Arc::new(RwLock::new(progress)),
            cancellation: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Get current progress.
    pub async fn progress(&self) -> TaskProgress {
        self.progress.read().await.clone()
    }

    /// Request cancellation. Takes effect on the runner's next tick.
    pub fn cancel(&self) {
        self.cancellation.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.load(Ordering::Relaxed)
    }

    /// Wait for the task to reach a terminal phase.
    pub async fn wait_for_completion(&self) -> Result<TaskProgress, TaskError> {
        loop {
            let progress = self.progress.read().await.clone();
            match progress.phase {
                TaskPhase::Running => {}
                TaskPhase::Completed => return Ok(progress),
                TaskPhase::Cancelled => return Err(TaskError::Cancelled),
                TaskPhase::Failed => {
                    return Err(TaskError::Failed(progress.error.unwrap_or_default()));
                }
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }
    }

    pub(crate) async fn set_percent(&self, percent: u8) {
        let mut progress = self.progress.write().await;
        if progress.phase == TaskPhase::Running {
            progress.percent = percent.min(100);
        }
    }

    /// Move to a terminal phase. The first terminal phase wins.
    pub(crate) async fn finish(&self, outcome: &Result<(), TaskError>) {
        let mut progress = self.progress.write().await;
        if progress.phase.is_terminal() {
            return;
        }
        match outcome {
            Ok(()) => {
                progress.phase = TaskPhase::Completed;
                progress.percent = 100;
            }
            Err(TaskError::Cancelled) => progress.phase = TaskPhase::Cancelled,
            Err(TaskError::Failed(message)) => {
                progress.phase = TaskPhase::Failed;
                progress.error = Some(message.clone());
            }
        }
        progress.finished_at = Some(Utc::now());
    }
}
