use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, Utc};
use tokio::sync::RwLock;

use billzy_core::SessionId;

use super::handle::TaskHandle;
use super::types::TaskId;

/// How long a finished task stays queryable.
pub const DEFAULT_TASK_RETENTION_MINUTES: i64 = 10;

/// In-memory registry of task handles, scoped by session.
///
/// Finished handles are kept for `retention` after they reach a terminal
/// phase so clients can still poll the outcome, then dropped on the next
/// insert.
#[derive(Clone)]
pub struct TaskStore {
    tasks: Arc<RwLock<HashMap<TaskId, TaskHandle>>>,
    retention: Duration,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::with_retention(Duration::minutes(DEFAULT_TASK_RETENTION_MINUTES))
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retention(retention: Duration) -> Self {
        Self {
            tasks: Arc::default(),
            retention,
        }
    }

    pub async fn insert(&self, handle: TaskHandle) {
        let mut tasks = self.tasks.write().await;
        let pruned = prune_finished(&mut tasks, self.retention).await;
        if pruned > 0 {
            tracing::debug!(pruned, "dropped finished tasks");
        }
        tasks.insert(handle.id(), handle);
    }

    /// Look up a task; handles owned by another session are invisible.
    pub async fn get(&self, session_id: SessionId, task_id: TaskId) -> Option<TaskHandle> {
        self.tasks
            .read()
            .await
            .get(&task_id)
            .filter(|handle| handle.session_id() == session_id)
            .cloned()
    }

    pub async fn list(&self, session_id: SessionId) -> Vec<TaskHandle> {
        let mut handles: Vec<_> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|handle| handle.session_id() == session_id)
            .cloned()
            .collect();
        // v7 ids sort by creation time.
        handles.sort_by_key(|handle| handle.id().0);
        handles
    }

    /// Cancel and forget every task of a session (logout).
    pub async fn cancel_session(&self, session_id: SessionId) -> usize {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, handle| {
            if handle.session_id() == session_id {
                handle.cancel();
                false
            } else {
                true
            }
        });
        before - tasks.len()
    }
}

/// Remove handles that finished more than `retention` ago.
async fn prune_finished(tasks: &mut HashMap<TaskId, TaskHandle>, retention: Duration) -> usize {
    let now = Utc::now();
    let mut expired = Vec::new();
    for (id, handle) in tasks.iter() {
        let finished_at = handle.progress().await.finished_at;
        if finished_at.is_some_and(|at| now - at >= retention) {
            expired.push(*id);
        }
    }
    for id in &expired {
        tasks.remove(id);
    }
    expired.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::types::TaskKind;

    #[tokio::test]
    async fn lookups_are_session_scoped() {
        let store = TaskStore::new();
        let alice = SessionId::new();
        let bob = SessionId::new();
        let handle = TaskHandle::new(alice, TaskKind::BillExtraction);
        store.insert(handle.clone()).await;

        assert!(store.get(alice, handle.id()).await.is_some());
        assert!(store.get(bob, handle.id()).await.is_none());
        assert_eq!(store.list(alice).await.len(), 1);
        assert!(store.list(bob).await.is_empty());
    }

    #[tokio::test]
    async fn cancel_session_flags_and_removes_handles() {
        let store = TaskStore::new();
        let session = SessionId::new();
        let other = SessionId::new();
        let mine = TaskHandle::new(session, TaskKind::PortalUpload);
        let theirs = TaskHandle::new(other, TaskKind::PortalUpload);
        store.insert(mine.clone()).await;
        store.insert(theirs.clone()).await;

        assert_eq!(store.cancel_session(session).await, 1);
        assert!(mine.is_cancelled());
        assert!(!theirs.is_cancelled());
        assert!(store.get(other, theirs.id()).await.is_some());
    }

    #[tokio::test]
    async fn finished_tasks_are_pruned_after_retention() {
        let store = TaskStore::with_retention(Duration::zero());
        let session = SessionId::new();
        let done = TaskHandle::new(session, TaskKind::GstExport);
        done.finish(&Ok(())).await;
        let running = TaskHandle::new(session, TaskKind::PortalUpload);
        store.insert(done.clone()).await;
        store.insert(running.clone()).await;

        // The second insert swept the finished handle; the running one stays.
        assert!(store.get(session, done.id()).await.is_none());
        assert!(store.get(session, running.id()).await.is_some());

        store.insert(TaskHandle::new(session, TaskKind::TallyExport)).await;
        assert_eq!(store.list(session).await.len(), 2);
    }

    #[tokio::test]
    async fn recent_results_stay_queryable() {
        let store = TaskStore::new();
        let session = SessionId::new();
        let done = TaskHandle::new(session, TaskKind::GstExport);
        done.finish(&Ok(())).await;
        store.insert(done.clone()).await;
        store.insert(TaskHandle::new(session, TaskKind::TallyExport)).await;

        assert!(store.get(session, done.id()).await.is_some());
    }
}
