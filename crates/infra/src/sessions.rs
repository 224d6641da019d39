//! Session-isolated workspaces.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use billzy_core::SessionId;
use billzy_workflow::Workspace;

/// A workspace shared between request handlers and background tasks.
pub type SharedWorkspace = Arc<Mutex<Workspace>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session store unavailable")]
    Unavailable,
}

pub trait SessionStore: Send + Sync {
    /// Open a fresh workspace under a new session id.
    fn create(&self) -> Result<(SessionId, SharedWorkspace), SessionStoreError>;
    /// Look up a session and mark it as used.
    fn get(&self, session_id: SessionId) -> Option<SharedWorkspace>;
    fn remove(&self, session_id: SessionId) -> Option<SharedWorkspace>;
    /// Drop sessions unused for at least `max_idle` and return their ids.
    fn evict_idle(&self, max_idle: Duration) -> Vec<SessionId>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    fn create(&self) -> Result<(SessionId, SharedWorkspace), SessionStoreError> {
        (**self).create()
    }

    fn get(&self, session_id: SessionId) -> Option<SharedWorkspace> {
        (**self).get(session_id)
    }

    fn remove(&self, session_id: SessionId) -> Option<SharedWorkspace> {
        (**self).remove(session_id)
    }

    fn evict_idle(&self, max_idle: Duration) -> Vec<SessionId> {
        (**self).evict_idle(max_idle)
    }

    fn len(&self) -> usize {
        (**self).len()
    }
}

#[derive(Debug)]
struct Entry {
    workspace: SharedWorkspace,
    last_seen: Instant,
}

/// In-memory session store; everything is lost on restart.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<SessionId, Entry>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn create(&self) -> Result<(SessionId, SharedWorkspace), SessionStoreError> {
        let mut map = self.inner.write().map_err(|_| SessionStoreError::Unavailable)?;
        let session_id = SessionId::new();
        let workspace = Arc::new(Mutex::new(Workspace::new(session_id)));
        map.insert(
            session_id,
            Entry {
                workspace: workspace.clone(),
                last_seen: Instant::now(),
            },
        );
        Ok((session_id, workspace))
    }

    fn get(&self, session_id: SessionId) -> Option<SharedWorkspace> {
        let mut map = self.inner.write().ok()?;
        let entry = map.get_mut(&session_id)?;
        entry.last_seen = Instant::now();
        Some(entry.workspace.clone())
    }

    fn remove(&self, session_id: SessionId) -> Option<SharedWorkspace> {
        let mut map = self.inner.write().ok()?;
        map.remove(&session_id).map(|entry| entry.workspace)
    }

    fn evict_idle(&self, max_idle: Duration) -> Vec<SessionId> {
        let Ok(mut map) = self.inner.write() else {
            return Vec::new();
        };
        let now = Instant::now();
        let idle: Vec<SessionId> = map
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_seen) >= max_idle)
            .map(|(id, _)| *id)
            .collect();
        for id in &idle {
            map.remove(id);
        }
        idle
    }

    fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }
}
