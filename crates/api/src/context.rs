use billzy_core::SessionId;
use billzy_infra::SharedWorkspace;

/// Session context for a request.
///
/// Inserted by the session middleware; present for all routes except
/// `/health` and `/login`.
#[derive(Clone)]
pub struct SessionContext {
    session_id: SessionId,
    workspace: SharedWorkspace,
}

impl SessionContext {
    pub fn new(session_id: SessionId, workspace: SharedWorkspace) -> Self {
        Self {
            session_id,
            workspace,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn workspace(&self) -> &SharedWorkspace {
        &self.workspace
    }
}
