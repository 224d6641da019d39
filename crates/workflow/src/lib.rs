//! Filing workflow: screen navigation, file selection, exports and the
//! per-session workspace that owns the working set.
//!
//! Pure state machine; timing and collaborators live in `billzy-infra`.

pub mod export;
pub mod screen;
pub mod selection;
pub mod workspace;

pub use export::{ExportArtifact, ExportKind, PortalReceipt};
pub use screen::{NAV_ITEMS, Screen};
pub use selection::{FileSelection, SUPPORTED_EXTENSIONS, is_supported};
pub use workspace::{Credentials, DashboardStats, WorkflowEvent, Workspace};
