//! Infrastructure layer: session storage, simulated collaborators and the
//! task runner that stands in for real extraction, export and portal IO.

pub mod export;
pub mod extraction;
pub mod portal;
pub mod sessions;
pub mod tasks;

pub use export::{DescriptorExportGenerator, ExportError, ExportGenerator};
pub use extraction::{BillExtractor, ExtractionError, SampleExtractor, sample_invoices};
pub use portal::{PortalClient, PortalError, SimulatedPortal};
pub use sessions::{InMemorySessionStore, SessionStore, SessionStoreError, SharedWorkspace};
pub use tasks::{
    TaskError, TaskHandle, TaskId, TaskKind, TaskPhase, TaskProfile, TaskProgress, TaskStore,
    run_simulated, spawn_simulated,
};
