//! Workflow events: the event trait, envelopes and the per-session outbox.

pub mod envelope;
pub mod event;
pub mod outbox;

pub use envelope::EventEnvelope;
pub use event::{Event, Notice, NoticeLevel};
pub use outbox::Outbox;
