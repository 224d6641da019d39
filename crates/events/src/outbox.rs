//! Per-session outbox of recorded events.
//!
//! Operations record events here as they are applied; the transport layer
//! drains them and fans them out (e.g. to an SSE stream). Drained envelopes
//! are not retained, only the sequence counter survives a drain.

use uuid::Uuid;

use billzy_core::SessionId;

use crate::envelope::EventEnvelope;
use crate::event::Event;

#[derive(Debug, Clone)]
pub struct Outbox<E> {
    session_id: SessionId,
    pending: Vec<EventEnvelope<E>>,
    last_sequence: u64,
}

impl<E: Event> Outbox<E> {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            pending: Vec::new(),
            last_sequence: 0,
        }
    }

    /// Wrap `event` in an envelope with the next sequence number.
    pub fn record(&mut self, event: E) -> &EventEnvelope<E> {
        self.last_sequence += 1;
        let sequence_number = self.last_sequence;
        tracing::debug!(
            session_id = %self.session_id,
            event_type = event.event_type(),
            sequence_number,
            "recorded event"
        );
        let index = self.pending.len();
        self.pending.push(EventEnvelope::new(
            Uuid::now_v7(),
            self.session_id,
            event.event_type(),
            sequence_number,
            event,
        ));
        &self.pending[index]
    }

    /// Envelopes recorded since the previous drain.
    pub fn drain_pending(&mut self) -> Vec<EventEnvelope<E>> {
        std::mem::take(&mut self.pending)
    }
}
