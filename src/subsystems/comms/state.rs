//! Shared state for the Comms subsystem — capability boundary for channels.
//!
//! Channels receive an `Arc<CommsState>` and are restricted to the typed
//! methods below.  The [`NotesService`] is private; channels hand over an
//! [`Inbound`] and get a reply back, nothing more.
//!
//! # Intra-subsystem events
//!
//! [`CommsState::report_event`] lets a running channel signal the comms
//! subsystem manager (e.g. "I shut down", "new session started") without
//! a direct reference to it.  The manager owns the receiver end.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::subsystems::notes::{Inbound, NotesService};

// ── Events ────────────────────────────────────────────────────────────────────

/// Events a channel sends back to the comms subsystem manager.
#[derive(Debug)]
pub enum CommsEvent {
    /// Channel has stopped (clean exit or EOF).
    ChannelShutdown { channel_id: String },
    /// A new session/connection was established on the channel.
    SessionStarted { channel_id: String },
}

// ── State ─────────────────────────────────────────────────────────────────────

/// Shared state passed as `Arc<CommsState>` to every channel task.
pub struct CommsState {
    notes: Arc<NotesService>,
    /// Back-channel to the comms subsystem manager.
    event_tx: mpsc::Sender<CommsEvent>,
}

impl CommsState {
    pub fn new(notes: Arc<NotesService>, event_tx: mpsc::Sender<CommsEvent>) -> Self {
        Self { notes, event_tx }
    }

    /// Hand `inbound` from `channel_id` to the notes service and await the
    /// reply.  `Ok(None)` means the message needs no reply.
    ///
    /// Store access is blocking, so the service runs on the blocking pool.
    /// `Err` only when that task itself fails; note-level failures are
    /// already folded into the reply text.
    pub async fn send_message(
        &self,
        channel_id: &str,
        inbound: Inbound,
    ) -> Result<Option<String>, AppError> {
        debug!(%channel_id, sender = ?inbound.sender, "dispatching inbound message");
        let notes = self.notes.clone();
        tokio::task::spawn_blocking(move || notes.handle(&inbound))
            .await
            .map_err(|e| AppError::Comms(format!("notes task failed: {e}")))
    }

    /// Whether `identity` is on the notes allow-list.
    pub fn is_authorized(&self, identity: &str) -> bool {
        self.notes.is_authorized(identity)
    }

    /// Report an event to the comms subsystem manager.
    ///
    /// Non-blocking: drops the event and logs a warning if the manager is not
    /// keeping up (channel full) or has already exited (closed).
    pub fn report_event(&self, event: CommsEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("comms event dropped: {e}");
        }
    }
}
