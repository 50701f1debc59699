//! Per-command session
//!
//! A [`CommandSession`] spans one `send_command` call. At most one
//! exists at a time: the client's session slot doubles as the busy
//! flag. Creating the session installs a terminal-event channel into
//! the slot; dropping it vacates the slot again, on every exit path.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use zvtlink_types::CommandResponse;

/// Events routed from the decoder to the in-flight command
#[derive(Debug)]
pub(crate) enum SessionEvent {
    /// Terminal completion; resolves the command successfully
    Completed,

    /// Terminal abort with resolved error text
    Aborted(String),

    /// Negative command acknowledgement
    NotSupported,

    /// Any other inbound package for this command; re-arms the
    /// completion timer
    Activity,
}

/// Shared slot holding the active session's event sender
pub(crate) type SessionSlot = Arc<Mutex<Option<UnboundedSender<SessionEvent>>>>;

/// Deliver an event to the in-flight session, if any
pub(crate) fn notify(slot: &SessionSlot, event: SessionEvent) {
    if let Some(sender) = slot.lock().as_ref() {
        let _ = sender.send(event);
    }
}

pub(crate) struct CommandSession {
    slot: SessionSlot,
    events: UnboundedReceiver<SessionEvent>,
}

impl CommandSession {
    /// Claim the session slot; `None` when a command is already in flight
    pub(crate) fn begin(slot: &SessionSlot) -> Option<Self> {
        let mut guard = slot.lock();
        if guard.is_some() {
            return None;
        }

        let (sender, events) = mpsc::unbounded_channel();
        *guard = Some(sender);
        drop(guard);

        Some(Self {
            slot: slot.clone(),
            events,
        })
    }

    /// Wait for the terminating event, the cancel signal or the timeout
    ///
    /// The timeout is re-armed whenever inbound activity arrives, so a
    /// long interactive sequence at the terminal does not starve an
    /// otherwise healthy command.
    pub(crate) async fn wait(
        mut self,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> CommandResponse {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("Command cancelled by caller");
                    return CommandResponse::error("Cancelled");
                }

                event = self.events.recv() => match event {
                    None => return CommandResponse::error("Link closed"),
                    Some(SessionEvent::Completed) => return CommandResponse::successful(),
                    Some(SessionEvent::Aborted(message)) => {
                        return CommandResponse::abort(message);
                    }
                    Some(SessionEvent::NotSupported) => {
                        return CommandResponse::not_supported();
                    }
                    Some(SessionEvent::Activity) => continue,
                },

                _ = tokio::time::sleep(timeout) => {
                    debug!("Command completion timeout");
                    return CommandResponse::timeout();
                }
            }
        }
    }
}

impl Drop for CommandSession {
    fn drop(&mut self) {
        *self.slot.lock() = None;
    }
}
