//! Event Bus - fan-out of session events
//!
//! The orchestrator emits every state change and notable outcome through this
//! bus. Consumers (status displays, audit loggers, tests) subscribe and each
//! receive their own copy.
//!
//! ```ignore
//! let bus = EventBus::new();
//! let mut events = bus.subscribe();
//!
//! // Hand a sender to the orchestrator
//! let supervisor = SessionSupervisor::new(config, auth, downstream, &bus);
//!
//! while let Some(event) = events.recv().await { ... }
//! ```

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, warn};

use crate::{SessionEvent, SessionState};

/// Default channel capacity for the event bus
const DEFAULT_CAPACITY: usize = 256;

/// Broadcast hub for [`SessionEvent`]s
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Get a sender for emitting events
    pub fn sender(&self) -> EventSender {
        EventSender::new(self.sender.clone())
    }

    /// Subscribe to events emitted after this call
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver::new(self.sender.subscribe())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheaply cloneable emitting side of the bus
#[derive(Clone)]
pub struct EventSender {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventSender {
    fn new(sender: broadcast::Sender<SessionEvent>) -> Self {
        Self { sender }
    }

    /// Emit an event.
    ///
    /// Returns the number of receivers, 0 when nobody listens (not an error).
    pub fn emit(&self, event: SessionEvent) -> usize {
        let type_name = event.type_name();
        let session_id = event.session_id();
        match self.sender.send(event) {
            Ok(count) => {
                debug!(
                    session_id = %session_id,
                    event = type_name,
                    receivers = count,
                    "Session event"
                );
                count
            }
            Err(_) => {
                debug!(
                    session_id = %session_id,
                    event = type_name,
                    "Session event dropped, nobody listening"
                );
                0
            }
        }
    }
}

/// Receiving side of the bus
pub struct EventReceiver {
    receiver: broadcast::Receiver<SessionEvent>,
}

impl EventReceiver {
    fn new(receiver: broadcast::Receiver<SessionEvent>) -> Self {
        Self { receiver }
    }

    /// Receive the next event.
    ///
    /// Returns `None` once the bus is gone. Lagging is logged and skipped.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session event subscriber fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next queued event, `None` when nothing is waiting
    pub fn try_recv(&mut self) -> Option<SessionEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session event subscriber fell behind");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Wait until the session enters `state`, discarding other events.
    ///
    /// Returns `false` if the bus closes first.
    pub async fn wait_for_state(&mut self, state: SessionState) -> bool {
        while let Some(event) = self.recv().await {
            if let SessionEvent::StateChanged { to, .. } = event {
                if to == state {
                    return true;
                }
            }
        }
        false
    }

    /// Drain every event currently queued
    pub fn drain(&mut self) -> Vec<SessionEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
