//! One-shot timers for the orchestrator
//!
//! A timer firing is delivered as a [`SessionInput`] on the owner's channel,
//! tagged with the generation it was armed with. Re-arming aborts the pending
//! sleep and bumps the generation, so a firing that was already queued before
//! the re-arm is recognised as stale by [`OneShotTimer::accept`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::input::SessionInput;

pub struct OneShotTimer {
    name: &'static str,
    sender: mpsc::UnboundedSender<SessionInput>,
    make_input: fn(u64) -> SessionInput,
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl OneShotTimer {
    pub fn new(
        name: &'static str,
        sender: mpsc::UnboundedSender<SessionInput>,
        make_input: fn(u64) -> SessionInput,
    ) -> Self {
        Self {
            name,
            sender,
            make_input,
            generation: 0,
            handle: None,
        }
    }

    /// Arm the timer, replacing any pending firing.
    ///
    /// Must be called from within a tokio runtime. Returns the new generation.
    pub fn arm(&mut self, duration: Duration) -> u64 {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
        self.generation += 1;

        let generation = self.generation;
        let name = self.name;
        let input = (self.make_input)(generation);
        let sender = self.sender.clone();

        trace!(
            timer = name,
            generation,
            duration_ms = duration.as_millis() as u64,
            "Arming timer"
        );
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            if sender.send(input).is_err() {
                debug!(timer = name, generation, "Timer fired after its owner stopped");
            }
        }));
        generation
    }

    /// Whether a firing is outstanding (armed and not yet accepted)
    pub fn is_pending(&self) -> bool {
        self.handle.is_some()
    }

    /// Consume a firing. Returns false when it belongs to an earlier arm.
    pub fn accept(&mut self, generation: u64) -> bool {
        if self.handle.is_none() || generation != self.generation {
            return false;
        }
        self.handle = None;
        true
    }
}

impl Drop for OneShotTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
