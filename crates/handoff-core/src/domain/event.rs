//! Session Events - what the orchestrator reports while it runs
//!
//! Events are emitted by the session orchestrator and consumed by whoever
//! subscribes to the [`EventBus`](crate::EventBus): status displays, audit
//! logs, tests.
//!
//! # Serialization
//!
//! Events serialize with a `type` field containing the snake_case variant name:
//! ```json
//! { "type": "state_changed", "session_id": "...", "from": "idle", "to": "connecting_auth", "cycle": 1 }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ResultCode, ServerDescriptor};

// ============================================================================
// SESSION STATE
// ============================================================================

/// Where the orchestrator is in its connect cycle.
///
/// Exactly one state holds at a time, so the auth and downstream tiers can
/// never both be in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing started yet
    #[default]
    Idle,
    /// Connecting and authenticating against the auth endpoint
    ConnectingAuth,
    /// Authenticated, waiting for the server listing
    ListingServers,
    /// Selection requested, waiting for the downstream result
    ConnectingDownstream,
    /// Downstream session is up
    Live,
    /// Waiting for the reconnect delay to elapse
    DelayWait,
    /// Rejected by the auth endpoint or the downstream server
    Aborted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ConnectingAuth => "connecting_auth",
            Self::ListingServers => "listing_servers",
            Self::ConnectingDownstream => "connecting_downstream",
            Self::Live => "live",
            Self::DelayWait => "delay_wait",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SESSION EVENT ENUM
// ============================================================================

/// Events emitted by a session orchestrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The orchestrator moved between states
    StateChanged {
        session_id: Uuid,
        from: SessionState,
        to: SessionState,
        /// Monotonic connect counter, bumped by every connect
        cycle: u64,
    },

    /// A reconnect was scheduled after a disconnect
    ReconnectScheduled { session_id: Uuid, delay_ms: u64 },

    /// The auth endpoint rejected the credentials
    AuthRejected {
        session_id: Uuid,
        code: ResultCode,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    /// The configured server was found in the listing
    ServerResolved {
        session_id: Uuid,
        server_index: u16,
        server_name: String,
    },

    /// The configured server is absent from the listing
    ServerMissing {
        session_id: Uuid,
        server_index: u16,
        last_selected: u16,
        available: Vec<ServerDescriptor>,
    },

    /// The watchdog fired and the downstream session is being torn down
    WatchdogExpired { session_id: Uuid, cycle: u64 },

    /// The downstream server rejected the session
    DownstreamRejected { session_id: Uuid, code: ResultCode },
}

impl SessionEvent {
    /// Snake_case event name, matching the serialized `type` tag
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::StateChanged { .. } => "state_changed",
            Self::ReconnectScheduled { .. } => "reconnect_scheduled",
            Self::AuthRejected { .. } => "auth_rejected",
            Self::ServerResolved { .. } => "server_resolved",
            Self::ServerMissing { .. } => "server_missing",
            Self::WatchdogExpired { .. } => "watchdog_expired",
            Self::DownstreamRejected { .. } => "downstream_rejected",
        }
    }

    pub fn session_id(&self) -> Uuid {
        match self {
            Self::StateChanged { session_id, .. }
            | Self::ReconnectScheduled { session_id, .. }
            | Self::AuthRejected { session_id, .. }
            | Self::ServerResolved { session_id, .. }
            | Self::ServerMissing { session_id, .. }
            | Self::WatchdogExpired { session_id, .. }
            | Self::DownstreamRejected { session_id, .. } => *session_id,
        }
    }
}
