//! Inputs consumed by the session orchestrator
//!
//! Collaborators and timers never call into the orchestrator directly. They
//! post one of these onto the supervisor's channel and the supervisor feeds
//! them in arrival order.

use handoff_core::{ResultCode, ServerDescriptor};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// Start an auth connection now (external entry point)
    Connect,
    /// Terminal outcome of an auth attempt
    AuthResult { code: ResultCode, message: String },
    /// Server listing returned by the auth endpoint
    ServerList {
        servers: Vec<ServerDescriptor>,
        /// Last server the account used, informational only
        last_selected: u16,
    },
    /// The auth connection was lost
    AuthDisconnected,
    /// Outcome of the downstream connection attempt
    DownstreamResult { code: ResultCode },
    /// The downstream session was lost
    DownstreamDisconnected,
    /// The reconnect delay timer fired
    DelayExpired { generation: u64 },
    /// The watchdog timer fired
    WatchdogExpired { generation: u64 },
}

impl SessionInput {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::AuthResult { .. } => "auth_result",
            Self::ServerList { .. } => "server_list",
            Self::AuthDisconnected => "auth_disconnected",
            Self::DownstreamResult { .. } => "downstream_result",
            Self::DownstreamDisconnected => "downstream_disconnected",
            Self::DelayExpired { .. } => "delay_expired",
            Self::WatchdogExpired { .. } => "watchdog_expired",
        }
    }
}
