//! # Handoff Session Library
//!
//! Drives a two-stage client: authenticate against an auth endpoint, pick a
//! downstream server from its listing, hand off to that server and keep the
//! whole chain alive across disconnects.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  SessionHandle   ┌──────────────────────────────────────┐
//! │  AuthClient  │ ───────────────▶ │          SessionSupervisor           │
//! │ (collaborator│                  │  mpsc<SessionInput> ──▶ Orchestrator │
//! └──────────────┘ ◀─ AuthCommand ─ │            │   ▲                     │
//! ┌──────────────┐                  │   commands │   │ DelayExpired /      │
//! │ Downstream   │ ◀─ Downstream ── │            ▼   │ WatchdogExpired     │
//! │   Client     │     Command      │   dispatch    OneShotTimer x2        │
//! └──────────────┘ ───────────────▶ └──────────────────────────────────────┘
//!                  SessionHandle                  │
//!                                                 ▼ SessionEvent
//!                                             EventBus
//! ```
//!
//! The orchestrator never calls a collaborator itself: it queues
//! [`SessionCommand`]s which the supervisor routes, and it learns about
//! results only through [`SessionInput`]s delivered on one channel. Inputs are
//! handled strictly one at a time.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use handoff_core::{EventBus, SessionConfig};
//! use handoff_session::SessionSupervisor;
//!
//! let config = SessionConfig::load(Path::new("handoff.json"))?;
//! let bus = EventBus::new();
//! let supervisor = SessionSupervisor::new(config, auth_client, downstream_client, &bus);
//!
//! let handle = supervisor.handle();
//! handle.connect()?;
//! tokio::spawn(supervisor.run());
//!
//! // collaborators report back through clones of `handle`
//! handle.auth_result(ResultCode::SUCCESS, "")?;
//! ```

pub mod client;
pub mod error;
pub mod input;
pub mod logging;
pub mod orchestrator;
pub mod supervisor;
pub mod timer;

pub use client::{
    AuthClient, AuthCommand, AuthRequest, DownstreamClient, DownstreamCommand, SessionCommand,
};
pub use error::SessionError;
pub use input::SessionInput;
pub use logging::{init_tracing, LogConfig};
pub use orchestrator::SessionOrchestrator;
pub use supervisor::{SessionHandle, SessionSupervisor};
pub use timer::OneShotTimer;
