//! # Handoff Core Library
//!
//! Domain types, session events and configuration for the Handoff session
//! orchestrator.
//!
//! ## Modules
//!
//! - `domain` - Core types (SessionConfig, ServerDescriptor, ResultCode, SessionEvent)
//! - `event_bus` - Broadcast distribution of session events
//! - `error` - Typed errors for configuration loading

pub mod domain;
pub mod error;
pub mod event_bus;

// Re-export commonly used types
pub use domain::*;
pub use error::{ConfigError, ConfigResult};
pub use event_bus::{EventBus, EventReceiver, EventSender};
