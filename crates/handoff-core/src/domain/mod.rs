//! Domain types and events
//!
//! - Configuration (SessionConfig, Endpoint, Secret)
//! - Value objects (ServerDescriptor, ResultCode, SessionState)
//! - Session events (SessionEvent)

pub mod config;
mod event;
mod result_code;
mod server;

pub use config::{AuthCipherMethod, Endpoint, Secret, SessionConfig};
pub use event::{SessionEvent, SessionState};
pub use result_code::ResultCode;
pub use server::{find_server, ServerDescriptor, MAX_LOAD_RATIO};
