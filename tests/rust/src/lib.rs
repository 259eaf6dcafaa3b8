//! Shared test utilities and fixtures for Handoff integration tests.

pub use handoff_core::{
    Endpoint, ResultCode, Secret, ServerDescriptor, SessionConfig, SessionEvent, SessionState,
};

pub use mocks::{AuthCall, DownstreamCall, MockAuthClient, MockDownstreamClient};

pub use services::SupervisorTestHarness;

/// Install a test-writer subscriber once per test binary (`RUST_LOG` honoured)
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config fixtures
pub mod fixtures {
    use super::*;

    pub const TARGET_INDEX: u16 = 2;

    /// Config targeting server 2 with immediate reconnect and no watchdog
    pub fn test_config() -> SessionConfig {
        SessionConfig::new(
            Endpoint::new("auth.test", 4500),
            "operator",
            Secret::new("hunter2"),
            TARGET_INDEX,
        )
        .with_reconnect_delay_ms(0)
    }

    /// Listing with a duplicate entry for the target index
    pub fn test_listing() -> Vec<ServerDescriptor> {
        vec![
            ServerDescriptor::new(1, "Alpha", "10.0.0.1", 4514, 12),
            ServerDescriptor::new(TARGET_INDEX, "Beta", "10.0.0.2", 4514, 48),
            ServerDescriptor::new(TARGET_INDEX, "Beta-shadow", "10.0.0.3", 4514, 3),
            ServerDescriptor::new(5, "Gamma", "10.0.0.5", 4514, 91),
        ]
    }

    /// Listing without the target index
    pub fn listing_without_target() -> Vec<ServerDescriptor> {
        test_listing()
            .into_iter()
            .filter(|s| s.index != TARGET_INDEX)
            .collect()
    }
}

/// Event assertions
pub mod events {
    use super::*;

    /// States entered, in order
    pub fn state_trail(events: &[SessionEvent]) -> Vec<SessionState> {
        events
            .iter()
            .filter_map(|e| match e {
                SessionEvent::StateChanged { to, .. } => Some(*to),
                _ => None,
            })
            .collect()
    }

    pub fn count_of(events: &[SessionEvent], type_name: &str) -> usize {
        events.iter().filter(|e| e.type_name() == type_name).count()
    }
}
