use thiserror::Error;

/// Errors returned to callers of a [`SessionHandle`](crate::SessionHandle)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The supervisor loop was shut down or dropped
    #[error("session supervisor has stopped")]
    SupervisorStopped,
}
