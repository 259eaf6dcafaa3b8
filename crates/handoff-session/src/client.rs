//! Collaborator contracts
//!
//! The auth client and the downstream client are external services. The
//! orchestrator drives them through [`SessionCommand`]s; the supervisor turns
//! each command into a call on the matching trait below. Results come back
//! asynchronously through a [`SessionHandle`](crate::SessionHandle).

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use handoff_core::{AuthCipherMethod, Endpoint, Secret};

/// Everything the auth client needs to open a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthRequest {
    pub endpoint: Endpoint,
    pub account: String,
    pub password: Secret,
    pub cipher_method: AuthCipherMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCommand {
    Connect(AuthRequest),
    RetrieveServerList,
    SelectServer(u16),
    AbortSession,
}

impl AuthCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connect(_) => "connect",
            Self::RetrieveServerList => "retrieve_server_list",
            Self::SelectServer(_) => "select_server",
            Self::AbortSession => "abort_session",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownstreamCommand {
    SetDisplayName(String),
    AbortSession,
}

impl DownstreamCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SetDisplayName(_) => "set_display_name",
            Self::AbortSession => "abort_session",
        }
    }
}

/// A request from the orchestrator to one of its collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Auth(AuthCommand),
    Downstream(DownstreamCommand),
}

/// Client for the authentication endpoint.
///
/// Implementations report `auth_result`, `server_list` and
/// `auth_disconnected` through the session handle.
#[async_trait]
pub trait AuthClient: Send + Sync {
    /// Open a connection and start authenticating
    async fn connect(&self, request: AuthRequest) -> Result<()>;

    /// Request the downstream server listing
    async fn retrieve_server_list(&self) -> Result<()>;

    /// Ask the auth endpoint to hand the account over to a server
    async fn select_server(&self, server_index: u16) -> Result<()>;

    /// Tear down the auth session
    async fn abort_session(&self) -> Result<()>;
}

/// Client for the selected downstream server.
///
/// Implementations report `downstream_result` and `downstream_disconnected`
/// through the session handle.
#[async_trait]
pub trait DownstreamClient: Send + Sync {
    /// Label the downstream session with the selected server's name
    async fn set_display_name(&self, name: &str) -> Result<()>;

    /// Tear down the downstream session
    async fn abort_session(&self) -> Result<()>;
}

#[async_trait]
impl<T: AuthClient + ?Sized> AuthClient for Arc<T> {
    async fn connect(&self, request: AuthRequest) -> Result<()> {
        (**self).connect(request).await
    }

    async fn retrieve_server_list(&self) -> Result<()> {
        (**self).retrieve_server_list().await
    }

    async fn select_server(&self, server_index: u16) -> Result<()> {
        (**self).select_server(server_index).await
    }

    async fn abort_session(&self) -> Result<()> {
        (**self).abort_session().await
    }
}

#[async_trait]
impl<T: DownstreamClient + ?Sized> DownstreamClient for Arc<T> {
    async fn set_display_name(&self, name: &str) -> Result<()> {
        (**self).set_display_name(name).await
    }

    async fn abort_session(&self) -> Result<()> {
        (**self).abort_session().await
    }
}
