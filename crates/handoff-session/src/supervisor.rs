//! SessionSupervisor - the event loop that owns an orchestrator
//!
//! The supervisor wires the orchestrator to its two collaborators:
//! - inputs (collaborator callbacks, timer firings) arrive on one mpsc channel
//!   and are processed strictly one at a time
//! - commands queued by the orchestrator are dispatched in order to the auth
//!   or downstream client after each input
//!
//! Collaborators hold a [`SessionHandle`] to report back; they never reference
//! each other or the orchestrator. A failed auth call is reported the same way,
//! as a [`SessionInput::AuthDisconnected`] posted to the loop's own channel.

use std::sync::Arc;

use handoff_core::{EventBus, ResultCode, ServerDescriptor, SessionConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::client::{AuthClient, AuthCommand, DownstreamClient, DownstreamCommand, SessionCommand};
use crate::error::SessionError;
use crate::input::SessionInput;
use crate::orchestrator::SessionOrchestrator;

/// Cloneable entry point into a running supervisor
#[derive(Clone)]
pub struct SessionHandle {
    sender: mpsc::UnboundedSender<SessionInput>,
    shutdown: CancellationToken,
}

impl SessionHandle {
    fn send(&self, input: SessionInput) -> Result<(), SessionError> {
        if self.shutdown.is_cancelled() {
            return Err(SessionError::SupervisorStopped);
        }
        self.sender
            .send(input)
            .map_err(|_| SessionError::SupervisorStopped)
    }

    /// Start (or restart after an abort) the auth connection
    pub fn connect(&self) -> Result<(), SessionError> {
        self.send(SessionInput::Connect)
    }

    pub fn auth_result(
        &self,
        code: ResultCode,
        message: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.send(SessionInput::AuthResult {
            code,
            message: message.into(),
        })
    }

    pub fn server_list(
        &self,
        servers: Vec<ServerDescriptor>,
        last_selected: u16,
    ) -> Result<(), SessionError> {
        self.send(SessionInput::ServerList {
            servers,
            last_selected,
        })
    }

    pub fn auth_disconnected(&self) -> Result<(), SessionError> {
        self.send(SessionInput::AuthDisconnected)
    }

    pub fn downstream_result(&self, code: ResultCode) -> Result<(), SessionError> {
        self.send(SessionInput::DownstreamResult { code })
    }

    pub fn downstream_disconnected(&self) -> Result<(), SessionError> {
        self.send(SessionInput::DownstreamDisconnected)
    }

    /// Stop the supervisor loop. Pending timers are dropped with it.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

pub struct SessionSupervisor<A, D> {
    orchestrator: SessionOrchestrator,
    auth: A,
    downstream: D,
    inputs: mpsc::UnboundedReceiver<SessionInput>,
    handle: SessionHandle,
}

impl<A, D> SessionSupervisor<A, D>
where
    A: AuthClient,
    D: DownstreamClient,
{
    pub fn new(config: SessionConfig, auth: A, downstream: D, events: &EventBus) -> Self {
        let (sender, inputs) = mpsc::unbounded_channel();
        let orchestrator =
            SessionOrchestrator::new(Arc::new(config), sender.clone(), events.sender());

        Self {
            orchestrator,
            auth,
            downstream,
            inputs,
            handle: SessionHandle {
                sender,
                shutdown: CancellationToken::new(),
            },
        }
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn orchestrator(&self) -> &SessionOrchestrator {
        &self.orchestrator
    }

    /// Process inputs until [`SessionHandle::shutdown`] is called
    pub async fn run(mut self) {
        let shutdown = self.handle.shutdown.clone();

        info!(
            session_id = %self.orchestrator.session_id(),
            endpoint = %self.orchestrator.config().auth_endpoint,
            server_index = self.orchestrator.config().server_index,
            "Session supervisor started"
        );

        loop {
            let input = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                input = self.inputs.recv() => match input {
                    Some(input) => input,
                    None => break,
                },
            };
            self.process(input).await;
        }

        info!(
            session_id = %self.orchestrator.session_id(),
            state = %self.orchestrator.state(),
            "Session supervisor stopped"
        );
    }

    /// Feed one input to the orchestrator and dispatch what it queued
    pub async fn process(&mut self, input: SessionInput) {
        trace!(
            session_id = %self.orchestrator.session_id(),
            input = input.name(),
            state = %self.orchestrator.state(),
            "Processing session input"
        );
        self.orchestrator.handle(input);
        self.dispatch_pending().await;
    }

    async fn dispatch_pending(&mut self) {
        while let Some(command) = self.orchestrator.next_command() {
            match command {
                SessionCommand::Auth(command) => self.dispatch_auth(command).await,
                SessionCommand::Downstream(command) => self.dispatch_downstream(command).await,
            }
        }
    }

    async fn dispatch_auth(&mut self, command: AuthCommand) {
        let name = command.name();
        let retry_on_failure = !matches!(command, AuthCommand::AbortSession);
        debug!(command = name, "Dispatching auth command");

        let result = match command {
            AuthCommand::Connect(request) => self.auth.connect(request).await,
            AuthCommand::RetrieveServerList => self.auth.retrieve_server_list().await,
            AuthCommand::SelectServer(index) => self.auth.select_server(index).await,
            AuthCommand::AbortSession => self.auth.abort_session().await,
        };

        if let Err(e) = result {
            if retry_on_failure {
                warn!(
                    session_id = %self.orchestrator.session_id(),
                    command = name,
                    "Auth client call failed, treating as disconnect: {:#}", e
                );
                // Goes back through the loop so shutdown is seen between attempts
                let _ = self.handle.sender.send(SessionInput::AuthDisconnected);
            } else {
                error!(
                    session_id = %self.orchestrator.session_id(),
                    command = name,
                    "Failed to abort auth session: {:#}", e
                );
            }
        }
    }

    async fn dispatch_downstream(&mut self, command: DownstreamCommand) {
        let name = command.name();
        debug!(command = name, "Dispatching downstream command");

        let result = match command {
            DownstreamCommand::SetDisplayName(display_name) => {
                self.downstream.set_display_name(&display_name).await
            }
            DownstreamCommand::AbortSession => self.downstream.abort_session().await,
        };

        if let Err(e) = result {
            error!(
                session_id = %self.orchestrator.session_id(),
                command = name,
                "Downstream client call failed: {:#}", e
            );
        }
    }
}
