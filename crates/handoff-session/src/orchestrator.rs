//! SessionOrchestrator - the connect / hand-off / retry state machine
//!
//! Cycle: connect to auth → authenticate → list servers → select the
//! configured server → downstream session live. Any disconnect, at either tier,
//! restarts the cycle from the auth step after the reconnect delay. Explicit
//! rejections abort the session instead of retrying.
//!
//! Two timers run independently:
//! - reconnect delay: paces retries after a disconnect
//! - watchdog: armed on server selection, forces the downstream session down
//!   when it fires so that the resulting disconnect restarts the cycle
//!
//! The orchestrator is synchronous. Handlers queue [`SessionCommand`]s for the
//! supervisor to dispatch and emit [`SessionEvent`]s on the bus. Timer firings
//! come back as [`SessionInput`]s on the channel given to [`SessionOrchestrator::new`].

use std::collections::VecDeque;
use std::sync::Arc;

use handoff_core::{
    find_server, EventSender, ResultCode, ServerDescriptor, SessionConfig, SessionEvent,
    SessionState,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::client::{AuthCommand, AuthRequest, DownstreamCommand, SessionCommand};
use crate::input::SessionInput;
use crate::timer::OneShotTimer;

pub struct SessionOrchestrator {
    session_id: Uuid,
    config: Arc<SessionConfig>,
    state: SessionState,
    /// Bumped by every connect
    cycle: u64,
    delay_timer: OneShotTimer,
    watchdog_timer: OneShotTimer,
    outbox: VecDeque<SessionCommand>,
    events: EventSender,
}

impl SessionOrchestrator {
    /// Create an idle orchestrator. Timer firings are posted to `inputs`.
    pub fn new(
        config: Arc<SessionConfig>,
        inputs: mpsc::UnboundedSender<SessionInput>,
        events: EventSender,
    ) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            config,
            state: SessionState::Idle,
            cycle: 0,
            delay_timer: OneShotTimer::new("reconnect_delay", inputs.clone(), |generation| {
                SessionInput::DelayExpired { generation }
            }),
            watchdog_timer: OneShotTimer::new("watchdog", inputs, |generation| {
                SessionInput::WatchdogExpired { generation }
            }),
            outbox: VecDeque::new(),
            events,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn is_delay_pending(&self) -> bool {
        self.delay_timer.is_pending()
    }

    pub fn is_watchdog_pending(&self) -> bool {
        self.watchdog_timer.is_pending()
    }

    /// Pop the oldest queued command
    pub fn next_command(&mut self) -> Option<SessionCommand> {
        self.outbox.pop_front()
    }

    /// Take every queued command, oldest first
    pub fn drain_commands(&mut self) -> Vec<SessionCommand> {
        self.outbox.drain(..).collect()
    }

    /// Route one input to its handler
    pub fn handle(&mut self, input: SessionInput) {
        match input {
            SessionInput::Connect => self.connect(),
            SessionInput::AuthResult { code, message } => self.on_auth_result(code, &message),
            SessionInput::ServerList {
                servers,
                last_selected,
            } => self.on_server_list(&servers, last_selected),
            SessionInput::AuthDisconnected => self.on_auth_disconnected(),
            SessionInput::DownstreamResult { code } => self.on_downstream_result(code),
            SessionInput::DownstreamDisconnected => self.on_downstream_disconnected(),
            SessionInput::DelayExpired { generation } => self.on_delay_expired(generation),
            SessionInput::WatchdogExpired { generation } => self.on_watchdog_expired(generation),
        }
    }

    // =========================================================================
    // Connection entry
    // =========================================================================

    /// Start an auth connection with the configured credentials
    pub fn connect(&mut self) {
        self.cycle += 1;

        info!(
            session_id = %self.session_id,
            cycle = self.cycle,
            endpoint = %self.config.auth_endpoint,
            account = %self.config.account,
            "Connecting to auth endpoint"
        );

        self.transition(SessionState::ConnectingAuth);
        self.push_auth(AuthCommand::Connect(AuthRequest {
            endpoint: self.config.auth_endpoint.clone(),
            account: self.config.account.clone(),
            password: self.config.password.clone(),
            cipher_method: self.config.cipher_method,
        }));
    }

    /// Reconnect after the configured delay, or right away when it is not positive
    pub fn delayed_connect(&mut self) {
        let Some(delay) = self.config.reconnect_delay() else {
            self.connect();
            return;
        };

        if self.delay_timer.is_pending() {
            warn!(
                session_id = %self.session_id,
                "Reconnect already pending, restarting delay timer"
            );
        }

        let delay_ms = delay.as_millis() as u64;
        info!(
            session_id = %self.session_id,
            delay_ms,
            "Will connect to auth in {}ms", delay_ms
        );

        self.transition(SessionState::DelayWait);
        self.delay_timer.arm(delay);
        self.events.emit(SessionEvent::ReconnectScheduled {
            session_id: self.session_id,
            delay_ms,
        });
    }

    // =========================================================================
    // Auth phase
    // =========================================================================

    pub fn on_auth_disconnected(&mut self) {
        debug!(session_id = %self.session_id, state = %self.state, "Auth connection lost");
        self.delayed_connect();
    }

    pub fn on_auth_result(&mut self, code: ResultCode, message: &str) {
        if !code.is_success() {
            let detail = if message.is_empty() {
                "no associated string"
            } else {
                message
            };
            error!(
                session_id = %self.session_id,
                code = code.value(),
                "{}: Auth failed result: {} ({})",
                self.config.account,
                code,
                detail
            );
            self.events.emit(SessionEvent::AuthRejected {
                session_id: self.session_id,
                code,
                message: (!message.is_empty()).then(|| message.to_string()),
            });
            self.abort();
            return;
        }

        info!(session_id = %self.session_id, "Retrieving server list");
        self.transition(SessionState::ListingServers);
        self.push_auth(AuthCommand::RetrieveServerList);
    }

    pub fn on_server_list(&mut self, servers: &[ServerDescriptor], last_selected: u16) {
        let server_index = self.config.server_index;

        match find_server(servers, server_index) {
            Some(server) => {
                debug!(
                    session_id = %self.session_id,
                    server_index,
                    server_name = %server.name,
                    "Target server found in listing"
                );
                self.push_downstream(DownstreamCommand::SetDisplayName(server.name.clone()));
                self.events.emit(SessionEvent::ServerResolved {
                    session_id: self.session_id,
                    server_index,
                    server_name: server.name.clone(),
                });
            }
            None => {
                error!(
                    session_id = %self.session_id,
                    server_index,
                    "Server with index {} not found", server_index
                );
                info!("Server list (last id: {})", last_selected);
                for server in servers {
                    info!("{}", server.diagnostic_line());
                }
                self.events.emit(SessionEvent::ServerMissing {
                    session_id: self.session_id,
                    server_index,
                    last_selected,
                    available: servers.to_vec(),
                });

                if !self.config.select_missing_server {
                    warn!(
                        session_id = %self.session_id,
                        server_index,
                        "Not selecting a server absent from the listing"
                    );
                    self.abort();
                    return;
                }
            }
        }

        info!(
            session_id = %self.session_id,
            server_index,
            "Connecting to downstream server with index {}", server_index
        );
        self.transition(SessionState::ConnectingDownstream);
        self.push_auth(AuthCommand::SelectServer(server_index));

        if let Some(grace) = self.config.watchdog_duration() {
            debug!(
                session_id = %self.session_id,
                "Starting watchdog timer: {}s", self.config.watchdog_secs
            );
            self.watchdog_timer.arm(grace);
        }
    }

    // =========================================================================
    // Downstream phase
    // =========================================================================

    pub fn on_downstream_disconnected(&mut self) {
        debug!(
            session_id = %self.session_id,
            state = %self.state,
            watchdog_pending = self.watchdog_timer.is_pending(),
            "Downstream session lost"
        );
        self.delayed_connect();
    }

    pub fn on_downstream_result(&mut self, code: ResultCode) {
        if !code.is_success() {
            error!(
                session_id = %self.session_id,
                code = code.value(),
                "Downstream server returned an error while authenticating: {}", code
            );
            self.events.emit(SessionEvent::DownstreamRejected {
                session_id: self.session_id,
                code,
            });
            self.abort();
            return;
        }

        info!(session_id = %self.session_id, "Connected to downstream server");
        self.transition(SessionState::Live);
    }

    // =========================================================================
    // Timers
    // =========================================================================

    pub fn on_delay_expired(&mut self, generation: u64) {
        if !self.delay_timer.accept(generation) {
            debug!(session_id = %self.session_id, generation, "Ignoring stale reconnect timer");
            return;
        }

        info!(
            session_id = %self.session_id,
            "End of delay connect timer, connecting to auth now"
        );
        self.connect();
    }

    pub fn on_watchdog_expired(&mut self, generation: u64) {
        if !self.watchdog_timer.accept(generation) {
            debug!(session_id = %self.session_id, generation, "Ignoring stale watchdog timer");
            return;
        }

        info!(
            session_id = %self.session_id,
            cycle = self.cycle,
            state = %self.state,
            "Watchdog timeout, reconnecting"
        );
        self.events.emit(SessionEvent::WatchdogExpired {
            session_id: self.session_id,
            cycle: self.cycle,
        });
        self.push_downstream(DownstreamCommand::AbortSession);
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn abort(&mut self) {
        self.transition(SessionState::Aborted);
        self.push_auth(AuthCommand::AbortSession);
    }

    fn transition(&mut self, to: SessionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;

        debug!(
            session_id = %self.session_id,
            cycle = self.cycle,
            from = %from,
            to = %to,
            "Session state changed"
        );
        self.events.emit(SessionEvent::StateChanged {
            session_id: self.session_id,
            from,
            to,
            cycle: self.cycle,
        });
    }

    fn push_auth(&mut self, command: AuthCommand) {
        self.outbox.push_back(SessionCommand::Auth(command));
    }

    fn push_downstream(&mut self, command: DownstreamCommand) {
        self.outbox.push_back(SessionCommand::Downstream(command));
    }
}
