//! Session configuration
//!
//! A [`SessionConfig`] is read from a JSON file, optionally overridden from the
//! environment (`HANDOFF_*` variables, `.env` supported) and validated once.
//! It is immutable afterwards and shared by the orchestrator.
//!
//! ```json
//! {
//!   "auth_endpoint": { "host": "auth.example.net", "port": 4500 },
//!   "account": "operator",
//!   "password": "hunter2",
//!   "server_index": 3,
//!   "cipher_method": "rsa_aes",
//!   "reconnect_delay_ms": 5000,
//!   "watchdog_secs": 600
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ConfigError, ConfigResult};

/// Default pause before reconnecting to the auth endpoint
pub const DEFAULT_RECONNECT_DELAY_MS: i64 = 5000;

pub const ENV_AUTH_HOST: &str = "HANDOFF_AUTH_HOST";
pub const ENV_AUTH_PORT: &str = "HANDOFF_AUTH_PORT";
pub const ENV_ACCOUNT: &str = "HANDOFF_ACCOUNT";
pub const ENV_PASSWORD: &str = "HANDOFF_PASSWORD";
pub const ENV_SERVER_INDEX: &str = "HANDOFF_SERVER_INDEX";
pub const ENV_RECONNECT_DELAY_MS: &str = "HANDOFF_RECONNECT_DELAY_MS";
pub const ENV_WATCHDOG_SECS: &str = "HANDOFF_WATCHDOG_SECS";

/// Network address of the auth endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Cipher used by the auth client to protect the credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthCipherMethod {
    #[default]
    Des,
    RsaAes,
}

impl AuthCipherMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Des => "des",
            Self::RsaAes => "rsa_aes",
        }
    }
}

/// Credential secret, wiped from memory on drop and never printed
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the plain text, for handing to the auth client only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

fn default_reconnect_delay_ms() -> i64 {
    DEFAULT_RECONNECT_DELAY_MS
}

fn default_true() -> bool {
    true
}

/// Static configuration of one orchestrated session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub auth_endpoint: Endpoint,
    pub account: String,
    pub password: Secret,
    /// Index of the downstream server to select
    pub server_index: u16,
    #[serde(default)]
    pub cipher_method: AuthCipherMethod,
    /// Pause before reconnecting after a disconnect; `<= 0` reconnects immediately
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: i64,
    /// Watchdog grace period in seconds after server selection; `<= 0` disables it
    #[serde(default)]
    pub watchdog_secs: i64,
    /// Still request selection when the listing lacks `server_index`
    #[serde(default = "default_true")]
    pub select_missing_server: bool,
}

impl SessionConfig {
    pub fn new(
        auth_endpoint: Endpoint,
        account: impl Into<String>,
        password: Secret,
        server_index: u16,
    ) -> Self {
        Self {
            auth_endpoint,
            account: account.into(),
            password,
            server_index,
            cipher_method: AuthCipherMethod::default(),
            reconnect_delay_ms: DEFAULT_RECONNECT_DELAY_MS,
            watchdog_secs: 0,
            select_missing_server: true,
        }
    }

    pub fn with_cipher_method(mut self, method: AuthCipherMethod) -> Self {
        self.cipher_method = method;
        self
    }

    pub fn with_reconnect_delay_ms(mut self, delay_ms: i64) -> Self {
        self.reconnect_delay_ms = delay_ms;
        self
    }

    pub fn with_watchdog_secs(mut self, secs: i64) -> Self {
        self.watchdog_secs = secs;
        self
    }

    pub fn with_select_missing_server(mut self, select: bool) -> Self {
        self.select_missing_server = select;
        self
    }

    /// Parse a config from JSON without validating it
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file without validating it
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load a config file, apply `HANDOFF_*` environment overrides and validate.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        debug!(
            path = %path.display(),
            endpoint = %config.auth_endpoint,
            account = %config.account,
            server_index = config.server_index,
            "Loaded session config"
        );
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_AUTH_HOST) {
            self.auth_endpoint.host = host;
        }
        if let Some(port) = lookup(ENV_AUTH_PORT) {
            self.auth_endpoint.port = parse_override(ENV_AUTH_PORT, port)?;
        }
        if let Some(account) = lookup(ENV_ACCOUNT) {
            self.account = account;
        }
        if let Some(password) = lookup(ENV_PASSWORD) {
            self.password = Secret::new(password);
        }
        if let Some(index) = lookup(ENV_SERVER_INDEX) {
            self.server_index = parse_override(ENV_SERVER_INDEX, index)?;
        }
        if let Some(delay) = lookup(ENV_RECONNECT_DELAY_MS) {
            self.reconnect_delay_ms = parse_override(ENV_RECONNECT_DELAY_MS, delay)?;
        }
        if let Some(secs) = lookup(ENV_WATCHDOG_SECS) {
            self.watchdog_secs = parse_override(ENV_WATCHDOG_SECS, secs)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.auth_endpoint.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "auth_endpoint.host",
                reason: "must not be empty",
            });
        }
        if self.auth_endpoint.port == 0 {
            return Err(ConfigError::Invalid {
                field: "auth_endpoint.port",
                reason: "must not be zero",
            });
        }
        if self.account.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "account",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    /// Delay before reconnecting, `None` when reconnection is immediate
    pub fn reconnect_delay(&self) -> Option<Duration> {
        (self.reconnect_delay_ms > 0).then(|| Duration::from_millis(self.reconnect_delay_ms as u64))
    }

    /// Watchdog grace period converted to milliseconds, `None` when disabled
    pub fn watchdog_duration(&self) -> Option<Duration> {
        (self.watchdog_secs > 0)
            .then(|| Duration::from_millis((self.watchdog_secs as u64).saturating_mul(1000)))
    }
}

fn parse_override<T: FromStr>(key: &'static str, value: String) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { key, value })
}
