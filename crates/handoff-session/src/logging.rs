//! Tracing setup for processes embedding a session supervisor
//!
//! - Console: colored, compact
//! - File (optional): daily rotation under `log_dir`, no colors, more detail

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_DIRECTIVES: &str = "info,handoff_core=debug,handoff_session=debug";

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for rotated log files; console only when `None`
    pub log_dir: Option<PathBuf>,
    /// File name prefix, e.g. `handoff` gives `handoff.2026-10-18.log`
    pub file_prefix: String,
    pub default_directives: String,
    pub ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            file_prefix: "handoff".to_string(),
            default_directives: DEFAULT_DIRECTIVES.to_string(),
            ansi: true,
        }
    }
}

/// `RUST_LOG` when set and valid, `default_directives` otherwise
pub fn build_env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer; keep it alive for the duration
/// of the program. Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = build_env_filter(&config.default_directives);

    let console_layer = fmt::layer()
        .with_ansi(config.ansi)
        .compact()
        .with_thread_names(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

            let file_appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(config.file_prefix.clone())
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create log file appender")?;
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Global tracing subscriber already installed")?;

    Ok(guard)
}
