//! Diagnostics via `tracing`.
//!
//! Stdout carries the scoreboard protocol, so the console layer writes to
//! stderr. A daily-rolling file layer is added when a log directory is set.

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::services::config_loader::LoggingConfig;

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
///
/// Keep the returned guard alive for the process lifetime or buffered file
/// output is lost.
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let (file_layer, file_guard) = match config.directory.as_deref() {
        Some(directory) => {
            let _ = fs::create_dir_all(directory);
            let file_appender = tracing_appender::rolling::daily(directory, &config.file_name);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(file_writer)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    file_guard
}
