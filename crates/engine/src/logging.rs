// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Log subscriber setup

use crate::error::ServiceError;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;

/// Where and how verbosely to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Log file; stderr when unset
    pub path: Option<PathBuf>,
    /// Filter used when `RUST_LOG` is not set
    pub default_filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            path: None,
            default_filter: "info".to_string(),
        }
    }
}

impl LogConfig {
    pub fn to_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Self::default()
        }
    }
}

/// Install the global tracing subscriber.
///
/// Output goes through a non-blocking writer; keep the returned guard alive
/// until shutdown so buffered lines are flushed.
pub fn init(config: &LogConfig) -> Result<WorkerGuard, ServiceError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let (writer, guard) = match &config.path {
        Some(path) => {
            let invalid = || ServiceError::LogPath(path.display().to_string());
            let dir = path.parent().ok_or_else(invalid)?;
            let file_name = path.file_name().ok_or_else(invalid)?;

            // Create log directory if needed
            std::fs::create_dir_all(dir).map_err(|e| ServiceError::Io {
                path: dir.display().to_string(),
                source: e,
            })?;

            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer))
        .try_init()?;

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
