// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the scrub service

use thiserror::Error;

/// Errors that can occur setting up or running the scrub service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid log path: {0}")]
    LogPath(String),
    #[error("failed to install log subscriber: {0}")]
    Subscriber(#[from] tracing_subscriber::util::TryInitError),
}
