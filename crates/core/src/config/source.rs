// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration providers

use super::ScrubConfig;
use std::sync::{Arc, RwLock};

/// Read-only view of the current configuration.
///
/// Polled once per decision; callers must not hold on to the returned value
/// beyond a single scheduling tick.
pub trait ConfigSource: Send + Sync {
    fn current(&self) -> ScrubConfig;
}

/// A fixed configuration
impl ConfigSource for ScrubConfig {
    fn current(&self) -> ScrubConfig {
        self.clone()
    }
}

/// Shared, updatable configuration
#[derive(Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<ScrubConfig>>,
}

impl SharedConfig {
    pub fn new(config: ScrubConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Replace the configuration; picked up by the next tick.
    pub fn update(&self, config: ScrubConfig) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *inner = config;
    }

    /// Modify the configuration in place
    pub fn modify(&self, f: impl FnOnce(&mut ScrubConfig)) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        f(&mut inner);
    }
}

impl ConfigSource for SharedConfig {
    fn current(&self) -> ScrubConfig {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
