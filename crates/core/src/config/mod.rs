// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Configuration modules

mod scrub;
mod source;

pub use scrub::{ConfigError, ScrubConfig};
pub use source::{ConfigSource, SharedConfig};
