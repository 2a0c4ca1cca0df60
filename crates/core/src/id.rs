// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Placement group identifiers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifies a placement group: the pool it belongs to and its hash seed.
///
/// Rendered as `<pool>.<seed in hex>`, e.g. `3.1f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PgId {
    pub pool: u64,
    pub seed: u32,
}

impl PgId {
    pub fn new(pool: u64, seed: u32) -> Self {
        Self { pool, seed }
    }
}

impl fmt::Display for PgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:x}", self.pool, self.seed)
    }
}

/// Error parsing a [`PgId`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid pg id: {0:?}")]
pub struct ParsePgIdError(pub String);

impl FromStr for PgId {
    type Err = ParsePgIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParsePgIdError(s.to_string());
        let (pool, seed) = s.split_once('.').ok_or_else(err)?;
        let pool = pool.parse::<u64>().map_err(|_| err())?;
        let seed = u32::from_str_radix(seed, 16).map_err(|_| err())?;
        Ok(Self { pool, seed })
    }
}

impl TryFrom<String> for PgId {
    type Error = ParsePgIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PgId> for String {
    fn from(id: PgId) -> Self {
        id.to_string()
    }
}
