// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scrub slot accounting
//!
//! Tracks how many scrubs this node runs as primary (local) and how many it
//! serves as a replica (remote). Both share one ceiling. The two counters are
//! packed into a single `AtomicU64` so that the limit check and the increment
//! are one compare-and-swap.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use tracing::debug;

/// Which pool a scrub slot is drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    /// A scrub this node coordinates as primary
    Local,
    /// A scrub this node takes part in as a replica
    Remote,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Local => f.write_str("local"),
            SlotKind::Remote => f.write_str("remote"),
        }
    }
}

/// Point-in-time view of the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetSnapshot {
    pub scrubs_local: u32,
    pub scrubs_remote: u32,
    pub max_scrubs: u32,
}

/// Counts of in-use scrub slots against a configured maximum
#[derive(Debug)]
pub struct ResourceBudget {
    /// local count in the high half, remote in the low half
    counts: AtomicU64,
    max_scrubs: AtomicU32,
}

fn pack(local: u32, remote: u32) -> u64 {
    (u64::from(local) << 32) | u64::from(remote)
}

fn unpack(counts: u64) -> (u32, u32) {
    ((counts >> 32) as u32, counts as u32)
}

impl ResourceBudget {
    pub fn new(max_scrubs: u32) -> Self {
        Self {
            counts: AtomicU64::new(0),
            max_scrubs: AtomicU32::new(max_scrubs),
        }
    }

    pub fn max_scrubs(&self) -> u32 {
        self.max_scrubs.load(Ordering::SeqCst)
    }

    /// Apply a new ceiling. Slots already held above it are kept; further
    /// reservations fail until usage drops below the new value.
    pub fn set_max_scrubs(&self, max_scrubs: u32) {
        self.max_scrubs.store(max_scrubs, Ordering::SeqCst);
    }

    /// Would a reservation of either kind succeed right now?
    pub fn can_reserve(&self) -> bool {
        let (local, remote) = unpack(self.counts.load(Ordering::SeqCst));
        u64::from(local) + u64::from(remote) < u64::from(self.max_scrubs())
    }

    /// Take one slot of `kind` if the combined usage is below the maximum.
    pub fn try_reserve(&self, kind: SlotKind) -> bool {
        let max = u64::from(self.max_scrubs());
        let result = self
            .counts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |counts| {
                let (local, remote) = unpack(counts);
                if u64::from(local) + u64::from(remote) >= max {
                    return None;
                }
                Some(match kind {
                    SlotKind::Local => pack(local + 1, remote),
                    SlotKind::Remote => pack(local, remote + 1),
                })
            });

        match result {
            Ok(prev) => {
                let (local, remote) = unpack(prev);
                debug!(%kind, local, remote, max, "scrub slot reserved");
                true
            }
            Err(current) => {
                let (local, remote) = unpack(current);
                debug!(%kind, local, remote, max, "scrub slots exhausted");
                false
            }
        }
    }

    /// Return one slot of `kind`.
    ///
    /// # Panics
    ///
    /// Releasing a slot that was never reserved is an accounting bug and
    /// aborts instead of letting the counters drift.
    pub fn release(&self, kind: SlotKind) {
        let result = self
            .counts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |counts| {
                let (local, remote) = unpack(counts);
                match kind {
                    SlotKind::Local => local.checked_sub(1).map(|l| pack(l, remote)),
                    SlotKind::Remote => remote.checked_sub(1).map(|r| pack(local, r)),
                }
            });
        assert!(
            result.is_ok(),
            "scrub budget underflow: {kind} slot released without a reservation"
        );

        if let Ok(prev) = result {
            let (local, remote) = unpack(prev);
            debug!(%kind, local, remote, max = self.max_scrubs(), "scrub slot released");
        }
    }

    pub fn snapshot(&self) -> BudgetSnapshot {
        let (scrubs_local, scrubs_remote) = unpack(self.counts.load(Ordering::SeqCst));
        BudgetSnapshot {
            scrubs_local,
            scrubs_remote,
            max_scrubs: self.max_scrubs(),
        }
    }
}

#[cfg(test)]
#[path = "budget_tests.rs"]
mod tests;
