// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake scrub initiator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::initiator::{InitiateResult, ScrubInitiator};
use async_trait::async_trait;
use pgscrub_core::{PgId, ResourceBudget, SlotKind};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Recorded initiator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiateCall {
    pub pgid: PgId,
    pub allow_requested_repair_only: bool,
}

#[derive(Default)]
struct Script {
    /// Consumed front to back, one per attempt
    queued: HashMap<PgId, VecDeque<InitiateResult>>,
    /// Used once a PG's queued outcomes run out
    sticky: HashMap<PgId, InitiateResult>,
}

/// Fake initiator with scripted per-PG outcomes.
///
/// Unscripted PGs start a scrub. When given a budget, a local slot is
/// reserved before each would-be initiation; an exhausted budget yields
/// `NoLocalResources`.
#[derive(Clone, Default)]
pub struct FakeInitiator {
    script: Arc<Mutex<Script>>,
    calls: Arc<Mutex<Vec<InitiateCall>>>,
    budget: Option<Arc<ResourceBudget>>,
}

impl FakeInitiator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve from `budget` on every successful initiation
    pub fn with_budget(mut self, budget: Arc<ResourceBudget>) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Always answer `result` for `pgid`
    pub fn set_outcome(&self, pgid: PgId, result: InitiateResult) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .sticky
            .insert(pgid, result);
    }

    /// Answer `result` for the next attempt on `pgid` only
    pub fn push_outcome(&self, pgid: PgId, result: InitiateResult) {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .queued
            .entry(pgid)
            .or_default()
            .push_back(result);
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<InitiateCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// PGs attempted, in call order
    pub fn attempted(&self) -> Vec<PgId> {
        self.calls().into_iter().map(|call| call.pgid).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    fn scripted(&self, pgid: &PgId) -> InitiateResult {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(result) = script.queued.get_mut(pgid).and_then(VecDeque::pop_front) {
            return result;
        }
        script
            .sticky
            .get(pgid)
            .copied()
            .unwrap_or(InitiateResult::ScrubInitiated)
    }
}

#[async_trait]
impl ScrubInitiator for FakeInitiator {
    async fn initiate_scrub(
        &self,
        pgid: &PgId,
        allow_requested_repair_only: bool,
    ) -> InitiateResult {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(InitiateCall {
                pgid: *pgid,
                allow_requested_repair_only,
            });

        let result = self.scripted(pgid);
        match (&self.budget, result) {
            (Some(budget), InitiateResult::ScrubInitiated) => {
                if budget.try_reserve(SlotKind::Local) {
                    InitiateResult::ScrubInitiated
                } else {
                    InitiateResult::NoLocalResources
                }
            }
            _ => result,
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
