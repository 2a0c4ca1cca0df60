// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced initiator wrapper for consistent observability

use crate::initiator::{InitiateResult, ScrubInitiator};
use async_trait::async_trait;
use pgscrub_core::PgId;
use tracing::Instrument;

/// Wrapper that adds tracing to any ScrubInitiator
#[derive(Clone)]
pub struct TracedInitiator<I> {
    inner: I,
}

impl<I> TracedInitiator<I> {
    pub fn new(inner: I) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &I {
        &self.inner
    }
}

#[async_trait]
impl<I: ScrubInitiator> ScrubInitiator for TracedInitiator<I> {
    async fn initiate_scrub(
        &self,
        pgid: &PgId,
        allow_requested_repair_only: bool,
    ) -> InitiateResult {
        let span = tracing::info_span!("scrub.initiate", pgid = %pgid);

        async {
            tracing::debug!(allow_requested_repair_only, "starting");

            let start = std::time::Instant::now();
            let result = self
                .inner
                .initiate_scrub(pgid, allow_requested_repair_only)
                .await;
            let elapsed_ms = start.elapsed().as_millis() as u64;

            match result {
                InitiateResult::ScrubInitiated => {
                    tracing::info!(elapsed_ms, "scrub initiated")
                }
                InitiateResult::NoLocalResources => {
                    tracing::debug!(elapsed_ms, "no local scrub resources")
                }
                other => tracing::debug!(elapsed_ms, result = %other, "scrub not initiated"),
            }

            result
        }
        .instrument(span)
        .await
    }
}
