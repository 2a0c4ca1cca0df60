// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission policy: when may an opportunistic scrub start?
//!
//! Combines the configured day-of-week and hour-of-day windows with the load
//! gate, and derives the delay between scheduling ticks.

use crate::config::ScrubConfig;
use crate::load::LoadGate;
use chrono::{DateTime, Datelike, FixedOffset, Local, TimeZone, Timelike, Utc};
use std::time::Duration;
use tracing::{debug, trace};

/// Is `p` inside the half-open circular window `[begin, end)`?
///
/// `begin == end` means the window is unrestricted. When `begin > end` the
/// window wraps past the end of the domain (e.g. hours 22..6).
pub fn in_window(begin: u32, end: u32, p: u32) -> bool {
    if begin == end {
        return true;
    }
    if begin < end {
        begin <= p && p < end
    } else {
        p >= begin || p < end
    }
}

/// Resolves the UTC offset in effect at a given instant
pub trait ZoneOffset: Send + Sync {
    fn offset_at(&self, now: DateTime<Utc>) -> FixedOffset;
}

/// The host time zone, daylight saving included
impl ZoneOffset for Local {
    fn offset_at(&self, now: DateTime<Utc>) -> FixedOffset {
        self.offset_from_utc_datetime(&now.naive_utc())
    }
}

impl ZoneOffset for FixedOffset {
    fn offset_at(&self, _now: DateTime<Utc>) -> FixedOffset {
        *self
    }
}

/// Time-window and load checks for starting scrubs
pub struct AdmissionPolicy {
    zone: Box<dyn ZoneOffset>,
    load: LoadGate,
}

impl AdmissionPolicy {
    /// Evaluate windows in the host time zone, looked up on every check
    pub fn new(load: LoadGate) -> Self {
        Self::with_zone(load, Local)
    }

    /// Evaluate windows at a fixed UTC offset
    pub fn with_offset(load: LoadGate, offset: FixedOffset) -> Self {
        Self::with_zone(load, offset)
    }

    pub fn with_zone(load: LoadGate, zone: impl ZoneOffset + 'static) -> Self {
        Self {
            zone: Box::new(zone),
            load,
        }
    }

    pub fn load_gate(&self) -> &LoadGate {
        &self.load
    }

    /// Does `now` fall inside both the day-of-week and hour-of-day windows?
    pub fn time_permit(&self, now: DateTime<Utc>, config: &ScrubConfig) -> bool {
        let local = now.with_timezone(&self.zone.offset_at(now));
        let week_day = local.weekday().num_days_from_sunday();
        let hour = local.hour();

        if !in_window(config.begin_week_day, config.end_week_day, week_day) {
            trace!(
                begin = config.begin_week_day,
                end = config.end_week_day,
                week_day,
                "outside scrub week days"
            );
            return false;
        }

        let permit = in_window(config.begin_hour, config.end_hour, hour);
        trace!(
            begin = config.begin_hour,
            end = config.end_hour,
            hour,
            permit,
            "scrub hours check"
        );
        permit
    }

    pub fn load_is_low(&self, config: &ScrubConfig) -> bool {
        self.load.load_is_low(config)
    }

    /// Delay before the next scheduling tick.
    ///
    /// Outside the admission window non-mandatory work backs off to the
    /// extended sleep, if that is longer.
    pub fn scrub_sleep_time(
        &self,
        must_scrub: bool,
        now: DateTime<Utc>,
        config: &ScrubConfig,
    ) -> Duration {
        if must_scrub || self.time_permit(now, config) {
            return config.sleep;
        }
        debug!(extended_sleep = ?config.extended_sleep, "using extended sleep");
        config.extended_sleep.max(config.sleep)
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
