//! Wall-clock elapsed-time tracking.
//!
//! The timer never counts ticks. Elapsed time is always recomputed from
//! `now - start_epoch_ms`, so a host that was suspended for an arbitrary
//! stretch still reports the true elapsed time on its next poll. Ticks are
//! a delivery mechanism layered on top: [`WallClockTimer::poll_at`] hands
//! back every integer second that has not been emitted yet, which makes a
//! 1 Hz sample and a post-suspension burst the same code path.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Elapsed-time tracker grounded in absolute timestamps.
///
/// Every command has an `_at(now_ms)` form; the plain forms read the
/// system clock. State is serializable so a host can park it between
/// process invocations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WallClockTimer {
    /// Logical start, shifted on resume so `now - start_epoch_ms` is
    /// always the true active elapsed time. `None` while stopped/paused.
    #[serde(default)]
    start_epoch_ms: Option<u64>,
    /// Elapsed time frozen at the moment of pause.
    #[serde(default)]
    paused_accumulated_ms: u64,
    /// Highest elapsed second already delivered as a tick.
    #[serde(default)]
    last_emitted_elapsed_secs: u64,
    #[serde(default)]
    paused: bool,
}

impl WallClockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.start_epoch_ms.is_some() && !self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn last_emitted_elapsed_secs(&self) -> u64 {
        self.last_emitted_elapsed_secs
    }

    /// True elapsed active seconds at `now`.
    pub fn elapsed_secs_at(&self, now_ms: u64) -> u64 {
        match (self.start_epoch_ms, self.paused) {
            (Some(start), false) => now_ms.saturating_sub(start) / 1000,
            _ if self.paused => self.paused_accumulated_ms / 1000,
            _ => 0,
        }
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs_at(now_ms())
    }

    pub fn start_at(&mut self, now_ms: u64) {
        self.start_epoch_ms = Some(now_ms.saturating_sub(self.paused_accumulated_ms));
        self.paused = false;
    }

    pub fn start(&mut self) {
        self.start_at(now_ms());
    }

    /// Freeze elapsed time. Ticks stop; state is retained for resume.
    pub fn pause_at(&mut self, now_ms: u64) {
        if let (Some(start), false) = (self.start_epoch_ms, self.paused) {
            self.paused_accumulated_ms = now_ms.saturating_sub(start);
            self.start_epoch_ms = None;
            self.paused = true;
        }
    }

    pub fn pause(&mut self) {
        self.pause_at(now_ms());
    }

    /// Restart from the frozen elapsed point.
    pub fn resume_at(&mut self, now_ms: u64) {
        if self.paused {
            self.start_epoch_ms = Some(now_ms.saturating_sub(self.paused_accumulated_ms));
            self.paused_accumulated_ms = 0;
            self.paused = false;
        }
    }

    pub fn resume(&mut self) {
        self.resume_at(now_ms());
    }

    /// Clear all state; elapsed resets to zero.
    pub fn stop(&mut self) {
        self.start_epoch_ms = None;
        self.paused_accumulated_ms = 0;
        self.last_emitted_elapsed_secs = 0;
        self.paused = false;
    }

    /// Every integer second in `(last_emitted, elapsed(now)]`, ascending.
    ///
    /// This is both the live sampling path and suspension reconciliation:
    /// called once a second it yields a single tick, called after a gap it
    /// yields the whole backlog so no boundary is skipped. Yields nothing
    /// while paused or stopped. Safe at any call frequency, so a degraded
    /// host that can only poll on lifecycle signals stays correct.
    pub fn poll_at(&mut self, now_ms: u64) -> Range<u64> {
        if !self.is_running() {
            return 0..0;
        }
        let elapsed = self.elapsed_secs_at(now_ms);
        if elapsed <= self.last_emitted_elapsed_secs {
            return 0..0;
        }
        let range = (self.last_emitted_elapsed_secs + 1)..(elapsed + 1);
        self.last_emitted_elapsed_secs = elapsed;
        range
    }

    pub fn poll(&mut self) -> Range<u64> {
        self.poll_at(now_ms())
    }
}
