//! Adaptive delay between cycles.
//!
//! Poll quickly while the user is at the keyboard and back off while they are
//! away. The delay never drops below the configured base (Discord only shows
//! updates every 15 seconds anyway) and never exceeds `2 * base + 20`.

use crate::config::{is_valid_wait_time, DEFAULT_WAIT_TIME};
use crate::idle::IdleProbe;
use crate::types::PollState;
use std::time::Duration;

/// Delay in seconds for a user idle for `idle_seconds`, rounded to hundredths.
pub fn next_delay(base: f64, idle_seconds: f64) -> f64 {
    let max_delay = 2.0 * base + 20.0;
    let scaled = 0.15 * (idle_seconds - 2.0 * base - 10.0) + base;
    let delay = scaled.min(max_delay).max(base);
    (delay * 100.0).round() / 100.0
}

#[derive(Debug, Clone)]
pub struct PollScheduler<P: IdleProbe> {
    probe: P,
    base_secs: f64,
    base_delay: Duration,
    scaling: bool,
    state: PollState,
}

impl<P: IdleProbe> PollScheduler<P> {
    /// An unusable `base_secs` (not finite, not positive, or too large to
    /// sleep for) is replaced by [`DEFAULT_WAIT_TIME`].
    pub fn new(probe: P, base_secs: f64, scaling: bool) -> Self {
        let base_secs = if is_valid_wait_time(base_secs) {
            base_secs
        } else {
            tracing::warn!(base_secs, "Unusable wait time, using the default");
            DEFAULT_WAIT_TIME
        };
        Self {
            probe,
            base_secs,
            base_delay: Duration::try_from_secs_f64(base_secs)
                .unwrap_or(Duration::from_secs(DEFAULT_WAIT_TIME as u64)),
            scaling,
            state: PollState::default(),
        }
    }

    /// Measures idle time and returns how long to sleep before the next cycle.
    ///
    /// Falls back to the fixed base interval when scaling is off or the idle
    /// probe has no reading on this platform.
    pub fn delay(&mut self) -> Duration {
        self.state.last_cycle_wall_clock = Some(chrono::Utc::now());
        self.state.last_measured_idle_seconds = None;

        if !self.scaling {
            tracing::debug!(secs = self.base_secs, "Sleeping, scaling is disabled");
            return self.base_delay;
        }

        match self.probe.idle_seconds() {
            Some(idle) => {
                self.state.last_measured_idle_seconds = Some(idle);
                let secs = next_delay(self.base_secs, idle);
                tracing::debug!(secs, idle, "Sleeping, scaled by idle time");
                Duration::try_from_secs_f64(secs).unwrap_or(self.base_delay)
            }
            None => {
                tracing::debug!(secs = self.base_secs, "Sleeping, idle time unavailable");
                self.base_delay
            }
        }
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }
}
