//! Fixed-rate clock for driving the update loop.
//!
//! The client's main loop is normally driven by the renderer. Headless
//! tools (and tests) need something else to call `update` at a steady
//! rate; [`UpdateClock`] is that something.
//!
//! ```ignore
//! let mut clock = UpdateClock::with_rate(30);
//! loop {
//!     let tick = clock.wait_for_tick().await;
//!     client.update(&mut world);
//! }
//! ```

use std::time::Duration;

use tokio::time::{self, Instant};
use tracing::{debug, trace, warn};

/// Information about one fired tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    /// Monotonically increasing tick number, starting at 1.
    pub tick: u64,
    /// The fixed period between ticks.
    pub dt: Duration,
    /// Whole periods missed before this tick fired.
    pub skipped: u64,
}

/// Fires at a fixed rate. When the loop falls behind, missed ticks are
/// skipped rather than replayed in a burst.
#[derive(Debug)]
pub struct UpdateClock {
    period: Duration,
    next: Instant,
    ticks: u64,
    total_skipped: u64,
}

impl UpdateClock {
    /// Highest supported rate.
    pub const MAX_RATE_HZ: u32 = 240;

    /// Creates a clock with the given period. The first tick fires one
    /// period from now. A zero period is raised to one millisecond.
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        debug!(period_ms = period.as_secs_f64() * 1000.0, "update clock created");
        Self {
            period,
            next: Instant::now() + period,
            ticks: 0,
            total_skipped: 0,
        }
    }

    /// Creates a clock firing `rate_hz` times per second (clamped to
    /// `1..=MAX_RATE_HZ`).
    pub fn with_rate(rate_hz: u32) -> Self {
        let clamped = rate_hz.clamp(1, Self::MAX_RATE_HZ);
        if clamped != rate_hz {
            warn!(rate_hz, clamped, "update rate out of range, clamping");
        }
        Self::new(Duration::from_secs_f64(1.0 / f64::from(clamped)))
    }

    /// Waits until the next tick is due.
    pub async fn wait_for_tick(&mut self) -> ClockTick {
        time::sleep_until(self.next).await;

        let now = Instant::now();
        let late_by = now.saturating_duration_since(self.next);
        let skipped = (late_by.as_nanos() / self.period.as_nanos()) as u64;
        self.ticks += 1;

        if skipped > 0 {
            self.total_skipped += skipped;
            warn!(tick = self.ticks, skipped, "update loop fell behind, skipping ahead");
            self.next = now + self.period;
        } else {
            self.next += self.period;
        }
        trace!(tick = self.ticks, "update tick");

        ClockTick {
            tick: self.ticks,
            dt: self.period,
            skipped,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn total_skipped(&self) -> u64 {
        self.total_skipped
    }
}
