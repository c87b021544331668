//! Wall-clock bookkeeping for the tick loop.

use crate::config::EngineConfig;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic source of wall-clock time, measured from an arbitrary epoch.
pub trait ClockSource {
    fn now(&self) -> Duration;
}

/// Real time, measured from when the clock was created.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Turns elapsed wall-clock time into the physical `dt` of each tick.
#[derive(Clone, Debug)]
pub struct SimulationClock {
    /// User-adjustable speed multiplier, always positive.
    pub time_scale: f64,
    /// Physical seconds per wall-clock second at time scale 1.
    pub seconds_per_wall_second: f64,
    /// Lower bound on `dt`.
    pub min_dt: f64,
    /// Elapsed time assumed for the first tick.
    pub nominal_interval: Duration,
    last: Option<Duration>,
}

impl SimulationClock {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            time_scale: config.time_scale,
            seconds_per_wall_second: config.seconds_per_wall_second,
            min_dt: config.min_dt,
            nominal_interval: config.tick_interval(),
            last: None,
        }
    }

    /// Physical `dt` for a tick starting at wall time `now`.
    pub fn next_dt(&mut self, now: Duration) -> f64 {
        let elapsed = match self.last {
            Some(last) => now.saturating_sub(last),
            None => self.nominal_interval,
        };
        self.last = Some(now);

        let dt = elapsed.as_secs_f64() * self.time_scale * self.seconds_per_wall_second;
        sanitize_dt(dt, self.min_dt)
    }

    /// Forgets the previous tick, so the next one uses the nominal interval.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Clamps `dt` to at least `min_dt`. Non-finite values also become `min_dt`.
pub fn sanitize_dt(dt: f64, min_dt: f64) -> f64 {
    if dt.is_finite() { dt.max(min_dt) } else { min_dt }
}
