//! Tick clock primitive with drift-free periodic wake.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use super::Tick;

/// Monotonic tick source plus the absolute-time delay the periodic tasks
/// wake on. `delay_until` advances `last_wake` by exactly one period per
/// call, so a task that overruns its window does not accumulate drift.
pub trait TickClock: Send + Sync {
    /// Current monotonic tick count.
    fn now(&self) -> Tick;

    /// Sleep until `*last_wake + period`, then set `*last_wake` to that
    /// instant. Returns immediately (without sleeping) when the wake time
    /// has already passed.
    fn delay_until(&self, last_wake: &mut Tick, period: Tick);
}

/// Wall-clock backed tick source. One tick is one millisecond, counted from
/// the moment the clock was created.
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose epoch is now.
    #[must_use]
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TickClock for MonotonicClock {
    fn now(&self) -> Tick {
        Tick::try_from(self.origin.elapsed().as_millis()).unwrap_or(Tick::MAX)
    }

    fn delay_until(&self, last_wake: &mut Tick, period: Tick) {
        let next = *last_wake + period;
        let now = self.now();
        if next > now {
            thread::sleep(Duration::from_millis(next - now));
        }
        *last_wake = next;
    }
}

/// Test-controlled tick source. Time only moves when the test advances it;
/// `delay_until` yields until the wake instant is reached.
#[derive(Debug, Default)]
pub struct ManualClock {
    tick: AtomicU64,
}

impl ManualClock {
    /// Create a clock frozen at tick zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock frozen at the given tick.
    #[must_use]
    pub fn at(tick: Tick) -> Self {
        let clock = Self::new();
        clock.tick.store(tick, Ordering::SeqCst);
        clock
    }

    /// Move time forward by `ticks`.
    pub fn advance(&self, ticks: Tick) {
        self.tick.fetch_add(ticks, Ordering::SeqCst);
    }
}

impl TickClock for ManualClock {
    fn now(&self) -> Tick {
        self.tick.load(Ordering::SeqCst)
    }

    fn delay_until(&self, last_wake: &mut Tick, period: Tick) {
        let next = *last_wake + period;
        while self.now() < next {
            thread::yield_now();
        }
        *last_wake = next;
    }
}
