/// Time source for the simulation.
///
/// The step function never reads the wall clock itself. The frame loop
/// samples a `Clock` once per frame through `FrameTimer` and passes the
/// resulting `FrameTime` in, so tests drive time by hand.

use std::cell::Cell;
use std::time::Instant;

pub trait Clock {
    /// Monotonic milliseconds since an arbitrary origin.
    fn now_ms(&self) -> u64;
}

/// Real time, anchored at construction.
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        MonotonicClock { start: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        ManualClock { now: Cell::new(start_ms) }
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// One frame's view of time.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct FrameTime {
    /// Clock reading used for debounce decisions.
    pub now_ms: u64,
    /// Seconds since the previous frame, used for integration.
    pub dt: f64,
}

impl FrameTime {
    pub fn new(now_ms: u64, dt: f64) -> Self {
        FrameTime { now_ms, dt }
    }
}

/// Turns successive clock readings into `FrameTime`s.
/// `dt` is capped so a stalled process doesn't produce one huge step.
pub struct FrameTimer {
    last_ms: Option<u64>,
    max_dt: f64,
}

impl FrameTimer {
    pub fn new(max_frame_ms: u64) -> Self {
        FrameTimer { last_ms: None, max_dt: max_frame_ms as f64 / 1000.0 }
    }

    pub fn tick(&mut self, clock: &dyn Clock) -> FrameTime {
        let now = clock.now_ms();
        let dt = match self.last_ms {
            Some(last) => (now.saturating_sub(last) as f64 / 1000.0).min(self.max_dt),
            None => 0.0,
        };
        self.last_ms = Some(now);
        FrameTime::new(now, dt)
    }

    /// Forget the previous reading (after a level restart).
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_no_delta() {
        let clock = ManualClock::new(5_000);
        let mut timer = FrameTimer::new(250);
        assert_eq!(timer.tick(&clock), FrameTime::new(5_000, 0.0));
        clock.advance(16);
        let f = timer.tick(&clock);
        assert_eq!(f.now_ms, 5_016);
        assert!((f.dt - 0.016).abs() < 1e-12);
    }

    #[test]
    fn delta_is_capped() {
        let clock = ManualClock::new(0);
        let mut timer = FrameTimer::new(250);
        timer.tick(&clock);
        clock.advance(10_000);
        assert_eq!(timer.tick(&clock).dt, 0.25);
        timer.reset();
        assert_eq!(timer.tick(&clock).dt, 0.0);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
