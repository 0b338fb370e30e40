use std::collections::VecDeque;
use std::time::Instant;

/// Source of per-iteration frame deltas.
pub trait Clock {
    /// Restart measuring. The loop calls this once right before the first
    /// iteration.
    fn reset(&mut self) {}

    /// Seconds since the previous tick, or since `reset`.
    fn tick(&mut self) -> f64;
}

/// Wall clock backed by [`Instant`].
#[derive(Debug, Clone)]
pub struct SystemClock {
    last: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn reset(&mut self) {
        self.last = Instant::now();
    }

    fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f64();
        self.last = now;
        dt
    }
}

/// Deterministic clock: replays scripted deltas, then a fixed fallback.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    script: VecDeque<f64>,
    fallback: f64,
    ticks: u64,
}

impl ManualClock {
    /// Every tick returns `dt`.
    pub fn constant(dt: f64) -> Self {
        Self {
            script: VecDeque::new(),
            fallback: dt,
            ticks: 0,
        }
    }

    /// Ticks return `deltas` in order, then 0.
    pub fn scripted(deltas: impl IntoIterator<Item = f64>) -> Self {
        Self {
            script: deltas.into_iter().collect(),
            fallback: 0.0,
            ticks: 0,
        }
    }

    /// Delta returned once the script runs out.
    pub fn with_fallback(mut self, dt: f64) -> Self {
        self.fallback = dt;
        self
    }

    pub fn push(&mut self, dt: f64) {
        self.script.push_back(dt);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Clock for ManualClock {
    fn tick(&mut self) -> f64 {
        self.ticks += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_then_fallback() {
        let mut clock = ManualClock::scripted([0.1, 0.2]).with_fallback(0.5);
        clock.push(0.3);
        assert_eq!(clock.tick(), 0.1);
        assert_eq!(clock.tick(), 0.2);
        assert_eq!(clock.tick(), 0.3);
        assert_eq!(clock.tick(), 0.5);
        assert_eq!(clock.ticks(), 4);
    }

    #[test]
    fn constant_clock_repeats() {
        let mut clock = ManualClock::constant(1.0 / 60.0);
        assert_eq!(clock.tick(), clock.tick());
    }

    #[test]
    fn system_clock_is_monotonic() {
        let mut clock = SystemClock::new();
        clock.reset();
        assert!(clock.tick() >= 0.0);
        assert!(clock.tick() >= 0.0);
    }
}
