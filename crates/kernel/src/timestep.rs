/// Default fixed-update interval: 60 ticks per second.
pub const DEFAULT_FIXED_STEP: f64 = 1.0 / 60.0;

/// Accumulator that converts variable frame deltas into whole fixed steps.
///
/// Each frame: [`accumulate`](Self::accumulate) the delta, then call
/// [`next_step`](Self::next_step) until it returns `false`, running one
/// fixed update per `true`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedTimestep {
    step: f64,
    accumulator: f64,
    max_steps: Option<u32>,
    steps_this_frame: u32,
}

impl FixedTimestep {
    /// `step` must be positive and finite; settings validation guarantees it
    /// for the game loop.
    pub fn new(step: f64) -> Self {
        debug_assert!(step > 0.0 && step.is_finite(), "fixed step must be positive");
        Self {
            step,
            accumulator: 0.0,
            max_steps: None,
            steps_this_frame: 0,
        }
    }

    /// Cap the catch-up steps per frame. `None` catches up completely.
    pub fn with_max_steps(mut self, max_steps: Option<u32>) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn accumulator(&self) -> f64 {
        self.accumulator
    }

    pub fn max_steps(&self) -> Option<u32> {
        self.max_steps
    }

    pub fn steps_this_frame(&self) -> u32 {
        self.steps_this_frame
    }

    /// Start a new frame with `dt` seconds of elapsed time. Negative or
    /// non-finite deltas add nothing.
    pub fn accumulate(&mut self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.accumulator += dt;
        }
        self.steps_this_frame = 0;
    }

    /// Consume one step if enough time has accumulated.
    ///
    /// When the per-frame cap is hit the remaining whole steps are dropped
    /// and only the sub-step remainder is kept.
    pub fn next_step(&mut self) -> bool {
        if self.accumulator < self.step {
            return false;
        }
        if let Some(max) = self.max_steps {
            if self.steps_this_frame >= max {
                let dropped = (self.accumulator / self.step).floor();
                self.accumulator %= self.step;
                tracing::warn!("fixed update fell behind; dropped {dropped} step(s) after {max}");
                return false;
            }
        }
        self.accumulator -= self.step;
        self.steps_this_frame += 1;
        true
    }

    /// Leftover fraction of a step, in `[0, 1)` once catch-up finished.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.step
    }

    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.steps_this_frame = 0;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_frame(ts: &mut FixedTimestep, dt: f64) -> u32 {
        ts.accumulate(dt);
        let mut steps = 0;
        while ts.next_step() {
            steps += 1;
        }
        steps
    }

    #[test]
    fn two_frames_of_one_step_each() {
        let mut ts = FixedTimestep::default();
        assert_eq!(run_frame(&mut ts, 1.0 / 60.0), 1);
        assert_eq!(run_frame(&mut ts, 1.0 / 60.0), 1);
        assert!(ts.accumulator().abs() < 1e-12);
    }

    #[test]
    fn one_thirtieth_runs_two_steps() {
        let mut ts = FixedTimestep::default();
        assert_eq!(run_frame(&mut ts, 1.0 / 30.0), 2);
        assert!(ts.accumulator().abs() < 1e-12);
    }

    #[test]
    fn large_delta_catches_up_fully_by_default() {
        let mut ts = FixedTimestep::default();
        assert_eq!(run_frame(&mut ts, 5.0 / 60.0), 5);
        assert!(ts.accumulator() < ts.step());
    }

    #[test]
    fn short_frames_carry_over() {
        let mut ts = FixedTimestep::new(0.5);
        assert_eq!(run_frame(&mut ts, 0.25), 0);
        assert_eq!(ts.alpha(), 0.5);
        assert_eq!(run_frame(&mut ts, 0.25), 1);
        assert_eq!(ts.accumulator(), 0.0);
    }

    #[test]
    fn cap_drops_whole_steps_and_keeps_remainder() {
        let mut ts = FixedTimestep::new(0.25).with_max_steps(Some(2));
        assert_eq!(run_frame(&mut ts, 1.125), 2);
        assert_eq!(ts.accumulator(), 0.125);
        assert_eq!(ts.steps_this_frame(), 2);
        assert_eq!(run_frame(&mut ts, 0.125), 1);
    }

    #[test]
    fn bad_deltas_are_ignored() {
        let mut ts = FixedTimestep::new(0.5);
        ts.accumulate(-3.0);
        ts.accumulate(f64::INFINITY);
        ts.accumulate(f64::NAN);
        assert_eq!(ts.accumulator(), 0.0);
        assert!(!ts.next_step());
        ts.reset();
        assert_eq!(ts.alpha(), 0.0);
    }
}
