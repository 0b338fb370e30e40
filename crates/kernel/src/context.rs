use ember_content::ContentManager;

use crate::{Commands, DEFAULT_FIXED_STEP};

/// Frame timing as seen by hooks. Updated by the game loop only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Time {
    delta: f64,
    elapsed: f64,
    frame: u64,
    fixed_step: f64,
    fixed_ticks: u64,
    alpha: f64,
    fps: u32,
    fps_window: f64,
    fps_frames: u32,
}

impl Time {
    pub fn new(fixed_step: f64) -> Self {
        Self {
            delta: 0.0,
            elapsed: 0.0,
            frame: 0,
            fixed_step,
            fixed_ticks: 0,
            alpha: 0.0,
            fps: 0,
            fps_window: 0.0,
            fps_frames: 0,
        }
    }

    /// Seconds since the previous iteration.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    pub fn delta_f32(&self) -> f32 {
        self.delta as f32
    }

    /// Seconds since the loop started.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Number of the current iteration, starting at 1.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    /// Total fixed-update ticks so far.
    pub fn fixed_ticks(&self) -> u64 {
        self.fixed_ticks
    }

    /// Leftover fraction of a fixed step, in `[0, 1)`, for interpolating draws.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Frames counted over the last full second.
    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub(crate) fn begin_frame(&mut self, dt: f64) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.delta = dt;
        self.elapsed += dt;
        self.frame += 1;

        self.fps_window += dt;
        self.fps_frames += 1;
        if self.fps_window >= 1.0 {
            self.fps = self.fps_frames;
            self.fps_frames = 0;
            // a stall longer than a second starts a fresh window
            self.fps_window = if self.fps_window >= 2.0 {
                0.0
            } else {
                self.fps_window - 1.0
            };
        }
    }

    pub(crate) fn fixed_tick(&mut self) {
        self.fixed_ticks += 1;
    }

    pub(crate) fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new(DEFAULT_FIXED_STEP)
    }
}

/// Everything a hook may touch besides its own entity.
///
/// Passed by `&mut` into every scene, entity and game hook. Content is always
/// available, headless runs included.
#[derive(Debug)]
pub struct GameContext {
    pub time: Time,
    pub content: ContentManager,
    pub commands: Commands,
    headless: bool,
    close_requested: bool,
}

impl GameContext {
    pub fn new(content: ContentManager, headless: bool) -> Self {
        Self {
            time: Time::default(),
            content,
            commands: Commands::new(),
            headless,
            close_requested: false,
        }
    }

    /// Headless context with content rooted at the working directory.
    pub fn headless() -> Self {
        Self::new(ContentManager::new("."), true)
    }

    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Ask the loop to stop. Honored at the next iteration boundary.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub fn close_requested(&self) -> bool {
        self.close_requested
    }

    pub(crate) fn take_close_request(&mut self) -> bool {
        std::mem::take(&mut self.close_requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_accumulates_frames() {
        let mut time = Time::new(0.5);
        time.begin_frame(0.25);
        time.begin_frame(0.25);
        assert_eq!(time.frame(), 2);
        assert_eq!(time.delta(), 0.25);
        assert_eq!(time.elapsed(), 0.5);
        assert_eq!(time.fixed_step(), 0.5);
    }

    #[test]
    fn negative_and_nan_deltas_count_as_zero() {
        let mut time = Time::default();
        time.begin_frame(-1.0);
        time.begin_frame(f64::NAN);
        assert_eq!(time.elapsed(), 0.0);
        assert_eq!(time.frame(), 2);
    }

    #[test]
    fn fps_counts_frames_per_second() {
        let mut time = Time::default();
        for _ in 0..4 {
            time.begin_frame(0.25);
        }
        assert_eq!(time.fps(), 4);
        time.begin_frame(0.5);
        assert_eq!(time.fps(), 4);
    }

    #[test]
    fn close_request_is_taken_once() {
        let mut ctx = GameContext::headless();
        assert!(ctx.is_headless());
        ctx.request_close();
        assert!(ctx.close_requested());
        assert!(ctx.take_close_request());
        assert!(!ctx.take_close_request());
    }
}
