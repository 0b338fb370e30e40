use std::path::{Path, PathBuf};

use ember_common::Color;
use ember_render::WindowStates;
use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_FIXED_STEP, GameError};

/// Startup configuration, read once before the loop starts.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub title: String,
    pub size: UVec2,
    pub content_directory: PathBuf,
    /// Icon image, relative to `content_directory`.
    pub icon_path: Option<PathBuf>,
    pub window_states: WindowStates,
    /// Frame cap; 0 leaves the platform default in place.
    pub target_fps: u32,
    /// Run without window and graphics. Nothing is drawn.
    pub headless: bool,
    /// Seconds per fixed update.
    pub fixed_step: f64,
    /// Cap on fixed updates per frame; unset catches up completely.
    pub max_fixed_steps: Option<u32>,
    pub background: Color,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            title: "Ember".to_owned(),
            size: UVec2::new(1280, 720),
            content_directory: PathBuf::from("content"),
            icon_path: None,
            window_states: WindowStates::default(),
            target_fps: 0,
            headless: false,
            fixed_step: DEFAULT_FIXED_STEP,
            max_fixed_steps: None,
            background: Color::SKY_BLUE,
        }
    }
}

impl GameSettings {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = UVec2::new(width, height);
        self
    }

    pub fn with_content_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.content_directory = dir.into();
        self
    }

    pub fn with_icon(mut self, path: impl Into<PathBuf>) -> Self {
        self.icon_path = Some(path.into());
        self
    }

    pub fn with_window_states(mut self, states: WindowStates) -> Self {
        self.window_states = states;
        self
    }

    pub fn with_target_fps(mut self, fps: u32) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_fixed_step(mut self, seconds: f64) -> Self {
        self.fixed_step = seconds;
        self
    }

    pub fn with_max_fixed_steps(mut self, max: Option<u32>) -> Self {
        self.max_fixed_steps = max;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn validate(&self) -> Result<(), GameError> {
        if !(self.fixed_step.is_finite() && self.fixed_step > 0.0) {
            return Err(GameError::InvalidSettings(format!(
                "fixed_step must be a positive number of seconds, got {}",
                self.fixed_step
            )));
        }
        if self.max_fixed_steps == Some(0) {
            return Err(GameError::InvalidSettings(
                "max_fixed_steps must be at least 1 when set".into(),
            ));
        }
        if !self.headless && (self.size.x == 0 || self.size.y == 0) {
            return Err(GameError::InvalidSettings(format!(
                "window size must be non-zero, got {}x{}",
                self.size.x, self.size.y
            )));
        }
        Ok(())
    }

    /// Parse and validate settings from YAML text.
    pub fn from_yaml_str(src: &str) -> Result<Self, GameError> {
        let settings: Self = serde_yaml::from_str(src)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, GameError> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)?;
        tracing::debug!("loading settings from {}", path.display());
        Self::from_yaml_str(&src)
    }

    pub fn to_yaml(&self) -> Result<String, GameError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
