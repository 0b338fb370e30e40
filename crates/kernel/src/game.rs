use ember_common::Image;
use ember_content::ContentManager;
use ember_render::{Graphics, Platform};

use crate::{
    Clock, FixedTimestep, GameContext, GameError, GameSettings, Scene, SceneManager, SystemClock,
    Time,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application-level callbacks, run after the scene manager in each phase.
pub trait GameHooks: 'static {
    fn init(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
        Ok(())
    }

    fn update(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
        Ok(())
    }

    fn fixed_update(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut GameContext, _gfx: &mut dyn Graphics) -> Result<(), GameError> {
        Ok(())
    }

    /// Runs once when the loop exits, before scenes and content are disposed.
    fn on_close(&mut self, _ctx: &mut GameContext) {
        tracing::warn!("application shuts down");
    }
}

/// Hooks that do nothing beyond the default shutdown message.
#[derive(Debug, Default)]
pub struct DefaultHooks;

impl GameHooks for DefaultHooks {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Ready,
    Running,
    Finished,
}

/// The game loop: owns the scene manager, content, timing and platform.
///
/// Per iteration, in order:
/// 1. update: scenes, hooks, then queued commands
/// 2. fixed update, zero or more times per the accumulator
/// 3. draw, unless headless: begin frame, clear, scenes, hooks, end frame
///
/// A close request is honored between iterations.
pub struct Game {
    settings: GameSettings,
    scenes: SceneManager,
    ctx: GameContext,
    timestep: FixedTimestep,
    clock: Box<dyn Clock>,
    hooks: Box<dyn GameHooks>,
    platform: Option<Platform>,
    should_close: bool,
    state: RunState,
}

impl Game {
    pub fn new(settings: GameSettings, scene: Scene) -> Self {
        let content = ContentManager::new(&settings.content_directory);
        let ctx = GameContext::new(content, settings.headless);
        Self {
            settings,
            scenes: SceneManager::with_default_scene(scene),
            ctx,
            timestep: FixedTimestep::default(),
            clock: Box::new(SystemClock::new()),
            hooks: Box::new(DefaultHooks),
            platform: None,
            should_close: false,
            state: RunState::Ready,
        }
    }

    /// Window and graphics to render through. Required unless headless.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn with_hooks(mut self, hooks: impl GameHooks) -> Self {
        self.hooks = Box::new(hooks);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    /// Register content processors or queue commands before `run`.
    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    pub fn is_headless(&self) -> bool {
        self.settings.headless
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn fps(&self) -> u32 {
        self.ctx.time.fps()
    }

    /// Forward a frame cap to the window. 0 and headless runs are ignored.
    pub fn set_target_fps(&mut self, fps: u32) {
        if fps == 0 || self.settings.headless {
            return;
        }
        if let Some(platform) = self.platform.as_mut() {
            platform.window.set_target_fps(fps);
        }
    }

    /// Open `url` in the platform's browser. Does nothing when headless.
    pub fn open_url(&mut self, url: &str) {
        if self.settings.headless {
            return;
        }
        if let Some(platform) = self.platform.as_mut() {
            platform.window.open_url(url);
        }
    }

    /// Stop the loop before the next iteration.
    pub fn close(&mut self) {
        if !self.settings.headless {
            if let Some(platform) = self.platform.as_mut() {
                platform.window.close();
            }
        }
        self.should_close = true;
    }

    /// Start up, loop until closed, then shut down.
    ///
    /// Shutdown runs even when startup or an iteration fails: `on_close`,
    /// then the active scene is disposed, then all content. The first error
    /// is returned afterwards.
    pub fn run(&mut self) -> Result<(), GameError> {
        if self.state != RunState::Ready {
            return Err(GameError::AlreadyRan);
        }
        self.state = RunState::Running;

        let span = tracing::info_span!("game", title = %self.settings.title);
        let _enter = span.enter();

        let result = match self.startup() {
            Ok(()) => self.run_loop(),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            tracing::error!("game loop aborted: {e}");
        }

        self.hooks.on_close(&mut self.ctx);
        self.scenes.dispose(&mut self.ctx);
        if !self.ctx.commands.is_empty() {
            tracing::warn!(
                "discarding {} command(s) queued during shutdown",
                self.ctx.commands.len()
            );
            self.ctx.commands.clear();
        }
        self.ctx.content.dispose();
        self.state = RunState::Finished;
        tracing::info!(
            frames = self.ctx.time.frame(),
            fixed_ticks = self.ctx.time.fixed_ticks(),
            "game loop finished"
        );
        result
    }

    fn startup(&mut self) -> Result<(), GameError> {
        self.settings.validate()?;
        log_banner();

        self.timestep = FixedTimestep::new(self.settings.fixed_step)
            .with_max_steps(self.settings.max_fixed_steps);
        self.ctx.time = Time::new(self.settings.fixed_step);

        if !self.settings.headless {
            tracing::debug!("initialize window...");
            let platform = self.platform.as_mut().ok_or(GameError::MissingPlatform)?;
            if let Some(icon_path) = &self.settings.icon_path {
                let icon = self.ctx.content.load::<Image>(icon_path)?;
                if let Some(image) = self.ctx.content.get(icon) {
                    platform.window.set_icon(image);
                }
            }
            platform.window.set_states(self.settings.window_states);
            if self.settings.target_fps != 0 {
                platform.window.set_target_fps(self.settings.target_fps);
            }
        }

        tracing::debug!("initialize scenes...");
        self.scenes.init(&mut self.ctx)?;
        self.hooks.init(&mut self.ctx)?;
        self.scenes.apply_commands(&mut self.ctx)
    }

    fn run_loop(&mut self) -> Result<(), GameError> {
        tracing::debug!("run ticks...");
        self.clock.reset();
        loop {
            if self.ctx.take_close_request() {
                self.close();
            }
            if !self.keep_running() {
                return Ok(());
            }
            self.frame()?;
        }
    }

    fn keep_running(&self) -> bool {
        if self.settings.headless {
            return !self.should_close;
        }
        self.platform
            .as_ref()
            .is_some_and(|platform| !platform.window.should_close())
    }

    fn frame(&mut self) -> Result<(), GameError> {
        let dt = self.clock.tick();
        self.ctx.time.begin_frame(dt);

        self.scenes.update(&mut self.ctx)?;
        self.hooks.update(&mut self.ctx)?;
        self.scenes.apply_commands(&mut self.ctx)?;

        self.timestep.accumulate(dt);
        while self.timestep.next_step() {
            self.ctx.time.fixed_tick();
            self.scenes.fixed_update(&mut self.ctx)?;
            self.hooks.fixed_update(&mut self.ctx)?;
            self.scenes.apply_commands(&mut self.ctx)?;
        }
        self.ctx.time.set_alpha(self.timestep.alpha());

        if self.settings.headless {
            return Ok(());
        }
        if let Some(platform) = self.platform.as_mut() {
            let gfx = platform.graphics.as_mut();
            gfx.begin_frame();
            gfx.clear_background(self.settings.background);
            self.scenes.draw(&mut self.ctx, gfx)?;
            self.hooks.draw(&mut self.ctx, gfx)?;
            gfx.end_frame();
            self.scenes.apply_commands(&mut self.ctx)?;
        }
        Ok(())
    }
}

fn log_banner() {
    tracing::info!("Hello World! Ember [{VERSION}] start...");
    let threads = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    tracing::info!("\tCPU threads: {threads}");
    tracing::info!("\tOS: {} ({})", std::env::consts::OS, std::env::consts::ARCH);
}
