use ember_render::Graphics;

use crate::{Command, GameContext, GameError, Scene};

/// Holds the single active scene and forwards loop phases to it.
///
/// Scene switches, spawns and despawns requested through
/// [`Commands`](crate::Commands) are applied here after every phase.
#[derive(Debug, Default)]
pub struct SceneManager {
    active: Option<Scene>,
    staged: Option<Scene>,
    initialized: bool,
    generation: u64,
}

impl SceneManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_scene(scene: Scene) -> Self {
        Self {
            active: None,
            staged: Some(scene),
            initialized: false,
            generation: 0,
        }
    }

    /// Stage the scene that [`init`](Self::init) activates.
    pub fn set_default_scene(&mut self, scene: Scene) -> Result<(), GameError> {
        if self.initialized {
            return Err(GameError::AlreadyInitialized);
        }
        if let Some(previous) = self.staged.replace(scene) {
            tracing::debug!("default scene '{}' replaced", previous.name());
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.as_ref()
    }

    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active.as_mut()
    }

    /// Activate the default scene. Runs once, before the first iteration.
    pub fn init(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        if self.initialized {
            return Err(GameError::AlreadyInitialized);
        }
        let scene = self.staged.take().ok_or(GameError::NoDefaultScene)?;
        self.activate(scene, ctx)?;
        self.apply_commands(ctx)
    }

    pub fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        if let Some(scene) = self.active.as_mut() {
            scene.update(ctx)?;
        }
        self.apply_commands(ctx)
    }

    pub fn fixed_update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        if let Some(scene) = self.active.as_mut() {
            scene.fixed_update(ctx)?;
        }
        self.apply_commands(ctx)
    }

    pub fn draw(&mut self, ctx: &mut GameContext, gfx: &mut dyn Graphics) -> Result<(), GameError> {
        if let Some(scene) = self.active.as_mut() {
            scene.draw(ctx, gfx)?;
        }
        self.apply_commands(ctx)
    }

    /// Dispose the current scene, then initialize `scene` and make it active.
    pub fn switch_scene(&mut self, scene: Scene, ctx: &mut GameContext) -> Result<(), GameError> {
        self.activate(scene, ctx)?;
        self.apply_commands(ctx)
    }

    /// Apply queued commands until the queue stays empty.
    ///
    /// Spawns and despawns queued against a scene that has since been
    /// replaced are dropped. Despawning an id the active scene no longer
    /// holds is skipped.
    pub fn apply_commands(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        loop {
            let pending = ctx.commands.drain();
            if pending.is_empty() {
                return Ok(());
            }
            for queued in pending {
                let stale = queued.scene.is_some_and(|g| g != self.generation);
                match queued.command {
                    Command::SwitchScene(scene) => self.activate(scene, ctx)?,
                    command if stale => {
                        tracing::warn!("dropping {command:?} queued for a replaced scene");
                    }
                    Command::Spawn(entity) => {
                        let scene = self.active.as_mut().ok_or(GameError::NoActiveScene)?;
                        scene.add_boxed(entity, ctx)?;
                    }
                    Command::Despawn(id) => {
                        let scene = self.active.as_mut().ok_or(GameError::NoActiveScene)?;
                        if scene.contains(id) {
                            scene.remove_entity(id, ctx)?;
                        } else {
                            tracing::warn!("despawn of {id} skipped: not in '{}'", scene.name());
                        }
                    }
                }
            }
        }
    }

    /// Dispose the active scene and drop any staged one.
    pub fn dispose(&mut self, ctx: &mut GameContext) {
        if let Some(mut scene) = self.active.take() {
            scene.dispose(ctx);
        }
        self.staged = None;
    }

    fn activate(&mut self, scene: Scene, ctx: &mut GameContext) -> Result<(), GameError> {
        if let Some(mut previous) = self.active.take() {
            tracing::info!("switching scene '{}' -> '{}'", previous.name(), scene.name());
            previous.dispose(ctx);
        }
        self.generation += 1;
        ctx.commands.retarget(self.generation);
        self.initialized = true;
        self.active.insert(scene).init(ctx)
    }
}
