use std::cell::RefCell;
use std::rc::Rc;

use ember_common::{Color, EntityId};
use ember_kernel::{Entity, EntityBase, GameContext, GameError, GameHooks, Scene, SceneScript};
use ember_render::Graphics;
use glam::Vec2;

pub const PLAYER: &str = "player";
pub const ENEMY: &str = "enemy";

const ARENA: Vec2 = Vec2::new(320.0, 240.0);
const WAVE_SIZE: usize = 3;
const TICKS_PER_WAVE: u64 = 60;
const ENEMY_TTL_TICKS: u32 = 90;

/// Counters the demo exposes after the run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub waves: u32,
    pub spawned: u32,
    pub culled: u32,
    pub live_enemies: usize,
}

pub type SharedStats = Rc<RefCell<Stats>>;

/// Bounces around the arena.
pub struct Player {
    base: EntityBase,
    position: Vec2,
    velocity: Vec2,
}

impl Player {
    pub fn new() -> Self {
        Self {
            base: EntityBase::new(PLAYER),
            position: ARENA * 0.5,
            velocity: Vec2::new(60.0, 40.0),
        }
    }
}

impl Entity for Player {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn fixed_update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        let step = ctx.time.fixed_step() as f32;
        self.position += self.velocity * step;
        if self.position.x < 0.0 || self.position.x > ARENA.x {
            self.velocity.x = -self.velocity.x;
        }
        if self.position.y < 0.0 || self.position.y > ARENA.y {
            self.velocity.y = -self.velocity.y;
        }
        self.position = self.position.clamp(Vec2::ZERO, ARENA);
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut GameContext, gfx: &mut dyn Graphics) -> Result<(), GameError> {
        gfx.draw_rectangle(
            self.position - Vec2::splat(8.0),
            Vec2::splat(16.0),
            Color::GREEN,
        );
        Ok(())
    }
}

/// Drifts left and expires after a fixed number of ticks.
pub struct Enemy {
    base: EntityBase,
    position: Vec2,
    speed: f32,
    ttl: u32,
}

impl Enemy {
    pub fn new(position: Vec2, speed: f32) -> Self {
        Self {
            base: EntityBase::new(ENEMY),
            position,
            speed,
            ttl: ENEMY_TTL_TICKS,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.ttl == 0 || self.position.x < 0.0
    }
}

impl Entity for Enemy {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn fixed_update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        self.position.x -= self.speed * ctx.time.fixed_step() as f32;
        self.ttl = self.ttl.saturating_sub(1);
        Ok(())
    }

    fn draw(&mut self, _ctx: &mut GameContext, gfx: &mut dyn Graphics) -> Result<(), GameError> {
        gfx.draw_circle(self.position, 6.0, Color::RED);
        Ok(())
    }
}

/// Spawns a wave of enemies every [`TICKS_PER_WAVE`] fixed ticks and culls
/// the dead ones each update.
pub struct WaveScript {
    stats: SharedStats,
    ticks: u64,
}

impl WaveScript {
    pub fn new(stats: &SharedStats) -> Self {
        Self {
            stats: Rc::clone(stats),
            ticks: 0,
        }
    }

    fn queue_wave(&mut self, ctx: &mut GameContext) {
        let mut stats = self.stats.borrow_mut();
        stats.waves += 1;
        for i in 0..WAVE_SIZE {
            let lane = (i + stats.waves as usize) % 4;
            let position = Vec2::new(ARENA.x, 40.0 + lane as f32 * 50.0);
            ctx.commands.spawn(Enemy::new(position, 40.0 + i as f32 * 10.0));
            stats.spawned += 1;
        }
        tracing::debug!("wave {} queued", stats.waves);
    }
}

impl SceneScript for WaveScript {
    fn init(&mut self, scene: &mut Scene, ctx: &mut GameContext) -> Result<(), GameError> {
        scene.add_entity(Player::new(), ctx)?;
        self.queue_wave(ctx);
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene, ctx: &mut GameContext) -> Result<(), GameError> {
        let dead: Vec<EntityId> = scene
            .ids_with_tag(ENEMY)
            .into_iter()
            .filter(|id| scene.get_entity_as::<Enemy>(*id).is_ok_and(Enemy::is_dead))
            .collect();
        for id in &dead {
            scene.remove_entity(*id, ctx)?;
        }

        let mut stats = self.stats.borrow_mut();
        stats.culled += dead.len() as u32;
        stats.live_enemies = scene.entities_with_tag(ENEMY).count();
        Ok(())
    }

    fn fixed_update(&mut self, _scene: &mut Scene, ctx: &mut GameContext) -> Result<(), GameError> {
        self.ticks += 1;
        if self.ticks % TICKS_PER_WAVE == 0 {
            self.queue_wave(ctx);
        }
        Ok(())
    }

    fn draw(
        &mut self,
        _scene: &mut Scene,
        _ctx: &mut GameContext,
        gfx: &mut dyn Graphics,
    ) -> Result<(), GameError> {
        let waves = self.stats.borrow().waves;
        let label = format!("wave {waves}");
        gfx.draw_text(&label, Vec2::new(8.0, 8.0), 20.0, Color::WHITE);
        Ok(())
    }

    fn dispose(&mut self, _scene: &mut Scene, _ctx: &mut GameContext) {
        let stats = self.stats.borrow();
        tracing::info!(
            "demo finished after {} wave(s): spawned={} culled={}",
            stats.waves,
            stats.spawned,
            stats.culled
        );
    }
}

pub fn build_scene(stats: &SharedStats) -> Scene {
    Scene::new("Arena").with_script(WaveScript::new(stats))
}

/// Requests close once `frames` iterations have run.
pub struct FrameLimit {
    frames: u64,
}

impl FrameLimit {
    pub fn new(frames: u64) -> Self {
        Self { frames }
    }
}

impl GameHooks for FrameLimit {
    fn init(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        if self.frames == 0 {
            ctx.request_close();
        }
        Ok(())
    }

    fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        if ctx.time.frame() >= self.frames {
            ctx.request_close();
        }
        Ok(())
    }
}
