use std::cell::RefCell;
use std::rc::Rc;

use ember_render::Graphics;

use crate::{Entity, EntityBase, GameContext, GameError, Scene, SceneScript};

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

pub(crate) fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub(crate) fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

/// Entity that records each hook call as `name.hook`.
#[derive(Clone)]
pub(crate) struct Spy {
    base: EntityBase,
    name: String,
    log: Log,
    fail_on: Option<&'static str>,
}

impl Spy {
    pub(crate) fn new(name: &str, tag: &str, log: &Log) -> Self {
        Self {
            base: EntityBase::new(tag),
            name: name.to_owned(),
            log: Rc::clone(log),
            fail_on: None,
        }
    }

    pub(crate) fn failing_on(mut self, hook: &'static str) -> Self {
        self.fail_on = Some(hook);
        self
    }

    fn record(&self, hook: &'static str) -> Result<(), GameError> {
        self.log.borrow_mut().push(format!("{}.{hook}", self.name));
        if self.fail_on == Some(hook) {
            return Err(GameError::custom(format!("{} failed in {hook}", self.name)));
        }
        Ok(())
    }
}

impl Entity for Spy {
    fn base(&self) -> &EntityBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut EntityBase {
        &mut self.base
    }

    fn init(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
        self.record("init")
    }

    fn update(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
        self.record("update")
    }

    fn fixed_update(&mut self, _ctx: &mut GameContext) -> Result<(), GameError> {
        self.record("fixed_update")
    }

    fn draw(&mut self, _ctx: &mut GameContext, _gfx: &mut dyn Graphics) -> Result<(), GameError> {
        self.record("draw")
    }

    fn dispose(&mut self, _ctx: &mut GameContext) {
        let _ = self.record("dispose");
    }
}

/// Scene script that records its hooks as `script.hook`.
pub(crate) struct SpyScript {
    log: Log,
}

impl SpyScript {
    pub(crate) fn new(log: &Log) -> Self {
        Self {
            log: Rc::clone(log),
        }
    }

    fn record(&self, scene: &Scene, hook: &str) {
        self.log.borrow_mut().push(format!("{}.{hook}", scene.name()));
    }
}

impl SceneScript for SpyScript {
    fn init(&mut self, scene: &mut Scene, _ctx: &mut GameContext) -> Result<(), GameError> {
        self.record(scene, "init");
        Ok(())
    }

    fn update(&mut self, scene: &mut Scene, _ctx: &mut GameContext) -> Result<(), GameError> {
        self.record(scene, "update");
        Ok(())
    }

    fn fixed_update(&mut self, scene: &mut Scene, _ctx: &mut GameContext) -> Result<(), GameError> {
        self.record(scene, "fixed_update");
        Ok(())
    }

    fn draw(
        &mut self,
        scene: &mut Scene,
        _ctx: &mut GameContext,
        _gfx: &mut dyn Graphics,
    ) -> Result<(), GameError> {
        self.record(scene, "draw");
        Ok(())
    }

    fn dispose(&mut self, scene: &mut Scene, _ctx: &mut GameContext) {
        self.record(scene, "dispose");
    }
}
