use std::any::Any;

use ember_common::EntityId;
use ember_render::Graphics;

use crate::{GameContext, GameError};

/// Downcasting support for trait objects. Implemented for every `'static`
/// type; entity types never implement it by hand.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Identity and bookkeeping every entity carries.
///
/// The id is `None` until a scene adopts the entity. Cloning keeps the id, so
/// a clone of a live entity is rejected by [`Scene::add_entity`](crate::Scene::add_entity).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityBase {
    id: Option<EntityId>,
    tag: String,
    disposed: bool,
}

impl EntityBase {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            tag: tag.into(),
            disposed: false,
        }
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Owned by a scene and not yet disposed.
    pub fn is_live(&self) -> bool {
        self.id.is_some() && !self.disposed
    }

    pub(crate) fn attach(&mut self, id: EntityId) {
        self.id = Some(id);
    }

    pub(crate) fn mark_disposed(&mut self) {
        self.disposed = true;
    }
}

/// A simulated object owned by exactly one [`Scene`](crate::Scene).
///
/// Lifecycle, driven by the scene:
/// 1. `init` once, right after the scene assigned the id.
/// 2. `update`, `fixed_update` and `draw` once per matching loop phase while
///    the entity is live and its scene is active.
/// 3. `dispose` once, when the entity is removed or its scene is disposed.
///
/// Hooks must not try to reach their own scene. Spawning, removing or
/// switching scenes from a hook goes through `ctx.commands`.
pub trait Entity: AsAny {
    fn base(&self) -> &EntityBase;

    fn base_mut(&mut self) -> &mut EntityBase;

    fn id(&self) -> Option<EntityId> {
        self.base().id()
    }

    fn tag(&self) -> &str {
        self.base().tag()
    }

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

    /// Release whatever `init` acquired. Called exactly once by the scene.
    fn dispose(&mut self, _ctx: &mut GameContext) {}
}
