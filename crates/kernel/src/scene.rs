use std::collections::BTreeMap;
use std::fmt;

use ember_common::EntityId;
use ember_render::Graphics;

use crate::{Entity, GameContext, GameError};

/// Scene-level behavior layered on top of entity dispatch.
///
/// Every hook runs before the scene dispatches the same phase to its
/// entities, and receives the scene itself so it can add, query and remove
/// entities directly.
pub trait SceneScript: 'static {
    fn init(&mut self, _scene: &mut Scene, _ctx: &mut GameContext) -> Result<(), GameError> {
        Ok(())
    }

    fn update(&mut self, _scene: &mut Scene, _ctx: &mut GameContext) -> Result<(), GameError> {
        Ok(())
    }

    fn fixed_update(
        &mut self,
        _scene: &mut Scene,
        _ctx: &mut GameContext,
    ) -> Result<(), GameError> {
        Ok(())
    }

    fn draw(
        &mut self,
        _scene: &mut Scene,
        _ctx: &mut GameContext,
        _gfx: &mut dyn Graphics,
    ) -> Result<(), GameError> {
        Ok(())
    }

    /// Runs before the scene disposes its entities.
    fn dispose(&mut self, _scene: &mut Scene, _ctx: &mut GameContext) {}
}

fn as_dyn(entity: &Box<dyn Entity>) -> &dyn Entity {
    entity.as_ref()
}

fn as_dyn_mut(entity: &mut Box<dyn Entity>) -> &mut dyn Entity {
    entity.as_mut()
}

/// A named container that owns a set of entities and drives their lifecycle.
///
/// Ids come from a per-scene counter starting at 0 and are never reused, so
/// iterating the id-ordered map visits entities in insertion order.
pub struct Scene {
    name: String,
    entities: BTreeMap<EntityId, Box<dyn Entity>>,
    next_id: u64,
    script: Option<Box<dyn SceneScript>>,
    initialized: bool,
    disposed: bool,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: BTreeMap::new(),
            next_id: 0,
            script: None,
            initialized: false,
            disposed: false,
        }
    }

    pub fn with_script(mut self, script: impl SceneScript) -> Self {
        self.script = Some(Box::new(script));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Adopt `entity`: assign the next id, then run its `init`.
    ///
    /// The id is consumed even when `init` fails; the entity is then dropped
    /// and never becomes part of the scene.
    pub fn add_entity<E: Entity>(
        &mut self,
        entity: E,
        ctx: &mut GameContext,
    ) -> Result<EntityId, GameError> {
        self.add_boxed(Box::new(entity), ctx)
    }

    pub fn add_boxed(
        &mut self,
        mut entity: Box<dyn Entity>,
        ctx: &mut GameContext,
    ) -> Result<EntityId, GameError> {
        if self.disposed {
            return Err(GameError::SceneDisposed(self.name.clone()));
        }
        if let Some(id) = entity.id() {
            return Err(GameError::AlreadyOwned(id));
        }

        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.base_mut().attach(id);
        entity.init(ctx)?;

        tracing::debug!(scene = %self.name, "added entity {id} [{}]", entity.tag());
        self.entities.insert(id, entity);
        Ok(id)
    }

    /// Dispose the entity with `id` and drop it from the scene.
    pub fn remove_entity(&mut self, id: EntityId, ctx: &mut GameContext) -> Result<(), GameError> {
        let mut entity = self.entities.remove(&id).ok_or(GameError::EntityNotFound(id))?;
        entity.dispose(ctx);
        entity.base_mut().mark_disposed();
        tracing::debug!(scene = %self.name, "removed entity {id} [{}]", entity.tag());
        Ok(())
    }

    /// Remove by reference: looks up the entity's own id.
    pub fn remove_entity_by_ref(
        &mut self,
        entity: &dyn Entity,
        ctx: &mut GameContext,
    ) -> Result<(), GameError> {
        let id = entity.id().ok_or(GameError::Detached)?;
        self.remove_entity(id, ctx)
    }

    pub fn get_entity(&self, id: EntityId) -> Result<&dyn Entity, GameError> {
        self.entities
            .get(&id)
            .map(as_dyn)
            .ok_or(GameError::EntityNotFound(id))
    }

    pub fn get_entity_mut(&mut self, id: EntityId) -> Result<&mut dyn Entity, GameError> {
        self.entities
            .get_mut(&id)
            .map(as_dyn_mut)
            .ok_or(GameError::EntityNotFound(id))
    }

    /// Typed lookup; fails with `EntityTypeMismatch` when the entity under
    /// `id` is not a `T`.
    pub fn get_entity_as<T: Entity>(&self, id: EntityId) -> Result<&T, GameError> {
        let entity = self.get_entity(id)?;
        entity
            .as_any()
            .downcast_ref::<T>()
            .ok_or(GameError::EntityTypeMismatch {
                id,
                expected: std::any::type_name::<T>(),
            })
    }

    pub fn get_entity_as_mut<T: Entity>(&mut self, id: EntityId) -> Result<&mut T, GameError> {
        let entity = self.get_entity_mut(id)?;
        entity
            .as_any_mut()
            .downcast_mut::<T>()
            .ok_or(GameError::EntityTypeMismatch {
                id,
                expected: std::any::type_name::<T>(),
            })
    }

    /// Snapshot of all entities in insertion order.
    pub fn entities(&self) -> Vec<&dyn Entity> {
        self.entities.values().map(as_dyn).collect()
    }

    /// Snapshot of all ids in insertion order.
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Lazily yields entities whose tag equals `tag`, in insertion order.
    ///
    /// Borrows the scene, so it cannot outlive a mutation. Use
    /// [`ids_with_tag`](Self::ids_with_tag) to act on the matches afterwards.
    pub fn entities_with_tag<'a>(
        &'a self,
        tag: &'a str,
    ) -> impl Iterator<Item = &'a dyn Entity> + 'a {
        self.entities
            .values()
            .map(as_dyn)
            .filter(move |entity| entity.tag() == tag)
    }

    pub fn ids_with_tag(&self, tag: &str) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, entity)| entity.tag() == tag)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Run the script's `init`. Called once when the scene becomes active.
    pub fn init(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        if self.disposed {
            return Err(GameError::SceneDisposed(self.name.clone()));
        }
        if self.initialized {
            return Err(GameError::AlreadyInitialized);
        }
        self.initialized = true;
        tracing::info!("scene '{}' init", self.name);
        self.run_script(Ok(()), |script, scene| script.init(scene, ctx))
    }

    pub fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        self.run_script(Ok(()), |script, scene| script.update(scene, ctx))?;
        for entity in self.entities.values_mut() {
            entity.update(ctx)?;
        }
        Ok(())
    }

    pub fn fixed_update(&mut self, ctx: &mut GameContext) -> Result<(), GameError> {
        self.run_script(Ok(()), |script, scene| script.fixed_update(scene, ctx))?;
        for entity in self.entities.values_mut() {
            entity.fixed_update(ctx)?;
        }
        Ok(())
    }

    pub fn draw(&mut self, ctx: &mut GameContext, gfx: &mut dyn Graphics) -> Result<(), GameError> {
        self.run_script(Ok(()), |script, scene| script.draw(scene, ctx, gfx))?;
        for entity in self.entities.values_mut() {
            entity.draw(ctx, gfx)?;
        }
        Ok(())
    }

    /// Dispose the script, then every entity in insertion order. Idempotent.
    pub fn dispose(&mut self, ctx: &mut GameContext) {
        if self.disposed {
            return;
        }
        self.run_script((), |script, scene| script.dispose(scene, ctx));
        self.disposed = true;

        let entities = std::mem::take(&mut self.entities);
        let count = entities.len();
        for (_, mut entity) in entities {
            entity.dispose(ctx);
            entity.base_mut().mark_disposed();
        }
        tracing::info!("scene '{}' disposed ({count} entities)", self.name);
    }

    /// Run `f` with the script detached so it can borrow the scene mutably.
    fn run_script<R>(
        &mut self,
        none: R,
        f: impl FnOnce(&mut dyn SceneScript, &mut Scene) -> R,
    ) -> R {
        let Some(mut script) = self.script.take() else {
            return none;
        };
        let out = f(script.as_mut(), self);
        self.script = Some(script);
        out
    }
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("name", &self.name)
            .field("entities", &self.entities.len())
            .field("next_id", &self.next_id)
            .field("scripted", &self.script.is_some())
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        if !self.disposed && !self.entities.is_empty() {
            tracing::warn!(
                "scene '{}' dropped without dispose; {} entities never disposed",
                self.name,
                self.entities.len()
            );
        }
    }
}
