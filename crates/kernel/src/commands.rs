use std::collections::VecDeque;
use std::fmt;

use ember_common::EntityId;

use crate::{Entity, Scene};

/// A structural change requested from inside a hook.
pub enum Command {
    Spawn(Box<dyn Entity>),
    Despawn(EntityId),
    SwitchScene(Scene),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Spawn(entity) => write!(f, "Spawn([{}])", entity.tag()),
            Command::Despawn(id) => write!(f, "Despawn({id})"),
            Command::SwitchScene(scene) => write!(f, "SwitchScene({})", scene.name()),
        }
    }
}

/// A command together with the scene activation it was queued against.
///
/// `scene` is `None` when no scene was active yet; such commands apply to
/// whichever scene is active when they are drained.
#[derive(Debug)]
pub(crate) struct Queued {
    pub(crate) scene: Option<u64>,
    pub(crate) command: Command,
}

/// Deferred queue of [`Command`]s.
///
/// Hooks cannot touch the scene that is dispatching to them, so they push
/// here instead. The scene manager drains the queue in FIFO order after each
/// loop phase, including commands queued while draining.
///
/// Entity ids are only unique within one scene, so every command remembers
/// which scene activation was current when it was queued. Spawns and
/// despawns aimed at a scene that has since been switched away are dropped
/// with a warning.
#[derive(Debug, Default)]
pub struct Commands {
    queue: VecDeque<Queued>,
    target: Option<u64>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `entity` to the active scene once the current phase ends.
    pub fn spawn<E: Entity>(&mut self, entity: E) {
        self.spawn_boxed(Box::new(entity));
    }

    pub fn spawn_boxed(&mut self, entity: Box<dyn Entity>) {
        self.push(Command::Spawn(entity));
    }

    /// Remove and dispose the entity with `id` once the current phase ends.
    ///
    /// An id that is already gone by then, for example because two hooks
    /// despawned the same entity, is skipped with a warning.
    pub fn despawn(&mut self, id: EntityId) {
        self.push(Command::Despawn(id));
    }

    /// Replace the active scene once the current phase ends.
    pub fn switch_scene(&mut self, scene: Scene) {
        self.push(Command::SwitchScene(scene));
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every queued command without applying it.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    fn push(&mut self, command: Command) {
        self.queue.push_back(Queued {
            scene: self.target,
            command,
        });
    }

    /// Stamp commands queued from now on with scene activation `generation`.
    pub(crate) fn retarget(&mut self, generation: u64) {
        self.target = Some(generation);
    }

    pub(crate) fn drain(&mut self) -> VecDeque<Queued> {
        std::mem::take(&mut self.queue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Spy, log};

    #[test]
    fn queues_in_order() {
        let mut commands = Commands::new();
        commands.spawn(Spy::new("a", "enemy", &log()));
        commands.despawn(EntityId(7));
        commands.switch_scene(Scene::new("Next"));
        assert_eq!(commands.len(), 3);

        let drained: Vec<String> = commands
            .drain()
            .iter()
            .map(|queued| format!("{:?}", queued.command))
            .collect();
        assert_eq!(drained, vec!["Spawn([enemy])", "Despawn(#7)", "SwitchScene(Next)"]);
        assert!(commands.is_empty());
    }

    #[test]
    fn commands_carry_the_current_target() {
        let mut commands = Commands::new();
        commands.despawn(EntityId(0));
        commands.retarget(3);
        commands.despawn(EntityId(1));

        let targets: Vec<Option<u64>> = commands.drain().iter().map(|q| q.scene).collect();
        assert_eq!(targets, vec![None, Some(3)]);
    }

    #[test]
    fn clear_discards_everything() {
        let mut commands = Commands::new();
        commands.despawn(EntityId(0));
        commands.clear();
        assert!(commands.is_empty());
    }
}
