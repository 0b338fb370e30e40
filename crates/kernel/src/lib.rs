//! Game kernel: entities, scenes, the scene manager and the fixed-step loop.
//!
//! # Invariants
//! - Entity ids are unique within a scene, only increase, and are never reused.
//! - All hooks run sequentially on one thread. A scene is never mutated while
//!   it dispatches to its entities; mutation requested from inside a hook is
//!   queued on [`Commands`] and applied at the end of the phase.
//! - After each frame's catch-up the fixed-step accumulator is non-negative
//!   and below one step.
//! - At most one scene is active; switching disposes the old scene before the
//!   new one is initialized.

pub mod clock;
pub mod commands;
pub mod context;
pub mod entity;
pub mod error;
pub mod game;
pub mod scene;
pub mod scene_manager;
pub mod settings;
pub mod timestep;

#[cfg(test)]
pub(crate) mod testing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use commands::{Command, Commands};
pub use context::{GameContext, Time};
pub use entity::{AsAny, Entity, EntityBase};
pub use error::GameError;
pub use game::{DefaultHooks, Game, GameHooks, RunState, VERSION};
pub use scene::{Scene, SceneScript};
pub use scene_manager::SceneManager;
pub use settings::GameSettings;
pub use timestep::{DEFAULT_FIXED_STEP, FixedTimestep};

pub fn crate_info() -> &'static str {
    "ember-kernel v0.1.0"
}
