use ember_common::EntityId;
use ember_content::ContentError;

/// Errors from scene, entity and game loop operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("no entity with id {0} in this scene")]
    EntityNotFound(EntityId),
    #[error("entity {0} already belongs to a scene")]
    AlreadyOwned(EntityId),
    #[error("entity {id} is not a {expected}")]
    EntityTypeMismatch {
        id: EntityId,
        expected: &'static str,
    },
    #[error("entity has no id; it was never added to a scene")]
    Detached,
    #[error("scene '{0}' has been disposed")]
    SceneDisposed(String),
    #[error("no default scene was set before startup")]
    NoDefaultScene,
    #[error("no active scene")]
    NoActiveScene,
    #[error("already initialized")]
    AlreadyInitialized,
    #[error("the game loop has already run")]
    AlreadyRan,
    #[error("a window and graphics platform is required unless running headless")]
    MissingPlatform,
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error("settings parse error: {0}")]
    Settings(#[from] serde_yaml::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("{0}")]
    Custom(String),
}

impl GameError {
    /// Error raised by user code in a hook.
    pub fn custom(message: impl Into<String>) -> Self {
        Self::Custom(message.into())
    }
}
