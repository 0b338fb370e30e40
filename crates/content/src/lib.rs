//! Content loading: a type-keyed processor registry in front of the file system.
//!
//! Callers ask for `load::<T>(path)` and get back a [`Handle<T>`]; the
//! [`ContentManager`] keeps the value and unloads it through the processor
//! that produced it, either on request or when the manager is disposed.
//!
//! # Invariants
//! - Every loaded value is tracked until unloaded or disposed.
//! - Unloading content the manager does not track is a logged no-op.
//! - A missing processor is an error, never a silent default.

mod manager;
mod processor;

use std::path::PathBuf;

pub use manager::{ContentManager, Handle};
pub use processor::{BytesProcessor, ContentProcessor, ImageProcessor, JsonProcessor, TextProcessor};

/// Errors from content operations.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("no content processor registered for type {type_name}")]
    MissingProcessor {
        type_name: &'static str,
    },
    #[error("a content processor for type {type_name} is already registered")]
    DuplicateProcessor {
        type_name: &'static str,
    },
    #[error("failed to decode {}: {message}", .path.display())]
    Decode {
        path: PathBuf,
        message: String,
    },
    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn crate_info() -> &'static str {
    "ember-content v0.1.0"
}
