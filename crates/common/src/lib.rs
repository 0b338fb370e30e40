//! Shared plain-data types used across the ember crates.

pub mod types;

pub use types::{Color, EntityId, Image};

pub fn crate_info() -> &'static str {
    "ember-common v0.1.0"
}
