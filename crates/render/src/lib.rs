//! Render collaborators: the window and graphics services the game loop drives.
//!
//! # Invariants
//! - The loop only ever talks to these traits; no backend type leaks into the
//!   kernel.
//! - Graphics calls happen between `begin_frame` and `end_frame`.
//!
//! # Workaround
//! Ships in-memory backends ([`VirtualWindow`], [`RecordingGraphics`]) in place
//! of an OS window and GPU device. The traits are stable; a real backend
//! implements them without changing consumers.

mod graphics;
mod window;

pub use graphics::{DrawCommand, Graphics, RecordingGraphics};
pub use window::{Platform, VirtualWindow, Window, WindowStates};

pub fn crate_info() -> &'static str {
    "ember-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
