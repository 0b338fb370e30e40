use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use ember_common::Color;
use glam::Vec2;

/// Graphics device interface. All backends implement this trait.
///
/// The loop brackets every rendered iteration with `begin_frame` /
/// `end_frame` and clears the background once in between; entities issue the
/// draw calls.
pub trait Graphics {
    fn begin_frame(&mut self);

    fn clear_background(&mut self, color: Color);

    fn end_frame(&mut self);

    fn draw_rectangle(&mut self, position: Vec2, size: Vec2, color: Color);

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color);
}

/// One call made against a [`RecordingGraphics`].
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    BeginFrame,
    Clear(Color),
    Rectangle {
        position: Vec2,
        size: Vec2,
        color: Color,
    },
    Circle {
        center: Vec2,
        radius: f32,
        color: Color,
    },
    Text {
        text: String,
        position: Vec2,
        font_size: f32,
        color: Color,
    },
    EndFrame,
}

#[derive(Debug, Default)]
struct Recording {
    commands: Vec<DrawCommand>,
    frames: u64,
    in_frame: bool,
}

/// Graphics backend that records every call instead of drawing.
///
/// Clones share one recording, so a caller can keep a clone while the game
/// loop owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingGraphics {
    recording: Rc<RefCell<Recording>>,
}

impl RecordingGraphics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything recorded so far.
    pub fn commands(&self) -> Vec<DrawCommand> {
        self.recording.borrow().commands.clone()
    }

    /// Number of completed frames (`end_frame` calls that closed a frame).
    pub fn frames(&self) -> u64 {
        self.recording.borrow().frames
    }

    /// Number of recorded commands matching `pred`.
    pub fn count(&self, pred: impl Fn(&DrawCommand) -> bool) -> usize {
        self.recording
            .borrow()
            .commands
            .iter()
            .filter(|c| pred(*c))
            .count()
    }

    pub fn clear(&self) {
        let mut rec = self.recording.borrow_mut();
        rec.commands.clear();
        rec.frames = 0;
    }

    /// Human-readable dump of the recording, one command per line.
    pub fn to_text(&self) -> String {
        let rec = self.recording.borrow();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Recording (frames={}, commands={}) ===",
            rec.frames,
            rec.commands.len()
        );
        for cmd in &rec.commands {
            let _ = match cmd {
                DrawCommand::BeginFrame => writeln!(out, "begin"),
                DrawCommand::Clear(color) => writeln!(out, "  clear {color}"),
                DrawCommand::Rectangle {
                    position,
                    size,
                    color,
                } => writeln!(
                    out,
                    "  rect pos=({:.1}, {:.1}) size=({:.1}, {:.1}) {color}",
                    position.x, position.y, size.x, size.y
                ),
                DrawCommand::Circle {
                    center,
                    radius,
                    color,
                } => writeln!(
                    out,
                    "  circle center=({:.1}, {:.1}) r={radius:.1} {color}",
                    center.x, center.y
                ),
                DrawCommand::Text {
                    text,
                    position,
                    font_size,
                    color,
                } => writeln!(
                    out,
                    "  text {text:?} pos=({:.1}, {:.1}) size={font_size:.0} {color}",
                    position.x, position.y
                ),
                DrawCommand::EndFrame => writeln!(out, "end"),
            };
        }
        out
    }

    fn draw(&mut self, cmd: DrawCommand) {
        let mut rec = self.recording.borrow_mut();
        if !rec.in_frame {
            tracing::warn!("draw call outside of a frame ignored: {cmd:?}");
            return;
        }
        rec.commands.push(cmd);
    }
}

impl Graphics for RecordingGraphics {
    fn begin_frame(&mut self) {
        let mut rec = self.recording.borrow_mut();
        if rec.in_frame {
            tracing::warn!("begin_frame called while a frame is already open");
        }
        rec.in_frame = true;
        rec.commands.push(DrawCommand::BeginFrame);
    }

    fn clear_background(&mut self, color: Color) {
        self.draw(DrawCommand::Clear(color));
    }

    fn end_frame(&mut self) {
        let mut rec = self.recording.borrow_mut();
        if !rec.in_frame {
            tracing::warn!("end_frame called without begin_frame");
            return;
        }
        rec.in_frame = false;
        rec.frames += 1;
        rec.commands.push(DrawCommand::EndFrame);
    }

    fn draw_rectangle(&mut self, position: Vec2, size: Vec2, color: Color) {
        self.draw(DrawCommand::Rectangle {
            position,
            size,
            color,
        });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.draw(DrawCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn draw_text(&mut self, text: &str, position: Vec2, font_size: f32, color: Color) {
        self.draw(DrawCommand::Text {
            text: text.to_owned(),
            position,
            font_size,
            color,
        });
    }
}
