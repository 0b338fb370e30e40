use std::cell::RefCell;
use std::rc::Rc;

use ember_common::Image;
use glam::UVec2;
use serde::{Deserialize, Serialize};

use crate::Graphics;

/// Window configuration flags applied once at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowStates {
    pub resizable: bool,
    pub fullscreen: bool,
    pub vsync: bool,
    pub undecorated: bool,
    pub hidden: bool,
}

/// Windowing interface. The loop polls `should_close` once per iteration.
pub trait Window {
    /// Whether the user or the application asked the window to close.
    fn should_close(&self) -> bool;

    fn close(&mut self);

    fn set_icon(&mut self, icon: &Image);

    fn set_states(&mut self, states: WindowStates);

    /// Cap the frame rate. Callers never pass 0; 0 means "leave unset".
    fn set_target_fps(&mut self, fps: u32);

    fn title(&self) -> &str;

    fn size(&self) -> UVec2;

    /// Hand `url` to the platform's default browser.
    fn open_url(&mut self, url: &str);
}

#[derive(Debug)]
struct VirtualState {
    icon_size: Option<UVec2>,
    states: WindowStates,
    target_fps: Option<u32>,
    opened_urls: Vec<String>,
    closed: bool,
}

/// Window that exists only in memory and remembers what it was told.
///
/// Clones share state, so a caller can inspect the window the loop owns.
#[derive(Debug, Clone)]
pub struct VirtualWindow {
    title: String,
    size: UVec2,
    state: Rc<RefCell<VirtualState>>,
}

impl VirtualWindow {
    pub fn new(title: impl Into<String>, size: UVec2) -> Self {
        Self {
            title: title.into(),
            size,
            state: Rc::new(RefCell::new(VirtualState {
                icon_size: None,
                states: WindowStates::default(),
                target_fps: None,
                opened_urls: Vec::new(),
                closed: false,
            })),
        }
    }

    /// Dimensions of the icon last set, if any.
    pub fn icon_size(&self) -> Option<UVec2> {
        self.state.borrow().icon_size
    }

    pub fn states(&self) -> WindowStates {
        self.state.borrow().states
    }

    pub fn target_fps(&self) -> Option<u32> {
        self.state.borrow().target_fps
    }

    /// Every url passed to `open_url`, oldest first.
    pub fn opened_urls(&self) -> Vec<String> {
        self.state.borrow().opened_urls.clone()
    }
}

impl Window for VirtualWindow {
    fn should_close(&self) -> bool {
        self.state.borrow().closed
    }

    fn close(&mut self) {
        tracing::debug!("virtual window '{}' closed", self.title);
        self.state.borrow_mut().closed = true;
    }

    fn set_icon(&mut self, icon: &Image) {
        self.state.borrow_mut().icon_size = Some(UVec2::new(icon.width, icon.height));
    }

    fn set_states(&mut self, states: WindowStates) {
        self.state.borrow_mut().states = states;
    }

    fn set_target_fps(&mut self, fps: u32) {
        self.state.borrow_mut().target_fps = Some(fps);
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn size(&self) -> UVec2 {
        self.size
    }

    fn open_url(&mut self, url: &str) {
        tracing::debug!("virtual window '{}' opening {url}", self.title);
        self.state.borrow_mut().opened_urls.push(url.to_owned());
    }
}

/// The window and graphics device the loop renders through when not
/// headless.
pub struct Platform {
    pub window: Box<dyn Window>,
    pub graphics: Box<dyn Graphics>,
}

impl Platform {
    pub fn new(window: impl Window + 'static, graphics: impl Graphics + 'static) -> Self {
        Self {
            window: Box::new(window),
            graphics: Box::new(graphics),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_common::Color;

    #[test]
    fn virtual_window_remembers_settings() {
        let observer = VirtualWindow::new("Test", UVec2::new(800, 600));
        let mut window = observer.clone();
        window.set_icon(&Image::filled(16, 16, Color::WHITE));
        window.set_target_fps(144);
        window.set_states(WindowStates {
            resizable: true,
            ..WindowStates::default()
        });

        assert_eq!(observer.icon_size(), Some(UVec2::new(16, 16)));
        assert_eq!(observer.target_fps(), Some(144));
        assert!(observer.states().resizable);
        assert_eq!(window.title(), "Test");
        assert_eq!(window.size(), UVec2::new(800, 600));
    }

    #[test]
    fn close_is_observed_through_should_close() {
        let mut window = VirtualWindow::new("Test", UVec2::new(1, 1));
        assert!(!window.should_close());
        window.close();
        assert!(window.should_close());
    }

    #[test]
    fn opened_urls_are_remembered_in_order() {
        let observer = VirtualWindow::new("Test", UVec2::new(1, 1));
        let mut window = observer.clone();
        window.open_url("https://example.com/a");
        window.open_url("https://example.com/b");
        assert_eq!(
            observer.opened_urls(),
            vec!["https://example.com/a", "https://example.com/b"]
        );
    }
}
