//! A window with no native surface, for tests and offscreen composition.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{CursorIcon, Window};
use crate::geometry::Size;

/// Observable state of a [`HeadlessWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowState {
    pub size: Size,
    pub cursor: CursorIcon,
    pub mouse_captured: bool,
    /// Number of cursor changes requested
    pub cursor_changes: u32,
}

/// In-memory [`Window`].
///
/// Its state lives behind a shared handle, so a caller can keep a clone of
/// the window to inspect it after handing the original to a scene.
#[derive(Debug, Clone, Default)]
pub struct HeadlessWindow {
    state: Arc<Mutex<WindowState>>,
}

impl HeadlessWindow {
    pub fn new(size: Size) -> Self {
        Self {
            state: Arc::new(Mutex::new(WindowState {
                size,
                ..WindowState::default()
            })),
        }
    }

    pub fn state(&self) -> WindowState {
        *self.state.lock()
    }

    /// Change the reported size. The scene learns about it through
    /// `InputEvent::Resized`.
    pub fn set_size(&self, size: Size) {
        self.state.lock().size = size;
    }
}

impl Window for HeadlessWindow {
    fn size(&self) -> Size {
        self.state.lock().size
    }

    fn set_cursor(&mut self, cursor: CursorIcon) {
        let mut state = self.state.lock();
        if state.cursor != cursor {
            state.cursor = cursor;
            state.cursor_changes += 1;
        }
    }

    fn set_mouse_capture(&mut self, capture: bool) {
        self.state.lock().mouse_captured = capture;
    }
}
