//! Events as seen by a single view.
//!
//! The platform feeds window-level [`crate::input::InputEvent`]s to the
//! scene, which turns them into [`Event`]s in the receiving view's own
//! coordinate space.

use std::path::PathBuf;

use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Where a scroll delta came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSource {
    /// Notched wheel, already converted to pixels
    Wheel,
    /// Touchpad or touchscreen
    Finger,
    /// Kinetic scrolling after the finger lifted
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    /// Super / Windows / Command
    pub logo: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    Space,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    /// Printable input, also reported for letters pressed with Ctrl
    Char(char),
}

/// Payload carried by a drag-and-drop operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DragData {
    Text(String),
    Files(Vec<PathBuf>),
}

/// An event delivered to a single view.
///
/// Positions are in the receiving view's local coordinates (0,0 is its
/// top-left corner).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Pointer moved over the view (or anywhere, while the view holds capture)
    MouseMove { position: Point },
    MouseDown {
        position: Point,
        button: MouseButton,
    },
    MouseUp {
        position: Point,
        button: MouseButton,
    },
    /// Pointer entered the view's hit region
    MouseEnter { position: Point },
    /// Pointer left the view's hit region
    MouseLeave,
    Scroll {
        position: Point,
        /// Horizontal scroll delta in pixels (positive = right)
        delta_x: f32,
        /// Vertical scroll delta in pixels (positive = down)
        delta_y: f32,
        source: ScrollSource,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
    KeyUp {
        key: Key,
        modifiers: Modifiers,
    },
    /// View gained keyboard focus
    FocusIn,
    /// View lost keyboard focus
    FocusOut,
    /// A drag is hovering over the view
    DragOver { position: Point },
    /// A drag was released over the view
    Drop { position: Point, data: DragData },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResponse {
    Ignored,
    Handled,
}

impl Event {
    /// Get the position carried by this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            Event::MouseMove { position }
            | Event::MouseDown { position, .. }
            | Event::MouseUp { position, .. }
            | Event::MouseEnter { position }
            | Event::Scroll { position, .. }
            | Event::DragOver { position }
            | Event::Drop { position, .. } => Some(*position),
            Event::MouseLeave
            | Event::KeyDown { .. }
            | Event::KeyUp { .. }
            | Event::FocusIn
            | Event::FocusOut => None,
        }
    }

    /// Create a copy of this event with its position replaced
    pub fn with_position(&self, new_position: Point) -> Self {
        let mut event = self.clone();
        match &mut event {
            Event::MouseMove { position }
            | Event::MouseDown { position, .. }
            | Event::MouseUp { position, .. }
            | Event::MouseEnter { position }
            | Event::Scroll { position, .. }
            | Event::DragOver { position }
            | Event::Drop { position, .. } => *position = new_position,
            // Keyboard/focus events don't have coordinates
            Event::MouseLeave
            | Event::KeyDown { .. }
            | Event::KeyUp { .. }
            | Event::FocusIn
            | Event::FocusOut => {}
        }
        event
    }
}
