//! Platform capability interface.
//!
//! The core never talks to an OS directly. A platform layer implements
//! [`Window`] once per target and hands it to the scene at construction
//! time; it feeds raw input back in through `Scene::dispatch_input`.

mod cursor;
mod headless;

pub use cursor::CursorIcon;
pub use headless::{HeadlessWindow, WindowState};

use crate::geometry::Size;

pub trait Window: Send {
    /// Current client area size in logical pixels.
    fn size(&self) -> Size;

    /// Change the pointer cursor.
    fn set_cursor(&mut self, cursor: CursorIcon);

    /// Ask the platform to keep delivering pointer events to this window
    /// while a button is held, even outside its bounds.
    fn set_mouse_capture(&mut self, capture: bool);
}
