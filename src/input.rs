//! Routing of raw platform input to individual views.
//!
//! The platform layer reports what happened at window level
//! ([`InputEvent`]). The router decides who hears about it: pointer events
//! go to the hit-test targets (or the view holding the pointer capture),
//! keyboard events to the focused view. Positions are translated into each
//! receiver's local coordinates.

use crate::error::SceneError;
use crate::event::{DragData, Event, EventResponse, Key, Modifiers, MouseButton, ScrollSource};
use crate::geometry::{Point, Size};
use crate::platform::CursorIcon;
use crate::scene::Scene;
use crate::tree::ViewId;

/// Window-level input, in root coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMove {
        position: Point,
    },
    MouseDown {
        position: Point,
        button: MouseButton,
    },
    MouseUp {
        position: Point,
        button: MouseButton,
    },
    /// The pointer left the window
    MouseLeave,
    Scroll {
        position: Point,
        delta_x: f32,
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
    Resized {
        size: Size,
    },
    DragOver {
        position: Point,
    },
    Drop {
        position: Point,
        data: DragData,
    },
}

/// Pointer and keyboard routing state kept by the scene.
#[derive(Debug, Default)]
pub(crate) struct InputState {
    /// Views under the pointer, topmost first
    hovered: Vec<ViewId>,
    capture: Option<ViewId>,
    focus: Option<ViewId>,
    cursor: CursorIcon,
}

impl InputState {
    /// Forget every reference to `ids` (they were detached or destroyed).
    ///
    /// Returns true when this released the pointer capture.
    pub(crate) fn purge(&mut self, ids: &[ViewId]) -> bool {
        if self.focus.is_some_and(|focus| ids.contains(&focus)) {
            self.focus = None;
        }
        self.purge_pointer(ids)
    }

    /// Forget pointer state only (hover and capture).
    pub(crate) fn purge_pointer(&mut self, ids: &[ViewId]) -> bool {
        self.hovered.retain(|id| !ids.contains(id));
        if self.capture.is_some_and(|capture| ids.contains(&capture)) {
            self.capture = None;
            return true;
        }
        false
    }
}

impl Scene {
    /// Route one input event. Returns `Handled` if any view handled it.
    pub fn dispatch_input(&mut self, input: InputEvent) -> EventResponse {
        log::trace!("input {:?}", input);
        match input {
            InputEvent::MouseMove { position } => {
                if let Some(capture) = self.live_capture() {
                    return self.deliver(capture, &Event::MouseMove { position });
                }
                let targets = self.mouse_listeners_at(position);
                self.update_hover(&targets, position);
                self.update_cursor(&targets);
                self.deliver_until_handled(&targets, &Event::MouseMove { position })
            }
            InputEvent::MouseDown { position, button } => {
                let event = Event::MouseDown { position, button };
                if let Some(capture) = self.live_capture() {
                    return self.deliver(capture, &event);
                }
                let targets = self.mouse_listeners_at(position);
                self.update_hover(&targets, position);
                for &target in &targets {
                    if self.deliver(target, &event) == EventResponse::Handled {
                        self.set_capture(Some(target));
                        return EventResponse::Handled;
                    }
                }
                EventResponse::Ignored
            }
            InputEvent::MouseUp { position, button } => {
                let event = Event::MouseUp { position, button };
                let response = match self.live_capture() {
                    Some(capture) => {
                        let response = self.deliver(capture, &event);
                        self.set_capture(None);
                        response
                    }
                    None => {
                        let targets = self.mouse_listeners_at(position);
                        self.deliver_until_handled(&targets, &event)
                    }
                };
                // Hover was frozen while captured
                let targets = self.mouse_listeners_at(position);
                self.update_hover(&targets, position);
                self.update_cursor(&targets);
                response
            }
            InputEvent::MouseLeave => {
                if self.live_capture().is_some() {
                    return EventResponse::Ignored;
                }
                self.update_hover(&[], Point::ZERO);
                self.update_cursor(&[]);
                EventResponse::Ignored
            }
            InputEvent::Scroll {
                position,
                delta_x,
                delta_y,
                source,
            } => {
                let targets = self.mouse_listeners_at(position);
                let event = Event::Scroll {
                    position,
                    delta_x,
                    delta_y,
                    source,
                };
                self.deliver_until_handled(&targets, &event)
            }
            InputEvent::KeyDown { key, modifiers } => {
                self.deliver_to_focus(&Event::KeyDown { key, modifiers })
            }
            InputEvent::KeyUp { key, modifiers } => {
                self.deliver_to_focus(&Event::KeyUp { key, modifiers })
            }
            InputEvent::Resized { size } => {
                self.resize(size);
                EventResponse::Handled
            }
            InputEvent::DragOver { position } => {
                let targets = self.drag_drop_listeners_at(position);
                self.deliver_until_handled(&targets, &Event::DragOver { position })
            }
            InputEvent::Drop { position, data } => {
                let targets = self.drag_drop_listeners_at(position);
                self.deliver_until_handled(&targets, &Event::Drop { position, data })
            }
        }
    }

    /// Give keyboard focus to `id`, sending focus events as needed.
    pub fn request_focus(&mut self, id: ViewId) -> Result<(), SceneError> {
        if !self.contains(id) {
            return Err(SceneError::StaleView(id));
        }
        let previous = self.input.focus.replace(id);
        if previous == Some(id) {
            return Ok(());
        }
        if let Some(previous) = previous {
            self.deliver(previous, &Event::FocusOut);
        }
        self.deliver(id, &Event::FocusIn);
        Ok(())
    }

    /// Take focus away from `id` if it has it.
    pub fn release_focus(&mut self, id: ViewId) {
        if self.input.focus == Some(id) {
            self.input.focus = None;
            self.deliver(id, &Event::FocusOut);
        }
    }

    pub fn focused(&self) -> Option<ViewId> {
        self.input.focus
    }

    pub fn hovered(&self) -> &[ViewId] {
        &self.input.hovered
    }

    pub fn mouse_capture(&self) -> Option<ViewId> {
        self.input.capture
    }

    fn live_capture(&mut self) -> Option<ViewId> {
        match self.input.capture {
            Some(capture) if self.contains(capture) => Some(capture),
            Some(_) => {
                self.set_capture(None);
                None
            }
            None => None,
        }
    }

    fn set_capture(&mut self, capture: Option<ViewId>) {
        if self.input.capture != capture {
            self.input.capture = capture;
            self.window.set_mouse_capture(capture.is_some());
        }
    }

    /// Send `event` to `id` with its position made local to the view.
    fn deliver(&mut self, id: ViewId, event: &Event) -> EventResponse {
        let event = match (event.position(), self.node(id)) {
            (Some(position), Some(node)) => {
                event.with_position(position - node.absolute_position())
            }
            (_, None) => return EventResponse::Ignored,
            (None, Some(_)) => event.clone(),
        };
        self.with_view_mut(id, |view, scene| view.event(scene, id, &event))
            .unwrap_or(EventResponse::Ignored)
    }

    fn deliver_until_handled(&mut self, targets: &[ViewId], event: &Event) -> EventResponse {
        for &target in targets {
            if self.deliver(target, event) == EventResponse::Handled {
                return EventResponse::Handled;
            }
        }
        EventResponse::Ignored
    }

    fn deliver_to_focus(&mut self, event: &Event) -> EventResponse {
        match self.input.focus {
            Some(focus) if self.contains(focus) => self.deliver(focus, event),
            _ => EventResponse::Ignored,
        }
    }

    /// Send leave/enter events for the difference between the old and new
    /// hover lists.
    fn update_hover(&mut self, targets: &[ViewId], position: Point) {
        let previous = std::mem::replace(&mut self.input.hovered, targets.to_vec());
        for &id in previous.iter().filter(|id| !targets.contains(id)) {
            self.deliver(id, &Event::MouseLeave);
        }
        for &id in targets.iter().filter(|id| !previous.contains(id)) {
            self.deliver(id, &Event::MouseEnter { position });
        }
    }

    fn update_cursor(&mut self, targets: &[ViewId]) {
        let cursor = targets
            .first()
            .and_then(|&id| self.node(id))
            .map(|node| node.view().cursor())
            .unwrap_or_default();
        if cursor != self.input.cursor {
            log::trace!("cursor {} -> {}", self.input.cursor, cursor);
            self.input.cursor = cursor;
            self.window.set_cursor(cursor);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::geometry::Rect;
    use crate::platform::HeadlessWindow;
    use crate::view::{EmptyView, View};

    type Log = Arc<Mutex<Vec<(String, Event)>>>;

    struct Listener {
        name: &'static str,
        log: Log,
        handles: bool,
        cursor: CursorIcon,
    }

    impl View for Listener {
        fn event(&mut self, _: &mut Scene, _: ViewId, event: &Event) -> EventResponse {
            self.log.lock().push((self.name.to_string(), event.clone()));
            if self.handles {
                EventResponse::Handled
            } else {
                EventResponse::Ignored
            }
        }

        fn cursor(&self) -> CursorIcon {
            self.cursor
        }
    }

    fn setup() -> (Scene, HeadlessWindow, Log) {
        let window = HeadlessWindow::new(Size::new(200.0, 200.0));
        let scene = Scene::new(Box::new(EmptyView), Box::new(window.clone()));
        (scene, window, Log::default())
    }

    fn listener(log: &Log, name: &'static str, handles: bool) -> Box<Listener> {
        Box::new(Listener {
            name,
            log: log.clone(),
            handles,
            cursor: CursorIcon::Pointer,
        })
    }

    fn names(log: &Log) -> Vec<String> {
        log.lock()
            .iter()
            .map(|(name, event)| match event {
                Event::MouseEnter { .. } => format!("{} enter", name),
                Event::MouseLeave => format!("{} leave", name),
                Event::MouseMove { .. } => format!("{} move", name),
                Event::MouseDown { .. } => format!("{} down", name),
                Event::MouseUp { .. } => format!("{} up", name),
                Event::FocusIn => format!("{} focus", name),
                Event::FocusOut => format!("{} blur", name),
                other => format!("{} {:?}", name, other),
            })
            .collect()
    }

    #[test]
    fn test_hover_enter_and_leave() {
        let (mut scene, window, log) = setup();
        let root = scene.root();
        scene
            .add_view(listener(&log, "a", false), Some(root), Rect::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();

        scene.dispatch_input(InputEvent::MouseMove {
            position: Point::new(10.0, 10.0),
        });
        assert_eq!(window.state().cursor, CursorIcon::Pointer);
        scene.dispatch_input(InputEvent::MouseMove {
            position: Point::new(100.0, 100.0),
        });
        assert_eq!(window.state().cursor, CursorIcon::Default);

        assert_eq!(names(&log), vec!["a enter", "a move", "a leave"]);
    }

    #[test]
    fn test_positions_are_local() {
        let (mut scene, _window, log) = setup();
        let root = scene.root();
        scene
            .add_view(listener(&log, "a", true), Some(root), Rect::new(20.0, 30.0, 80.0, 80.0))
            .unwrap();

        scene.dispatch_input(InputEvent::MouseDown {
            position: Point::new(25.0, 35.0),
            button: MouseButton::Left,
        });

        let events = log.lock().clone();
        assert_eq!(
            events.last().map(|(_, event)| event.clone()),
            Some(Event::MouseDown {
                position: Point::new(5.0, 5.0),
                button: MouseButton::Left
            })
        );
    }

    #[test]
    fn test_mouse_down_captures_pointer() {
        let (mut scene, window, log) = setup();
        let root = scene.root();
        let a = scene
            .add_view(listener(&log, "a", true), Some(root), Rect::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();

        scene.dispatch_input(InputEvent::MouseDown {
            position: Point::new(10.0, 10.0),
            button: MouseButton::Left,
        });
        assert_eq!(scene.mouse_capture(), Some(a));
        assert!(window.state().mouse_captured);

        // Moves outside the view still reach it while captured
        log.lock().clear();
        scene.dispatch_input(InputEvent::MouseMove {
            position: Point::new(150.0, 150.0),
        });
        scene.dispatch_input(InputEvent::MouseUp {
            position: Point::new(150.0, 150.0),
            button: MouseButton::Left,
        });
        assert_eq!(names(&log), vec!["a move", "a up", "a leave"]);
        assert_eq!(scene.mouse_capture(), None);
        assert!(!window.state().mouse_captured);
    }

    #[test]
    fn test_unhandled_events_fall_through() {
        let (mut scene, _window, log) = setup();
        let root = scene.root();
        let below = scene
            .add_view(listener(&log, "below", true), Some(root), Rect::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        let above = scene
            .add_view(listener(&log, "above", false), Some(root), Rect::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        scene.set_overlay(above, true).unwrap();

        let response = scene.dispatch_input(InputEvent::Scroll {
            position: Point::new(10.0, 10.0),
            delta_x: 0.0,
            delta_y: 3.0,
            source: ScrollSource::Wheel,
        });
        assert_eq!(response, EventResponse::Handled);
        assert_eq!(scene.mouse_listeners_at(Point::new(10.0, 10.0)), vec![above, below]);
        assert_eq!(log.lock().len(), 2);
    }

    #[test]
    fn test_keys_go_to_focus() {
        let (mut scene, _window, log) = setup();
        let root = scene.root();
        let a = scene
            .add_view(listener(&log, "a", true), Some(root), Rect::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        let b = scene
            .add_view(listener(&log, "b", true), Some(root), Rect::new(50.0, 0.0, 100.0, 50.0))
            .unwrap();

        let key = InputEvent::KeyDown {
            key: Key::Enter,
            modifiers: Modifiers::default(),
        };
        assert_eq!(scene.dispatch_input(key.clone()), EventResponse::Ignored);

        scene.request_focus(a).unwrap();
        scene.request_focus(b).unwrap();
        assert_eq!(scene.dispatch_input(key), EventResponse::Handled);
        scene.release_focus(b);

        assert_eq!(
            names(&log),
            vec![
                "a focus".to_string(),
                "a blur".to_string(),
                "b focus".to_string(),
                format!("b {:?}", Event::KeyDown { key: Key::Enter, modifiers: Modifiers::default() }),
                "b blur".to_string(),
            ]
        );
        assert_eq!(scene.focused(), None);
    }

    #[test]
    fn test_destroy_clears_focus_and_hover() {
        let (mut scene, _window, log) = setup();
        let root = scene.root();
        let a = scene
            .add_view(listener(&log, "a", false), Some(root), Rect::new(0.0, 0.0, 50.0, 50.0))
            .unwrap();
        scene.dispatch_input(InputEvent::MouseMove {
            position: Point::new(10.0, 10.0),
        });
        scene.request_focus(a).unwrap();
        assert_eq!(scene.hovered(), &[a]);

        scene.destroy(a).unwrap();
        assert!(scene.hovered().is_empty());
        assert_eq!(scene.focused(), None);
    }

    #[test]
    fn test_resize_event() {
        let (mut scene, _window, _log) = setup();
        scene.take_pending();
        scene.dispatch_input(InputEvent::Resized {
            size: Size::new(300.0, 100.0),
        });
        assert_eq!(scene.pending(), &[Rect::new(0.0, 0.0, 300.0, 100.0)]);
    }
}
