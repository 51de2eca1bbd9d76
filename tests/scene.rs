//! End-to-end scenarios through the public scene and compositor API.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use veneer::invalidation::InvalidationTracker;
use veneer::prelude::*;
use veneer::renderer::{composite, DrawCommand};

fn scene(width: f32, height: f32) -> Scene {
    let window = HeadlessWindow::new(Size::new(width, height));
    Scene::new(Box::new(EmptyView), Box::new(window))
}

fn add(scene: &mut Scene, rect: Rect, elevation: f32) -> ViewId {
    let root = scene.root();
    let id = scene.add_view(Box::new(EmptyView), Some(root), rect).unwrap();
    scene.set_elevation(id, elevation).unwrap();
    id
}

/// Records every event it receives and handles mouse presses.
struct Clicker {
    events: Arc<Mutex<Vec<Event>>>,
}

impl View for Clicker {
    fn event(&mut self, _: &mut Scene, _: ViewId, event: &Event) -> EventResponse {
        self.events.lock().push(event.clone());
        match event {
            Event::MouseDown { .. } | Event::MouseUp { .. } => EventResponse::Handled,
            _ => EventResponse::Ignored,
        }
    }
}

/// Plays one animation and records each value it produces.
struct Fader {
    animation: Animation,
    values: Arc<Mutex<Vec<f32>>>,
}

impl View for Fader {
    fn update(&mut self, scene: &mut Scene, id: ViewId, now: Instant) -> UpdateResponse {
        let value = self.animation.tick_at(now);
        self.values.lock().push(value);
        scene.invalidate_view(id);
        if self.animation.is_running() {
            UpdateResponse::Continue
        } else {
            UpdateResponse::Done
        }
    }
}

/// Counts animation passes until told to stop.
struct Ticker {
    ticks: Arc<AtomicUsize>,
    limit: usize,
}

impl View for Ticker {
    fn update(&mut self, scene: &mut Scene, id: ViewId, _: Instant) -> UpdateResponse {
        let ticks = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        scene.invalidate_view(id);
        if ticks < self.limit {
            UpdateResponse::Continue
        } else {
            UpdateResponse::Done
        }
    }
}

#[test]
fn test_topmost_view_and_merged_invalidation() {
    let mut scene = scene(800.0, 600.0);
    let a = add(&mut scene, Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
    let b = add(&mut scene, Rect::new(50.0, 50.0, 150.0, 150.0), 1.0);

    assert_eq!(scene.view_at(Point::new(75.0, 75.0)), Some(b));
    assert_eq!(scene.view_at(Point::new(25.0, 25.0)), Some(a));
    assert_eq!(scene.view_at(Point::new(400.0, 400.0)), Some(scene.root()));

    scene.take_pending();
    scene.invalidate(Rect::new(0.0, 0.0, 100.0, 100.0));
    scene.invalidate(Rect::new(50.0, 50.0, 150.0, 150.0));
    assert_eq!(scene.pending(), &[Rect::new(0.0, 0.0, 150.0, 150.0)]);
}

#[test]
fn test_bridging_rect_merges_disjoint_entries() {
    let mut tracker = InvalidationTracker::new(Rect::new(0.0, 0.0, 100.0, 100.0));
    tracker.invalidate(Rect::new(0.0, 0.0, 10.0, 10.0));
    tracker.invalidate(Rect::new(20.0, 0.0, 30.0, 10.0));
    assert_eq!(tracker.pending().len(), 2);

    tracker.invalidate(Rect::new(5.0, 2.0, 25.0, 8.0));
    assert_eq!(tracker.pending(), &[Rect::new(0.0, 0.0, 30.0, 10.0)]);
}

#[test]
fn test_overlay_container_passes_input_through() {
    let mut scene = scene(200.0, 200.0);
    let sibling = add(&mut scene, Rect::new(0.0, 0.0, 100.0, 100.0), 0.0);
    let container = add(&mut scene, Rect::new(0.0, 0.0, 100.0, 100.0), 2.0);
    scene.set_overlay(container, true).unwrap();
    scene.set_accepts_mouse(container, false).unwrap();
    let child = scene
        .add_view(
            Box::new(EmptyView),
            Some(container),
            Rect::new(0.0, 0.0, 100.0, 100.0),
        )
        .unwrap();

    assert_eq!(
        scene.mouse_listeners_at(Point::new(50.0, 50.0)),
        vec![child, sibling]
    );
    // The topmost view is still the overlay's child
    assert_eq!(scene.view_at(Point::new(50.0, 50.0)), Some(child));

    // Without the overlay flag the container blocks the sibling
    scene.set_overlay(container, false).unwrap();
    assert_eq!(scene.mouse_listeners_at(Point::new(50.0, 50.0)), vec![child]);
}

#[test]
fn test_pointer_routing_and_capture() {
    let mut scene = scene(400.0, 400.0);
    let root = scene.root();
    let events = Arc::new(Mutex::new(Vec::new()));
    let clicker = scene
        .add_view(
            Box::new(Clicker {
                events: Arc::clone(&events),
            }),
            Some(root),
            Rect::new(50.0, 50.0, 150.0, 150.0),
        )
        .unwrap();

    let down = InputEvent::MouseDown {
        position: Point::new(60.0, 70.0),
        button: MouseButton::Left,
    };
    assert_eq!(scene.dispatch_input(down), EventResponse::Handled);
    assert_eq!(scene.mouse_capture(), Some(clicker));

    // While captured, moves far outside still reach the clicker
    scene.dispatch_input(InputEvent::MouseMove {
        position: Point::new(300.0, 300.0),
    });
    scene.dispatch_input(InputEvent::MouseUp {
        position: Point::new(300.0, 300.0),
        button: MouseButton::Left,
    });
    assert_eq!(scene.mouse_capture(), None);

    let events = events.lock();
    assert!(events.contains(&Event::MouseDown {
        position: Point::new(10.0, 20.0),
        button: MouseButton::Left,
    }));
    assert!(events.contains(&Event::MouseMove {
        position: Point::new(250.0, 250.0),
    }));
    assert!(events.contains(&Event::MouseUp {
        position: Point::new(250.0, 250.0),
        button: MouseButton::Left,
    }));
}

#[test]
fn test_composite_draws_shadow_and_restores_origin() {
    let mut scene = scene(200.0, 200.0);
    let root = scene.root();
    let panel = scene
        .add_view(
            Box::new(FillView::new(keys::ACCENT)),
            Some(root),
            Rect::new(20.0, 20.0, 120.0, 120.0),
        )
        .unwrap();
    scene.set_elevation(panel, 4.0).unwrap();
    scene.set_corners(panel, Corners::round(8.0)).unwrap();

    let mut ctx = RecordingContext::new();
    let stats = composite(&mut scene, &mut ctx);
    assert_eq!(stats.rects, 1);
    assert_eq!(stats.views_drawn, 2);
    assert_eq!(stats.shadows_drawn, 1);
    assert_eq!(ctx.origin(), Point::ZERO);

    let commands = ctx.take_commands();
    assert_eq!(commands.first(), Some(&DrawCommand::BeginFrame));
    assert_eq!(commands.last(), Some(&DrawCommand::EndFrame));
    assert!(commands.contains(&DrawCommand::CreateShadow {
        id: 1,
        size: Size::new(100.0, 100.0),
        blur: 4.0,
    }));
    assert!(commands.contains(&DrawCommand::Shadow {
        id: 1,
        rect: Rect::new(16.0, 18.0, 124.0, 126.0),
        origin: Point::ZERO,
    }));

    let shape = Shape::new(Rect::new(0.0, 0.0, 100.0, 100.0), Corners::round(8.0));
    assert!(commands.contains(&DrawCommand::PushClip {
        clip: ClipShape::Shape(shape),
        origin: Point::new(20.0, 20.0),
    }));
    assert!(commands.contains(&DrawCommand::Fill {
        shape,
        color: Theme::standard().color(keys::ACCENT),
        origin: Point::new(20.0, 20.0),
    }));

    let pushes = commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::PushClip { .. }))
        .count();
    let pops = commands
        .iter()
        .filter(|command| matches!(command, DrawCommand::PopClip))
        .count();
    assert_eq!(pushes, pops);

    // The shadow image is reused while its parameters stay the same
    scene.invalidate_view(panel);
    composite(&mut scene, &mut ctx);
    let commands = ctx.take_commands();
    assert!(commands.contains(&DrawCommand::Shadow {
        id: 1,
        rect: Rect::new(16.0, 18.0, 124.0, 126.0),
        origin: Point::ZERO,
    }));
    assert!(!commands
        .iter()
        .any(|command| matches!(command, DrawCommand::CreateShadow { .. })));
}

#[test]
fn test_composite_skips_views_outside_dirty_rect() {
    let mut scene = scene(400.0, 400.0);
    let root = scene.root();
    scene
        .add_view(
            Box::new(FillView::new(keys::ACCENT)),
            Some(root),
            Rect::new(0.0, 0.0, 50.0, 50.0),
        )
        .unwrap();
    let far = scene
        .add_view(
            Box::new(FillView::new(keys::FOREGROUND)),
            Some(root),
            Rect::new(300.0, 300.0, 350.0, 350.0),
        )
        .unwrap();

    scene.take_pending();
    scene.invalidate_view(far);
    let mut ctx = RecordingContext::new();
    let stats = composite(&mut scene, &mut ctx);

    // Root and the far view only
    assert_eq!(stats.views_drawn, 2);
    let fills: Vec<_> = ctx
        .commands()
        .into_iter()
        .filter(|command| matches!(command, DrawCommand::Fill { .. }))
        .collect();
    assert_eq!(fills.len(), 1);
}

#[test]
fn test_animation_passes_follow_the_frame_clock() {
    let mut scene = scene(100.0, 100.0);
    let root = scene.root();
    let start = Instant::now();
    let values = Arc::new(Mutex::new(Vec::new()));

    let mut animation = Animation::new(Duration::from_millis(100), Easing::Linear);
    animation.play_at(start);
    let fader = scene
        .add_view(
            Box::new(Fader {
                animation,
                values: Arc::clone(&values),
            }),
            Some(root),
            Rect::new(0.0, 0.0, 10.0, 10.0),
        )
        .unwrap();
    assert!(scene.queue_animation_update(fader));
    assert!(!scene.queue_animation_update(fader));

    for ms in [0, 50, 100, 150] {
        scene.run_animation_pass(start + Duration::from_millis(ms));
    }

    let values = values.lock();
    assert_eq!(values.len(), 3);
    assert_eq!(values[0], 0.0);
    assert!((values[1] - 0.5).abs() < 1e-3);
    assert_eq!(values[2], 1.0);
    assert!(!scene.is_animating(fader));
}

#[test]
fn test_destroyed_view_leaves_every_queue() {
    let mut scene = scene(100.0, 100.0);
    let root = scene.root();
    let ticks = Arc::new(AtomicUsize::new(0));
    let ticker = scene
        .add_view(
            Box::new(Ticker {
                ticks: Arc::clone(&ticks),
                limit: usize::MAX,
            }),
            Some(root),
            Rect::new(0.0, 0.0, 10.0, 10.0),
        )
        .unwrap();
    scene.queue_animation_update(ticker);
    scene.request_focus(ticker).unwrap();

    scene.destroy(ticker).unwrap();
    assert!(!scene.contains(ticker));
    assert_eq!(scene.focused(), None);
    assert_eq!(scene.run_animation_pass(Instant::now()), 0);
    assert_eq!(ticks.load(Ordering::SeqCst), 0);
    assert_eq!(scene.set_elevation(ticker, 1.0), Err(SceneError::StaleView(ticker)));
}

#[test]
fn test_compositor_thread_animates_and_closes() {
    let ctx = RecordingContext::new();
    let log = ctx.log();
    let mut compositor = Compositor::new()
        .frame_interval(Duration::from_millis(1))
        .initial_size(Size::new(200.0, 200.0))
        .start_headless(Box::new(EmptyView), Box::new(ctx))
        .unwrap();
    assert!(compositor.is_running());

    let ticks = Arc::new(AtomicUsize::new(0));
    let events = Arc::new(Mutex::new(Vec::new()));
    compositor
        .with_scene(|scene| {
            let root = scene.root();
            let ticker = scene.add_view(
                Box::new(Ticker {
                    ticks: Arc::clone(&ticks),
                    limit: 3,
                }),
                Some(root),
                Rect::new(0.0, 0.0, 20.0, 20.0),
            )?;
            scene.queue_animation_update(ticker);
            scene.add_view(
                Box::new(Clicker {
                    events: Arc::clone(&events),
                }),
                Some(root),
                Rect::new(100.0, 100.0, 200.0, 200.0),
            )
        })
        .unwrap();

    let response = compositor.handle_input(InputEvent::MouseDown {
        position: Point::new(150.0, 150.0),
        button: MouseButton::Left,
    });
    assert_eq!(response, EventResponse::Handled);
    assert!(events.lock().contains(&Event::MouseDown {
        position: Point::new(50.0, 50.0),
        button: MouseButton::Left,
    }));

    let deadline = Instant::now() + Duration::from_secs(5);
    while ticks.load(Ordering::SeqCst) < 3 {
        assert!(Instant::now() < deadline, "animation never finished");
        thread::sleep(Duration::from_millis(1));
    }
    while !log.lock().contains(&DrawCommand::EndFrame) {
        assert!(Instant::now() < deadline, "no frame drawn");
        thread::sleep(Duration::from_millis(1));
    }

    compositor.close();
    assert!(!compositor.is_running());
    assert_eq!(ticks.load(Ordering::SeqCst), 3);
    assert!(!compositor.lock().borrow().scene.has_animations());
}
