//! Pointer hit testing over the view tree.
//!
//! Children are stored in ascending elevation order, so every walk here
//! visits them back to front: the first hit child is the topmost one.

use crate::geometry::Point;
use crate::tree::{Node, Tree, ViewFlags, ViewId};

/// Whether `point` (in the parent's coordinates) hits `node`.
fn hits(node: &Node, point: Point) -> bool {
    if !node.is_visible() {
        return false;
    }
    let local = point - node.bounds().top_left();
    node.view().hit_test(local, &node.local_shape())
}

/// The topmost view under `point` (root coordinates).
///
/// Descends into the highest hit child at each level and stops at the
/// first node where no child is hit. Returns `None` only when the root
/// itself is not hit.
pub fn view_at(tree: &Tree, root: ViewId, point: Point) -> Option<ViewId> {
    let root_node = tree.node(root)?;
    let parent_origin = root_node.absolute_position() - root_node.bounds().top_left();
    let mut local = point - parent_origin;
    if !hits(root_node, local) {
        return None;
    }

    let mut current = root;
    local = local - root_node.bounds().top_left();
    loop {
        let node = tree.node(current)?;
        let next = node.children().iter().rev().copied().find(|&child| {
            tree.node(child)
                .is_some_and(|child_node| hits(child_node, local))
        });
        match next {
            Some(child) => {
                let child_node = tree.node(child)?;
                local = local - child_node.bounds().top_left();
                current = child;
            }
            None => return Some(current),
        }
    }
}

/// Views that should receive a pointer event at `point`, topmost first.
pub fn mouse_listeners_at(tree: &Tree, root: ViewId, point: Point) -> Vec<ViewId> {
    listeners_at(tree, root, point, ViewFlags::ACCEPTS_MOUSE)
}

/// Views that should receive a drag-and-drop event at `point`, topmost first.
pub fn drag_drop_listeners_at(tree: &Tree, root: ViewId, point: Point) -> Vec<ViewId> {
    listeners_at(tree, root, point, ViewFlags::ACCEPTS_DRAG_DROP)
}

fn listeners_at(tree: &Tree, root: ViewId, point: Point, flag: ViewFlags) -> Vec<ViewId> {
    let mut targets = Vec::new();
    let Some(root_node) = tree.node(root) else {
        return targets;
    };
    let parent_origin = root_node.absolute_position() - root_node.bounds().top_left();
    let local = point - parent_origin;
    if hits(root_node, local) {
        collect(tree, root, local - root_node.bounds().top_left(), flag, &mut targets);
    }
    log::trace!("listeners at {:?}: {:?}", point, targets);
    targets
}

/// Collect targets inside a node that is already known to be hit.
///
/// `local` is relative to the node. Returns true when the node lets the
/// walk continue to its lower siblings.
fn collect(
    tree: &Tree,
    id: ViewId,
    local: Point,
    flag: ViewFlags,
    targets: &mut Vec<ViewId>,
) -> bool {
    let Some(node) = tree.node(id) else {
        return true;
    };

    let mut blocked = false;
    for &child in node.children().iter().rev() {
        let Some(child_node) = tree.node(child) else {
            continue;
        };
        if !hits(child_node, local) {
            continue;
        }
        let child_local = local - child_node.bounds().top_left();
        if !collect(tree, child, child_local, flag, targets) {
            blocked = true;
            break;
        }
    }

    if !blocked && node.flags().contains(flag) {
        targets.push(id);
    }

    node.is_overlay()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corners::Corners;
    use crate::geometry::Rect;
    use crate::view::EmptyView;

    fn add(tree: &mut Tree, parent: Option<ViewId>, rect: Rect) -> ViewId {
        let id = tree.insert(Box::new(EmptyView), rect);
        if let Some(parent) = parent {
            tree.attach(id, parent).unwrap();
        }
        id
    }

    #[test]
    fn test_view_at_picks_topmost() {
        let mut tree = Tree::new();
        let root = add(&mut tree, None, Rect::new(0.0, 0.0, 100.0, 100.0));
        let below = add(&mut tree, Some(root), Rect::new(0.0, 0.0, 60.0, 60.0));
        let above = add(&mut tree, Some(root), Rect::new(40.0, 40.0, 100.0, 100.0));

        assert_eq!(view_at(&tree, root, Point::new(50.0, 50.0)), Some(above));
        assert_eq!(view_at(&tree, root, Point::new(10.0, 10.0)), Some(below));
        assert_eq!(view_at(&tree, root, Point::new(90.0, 10.0)), Some(root));
        assert_eq!(view_at(&tree, root, Point::new(150.0, 10.0)), None);

        // Raising the lower view flips the result
        tree.set_elevation(below, 2.0).unwrap();
        assert_eq!(view_at(&tree, root, Point::new(50.0, 50.0)), Some(below));
    }

    #[test]
    fn test_view_at_descends_with_local_coordinates() {
        let mut tree = Tree::new();
        let root = add(&mut tree, None, Rect::new(0.0, 0.0, 200.0, 200.0));
        let panel = add(&mut tree, Some(root), Rect::new(100.0, 100.0, 200.0, 200.0));
        let button = add(&mut tree, Some(panel), Rect::new(10.0, 10.0, 30.0, 30.0));

        assert_eq!(view_at(&tree, root, Point::new(115.0, 115.0)), Some(button));
        assert_eq!(view_at(&tree, root, Point::new(15.0, 15.0)), Some(root));
    }

    #[test]
    fn test_view_at_skips_invisible_and_corners() {
        let mut tree = Tree::new();
        let root = add(&mut tree, None, Rect::new(0.0, 0.0, 100.0, 100.0));
        let round = add(&mut tree, Some(root), Rect::new(0.0, 0.0, 40.0, 40.0));
        tree.set_corners(round, Corners::round(20.0)).unwrap();
        let hidden = add(&mut tree, Some(root), Rect::new(50.0, 50.0, 100.0, 100.0));
        tree.set_flags(hidden, ViewFlags::ACCEPTS_MOUSE).unwrap();

        // Outside the rounded corner, inside the bounding box
        assert_eq!(view_at(&tree, root, Point::new(1.0, 1.0)), Some(root));
        assert_eq!(view_at(&tree, root, Point::new(20.0, 20.0)), Some(round));
        assert_eq!(view_at(&tree, root, Point::new(75.0, 75.0)), Some(root));
    }

    #[test]
    fn test_listeners_stop_at_first_blocking_view() {
        let mut tree = Tree::new();
        let root = add(&mut tree, None, Rect::new(0.0, 0.0, 100.0, 100.0));
        let below = add(&mut tree, Some(root), Rect::new(0.0, 0.0, 100.0, 100.0));
        let above = add(&mut tree, Some(root), Rect::new(0.0, 0.0, 100.0, 100.0));

        let targets = mouse_listeners_at(&tree, root, Point::new(50.0, 50.0));
        assert_eq!(targets, vec![above]);
        assert!(!targets.contains(&below));
    }

    #[test]
    fn test_listeners_pass_through_overlay() {
        let mut tree = Tree::new();
        let root = add(&mut tree, None, Rect::new(0.0, 0.0, 100.0, 100.0));
        let sibling = add(&mut tree, Some(root), Rect::new(0.0, 0.0, 100.0, 100.0));
        let overlay = add(&mut tree, Some(root), Rect::new(0.0, 0.0, 100.0, 100.0));
        tree.set_flags(overlay, ViewFlags::VISIBLE | ViewFlags::OVERLAY)
            .unwrap();
        let child = add(&mut tree, Some(overlay), Rect::new(0.0, 0.0, 50.0, 50.0));

        assert_eq!(
            mouse_listeners_at(&tree, root, Point::new(10.0, 10.0)),
            vec![child, sibling]
        );
        // Outside the overlay's child, the overlay itself does not listen
        assert_eq!(
            mouse_listeners_at(&tree, root, Point::new(80.0, 80.0)),
            vec![sibling]
        );
    }

    #[test]
    fn test_drag_drop_listeners_use_their_own_flag() {
        let mut tree = Tree::new();
        let root = add(&mut tree, None, Rect::new(0.0, 0.0, 100.0, 100.0));
        let target = add(&mut tree, Some(root), Rect::new(0.0, 0.0, 50.0, 50.0));
        tree.set_flags(target, ViewFlags::VISIBLE | ViewFlags::ACCEPTS_DRAG_DROP)
            .unwrap();

        assert_eq!(
            drag_drop_listeners_at(&tree, root, Point::new(10.0, 10.0)),
            vec![target]
        );
        assert_eq!(
            mouse_listeners_at(&tree, root, Point::new(10.0, 10.0)),
            Vec::<ViewId>::new()
        );
    }
}
