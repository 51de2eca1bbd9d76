//! Corner descriptors and corner-aware hit testing.
//!
//! Every view carries four independent [`Corner`]s. A corner is either a
//! quarter ellipse ([`CornerKind::Round`]) or a diagonal chamfer
//! ([`CornerKind::Cut`]), with separate horizontal and vertical sizes.
//!
//! All tests reduce to two primitives evaluated in corner-local coordinates,
//! where `u` is the distance from the corner's vertical edge and `v` the
//! distance from its horizontal edge:
//!
//! - round: `(cx - u)^2 + ((cy - v) * cx / cy)^2` against `cx^2`
//! - cut: `u / cx + v / cy` against `1`
//!
//! Corner sizes are clamped to half of the shape's width and height, so the
//! four corner boxes never overlap.

use crate::geometry::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CornerKind {
    /// Quarter-ellipse corner
    #[default]
    Round,
    /// Straight chamfer from one edge to the other
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corner {
    pub kind: CornerKind,
    /// Horizontal extent of the corner
    pub x: f32,
    /// Vertical extent of the corner
    pub y: f32,
}

impl Corner {
    pub const NONE: Corner = Corner {
        kind: CornerKind::Round,
        x: 0.0,
        y: 0.0,
    };

    pub const fn round(radius: f32) -> Self {
        Self::round_xy(radius, radius)
    }

    pub const fn round_xy(x: f32, y: f32) -> Self {
        Self {
            kind: CornerKind::Round,
            x,
            y,
        }
    }

    pub const fn cut(size: f32) -> Self {
        Self::cut_xy(size, size)
    }

    pub const fn cut_xy(x: f32, y: f32) -> Self {
        Self {
            kind: CornerKind::Cut,
            x,
            y,
        }
    }

    /// A corner with no extent in either direction is a plain right angle.
    pub fn is_square(&self) -> bool {
        self.x <= 0.0 || self.y <= 0.0
    }

    fn clamped(&self, size: Size) -> (f32, f32) {
        (
            self.x.min(size.width / 2.0).max(0.0),
            self.y.min(size.height / 2.0).max(0.0),
        )
    }

    /// Signed inside measure: positive inside the shape, zero on the curve or
    /// chamfer line, negative in the cut-away part of the corner box.
    fn measure(&self, u: f32, v: f32, cx: f32, cy: f32) -> f32 {
        match self.kind {
            CornerKind::Round => {
                let dx = cx - u;
                let dy = (cy - v) * cx / cy;
                cx * cx - (dx * dx + dy * dy)
            }
            CornerKind::Cut => u / cx + v / cy - 1.0,
        }
    }

    fn admits_point(&self, measure: f32) -> bool {
        match self.kind {
            CornerKind::Round => measure > 0.0,
            CornerKind::Cut => measure >= 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CornerPosition {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
}

impl CornerPosition {
    /// Distances of `p` from the two edges meeting at this corner of `rect`.
    fn distances(self, rect: &Rect, p: Point) -> (f32, f32) {
        match self {
            CornerPosition::TopLeft => (p.x - rect.left, p.y - rect.top),
            CornerPosition::TopRight => (rect.right - p.x, p.y - rect.top),
            CornerPosition::BottomRight => (rect.right - p.x, rect.bottom - p.y),
            CornerPosition::BottomLeft => (p.x - rect.left, rect.bottom - p.y),
        }
    }

    /// The vertex of `rect` lying at this corner.
    fn vertex(self, rect: &Rect) -> Point {
        match self {
            CornerPosition::TopLeft => Point::new(rect.left, rect.top),
            CornerPosition::TopRight => Point::new(rect.right, rect.top),
            CornerPosition::BottomRight => Point::new(rect.right, rect.bottom),
            CornerPosition::BottomLeft => Point::new(rect.left, rect.bottom),
        }
    }

    /// The vertex of `rect` diagonally opposite this corner.
    fn opposite_vertex(self, rect: &Rect) -> Point {
        match self {
            CornerPosition::TopLeft => CornerPosition::BottomRight.vertex(rect),
            CornerPosition::TopRight => CornerPosition::BottomLeft.vertex(rect),
            CornerPosition::BottomRight => CornerPosition::TopLeft.vertex(rect),
            CornerPosition::BottomLeft => CornerPosition::TopRight.vertex(rect),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Corners {
    pub top_left: Corner,
    pub top_right: Corner,
    pub bottom_right: Corner,
    pub bottom_left: Corner,
}

impl Corners {
    pub const NONE: Corners = Corners::all(Corner::NONE);

    pub const fn all(corner: Corner) -> Self {
        Self {
            top_left: corner,
            top_right: corner,
            bottom_right: corner,
            bottom_left: corner,
        }
    }

    pub const fn round(radius: f32) -> Self {
        Self::all(Corner::round(radius))
    }

    pub const fn cut(size: f32) -> Self {
        Self::all(Corner::cut(size))
    }

    /// True when every corner is square, i.e. the shape is a plain rectangle.
    pub fn is_rect(&self) -> bool {
        self.iter().all(|(_, corner)| corner.is_square())
    }

    /// The largest corner extent in either direction.
    pub fn max_extent(&self) -> f32 {
        self.iter()
            .map(|(_, corner)| corner.x.max(corner.y))
            .fold(0.0, f32::max)
    }

    fn iter(&self) -> impl Iterator<Item = (CornerPosition, &Corner)> {
        [
            (CornerPosition::TopLeft, &self.top_left),
            (CornerPosition::TopRight, &self.top_right),
            (CornerPosition::BottomRight, &self.bottom_right),
            (CornerPosition::BottomLeft, &self.bottom_left),
        ]
        .into_iter()
    }
}

/// A rectangle with corner descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Shape {
    pub rect: Rect,
    pub corners: Corners,
}

impl Shape {
    pub fn new(rect: Rect, corners: Corners) -> Self {
        Self { rect, corners }
    }

    pub fn rect(rect: Rect) -> Self {
        Self::new(rect, Corners::NONE)
    }

    pub fn translate(&self, by: Point) -> Self {
        Self::new(self.rect.translate(by), self.corners)
    }

    /// Corner-aware point containment.
    pub fn contains(&self, point: Point) -> bool {
        if !self.rect.contains(point) {
            return false;
        }
        if self.corners.is_rect() {
            return true;
        }

        let size = self.rect.size();
        for (position, corner) in self.corners.iter() {
            if corner.is_square() {
                continue;
            }
            let (cx, cy) = corner.clamped(size);
            let (u, v) = position.distances(&self.rect, point);
            if u < cx && v < cy {
                return corner.admits_point(corner.measure(u, v, cx, cy));
            }
        }

        true
    }

    /// Whether `other` lies entirely inside this shape.
    ///
    /// The shape is convex, so it is enough to test each vertex of `other`
    /// against the corner it points into.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if !self.rect.contains_rect(other) {
            return false;
        }
        if self.corners.is_rect() {
            return true;
        }

        let size = self.rect.size();
        self.corners.iter().all(|(position, corner)| {
            if corner.is_square() {
                return true;
            }
            let (cx, cy) = corner.clamped(size);
            let (u, v) = position.distances(&self.rect, position.vertex(other));
            !(u < cx && v < cy) || corner.measure(u, v, cx, cy) >= 0.0
        })
    }

    /// Whether this shape and `other` share a region of positive area.
    ///
    /// Only a corner whose box holds the whole overlap can separate the two;
    /// in that case the overlap's innermost vertex decides.
    pub fn intersects_rect(&self, other: &Rect) -> bool {
        if !self.rect.intersects(other) {
            return false;
        }
        if self.corners.is_rect() {
            return true;
        }

        let size = self.rect.size();
        let overlap = self.rect.intersection(other);
        for (position, corner) in self.corners.iter() {
            if corner.is_square() {
                continue;
            }
            let (cx, cy) = corner.clamped(size);
            let (u, v) = position.distances(&self.rect, position.opposite_vertex(&overlap));
            if u <= cx && v <= cy {
                return corner.measure(u, v, cx, cy) > 0.0;
            }
        }

        true
    }
}
