//! Pure geometry shared by the layout and render passes.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Axis-aligned rectangle stored as its two corners (`x0 <= x1`, `y0 <= y1`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    pub fn from_origin_size(origin: Point, width: f32, height: f32) -> Self {
        Self::new(origin.x, origin.y, origin.x + width, origin.y + height)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x0, self.y0)
    }

    /// Open-interval containment: points on the border are outside.
    pub fn strictly_contains(&self, p: Point) -> bool {
        self.x0 < p.x && p.x < self.x1 && self.y0 < p.y && p.y < self.y1
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && self.x1 > other.x0 && self.y0 < other.y1 && self.y1 > other.y0
    }
}

/// Shaft and head of a directed arrow in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowGeometry {
    /// Start of the shaft.
    pub tail: Point,
    /// Where the shaft meets the head; equals `tip` when there is no head.
    pub shaft_end: Point,
    pub tip: Point,
    /// Filled triangle `[tip, left wing, right wing]`.
    pub head: Option<[Point; 3]>,
}

/// Builds an arrow from `from` to `to`, pulling both ends in by `inset`.
///
/// The inset is skipped when the points are closer than `2 * inset`, so short
/// hops still get a visible shaft. Coincident points yield no head.
pub fn arrow_geometry(
    from: Point,
    to: Point,
    inset: f32,
    head_length: f32,
    head_angle_deg: f32,
) -> ArrowGeometry {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    let len = dx.hypot(dy);
    if len <= f32::EPSILON {
        return ArrowGeometry {
            tail: from,
            shaft_end: to,
            tip: to,
            head: None,
        };
    }
    let (ux, uy) = (dx / len, dy / len);
    let inset = if inset > 0.0 && len > inset * 2.0 { inset } else { 0.0 };
    let tail = from.offset(ux * inset, uy * inset);
    let tip = to.offset(-ux * inset, -uy * inset);

    let head = arrow_head(tail, tip, head_length, head_angle_deg);
    let shaft_end = match head {
        Some(_) => {
            let back = head_length * head_angle_deg.to_radians().cos();
            let remaining = tail.distance(tip);
            let back = back.min(remaining);
            tip.offset(-ux * back, -uy * back)
        }
        None => tip,
    };

    ArrowGeometry {
        tail,
        shaft_end,
        tip,
        head,
    }
}

/// Arrowhead triangle at `tip`: the reversed direction vector rotated by
/// `±angle_deg` and scaled to `length`.
pub fn arrow_head(tail: Point, tip: Point, length: f32, angle_deg: f32) -> Option<[Point; 3]> {
    let dx = tail.x - tip.x;
    let dy = tail.y - tip.y;
    let len = dx.hypot(dy);
    if len <= f32::EPSILON || length <= 0.0 {
        return None;
    }
    let (bx, by) = (dx / len, dy / len);
    let angle = angle_deg.to_radians();
    let (sin, cos) = angle.sin_cos();
    let left = Point::new(
        tip.x + (bx * cos - by * sin) * length,
        tip.y + (bx * sin + by * cos) * length,
    );
    let right = Point::new(
        tip.x + (bx * cos + by * sin) * length,
        tip.y + (-bx * sin + by * cos) * length,
    );
    Some([tip, left, right])
}
