use serde::{Deserialize, Serialize};

// ============================================================================
// Core geometry types
// ============================================================================
//
// Every value lives in exactly one coordinate space (global screen,
// window-relative, screenshot pixels, or display pixels), but the space is
// never carried on the value itself. Callers keep track and convert through
// `geometry::transform`; mixing spaces without a transform is a bug.

/// A 2D point. Which space it lives in is determined by context.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Point {
    fn from(pair: [f64; 2]) -> Self {
        Self { x: pair[0], y: pair[1] }
    }
}

/// A width/height pair, same space rules as `Point`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl From<[f64; 2]> for Size {
    fn from(pair: [f64; 2]) -> Self {
        Self { width: pair[0], height: pair[1] }
    }
}

/// An axis-aligned rectangle: window bounds, display bounds, or a region of
/// interest. On the wire this is `{x, y, width, height}` in global screen
/// units, y growing downward from the primary display's top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Point {
        Point { x: self.x, y: self.y }
    }

    pub fn size(&self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Center of the rectangle, in the rectangle's own space.
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Whether the point lies inside. Right and bottom edges are exclusive so
    /// adjacent displays never both claim a point on their shared edge.
    pub fn contains_point(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.x + self.width && p.y >= self.y && p.y < self.y + self.height
    }
}
