//! Integer geometry for diagram shapes.
//!
//! Every rectangle produced by the layout engine is an axis-aligned
//! [`Rect`] with integer coordinates, so two runs over the same graph yield
//! bit-identical output.
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! The origin is the top-left corner of the diagram and Y grows downward,
//! matching SVG and the host modeling tools.

use std::fmt;

/// A 2D point in diagram space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Point {
    x: i32,
    y: i32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> i32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> i32 {
        self.y
    }
}

/// An axis-aligned rectangle defined by its top-left corner and size.
///
/// # Examples
///
/// ```
/// # use actiflow_core::geometry::Rect;
/// let lane = Rect::new(-120, 50, 480, 675);
/// assert_eq!(lane.right(), 360);
/// assert_eq!(lane.bottom(), 725);
///
/// let next = Rect::new(lane.right(), 50, 480, 675);
/// assert_eq!(lane.union(next), Rect::new(-120, 50, 960, 675));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the left edge
    pub fn x(self) -> i32 {
        self.x
    }

    /// Returns the top edge
    pub fn y(self) -> i32 {
        self.y
    }

    pub fn width(self) -> i32 {
        self.width
    }

    pub fn height(self) -> i32 {
        self.height
    }

    /// Returns the exclusive right edge (`x + width`)
    pub fn right(self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Returns the exclusive bottom edge (`y + height`)
    pub fn bottom(self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Returns the top-left corner
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the center point, rounded toward the top-left.
    pub fn center(self) -> Point {
        Point::new(
            self.x.saturating_add(self.width / 2),
            self.y.saturating_add(self.height / 2),
        )
    }

    /// Returns a copy with a different height and the same origin.
    pub fn with_height(mut self, height: i32) -> Self {
        self.height = height;
        self
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    pub fn union(self, other: Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right.saturating_sub(x), bottom.saturating_sub(y))
    }

    /// Returns `true` when `other` lies entirely inside `self`.
    pub fn contains(self, other: Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns `true` when the two rectangles share interior area.
    ///
    /// Rectangles that only touch along an edge do not intersect.
    pub fn intersects(self, other: Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}
