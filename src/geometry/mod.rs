//! Geometric primitives for spatial table reconstruction.
//!
//! Token coordinates follow the page-image convention used by document
//! parsers: `x` grows to the right and `y` grows *down* the page.

use serde::{Deserialize, Serialize};

/// A 2D point in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f32,
    /// Y coordinate
    pub y: f32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in page space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the left edge
    pub x: f32,
    /// Y coordinate of the top edge
    pub y: f32,
    /// Width of rectangle
    pub width: f32,
    /// Height of rectangle
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from position and dimensions.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from two corner points `(x0, y0)` and `(x1, y1)`.
    ///
    /// This is the `bbox` layout emitted by document parsers.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatial_tables::geometry::Rect;
    ///
    /// let rect = Rect::from_points(10.0, 20.0, 110.0, 70.0);
    /// assert_eq!(rect.x, 10.0);
    /// assert_eq!(rect.width, 100.0);
    /// assert_eq!(rect.height, 50.0);
    /// ```
    pub fn from_points(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }

    /// Get the left edge x-coordinate.
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the top edge y-coordinate.
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Get the center point of the rectangle.
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Compute the union of this rectangle with another.
    ///
    /// Returns the smallest rectangle that contains both rectangles.
    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.left().min(other.left());
        let y0 = self.top().min(other.top());
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect::from_points(x0, y0, x1, y1)
    }

    /// The horizontal extent of the rectangle.
    pub fn x_band(&self) -> XBand {
        XBand::new(self.left(), self.right())
    }

    /// Whether every coordinate is finite and the extent is non-negative.
    pub fn is_well_formed(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.width.is_finite()
            && self.height.is_finite()
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

/// A closed horizontal interval `[left, right]`.
///
/// Used to bound a section to one column of a multi-column page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct XBand {
    /// Left boundary
    pub left: f32,
    /// Right boundary
    pub right: f32,
}

impl XBand {
    /// Create a band, swapping the bounds if given in reverse.
    pub fn new(a: f32, b: f32) -> Self {
        if a <= b {
            Self { left: a, right: b }
        } else {
            Self { left: b, right: a }
        }
    }

    /// Width of the band.
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// Check whether `x` lies inside the band (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        x >= self.left && x <= self.right
    }

    /// Check whether two bands share any horizontal extent.
    ///
    /// # Examples
    ///
    /// ```
    /// use spatial_tables::geometry::XBand;
    ///
    /// let left_column = XBand::new(0.0, 290.0);
    /// let right_column = XBand::new(310.0, 600.0);
    /// assert!(!left_column.overlaps(&right_column));
    /// assert!(left_column.overlaps(&XBand::new(100.0, 400.0)));
    /// ```
    pub fn overlaps(&self, other: &XBand) -> bool {
        self.left < other.right && other.left < self.right
    }

    /// Smallest band covering both bands.
    pub fn union(&self, other: &XBand) -> XBand {
        XBand {
            left: self.left.min(other.left),
            right: self.right.max(other.right),
        }
    }
}
