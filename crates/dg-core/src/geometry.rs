//! Geometry primitives shared by the model, commands, and listeners.
//!
//! All coordinates are `f64`. A `Dimension` with a negative component is the
//! "undefined size" sentinel, which is not the same thing as a zero size.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

// ─── Point ───────────────────────────────────────────────────────────────

/// An `(x, y)` coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// The origin `(0, 0)`.
pub const ORIGIN_POINT: Point = Point { x: 0.0, y: 0.0 };

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Vector from `self` to `other`.
    pub fn delta_to(&self, other: Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }

    /// Translate by a vector.
    pub fn offset(&self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }

    /// Linear interpolation: `t = 0` yields `self`, `t = 1` yields `to`, exactly.
    pub fn lerp(&self, to: Point, t: f64) -> Point {
        if t <= 0.0 {
            return *self;
        }
        if t >= 1.0 {
            return to;
        }
        Point::new(
            (1.0 - t) * self.x + t * to.x,
            (1.0 - t) * self.y + t * to.y,
        )
    }
}

// ─── Dimension ───────────────────────────────────────────────────────────

/// Width and height of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub width: f64,
    pub height: f64,
}

/// Both components negative: the size is not known yet.
pub const EMPTY_DIMENSION: Dimension = Dimension {
    width: -1.0,
    height: -1.0,
};

impl Dimension {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        EMPTY_DIMENSION
    }
}

/// A dimension is valid when neither component is negative.
pub fn is_valid_dimension(d: Dimension) -> bool {
    d.width >= 0.0 && d.height >= 0.0
}

// ─── Bounds ──────────────────────────────────────────────────────────────

/// Position plus dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

pub const EMPTY_BOUNDS: Bounds = Bounds {
    x: 0.0,
    y: 0.0,
    width: -1.0,
    height: -1.0,
};

impl Default for Bounds {
    fn default() -> Self {
        EMPTY_BOUNDS
    }
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(position: Point, size: Dimension) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Dimension {
        Dimension::new(self.width, self.height)
    }
}

/// The smallest bounds covering both inputs. Undefined sizes count as zero.
pub fn combine(b0: Bounds, b1: Bounds) -> Bounds {
    let min_x = b0.x.min(b1.x);
    let min_y = b0.y.min(b1.y);
    let max_x = (b0.x + b0.width.max(0.0)).max(b1.x + b1.width.max(0.0));
    let max_y = (b0.y + b0.height.max(0.0)).max(b1.y + b1.height.max(0.0));
    Bounds::new(min_x, min_y, max_x - min_x, max_y - min_y)
}

pub fn translate(b: Bounds, p: Point) -> Bounds {
    Bounds::new(b.x + p.x, b.y + p.y, b.width, b.height)
}

/// Center of the bounds; an undefined extent contributes no offset.
pub fn center(b: Bounds) -> Point {
    Point::new(
        b.x + if b.width >= 0.0 { 0.5 * b.width } else { 0.0 },
        b.y + if b.height >= 0.0 { 0.5 * b.height } else { 0.0 },
    )
}

pub fn center_of_line(s: Point, e: Point) -> Point {
    center(Bounds::new(
        s.x.min(e.x),
        s.y.min(e.y),
        (e.x - s.x).abs(),
        (e.y - s.y).abs(),
    ))
}

/// Whether `p` lies inside `b` (edges inclusive).
pub fn includes(b: Bounds, p: Point) -> bool {
    p.x >= b.x && p.x <= b.x + b.width && p.y >= b.y && p.y <= b.y + b.height
}

// ─── Insets / Direction ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

// ─── Vector math ─────────────────────────────────────────────────────────

pub fn euclidean_distance(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

pub fn manhattan_distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).abs() + (b.y - a.y).abs()
}

/// Angle of the vector `a → b` in radians, range (-π, π].
pub fn angle(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

pub fn to_degrees(a: f64) -> f64 {
    a * 180.0 / PI
}

pub fn to_radians(a: f64) -> f64 {
    a * PI / 180.0
}

/// Equality within 1e-3.
pub fn almost_equals(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}
