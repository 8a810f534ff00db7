//! Plain 2-D geometry shared by the index and the layouts.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Point) -> f64 {
        (self - other).length()
    }

    /// Component-wise comparison with an absolute tolerance.
    pub fn approx_eq(self, other: Point, eps: f64) -> bool {
        (self.x - other.x).abs() < eps && (self.y - other.y).abs() < eps
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle given by its min and max corners.
///
/// Containment is closed on every side, so a point on a shared edge of two sibling boxes is
/// contained by both. Callers that need a unique owner pick the first match in a fixed order.
/// Sub-boxes are cut at [`Box2D::center`] and reuse the parent's corner coordinates, so siblings
/// share their edges bit for bit and every sub-box lies inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Box2D {
    min: Point,
    max: Point,
}

impl Box2D {
    pub const fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self::from_corners(
            Point::new(min_x, min_y),
            Point::new(min_x + width, min_y + height),
        )
    }

    pub const fn from_corners(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// A box anchored at the origin.
    pub const fn of_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    /// Rejects boxes whose extent is not finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width()) && ok(self.height()) && self.min.is_finite() {
            Ok(())
        } else {
            Err(Error::DegenerateRegion {
                width: self.width(),
                height: self.height(),
            })
        }
    }

    pub fn min(&self) -> Point {
        self.min
    }

    pub fn max(&self) -> Point {
        self.max
    }

    pub fn min_x(&self) -> f64 {
        self.min.x
    }

    pub fn min_y(&self) -> f64 {
        self.min.y
    }

    pub fn max_x(&self) -> f64 {
        self.max.x
    }

    pub fn max_y(&self) -> f64 {
        self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.min.x.midpoint(self.max.x),
            self.min.y.midpoint(self.max.y),
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Projects `p` onto the closest point of the box.
    pub fn clamp(&self, p: Point) -> Point {
        Point::new(
            p.x.clamp(self.min.x, self.max.x),
            p.y.clamp(self.min.y, self.max.y),
        )
    }

    /// Splits into `(west, east)` halves at the center.
    pub fn split_along_x_axis(&self) -> (Box2D, Box2D) {
        let mid = self.center().x;
        (
            Box2D::from_corners(self.min, Point::new(mid, self.max.y)),
            Box2D::from_corners(Point::new(mid, self.min.y), self.max),
        )
    }

    /// Splits into `(south, north)` halves at the center; south has the smaller y.
    pub fn split_along_y_axis(&self) -> (Box2D, Box2D) {
        let mid = self.center().y;
        (
            Box2D::from_corners(self.min, Point::new(self.max.x, mid)),
            Box2D::from_corners(Point::new(self.min.x, mid), self.max),
        )
    }

    /// The four sub-boxes in `[NW, NE, SW, SE]` order, all meeting at [`Box2D::center`].
    pub fn quadrants(&self) -> [Box2D; 4] {
        let (west, east) = self.split_along_x_axis();
        let (sw, nw) = west.split_along_y_axis();
        let (se, ne) = east.split_along_y_axis();
        [nw, ne, sw, se]
    }
}
