//! A simple 2-D integer point shared by the placement and routing grids.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// An integer `(x, y)` coordinate on the placement or routing grid.
///
/// This engine's grid is a dense 2-D plane, so positions are plain
/// coordinates rather than an opaque index into a device site table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Column.
    pub x: i64,
    /// Row.
    pub y: i64,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another point.
    pub fn manhattan(self, other: Point) -> i64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Euclidean distance to another point.
    pub fn euclidean(self, other: Point) -> f64 {
        (((self.x - other.x).pow(2) + (self.y - other.y).pow(2)) as f64).sqrt()
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}
