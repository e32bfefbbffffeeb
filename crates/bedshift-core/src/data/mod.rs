//! Data models for planar positions and offsets
//!
//! This module provides:
//! - `Point`: a 2D coordinate used in model, bed and pixel space
//! - `Offset`: the (Δx, Δy) translation applied to a G-Code program

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

/// 2D point. The coordinate space is defined by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// The origin (0, 0)
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// Check whether both components are within `tolerance` of `other`
    pub fn approx_eq(&self, other: &Point, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
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

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Planar translation in millimeters
///
/// In batch mode the offset comes straight from configuration; in interactive
/// mode it is the negation of the viewer's pan offset.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    /// Translation along X (mm)
    pub dx: f64,
    /// Translation along Y (mm)
    pub dy: f64,
}

impl Offset {
    /// The identity translation
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    /// Create a new offset
    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Offset that undoes this one
    pub fn inverse(&self) -> Self {
        Self::new(-self.dx, -self.dy)
    }

    /// Both components are finite numbers
    pub fn is_finite(&self) -> bool {
        self.dx.is_finite() && self.dy.is_finite()
    }

    /// Offset as a vector in model space
    pub fn as_point(&self) -> Point {
        Point::new(self.dx, self.dy)
    }
}

impl From<Point> for Offset {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X={:.2}, Y={:.2}", self.dx, self.dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, -4.0);
        assert_eq!(a + b, Point::new(4.0, -2.0));
        assert_eq!(a - b, Point::new(-2.0, 6.0));
        assert_eq!(-a, Point::new(-1.0, -2.0));

        let mut c = a;
        c += b;
        assert_eq!(c, Point::new(4.0, -2.0));
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_offset_inverse_and_display() {
        let o = Offset::new(12.345, -6.0);
        assert_eq!(o.inverse(), Offset::new(-12.345, 6.0));
        assert_eq!(o.to_string(), "X=12.35, Y=-6.00");
        assert!(o.is_finite());
        assert!(!Offset::new(f64::NAN, 0.0).is_finite());
    }

    #[test]
    fn test_offset_serde() {
        let o = Offset::new(80.0, 80.0);
        let json = serde_json::to_string(&o).unwrap();
        assert_eq!(json, r#"{"dx":80.0,"dy":80.0}"#);
        let back: Offset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, o);
    }
}
