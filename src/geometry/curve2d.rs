//! Curves in a surface's `(u, v)` parameter plane.

use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{wrap_periodic, Point2, Vector2, TOLERANCE};

/// A parametric curve in the `(u, v)` plane.
pub trait Curve2d {
    fn evaluate(&self, t: f64) -> Point2;

    fn derivative(&self, t: f64) -> Vector2;

    /// Parameter of the curve point closest to `point`.
    fn parameter_of(&self, point: &Point2) -> f64;
}

/// Straight segment, `P(t) = start + t * dir` with unit `dir`.
///
/// The natural range is `[0, length]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment2d {
    start: Point2,
    dir: Vector2,
    length: f64,
}

impl Segment2d {
    /// # Errors
    ///
    /// Returns an error if `start` and `end` coincide.
    pub fn new(start: Point2, end: Point2) -> Result<Self> {
        let d = end - start;
        let length = d.norm();
        if length < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            start,
            dir: d / length,
            length,
        })
    }

    #[must_use]
    pub fn start(&self) -> &Point2 {
        &self.start
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }
}

impl Curve2d for Segment2d {
    fn evaluate(&self, t: f64) -> Point2 {
        self.start + self.dir * t
    }

    fn derivative(&self, _t: f64) -> Vector2 {
        self.dir
    }

    fn parameter_of(&self, point: &Point2) -> f64 {
        (point - self.start).dot(&self.dir)
    }
}

/// Circle in the parameter plane, `P(t) = center + radius * (cos t, sin t)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle2d {
    center: Point2,
    radius: f64,
}

impl Circle2d {
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive.
    pub fn new(center: Point2, radius: f64) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("circle radius must be positive".into()).into(),
            );
        }
        Ok(Self { center, radius })
    }

    #[must_use]
    pub fn center(&self) -> &Point2 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Curve2d for Circle2d {
    fn evaluate(&self, t: f64) -> Point2 {
        self.center + Vector2::new(t.cos(), t.sin()) * self.radius
    }

    fn derivative(&self, t: f64) -> Vector2 {
        Vector2::new(-t.sin(), t.cos()) * self.radius
    }

    fn parameter_of(&self, point: &Point2) -> f64 {
        let d = point - self.center;
        wrap_periodic(d.y.atan2(d.x), 0.0, TAU)
    }
}
