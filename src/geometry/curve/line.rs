use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::Curve;

/// An infinite line, `P(t) = origin + t * direction` with unit `direction`.
///
/// The parameter is the arc length from `origin`.
#[derive(Debug, Clone)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
}

impl Line {
    /// Creates a new line from an origin and direction.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vector is zero-length.
    pub fn new(origin: Point3, direction: Vector3) -> Result<Self> {
        let len = direction.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin,
            direction: direction / len,
        })
    }

    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Unit direction of the line.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.origin + self.direction * t)
    }

    fn tangent(&self, _t: f64) -> Result<Vector3> {
        Ok(self.direction)
    }

    fn is_closed(&self) -> bool {
        false
    }

    fn parameter_of(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.direction)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parameter_is_arc_length() {
        let l = Line::new(Point3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 3.0, 0.0)).unwrap();
        let p = l.evaluate(2.0).unwrap();
        assert!((p - Point3::new(1.0, 2.0, 0.0)).norm() < TOLERANCE);
        assert!((l.parameter_of(&Point3::new(5.0, 2.0, 1.0)) - 2.0).abs() < TOLERANCE);
    }

    #[test]
    fn zero_direction_rejected() {
        assert!(Line::new(Point3::origin(), Vector3::zeros()).is_err());
    }
}
