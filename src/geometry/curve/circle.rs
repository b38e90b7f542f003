use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::frame::Frame;
use crate::math::{wrap_periodic, Point3, Vector3, TOLERANCE};

use super::Curve;

/// A full circle in 3D space.
///
/// `P(t) = center + radius * (cos(t) * ref_dir + sin(t) * binormal)` with
/// `binormal = normal x ref_dir`. The domain is `[0, 2*pi)`.
#[derive(Debug, Clone)]
pub struct Circle {
    frame: Frame,
    radius: f64,
}

impl Circle {
    /// Creates a new circle.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the normal is
    /// zero-length, or `ref_dir` is not perpendicular to the normal.
    pub fn new(center: Point3, radius: f64, normal: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("circle radius must be positive".into()).into(),
            );
        }
        Ok(Self {
            frame: Frame::new(center, normal, ref_dir)?,
            radius,
        })
    }

    /// Creates a circle whose zero-angle direction is picked from `normal`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive or the normal is zero-length.
    pub fn from_normal(center: Point3, radius: f64, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let n = normal / len;
        let reference = if n.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
        Self::new(center, radius, n, n.cross(&reference).normalize())
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        self.frame.origin()
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Unit normal of the circle plane.
    #[must_use]
    pub fn normal(&self) -> &Vector3 {
        self.frame.axis()
    }
}

impl Curve for Circle {
    fn evaluate(&self, t: f64) -> Result<Point3> {
        Ok(self.frame.origin() + self.frame.radial(t) * self.radius)
    }

    fn tangent(&self, t: f64) -> Result<Vector3> {
        Ok(self.frame.radial_du(t))
    }

    fn is_closed(&self) -> bool {
        true
    }

    fn parameter_of(&self, point: &Point3) -> f64 {
        wrap_periodic(self.frame.angle_of(point), 0.0, TAU)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn xy_circle(radius: f64) -> Circle {
        Circle::new(Point3::origin(), radius, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn evaluate_quarter_turn() {
        let p = xy_circle(3.0).evaluate(FRAC_PI_2).unwrap();
        assert!((p - Point3::new(0.0, 3.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn tangent_at_zero_is_plus_y() {
        let t = xy_circle(1.0).tangent(0.0).unwrap();
        assert!((t - Vector3::y()).norm() < 1e-9);
    }

    #[test]
    fn parameter_of_wraps_into_domain() {
        let c = xy_circle(2.0);
        let p = c.evaluate(TAU - 0.5).unwrap();
        assert!((c.parameter_of(&p) - (TAU - 0.5)).abs() < 1e-9);
    }

    #[test]
    fn from_normal_lies_in_plane() {
        let c = Circle::from_normal(Point3::new(0.0, 0.0, 2.0), 1.0, Vector3::new(0.0, 0.0, 5.0))
            .unwrap();
        for t in [0.0, 1.0, 2.0, 4.0] {
            let p = c.evaluate(t).unwrap();
            assert!((p.z - 2.0).abs() < 1e-12);
            assert!(((p - c.center()).norm() - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn invalid_radius() {
        assert!(Circle::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x()).is_err());
    }
}
