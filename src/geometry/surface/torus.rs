use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::frame::Frame;
use crate::math::{wrap_periodic, Point3, Vector3, TOLERANCE};

use super::{Surface, SurfaceDerivatives, SurfaceDomain, SurfaceKind};

/// A ring torus.
///
/// `P(u, v) = center + (R + r * cos(v)) * radial(u) + r * sin(v) * axis`.
/// Both parameters are periodic with period `2*pi`.
#[derive(Debug, Clone)]
pub struct Torus {
    frame: Frame,
    major_radius: f64,
    minor_radius: f64,
}

impl Torus {
    /// Creates a new torus.
    ///
    /// # Errors
    ///
    /// Returns an error if either radius is non-positive, the minor radius is
    /// not smaller than the major one, or the frame is invalid.
    pub fn new(
        center: Point3,
        major_radius: f64,
        minor_radius: f64,
        axis: Vector3,
        ref_dir: Vector3,
    ) -> Result<Self> {
        if major_radius < TOLERANCE || minor_radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("torus radii must be positive".into()).into(),
            );
        }
        if minor_radius >= major_radius {
            return Err(GeometryError::Degenerate(
                "torus minor radius must be less than major radius".into(),
            )
            .into());
        }
        Ok(Self {
            frame: Frame::new(center, axis, ref_dir)?,
            major_radius,
            minor_radius,
        })
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        self.frame.origin()
    }

    #[must_use]
    pub fn major_radius(&self) -> f64 {
        self.major_radius
    }

    #[must_use]
    pub fn minor_radius(&self) -> f64 {
        self.minor_radius
    }

    /// Angles `(u, v)` in `(-pi, pi]` of the closest point on the torus.
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let (x, y, z) = self.frame.local(point);
        let u = y.atan2(x);
        let v = z.atan2(x.hypot(y) - self.major_radius);
        (u, v)
    }
}

impl Surface for Torus {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let ring = self.major_radius + self.minor_radius * v.cos();
        Ok(self.frame.origin()
            + self.frame.radial(u) * ring
            + self.frame.axis() * (self.minor_radius * v.sin()))
    }

    fn derivatives(&self, u: f64, v: f64) -> Result<SurfaceDerivatives> {
        let ring = self.major_radius + self.minor_radius * v.cos();
        Ok(SurfaceDerivatives {
            point: self.evaluate(u, v)?,
            du: self.frame.radial_du(u) * ring,
            dv: (self.frame.axis() * v.cos() - self.frame.radial(u) * v.sin())
                * self.minor_radius,
        })
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        Ok(self.frame.radial(u) * v.cos() + self.frame.axis() * v.sin())
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, 0.0, TAU)
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Torus
    }

    fn period_u(&self) -> Option<f64> {
        Some(TAU)
    }

    fn period_v(&self) -> Option<f64> {
        Some(TAU)
    }

    fn parameters_of(&self, point: &Point3) -> Option<(f64, f64)> {
        let (u, v) = self.inverse(point);
        Some((wrap_periodic(u, 0.0, TAU), wrap_periodic(v, 0.0, TAU)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn xy_torus() -> Torus {
        Torus::new(Point3::origin(), 3.0, 1.0, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn outer_and_top_points() {
        let t = xy_torus();
        assert!((t.evaluate(0.0, 0.0).unwrap() - Point3::new(4.0, 0.0, 0.0)).norm() < 1e-9);
        assert!((t.evaluate(0.0, FRAC_PI_2).unwrap() - Point3::new(3.0, 0.0, 1.0)).norm() < 1e-9);
        assert!((t.evaluate(0.0, PI).unwrap() - Point3::new(2.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn derivative_cross_is_outward_normal() {
        let t = xy_torus();
        let d = t.derivatives(1.2, 2.5).unwrap();
        let n = d.du.cross(&d.dv).normalize();
        assert!((n - t.normal(1.2, 2.5).unwrap()).norm() < 1e-12);
    }

    #[test]
    fn doubly_periodic_parameters() {
        let t = xy_torus();
        assert_eq!(t.period_v(), Some(TAU));
        let p = t.evaluate(5.5, 4.0).unwrap();
        let (u, v) = t.parameters_of(&p).unwrap();
        assert!((u - 5.5).abs() < 1e-9);
        assert!((v - 4.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_radii() {
        assert!(Torus::new(Point3::origin(), 1.0, 1.0, Vector3::z(), Vector3::x()).is_err());
        assert!(Torus::new(Point3::origin(), 1.0, 0.0, Vector3::z(), Vector3::x()).is_err());
    }
}
