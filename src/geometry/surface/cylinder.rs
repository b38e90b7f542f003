use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::geometry::frame::Frame;
use crate::math::{wrap_periodic, Point3, Vector3, TOLERANCE};

use super::{AnalyticSurface, Surface, SurfaceDerivatives, SurfaceDomain, SurfaceKind};

/// A cylindrical surface in 3D space.
///
/// `P(u, v) = center + radius * radial(u) + v * axis`, where
/// `radial(u) = cos(u) * ref_dir + sin(u) * binormal`.
///
/// `u` is periodic with period `2*pi`; `v` is unbounded.
#[derive(Debug, Clone)]
pub struct Cylinder {
    frame: Frame,
    radius: f64,
}

impl Cylinder {
    /// Creates a new cylinder around the axis through `center`.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the axis is
    /// zero-length, or `ref_dir` is not perpendicular to the axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cylinder radius must be positive".into()).into(),
            );
        }
        Ok(Self {
            frame: Frame::new(center, axis, ref_dir)?,
            radius,
        })
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        self.frame.origin()
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Unit axis direction.
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        self.frame.axis()
    }

    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        self.frame.ref_dir()
    }

    /// Parameters of the point on the surface closest to `point`.
    ///
    /// `u` is in `(-pi, pi]`, `v` is the signed axial offset from the center.
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let (_, _, z) = self.frame.local(point);
        (self.frame.angle_of(point), z)
    }
}

impl Surface for Cylinder {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.frame.origin() + self.frame.radial(u) * self.radius + self.frame.axis() * v)
    }

    fn derivatives(&self, u: f64, v: f64) -> Result<SurfaceDerivatives> {
        Ok(SurfaceDerivatives {
            point: self.evaluate(u, v)?,
            du: self.frame.radial_du(u) * self.radius,
            dv: *self.frame.axis(),
        })
    }

    fn normal(&self, u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.frame.radial(u))
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, f64::NEG_INFINITY, f64::INFINITY)
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Cylinder
    }

    fn period_u(&self) -> Option<f64> {
        Some(TAU)
    }

    fn parameters_of(&self, point: &Point3) -> Option<(f64, f64)> {
        let (u, v) = self.inverse(point);
        Some((wrap_periodic(u, 0.0, TAU), v))
    }

    fn analytic(&self) -> Option<AnalyticSurface<'_>> {
        Some(AnalyticSurface::Cylinder(self))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn z_cylinder(radius: f64) -> Cylinder {
        Cylinder::new(Point3::origin(), radius, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn evaluate_quarter_turn_with_height() {
        let c = z_cylinder(2.0);
        let p = c.evaluate(FRAC_PI_2, 5.0).unwrap();
        assert!((p - Point3::new(0.0, 2.0, 5.0)).norm() < 1e-9);
    }

    #[test]
    fn derivatives_match_normal() {
        let c = z_cylinder(1.5);
        let d = c.derivatives(0.7, 1.0).unwrap();
        let n = d.du.cross(&d.dv).normalize();
        assert!((n - c.normal(0.7, 1.0).unwrap()).norm() < 1e-12);
        assert!((d.du.norm() - 1.5).abs() < 1e-12);
    }

    #[test]
    fn parameters_of_lands_in_domain() {
        let c = z_cylinder(2.0);
        let p = c.evaluate(TAU * 0.75, -1.0).unwrap();
        let (u, v) = c.parameters_of(&p).unwrap();
        assert!((u - TAU * 0.75).abs() < 1e-9);
        assert!((v + 1.0).abs() < 1e-12);
    }

    #[test]
    fn periodic_in_u_only() {
        let c = z_cylinder(1.0);
        assert_eq!(c.period_u(), Some(TAU));
        assert_eq!(c.period_v(), None);
        assert!(c.singular_points().is_empty());
    }

    #[test]
    fn invalid_radius() {
        assert!(Cylinder::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x()).is_err());
    }
}
