use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{GeometryError, Result};
use crate::geometry::frame::Frame;
use crate::math::{wrap_periodic, Point3, Vector3, TOLERANCE};

use super::{AnalyticSurface, Surface, SurfaceDerivatives, SurfaceDomain, SurfaceKind};

/// A conical surface in 3D space.
///
/// `P(u, v) = apex + v * (cos(a) * axis + sin(a) * radial(u))` with half-angle
/// `a`. `v >= 0` is the distance along the generator; the apex (`v = 0`) is
/// singular.
#[derive(Debug, Clone)]
pub struct Cone {
    frame: Frame,
    half_angle: f64,
}

impl Cone {
    /// Creates a new cone opening along `axis` from `apex`.
    ///
    /// # Errors
    ///
    /// Returns an error if the half-angle is outside `(0, pi/2)`, the axis is
    /// zero-length, or `ref_dir` is not perpendicular to the axis.
    pub fn new(apex: Point3, axis: Vector3, half_angle: f64, ref_dir: Vector3) -> Result<Self> {
        if half_angle <= TOLERANCE || half_angle >= FRAC_PI_2 - TOLERANCE {
            return Err(
                GeometryError::Degenerate("cone half-angle must be in (0, pi/2)".into()).into(),
            );
        }
        Ok(Self {
            frame: Frame::new(apex, axis, ref_dir)?,
            half_angle,
        })
    }

    #[must_use]
    pub fn apex(&self) -> &Point3 {
        self.frame.origin()
    }

    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        self.frame.axis()
    }

    #[must_use]
    pub fn half_angle(&self) -> f64 {
        self.half_angle
    }

    fn generator(&self, u: f64) -> Vector3 {
        self.frame.axis() * self.half_angle.cos() + self.frame.radial(u) * self.half_angle.sin()
    }

    /// Parameters of the closest point on the upper nappe.
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let u = self.frame.angle_of(point);
        let v = (point - self.frame.origin()).dot(&self.generator(u)).max(0.0);
        (u, v)
    }
}

impl Surface for Cone {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.frame.origin() + self.generator(u) * v)
    }

    fn derivatives(&self, u: f64, v: f64) -> Result<SurfaceDerivatives> {
        Ok(SurfaceDerivatives {
            point: self.evaluate(u, v)?,
            du: self.frame.radial_du(u) * (v * self.half_angle.sin()),
            dv: self.generator(u),
        })
    }

    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        if v.abs() < TOLERANCE {
            return Err(
                GeometryError::Degenerate("cone normal is degenerate at apex".into()).into(),
            );
        }
        Ok(self.frame.radial(u) * self.half_angle.cos() - self.frame.axis() * self.half_angle.sin())
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, 0.0, f64::INFINITY)
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Cone
    }

    fn period_u(&self) -> Option<f64> {
        Some(TAU)
    }

    fn parameters_of(&self, point: &Point3) -> Option<(f64, f64)> {
        let (u, v) = self.inverse(point);
        Some((wrap_periodic(u, 0.0, TAU), v))
    }

    fn singular_points(&self) -> Vec<(f64, f64)> {
        vec![(0.0, 0.0)]
    }

    fn analytic(&self) -> Option<AnalyticSurface<'_>> {
        Some(AnalyticSurface::Cone(self))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_4;

    fn z_cone_45() -> Cone {
        Cone::new(Point3::origin(), Vector3::z(), FRAC_PI_4, Vector3::x()).unwrap()
    }

    #[test]
    fn evaluate_along_generator() {
        let c = z_cone_45();
        let p = c.evaluate(FRAC_PI_2, 1.0).unwrap();
        let s = FRAC_PI_4.sin();
        assert!((p - Point3::new(0.0, s, s)).norm() < 1e-9);
    }

    #[test]
    fn normal_agrees_with_derivatives() {
        let c = z_cone_45();
        let d = c.derivatives(0.9, 2.0).unwrap();
        let n = d.du.cross(&d.dv).normalize();
        assert!((n - c.normal(0.9, 2.0).unwrap()).norm() < 1e-12);
        assert!(c.normal(0.0, 1.0).unwrap().x > 0.0);
    }

    #[test]
    fn apex_is_singular() {
        let c = z_cone_45();
        assert!(c.normal(0.0, 0.0).is_err());
        assert_eq!(c.singular_points(), vec![(0.0, 0.0)]);
    }

    #[test]
    fn parameters_of_roundtrip() {
        let c = z_cone_45();
        let p = c.evaluate(4.0, 3.0).unwrap();
        let (u, v) = c.parameters_of(&p).unwrap();
        assert!((u - 4.0).abs() < 1e-9);
        assert!((v - 3.0).abs() < 1e-9);
    }

    #[test]
    fn invalid_half_angle() {
        assert!(Cone::new(Point3::origin(), Vector3::z(), 0.0, Vector3::x()).is_err());
        assert!(Cone::new(Point3::origin(), Vector3::z(), FRAC_PI_2, Vector3::x()).is_err());
    }
}
