use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{GeometryError, Result};
use crate::geometry::frame::Frame;
use crate::math::{wrap_periodic, Point3, Vector3, TOLERANCE};

use super::{AnalyticSurface, Surface, SurfaceDerivatives, SurfaceDomain, SurfaceKind};

/// A spherical surface in 3D space.
///
/// `P(u, v) = center + r * cos(v) * radial(u) + r * sin(v) * axis`.
///
/// `u` is the longitude in `[0, 2*pi)` and periodic; `v` is the latitude in
/// `[-pi/2, pi/2]`. Both poles are singular: `dP/du` vanishes there.
#[derive(Debug, Clone)]
pub struct Sphere {
    frame: Frame,
    radius: f64,
}

impl Sphere {
    /// Creates a new sphere; `axis` points to the north pole.
    ///
    /// # Errors
    ///
    /// Returns an error if the radius is non-positive, the axis is
    /// zero-length, or `ref_dir` is not perpendicular to the axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius < TOLERANCE {
            return Err(
                GeometryError::Degenerate("sphere radius must be positive".into()).into(),
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

    /// North pole direction (unit vector).
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        self.frame.axis()
    }

    /// Longitude and latitude of the radial projection of `point`.
    ///
    /// Longitude is in `(-pi, pi]`; at the poles it is `0`.
    #[must_use]
    pub fn inverse(&self, point: &Point3) -> (f64, f64) {
        let (x, y, z) = self.frame.local(point);
        let len = (x * x + y * y + z * z).sqrt();
        if len < TOLERANCE {
            return (0.0, 0.0);
        }
        let v = (z / len).clamp(-1.0, 1.0).asin();
        let u = if x.hypot(y) < TOLERANCE * len { 0.0 } else { y.atan2(x) };
        (u, v)
    }
}

impl Surface for Sphere {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        let radial = self.frame.radial(u);
        Ok(self.frame.origin()
            + (radial * v.cos() + self.frame.axis() * v.sin()) * self.radius)
    }

    fn derivatives(&self, u: f64, v: f64) -> Result<SurfaceDerivatives> {
        let radial = self.frame.radial(u);
        Ok(SurfaceDerivatives {
            point: self.evaluate(u, v)?,
            du: self.frame.radial_du(u) * (self.radius * v.cos()),
            dv: (self.frame.axis() * v.cos() - radial * v.sin()) * self.radius,
        })
    }

    /// Outward normal; well defined at the poles as well.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        Ok(self.frame.radial(u) * v.cos() + self.frame.axis() * v.sin())
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, TAU, -FRAC_PI_2, FRAC_PI_2)
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Sphere
    }

    fn period_u(&self) -> Option<f64> {
        Some(TAU)
    }

    fn parameters_of(&self, point: &Point3) -> Option<(f64, f64)> {
        let (u, v) = self.inverse(point);
        Some((wrap_periodic(u, 0.0, TAU), v))
    }

    fn singular_points(&self) -> Vec<(f64, f64)> {
        vec![(0.0, -FRAC_PI_2), (0.0, FRAC_PI_2)]
    }

    fn analytic(&self) -> Option<AnalyticSurface<'_>> {
        Some(AnalyticSurface::Sphere(self))
    }
}
