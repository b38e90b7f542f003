use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{AnalyticSurface, Surface, SurfaceDerivatives, SurfaceDomain, SurfaceKind};

/// An infinite plane in 3D space.
///
/// `P(u, v) = origin + u * u_dir + v * v_dir`, with `u_dir` and `v_dir`
/// unit and orthogonal. The normal is `u_dir x v_dir`.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a plane from an origin and two spanning directions.
    ///
    /// `v_dir` is re-orthogonalized against `u_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a direction is zero-length or both are parallel.
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE || v_dir.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let u_dir = u_dir / u_len;
        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(
                GeometryError::Degenerate("plane directions are parallel".into()).into(),
            );
        }
        let normal = normal / normal_len;
        Ok(Self {
            origin,
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
        })
    }

    /// Creates a plane from an origin and a normal; the in-plane axes are
    /// picked automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        let reference = if normal.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);
        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Unit normal of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance from `point` to the plane along the normal.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }
}

impl Surface for Plane {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.origin + self.u_dir * u + self.v_dir * v)
    }

    fn derivatives(&self, u: f64, v: f64) -> Result<SurfaceDerivatives> {
        Ok(SurfaceDerivatives {
            point: self.evaluate(u, v)?,
            du: self.u_dir,
            dv: self.v_dir,
        })
    }

    fn normal(&self, _u: f64, _v: f64) -> Result<Vector3> {
        Ok(self.normal)
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY)
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Plane
    }

    fn parameters_of(&self, point: &Point3) -> Option<(f64, f64)> {
        let d = point - self.origin;
        Some((d.dot(&self.u_dir), d.dot(&self.v_dir)))
    }

    fn analytic(&self) -> Option<AnalyticSurface<'_>> {
        Some(AnalyticSurface::Plane(self))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn skewed_v_dir_is_orthogonalized() {
        let p = Plane::new(Point3::origin(), Vector3::x(), Vector3::new(1.0, 1.0, 0.0)).unwrap();
        assert!(p.u_dir().dot(p.v_dir()).abs() < TOLERANCE);
        assert!((p.plane_normal() - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn parameters_of_projects_onto_plane() {
        let p = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::x(), Vector3::y()).unwrap();
        let (u, v) = p.parameters_of(&Point3::new(2.0, -3.0, 7.0)).unwrap();
        assert!((u - 2.0).abs() < TOLERANCE);
        assert!((v + 3.0).abs() < TOLERANCE);
        assert!((p.signed_distance(&Point3::new(0.0, 0.0, 7.0)) - 6.0).abs() < TOLERANCE);
    }

    #[test]
    fn from_normal_builds_orthonormal_axes() {
        let p = Plane::from_normal(Point3::origin(), Vector3::new(0.0, 0.0, 2.0)).unwrap();
        let d = p.derivatives(0.0, 0.0).unwrap();
        assert!((d.du.cross(&d.dv) - Vector3::z()).norm() < TOLERANCE);
        assert!(Plane::from_normal(Point3::origin(), Vector3::zeros()).is_err());
    }

    #[test]
    fn parallel_directions_rejected() {
        assert!(Plane::new(Point3::origin(), Vector3::x(), Vector3::x() * 2.0).is_err());
    }
}
