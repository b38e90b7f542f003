use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Right-handed placement shared by the revolved surfaces.
///
/// `axis` and `ref_dir` are unit and orthogonal; `binormal = axis x ref_dir`.
#[derive(Debug, Clone)]
pub struct Frame {
    origin: Point3,
    axis: Vector3,
    ref_dir: Vector3,
    binormal: Vector3,
}

impl Frame {
    /// Builds a frame, normalizing both directions.
    ///
    /// # Errors
    ///
    /// Returns an error if either direction is zero-length or they are not
    /// perpendicular.
    pub fn new(origin: Point3, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        let axis_len = axis.norm();
        let ref_len = ref_dir.norm();
        if axis_len < TOLERANCE || ref_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let axis = axis / axis_len;
        let ref_dir = ref_dir / ref_len;
        if axis.dot(&ref_dir).abs() > TOLERANCE {
            return Err(GeometryError::Degenerate(
                "reference direction must be perpendicular to axis".into(),
            )
            .into());
        }
        Ok(Self {
            origin,
            axis,
            ref_dir,
            binormal: axis.cross(&ref_dir),
        })
    }

    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    #[must_use]
    pub fn ref_dir(&self) -> &Vector3 {
        &self.ref_dir
    }

    #[must_use]
    pub fn binormal(&self) -> &Vector3 {
        &self.binormal
    }

    /// Unit radial direction at angle `u` around the axis.
    #[must_use]
    pub fn radial(&self, u: f64) -> Vector3 {
        self.ref_dir * u.cos() + self.binormal * u.sin()
    }

    /// Derivative of [`radial`](Self::radial) with respect to `u`.
    #[must_use]
    pub fn radial_du(&self, u: f64) -> Vector3 {
        self.binormal * u.cos() - self.ref_dir * u.sin()
    }

    /// Local coordinates `(x, y, z)` of `point` along `ref_dir`, `binormal`, `axis`.
    #[must_use]
    pub fn local(&self, point: &Point3) -> (f64, f64, f64) {
        let d = point - self.origin;
        (d.dot(&self.ref_dir), d.dot(&self.binormal), d.dot(&self.axis))
    }

    /// Angle of `point` around the axis, in `(-pi, pi]`.
    #[must_use]
    pub fn angle_of(&self, point: &Point3) -> f64 {
        let (x, y, _) = self.local(point);
        y.atan2(x)
    }
}
