mod bezier;
mod cone;
mod cylinder;
mod grid;
mod plane;
mod sphere;
mod torus;

pub use bezier::BezierSurface;
pub use cone::Cone;
pub use cylinder::Cylinder;
pub use grid::GridSurface;
pub use plane::Plane;
pub use sphere::Sphere;
pub use torus::Torus;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

/// Parameter domain for a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDomain {
    /// Start of the U parameter range.
    pub u_min: f64,
    /// End of the U parameter range.
    pub u_max: f64,
    /// Start of the V parameter range.
    pub v_min: f64,
    /// End of the V parameter range.
    pub v_max: f64,
}

impl SurfaceDomain {
    /// Creates a new surface domain.
    #[must_use]
    pub fn new(u_min: f64, u_max: f64, v_min: f64, v_max: f64) -> Self {
        Self {
            u_min,
            u_max,
            v_min,
            v_max,
        }
    }

    /// Whether all four bounds are finite.
    #[must_use]
    pub fn is_bounded(&self) -> bool {
        self.u_min.is_finite()
            && self.u_max.is_finite()
            && self.v_min.is_finite()
            && self.v_max.is_finite()
    }
}

/// Concrete surface family, used to pick an intersection strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    Plane,
    Cylinder,
    Sphere,
    Cone,
    Torus,
    Bezier,
    /// Any surface known only through evaluation.
    Other,
}

impl SurfaceKind {
    /// The coarse class the dispatch table is keyed on.
    #[must_use]
    pub fn class(self) -> SurfaceClass {
        match self {
            Self::Plane => SurfaceClass::Plane,
            Self::Cylinder | Self::Sphere | Self::Cone => SurfaceClass::Quadric,
            Self::Torus | Self::Bezier => SurfaceClass::Parametric,
            Self::Other => SurfaceClass::Sampled,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Plane => "plane",
            Self::Cylinder => "cylinder",
            Self::Sphere => "sphere",
            Self::Cone => "cone",
            Self::Torus => "torus",
            Self::Bezier => "bezier",
            Self::Other => "other",
        }
    }
}

/// Surface classes: planes, quadrics, general parametric, sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceClass {
    Plane,
    Quadric,
    Parametric,
    Sampled,
}

/// Borrowed view on a surface with a closed-form description.
#[derive(Debug, Clone, Copy)]
pub enum AnalyticSurface<'a> {
    Plane(&'a Plane),
    Cylinder(&'a Cylinder),
    Sphere(&'a Sphere),
    Cone(&'a Cone),
}

/// A point with its first partial derivatives.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceDerivatives {
    pub point: Point3,
    pub du: Vector3,
    pub dv: Vector3,
}

/// Step used by the finite-difference fallback in [`Surface::derivatives`].
const DIFF_STEP: f64 = 1e-6;

/// Trait for parametric surfaces in 3D space.
pub trait Surface: std::fmt::Debug {
    /// Evaluates the surface at parameters `(u, v)`, returning the 3D point.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or evaluation fails.
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3>;

    /// Point and first partial derivatives at `(u, v)`.
    ///
    /// The default uses central differences.
    ///
    /// # Errors
    ///
    /// Returns an error if evaluation fails at or near `(u, v)`.
    fn derivatives(&self, u: f64, v: f64) -> Result<SurfaceDerivatives> {
        let point = self.evaluate(u, v)?;
        let du = (self.evaluate(u + DIFF_STEP, v)? - self.evaluate(u - DIFF_STEP, v)?)
            / (2.0 * DIFF_STEP);
        let dv = (self.evaluate(u, v + DIFF_STEP)? - self.evaluate(u, v - DIFF_STEP)?)
            / (2.0 * DIFF_STEP);
        Ok(SurfaceDerivatives { point, du, dv })
    }

    /// Computes the unit surface normal at parameters `(u, v)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are out of range or the normal is degenerate.
    fn normal(&self, u: f64, v: f64) -> Result<Vector3> {
        let d = self.derivatives(u, v)?;
        let n = d.du.cross(&d.dv);
        let len = n.norm();
        if len < TOLERANCE {
            return Err(GeometryError::Degenerate(format!("normal vanishes at ({u}, {v})")).into());
        }
        Ok(n / len)
    }

    /// Returns the parameter domain of the surface.
    fn domain(&self) -> SurfaceDomain;

    fn kind(&self) -> SurfaceKind;

    /// Period of the U parameter, if U is periodic.
    fn period_u(&self) -> Option<f64> {
        None
    }

    /// Period of the V parameter, if V is periodic.
    fn period_v(&self) -> Option<f64> {
        None
    }

    /// Closed-form parameters of a point on (or near) the surface, inside
    /// the domain. `None` when no closed form exists.
    fn parameters_of(&self, _point: &Point3) -> Option<(f64, f64)> {
        None
    }

    /// Parameters of points where the surface is singular (poles, apexes).
    fn singular_points(&self) -> Vec<(f64, f64)> {
        Vec::new()
    }

    /// Closed-form description, for surfaces that have one.
    fn analytic(&self) -> Option<AnalyticSurface<'_>> {
        None
    }
}
