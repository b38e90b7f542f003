//! 3D carriers of closed-form intersection lines.

mod circle;
mod line;

pub use circle::Circle;
pub use line::Line;

use crate::error::Result;
use crate::math::{Point3, Vector3};

/// A curve in space parametrized by a single `t`.
pub trait Curve {
    /// Point at `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the curve cannot be evaluated at `t`.
    fn evaluate(&self, t: f64) -> Result<Point3>;

    /// Unit tangent at `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if the tangent vanishes.
    fn tangent(&self, t: f64) -> Result<Vector3>;

    /// Whether the parametrization wraps around after one period.
    fn is_closed(&self) -> bool;

    /// Parameter of the curve point closest to `point`.
    fn parameter_of(&self, point: &Point3) -> f64;
}
