use nalgebra::{Matrix3, Matrix3x4, Vector3 as NVector3, Vector4};

use crate::boundary::ArcData;
use crate::geometry::curve2d::Curve2d;
use crate::geometry::surface::Surface;
use crate::math::{Point2, Point3};

use super::point::PointOn2S;

/// Numeric service that pulls an approximate `(u1, v1, u2, v2)` onto both
/// surfaces.
pub trait PointRefiner {
    /// Returns a point whose images on both surfaces agree within `tol`, or
    /// `None` if the iteration does not converge.
    fn refine(
        &self,
        s1: &dyn Surface,
        s2: &dyn Surface,
        guess: [f64; 4],
        tol: f64,
    ) -> Option<PointOn2S>;
}

/// Minimum-norm Gauss-Newton on `S1(u1, v1) - S2(u2, v2) = 0`.
///
/// The system is underdetermined (three equations, four unknowns); each step
/// is the smallest parameter change that cancels the linearized gap.
#[derive(Debug, Clone, Copy)]
pub struct NewtonRefiner {
    pub max_iterations: usize,
}

impl Default for NewtonRefiner {
    fn default() -> Self {
        Self { max_iterations: 25 }
    }
}

/// Relative damping added to `J * J^T` so tangential contacts stay solvable.
const DAMPING: f64 = 1e-12;

impl PointRefiner for NewtonRefiner {
    fn refine(
        &self,
        s1: &dyn Surface,
        s2: &dyn Surface,
        guess: [f64; 4],
        tol: f64,
    ) -> Option<PointOn2S> {
        let mut x = Vector4::from(guess);
        for _ in 0..self.max_iterations {
            let d1 = s1.derivatives(x[0], x[1]).ok()?;
            let d2 = s2.derivatives(x[2], x[3]).ok()?;
            let gap = d1.point - d2.point;
            if gap.norm() <= tol * 1e-3 {
                break;
            }
            let j = Matrix3x4::from_columns(&[d1.du, d1.dv, -d2.du, -d2.dv]);
            let jjt = j * j.transpose();
            let damped = jjt + Matrix3::identity() * (DAMPING * (1.0 + jjt.trace()));
            let y = damped.lu().solve(&gap)?;
            let step = -(j.transpose() * y);
            if !step.iter().all(|c| c.is_finite()) {
                return None;
            }
            x += step;
        }

        let p1 = s1.evaluate(x[0], x[1]).ok()?;
        let p2 = s2.evaluate(x[2], x[3]).ok()?;
        if (p1 - p2).norm() > tol {
            return None;
        }
        Some(PointOn2S::new(
            Point3::from((p1.coords + p2.coords) * 0.5),
            Point2::new(x[0], x[1]),
            Point2::new(x[2], x[3]),
        ))
    }
}

/// A point on a boundary arc of one surface that also lies on the other.
#[derive(Debug, Clone, Copy)]
pub struct ArcPoint {
    /// Parameter along the arc.
    pub t: f64,
    /// Parameters on the arc's own surface, `arc(t)`.
    pub uv_own: Point2,
    /// Parameters on the other surface.
    pub uv_other: Point2,
    pub point: Point3,
}

/// Solves `own(arc(t)) = other(u, v)` for `(t, u, v)` with Newton steps,
/// keeping `t` inside the arc range.
#[must_use]
pub fn refine_on_arc(
    arc: &ArcData,
    own: &dyn Surface,
    other: &dyn Surface,
    t_guess: f64,
    uv_guess: Point2,
    tol: f64,
) -> Option<ArcPoint> {
    let mut t = t_guess.clamp(arc.t_min, arc.t_max);
    let mut uv = uv_guess;
    for _ in 0..30 {
        let c = arc.point_at(t);
        let dc = arc.curve.derivative(t);
        let da = own.derivatives(c.x, c.y).ok()?;
        let db = other.derivatives(uv.x, uv.y).ok()?;
        let gap = da.point - db.point;
        if gap.norm() <= tol * 1e-3 {
            break;
        }
        let along = da.du * dc.x + da.dv * dc.y;
        let j = Matrix3::from_columns(&[along, -db.du, -db.dv]);
        let step: NVector3<f64> = j.lu().solve(&(-gap))?;
        if !step.iter().all(|c| c.is_finite()) {
            return None;
        }
        t = (t + step.x).clamp(arc.t_min, arc.t_max);
        uv += step.fixed_rows::<2>(1).into_owned();
    }

    let uv_own = arc.point_at(t);
    let pa = own.evaluate(uv_own.x, uv_own.y).ok()?;
    let pb = other.evaluate(uv.x, uv.y).ok()?;
    if (pa - pb).norm() > tol {
        return None;
    }
    Some(ArcPoint {
        t,
        uv_own,
        uv_other: uv,
        point: pa,
    })
}
