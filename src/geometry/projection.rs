use nalgebra::{Matrix2, Vector2};

use crate::error::{GeometryError, Result};
use crate::math::{wrap_periodic, Point3, PARAM_TOLERANCE};

use super::surface::{Surface, SurfaceDomain};

/// Result of a closest-point-on-surface query.
#[derive(Debug, Clone, Copy)]
pub struct SurfacePoint {
    /// U parameter on the surface.
    pub u: f64,
    /// V parameter on the surface.
    pub v: f64,
    /// 3D point on the surface.
    pub point: Point3,
    /// Distance from the query point to the surface point.
    pub distance: f64,
}

const MAX_ITERATIONS: usize = 30;
const SEARCH_GRID: usize = 16;

/// Brings `(u, v)` into `bounds`: periodic directions are wrapped, the
/// others are clamped.
#[must_use]
pub fn fit_to_domain(
    surface: &dyn Surface,
    bounds: &SurfaceDomain,
    u: f64,
    v: f64,
) -> (f64, f64) {
    let u = match surface.period_u() {
        Some(p) => wrap_periodic(u, bounds.u_min, p),
        None => u.clamp(bounds.u_min, bounds.u_max),
    };
    let v = match surface.period_v() {
        Some(p) => wrap_periodic(v, bounds.v_min, p),
        None => v.clamp(bounds.v_min, bounds.v_max),
    };
    (u, v)
}

/// Finds the point of `surface` inside `bounds` closest to `query`.
///
/// Starts from `hint`, or the surface's closed-form inverse, or the best
/// node of a coarse grid over `bounds`, and polishes with Gauss-Newton.
///
/// # Errors
///
/// Returns an error if no starting point can be found (unbounded domain and
/// no closed form) or the surface fails to evaluate.
pub fn project_point(
    surface: &dyn Surface,
    bounds: &SurfaceDomain,
    query: &Point3,
    hint: Option<(f64, f64)>,
) -> Result<SurfacePoint> {
    let (mut u, mut v) = match hint.or_else(|| surface.parameters_of(query)) {
        Some(uv) => uv,
        None => grid_start(surface, bounds, query)?,
    };
    (u, v) = fit_to_domain(surface, bounds, u, v);

    for _ in 0..MAX_ITERATIONS {
        let d = surface.derivatives(u, v)?;
        let r = query - d.point;
        let a = Matrix2::new(
            d.du.dot(&d.du),
            d.du.dot(&d.dv),
            d.du.dot(&d.dv),
            d.dv.dot(&d.dv),
        );
        let Some(inv) = a.try_inverse() else {
            break;
        };
        let step = inv * Vector2::new(d.du.dot(&r), d.dv.dot(&r));
        let (nu, nv) = fit_to_domain(surface, bounds, u + step.x, v + step.y);
        let moved = (nu - u).hypot(nv - v);
        u = nu;
        v = nv;
        if moved < PARAM_TOLERANCE {
            break;
        }
    }

    let point = surface.evaluate(u, v)?;
    Ok(SurfacePoint {
        u,
        v,
        point,
        distance: (query - point).norm(),
    })
}

#[allow(clippy::cast_precision_loss)]
fn grid_start(
    surface: &dyn Surface,
    bounds: &SurfaceDomain,
    query: &Point3,
) -> Result<(f64, f64)> {
    if !bounds.is_bounded() {
        return Err(GeometryError::Degenerate(
            "cannot search an unbounded domain without a closed-form inverse".into(),
        )
        .into());
    }
    let n = SEARCH_GRID as f64;
    let mut best = (bounds.u_min, bounds.v_min, f64::INFINITY);
    for i in 0..=SEARCH_GRID {
        let u = bounds.u_min + (bounds.u_max - bounds.u_min) * (i as f64) / n;
        for j in 0..=SEARCH_GRID {
            let v = bounds.v_min + (bounds.v_max - bounds.v_min) * (j as f64) / n;
            let dist = (surface.evaluate(u, v)? - query).norm_squared();
            if dist < best.2 {
                best = (u, v, dist);
            }
        }
    }
    Ok((best.0, best.1))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::surface::{BezierSurface, Cylinder, Plane, Sphere};
    use crate::math::Vector3;
    use std::f64::consts::TAU;

    #[test]
    fn plane_projection_is_exact() {
        let plane = Plane::from_normal(Point3::origin(), Vector3::z()).unwrap();
        let bounds = SurfaceDomain::new(-10.0, 10.0, -10.0, 10.0);
        let sp = project_point(&plane, &bounds, &Point3::new(1.0, 2.0, 3.0), None).unwrap();
        assert!((sp.distance - 3.0).abs() < 1e-12);
        assert!((sp.point - Point3::new(1.0, 2.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn sphere_projection_from_outside() {
        let s = Sphere::new(Point3::origin(), 2.0, Vector3::z(), Vector3::x()).unwrap();
        let sp = project_point(&s, &s.domain(), &Point3::new(0.0, 4.0, 0.0), None).unwrap();
        assert!((sp.distance - 2.0).abs() < 1e-9);
        assert!((sp.point - Point3::new(0.0, 2.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn wraps_periodic_parameter() {
        let c = Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let bounds = SurfaceDomain::new(0.0, TAU, -1.0, 1.0);
        let (u, v) = fit_to_domain(&c, &bounds, -0.5, 3.0);
        assert!((u - (TAU - 0.5)).abs() < 1e-12);
        assert!((v - 1.0).abs() < 1e-12);
    }

    #[test]
    fn grid_search_finds_bezier_point() {
        let poles = vec![
            vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            vec![Point3::new(1.0, 0.0, 1.0), Point3::new(1.0, 1.0, 1.0)],
        ];
        let s = BezierSurface::new(poles).unwrap();
        let target = s.evaluate(0.37, 0.81).unwrap();
        let sp = project_point(&s, &s.domain(), &target, None).unwrap();
        assert!(sp.distance < 1e-9);
        assert!((sp.u - 0.37).abs() < 1e-7);
        assert!((sp.v - 0.81).abs() < 1e-7);
    }

    #[test]
    fn unbounded_without_inverse_fails() {
        #[derive(Debug)]
        struct Sheet;
        impl Surface for Sheet {
            fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
                Ok(Point3::new(u, v, 0.0))
            }
            fn domain(&self) -> SurfaceDomain {
                SurfaceDomain::new(f64::NEG_INFINITY, f64::INFINITY, 0.0, 1.0)
            }
            fn kind(&self) -> crate::geometry::surface::SurfaceKind {
                crate::geometry::surface::SurfaceKind::Other
            }
        }
        assert!(project_point(&Sheet, &Sheet.domain(), &Point3::origin(), None).is_err());
    }
}
