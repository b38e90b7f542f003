//! Classification checks around the main strategies: coincident faces,
//! singular parameter points and per-point tangency.

use std::f64::consts::TAU;

use tracing::debug;

use crate::boundary::Region;
use crate::geometry::projection::project_point;
use crate::geometry::surface::Surface;
use crate::math::{Point2, Point3, CONFUSION};

use super::line::{AnalyticCurve, IntersectionLine};
use super::march::{distance_to_segment, Marcher};
use super::point::{IntersectionPoint, PointOn2S, SurfaceSide};

/// `|n1 x n2|` below which a point counts as a tangential contact.
const TANGENT_SINE: f64 = 1e-6;

/// Interior samples per direction in the coincidence test.
const INTERIOR_GRID: usize = 4;

/// Whether the surfaces touch tangentially at `p`. Degenerate normals do not
/// count as tangency.
#[must_use]
pub(crate) fn tangent_at(s1: &dyn Surface, s2: &dyn Surface, p: &PointOn2S) -> bool {
    let (a, b) = (p.uv1(), p.uv2());
    match (s1.normal(a.x, a.y), s2.normal(b.x, b.y)) {
        (Ok(n1), Ok(n2)) => n1.cross(&n2).norm() < TANGENT_SINE,
        _ => false,
    }
}

/// Checks whether one face lies entirely on the other's surface.
///
/// Returns `Some(opposite)` when every boundary sample and every interior
/// sample of one side is within `tol_tang` of the other surface, with
/// `opposite` telling whether the normals point away from each other.
#[must_use]
pub(crate) fn coincident_faces(
    s1: &dyn Surface,
    r1: &Region,
    s2: &dyn Surface,
    r2: &Region,
    tol_tang: f64,
    arc_samples: usize,
) -> Option<bool> {
    [(s1, r1, s2), (s2, r2, s1)]
        .into_iter()
        .find_map(|(own, region, other)| {
            let samples = face_samples(region, arc_samples);
            if samples.is_empty() {
                return None;
            }
            let mut opposite = None;
            for uv in &samples {
                let p = own.evaluate(uv.x, uv.y).ok()?;
                let foot = project_point(other, &other.domain(), &p, None).ok()?;
                if foot.distance > tol_tang {
                    return None;
                }
                if opposite.is_none() {
                    if let (Ok(n_own), Ok(n_other)) =
                        (own.normal(uv.x, uv.y), other.normal(foot.u, foot.v))
                    {
                        opposite = Some(n_own.dot(&n_other) < 0.0);
                    }
                }
            }
            Some(opposite.unwrap_or(false))
        })
}

/// Trimming-arc samples plus a grid of interior points of the region.
#[allow(clippy::cast_precision_loss)]
fn face_samples(region: &Region, arc_samples: usize) -> Vec<Point2> {
    let mut out: Vec<Point2> = region
        .trim_arcs()
        .flat_map(|(_, arc)| arc.samples(arc_samples).into_iter().map(|(_, uv)| uv))
        .collect();
    let b = region.bounds();
    let n = INTERIOR_GRID as f64;
    for i in 1..INTERIOR_GRID {
        for j in 1..INTERIOR_GRID {
            let u = b.u_min + (b.u_max - b.u_min) * i as f64 / n;
            let v = b.v_min + (b.v_max - b.v_min) * j as f64 / n;
            if region.contains(u, v, 0.0) {
                out.push(Point2::new(u, v));
            }
        }
    }
    out
}

/// Distance from a singular point of one surface to the other surface.
pub trait SingularDistance {
    /// Minimal distance from `point` to `surface` inside `region`, with the
    /// parameters of the nearest point.
    fn distance(&self, point: &Point3, surface: &dyn Surface, region: &Region)
        -> Option<(f64, Point2)>;
}

/// Closest-point projection onto the other surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionDistance;

impl SingularDistance for ProjectionDistance {
    fn distance(
        &self,
        point: &Point3,
        surface: &dyn Surface,
        region: &Region,
    ) -> Option<(f64, Point2)> {
        let foot = project_point(surface, region.bounds(), point, None).ok()?;
        Some((foot.distance, Point2::new(foot.u, foot.v)))
    }
}

/// Singular parameter points of either surface that touch the other surface
/// and are not yet on any line or point.
///
/// Points farther than the tangential tolerance are ignored.
pub(crate) fn singular_contacts(
    marcher: &Marcher<'_>,
    metric: &dyn SingularDistance,
    lines: &[IntersectionLine],
    points: &[IntersectionPoint],
) -> Vec<IntersectionPoint> {
    let known = (0.05 * marcher.step).max(CONFUSION).max(10.0 * marcher.tol_tang);
    let mut found: Vec<IntersectionPoint> = Vec::new();

    for side in [SurfaceSide::First, SurfaceSide::Second] {
        let (own, own_region, other, other_region) = match side {
            SurfaceSide::First => (marcher.s1, marcher.r1, marcher.s2, marcher.r2),
            SurfaceSide::Second => (marcher.s2, marcher.r2, marcher.s1, marcher.r1),
        };
        for (u, v) in own.singular_points() {
            if !own_region.contains(u, v, CONFUSION) {
                continue;
            }
            let Ok(p) = own.evaluate(u, v) else {
                continue;
            };
            let Some((distance, other_uv)) = metric.distance(&p, other, other_region) else {
                continue;
            };
            if distance > marcher.tol_tang {
                debug!(?side, distance, "singular point clear of the other surface");
                continue;
            }
            let already = lines.iter().any(|l| line_distance(l, &p) <= known)
                || points.iter().chain(&found).any(|q| (q.point() - p).norm() <= known);
            if already {
                continue;
            }

            let own_uv = Point2::new(u, v);
            let (uv1, uv2) = match side {
                SurfaceSide::First => (own_uv, other_uv),
                SurfaceSide::Second => (other_uv, own_uv),
            };
            let p2s = PointOn2S::new(p, uv1, uv2);
            let mut vertex = IntersectionPoint::new(p2s, 0.0).with_tangent(true);
            for s in [SurfaceSide::First, SurfaceSide::Second] {
                vertex.set_incidence(s, marcher.incidence_near(s, &p2s.uv(s), &p));
            }
            debug!(?side, ?p, "singular point touches the other surface");
            found.push(vertex);
        }
    }
    found
}

/// Distance from `p` to a line, through its samples or its carrier.
fn line_distance(line: &IntersectionLine, p: &Point3) -> f64 {
    let vertex_best = line
        .vertices()
        .points()
        .iter()
        .map(|v| (v.point() - p).norm())
        .fold(f64::INFINITY, f64::min);
    let along = match line {
        IntersectionLine::Analytic(a) => carrier_distance(a.curve(), a.range(), p),
        _ => line
            .samples()
            .windows(2)
            .map(|w| distance_to_segment(p, w[0].point(), w[1].point()))
            .fold(f64::INFINITY, f64::min),
    };
    vertex_best.min(along)
}

/// Distance from `p` to the piece `[t0, t1]` of a carrier.
fn carrier_distance(curve: &AnalyticCurve, (t0, t1): (f64, f64), p: &Point3) -> f64 {
    let t = curve.parameter_of(p);
    [t0, t1, t, t + TAU, t - TAU]
        .into_iter()
        .filter(|s| (t0..=t1).contains(s))
        .filter_map(|s| curve.evaluate(s).ok())
        .map(|q| (q - p).norm())
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::boundary::Boundary;
    use crate::geometry::surface::{Plane, Sphere, SurfaceDomain};
    use crate::math::Vector3;

    fn square(s: &dyn Surface, half: f64) -> Region {
        let b = Boundary::rectangle(&SurfaceDomain::new(-half, half, -half, half)).unwrap();
        Region::new(s, &b, 8).unwrap()
    }

    #[test]
    fn tangency_from_normals() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::x(), Vector3::y()).unwrap();
        let sphere = Sphere::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let top = PointOn2S::new(
            Point3::new(0.0, 0.0, 1.0),
            Point2::origin(),
            Point2::new(0.0, std::f64::consts::FRAC_PI_2),
        );
        assert!(tangent_at(&plane, &sphere, &top));
        let side =
            PointOn2S::new(Point3::new(1.0, 0.0, 0.0), Point2::new(1.0, 0.0), Point2::origin());
        assert!(!tangent_at(&plane, &sphere, &side));
    }

    #[test]
    fn same_plane_is_coincident_not_opposite() {
        let a = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let b = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let (ra, rb) = (square(&a, 1.0), square(&b, 1.0));
        assert_eq!(coincident_faces(&a, &ra, &b, &rb, 1e-7, 8), Some(false));
    }

    #[test]
    fn flipped_plane_is_opposite() {
        let a = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let b = Plane::new(Point3::origin(), Vector3::y(), Vector3::x()).unwrap();
        let (ra, rb) = (square(&a, 1.0), square(&b, 3.0));
        assert_eq!(coincident_faces(&a, &ra, &b, &rb, 1e-7, 8), Some(true));
    }

    #[test]
    fn crossing_planes_are_not_coincident() {
        let a = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let b = Plane::new(Point3::origin(), Vector3::x(), Vector3::z()).unwrap();
        let (ra, rb) = (square(&a, 1.0), square(&b, 1.0));
        assert_eq!(coincident_faces(&a, &ra, &b, &rb, 1e-7, 8), None);
    }

    #[test]
    fn projection_distance_reports_gap() {
        let plane = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let r = square(&plane, 2.0);
        let (d, uv) = ProjectionDistance
            .distance(&Point3::new(0.5, -0.5, 0.3), &plane, &r)
            .unwrap();
        assert!((d - 0.3).abs() < 1e-9);
        assert!((uv - Point2::new(0.5, -0.5)).norm() < 1e-9);
    }
}
