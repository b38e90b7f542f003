//! Closed-form intersections of planes and quadrics, clipped to both
//! trimmed regions.

use std::f64::consts::TAU;

use tracing::{debug, instrument};

use crate::geometry::curve::{Circle, Line};
use crate::geometry::surface::AnalyticSurface;
use crate::math::intersect_3d::{
    plane_cylinder_intersect, plane_plane_intersect, plane_sphere_intersect,
    sphere_sphere_intersect, PlanePairRelation, QuadricPairRelation,
};
use crate::math::{Point2, Point3, Vector3, PARAM_TOLERANCE};

use super::diagnostics::tangent_at;
use super::line::{AnalyticCurve, AnalyticLine, IntersectionLine, LineVertices};
use super::march::{region_box, Marcher};
use super::point::{IntersectionPoint, PointOn2S, SurfaceSide};

/// Carrier samples used to find the pieces inside both regions.
const CLIP_SAMPLES: usize = 512;
const BISECTIONS: usize = 60;

/// Lines and isolated points of a closed-form intersection.
#[derive(Debug, Default)]
pub(crate) struct AnalyticOutcome {
    pub lines: Vec<IntersectionLine>,
    pub points: Vec<IntersectionPoint>,
}

/// Closed-form carrier of a surface pair, before clipping.
enum Carrier {
    Empty,
    Point(Point3),
    Curves(Vec<AnalyticCurve>),
}

/// Intersects the pair in closed form. Returns `None` when the pair has no
/// closed form here, so the caller can march instead.
#[instrument(skip_all, fields(s1 = marcher.s1.kind().name(), s2 = marcher.s2.kind().name()))]
pub(crate) fn intersect(marcher: &Marcher<'_>) -> Option<AnalyticOutcome> {
    let carrier = carrier(marcher)?;
    let mut outcome = AnalyticOutcome::default();
    match carrier {
        Carrier::Empty => {}
        Carrier::Point(p) => {
            if let Some(p2s) = locate(marcher, &p) {
                let mut vertex = IntersectionPoint::new(p2s, 0.0).with_tangent(true);
                for side in [SurfaceSide::First, SurfaceSide::Second] {
                    vertex.set_incidence(side, marcher.incidence_near(side, &p2s.uv(side), &p));
                }
                outcome.points.push(vertex);
            }
        }
        Carrier::Curves(curves) => {
            for curve in curves {
                clip(marcher, curve, &mut outcome.lines);
            }
        }
    }
    debug!(
        lines = outcome.lines.len(),
        points = outcome.points.len(),
        "closed-form intersection"
    );
    Some(outcome)
}

fn carrier(marcher: &Marcher<'_>) -> Option<Carrier> {
    let tol = marcher.tol_tang;
    let relation = match (marcher.s1.analytic()?, marcher.s2.analytic()?) {
        (AnalyticSurface::Plane(a), AnalyticSurface::Plane(b)) => {
            return Some(match plane_plane_intersect(a, b, tol) {
                PlanePairRelation::IntersectionLine { origin, direction } => {
                    let line = Line::new(origin, direction).ok()?;
                    Carrier::Curves(vec![AnalyticCurve::Line(line)])
                }
                PlanePairRelation::Parallel { .. } | PlanePairRelation::Coincident => {
                    Carrier::Empty
                }
            });
        }
        (AnalyticSurface::Plane(p), AnalyticSurface::Sphere(s))
        | (AnalyticSurface::Sphere(s), AnalyticSurface::Plane(p)) => {
            plane_sphere_intersect(p, s, tol)
        }
        (AnalyticSurface::Sphere(a), AnalyticSurface::Sphere(b)) => {
            sphere_sphere_intersect(a, b, tol)
        }
        (AnalyticSurface::Plane(p), AnalyticSurface::Cylinder(c))
        | (AnalyticSurface::Cylinder(c), AnalyticSurface::Plane(p)) => {
            plane_cylinder_intersect(p, c, tol)
        }
        _ => return None,
    };
    Some(match relation {
        QuadricPairRelation::Empty | QuadricPairRelation::Coincident => Carrier::Empty,
        QuadricPairRelation::Point(p) => Carrier::Point(p),
        QuadricPairRelation::Circle {
            center,
            radius,
            normal,
        } => Carrier::Curves(vec![AnalyticCurve::Circle(
            Circle::from_normal(center, radius, normal).ok()?,
        )]),
        QuadricPairRelation::Lines(lines) => Carrier::Curves(
            lines
                .into_iter()
                .map(|(o, d)| Line::new(o, d).map(AnalyticCurve::Line))
                .collect::<crate::error::Result<_>>()
                .ok()?,
        ),
        QuadricPairRelation::Unsupported => return None,
    })
}

/// Parameters of `p` on both surfaces, if it lies inside both regions.
fn locate(marcher: &Marcher<'_>, p: &Point3) -> Option<PointOn2S> {
    let (u1, v1) = marcher.s1.parameters_of(p)?;
    let (u2, v2) = marcher.s2.parameters_of(p)?;
    if !marcher.r1.contains(u1, v1, PARAM_TOLERANCE)
        || !marcher.r2.contains(u2, v2, PARAM_TOLERANCE)
    {
        return None;
    }
    let (u1, v1) = marcher.r1.wrap(u1, v1);
    let (u2, v2) = marcher.r2.wrap(u2, v2);
    Some(PointOn2S::new(*p, Point2::new(u1, v1), Point2::new(u2, v2)))
}

/// Samples the carrier, and emits one line per run of samples inside both
/// regions, with run ends bisected onto the boundary.
fn clip(marcher: &Marcher<'_>, curve: AnalyticCurve, out: &mut Vec<IntersectionLine>) {
    let Some(ts) = sample_parameters(marcher, &curve) else {
        return;
    };
    let inside = |t: f64| {
        curve
            .evaluate(t)
            .ok()
            .and_then(|p| locate(marcher, &p))
            .is_some()
    };
    let flags: Vec<bool> = ts.iter().map(|&t| inside(t)).collect();

    if curve.is_closed() && flags.iter().all(|f| *f) {
        out.push(IntersectionLine::Analytic(AnalyticLine::new(
            curve.clone(),
            0.0,
            TAU,
            LineVertices::default(),
        )));
        return;
    }

    let bisect = |mut out_t: f64, mut in_t: f64| {
        for _ in 0..BISECTIONS {
            let mid = 0.5 * (out_t + in_t);
            if inside(mid) {
                in_t = mid;
            } else {
                out_t = mid;
            }
        }
        in_t
    };

    let mut runs = Vec::new();
    let mut i = 0;
    while i < ts.len() {
        if !flags[i] {
            i += 1;
            continue;
        }
        let start = i;
        while i + 1 < ts.len() && flags[i + 1] {
            i += 1;
        }
        let t_lo = if start == 0 { ts[0] } else { bisect(ts[start - 1], ts[start]) };
        let t_hi = if i + 1 == ts.len() { ts[i] } else { bisect(ts[i + 1], ts[i]) };
        runs.push((t_lo, t_hi));
        i += 1;
    }

    for (t_lo, t_hi) in runs {
        let vertices: Vec<IntersectionPoint> = [t_lo, t_hi]
            .into_iter()
            .filter_map(|t| end_vertex(marcher, &curve, t))
            .collect();
        out.push(IntersectionLine::Analytic(AnalyticLine::new(
            curve.clone(),
            t_lo,
            t_hi,
            LineVertices::ordered(vertices),
        )));
    }
}

/// Sample parameters along the carrier. Circles start at an outside sample
/// so no inside run straddles the start; lines span the overlap of both
/// regions' 3D boxes.
#[allow(clippy::cast_precision_loss)]
fn sample_parameters(marcher: &Marcher<'_>, curve: &AnalyticCurve) -> Option<Vec<f64>> {
    let n = CLIP_SAMPLES;
    match curve {
        AnalyticCurve::Circle(_) => {
            let dt = TAU / n as f64;
            let offset = (0..n)
                .map(|k| k as f64 * dt)
                .find(|&t| {
                    curve
                        .evaluate(t)
                        .ok()
                        .and_then(|p| locate(marcher, &p))
                        .is_none()
                })
                .unwrap_or(0.0);
            Some((0..=n).map(|k| offset + k as f64 * dt).collect())
        }
        AnalyticCurve::Line(line) => {
            let span = |(lo, hi): (Vector3, Vector3)| {
                let mut range = (f64::INFINITY, f64::NEG_INFINITY);
                for c in 0..8 {
                    let corner = Vector3::new(
                        if c & 1 == 0 { lo.x } else { hi.x },
                        if c & 2 == 0 { lo.y } else { hi.y },
                        if c & 4 == 0 { lo.z } else { hi.z },
                    );
                    let t = (corner - line.origin().coords).dot(line.direction());
                    range = (range.0.min(t), range.1.max(t));
                }
                range
            };
            let a = span(region_box(marcher.s1, marcher.r1));
            let b = span(region_box(marcher.s2, marcher.r2));
            let (t0, t1) = (a.0.max(b.0), a.1.min(b.1));
            if !(t0.is_finite() && t1.is_finite()) || t1 < t0 {
                return None;
            }
            let pad = 1e-6 * (t1 - t0).max(1.0);
            let (t0, t1) = (t0 - pad, t1 + pad);
            Some((0..=n).map(|k| t0 + (t1 - t0) * k as f64 / n as f64).collect())
        }
    }
}

fn end_vertex(marcher: &Marcher<'_>, curve: &AnalyticCurve, t: f64) -> Option<IntersectionPoint> {
    let p = curve.evaluate(t).ok()?;
    let p2s = locate(marcher, &p)?;
    let mut vertex =
        IntersectionPoint::new(p2s, t).with_tangent(tangent_at(marcher.s1, marcher.s2, &p2s));
    for side in [SurfaceSide::First, SurfaceSide::Second] {
        vertex.set_incidence(side, marcher.incidence_near(side, &p2s.uv(side), &p));
    }
    Some(vertex)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::boundary::{Boundary, Region};
    use crate::geometry::surface::{Cone, Plane, Sphere, Surface, SurfaceDomain};
    use crate::intersection::line::LineKind;

    fn marcher<'a>(
        s1: &'a dyn Surface,
        r1: &'a Region,
        s2: &'a dyn Surface,
        r2: &'a Region,
    ) -> Marcher<'a> {
        Marcher {
            s1,
            s2,
            r1,
            r2,
            tol_arc: 1e-6,
            tol_tang: 1e-9,
            step: 0.05,
            max_samples: 2000,
            max_turn: 0.25,
        }
    }

    fn square(s: &dyn Surface, lo: f64, hi: f64) -> Region {
        let b = Boundary::rectangle(&SurfaceDomain::new(lo, hi, lo, hi)).unwrap();
        Region::new(s, &b, 8).unwrap()
    }

    #[test]
    fn crossing_planes_clip_to_both_squares() {
        let a = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let b = Plane::new(Point3::origin(), Vector3::y(), Vector3::z()).unwrap();
        let (ra, rb) = (square(&a, -1.0, 1.0), square(&b, -0.5, 0.5));
        let out = intersect(&marcher(&a, &ra, &b, &rb)).unwrap();
        assert_eq!(out.lines.len(), 1);
        let line = &out.lines[0];
        assert_eq!(line.kind(), LineKind::Analytic);
        assert_eq!(line.nb_vertices(), 2);
        // The line x = z = 0 is cut by the smaller square at y = +-0.5.
        for v in line.vertices().points() {
            assert!((v.point().y.abs() - 0.5).abs() < 1e-8);
            assert!(v.is_on(SurfaceSide::Second));
            assert!(!v.is_on(SurfaceSide::First));
        }
        let (t0, t1) = match line {
            IntersectionLine::Analytic(a) => a.range(),
            _ => unreachable!(),
        };
        assert!((t1 - t0 - 1.0).abs() < 1e-8);
    }

    #[test]
    fn plane_through_sphere_gives_full_circle() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 0.5), Vector3::x(), Vector3::y()).unwrap();
        let sphere = Sphere::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let rp = square(&plane, -2.0, 2.0);
        let rs = Region::new(&sphere, &Boundary::natural(&sphere).unwrap(), 8).unwrap();
        let out = intersect(&marcher(&plane, &rp, &sphere, &rs)).unwrap();
        assert_eq!(out.lines.len(), 1);
        assert!(out.lines[0].is_closed());
        assert_eq!(out.lines[0].nb_vertices(), 0);
    }

    #[test]
    fn circle_cut_by_trim_straddles_start() {
        // Square [0, 2]^2 keeps a quarter of the circle, around angle pi/4.
        let plane = Plane::new(Point3::new(0.0, 0.0, 0.5), Vector3::x(), Vector3::y()).unwrap();
        let sphere = Sphere::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let rp = square(&plane, 0.0, 2.0);
        let rs = Region::new(&sphere, &Boundary::natural(&sphere).unwrap(), 8).unwrap();
        let out = intersect(&marcher(&sphere, &rs, &plane, &rp)).unwrap();
        assert_eq!(out.lines.len(), 1);
        let line = &out.lines[0];
        assert_eq!(line.nb_vertices(), 2);
        let first = line.first_vertex().unwrap();
        let last = line.last_vertex().unwrap();
        assert!(first.param_on_line() < last.param_on_line());
        assert!(first.is_on(SurfaceSide::Second) && last.is_on(SurfaceSide::Second));
        let r = 0.75_f64.sqrt();
        assert!((first.point().coords.xy().norm() - r).abs() < 1e-9);
    }

    #[test]
    fn tangent_plane_gives_isolated_point() {
        let plane = Plane::new(Point3::new(0.0, 0.0, 1.0), Vector3::x(), Vector3::y()).unwrap();
        let sphere = Sphere::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let rp = square(&plane, -2.0, 2.0);
        let rs = Region::new(&sphere, &Boundary::natural(&sphere).unwrap(), 8).unwrap();
        let out = intersect(&marcher(&plane, &rp, &sphere, &rs)).unwrap();
        assert!(out.lines.is_empty());
        assert_eq!(out.points.len(), 1);
        assert!(out.points[0].is_tangent());
    }

    #[test]
    fn cone_pair_has_no_closed_form() {
        let plane = Plane::new(Point3::origin(), Vector3::x(), Vector3::y()).unwrap();
        let cone = Cone::new(Point3::origin(), Vector3::z(), 0.5, Vector3::x()).unwrap();
        let rp = square(&plane, -1.0, 1.0);
        let rc = Region::new(
            &cone,
            &Boundary::natural_within(&cone, &SurfaceDomain::new(0.0, TAU, 0.0, 1.0)).unwrap(),
            8,
        )
        .unwrap();
        assert!(intersect(&marcher(&plane, &rp, &cone, &rc)).is_none());
    }
}
