//! Raw candidate points and their chaining into lines, for surfaces that
//! give the marcher nothing to hold on to.

use tracing::{debug, instrument};

use crate::boundary::Region;
use crate::geometry::projection::project_point;
use crate::geometry::surface::Surface;
use crate::math::{Point2, Point3, CONFUSION};

use super::diagnostics::tangent_at;
use super::line::{IntersectionLine, PointLine};
use super::march::{distance_to_segment, Marcher, Trace};
use super::point::{IntersectionPoint, PointOn2S, SurfaceSide};
use super::refine::PointRefiner;

/// Parameter-space slack for containment of refined candidates.
const UV_SLACK: f64 = 1e-7;

/// Numeric source of approximate intersection points `(u1, v1, u2, v2)`.
pub trait CandidateSource {
    fn candidates(
        &self,
        s1: &dyn Surface,
        r1: &Region,
        s2: &dyn Surface,
        r2: &Region,
    ) -> Vec<[f64; 4]>;
}

/// Sign changes of the distance to the other surface along iso-parameter
/// lines of each surface.
#[derive(Debug, Clone, Copy)]
pub struct GridCandidates {
    /// Iso-lines per direction, and samples per iso-line.
    pub density: usize,
}

impl Default for GridCandidates {
    fn default() -> Self {
        Self { density: 16 }
    }
}

impl CandidateSource for GridCandidates {
    fn candidates(
        &self,
        s1: &dyn Surface,
        r1: &Region,
        s2: &dyn Surface,
        r2: &Region,
    ) -> Vec<[f64; 4]> {
        let mut out = Vec::new();
        for side in [SurfaceSide::First, SurfaceSide::Second] {
            let (own, own_region, other, other_region) = match side {
                SurfaceSide::First => (s1, r1, s2, r2),
                SurfaceSide::Second => (s2, r2, s1, r1),
            };
            for line in iso_lines(own_region, self.density) {
                let gaps: Vec<Option<(Point2, f64, Point2)>> = line
                    .into_iter()
                    .map(|uv| {
                        if !own_region.contains(uv.x, uv.y, UV_SLACK) {
                            return None;
                        }
                        let p = own.evaluate(uv.x, uv.y).ok()?;
                        let (gap, other_uv) = signed_gap(&p, other, other_region)?;
                        Some((uv, gap, other_uv))
                    })
                    .collect();
                for w in gaps.windows(2) {
                    let (Some((a, ga, oa)), Some((b, gb, ob))) = (w[0], w[1]) else {
                        continue;
                    };
                    if (ga > 0.0) == (gb > 0.0) {
                        continue;
                    }
                    let f = ga / (ga - gb);
                    let own_uv = a + (b - a) * f;
                    let other_uv = oa + (ob - oa) * f;
                    out.push(match side {
                        SurfaceSide::First => [own_uv.x, own_uv.y, other_uv.x, other_uv.y],
                        SurfaceSide::Second => [other_uv.x, other_uv.y, own_uv.x, own_uv.y],
                    });
                }
            }
        }
        out
    }
}

/// Sample points along `density + 1` lines of constant U, then of constant V.
#[allow(clippy::cast_precision_loss)]
fn iso_lines(region: &Region, density: usize) -> Vec<Vec<Point2>> {
    let n = density.max(2);
    let b = region.bounds();
    let at = |lo: f64, hi: f64, i: usize| lo + (hi - lo) * i as f64 / n as f64;
    let mut lines = Vec::with_capacity(2 * (n + 1));
    for i in 0..=n {
        let u = at(b.u_min, b.u_max, i);
        lines.push((0..=n).map(|j| Point2::new(u, at(b.v_min, b.v_max, j))).collect());
    }
    for j in 0..=n {
        let v = at(b.v_min, b.v_max, j);
        lines.push((0..=n).map(|i| Point2::new(at(b.u_min, b.u_max, i), v)).collect());
    }
    lines
}

/// Signed distance from `point` to `surface` (positive on the normal side)
/// and the parameters of the foot point inside the region bounds.
pub(crate) fn signed_gap(
    point: &Point3,
    surface: &dyn Surface,
    region: &Region,
) -> Option<(f64, Point2)> {
    let foot = project_point(surface, region.bounds(), point, None).ok()?;
    let n = surface.normal(foot.u, foot.v).ok()?;
    Some(((point - foot.point).dot(&n), Point2::new(foot.u, foot.v)))
}

/// Refines raw candidates onto both surfaces, keeping those inside both
/// regions and not repeating an earlier one.
pub(crate) fn refine_candidates(
    raw: &[[f64; 4]],
    marcher: &Marcher<'_>,
    refiner: &dyn PointRefiner,
) -> Vec<PointOn2S> {
    let merge = CONFUSION.max(10.0 * marcher.tol_tang);
    let mut out: Vec<PointOn2S> = Vec::new();
    for guess in raw {
        let Some(p) = refiner.refine(marcher.s1, marcher.s2, *guess, marcher.tol_tang) else {
            continue;
        };
        let (uv1, uv2) = (p.uv1(), p.uv2());
        if !marcher.r1.contains(uv1.x, uv1.y, UV_SLACK)
            || !marcher.r2.contains(uv2.x, uv2.y, UV_SLACK)
        {
            continue;
        }
        if out.iter().any(|q| (q.point() - p.point()).norm() <= merge) {
            continue;
        }
        let (u1, v1) = marcher.r1.wrap(uv1.x, uv1.y);
        let (u2, v2) = marcher.r2.wrap(uv2.x, uv2.y);
        out.push(PointOn2S::new(*p.point(), Point2::new(u1, v1), Point2::new(u2, v2)));
    }
    out
}

/// Orders refined candidates into chains of neighbours at most `link` apart
/// and turns each chain into a line.
///
/// Chains of one point become point lines unless they sit on another chain.
#[instrument(skip_all, fields(points = points.len(), link))]
pub(crate) fn chain_into_lines(
    points: Vec<PointOn2S>,
    link: f64,
    marcher: &Marcher<'_>,
) -> Vec<IntersectionLine> {
    let mut unused: Vec<Option<PointOn2S>> = points.into_iter().map(Some).collect();
    let mut chains: Vec<Vec<PointOn2S>> = Vec::new();

    while let Some(start) = unused.iter_mut().find_map(Option::take) {
        let mut chain = vec![start];
        extend_chain(&mut chain, &mut unused, link);
        chain.reverse();
        extend_chain(&mut chain, &mut unused, link);
        chains.push(chain);
    }

    let on_longer_chain = |p: &PointOn2S, chains: &[Vec<PointOn2S>]| {
        chains.iter().filter(|c| c.len() > 1).any(|c| {
            c.windows(2)
                .any(|w| distance_to_segment(p.point(), w[0].point(), w[1].point()) <= link)
        })
    };

    let mut lines = Vec::new();
    for chain in &chains {
        if chain.len() == 1 {
            if on_longer_chain(&chain[0], &chains) {
                continue;
            }
            let vertex = end_vertex(marcher, &chain[0], 0.0);
            lines.push(IntersectionLine::Point(PointLine::new(vertex)));
            continue;
        }
        let closed = chain.len() > 2 && {
            let (a, b) = (chain[0].point(), chain[chain.len() - 1].point());
            (a - b).norm() <= link
        };
        let raw = if closed {
            Vec::new()
        } else {
            #[allow(clippy::cast_precision_loss)]
            let last = (chain.len() - 1) as f64;
            vec![
                end_vertex(marcher, &chain[0], 0.0),
                end_vertex(marcher, &chain[chain.len() - 1], last),
            ]
        };
        let trace = Trace {
            samples: chain.clone(),
            raw,
            closed,
            exhausted: false,
        };
        lines.push(trace.into_line());
    }
    debug!(chains = chains.len(), lines = lines.len(), "chained candidates");
    lines
}

/// Grows `chain` at its tail with the nearest unused point within `link`
/// that lies ahead of the last segment.
fn extend_chain(chain: &mut Vec<PointOn2S>, pool: &mut [Option<PointOn2S>], link: f64) {
    while let Some(tail) = chain.last().map(|p| *p.point()) {
        let heading = chain
            .len()
            .checked_sub(2)
            .map(|i| tail - chain[i].point());
        let nearest = pool
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (i, p.point() - tail)))
            .filter(|(_, d)| d.norm() <= link && heading.map_or(true, |h| d.dot(&h) > 0.0))
            .min_by(|a, b| a.1.norm().total_cmp(&b.1.norm()));
        match nearest.and_then(|(i, _)| pool[i].take()) {
            Some(next) => chain.push(next),
            None => break,
        }
    }
}

fn end_vertex(marcher: &Marcher<'_>, p: &PointOn2S, param: f64) -> IntersectionPoint {
    let mut vertex =
        IntersectionPoint::new(*p, param).with_tangent(tangent_at(marcher.s1, marcher.s2, p));
    for side in [SurfaceSide::First, SurfaceSide::Second] {
        vertex.set_incidence(side, marcher.incidence_near(side, &p.uv(side), p.point()));
    }
    vertex
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::boundary::Boundary;
    use crate::geometry::surface::{GridSurface, Plane, SurfaceDomain};
    use crate::intersection::line::LineKind;
    use crate::intersection::march::default_step;
    use crate::intersection::refine::NewtonRefiner;
    use crate::math::Vector3;

    fn bowl() -> GridSurface {
        let stations: Vec<f64> = (0..=8).map(|i| -1.0 + f64::from(i) * 0.25).collect();
        let samples = stations
            .iter()
            .map(|&x| {
                stations
                    .iter()
                    .map(|&y| Point3::new(x, y, x * x + y * y))
                    .collect()
            })
            .collect();
        GridSurface::new(samples, SurfaceDomain::new(-1.0, 1.0, -1.0, 1.0)).unwrap()
    }

    fn plane_z(z: f64) -> Plane {
        Plane::new(Point3::new(0.0, 0.0, z), Vector3::x(), Vector3::y()).unwrap()
    }

    #[test]
    fn iso_lines_cover_both_directions() {
        let plane = plane_z(0.0);
        let b = Boundary::rectangle(&SurfaceDomain::new(0.0, 1.0, 0.0, 2.0)).unwrap();
        let r = Region::new(&plane, &b, 8).unwrap();
        let lines = iso_lines(&r, 4);
        assert_eq!(lines.len(), 10);
        assert!(lines.iter().all(|l| l.len() == 5));
        assert!((lines[0][4].y - 2.0).abs() < 1e-12);
        assert!((lines[9][0].y - 2.0).abs() < 1e-12);
    }

    #[test]
    fn signed_gap_follows_normal() {
        let plane = plane_z(0.0);
        let b = Boundary::rectangle(&SurfaceDomain::new(-1.0, 1.0, -1.0, 1.0)).unwrap();
        let r = Region::new(&plane, &b, 8).unwrap();
        let (above, uv) = signed_gap(&Point3::new(0.2, 0.3, 0.5), &plane, &r).unwrap();
        assert!((above - 0.5).abs() < 1e-9);
        assert!((uv - Point2::new(0.2, 0.3)).norm() < 1e-9);
        let (below, _) = signed_gap(&Point3::new(0.0, 0.0, -0.25), &plane, &r).unwrap();
        assert!((below + 0.25).abs() < 1e-9);
    }

    #[test]
    fn grid_bowl_level_set_is_one_closed_chain() {
        let bowl = bowl();
        let plane = plane_z(0.5);
        let b1 = Boundary::natural(&bowl).unwrap();
        let b2 = Boundary::rectangle(&SurfaceDomain::new(-2.0, 2.0, -2.0, 2.0)).unwrap();
        let r1 = Region::new(&bowl, &b1, 8).unwrap();
        let r2 = Region::new(&plane, &b2, 8).unwrap();
        let marcher = Marcher {
            s1: &bowl,
            s2: &plane,
            r1: &r1,
            r2: &r2,
            tol_arc: 1e-6,
            tol_tang: 1e-8,
            step: default_step(&bowl, &r1, &plane, &r2),
            max_samples: 2000,
            max_turn: 0.25,
        };

        let raw = GridCandidates { density: 16 }.candidates(&bowl, &r1, &plane, &r2);
        assert!(!raw.is_empty());
        let points = refine_candidates(&raw, &marcher, &NewtonRefiner::default());
        for p in &points {
            assert!((p.point().z - 0.5).abs() < 1e-6);
        }
        let lines = chain_into_lines(points, 0.5, &marcher);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].kind(), LineKind::Walking);
        assert!(lines[0].is_closed());
        assert_eq!(lines[0].nb_vertices(), 0);
    }

    #[test]
    fn lone_far_point_becomes_point_line() {
        let plane = plane_z(0.0);
        let b = Boundary::rectangle(&SurfaceDomain::new(-5.0, 5.0, -5.0, 5.0)).unwrap();
        let r = Region::new(&plane, &b, 8).unwrap();
        let marcher = Marcher {
            s1: &plane,
            s2: &plane,
            r1: &r,
            r2: &r,
            tol_arc: 1e-6,
            tol_tang: 1e-8,
            step: 0.1,
            max_samples: 100,
            max_turn: 0.25,
        };
        let at = |x: f64| {
            PointOn2S::new(Point3::new(x, 0.0, 0.0), Point2::new(x, 0.0), Point2::new(x, 0.0))
        };
        let lines = chain_into_lines(vec![at(0.0), at(0.1), at(0.2), at(3.0)], 0.15, &marcher);
        assert_eq!(lines.len(), 2);
        let kinds: Vec<LineKind> = lines.iter().map(IntersectionLine::kind).collect();
        assert!(kinds.contains(&LineKind::Point));
        assert!(kinds.contains(&LineKind::Walking));
        let walking = lines.iter().find(|l| l.kind() == LineKind::Walking).unwrap();
        assert_eq!(walking.nb_samples(), 3);
        assert_eq!(walking.nb_vertices(), 2);
    }
}
