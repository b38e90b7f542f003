//! Vertex assembly: turns the raw, duplicated vertex candidates of one line
//! into an ordered sequence with unique line parameters.
//!
//! Parameter comparisons are exact. Duplicates come from the same upstream
//! computation and are bit-identical; points that are merely close are left
//! alone.

use tracing::trace;

use crate::math::CONFUSION;

use super::line::LineVertices;
use super::point::{ArcIncidence, IntersectionPoint, PointOn2S, SurfaceSide};

/// Assembles a raw vertex bag into clean, ordered vertices.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn assemble(raw: Vec<IntersectionPoint>) -> LineVertices {
    let mut points = raw;
    let mut alive = vec![true; points.len()];

    remove_single_side_duplicates(&points, &mut alive, SurfaceSide::First);
    remove_single_side_duplicates(&points, &mut alive, SurfaceSide::Second);
    resolve_shared_parameters(&mut points, &mut alive);

    let before = points.len();
    let mut points: Vec<IntersectionPoint> = points
        .into_iter()
        .zip(alive)
        .filter_map(|(p, keep)| keep.then_some(p))
        .collect();
    trace!(before, after = points.len(), "collapsed duplicate vertices");

    sort_by_param(&mut points);

    // Adjacent points that still share a parameter: keep the informed one.
    let mut kept: Vec<IntersectionPoint> = Vec::with_capacity(points.len());
    for p in points {
        match kept.last_mut() {
            Some(prev) if prev.param_on_line() == p.param_on_line() => {
                if !prev.is_on_boundary() && p.is_on_boundary() {
                    *prev = p;
                }
            }
            _ => kept.push(p),
        }
    }

    sort_by_param(&mut kept);
    LineVertices::ordered(kept)
}

fn sort_by_param(points: &mut [IntersectionPoint]) {
    points.sort_by(|a, b| a.param_on_line().total_cmp(&b.param_on_line()));
}

/// Among points on `side`'s boundary only, drops the later of any pair with
/// the same line parameter, arc and arc parameter.
#[allow(clippy::float_cmp)]
fn remove_single_side_duplicates(
    points: &[IntersectionPoint],
    alive: &mut [bool],
    side: SurfaceSide,
) {
    let only_on = |p: &IntersectionPoint| p.is_on(side) && !p.is_on(side.other());
    for i in 0..points.len() {
        if !alive[i] || !only_on(&points[i]) {
            continue;
        }
        for j in i + 1..points.len() {
            if alive[j]
                && only_on(&points[j])
                && points[i].param_on_line() == points[j].param_on_line()
                && points[i].incidence(side) == points[j].incidence(side)
            {
                alive[j] = false;
            }
        }
    }
}

/// How two points at the same line parameter relate on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Claim {
    /// Neither point, or both identically.
    Agree,
    OnlyFirst,
    OnlySecond,
    Conflict,
}

fn claim(a: Option<&ArcIncidence>, b: Option<&ArcIncidence>) -> Claim {
    match (a, b) {
        (None, None) => Claim::Agree,
        (Some(_), None) => Claim::OnlyFirst,
        (None, Some(_)) => Claim::OnlySecond,
        (Some(x), Some(y)) if x == y => Claim::Agree,
        (Some(_), Some(_)) => Claim::Conflict,
    }
}

/// Cross-checks points sharing a line parameter when at least one carries a
/// boundary incidence.
///
/// Compatible claims merge into the earlier point; a point whose claims are
/// contained in the other's is dropped; on conflict the point with fewer
/// incidences goes, the later one on a tie.
#[allow(clippy::float_cmp)]
fn resolve_shared_parameters(points: &mut [IntersectionPoint], alive: &mut [bool]) {
    for i in 0..points.len() {
        for j in i + 1..points.len() {
            if !alive[i] {
                break;
            }
            if !alive[j]
                || points[i].param_on_line() != points[j].param_on_line()
                || !(points[i].is_on_boundary() || points[j].is_on_boundary())
            {
                continue;
            }

            let claims = [SurfaceSide::First, SurfaceSide::Second]
                .map(|side| claim(points[i].incidence(side), points[j].incidence(side)));
            let tangent = points[i].is_tangent() || points[j].is_tangent();

            if claims.contains(&Claim::Conflict) {
                let drop = if points[i].incidence_count() < points[j].incidence_count() {
                    i
                } else {
                    j
                };
                alive[drop] = false;
                continue;
            }

            let j_adds = claims.contains(&Claim::OnlySecond);
            let i_adds = claims.contains(&Claim::OnlyFirst);
            let (keep, drop) = if j_adds && !i_adds { (j, i) } else { (i, j) };
            if j_adds && i_adds {
                for side in [SurfaceSide::First, SurfaceSide::Second] {
                    if points[i].incidence(side).is_none() {
                        let extra = points[j].incidence(side).copied();
                        points[i].set_incidence(side, extra);
                    }
                }
            }
            points[keep].set_tangent(tangent);
            alive[drop] = false;
        }
    }
}

/// Collapses consecutive samples closer than the point confusion and shifts
/// the parameters of raw vertices at or past each removed index down by one.
pub fn purge_coincident_samples(samples: &mut Vec<PointOn2S>, raw: &mut [IntersectionPoint]) {
    let mut i = 1;
    while i < samples.len() {
        if (samples[i].point() - samples[i - 1].point()).norm() < CONFUSION {
            samples.remove(i);
            #[allow(clippy::cast_precision_loss)]
            let removed = i as f64;
            for p in raw.iter_mut() {
                if p.param_on_line() >= removed {
                    p.set_param_on_line(p.param_on_line() - 1.0);
                }
            }
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::boundary::ArcId;
    use crate::math::{Point2, Point3};
    use slotmap::SlotMap;

    fn arcs(n: usize) -> Vec<ArcId> {
        let mut store: SlotMap<ArcId, ()> = SlotMap::with_key();
        (0..n).map(|_| store.insert(())).collect()
    }

    fn p2s(x: f64) -> PointOn2S {
        PointOn2S::new(Point3::new(x, 0.0, 0.0), Point2::new(x, 0.0), Point2::new(0.0, x))
    }

    fn raw(param: f64) -> IntersectionPoint {
        IntersectionPoint::new(p2s(param), param)
    }

    fn on(side: SurfaceSide, arc: ArcId, arc_param: f64, param: f64) -> IntersectionPoint {
        raw(param).with_arc(side, ArcIncidence { arc, param: arc_param })
    }

    fn params(v: &LineVertices) -> Vec<f64> {
        v.points().iter().map(IntersectionPoint::param_on_line).collect()
    }

    #[test]
    fn tagged_point_wins_over_untagged_twin() {
        let e1 = arcs(1)[0];
        let v = assemble(vec![on(SurfaceSide::First, e1, 0.2, 0.5), raw(0.5)]);
        assert_eq!(v.len(), 1);
        let only = v.first().unwrap();
        assert_eq!(only.incidence(SurfaceSide::First), Some(&ArcIncidence { arc: e1, param: 0.2 }));
        assert_eq!(v.first(), v.last());
    }

    #[test]
    fn untagged_twins_collapse_between_tagged_ends() {
        let e = arcs(2);
        let v = assemble(vec![
            on(SurfaceSide::First, e[0], 0.0, 0.0),
            on(SurfaceSide::First, e[1], 0.0, 1.0),
            raw(0.5),
            raw(0.5),
        ]);
        assert_eq!(params(&v), vec![0.0, 0.5, 1.0]);
        assert_eq!(v.first().unwrap().param_on_line(), 0.0);
        assert_eq!(v.last().unwrap().param_on_line(), 1.0);
    }

    #[test]
    fn exact_single_side_duplicates_removed() {
        let e = arcs(1)[0];
        let v = assemble(vec![
            on(SurfaceSide::Second, e, 0.3, 2.0),
            on(SurfaceSide::Second, e, 0.3, 2.0),
            on(SurfaceSide::Second, e, 0.3, 2.0),
        ]);
        assert_eq!(v.len(), 1);
    }

    #[test]
    fn near_duplicates_are_not_merged() {
        let e = arcs(1)[0];
        let v = assemble(vec![
            on(SurfaceSide::First, e, 0.3, 2.0),
            on(SurfaceSide::First, e, 0.3, 2.0 + 1e-12),
        ]);
        assert_eq!(v.len(), 2);
    }

    #[test]
    fn complementary_incidences_merge() {
        let e = arcs(2);
        let v = assemble(vec![
            on(SurfaceSide::First, e[0], 0.1, 1.0),
            on(SurfaceSide::Second, e[1], 0.9, 1.0).with_tangent(true),
        ]);
        assert_eq!(v.len(), 1);
        let p = v.first().unwrap();
        assert_eq!(p.incidence_count(), 2);
        assert!(p.is_tangent());
    }

    #[test]
    fn superset_point_survives() {
        let e = arcs(2);
        let corner = on(SurfaceSide::First, e[0], 0.1, 1.0)
            .with_arc(SurfaceSide::Second, ArcIncidence { arc: e[1], param: 0.4 });
        let v = assemble(vec![on(SurfaceSide::First, e[0], 0.1, 1.0), corner.clone()]);
        assert_eq!(v.points(), &[corner]);
    }

    #[test]
    fn conflict_keeps_better_informed_point() {
        let e = arcs(2);
        let rich = on(SurfaceSide::First, e[0], 0.1, 1.0)
            .with_arc(SurfaceSide::Second, ArcIncidence { arc: e[1], param: 0.4 });
        let poor = on(SurfaceSide::First, e[0], 0.2, 1.0);
        let v = assemble(vec![poor, rich.clone()]);
        assert_eq!(v.points(), &[rich]);
    }

    #[test]
    fn conflict_tie_keeps_earlier_point() {
        let e = arcs(2);
        let a = on(SurfaceSide::First, e[0], 0.1, 1.0);
        let b = on(SurfaceSide::First, e[1], 0.7, 1.0);
        let v = assemble(vec![a.clone(), b]);
        assert_eq!(v.points(), &[a]);
    }

    #[test]
    fn output_strictly_increasing_and_idempotent() {
        let e = arcs(3);
        let bag = vec![
            raw(3.0),
            on(SurfaceSide::Second, e[2], 0.5, 7.0),
            raw(1.0),
            on(SurfaceSide::First, e[0], 0.0, 0.0),
            raw(3.0),
            on(SurfaceSide::First, e[1], 1.0, 7.0),
            on(SurfaceSide::First, e[0], 0.0, 0.0),
        ];
        let once = assemble(bag);
        let p = params(&once);
        assert!(p.windows(2).all(|w| w[0] < w[1]), "not increasing: {p:?}");
        let twice = assemble(once.points().to_vec());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_bag_is_valid() {
        let v = assemble(Vec::new());
        assert!(v.is_empty());
        assert!(v.first().is_none());
        assert!(v.last().is_none());
    }

    #[test]
    fn purge_shifts_vertex_parameters() {
        let mut samples = vec![p2s(0.0), p2s(1.0), p2s(1.0 + 1e-9), p2s(2.0)];
        let mut raw_vertices = vec![raw(0.0), raw(2.0), raw(3.0)];
        purge_coincident_samples(&mut samples, &mut raw_vertices);
        assert_eq!(samples.len(), 3);
        let shifted: Vec<f64> = raw_vertices.iter().map(IntersectionPoint::param_on_line).collect();
        assert_eq!(shifted, vec![0.0, 1.0, 2.0]);
    }
}
