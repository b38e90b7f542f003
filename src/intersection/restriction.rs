//! Boundary arcs of one surface that lie on the other surface.

use tracing::{debug, instrument, trace};

use crate::boundary::{ArcData, ArcId};
use crate::geometry::projection::project_point;
use crate::math::{Point2, Point3, CONFUSION};

use super::assemble::{assemble, purge_coincident_samples};
use super::diagnostics::tangent_at;
use super::line::{IntersectionLine, RestrictionLine};
use super::march::{Marcher, UV_SLACK};
use super::point::{ArcIncidence, IntersectionPoint, PointOn2S, SurfaceSide};

const BISECTIONS: usize = 50;

/// An arc sample lying on the other surface.
#[derive(Debug, Clone, Copy)]
struct OnSample {
    t: f64,
    own: Point2,
    other: Point2,
    point: Point3,
}

/// Restriction lines along the trimming arcs of `side`.
///
/// Every stretch of at least two consecutive arc samples within `tol_tang`
/// of the other surface, and inside the other region, becomes one line.
/// Its ends are bisected between the last sample off and the first on.
#[instrument(skip_all, fields(side = ?side, arc_samples))]
pub(crate) fn restriction_lines(
    marcher: &Marcher<'_>,
    side: SurfaceSide,
    arc_samples: usize,
) -> Vec<IntersectionLine> {
    let mut lines = Vec::new();
    for (id, arc) in marcher.region(side).trim_arcs() {
        let status: Vec<(f64, Option<OnSample>)> = arc
            .samples(arc_samples)
            .into_iter()
            .map(|(t, _)| (t, on_other(marcher, side, arc, t)))
            .collect();

        let mut i = 0;
        while i < status.len() {
            if status[i].1.is_none() {
                i += 1;
                continue;
            }
            let start = i;
            while i < status.len() && status[i].1.is_some() {
                i += 1;
            }
            if i - start < 2 {
                continue;
            }
            let mut run: Vec<OnSample> = status[start..i].iter().filter_map(|s| s.1).collect();
            if start > 0 {
                if let Some(head) = bisect(marcher, side, arc, status[start - 1].0, run[0].t) {
                    run.insert(0, head);
                }
            }
            if i < status.len() {
                if let Some(tail) = run
                    .last()
                    .and_then(|last| bisect(marcher, side, arc, status[i].0, last.t))
                {
                    run.push(tail);
                }
            }
            if let Some(line) = build_line(marcher, side, id, &run) {
                lines.push(line);
            }
        }
    }
    debug!(lines = lines.len(), "restriction lines found");
    lines
}

/// Arc point at `t` if it lies on the other surface inside its region.
fn on_other(marcher: &Marcher<'_>, side: SurfaceSide, arc: &ArcData, t: f64) -> Option<OnSample> {
    let other = side.other();
    let own = arc.point_at(t);
    let point = marcher.surface(side).evaluate(own.x, own.y).ok()?;
    let region = marcher.region(other);
    let foot = project_point(marcher.surface(other), region.bounds(), &point, None).ok()?;
    if foot.distance > marcher.tol_tang || !region.contains(foot.u, foot.v, UV_SLACK) {
        return None;
    }
    Some(OnSample {
        t,
        own,
        other: Point2::new(foot.u, foot.v),
        point: Point3::from((point.coords + foot.point.coords) * 0.5),
    })
}

/// Last on-sample between `t_off` (off) and `t_on` (on).
fn bisect(
    marcher: &Marcher<'_>,
    side: SurfaceSide,
    arc: &ArcData,
    mut t_off: f64,
    mut t_on: f64,
) -> Option<OnSample> {
    let mut best = None;
    for _ in 0..BISECTIONS {
        let mid = 0.5 * (t_off + t_on);
        match on_other(marcher, side, arc, mid) {
            Some(s) => {
                t_on = mid;
                best = Some(s);
            }
            None => t_off = mid,
        }
    }
    best
}

fn build_line(
    marcher: &Marcher<'_>,
    side: SurfaceSide,
    arc: ArcId,
    run: &[OnSample],
) -> Option<IntersectionLine> {
    let (first, last) = (run.first()?, run.last()?);
    let extent = run
        .iter()
        .map(|s| (s.point - first.point).norm())
        .fold(0.0, f64::max);
    if extent < CONFUSION {
        // The arc collapses to a point in 3D (apex, pole).
        trace!(?arc, "degenerate restriction run skipped");
        return None;
    }

    let mut samples: Vec<PointOn2S> = run
        .iter()
        .map(|s| marcher.pair(side, s.own, s.other, s.point))
        .collect();
    #[allow(clippy::cast_precision_loss)]
    let last_param = (samples.len() - 1) as f64;
    let mut raw = vec![
        end_vertex(marcher, side, arc, first, &samples[0], 0.0),
        end_vertex(marcher, side, arc, last, &samples[samples.len() - 1], last_param),
    ];
    purge_coincident_samples(&mut samples, &mut raw);
    let vertices = assemble(raw);
    Some(IntersectionLine::Restriction(RestrictionLine::new(
        side, arc, samples, vertices,
    )))
}

fn end_vertex(
    marcher: &Marcher<'_>,
    side: SurfaceSide,
    arc: ArcId,
    s: &OnSample,
    p2s: &PointOn2S,
    param: f64,
) -> IntersectionPoint {
    let other = side.other();
    let mut vertex = IntersectionPoint::new(*p2s, param)
        .with_arc(side, ArcIncidence { arc, param: s.t })
        .with_tangent(tangent_at(marcher.s1, marcher.s2, p2s));
    vertex.set_incidence(other, marcher.incidence_near(other, &s.other, &s.point));
    vertex
}
