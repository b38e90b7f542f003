use crate::error::{BoundaryError, Result};
use crate::geometry::surface::{Surface, SurfaceDomain};
use crate::math::intersect_2d::{project_on_segment_2d, segment_segment_intersect_2d};
use crate::math::polygon_2d::point_in_edges;
use crate::math::{wrap_periodic, Point2, Vector2};

use super::arc::{ArcCurve, ArcData, ArcId};
use super::BoundaryProvider;

/// Hits this close to the start of a query segment belong to the start point.
const START_SLACK: f64 = 1e-7;

/// One chord of the sampled boundary outline.
#[derive(Debug, Clone)]
struct RegionEdge {
    start: Point2,
    end: Point2,
    /// Arc the chord was sampled from.
    arc: ArcId,
    t_start: f64,
    t_end: f64,
    seam: bool,
}

/// First boundary crossing along a parameter-space segment.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryHit {
    /// Position of the hit along the query segment, in `[0, 1]`.
    pub fraction: f64,
    /// Hit point, wrapped into the base period.
    pub uv: Point2,
    pub arc: ArcId,
    pub arc_param: f64,
}

/// A trimmed parameter domain, sampled into chords for fast queries.
#[derive(Debug, Clone)]
pub struct Region {
    edges: Vec<RegionEdge>,
    outline: Vec<(Point2, Point2)>,
    arcs: Vec<(ArcId, ArcData)>,
    bounds: SurfaceDomain,
    period_u: Option<f64>,
    period_v: Option<f64>,
}

impl Region {
    /// Samples every arc of `boundary`; circular arcs get `samples_per_arc`
    /// chords, straight arcs one.
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary has no arcs or an arc id is dangling.
    pub fn new(
        surface: &dyn Surface,
        boundary: &dyn BoundaryProvider,
        samples_per_arc: usize,
    ) -> Result<Self> {
        let ids = boundary.arc_ids();
        if ids.is_empty() {
            return Err(BoundaryError::Empty.into());
        }

        let mut edges = Vec::new();
        let mut arcs = Vec::with_capacity(ids.len());
        for &id in ids {
            let arc = boundary.arc(id)?.clone();
            let count = match arc.curve {
                ArcCurve::Segment(_) => 1,
                ArcCurve::Circle(_) => samples_per_arc.max(4),
            };
            let samples = arc.samples(count);
            edges.extend(samples.windows(2).map(|w| RegionEdge {
                start: w[0].1,
                end: w[1].1,
                arc: id,
                t_start: w[0].0,
                t_end: w[1].0,
                seam: arc.seam,
            }));
            arcs.push((id, arc));
        }

        let mut bounds = SurfaceDomain::new(
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
        );
        for e in &edges {
            for p in [e.start, e.end] {
                bounds.u_min = bounds.u_min.min(p.x);
                bounds.u_max = bounds.u_max.max(p.x);
                bounds.v_min = bounds.v_min.min(p.y);
                bounds.v_max = bounds.v_max.max(p.y);
            }
        }

        let outline = edges.iter().map(|e| (e.start, e.end)).collect();
        Ok(Self {
            edges,
            outline,
            arcs,
            bounds,
            period_u: surface.period_u().filter(|_| boundary.is_u_closed()),
            period_v: surface.period_v().filter(|_| boundary.is_v_closed()),
        })
    }

    /// Bounding box of the outline in parameter space.
    #[must_use]
    pub fn bounds(&self) -> &SurfaceDomain {
        &self.bounds
    }

    #[must_use]
    pub fn arc(&self, id: ArcId) -> Option<&ArcData> {
        self.arcs.iter().find(|(a, _)| *a == id).map(|(_, data)| data)
    }

    /// Non-seam arcs, in boundary order.
    pub fn trim_arcs(&self) -> impl Iterator<Item = (ArcId, &ArcData)> {
        self.arcs.iter().filter(|(_, a)| !a.seam).map(|(id, a)| (*id, a))
    }

    #[must_use]
    pub fn period_u(&self) -> Option<f64> {
        self.period_u
    }

    #[must_use]
    pub fn period_v(&self) -> Option<f64> {
        self.period_v
    }

    /// Wraps closed directions into the base period starting at the lower bound.
    #[must_use]
    pub fn wrap(&self, u: f64, v: f64) -> (f64, f64) {
        let u = self
            .period_u
            .map_or(u, |p| wrap_periodic(u, self.bounds.u_min, p));
        let v = self
            .period_v
            .map_or(v, |p| wrap_periodic(v, self.bounds.v_min, p));
        (u, v)
    }

    /// Whether `(u, v)` lies inside the region or within `tol` of its outline.
    #[must_use]
    pub fn contains(&self, u: f64, v: f64, tol: f64) -> bool {
        let (u, v) = self.wrap(u, v);
        let p = Point2::new(u, v);
        let on_outline = self
            .outline
            .iter()
            .any(|(a, b)| project_on_segment_2d(&p, a, b).1 <= tol);
        on_outline || point_in_edges(&p, &self.outline)
    }

    /// First crossing of a trimming (non-seam) arc when moving from `from` to `to`.
    ///
    /// Closed directions are handled by also testing the outline shifted by
    /// one period either way. Crossings at the very start are ignored.
    #[must_use]
    pub fn crossing(&self, from: &Point2, to: &Point2) -> Option<BoundaryHit> {
        let (fu, fv) = self.wrap(from.x, from.y);
        let a = Point2::new(fu, fv);
        let b = a + (to - from);

        let shifts_u = self.period_u.map_or(vec![0.0], |p| vec![0.0, -p, p]);
        let shifts_v = self.period_v.map_or(vec![0.0], |p| vec![0.0, -p, p]);

        let mut best: Option<(f64, &RegionEdge, f64)> = None;
        for edge in self.edges.iter().filter(|e| !e.seam) {
            for &su in &shifts_u {
                for &sv in &shifts_v {
                    let shift = Vector2::new(su, sv);
                    let (c, d) = (edge.start + shift, edge.end + shift);
                    let Some((_, t, s)) = segment_segment_intersect_2d(&a, &b, &c, &d) else {
                        continue;
                    };
                    if t <= START_SLACK {
                        continue;
                    }
                    if best.map_or(true, |(bt, _, _)| t < bt) {
                        best = Some((t, edge, s));
                    }
                }
            }
        }

        let (fraction, edge, s) = best?;
        let on_edge = edge.start + (edge.end - edge.start) * s;
        let arc_param = self
            .arc(edge.arc)
            .map_or(edge.t_start + (edge.t_end - edge.t_start) * s, |arc| arc.project(&on_edge));
        Some(BoundaryHit {
            fraction,
            uv: on_edge,
            arc: edge.arc,
            arc_param,
        })
    }

    /// Nearest trimming arc to `uv`: `(arc, arc parameter, parameter-space distance)`.
    #[must_use]
    pub fn nearest_arc(&self, uv: &Point2) -> Option<(ArcId, f64, f64)> {
        let (u, v) = self.wrap(uv.x, uv.y);
        let p = Point2::new(u, v);
        let (edge, _) = self
            .edges
            .iter()
            .filter(|e| !e.seam)
            .map(|e| (e, project_on_segment_2d(&p, &e.start, &e.end).1))
            .min_by(|x, y| x.1.total_cmp(&y.1))?;
        let arc = self.arc(edge.arc)?;
        let t = arc.project(&p);
        Some((edge.arc, t, (arc.point_at(t) - p).norm()))
    }
}
