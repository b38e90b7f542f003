//! Geometric marching along the intersection of two surfaces.
//!
//! A trace starts from a point on both surfaces and steps along `n1 x n2`
//! in both directions. Each step is predicted in the tangent planes and
//! corrected back onto both surfaces with the step length pinned by a plane
//! through the predicted point. A trace ends where it leaves either trimmed
//! region, where it closes onto itself, or where it stalls.

use nalgebra::{Matrix2, Matrix4, Vector2 as NVector2, Vector4};
use tracing::{debug, instrument, trace};

use crate::boundary::Region;
use crate::geometry::surface::{Surface, SurfaceDerivatives};
use crate::math::{Point2, Point3, Vector2, Vector3, CONFUSION};

use super::assemble::{assemble, purge_coincident_samples};
use super::candidates::signed_gap;
use super::diagnostics::tangent_at;
use super::line::{IntersectionLine, WalkingLine};
use super::point::{ArcIncidence, IntersectionPoint, PointOn2S, SurfaceSide};
use super::refine::refine_on_arc;

/// Parameter-space slack for containment tests of marched points.
pub(crate) const UV_SLACK: f64 = 1e-7;

/// `|n1 x n2|` below which the surfaces are tangent and no direction exists.
const MIN_CROSS: f64 = 1e-9;

const CORRECTOR_ITERATIONS: usize = 20;

/// Where to start a trace, with the vertex the start point already is (if
/// it lies on a boundary).
#[derive(Debug, Clone)]
pub(crate) struct Seed {
    pub point: PointOn2S,
    pub vertex: Option<IntersectionPoint>,
}

/// One finished trace, before vertex assembly.
///
/// Raw vertex parameters are sample indices.
#[derive(Debug, Clone)]
pub(crate) struct Trace {
    pub samples: Vec<PointOn2S>,
    pub raw: Vec<IntersectionPoint>,
    pub closed: bool,
    pub exhausted: bool,
}

impl Trace {
    /// Purges coincident samples and assembles the vertices.
    pub fn into_line(mut self) -> IntersectionLine {
        purge_coincident_samples(&mut self.samples, &mut self.raw);
        let vertices = assemble(self.raw);
        IntersectionLine::Walking(WalkingLine::new(self.samples, vertices, self.closed))
    }

    #[allow(clippy::cast_precision_loss)]
    fn last_param(&self) -> f64 {
        self.samples.len().saturating_sub(1) as f64
    }

    /// End point of an open trace with no vertex on a trimming arc there.
    #[allow(clippy::float_cmp)]
    fn free_end(&self, end: End) -> Option<&Point3> {
        if self.closed || self.exhausted {
            return None;
        }
        let (sample, param) = match end {
            End::Head => (self.samples.first()?, 0.0),
            End::Tail => (self.samples.last()?, self.last_param()),
        };
        let pinned = self
            .raw
            .iter()
            .any(|v| v.param_on_line() == param && v.is_on_boundary());
        (!pinned).then(|| sample.point())
    }

    fn reverse(&mut self) {
        let last = self.last_param();
        self.samples.reverse();
        for v in &mut self.raw {
            v.set_param_on_line(last - v.param_on_line());
        }
        self.raw.reverse();
    }

    /// Appends `next`, whose head sample is this trace's tail sample. The
    /// vertices at the junction are dropped.
    #[allow(clippy::float_cmp)]
    fn append(&mut self, next: Trace) {
        let offset = self.last_param();
        self.raw.retain(|v| v.param_on_line() != offset);
        self.samples.extend(next.samples.into_iter().skip(1));
        self.raw.extend(next.raw.into_iter().filter(|v| v.param_on_line() != 0.0).map(
            |mut v| {
                v.set_param_on_line(v.param_on_line() + offset);
                v
            },
        ));
    }

    /// Closes a trace whose two free ends meet.
    #[allow(clippy::float_cmp)]
    fn close_if_looped(&mut self) {
        let (Some(head), Some(tail)) = (self.free_end(End::Head), self.free_end(End::Tail)) else {
            return;
        };
        if self.samples.len() < 3 || (head - tail).norm() > CONFUSION {
            return;
        }
        let last = self.last_param();
        self.samples.pop();
        self.raw
            .retain(|v| v.param_on_line() != 0.0 && v.param_on_line() != last);
        self.closed = true;
    }

    fn distance_to(&self, point: &Point3) -> f64 {
        let mut best = self
            .samples
            .first()
            .map_or(f64::INFINITY, |s| (s.point() - point).norm());
        for w in self.samples.windows(2) {
            best = best.min(distance_to_segment(point, w[0].point(), w[1].point()));
        }
        if self.closed {
            if let (Some(a), Some(b)) = (self.samples.last(), self.samples.first()) {
                best = best.min(distance_to_segment(point, a.point(), b.point()));
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Head,
    Tail,
}

/// Half of a trace, walked from the seed in one direction.
struct HalfWalk {
    samples: Vec<PointOn2S>,
    end: Option<IntersectionPoint>,
    closed: bool,
    exhausted: bool,
}

/// Marching setup shared by every trace of one intersection.
pub(crate) struct Marcher<'a> {
    pub s1: &'a dyn Surface,
    pub s2: &'a dyn Surface,
    pub r1: &'a Region,
    pub r2: &'a Region,
    pub tol_arc: f64,
    pub tol_tang: f64,
    pub step: f64,
    pub max_samples: usize,
    pub max_turn: f64,
}

impl Marcher<'_> {
    pub fn surface(&self, side: SurfaceSide) -> &dyn Surface {
        match side {
            SurfaceSide::First => self.s1,
            SurfaceSide::Second => self.s2,
        }
    }

    pub fn region(&self, side: SurfaceSide) -> &Region {
        match side {
            SurfaceSide::First => self.r1,
            SurfaceSide::Second => self.r2,
        }
    }

    /// Traces both ways from `seed`; a closed loop stops the first direction
    /// and skips the second.
    ///
    /// Both directions share one budget of `max_samples`, the seed included.
    pub fn trace(&self, seed: &Seed) -> Trace {
        let start = seed.point.params();
        let origin = *seed.point.point();
        let budget = self.max_samples.saturating_sub(1);
        let forward = self.walk(start, origin, 1.0, seed.vertex.as_ref(), budget);
        if forward.closed {
            let mut samples = Vec::with_capacity(forward.samples.len() + 1);
            samples.push(seed.point);
            samples.extend(forward.samples);
            let raw = seed
                .vertex
                .clone()
                .map(|mut v| {
                    v.set_param_on_line(0.0);
                    v
                })
                .into_iter()
                .collect();
            return Trace {
                samples,
                raw,
                closed: true,
                exhausted: forward.exhausted,
            };
        }

        let budget = budget.saturating_sub(forward.samples.len());
        let backward = self.walk(start, origin, -1.0, seed.vertex.as_ref(), budget);
        let seed_index = backward.samples.len();
        let mut samples = Vec::with_capacity(seed_index + forward.samples.len() + 1);
        samples.extend(backward.samples.into_iter().rev());
        samples.push(seed.point);
        samples.extend(forward.samples);

        #[allow(clippy::cast_precision_loss)]
        let (seed_param, last_param) = (seed_index as f64, (samples.len() - 1) as f64);
        let mut raw = Vec::new();
        for (vertex, param) in [
            (backward.end, 0.0),
            (seed.vertex.clone(), seed_param),
            (forward.end, last_param),
        ] {
            if let Some(mut v) = vertex {
                v.set_param_on_line(param);
                raw.push(v);
            }
        }
        Trace {
            samples,
            raw,
            closed: false,
            exhausted: forward.exhausted || backward.exhausted,
        }
    }

    fn walk(
        &self,
        start: [f64; 4],
        origin: Point3,
        sense: f64,
        seed_vertex: Option<&IntersectionPoint>,
        budget: usize,
    ) -> HalfWalk {
        let mut x = Vector4::from(start);
        let mut point = origin;
        let mut prev_dir: Option<Vector3> = None;
        let mut h = self.step;
        let mut travelled = 0.0;
        let mut samples: Vec<PointOn2S> = Vec::new();

        let stop = |samples: Vec<PointOn2S>, x: &Vector4<f64>, point: Point3| {
            let end = match seed_vertex {
                Some(v) if samples.is_empty() => Some(v.clone()),
                _ => Some(self.vertex_here(x, point)),
            };
            HalfWalk {
                samples,
                end,
                closed: false,
                exhausted: false,
            }
        };

        loop {
            if samples.len() >= budget {
                debug!(samples = samples.len(), "trace hit the sample cap");
                return HalfWalk {
                    samples,
                    end: None,
                    closed: false,
                    exhausted: true,
                };
            }
            let Some(mut dir) = self.direction(&x) else {
                trace!("surfaces tangent, trace stops");
                return stop(samples, &x, point);
            };
            match prev_dir {
                Some(p) if p.dot(&dir) < 0.0 => dir = -dir,
                None => dir *= sense,
                Some(_) => {}
            }

            let mut next = None;
            while h >= self.step * 1e-3 {
                match self.advance(&x, &point, &dir, h) {
                    Some((nx, np)) if self.turn_ok(&dir, &nx) => {
                        next = Some((nx, np));
                        break;
                    }
                    _ => h *= 0.5,
                }
            }
            let Some((nx, np)) = next else {
                trace!(h, "trace stalled");
                return stop(samples, &x, point);
            };

            if !self.inside(&nx) {
                if let Some(vertex) = self.exit_vertex(&x, &nx) {
                    samples.push(*vertex.p2s());
                    return HalfWalk {
                        samples,
                        end: Some(vertex),
                        closed: false,
                        exhausted: false,
                    };
                }
                return stop(samples, &x, point);
            }

            travelled += (np - point).norm();
            if travelled > 2.0 * self.step
                && distance_to_segment(&origin, &point, &np) <= 0.5 * self.step
            {
                trace!(travelled, "trace closed onto its start");
                return HalfWalk {
                    samples,
                    end: None,
                    closed: true,
                    exhausted: false,
                };
            }

            samples.push(self.sample(&nx, np));
            x = nx;
            point = np;
            prev_dir = Some(dir);
            h = (h * 1.5).min(self.step);
        }
    }

    /// Unit tangent of the intersection at `x`, `None` at a tangential contact.
    fn direction(&self, x: &Vector4<f64>) -> Option<Vector3> {
        let n1 = self.s1.normal(x[0], x[1]).ok()?;
        let n2 = self.s2.normal(x[2], x[3]).ok()?;
        let t = n1.cross(&n2);
        let len = t.norm();
        (len > MIN_CROSS).then(|| t / len)
    }

    fn turn_ok(&self, dir: &Vector3, next: &Vector4<f64>) -> bool {
        self.direction(next)
            .is_some_and(|d| d.dot(dir).abs().clamp(-1.0, 1.0).acos() <= self.max_turn)
    }

    /// Predicts a step of 3D length `h` along `dir` and corrects it onto
    /// both surfaces.
    fn advance(
        &self,
        x: &Vector4<f64>,
        point: &Point3,
        dir: &Vector3,
        h: f64,
    ) -> Option<(Vector4<f64>, Point3)> {
        let delta = dir * h;
        let d1 = self.s1.derivatives(x[0], x[1]).ok()?;
        let d2 = self.s2.derivatives(x[2], x[3]).ok()?;
        let a = uv_step(&d1, &delta)?;
        let b = uv_step(&d2, &delta)?;
        let guess = x + Vector4::new(a.x, a.y, b.x, b.y);

        let target = point + delta;
        let nx = self.correct(guess, &target, dir)?;
        let p1 = self.s1.evaluate(nx[0], nx[1]).ok()?;
        let p2 = self.s2.evaluate(nx[2], nx[3]).ok()?;
        let np = Point3::from((p1.coords + p2.coords) * 0.5);

        let moved = np - point;
        if moved.dot(dir) <= 0.0 || moved.norm() > 2.0 * h {
            return None;
        }
        Some((nx, np))
    }

    /// Newton on `S1 - S2 = 0` plus `dir . (S1 - target) = 0`.
    fn correct(&self, guess: Vector4<f64>, target: &Point3, dir: &Vector3) -> Option<Vector4<f64>> {
        let mut x = guess;
        for _ in 0..CORRECTOR_ITERATIONS {
            let d1 = self.s1.derivatives(x[0], x[1]).ok()?;
            let d2 = self.s2.derivatives(x[2], x[3]).ok()?;
            let gap = d1.point - d2.point;
            let slide = dir.dot(&(d1.point - target));
            if gap.norm() <= self.tol_tang * 1e-3 && slide.abs() <= self.tol_tang * 1e-3 {
                return Some(x);
            }
            #[rustfmt::skip]
            let j = Matrix4::new(
                d1.du.x, d1.dv.x, -d2.du.x, -d2.dv.x,
                d1.du.y, d1.dv.y, -d2.du.y, -d2.dv.y,
                d1.du.z, d1.dv.z, -d2.du.z, -d2.dv.z,
                dir.dot(&d1.du), dir.dot(&d1.dv), 0.0, 0.0,
            );
            let f = Vector4::new(gap.x, gap.y, gap.z, slide);
            let dx = j.lu().solve(&(-f))?;
            if !dx.iter().all(|c| c.is_finite()) {
                return None;
            }
            x += dx;
        }
        let p1 = self.s1.evaluate(x[0], x[1]).ok()?;
        let p2 = self.s2.evaluate(x[2], x[3]).ok()?;
        ((p1 - p2).norm() <= self.tol_tang).then_some(x)
    }

    fn inside(&self, x: &Vector4<f64>) -> bool {
        self.r1.contains(x[0], x[1], UV_SLACK) && self.r2.contains(x[2], x[3], UV_SLACK)
    }

    fn sample(&self, x: &Vector4<f64>, point: Point3) -> PointOn2S {
        let (u1, v1) = self.r1.wrap(x[0], x[1]);
        let (u2, v2) = self.r2.wrap(x[2], x[3]);
        PointOn2S::new(point, Point2::new(u1, v1), Point2::new(u2, v2))
    }

    /// The point where the step `from -> to` leaves the earlier of the two
    /// regions, pulled onto the crossed arc. `None` when it does not refine
    /// onto both surfaces.
    fn exit_vertex(&self, from: &Vector4<f64>, to: &Vector4<f64>) -> Option<IntersectionPoint> {
        let uv = |x: &Vector4<f64>, side: SurfaceSide| match side {
            SurfaceSide::First => Point2::new(x[0], x[1]),
            SurfaceSide::Second => Point2::new(x[2], x[3]),
        };
        let (side, hit) = [SurfaceSide::First, SurfaceSide::Second]
            .into_iter()
            .filter_map(|side| {
                self.region(side)
                    .crossing(&uv(from, side), &uv(to, side))
                    .map(|hit| (side, hit))
            })
            .min_by(|a, b| a.1.fraction.total_cmp(&b.1.fraction))?;

        let other = side.other();
        let mid = from + (to - from) * hit.fraction;
        let other_guess = uv(&mid, other);
        let arc = self.region(side).arc(hit.arc)?;
        let Some(ap) = refine_on_arc(
            arc,
            self.surface(side),
            self.surface(other),
            hit.arc_param,
            other_guess,
            self.tol_tang,
        ) else {
            trace!(?side, "crossing did not refine onto the arc");
            return None;
        };

        let p2s = self.pair(side, ap.uv_own, ap.uv_other, ap.point);
        trace!(?side, arc_param = ap.t, "trace left the region");
        let mut vertex = IntersectionPoint::new(p2s, 0.0)
            .with_arc(side, ArcIncidence { arc: hit.arc, param: ap.t })
            .with_tangent(tangent_at(self.s1, self.s2, &p2s));
        vertex.set_incidence(other, self.incidence_near(other, &ap.uv_other, &ap.point));
        Some(vertex)
    }

    /// A vertex where a trace stopped without crossing an arc.
    fn vertex_here(&self, x: &Vector4<f64>, point: Point3) -> IntersectionPoint {
        let p2s = self.sample(x, point);
        let mut vertex =
            IntersectionPoint::new(p2s, 0.0).with_tangent(tangent_at(self.s1, self.s2, &p2s));
        for side in [SurfaceSide::First, SurfaceSide::Second] {
            vertex.set_incidence(side, self.incidence_near(side, &p2s.uv(side), &point));
        }
        vertex
    }

    /// Builds a two-surface point from per-side parameters, wrapped.
    pub fn pair(&self, side: SurfaceSide, own: Point2, other: Point2, point: Point3) -> PointOn2S {
        let (uv1, uv2) = match side {
            SurfaceSide::First => (own, other),
            SurfaceSide::Second => (other, own),
        };
        let (u1, v1) = self.r1.wrap(uv1.x, uv1.y);
        let (u2, v2) = self.r2.wrap(uv2.x, uv2.y);
        PointOn2S::new(point, Point2::new(u1, v1), Point2::new(u2, v2))
    }

    /// Incidence on the nearest trimming arc of `side`, if that arc passes
    /// within the arc tolerance of `point` in 3D.
    pub fn incidence_near(
        &self,
        side: SurfaceSide,
        uv: &Point2,
        point: &Point3,
    ) -> Option<ArcIncidence> {
        let region = self.region(side);
        let (arc, t, _) = region.nearest_arc(uv)?;
        let at = region.arc(arc)?.point_at(t);
        let on_arc = self.surface(side).evaluate(at.x, at.y).ok()?;
        ((on_arc - point).norm() <= self.tol_arc).then_some(ArcIncidence { arc, param: t })
    }

    /// Seeds where the intersection crosses a trimming arc of `side`.
    ///
    /// Arc samples are classified by their signed distance to the other
    /// surface; each sign change is refined onto the arc.
    pub fn boundary_seeds(&self, side: SurfaceSide, arc_samples: usize) -> Vec<Seed> {
        let other = side.other();
        let own_surface = self.surface(side);
        let other_surface = self.surface(other);
        let other_region = self.region(other);
        let mut seeds = Vec::new();

        for (id, arc) in self.region(side).trim_arcs() {
            let gaps: Vec<Option<(f64, f64, Point2)>> = arc
                .samples(arc_samples)
                .into_iter()
                .map(|(t, uv)| {
                    let p = own_surface.evaluate(uv.x, uv.y).ok()?;
                    let (gap, other_uv) = signed_gap(&p, other_surface, other_region)?;
                    Some((t, gap, other_uv))
                })
                .collect();

            for w in gaps.windows(2) {
                let (Some((t0, g0, uv0)), Some((t1, g1, uv1))) = (w[0], w[1]) else {
                    continue;
                };
                if (g0 > 0.0) == (g1 > 0.0)
                    || (g0.abs() <= self.tol_tang && g1.abs() <= self.tol_tang)
                {
                    continue;
                }
                let f = g0 / (g0 - g1);
                let guess_uv = uv0 + (uv1 - uv0) * f;
                let Some(ap) = refine_on_arc(
                    arc,
                    own_surface,
                    other_surface,
                    t0 + (t1 - t0) * f,
                    guess_uv,
                    self.tol_tang,
                ) else {
                    continue;
                };
                if !other_region.contains(ap.uv_other.x, ap.uv_other.y, UV_SLACK) {
                    continue;
                }
                let p2s = self.pair(side, ap.uv_own, ap.uv_other, ap.point);
                let mut vertex = IntersectionPoint::new(p2s, 0.0)
                    .with_arc(side, ArcIncidence { arc: id, param: ap.t })
                    .with_tangent(tangent_at(self.s1, self.s2, &p2s));
                vertex.set_incidence(other, self.incidence_near(other, &ap.uv_other, &ap.point));
                seeds.push(Seed {
                    point: p2s,
                    vertex: Some(vertex),
                });
            }
        }
        seeds
    }

    /// Traces every seed not already covered by an earlier trace, then joins
    /// traces meeting at a free end.
    ///
    /// Seeds where the surfaces have no common direction (tangential
    /// contacts, singular parameters) are kept as isolated tangent points.
    /// Tracing stops at the first trace hitting the sample cap.
    #[instrument(skip_all, fields(seeds = seeds.len(), step = self.step))]
    pub fn trace_all(&self, seeds: &[Seed]) -> Walked {
        let cover = (0.05 * self.step).max(10.0 * self.tol_tang);
        let mut traces: Vec<Trace> = Vec::new();
        let mut points: Vec<IntersectionPoint> = Vec::new();
        for seed in seeds {
            let at = seed.point.point();
            if traces.iter().any(|t| t.distance_to(at) <= cover)
                || points.iter().any(|p| (p.point() - at).norm() <= cover)
            {
                continue;
            }
            if self.direction(&Vector4::from(seed.point.params())).is_none() {
                trace!(?at, "seed is a tangential contact");
                let mut vertex = self.vertex_here(&Vector4::from(seed.point.params()), *at);
                vertex.set_tangent(true);
                points.push(vertex);
                continue;
            }
            let t = self.trace(seed);
            trace!(samples = t.samples.len(), closed = t.closed, "traced seed");
            let exhausted = t.exhausted;
            traces.push(t);
            if exhausted {
                debug!("sample cap reached, remaining seeds skipped");
                break;
            }
        }
        let exhausted = traces.iter().any(|t| t.exhausted);
        let traces = join_traces(traces);
        debug!(traces = traces.len(), points = points.len(), exhausted, "walking finished");
        Walked {
            lines: traces.into_iter().map(Trace::into_line).collect(),
            points,
            exhausted,
        }
    }
}

/// Output of [`Marcher::trace_all`].
#[derive(Debug, Default)]
pub(crate) struct Walked {
    pub lines: Vec<IntersectionLine>,
    pub points: Vec<IntersectionPoint>,
    /// Some trace hit the sample cap.
    pub exhausted: bool,
}

/// Joins open traces whose free ends meet within [`CONFUSION`].
///
/// Free ends are where a trace stalled or reached a tangential contact. A
/// joined trace whose own ends then meet becomes closed.
fn join_traces(mut traces: Vec<Trace>) -> Vec<Trace> {
    let mut i = 0;
    while i < traces.len() {
        let found = (i + 1..traces.len())
            .find_map(|j| meeting_ends(&traces[i], &traces[j]).map(|ends| (j, ends)));
        let Some((j, (i_end, j_end))) = found else {
            i += 1;
            continue;
        };
        let mut next = traces.remove(j);
        if i_end == End::Head {
            traces[i].reverse();
        }
        if j_end == End::Tail {
            next.reverse();
        }
        trace!(head = traces[i].samples.len(), tail = next.samples.len(), "traces joined");
        traces[i].append(next);
        traces[i].close_if_looped();
    }
    traces
}

fn meeting_ends(a: &Trace, b: &Trace) -> Option<(End, End)> {
    for ea in [End::Tail, End::Head] {
        for eb in [End::Head, End::Tail] {
            if let (Some(p), Some(q)) = (a.free_end(ea), b.free_end(eb)) {
                if (p - q).norm() <= CONFUSION {
                    return Some((ea, eb));
                }
            }
        }
    }
    None
}

/// Parameter change whose image in the tangent plane best matches `delta`.
fn uv_step(d: &SurfaceDerivatives, delta: &Vector3) -> Option<Vector2> {
    let g = Matrix2::new(
        d.du.dot(&d.du),
        d.du.dot(&d.dv),
        d.du.dot(&d.dv),
        d.dv.dot(&d.dv),
    );
    let rhs = NVector2::new(d.du.dot(delta), d.dv.dot(delta));
    g.try_inverse().map(|inv| inv * rhs)
}

pub(crate) fn distance_to_segment(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq == 0.0 {
        return (p - a).norm();
    }
    let s = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * s)).norm()
}

/// Default 3D marching step: a fraction of the smaller trimmed extent.
#[must_use]
pub(crate) fn default_step(s1: &dyn Surface, r1: &Region, s2: &dyn Surface, r2: &Region) -> f64 {
    let extent = region_extent(s1, r1).min(region_extent(s2, r2));
    if extent.is_finite() && extent > 0.0 {
        extent / 64.0
    } else {
        1e-3
    }
}

fn region_extent(surface: &dyn Surface, region: &Region) -> f64 {
    let (lo, hi) = region_box(surface, region);
    (hi - lo).norm()
}

/// 3D box around a grid of samples over the region bounds.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn region_box(surface: &dyn Surface, region: &Region) -> (Vector3, Vector3) {
    const N: usize = 8;
    let b = region.bounds();
    let mut lo = Vector3::repeat(f64::INFINITY);
    let mut hi = Vector3::repeat(f64::NEG_INFINITY);
    for i in 0..=N {
        for j in 0..=N {
            let u = b.u_min + (b.u_max - b.u_min) * i as f64 / N as f64;
            let v = b.v_min + (b.v_max - b.v_min) * j as f64 / N as f64;
            if let Ok(p) = surface.evaluate(u, v) {
                lo = lo.inf(&p.coords);
                hi = hi.sup(&p.coords);
            }
        }
    }
    (lo, hi)
}
