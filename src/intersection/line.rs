use std::fmt;

use crate::boundary::ArcId;
use crate::error::{IntersectionError, Result};
use crate::geometry::curve::{Circle, Curve, Line};
use crate::math::Point3;

use super::point::{IntersectionPoint, PointOn2S, SurfaceSide};

/// Kind tag of an [`IntersectionLine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Walking,
    Restriction,
    Analytic,
    Point,
}

impl LineKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Walking => "walking",
            Self::Restriction => "restriction",
            Self::Analytic => "analytic",
            Self::Point => "point",
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered vertices of a line with their designated ends.
///
/// Indices are 0-based internally; `first`/`last` coincide on a
/// single-vertex line and are `None` on a line without vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineVertices {
    points: Vec<IntersectionPoint>,
    first: Option<usize>,
    last: Option<usize>,
}

impl LineVertices {
    /// Vertices that are already ordered and unique; the ends are the first
    /// and last entries.
    #[must_use]
    pub fn ordered(points: Vec<IntersectionPoint>) -> Self {
        let last = points.len().checked_sub(1);
        Self {
            first: last.map(|_| 0),
            last,
            points,
        }
    }

    /// Vertices in line-parameter order.
    #[must_use]
    pub fn points(&self) -> &[IntersectionPoint] {
        &self.points
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the line has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The designated first vertex.
    #[must_use]
    pub fn first(&self) -> Option<&IntersectionPoint> {
        self.first.and_then(|i| self.points.get(i))
    }

    /// The designated last vertex.
    #[must_use]
    pub fn last(&self) -> Option<&IntersectionPoint> {
        self.last.and_then(|i| self.points.get(i))
    }
}

/// A line traced by marching through both interiors.
#[derive(Debug, Clone)]
pub struct WalkingLine {
    pub(crate) samples: Vec<PointOn2S>,
    pub(crate) vertices: LineVertices,
    pub(crate) closed: bool,
}

impl WalkingLine {
    #[must_use]
    pub fn new(samples: Vec<PointOn2S>, vertices: LineVertices, closed: bool) -> Self {
        Self {
            samples,
            vertices,
            closed,
        }
    }

    /// Whether the trace loops back onto itself.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

/// A line running along a boundary arc of one surface.
#[derive(Debug, Clone)]
pub struct RestrictionLine {
    pub(crate) side: SurfaceSide,
    pub(crate) arc: ArcId,
    pub(crate) samples: Vec<PointOn2S>,
    pub(crate) vertices: LineVertices,
}

impl RestrictionLine {
    #[must_use]
    pub fn new(
        side: SurfaceSide,
        arc: ArcId,
        samples: Vec<PointOn2S>,
        vertices: LineVertices,
    ) -> Self {
        Self {
            side,
            arc,
            samples,
            vertices,
        }
    }
}

/// Closed-form carrier of an analytic line.
#[derive(Debug, Clone)]
pub enum AnalyticCurve {
    Line(Line),
    Circle(Circle),
}

impl AnalyticCurve {
    /// Point of the carrier at parameter `t`.
    ///
    /// # Errors
    ///
    /// Propagates curve evaluation failures.
    pub fn evaluate(&self, t: f64) -> Result<Point3> {
        match self {
            Self::Line(l) => l.evaluate(t),
            Self::Circle(c) => c.evaluate(t),
        }
    }

    /// Parameter of the carrier point closest to `point`.
    #[must_use]
    pub fn parameter_of(&self, point: &Point3) -> f64 {
        match self {
            Self::Line(l) => l.parameter_of(point),
            Self::Circle(c) => c.parameter_of(point),
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Line(l) => l.is_closed(),
            Self::Circle(c) => c.is_closed(),
        }
    }
}

/// A piece `[t_min, t_max]` of a closed-form curve.
#[derive(Debug, Clone)]
pub struct AnalyticLine {
    pub(crate) curve: AnalyticCurve,
    pub(crate) t_min: f64,
    pub(crate) t_max: f64,
    pub(crate) vertices: LineVertices,
}

impl AnalyticLine {
    #[must_use]
    pub fn new(curve: AnalyticCurve, t_min: f64, t_max: f64, vertices: LineVertices) -> Self {
        Self {
            curve,
            t_min,
            t_max,
            vertices,
        }
    }

    #[must_use]
    pub fn curve(&self) -> &AnalyticCurve {
        &self.curve
    }

    /// Carrier parameter range `(t_min, t_max)`.
    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.t_min, self.t_max)
    }
}

/// A line degenerated to one point.
#[derive(Debug, Clone)]
pub struct PointLine {
    pub(crate) vertices: LineVertices,
}

impl PointLine {
    #[must_use]
    pub fn new(point: IntersectionPoint) -> Self {
        Self {
            vertices: LineVertices::ordered(vec![point]),
        }
    }
}

/// Reference to the boundary arc a restriction line runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArcRef {
    pub side: SurfaceSide,
    pub arc: ArcId,
}

/// One intersection curve.
#[derive(Debug, Clone)]
pub enum IntersectionLine {
    Walking(WalkingLine),
    Restriction(RestrictionLine),
    Analytic(AnalyticLine),
    Point(PointLine),
}

impl IntersectionLine {
    #[must_use]
    pub fn kind(&self) -> LineKind {
        match self {
            Self::Walking(_) => LineKind::Walking,
            Self::Restriction(_) => LineKind::Restriction,
            Self::Analytic(_) => LineKind::Analytic,
            Self::Point(_) => LineKind::Point,
        }
    }

    /// Ordered vertices of any kind of line.
    #[must_use]
    pub fn vertices(&self) -> &LineVertices {
        match self {
            Self::Walking(l) => &l.vertices,
            Self::Restriction(l) => &l.vertices,
            Self::Analytic(l) => &l.vertices,
            Self::Point(l) => &l.vertices,
        }
    }

    /// Interior samples; empty for analytic lines, the lone vertex's point
    /// for point lines.
    #[must_use]
    pub fn samples(&self) -> &[PointOn2S] {
        match self {
            Self::Walking(l) => &l.samples,
            Self::Restriction(l) => &l.samples,
            Self::Analytic(_) => &[],
            Self::Point(l) => match l.vertices.points().first() {
                Some(p) => std::slice::from_ref(p.p2s()),
                None => &[],
            },
        }
    }

    /// Number of [`samples`](Self::samples).
    #[must_use]
    pub fn nb_samples(&self) -> usize {
        self.samples().len()
    }

    /// Number of vertices.
    #[must_use]
    pub fn nb_vertices(&self) -> usize {
        self.vertices().len()
    }

    /// Vertex at a 1-based `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is outside `1..=nb_vertices()`.
    pub fn vertex(&self, index: usize) -> Result<&IntersectionPoint> {
        let count = self.nb_vertices();
        index
            .checked_sub(1)
            .and_then(|i| self.vertices().points().get(i))
            .ok_or_else(|| IntersectionError::VertexIndexOutOfRange { index, count }.into())
    }

    /// The designated first vertex, if any.
    #[must_use]
    pub fn first_vertex(&self) -> Option<&IntersectionPoint> {
        self.vertices().first()
    }

    /// The designated last vertex, if any.
    #[must_use]
    pub fn last_vertex(&self) -> Option<&IntersectionPoint> {
        self.vertices().last()
    }

    /// Whether any vertex is a tangential contact.
    #[must_use]
    pub fn is_tangent(&self) -> bool {
        self.vertices().points().iter().any(IntersectionPoint::is_tangent)
    }

    /// Span of line parameters covered by vertices on `side`'s boundary;
    /// zero when fewer than two such vertices exist.
    #[must_use]
    pub fn boundary_span(&self, side: SurfaceSide) -> f64 {
        let mut params = self
            .vertices()
            .points()
            .iter()
            .filter(|p| p.is_on(side))
            .map(IntersectionPoint::param_on_line);
        let Some(first) = params.next() else {
            return 0.0;
        };
        let (lo, hi) = params.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t)));
        hi - lo
    }

    /// The arc a restriction line runs along.
    ///
    /// # Errors
    ///
    /// Returns [`IntersectionError::WrongLineKind`] on any other kind.
    pub fn restriction_arc(&self) -> Result<ArcRef> {
        match self {
            Self::Restriction(l) => Ok(ArcRef {
                side: l.side,
                arc: l.arc,
            }),
            other => Err(IntersectionError::WrongLineKind {
                expected: LineKind::Restriction.name(),
                found: other.kind().name(),
            }
            .into()),
        }
    }

    /// The closed-form carrier of an analytic line.
    ///
    /// # Errors
    ///
    /// Returns [`IntersectionError::WrongLineKind`] on any other kind.
    pub fn analytic_curve(&self) -> Result<&AnalyticCurve> {
        match self {
            Self::Analytic(l) => Ok(&l.curve),
            other => Err(IntersectionError::WrongLineKind {
                expected: LineKind::Analytic.name(),
                found: other.kind().name(),
            }
            .into()),
        }
    }

    /// Whether a walking line loops onto itself, or an analytic line covers
    /// its whole closed carrier.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        match self {
            Self::Walking(l) => l.closed,
            Self::Analytic(l) => l.curve.is_closed() && l.vertices.is_empty(),
            Self::Restriction(_) | Self::Point(_) => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::SurfsectError;
    use crate::intersection::point::ArcIncidence;
    use crate::math::Point2;
    use slotmap::SlotMap;

    fn sample(x: f64) -> PointOn2S {
        PointOn2S::new(Point3::new(x, 0.0, 0.0), Point2::new(x, 0.0), Point2::new(x, 1.0))
    }

    fn arc_id() -> ArcId {
        let mut arcs: SlotMap<ArcId, ()> = SlotMap::with_key();
        arcs.insert(())
    }

    fn walking() -> IntersectionLine {
        let arc = arc_id();
        let samples: Vec<PointOn2S> = (0..5).map(|i| sample(f64::from(i))).collect();
        let vertices = LineVertices::ordered(vec![
            IntersectionPoint::new(samples[0], 0.0)
                .with_arc(SurfaceSide::First, ArcIncidence { arc, param: 0.0 }),
            IntersectionPoint::new(samples[2], 2.0),
            IntersectionPoint::new(samples[4], 4.0)
                .with_arc(SurfaceSide::First, ArcIncidence { arc, param: 1.0 }),
        ]);
        IntersectionLine::Walking(WalkingLine::new(samples, vertices, false))
    }

    #[test]
    fn counts_and_one_based_vertices() {
        let line = walking();
        assert_eq!(line.kind(), LineKind::Walking);
        assert_eq!(line.nb_samples(), 5);
        assert_eq!(line.nb_vertices(), 3);
        assert!((line.vertex(2).unwrap().param_on_line() - 2.0).abs() < f64::EPSILON);
        assert!(matches!(
            line.vertex(0),
            Err(SurfsectError::Intersection(IntersectionError::VertexIndexOutOfRange {
                index: 0,
                count: 3
            }))
        ));
        assert!(line.vertex(4).is_err());
    }

    #[test]
    fn boundary_span_per_side() {
        let line = walking();
        assert!((line.boundary_span(SurfaceSide::First) - 4.0).abs() < f64::EPSILON);
        assert!(line.boundary_span(SurfaceSide::Second).abs() < f64::EPSILON);
    }

    #[test]
    fn restriction_attribute_on_walking_line_is_rejected() {
        let err = walking().restriction_arc().unwrap_err();
        assert!(matches!(
            err,
            SurfsectError::Intersection(IntersectionError::WrongLineKind {
                expected: "restriction",
                found: "walking"
            })
        ));
        assert!(walking().analytic_curve().is_err());
    }

    #[test]
    fn restriction_reports_its_arc() {
        let arc = arc_id();
        let line = IntersectionLine::Restriction(RestrictionLine::new(
            SurfaceSide::Second,
            arc,
            vec![sample(0.0), sample(1.0)],
            LineVertices::default(),
        ));
        let r = line.restriction_arc().unwrap();
        assert_eq!(r.side, SurfaceSide::Second);
        assert_eq!(r.arc, arc);
        assert!(line.first_vertex().is_none());
    }

    #[test]
    fn point_line_has_coinciding_ends() {
        let line = IntersectionLine::Point(PointLine::new(
            IntersectionPoint::new(sample(3.0), 0.0).with_tangent(true),
        ));
        assert_eq!(line.nb_samples(), 1);
        assert_eq!(line.first_vertex(), line.last_vertex());
        assert!(line.is_tangent());
    }
}
