use std::fmt;

use crate::error::{IntersectionError, Result};

use super::line::{IntersectionLine, LineKind};
use super::point::{IntersectionPoint, SurfaceSide};

/// Outcome of one [`SurfaceIntersector::perform`](super::SurfaceIntersector::perform) call.
///
/// Non-walking lines come before walking lines, each group in the order it
/// was produced.
#[derive(Debug, Clone, Default)]
pub struct IntersectionResult {
    done: bool,
    tangent_faces: bool,
    opposite_faces: bool,
    lines: Vec<IntersectionLine>,
    /// Index of the first walking line.
    walking_from: usize,
    points: Vec<IntersectionPoint>,
}

impl IntersectionResult {
    /// A finished result for faces lying on each other.
    pub(crate) fn coincident(opposite: bool) -> Self {
        Self {
            done: true,
            tangent_faces: true,
            opposite_faces: opposite,
            ..Self::default()
        }
    }

    pub(crate) fn push_line(&mut self, line: IntersectionLine) {
        if line.kind() == LineKind::Walking {
            self.lines.push(line);
        } else {
            self.lines.insert(self.walking_from, line);
            self.walking_from += 1;
        }
    }

    pub(crate) fn push_point(&mut self, point: IntersectionPoint) {
        self.points.push(point);
    }

    pub(crate) fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    /// Whether the computation ran to completion.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// No lines, no points, and the faces are not coincident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.points.is_empty() && !self.tangent_faces
    }

    /// Whether one face lies entirely on the other.
    #[must_use]
    pub fn is_tangent_faces(&self) -> bool {
        self.tangent_faces
    }

    /// Whether coincident faces have opposite normals.
    #[must_use]
    pub fn is_opposite_faces(&self) -> bool {
        self.opposite_faces
    }

    /// Number of lines of every kind.
    #[must_use]
    pub fn nb_lines(&self) -> usize {
        self.lines.len()
    }

    /// Line at a 1-based `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is outside `1..=nb_lines()`.
    pub fn line(&self, index: usize) -> Result<&IntersectionLine> {
        let count = self.lines.len();
        index
            .checked_sub(1)
            .and_then(|i| self.lines.get(i))
            .ok_or_else(|| IntersectionError::LineIndexOutOfRange { index, count }.into())
    }

    /// All lines, non-walking lines first.
    #[must_use]
    pub fn lines(&self) -> &[IntersectionLine] {
        &self.lines
    }

    /// Isolated points not on any line.
    #[must_use]
    pub fn points(&self) -> &[IntersectionPoint] {
        &self.points
    }

    /// Number of lines of `kind`.
    #[must_use]
    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|l| l.kind() == kind).count()
    }

    fn restrictions_on(&self, side: SurfaceSide) -> usize {
        self.lines
            .iter()
            .filter(|l| l.restriction_arc().is_ok_and(|a| a.side == side))
            .count()
    }
}

impl fmt::Display for IntersectionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "done={} empty={} tangent={} opposite={}",
            self.done,
            self.is_empty(),
            self.tangent_faces,
            self.opposite_faces
        )?;
        writeln!(
            f,
            "lines={} walking={} restriction(s1)={} restriction(s2)={} analytic={} point={} \
             points={}",
            self.lines.len(),
            self.count(LineKind::Walking),
            self.restrictions_on(SurfaceSide::First),
            self.restrictions_on(SurfaceSide::Second),
            self.count(LineKind::Analytic),
            self.count(LineKind::Point),
            self.points.len()
        )?;
        for (i, line) in self.lines.iter().enumerate() {
            write!(
                f,
                "line {}: {} samples={} vertices={}",
                i + 1,
                line.kind(),
                line.nb_samples(),
                line.nb_vertices()
            )?;
            if line.is_closed() {
                f.write_str(" closed")?;
            }
            writeln!(f)?;
            for (j, v) in line.vertices().points().iter().enumerate() {
                write!(f, "  v{}: ", j + 1)?;
                write_point(f, v)?;
            }
        }
        for (i, p) in self.points.iter().enumerate() {
            write!(f, "point {}: ", i + 1)?;
            write_point(f, p)?;
        }
        Ok(())
    }
}

fn write_point(f: &mut fmt::Formatter<'_>, p: &IntersectionPoint) -> fmt::Result {
    let (q, a, b) = (p.point(), p.p2s().uv1(), p.p2s().uv2());
    write!(
        f,
        "t={:.6} ({:.6}, {:.6}, {:.6}) uv1=({:.6}, {:.6}) uv2=({:.6}, {:.6})",
        p.param_on_line(),
        q.x,
        q.y,
        q.z,
        a.x,
        a.y,
        b.x,
        b.y
    )?;
    for (side, tag) in [(SurfaceSide::First, "s1"), (SurfaceSide::Second, "s2")] {
        if let Some(on) = p.incidence(side) {
            write!(f, " {tag}:{:?}@{:.6}", on.arc, on.param)?;
        }
    }
    if p.is_tangent() {
        f.write_str(" tangent")?;
    }
    writeln!(f)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::boundary::ArcId;
    use crate::error::SurfsectError;
    use crate::intersection::line::{LineVertices, PointLine, RestrictionLine, WalkingLine};
    use crate::intersection::point::{ArcIncidence, PointOn2S};
    use crate::math::{Point2, Point3};
    use slotmap::SlotMap;

    fn p2s(x: f64) -> PointOn2S {
        PointOn2S::new(Point3::new(x, 0.0, 0.0), Point2::new(x, 0.0), Point2::new(0.0, x))
    }

    fn walking(x: f64) -> IntersectionLine {
        IntersectionLine::Walking(WalkingLine::new(
            vec![p2s(x), p2s(x + 1.0)],
            LineVertices::default(),
            false,
        ))
    }

    #[test]
    fn non_walking_lines_come_first() {
        let mut arcs: SlotMap<ArcId, ()> = SlotMap::with_key();
        let arc = arcs.insert(());
        let mut r = IntersectionResult::default();
        r.push_line(walking(0.0));
        let lone = IntersectionPoint::new(p2s(5.0), 0.0);
        r.push_line(IntersectionLine::Point(PointLine::new(lone)));
        r.push_line(walking(2.0));
        let start = IntersectionPoint::new(p2s(7.0), 0.0)
            .with_arc(SurfaceSide::Second, ArcIncidence { arc, param: 0.5 });
        r.push_line(IntersectionLine::Restriction(RestrictionLine::new(
            SurfaceSide::Second,
            arc,
            vec![p2s(7.0), p2s(8.0)],
            LineVertices::ordered(vec![start]),
        )));

        let kinds: Vec<LineKind> = r.lines().iter().map(IntersectionLine::kind).collect();
        assert_eq!(
            kinds,
            vec![LineKind::Point, LineKind::Restriction, LineKind::Walking, LineKind::Walking]
        );
        assert!((r.line(3).unwrap().samples()[0].point().x).abs() < 1e-12);
        assert!((r.line(4).unwrap().samples()[0].point().x - 2.0).abs() < 1e-12);

        let dump = r.to_string();
        assert!(dump.contains("walking=2"));
        assert!(dump.contains("restriction(s1)=0 restriction(s2)=1"));
        assert!(dump.contains("s2:"));
    }

    #[test]
    fn line_index_is_one_based() {
        let mut r = IntersectionResult::default();
        r.push_line(walking(0.0));
        assert!(r.line(1).is_ok());
        assert!(matches!(
            r.line(0),
            Err(SurfsectError::Intersection(IntersectionError::LineIndexOutOfRange {
                index: 0,
                count: 1
            }))
        ));
        assert!(r.line(2).is_err());
    }

    #[test]
    fn empty_excludes_coincident_faces() {
        let r = IntersectionResult::default();
        assert!(r.is_empty());
        let c = IntersectionResult::coincident(true);
        assert!(!c.is_empty());
        assert!(c.is_done());
        assert!(c.is_tangent_faces());
        assert!(c.is_opposite_faces());
        assert_eq!(c.nb_lines(), 0);
    }
}
