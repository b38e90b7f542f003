use crate::boundary::ArcId;
use crate::math::{Point2, Point3};

/// A point known on two surfaces at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointOn2S {
    point: Point3,
    uv1: Point2,
    uv2: Point2,
}

impl PointOn2S {
    #[must_use]
    pub fn new(point: Point3, uv1: Point2, uv2: Point2) -> Self {
        Self { point, uv1, uv2 }
    }

    #[must_use]
    pub fn point(&self) -> &Point3 {
        &self.point
    }

    /// Parameters on the first surface.
    #[must_use]
    pub fn uv1(&self) -> Point2 {
        self.uv1
    }

    /// Parameters on the second surface.
    #[must_use]
    pub fn uv2(&self) -> Point2 {
        self.uv2
    }

    #[must_use]
    pub fn uv(&self, side: SurfaceSide) -> Point2 {
        match side {
            SurfaceSide::First => self.uv1,
            SurfaceSide::Second => self.uv2,
        }
    }

    /// `(u1, v1, u2, v2)`.
    #[must_use]
    pub fn params(&self) -> [f64; 4] {
        [self.uv1.x, self.uv1.y, self.uv2.x, self.uv2.y]
    }
}

/// Which of the two intersected surfaces something refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceSide {
    First,
    Second,
}

impl SurfaceSide {
    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }
}

/// A point lying on a boundary arc, at `param` along the arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcIncidence {
    pub arc: ArcId,
    pub param: f64,
}

/// A vertex candidate on an intersection line.
///
/// Carries its position along the line and up to one boundary incidence per
/// surface.
#[derive(Debug, Clone, PartialEq)]
pub struct IntersectionPoint {
    p2s: PointOn2S,
    param_on_line: f64,
    tangent: bool,
    on_s1: Option<ArcIncidence>,
    on_s2: Option<ArcIncidence>,
}

impl IntersectionPoint {
    #[must_use]
    pub fn new(p2s: PointOn2S, param_on_line: f64) -> Self {
        Self {
            p2s,
            param_on_line,
            tangent: false,
            on_s1: None,
            on_s2: None,
        }
    }

    /// Records that the point lies on `incidence.arc` of the `side` surface.
    #[must_use]
    pub fn with_arc(mut self, side: SurfaceSide, incidence: ArcIncidence) -> Self {
        self.set_incidence(side, Some(incidence));
        self
    }

    #[must_use]
    pub fn with_tangent(mut self, tangent: bool) -> Self {
        self.tangent = tangent;
        self
    }

    #[must_use]
    pub fn p2s(&self) -> &PointOn2S {
        &self.p2s
    }

    #[must_use]
    pub fn point(&self) -> &Point3 {
        self.p2s.point()
    }

    #[must_use]
    pub fn param_on_line(&self) -> f64 {
        self.param_on_line
    }

    pub fn set_param_on_line(&mut self, param: f64) {
        self.param_on_line = param;
    }

    #[must_use]
    pub fn is_tangent(&self) -> bool {
        self.tangent
    }

    pub fn set_tangent(&mut self, tangent: bool) {
        self.tangent = tangent;
    }

    #[must_use]
    pub fn incidence(&self, side: SurfaceSide) -> Option<&ArcIncidence> {
        match side {
            SurfaceSide::First => self.on_s1.as_ref(),
            SurfaceSide::Second => self.on_s2.as_ref(),
        }
    }

    pub fn set_incidence(&mut self, side: SurfaceSide, incidence: Option<ArcIncidence>) {
        match side {
            SurfaceSide::First => self.on_s1 = incidence,
            SurfaceSide::Second => self.on_s2 = incidence,
        }
    }

    #[must_use]
    pub fn is_on(&self, side: SurfaceSide) -> bool {
        self.incidence(side).is_some()
    }

    /// Whether the point touches a boundary of either surface.
    #[must_use]
    pub fn is_on_boundary(&self) -> bool {
        self.on_s1.is_some() || self.on_s2.is_some()
    }

    #[must_use]
    pub fn incidence_count(&self) -> usize {
        usize::from(self.on_s1.is_some()) + usize::from(self.on_s2.is_some())
    }
}
