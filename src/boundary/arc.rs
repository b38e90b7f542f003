use crate::error::{BoundaryError, Result};
use crate::geometry::curve2d::{Circle2d, Curve2d, Segment2d};
use crate::math::{Point2, Vector2};

slotmap::new_key_type! {
    /// Unique identifier for a boundary arc.
    pub struct ArcId;
}

/// The parameter-space curve carried by an arc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArcCurve {
    Segment(Segment2d),
    Circle(Circle2d),
}

impl Curve2d for ArcCurve {
    fn evaluate(&self, t: f64) -> Point2 {
        match self {
            Self::Segment(s) => s.evaluate(t),
            Self::Circle(c) => c.evaluate(t),
        }
    }

    fn derivative(&self, t: f64) -> Vector2 {
        match self {
            Self::Segment(s) => s.derivative(t),
            Self::Circle(c) => c.derivative(t),
        }
    }

    fn parameter_of(&self, point: &Point2) -> f64 {
        match self {
            Self::Segment(s) => s.parameter_of(point),
            Self::Circle(c) => c.parameter_of(point),
        }
    }
}

/// A trimming arc: a 2D curve restricted to `[t_min, t_max]`.
///
/// Seam arcs close a periodic direction and are not real boundaries.
#[derive(Debug, Clone)]
pub struct ArcData {
    /// The parameter-space curve.
    pub curve: ArcCurve,
    /// Start of the arc's parameter range.
    pub t_min: f64,
    /// End of the arc's parameter range.
    pub t_max: f64,
    /// Whether the arc is the seam of a closed direction.
    pub seam: bool,
}

impl ArcData {
    /// Creates an arc over `[t_min, t_max]`.
    ///
    /// # Errors
    ///
    /// Returns an error if the range is empty or not finite.
    pub fn new(curve: ArcCurve, t_min: f64, t_max: f64) -> Result<Self> {
        if !t_min.is_finite() || !t_max.is_finite() || t_max <= t_min {
            return Err(
                BoundaryError::InvalidArc(format!("empty parameter range [{t_min}, {t_max}]"))
                    .into(),
            );
        }
        Ok(Self {
            curve,
            t_min,
            t_max,
            seam: false,
        })
    }

    /// Straight arc from `start` to `end`, parametrized by length.
    ///
    /// # Errors
    ///
    /// Returns an error if the end points coincide.
    pub fn segment(start: Point2, end: Point2) -> Result<Self> {
        let seg = Segment2d::new(start, end)
            .map_err(|_| BoundaryError::InvalidArc("segment end points coincide".into()))?;
        Self::new(ArcCurve::Segment(seg), 0.0, seg.length())
    }

    /// Marks the arc as a seam.
    #[must_use]
    pub fn with_seam(mut self) -> Self {
        self.seam = true;
        self
    }

    /// Point of the arc at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        self.curve.evaluate(t)
    }

    /// `count + 1` evenly spaced `(t, point)` samples from `t_min` to `t_max`.
    #[must_use]
    pub fn samples(&self, count: usize) -> Vec<(f64, Point2)> {
        let count = count.max(1);
        #[allow(clippy::cast_precision_loss)]
        let step = (self.t_max - self.t_min) / count as f64;
        (0..=count)
            .map(|i| {
                #[allow(clippy::cast_precision_loss)]
                let t = if i == count { self.t_max } else { self.t_min + step * i as f64 };
                (t, self.point_at(t))
            })
            .collect()
    }

    /// Parameter of the arc point closest to `point`, clamped into the range.
    #[must_use]
    pub fn project(&self, point: &Point2) -> f64 {
        let t = self.curve.parameter_of(point);
        if t >= self.t_min && t <= self.t_max {
            return t;
        }
        // Outside the range: the closer end wins (circle parameters wrap).
        let d_min = (self.point_at(self.t_min) - point).norm();
        let d_max = (self.point_at(self.t_max) - point).norm();
        if d_min <= d_max {
            self.t_min
        } else {
            self.t_max
        }
    }
}
