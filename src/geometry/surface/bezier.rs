use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDerivatives, SurfaceDomain, SurfaceKind};

/// A tensor-product Bezier patch over `[0, 1] x [0, 1]`.
///
/// `poles[i][j]` is the control point at row `i` (U direction) and
/// column `j` (V direction).
#[derive(Debug, Clone)]
pub struct BezierSurface {
    poles: Vec<Vec<Point3>>,
}

impl BezierSurface {
    /// Creates a patch from a rectangular control net.
    ///
    /// # Errors
    ///
    /// Returns an error if the net has fewer than two rows or columns, or the
    /// rows have different lengths.
    pub fn new(poles: Vec<Vec<Point3>>) -> Result<Self> {
        let cols = poles.first().map_or(0, Vec::len);
        if poles.len() < 2 || cols < 2 {
            return Err(GeometryError::Degenerate(
                "bezier net needs at least 2x2 poles".into(),
            )
            .into());
        }
        if poles.iter().any(|row| row.len() != cols) {
            return Err(
                GeometryError::Degenerate("bezier net rows differ in length".into()).into(),
            );
        }
        Ok(Self { poles })
    }

    #[must_use]
    pub fn degree_u(&self) -> usize {
        self.poles.len() - 1
    }

    #[must_use]
    pub fn degree_v(&self) -> usize {
        self.poles[0].len() - 1
    }

    /// Curve of the row-wise V evaluation: one point per U row.
    fn collapse_v(&self, v: f64) -> Vec<Vector3> {
        self.poles
            .iter()
            .map(|row| {
                let coords: Vec<Vector3> = row.iter().map(|p| p.coords).collect();
                de_casteljau(&coords, v)
            })
            .collect()
    }

    /// Curve of the column-wise U evaluation: one point per V column.
    fn collapse_u(&self, u: f64) -> Vec<Vector3> {
        (0..self.poles[0].len())
            .map(|j| {
                let coords: Vec<Vector3> = self.poles.iter().map(|row| row[j].coords).collect();
                de_casteljau(&coords, u)
            })
            .collect()
    }
}

fn de_casteljau(points: &[Vector3], t: f64) -> Vector3 {
    let mut work = points.to_vec();
    for level in 1..work.len() {
        for i in 0..work.len() - level {
            work[i] = work[i] * (1.0 - t) + work[i + 1] * t;
        }
    }
    work.first().copied().unwrap_or_else(Vector3::zeros)
}

/// Derivative of the Bezier curve with control points `points`.
fn hodograph(points: &[Vector3], t: f64) -> Vector3 {
    #[allow(clippy::cast_precision_loss)]
    let degree = (points.len() - 1) as f64;
    let diffs: Vec<Vector3> = points.windows(2).map(|w| (w[1] - w[0]) * degree).collect();
    de_casteljau(&diffs, t)
}

impl Surface for BezierSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(Point3::from(de_casteljau(&self.collapse_v(v), u)))
    }

    fn derivatives(&self, u: f64, v: f64) -> Result<SurfaceDerivatives> {
        let rows = self.collapse_v(v);
        let cols = self.collapse_u(u);
        Ok(SurfaceDerivatives {
            point: Point3::from(de_casteljau(&rows, u)),
            du: hodograph(&rows, u),
            dv: hodograph(&cols, v),
        })
    }

    fn domain(&self) -> SurfaceDomain {
        SurfaceDomain::new(0.0, 1.0, 0.0, 1.0)
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Bezier
    }
}
