use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3};

use super::{Surface, SurfaceDerivatives, SurfaceDomain, SurfaceKind};

/// A surface known only through a regular grid of samples.
///
/// Samples are spread uniformly over `domain`; points in between are
/// interpolated bilinearly inside each cell. Parameters outside the domain
/// are clamped onto it.
#[derive(Debug, Clone)]
pub struct GridSurface {
    samples: Vec<Vec<Point3>>,
    domain: SurfaceDomain,
}

impl GridSurface {
    /// Creates a sampled surface; `samples[i][j]` sits at the `i`-th U and
    /// `j`-th V station.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is smaller than 2x2, ragged, or the
    /// domain is empty or unbounded.
    pub fn new(samples: Vec<Vec<Point3>>, domain: SurfaceDomain) -> Result<Self> {
        let cols = samples.first().map_or(0, Vec::len);
        if samples.len() < 2 || cols < 2 || samples.iter().any(|row| row.len() != cols) {
            return Err(
                GeometryError::Degenerate("sample grid must be rectangular and at least 2x2".into())
                    .into(),
            );
        }
        if !domain.is_bounded() || domain.u_max <= domain.u_min || domain.v_max <= domain.v_min {
            return Err(GeometryError::Degenerate("sample grid domain is empty".into()).into());
        }
        Ok(Self { samples, domain })
    }

    /// Locates the cell holding `t` along an axis with `count` stations.
    ///
    /// Returns the cell index and the local coordinate in `[0, 1]`, plus the
    /// parameter length of one cell.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn locate(t: f64, min: f64, max: f64, count: usize) -> (usize, f64, f64) {
        let cells = count - 1;
        let cell_len = (max - min) / cells as f64;
        let s = ((t.clamp(min, max) - min) / cell_len).max(0.0);
        let index = (s.floor() as usize).min(cells - 1);
        (index, s - index as f64, cell_len)
    }
}

impl Surface for GridSurface {
    fn evaluate(&self, u: f64, v: f64) -> Result<Point3> {
        Ok(self.derivatives(u, v)?.point)
    }

    fn derivatives(&self, u: f64, v: f64) -> Result<SurfaceDerivatives> {
        let d = &self.domain;
        let (i, a, du_len) = Self::locate(u, d.u_min, d.u_max, self.samples.len());
        let (j, b, dv_len) = Self::locate(v, d.v_min, d.v_max, self.samples[0].len());
        let p00 = self.samples[i][j].coords;
        let p10 = self.samples[i + 1][j].coords;
        let p01 = self.samples[i][j + 1].coords;
        let p11 = self.samples[i + 1][j + 1].coords;

        let point = p00 * ((1.0 - a) * (1.0 - b))
            + p10 * (a * (1.0 - b))
            + p01 * ((1.0 - a) * b)
            + p11 * (a * b);
        let du: Vector3 = ((p10 - p00) * (1.0 - b) + (p11 - p01) * b) / du_len;
        let dv: Vector3 = ((p01 - p00) * (1.0 - a) + (p11 - p10) * a) / dv_len;
        Ok(SurfaceDerivatives {
            point: Point3::from(point),
            du,
            dv,
        })
    }

    fn domain(&self) -> SurfaceDomain {
        self.domain
    }

    fn kind(&self) -> SurfaceKind {
        SurfaceKind::Other
    }
}
