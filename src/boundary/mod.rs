//! Trimming boundaries of a surface's parameter domain.

mod arc;
mod region;

pub use arc::{ArcCurve, ArcData, ArcId};
pub use region::{BoundaryHit, Region};

use slotmap::SlotMap;

use crate::error::{BoundaryError, Result};
use crate::geometry::surface::{Surface, SurfaceDomain};
use crate::math::{Point2, PARAM_TOLERANCE};

/// Source of a surface's trimming arcs.
pub trait BoundaryProvider {
    /// Arc ids in boundary order.
    fn arc_ids(&self) -> &[ArcId];

    /// Returns the arc data for `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the arc is not part of this boundary.
    fn arc(&self, id: ArcId) -> std::result::Result<&ArcData, BoundaryError>;

    /// Whether the surface is closed (wraps around) in U.
    fn is_u_closed(&self) -> bool;

    /// Whether the surface is closed (wraps around) in V.
    fn is_v_closed(&self) -> bool;
}

/// Arena of boundary arcs, kept in insertion order.
#[derive(Debug, Default)]
pub struct Boundary {
    arcs: SlotMap<ArcId, ArcData>,
    order: Vec<ArcId>,
    u_closed: bool,
    v_closed: bool,
}

impl Boundary {
    /// Creates a new, empty boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arc and returns its id.
    pub fn add_arc(&mut self, data: ArcData) -> ArcId {
        let id = self.arcs.insert(data);
        self.order.push(id);
        id
    }

    /// Declares which parameter directions wrap around.
    pub fn set_closed(&mut self, u_closed: bool, v_closed: bool) {
        self.u_closed = u_closed;
        self.v_closed = v_closed;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Counter-clockwise rectangle around `domain`: bottom, right, top, left.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain is unbounded or empty.
    pub fn rectangle(domain: &SurfaceDomain) -> Result<Self> {
        Self::framed(domain, false, false)
    }

    /// The natural boundary of `surface`: its full domain, with periodic
    /// directions closed and their bounding arcs flagged as seams.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface domain is unbounded.
    pub fn natural(surface: &dyn Surface) -> Result<Self> {
        Self::natural_within(surface, &surface.domain())
    }

    /// Like [`Boundary::natural`] over an explicit parameter box. A periodic
    /// direction is closed only when the box spans exactly one period.
    ///
    /// # Errors
    ///
    /// Returns an error if `domain` is unbounded.
    pub fn natural_within(surface: &dyn Surface, domain: &SurfaceDomain) -> Result<Self> {
        let spans = |period: Option<f64>, width: f64| {
            period.is_some_and(|p| (width - p).abs() < PARAM_TOLERANCE)
        };
        Self::framed(
            domain,
            spans(surface.period_u(), domain.u_max - domain.u_min),
            spans(surface.period_v(), domain.v_max - domain.v_min),
        )
    }

    fn framed(domain: &SurfaceDomain, u_closed: bool, v_closed: bool) -> Result<Self> {
        if !domain.is_bounded() {
            return Err(BoundaryError::InvalidArc("domain is unbounded".into()).into());
        }
        let corners = [
            Point2::new(domain.u_min, domain.v_min),
            Point2::new(domain.u_max, domain.v_min),
            Point2::new(domain.u_max, domain.v_max),
            Point2::new(domain.u_min, domain.v_max),
        ];
        let mut boundary = Self::new();
        for i in 0..4 {
            let arc = ArcData::segment(corners[i], corners[(i + 1) % 4])?;
            // odd sides run along V (constant U), even sides along U
            let seam = if i % 2 == 1 { u_closed } else { v_closed };
            boundary.add_arc(if seam { arc.with_seam() } else { arc });
        }
        boundary.set_closed(u_closed, v_closed);
        Ok(boundary)
    }
}

impl BoundaryProvider for Boundary {
    fn arc_ids(&self) -> &[ArcId] {
        &self.order
    }

    fn arc(&self, id: ArcId) -> std::result::Result<&ArcData, BoundaryError> {
        self.arcs.get(id).ok_or(BoundaryError::ArcNotFound)
    }

    fn is_u_closed(&self) -> bool {
        self.u_closed
    }

    fn is_v_closed(&self) -> bool {
        self.v_closed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::surface::{Cylinder, Plane, Sphere, Torus};
    use crate::math::{Point3, Vector3};
    use std::f64::consts::{PI, TAU};

    #[test]
    fn rectangle_has_four_open_arcs() {
        let b = Boundary::rectangle(&SurfaceDomain::new(0.0, 2.0, 0.0, 1.0)).unwrap();
        assert_eq!(b.len(), 4);
        assert!(!b.is_u_closed());
        for id in b.arc_ids() {
            assert!(!b.arc(*id).unwrap().seam);
        }
    }

    #[test]
    fn natural_sphere_boundary_flags_u_seams() {
        let s = Sphere::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let b = Boundary::natural(&s).unwrap();
        assert!(b.is_u_closed());
        assert!(!b.is_v_closed());
        let seams: Vec<bool> = b.arc_ids().iter().map(|id| b.arc(*id).unwrap().seam).collect();
        assert_eq!(seams, vec![false, true, false, true]);
    }

    #[test]
    fn natural_torus_is_all_seams() {
        let t = Torus::new(Point3::origin(), 3.0, 1.0, Vector3::z(), Vector3::x()).unwrap();
        let b = Boundary::natural(&t).unwrap();
        assert!(b.arc_ids().iter().all(|id| b.arc(*id).unwrap().seam));
    }

    #[test]
    fn natural_plane_is_unbounded() {
        let p = Plane::from_normal(Point3::origin(), Vector3::z()).unwrap();
        assert!(Boundary::natural(&p).is_err());
    }

    #[test]
    fn natural_within_closes_only_full_periods() {
        let c = Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::x()).unwrap();
        let full = Boundary::natural_within(&c, &SurfaceDomain::new(0.0, TAU, -1.0, 1.0)).unwrap();
        assert!(full.is_u_closed());
        assert!(!full.is_v_closed());
        let half = Boundary::natural_within(&c, &SurfaceDomain::new(0.0, PI, -1.0, 1.0)).unwrap();
        assert!(!half.is_u_closed());
        assert!(half.arc_ids().iter().all(|id| !half.arc(*id).unwrap().seam));
    }

    #[test]
    fn missing_arc_reports_not_found() {
        let mut other = Boundary::new();
        let foreign =
            other.add_arc(ArcData::segment(Point2::origin(), Point2::new(1.0, 0.0)).unwrap());
        let empty = Boundary::new();
        assert!(empty.is_empty());
        assert!(matches!(empty.arc(foreign), Err(BoundaryError::ArcNotFound)));
    }
}
