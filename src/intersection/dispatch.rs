use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::{debug, instrument};

use crate::boundary::{BoundaryProvider, Region};
use crate::error::{IntersectionError, Result};
use crate::geometry::surface::{Surface, SurfaceClass};

use super::analytic;
use super::candidates::{chain_into_lines, refine_candidates, CandidateSource, GridCandidates};
use super::diagnostics::{
    coincident_faces, singular_contacts, ProjectionDistance, SingularDistance,
};
use super::march::{default_step, region_box, Marcher, Seed, UV_SLACK};
use super::options::{IntersectionOptions, Strategy};
use super::point::SurfaceSide;
use super::refine::{NewtonRefiner, PointRefiner};
use super::restriction::restriction_lines;
use super::result::IntersectionResult;

/// Strategy per pair of surface classes, built on first use.
fn strategy_table() -> &'static HashMap<(SurfaceClass, SurfaceClass), Strategy> {
    static TABLE: OnceLock<HashMap<(SurfaceClass, SurfaceClass), Strategy>> = OnceLock::new();
    TABLE.get_or_init(|| {
        use SurfaceClass::{Parametric, Plane, Quadric, Sampled};
        let classes = [Plane, Quadric, Parametric, Sampled];
        let mut table = HashMap::with_capacity(classes.len() * classes.len());
        for a in classes {
            for b in classes {
                let strategy = match (a, b) {
                    (Sampled, _) | (_, Sampled) => Strategy::Candidates,
                    (Plane | Quadric, Plane | Quadric) => Strategy::Analytic,
                    _ => Strategy::Walking,
                };
                table.insert((a, b), strategy);
            }
        }
        table
    })
}

/// Computes the intersection of two trimmed surfaces.
///
/// The numeric collaborators (seed refinement, raw candidates, distance at
/// singular points) can be replaced; the defaults are [`NewtonRefiner`],
/// [`GridCandidates`] and [`ProjectionDistance`]. The intersector is `Send`
/// and `Sync`, so one configured instance can serve concurrent calls.
pub struct SurfaceIntersector {
    tol_arc: f64,
    tol_tang: f64,
    options: IntersectionOptions,
    refiner: Box<dyn PointRefiner + Send + Sync>,
    candidates: Option<Box<dyn CandidateSource + Send + Sync>>,
    singular: Box<dyn SingularDistance + Send + Sync>,
}

impl SurfaceIntersector {
    /// `tol_arc` decides boundary-arc membership, `tol_tang` geometric
    /// coincidence.
    #[must_use]
    pub fn new(tol_arc: f64, tol_tang: f64) -> Self {
        Self {
            tol_arc,
            tol_tang,
            options: IntersectionOptions::default(),
            refiner: Box::new(NewtonRefiner::default()),
            candidates: None,
            singular: Box::new(ProjectionDistance),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: IntersectionOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_refiner(mut self, refiner: Box<dyn PointRefiner + Send + Sync>) -> Self {
        self.refiner = refiner;
        self
    }

    /// Replaces the interior candidate search; the default is a
    /// [`GridCandidates`] of the options' grid density.
    #[must_use]
    pub fn with_candidate_source(
        mut self,
        source: Box<dyn CandidateSource + Send + Sync>,
    ) -> Self {
        self.candidates = Some(source);
        self
    }

    #[must_use]
    pub fn with_singular_distance(
        mut self,
        metric: Box<dyn SingularDistance + Send + Sync>,
    ) -> Self {
        self.singular = metric;
        self
    }

    #[must_use]
    pub fn options(&self) -> &IntersectionOptions {
        &self.options
    }

    /// Intersects `s1` trimmed by `b1` with `s2` trimmed by `b2`.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance or option is not a positive finite
    /// number, a boundary cannot be sampled, a forced strategy cannot handle
    /// the pair, or a given seed does not converge onto both surfaces.
    #[instrument(skip_all, fields(s1 = s1.kind().name(), s2 = s2.kind().name()))]
    pub fn perform(
        &self,
        s1: &dyn Surface,
        b1: &dyn BoundaryProvider,
        s2: &dyn Surface,
        b2: &dyn BoundaryProvider,
    ) -> Result<IntersectionResult> {
        self.validate()?;
        let r1 = Region::new(s1, b1, self.options.arc_samples)?;
        let r2 = Region::new(s2, b2, self.options.arc_samples)?;
        let marcher = Marcher {
            s1,
            s2,
            r1: &r1,
            r2: &r2,
            tol_arc: self.tol_arc,
            tol_tang: self.tol_tang,
            step: self
                .options
                .step
                .unwrap_or_else(|| default_step(s1, &r1, s2, &r2)),
            max_samples: self.options.max_samples,
            max_turn: self.options.max_turn_angle,
        };

        if let Some(seed) = self.options.seed {
            return self.seeded(&marcher, seed);
        }

        if let Some(opposite) = coincident_faces(
            s1,
            &r1,
            s2,
            &r2,
            self.tol_tang,
            self.options.arc_samples,
        ) {
            debug!(opposite, "faces are coincident");
            return Ok(IntersectionResult::coincident(opposite));
        }

        let strategy = self.strategy_for(s1, s2)?;
        debug!(strategy = strategy.name(), step = marcher.step, "strategy selected");

        let mut result = IntersectionResult::default();
        let done = match strategy {
            Strategy::Analytic => match analytic::intersect(&marcher) {
                Some(outcome) => {
                    outcome.lines.into_iter().for_each(|l| result.push_line(l));
                    outcome.points.into_iter().for_each(|p| result.push_point(p));
                    true
                }
                None => {
                    debug!("no closed form for the pair, marching instead");
                    self.walk(&marcher, &mut result)
                }
            },
            Strategy::Walking => self.walk(&marcher, &mut result),
            Strategy::Candidates => self.chain(&marcher, &mut result),
        };

        let contacts =
            singular_contacts(&marcher, self.singular.as_ref(), result.lines(), result.points());
        contacts.into_iter().for_each(|p| result.push_point(p));
        result.set_done(done);

        debug!(
            lines = result.nb_lines(),
            points = result.points().len(),
            done,
            "intersection finished"
        );
        Ok(result)
    }

    fn validate(&self) -> Result<()> {
        let positive = |x: f64| x.is_finite() && x > 0.0;
        if !positive(self.tol_arc) || !positive(self.tol_tang) {
            return Err(IntersectionError::InvalidInput(format!(
                "tolerances must be positive, got arc {} and tangential {}",
                self.tol_arc, self.tol_tang
            ))
            .into());
        }
        if self.options.step.is_some_and(|h| !positive(h)) {
            return Err(
                IntersectionError::InvalidInput("marching step must be positive".into()).into(),
            );
        }
        if self.options.max_samples == 0 || self.options.arc_samples == 0 {
            return Err(
                IntersectionError::InvalidInput("sample counts must be non-zero".into()).into(),
            );
        }
        Ok(())
    }

    fn strategy_for(&self, s1: &dyn Surface, s2: &dyn Surface) -> Result<Strategy> {
        let (c1, c2) = (s1.kind().class(), s2.kind().class());
        let closed_form =
            |c: SurfaceClass| matches!(c, SurfaceClass::Plane | SurfaceClass::Quadric);
        match self.options.strategy {
            Some(Strategy::Analytic) if !(closed_form(c1) && closed_form(c2)) => {
                Err(IntersectionError::StrategyUnavailable {
                    strategy: Strategy::Analytic.name(),
                    pair: format!("{}/{}", s1.kind().name(), s2.kind().name()),
                }
                .into())
            }
            Some(forced) => Ok(forced),
            None => Ok(strategy_table()
                .get(&(c1, c2))
                .copied()
                .unwrap_or(Strategy::Walking)),
        }
    }

    fn raw_candidates(&self, marcher: &Marcher<'_>) -> Vec<[f64; 4]> {
        let (s1, r1, s2, r2) = (marcher.s1, marcher.r1, marcher.s2, marcher.r2);
        match &self.candidates {
            Some(source) => source.candidates(s1, r1, s2, r2),
            None => GridCandidates {
                density: self.options.grid_density,
            }
            .candidates(s1, r1, s2, r2),
        }
    }

    /// Marches from boundary crossings first, then from interior candidates,
    /// and adds the arcs lying on the other surface.
    fn walk(&self, marcher: &Marcher<'_>, result: &mut IntersectionResult) -> bool {
        let arc_samples = self.options.arc_samples;
        let mut seeds = marcher.boundary_seeds(SurfaceSide::First, arc_samples);
        seeds.extend(marcher.boundary_seeds(SurfaceSide::Second, arc_samples));
        let boundary_seeds = seeds.len();
        let raw = self.raw_candidates(marcher);
        seeds.extend(
            refine_candidates(&raw, marcher, self.refiner.as_ref())
                .into_iter()
                .map(|point| Seed { point, vertex: None }),
        );
        debug!(
            boundary_seeds,
            interior_seeds = seeds.len() - boundary_seeds,
            "seeds collected"
        );

        let walked = marcher.trace_all(&seeds);
        for side in [SurfaceSide::First, SurfaceSide::Second] {
            restriction_lines(marcher, side, arc_samples)
                .into_iter()
                .for_each(|l| result.push_line(l));
        }
        walked.lines.into_iter().for_each(|l| result.push_line(l));
        walked.points.into_iter().for_each(|p| result.push_point(p));
        !walked.exhausted
    }

    /// Links refined candidates into lines, for pairs the marcher cannot
    /// follow.
    #[allow(clippy::cast_precision_loss)]
    fn chain(&self, marcher: &Marcher<'_>, result: &mut IntersectionResult) -> bool {
        let raw = self.raw_candidates(marcher);
        let points = refine_candidates(&raw, marcher, self.refiner.as_ref());
        let extent = |s: &dyn Surface, r: &Region| {
            let (lo, hi) = region_box(s, r);
            (hi - lo).norm()
        };
        let span = extent(marcher.s1, marcher.r1).min(extent(marcher.s2, marcher.r2));
        let link = 3.0 * span / self.options.grid_density.max(1) as f64;
        chain_into_lines(points, link, marcher)
            .into_iter()
            .for_each(|l| result.push_line(l));
        true
    }

    fn seeded(&self, marcher: &Marcher<'_>, seed: [f64; 4]) -> Result<IntersectionResult> {
        let point = self
            .refiner
            .refine(marcher.s1, marcher.s2, seed, self.tol_tang)
            .ok_or(IntersectionError::RefinementFailed)?;
        let (uv1, uv2) = (point.uv1(), point.uv2());
        if !marcher.r1.contains(uv1.x, uv1.y, UV_SLACK)
            || !marcher.r2.contains(uv2.x, uv2.y, UV_SLACK)
        {
            debug!(?seed, "refined seed lies outside the trimmed faces");
            return Err(IntersectionError::RefinementFailed.into());
        }
        let point = marcher.pair(SurfaceSide::First, uv1, uv2, *point.point());
        let walked = marcher.trace_all(&[Seed { point, vertex: None }]);
        let mut result = IntersectionResult::default();
        walked.lines.into_iter().for_each(|l| result.push_line(l));
        walked.points.into_iter().for_each(|p| result.push_point(p));
        result.set_done(!walked.exhausted);
        Ok(result)
    }
}
