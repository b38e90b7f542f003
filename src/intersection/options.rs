/// Computation strategy for a surface pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Closed-form intersection of planes and quadrics.
    Analytic,
    /// Geometric marching from boundary and interior seeds.
    Walking,
    /// Chaining of refined grid candidates, for surfaces without geometric
    /// support.
    Candidates,
}

impl Strategy {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Analytic => "analytic",
            Self::Walking => "walking",
            Self::Candidates => "candidates",
        }
    }
}

/// Tuning knobs of [`SurfaceIntersector`](super::SurfaceIntersector).
#[derive(Debug, Clone)]
pub struct IntersectionOptions {
    /// Forces a strategy instead of the one picked from the surface pair.
    pub strategy: Option<Strategy>,
    /// Refines and traces from `(u1, v1, u2, v2)` instead of searching globally.
    pub seed: Option<[f64; 4]>,
    /// Marching step in 3D; derived from the regions' extent when unset.
    pub step: Option<f64>,
    /// Sample cap per trace, both directions and the seed together. The
    /// first trace hitting it ends marching and leaves the result not done.
    pub max_samples: usize,
    /// Samples per boundary arc for seeding and restriction detection.
    pub arc_samples: usize,
    /// Interior seeding grid, per direction.
    pub grid_density: usize,
    /// Turn between consecutive steps (radians) above which the step halves.
    pub max_turn_angle: f64,
}

impl Default for IntersectionOptions {
    fn default() -> Self {
        Self {
            strategy: None,
            seed: None,
            step: None,
            max_samples: 2000,
            arc_samples: 32,
            grid_density: 16,
            max_turn_angle: 0.25,
        }
    }
}

impl IntersectionOptions {
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: [f64; 4]) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    #[must_use]
    pub fn with_max_samples(mut self, max_samples: usize) -> Self {
        self.max_samples = max_samples;
        self
    }

    #[must_use]
    pub fn with_arc_samples(mut self, arc_samples: usize) -> Self {
        self.arc_samples = arc_samples;
        self
    }

    #[must_use]
    pub fn with_grid_density(mut self, grid_density: usize) -> Self {
        self.grid_density = grid_density;
        self
    }

    #[must_use]
    pub fn with_max_turn_angle(mut self, angle: f64) -> Self {
        self.max_turn_angle = angle;
        self
    }
}
