//! Surface-surface intersection.
//!
//! [`SurfaceIntersector::perform`] picks a strategy from the pair of surface
//! classes (closed form, marching, or chaining of raw candidates), runs it on
//! the two trimmed faces and collects the lines and isolated points into an
//! [`IntersectionResult`]. Every line's vertices go through the
//! [`assemble`](assemble::assemble) passes before they reach the result.

pub mod assemble;
pub mod candidates;
pub mod diagnostics;
pub mod dispatch;
pub mod line;
pub mod options;
pub mod point;
pub mod refine;
pub mod result;

mod analytic;
mod march;
mod restriction;

pub use candidates::{CandidateSource, GridCandidates};
pub use diagnostics::{ProjectionDistance, SingularDistance};
pub use dispatch::SurfaceIntersector;
pub use line::{
    AnalyticCurve, AnalyticLine, ArcRef, IntersectionLine, LineKind, LineVertices, PointLine,
    RestrictionLine, WalkingLine,
};
pub use options::{IntersectionOptions, Strategy};
pub use point::{ArcIncidence, IntersectionPoint, PointOn2S, SurfaceSide};
pub use refine::{NewtonRefiner, PointRefiner};
pub use result::IntersectionResult;
