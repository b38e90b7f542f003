pub mod boundary;
pub mod error;
pub mod geometry;
pub mod intersection;
pub mod math;

pub use error::{Result, SurfsectError};
pub use intersection::{IntersectionOptions, IntersectionResult, SurfaceIntersector};
