pub mod curve;
pub mod curve2d;
pub mod frame;
pub mod projection;
pub mod surface;

pub use curve::{Circle, Curve, Line};
pub use curve2d::{Circle2d, Curve2d, Segment2d};
pub use projection::{project_point, SurfacePoint};
pub use surface::{Surface, SurfaceClass, SurfaceDomain, SurfaceKind};
