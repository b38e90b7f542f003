use thiserror::Error;

/// Top-level error type for the surfsect intersection kernel.
#[derive(Debug, Error)]
pub enum SurfsectError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Boundary(#[from] BoundaryError),

    #[error(transparent)]
    Intersection(#[from] IntersectionError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to trimming boundaries.
#[derive(Debug, Error)]
pub enum BoundaryError {
    #[error("boundary arc not found")]
    ArcNotFound,

    #[error("boundary has no arcs")]
    Empty,

    #[error("invalid arc: {0}")]
    InvalidArc(String),
}

/// Errors related to surface-surface intersection.
#[derive(Debug, Error)]
pub enum IntersectionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A kind-specific attribute was read on a line of another kind.
    #[error("expected a {expected} line, found a {found} line")]
    WrongLineKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error("vertex index {index} is out of range 1..={count}")]
    VertexIndexOutOfRange { index: usize, count: usize },

    #[error("line index {index} is out of range 1..={count}")]
    LineIndexOutOfRange { index: usize, count: usize },

    #[error("strategy {strategy} cannot handle a {pair} surface pair")]
    StrategyUnavailable {
        strategy: &'static str,
        pair: String,
    },

    #[error("seed point could not be refined onto both surfaces")]
    RefinementFailed,
}

/// Convenience type alias for results using [`SurfsectError`].
pub type Result<T> = std::result::Result<T, SurfsectError>;
