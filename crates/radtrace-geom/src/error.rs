//! Error types for boundary construction.

use thiserror::Error;

/// Errors raised while building surfaces and boundaries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeomError {
    /// Sphere radius is not positive and finite.
    #[error("invalid sphere radius: {0}")]
    InvalidRadius(f64),

    /// Shell radii are not ordered 0 < inner < outer.
    #[error("invalid shell: inner radius {inner} must be below outer radius {outer}")]
    InvalidShell {
        /// Outer radius.
        outer: f64,
        /// Inner radius.
        inner: f64,
    },

    /// Slab top is not above its bottom.
    #[error("degenerate slab: top {top} is not above bottom {bottom}")]
    DegenerateSlab {
        /// Bottom height.
        bottom: f64,
        /// Top height.
        top: f64,
    },

    /// A layer stack needs at least two heights.
    #[error("layer stack needs at least two heights, got {0}")]
    TooFewLayers(usize),

    /// Layer heights must be strictly increasing.
    #[error("layer heights are not strictly increasing at index {0}")]
    UnsortedLayers(usize),

    /// Characteristic length scale is not positive and finite.
    #[error("invalid length scale: {0}")]
    InvalidLengthScale(f64),
}

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, GeomError>;
