//! Error types for optical models.

use thiserror::Error;

/// Errors raised when constructing materials, coatings and phase functions.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OpticsError {
    /// Reflectivity and transmissivity must be non-negative and sum to at most one.
    #[error("invalid coating: reflectivity {reflectivity} and transmissivity {transmissivity}")]
    InvalidCoating {
        /// Requested reflectivity.
        reflectivity: f64,
        /// Requested transmissivity.
        transmissivity: f64,
    },

    /// Henyey-Greenstein asymmetry must lie strictly between -1 and 1.
    #[error("asymmetry factor {0} outside (-1, 1)")]
    InvalidAsymmetry(f64),

    /// Absorption and scattering coefficients must be finite and non-negative.
    #[error("{name} coefficient must be finite and non-negative, got {value}")]
    NegativeCoefficient {
        /// Which coefficient.
        name: &'static str,
        /// Offending value.
        value: f64,
    },

    /// Wavelength bounds must be positive and ordered.
    #[error("invalid wavelength range [{min}, {max}]")]
    InvalidWavelengthRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Exponential profiles need a positive, finite scale height.
    #[error("scale height must be positive, got {0}")]
    InvalidScaleHeight(f64),
}

/// Result type for optics operations.
pub type Result<T> = std::result::Result<T, OpticsError>;

pub(crate) fn check_coefficient(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(OpticsError::NegativeCoefficient { name, value })
    }
}
