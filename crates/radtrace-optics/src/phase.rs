//! Single-scattering phase functions.

use std::f64::consts::PI;

use radtrace_math::Mat4;
use serde::{Deserialize, Serialize};

use crate::{MuellerMatrix, OpticsError, Result};

/// Angular distribution of scattered light.
///
/// Phase matrices are normalized per steradian: the (1,1) element
/// integrates to one over the sphere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PhaseFunction {
    /// Equal scattering in every direction; fully depolarizing.
    #[default]
    Isotropic,
    /// Henyey-Greenstein with asymmetry `g`; polarization state is carried
    /// through unchanged.
    HenyeyGreenstein {
        /// Mean cosine of the scattering angle, in (-1, 1).
        g: f64,
    },
    /// Polarized Rayleigh scattering by particles much smaller than the
    /// wavelength.
    Rayleigh,
}

impl PhaseFunction {
    /// Check parameter ranges.
    pub fn validate(&self) -> Result<()> {
        match *self {
            PhaseFunction::HenyeyGreenstein { g } if !(g.abs() < 1.0) => {
                Err(OpticsError::InvalidAsymmetry(g))
            }
            _ => Ok(()),
        }
    }

    /// Mean cosine of the scattering angle.
    pub fn asymmetry(&self) -> f64 {
        match *self {
            PhaseFunction::HenyeyGreenstein { g } => g,
            PhaseFunction::Isotropic | PhaseFunction::Rayleigh => 0.0,
        }
    }

    /// Phase function value (per steradian) for unpolarized light.
    pub fn value(&self, cos_theta: f64) -> f64 {
        match *self {
            PhaseFunction::Isotropic => 1.0 / (4.0 * PI),
            PhaseFunction::HenyeyGreenstein { g } => henyey_greenstein(g, cos_theta),
            PhaseFunction::Rayleigh => 3.0 / (16.0 * PI) * (1.0 + cos_theta * cos_theta),
        }
    }

    /// Phase matrix for scattering angle `acos(cos_theta)`, in the frame
    /// whose reference axis lies in the scattering plane.
    pub fn mueller_matrix(&self, cos_theta: f64) -> MuellerMatrix {
        match *self {
            PhaseFunction::Isotropic => MuellerMatrix::diagonal([1.0 / (4.0 * PI), 0.0, 0.0, 0.0]),
            PhaseFunction::HenyeyGreenstein { g } => {
                MuellerMatrix::identity().scaled(henyey_greenstein(g, cos_theta))
            }
            PhaseFunction::Rayleigh => {
                let c = cos_theta;
                let c2 = c * c;
                let dense = Mat4::new(
                    1.0 + c2, c2 - 1.0, 0.0, 0.0, //
                    c2 - 1.0, 1.0 + c2, 0.0, 0.0, //
                    0.0, 0.0, 2.0 * c, 0.0, //
                    0.0, 0.0, 0.0, 2.0 * c,
                );
                MuellerMatrix::from_dense(&(dense * (3.0 / (16.0 * PI))))
            }
        }
    }
}

/// Henyey-Greenstein density per steradian.
pub fn henyey_greenstein(g: f64, cos_theta: f64) -> f64 {
    let denom = 1.0 + g * g - 2.0 * g * cos_theta;
    (1.0 - g * g) / (4.0 * PI * denom * denom.sqrt())
}
