//! Surface coatings.

use std::f64::consts::PI;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::{MuellerMatrix, OpticsError, Result};

/// Geometry of light arriving at a coated surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Incidence {
    /// Cosine between the incoming direction and the surface normal on the
    /// side the light arrives from, in [0, 1].
    pub cos_incidence: f64,
    /// Wavelength in nanometres.
    pub wavelength: f64,
}

/// Reflective and transmissive surface treatment.
///
/// Reflectivity plus transmissivity never exceeds one; the remainder is
/// absorbed. Mueller matrices are angular densities per steradian of the
/// outgoing direction, normalized so their (1,1) element integrates to one
/// over the outgoing hemisphere.
pub trait Coating: Send + Sync + Debug {
    /// Fraction of incident power reflected.
    fn reflectivity(&self, incidence: &Incidence) -> f64;

    /// Fraction of incident power transmitted.
    fn transmissivity(&self, incidence: &Incidence) -> f64;

    /// Reflection matrix for an outgoing direction at `cos_outgoing` to the
    /// normal.
    fn reflection_mueller_matrix(&self, incidence: &Incidence, cos_outgoing: f64) -> MuellerMatrix;

    /// Transmission matrix for an outgoing direction at `cos_outgoing` to
    /// the normal.
    fn transmission_mueller_matrix(
        &self,
        incidence: &Incidence,
        cos_outgoing: f64,
    ) -> MuellerMatrix;
}

/// Wavelength-independent Lambertian coating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreyCoating {
    reflectivity: f64,
    transmissivity: f64,
}

impl GreyCoating {
    /// Coating with the given fractions.
    pub fn new(reflectivity: f64, transmissivity: f64) -> Result<Self> {
        let valid = reflectivity >= 0.0
            && transmissivity >= 0.0
            && reflectivity + transmissivity <= 1.0;
        if !valid {
            return Err(OpticsError::InvalidCoating {
                reflectivity,
                transmissivity,
            });
        }
        Ok(Self {
            reflectivity,
            transmissivity,
        })
    }

    /// Absorbs everything.
    pub fn black() -> Self {
        Self {
            reflectivity: 0.0,
            transmissivity: 0.0,
        }
    }

    /// Diffuse reflector that absorbs nothing.
    pub fn white() -> Self {
        Self {
            reflectivity: 1.0,
            transmissivity: 0.0,
        }
    }

    /// Fraction absorbed.
    pub fn absorptivity(&self) -> f64 {
        1.0 - self.reflectivity - self.transmissivity
    }
}

/// Depolarizing Lambertian density `cos / π`.
fn lambertian(cos_outgoing: f64) -> MuellerMatrix {
    MuellerMatrix::diagonal([cos_outgoing.max(0.0) / PI, 0.0, 0.0, 0.0])
}

impl Coating for GreyCoating {
    fn reflectivity(&self, _: &Incidence) -> f64 {
        self.reflectivity
    }

    fn transmissivity(&self, _: &Incidence) -> f64 {
        self.transmissivity
    }

    fn reflection_mueller_matrix(&self, _: &Incidence, cos_outgoing: f64) -> MuellerMatrix {
        lambertian(cos_outgoing)
    }

    fn transmission_mueller_matrix(&self, _: &Incidence, cos_outgoing: f64) -> MuellerMatrix {
        lambertian(cos_outgoing)
    }
}
