//! Importance-sampling densities for scattering and wall events.
//!
//! Each sampler returns a cosine together with a matching density per
//! steradian, so callers can apply the likelihood ratio
//! `true_density / sampling_density`.

use std::f64::consts::PI;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::phase::henyey_greenstein;

/// Below this |g| the Henyey-Greenstein inversion degenerates to uniform.
const ISOTROPIC_ASYMMETRY: f64 = 1e-6;

/// Cosine of the scattering angle drawn from a Henyey-Greenstein density.
pub fn sample_henyey_greenstein<R: Rng + ?Sized>(g: f64, rng: &mut R) -> f64 {
    let xi: f64 = rng.gen();
    henyey_greenstein_cosine(g, xi)
}

/// Inverse cumulative distribution of the Henyey-Greenstein cosine.
pub fn henyey_greenstein_cosine(g: f64, xi: f64) -> f64 {
    if g.abs() < ISOTROPIC_ASYMMETRY {
        return (1.0 - 2.0 * xi).clamp(-1.0, 1.0);
    }
    let s = (1.0 - g * g) / (1.0 - g + 2.0 * g * xi);
    ((1.0 + g * g - s * s) / (2.0 * g)).clamp(-1.0, 1.0)
}

/// Henyey-Greenstein sampling density per steradian.
pub fn henyey_greenstein_pdf(g: f64, cos_theta: f64) -> f64 {
    henyey_greenstein(g, cos_theta)
}

/// Distribution of outgoing directions about a surface normal used for
/// wall events, independent of the coating's true angular shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleGenerator {
    /// Cosine-weighted hemisphere.
    #[default]
    Lambertian,
    /// Uniform over the hemisphere.
    UniformHemisphere,
}

impl AngleGenerator {
    /// Cosine to the normal, in (0, 1].
    pub fn sample_cosine<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        // gen() is in [0, 1), so 1 - xi never reaches zero
        let xi: f64 = rng.gen();
        match self {
            AngleGenerator::Lambertian => (1.0 - xi).sqrt(),
            AngleGenerator::UniformHemisphere => 1.0 - xi,
        }
    }

    /// Density per steradian of a direction at `cos_theta` to the normal.
    pub fn pdf(&self, cos_theta: f64) -> f64 {
        if cos_theta <= 0.0 {
            return 0.0;
        }
        match self {
            AngleGenerator::Lambertian => cos_theta / PI,
            AngleGenerator::UniformHemisphere => 1.0 / (2.0 * PI),
        }
    }
}
