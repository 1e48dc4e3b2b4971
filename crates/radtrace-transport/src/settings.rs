//! Run settings.

use radtrace_optics::AngleGenerator;
use serde::{Deserialize, Serialize};

use crate::{Result, TransportError};

/// Parameters of a transport run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Base seed; package `i` draws from a stream derived from `(seed, i)`.
    pub seed: u64,
    /// Henyey-Greenstein asymmetry used to sample scattering directions.
    pub sampling_asymmetry: f64,
    /// Density used to sample outgoing directions at coated walls.
    pub angle_generator: AngleGenerator,
    /// Interactions after which a package is abandoned.
    pub max_events: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            sampling_asymmetry: 0.0,
            angle_generator: AngleGenerator::Lambertian,
            max_events: 1_000_000,
        }
    }
}

impl TransportSettings {
    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if !(self.sampling_asymmetry.abs() < 1.0) {
            return Err(TransportError::InvalidSettings(
                "sampling_asymmetry must lie in (-1, 1)".into(),
            ));
        }
        if self.max_events == 0 {
            return Err(TransportError::InvalidSettings(
                "max_events must be positive".into(),
            ));
        }
        Ok(())
    }
}
