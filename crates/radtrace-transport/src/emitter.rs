//! Package sources.

use std::f64::consts::PI;

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};

use radtrace_math::{spherical_direction, Pose};
use radtrace_optics::{OpticsError, RadiationPackage, Stokes};

use crate::{Result, TransportError};

/// Wavelength of emitted packages, in nanometres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WavelengthDistribution {
    /// A single wavelength.
    Monochromatic {
        /// Wavelength.
        wavelength: f64,
    },
    /// Uniform over `[min, max]`.
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
    /// Weighted spectral lines.
    Discrete {
        /// `(wavelength, relative weight)` pairs.
        lines: Vec<(f64, f64)>,
    },
}

impl Default for WavelengthDistribution {
    fn default() -> Self {
        WavelengthDistribution::Monochromatic { wavelength: 550.0 }
    }
}

/// Direction of emitted packages, relative to the emitter's forward axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DirectionDistribution {
    /// Exactly along the forward axis.
    #[default]
    Collimated,
    /// Uniform over the sphere.
    Isotropic,
    /// Cosine-weighted over the forward hemisphere.
    Lambertian,
    /// Uniform over a cone about the forward axis.
    Cone {
        /// Half opening angle in radians, in (0, π].
        half_angle: f64,
    },
}

impl DirectionDistribution {
    fn sample_cosine<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            DirectionDistribution::Collimated => 1.0,
            DirectionDistribution::Isotropic => 1.0 - 2.0 * rng.gen::<f64>(),
            DirectionDistribution::Lambertian => (1.0 - rng.gen::<f64>()).sqrt(),
            DirectionDistribution::Cone { half_angle } => {
                let cos_max = half_angle.cos();
                1.0 - (1.0 - cos_max) * rng.gen::<f64>()
            }
        }
    }
}

/// A source of radiation packages at a fixed pose.
#[derive(Debug, Clone)]
pub struct Emitter {
    pose: Pose,
    packages: u64,
    wavelengths: WavelengthDistribution,
    directions: DirectionDistribution,
    stokes: Stokes,
    lines: Option<WeightedIndex<f64>>,
}

impl Emitter {
    /// Collimated, unpolarized, unit-weight emitter at 550 nm emitting
    /// `packages` packages along the pose's forward axis.
    pub fn new(pose: Pose, packages: u64) -> Self {
        Self {
            pose,
            packages,
            wavelengths: WavelengthDistribution::default(),
            directions: DirectionDistribution::default(),
            stokes: Stokes::default(),
            lines: None,
        }
    }

    /// Set the wavelength distribution.
    pub fn with_wavelengths(mut self, wavelengths: WavelengthDistribution) -> Result<Self> {
        self.lines = match &wavelengths {
            WavelengthDistribution::Monochromatic { wavelength } => {
                check_wavelength_range(*wavelength, *wavelength)?;
                None
            }
            WavelengthDistribution::Uniform { min, max } => {
                check_wavelength_range(*min, *max)?;
                None
            }
            WavelengthDistribution::Discrete { lines } => {
                for &(wavelength, _) in lines {
                    check_wavelength_range(wavelength, wavelength)?;
                }
                let index = WeightedIndex::new(lines.iter().map(|&(_, weight)| weight))
                    .map_err(|e| TransportError::InvalidEmitter(format!("spectral lines: {e}")))?;
                Some(index)
            }
        };
        self.wavelengths = wavelengths;
        Ok(self)
    }

    /// Set the direction distribution.
    pub fn with_directions(mut self, directions: DirectionDistribution) -> Result<Self> {
        if let DirectionDistribution::Cone { half_angle } = directions {
            if !(half_angle > 0.0 && half_angle <= PI) {
                return Err(TransportError::InvalidEmitter(format!(
                    "cone half angle {half_angle} outside (0, π]"
                )));
            }
        }
        self.directions = directions;
        Ok(self)
    }

    /// Set the initial polarization state and weight.
    pub fn with_stokes(mut self, stokes: Stokes) -> Result<Self> {
        if !(stokes.i > 0.0 && stokes.degree_of_polarization() <= 1.0 + 1e-12) {
            return Err(TransportError::InvalidEmitter(format!(
                "Stokes vector {stokes:?} is not physical"
            )));
        }
        self.stokes = stokes;
        Ok(self)
    }

    /// Emitter placement.
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Total number of packages this emitter issues.
    pub fn packages(&self) -> u64 {
        self.packages
    }

    /// Draw one package.
    pub fn emit<R: Rng + ?Sized>(&self, rng: &mut R) -> RadiationPackage {
        let wavelength = match &self.wavelengths {
            WavelengthDistribution::Monochromatic { wavelength } => *wavelength,
            WavelengthDistribution::Uniform { min, max } => min + (max - min) * rng.gen::<f64>(),
            WavelengthDistribution::Discrete { lines } => match &self.lines {
                Some(index) => lines[index.sample(rng)].0,
                None => lines[0].0,
            },
        };

        let mut pose = self.pose;
        if self.directions != DirectionDistribution::Collimated {
            let cos_theta = self.directions.sample_cosine(rng);
            let phi = 2.0 * PI * rng.gen::<f64>();
            let direction = pose.orientation * spherical_direction(cos_theta, phi);
            pose.reorient(&direction);
        }
        RadiationPackage::new(pose, wavelength, self.stokes)
    }
}

fn check_wavelength_range(min: f64, max: f64) -> Result<()> {
    if !(min > 0.0 && min.is_finite() && max.is_finite() && max >= min) {
        return Err(OpticsError::InvalidWavelengthRange { min, max }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use radtrace_math::{Point3, Vec3};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(3)
    }

    fn downward() -> Pose {
        Pose::looking_along(Point3::new(0.0, 0.0, 2.0), &-Vec3::z())
    }

    #[test]
    fn test_collimated_defaults() {
        let emitter = Emitter::new(downward(), 10);
        let p = emitter.emit(&mut rng());
        assert_eq!(emitter.packages(), 10);
        assert_eq!(p.wavelength, 550.0);
        assert_eq!(p.intensity(), 1.0);
        assert!((p.direction() + Vec3::z()).norm() < 1e-12);
        assert_eq!(p.weighted_path, 0.0);
    }

    #[test]
    fn test_lambertian_stays_in_forward_hemisphere() {
        let emitter = Emitter::new(downward(), 1)
            .with_directions(DirectionDistribution::Lambertian)
            .unwrap();
        let mut rng = rng();
        let n = 20_000;
        let mut mean_cos = 0.0;
        for _ in 0..n {
            let c = -emitter.emit(&mut rng).direction().z;
            assert!(c > 0.0);
            mean_cos += c / n as f64;
        }
        // E[cos] = 2/3 for a cosine-weighted hemisphere
        assert!((mean_cos - 2.0 / 3.0).abs() < 0.01);
    }

    #[test]
    fn test_cone_and_isotropic() {
        let half_angle = 0.2_f64;
        let cone = Emitter::new(downward(), 1)
            .with_directions(DirectionDistribution::Cone { half_angle })
            .unwrap();
        let iso = Emitter::new(downward(), 1)
            .with_directions(DirectionDistribution::Isotropic)
            .unwrap();
        let mut rng = rng();
        let mut upward = 0;
        for _ in 0..2_000 {
            assert!(-cone.emit(&mut rng).direction().z >= half_angle.cos() - 1e-12);
            if iso.emit(&mut rng).direction().z > 0.0 {
                upward += 1;
            }
        }
        assert!(upward > 800 && upward < 1200);
    }

    #[test]
    fn test_wavelengths() {
        let mut rng = rng();
        let uniform = Emitter::new(downward(), 1)
            .with_wavelengths(WavelengthDistribution::Uniform {
                min: 400.0,
                max: 700.0,
            })
            .unwrap();
        for _ in 0..100 {
            let wl = uniform.emit(&mut rng).wavelength;
            assert!((400.0..=700.0).contains(&wl));
        }

        let lines = Emitter::new(downward(), 1)
            .with_wavelengths(WavelengthDistribution::Discrete {
                lines: vec![(450.0, 0.0), (650.0, 1.0)],
            })
            .unwrap();
        assert!((0..50).all(|_| lines.emit(&mut rng).wavelength == 650.0));
    }

    #[test]
    fn test_invalid_configuration() {
        let e = Emitter::new(downward(), 1);
        assert_eq!(
            e.clone()
                .with_wavelengths(WavelengthDistribution::Uniform {
                    min: 700.0,
                    max: 400.0
                })
                .unwrap_err(),
            TransportError::Optics(OpticsError::InvalidWavelengthRange {
                min: 700.0,
                max: 400.0
            })
        );
        assert!(e
            .clone()
            .with_wavelengths(WavelengthDistribution::Discrete { lines: vec![] })
            .is_err());
        assert!(e
            .clone()
            .with_directions(DirectionDistribution::Cone { half_angle: 0.0 })
            .is_err());
        assert!(e.with_stokes(Stokes::new(1.0, 2.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn test_polarized_source() {
        let emitter = Emitter::new(downward(), 1)
            .with_stokes(Stokes::new(2.0, 2.0, 0.0, 0.0))
            .unwrap();
        let p = emitter.emit(&mut rng());
        assert_eq!(p.stokes, Stokes::new(2.0, 2.0, 0.0, 0.0));
    }
}
