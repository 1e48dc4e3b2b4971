//! Optical materials.
//!
//! A [`Material`] answers every query as a pure function of the package
//! pose (or position) and wavelength. Distances are measured along the
//! pose's forward axis.

use std::fmt::Debug;

use radtrace_math::{Point3, Pose, GRAZING_COSINE};

use crate::error::check_coefficient;
use crate::{MuellerMatrix, OpticsError, PhaseFunction, Result};

/// Absorbing and scattering medium.
pub trait Material: Send + Sync + Debug {
    /// Absorption coefficient (per unit length) at `position`.
    fn absorption_coefficient(&self, position: &Point3, wavelength: f64) -> f64;

    /// Scattering coefficient (per unit length) at `position`.
    fn scattering_coefficient(&self, position: &Point3, wavelength: f64) -> f64;

    /// Phase matrix for scattering angle `acos(cos_theta)`, normalized per
    /// steradian.
    fn mueller_matrix(&self, cos_theta: f64, wavelength: f64) -> MuellerMatrix;

    /// Absorption optical depth from `pose` over `distance`.
    fn absorption_optical_depth(&self, pose: &Pose, distance: f64, wavelength: f64) -> f64;

    /// Scattering optical depth from `pose` over `distance`.
    fn scattering_optical_depth(&self, pose: &Pose, distance: f64, wavelength: f64) -> f64;

    /// Distance from `pose` at which the scattering optical depth reaches
    /// `optical_depth`; infinite when it never does.
    fn scattering_distance(&self, pose: &Pose, optical_depth: f64, wavelength: f64) -> f64;
}

// =============================================================================
// Vacuum
// =============================================================================

/// Empty space: never absorbs, never scatters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vacuum;

impl Material for Vacuum {
    fn absorption_coefficient(&self, _: &Point3, _: f64) -> f64 {
        0.0
    }

    fn scattering_coefficient(&self, _: &Point3, _: f64) -> f64 {
        0.0
    }

    fn mueller_matrix(&self, _: f64, _: f64) -> MuellerMatrix {
        MuellerMatrix::zero()
    }

    fn absorption_optical_depth(&self, _: &Pose, _: f64, _: f64) -> f64 {
        0.0
    }

    fn scattering_optical_depth(&self, _: &Pose, _: f64, _: f64) -> f64 {
        0.0
    }

    fn scattering_distance(&self, _: &Pose, _: f64, _: f64) -> f64 {
        f64::INFINITY
    }
}

// =============================================================================
// Homogeneous
// =============================================================================

/// Constant coefficients and a single phase function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homogeneous {
    absorption: f64,
    scattering: f64,
    phase: PhaseFunction,
}

impl Homogeneous {
    /// Medium with the given coefficients (per unit length).
    pub fn new(absorption: f64, scattering: f64, phase: PhaseFunction) -> Result<Self> {
        phase.validate()?;
        Ok(Self {
            absorption: check_coefficient("absorption", absorption)?,
            scattering: check_coefficient("scattering", scattering)?,
            phase,
        })
    }

    /// Purely absorbing medium.
    pub fn absorbing(absorption: f64) -> Result<Self> {
        Self::new(absorption, 0.0, PhaseFunction::Isotropic)
    }

    /// Single-scattering albedo; zero for a medium that does nothing.
    pub fn albedo(&self) -> f64 {
        let extinction = self.absorption + self.scattering;
        if extinction > 0.0 {
            self.scattering / extinction
        } else {
            0.0
        }
    }

    /// The phase function.
    pub fn phase(&self) -> PhaseFunction {
        self.phase
    }
}

impl Material for Homogeneous {
    fn absorption_coefficient(&self, _: &Point3, _: f64) -> f64 {
        self.absorption
    }

    fn scattering_coefficient(&self, _: &Point3, _: f64) -> f64 {
        self.scattering
    }

    fn mueller_matrix(&self, cos_theta: f64, _: f64) -> MuellerMatrix {
        self.phase.mueller_matrix(cos_theta)
    }

    fn absorption_optical_depth(&self, _: &Pose, distance: f64, _: f64) -> f64 {
        constant_depth(self.absorption, distance)
    }

    fn scattering_optical_depth(&self, _: &Pose, distance: f64, _: f64) -> f64 {
        constant_depth(self.scattering, distance)
    }

    fn scattering_distance(&self, _: &Pose, optical_depth: f64, _: f64) -> f64 {
        constant_distance(self.scattering, optical_depth)
    }
}

// =============================================================================
// Exponential profile
// =============================================================================

/// Coefficients decaying exponentially with height:
/// `k(z) = k_ref * exp(-(z - z_ref) / H)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialProfile {
    absorption: f64,
    scattering: f64,
    reference_height: f64,
    scale_height: f64,
    phase: PhaseFunction,
}

impl ExponentialProfile {
    /// Profile with coefficients `absorption` and `scattering` at
    /// `reference_height`, decaying over `scale_height`.
    pub fn new(
        absorption: f64,
        scattering: f64,
        reference_height: f64,
        scale_height: f64,
        phase: PhaseFunction,
    ) -> Result<Self> {
        phase.validate()?;
        if !(scale_height.is_finite() && scale_height > 0.0) {
            return Err(OpticsError::InvalidScaleHeight(scale_height));
        }
        Ok(Self {
            absorption: check_coefficient("absorption", absorption)?,
            scattering: check_coefficient("scattering", scattering)?,
            reference_height,
            scale_height,
            phase,
        })
    }

    /// Scale height.
    pub fn scale_height(&self) -> f64 {
        self.scale_height
    }

    fn density(&self, z: f64) -> f64 {
        (-(z - self.reference_height) / self.scale_height).exp()
    }

    /// Optical depth of a coefficient whose local value at the pose is `k`.
    fn depth(&self, k: f64, pose: &Pose, distance: f64) -> f64 {
        let mu = pose.z_axis().z;
        if mu.abs() < GRAZING_COSINE {
            return constant_depth(k, distance);
        }
        if k == 0.0 || distance <= 0.0 {
            return 0.0;
        }
        let h = self.scale_height / mu;
        k * h * (-(-distance / h).exp_m1())
    }

    fn distance(&self, k: f64, pose: &Pose, optical_depth: f64) -> f64 {
        let mu = pose.z_axis().z;
        if mu.abs() < GRAZING_COSINE {
            return constant_distance(k, optical_depth);
        }
        if k == 0.0 {
            return f64::INFINITY;
        }
        let h = self.scale_height / mu;
        // optical_depth = k h (1 - exp(-d / h))
        let fraction = optical_depth / (k * h);
        if fraction >= 1.0 {
            return f64::INFINITY;
        }
        -h * (-fraction).ln_1p()
    }
}

impl Material for ExponentialProfile {
    fn absorption_coefficient(&self, position: &Point3, _: f64) -> f64 {
        self.absorption * self.density(position.z)
    }

    fn scattering_coefficient(&self, position: &Point3, _: f64) -> f64 {
        self.scattering * self.density(position.z)
    }

    fn mueller_matrix(&self, cos_theta: f64, _: f64) -> MuellerMatrix {
        self.phase.mueller_matrix(cos_theta)
    }

    fn absorption_optical_depth(&self, pose: &Pose, distance: f64, wavelength: f64) -> f64 {
        let k = self.absorption_coefficient(&pose.position, wavelength);
        self.depth(k, pose, distance)
    }

    fn scattering_optical_depth(&self, pose: &Pose, distance: f64, wavelength: f64) -> f64 {
        let k = self.scattering_coefficient(&pose.position, wavelength);
        self.depth(k, pose, distance)
    }

    fn scattering_distance(&self, pose: &Pose, optical_depth: f64, wavelength: f64) -> f64 {
        let k = self.scattering_coefficient(&pose.position, wavelength);
        self.distance(k, pose, optical_depth)
    }
}

fn constant_depth(k: f64, distance: f64) -> f64 {
    if k == 0.0 {
        0.0
    } else {
        k * distance
    }
}

fn constant_distance(k: f64, optical_depth: f64) -> f64 {
    if k == 0.0 {
        f64::INFINITY
    } else {
        optical_depth / k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use radtrace_math::Vec3;

    fn pose(z: f64, direction: Vec3) -> Pose {
        Pose::looking_along(Point3::new(0.0, 0.0, z), &direction)
    }

    fn atmosphere() -> ExponentialProfile {
        ExponentialProfile::new(0.01, 0.1, 0.0, 8.0, PhaseFunction::Rayleigh).unwrap()
    }

    #[test]
    fn test_vacuum_never_scatters() {
        let p = pose(0.0, Vec3::z());
        assert_eq!(Vacuum.scattering_distance(&p, 3.0, 500.0), f64::INFINITY);
        assert_eq!(Vacuum.absorption_optical_depth(&p, f64::INFINITY, 500.0), 0.0);
        assert_eq!(Vacuum.mueller_matrix(0.5, 500.0).nonzero_count(), 0);
    }

    #[test]
    fn test_homogeneous_depths() {
        let m = Homogeneous::new(0.5, 2.0, PhaseFunction::Isotropic).unwrap();
        let p = pose(0.0, Vec3::x());
        assert_eq!(m.absorption_optical_depth(&p, 3.0, 500.0), 1.5);
        assert_eq!(m.scattering_optical_depth(&p, 3.0, 500.0), 6.0);
        assert_eq!(m.scattering_distance(&p, 1.0, 500.0), 0.5);
        assert!((m.albedo() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_zero_coefficient_is_infinite_distance() {
        let m = Homogeneous::absorbing(1.0).unwrap();
        let p = pose(0.0, Vec3::z());
        assert_eq!(m.scattering_distance(&p, 0.7, 500.0), f64::INFINITY);
        assert_eq!(m.scattering_optical_depth(&p, f64::INFINITY, 500.0), 0.0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(matches!(
            Homogeneous::new(-1.0, 0.0, PhaseFunction::Isotropic),
            Err(OpticsError::NegativeCoefficient { name: "absorption", .. })
        ));
        assert!(Homogeneous::new(0.0, f64::INFINITY, PhaseFunction::Isotropic).is_err());
        assert!(Homogeneous::new(0.0, 1.0, PhaseFunction::HenyeyGreenstein { g: -1.5 }).is_err());
        assert_eq!(
            ExponentialProfile::new(0.0, 1.0, 0.0, 0.0, PhaseFunction::Isotropic),
            Err(OpticsError::InvalidScaleHeight(0.0))
        );
    }

    #[test]
    fn test_profile_coefficient_decays() {
        let m = atmosphere();
        let sea = m.scattering_coefficient(&Point3::origin(), 500.0);
        let high = m.scattering_coefficient(&Point3::new(0.0, 0.0, 8.0), 500.0);
        assert!((sea - 0.1).abs() < 1e-15);
        assert!((high - 0.1 / std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn test_profile_depth_matches_quadrature() {
        let m = atmosphere();
        let p = pose(2.0, Vec3::new(0.3, 0.0, -0.5));
        let distance = 4.0;
        let n = 100_000;
        let ds = distance / n as f64;
        let numeric: f64 = (0..n)
            .map(|k| {
                let s = (k as f64 + 0.5) * ds;
                let point = p.position + p.z_axis().into_inner() * s;
                m.scattering_coefficient(&point, 500.0) * ds
            })
            .sum();
        assert_relative_eq!(m.scattering_optical_depth(&p, distance, 500.0), numeric, max_relative = 1e-8);
    }

    #[test]
    fn test_profile_inversion() {
        let m = atmosphere();
        for direction in [Vec3::z(), -Vec3::z(), Vec3::x(), Vec3::new(1.0, 1.0, 0.2)] {
            let p = pose(1.0, direction);
            for d in [0.01, 1.0, 7.5, 30.0] {
                let tau = m.scattering_optical_depth(&p, d, 500.0);
                let back = m.scattering_distance(&p, tau, 500.0);
                assert_relative_eq!(back, d, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_profile_upward_depth_is_bounded() {
        let m = atmosphere();
        let p = pose(0.0, Vec3::z());
        // Total depth to infinity upward is k H
        let column = m.scattering_optical_depth(&p, f64::INFINITY, 500.0);
        assert!((column - 0.8).abs() < 1e-12);
        assert_eq!(m.scattering_distance(&p, 0.9, 500.0), f64::INFINITY);
        assert!(m.scattering_distance(&pose(0.0, -Vec3::z()), 0.9, 500.0).is_finite());
    }
}
