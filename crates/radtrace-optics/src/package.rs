//! Radiation packages.

use radtrace_math::{Pose, Vec3};

use crate::{MuellerMatrix, Stokes};

/// Intensity below which a package is considered spent.
pub const EMPTY_INTENSITY: f64 = 1e-12;

/// A weighted photon bundle.
///
/// The package travels along the forward (z) axis of its pose; the pose's
/// x axis is the reference direction of its Stokes vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationPackage {
    /// Position and orientation.
    pub pose: Pose,
    /// Wavelength in nanometres.
    pub wavelength: f64,
    /// Polarization state; I is the statistical weight.
    pub stokes: Stokes,
    /// Accumulated intensity-weighted path length.
    pub weighted_path: f64,
}

impl RadiationPackage {
    /// Package with the given polarization state.
    pub fn new(pose: Pose, wavelength: f64, stokes: Stokes) -> Self {
        Self {
            pose,
            wavelength,
            stokes,
            weighted_path: 0.0,
        }
    }

    /// Unpolarized package of the given intensity.
    pub fn unpolarized(pose: Pose, wavelength: f64, intensity: f64) -> Self {
        Self::new(pose, wavelength, Stokes::unpolarized(intensity))
    }

    /// Statistical weight.
    pub fn intensity(&self) -> f64 {
        self.stokes.i
    }

    /// Unit travel direction.
    pub fn direction(&self) -> Vec3 {
        self.pose.z_axis().into_inner()
    }

    /// Whether the weight has dropped below [`EMPTY_INTENSITY`].
    pub fn is_empty(&self) -> bool {
        self.stokes.i < EMPTY_INTENSITY
    }

    /// Move along the travel direction, accumulating `I * distance`.
    pub fn move_by(&mut self, distance: f64) {
        self.weighted_path += self.stokes.i * distance;
        self.pose.advance(distance);
    }

    /// Multiply the whole Stokes vector by `factor`.
    ///
    /// Factors above one are legitimate: they are likelihood ratios that
    /// undo an importance-sampling bias.
    pub fn scale_intensity(&mut self, factor: f64) {
        self.stokes = self.stokes.scaled(factor);
    }

    /// Turn the travel direction to `direction`, keeping the reference
    /// axis in the plane spanned by the old and new directions.
    pub fn reorient(&mut self, direction: &Vec3) {
        self.pose.reorient(direction);
    }

    /// Rotate the reference axis by `angle` about the travel direction
    /// (rotating the Stokes vector to match), then apply `mueller`.
    pub fn reshape_polarization(&mut self, mueller: &MuellerMatrix, angle: f64) {
        self.pose.rotate_local_z(angle);
        self.stokes = mueller.apply(&self.stokes.rotated(angle));
    }

    /// Angle about the travel direction from the reference axis to the
    /// plane containing the travel direction and `outgoing`.
    ///
    /// Zero for exact forward or backward scattering, where the plane is
    /// undefined.
    pub fn interaction_plane_angle(&self, outgoing: &Vec3) -> f64 {
        let local = self.pose.local_direction(outgoing);
        if local.x == 0.0 && local.y == 0.0 {
            return 0.0;
        }
        local.y.atan2(local.x)
    }

    /// Cosine of the angle between the travel direction and `outgoing`.
    pub fn cos_angle_to(&self, outgoing: &Vec3) -> f64 {
        self.direction().dot(&outgoing.normalize()).clamp(-1.0, 1.0)
    }
}
