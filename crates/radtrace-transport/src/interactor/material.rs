//! In-medium scattering.

use std::f64::consts::PI;

use rand::Rng;

use radtrace_math::spherical_direction;
use radtrace_optics::{henyey_greenstein_pdf, sample_henyey_greenstein, Material, RadiationPackage};

/// Scatters packages inside a material.
///
/// Outgoing directions are drawn from a Henyey-Greenstein density with the
/// configured sampling asymmetry; the material's own phase matrix enters
/// through the Mueller step, divided by the sampling density.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialInteractor {
    sampling_asymmetry: f64,
}

impl MaterialInteractor {
    /// Interactor sampling with asymmetry `sampling_asymmetry`.
    pub fn new(sampling_asymmetry: f64) -> Self {
        Self { sampling_asymmetry }
    }

    /// Distance along the package's direction to the next scattering event,
    /// given the remaining target optical depth.
    pub fn scattering_distance(
        &self,
        material: &dyn Material,
        package: &RadiationPackage,
        optical_depth: f64,
    ) -> f64 {
        material.scattering_distance(&package.pose, optical_depth, package.wavelength)
    }

    /// Perform a scattering event at the package's position.
    pub fn scatter<R: Rng + ?Sized>(
        &self,
        material: &dyn Material,
        package: &mut RadiationPackage,
        rng: &mut R,
    ) {
        let cos_theta = sample_henyey_greenstein(self.sampling_asymmetry, rng);
        let phi = 2.0 * PI * rng.gen::<f64>();
        let outgoing = package.pose.orientation * spherical_direction(cos_theta, phi);

        package.scale_intensity(1.0 / henyey_greenstein_pdf(self.sampling_asymmetry, cos_theta));
        let mueller = material.mueller_matrix(cos_theta, package.wavelength);
        package.reshape_polarization(&mueller, phi);
        package.reorient(&outgoing);

        log::trace!(
            "scattered at {:?}: cos {:.4}, weight {:.4e}",
            package.pose.position,
            cos_theta,
            package.intensity()
        );
    }
}
