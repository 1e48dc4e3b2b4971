//! Boundary events.

use std::f64::consts::PI;

use rand::Rng;

use radtrace_geom::Crossing;
use radtrace_math::{orthonormal_frame, Vec3};
use radtrace_optics::{AngleGenerator, Coating, Incidence, RadiationPackage};

/// Result of a boundary event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallOutcome {
    /// Sent back to the side it came from.
    Reflected,
    /// Passed to the far side (always the case for uncoated boundaries).
    Transmitted,
    /// Absorbed by the coating; the package is empty.
    Absorbed,
}

/// Resolves reflection, transmission and absorption at coated boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallInteractor {
    generator: AngleGenerator,
}

impl WallInteractor {
    /// Interactor drawing outgoing directions from `generator`.
    pub fn new(generator: AngleGenerator) -> Self {
        Self { generator }
    }

    /// Handle a package sitting at `crossing`.
    ///
    /// On reflection or transmission the package leaves along a freshly
    /// sampled direction and is stepped `epsilon` off the surface.
    pub fn interact<R: Rng + ?Sized>(
        &self,
        coating: Option<&dyn Coating>,
        crossing: &Crossing,
        epsilon: f64,
        package: &mut RadiationPackage,
        rng: &mut R,
    ) -> WallOutcome {
        let Some(coating) = coating else {
            package.move_by(epsilon);
            return WallOutcome::Transmitted;
        };

        let normal = crossing.pose.z_axis().into_inner();
        let cos_normal = package.direction().dot(&normal);
        // Hemisphere the package is travelling into
        let forward = if cos_normal < 0.0 { -normal } else { normal };
        let incidence = Incidence {
            cos_incidence: cos_normal.abs(),
            wavelength: package.wavelength,
        };

        let r: f64 = rng.gen();
        let (outcome, hemisphere) = if r < coating.reflectivity(&incidence) {
            (WallOutcome::Reflected, -forward)
        } else if 1.0 - r < coating.transmissivity(&incidence) {
            (WallOutcome::Transmitted, forward)
        } else {
            package.scale_intensity(0.0);
            return WallOutcome::Absorbed;
        };

        let cos_out = self.generator.sample_cosine(rng);
        let phi = 2.0 * PI * rng.gen::<f64>();
        let outgoing = hemisphere_direction(&hemisphere, cos_out, phi);

        let mueller = match outcome {
            WallOutcome::Reflected => coating.reflection_mueller_matrix(&incidence, cos_out),
            _ => coating.transmission_mueller_matrix(&incidence, cos_out),
        };
        package.scale_intensity(1.0 / self.generator.pdf(cos_out));
        let angle = package.interaction_plane_angle(&outgoing);
        package.reshape_polarization(&mueller, angle);
        package.reorient(&outgoing);
        package.move_by(epsilon);

        log::trace!(
            "{outcome:?} at {:?}, weight {:.4e}",
            crossing.position(),
            package.intensity()
        );
        outcome
    }
}

/// Direction at `cos_theta` to `normal` and azimuth `phi` about it.
fn hemisphere_direction(normal: &Vec3, cos_theta: f64, phi: f64) -> Vec3 {
    let (u, v) = orthonormal_frame(normal);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (s, c) = phi.sin_cos();
    (u * c + v * s) * sin_theta + normal * cos_theta
}
