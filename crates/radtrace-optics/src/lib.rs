#![warn(missing_docs)]

//! Polarized radiation packages, materials and coatings.
//!
//! This crate holds everything the transport loop needs to know about
//! light and matter, without any geometry:
//!
//! - [`Stokes`] and [`MuellerMatrix`]: polarization state and sparse
//!   linear operators on it
//! - [`RadiationPackage`]: a weighted photon bundle with a pose
//! - [`PhaseFunction`]: isotropic, Henyey-Greenstein and Rayleigh phase
//!   matrices
//! - [`Material`] and [`Coating`]: capability traits queried as pure
//!   functions of pose and wavelength
//! - [`AngleGenerator`] and the Henyey-Greenstein sampler: importance
//!   densities paired with their pdfs
//!
//! # Example
//!
//! ```ignore
//! use radtrace_optics::{Homogeneous, Material, PhaseFunction};
//!
//! let water = Homogeneous::new(0.05, 0.2, PhaseFunction::HenyeyGreenstein { g: 0.9 })?;
//! let d = water.scattering_distance(&pose, 1.0, 550.0);
//! ```

mod coating;
mod error;
mod material;
mod package;
mod phase;
mod sampling;
mod stokes;

pub use coating::{Coating, GreyCoating, Incidence};
pub use error::{OpticsError, Result};
pub use material::{ExponentialProfile, Homogeneous, Material, Vacuum};
pub use package::{RadiationPackage, EMPTY_INTENSITY};
pub use phase::{henyey_greenstein, PhaseFunction};
pub use sampling::{
    henyey_greenstein_cosine, henyey_greenstein_pdf, sample_henyey_greenstein, AngleGenerator,
};
pub use stokes::{MuellerMatrix, Stokes};
