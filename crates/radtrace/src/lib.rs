#![warn(missing_docs)]

//! radtrace: polarized Monte Carlo radiative transfer.
//!
//! Weighted photon bundles carrying a Stokes vector are traced through a
//! tree of nested volumes, each filled with an absorbing and scattering
//! material and optionally bounded by a reflective coating. Receivers on
//! volume boundaries collect the arriving flux.
//!
//! The workspace is split by concern and every part is re-exported here:
//!
//! - [`radtrace_math`]: poses and rotations
//! - [`radtrace_geom`]: surfaces and boundaries
//! - [`radtrace_scene`]: the volume tree and its navigator
//! - [`radtrace_optics`]: packages, polarization, materials, coatings
//! - [`radtrace_transport`]: emitters, receivers and the transport loop
//!
//! [`PlaneParallel`] builds the common atmosphere/ocean case of horizontal
//! layers between a sky and a ground.
//!
//! # Example
//!
//! ```ignore
//! use radtrace::{Emitter, Facing, Homogeneous, Medium, PhaseFunction, PlaneParallel, Simulation};
//!
//! let scene = PlaneParallel::new(0.0)
//!     .layer("cloud", 1.0, Medium::new(Homogeneous::new(0.0, 1.0, PhaseFunction::Isotropic)?))
//!     .build()?;
//! let mut sim = Simulation::new(&scene, Emitter::new(pose, 100_000), Default::default())?;
//! sim.run_parallel()?;
//! println!("R = {}", sim.receiver("sky", Facing::Inward)?.flux / 100_000.0);
//! ```

pub use radtrace_geom;
pub use radtrace_math;
pub use radtrace_optics;
pub use radtrace_scene;
pub use radtrace_transport;

pub use radtrace_geom::{Boundary, Crossing, GeomError};
pub use radtrace_math::{Point3, Pose, Rotation, Vec3};
pub use radtrace_optics::{
    AngleGenerator, Coating, ExponentialProfile, GreyCoating, Homogeneous, Material,
    MuellerMatrix, OpticsError, PhaseFunction, RadiationPackage, Stokes, Vacuum,
};
pub use radtrace_scene::{Navigator, Scene, SceneError, VolumeId};
pub use radtrace_transport::{
    DirectionDistribution, Emitter, Facing, Fate, Medium, ReceiverStats, RunSummary, Simulation,
    Tally, TransportError, TransportSettings, WavelengthDistribution,
};

mod plane_parallel;

pub use plane_parallel::{PlaneParallel, GROUND, SKY};

use thiserror::Error;

/// Errors from any layer of the workspace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Boundary construction failed.
    #[error(transparent)]
    Geom(#[from] GeomError),
    /// Scene construction or navigation failed.
    #[error(transparent)]
    Scene(#[from] SceneError),
    /// An optical model was misconfigured.
    #[error(transparent)]
    Optics(#[from] OpticsError),
    /// A run failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Result type for facade operations.
pub type Result<T> = std::result::Result<T, Error>;
