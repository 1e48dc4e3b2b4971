#![warn(missing_docs)]

//! Monte Carlo transport of polarized radiation packages.
//!
//! A [`Simulation`] draws packages from an [`Emitter`] and follows each
//! one through a [`Scene`](radtrace_scene::Scene) of [`Medium`] volumes:
//!
//! 1. draw a target scattering optical depth τ ~ Exp(1)
//! 2. compare the distance to the next scattering event with the distance
//!    to the next wall
//! 3. deposit absorption over the shorter of the two
//! 4. scatter (and redraw τ) or resolve the wall event (and spend the
//!    optical depth already travelled)
//!
//! until the package escapes, is absorbed, or exceeds the event limit.
//! Receivers on volume boundaries accumulate flux into a [`Tally`].
//!
//! Packages are independent: package `i` always uses the random stream
//! derived from `(seed, i)`, so a run may be split across threads with
//! [`Simulation::run_parallel`] without changing its result.
//!
//! # Example
//!
//! ```ignore
//! use radtrace_transport::{Emitter, Facing, Simulation, TransportSettings};
//!
//! let mut sim = Simulation::new(&scene, Emitter::new(pose, 10_000), TransportSettings::default())?;
//! sim.run_parallel()?;
//! let reflected = sim.receiver("sky", Facing::Inward)?;
//! println!("R = {}", reflected.flux / 10_000.0);
//! ```

mod emitter;
mod error;
pub mod interactor;
mod medium;
mod receiver;
mod settings;
mod simulation;

pub use emitter::{DirectionDistribution, Emitter, WavelengthDistribution};
pub use error::{Result, TransportError};
pub use medium::{Facing, Medium};
pub use receiver::{ReceiverStats, Tally};
pub use settings::TransportSettings;
pub use simulation::{Fate, RunSummary, Simulation};
