#![warn(missing_docs)]

//! Volume tree and navigator for the radtrace transport kernel.
//!
//! A [`Scene`] is an arena of [`Volume`] nodes addressed by stable
//! [`VolumeId`] keys. Parent and child links are stored as keys, so cloning
//! a scene (or any part of it) never invalidates them.
//!
//! A [`Navigator`] is a cursor over a borrowed scene. It answers lookahead
//! queries for a pose (next intersection, next volume) and moves between
//! volumes only through `go_inward`, `go_outward` and `go_to`.
//!
//! # Example
//!
//! ```ignore
//! use radtrace_geom::Boundary;
//! use radtrace_scene::{Navigator, Scene};
//!
//! let mut scene = Scene::new("world", Boundary::unbounded(), ());
//! let ball = scene.add_volume(scene.root(), "ball", Boundary::sphere(1.0)?, ())?;
//!
//! let mut nav = Navigator::new(&scene);
//! nav.go_to(ball)?;
//! ```

mod error;
mod navigator;
mod scene;

pub use error::{Result, SceneError};
pub use navigator::Navigator;
pub use scene::{Scene, Transition, Volume, VolumeId};
