//! Error types for transport runs.

use thiserror::Error;

use radtrace_optics::OpticsError;
use radtrace_scene::SceneError;

use crate::Facing;

/// Errors raised while configuring or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// Navigation failed.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// An optical model was misconfigured.
    #[error("optics error: {0}")]
    Optics(#[from] OpticsError),

    /// Run settings out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Emitter distribution out of range.
    #[error("invalid emitter: {0}")]
    InvalidEmitter(String),

    /// The named volume has no receiver facing that way.
    #[error("volume {volume:?} has no {facing:?} receiver")]
    NoReceiver {
        /// Volume name.
        volume: String,
        /// Requested facing.
        facing: Facing,
    },
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;
