//! Error types for scene construction and navigation.

use thiserror::Error;

/// Errors raised by the volume tree and its navigator.
///
/// Traversal errors are programming errors: the caller asked to move
/// somewhere the tree does not go.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Volume id does not belong to this scene.
    #[error("volume not found in scene")]
    UnknownVolume,

    /// No volume carries the requested name.
    #[error("no volume named {0:?}")]
    UnknownName(String),

    /// Volume names must be unique within a scene.
    #[error("duplicate volume name {0:?}")]
    DuplicateName(String),

    /// `go_outward` was requested at the root.
    #[error("volume {0:?} has no outer volume")]
    NoOuterVolume(String),

    /// `go_inward` found no child along the requested axis.
    #[error("volume {0:?} has no inner volume along the requested direction")]
    NoInnerVolume(String),
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
