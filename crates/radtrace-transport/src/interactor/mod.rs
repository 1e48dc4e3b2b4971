//! Event handlers for the transport loop.
//!
//! The [`MaterialInteractor`] handles in-medium scattering; the
//! [`WallInteractor`] handles boundary crossings. Both pair every
//! importance-sampled direction with the matching likelihood ratio.

mod material;
mod wall;

pub use material::MaterialInteractor;
pub use wall::{WallInteractor, WallOutcome};
