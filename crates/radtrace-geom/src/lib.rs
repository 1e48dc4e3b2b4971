#![warn(missing_docs)]

//! Surface primitives and boundaries for the radtrace transport kernel.
//!
//! A [`Surface`] is a stateless primitive in its own local frame (an
//! infinite plane through the origin, or a sphere centered at the origin).
//! Surfaces are intersected against an *observer pose*: the ray starts at
//! the observer position and runs along the observer's forward (z) axis.
//!
//! A [`Boundary`] places one or more surfaces to enclose a region of space.

use std::fmt::Debug;

use radtrace_math::{Point3, Pose, GRAZING_COSINE};

mod boundary;
mod error;

pub use boundary::{Boundary, BoundaryElement, EPSILON_FRACTION};
pub use error::{GeomError, Result};

/// Result of intersecting an observer's forward axis with a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    /// Distance from the observer to the intersection point.
    pub distance: f64,
    /// Intersection point, oriented so its z axis is the outward normal
    /// of the enclosed region.
    pub pose: Pose,
}

impl Crossing {
    /// Intersection point.
    pub fn position(&self) -> Point3 {
        self.pose.position
    }
}

// =============================================================================
// Surface types
// =============================================================================

/// A closed-form surface primitive in its local frame.
pub trait Surface: Send + Sync + Debug {
    /// Nearest intersection of the observer's forward axis with the surface.
    ///
    /// The observer is expressed in the surface's local frame. Grazing
    /// directions and intersections at or behind the observer are `None`.
    fn intersection(&self, observer: &Pose) -> Option<Crossing>;

    /// Whether a local point lies in the region enclosed by this surface.
    fn encloses(&self, point: &Point3) -> bool;
}

// =============================================================================
// Plane
// =============================================================================

/// The infinite plane z = 0.
///
/// The enclosed region is the half-space z < 0; the outward normal is +z.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plane;

impl Plane {
    /// The plane z = 0.
    pub fn new() -> Self {
        Self
    }
}

impl Surface for Plane {
    fn intersection(&self, observer: &Pose) -> Option<Crossing> {
        let d = observer.z_axis();
        if d.z.abs() < GRAZING_COSINE {
            return None;
        }

        let t = -observer.position.z / d.z;
        if t <= 0.0 {
            return None;
        }

        let point = observer.position + d.into_inner() * t;
        Some(Crossing {
            distance: t,
            pose: Pose::at(Point3::new(point.x, point.y, 0.0)),
        })
    }

    fn encloses(&self, point: &Point3) -> bool {
        point.z < 0.0
    }
}

// =============================================================================
// Sphere
// =============================================================================

/// A sphere of the given radius centered at the origin.
#[derive(Debug, Clone, Copy)]
pub struct Sphere {
    radius: f64,
}

impl Sphere {
    /// Create a sphere; the radius must be positive and finite.
    pub fn new(radius: f64) -> Result<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(GeomError::InvalidRadius(radius));
        }
        Ok(Self { radius })
    }

    /// Sphere radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Surface for Sphere {
    fn intersection(&self, observer: &Pose) -> Option<Crossing> {
        let o = observer.position.coords;
        let d = observer.z_axis().into_inner();

        // |o + t d|^2 = r^2 with |d| = 1
        let b = o.dot(&d);
        let c = o.norm_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant <= 0.0 {
            return None;
        }
        let root = discriminant.sqrt();

        let t = if c <= 0.0 {
            // Observer enclosed or on the surface: only the far root can be ahead.
            if b > 0.0 {
                c / (-b - root)
            } else {
                -b + root
            }
        } else {
            // Both roots share a sign; both behind when b >= 0.
            if b >= 0.0 {
                return None;
            }
            -b - root
        };
        if t <= 0.0 {
            return None;
        }

        let point = observer.position + d * t;
        Some(Crossing {
            distance: t,
            pose: Pose::looking_along(point, &point.coords),
        })
    }

    fn encloses(&self, point: &Point3) -> bool {
        point.coords.norm_squared() < self.radius * self.radius
    }
}
