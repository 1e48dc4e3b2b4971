//! Boundaries: placed surface elements enclosing one region.
//!
//! A point is inside a boundary when every element encloses it. Elements
//! flagged inside-out enclose the complement of their surface's region,
//! which is how subtracted shapes (a sphere with a cavity, a slab bounded
//! from below) are expressed.

use std::sync::Arc;

use radtrace_math::{Point3, Pose, Rotation, Vec3};

use crate::{Crossing, GeomError, Plane, Result, Sphere, Surface};

/// Fraction of a boundary's length scale used to step off its surface.
pub const EPSILON_FRACTION: f64 = 1e-9;

/// One placed surface of a boundary.
#[derive(Debug, Clone)]
pub struct BoundaryElement {
    surface: Arc<dyn Surface>,
    placement: Pose,
    inside_out: bool,
}

/// What one element reports for an observer.
struct Probe {
    hit: Option<Crossing>,
    encloses_observer: bool,
}

impl BoundaryElement {
    /// Place `surface` at `placement` (relative to the boundary).
    pub fn new(surface: Arc<dyn Surface>, placement: Pose, inside_out: bool) -> Self {
        Self {
            surface,
            placement,
            inside_out,
        }
    }

    /// The underlying surface.
    pub fn surface(&self) -> &dyn Surface {
        self.surface.as_ref()
    }

    /// Placement relative to the owning boundary.
    pub fn placement(&self) -> &Pose {
        &self.placement
    }

    /// Whether this element encloses the complement of its surface region.
    pub fn is_inside_out(&self) -> bool {
        self.inside_out
    }

    fn encloses(&self, frame: &Pose, point: &Point3) -> bool {
        let local = frame.compose(&self.placement).inverse_transform_point(point);
        self.surface.encloses(&local) != self.inside_out
    }

    fn probe(&self, frame: &Pose, observer: &Pose) -> Probe {
        let world = frame.compose(&self.placement);
        let local = observer.observed_by(&world);
        let hit = self.surface.intersection(&local).map(|hit| {
            let pose = world.compose(&hit.pose);
            Crossing {
                distance: hit.distance,
                pose: if self.inside_out { pose.flipped() } else { pose },
            }
        });
        Probe {
            hit,
            encloses_observer: self.surface.encloses(&local.position) != self.inside_out,
        }
    }
}

/// A set of placed surface elements forming one closed or half-open region.
#[derive(Debug, Clone)]
pub struct Boundary {
    elements: Vec<BoundaryElement>,
    placement: Pose,
    length_scale: f64,
}

impl Boundary {
    /// An empty boundary: encloses all of space and is never intersected.
    pub fn unbounded() -> Self {
        Self {
            elements: Vec::new(),
            placement: Pose::identity(),
            length_scale: 1.0,
        }
    }

    /// The half-space z < 0.
    pub fn half_space() -> Self {
        Self::unbounded().with_element(Arc::new(Plane::new()), Pose::identity(), false)
    }

    /// The half-space `z > height`.
    pub fn above(height: f64) -> Self {
        Self::unbounded().with_element(
            Arc::new(Plane::new()),
            Pose::at(Point3::new(0.0, 0.0, height)),
            true,
        )
    }

    /// The half-space `z < height`.
    pub fn below(height: f64) -> Self {
        Self::unbounded().with_element(
            Arc::new(Plane::new()),
            Pose::at(Point3::new(0.0, 0.0, height)),
            false,
        )
    }

    /// A sphere centered at the origin.
    pub fn sphere(radius: f64) -> Result<Self> {
        let sphere = Sphere::new(radius)?;
        Self::unbounded()
            .with_element(Arc::new(sphere), Pose::identity(), false)
            .with_length_scale(radius)
    }

    /// A spherical shell: the sphere of radius `outer` minus the sphere of
    /// radius `inner`.
    pub fn shell(outer: f64, inner: f64) -> Result<Self> {
        if !(inner > 0.0 && inner < outer) {
            return Err(GeomError::InvalidShell { outer, inner });
        }
        let outer_sphere = Sphere::new(outer)?;
        let inner_sphere = Sphere::new(inner)?;
        Self::unbounded()
            .with_element(Arc::new(outer_sphere), Pose::identity(), false)
            .with_element(Arc::new(inner_sphere), Pose::identity(), true)
            .with_length_scale(outer - inner)
    }

    /// The horizontal slab `bottom < z < top`.
    pub fn slab(bottom: f64, top: f64) -> Result<Self> {
        if !(bottom.is_finite() && top.is_finite() && top > bottom) {
            return Err(GeomError::DegenerateSlab { bottom, top });
        }
        let plane: Arc<dyn Surface> = Arc::new(Plane::new());
        Self::unbounded()
            .with_element(plane.clone(), Pose::at(Point3::new(0.0, 0.0, top)), false)
            .with_element(plane, Pose::at(Point3::new(0.0, 0.0, bottom)), true)
            .with_length_scale(top - bottom)
    }

    /// Adjacent slabs between consecutive `heights`, bottom first.
    pub fn layer_stack(heights: &[f64]) -> Result<Vec<Self>> {
        if heights.len() < 2 {
            return Err(GeomError::TooFewLayers(heights.len()));
        }
        if let Some(i) = heights.windows(2).position(|w| !(w[1] > w[0])) {
            return Err(GeomError::UnsortedLayers(i + 1));
        }
        heights.windows(2).map(|w| Self::slab(w[0], w[1])).collect()
    }

    /// Add an element.
    pub fn with_element(mut self, surface: Arc<dyn Surface>, placement: Pose, inside_out: bool) -> Self {
        self.elements
            .push(BoundaryElement::new(surface, placement, inside_out));
        self
    }

    /// Set the characteristic length scale used for epsilon steps.
    pub fn with_length_scale(mut self, length_scale: f64) -> Result<Self> {
        if !(length_scale.is_finite() && length_scale > 0.0) {
            return Err(GeomError::InvalidLengthScale(length_scale));
        }
        self.length_scale = length_scale;
        Ok(self)
    }

    /// The surface elements, in insertion order.
    pub fn elements(&self) -> &[BoundaryElement] {
        &self.elements
    }

    /// Overall placement of the boundary.
    pub fn placement(&self) -> &Pose {
        &self.placement
    }

    /// Characteristic length scale.
    pub fn length_scale(&self) -> f64 {
        self.length_scale
    }

    /// Step length that safely clears this boundary's surface.
    pub fn epsilon(&self) -> f64 {
        self.length_scale * EPSILON_FRACTION
    }

    /// Whether a world point lies inside every element.
    pub fn contains(&self, point: &Point3) -> bool {
        self.elements
            .iter()
            .all(|e| e.encloses(&self.placement, point))
    }

    /// Nearest valid intersection of the observer's forward axis with this
    /// boundary.
    ///
    /// When the observer is inside, this is the closest hit of any element.
    /// Otherwise it is the closest hit that lies inside every other element.
    /// The returned pose's z axis is the outward normal of the region.
    pub fn intersection(&self, observer: &Pose) -> Option<Crossing> {
        let probes: Vec<Probe> = self
            .elements
            .iter()
            .map(|e| e.probe(&self.placement, observer))
            .collect();

        if probes.iter().all(|p| p.encloses_observer) {
            return probes
                .into_iter()
                .filter_map(|p| p.hit)
                .min_by(|a, b| a.distance.total_cmp(&b.distance));
        }

        probes
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.hit.map(|hit| (i, hit)))
            .filter(|(i, hit)| {
                self.elements
                    .iter()
                    .enumerate()
                    .all(|(j, e)| j == *i || e.encloses(&self.placement, &hit.pose.position))
            })
            .map(|(_, hit)| hit)
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    /// Translate every element by a world offset.
    pub fn translate(&mut self, offset: &Vec3) {
        self.placement.translate(offset);
    }

    /// Rotate every element about a world pivot.
    pub fn rotate_about(&mut self, rotation: &Rotation, pivot: &Point3) {
        self.placement.rotate_about(rotation, pivot);
    }
}

impl Default for Boundary {
    fn default() -> Self {
        Self::unbounded()
    }
}
