#![warn(missing_docs)]

//! Pose algebra for the radtrace transport kernel.
//!
//! Thin wrappers around nalgebra providing the rigid placements used
//! throughout the engine: radiation packages, observers, surface elements
//! and whole volumes are all positioned with a [`Pose`]. By convention the
//! local z axis of a pose is its forward (propagation) axis.

use nalgebra::{Isometry3, Matrix4, Translation3, Unit, UnitQuaternion, Vector3, Vector4};
use std::f64::consts::PI;

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// A unit quaternion rotation.
pub type Rotation = UnitQuaternion<f64>;

/// A rigid transform (rotation followed by translation).
pub type Isometry = Isometry3<f64>;

/// A 4-vector, used for Stokes parameters.
pub type Vec4 = Vector4<f64>;

/// A dense 4x4 matrix, used to build Mueller matrices.
pub type Mat4 = Matrix4<f64>;

/// Direction cosines smaller than this are treated as grazing (parallel).
pub const GRAZING_COSINE: f64 = 1e-12;

/// A rigid placement: position plus orientation.
///
/// The orientation is kept normalized; every mutating operation
/// renormalizes the quaternion so drift from long chains of rotations
/// never accumulates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Origin of the local frame.
    pub position: Point3,
    /// Rotation from local axes to world axes.
    pub orientation: Rotation,
}

impl Pose {
    /// Pose at the origin with world-aligned axes.
    pub fn identity() -> Self {
        Self {
            position: Point3::origin(),
            orientation: Rotation::identity(),
        }
    }

    /// Pose from a position and orientation.
    pub fn new(position: Point3, orientation: Rotation) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// World-aligned pose at `position`.
    pub fn at(position: Point3) -> Self {
        Self::new(position, Rotation::identity())
    }

    /// Pose at `position` whose forward axis points along `direction`.
    ///
    /// The orientation is the minimal rotation taking world +z onto
    /// `direction`, so world-x stays as close as possible to local x.
    pub fn looking_along(position: Point3, direction: &Vec3) -> Self {
        let mut pose = Self::at(position);
        pose.reorient(direction);
        pose
    }

    /// Build a pose from an nalgebra isometry.
    pub fn from_isometry(iso: &Isometry) -> Self {
        Self::new(Point3::from(iso.translation.vector), iso.rotation)
    }

    /// This pose as an nalgebra isometry (local -> world).
    pub fn to_isometry(&self) -> Isometry {
        Isometry::from_parts(Translation3::from(self.position.coords), self.orientation)
    }

    /// Local x axis expressed in world coordinates.
    pub fn x_axis(&self) -> Dir3 {
        self.orientation * Vector3::x_axis()
    }

    /// Local y axis expressed in world coordinates.
    pub fn y_axis(&self) -> Dir3 {
        self.orientation * Vector3::y_axis()
    }

    /// Local z (forward) axis expressed in world coordinates.
    pub fn z_axis(&self) -> Dir3 {
        self.orientation * Vector3::z_axis()
    }

    /// Express `local`, given relative to this pose, in world coordinates.
    pub fn compose(&self, local: &Pose) -> Pose {
        Self::from_isometry(&(self.to_isometry() * local.to_isometry()))
    }

    /// This pose as seen from the frame of `observer`.
    ///
    /// `observer.compose(&self.observed_by(observer)) == *self`.
    pub fn observed_by(&self, observer: &Pose) -> Pose {
        Self::from_isometry(&(observer.to_isometry().inverse() * self.to_isometry()))
    }

    /// Inverse placement.
    pub fn inverse(&self) -> Pose {
        Self::from_isometry(&self.to_isometry().inverse())
    }

    /// Transform a point from local to world coordinates.
    pub fn transform_point(&self, p: &Point3) -> Point3 {
        self.position + self.orientation * p.coords
    }

    /// Transform a point from world to local coordinates.
    pub fn inverse_transform_point(&self, p: &Point3) -> Point3 {
        Point3::from(self.orientation.inverse() * (p - self.position))
    }

    /// Express a world direction in this pose's local axes.
    pub fn local_direction(&self, world: &Vec3) -> Vec3 {
        self.orientation.inverse() * world
    }

    /// Move along the forward axis by `distance`.
    pub fn advance(&mut self, distance: f64) {
        self.position += self.z_axis().into_inner() * distance;
    }

    /// Translate by a world offset.
    pub fn translate(&mut self, offset: &Vec3) {
        self.position += *offset;
    }

    /// Rotate in place about this pose's own position (world axes).
    pub fn rotate(&mut self, rotation: &Rotation) {
        self.orientation = rotation * self.orientation;
        self.orientation.renormalize();
    }

    /// Rotate about an arbitrary world pivot.
    pub fn rotate_about(&mut self, rotation: &Rotation, pivot: &Point3) {
        self.position = pivot + rotation * (self.position - pivot);
        self.rotate(rotation);
    }

    /// Spin the local frame about its own forward axis by `angle` radians.
    pub fn rotate_local_z(&mut self, angle: f64) {
        self.orientation *= Rotation::from_axis_angle(&Vector3::z_axis(), angle);
        self.orientation.renormalize();
    }

    /// Re-derive the orientation so the forward axis equals `direction`.
    ///
    /// Applies the minimal rotation between the current and the requested
    /// forward axis. A target in the local x-z plane therefore rotates the
    /// frame about local y, leaving y untouched. Antiparallel targets turn
    /// half a revolution about local y.
    pub fn reorient(&mut self, direction: &Vec3) {
        let target = direction.normalize();
        let forward = self.z_axis().into_inner();
        let rotation = Rotation::rotation_between(&forward, &target)
            .unwrap_or_else(|| Rotation::from_axis_angle(&self.y_axis(), PI));
        self.rotate(&rotation);
    }

    /// The same pose turned half a revolution about its local x axis.
    ///
    /// The forward axis reverses; the x axis is preserved.
    pub fn flipped(&self) -> Pose {
        Pose::new(
            self.position,
            self.orientation * Rotation::from_axis_angle(&Vector3::x_axis(), PI),
        )
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// Two unit vectors completing `normal` to a right-handed orthonormal basis.
pub fn orthonormal_frame(normal: &Vec3) -> (Vec3, Vec3) {
    let n = normal.normalize();
    let arbitrary = if n.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let u = arbitrary.cross(&n).normalize();
    let v = n.cross(&u);
    (u, v)
}

/// Spherical direction `(sin θ cos φ, sin θ sin φ, cos θ)` from `cos θ` and `φ`.
pub fn spherical_direction(cos_theta: f64, phi: f64) -> Vec3 {
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let (s, c) = phi.sin_cos();
    Vec3::new(sin_theta * c, sin_theta * s, cos_theta)
}
