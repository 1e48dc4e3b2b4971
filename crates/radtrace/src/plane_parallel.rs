//! Horizontally stratified scenes.

use radtrace_geom::Boundary;
use radtrace_scene::Scene;
use radtrace_transport::{Facing, Medium};

use crate::Result;

/// Name of the half-space above the top layer.
pub const SKY: &str = "sky";

/// Name of the half-space below the bottom layer.
pub const GROUND: &str = "ground";

struct Layer {
    name: String,
    thickness: f64,
    medium: Medium,
}

/// Builder for a stack of horizontal layers between a sky and a ground.
///
/// The scene root is unbounded vacuum holding, as touching siblings, the
/// [`SKY`] half-space, each layer, and the [`GROUND`] half-space. By
/// default sky and ground are vacuum with inward receivers, so their
/// fluxes are the hemispherical reflectance and transmittance of the
/// stack.
pub struct PlaneParallel {
    bottom: f64,
    layers: Vec<Layer>,
    sky: Medium,
    ground: Medium,
}

impl PlaneParallel {
    /// Empty stack whose lowest layer starts at height `bottom`.
    pub fn new(bottom: f64) -> Self {
        Self {
            bottom,
            layers: Vec::new(),
            sky: Medium::vacuum().with_receiver(Facing::Inward),
            ground: Medium::vacuum().with_receiver(Facing::Inward),
        }
    }

    /// Add a layer on top of the stack.
    pub fn layer(mut self, name: impl Into<String>, thickness: f64, medium: Medium) -> Self {
        self.layers.push(Layer {
            name: name.into(),
            thickness,
            medium,
        });
        self
    }

    /// Replace the medium above the stack.
    pub fn sky(mut self, medium: Medium) -> Self {
        self.sky = medium;
        self
    }

    /// Replace the medium below the stack.
    pub fn ground(mut self, medium: Medium) -> Self {
        self.ground = medium;
        self
    }

    /// Height of the top of the stack.
    pub fn top(&self) -> f64 {
        self.bottom + self.layers.iter().map(|l| l.thickness).sum::<f64>()
    }

    /// Build the scene.
    ///
    /// Fails on an empty stack, a non-positive thickness, or a layer named
    /// like another layer, the sky or the ground.
    pub fn build(self) -> Result<Scene<Medium>> {
        let top = self.top();
        let mut heights = vec![self.bottom];
        for layer in &self.layers {
            let last = heights[heights.len() - 1];
            heights.push(last + layer.thickness);
        }
        let slabs = Boundary::layer_stack(&heights)?;

        let mut scene = Scene::new("world", Boundary::unbounded(), Medium::vacuum());
        let root = scene.root();
        scene.add_volume(root, SKY, Boundary::above(top), self.sky)?;
        for (layer, slab) in self.layers.into_iter().zip(slabs) {
            scene.add_volume(root, layer.name, slab, layer.medium)?;
        }
        scene.add_volume(root, GROUND, Boundary::below(self.bottom), self.ground)?;

        log::debug!(
            "plane-parallel scene: {} layers between z = {} and z = {}",
            heights.len() - 1,
            self.bottom,
            top
        );
        Ok(scene)
    }
}
