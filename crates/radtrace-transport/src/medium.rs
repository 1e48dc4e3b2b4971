//! Volume content: material, optional coating and receivers.

use std::sync::Arc;

use radtrace_optics::{Coating, Material, Vacuum};
use serde::{Deserialize, Serialize};

/// Direction of flux through a volume's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Heading into the volume.
    Inward,
    /// Heading out of the volume.
    Outward,
}

/// What fills a volume.
///
/// Materials and coatings are shared trait objects, so one model can fill
/// many volumes and a scene can be read from many threads at once.
#[derive(Debug, Clone)]
pub struct Medium {
    material: Arc<dyn Material>,
    coating: Option<Arc<dyn Coating>>,
    inward_receiver: bool,
    outward_receiver: bool,
}

impl Medium {
    /// Medium filled with `material`, uncoated, without receivers.
    pub fn new(material: impl Material + 'static) -> Self {
        Self::from_shared(Arc::new(material))
    }

    /// Medium filled with a shared material.
    pub fn from_shared(material: Arc<dyn Material>) -> Self {
        Self {
            material,
            coating: None,
            inward_receiver: false,
            outward_receiver: false,
        }
    }

    /// Empty space.
    pub fn vacuum() -> Self {
        Self::new(Vacuum)
    }

    /// Coat the volume's boundary.
    pub fn with_coating(self, coating: impl Coating + 'static) -> Self {
        self.with_shared_coating(Arc::new(coating))
    }

    /// Coat the volume's boundary with a shared coating.
    pub fn with_shared_coating(mut self, coating: Arc<dyn Coating>) -> Self {
        self.coating = Some(coating);
        self
    }

    /// Install a receiver on the volume's boundary.
    pub fn with_receiver(mut self, facing: Facing) -> Self {
        match facing {
            Facing::Inward => self.inward_receiver = true,
            Facing::Outward => self.outward_receiver = true,
        }
        self
    }

    /// The filling material.
    pub fn material(&self) -> &dyn Material {
        self.material.as_ref()
    }

    /// The boundary coating, if any.
    pub fn coating(&self) -> Option<&dyn Coating> {
        self.coating.as_deref()
    }

    /// Whether a receiver facing `facing` is installed.
    pub fn has_receiver(&self, facing: Facing) -> bool {
        match facing {
            Facing::Inward => self.inward_receiver,
            Facing::Outward => self.outward_receiver,
        }
    }
}

impl Default for Medium {
    fn default() -> Self {
        Self::vacuum()
    }
}
