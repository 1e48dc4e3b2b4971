//! Cursor over a volume tree.

use radtrace_geom::Crossing;
use radtrace_math::{Point3, Pose};

use crate::{Result, Scene, SceneError, Transition, Volume, VolumeId};

/// A cursor over a borrowed [`Scene`].
///
/// The navigator holds nothing but a shared reference and the current
/// volume id, so any number of navigators (one per worker thread, say) can
/// traverse the same scene at once.
pub struct Navigator<'a, C> {
    scene: &'a Scene<C>,
    current: VolumeId,
}

impl<C> Clone for Navigator<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Navigator<'_, C> {}

impl<C> std::fmt::Debug for Navigator<'_, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Navigator")
            .field("current", &self.scene[self.current].name())
            .finish()
    }
}

impl<'a, C> Navigator<'a, C> {
    /// Start at the root of `scene`.
    pub fn new(scene: &'a Scene<C>) -> Self {
        Self {
            scene,
            current: scene.root(),
        }
    }

    /// The scene being traversed.
    pub fn scene(&self) -> &'a Scene<C> {
        self.scene
    }

    /// Id of the current volume.
    pub fn current(&self) -> VolumeId {
        self.current
    }

    /// The current volume.
    pub fn volume(&self) -> &'a Volume<C> {
        &self.scene[self.current]
    }

    /// Content of the current volume.
    pub fn content(&self) -> &'a C {
        self.scene[self.current].content()
    }

    /// The volume enclosing the current one.
    pub fn outer_volume(&self) -> Option<VolumeId> {
        self.scene[self.current].parent()
    }

    /// Volumes nested directly in the current one.
    pub fn inner_volumes(&self) -> &'a [VolumeId] {
        self.scene[self.current].children()
    }

    /// Next crossing along the pose's forward axis, with the volume whose
    /// boundary is crossed. Does not move the cursor.
    pub fn next_crossing(&self, pose: &Pose) -> Option<(VolumeId, Crossing)> {
        self.scene.intersection(self.current, pose)
    }

    /// Next intersection along the pose's forward axis.
    pub fn next_intersection(&self, pose: &Pose) -> Option<Crossing> {
        self.next_crossing(pose).map(|(_, crossing)| crossing)
    }

    /// Volumes exited and entered by passing straight through the next
    /// intersection; `None` when nothing lies ahead.
    pub fn next_transition(&self, pose: &Pose) -> Option<Transition> {
        let (crossed, crossing) = self.next_crossing(pose)?;
        let step = self.scene[crossed].boundary().epsilon();
        let beyond = crossing.position() + pose.z_axis().into_inner() * step;
        Some(self.scene.transition(self.current, &beyond))
    }

    /// Volume reached by passing straight through the next intersection.
    ///
    /// `None` when nothing lies ahead or the crossing leaves the scene.
    pub fn next_volume(&self, pose: &Pose) -> Option<VolumeId> {
        self.next_transition(pose)?.destination
    }

    /// Whether reaching `crossing` along the observer's forward axis enters
    /// the crossed volume (its outward normal opposes the direction of
    /// travel) rather than leaving it.
    pub fn is_moving_inward(&self, crossing: &Crossing, observer: &Pose) -> bool {
        crossing.pose.z_axis().dot(observer.z_axis().as_ref()) < 0.0
    }

    /// Deepest volume containing `point`, searched from the root.
    pub fn locate(&self, point: &Point3) -> Option<VolumeId> {
        self.scene.locate(point)
    }

    /// Move into the nearest child hit by the pose's forward axis.
    pub fn go_inward(&mut self, pose: &Pose) -> Result<VolumeId> {
        let (child, _) = self
            .scene
            .closest_inner_volume(self.current, pose)
            .ok_or_else(|| SceneError::NoInnerVolume(self.volume().name().to_owned()))?;
        self.current = child;
        Ok(child)
    }

    /// Move to the enclosing volume.
    pub fn go_outward(&mut self) -> Result<VolumeId> {
        let parent = self
            .outer_volume()
            .ok_or_else(|| SceneError::NoOuterVolume(self.volume().name().to_owned()))?;
        self.current = parent;
        Ok(parent)
    }

    /// Jump to a volume of the same scene.
    pub fn go_to(&mut self, id: VolumeId) -> Result<()> {
        if !self.scene.contains_volume(id) {
            return Err(SceneError::UnknownVolume);
        }
        self.current = id;
        Ok(())
    }

    /// Jump to a volume by name.
    pub fn go_to_named(&mut self, name: &str) -> Result<VolumeId> {
        let id = self
            .scene
            .find(name)
            .ok_or_else(|| SceneError::UnknownName(name.to_owned()))?;
        self.current = id;
        Ok(id)
    }
}
