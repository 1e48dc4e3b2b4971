//! Arena-backed volume tree.

use std::ops::{Index, IndexMut};

use radtrace_geom::{Boundary, Crossing};
use radtrace_math::{Point3, Pose, Rotation, Vec3};
use slotmap::{new_key_type, SlotMap};

use crate::{Result, SceneError};

new_key_type! {
    /// Stable handle to a volume within one [`Scene`].
    pub struct VolumeId;
}

/// A named node: boundary, user content, and links into the tree.
#[derive(Debug, Clone)]
pub struct Volume<C> {
    name: String,
    boundary: Boundary,
    content: C,
    parent: Option<VolumeId>,
    children: Vec<VolumeId>,
}

impl<C> Volume<C> {
    /// Volume name (unique within its scene).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The boundary enclosing this volume.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// User content.
    pub fn content(&self) -> &C {
        &self.content
    }

    /// Mutable user content.
    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }

    /// The enclosing volume, `None` for the root.
    pub fn parent(&self) -> Option<VolumeId> {
        self.parent
    }

    /// Directly nested volumes, in insertion order.
    pub fn children(&self) -> &[VolumeId] {
        &self.children
    }
}

/// Volumes exited and entered when a point moves from one volume to
/// wherever it now lies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transition {
    /// Volumes left, innermost first.
    pub exited: Vec<VolumeId>,
    /// Volumes entered, outermost first.
    pub entered: Vec<VolumeId>,
    /// Deepest volume now containing the point; `None` once the point is
    /// outside the root.
    pub destination: Option<VolumeId>,
}

impl Transition {
    /// Whether the point left the scene entirely.
    pub fn escapes(&self) -> bool {
        self.destination.is_none()
    }
}

/// A tree of nested volumes stored in an arena.
///
/// Indexing with a [`VolumeId`] from a different scene panics, as with
/// any slotmap.
#[derive(Debug, Clone)]
pub struct Scene<C> {
    volumes: SlotMap<VolumeId, Volume<C>>,
    root: VolumeId,
}

impl<C> Scene<C> {
    /// Create a scene holding only its root volume.
    pub fn new(name: impl Into<String>, boundary: Boundary, content: C) -> Self {
        let mut volumes = SlotMap::with_key();
        let root = volumes.insert(Volume {
            name: name.into(),
            boundary,
            content,
            parent: None,
            children: Vec::new(),
        });
        Self { volumes, root }
    }

    /// Nest a new volume inside `parent`.
    pub fn add_volume(
        &mut self,
        parent: VolumeId,
        name: impl Into<String>,
        boundary: Boundary,
        content: C,
    ) -> Result<VolumeId> {
        let name = name.into();
        if !self.volumes.contains_key(parent) {
            return Err(SceneError::UnknownVolume);
        }
        if self.find(&name).is_some() {
            return Err(SceneError::DuplicateName(name));
        }

        let id = self.volumes.insert(Volume {
            name,
            boundary,
            content,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.volumes[parent].children.push(id);
        Ok(id)
    }

    /// The outermost volume.
    pub fn root(&self) -> VolumeId {
        self.root
    }

    /// Look up a volume.
    pub fn get(&self, id: VolumeId) -> Option<&Volume<C>> {
        self.volumes.get(id)
    }

    /// Look up a volume mutably.
    pub fn get_mut(&mut self, id: VolumeId) -> Option<&mut Volume<C>> {
        self.volumes.get_mut(id)
    }

    /// Whether `id` belongs to this scene.
    pub fn contains_volume(&self, id: VolumeId) -> bool {
        self.volumes.contains_key(id)
    }

    /// Find a volume by name.
    pub fn find(&self, name: &str) -> Option<VolumeId> {
        self.volumes
            .iter()
            .find(|(_, v)| v.name == name)
            .map(|(id, _)| id)
    }

    /// Number of volumes, root included.
    pub fn len(&self) -> usize {
        self.volumes.len()
    }

    /// A scene always holds its root, so this is always false.
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// All volumes, in arena order.
    pub fn iter(&self) -> impl Iterator<Item = (VolumeId, &Volume<C>)> {
        self.volumes.iter()
    }

    /// All volumes mutably, in arena order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (VolumeId, &mut Volume<C>)> {
        self.volumes.iter_mut()
    }

    /// `id` and every volume nested below it, parents before children.
    pub fn descendants(&self, id: VolumeId) -> Result<Vec<VolumeId>> {
        if !self.volumes.contains_key(id) {
            return Err(SceneError::UnknownVolume);
        }
        let mut out = vec![id];
        let mut i = 0;
        while i < out.len() {
            out.extend_from_slice(&self.volumes[out[i]].children);
            i += 1;
        }
        Ok(out)
    }

    /// Translate a volume together with everything nested inside it.
    pub fn translate(&mut self, id: VolumeId, offset: &Vec3) -> Result<()> {
        for v in self.descendants(id)? {
            self.volumes[v].boundary.translate(offset);
        }
        Ok(())
    }

    /// Rotate a volume together with everything nested inside it.
    pub fn rotate_about(&mut self, id: VolumeId, rotation: &Rotation, pivot: &Point3) -> Result<()> {
        for v in self.descendants(id)? {
            self.volumes[v].boundary.rotate_about(rotation, pivot);
        }
        Ok(())
    }

    /// Nearest child of `id` whose boundary the observer's forward axis hits.
    ///
    /// Ties are broken by distance, never by insertion order.
    pub fn closest_inner_volume(&self, id: VolumeId, observer: &Pose) -> Option<(VolumeId, Crossing)> {
        self.volumes[id]
            .children
            .iter()
            .filter_map(|&child| {
                self.volumes[child]
                    .boundary
                    .intersection(observer)
                    .map(|crossing| (child, crossing))
            })
            .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
    }

    /// Next crossing seen from inside `id`, paired with the volume whose
    /// boundary is crossed.
    ///
    /// Children occlude the volume's own boundary.
    pub fn intersection(&self, id: VolumeId, observer: &Pose) -> Option<(VolumeId, Crossing)> {
        self.closest_inner_volume(id, observer).or_else(|| {
            self.volumes[id]
                .boundary
                .intersection(observer)
                .map(|crossing| (id, crossing))
        })
    }

    /// Deepest volume containing `point`, or `None` outside the root.
    pub fn locate(&self, point: &Point3) -> Option<VolumeId> {
        if !self.volumes[self.root].boundary.contains(point) {
            return None;
        }
        let mut current = self.root;
        while let Some(child) = self.child_containing(current, point) {
            current = child;
        }
        Some(current)
    }

    /// Walk from `from` to the deepest volume containing `point`.
    ///
    /// Climbs until an ancestor contains the point, then descends. This
    /// handles touching siblings: leaving one layer of a stack through a
    /// shared face lands directly in the neighbouring layer.
    pub fn transition(&self, from: VolumeId, point: &Point3) -> Transition {
        let mut exited = Vec::new();
        let mut current = from;
        while !self.volumes[current].boundary.contains(point) {
            exited.push(current);
            match self.volumes[current].parent {
                Some(parent) => current = parent,
                None => {
                    return Transition {
                        exited,
                        entered: Vec::new(),
                        destination: None,
                    }
                }
            }
        }

        let mut entered = Vec::new();
        while let Some(child) = self.child_containing(current, point) {
            entered.push(child);
            current = child;
        }
        Transition {
            exited,
            entered,
            destination: Some(current),
        }
    }

    fn child_containing(&self, id: VolumeId, point: &Point3) -> Option<VolumeId> {
        self.volumes[id]
            .children
            .iter()
            .copied()
            .find(|&child| self.volumes[child].boundary.contains(point))
    }
}

impl<C> Index<VolumeId> for Scene<C> {
    type Output = Volume<C>;

    fn index(&self, id: VolumeId) -> &Volume<C> {
        &self.volumes[id]
    }
}

impl<C> IndexMut<VolumeId> for Scene<C> {
    fn index_mut(&mut self, id: VolumeId) -> &mut Volume<C> {
        &mut self.volumes[id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f64, y: f64, z: f64) -> Pose {
        Pose::looking_along(Point3::new(x, y, z), &-Vec3::z())
    }

    /// world > { sky (z > 1), slab (0 < z < 1), floor (z < 0) }
    fn layered() -> (Scene<u32>, [VolumeId; 3]) {
        let mut scene = Scene::new("world", Boundary::unbounded(), 0);
        let root = scene.root();
        let mut sky = Boundary::half_space();
        sky.rotate_about(
            &Rotation::from_axis_angle(&Vec3::x_axis(), std::f64::consts::PI),
            &Point3::origin(),
        );
        sky.translate(&Vec3::new(0.0, 0.0, 1.0));
        let sky = scene.add_volume(root, "sky", sky, 1).unwrap();
        let slab = scene
            .add_volume(root, "slab", Boundary::slab(0.0, 1.0).unwrap(), 2)
            .unwrap();
        let floor = scene
            .add_volume(root, "floor", Boundary::half_space(), 3)
            .unwrap();
        (scene, [sky, slab, floor])
    }

    #[test]
    fn test_build_and_find() {
        let (scene, [sky, slab, floor]) = layered();
        assert_eq!(scene.len(), 4);
        assert_eq!(scene.find("slab"), Some(slab));
        assert_eq!(scene.find("nothing"), None);
        assert_eq!(scene[sky].parent(), Some(scene.root()));
        assert_eq!(scene[scene.root()].children(), &[sky, slab, floor]);
        assert_eq!(*scene[floor].content(), 3);
    }

    #[test]
    fn test_duplicate_and_unknown() {
        let (mut scene, [sky, ..]) = layered();
        assert_eq!(
            scene
                .add_volume(scene.root(), "slab", Boundary::unbounded(), 9)
                .unwrap_err(),
            SceneError::DuplicateName("slab".into())
        );

        let mut other: Scene<u32> = Scene::new("other", Boundary::unbounded(), 0);
        assert_eq!(
            other
                .add_volume(sky, "x", Boundary::unbounded(), 0)
                .unwrap_err(),
            SceneError::UnknownVolume
        );
    }

    #[test]
    fn test_locate() {
        let (scene, [sky, slab, floor]) = layered();
        assert_eq!(scene.locate(&Point3::new(0.0, 0.0, 2.0)), Some(sky));
        assert_eq!(scene.locate(&Point3::new(0.0, 0.0, 0.5)), Some(slab));
        assert_eq!(scene.locate(&Point3::new(0.0, 0.0, -3.0)), Some(floor));
    }

    #[test]
    fn test_locate_outside_root() {
        let scene = Scene::new("ball", Boundary::sphere(1.0).unwrap(), ());
        assert_eq!(scene.locate(&Point3::new(2.0, 0.0, 0.0)), None);
        assert_eq!(scene.locate(&Point3::origin()), Some(scene.root()));
    }

    #[test]
    fn test_transition_between_touching_layers() {
        let (scene, [sky, slab, _]) = layered();
        let t = scene.transition(sky, &Point3::new(0.0, 0.0, 1.0 - 1e-9));
        assert_eq!(t.exited, vec![sky]);
        assert_eq!(t.entered, vec![slab]);
        assert_eq!(t.destination, Some(slab));
        assert!(!t.escapes());
    }

    #[test]
    fn test_transition_escape() {
        let mut scene = Scene::new("outer", Boundary::sphere(10.0).unwrap(), ());
        let inner = scene
            .add_volume(scene.root(), "inner", Boundary::sphere(1.0).unwrap(), ())
            .unwrap();
        let t = scene.transition(inner, &Point3::new(20.0, 0.0, 0.0));
        assert_eq!(t.exited, vec![inner, scene.root()]);
        assert!(t.escapes());
    }

    #[test]
    fn test_closest_inner_volume_by_distance() {
        let mut scene = Scene::new("world", Boundary::unbounded(), ());
        let root = scene.root();
        let mut far = Boundary::sphere(1.0).unwrap();
        far.translate(&Vec3::new(0.0, 0.0, -10.0));
        let mut near = Boundary::sphere(1.0).unwrap();
        near.translate(&Vec3::new(0.0, 0.0, -4.0));
        scene.add_volume(root, "far", far, ()).unwrap();
        let near = scene.add_volume(root, "near", near, ()).unwrap();

        let (id, crossing) = scene
            .closest_inner_volume(root, &down(0.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(id, near);
        assert!((crossing.distance - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_intersection_prefers_children() {
        let mut scene = Scene::new("outer", Boundary::sphere(10.0).unwrap(), ());
        let root = scene.root();
        let inner = scene
            .add_volume(root, "inner", Boundary::sphere(1.0).unwrap(), ())
            .unwrap();

        let (id, c) = scene.intersection(root, &down(0.0, 0.0, 5.0)).unwrap();
        assert_eq!(id, inner);
        assert!((c.distance - 4.0).abs() < 1e-10);

        // Looking away from the child: the parent's own wall
        let up = Pose::looking_along(Point3::new(0.0, 0.0, 5.0), &Vec3::z());
        let (id, c) = scene.intersection(root, &up).unwrap();
        assert_eq!(id, root);
        assert!((c.distance - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_subtree_translate() {
        let mut scene = Scene::new("world", Boundary::unbounded(), ());
        let root = scene.root();
        let outer = scene
            .add_volume(root, "outer", Boundary::sphere(2.0).unwrap(), ())
            .unwrap();
        let inner = scene
            .add_volume(outer, "inner", Boundary::sphere(1.0).unwrap(), ())
            .unwrap();
        scene.translate(outer, &Vec3::new(100.0, 0.0, 0.0)).unwrap();
        assert_eq!(scene.locate(&Point3::new(100.5, 0.0, 0.0)), Some(inner));
        assert_eq!(scene.locate(&Point3::origin()), Some(root));
        assert_eq!(scene.descendants(outer).unwrap(), vec![outer, inner]);
    }

    #[test]
    fn test_clone_keeps_links() {
        let (scene, [_, slab, _]) = layered();
        let copy = scene.clone();
        drop(scene);
        assert_eq!(copy[slab].parent(), Some(copy.root()));
        assert_eq!(copy.locate(&Point3::new(0.0, 0.0, 0.5)), Some(slab));
    }
}
