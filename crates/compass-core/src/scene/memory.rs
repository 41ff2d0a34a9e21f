//! In-memory scene environment
//!
//! A small stand-in for a host editor: named scenes holding objects with
//! stable references, a viewpoint, a selection, and a dirty flag. Useful for
//! exercising navigation without a real editor attached.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use super::{NavigationError, SceneEnvironment, Selection};
use crate::models::{ObjectRef, Pose, SceneId};

/// An object living in a `MemoryEnvironment` scene
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryObject {
    pub name: String,
    pub parent: Option<ObjectRef>,
}

#[derive(Debug, Clone, Default)]
struct MemoryScene {
    label: String,
    objects: HashMap<ObjectRef, MemoryObject>,
}

/// Scene environment backed by plain collections
#[derive(Debug, Clone)]
pub struct MemoryEnvironment {
    scenes: BTreeMap<SceneId, MemoryScene>,
    current: SceneId,
    viewpoint: Option<Pose>,
    selected: Option<ObjectRef>,
    dirty: bool,
    save_count: usize,
}

impl MemoryEnvironment {
    /// Create an environment with one open, empty scene
    pub fn new(scene: impl Into<SceneId>, label: impl Into<String>) -> Self {
        let current = scene.into();
        let mut scenes = BTreeMap::new();
        scenes.insert(
            current.clone(),
            MemoryScene {
                label: label.into(),
                objects: HashMap::new(),
            },
        );
        Self {
            scenes,
            current,
            viewpoint: None,
            selected: None,
            dirty: false,
            save_count: 0,
        }
    }

    /// Register another (closed) scene
    pub fn add_scene(&mut self, scene: impl Into<SceneId>, label: impl Into<String>) {
        self.scenes.entry(scene.into()).or_default().label = label.into();
    }

    /// Delete a scene as if its file was removed
    pub fn remove_scene(&mut self, scene: &SceneId) -> bool {
        self.scenes.remove(scene).is_some()
    }

    /// Create an object in the current scene and return its reference
    pub fn spawn(&mut self, name: impl Into<String>) -> ObjectRef {
        let object_ref = ObjectRef::new(Uuid::new_v4().to_string());
        let object = MemoryObject {
            name: name.into(),
            parent: None,
        };
        if let Some(scene) = self.scenes.get_mut(&self.current) {
            scene.objects.insert(object_ref.clone(), object);
            self.dirty = true;
        }
        object_ref
    }

    pub fn rename(&mut self, object_ref: &ObjectRef, name: impl Into<String>) -> bool {
        match self.object_mut(object_ref) {
            Some(object) => {
                object.name = name.into();
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    pub fn reparent(&mut self, object_ref: &ObjectRef, parent: Option<ObjectRef>) -> bool {
        match self.object_mut(object_ref) {
            Some(object) => {
                object.parent = parent;
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Delete an object from the current scene
    pub fn remove(&mut self, object_ref: &ObjectRef) -> bool {
        let removed = self
            .scenes
            .get_mut(&self.current)
            .and_then(|scene| scene.objects.remove(object_ref))
            .is_some();
        if removed {
            if self.selected.as_ref() == Some(object_ref) {
                self.selected = None;
            }
            self.dirty = true;
        }
        removed
    }

    pub fn object(&self, object_ref: &ObjectRef) -> Option<&MemoryObject> {
        self.scenes
            .get(&self.current)
            .and_then(|scene| scene.objects.get(object_ref))
    }

    pub fn select(&mut self, object_ref: Option<ObjectRef>) {
        self.selected = object_ref;
    }

    pub fn selected(&self) -> Option<&ObjectRef> {
        self.selected.as_ref()
    }

    pub fn set_viewpoint(&mut self, pose: Option<Pose>) {
        self.viewpoint = pose;
    }

    pub fn viewpoint(&self) -> Option<Pose> {
        self.viewpoint
    }

    /// Number of times the open scenes were saved
    pub fn save_count(&self) -> usize {
        self.save_count
    }

    fn object_mut(&mut self, object_ref: &ObjectRef) -> Option<&mut MemoryObject> {
        self.scenes
            .get_mut(&self.current)
            .and_then(|scene| scene.objects.get_mut(object_ref))
    }
}

impl SceneEnvironment for MemoryEnvironment {
    type Handle = ObjectRef;

    fn current_scene_id(&self) -> SceneId {
        self.current.clone()
    }

    fn scene_label(&self, scene: &SceneId) -> Option<String> {
        self.scenes.get(scene).map(|s| s.label.clone())
    }

    fn selection(&self) -> Selection {
        if let Some(object_ref) = &self.selected {
            if let Some(object) = self.object(object_ref) {
                return Selection::Object {
                    object_ref: object_ref.clone(),
                    display_name: object.name.clone(),
                };
            }
        }
        match self.viewpoint {
            Some(pose) => Selection::Camera(pose),
            None => Selection::Nothing,
        }
    }

    fn resolve_object(&self, object_ref: &ObjectRef) -> Option<ObjectRef> {
        self.object(object_ref).map(|_| object_ref.clone())
    }

    fn open_scene(&mut self, scene: &SceneId) -> Result<(), NavigationError> {
        if !self.scenes.contains_key(scene) {
            return Err(NavigationError::SceneMissing(scene.clone()));
        }
        self.current = scene.clone();
        self.selected = None;
        self.dirty = false;
        Ok(())
    }

    fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn save_open_scenes(&mut self) -> Result<(), NavigationError> {
        self.dirty = false;
        self.save_count += 1;
        Ok(())
    }

    fn apply_pose(&mut self, pose: &Pose) {
        self.viewpoint = Some(*pose);
    }

    fn focus(&mut self, handle: &ObjectRef) {
        self.selected = Some(handle.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_rename_remove() {
        let mut env = MemoryEnvironment::new("s", "Scene");
        let id = env.spawn("Cube");
        assert_eq!(env.object(&id).unwrap().name, "Cube");

        assert!(env.rename(&id, "Box"));
        assert_eq!(env.object(&id).unwrap().name, "Box");
        assert!(env.resolve_object(&id).is_some());

        assert!(env.remove(&id));
        assert!(env.resolve_object(&id).is_none());
        assert!(!env.rename(&id, "Gone"));
    }

    #[test]
    fn test_selection_prefers_object() {
        let mut env = MemoryEnvironment::new("s", "Scene");
        assert_eq!(env.selection(), Selection::Nothing);

        env.set_viewpoint(Some(Pose::default()));
        assert_eq!(env.selection(), Selection::Camera(Pose::default()));

        let id = env.spawn("Cube");
        env.select(Some(id.clone()));
        assert!(matches!(env.selection(), Selection::Object { .. }));

        env.remove(&id);
        assert_eq!(env.selection(), Selection::Camera(Pose::default()));
    }

    #[test]
    fn test_objects_are_scoped_to_their_scene() {
        let mut env = MemoryEnvironment::new("a", "A");
        env.add_scene("b", "B");
        let id = env.spawn("Cube");

        env.open_scene(&SceneId::from("b")).unwrap();
        assert!(env.resolve_object(&id).is_none());

        env.open_scene(&SceneId::from("a")).unwrap();
        assert!(env.resolve_object(&id).is_some());
    }

    #[test]
    fn test_removed_scene_cannot_open() {
        let mut env = MemoryEnvironment::new("a", "A");
        env.add_scene("b", "B");
        assert!(env.remove_scene(&SceneId::from("b")));

        assert_eq!(
            env.open_scene(&SceneId::from("b")),
            Err(NavigationError::SceneMissing(SceneId::from("b")))
        );
        assert!(env.scene_label(&SceneId::from("b")).is_none());
    }
}
