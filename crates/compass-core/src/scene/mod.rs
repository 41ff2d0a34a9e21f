//! Scene resolution and navigation
//!
//! The store only holds data. Turning a bookmark back into something live
//! (moving the viewpoint, selecting an object, opening another scene) goes
//! through a `SceneEnvironment` implemented by the host editor, and the
//! prompts that guard a scene switch go through a `NavigationPolicy`.
//!
//! `Navigator` ties the two together:
//!
//! ```ignore
//! let mut nav = Navigator::new(&mut env);
//! match nav.go_to(&bookmark, &mut policy) {
//!     Ok(Arrival::Declined) => {}
//!     Ok(_) => {}
//!     Err(NavigationError::ObjectMissing { .. }) => show_not_found(),
//!     Err(e) => show_error(e),
//! }
//! ```

pub mod memory;

use thiserror::Error;
use tracing::debug;

use crate::models::{Bookmark, BookmarkKind, ObjectRef, Pose, SceneId};

pub use memory::{MemoryEnvironment, MemoryObject};

/// Failures surfaced to the user when resolving a bookmark
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    #[error("Scene '{0}' could not be found. It may have been moved or deleted.")]
    SceneMissing(SceneId),

    #[error("The bookmarked object could not be found in scene '{scene}'.")]
    ObjectMissing { scene: SceneId, object_ref: ObjectRef },

    #[error("Nothing is selected and there is no viewpoint to capture.")]
    NothingSelected,

    #[error("Failed to save open scenes: {0}")]
    SaveFailed(String),
}

/// What the host currently has selected
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// No object selected and no viewpoint available
    Nothing,
    /// No object selected; the current viewpoint
    Camera(Pose),
    /// A live object
    Object {
        object_ref: ObjectRef,
        display_name: String,
    },
}

/// The live editor a bookmark is resolved against
pub trait SceneEnvironment {
    /// Live handle on a resolved object
    type Handle: Clone;

    /// Scene that is open right now
    fn current_scene_id(&self) -> SceneId;

    /// Human-readable name of a scene, `None` if it no longer exists
    fn scene_label(&self, scene: &SceneId) -> Option<String>;

    fn selection(&self) -> Selection;

    /// Find an object in the current scene
    ///
    /// Must keep working after the object was renamed or reparented and
    /// return `None` once it was deleted.
    fn resolve_object(&self, object_ref: &ObjectRef) -> Option<Self::Handle>;

    /// Make `scene` the current scene
    fn open_scene(&mut self, scene: &SceneId) -> Result<(), NavigationError>;

    /// Whether the current scene has unsaved changes
    fn is_dirty(&self) -> bool;

    fn save_open_scenes(&mut self) -> Result<(), NavigationError>;

    /// Move the viewpoint
    fn apply_pose(&mut self, pose: &Pose);

    /// Select an object and frame it
    fn focus(&mut self, handle: &Self::Handle);
}

/// Caller-side confirmation before leaving the current scene
pub trait NavigationPolicy {
    /// Ask whether to open the scene named `scene_label`
    fn confirm_scene_switch(&mut self, scene_label: &str) -> bool;

    /// Ask whether to save the dirty current scene and continue
    fn confirm_save_before_switch(&mut self) -> bool;
}

/// Policy that agrees to everything
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl NavigationPolicy for AlwaysConfirm {
    fn confirm_scene_switch(&mut self, _scene_label: &str) -> bool {
        true
    }

    fn confirm_save_before_switch(&mut self) -> bool {
        true
    }
}

/// Policy that never leaves the current scene
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl NavigationPolicy for NeverConfirm {
    fn confirm_scene_switch(&mut self, _scene_label: &str) -> bool {
        false
    }

    fn confirm_save_before_switch(&mut self) -> bool {
        false
    }
}

/// A bookmark resolved in the current scene
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<H> {
    Viewpoint(Pose),
    Object(H),
}

/// Result of `Navigator::go_to`
#[derive(Debug, Clone, PartialEq)]
pub enum Arrival<H> {
    /// The viewpoint was moved to the stored pose
    Viewpoint(Pose),
    /// The object was selected and framed
    Object(H),
    /// The user declined to leave the current scene
    Declined,
}

/// Resolves bookmarks against a live environment
pub struct Navigator<'a, E: SceneEnvironment> {
    env: &'a mut E,
}

impl<'a, E: SceneEnvironment> Navigator<'a, E> {
    pub fn new(env: &'a mut E) -> Self {
        Self { env }
    }

    /// Build a bookmark from the live selection in the current scene
    ///
    /// A blank `name` is replaced by "Camera View" for viewpoints and by the
    /// object's display name for objects. A viewpoint with NaN or infinite
    /// components is sanitized rather than stored.
    pub fn capture(&self, name: &str, group: &str) -> Result<Bookmark, NavigationError> {
        let scene = self.env.current_scene_id();
        match self.env.selection() {
            Selection::Nothing => Err(NavigationError::NothingSelected),
            Selection::Camera(pose) => Ok(Bookmark::camera_view(name, group, scene, pose)),
            Selection::Object {
                object_ref,
                display_name,
            } => {
                let name = if name.trim().is_empty() {
                    display_name.as_str()
                } else {
                    name
                };
                Ok(Bookmark::object_reference(name, group, scene, object_ref))
            }
        }
    }

    /// Resolve a bookmark in the current scene without side effects
    pub fn resolve(&self, bookmark: &Bookmark) -> Result<Resolved<E::Handle>, NavigationError> {
        match bookmark.kind {
            BookmarkKind::CameraView => Ok(Resolved::Viewpoint(bookmark.pose())),
            BookmarkKind::ObjectReference => self
                .env
                .resolve_object(&bookmark.object_ref)
                .map(Resolved::Object)
                .ok_or_else(|| NavigationError::ObjectMissing {
                    scene: bookmark.scene_id.clone(),
                    object_ref: bookmark.object_ref.clone(),
                }),
        }
    }

    /// Navigate to a bookmark, switching scenes if needed
    ///
    /// Leaving the current scene asks `policy` first, and asks again before
    /// saving a dirty scene. Declining either prompt returns
    /// `Arrival::Declined` with nothing changed.
    pub fn go_to<P: NavigationPolicy>(
        &mut self,
        bookmark: &Bookmark,
        policy: &mut P,
    ) -> Result<Arrival<E::Handle>, NavigationError> {
        if bookmark.scene_id != self.env.current_scene_id() {
            let Some(label) = self.env.scene_label(&bookmark.scene_id) else {
                return Err(NavigationError::SceneMissing(bookmark.scene_id.clone()));
            };
            if !policy.confirm_scene_switch(&label) {
                return Ok(Arrival::Declined);
            }
            if self.env.is_dirty() {
                if !policy.confirm_save_before_switch() {
                    return Ok(Arrival::Declined);
                }
                self.env.save_open_scenes()?;
            }
            debug!("Opening scene '{}' for bookmark '{}'", label, bookmark.name);
            self.env.open_scene(&bookmark.scene_id)?;
        }

        match self.resolve(bookmark)? {
            Resolved::Viewpoint(pose) => {
                self.env.apply_pose(&pose);
                Ok(Arrival::Viewpoint(pose))
            }
            Resolved::Object(handle) => {
                self.env.focus(&handle);
                Ok(Arrival::Object(handle))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Quat, Vec3};
    use crate::store::BookmarkStore;
    use tempfile::TempDir;

    /// Records every prompt it was shown
    #[derive(Default)]
    struct ScriptedPolicy {
        switch: bool,
        save: bool,
        asked: Vec<String>,
    }

    impl NavigationPolicy for ScriptedPolicy {
        fn confirm_scene_switch(&mut self, scene_label: &str) -> bool {
            self.asked.push(format!("switch:{}", scene_label));
            self.switch
        }

        fn confirm_save_before_switch(&mut self) -> bool {
            self.asked.push("save".to_string());
            self.save
        }
    }

    fn pose() -> Pose {
        Pose::new(Vec3::new(10.0, 4.5, -2.0), Quat::new(0.1, 0.2, 0.3, 0.9))
    }

    fn env() -> MemoryEnvironment {
        let mut env = MemoryEnvironment::new("scene-a", "Arena");
        env.add_scene("scene-b", "Bazaar");
        env
    }

    #[test]
    fn test_go_to_camera_in_current_scene() {
        let mut env = env();
        let bm = Bookmark::camera_view("View", "G", SceneId::from("scene-a"), pose());

        let arrival = Navigator::new(&mut env)
            .go_to(&bm, &mut NeverConfirm)
            .unwrap();
        assert_eq!(arrival, Arrival::Viewpoint(pose()));
        assert_eq!(env.viewpoint(), Some(pose()));
    }

    #[test]
    fn test_go_to_deleted_object_reports_missing() {
        let temp_dir = TempDir::new().unwrap();
        let mut env = env();
        let lamp = env.spawn("Lamp");
        env.select(Some(lamp.clone()));

        let mut store = BookmarkStore::open_at(temp_dir.path().join("bookmarks.json"));
        let bm = Navigator::new(&mut env).capture("", "Props").unwrap();
        store.add(bm.clone());
        let before = store.snapshot();

        assert!(env.remove(&lamp));
        let err = Navigator::new(&mut env)
            .go_to(&bm, &mut AlwaysConfirm)
            .unwrap_err();
        assert_eq!(
            err,
            NavigationError::ObjectMissing {
                scene: SceneId::from("scene-a"),
                object_ref: lamp,
            }
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_object_survives_rename_and_reparent() {
        let mut env = env();
        let parent = env.spawn("Room");
        let lamp = env.spawn("Lamp");
        let bm = Bookmark::object_reference(
            "Lamp",
            "G",
            SceneId::from("scene-a"),
            lamp.clone(),
        );

        env.rename(&lamp, "Desk Lamp");
        env.reparent(&lamp, Some(parent));
        env.select(None);

        let arrival = Navigator::new(&mut env)
            .go_to(&bm, &mut NeverConfirm)
            .unwrap();
        assert_eq!(arrival, Arrival::Object(lamp.clone()));
        assert_eq!(env.selected(), Some(&lamp));
    }

    #[test]
    fn test_go_to_other_scene_switches_after_confirmation() {
        let mut env = env();
        let bm = Bookmark::camera_view("Market", "G", SceneId::from("scene-b"), pose());
        let mut policy = ScriptedPolicy {
            switch: true,
            save: true,
            ..Default::default()
        };

        let arrival = Navigator::new(&mut env).go_to(&bm, &mut policy).unwrap();
        assert_eq!(arrival, Arrival::Viewpoint(pose()));
        assert_eq!(env.current_scene_id(), SceneId::from("scene-b"));
        assert_eq!(policy.asked, vec!["switch:Bazaar"]);
    }

    #[test]
    fn test_go_to_other_scene_declined() {
        let mut env = env();
        let bm = Bookmark::camera_view("Market", "G", SceneId::from("scene-b"), pose());

        let arrival = Navigator::new(&mut env)
            .go_to(&bm, &mut NeverConfirm)
            .unwrap();
        assert_eq!(arrival, Arrival::Declined);
        assert_eq!(env.current_scene_id(), SceneId::from("scene-a"));
        assert_eq!(env.viewpoint(), None);
    }

    #[test]
    fn test_dirty_scene_is_saved_before_switch() {
        let mut env = env();
        env.spawn("Crate");
        assert!(env.is_dirty());
        let bm = Bookmark::camera_view("Market", "G", SceneId::from("scene-b"), pose());
        let mut policy = ScriptedPolicy {
            switch: true,
            save: true,
            ..Default::default()
        };

        Navigator::new(&mut env).go_to(&bm, &mut policy).unwrap();
        assert_eq!(policy.asked, vec!["switch:Bazaar", "save"]);
        assert_eq!(env.save_count(), 1);
        assert_eq!(env.current_scene_id(), SceneId::from("scene-b"));
    }

    #[test]
    fn test_dirty_scene_cancel_stays() {
        let mut env = env();
        env.spawn("Crate");
        let bm = Bookmark::camera_view("Market", "G", SceneId::from("scene-b"), pose());
        let mut policy = ScriptedPolicy {
            switch: true,
            save: false,
            ..Default::default()
        };

        let arrival = Navigator::new(&mut env).go_to(&bm, &mut policy).unwrap();
        assert_eq!(arrival, Arrival::Declined);
        assert_eq!(env.save_count(), 0);
        assert_eq!(env.current_scene_id(), SceneId::from("scene-a"));
    }

    #[test]
    fn test_go_to_missing_scene() {
        let mut env = env();
        let bm = Bookmark::camera_view("Lost", "G", SceneId::from("scene-z"), pose());
        let mut policy = ScriptedPolicy::default();

        let err = Navigator::new(&mut env).go_to(&bm, &mut policy).unwrap_err();
        assert_eq!(err, NavigationError::SceneMissing(SceneId::from("scene-z")));
        assert!(policy.asked.is_empty());
    }

    #[test]
    fn test_object_in_other_scene_resolves_after_switch() {
        let mut env = env();
        env.open_scene(&SceneId::from("scene-b")).unwrap();
        let stall = env.spawn("Stall");
        env.save_open_scenes().unwrap();
        env.open_scene(&SceneId::from("scene-a")).unwrap();

        let bm = Bookmark::object_reference("Stall", "G", SceneId::from("scene-b"), stall.clone());
        assert!(Navigator::new(&mut env).resolve(&bm).is_err());

        let arrival = Navigator::new(&mut env)
            .go_to(&bm, &mut AlwaysConfirm)
            .unwrap();
        assert_eq!(arrival, Arrival::Object(stall));
    }

    #[test]
    fn test_capture_camera_default_name() {
        let mut env = env();
        env.set_viewpoint(Some(pose()));

        let bm = Navigator::new(&mut env).capture("", "Views").unwrap();
        assert_eq!(bm.kind, BookmarkKind::CameraView);
        assert_eq!(bm.name, "Camera View");
        assert_eq!(bm.group, "Views");
        assert_eq!(bm.scene_id, SceneId::from("scene-a"));
        assert_eq!(bm.pose(), pose());
    }

    #[test]
    fn test_capture_object_uses_display_name() {
        let mut env = env();
        let statue = env.spawn("Statue");
        env.select(Some(statue.clone()));

        let nav = Navigator::new(&mut env);
        let bm = nav.capture("", "").unwrap();
        assert_eq!(bm.kind, BookmarkKind::ObjectReference);
        assert_eq!(bm.name, "Statue");
        assert_eq!(bm.group, "Default");
        assert_eq!(bm.object_ref, statue);

        let named = nav.capture("Landmark", "").unwrap();
        assert_eq!(named.name, "Landmark");
    }

    #[test]
    fn test_capture_nothing_selected() {
        let mut env = env();
        let err = Navigator::new(&mut env).capture("", "").unwrap_err();
        assert_eq!(err, NavigationError::NothingSelected);
    }

    #[test]
    fn test_capture_never_yields_non_finite_pose() {
        let mut env = env();
        env.set_viewpoint(Some(Pose::new(
            Vec3::new(1.0, f32::NAN, f32::NEG_INFINITY),
            Quat::new(f32::NAN, 0.0, 0.0, 1.0),
        )));

        let bm = Navigator::new(&mut env).capture("", "").unwrap();
        assert!(bm.pose().is_finite());
        assert_eq!(bm.position, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(bm.rotation, Quat::IDENTITY);
    }
}
