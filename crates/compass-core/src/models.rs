//! Data models for Scene Compass
//!
//! Defines the bookmark record and the small geometry types it carries.
//! A bookmark is either a saved camera viewpoint or a reference to an object
//! that lives in a scene.

use serde::{Deserialize, Serialize};

/// Group every record falls back to when none is given
pub const DEFAULT_GROUP: &str = "Default";

/// Name given to camera captures when the caller leaves the name blank
pub const DEFAULT_CAMERA_NAME: &str = "Camera View";

/// Name given to object references created without a live display name
pub const DEFAULT_OBJECT_NAME: &str = "Object";

/// A point or direction in scene space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Euclidean distance to another point
    pub fn distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Round each coordinate to the nearest whole unit, ties to even
    pub fn rounded(&self) -> Vec3 {
        Vec3::new(
            self.x.round_ties_even(),
            self.y.round_ties_even(),
            self.z.round_ties_even(),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Orientation quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A camera position and orientation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// JSON has no NaN or infinity, so only finite poses can be stored
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.rotation.is_finite()
    }

    /// Replace non-finite coordinates with zero and a non-finite rotation
    /// with identity
    pub fn sanitized(&self) -> Pose {
        let finite_or_zero = |v: f32| if v.is_finite() { v } else { 0.0 };
        let position = Vec3::new(
            finite_or_zero(self.position.x),
            finite_or_zero(self.position.y),
            finite_or_zero(self.position.z),
        );
        let rotation = if self.rotation.is_finite() {
            self.rotation
        } else {
            Quat::IDENTITY
        };
        Pose::new(position, rotation)
    }
}

/// Stable identifier of a scene, independent of where its file lives
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SceneId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for SceneId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Stable identifier of an object that survives renames and reparenting
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectRef(pub String);

impl ObjectRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ObjectRef {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What a bookmark points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BookmarkKind {
    CameraView,
    ObjectReference,
}

impl std::fmt::Display for BookmarkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookmarkKind::CameraView => write!(f, "camera"),
            BookmarkKind::ObjectReference => write!(f, "object"),
        }
    }
}

/// A saved viewpoint or object reference
///
/// Only the fields belonging to `kind` carry data: camera views leave
/// `object_ref` empty, object references keep a zero position and identity
/// rotation. Use the constructors to keep that true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub kind: BookmarkKind,
    pub name: String,
    #[serde(default = "default_group")]
    pub group: String,
    pub scene_id: SceneId,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Quat,
    #[serde(default)]
    pub object_ref: ObjectRef,
}

impl Bookmark {
    /// Create a camera view bookmark
    ///
    /// A blank name becomes "Camera View"; a blank group becomes "Default".
    /// Non-finite pose components are replaced (see `Pose::sanitized`).
    pub fn camera_view(
        name: impl Into<String>,
        group: impl Into<String>,
        scene_id: SceneId,
        pose: Pose,
    ) -> Self {
        Self {
            kind: BookmarkKind::CameraView,
            name: name_or(name.into(), DEFAULT_CAMERA_NAME),
            group: normalize_group(group.into()),
            scene_id,
            position: pose.sanitized().position,
            rotation: pose.sanitized().rotation,
            object_ref: ObjectRef::default(),
        }
    }

    /// Create an object reference bookmark
    ///
    /// A blank name becomes "Object"; captures from a live selection pass the
    /// object's display name instead.
    pub fn object_reference(
        name: impl Into<String>,
        group: impl Into<String>,
        scene_id: SceneId,
        object_ref: ObjectRef,
    ) -> Self {
        Self {
            kind: BookmarkKind::ObjectReference,
            name: name_or(name.into(), DEFAULT_OBJECT_NAME),
            group: normalize_group(group.into()),
            scene_id,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            object_ref,
        }
    }

    /// The stored camera pose
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.rotation)
    }

    pub fn is_camera(&self) -> bool {
        self.kind == BookmarkKind::CameraView
    }

    /// Restore the record invariants on data that bypassed the constructors
    ///
    /// Blank names and groups get their defaults, the fields of the other
    /// kind are cleared, and a non-finite pose is sanitized.
    pub fn repaired(self) -> Bookmark {
        match self.kind {
            BookmarkKind::CameraView => {
                let pose = self.pose();
                Bookmark::camera_view(self.name, self.group, self.scene_id, pose)
            }
            BookmarkKind::ObjectReference => {
                Bookmark::object_reference(self.name, self.group, self.scene_id, self.object_ref)
            }
        }
    }

    /// De-duplication key used when merging foreign record sets
    pub fn merge_key(&self) -> (&str, &str) {
        (&self.name, &self.group)
    }

    /// Case-insensitive substring match on name or group
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.group.to_lowercase().contains(needle)
    }
}

/// Map an empty group name to the default group
pub fn normalize_group(group: String) -> String {
    if group.is_empty() {
        DEFAULT_GROUP.to_string()
    } else {
        group
    }
}

fn name_or(name: String, fallback: &str) -> String {
    if name.trim().is_empty() {
        fallback.to_string()
    } else {
        name
    }
}

fn default_group() -> String {
    DEFAULT_GROUP.to_string()
}
