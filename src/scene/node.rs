use glam::{Affine3A, Vec3};

use crate::animation::AnimationPlayer;
use crate::resources::Tags;
use crate::scene::NodeHandle;
use crate::scene::bounds::BoundingVolume;
use crate::scene::camera::Camera;
use crate::scene::light::Light;
use crate::scene::model::Model;
use crate::scene::path::Path;
use crate::scene::transform::Transform;

/// Payload carried by a node.
#[derive(Debug, Clone, Default)]
pub enum NodeKind {
    #[default]
    Empty,
    Model(Model),
    Camera(Camera),
    Light(Light),
    Path(Path),
    Bounds(BoundingVolume),
}

/// Payload discriminant, for filtering without borrowing the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Empty,
    Model,
    Camera,
    Light,
    Path,
    Bounds,
}

/// A scene node.
///
/// # Hierarchy
///
/// Nodes form a forest inside a [`SceneGraph`](crate::scene::SceneGraph):
/// - `parent`: handle of the parent node (`None` for roots)
/// - `children`: ordered child handles
///
/// Both links are maintained by the graph. They are read-only from outside so
/// that a node always appears in exactly one parent's child list.
///
/// # Transform
///
/// The [`Transform`] is read-only here as well; local changes go through the
/// graph so the dirty flag reaches the node's descendants.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    pub(crate) transform: Transform,

    pub visible: bool,
    pub tags: Tags,

    /// Set on nodes referenced as joints by some skin.
    pub is_bone: bool,
    /// Maps mesh space into this bone's space at bind time.
    pub inverse_bind_matrix: Affine3A,

    /// Local position the node had in the authoring tool before any
    /// constraint or animation was applied.
    pub original_local_position: Vec3,

    pub kind: NodeKind,
    pub animation_player: Option<AnimationPlayer>,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            visible: true,
            tags: Tags::new(),
            is_bone: false,
            inverse_bind_matrix: Affine3A::IDENTITY,
            original_local_position: Vec3::ZERO,
            kind: NodeKind::Empty,
            animation_player: None,
        }
    }

    #[must_use]
    pub fn with_kind(name: &str, kind: NodeKind) -> Self {
        Self {
            kind,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::Empty => NodeType::Empty,
            NodeKind::Model(_) => NodeType::Model,
            NodeKind::Camera(_) => NodeType::Camera,
            NodeKind::Light(_) => NodeType::Light,
            NodeKind::Path(_) => NodeType::Path,
            NodeKind::Bounds(_) => NodeType::Bounds,
        }
    }

    pub fn as_model(&self) -> Option<&Model> {
        match &self.kind {
            NodeKind::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_model_mut(&mut self) -> Option<&mut Model> {
        match &mut self.kind {
            NodeKind::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn as_camera(&self) -> Option<&Camera> {
        match &self.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn as_light(&self) -> Option<&Light> {
        match &self.kind {
            NodeKind::Light(light) => Some(light),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match &self.kind {
            NodeKind::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn as_bounds(&self) -> Option<&BoundingVolume> {
        match &self.kind {
            NodeKind::Bounds(bounds) => Some(bounds),
            _ => None,
        }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("Node")
    }
}
