//! Scene graph module
//!
//! Manages the node hierarchy and the per-node payloads:
//! - Node: a scene node (parent/child links, transform, payload)
//! - Transform: local TRS with cached local and world matrices
//! - SceneGraph: the node arena that owns every node of a library
//! - Scene: a named root inside the arena plus its environment
//! - Camera / Light / Path / BoundingVolume / Model: node payloads
//! - transform_system: dirty propagation and lazy world-matrix resolution

pub mod bounds;
pub mod camera;
pub mod clone;
pub mod environment;
pub mod graph;
pub mod light;
pub mod model;
pub mod node;
pub mod path;
pub mod scene;
pub mod skeleton;
pub mod transform;
pub mod transform_system;

pub use bounds::BoundingVolume;
pub use camera::{Camera, ProjectionType};
pub use environment::{Environment, FogMode};
pub use graph::{ChildrenRecursive, SceneGraph};
pub use light::{Light, LightKind, PointLight};
pub use model::Model;
pub use node::{Node, NodeKind, NodeType};
pub use path::Path;
pub use scene::Scene;
pub use skeleton::Skin;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    /// Stable handle to a node inside a [`SceneGraph`].
    pub struct NodeHandle;
}
