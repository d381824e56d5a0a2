#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Retained-mode 3D scene graph with skeletal animation and a glTF importer.
//!
//! Nodes live in a [`SceneGraph`] arena and are addressed by [`NodeHandle`].
//! World matrices are cached per node and recomputed lazily after local
//! edits. [`AnimationPlayer`]s write sampled poses into node transforms, and
//! [`GltfLoader`] builds a [`Library`] of scenes, meshes, materials and
//! animations from a document.

pub mod animation;
pub mod assets;
pub mod errors;
pub mod resources;
pub mod scene;

pub use animation::{Animation, AnimationPlayer, AnimationSystem, Binder, KeyframeTrack, LoopMode};
pub use assets::{GltfLoader, ImportOptions, Library};
pub use errors::{MythError, Result};
pub use resources::{Color, Material, Mesh, Tags};
pub use scene::{Camera, Light, Node, NodeHandle, Scene, SceneGraph, Transform};
