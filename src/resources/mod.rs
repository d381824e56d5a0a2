//! Shared resources: meshes, materials, colors and tag metadata.
//!
//! Resources are built once (usually by the importer) and then shared by
//! reference: a [`Mesh`] is held through `Arc` by any number of model nodes,
//! including clones.

pub mod color;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod tags;

pub use color::Color;
pub use geometry::{BoneWeights, BoundingBox, Vertex};
pub use material::{BillboardMode, CompositeMode, Material, TextureSource, TransparencyMode};
pub use mesh::{Mesh, MeshPart};
pub use tags::{Property, Tags};
