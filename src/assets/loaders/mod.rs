//! Document importers.

mod extras;
pub mod gltf;

pub use self::gltf::GltfLoader;
