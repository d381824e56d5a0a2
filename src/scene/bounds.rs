use std::sync::Arc;

use glam::Vec3;

use crate::resources::Mesh;

/// Collision volume attached to a node, in the node's local space.
#[derive(Debug, Clone)]
pub enum BoundingVolume {
    Aabb { size: Vec3 },
    Capsule { height: f32, radius: f32 },
    Sphere { radius: f32 },
    /// Exact triangle soup of a mesh.
    Triangles { mesh: Arc<Mesh> },
}

impl BoundingVolume {
    /// Name used for the helper node holding this volume.
    pub fn node_name(&self) -> &'static str {
        match self {
            BoundingVolume::Aabb { .. } => "_bounding aabb",
            BoundingVolume::Capsule { .. } => "_bounding capsule",
            BoundingVolume::Sphere { .. } => "_bounding sphere",
            BoundingVolume::Triangles { .. } => "_bounding triangles",
        }
    }

    /// Radius of the smallest sphere around the origin containing the volume.
    pub fn radius(&self) -> f32 {
        match self {
            BoundingVolume::Aabb { size } => (*size * 0.5).length(),
            BoundingVolume::Capsule { height, radius } => (height * 0.5).max(*radius),
            BoundingVolume::Sphere { radius } => *radius,
            BoundingVolume::Triangles { mesh } => {
                let d = mesh.dimensions;
                d.min.abs().max(d.max.abs()).length()
            }
        }
    }
}
