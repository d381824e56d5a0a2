use std::sync::Arc;

use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::resources::geometry::{BoundingBox, Vertex};
use crate::resources::material::Material;
use crate::resources::tags::Tags;

/// A run of triangles drawn with a single material.
#[derive(Debug, Clone)]
pub struct MeshPart {
    pub material: Option<Arc<Material>>,
    /// Flat triangle list: every three consecutive vertices form a triangle.
    pub vertices: Vec<Vertex>,
}

impl MeshPart {
    #[must_use]
    pub fn new(material: Option<Arc<Material>>) -> Self {
        Self {
            material,
            vertices: Vec::new(),
        }
    }

    /// Appends whole triangles. A trailing partial triangle is discarded.
    pub fn add_triangles<I: IntoIterator<Item = Vertex>>(&mut self, vertices: I) {
        self.vertices.extend(vertices);
        let whole = self.vertices.len() - self.vertices.len() % 3;
        if whole != self.vertices.len() {
            log::warn!(
                "Mesh part received {} trailing vertices that do not form a triangle",
                self.vertices.len() - whole
            );
            self.vertices.truncate(whole);
        }
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = &[Vertex]> {
        self.vertices.chunks_exact(3)
    }
}

/// Immutable-after-build geometry shared by reference across models.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub id: Uuid,
    pub name: String,
    pub parts: Vec<MeshPart>,
    /// Vertex-color channel name to channel index.
    pub vertex_color_channels: FxHashMap<String, usize>,
    /// Bounds of every vertex of every part, in mesh space.
    pub dimensions: BoundingBox,
    pub tags: Tags,
}

impl Mesh {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            parts: Vec::new(),
            vertex_color_channels: FxHashMap::default(),
            dimensions: BoundingBox::EMPTY,
            tags: Tags::new(),
        }
    }

    /// Adds an empty part bound to `material` and returns it for filling.
    pub fn add_part(&mut self, material: Option<Arc<Material>>) -> &mut MeshPart {
        self.parts.push(MeshPart::new(material));
        let last = self.parts.len() - 1;
        &mut self.parts[last]
    }

    /// Recomputes [`Mesh::dimensions`] from the current vertices.
    pub fn update_bounds(&mut self) {
        self.dimensions = BoundingBox::from_points(
            self.parts
                .iter()
                .flat_map(|p| p.vertices.iter().map(|v| v.position)),
        )
        .unwrap_or(BoundingBox::EMPTY);
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(MeshPart::triangle_count).sum()
    }

    /// Every vertex of every part, in part order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.parts.iter().flat_map(|p| p.vertices.iter())
    }

    pub fn vertex_color_channel(&self, name: &str) -> Option<usize> {
        self.vertex_color_channels.get(name).copied()
    }
}
