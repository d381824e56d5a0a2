use glam::{Affine3A, Vec2, Vec3};
use smallvec::SmallVec;

use crate::resources::color::Color;

// ============================================================================
// Vertex
// ============================================================================

/// Per-vertex bone influences: `(joint index, weight)` pairs.
///
/// Only entries with a weight above zero are stored. The joint index refers
/// to the joint list of the skin the owning model is bound to.
pub type BoneWeights = SmallVec<[(u16, f32); 4]>;

/// A single vertex of a triangle list.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: Vec2,
    pub normal: Vec3,
    /// One entry per vertex-color channel, in channel order.
    pub colors: SmallVec<[Color; 1]>,
    pub bones: BoneWeights,
}

impl Vertex {
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            uv: Vec2::ZERO,
            normal: Vec3::ZERO,
            colors: SmallVec::new(),
            bones: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_uv(mut self, uv: Vec2) -> Self {
        self.uv = uv;
        self
    }

    #[must_use]
    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = normal;
        self
    }

    /// Adds a bone influence. Non-positive weights are dropped.
    pub fn push_bone(&mut self, joint: u16, weight: f32) {
        if weight > 0.0 {
            self.bones.push((joint, weight));
        }
    }
}

// ============================================================================
// Bounding Volumes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl BoundingBox {
    pub const EMPTY: BoundingBox = BoundingBox {
        min: Vec3::ZERO,
        max: Vec3::ZERO,
    };

    /// Computes the tightest box around `points`, or `None` when empty.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 { (self.min + self.max) * 0.5 }
    pub fn size(&self) -> Vec3 { self.max - self.min }
    pub fn width(&self) -> f32 { self.max.x - self.min.x }
    pub fn height(&self) -> f32 { self.max.y - self.min.y }
    pub fn depth(&self) -> f32 { self.max.z - self.min.z }

    /// Largest extent over the three axes.
    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Scales both corners component-wise.
    #[must_use]
    pub fn scaled(&self, scale: Vec3) -> Self {
        Self {
            min: self.min * scale,
            max: self.max * scale,
        }
    }

    pub fn transform(&self, matrix: &Affine3A) -> Self {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];

        let mut new_min = Vec3::splat(f32::INFINITY);
        let mut new_max = Vec3::splat(f32::NEG_INFINITY);

        for point in corners {
            let transformed = matrix.transform_point3(point);
            new_min = new_min.min(transformed);
            new_max = new_max.max(transformed);
        }

        Self { min: new_min, max: new_max }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::EMPTY
    }
}
