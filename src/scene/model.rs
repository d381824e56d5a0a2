use std::sync::Arc;

use crate::resources::{BoundingBox, Mesh};
use crate::scene::NodeHandle;
use crate::scene::skeleton::Skin;

/// A node payload that draws a shared [`Mesh`].
///
/// The mesh is shared by reference; cloning a model (or the node holding it)
/// never copies vertex data. The skin, on the other hand, is owned: each clone
/// carries its own joint list so re-pointing a clone's bones does not affect
/// the source skeleton.
#[derive(Debug, Clone)]
pub struct Model {
    pub mesh: Arc<Mesh>,
    pub(crate) skin: Option<Skin>,
}

impl Model {
    #[must_use]
    pub fn new(mesh: Arc<Mesh>) -> Self {
        Self { mesh, skin: None }
    }

    #[inline]
    pub fn is_skinned(&self) -> bool {
        self.skin.is_some()
    }

    #[inline]
    pub fn skin(&self) -> Option<&Skin> {
        self.skin.as_ref()
    }

    pub fn set_skin(&mut self, skin: Option<Skin>) {
        self.skin = skin;
    }

    /// Topmost node of the skeleton driving this model, if skinned.
    pub fn skin_root(&self) -> Option<NodeHandle> {
        self.skin.as_ref().and_then(|s| s.root)
    }

    /// Re-points joint `index` at another node. Returns `false` when the model
    /// is unskinned or the index is out of range.
    pub fn set_joint(&mut self, index: usize, bone: NodeHandle) -> bool {
        match self.skin.as_mut().and_then(|s| s.joints.get_mut(index)) {
            Some(slot) => {
                *slot = bone;
                true
            }
            None => false,
        }
    }

    /// Mesh-space bounds of the shared mesh.
    #[inline]
    pub fn dimensions(&self) -> BoundingBox {
        self.mesh.dimensions
    }
}
