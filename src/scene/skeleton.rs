use glam::{Affine3A, Vec3};

use crate::resources::Vertex;
use crate::scene::NodeHandle;
use crate::scene::graph::SceneGraph;

/// Binding of a model to a set of bone nodes.
///
/// `joints[i]` is the node a vertex refers to with joint index `i`. The
/// inverse bind matrix lives on each bone node, so two skins sharing a bone
/// also share its bind pose.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Skin {
    pub joints: Vec<NodeHandle>,
    /// Topmost ancestor of the skeleton. Computed from the first joint by
    /// walking up while the parent is still a bone.
    pub root: Option<NodeHandle>,
}

impl Skin {
    #[must_use]
    pub fn new(joints: Vec<NodeHandle>) -> Self {
        Self { joints, root: None }
    }
}

impl SceneGraph {
    /// Walks upward from `joint` while the current node is a bone and has a
    /// parent. The node where the walk stops is the skin root.
    pub fn find_skin_root(&self, joint: NodeHandle) -> Option<NodeHandle> {
        let mut current = joint;
        loop {
            let node = self.get_node(current)?;
            match node.parent {
                Some(parent) if node.is_bone => current = parent,
                _ => return Some(current),
            }
        }
    }

    /// Per-joint skinning matrices for the model at `model`:
    /// `bone.world * bone.inverse_bind`.
    ///
    /// Returns `None` when the node is not a skinned model. Joints whose node
    /// was removed fall back to identity.
    pub fn skin_matrices(&self, model: NodeHandle) -> Option<Vec<Affine3A>> {
        let skin = self.get_node(model)?.as_model()?.skin()?;
        Some(
            skin.joints
                .iter()
                .map(|&joint| match self.get_node(joint) {
                    Some(bone) => {
                        self.world_matrix(joint).unwrap_or(Affine3A::IDENTITY)
                            * bone.inverse_bind_matrix
                    }
                    None => Affine3A::IDENTITY,
                })
                .collect(),
        )
    }

    /// World-space (for skinned models: skeleton-space) position of every
    /// vertex of the model's mesh, in mesh vertex order.
    ///
    /// Unskinned models are transformed by the node's world matrix.
    pub fn deformed_positions(&self, model: NodeHandle) -> Option<Vec<Vec3>> {
        let node = self.get_node(model)?;
        let mesh = &node.as_model()?.mesh;

        match self.skin_matrices(model) {
            Some(matrices) => Some(mesh.vertices().map(|v| skin_vertex(v, &matrices)).collect()),
            None => {
                let world = self.world_matrix(model)?;
                Some(mesh.vertices().map(|v| world.transform_point3(v.position)).collect())
            }
        }
    }
}

/// Linear blend skinning of a single vertex: `sum(w_i * M_i * p)`.
///
/// A vertex without influences is returned unchanged. Joint indices past the
/// end of `matrices` are ignored.
pub fn skin_vertex(vertex: &Vertex, matrices: &[Affine3A]) -> Vec3 {
    if vertex.bones.is_empty() {
        return vertex.position;
    }

    vertex
        .bones
        .iter()
        .filter_map(|&(joint, weight)| {
            matrices
                .get(usize::from(joint))
                .map(|m| m.transform_point3(vertex.position) * weight)
        })
        .sum()
}
