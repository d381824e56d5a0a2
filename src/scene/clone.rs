//! Subtree cloning
//!
//! Cloning runs in two passes. The first copies every node of the subtree
//! into the destination arena and records an old-handle to new-handle map.
//! The second rewrites each copy's cross references (skin joints, skin root,
//! animation bindings) through that map, so a cloned character drives its own
//! cloned bones instead of the source skeleton.
//!
//! Meshes and materials are held through `Arc` and stay shared.

use rustc_hash::FxHashMap;

use crate::errors::{MythError, Result};
use crate::scene::NodeHandle;
use crate::scene::graph::SceneGraph;
use crate::scene::node::{Node, NodeKind};

/// What to do with a reference that points outside the cloned subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExternalRefs {
    /// Same arena: the original node is still valid, keep pointing at it.
    Keep,
    /// Other arena: the handle would be meaningless here, drop it.
    Drop,
}

pub(crate) type HandleMap = FxHashMap<NodeHandle, NodeHandle>;

/// Resolves `old` through `map` under the given policy.
pub(crate) fn remap_handle(
    map: &HandleMap,
    old: NodeHandle,
    policy: ExternalRefs,
) -> Option<NodeHandle> {
    match map.get(&old) {
        Some(&new) => Some(new),
        None if policy == ExternalRefs::Keep => Some(old),
        None => None,
    }
}

impl SceneGraph {
    /// Deep-copies the subtree under `root` within this graph.
    ///
    /// The copy is returned detached; attach it wherever it should live.
    /// References from the subtree to nodes outside of it keep pointing at
    /// those nodes.
    pub fn clone_subtree(&mut self, root: NodeHandle) -> Result<NodeHandle> {
        let copies = copy_subtree(self, root)?;
        Ok(self.insert_copies(copies, ExternalRefs::Keep))
    }

    /// Deep-copies the subtree under `root` of another graph into this one.
    ///
    /// References that leave the copied subtree cannot be carried over: a
    /// skin using such a joint is removed and such animation bindings are
    /// dropped.
    pub fn clone_subtree_from(&mut self, source: &SceneGraph, root: NodeHandle) -> Result<NodeHandle> {
        let copies = copy_subtree(source, root)?;
        Ok(self.insert_copies(copies, ExternalRefs::Drop))
    }

    fn insert_copies(&mut self, copies: Vec<(NodeHandle, Node)>, policy: ExternalRefs) -> NodeHandle {
        // Pass 1: structural copy.
        let mut map = HandleMap::with_capacity_and_hasher(copies.len(), Default::default());
        let mut inserted = Vec::with_capacity(copies.len());

        for (old, node) in copies {
            node.transform.mark_world_dirty();
            let new = self.nodes.insert(node);
            map.insert(old, new);
            inserted.push(new);
        }

        // The first copy is the subtree root; it comes back detached.
        for (i, &new) in inserted.iter().enumerate() {
            let node = &mut self.nodes[new];
            node.parent = if i == 0 {
                None
            } else {
                node.parent.and_then(|p| map.get(&p).copied())
            };
            for child in &mut node.children {
                if let Some(&mapped) = map.get(child) {
                    *child = mapped;
                }
            }
        }

        // Pass 2: cross references.
        let clone_root = inserted[0];
        for &new in &inserted {
            let node = &mut self.nodes[new];
            if let NodeKind::Model(model) = &mut node.kind {
                if let Some(skin) = &mut model.skin {
                    let joints: Option<Vec<NodeHandle>> = skin
                        .joints
                        .iter()
                        .map(|&j| remap_handle(&map, j, policy))
                        .collect();
                    match joints {
                        Some(joints) => {
                            skin.joints = joints;
                            skin.root = skin.root.and_then(|r| remap_handle(&map, r, policy));
                        }
                        None => {
                            log::warn!(
                                "Model '{}' was cloned without its skeleton; the copy is unskinned",
                                node.name
                            );
                            model.skin = None;
                        }
                    }
                }
            }
            if let Some(player) = &mut node.animation_player {
                player.remap_nodes(&map, policy, clone_root);
            }
        }

        clone_root
    }
}

/// Pre-order copies of every node under `root`, paired with their handles.
fn copy_subtree(graph: &SceneGraph, root: NodeHandle) -> Result<Vec<(NodeHandle, Node)>> {
    graph.get_node(root).ok_or(MythError::InvalidHandle)?;
    Ok(graph
        .children_recursive(root, true)
        .map(|h| (h, graph.nodes[h].clone()))
        .collect())
}
