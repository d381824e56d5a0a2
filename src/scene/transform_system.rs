//! Transform system
//!
//! World matrices are resolved lazily. Any local change marks the node and
//! its whole subtree dirty; reading a world matrix walks up to the first clean
//! ancestor and recomputes downward from there.
//!
//! The walk relies on one invariant: a dirty node never has a clean
//! descendant. Marking always covers full subtrees and resolution only ever
//! cleans a node after its parent, so the invariant holds across both.

use glam::Affine3A;
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::scene::NodeHandle;
use crate::scene::node::Node;

/// Marks `root` and every descendant dirty.
///
/// A node that is already dirty is skipped together with its subtree, which
/// is dirty already by the invariant above.
pub fn mark_subtree_dirty(nodes: &SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let mut stack: SmallVec<[NodeHandle; 32]> = SmallVec::new();
    stack.push(root);

    while let Some(handle) = stack.pop() {
        let Some(node) = nodes.get(handle) else {
            continue;
        };
        // The root is always pushed down even if dirty: its own flag may have
        // been set by a TRS setter that did not touch the children.
        if handle != root && node.transform.is_world_dirty() {
            continue;
        }
        node.transform.mark_world_dirty();
        stack.extend(node.children.iter().copied());
    }
}

/// Returns the world matrix of `handle`, recomputing only the dirty chain.
///
/// Returns `None` for a stale handle.
pub fn resolve_world_matrix(
    nodes: &SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
) -> Option<Affine3A> {
    let node = nodes.get(handle)?;
    if !node.transform.is_world_dirty() {
        return Some(node.transform.cached_world_matrix());
    }

    let mut chain: SmallVec<[NodeHandle; 16]> = SmallVec::new();
    let mut parent_world = Affine3A::IDENTITY;
    let mut cursor = Some(handle);

    while let Some(current) = cursor {
        let Some(node) = nodes.get(current) else {
            break;
        };
        if !node.transform.is_world_dirty() {
            parent_world = node.transform.cached_world_matrix();
            break;
        }
        chain.push(current);
        cursor = node.parent;
    }

    for &current in chain.iter().rev() {
        let node = &nodes[current];
        let world = parent_world * node.transform.local_matrix();
        node.transform.store_world_matrix(world);
        parent_world = world;
    }

    Some(parent_world)
}

/// Eagerly resolves every dirty node under `root` in one pre-order pass.
///
/// Useful before handing a whole subtree to a consumer that reads many world
/// matrices, so each is computed exactly once.
pub fn update_subtree(nodes: &SlotMap<NodeHandle, Node>, root: NodeHandle) {
    let Some(root_world) = resolve_world_matrix(nodes, root) else {
        return;
    };

    let mut stack: Vec<(NodeHandle, Affine3A)> = Vec::new();
    if let Some(node) = nodes.get(root) {
        for &child in node.children.iter().rev() {
            stack.push((child, root_world));
        }
    }

    while let Some((handle, parent_world)) = stack.pop() {
        let Some(node) = nodes.get(handle) else {
            continue;
        };

        let world = if node.transform.is_world_dirty() {
            let world = parent_world * node.transform.local_matrix();
            node.transform.store_world_matrix(world);
            world
        } else {
            node.transform.cached_world_matrix()
        };

        for &child in node.children.iter().rev() {
            stack.push((child, world));
        }
    }
}
