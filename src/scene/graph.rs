use glam::{Affine3A, Quat, Vec3};
use slotmap::SlotMap;

use crate::errors::{MythError, Result};
use crate::scene::NodeHandle;
use crate::scene::node::Node;
use crate::scene::transform::Transform;
use crate::scene::transform_system;

/// Node arena
///
/// Owns every node of a library. Nodes refer to each other by
/// [`NodeHandle`]: a parent link plus an ordered child list, so the tree has
/// no ownership cycles and handles stay valid while other nodes come and go.
///
/// All hierarchy and local-transform edits go through this type. It keeps the
/// parent and child links in sync and marks the affected subtree dirty, so
/// [`SceneGraph::world_matrix`] is always consistent with the latest edits
/// without an explicit flush.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
}

impl SceneGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn contains(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    // ========================================================================
    // Node lifecycle
    // ========================================================================

    /// Inserts a detached node. Any parent or child links it carries are
    /// discarded.
    pub fn add_node(&mut self, mut node: Node) -> NodeHandle {
        node.parent = None;
        node.children.clear();
        node.transform.mark_world_dirty();
        self.nodes.insert(node)
    }

    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        self.add_node(Node::new(name))
    }

    /// Inserts `node` and attaches it as the last child of `parent`.
    pub fn add_to_parent(&mut self, node: Node, parent: NodeHandle) -> Result<NodeHandle> {
        if !self.contains(parent) {
            return Err(MythError::InvalidHandle);
        }
        let handle = self.add_node(node);
        self.attach(handle, parent)?;
        Ok(handle)
    }

    /// Removes `handle` and its whole subtree from the arena.
    pub fn remove_node(&mut self, handle: NodeHandle) {
        if !self.contains(handle) {
            return;
        }
        self.detach(handle);

        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(current) {
                stack.extend(node.children);
            }
        }
    }

    #[inline]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Mutable access to a node's payload, name, tags and flags.
    ///
    /// Links and transform stay read-only through this reference.
    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    #[inline]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle).and_then(|n| n.parent)
    }

    /// Ordered children of `handle`; empty for a stale handle.
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map_or(&[], |n| n.children.as_slice())
    }

    /// Topmost ancestor of `handle` (itself when it has no parent).
    pub fn root_of(&self, handle: NodeHandle) -> NodeHandle {
        let mut current = handle;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// True when `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Appends `child` to `parent`'s children, detaching it from its previous
    /// parent first.
    ///
    /// Fails with [`MythError::HierarchyCycle`] if `child` is `parent` or one
    /// of its ancestors.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) -> Result<()> {
        if !self.contains(child) || !self.contains(parent) {
            return Err(MythError::InvalidHandle);
        }
        if self.is_ancestor(child, parent) {
            return Err(MythError::HierarchyCycle);
        }

        self.detach(child);

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
        transform_system::mark_subtree_dirty(&self.nodes, child);
        Ok(())
    }

    /// Attaches every node in `children` to `parent`, in order.
    ///
    /// All handles are validated before anything moves, so a failure leaves
    /// the hierarchy untouched.
    pub fn add_children(&mut self, parent: NodeHandle, children: &[NodeHandle]) -> Result<()> {
        if !self.contains(parent) {
            return Err(MythError::InvalidHandle);
        }
        for &child in children {
            if !self.contains(child) {
                return Err(MythError::InvalidHandle);
            }
            if self.is_ancestor(child, parent) {
                return Err(MythError::HierarchyCycle);
            }
        }
        for &child in children {
            self.attach(child, parent)?;
        }
        Ok(())
    }

    /// Detaches each of `children` that is currently a child of `parent`.
    /// Detached nodes stay in the arena as roots.
    pub fn remove_children(&mut self, parent: NodeHandle, children: &[NodeHandle]) {
        for &child in children {
            if self.parent(child) == Some(parent) {
                self.detach(child);
            }
        }
    }

    /// Unlinks `handle` from its parent, making it a root.
    pub fn detach(&mut self, handle: NodeHandle) {
        let Some(parent) = self.parent(handle) else {
            return;
        };
        if let Some(parent_node) = self.nodes.get_mut(parent) {
            parent_node.children.retain(|&c| c != handle);
        }
        self.nodes[handle].parent = None;
        transform_system::mark_subtree_dirty(&self.nodes, handle);
    }

    // ========================================================================
    // Local transform
    // ========================================================================

    /// Runs `edit` on the node's transform, then dirties its subtree once.
    pub(crate) fn edit_transform(&mut self, handle: NodeHandle, edit: impl FnOnce(&mut Transform)) {
        let Some(node) = self.nodes.get_mut(handle) else {
            return;
        };
        edit(&mut node.transform);
        transform_system::mark_subtree_dirty(&self.nodes, handle);
    }

    pub fn set_local_position(&mut self, handle: NodeHandle, position: Vec3) {
        self.edit_transform(handle, |t| t.set_position(position));
    }

    pub fn set_local_rotation(&mut self, handle: NodeHandle, rotation: Quat) {
        self.edit_transform(handle, |t| t.set_rotation(rotation));
    }

    pub fn set_local_scale(&mut self, handle: NodeHandle, scale: Vec3) {
        self.edit_transform(handle, |t| t.set_scale(scale));
    }

    /// Replaces the whole local TRS in one edit.
    pub fn set_local_transform(&mut self, handle: NodeHandle, transform: &Transform) {
        let (position, rotation, scale) =
            (transform.position(), transform.rotation(), transform.scale());
        self.edit_transform(handle, |t| {
            t.set_position(position);
            t.set_rotation(rotation);
            t.set_scale(scale);
        });
    }

    /// Decomposes `matrix` into the node's local TRS.
    pub fn apply_local_matrix(&mut self, handle: NodeHandle, matrix: Affine3A) {
        self.edit_transform(handle, |t| t.apply_local_matrix(matrix));
    }

    /// Translates by `offset` expressed in the parent's space.
    pub fn move_local(&mut self, handle: NodeHandle, offset: Vec3) {
        self.edit_transform(handle, |t| t.set_position(t.position() + offset));
    }

    /// Rotates the node so its -Z axis faces `target` (parent space).
    pub fn look_at(&mut self, handle: NodeHandle, target: Vec3, up: Vec3) {
        self.edit_transform(handle, |t| t.look_at(target, up));
    }

    pub fn local_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes.get(handle).map(|n| n.transform.position())
    }

    pub fn local_rotation(&self, handle: NodeHandle) -> Option<Quat> {
        self.nodes.get(handle).map(|n| n.transform.rotation())
    }

    pub fn local_scale(&self, handle: NodeHandle) -> Option<Vec3> {
        self.nodes.get(handle).map(|n| n.transform.scale())
    }

    pub fn local_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        self.nodes.get(handle).map(|n| n.transform.local_matrix())
    }

    // ========================================================================
    // World transform
    // ========================================================================

    /// `parent.world_matrix * local_matrix`, resolved lazily.
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        transform_system::resolve_world_matrix(&self.nodes, handle)
    }

    pub fn world_position(&self, handle: NodeHandle) -> Option<Vec3> {
        self.world_matrix(handle).map(|m| Vec3::from(m.translation))
    }

    pub fn world_rotation(&self, handle: NodeHandle) -> Option<Quat> {
        self.world_matrix(handle)
            .map(|m| m.to_scale_rotation_translation().1)
    }

    pub fn world_scale(&self, handle: NodeHandle) -> Option<Vec3> {
        self.world_matrix(handle)
            .map(|m| m.to_scale_rotation_translation().0)
    }

    /// Sets the local position so that the node ends up at `position` in
    /// world space.
    pub fn set_world_position(&mut self, handle: NodeHandle, position: Vec3) {
        let local = match self.parent(handle).and_then(|p| self.world_matrix(p)) {
            Some(parent_world) => parent_world.inverse().transform_point3(position),
            None => position,
        };
        self.set_local_position(handle, local);
    }

    /// Resolves every dirty world matrix under `root` in one pass.
    pub fn update_subtree(&self, root: NodeHandle) {
        transform_system::update_subtree(&self.nodes, root);
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Follows a `/`-separated list of child names from `from`, one level per
    /// segment. Every segment must match a child's name exactly; there is no
    /// partial or recursive matching. An empty path returns `from`; an empty
    /// segment (`"a//b"`, `"/a"`, `"a/"`) matches nothing.
    pub fn get(&self, from: NodeHandle, path: &str) -> Option<NodeHandle> {
        self.nodes.get(from)?;
        if path.is_empty() {
            return Some(from);
        }
        path.split('/').try_fold(from, |current, segment| {
            if segment.is_empty() {
                return None;
            }
            self.children(current)
                .iter()
                .copied()
                .find(|&c| self.nodes[c].name == segment)
        })
    }

    /// Pre-order traversal of the subtree under `root`.
    ///
    /// The returned iterator is `Clone`, so a traversal can be restarted from
    /// a saved copy.
    pub fn children_recursive(&self, root: NodeHandle, include_self: bool) -> ChildrenRecursive<'_> {
        let mut stack = Vec::new();
        if self.contains(root) {
            if include_self {
                stack.push(root);
            } else {
                stack.extend(self.children(root).iter().rev().copied());
            }
        }
        ChildrenRecursive { graph: self, stack }
    }

    /// First node named `name` in pre-order under `root` (including `root`).
    pub fn find_by_name(&self, root: NodeHandle, name: &str) -> Option<NodeHandle> {
        self.children_recursive(root, true)
            .find(|&h| self.nodes[h].name == name)
    }

    /// Every node under `root` (including `root`) carrying tag `tag`.
    pub fn find_by_tag(&self, root: NodeHandle, tag: &str) -> Vec<NodeHandle> {
        self.filter_nodes(root, |node| node.tags.has(tag))
    }

    pub fn filter_nodes<F>(&self, root: NodeHandle, mut predicate: F) -> Vec<NodeHandle>
    where
        F: FnMut(&Node) -> bool,
    {
        self.children_recursive(root, true)
            .filter(|&h| predicate(&self.nodes[h]))
            .collect()
    }
}

/// Pre-order subtree iterator returned by [`SceneGraph::children_recursive`].
#[derive(Clone)]
pub struct ChildrenRecursive<'a> {
    graph: &'a SceneGraph,
    stack: Vec<NodeHandle>,
}

impl Iterator for ChildrenRecursive<'_> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        let handle = self.stack.pop()?;
        self.stack
            .extend(self.graph.children(handle).iter().rev().copied());
        Some(handle)
    }
}
