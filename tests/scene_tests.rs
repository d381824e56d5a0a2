//! Scene graph integration tests
//!
//! Tests for:
//! - Node creation, removal and hierarchy edits
//! - Cycle rejection and stale handles
//! - Path lookup, pre-order traversal, name/tag queries
//! - Subtree cloning: independence, shared meshes, bone remapping
//! - Scene duplication

use std::sync::Arc;

use glam::{Affine3A, Vec3};
use myth_graph::errors::MythError;
use myth_graph::resources::{Mesh, Vertex};
use myth_graph::scene::{Model, Node, NodeKind, NodeType, Scene, SceneGraph, Skin};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

fn triangle_mesh() -> Arc<Mesh> {
    let mut mesh = Mesh::new("tri");
    mesh.add_part(None).add_triangles([
        Vertex::new(Vec3::ZERO),
        Vertex::new(Vec3::X),
        Vertex::new(Vec3::Y),
    ]);
    mesh.update_bounds();
    Arc::new(mesh)
}

// ============================================================================
// Node Creation & Removal
// ============================================================================

#[test]
fn create_node_with_name() {
    let mut graph = SceneGraph::new();
    let handle = graph.create_node("TestNode");
    assert_eq!(graph.get_node(handle).map(|n| n.name.as_str()), Some("TestNode"));
    assert_eq!(graph.len(), 1);
}

#[test]
fn add_to_parent_links_both_ways() {
    let mut graph = SceneGraph::new();
    let parent = graph.create_node("parent");
    let child = graph.add_to_parent(Node::new("child"), parent).unwrap();

    assert_eq!(graph.parent(child), Some(parent));
    assert_eq!(graph.children(parent), &[child]);
}

#[test]
fn remove_node_deletes_subtree() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node("root");
    let a = graph.add_to_parent(Node::new("a"), root).unwrap();
    let b = graph.add_to_parent(Node::new("b"), a).unwrap();

    graph.remove_node(a);

    assert!(!graph.contains(a));
    assert!(!graph.contains(b));
    assert!(graph.children(root).is_empty());
    assert_eq!(graph.len(), 1);
}

#[test]
fn stale_handle_reads_are_none() {
    let mut graph = SceneGraph::new();
    let node = graph.create_node("gone");
    graph.remove_node(node);

    assert!(graph.get_node(node).is_none());
    assert!(graph.world_matrix(node).is_none());
    assert!(graph.children(node).is_empty());
    // Writes to a stale handle are ignored.
    graph.set_local_position(node, Vec3::ONE);
}

// ============================================================================
// Hierarchy Edits
// ============================================================================

#[test]
fn add_children_reparents_from_previous_parent() {
    let mut graph = SceneGraph::new();
    let first = graph.create_node("first");
    let second = graph.create_node("second");
    let child = graph.create_node("child");

    graph.add_children(first, &[child]).unwrap();
    graph.add_children(second, &[child]).unwrap();

    assert!(graph.children(first).is_empty());
    assert_eq!(graph.children(second), &[child]);
    assert_eq!(graph.parent(child), Some(second));
}

#[test]
fn attach_rejects_cycles() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node("a");
    let b = graph.add_to_parent(Node::new("b"), a).unwrap();
    let c = graph.add_to_parent(Node::new("c"), b).unwrap();

    assert!(matches!(graph.attach(a, c), Err(MythError::HierarchyCycle)));
    assert!(matches!(graph.attach(a, a), Err(MythError::HierarchyCycle)));

    // The tree is untouched.
    assert_eq!(graph.parent(a), None);
    assert_eq!(graph.parent(c), Some(b));
}

#[test]
fn add_children_validates_before_mutating() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node("a");
    let b = graph.add_to_parent(Node::new("b"), a).unwrap();
    let loose = graph.create_node("loose");

    let result = graph.add_children(b, &[loose, a]);
    assert!(result.is_err());
    assert_eq!(graph.parent(loose), None, "no child is moved when one fails");
}

#[test]
fn remove_children_detaches_only_own_children() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node("a");
    let b = graph.create_node("b");
    let child_a = graph.add_to_parent(Node::new("ca"), a).unwrap();
    let child_b = graph.add_to_parent(Node::new("cb"), b).unwrap();

    graph.remove_children(a, &[child_a, child_b]);

    assert_eq!(graph.parent(child_a), None);
    assert_eq!(graph.parent(child_b), Some(b));
    assert!(graph.contains(child_a), "removing a child does not delete it");
}

#[test]
fn detached_node_keeps_its_local_transform() {
    let mut graph = SceneGraph::new();
    let parent = graph.create_node("parent");
    let child = graph.add_to_parent(Node::new("child"), parent).unwrap();
    graph.set_local_position(parent, Vec3::new(5.0, 0.0, 0.0));
    graph.set_local_position(child, Vec3::Y);

    graph.detach(child);
    assert!(vec3_approx(graph.world_position(child).unwrap(), Vec3::Y));
}

// ============================================================================
// Queries
// ============================================================================

fn sample_tree(graph: &mut SceneGraph) -> (myth_graph::NodeHandle, Vec<myth_graph::NodeHandle>) {
    // root
    // ├── arm
    // │   └── hand
    // └── leg
    let root = graph.create_node("root");
    let arm = graph.add_to_parent(Node::new("arm"), root).unwrap();
    let hand = graph.add_to_parent(Node::new("hand"), arm).unwrap();
    let leg = graph.add_to_parent(Node::new("leg"), root).unwrap();
    (root, vec![root, arm, hand, leg])
}

#[test]
fn get_resolves_paths_level_by_level() {
    let mut graph = SceneGraph::new();
    let (root, nodes) = sample_tree(&mut graph);

    assert_eq!(graph.get(root, "arm/hand"), Some(nodes[2]));
    assert_eq!(graph.get(root, "leg"), Some(nodes[3]));
    assert_eq!(graph.get(root, ""), Some(root));
    // No partial or skipping matches.
    assert_eq!(graph.get(root, "hand"), None);
    assert_eq!(graph.get(root, "arm/foot"), None);
    assert_eq!(graph.get(root, "ar"), None);
    // Every segment is one level; empty segments match nothing.
    assert_eq!(graph.get(root, "arm//hand"), None);
    assert_eq!(graph.get(root, "/arm"), None);
    assert_eq!(graph.get(root, "arm/"), None);
}

#[test]
fn children_recursive_is_preorder_and_restartable() {
    let mut graph = SceneGraph::new();
    let (root, nodes) = sample_tree(&mut graph);

    let iter = graph.children_recursive(root, true);
    let saved = iter.clone();
    let order: Vec<_> = iter.collect();
    assert_eq!(order, nodes);
    assert_eq!(saved.collect::<Vec<_>>(), nodes);

    let without_self: Vec<_> = graph.children_recursive(root, false).collect();
    assert_eq!(without_self, nodes[1..].to_vec());
}

#[test]
fn find_by_name_and_tag() {
    let mut graph = SceneGraph::new();
    let (root, nodes) = sample_tree(&mut graph);
    graph.get_node_mut(nodes[2]).unwrap().tags.set("grab", true);
    graph.get_node_mut(nodes[3]).unwrap().tags.set("grab", false);

    assert_eq!(graph.find_by_name(root, "hand"), Some(nodes[2]));
    assert_eq!(graph.find_by_name(root, "tail"), None);
    assert_eq!(graph.find_by_tag(root, "grab"), vec![nodes[2], nodes[3]]);

    let leaves = graph.filter_nodes(root, |n| n.children().is_empty());
    assert_eq!(leaves, vec![nodes[2], nodes[3]]);
}

#[test]
fn is_ancestor_and_root_of() {
    let mut graph = SceneGraph::new();
    let (root, nodes) = sample_tree(&mut graph);

    assert!(graph.is_ancestor(root, nodes[2]));
    assert!(!graph.is_ancestor(nodes[3], nodes[2]));
    assert_eq!(graph.root_of(nodes[2]), root);
}

// ============================================================================
// Cloning
// ============================================================================

#[test]
fn clone_is_independent_of_source() {
    let mut graph = SceneGraph::new();
    let (root, nodes) = sample_tree(&mut graph);
    graph.set_local_position(nodes[1], Vec3::X);

    let copy = graph.clone_subtree(root).unwrap();
    assert_eq!(graph.parent(copy), None);
    let copy_arm = graph.get(copy, "arm").unwrap();
    assert_ne!(copy_arm, nodes[1]);

    graph.set_local_position(copy_arm, Vec3::new(0.0, 0.0, 9.0));
    assert!(vec3_approx(graph.local_position(nodes[1]).unwrap(), Vec3::X));

    graph.set_local_position(nodes[1], Vec3::Y);
    assert!(vec3_approx(graph.local_position(copy_arm).unwrap(), Vec3::new(0.0, 0.0, 9.0)));

    // Children of the copy belong to the copy only.
    let copy_hand = graph.get(copy, "arm/hand").unwrap();
    assert_eq!(graph.parent(copy_hand), Some(copy_arm));
    assert_eq!(graph.children(nodes[1]), &[nodes[2]]);
}

#[test]
fn clone_shares_mesh_and_remaps_bones() {
    let mut graph = SceneGraph::new();
    let rig = graph.create_node("rig");
    let armature = graph.add_to_parent(Node::new("armature"), rig).unwrap();
    let bone = graph.add_to_parent(Node::new("bone"), armature).unwrap();
    graph.get_node_mut(bone).unwrap().is_bone = true;

    let mesh = triangle_mesh();
    let mut model = Model::new(Arc::clone(&mesh));
    let mut skin = Skin::new(vec![bone]);
    skin.root = Some(armature);
    model.set_skin(Some(skin));
    let body = graph
        .add_to_parent(Node::with_kind("body", NodeKind::Model(model)), rig)
        .unwrap();

    let copy = graph.clone_subtree(rig).unwrap();
    let copy_body = graph.get(copy, "body").unwrap();
    let copy_bone = graph.get(copy, "armature/bone").unwrap();
    let copy_armature = graph.get(copy, "armature").unwrap();

    let copy_model = graph.get_node(copy_body).unwrap().as_model().unwrap();
    assert!(Arc::ptr_eq(&copy_model.mesh, &mesh));
    assert_eq!(copy_model.skin().unwrap().joints, vec![copy_bone]);
    assert_eq!(copy_model.skin_root(), Some(copy_armature));

    // Re-pointing the copy's joint leaves the source skeleton alone.
    let spare = graph.create_node("spare");
    assert!(graph
        .get_node_mut(copy_body)
        .unwrap()
        .as_model_mut()
        .unwrap()
        .set_joint(0, spare));
    let source_model = graph.get_node(body).unwrap().as_model().unwrap();
    assert_eq!(source_model.skin().unwrap().joints, vec![bone]);
}

#[test]
fn clone_keeps_references_outside_subtree() {
    let mut graph = SceneGraph::new();
    let bone = graph.create_node("bone");
    let mut model = Model::new(triangle_mesh());
    model.set_skin(Some(Skin::new(vec![bone])));
    let body = graph.add_node(Node::with_kind("body", NodeKind::Model(model)));

    let copy = graph.clone_subtree(body).unwrap();
    let skin = graph.get_node(copy).unwrap().as_model().unwrap().skin().unwrap();
    assert_eq!(skin.joints, vec![bone]);
}

#[test]
fn clone_from_other_graph_drops_dangling_skin() {
    let mut source = SceneGraph::new();
    let bone = source.create_node("bone");
    let mut model = Model::new(triangle_mesh());
    model.set_skin(Some(Skin::new(vec![bone])));
    let body = source.add_node(Node::with_kind("body", NodeKind::Model(model)));

    let mut target = SceneGraph::new();
    let copy = target.clone_subtree_from(&source, body).unwrap();
    let node = target.get_node(copy).unwrap();
    assert_eq!(node.node_type(), NodeType::Model);
    assert!(!node.as_model().unwrap().is_skinned());
}

#[test]
fn clone_of_stale_handle_fails() {
    let mut graph = SceneGraph::new();
    let node = graph.create_node("n");
    graph.remove_node(node);
    assert!(matches!(graph.clone_subtree(node), Err(MythError::InvalidHandle)));
}

// ============================================================================
// Scenes
// ============================================================================

#[test]
fn scene_duplicate_deep_copies_tree() {
    let mut graph = SceneGraph::new();
    let scene = Scene::new("Level", &mut graph);
    let crate_node = graph
        .add_to_parent(Node::new("Crate"), scene.root)
        .unwrap();
    graph.set_local_position(crate_node, Vec3::new(1.0, 0.0, 0.0));

    let copy = scene.duplicate(&mut graph).unwrap();
    assert_ne!(copy.root, scene.root);
    let copy_crate = copy.find_node(&graph, "Crate").unwrap();
    assert_ne!(copy_crate, crate_node);

    graph.set_local_position(copy_crate, Vec3::ZERO);
    assert!(vec3_approx(graph.world_position(crate_node).unwrap(), Vec3::X));
}

#[test]
fn skinned_world_matrices_use_inverse_bind() {
    let mut graph = SceneGraph::new();
    let bone = graph.create_node("bone");
    {
        let node = graph.get_node_mut(bone).unwrap();
        node.is_bone = true;
        node.inverse_bind_matrix = Affine3A::from_translation(Vec3::new(-1.0, 0.0, 0.0));
    }
    graph.set_local_position(bone, Vec3::new(1.0, 0.0, 0.0));

    let mut model = Model::new(triangle_mesh());
    model.set_skin(Some(Skin::new(vec![bone])));
    let body = graph.add_node(Node::with_kind("body", NodeKind::Model(model)));

    // At rest the bone's world matrix cancels its inverse bind matrix.
    let matrices = graph.skin_matrices(body).unwrap();
    assert!(vec3_approx(matrices[0].transform_point3(Vec3::ONE), Vec3::ONE));
}
