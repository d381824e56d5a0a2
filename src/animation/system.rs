use crate::scene::{NodeHandle, SceneGraph};

/// Animation system.
///
/// Drives every [`AnimationPlayer`](crate::animation::AnimationPlayer) owned
/// by a node of the graph. Each player is taken out of its node for the
/// duration of its update (`Option::take`), so it can write poses into the
/// graph without aliasing its own storage.
pub struct AnimationSystem;

impl AnimationSystem {
    /// Advances all node-owned players by `dt` seconds.
    pub fn update(graph: &mut SceneGraph, dt: f32) {
        let owners: Vec<NodeHandle> = graph
            .iter()
            .filter(|(_, node)| node.animation_player.is_some())
            .map(|(handle, _)| handle)
            .collect();

        for owner in owners {
            let Some(mut player) = graph
                .get_node_mut(owner)
                .and_then(|node| node.animation_player.take())
            else {
                continue;
            };

            player.update(dt, graph);

            // The update may not remove nodes, so the owner is still there.
            if let Some(node) = graph.get_node_mut(owner) {
                node.animation_player = Some(player);
            }
        }
    }
}
