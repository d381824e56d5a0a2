use crate::animation::clip::Animation;
use crate::errors::{MythError, ReferenceKind};
use crate::scene::{NodeHandle, SceneGraph};

/// A channel resolved to a live node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelBinding {
    pub channel_index: usize,
    pub node: NodeHandle,
}

/// Outcome of binding an animation to a subtree.
#[derive(Debug, Clone, Default)]
pub struct BindResult {
    pub bindings: Vec<ChannelBinding>,
    /// Channel targets with no matching node. Those channels stay inert.
    pub unresolved: Vec<String>,
}

impl BindResult {
    /// One [`MythError::UnresolvedReference`] per unresolved target.
    pub fn diagnostics(&self) -> Vec<MythError> {
        self.unresolved
            .iter()
            .map(|name| MythError::unresolved(ReferenceKind::AnimationTarget, name))
            .collect()
    }
}

pub struct Binder;

impl Binder {
    /// Resolves each channel's target name to the first node with that name
    /// in pre-order under `root` (including `root`).
    pub fn bind(graph: &SceneGraph, root: NodeHandle, animation: &Animation) -> BindResult {
        let mut result = BindResult {
            bindings: Vec::with_capacity(animation.channels.len()),
            unresolved: Vec::new(),
        };

        for (channel_index, channel) in animation.channels.iter().enumerate() {
            match graph.find_by_name(root, &channel.target) {
                Some(node) => result.bindings.push(ChannelBinding {
                    channel_index,
                    node,
                }),
                None => {
                    log::warn!(
                        "Animation '{}': no node named '{}' under the player root",
                        animation.name,
                        channel.target
                    );
                    result.unresolved.push(channel.target.clone());
                }
            }
        }

        result
    }
}
