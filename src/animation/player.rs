use std::sync::Arc;

use smallvec::SmallVec;

use crate::animation::binder::{Binder, ChannelBinding};
use crate::animation::clip::{Animation, ChannelCursors, Marker};
use crate::errors::{MythError, ReferenceKind};
use crate::scene::clone::{ExternalRefs, HandleMap, remap_handle};
use crate::scene::{NodeHandle, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Plays to the end, then stops.
    Once,
    #[default]
    Loop,
    /// Plays forward then backward by flipping the play speed at each end.
    PingPong,
}

/// Per-node playback state.
///
/// The player binds the channels of its current animation to nodes under its
/// root by name, and on every [`AnimationPlayer::update`] writes the sampled
/// pose into those nodes' local transforms.
///
/// Markers fire on forward crossings only: a marker at time `m` is reported
/// by the update that moves time from before `m` to at-or-after `m`, once per
/// update. Seeking and backward playback never report markers. The first
/// update after [`AnimationPlayer::play`] or [`AnimationPlayer::stop`] also
/// reports markers placed exactly at time 0.
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    root: NodeHandle,
    animation: Option<Arc<Animation>>,

    time: f32,
    pub play_speed: f32,
    pub loop_mode: LoopMode,
    playing: bool,
    finished: bool,
    /// Time sits at the start of playback; markers at 0 are still pending.
    at_start: bool,

    bindings: Vec<ChannelBinding>,
    unresolved: Vec<String>,
    cursors: Vec<ChannelCursors>,

    touched: SmallVec<[usize; 4]>,
}

impl AnimationPlayer {
    /// Creates an idle player whose channels resolve under `root`.
    #[must_use]
    pub fn new(root: NodeHandle) -> Self {
        Self {
            root,
            animation: None,
            time: 0.0,
            play_speed: 1.0,
            loop_mode: LoopMode::default(),
            playing: false,
            finished: false,
            at_start: false,
            bindings: Vec::new(),
            unresolved: Vec::new(),
            cursors: Vec::new(),
            touched: SmallVec::new(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    pub fn animation(&self) -> Option<&Arc<Animation>> {
        self.animation.as_ref()
    }

    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// True once a [`LoopMode::Once`] playback has reached its end.
    #[inline]
    pub fn finished(&self) -> bool {
        self.finished
    }

    /// Channel targets of the current animation that matched no node.
    pub fn unresolved_targets(&self) -> &[String] {
        &self.unresolved
    }

    /// One [`MythError::UnresolvedReference`] per unresolved channel target.
    pub fn diagnostics(&self) -> Vec<MythError> {
        self.unresolved
            .iter()
            .map(|name| MythError::unresolved(ReferenceKind::AnimationTarget, name))
            .collect()
    }

    pub fn bindings(&self) -> &[ChannelBinding] {
        &self.bindings
    }

    /// Starts `animation` from the beginning.
    ///
    /// Replaying the animation that is already loaded keeps the existing
    /// bindings; a different animation is bound against `graph` first.
    pub fn play(&mut self, graph: &SceneGraph, animation: Arc<Animation>) {
        let same = self
            .animation
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &animation));

        self.animation = Some(animation);
        if !same {
            self.bind(graph);
        }

        self.time = 0.0;
        self.playing = true;
        self.finished = false;
        self.at_start = true;
        self.touched.clear();
    }

    /// Resumes playback from the current time.
    pub fn resume(&mut self) {
        if self.animation.is_some() {
            self.playing = true;
            self.finished = false;
        }
    }

    /// Halts playback, keeping the current time.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Halts playback and rewinds to the start.
    pub fn stop(&mut self) {
        self.playing = false;
        self.time = 0.0;
        self.at_start = true;
        self.touched.clear();
    }

    /// Jumps to `time`, wrapped or clamped by the loop mode. No markers fire.
    pub fn seek(&mut self, time: f32) {
        let length = self.animation.as_ref().map_or(0.0, |a| a.length);
        self.time = match self.loop_mode {
            _ if length <= 0.0 => 0.0,
            LoopMode::Loop => time.rem_euclid(length),
            LoopMode::Once | LoopMode::PingPong => time.clamp(0.0, length),
        };
        self.at_start = false;
        self.touched.clear();
    }

    /// Re-resolves every channel of the current animation against `graph`.
    ///
    /// Call this after the subtree under the player root changed shape.
    pub fn bind(&mut self, graph: &SceneGraph) {
        let Some(animation) = &self.animation else {
            self.bindings.clear();
            self.unresolved.clear();
            self.cursors.clear();
            return;
        };

        let result = Binder::bind(graph, self.root, animation);
        self.bindings = result.bindings;
        self.unresolved = result.unresolved;
        self.cursors = vec![ChannelCursors::default(); animation.channels.len()];
    }

    /// Advances time by `dt * play_speed`, applies the loop mode, collects
    /// crossed markers, and writes the pose into the bound nodes.
    pub fn update(&mut self, dt: f32, graph: &mut SceneGraph) {
        self.touched.clear();
        if !self.playing {
            return;
        }
        let Some(animation) = self.animation.clone() else {
            return;
        };

        let length = animation.length;
        let previous = self.time;
        let delta = dt * self.play_speed;

        if length <= 0.0 {
            self.time = 0.0;
            if self.loop_mode == LoopMode::Once {
                self.finish();
            }
            self.apply(graph);
            return;
        }

        let next = previous + delta;
        match self.loop_mode {
            LoopMode::Once => {
                if next >= length {
                    self.time = length;
                    self.finish();
                } else if next <= 0.0 && delta < 0.0 {
                    self.time = 0.0;
                    self.finish();
                } else {
                    self.time = next;
                }
                if delta > 0.0 {
                    self.collect_markers(&animation, previous, self.time, false);
                }
            }
            LoopMode::Loop => {
                self.time = next.rem_euclid(length);
                // Guard against rounding putting the result exactly on `length`.
                if self.time >= length {
                    self.time = 0.0;
                }
                if delta > 0.0 {
                    self.collect_markers(&animation, previous, self.time, next >= length);
                }
            }
            LoopMode::PingPong => {
                let mut end_of_forward_leg = next;
                if next > length {
                    self.time = (2.0 * length - next).max(0.0);
                    self.play_speed = -self.play_speed;
                    end_of_forward_leg = length;
                } else if next < 0.0 {
                    self.time = (-next).min(length);
                    self.play_speed = -self.play_speed;
                } else {
                    self.time = next;
                }
                if delta > 0.0 {
                    self.collect_markers(&animation, previous, end_of_forward_leg, false);
                }
            }
        }

        if delta > 0.0 {
            self.at_start = false;
        }
        self.apply(graph);
    }

    /// Writes the pose at the current time into the bound nodes.
    pub fn apply(&mut self, graph: &mut SceneGraph) {
        let Some(animation) = &self.animation else {
            return;
        };

        for binding in &self.bindings {
            let Some(channel) = animation.channels.get(binding.channel_index) else {
                continue;
            };
            let Some(cursors) = self.cursors.get_mut(binding.channel_index) else {
                continue;
            };

            let sample = channel.sample(self.time, cursors);
            graph.edit_transform(binding.node, |t| {
                if let Some(translation) = sample.translation {
                    t.set_position(translation);
                }
                if let Some(rotation) = sample.rotation {
                    t.set_rotation(rotation.normalize());
                }
                if let Some(scale) = sample.scale {
                    t.set_scale(scale);
                }
            });
        }
    }

    /// Whether the last update crossed a marker named `name`.
    pub fn touched_marker(&self, name: &str) -> bool {
        self.touched_markers().any(|m| m.name == name)
    }

    /// Markers crossed by the last update, in time order.
    pub fn touched_markers(&self) -> impl Iterator<Item = &Marker> {
        let markers = self.animation.as_ref().map_or(&[][..], |a| a.markers.as_slice());
        self.touched.iter().filter_map(move |&i| markers.get(i))
    }

    fn finish(&mut self) {
        self.playing = false;
        self.finished = true;
    }

    /// Records markers in `(from, to]`, or in `(from, length] U [0, to]` when
    /// the update wrapped around the end. `from` is inclusive right after
    /// playback started.
    fn collect_markers(&mut self, animation: &Animation, from: f32, to: f32, wrapped: bool) {
        let inclusive = self.at_start;
        for (i, marker) in animation.markers.iter().enumerate() {
            if marker.time > animation.length {
                continue;
            }
            let after_from = if inclusive { marker.time >= from } else { marker.time > from };
            let crossed = if wrapped {
                after_from || marker.time <= to
            } else {
                after_from && marker.time <= to
            };
            if crossed {
                self.touched.push(i);
            }
        }
    }

    /// Rewrites node handles after a clone. See [`SceneGraph::clone_subtree`].
    ///
    /// A root left behind by a cross-graph clone is replaced by `clone_root`,
    /// the top of the copied subtree.
    pub(crate) fn remap_nodes(&mut self, map: &HandleMap, policy: ExternalRefs, clone_root: NodeHandle) {
        self.root = remap_handle(map, self.root, policy).unwrap_or(clone_root);

        let channels = self.animation.as_ref().map(|a| &a.channels);
        let mut dropped = Vec::new();
        self.bindings.retain_mut(|binding| match remap_handle(map, binding.node, policy) {
            Some(node) => {
                binding.node = node;
                true
            }
            None => {
                if let Some(channel) = channels.and_then(|c| c.get(binding.channel_index)) {
                    dropped.push(channel.target.clone());
                }
                false
            }
        });
        self.unresolved.extend(dropped);
    }
}
