use glam::{Quat, Vec3};

use crate::animation::tracks::{KeyframeCursor, KeyframeTrack};
use crate::resources::Tags;

/// Tracks for one target node, addressed by the node's name.
///
/// A channel is not bound to any node until a player binds its animation to
/// a concrete subtree.
#[derive(Debug, Clone, Default)]
pub struct Channel {
    pub target: String,
    pub translation: Option<KeyframeTrack<Vec3>>,
    pub rotation: Option<KeyframeTrack<Quat>>,
    pub scale: Option<KeyframeTrack<Vec3>>,
}

/// One cursor per property track of a channel.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelCursors {
    pub translation: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

/// Result of sampling a channel: one value per track the channel has.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ChannelSample {
    pub translation: Option<Vec3>,
    pub rotation: Option<Quat>,
    pub scale: Option<Vec3>,
}

impl Channel {
    #[must_use]
    pub fn new(target: &str) -> Self {
        Self {
            target: target.to_string(),
            ..Self::default()
        }
    }

    /// Time of the latest keyframe over all tracks.
    pub fn length(&self) -> f32 {
        let translation = self.translation.as_ref().map_or(0.0, KeyframeTrack::length);
        let rotation = self.rotation.as_ref().map_or(0.0, KeyframeTrack::length);
        let scale = self.scale.as_ref().map_or(0.0, KeyframeTrack::length);
        translation.max(rotation).max(scale)
    }

    pub fn sample(&self, time: f32, cursors: &mut ChannelCursors) -> ChannelSample {
        ChannelSample {
            translation: self
                .translation
                .as_ref()
                .and_then(|t| t.sample_with_cursor(time, &mut cursors.translation)),
            rotation: self
                .rotation
                .as_ref()
                .and_then(|t| t.sample_with_cursor(time, &mut cursors.rotation)),
            scale: self
                .scale
                .as_ref()
                .and_then(|t| t.sample_with_cursor(time, &mut cursors.scale)),
        }
    }
}

/// A named point in time that players report when crossing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub name: String,
    pub time: f32,
}

/// Named set of channels shared by every player that plays it.
#[derive(Debug, Clone)]
pub struct Animation {
    pub name: String,
    /// Playback length. Defaults to the latest keyframe over all channels.
    pub length: f32,
    pub channels: Vec<Channel>,
    /// Sorted by time.
    pub markers: Vec<Marker>,
    pub tags: Tags,
}

impl Animation {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            length: 0.0,
            channels: Vec::new(),
            markers: Vec::new(),
            tags: Tags::new(),
        }
    }

    /// Returns the channel targeting `target`, creating it if needed.
    pub fn channel_mut(&mut self, target: &str) -> &mut Channel {
        let index = match self.channels.iter().position(|c| c.target == target) {
            Some(index) => index,
            None => {
                self.channels.push(Channel::new(target));
                self.channels.len() - 1
            }
        };
        &mut self.channels[index]
    }

    pub fn channel(&self, target: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.target == target)
    }

    pub fn add_marker(&mut self, name: &str, time: f32) {
        let idx = self.markers.partition_point(|m| m.time <= time);
        self.markers.insert(
            idx,
            Marker {
                name: name.to_string(),
                time,
            },
        );
    }

    /// Sets [`Animation::length`] from the channels' keyframes.
    pub fn update_length(&mut self) {
        self.length = self.channels.iter().map(Channel::length).fold(0.0_f32, f32::max);
    }
}
