//! Keyframe animation
//!
//! - [`KeyframeTrack`]: time-ordered keyframes for one property
//! - [`Animation`]: named channels, each targeting a node by name
//! - [`Binder`]: resolves channel targets to live nodes
//! - [`AnimationPlayer`]: per-node playback state that writes poses
//! - [`AnimationSystem`]: updates every node-owned player

pub mod binder;
pub mod clip;
pub mod player;
pub mod system;
pub mod tracks;
mod values;

pub use binder::{BindResult, Binder, ChannelBinding};
pub use clip::{Animation, Channel, ChannelCursors, ChannelSample, Marker};
pub use player::{AnimationPlayer, LoopMode};
pub use system::AnimationSystem;
pub use tracks::{InterpolationMode, Keyframe, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
