use glam::Vec3;
use uuid::Uuid;

use crate::resources::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    /// Distance beyond which the light has no effect. `None` means unbounded.
    pub range: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Parallel light shining down the node's local -Z axis.
    Directional,
    Point(PointLight),
    /// Uniform light with no position or direction.
    Ambient,
}

/// Light component carried by a node.
#[derive(Debug, Clone)]
pub struct Light {
    pub uuid: Uuid,
    pub color: Color,
    pub energy: f32,
    pub kind: LightKind,
    pub enabled: bool,
}

impl Light {
    fn with_kind(color: Color, energy: f32, kind: LightKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            color,
            energy,
            kind,
            enabled: true,
        }
    }

    #[must_use]
    pub fn new_directional(color: Color, energy: f32) -> Self {
        Self::with_kind(color, energy, LightKind::Directional)
    }

    #[must_use]
    pub fn new_point(color: Color, energy: f32, range: Option<f32>) -> Self {
        Self::with_kind(color, energy, LightKind::Point(PointLight { range }))
    }

    #[must_use]
    pub fn new_ambient(color: Color, energy: f32) -> Self {
        Self::with_kind(color, energy, LightKind::Ambient)
    }

    /// Color premultiplied by energy.
    pub fn radiance(&self) -> Vec3 {
        Vec3::new(self.color.r, self.color.g, self.color.b) * self.energy
    }
}
