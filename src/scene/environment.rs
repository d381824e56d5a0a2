//! Per-scene world settings: clear color and fog.

use glam::Vec4;

use crate::resources::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FogMode {
    #[default]
    Off,
    /// Fog color is added to the shaded result.
    Additive,
    /// Shaded result is multiplied by the fog color.
    Multiply,
    /// Fog color replaces the shaded result.
    Overwrite,
}

impl FogMode {
    /// Parses the authoring tool's fog mode names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "OFF" => Some(Self::Off),
            "ADDITIVE" => Some(Self::Additive),
            "MULTIPLY" => Some(Self::Multiply),
            "OVERWRITE" => Some(Self::Overwrite),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub clear_color: Color,
    pub fog_mode: FogMode,
    pub fog_color: Color,
    /// Start and end of the fog ramp, as fractions of the camera depth range.
    pub fog_range: [f32; 2],
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self {
            clear_color: Color::BLACK,
            fog_mode: FogMode::Off,
            fog_color: Color::BLACK,
            fog_range: [0.0, 1.0],
        }
    }

    /// Fog color with the mode encoded in `w`, the layout a shader expects.
    pub fn fog_as_vec4(&self) -> Vec4 {
        let mode = match self.fog_mode {
            FogMode::Off => 0.0,
            FogMode::Additive => 1.0,
            FogMode::Multiply => 2.0,
            FogMode::Overwrite => 3.0,
        };
        Vec4::new(self.fog_color.r, self.fog_color.g, self.fog_color.b, mode)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
