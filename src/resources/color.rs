use glam::Vec4;

/// RGBA color with `f32` channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub fn from_slice(values: &[f32]) -> Self {
        let get = |i: usize, default: f32| values.get(i).copied().unwrap_or(default);
        Self::new(get(0, 0.0), get(1, 0.0), get(2, 0.0), get(3, 1.0))
    }

    pub fn set_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.r = r;
        self.g = g;
        self.b = b;
    }

    pub fn add_rgb(&mut self, value: f32) {
        self.r += value;
        self.g += value;
        self.b += value;
    }

    /// Converts the RGB channels from linear space to sRGB in place.
    /// Alpha is left untouched.
    pub fn convert_to_srgb(&mut self) {
        self.r = linear_to_srgb(self.r);
        self.g = linear_to_srgb(self.g);
        self.b = linear_to_srgb(self.b);
    }

    #[must_use]
    pub fn to_srgb(mut self) -> Self {
        self.convert_to_srgb();
        self
    }

    #[inline]
    #[must_use]
    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<Vec4> for Color {
    fn from(v: Vec4) -> Self {
        Self::new(v.x, v.y, v.z, v.w)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}
