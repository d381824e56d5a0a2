use uuid::Uuid;

use crate::resources::color::Color;
use crate::resources::tags::Tags;

/// Where a material's base color texture comes from.
///
/// Decoding images is left to the host application; the importer only records
/// which packed image (by document index) or which external file to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    /// An image packed into the source document, by image index.
    Packed(usize),
    /// An external image file referenced by URI.
    Path(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    #[default]
    SourceOver,
    Lighter,
    DestinationOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BillboardMode {
    #[default]
    None,
    /// Faces the camera, rotating around the Y axis only.
    XZ,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TransparencyMode {
    /// Decided per draw from the material and vertex alpha.
    #[default]
    Auto,
    Opaque,
    AlphaClip(f32),
    Transparent,
}

/// Surface description shared by any number of mesh parts.
#[derive(Debug, Clone)]
pub struct Material {
    pub id: Uuid,
    pub name: String,
    pub color: Color,
    pub texture: Option<TextureSource>,
    pub backface_culling: bool,
    pub shadeless: bool,
    pub composite_mode: CompositeMode,
    pub billboard_mode: BillboardMode,
    pub transparency_mode: TransparencyMode,
    pub tags: Tags,
}

impl Material {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            color: Color::WHITE,
            texture: None,
            backface_culling: true,
            shadeless: false,
            composite_mode: CompositeMode::default(),
            billboard_mode: BillboardMode::default(),
            transparency_mode: TransparencyMode::default(),
            tags: Tags::new(),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new("Material")
    }
}
