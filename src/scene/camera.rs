use glam::{Affine3A, Mat4};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// Camera component carried by a node.
///
/// Only projection parameters live here. The view comes from the owning
/// node's world matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub projection_type: ProjectionType,
    /// Vertical field of view, in degrees.
    pub field_of_view: f32,
    pub near: f32,
    pub far: f32,
    /// Half-height of the orthographic view volume.
    pub ortho_scale: f32,

    // Render target size. Importers fill these from their options.
    pub width: u32,
    pub height: u32,
    pub render_depth: bool,
}

impl Camera {
    #[must_use]
    pub fn new_perspective(field_of_view: f32, near: f32, far: f32) -> Self {
        Self {
            projection_type: ProjectionType::Perspective,
            field_of_view,
            near,
            far,
            ortho_scale: 20.0,
            width: 1920,
            height: 1080,
            render_depth: true,
        }
    }

    #[must_use]
    pub fn new_orthographic(ortho_scale: f32, near: f32, far: f32) -> Self {
        Self {
            projection_type: ProjectionType::Orthographic,
            ortho_scale,
            ..Self::new_perspective(60.0, near, far)
        }
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection_type {
            ProjectionType::Perspective => Mat4::perspective_rh(
                self.field_of_view.to_radians(),
                self.aspect(),
                self.near,
                self.far,
            ),
            ProjectionType::Orthographic => {
                let h = self.ortho_scale;
                let w = h * self.aspect();
                Mat4::orthographic_rh(-w, w, -h, h, self.near, self.far)
            }
        }
    }

    /// View matrix for a camera node whose world matrix is `world`.
    pub fn view_matrix(world: &Affine3A) -> Mat4 {
        Mat4::from(world.inverse())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new_perspective(60.0, 0.1, 100.0)
    }
}
