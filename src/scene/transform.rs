use std::cell::Cell;

use glam::{Affine3A, EulerRot, Mat3, Mat4, Quat, Vec3};

/// Transform component
///
/// Holds a node's local position, rotation and scale together with the cached
/// local and world matrices. Both caches are rebuilt lazily: the local matrix
/// when a TRS field changes, the world matrix when the graph asks for it after
/// the node or one of its ancestors was marked dirty.
///
/// Mutation goes through [`SceneGraph`](crate::scene::SceneGraph) for nodes
/// that live in a graph, since only the graph can propagate the dirty flag
/// to descendants.
#[derive(Debug, Clone)]
pub struct Transform {
    position: Vec3,
    rotation: Quat,
    scale: Vec3,

    local_matrix: Cell<Affine3A>,
    local_dirty: Cell<bool>,

    world_matrix: Cell<Affine3A>,
    world_dirty: Cell<bool>,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,

            local_matrix: Cell::new(Affine3A::IDENTITY),
            local_dirty: Cell::new(false),

            world_matrix: Cell::new(Affine3A::IDENTITY),
            world_dirty: Cell::new(true),
        }
    }

    #[must_use]
    pub fn from_trs(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        let mut t = Self::new();
        t.position = position;
        t.rotation = rotation;
        t.scale = scale;
        t.local_dirty.set(true);
        t
    }

    // ========================================================================
    // TRS
    // ========================================================================

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[inline]
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.mark_local_dirty();
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
        self.mark_local_dirty();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.mark_local_dirty();
    }

    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) {
        self.set_rotation(Quat::from_euler(EulerRot::XYZ, x, y, z));
    }

    /// Euler angles in XYZ order.
    pub fn rotation_euler(&self) -> Vec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        Vec3::new(x, y, z)
    }

    /// Replaces the TRS fields by decomposing `mat`.
    ///
    /// Shear cannot be represented by TRS and is lost.
    pub fn apply_local_matrix(&mut self, mat: Affine3A) {
        let (scale, rotation, translation) = mat.to_scale_rotation_translation();
        self.scale = scale;
        self.rotation = rotation;
        self.position = translation;

        self.local_matrix.set(Affine3A::from_scale_rotation_translation(
            scale,
            rotation,
            translation,
        ));
        self.local_dirty.set(false);
        self.world_dirty.set(true);
    }

    pub fn apply_local_matrix_from_mat4(&mut self, mat: Mat4) {
        self.apply_local_matrix(Affine3A::from_mat4(mat));
    }

    /// Rotates so that -Z points at `target`.
    ///
    /// `target` and `up` are in the parent's space. Degenerate input (target
    /// along `up`) leaves the rotation untouched.
    pub fn look_at(&mut self, target: Vec3, up: Vec3) {
        let forward = (target - self.position).normalize_or_zero();
        if forward.cross(up).length_squared() < 1e-4 {
            return;
        }

        let right = forward.cross(up).normalize();
        let new_up = right.cross(forward).normalize();

        let rot_mat = Mat3::from_cols(right, new_up, -forward);
        self.set_rotation(Quat::from_mat3(&rot_mat));
    }

    // ========================================================================
    // Matrix caches
    // ========================================================================

    /// Local matrix, rebuilt from TRS if a field changed since the last call.
    pub fn local_matrix(&self) -> Affine3A {
        if self.local_dirty.get() {
            self.local_matrix.set(Affine3A::from_scale_rotation_translation(
                self.scale,
                self.rotation,
                self.position,
            ));
            self.local_dirty.set(false);
        }
        self.local_matrix.get()
    }

    /// Last resolved world matrix. Only meaningful when not dirty.
    #[inline]
    pub(crate) fn cached_world_matrix(&self) -> Affine3A {
        self.world_matrix.get()
    }

    #[inline]
    pub(crate) fn store_world_matrix(&self, mat: Affine3A) {
        self.world_matrix.set(mat);
        self.world_dirty.set(false);
    }

    #[inline]
    pub fn is_world_dirty(&self) -> bool {
        self.world_dirty.get()
    }

    #[inline]
    pub(crate) fn mark_world_dirty(&self) {
        self.world_dirty.set(true);
    }

    fn mark_local_dirty(&mut self) {
        self.local_dirty.set(true);
        self.world_dirty.set(true);
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
