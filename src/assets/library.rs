use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::animation::Animation;
use crate::errors::{MythError, Result};
use crate::resources::{Material, Mesh};
use crate::scene::{NodeHandle, Scene, SceneGraph};

/// Everything one import produced.
///
/// The library owns the node arena for all of its scenes, and the named
/// meshes, materials and animations those nodes share.
#[derive(Debug, Default)]
pub struct Library {
    pub graph: SceneGraph,
    pub scenes: Vec<Scene>,
    pub meshes: FxHashMap<String, Arc<Mesh>>,
    pub materials: FxHashMap<String, Arc<Material>>,
    pub animations: FxHashMap<String, Arc<Animation>>,
    /// Index into `scenes` of the document's default scene.
    pub exported_scene: Option<usize>,
    /// Non-fatal problems met during import, such as unresolved references.
    pub diagnostics: Vec<MythError>,
}

impl Library {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty scene with its root node and returns its index.
    pub fn add_scene(&mut self, name: &str) -> usize {
        let scene = Scene::new(name, &mut self.graph);
        self.scenes.push(scene);
        self.scenes.len() - 1
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.name == name)
    }

    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.name == name)
    }

    pub fn exported_scene(&self) -> Option<&Scene> {
        self.exported_scene.and_then(|i| self.scenes.get(i))
    }

    /// Copies scene `index` (deep-cloning its node tree) and returns the new
    /// scene's index.
    pub fn duplicate_scene(&mut self, index: usize) -> Result<usize> {
        let scene = self.scenes.get(index).ok_or(MythError::InvalidHandle)?;
        let copy = scene.duplicate(&mut self.graph)?;
        self.scenes.push(copy);
        Ok(self.scenes.len() - 1)
    }

    /// First node named `name`, searching each scene in order.
    pub fn find_node(&self, name: &str) -> Option<NodeHandle> {
        self.scenes
            .iter()
            .find_map(|scene| scene.find_node(&self.graph, name))
    }

    pub fn mesh(&self, name: &str) -> Option<&Arc<Mesh>> {
        self.meshes.get(name)
    }

    pub fn material(&self, name: &str) -> Option<&Arc<Material>> {
        self.materials.get(name)
    }

    pub fn animation(&self, name: &str) -> Option<&Arc<Animation>> {
        self.animations.get(name)
    }
}
