use crate::resources::Tags;
use crate::scene::NodeHandle;
use crate::scene::environment::Environment;
use crate::scene::graph::SceneGraph;
use crate::scene::node::Node;

/// A named root node inside a library's [`SceneGraph`], with its world
/// settings.
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: String,
    pub root: NodeHandle,
    pub environment: Environment,
    pub tags: Tags,
}

impl Scene {
    /// Creates the scene and its root node (named `"Root"`) in `graph`.
    pub fn new(name: &str, graph: &mut SceneGraph) -> Self {
        Self {
            name: name.to_string(),
            root: graph.create_node("Root"),
            environment: Environment::new(),
            tags: Tags::new(),
        }
    }

    pub fn find_node(&self, graph: &SceneGraph, name: &str) -> Option<NodeHandle> {
        graph.find_by_name(self.root, name)
    }

    pub fn find_by_tag(&self, graph: &SceneGraph, tag: &str) -> Vec<NodeHandle> {
        graph.find_by_tag(self.root, tag)
    }

    pub fn filter_nodes<F>(&self, graph: &SceneGraph, predicate: F) -> Vec<NodeHandle>
    where
        F: FnMut(&Node) -> bool,
    {
        graph.filter_nodes(self.root, predicate)
    }

    /// Copies the scene, including a deep clone of its node tree.
    pub fn duplicate(&self, graph: &mut SceneGraph) -> crate::errors::Result<Scene> {
        Ok(Scene {
            name: self.name.clone(),
            root: graph.clone_subtree(self.root)?,
            environment: self.environment.clone(),
            tags: self.tags.clone(),
        })
    }
}
