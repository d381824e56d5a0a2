use std::path::{Path, PathBuf};
use std::sync::Arc;

use glam::{Affine3A, Mat4, Quat, Vec2, Vec3};
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::animation::{Animation, Interpolatable, InterpolationMode, KeyframeTrack};
use crate::assets::io::{self, FileAssetReader};
use crate::assets::library::Library;
use crate::assets::loaders::extras::{self, BoundsType, CollectionInfo, Extras};
use crate::assets::options::ImportOptions;
use crate::errors::{MythError, ReferenceKind, Result};
use crate::resources::{
    BillboardMode, Color, CompositeMode, Material, Mesh, TextureSource, TransparencyMode, Vertex,
};
use crate::scene::{
    BoundingVolume, Camera, Environment, FogMode, Light, Model, Node, NodeHandle, NodeKind,
    SceneGraph, Skin, Transform,
};
use crate::scene::Path as PathNode;

/// Vertex-color channels read per primitive.
const MAX_COLOR_CHANNELS: u32 = 8;
/// Far plane used when a perspective camera declares none (infinite projection).
const DEFAULT_FAR: f32 = 1000.0;

const SUPPORTED_EXTENSIONS: &[&str] = &["KHR_lights_punctual"];

// ============================================================================
// 1. Exporter settings
// ============================================================================

/// Document-wide settings the vendor exporter stores on the first scene.
#[derive(Debug, Default)]
struct ExporterSettings {
    /// Set when the document carries any exporter key.
    vendor_export: bool,
    /// Textures are packed into the document rather than referenced by path.
    packed_textures: bool,
    collections: FxHashMap<String, CollectionInfo>,
}

impl ExporterSettings {
    fn read(document: &gltf::Document) -> Result<Self> {
        let mut settings = Self {
            packed_textures: true,
            ..Self::default()
        };
        let Some(first) = document.scenes().next() else {
            return Ok(settings);
        };

        let extras = Extras::parse(first.extras());
        if extras.has(extras::PACK_TEXTURES) {
            settings.vendor_export = true;
            settings.packed_textures = extras.bool_or(extras::PACK_TEXTURES, true);
        }
        if extras.has(extras::COLLECTIONS) {
            settings.vendor_export = true;
            settings.collections = extras.collections()?;
        }
        Ok(settings)
    }
}

// ============================================================================
// 2. Import context
// ============================================================================

/// State threaded through the import phases.
///
/// Each phase reads what the earlier ones produced: meshes need materials,
/// nodes need meshes, skins need a wired hierarchy, bounds need finished
/// transforms, and collections need everything above.
struct ImportContext<'a> {
    document: &'a gltf::Document,
    buffers: &'a [Vec<u8>],
    options: &'a ImportOptions,
    settings: ExporterSettings,

    library: Library,

    // Indexed like the document arrays.
    materials: Vec<Arc<Material>>,
    meshes: Vec<Arc<Mesh>>,
    nodes: Vec<NodeHandle>,
    node_extras: Vec<Extras>,
}

impl<'a> ImportContext<'a> {
    fn new(
        document: &'a gltf::Document,
        buffers: &'a [Vec<u8>],
        options: &'a ImportOptions,
    ) -> Result<Self> {
        Ok(Self {
            document,
            buffers,
            options,
            settings: ExporterSettings::read(document)?,
            library: Library::new(),
            materials: Vec::new(),
            meshes: Vec::new(),
            nodes: Vec::new(),
            node_extras: Vec::new(),
        })
    }

    fn run(mut self) -> Result<Library> {
        self.load_materials();
        self.load_meshes()?;
        self.load_animations()?;
        self.instantiate_nodes()?;
        self.wire_hierarchy()?;
        self.resolve_skins()?;
        self.resolve_node_metadata()?;
        self.instance_collections()?;
        self.assemble_scenes()?;

        log::debug!(
            "Imported {} scenes, {} nodes, {} meshes, {} animations ({} diagnostics)",
            self.library.scenes.len(),
            self.library.graph.len(),
            self.library.meshes.len(),
            self.library.animations.len(),
            self.library.diagnostics.len()
        );
        Ok(self.library)
    }

    fn handle(&self, index: usize) -> Result<NodeHandle> {
        self.nodes
            .get(index)
            .copied()
            .ok_or_else(|| MythError::decode(format!("Reference to missing node {index}")))
    }

    fn report_unresolved(&mut self, kind: ReferenceKind, name: &str) {
        let error = MythError::unresolved(kind, name);
        log::warn!("{error}");
        self.library.diagnostics.push(error);
    }

    // --- Materials ---

    fn load_materials(&mut self) {
        let document = self.document;
        for material in document.materials() {
            let name = material
                .name()
                .map_or_else(|| format!("Material_{}", self.materials.len()), str::to_string);
            let mut mat = Material::new(&name);
            mat.backface_culling = !material.double_sided();

            let pbr = material.pbr_metallic_roughness();
            if let Some(info) = pbr.base_color_texture() {
                mat.texture = Some(texture_source(
                    &info.texture().source(),
                    self.settings.packed_textures,
                ));
            }

            let extras = Extras::parse(material.extras());
            if let Some(color) = extras.color(extras::MATERIAL_COLOR) {
                mat.color = color;
            }
            mat.shadeless = extras.bool_or(extras::MATERIAL_SHADELESS, false);

            match extras.int(extras::COMPOSITE_MODE) {
                Some(0) => mat.composite_mode = CompositeMode::SourceOver,
                Some(1) => mat.composite_mode = CompositeMode::Lighter,
                Some(3) => mat.composite_mode = CompositeMode::DestinationOut,
                Some(other) => log::debug!("Material '{name}': unsupported composite mode {other}"),
                None => {}
            }
            match extras.int(extras::BILLBOARD_MODE) {
                Some(0) => mat.billboard_mode = BillboardMode::None,
                Some(1) => mat.billboard_mode = BillboardMode::XZ,
                Some(2) => mat.billboard_mode = BillboardMode::All,
                Some(other) => log::debug!("Material '{name}': unsupported billboard mode {other}"),
                None => {}
            }
            extras.copy_user_tags(&mut mat.tags);

            // Documents from other exporters only carry the PBR factor.
            if !self.settings.vendor_export {
                mat.color = Color::from_slice(&pbr.base_color_factor());
            }
            mat.color.convert_to_srgb();

            mat.transparency_mode = match material.alpha_mode() {
                gltf::material::AlphaMode::Opaque if self.options.default_to_auto_transparency => {
                    TransparencyMode::Auto
                }
                gltf::material::AlphaMode::Opaque => TransparencyMode::Opaque,
                gltf::material::AlphaMode::Blend => TransparencyMode::Transparent,
                gltf::material::AlphaMode::Mask => {
                    TransparencyMode::AlphaClip(material.alpha_cutoff().unwrap_or(0.5))
                }
            };

            let mat = Arc::new(mat);
            self.library.materials.insert(name, Arc::clone(&mat));
            self.materials.push(mat);
        }
    }

    // --- Meshes ---

    fn load_meshes(&mut self) -> Result<()> {
        let document = self.document;
        let buffers = self.buffers;

        for mesh in document.meshes() {
            let name = mesh
                .name()
                .map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string);
            let mut new_mesh = Mesh::new(&name);

            let extras = Extras::parse(mesh.extras());
            if let Some(names) = extras.get(extras::VERTEX_COLOR_NAMES).and_then(Value::as_array) {
                for (index, channel) in names.iter().enumerate() {
                    if let Some(channel) = channel.as_str() {
                        new_mesh.vertex_color_channels.insert(channel.to_string(), index);
                    }
                }
            }
            extras.copy_user_tags(&mut new_mesh.tags);

            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::warn!(
                        "Mesh '{name}': skipping primitive {} with mode {:?}",
                        primitive.index(),
                        primitive.mode()
                    );
                    continue;
                }

                let reader = primitive.reader(|b| buffers.get(b.index()).map(Vec::as_slice));

                let mut vertices: Vec<Vertex> = reader
                    .read_positions()
                    .ok_or_else(|| {
                        MythError::decode(format!("Mesh '{name}' has a primitive without positions"))
                    })?
                    .map(|p| Vertex::new(Vec3::from_array(p)))
                    .collect();

                if let Some(uvs) = reader.read_tex_coords(0) {
                    for (vertex, uv) in vertices.iter_mut().zip(uvs.into_f32()) {
                        vertex.uv = Vec2::new(uv[0], 1.0 - uv[1]);
                    }
                }

                if let Some(normals) = reader.read_normals() {
                    for (vertex, normal) in vertices.iter_mut().zip(normals) {
                        vertex.normal = Vec3::from_array(normal);
                    }
                }

                // Colors are authored linear and displayed as sRGB.
                for set in 0..MAX_COLOR_CHANNELS {
                    let Some(colors) = reader.read_colors(set) else {
                        break;
                    };
                    for (vertex, color) in vertices.iter_mut().zip(colors.into_rgba_f32()) {
                        vertex.colors.push(Color::from_slice(&color).to_srgb());
                    }
                }

                if let Some(weights) = reader.read_weights(0) {
                    match reader.read_joints(0) {
                        Some(joints) => {
                            for ((vertex, joint), weight) in vertices
                                .iter_mut()
                                .zip(joints.into_u16())
                                .zip(weights.into_f32())
                            {
                                for (&j, &w) in joint.iter().zip(&weight) {
                                    vertex.push_bone(j, w);
                                }
                            }
                        }
                        None => log::warn!("Mesh '{name}': weights without joints are ignored"),
                    }
                }

                let triangles = match reader.read_indices() {
                    Some(indices) => indices
                        .into_u32()
                        .map(|i| {
                            vertices.get(i as usize).cloned().ok_or_else(|| {
                                MythError::decode(format!(
                                    "Mesh '{name}': index {i} is out of range ({} vertices)",
                                    vertices.len()
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?,
                    None => vertices,
                };

                let material = primitive
                    .material()
                    .index()
                    .and_then(|i| self.materials.get(i))
                    .cloned();
                new_mesh.add_part(material).add_triangles(triangles);
            }

            new_mesh.update_bounds();
            let new_mesh = Arc::new(new_mesh);
            self.library.meshes.insert(name, Arc::clone(&new_mesh));
            self.meshes.push(new_mesh);
        }
        Ok(())
    }

    // --- Animations ---

    /// Channels are keyed by target node name. They bind to live nodes only
    /// when a player is given the animation.
    fn load_animations(&mut self) -> Result<()> {
        use gltf::animation::util::ReadOutputs;

        let document = self.document;
        let buffers = self.buffers;

        for animation in document.animations() {
            let name = animation
                .name()
                .map_or_else(|| format!("Animation_{}", animation.index()), str::to_string);
            let mut anim = Animation::new(&name);

            for channel in animation.channels() {
                let target = node_name(&channel.target().node());
                let reader = channel.reader(|b| buffers.get(b.index()).map(Vec::as_slice));

                let times: Vec<f32> = reader
                    .read_inputs()
                    .ok_or_else(|| {
                        MythError::decode(format!("Animation '{name}': channel without input times"))
                    })?
                    .collect();
                let interpolation = match channel.sampler().interpolation() {
                    gltf::animation::Interpolation::Step => InterpolationMode::Step,
                    gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
                    gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
                };
                let outputs = reader.read_outputs().ok_or_else(|| {
                    MythError::decode(format!("Animation '{name}': channel without output values"))
                })?;

                match outputs {
                    ReadOutputs::Translations(iter) => {
                        let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                        anim.channel_mut(&target).translation =
                            Some(build_track(&name, &times, &values, interpolation)?);
                    }
                    ReadOutputs::Rotations(iter) => {
                        let values: Vec<Quat> = iter.into_f32().map(Quat::from_array).collect();
                        anim.channel_mut(&target).rotation =
                            Some(build_track(&name, &times, &values, interpolation)?);
                    }
                    ReadOutputs::Scales(iter) => {
                        let values: Vec<Vec3> = iter.map(Vec3::from_array).collect();
                        anim.channel_mut(&target).scale =
                            Some(build_track(&name, &times, &values, interpolation)?);
                    }
                    ReadOutputs::MorphTargetWeights(_) => {
                        log::debug!("Animation '{name}': morph target weights on '{target}' ignored");
                    }
                }
            }

            let extras = Extras::parse(animation.extras());
            for (marker, time) in extras.markers() {
                anim.add_marker(&marker, time);
            }
            extras.copy_user_tags(&mut anim.tags);
            anim.update_length();

            self.library.animations.insert(name, Arc::new(anim));
        }
        Ok(())
    }

    // --- Nodes ---

    fn instantiate_nodes(&mut self) -> Result<()> {
        let document = self.document;
        for node in document.nodes() {
            let extras = Extras::parse(node.extras());
            let name = node_name(&node);

            let kind = if let Some(mesh) = node.mesh() {
                let mesh = self.meshes.get(mesh.index()).cloned().ok_or_else(|| {
                    MythError::decode(format!("Node '{name}' references missing mesh"))
                })?;
                NodeKind::Model(Model::new(mesh))
            } else if let Some(camera) = node.camera() {
                NodeKind::Camera(self.convert_camera(&camera))
            } else if let Some(light) = node.light() {
                NodeKind::Light(convert_light(&light))
            } else if let Some(points) = extras.path_points() {
                NodeKind::Path(PathNode::new(points, extras.bool_or(extras::PATH_CYCLIC, false)))
            } else {
                NodeKind::Empty
            };

            let transform = match node.transform() {
                gltf::scene::Transform::Matrix { matrix } => {
                    let mut transform = Transform::new();
                    transform.apply_local_matrix_from_mat4(Mat4::from_cols_array_2d(&matrix));
                    transform
                }
                gltf::scene::Transform::Decomposed {
                    translation,
                    rotation,
                    scale,
                } => Transform::from_trs(
                    Vec3::from_array(translation),
                    Quat::from_array(rotation),
                    Vec3::from_array(scale),
                ),
            };

            let mut scene_node = Node::with_kind(&name, kind).with_transform(transform);
            scene_node.visible = extras.bool_or(extras::VISIBLE, true);
            scene_node.original_local_position = extras
                .point(extras::ORIGINAL_LOCAL_POSITION)
                .unwrap_or(Vec3::ZERO);
            extras.copy_user_tags(&mut scene_node.tags);

            self.nodes.push(self.library.graph.add_node(scene_node));
            self.node_extras.push(extras);
        }
        Ok(())
    }

    fn convert_camera(&self, camera: &gltf::Camera) -> Camera {
        let mut converted = match camera.projection() {
            gltf::camera::Projection::Perspective(p) => Camera::new_perspective(
                p.yfov().to_degrees(),
                p.znear(),
                p.zfar().unwrap_or(DEFAULT_FAR),
            ),
            gltf::camera::Projection::Orthographic(o) => {
                Camera::new_orthographic(o.xmag(), o.znear(), o.zfar())
            }
        };
        converted.width = self.options.camera_width;
        converted.height = self.options.camera_height;
        converted.render_depth = self.options.camera_depth;
        converted
    }

    /// Two passes over the node list: all nodes exist before any edge is
    /// wired, so children may appear before their parents in the document.
    fn wire_hierarchy(&mut self) -> Result<()> {
        let document = self.document;
        for node in document.nodes() {
            let parent = self.handle(node.index())?;
            for child in node.children() {
                let child_handle = self.handle(child.index())?;
                if self.library.graph.parent(child_handle).is_some() {
                    return Err(MythError::decode(format!(
                        "Node {} is listed as a child of more than one node",
                        child.index()
                    )));
                }
                self.library
                    .graph
                    .attach(child_handle, parent)
                    .map_err(|e| match e {
                        MythError::HierarchyCycle => MythError::decode(format!(
                            "Node hierarchy has a cycle through node {}",
                            child.index()
                        )),
                        other => other,
                    })?;
            }
        }
        Ok(())
    }

    // --- Skins ---

    fn resolve_skins(&mut self) -> Result<()> {
        let document = self.document;
        let buffers = self.buffers;
        let mut skinned = Vec::new();

        for node in document.nodes() {
            let Some(skin) = node.skin() else {
                continue;
            };
            let model = self.handle(node.index())?;
            let joints = skin
                .joints()
                .map(|joint| self.handle(joint.index()))
                .collect::<Result<Vec<_>>>()?;

            let reader = skin.reader(|b| buffers.get(b.index()).map(Vec::as_slice));
            let inverse_binds: Vec<Affine3A> = match reader.read_inverse_bind_matrices() {
                Some(iter) => iter
                    .map(|m| Affine3A::from_mat4(Mat4::from_cols_array_2d(&m)))
                    .collect(),
                None => vec![Affine3A::IDENTITY; joints.len()],
            };
            if inverse_binds.len() < joints.len() {
                return Err(MythError::decode(format!(
                    "Skin {} has {} joints but {} inverse bind matrices",
                    skin.index(),
                    joints.len(),
                    inverse_binds.len()
                )));
            }

            let graph = &mut self.library.graph;
            for (&joint, inverse_bind) in joints.iter().zip(inverse_binds) {
                if let Some(bone) = graph.get_node_mut(joint) {
                    bone.is_bone = true;
                    bone.inverse_bind_matrix = inverse_bind;
                }
            }

            match graph.get_node_mut(model).and_then(Node::as_model_mut) {
                Some(m) => {
                    m.set_skin(Some(Skin::new(joints)));
                    skinned.push(model);
                }
                None => log::warn!("Node '{}' has a skin but no mesh", node_name(&node)),
            }
        }

        // Every bone is flagged and parented by now, so the upward walk sees
        // the finished skeleton.
        let graph = &mut self.library.graph;
        for model in skinned {
            let first_joint = graph
                .get_node(model)
                .and_then(Node::as_model)
                .and_then(Model::skin)
                .and_then(|s| s.joints.first().copied());
            let root = first_joint.and_then(|joint| graph.find_skin_root(joint));

            if let Some(skin) = graph
                .get_node_mut(model)
                .and_then(Node::as_model_mut)
                .and_then(|m| m.skin.as_mut())
            {
                skin.root = root;
            }
        }
        Ok(())
    }

    // --- Per-node metadata ---

    fn resolve_node_metadata(&mut self) -> Result<()> {
        let graph = &mut self.library.graph;
        for (&handle, extras) in self.nodes.iter().zip(&self.node_extras) {
            let properties = extras.game_properties();
            if let Some(node) = graph.get_node_mut(handle) {
                for (name, value) in properties {
                    node.tags.set(name, value);
                }
            }
            attach_bounds(graph, handle, extras)?;
        }
        Ok(())
    }

    // --- Collections ---

    fn instance_collections(&mut self) -> Result<()> {
        let requests: Vec<(NodeHandle, String)> = self
            .nodes
            .iter()
            .zip(&self.node_extras)
            .filter_map(|(&handle, extras)| {
                extras
                    .str(extras::INSTANCE_COLLECTION)
                    .map(|name| (handle, name.to_string()))
            })
            .collect();

        for (instancer, collection_name) in requests {
            let Some(collection) = self.settings.collections.get(&collection_name).cloned() else {
                self.report_unresolved(ReferenceKind::Collection, &collection_name);
                continue;
            };

            let offset = collection.offset();
            // Relative paths from the modeler carry a leading "//".
            let path = collection.path.replace("//", "");

            for object in &collection.objects {
                let clone = if path.is_empty() {
                    self.clone_local(object)?
                } else {
                    match self.clone_linked(object, &path)? {
                        Linked::Cloned(handle) => Some(handle),
                        Linked::NotFound => None,
                        Linked::Skipped => continue,
                    }
                };

                match clone {
                    Some(clone) => {
                        self.library.graph.attach(clone, instancer)?;
                        self.library.graph.move_local(clone, offset);
                    }
                    None => self.report_unresolved(ReferenceKind::CollectionObject, object),
                }
            }
        }
        Ok(())
    }

    fn clone_local(&mut self, object: &str) -> Result<Option<NodeHandle>> {
        let graph = &self.library.graph;
        let source = self
            .nodes
            .iter()
            .copied()
            .find(|&h| graph.get_node(h).is_some_and(|n| n.name == object));

        match source {
            Some(source) => self.library.graph.clone_subtree(source).map(Some),
            None => Ok(None),
        }
    }

    fn clone_linked(&mut self, object: &str, path: &str) -> Result<Linked> {
        let options = self.options;
        let Some(resolver) = &options.dependent_library_resolver else {
            let error = MythError::MissingResolver {
                object: object.to_string(),
                path: path.to_string(),
            };
            if options.missing_resolver_is_fatal {
                return Err(error);
            }
            log::error!("{error}");
            self.library.diagnostics.push(error);
            return Ok(Linked::Skipped);
        };

        let Some(linked) = resolver(path) else {
            log::warn!("Dependent library '{path}' could not be resolved");
            return Ok(Linked::NotFound);
        };
        let Some(source) = linked.find_node(object) else {
            return Ok(Linked::NotFound);
        };
        let clone = self.library.graph.clone_subtree_from(&linked.graph, source)?;
        Ok(Linked::Cloned(clone))
    }

    // --- Scenes ---

    fn assemble_scenes(&mut self) -> Result<()> {
        let document = self.document;
        for scene in document.scenes() {
            let name = scene
                .name()
                .map_or_else(|| format!("Scene_{}", scene.index()), str::to_string);
            let index = self.library.add_scene(&name);
            let root = self.library.scenes[index].root;

            for node in scene.nodes() {
                let handle = self.handle(node.index())?;
                if self.library.graph.parent(handle).is_some() {
                    log::warn!(
                        "Node '{}' already has a parent; moving it under scene '{name}'",
                        node_name(&node)
                    );
                }
                self.library.graph.attach(handle, root)?;
            }

            let extras = Extras::parse(scene.extras());
            if let Some(color) = extras.color(extras::WORLD_COLOR) {
                let color = Color::new(color.r, color.g, color.b, 1.0).to_srgb();
                let energy = extras.float_or(extras::WORLD_ENERGY, 1.0);
                let ambient = Node::with_kind(
                    "World Ambient",
                    NodeKind::Light(Light::new_ambient(color, energy)),
                );
                self.library.graph.add_to_parent(ambient, root)?;
            }

            let environment = read_environment(&extras, &name);
            let scene_entry = &mut self.library.scenes[index];
            scene_entry.environment = environment;
            extras.copy_user_tags(&mut scene_entry.tags);
        }

        self.library.exported_scene = match document.default_scene() {
            Some(scene) => Some(scene.index()),
            None if self.library.scenes.is_empty() => None,
            None => Some(0),
        };
        Ok(())
    }
}

/// Outcome of looking up an object in a dependent library.
enum Linked {
    Cloned(NodeHandle),
    NotFound,
    /// No resolver is configured; already recorded as a diagnostic.
    Skipped,
}

// ============================================================================
// 3. Conversion helpers
// ============================================================================

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map_or_else(|| format!("Node_{}", node.index()), str::to_string)
}

fn texture_source(image: &gltf::Image, packed: bool) -> TextureSource {
    match image.source() {
        gltf::image::Source::Uri { uri, .. } if !packed => TextureSource::Path(uri.to_string()),
        _ => TextureSource::Packed(image.index()),
    }
}

fn convert_light(light: &gltf::khr_lights_punctual::Light) -> Light {
    use gltf::khr_lights_punctual::Kind;

    let color = Color::from_slice(&light.color());
    match light.kind() {
        Kind::Directional => Light::new_directional(color, light.intensity()),
        Kind::Point => Light::new_point(
            color,
            light.intensity() / 1000.0,
            light.range().filter(|r| r.is_finite()),
        ),
        // Spot lights have no counterpart and degrade to ambient light.
        Kind::Spot { .. } => Light::new_ambient(color, light.intensity() / 1000.0),
    }
}

fn build_track<T: Interpolatable>(
    animation: &str,
    times: &[f32],
    values: &[T],
    interpolation: InterpolationMode,
) -> Result<KeyframeTrack<T>> {
    let per_key = if interpolation == InterpolationMode::CubicSpline { 3 } else { 1 };
    if values.len() < times.len() * per_key {
        return Err(MythError::decode(format!(
            "Animation '{animation}': {} keyframes but only {} output values",
            times.len(),
            values.len()
        )));
    }

    Ok(match interpolation {
        InterpolationMode::CubicSpline => KeyframeTrack::from_cubic_triplets(times, values),
        mode => KeyframeTrack::from_samples(times, values, mode),
    })
}

fn read_environment(extras: &Extras, scene: &str) -> Environment {
    let mut environment = Environment::new();
    if let Some(color) = extras.color(extras::CLEAR_COLOR) {
        environment.clear_color = color.to_srgb();
    }
    if let Some(mode) = extras.str(extras::FOG_MODE) {
        match FogMode::from_name(mode) {
            Some(mode) => environment.fog_mode = mode,
            None => log::warn!("Scene '{scene}': unknown fog mode '{mode}'"),
        }
    }
    if let Some(color) = extras.color(extras::FOG_COLOR) {
        environment.fog_color = color.to_srgb();
    }
    environment.fog_range[0] = extras.float_or(extras::FOG_RANGE_START, environment.fog_range[0]);
    environment.fog_range[1] = extras.float_or(extras::FOG_RANGE_END, environment.fog_range[1]);
    environment
}

/// Adds the bounding-volume child a node asks for.
///
/// Sizes come from the custom keys when enabled, otherwise from the model's
/// mesh dimensions. Runs after the hierarchy is wired so a sphere sees the
/// node's true world scale.
fn attach_bounds(graph: &mut SceneGraph, handle: NodeHandle, extras: &Extras) -> Result<()> {
    let Some(bounds_type) = extras.bounds_type() else {
        return Ok(());
    };

    let mesh = graph
        .get_node(handle)
        .and_then(Node::as_model)
        .map(|m| Arc::clone(&m.mesh));
    let world_scale = graph.world_scale(handle).unwrap_or(Vec3::ONE);

    let Some(volume) = bounding_volume(bounds_type, extras, mesh.as_ref(), world_scale) else {
        let name = graph.get_node(handle).map_or("", |n| n.name.as_str());
        log::warn!("Node '{name}' has bounds type {bounds_type:?} with no size and is not a model");
        return Ok(());
    };

    let center = match (&mesh, bounds_type) {
        (Some(mesh), BoundsType::Aabb | BoundsType::Capsule | BoundsType::Sphere) => {
            mesh.dimensions.center()
        }
        _ => Vec3::ZERO,
    };
    let bounds = Node::with_kind(volume.node_name(), NodeKind::Bounds(volume))
        .with_transform(Transform::from_trs(center, Quat::IDENTITY, Vec3::ONE));
    graph.add_to_parent(bounds, handle)?;
    Ok(())
}

fn bounding_volume(
    bounds_type: BoundsType,
    extras: &Extras,
    mesh: Option<&Arc<Mesh>>,
    world_scale: Vec3,
) -> Option<BoundingVolume> {
    let dims = mesh.map(|m| m.dimensions);
    match bounds_type {
        BoundsType::Aabb => {
            if extras.bool_or(extras::AABB_CUSTOM_ENABLED, false) {
                let size = extras
                    .floats(extras::AABB_CUSTOM_SIZE)
                    .filter(|s| s.len() >= 3)
                    .map_or(Vec3::splat(2.0), |s| Vec3::new(s[0], s[1], s[2]));
                Some(BoundingVolume::Aabb { size })
            } else {
                dims.map(|d| BoundingVolume::Aabb { size: d.size() })
            }
        }
        BoundsType::Capsule => {
            if extras.bool_or(extras::CAPSULE_CUSTOM_ENABLED, false) {
                Some(BoundingVolume::Capsule {
                    height: extras.float_or(extras::CAPSULE_CUSTOM_HEIGHT, 2.0),
                    radius: extras.float_or(extras::CAPSULE_CUSTOM_RADIUS, 0.5),
                })
            } else {
                dims.map(|d| BoundingVolume::Capsule {
                    height: d.height(),
                    radius: d.width().max(d.depth()) / 2.0,
                })
            }
        }
        BoundsType::Sphere => {
            if extras.bool_or(extras::SPHERE_CUSTOM_ENABLED, false) {
                Some(BoundingVolume::Sphere {
                    radius: extras.float_or(extras::SPHERE_CUSTOM_RADIUS, 1.0),
                })
            } else {
                dims.map(|d| BoundingVolume::Sphere {
                    radius: d.scaled(world_scale).max_dimension() / 2.0,
                })
            }
        }
        BoundsType::Triangles => mesh.map(|m| BoundingVolume::Triangles {
            mesh: Arc::clone(m),
        }),
    }
}

// ============================================================================
// 4. GltfLoader
// ============================================================================

/// glTF 2.0 importer producing a [`Library`].
///
/// Structural problems (unreadable buffers, accessors running past their
/// data, malformed hierarchies) fail the whole import. Names that do not
/// resolve are recorded in [`Library::diagnostics`] and the import goes on.
pub struct GltfLoader;

impl GltfLoader {
    /// Imports a `.gltf` or `.glb` file. External buffers resolve against
    /// [`ImportOptions::base_path`], or the file's directory when unset.
    pub fn load_file(path: impl AsRef<Path>, options: &ImportOptions) -> Result<Library> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let reader = match &options.base_path {
            Some(base) => FileAssetReader::new(base),
            None => FileAssetReader::new(path),
        };
        Self::import(&bytes, &reader, options)
    }

    /// Imports a document already in memory. External buffers resolve
    /// against [`ImportOptions::base_path`], or the working directory.
    pub fn load_slice(bytes: &[u8], options: &ImportOptions) -> Result<Library> {
        let base = options
            .base_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("."));
        Self::import(bytes, &FileAssetReader::new(base), options)
    }

    fn import(bytes: &[u8], reader: &FileAssetReader, options: &ImportOptions) -> Result<Library> {
        let gltf = gltf::Gltf::from_slice(bytes)?;

        let unsupported: Vec<_> = gltf
            .extensions_required()
            .filter(|ext| !SUPPORTED_EXTENSIONS.contains(ext))
            .collect();
        if !unsupported.is_empty() {
            log::warn!("Document requires unsupported extensions: {unsupported:?}");
        }

        let buffers = io::load_buffers(&gltf, reader)?;
        io::validate_accessors(&gltf, &buffers)?;

        ImportContext::new(&gltf.document, &buffers, options)?.run()
    }
}
