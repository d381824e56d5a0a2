//! Vendor metadata carried in glTF `extras` objects.
//!
//! Keys that start with `t3d` and end with `__` are reserved for the
//! exporter and interpreted by the importer. Every other key is user data and
//! is copied verbatim into the owning entity's tags.

use glam::Vec3;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::{MythError, Result};
use crate::resources::{Color, Property, Tags};

pub(crate) const PACK_TEXTURES: &str = "t3dPackTextures__";
pub(crate) const COLLECTIONS: &str = "t3dCollections__";

pub(crate) const MATERIAL_COLOR: &str = "t3dMaterialColor__";
pub(crate) const MATERIAL_SHADELESS: &str = "t3dMaterialShadeless__";
pub(crate) const COMPOSITE_MODE: &str = "t3dCompositeMode__";
pub(crate) const BILLBOARD_MODE: &str = "t3dBillboardMode__";

pub(crate) const VERTEX_COLOR_NAMES: &str = "t3dVertexColorNames__";

pub(crate) const VISIBLE: &str = "t3dVisible__";
pub(crate) const ORIGINAL_LOCAL_POSITION: &str = "t3dOriginalLocalPosition__";
pub(crate) const PATH_POINTS: &str = "t3dPathPoints__";
pub(crate) const PATH_CYCLIC: &str = "t3dPathCyclic__";
pub(crate) const BOUNDS_TYPE: &str = "t3dBoundsType__";
pub(crate) const AABB_CUSTOM_ENABLED: &str = "t3dAABBCustomEnabled__";
pub(crate) const AABB_CUSTOM_SIZE: &str = "t3dAABBCustomSize__";
pub(crate) const CAPSULE_CUSTOM_ENABLED: &str = "t3dCapsuleCustomEnabled__";
pub(crate) const CAPSULE_CUSTOM_HEIGHT: &str = "t3dCapsuleCustomHeight__";
pub(crate) const CAPSULE_CUSTOM_RADIUS: &str = "t3dCapsuleCustomRadius__";
pub(crate) const SPHERE_CUSTOM_ENABLED: &str = "t3dSphereCustomEnabled__";
pub(crate) const SPHERE_CUSTOM_RADIUS: &str = "t3dSphereCustomRadius__";
pub(crate) const GAME_PROPERTIES: &str = "t3dGameProperties__";
pub(crate) const INSTANCE_COLLECTION: &str = "t3dInstanceCollection__";

pub(crate) const MARKERS: &str = "t3dMarkers__";

pub(crate) const WORLD_COLOR: &str = "t3dWorldColor__";
pub(crate) const WORLD_ENERGY: &str = "t3dWorldEnergy__";
pub(crate) const CLEAR_COLOR: &str = "t3dClearColor__";
pub(crate) const FOG_MODE: &str = "t3dFogMode__";
pub(crate) const FOG_COLOR: &str = "t3dFogColor__";
pub(crate) const FOG_RANGE_START: &str = "t3dFogRangeStart__";
pub(crate) const FOG_RANGE_END: &str = "t3dFogRangeEnd__";

pub(crate) fn is_reserved(key: &str) -> bool {
    key.starts_with("t3d") && key.ends_with("__")
}

/// Bounds shapes in exporter numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundsType {
    Aabb,
    Capsule,
    Sphere,
    Triangles,
}

impl BoundsType {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(Self::Aabb),
            2 => Some(Self::Capsule),
            3 => Some(Self::Sphere),
            4 => Some(Self::Triangles),
            _ => None,
        }
    }
}

/// An entry of the scene-level collection table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CollectionInfo {
    pub objects: Vec<String>,
    pub offset: Vec<f32>,
    /// Path of the file the collection lives in; empty for local ones.
    pub path: String,
}

impl CollectionInfo {
    /// Offset converted from the exporter's Z-up space.
    pub fn offset(&self) -> Vec3 {
        let get = |i: usize| self.offset.get(i).copied().unwrap_or(0.0);
        Vec3::new(-get(0), -get(2), get(1))
    }
}

/// Parsed `extras` object. Non-object extras are treated as empty.
#[derive(Debug, Clone, Default)]
pub(crate) struct Extras {
    map: Map<String, Value>,
}

impl Extras {
    pub fn parse(raw: &gltf::json::Extras) -> Self {
        let map = raw
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Value>(raw.get()).ok())
            .and_then(|value| match value {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default();
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.map.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.contains_key(key)
    }

    /// Exporter booleans are numbers; anything above one half is true.
    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.map.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(v) => v.as_f64().map_or(default, |f| f > 0.5),
            None => default,
        }
    }

    pub fn float_or(&self, key: &str, default: f32) -> f32 {
        self.map
            .get(key)
            .and_then(Value::as_f64)
            .map_or(default, |f| f as f32)
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        let value = self.map.get(key)?;
        value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
    }

    pub fn str(&self, key: &str) -> Option<&str> {
        self.map.get(key).and_then(Value::as_str)
    }

    pub fn floats(&self, key: &str) -> Option<Vec<f32>> {
        let array = self.map.get(key)?.as_array()?;
        Some(array.iter().filter_map(Value::as_f64).map(|f| f as f32).collect())
    }

    pub fn color(&self, key: &str) -> Option<Color> {
        self.floats(key).map(|c| Color::from_slice(&c))
    }

    /// A point stored in the exporter's Z-up space, converted to Y-up.
    pub fn point(&self, key: &str) -> Option<Vec3> {
        self.floats(key).map(|p| z_up_to_y_up(&p))
    }

    pub fn bounds_type(&self) -> Option<BoundsType> {
        self.int(BOUNDS_TYPE).and_then(BoundsType::from_code)
    }

    pub fn path_points(&self) -> Option<Vec<Vec3>> {
        let array = self.map.get(PATH_POINTS)?.as_array()?;
        Some(
            array
                .iter()
                .filter_map(Value::as_array)
                .map(|p| {
                    let coords: Vec<f32> =
                        p.iter().filter_map(Value::as_f64).map(|f| f as f32).collect();
                    z_up_to_y_up(&coords)
                })
                .collect(),
        )
    }

    pub fn collections(&self) -> Result<FxHashMap<String, CollectionInfo>> {
        match self.map.get(COLLECTIONS) {
            Some(value) => FxHashMap::deserialize(value).map_err(|e| {
                MythError::Decode(format!("Invalid collection table: {e}"))
            }),
            None => Ok(FxHashMap::default()),
        }
    }

    /// `(name, time)` pairs from the marker list.
    pub fn markers(&self) -> Vec<(String, f32)> {
        let Some(list) = self.map.get(MARKERS).and_then(Value::as_array) else {
            return Vec::new();
        };
        list.iter()
            .filter_map(|m| {
                let name = m.get("name")?.as_str()?;
                let time = m.get("time")?.as_f64()?;
                Some((name.to_string(), time as f32))
            })
            .collect()
    }

    /// Typed game properties authored on a node.
    ///
    /// A reference keeps the target's scene and node names; the scene name
    /// is empty when the target lives in the same scene.
    pub fn game_properties(&self) -> Vec<(String, Property)> {
        let Some(list) = self.map.get(GAME_PROPERTIES).and_then(Value::as_array) else {
            return Vec::new();
        };

        let mut properties = Vec::with_capacity(list.len());
        for entry in list {
            let field = |key: &str| entry.get(key);
            let name = field("name")
                .and_then(Value::as_str)
                .unwrap_or("New Property")
                .to_string();
            let number = |key: &str| field(key).and_then(Value::as_f64);

            let value = match field("valueType").and_then(Value::as_i64).unwrap_or(0) {
                0 => Property::Bool(number("valueBool").is_some_and(|f| f > 0.0)
                    || field("valueBool").and_then(Value::as_bool).unwrap_or(false)),
                1 => Property::Int(number("valueInt").map_or(0, |f| f as i64)),
                2 => Property::Float(number("valueFloat").unwrap_or(0.0)),
                3 => Property::String(
                    field("valueString").and_then(Value::as_str).unwrap_or("").to_string(),
                ),
                4 => {
                    let name_of = |key: &str| {
                        field(key)
                            .and_then(|r| r.get("name"))
                            .and_then(Value::as_str)
                            .map(str::to_string)
                    };
                    // An unset reference leaves the property out.
                    let Some(target) = name_of("valueReference") else {
                        continue;
                    };
                    Property::Reference {
                        scene: name_of("valueReferenceScene").unwrap_or_default(),
                        name: target,
                    }
                }
                other => {
                    log::warn!("Game property '{name}' has unknown value type {other}");
                    continue;
                }
            };
            properties.push((name, value));
        }
        properties
    }

    /// Copies every non-reserved key into `tags`.
    pub fn copy_user_tags(&self, tags: &mut Tags) {
        for (key, value) in &self.map {
            if !is_reserved(key) {
                tags.set(key.clone(), value.clone());
            }
        }
    }
}

fn z_up_to_y_up(p: &[f32]) -> Vec3 {
    let get = |i: usize| p.get(i).copied().unwrap_or(0.0);
    Vec3::new(get(0), get(2), -get(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extras(value: Value) -> Extras {
        match value {
            Value::Object(map) => Extras { map },
            _ => Extras::default(),
        }
    }

    #[test]
    fn reserved_keys_are_not_copied() {
        let e = extras(json!({ "t3dVisible__": 0, "hp": 10, "t3dX": 1 }));
        let mut tags = Tags::new();
        e.copy_user_tags(&mut tags);
        assert!(tags.has("hp"));
        assert!(tags.has("t3dX"));
        assert!(!tags.has("t3dVisible__"));
    }

    #[test]
    fn game_properties_are_typed() {
        let e = extras(json!({
            "t3dGameProperties__": [
                { "name": "alive", "valueType": 0, "valueBool": 1 },
                { "name": "hp", "valueType": 1, "valueInt": 12 },
                { "name": "speed", "valueType": 2, "valueFloat": 2.5 },
                { "name": "label", "valueType": 3, "valueString": "door" },
                { "name": "target", "valueType": 4,
                  "valueReference": { "name": "Key" },
                  "valueReferenceScene": { "name": "Level" } },
            ]
        }));
        let props: FxHashMap<_, _> = e.game_properties().into_iter().collect();
        assert_eq!(props["alive"], Property::Bool(true));
        assert_eq!(props["hp"], Property::Int(12));
        assert_eq!(props["speed"], Property::Float(2.5));
        assert_eq!(props["label"], Property::String("door".into()));
        assert_eq!(
            props["target"],
            Property::Reference { scene: "Level".into(), name: "Key".into() }
        );
    }

    #[test]
    fn points_convert_from_z_up() {
        let e = extras(json!({ "t3dOriginalLocalPosition__": [1.0, 2.0, 3.0] }));
        assert_eq!(e.point(ORIGINAL_LOCAL_POSITION), Some(Vec3::new(1.0, 3.0, -2.0)));
    }
}
