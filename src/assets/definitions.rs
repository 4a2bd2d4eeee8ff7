//! Item definitions: what can be placed, how big it is and how to build it.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AssetError;

pub const OBJECTS_MODEL: &str = "models/objects.json";
pub const GNOME_MODEL: &str = "models/gnome.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Plants,
    Models,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Decoration,
    /// Clicking it plays the vanish animation and bumps the found counter.
    Collectible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Footprint {
    #[default]
    Standard,
    /// Long and thin; relaxed bounds and spacing rules.
    Path,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackGeometry {
    Box,
    Cylinder,
    Sphere,
    Cone,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FallbackMaterial {
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub roughness: Option<f32>,
    #[serde(default)]
    pub metalness: Option<f32>,
}

fn default_scale() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    #[serde(rename = "id")]
    pub type_id: String,
    #[serde(default)]
    pub display_name: String,
    pub category: ItemCategory,
    #[serde(default)]
    pub model_path: Option<String>,
    #[serde(default)]
    pub mesh_name: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    pub radius: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub fallback_geometry: Option<FallbackGeometry>,
    #[serde(default)]
    pub fallback_material: FallbackMaterial,
    #[serde(default)]
    pub kind: ItemKind,
    #[serde(default)]
    pub footprint: Footprint,
}

impl ItemDefinition {
    fn plant(type_id: &str, display_name: &str, radius: f32) -> Self {
        Self {
            type_id: type_id.to_string(),
            display_name: display_name.to_string(),
            category: ItemCategory::Plants,
            model_path: Some(OBJECTS_MODEL.to_string()),
            mesh_name: Some(type_id.to_string()),
            thumbnail: Some(format!("thumbnails/{type_id}.png")),
            radius,
            scale: 1.0,
            fallback_geometry: Some(FallbackGeometry::Sphere),
            fallback_material: FallbackMaterial {
                color: Some(0x3f9b3f),
                roughness: Some(0.8),
                metalness: None,
            },
            kind: ItemKind::Decoration,
            footprint: Footprint::Standard,
        }
    }

    fn model(type_id: &str, display_name: &str, radius: f32) -> Self {
        Self {
            type_id: type_id.to_string(),
            display_name: display_name.to_string(),
            category: ItemCategory::Models,
            model_path: Some(OBJECTS_MODEL.to_string()),
            mesh_name: Some(type_id.to_string()),
            thumbnail: Some(format!("thumbnails/{type_id}.png")),
            radius,
            scale: 1.0,
            fallback_geometry: None,
            fallback_material: FallbackMaterial::default(),
            kind: ItemKind::Decoration,
            footprint: Footprint::Standard,
        }
    }

    pub fn is_path_like(&self) -> bool {
        self.footprint == Footprint::Path
    }

    pub fn is_collectible(&self) -> bool {
        self.kind == ItemKind::Collectible
    }

    fn validate(&self) -> Result<(), AssetError> {
        if self.type_id.trim().is_empty() {
            return Err(AssetError::InvalidDefinition {
                type_id: self.type_id.clone(),
                reason: "empty id".to_string(),
            });
        }
        if !(self.radius > 0.0) {
            return Err(AssetError::InvalidDefinition {
                type_id: self.type_id.clone(),
                reason: format!("radius must be positive, got {}", self.radius),
            });
        }
        if !(self.scale > 0.0) {
            return Err(AssetError::InvalidDefinition {
                type_id: self.type_id.clone(),
                reason: format!("scale must be positive, got {}", self.scale),
            });
        }
        Ok(())
    }
}

/// Read-only lookup of item definitions, in palette order.
#[derive(Debug, Clone)]
pub struct DefinitionTable {
    definitions: Vec<ItemDefinition>,
    index: HashMap<String, usize>,
}

impl DefinitionTable {
    pub fn from_definitions(definitions: Vec<ItemDefinition>) -> Result<Self, AssetError> {
        let mut index = HashMap::with_capacity(definitions.len());
        for (position, definition) in definitions.iter().enumerate() {
            definition.validate()?;
            if index.insert(definition.type_id.clone(), position).is_some() {
                return Err(AssetError::DuplicateDefinition(definition.type_id.clone()));
            }
        }
        Ok(Self { definitions, index })
    }

    pub fn from_json_str(json: &str) -> Result<Self, AssetError> {
        let definitions: Vec<ItemDefinition> =
            serde_json::from_str(json).map_err(|source| AssetError::Parse {
                path: "<inline>".to_string(),
                source,
            })?;
        Self::from_definitions(definitions)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path).map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let definitions: Vec<ItemDefinition> =
            serde_json::from_str(&json).map_err(|source| AssetError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        let table = Self::from_definitions(definitions)?;
        log::info!(
            "Loaded {} item definitions from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    /// Plants, procedural models and the collectible gnome.
    pub fn builtin() -> Self {
        let mut definitions = vec![
            ItemDefinition::plant("grape_1", "Grape Vine", 1.5),
            ItemDefinition::plant("grape_2", "Grape Vine (tall)", 1.5),
            ItemDefinition::plant("grape_3", "Grape Vine (full)", 1.5),
            ItemDefinition::plant("corn_1", "Corn", 1.2),
            ItemDefinition::plant("corn_2", "Corn (tall)", 1.2),
            ItemDefinition::plant("corn_3", "Corn (ripe)", 1.2),
            ItemDefinition::plant("strawberry_1", "Strawberry", 1.0),
            ItemDefinition::plant("strawberry_2", "Strawberry (flowering)", 1.0),
            ItemDefinition::plant("strawberry_3", "Strawberry (ripe)", 1.0),
            ItemDefinition::plant("tomato_1", "Tomato", 1.0),
            ItemDefinition::plant("tomato_2", "Tomato (tall)", 1.0),
            ItemDefinition::plant("tomato_3", "Tomato (ripe)", 1.0),
            ItemDefinition::model("tree", "Tree", 2.0),
            ItemDefinition::model("bench", "Bench", 1.5),
            ItemDefinition::model("fountain", "Fountain", 2.5),
            ItemDefinition::model("flower_pot", "Flower Pot", 1.0),
            ItemDefinition::model("lightpole", "Light Pole", 2.0),
        ];

        let mut stone_path = ItemDefinition::model("stone_path", "Stone Path", 1.5);
        stone_path.footprint = Footprint::Path;
        definitions.push(stone_path);

        let mut gnome = ItemDefinition::model("gnome", "Garden Gnome", 1.0);
        gnome.model_path = Some(GNOME_MODEL.to_string());
        gnome.mesh_name = Some("gnome".to_string());
        gnome.scale = 0.075;
        gnome.kind = ItemKind::Collectible;
        gnome.fallback_geometry = Some(FallbackGeometry::Cone);
        gnome.fallback_material.color = Some(0xd32f2f);
        definitions.push(gnome);

        let index = definitions
            .iter()
            .enumerate()
            .map(|(position, definition)| (definition.type_id.clone(), position))
            .collect();
        Self { definitions, index }
    }

    pub fn get(&self, type_id: &str) -> Option<&ItemDefinition> {
        self.index
            .get(type_id)
            .and_then(|&position| self.definitions.get(position))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.definitions.iter()
    }

    pub fn by_category(&self, category: ItemCategory) -> impl Iterator<Item = &ItemDefinition> {
        self.definitions
            .iter()
            .filter(move |definition| definition.category == category)
    }

    /// Definitions offered to the user; collectibles are seeded, never placed by hand.
    pub fn palette(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.definitions
            .iter()
            .filter(|definition| !definition.is_collectible() && !definition.is_path_like())
    }

    /// Distinct model files referenced by any definition.
    pub fn model_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = Vec::new();
        for path in self.definitions.iter().filter_map(|d| d.model_path.as_ref()) {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for DefinitionTable {
    fn default() -> Self {
        Self::builtin()
    }
}
