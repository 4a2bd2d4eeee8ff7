pub mod cache;
pub mod definitions;
pub mod procedural;
pub mod source_scene;

pub use cache::{LoadState, SharedSceneCache};
pub use definitions::{DefinitionTable, ItemCategory, ItemDefinition, ItemKind};
pub use source_scene::DeepestMeshStrategy;

use std::path::PathBuf;

use glam::Vec3;

use crate::scene::{Aabb, Geometry, Material, Mesh, Shape};
use procedural::Recipe;
use source_scene::{extract_sub_part, ExtractionRule};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("unknown item type: {0}")]
    UnknownItemType(String),
    #[error("failed to load model {path}: {reason}")]
    ModelLoadFailure { path: String, reason: String },
    #[error("no sub-part for {type_id} in {path}")]
    SubPartNotFound { type_id: String, path: String },
    #[error("duplicate item definition: {0}")]
    DuplicateDefinition(String),
    #[error("invalid item definition {type_id}: {reason}")]
    InvalidDefinition { type_id: String, reason: String },
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// How a resolved shape was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionTier {
    Procedural,
    NamedMatch,
    DeepestMesh,
    NamePattern,
    Fallback,
}

impl From<ExtractionRule> for ResolutionTier {
    fn from(rule: ExtractionRule) -> Self {
        match rule {
            ExtractionRule::NamedMatch => Self::NamedMatch,
            ExtractionRule::DeepestMesh => Self::DeepestMesh,
            ExtractionRule::NamePattern => Self::NamePattern,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedAsset {
    pub shape: Shape,
    pub radius: f32,
    pub tier: ResolutionTier,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetDebugSummary {
    pub definitions: usize,
    /// (path, mesh count, node count), sorted by path.
    pub loaded: Vec<(String, usize, usize)>,
    pub failed: Vec<String>,
    pub pending: bool,
}

impl std::fmt::Display for AssetDebugSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} definitions", self.definitions)?;
        for (path, meshes, nodes) in &self.loaded {
            write!(f, " | {path}: {meshes} meshes / {nodes} nodes")?;
        }
        if !self.failed.is_empty() {
            write!(f, " | failed: {}", self.failed.join(", "))?;
        }
        if self.pending {
            write!(f, " | loading")?;
        }
        Ok(())
    }
}

/// Turns an item type id into something drawable.
#[derive(Debug)]
pub struct AssetResolver {
    definitions: DefinitionTable,
    cache: SharedSceneCache,
    strategy: DeepestMeshStrategy,
    root: PathBuf,
}

impl AssetResolver {
    pub fn new(definitions: DefinitionTable, root: impl Into<PathBuf>) -> Self {
        Self {
            definitions,
            cache: SharedSceneCache::new(),
            strategy: DeepestMeshStrategy::default(),
            root: root.into(),
        }
    }

    pub fn with_strategy(mut self, strategy: DeepestMeshStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn definitions(&self) -> &DefinitionTable {
        &self.definitions
    }

    pub fn definition(&self, type_id: &str) -> Option<&ItemDefinition> {
        self.definitions.get(type_id)
    }

    pub fn cache(&self) -> &SharedSceneCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut SharedSceneCache {
        &mut self.cache
    }

    /// Kick off background loads for every model file the definitions use.
    pub fn preload_models(&mut self) {
        let paths = self.definitions.model_paths();
        log::info!("Preloading {} model files", paths.len());
        self.cache.preload(paths, &self.root);
    }

    /// Resolve `type_id` into a shape. Only an unknown id fails; anything else
    /// degrades to a primitive fallback.
    pub fn resolve(&self, type_id: &str) -> Result<ResolvedAsset, AssetError> {
        let Some(definition) = self.definitions.get(type_id) else {
            let err = AssetError::UnknownItemType(type_id.to_string());
            log::warn!("{err}");
            return Err(err);
        };

        let (mut shape, tier) = self.build_shape(definition);
        shape.set_scale(Vec3::splat(definition.scale));
        log::debug!("Resolved {} via {:?}", type_id, tier);

        Ok(ResolvedAsset {
            shape,
            radius: definition.radius,
            tier,
            kind: definition.kind,
        })
    }

    fn build_shape(&self, definition: &ItemDefinition) -> (Shape, ResolutionTier) {
        if definition.category == ItemCategory::Models {
            if let Some(recipe) = Recipe::for_type(&definition.type_id) {
                return (recipe.build(), ResolutionTier::Procedural);
            }
        }

        match self.extract(definition) {
            Ok((mut mesh, rule)) => {
                if definition.is_collectible() {
                    stand_on_ground(&mut mesh);
                }
                (Shape::Primitive(mesh), rule.into())
            }
            Err(err) => {
                log::debug!("{err}; using fallback for {}", definition.type_id);
                (fallback_shape(definition), ResolutionTier::Fallback)
            }
        }
    }

    fn extract(&self, definition: &ItemDefinition) -> Result<(Mesh, ExtractionRule), AssetError> {
        let not_found = |path: &str| AssetError::SubPartNotFound {
            type_id: definition.type_id.clone(),
            path: path.to_string(),
        };
        let Some(path) = definition.model_path.as_deref() else {
            return Err(not_found("<none>"));
        };
        let scene = self.cache.get(path).ok_or_else(|| not_found(path))?;
        extract_sub_part(
            scene,
            &definition.type_id,
            definition.mesh_name.as_deref(),
            self.strategy,
        )
        .ok_or_else(|| not_found(path))
    }

    pub fn debug_summary(&self) -> AssetDebugSummary {
        let mut loaded: Vec<(String, usize, usize)> = self
            .cache
            .loaded()
            .map(|(path, scene)| (path.to_string(), scene.mesh_count(), scene.node_count()))
            .collect();
        loaded.sort();
        let mut failed: Vec<String> = self.cache.failures().map(|(p, _)| p.to_string()).collect();
        failed.sort();
        AssetDebugSummary {
            definitions: self.definitions.len(),
            loaded,
            failed,
            pending: self.cache.has_pending(),
        }
    }
}

/// Recenter imported geometry on x/z and drop its lowest point to y = 0.
fn stand_on_ground(mesh: &mut Mesh) {
    if let Geometry::Imported { bounds } = &mut mesh.geometry {
        let center = bounds.center();
        let shift = Vec3::new(-center.x, -bounds.min.y, -center.z);
        *bounds = Aabb::new(bounds.min + shift, bounds.max + shift);
    }
}

/// Primitive stand-in built from the definition's declared geometry and material.
pub fn fallback_shape(definition: &ItemDefinition) -> Shape {
    let geometry = match definition.fallback_geometry {
        Some(definitions::FallbackGeometry::Cylinder) => Geometry::Cylinder {
            radius_top: 0.5,
            radius_bottom: 0.5,
            height: 1.0,
            segments: 8,
        },
        Some(definitions::FallbackGeometry::Sphere) => Geometry::Sphere { radius: 0.5 },
        Some(definitions::FallbackGeometry::Cone) => Geometry::Cone {
            radius: 0.5,
            height: 1.0,
            segments: 8,
        },
        Some(definitions::FallbackGeometry::Box) | None => Geometry::Box { size: Vec3::ONE },
    };
    let spec = definition.fallback_material;
    let material = Material::standard(
        spec.color.unwrap_or(0x808080),
        spec.roughness.unwrap_or(0.5),
        spec.metalness.unwrap_or(0.0),
    );
    Shape::Primitive(Mesh::new(definition.type_id.clone(), geometry, material))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::source_scene::{MeshData, SceneNode};
    use crate::scene::rgb;

    fn mesh_node(name: &str) -> SceneNode {
        SceneNode {
            name: name.to_string(),
            mesh: Some(MeshData {
                min: [-0.5, 0.0, -0.5],
                max: [0.5, 1.2, 0.5],
                color: [0.2, 0.6, 0.2],
                roughness: 0.7,
                metalness: 0.0,
                opacity: 1.0,
            }),
            children: Vec::new(),
        }
    }

    fn objects_scene() -> SceneNode {
        SceneNode {
            name: "Scene".to_string(),
            mesh: None,
            children: vec![
                SceneNode {
                    name: "corn_1".to_string(),
                    mesh: None,
                    children: vec![mesh_node("corn_1_leaves")],
                },
                mesh_node("tomato_3"),
            ],
        }
    }

    fn resolver() -> AssetResolver {
        AssetResolver::new(DefinitionTable::builtin(), "assets")
    }

    #[test]
    fn unknown_type_fails() {
        let result = resolver().resolve("unicorn");
        assert!(matches!(result, Err(AssetError::UnknownItemType(id)) if id == "unicorn"));
    }

    #[test]
    fn procedural_models_ignore_load_state() {
        let asset = resolver().resolve("bench").expect("bench");
        assert_eq!(asset.tier, ResolutionTier::Procedural);
        assert_eq!(asset.radius, 1.5);
        assert!(asset.shape.is_composite());
    }

    #[test]
    fn plants_fall_back_before_models_load() {
        let resolver = resolver();
        for definition in resolver.definitions().iter() {
            let asset = resolver.resolve(&definition.type_id).expect("known id");
            assert_eq!(asset.radius, definition.radius);
        }
        let corn = resolver.resolve("corn_2").expect("corn");
        assert_eq!(corn.tier, ResolutionTier::Fallback);
        assert!(matches!(
            &corn.shape,
            Shape::Primitive(mesh) if matches!(mesh.geometry, Geometry::Sphere { .. })
        ));
    }

    #[test]
    fn loaded_scene_yields_named_match() {
        let mut resolver = resolver();
        resolver
            .cache_mut()
            .insert(definitions::OBJECTS_MODEL, objects_scene());
        let corn = resolver.resolve("corn_1").expect("corn");
        assert_eq!(corn.tier, ResolutionTier::NamedMatch);
        let Shape::Primitive(mesh) = &corn.shape else {
            panic!("expected primitive");
        };
        assert_eq!(mesh.name, "corn_1_leaves");
    }

    #[test]
    fn missing_sub_part_uses_deepest_mesh() {
        let mut resolver = resolver();
        resolver
            .cache_mut()
            .insert(definitions::OBJECTS_MODEL, objects_scene());
        let grape = resolver.resolve("grape_1").expect("grape");
        assert_eq!(grape.tier, ResolutionTier::DeepestMesh);
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut resolver = resolver();
        resolver
            .cache_mut()
            .insert(definitions::OBJECTS_MODEL, objects_scene());
        let first = resolver.resolve("strawberry_2").expect("first");
        let second = resolver.resolve("strawberry_2").expect("second");
        assert_eq!(first.tier, second.tier);
        assert_eq!(first.radius, second.radius);
        assert_eq!(first.shape, second.shape);
    }

    #[test]
    fn failed_model_still_resolves() {
        let mut resolver = resolver();
        resolver
            .cache_mut()
            .mark_failed(definitions::GNOME_MODEL, "not found".to_string());
        let gnome = resolver.resolve("gnome").expect("gnome");
        assert_eq!(gnome.tier, ResolutionTier::Fallback);
        assert_eq!(gnome.kind, ItemKind::Collectible);
        assert_eq!(gnome.shape.transform().scale, Vec3::splat(0.075));
    }

    #[test]
    fn imported_gnome_stands_on_ground() {
        let mut resolver = resolver();
        let mut body = mesh_node("gnome_body");
        if let Some(data) = body.mesh.as_mut() {
            data.min = [1.0, -2.0, 3.0];
            data.max = [3.0, 10.0, 5.0];
        }
        resolver.cache_mut().insert(definitions::GNOME_MODEL, body);
        let gnome = resolver.resolve("gnome").expect("gnome");
        let Shape::Primitive(mesh) = &gnome.shape else {
            panic!("expected primitive");
        };
        let bounds = mesh.geometry.local_bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 12.0, 1.0));
    }

    #[test]
    fn fallback_material_defaults() {
        let table = DefinitionTable::from_json_str(
            r#"[{ "id": "crate", "category": "models", "radius": 1.0 }]"#,
        )
        .expect("table");
        let shape = fallback_shape(table.get("crate").expect("crate"));
        let Shape::Primitive(mesh) = shape else {
            panic!("expected primitive");
        };
        assert_eq!(mesh.geometry, Geometry::Box { size: Vec3::ONE });
        assert_eq!(mesh.material.color, rgb(0x808080));
        assert_eq!(mesh.material.roughness, 0.5);
        assert_eq!(mesh.material.metalness, 0.0);
    }

    #[test]
    fn debug_summary_lists_loaded_and_failed() {
        let mut resolver = resolver();
        resolver
            .cache_mut()
            .insert(definitions::OBJECTS_MODEL, objects_scene());
        resolver
            .cache_mut()
            .mark_failed(definitions::GNOME_MODEL, "missing".to_string());
        let summary = resolver.debug_summary();
        assert_eq!(summary.definitions, 19);
        assert_eq!(
            summary.loaded,
            vec![(definitions::OBJECTS_MODEL.to_string(), 2, 4)]
        );
        assert_eq!(summary.failed, vec![definitions::GNOME_MODEL.to_string()]);
        assert!(summary.to_string().contains("failed"));
    }
}
