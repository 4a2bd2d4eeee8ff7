//! Loaded model files and sub-part extraction.
//!
//! A model file is a JSON tree of named nodes; some nodes carry a mesh. One file
//! usually bundles many items (every plant variant lives in the same file), so
//! placing an item means picking the right mesh out of the shared tree.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AssetError;
use crate::scene::{Aabb, Geometry, Material, Mesh};

/// Fallback name fragments tried after the item's own name.
const GENERIC_MESH_NAMES: [&str; 3] = ["mesh", "object", "model"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeepestMeshStrategy {
    /// The last mesh in document order, unless the only mesh is the root.
    #[default]
    TraversalOrder,
    /// The mesh with the greatest nesting depth; the first one wins ties.
    NestingDepth,
}

fn default_gray() -> [f32; 3] {
    [0.5, 0.5, 0.5]
}

fn default_roughness() -> f32 {
    0.5
}

fn default_opacity() -> f32 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub min: [f32; 3],
    pub max: [f32; 3],
    #[serde(default = "default_gray")]
    pub color: [f32; 3],
    #[serde(default = "default_roughness")]
    pub roughness: f32,
    #[serde(default)]
    pub metalness: f32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

impl MeshData {
    pub fn to_mesh(&self, name: &str) -> Mesh {
        let material = Material {
            color: self.color,
            roughness: self.roughness,
            metalness: self.metalness,
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 0.0,
            opacity: self.opacity,
        };
        Mesh::new(
            name,
            Geometry::Imported {
                bounds: Aabb::new(self.min.into(), self.max.into()),
            },
            material,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mesh: Option<MeshData>,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

/// One node as seen during a pre-order walk.
#[derive(Debug, Clone, Copy)]
pub struct Visit<'a> {
    pub node: &'a SceneNode,
    /// Position in the walk, 0 for the root.
    pub order: usize,
    /// Nesting depth, 0 for the root.
    pub depth: usize,
    pub parent: Option<&'a SceneNode>,
    pub grandparent: Option<&'a SceneNode>,
}

impl SceneNode {
    pub fn from_json_str(json: &str, path: &str) -> Result<Self, AssetError> {
        serde_json::from_str(json).map_err(|source| AssetError::Parse {
            path: path.to_string(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let json = std::fs::read_to_string(path).map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    /// Document-order (pre-order) walk of the whole tree.
    pub fn visits(&self) -> Vec<Visit<'_>> {
        let mut out = Vec::new();
        collect_visits(self, 0, None, None, &mut out);
        out
    }

    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }

    pub fn mesh_count(&self) -> usize {
        usize::from(self.mesh.is_some())
            + self.children.iter().map(SceneNode::mesh_count).sum::<usize>()
    }
}

fn collect_visits<'a>(
    node: &'a SceneNode,
    depth: usize,
    parent: Option<&'a SceneNode>,
    grandparent: Option<&'a SceneNode>,
    out: &mut Vec<Visit<'a>>,
) {
    out.push(Visit {
        node,
        order: out.len(),
        depth,
        parent,
        grandparent,
    });
    for child in &node.children {
        collect_visits(child, depth + 1, Some(node), parent, out);
    }
}

/// Which extraction rule produced a sub-part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionRule {
    NamedMatch,
    DeepestMesh,
    NamePattern,
}

/// Pick the sub-part for `type_id` out of a shared scene. The first rule that
/// yields a mesh wins.
pub fn extract_sub_part(
    scene: &SceneNode,
    type_id: &str,
    mesh_name: Option<&str>,
    strategy: DeepestMeshStrategy,
) -> Option<(Mesh, ExtractionRule)> {
    let visits = scene.visits();

    if let Some(hint) = mesh_name {
        if let Some(visit) = find_named(&visits, hint) {
            return Some((to_mesh(visit)?, ExtractionRule::NamedMatch));
        }
    }

    if let Some(visit) = find_deepest(&visits, strategy) {
        return Some((to_mesh(visit)?, ExtractionRule::DeepestMesh));
    }

    find_by_pattern(&visits, type_id)
        .and_then(to_mesh)
        .map(|mesh| (mesh, ExtractionRule::NamePattern))
}

fn to_mesh(visit: &Visit<'_>) -> Option<Mesh> {
    visit
        .node
        .mesh
        .as_ref()
        .map(|data| data.to_mesh(&visit.node.name))
}

fn find_named<'v, 'a>(visits: &'v [Visit<'a>], hint: &str) -> Option<&'v Visit<'a>> {
    let named = |node: Option<&SceneNode>| node.map_or(false, |n| n.name == hint);
    visits.iter().find(|visit| {
        visit.node.mesh.is_some()
            && (visit.node.name == hint || named(visit.parent) || named(visit.grandparent))
    })
}

fn find_deepest<'v, 'a>(
    visits: &'v [Visit<'a>],
    strategy: DeepestMeshStrategy,
) -> Option<&'v Visit<'a>> {
    let meshes = visits.iter().filter(|visit| visit.node.mesh.is_some());
    match strategy {
        DeepestMeshStrategy::TraversalOrder => {
            let mut best = None;
            let mut best_order = 0;
            for visit in meshes {
                if visit.order > best_order {
                    best_order = visit.order;
                    best = Some(visit);
                }
            }
            best
        }
        DeepestMeshStrategy::NestingDepth => {
            let mut best: Option<&Visit<'a>> = None;
            for visit in meshes {
                if best.map_or(true, |b| visit.depth > b.depth) {
                    best = Some(visit);
                }
            }
            best
        }
    }
}

fn name_patterns(type_id: &str) -> Vec<String> {
    let lower = type_id.to_lowercase();
    let mut patterns = vec![
        lower.clone(),
        lower.replace('_', ""),
        lower.split('_').next().unwrap_or_default().to_string(),
    ];
    patterns.extend(GENERIC_MESH_NAMES.iter().map(|name| name.to_string()));
    patterns.retain(|pattern| !pattern.is_empty());
    patterns
}

fn find_by_pattern<'v, 'a>(visits: &'v [Visit<'a>], type_id: &str) -> Option<&'v Visit<'a>> {
    let patterns = name_patterns(type_id);
    visits.iter().find(|visit| {
        if visit.node.mesh.is_none() {
            return false;
        }
        let name = visit.node.name.to_lowercase();
        patterns.iter().any(|pattern| name.contains(pattern.as_str()))
    })
}
