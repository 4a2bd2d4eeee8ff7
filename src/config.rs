//! Session configuration loaded from JSON. Every field has a default, so an
//! empty object (or no file at all) yields the stock garden.

use std::f32::consts::{FRAC_PI_2, PI};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::DeepestMeshStrategy;
use crate::placement::{PlotBounds, DEFAULT_PATH_MARGIN, DEFAULT_PATH_MIN_SPACING};

pub const CONFIG_ENV: &str = "GARDEN_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: [f32; 3],
    pub target: [f32; 3],
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: [30.0, 25.0, 30.0],
            target: [0.0, 0.0, 0.0],
            fov_y_deg: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkSpec {
    pub distance: f32,
    #[serde(default)]
    pub path_rotation: f32,
    pub speed: f32,
}

/// A collectible dropped into the garden at start-up. `position[1]` is the
/// height it is perched at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectibleSpec {
    #[serde(rename = "type")]
    pub type_id: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation_y: f32,
    #[serde(default)]
    pub walk: Option<WalkSpec>,
}

impl CollectibleSpec {
    fn gnome(position: [f32; 3], rotation_y: f32) -> Self {
        Self {
            type_id: "gnome".to_string(),
            position,
            rotation_y,
            walk: None,
        }
    }

    fn walking_gnome(position: [f32; 3], rotation_y: f32, walk: WalkSpec) -> Self {
        Self {
            walk: Some(walk),
            ..Self::gnome(position, rotation_y)
        }
    }
}

/// Decorative shape that is drawn but never selectable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenerySpec {
    #[serde(rename = "type")]
    pub type_id: String,
    pub position: [f32; 3],
    #[serde(default)]
    pub rotation_y: f32,
}

impl ScenerySpec {
    fn new(type_id: &str, x: f32, z: f32, rotation_y: f32) -> Self {
        Self {
            type_id: type_id.to_string(),
            position: [x, 0.0, z],
            rotation_y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub plot: PlotBounds,
    pub path_margin: f32,
    pub path_min_spacing: f32,
    pub camera: CameraConfig,
    pub viewport: [u32; 2],
    pub deepest_mesh: DeepestMeshStrategy,
    pub asset_root: PathBuf,
    /// Item table to use instead of the built-in one.
    pub definitions_path: Option<PathBuf>,
    pub collectibles: Vec<CollectibleSpec>,
    pub scenery: Vec<ScenerySpec>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            plot: PlotBounds::default(),
            path_margin: DEFAULT_PATH_MARGIN,
            path_min_spacing: DEFAULT_PATH_MIN_SPACING,
            camera: CameraConfig::default(),
            viewport: [1280, 720],
            deepest_mesh: DeepestMeshStrategy::default(),
            asset_root: PathBuf::from("assets"),
            definitions_path: None,
            collectibles: default_collectibles(),
            scenery: default_scenery(),
        }
    }
}

impl EditorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Config named by the first CLI argument or `GARDEN_CONFIG`, falling
    /// back to defaults when neither is set.
    pub fn from_env() -> Result<Self> {
        let path = std::env::args()
            .nth(1)
            .or_else(|| std::env::var(CONFIG_ENV).ok());
        match path {
            Some(path) => Self::load(Path::new(&path)),
            None => {
                log::info!("No config given; using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Resolve `path` against the asset root unless it is absolute.
    pub fn asset_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.asset_root.join(path)
        }
    }
}

fn default_collectibles() -> Vec<CollectibleSpec> {
    vec![
        CollectibleSpec::gnome([16.0, 0.0, -13.0], 0.0),
        CollectibleSpec::gnome([18.0, -0.1, 2.5], -FRAC_PI_2),
        CollectibleSpec::gnome([-15.5, 0.0, -13.0], FRAC_PI_2),
        CollectibleSpec::gnome([-12.0, 1.0, -13.0], 0.0),
        CollectibleSpec::gnome([-16.0, 3.0, 14.5], 0.5),
        CollectibleSpec::walking_gnome(
            [-15.5, 0.0, 5.0],
            FRAC_PI_2,
            WalkSpec {
                distance: 8.0,
                path_rotation: 0.0,
                speed: 0.006,
            },
        ),
        CollectibleSpec::walking_gnome(
            [7.0, 0.0, -4.0],
            0.0,
            WalkSpec {
                distance: 9.0,
                path_rotation: FRAC_PI_2,
                speed: 0.003,
            },
        ),
        CollectibleSpec::walking_gnome(
            [15.0, 0.0, -11.0],
            -FRAC_PI_2,
            WalkSpec {
                distance: 31.5,
                path_rotation: PI,
                speed: 0.001,
            },
        ),
    ]
}

fn default_scenery() -> Vec<ScenerySpec> {
    vec![
        ScenerySpec::new("tree", -18.0, -13.0, 0.0),
        ScenerySpec::new("tree", 18.0, -13.0, 0.0),
        ScenerySpec::new("bench", -13.0, -13.0, 0.0),
        ScenerySpec::new("bench", -6.0, -13.0, 0.0),
        ScenerySpec::new("bench", -18.0, -8.5, FRAC_PI_2),
        ScenerySpec::new("bench", -18.0, -1.0, FRAC_PI_2),
        ScenerySpec::new("bench", 13.0, -13.0, 0.0),
        ScenerySpec::new("bench", 6.0, -13.0, 0.0),
        ScenerySpec::new("bench", 18.0, -8.5, -FRAC_PI_2),
        ScenerySpec::new("bench", 18.0, -1.0, -FRAC_PI_2),
        ScenerySpec::new("lightpole", -9.5, -13.0, 0.0),
        ScenerySpec::new("lightpole", -18.0, -4.75, 0.0),
        ScenerySpec::new("lightpole", 9.5, -13.0, 0.0),
        ScenerySpec::new("lightpole", 18.0, -4.75, 0.0),
        ScenerySpec::new("lightpole", 9.5, 13.0, 0.0),
        ScenerySpec::new("lightpole", -9.5, 13.0, 0.0),
        ScenerySpec::new("flower_pot", -18.0, 2.5, PI * 0.6),
        ScenerySpec::new("flower_pot", -2.0, -13.0, PI * 0.3),
        ScenerySpec::new("flower_pot", 18.0, 2.5, PI * -0.6),
        ScenerySpec::new("flower_pot", 2.0, -13.0, PI * -0.3),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let config = EditorConfig::from_json_str("{}").expect("config");
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.collectibles.len(), 8);
        assert_eq!(
            config.collectibles.iter().filter(|c| c.walk.is_some()).count(),
            3
        );
        assert_eq!(
            config.scenery.iter().filter(|s| s.type_id == "lightpole").count(),
            6
        );
    }

    #[test]
    fn partial_override_keeps_other_defaults() {
        let config = EditorConfig::from_json_str(
            r#"{
                "path_min_spacing": 3.0,
                "deepest_mesh": "nesting_depth",
                "camera": { "fov_y_deg": 45.0 },
                "collectibles": [
                    { "type": "gnome", "position": [1.0, 0.0, 2.0],
                      "walk": { "distance": 4.0, "speed": 0.01 } }
                ]
            }"#,
        )
        .expect("config");
        assert_eq!(config.path_min_spacing, 3.0);
        assert_eq!(config.path_margin, DEFAULT_PATH_MARGIN);
        assert_eq!(config.deepest_mesh, DeepestMeshStrategy::NestingDepth);
        assert_eq!(config.camera.fov_y_deg, 45.0);
        assert_eq!(config.camera.eye, [30.0, 25.0, 30.0]);
        assert_eq!(config.collectibles.len(), 1);
        let walk = config.collectibles[0].walk.expect("walk");
        assert_eq!(walk.path_rotation, 0.0);
        assert_eq!(config.scenery.len(), 20);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(matches!(
            EditorConfig::from_json_str("{ \"viewport\": \"wide\" }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = EditorConfig::load(Path::new("/nonexistent/garden.json"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn asset_paths_resolve_against_root() {
        let config = EditorConfig::default();
        assert_eq!(
            config.asset_path(Path::new("items.json")),
            PathBuf::from("assets/items.json")
        );
    }
}
