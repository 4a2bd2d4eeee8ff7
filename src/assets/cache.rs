//! Model files loaded once and shared by every item that references them.
//!
//! Loads run on worker threads; results come back over a channel that the
//! frame loop drains with [`SharedSceneCache::poll`], so the cache itself is
//! only ever touched from the main thread.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use super::source_scene::SceneNode;
use super::AssetError;

struct PendingLoad {
    path: String,
    receiver: Receiver<Result<SceneNode, AssetError>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Loaded,
    Failed,
    Unknown,
}

#[derive(Default)]
pub struct SharedSceneCache {
    scenes: HashMap<String, SceneNode>,
    failures: HashMap<String, String>,
    pending: Vec<PendingLoad>,
}

impl std::fmt::Debug for SharedSceneCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSceneCache")
            .field("loaded", &self.scenes.len())
            .field("failed", &self.failures.len())
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl SharedSceneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a background load for every path not already known.
    pub fn preload<I>(&mut self, paths: I, root: &Path)
    where
        I: IntoIterator<Item = String>,
    {
        for path in paths {
            if self.state(&path) != LoadState::Unknown {
                continue;
            }
            let (sender, receiver) = mpsc::channel();
            let full_path: PathBuf = root.join(&path);
            log::debug!("Loading model {}", full_path.display());
            let spawned = thread::Builder::new()
                .name(format!("model-load:{path}"))
                .spawn(move || {
                    let _ = sender.send(SceneNode::load(&full_path));
                });
            match spawned {
                Ok(_) => self.pending.push(PendingLoad { path, receiver }),
                Err(err) => self.mark_failed(&path, err.to_string()),
            }
        }
    }

    /// Drain finished loads. Returns how many settled this call.
    pub fn poll(&mut self) -> usize {
        let mut settled = 0;
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for load in std::mem::take(&mut self.pending) {
            match load.receiver.try_recv() {
                Ok(Ok(scene)) => {
                    settled += 1;
                    self.insert(&load.path, scene);
                }
                Ok(Err(err)) => {
                    settled += 1;
                    self.mark_failed(&load.path, err.to_string());
                }
                Err(TryRecvError::Empty) => still_pending.push(load),
                Err(TryRecvError::Disconnected) => {
                    settled += 1;
                    self.mark_failed(&load.path, "loader thread exited".to_string());
                }
            }
        }
        self.pending = still_pending;
        settled
    }

    pub fn insert(&mut self, path: &str, scene: SceneNode) {
        log::info!(
            "Model loaded: {} ({} meshes, {} nodes)",
            path,
            scene.mesh_count(),
            scene.node_count()
        );
        self.failures.remove(path);
        self.scenes.insert(path.to_string(), scene);
    }

    pub fn mark_failed(&mut self, path: &str, reason: String) {
        let err = AssetError::ModelLoadFailure {
            path: path.to_string(),
            reason: reason.clone(),
        };
        log::error!("{err}");
        self.failures.insert(path.to_string(), reason);
    }

    pub fn get(&self, path: &str) -> Option<&SceneNode> {
        self.scenes.get(path)
    }

    pub fn state(&self, path: &str) -> LoadState {
        if self.scenes.contains_key(path) {
            LoadState::Loaded
        } else if self.failures.contains_key(path) {
            LoadState::Failed
        } else if self.pending.iter().any(|load| load.path == path) {
            LoadState::Pending
        } else {
            LoadState::Unknown
        }
    }

    pub fn is_pending(&self, path: &str) -> bool {
        self.state(path) == LoadState::Pending
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn loaded(&self) -> impl Iterator<Item = (&str, &SceneNode)> {
        self.scenes.iter().map(|(path, scene)| (path.as_str(), scene))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.failures
            .iter()
            .map(|(path, reason)| (path.as_str(), reason.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_scene() -> SceneNode {
        SceneNode {
            name: "root".to_string(),
            mesh: None,
            children: Vec::new(),
        }
    }

    #[test]
    fn insert_then_get() {
        let mut cache = SharedSceneCache::new();
        assert_eq!(cache.state("models/a.json"), LoadState::Unknown);
        cache.insert("models/a.json", tiny_scene());
        assert_eq!(cache.state("models/a.json"), LoadState::Loaded);
        assert!(cache.get("models/a.json").is_some());
    }

    #[test]
    fn failure_is_recorded_and_cleared_by_insert() {
        let mut cache = SharedSceneCache::new();
        cache.mark_failed("models/a.json", "missing".to_string());
        assert_eq!(cache.state("models/a.json"), LoadState::Failed);
        assert_eq!(cache.failures().count(), 1);
        cache.insert("models/a.json", tiny_scene());
        assert_eq!(cache.state("models/a.json"), LoadState::Loaded);
        assert_eq!(cache.failures().count(), 0);
    }

    #[test]
    fn poll_without_pending_is_noop() {
        let mut cache = SharedSceneCache::new();
        assert_eq!(cache.poll(), 0);
        assert!(!cache.has_pending());
    }

    #[test]
    fn preload_then_poll_settles_every_path() {
        let root = std::env::temp_dir().join(format!("garden-cache-{}", std::process::id()));
        std::fs::create_dir_all(&root).expect("temp dir");
        std::fs::write(
            root.join("pot.json"),
            r#"{ "name": "Pot", "children": [{ "name": "pot_body", "mesh": { "min": [0, 0, 0], "max": [1, 1, 1] } }] }"#,
        )
        .expect("write scene");

        let mut cache = SharedSceneCache::new();
        cache.preload(
            vec!["pot.json".to_string(), "absent.json".to_string()],
            &root,
        );
        assert_eq!(cache.state("pot.json"), LoadState::Pending);
        assert!(cache.is_pending("absent.json"));

        let mut settled = 0;
        for _ in 0..1000 {
            settled += cache.poll();
            if !cache.has_pending() {
                break;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(!cache.has_pending());
        assert_eq!(settled, 2);
        assert_eq!(cache.state("pot.json"), LoadState::Loaded);
        assert_eq!(cache.get("pot.json").expect("pot").mesh_count(), 1);
        assert_eq!(cache.state("absent.json"), LoadState::Failed);

        // Known paths are not loaded twice.
        cache.preload(vec!["pot.json".to_string()], &root);
        assert!(!cache.has_pending());
        let _ = std::fs::remove_dir_all(&root);
    }
}
