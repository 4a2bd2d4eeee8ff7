//! Headless [`Renderer`]: keeps a copy of every shape it is handed and answers
//! ray queries against those copies. The window shell and the tests both run
//! the editor over it; drawing pixels is left to other `Renderer` implementations.

use std::collections::BTreeMap;

use super::{pick, Ray, RayHit, Renderer, ShapeHandle};
use crate::scene::Shape;

#[derive(Debug, Default)]
pub struct SceneMirror {
    shapes: BTreeMap<ShapeHandle, Shape>,
    next_handle: u64,
    grid_visible: bool,
}

impl SceneMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape(&self, handle: ShapeHandle) -> Option<&Shape> {
        self.shapes.get(&handle)
    }

    pub fn contains(&self, handle: ShapeHandle) -> bool {
        self.shapes.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }
}

impl Renderer for SceneMirror {
    fn add_shape(&mut self, shape: &Shape) -> ShapeHandle {
        self.next_handle += 1;
        let handle = ShapeHandle::from_raw(self.next_handle);
        self.shapes.insert(handle, shape.clone());
        handle
    }

    fn update_shape(&mut self, handle: ShapeHandle, shape: &Shape) {
        match self.shapes.get_mut(&handle) {
            Some(slot) => *slot = shape.clone(),
            None => log::warn!("update for unknown shape handle {}", handle.raw()),
        }
    }

    fn remove_shape(&mut self, handle: ShapeHandle) {
        if self.shapes.remove(&handle).is_none() {
            log::debug!("remove for unknown shape handle {}", handle.raw());
        }
    }

    fn set_grid_visible(&mut self, visible: bool) {
        self.grid_visible = visible;
    }

    fn intersect(&self, handle: ShapeHandle, ray: &Ray) -> Option<RayHit> {
        pick::intersect_shape(self.shapes.get(&handle)?, ray)
    }
}
