pub mod camera;
pub mod mirror;
pub mod pick;
pub mod pointer;

pub use camera::{CameraController, CameraOrbit};
pub use mirror::SceneMirror;
pub use pointer::{PointerResolver, Viewport};

use glam::Vec3;

use crate::scene::Shape;

/// Opaque handle to a shape mirrored by a [`Renderer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeHandle(u64);

impl ShapeHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    /// Index into [`Shape::meshes`] of the part hit, `None` for a composite's
    /// bounding proxy.
    pub part: Option<usize>,
}

/// Scene-graph boundary the editor draws through.
///
/// The editor owns every [`Shape`]; a renderer only mirrors what it is handed
/// and answers ray queries against the mirrored copy.
pub trait Renderer {
    fn add_shape(&mut self, shape: &Shape) -> ShapeHandle;
    fn update_shape(&mut self, handle: ShapeHandle, shape: &Shape);
    fn remove_shape(&mut self, handle: ShapeHandle);
    fn set_grid_visible(&mut self, visible: bool);
    fn intersect(&self, handle: ShapeHandle, ray: &Ray) -> Option<RayHit>;
}
