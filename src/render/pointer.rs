//! Viewport pixel to ground-plane point.

use glam::{Vec2, Vec3};

use super::{CameraController, Ray};

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(1.0),
            height: height.max(1.0),
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }
}

/// Horizontal plane `y = height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPlane {
    pub height: f32,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self { height: 0.0 }
    }
}

impl GroundPlane {
    /// Intersection in front of the ray origin, if any.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let denom = ray.direction.y;
        if denom.abs() < PARALLEL_EPSILON {
            return None;
        }
        let t = (self.height - ray.origin.y) / denom;
        if t < 0.0 {
            return None;
        }
        let mut point = ray.at(t);
        point.y = self.height;
        Some(point)
    }
}

#[derive(Debug, Clone)]
pub struct PointerResolver {
    camera: CameraController,
    viewport: Viewport,
    ground: GroundPlane,
}

impl PointerResolver {
    pub fn new(camera: CameraController, viewport: Viewport) -> Self {
        Self {
            camera,
            viewport,
            ground: GroundPlane::default(),
        }
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraController {
        &mut self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Viewport::new(width, height);
    }

    pub fn to_ndc(&self, x: f32, y: f32) -> Vec2 {
        Vec2::new(
            x / self.viewport.width * 2.0 - 1.0,
            -(y / self.viewport.height * 2.0 - 1.0),
        )
    }

    pub fn ray(&self, x: f32, y: f32) -> Ray {
        self.camera
            .ray_through_ndc(self.to_ndc(x, y), self.viewport.aspect())
    }

    /// Ground point under the pixel, or `None` when the ray never reaches the ground.
    pub fn project(&self, x: f32, y: f32) -> Option<Vec3> {
        let point = self.ground.intersect(&self.ray(x, y));
        if point.is_none() {
            log::trace!("pointer ({:.1}, {:.1}) does not reach the ground", x, y);
        }
        point
    }
}
