use glam::{Vec2, Vec3};

use super::Ray;

/// Steepest and shallowest downward pitch reachable by orbiting.
const MIN_ORBIT_PITCH: f32 = -1.5;
const MAX_ORBIT_PITCH: f32 = -0.05;

#[derive(Debug, Clone, Copy, Default)]
pub struct CameraOrbit {
    pub aim_left: bool,
    pub aim_right: bool,
    pub aim_up: bool,
    pub aim_down: bool,
    pub zoom_in: bool,
    pub zoom_out: bool,
}

impl CameraOrbit {
    pub fn is_active(&self) -> bool {
        self.aim_left
            || self.aim_right
            || self.aim_up
            || self.aim_down
            || self.zoom_in
            || self.zoom_out
    }
}

/// Perspective camera described by position, yaw/pitch and a vertical field of view.
#[derive(Debug, Clone, Copy)]
pub struct CameraController {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraController {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self {
            position,
            yaw,
            pitch,
            fov_y_deg: 60.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    pub fn look_at(eye: Vec3, target: Vec3) -> Self {
        let (yaw, pitch) = forward_to_yaw_pitch(target - eye);
        Self::new(eye, yaw, pitch)
    }

    pub fn with_projection(mut self, fov_y_deg: f32, near: f32, far: f32) -> Self {
        self.fov_y_deg = fov_y_deg;
        self.near = near;
        self.far = far;
        self
    }

    /// (forward, right, up), all unit length.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        camera_basis(self.yaw, self.pitch)
    }

    /// World-space ray through a point in normalised device coordinates.
    pub fn ray_through_ndc(&self, ndc: Vec2, aspect: f32) -> Ray {
        let (forward, right, up) = self.basis();
        let half_height = (self.fov_y_deg.to_radians() * 0.5).tan();
        let half_width = half_height * aspect.max(f32::EPSILON);
        let direction = forward + right * (ndc.x * half_width) + up * (ndc.y * half_height);
        Ray::new(self.position, direction)
    }

    pub fn orbit_around(&mut self, pivot: Vec3, yaw_delta: f32, pitch_delta: f32) {
        let distance = (self.position - pivot).length().max(0.05);
        self.yaw += yaw_delta;
        self.pitch = (self.pitch + pitch_delta).clamp(MIN_ORBIT_PITCH, MAX_ORBIT_PITCH);
        wrap_yaw(&mut self.yaw);

        let (forward, _, _) = self.basis();
        self.position = pivot - forward * distance;
    }

    pub fn zoom_toward(&mut self, pivot: Vec3, delta: f32) {
        let offset = self.position - pivot;
        let distance = (offset.length() - delta).clamp(5.0, 200.0);
        self.position = pivot + offset.normalize_or_zero() * distance;
    }

    pub fn update_orbit(&mut self, input: &CameraOrbit, pivot: Vec3, frame_dt: f32) -> bool {
        if !input.is_active() {
            return false;
        }
        let aim_speed = 1.2 * frame_dt;
        let zoom_speed = 20.0 * frame_dt;

        let mut yaw = 0.0;
        let mut pitch = 0.0;
        if input.aim_left {
            yaw -= aim_speed;
        }
        if input.aim_right {
            yaw += aim_speed;
        }
        if input.aim_up {
            pitch -= aim_speed;
        }
        if input.aim_down {
            pitch += aim_speed;
        }
        self.orbit_around(pivot, yaw, pitch);

        if input.zoom_in {
            self.zoom_toward(pivot, zoom_speed);
        }
        if input.zoom_out {
            self.zoom_toward(pivot, -zoom_speed);
        }
        true
    }
}

fn forward_to_yaw_pitch(forward: Vec3) -> (f32, f32) {
    let n = forward.normalize_or_zero();
    if n == Vec3::ZERO {
        return (0.0, 0.0);
    }
    let yaw = n.z.atan2(n.x);
    let pitch = n.y.atan2(Vec3::new(n.x, 0.0, n.z).length());
    (yaw, pitch)
}

fn camera_basis(yaw: f32, pitch: f32) -> (Vec3, Vec3, Vec3) {
    let cos_pitch = pitch.cos();
    let forward = Vec3::new(yaw.cos() * cos_pitch, pitch.sin(), yaw.sin() * cos_pitch);
    let right = Vec3::new(-yaw.sin(), 0.0, yaw.cos());
    let up = right.cross(forward).normalize_or_zero();
    (forward, right, up)
}

fn wrap_yaw(yaw: &mut f32) {
    const TWO_PI: f32 = std::f32::consts::PI * 2.0;
    if yaw.is_finite() {
        *yaw = (*yaw + std::f32::consts::PI).rem_euclid(TWO_PI) - std::f32::consts::PI;
    }
}
