//! CPU ray picking against mirrored shapes.
//!
//! Each mesh is tested in its own local space: the ray is carried through the
//! inverse world matrix so boxes become axis-aligned and spheres stay spheres
//! under non-uniform scale. The direction is not re-normalised after the
//! transform, which keeps the hit parameter equal to the world-space distance.

use glam::{Mat4, Vec3};

use super::{Ray, RayHit};
use crate::scene::{Aabb, Geometry, Shape};

// ========================================================================
// Primitive tests
// ========================================================================

/// Slab-method ray/AABB test. Returns the entry distance, or the exit distance
/// when the origin is inside the box.
pub fn ray_aabb_hit_t(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_min > t_max {
            return None;
        }
    }

    if t_max < 0.0 {
        return None;
    }
    Some(if t_min >= 0.0 { t_min } else { t_max })
}

pub fn ray_sphere_hit_t(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let a = direction.length_squared();
    if a <= f32::EPSILON {
        return None;
    }
    let half_b = oc.dot(direction);
    let c = oc.length_squared() - radius * radius;
    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let root = discriminant.sqrt();
    let near = (-half_b - root) / a;
    let far = (-half_b + root) / a;
    if far < 0.0 {
        return None;
    }
    Some(if near >= 0.0 { near } else { far })
}

/// Test a ray against an oriented box given by a world matrix and local bounds.
pub fn ray_hits_obb(ray: &Ray, world: &Mat4, bounds: &Aabb) -> Option<f32> {
    let inv = world.inverse();
    let o_local = inv.transform_point3(ray.origin);
    let d_local = inv.transform_vector3(ray.direction);
    ray_aabb_hit_t(o_local, d_local, bounds.min, bounds.max)
}

fn ray_hits_geometry(ray: &Ray, world: &Mat4, geometry: &Geometry) -> Option<f32> {
    match geometry {
        Geometry::Sphere { radius } => {
            let inv = world.inverse();
            ray_sphere_hit_t(
                inv.transform_point3(ray.origin),
                inv.transform_vector3(ray.direction),
                Vec3::ZERO,
                *radius,
            )
        }
        other => ray_hits_obb(ray, world, &other.local_bounds()),
    }
}

// ========================================================================
// Shape test
// ========================================================================

/// Nearest hit across every mesh of the shape, plus the bounding proxy of a
/// composite.
pub fn intersect_shape(shape: &Shape, ray: &Ray) -> Option<RayHit> {
    let mut best: Option<RayHit> = None;
    let mut consider = |distance: f32, part: Option<usize>| {
        if best.map_or(true, |hit| distance < hit.distance) {
            best = Some(RayHit { distance, part });
        }
    };

    if let Shape::Composite(group) = shape {
        if let Some(t) = ray_hits_obb(ray, &group.transform.matrix(), &group.proxy) {
            consider(t, None);
        }
    }

    for (index, mesh) in shape.meshes().iter().enumerate() {
        let Some(world) = shape.mesh_world_matrix(index) else {
            continue;
        };
        if world.determinant().abs() <= f32::EPSILON {
            // Collapsed to nothing (fully vanished); cannot be hit.
            continue;
        }
        if let Some(t) = ray_hits_geometry(ray, &world, &mesh.geometry) {
            consider(t, Some(index));
        }
    }

    best
}

// ========================================================================
// Tests
// ========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Composite, Material, Mesh, Transform};

    #[test]
    fn aabb_hit_from_outside() {
        let t = ray_aabb_hit_t(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, Some(9.0));
    }

    #[test]
    fn aabb_hit_from_inside_returns_exit() {
        let t = ray_aabb_hit_t(Vec3::ZERO, Vec3::X, Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_eq!(t, Some(1.0));
    }

    #[test]
    fn aabb_parallel_ray_outside_slab_misses() {
        let t = ray_aabb_hit_t(
            Vec3::new(0.0, 5.0, 10.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, None);
    }

    #[test]
    fn aabb_behind_origin_misses() {
        let t = ray_aabb_hit_t(
            Vec3::new(0.0, 0.0, 10.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::splat(-1.0),
            Vec3::splat(1.0),
        );
        assert_eq!(t, None);
    }

    #[test]
    fn sphere_hit_distance() {
        let t = ray_sphere_hit_t(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::ZERO, 1.0);
        assert!((t.expect("hit") - 4.0).abs() < 1e-5);
        assert!(ray_sphere_hit_t(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z, Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn obb_respects_rotation_and_scale() {
        let world = Transform {
            translation: Vec3::new(0.0, 0.0, 0.0),
            rotation: glam::Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
            scale: Vec3::splat(2.0),
        }
        .matrix();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = ray_hits_obb(&ray, &world, &Aabb::centered(Vec3::ONE)).expect("hit");
        // Rotated unit cube scaled by 2 presents a corner at sqrt(2).
        assert!((t - (10.0 - std::f32::consts::SQRT_2)).abs() < 1e-4);
    }

    #[test]
    fn composite_reports_nearest_part() {
        let shape = Shape::Composite(Composite {
            parts: vec![
                Mesh::new(
                    "low",
                    Geometry::Box { size: Vec3::ONE },
                    Material::standard(0x808080, 0.5, 0.0),
                )
                .at(0.0, 0.5, 0.0),
                Mesh::new(
                    "high",
                    Geometry::Sphere { radius: 0.5 },
                    Material::standard(0x808080, 0.5, 0.0),
                )
                .at(0.0, 3.0, 0.0),
            ],
            proxy: Aabb::centered(Vec3::new(0.2, 0.2, 0.2)),
            transform: Transform::from_translation(Vec3::new(4.0, 0.0, 0.0)),
            lights: Vec::new(),
        });
        let ray = Ray::new(Vec3::new(4.0, 10.0, 0.0), Vec3::NEG_Y);
        let hit = intersect_shape(&shape, &ray).expect("hit");
        assert_eq!(hit.part, Some(1));
        assert!((hit.distance - 6.5).abs() < 1e-4);
    }

    #[test]
    fn collapsed_shape_is_not_hit() {
        let mut shape = Shape::Primitive(Mesh::new(
            "cube",
            Geometry::Box { size: Vec3::ONE },
            Material::standard(0x808080, 0.5, 0.0),
        ));
        shape.set_scale(Vec3::ZERO);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(intersect_shape(&shape, &ray).is_none());
    }
}
