//! Renderable shape model shared by the asset resolver, the registry and the
//! renderer boundary.
//!
//! A placed item is either a single mesh or a composite of primitive parts
//! grouped under one transform with an invisible bounding proxy. Every
//! transform, highlight and dispose operation matches on [`Shape`] instead of
//! digging through side channels.

pub mod registry;

use glam::{Mat4, Quat, Vec3};

pub use registry::{Highlight, ItemId, PlacedItem, Registry};

/// Convert a packed `0xRRGGBB` colour into linear-ish float channels.
pub fn rgb(hex: u32) -> [f32; 3] {
    [
        ((hex >> 16) & 0xFF) as f32 / 255.0,
        ((hex >> 8) & 0xFF) as f32 / 255.0,
        (hex & 0xFF) as f32 / 255.0,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: [f32; 3],
    pub roughness: f32,
    pub metalness: f32,
    pub emissive: [f32; 3],
    pub emissive_intensity: f32,
    pub opacity: f32,
}

impl Material {
    pub fn standard(color: u32, roughness: f32, metalness: f32) -> Self {
        Self {
            color: rgb(color),
            roughness,
            metalness,
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 0.0,
            opacity: 1.0,
        }
    }

    /// Flat, unlit overlay material (selection ring, labels, proxies).
    pub fn unlit(color: u32, opacity: f32) -> Self {
        Self {
            color: rgb(color),
            roughness: 1.0,
            metalness: 0.0,
            emissive: [0.0, 0.0, 0.0],
            emissive_intensity: 0.0,
            opacity,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Box of the given size centred on the origin.
    pub fn centered(size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self::new(-half, half)
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Bounds of the eight transformed corners.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for i in 0..8 {
            let corner = Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            );
            let p = matrix.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Aabb { min, max }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Box {
        size: Vec3,
    },
    Cylinder {
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
    },
    Sphere {
        radius: f32,
    },
    Cone {
        radius: f32,
        height: f32,
        segments: u32,
    },
    /// Flat annulus lying in the XZ plane.
    Ring {
        inner_radius: f32,
        outer_radius: f32,
        segments: u32,
    },
    /// Camera-facing text sprite.
    Label {
        text: String,
        width: f32,
        height: f32,
    },
    /// Geometry taken from a loaded model, known only by its bounds.
    Imported {
        bounds: Aabb,
    },
}

impl Geometry {
    pub fn local_bounds(&self) -> Aabb {
        match self {
            Geometry::Box { size } => Aabb::centered(*size),
            Geometry::Cylinder {
                radius_top,
                radius_bottom,
                height,
                ..
            } => {
                let r = radius_top.max(*radius_bottom);
                Aabb::centered(Vec3::new(r * 2.0, *height, r * 2.0))
            }
            Geometry::Sphere { radius } => Aabb::centered(Vec3::splat(radius * 2.0)),
            Geometry::Cone { radius, height, .. } => {
                Aabb::centered(Vec3::new(radius * 2.0, *height, radius * 2.0))
            }
            Geometry::Ring { outer_radius, .. } => {
                Aabb::centered(Vec3::new(outer_radius * 2.0, 0.01, outer_radius * 2.0))
            }
            Geometry::Label { width, height, .. } => {
                Aabb::centered(Vec3::new(*width, *height, 0.01))
            }
            Geometry::Imported { bounds } => *bounds,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    pub fn with_rotation_y(mut self, angle: f32) -> Self {
        self.rotation = Quat::from_rotation_y(angle);
        self
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: Material,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(name: impl Into<String>, geometry: Geometry, material: Material) -> Self {
        Self {
            name: name.into(),
            geometry,
            material,
            transform: Transform::IDENTITY,
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    pub fn at(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.translation = Vec3::new(x, y, z);
        self
    }

    pub fn rotated_y(mut self, angle: f32) -> Self {
        self.transform.rotation = Quat::from_rotation_y(angle);
        self
    }

    pub fn without_cast_shadow(mut self) -> Self {
        self.cast_shadow = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub color: [f32; 3],
    pub intensity: f32,
    pub range: f32,
    /// Offset from the owning shape's origin.
    pub offset: Vec3,
}

/// Several primitives moved, scaled and highlighted as one logical object.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub parts: Vec<Mesh>,
    /// Invisible bounding proxy used for placement and picking.
    pub proxy: Aabb,
    pub transform: Transform,
    pub lights: Vec<PointLight>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Primitive(Mesh),
    Composite(Composite),
}

impl Shape {
    pub fn transform(&self) -> &Transform {
        match self {
            Shape::Primitive(mesh) => &mesh.transform,
            Shape::Composite(group) => &group.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Shape::Primitive(mesh) => &mut mesh.transform,
            Shape::Composite(group) => &mut group.transform,
        }
    }

    pub fn set_translation(&mut self, translation: Vec3) {
        self.transform_mut().translation = translation;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform_mut().scale = scale;
    }

    pub fn set_rotation_y(&mut self, angle: f32) {
        self.transform_mut().rotation = Quat::from_rotation_y(angle);
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Shape::Composite(_))
    }

    pub fn meshes(&self) -> &[Mesh] {
        match self {
            Shape::Primitive(mesh) => std::slice::from_ref(mesh),
            Shape::Composite(group) => &group.parts,
        }
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        match self {
            Shape::Primitive(mesh) => std::slice::from_mut(mesh),
            Shape::Composite(group) => &mut group.parts,
        }
    }

    pub fn part_mut(&mut self, name: &str) -> Option<&mut Mesh> {
        self.meshes_mut().iter_mut().find(|mesh| mesh.name == name)
    }

    pub fn lights_mut(&mut self) -> &mut [PointLight] {
        match self {
            Shape::Primitive(_) => &mut [],
            Shape::Composite(group) => &mut group.lights,
        }
    }

    /// World matrix of the mesh at `index` in [`Shape::meshes`].
    pub fn mesh_world_matrix(&self, index: usize) -> Option<Mat4> {
        match self {
            Shape::Primitive(mesh) => (index == 0).then(|| mesh.transform.matrix()),
            Shape::Composite(group) => group
                .parts
                .get(index)
                .map(|part| group.transform.matrix() * part.transform.matrix()),
        }
    }

    pub fn world_bounds(&self) -> Aabb {
        match self {
            Shape::Primitive(mesh) => mesh
                .geometry
                .local_bounds()
                .transformed(&mesh.transform.matrix()),
            Shape::Composite(group) => {
                let matrix = group.transform.matrix();
                group
                    .parts
                    .iter()
                    .map(|part| {
                        part.geometry
                            .local_bounds()
                            .transformed(&(matrix * part.transform.matrix()))
                    })
                    .fold(group.proxy.transformed(&matrix), |acc, b| acc.union(&b))
            }
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        for mesh in self.meshes_mut() {
            mesh.material.opacity = opacity;
        }
    }

    pub fn tint(&mut self, color: u32) {
        let color = rgb(color);
        for mesh in self.meshes_mut() {
            mesh.material.color = color;
        }
    }

    pub fn materials(&self) -> Vec<Material> {
        self.meshes().iter().map(|mesh| mesh.material).collect()
    }

    /// Restore materials captured with [`Shape::materials`]. Extra entries are ignored.
    pub fn restore_materials(&mut self, materials: &[Material]) {
        for (mesh, material) in self.meshes_mut().iter_mut().zip(materials) {
            mesh.material = *material;
        }
    }
}
