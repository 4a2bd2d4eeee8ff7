//! Fixed recipes for items built from primitives instead of model files.

use glam::Vec3;

use crate::scene::{rgb, Aabb, Composite, Geometry, Material, Mesh, PointLight, Shape, Transform};

/// Name of the lightpole part that follows day and night.
pub const BULB_PART: &str = "bulb";
pub const BULB_HEIGHT: f32 = 6.2;
pub const BULB_LIGHT_COLOR: u32 = 0xffffaa;
pub const BULB_LIGHT_RANGE: f32 = 15.0;

const STONE_COUNT: usize = 6;
const STONE_SPACING: f32 = 1.8;
const STONE_SIZE: Vec3 = Vec3::new(1.5, 0.3, 1.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipe {
    Tree,
    Bench,
    Fountain,
    FlowerPot,
    StonePath,
    Lightpole,
}

impl Recipe {
    pub fn for_type(type_id: &str) -> Option<Self> {
        match type_id {
            "tree" => Some(Self::Tree),
            "bench" => Some(Self::Bench),
            "fountain" => Some(Self::Fountain),
            "flower_pot" => Some(Self::FlowerPot),
            "stone_path" => Some(Self::StonePath),
            "lightpole" => Some(Self::Lightpole),
            _ => None,
        }
    }

    pub fn build(self) -> Shape {
        let composite = match self {
            Self::Tree => tree(),
            Self::Bench => bench(),
            Self::Fountain => fountain(),
            Self::FlowerPot => flower_pot(),
            Self::StonePath => stone_path(),
            Self::Lightpole => lightpole(),
        };
        Shape::Composite(composite)
    }
}

fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> Geometry {
    Geometry::Cylinder {
        radius_top,
        radius_bottom,
        height,
        segments,
    }
}

fn cuboid(x: f32, y: f32, z: f32) -> Geometry {
    Geometry::Box {
        size: Vec3::new(x, y, z),
    }
}

fn group(parts: Vec<Mesh>, proxy: Vec3) -> Composite {
    Composite {
        parts,
        proxy: Aabb::centered(proxy),
        transform: Transform::IDENTITY,
        lights: Vec::new(),
    }
}

fn tree() -> Composite {
    let trunk = Material::standard(0x8b4513, 0.9, 0.0);
    let leaves = Material::standard(0x228b22, 0.8, 0.0);
    group(
        vec![
            Mesh::new("trunk", cylinder(0.4, 0.6, 3.0, 8), trunk).at(0.0, 1.5, 0.0),
            Mesh::new("leaves", Geometry::Sphere { radius: 2.5 }, leaves).at(0.0, 4.5, 0.0),
        ],
        Vec3::new(5.0, 6.0, 5.0),
    )
}

fn bench() -> Composite {
    let wood = Material::standard(0x8b4513, 0.8, 0.0);
    let metal = Material::standard(0x696969, 0.3, 0.8);
    let mut parts = vec![
        Mesh::new("seat", cuboid(3.0, 0.3, 1.2), wood).at(0.0, 0.65, 0.0),
        Mesh::new("back", cuboid(3.0, 1.2, 0.2), wood).at(0.0, 1.25, -0.6),
    ];
    for x in [-1.5, 1.5] {
        parts.push(Mesh::new("leg", cuboid(0.2, 0.65, 0.2), metal).at(x, 0.325, 0.0));
    }
    group(parts, Vec3::new(3.0, 1.5, 1.2))
}

fn fountain() -> Composite {
    let stone = Material::standard(0x808080, 0.8, 0.0);
    let water = Material::standard(0x4a90e2, 0.1, 0.8).with_opacity(0.7);
    group(
        vec![
            Mesh::new("base", cylinder(2.0, 2.5, 0.5, 16), stone).at(0.0, 0.25, 0.0),
            Mesh::new("center", cylinder(0.8, 1.2, 1.5, 16), stone).at(0.0, 1.25, 0.0),
            Mesh::new("water", cylinder(1.8, 1.8, 0.3, 16), water)
                .at(0.0, 0.4, 0.0)
                .without_cast_shadow(),
        ],
        Vec3::new(5.0, 2.0, 5.0),
    )
}

fn flower_pot() -> Composite {
    let pot = Material::standard(0xcd853f, 0.8, 0.0);
    let flower = Material::standard(0xff69b4, 0.7, 0.0);
    group(
        vec![
            Mesh::new("pot", cylinder(0.8, 0.6, 1.2, 8), pot).at(0.0, 0.6, 0.0),
            Mesh::new("flower", Geometry::Sphere { radius: 0.6 }, flower).at(0.0, 1.5, 0.0),
        ],
        Vec3::new(1.6, 2.1, 1.6),
    )
}

fn stone_path() -> Composite {
    let stone = Material::standard(0x8b8b8b, 0.9, 0.0);
    let half_span = (STONE_COUNT - 1) as f32 / 2.0;
    let parts = (0..STONE_COUNT)
        .map(|i| {
            Mesh::new("stone", Geometry::Box { size: STONE_SIZE }, stone)
                .at((i as f32 - half_span) * STONE_SPACING, STONE_SIZE.y / 2.0, 0.0)
                .rotated_y(i as f32 * 0.2)
        })
        .collect();
    let total_width = (STONE_COUNT - 1) as f32 * STONE_SPACING + STONE_SIZE.x;
    group(
        parts,
        Vec3::new(total_width, STONE_SIZE.y, STONE_SIZE.z * 2.0),
    )
}

fn lightpole() -> Composite {
    let pole = Material::standard(0x696969, 0.7, 0.3);
    let bulb = Material::standard(0xcccccc, 0.2, 0.8);
    let mut composite = group(
        vec![
            Mesh::new("pole", cylinder(0.15, 0.2, 6.0, 8), pole).at(0.0, 3.0, 0.0),
            Mesh::new(BULB_PART, Geometry::Sphere { radius: 0.4 }, bulb).at(0.0, BULB_HEIGHT, 0.0),
        ],
        Vec3::new(2.0, 6.5, 2.0),
    );
    composite.lights.push(PointLight {
        color: rgb(BULB_LIGHT_COLOR),
        intensity: 0.0,
        range: BULB_LIGHT_RANGE,
        offset: Vec3::new(0.0, BULB_HEIGHT, 0.0),
    });
    composite
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_recipe_is_composite_with_parts() {
        for id in ["tree", "bench", "fountain", "flower_pot", "stone_path", "lightpole"] {
            let recipe = Recipe::for_type(id).expect("recipe");
            let shape = recipe.build();
            assert!(shape.is_composite(), "{id} should be composite");
            assert!(!shape.meshes().is_empty(), "{id} should have parts");
        }
        assert!(Recipe::for_type("grape_1").is_none());
    }

    #[test]
    fn bench_has_seat_back_and_two_legs() {
        let shape = Recipe::Bench.build();
        let names: Vec<&str> = shape.meshes().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["seat", "back", "leg", "leg"]);
    }

    #[test]
    fn stone_path_is_centered_and_staggered() {
        let shape = Recipe::StonePath.build();
        let stones = shape.meshes();
        assert_eq!(stones.len(), STONE_COUNT);
        assert!((stones[0].transform.translation.x + 4.5).abs() < 1e-5);
        assert!((stones[5].transform.translation.x - 4.5).abs() < 1e-5);
        let Shape::Composite(group) = &shape else {
            panic!("expected composite");
        };
        assert!((group.proxy.size().x - 10.5).abs() < 1e-5);
    }

    #[test]
    fn lightpole_starts_dark() {
        let mut shape = Recipe::Lightpole.build();
        let bulb = shape.part_mut(BULB_PART).expect("bulb");
        assert_eq!(bulb.material.emissive_intensity, 0.0);
        assert_eq!(shape.lights_mut()[0].intensity, 0.0);
    }

    #[test]
    fn fountain_water_is_translucent_and_casts_no_shadow() {
        let shape = Recipe::Fountain.build();
        let water = shape
            .meshes()
            .iter()
            .find(|m| m.name == "water")
            .expect("water");
        assert!(water.material.is_transparent());
        assert!(!water.cast_shadow);
    }

    #[test]
    fn tree_top_is_above_proxy() {
        let shape = Recipe::Tree.build();
        assert!((shape.world_bounds().max.y - 7.0).abs() < 1e-4);
    }
}
