//! Plot containment and spacing rules for placed items.

use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::assets::DefinitionTable;
use crate::scene::{ItemId, Registry};

pub const DEFAULT_PATH_MARGIN: f32 = 2.0;
pub const DEFAULT_PATH_MIN_SPACING: f32 = 2.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlacementRejection {
    #[error("{type_id} at ({x:.2}, {z:.2}) is outside the plot")]
    OutOfBounds { type_id: String, x: f32, z: f32 },
    #[error("{type_id} overlaps item {other} ({distance:.2} < {min_distance:.2})")]
    Overlap {
        type_id: String,
        other: ItemId,
        distance: f32,
        min_distance: f32,
    },
    #[error("pointer does not reach the ground")]
    NoGroundPoint,
    #[error("unknown item type: {0}")]
    UnknownItemType(String),
}

/// Axis-aligned garden plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlotBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for PlotBounds {
    fn default() -> Self {
        Self {
            min: [-20.0, -0.1, -15.0],
            max: [20.0, 0.1, 15.0],
        }
    }
}

impl PlotBounds {
    /// Inclusive containment on all three axes.
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min[0]
            && point.x <= self.max[0]
            && point.y >= self.min[1]
            && point.y <= self.max[1]
            && point.z >= self.min[2]
            && point.z <= self.max[2]
    }

    /// Inclusive containment on x/z after shrinking the plot by `margin`.
    pub fn contains_planar_with_margin(&self, point: Vec3, margin: f32) -> bool {
        point.x >= self.min[0] + margin
            && point.x <= self.max[0] - margin
            && point.z >= self.min[2] + margin
            && point.z <= self.max[2] - margin
    }

    pub fn center(&self) -> Vec3 {
        (Vec3::from(self.min) + Vec3::from(self.max)) * 0.5
    }
}

#[derive(Debug, Clone)]
pub struct PlacementValidator {
    bounds: PlotBounds,
    path_margin: f32,
    path_min_spacing: f32,
    path_types: HashSet<String>,
}

impl PlacementValidator {
    pub fn new(bounds: PlotBounds, definitions: &DefinitionTable) -> Self {
        let path_types = definitions
            .iter()
            .filter(|definition| definition.is_path_like())
            .map(|definition| definition.type_id.clone())
            .collect();
        Self {
            bounds,
            path_margin: DEFAULT_PATH_MARGIN,
            path_min_spacing: DEFAULT_PATH_MIN_SPACING,
            path_types,
        }
    }

    pub fn with_path_rules(mut self, margin: f32, min_spacing: f32) -> Self {
        self.path_margin = margin;
        self.path_min_spacing = min_spacing;
        self
    }

    pub fn bounds(&self) -> &PlotBounds {
        &self.bounds
    }

    pub fn is_path_like(&self, type_id: &str) -> bool {
        self.path_types.contains(type_id)
    }

    pub fn is_within_bounds(&self, point: Vec3, type_id: &str) -> bool {
        if self.is_path_like(type_id) {
            self.bounds
                .contains_planar_with_margin(point, self.path_margin)
        } else {
            self.bounds.contains(point)
        }
    }

    /// First registry item the candidate would overlap, with the distance and
    /// the threshold it failed.
    pub fn find_overlap(
        &self,
        point: Vec3,
        radius: f32,
        type_id: &str,
        registry: &Registry,
        excluding: Option<ItemId>,
    ) -> Option<(ItemId, f32, f32)> {
        let candidate_is_path = self.is_path_like(type_id);
        registry
            .all()
            .iter()
            .filter(|item| Some(item.id()) != excluding && !item.vanishing)
            .find_map(|item| {
                let distance = item.planar_distance_to(point);
                let min_distance = if candidate_is_path && self.is_path_like(&item.type_id) {
                    self.path_min_spacing
                } else {
                    radius + item.radius
                };
                (distance < min_distance).then_some((item.id(), distance, min_distance))
            })
    }

    pub fn overlaps(
        &self,
        point: Vec3,
        radius: f32,
        type_id: &str,
        registry: &Registry,
        excluding: Option<ItemId>,
    ) -> bool {
        self.find_overlap(point, radius, type_id, registry, excluding)
            .is_some()
    }

    /// Bounds then overlap, reported as a typed rejection.
    pub fn check(
        &self,
        point: Vec3,
        radius: f32,
        type_id: &str,
        registry: &Registry,
        excluding: Option<ItemId>,
    ) -> Result<(), PlacementRejection> {
        if !self.is_within_bounds(point, type_id) {
            return Err(PlacementRejection::OutOfBounds {
                type_id: type_id.to_string(),
                x: point.x,
                z: point.z,
            });
        }
        if let Some((other, distance, min_distance)) =
            self.find_overlap(point, radius, type_id, registry, excluding)
        {
            return Err(PlacementRejection::Overlap {
                type_id: type_id.to_string(),
                other,
                distance,
                min_distance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::ItemKind;
    use crate::render::ShapeHandle;
    use crate::scene::{Geometry, Material, Mesh, PlacedItem, Shape};

    fn validator() -> PlacementValidator {
        PlacementValidator::new(PlotBounds::default(), &DefinitionTable::builtin())
    }

    fn place(registry: &mut Registry, type_id: &str, radius: f32, x: f32, z: f32) -> ItemId {
        let shape = Shape::Primitive(Mesh::new(
            type_id,
            Geometry::Box { size: Vec3::ONE },
            Material::standard(0x808080, 0.5, 0.0),
        ));
        let mut item = PlacedItem::new(
            type_id,
            ItemKind::Decoration,
            radius,
            shape,
            ShapeHandle::from_raw(0),
        );
        item.set_position(Vec3::new(x, 0.0, z));
        registry.add(item)
    }

    #[test]
    fn bounds_are_inclusive() {
        let v = validator();
        assert!(v.is_within_bounds(Vec3::new(20.0, 0.0, 15.0), "bench"));
        assert!(v.is_within_bounds(Vec3::new(-20.0, 0.0, -15.0), "bench"));
        assert!(!v.is_within_bounds(Vec3::new(25.0, 0.0, 0.0), "bench"));
        assert!(!v.is_within_bounds(Vec3::new(0.0, 0.5, 0.0), "bench"));
    }

    #[test]
    fn path_uses_shrunk_plot() {
        let v = validator();
        assert!(!v.is_within_bounds(Vec3::new(18.5, 0.0, 0.0), "stone_path"));
        assert!(v.is_within_bounds(Vec3::new(17.9, 0.0, 0.0), "stone_path"));
        assert!(v.is_within_bounds(Vec3::new(18.0, 0.0, 13.0), "stone_path"));
        // Elevation is not considered for paths.
        assert!(v.is_within_bounds(Vec3::new(0.0, 3.0, 0.0), "stone_path"));
        // Ordinary items still reach the edge.
        assert!(v.is_within_bounds(Vec3::new(18.5, 0.0, 0.0), "bench"));
    }

    #[test]
    fn benches_overlap_within_summed_radii() {
        let v = validator();
        let mut registry = Registry::new();
        let first = place(&mut registry, "bench", 1.5, 0.0, 0.0);
        assert!(v.overlaps(Vec3::new(1.0, 0.0, 0.0), 1.5, "bench", &registry, None));
        assert!(!v.overlaps(Vec3::new(5.0, 0.0, 0.0), 1.5, "bench", &registry, None));
        // Exactly touching is allowed.
        assert!(!v.overlaps(Vec3::new(3.0, 0.0, 0.0), 1.5, "bench", &registry, None));
        assert!(!v.overlaps(
            Vec3::new(1.0, 0.0, 0.0),
            1.5,
            "bench",
            &registry,
            Some(first)
        ));
    }

    #[test]
    fn paths_only_need_min_spacing_between_each_other() {
        let v = validator();
        let mut registry = Registry::new();
        place(&mut registry, "stone_path", 1.5, 0.0, 0.0);
        assert!(!v.overlaps(Vec3::new(2.0, 0.0, 0.0), 1.5, "stone_path", &registry, None));
        assert!(v.overlaps(Vec3::new(1.9, 0.0, 0.0), 1.5, "stone_path", &registry, None));
        // A bench next to a path uses the summed radii.
        assert!(v.overlaps(Vec3::new(2.5, 0.0, 0.0), 1.5, "bench", &registry, None));
    }

    #[test]
    fn vanishing_items_do_not_block() {
        let v = validator();
        let mut registry = Registry::new();
        let gnome = place(&mut registry, "gnome", 1.0, 0.0, 0.0);
        assert!(v.overlaps(Vec3::ZERO, 1.0, "bench", &registry, None));
        registry.get_mut(gnome).expect("gnome").vanishing = true;
        assert!(!v.overlaps(Vec3::ZERO, 1.0, "bench", &registry, None));
    }

    #[test]
    fn check_reports_reason() {
        let v = validator();
        let mut registry = Registry::new();
        let first = place(&mut registry, "bench", 1.5, 0.0, 0.0);
        assert!(matches!(
            v.check(Vec3::new(25.0, 0.0, 0.0), 1.5, "bench", &registry, None),
            Err(PlacementRejection::OutOfBounds { .. })
        ));
        assert!(matches!(
            v.check(Vec3::new(1.0, 0.0, 0.0), 1.5, "bench", &registry, None),
            Err(PlacementRejection::Overlap { other, .. }) if other == first
        ));
        assert!(v
            .check(Vec3::new(5.0, 0.0, 0.0), 1.5, "bench", &registry, None)
            .is_ok());
    }

    #[test]
    fn custom_path_rules() {
        let v = validator().with_path_rules(0.0, 4.0);
        let mut registry = Registry::new();
        place(&mut registry, "stone_path", 1.5, 0.0, 0.0);
        assert!(v.is_within_bounds(Vec3::new(20.0, 0.0, 0.0), "stone_path"));
        assert!(v.overlaps(Vec3::new(3.0, 0.0, 0.0), 1.5, "stone_path", &registry, None));
    }
}
