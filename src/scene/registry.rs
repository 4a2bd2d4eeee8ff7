//! Ordered collection of placed items.
//!
//! The registry is the single source of truth for overlap checks, hit-testing,
//! selection and deletion. Identity is the [`ItemId`] handed out by [`Registry::add`].

use glam::Vec3;

use crate::assets::definitions::ItemKind;
use crate::interaction::animation::AnimationId;
use crate::render::{Ray, Renderer, ShapeHandle};
use crate::scene::{Material, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(u64);

impl ItemId {
    /// Placeholder carried by an item until the registry adopts it.
    pub const UNASSIGNED: ItemId = ItemId(0);

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Selection decoration; present on an item exactly while it is selected.
#[derive(Debug, Clone, PartialEq)]
pub struct Highlight {
    pub original_materials: Vec<Material>,
    pub ring: ShapeHandle,
    pub label: ShapeHandle,
    /// Height of the label above the ground, fixed when the highlight is applied.
    pub label_height: f32,
    pub pulse: AnimationId,
}

#[derive(Debug, Clone)]
pub struct PlacedItem {
    id: ItemId,
    pub type_id: String,
    pub kind: ItemKind,
    /// Ground position. `y` is always 0.
    pub position: Vec3,
    pub radius: f32,
    /// Height the shape sits above `position` (gnomes perched on scenery).
    pub elevation: f32,
    pub original_scale: Vec3,
    pub shape: Shape,
    pub handle: ShapeHandle,
    pub highlight: Option<Highlight>,
    pub is_dragging: bool,
    pub vanishing: bool,
}

impl PlacedItem {
    pub fn new(
        type_id: impl Into<String>,
        kind: ItemKind,
        radius: f32,
        shape: Shape,
        handle: ShapeHandle,
    ) -> Self {
        let original_scale = shape.transform().scale;
        Self {
            id: ItemId::UNASSIGNED,
            type_id: type_id.into(),
            kind,
            position: Vec3::ZERO,
            radius,
            elevation: 0.0,
            original_scale,
            shape,
            handle,
            highlight: None,
            is_dragging: false,
            vanishing: false,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn is_selected(&self) -> bool {
        self.highlight.is_some()
    }

    pub fn is_collectible(&self) -> bool {
        self.kind == ItemKind::Collectible
    }

    /// Move the item on the ground plane; the shape follows, lifted by `elevation`.
    pub fn set_position(&mut self, point: Vec3) {
        self.position = Vec3::new(point.x, 0.0, point.z);
        self.shape
            .set_translation(self.position + Vec3::Y * self.elevation);
    }

    pub fn planar_distance_to(&self, point: Vec3) -> f32 {
        let dx = self.position.x - point.x;
        let dz = self.position.z - point.z;
        (dx * dx + dz * dz).sqrt()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    items: Vec<PlacedItem>,
    next_id: u64,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, mut item: PlacedItem) -> ItemId {
        self.next_id += 1;
        let id = ItemId(self.next_id);
        item.id = id;
        log::debug!(
            "Registry add {} ({}) at ({:.2}, {:.2})",
            id,
            item.type_id,
            item.position.x,
            item.position.z
        );
        self.items.push(item);
        id
    }

    pub fn remove(&mut self, id: ItemId) -> Option<PlacedItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        log::debug!("Registry remove {}", id);
        Some(self.items.remove(index))
    }

    pub fn all(&self) -> &[PlacedItem] {
        &self.items
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlacedItem> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ItemId) -> Option<&PlacedItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut PlacedItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &PlacedItem> {
        self.items.iter().filter(|item| item.is_selected())
    }

    /// Nearest item under the ray, composite parts included. Vanishing items
    /// are skipped.
    pub fn find_at<R: Renderer + ?Sized>(&self, ray: &Ray, renderer: &R) -> Option<ItemId> {
        let mut best: Option<(f32, ItemId)> = None;
        for item in self.items.iter().filter(|item| !item.vanishing) {
            let Some(hit) = renderer.intersect(item.handle, ray) else {
                continue;
            };
            if best.map_or(true, |(distance, _)| hit.distance < distance) {
                best = Some((hit.distance, item.id));
            }
        }
        best.map(|(_, id)| id)
    }
}
