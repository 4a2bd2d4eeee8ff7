//! Selection decoration: emissive tint, ground ring, floating label and pulse.

use super::animation::{AnimationKind, Animator};
use crate::render::Renderer;
use crate::scene::{rgb, Geometry, Highlight, Material, Mesh, PlacedItem, Shape};

pub const HIGHLIGHT_EMISSIVE: u32 = 0x0066ff;
pub const PRIMITIVE_EMISSIVE_INTENSITY: f32 = 0.6;
pub const COMPOSITE_EMISSIVE_INTENSITY: f32 = 0.4;

pub const RING_COLOR: u32 = 0x00ff88;
pub const RING_OPACITY: f32 = 0.8;
pub const RING_HEIGHT: f32 = 0.01;
const RING_INNER_GAP: f32 = 0.2;
const RING_OUTER_GAP: f32 = 0.4;
const RING_SEGMENTS: u32 = 32;

pub const LABEL_TEXT: &str = "DRAG TO MOVE";
const LABEL_SIZE: (f32, f32) = (2.0, 0.5);
const LABEL_CLEARANCE: f32 = 0.5;
const LABEL_DEFAULT_HEIGHT: f32 = 2.0;

pub fn selection_ring(item: &PlacedItem) -> Shape {
    Shape::Primitive(
        Mesh::new(
            "selection_ring",
            Geometry::Ring {
                inner_radius: item.radius + RING_INNER_GAP,
                outer_radius: item.radius + RING_OUTER_GAP,
                segments: RING_SEGMENTS,
            },
            Material::unlit(RING_COLOR, RING_OPACITY),
        )
        .at(item.position.x, RING_HEIGHT, item.position.z)
        .without_cast_shadow(),
    )
}

/// Height the label floats at: just above a composite's top, or at the top of
/// a single mesh.
pub fn label_height(item: &PlacedItem) -> f32 {
    let top = item.shape.world_bounds().max.y;
    match &item.shape {
        Shape::Composite(_) => top + LABEL_CLEARANCE,
        Shape::Primitive(_) if top > 0.0 => top,
        Shape::Primitive(_) => LABEL_DEFAULT_HEIGHT,
    }
}

pub fn selection_label(item: &PlacedItem, height: f32) -> Shape {
    Shape::Primitive(
        Mesh::new(
            "selection_label",
            Geometry::Label {
                text: LABEL_TEXT.to_string(),
                width: LABEL_SIZE.0,
                height: LABEL_SIZE.1,
            },
            Material::unlit(RING_COLOR, 1.0),
        )
        .at(item.position.x, height, item.position.z)
        .without_cast_shadow(),
    )
}

fn tint_emissive(shape: &mut Shape) {
    let intensity = if shape.is_composite() {
        COMPOSITE_EMISSIVE_INTENSITY
    } else {
        PRIMITIVE_EMISSIVE_INTENSITY
    };
    let emissive = rgb(HIGHLIGHT_EMISSIVE);
    for mesh in shape.meshes_mut() {
        mesh.material.emissive = emissive;
        mesh.material.emissive_intensity = intensity;
    }
}

/// Decorate `item` as selected. No-op when it already is.
pub fn apply<R: Renderer + ?Sized>(item: &mut PlacedItem, renderer: &mut R, animator: &mut Animator) {
    if item.highlight.is_some() {
        return;
    }
    let original_materials = item.shape.materials();
    tint_emissive(&mut item.shape);
    renderer.update_shape(item.handle, &item.shape);

    let height = label_height(item);
    let ring = renderer.add_shape(&selection_ring(item));
    let label = renderer.add_shape(&selection_label(item, height));
    let pulse = animator.start(item.id(), AnimationKind::Pulse);

    item.highlight = Some(Highlight {
        original_materials,
        ring,
        label,
        label_height: height,
        pulse,
    });
    log::debug!("Highlighted {} ({})", item.id(), item.type_id);
}

/// Undo [`apply`]: restore materials and scale, drop ring and label, stop the
/// pulse. No-op when the item is not selected.
pub fn remove<R: Renderer + ?Sized>(item: &mut PlacedItem, renderer: &mut R, animator: &mut Animator) {
    let Some(highlight) = item.highlight.take() else {
        return;
    };
    animator.cancel(highlight.pulse);
    item.shape.restore_materials(&highlight.original_materials);
    item.shape.set_scale(item.original_scale);
    renderer.update_shape(item.handle, &item.shape);
    renderer.remove_shape(highlight.ring);
    renderer.remove_shape(highlight.label);
    log::debug!("Highlight removed from {} ({})", item.id(), item.type_id);
}

/// Move ring and label to follow the item.
pub fn follow<R: Renderer + ?Sized>(item: &PlacedItem, renderer: &mut R) {
    let Some(highlight) = &item.highlight else {
        return;
    };
    renderer.update_shape(highlight.ring, &selection_ring(item));
    renderer.update_shape(highlight.label, &selection_label(item, highlight.label_height));
}
