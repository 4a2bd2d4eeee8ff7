//! Explicit animation task list stepped with an injected frame delta.
//!
//! Every running effect (spawn bounce, selection pulse, collectible vanish,
//! gnome walk) is a task bound to one item. [`Animator::step`] advances them,
//! writes the resulting pose into the item's shape and prunes finished tasks.
//! The caller mirrors touched shapes to the renderer and handles completions.

use std::f32::consts::PI;

use glam::{Quat, Vec3};

use crate::scene::{ItemId, PlacedItem, Registry};

pub const SPAWN_SECONDS: f32 = 0.5;
pub const SPAWN_START_SCALE: f32 = 0.6;
const SPAWN_RISE_SECONDS: f32 = 0.3;
const SPAWN_SETTLE_SECONDS: f32 = 0.2;
const SPAWN_START_DROP: f32 = -0.5;
const SPAWN_OVERSHOOT: f32 = 0.3;

pub const PULSE_SECONDS: f32 = 0.8;
pub const PULSE_SCALE: f32 = 1.1;

/// Scale kept per 1/60 s while vanishing.
pub const VANISH_KEEP_PER_FRAME: f32 = 0.9;
pub const VANISH_DONE_LENGTH: f32 = 0.01;

const REFERENCE_FPS: f32 = 60.0;
const WALK_BOB_HEIGHT: f32 = 0.1;
const WALK_BOB_CYCLES: f32 = 8.0;

pub fn back_out(k: f32) -> f32 {
    let s = 1.70158;
    let k = k - 1.0;
    k * k * ((s + 1.0) * k + s) + 1.0
}

pub fn bounce_out(k: f32) -> f32 {
    if k < 1.0 / 2.75 {
        7.5625 * k * k
    } else if k < 2.0 / 2.75 {
        let k = k - 1.5 / 2.75;
        7.5625 * k * k + 0.75
    } else if k < 2.5 / 2.75 {
        let k = k - 2.25 / 2.75;
        7.5625 * k * k + 0.9375
    } else {
        let k = k - 2.625 / 2.75;
        7.5625 * k * k + 0.984375
    }
}

pub fn quad_out(k: f32) -> f32 {
    k * (2.0 - k)
}

pub fn quad_in_out(k: f32) -> f32 {
    let k = k * 2.0;
    if k < 1.0 {
        0.5 * k * k
    } else {
        let k = k - 1.0;
        -0.5 * (k * (k - 2.0) - 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(u64);

/// Back-and-forth walk along a straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WalkPath {
    pub origin: Vec3,
    /// Facing while walking away from the origin.
    pub heading: f32,
    pub distance: f32,
    /// Direction of the line, as a rotation about +Y from +X.
    pub path_rotation: f32,
    /// Fraction of `distance` covered per 1/60 s.
    pub speed: f32,
}

impl WalkPath {
    fn point_at(&self, offset: f32) -> Vec3 {
        self.origin
            + Vec3::new(
                offset * self.path_rotation.cos(),
                0.0,
                offset * self.path_rotation.sin(),
            )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationKind {
    Spawn,
    Pulse,
    Vanish,
    Walk(WalkPath),
}

impl AnimationKind {
    pub fn is_walk(&self) -> bool {
        matches!(self, AnimationKind::Walk(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTask {
    pub id: AnimationId,
    pub item: ItemId,
    pub kind: AnimationKind,
    pub elapsed: f32,
    walk_offset: f32,
    walk_direction: f32,
}

impl AnimationTask {
    /// Advance by `dt` and pose the item. Returns true once finished.
    fn advance(&mut self, dt: f32, item: &mut PlacedItem) -> bool {
        self.elapsed += dt;
        match self.kind {
            AnimationKind::Spawn => {
                let t = self.elapsed.min(SPAWN_SECONDS);
                let grow = back_out(t / SPAWN_SECONDS);
                let factor = SPAWN_START_SCALE + (1.0 - SPAWN_START_SCALE) * grow;
                item.shape.set_scale(item.original_scale * factor);
                let lift = spawn_lift(self.elapsed);
                item.shape.set_translation(
                    item.position + Vec3::Y * (item.elevation + lift),
                );
                self.elapsed >= SPAWN_SECONDS
            }
            AnimationKind::Pulse => {
                let phase = (self.elapsed % (PULSE_SECONDS * 2.0)) / PULSE_SECONDS;
                let leg = if phase <= 1.0 { phase } else { 2.0 - phase };
                let factor = 1.0 + (PULSE_SCALE - 1.0) * quad_in_out(leg);
                item.shape.set_scale(item.original_scale * factor);
                false
            }
            AnimationKind::Vanish => {
                let keep = VANISH_KEEP_PER_FRAME.powf(dt * REFERENCE_FPS);
                let scale = item.shape.transform().scale * keep;
                item.shape.set_scale(scale);
                scale.length() <= VANISH_DONE_LENGTH
            }
            AnimationKind::Walk(path) => {
                self.walk_offset +=
                    path.speed * path.distance * self.walk_direction * dt * REFERENCE_FPS;
                if self.walk_offset >= path.distance {
                    self.walk_offset = path.distance;
                    self.walk_direction = -1.0;
                } else if self.walk_offset <= 0.0 {
                    self.walk_offset = 0.0;
                    self.walk_direction = 1.0;
                }
                item.set_position(path.point_at(self.walk_offset));
                let progress = self.walk_offset / path.distance.max(f32::EPSILON);
                let bob = (progress * PI * WALK_BOB_CYCLES).sin().abs() * WALK_BOB_HEIGHT;
                item.shape.transform_mut().translation.y += bob;
                let facing = if self.walk_direction > 0.0 {
                    path.heading
                } else {
                    path.heading + PI
                };
                item.shape.transform_mut().rotation = Quat::from_rotation_y(facing);
                false
            }
        }
    }
}

/// Vertical offset of the spawn bounce: rise from below with a bounce, then
/// settle back to the ground.
fn spawn_lift(elapsed: f32) -> f32 {
    if elapsed < SPAWN_RISE_SECONDS {
        let k = elapsed / SPAWN_RISE_SECONDS;
        SPAWN_START_DROP + (SPAWN_OVERSHOOT - SPAWN_START_DROP) * bounce_out(k)
    } else if elapsed < SPAWN_RISE_SECONDS + SPAWN_SETTLE_SECONDS {
        let k = (elapsed - SPAWN_RISE_SECONDS) / SPAWN_SETTLE_SECONDS;
        SPAWN_OVERSHOOT * (1.0 - quad_out(k))
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Finished {
    pub id: AnimationId,
    pub item: ItemId,
    pub kind: AnimationKind,
}

#[derive(Debug, Default)]
pub struct StepReport {
    /// Items whose shape changed this step, without duplicates.
    pub touched: Vec<ItemId>,
    pub finished: Vec<Finished>,
}

#[derive(Debug, Default)]
pub struct Animator {
    tasks: Vec<AnimationTask>,
    next_id: u64,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, item: ItemId, kind: AnimationKind) -> AnimationId {
        self.next_id += 1;
        let id = AnimationId(self.next_id);
        self.tasks.push(AnimationTask {
            id,
            item,
            kind,
            elapsed: 0.0,
            walk_offset: 0.0,
            walk_direction: 1.0,
        });
        log::trace!("animation {:?} {:?} on {}", id, kind, item);
        id
    }

    pub fn cancel(&mut self, id: AnimationId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        self.tasks.len() != before
    }

    /// Drop every task bound to `item`.
    pub fn cancel_item(&mut self, item: ItemId) {
        self.tasks.retain(|task| task.item != item);
    }

    /// Drop the tasks bound to `item` that match `predicate`.
    pub fn cancel_item_where(&mut self, item: ItemId, predicate: impl Fn(&AnimationKind) -> bool) {
        self.tasks
            .retain(|task| task.item != item || !predicate(&task.kind));
    }

    pub fn is_running(&self, id: AnimationId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    pub fn tasks(&self) -> &[AnimationTask] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn step(&mut self, dt: f32, registry: &mut Registry) -> StepReport {
        let mut report = StepReport::default();
        let dt = dt.max(0.0);
        self.tasks.retain_mut(|task| {
            let Some(item) = registry.get_mut(task.item) else {
                return false;
            };
            let done = task.advance(dt, item);
            if !report.touched.contains(&task.item) {
                report.touched.push(task.item);
            }
            if done {
                report.finished.push(Finished {
                    id: task.id,
                    item: task.item,
                    kind: task.kind,
                });
            }
            !done
        });
        report
    }
}
