//! The editor: one state machine that owns the garden session.
//!
//! Pointer and keyboard events arrive as [`EditorInput`]; animation, model
//! loads and lighting advance in [`Editor::tick`]. All registry and shape
//! mutation happens on the caller's thread through these two entry points
//! (plus the drag-and-drop calls in [`drag_drop`]).

pub mod animation;
pub mod drag_drop;
pub mod highlight;

use glam::Vec3;

use crate::assets::{AssetError, AssetResolver, DefinitionTable};
use crate::config::{CollectibleSpec, EditorConfig, ScenerySpec};
use crate::environment::{AudioCue, BulbAppearance, LightingQuery};
use crate::placement::{PlacementRejection, PlacementValidator};
use crate::render::{CameraController, PointerResolver, Renderer, ShapeHandle, Viewport};
use crate::scene::{ItemId, PlacedItem, Registry, Shape};
use crate::ui::{UiState, STATUS_PLACING};
use animation::{AnimationKind, Animator, WalkPath};
use drag_drop::DragDropBridge;

pub const PREVIEW_OPACITY: f32 = 0.6;
pub const VALID_TINT: u32 = 0x00ff00;
pub const INVALID_TINT: u32 = 0xff0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Escape,
    Delete,
    ToggleDayNight,
}

/// Viewport-space input, in pixels from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorInput {
    PointerMoved { x: f32, y: f32 },
    PointerPressed { x: f32, y: f32, button: PointerButton },
    PointerReleased { x: f32, y: f32, button: PointerButton },
    KeyPressed(EditorKey),
}

/// Translucent ghost of the item about to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub type_id: String,
    pub shape: Shape,
    pub handle: ShapeHandle,
    pub radius: f32,
    pub valid: bool,
}

impl Preview {
    pub fn spawn<R: Renderer + ?Sized>(
        assets: &AssetResolver,
        type_id: &str,
        renderer: &mut R,
    ) -> Result<Self, AssetError> {
        let asset = assets.resolve(type_id)?;
        let mut shape = asset.shape;
        shape.set_opacity(PREVIEW_OPACITY);
        let handle = renderer.add_shape(&shape);
        Ok(Self {
            type_id: type_id.to_string(),
            shape,
            handle,
            radius: asset.radius,
            valid: true,
        })
    }

    pub fn move_to<R: Renderer + ?Sized>(&mut self, point: Vec3, valid: bool, renderer: &mut R) {
        self.shape.set_translation(Vec3::new(point.x, 0.0, point.z));
        self.shape
            .tint(if valid { VALID_TINT } else { INVALID_TINT });
        self.valid = valid;
        renderer.update_shape(self.handle, &self.shape);
    }

    pub fn discard<R: Renderer + ?Sized>(self, renderer: &mut R) {
        renderer.remove_shape(self.handle);
    }
}

/// An item picked up by the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGrab {
    pub item: ItemId,
    /// Item position minus the ground point it was grabbed at.
    pub pointer_offset: Vec3,
    /// Position to fall back to when the drop spot is invalid.
    pub origin: Vec3,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
    #[default]
    Idle,
    Placing(Preview),
    Selected(ItemId),
    Dragging(DragGrab),
}

impl Mode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Mode::Idle)
    }

    pub fn is_placing(&self) -> bool {
        matches!(self, Mode::Placing(_))
    }

    /// Item currently selected or being dragged.
    pub fn focused_item(&self) -> Option<ItemId> {
        match self {
            Mode::Selected(id) => Some(*id),
            Mode::Dragging(grab) => Some(grab.item),
            _ => None,
        }
    }
}

pub struct Editor<R: Renderer> {
    assets: AssetResolver,
    validator: PlacementValidator,
    registry: Registry,
    pointer: PointerResolver,
    renderer: R,
    animator: Animator,
    ui: UiState,
    lighting: Box<dyn LightingQuery>,
    audio: Box<dyn AudioCue>,
    mode: Mode,
    drag_drop: DragDropBridge,
    scenery: Vec<(ShapeHandle, Shape)>,
    pending_collectibles: Vec<CollectibleSpec>,
}

impl<R: Renderer> Editor<R> {
    pub fn new(
        assets: AssetResolver,
        validator: PlacementValidator,
        pointer: PointerResolver,
        renderer: R,
        lighting: Box<dyn LightingQuery>,
        audio: Box<dyn AudioCue>,
    ) -> Self {
        let ui = UiState::new(assets.definitions());
        Self {
            assets,
            validator,
            registry: Registry::new(),
            pointer,
            renderer,
            animator: Animator::new(),
            ui,
            lighting,
            audio,
            mode: Mode::Idle,
            drag_drop: DragDropBridge::default(),
            scenery: Vec::new(),
            pending_collectibles: Vec::new(),
        }
    }

    /// Build a session from config: item table, plot rules, camera, scenery
    /// and collectibles. Model files start loading in the background before
    /// the collectibles are queued, so those wait for their real meshes.
    pub fn from_config(
        config: &EditorConfig,
        renderer: R,
        lighting: Box<dyn LightingQuery>,
        audio: Box<dyn AudioCue>,
    ) -> Result<Self, AssetError> {
        let definitions = match &config.definitions_path {
            Some(path) => DefinitionTable::from_json_file(&config.asset_path(path))?,
            None => DefinitionTable::builtin(),
        };
        log::info!("Using {} item definitions", definitions.len());

        let assets = AssetResolver::new(definitions, config.asset_root.clone())
            .with_strategy(config.deepest_mesh);
        let validator = PlacementValidator::new(config.plot, assets.definitions())
            .with_path_rules(config.path_margin, config.path_min_spacing);
        let camera = CameraController::look_at(config.camera.eye.into(), config.camera.target.into())
            .with_projection(config.camera.fov_y_deg, config.camera.near, config.camera.far);
        let viewport = Viewport::new(config.viewport[0] as f32, config.viewport[1] as f32);
        let pointer = PointerResolver::new(camera, viewport);

        let mut editor = Self::new(assets, validator, pointer, renderer, lighting, audio);
        editor.preload_models();
        editor.add_scenery(&config.scenery);
        editor.seed_collectibles(&config.collectibles);
        Ok(editor)
    }

    pub fn preload_models(&mut self) {
        self.assets.preload_models();
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetResolver {
        &mut self.assets
    }

    pub fn validator(&self) -> &PlacementValidator {
        &self.validator
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn pointer(&self) -> &PointerResolver {
        &self.pointer
    }

    pub fn pointer_mut(&mut self) -> &mut PointerResolver {
        &mut self.pointer
    }

    pub fn lighting(&self) -> &dyn LightingQuery {
        self.lighting.as_ref()
    }

    pub fn scenery(&self) -> &[(ShapeHandle, Shape)] {
        &self.scenery
    }

    pub fn drag_drop(&self) -> &DragDropBridge {
        &self.drag_drop
    }

    pub fn handle_input(&mut self, input: EditorInput) {
        match input {
            EditorInput::PointerMoved { x, y } => self.pointer_moved(x, y),
            EditorInput::PointerPressed {
                x,
                y,
                button: PointerButton::Primary,
            } => self.primary_pressed(x, y),
            EditorInput::PointerPressed {
                button: PointerButton::Secondary,
                ..
            } => {
                if self.mode.is_placing() {
                    self.cancel_placement();
                }
            }
            EditorInput::PointerReleased {
                button: PointerButton::Primary,
                ..
            } => self.end_drag(),
            EditorInput::PointerReleased { .. } => {}
            EditorInput::KeyPressed(EditorKey::Escape) => self.escape(),
            EditorInput::KeyPressed(EditorKey::Delete) => {
                self.delete_selected();
            }
            EditorInput::KeyPressed(EditorKey::ToggleDayNight) => {
                self.lighting.toggle();
                self.refresh_lightpoles();
            }
        }
    }

    /// Enter placement mode for `type_id`. Returns false for unknown types.
    pub fn choose_item_type(&mut self, type_id: &str) -> bool {
        self.deselect();
        self.cancel_placement();
        self.drag_end();
        self.audio.play_click();

        match Preview::spawn(&self.assets, type_id, &mut self.renderer) {
            Ok(preview) => {
                self.renderer.set_grid_visible(true);
                self.ui.set_status(STATUS_PLACING);
                log::debug!("Placing {}", type_id);
                self.mode = Mode::Placing(preview);
                true
            }
            Err(err) => {
                log::warn!("Cannot place {}: {}", type_id, err);
                self.mode = Mode::Idle;
                self.ui.reset_status();
                false
            }
        }
    }

    /// Leave placement mode, dropping the preview. No-op in other modes.
    pub fn cancel_placement(&mut self) {
        if !self.mode.is_placing() {
            return;
        }
        if let Mode::Placing(preview) = std::mem::take(&mut self.mode) {
            log::debug!("Placement of {} cancelled", preview.type_id);
            preview.discard(&mut self.renderer);
        }
        self.renderer.set_grid_visible(false);
        self.ui.reset_status();
    }

    /// Clear every highlight. Safe to call repeatedly. A drag in progress is
    /// settled first, so the item keeps its new spot only if that spot is valid.
    pub fn deselect(&mut self) {
        self.end_drag();
        let selected: Vec<ItemId> = self.registry.selected().map(|item| item.id()).collect();
        for id in selected {
            if let Some(item) = self.registry.get_mut(id) {
                highlight::remove(item, &mut self.renderer, &mut self.animator);
                item.is_dragging = false;
            }
        }
        if self.mode.focused_item().is_some() {
            self.mode = Mode::Idle;
        }
    }

    /// Remove the selected (or dragged) item from the garden.
    pub fn delete_selected(&mut self) -> Option<ItemId> {
        let id = self.mode.focused_item()?;
        // The item is going away, so there is no drag to settle.
        self.mode = Mode::Selected(id);
        self.deselect();
        let item = self.registry.remove(id)?;
        self.animator.cancel_item(id);
        self.renderer.remove_shape(item.handle);
        log::info!("Deleted {} ({})", id, item.type_id);
        Some(id)
    }

    /// Validate and commit `type_id` at a ground point.
    pub fn place_at(&mut self, type_id: &str, point: Vec3) -> Result<ItemId, PlacementRejection> {
        let asset = self
            .assets
            .resolve(type_id)
            .map_err(|_| PlacementRejection::UnknownItemType(type_id.to_string()))?;
        let point = Vec3::new(point.x, 0.0, point.z);
        self.validator
            .check(point, asset.radius, type_id, &self.registry, None)?;

        let mut shape = asset.shape;
        shape.set_translation(point);
        let handle = self.renderer.add_shape(&shape);
        let mut item = PlacedItem::new(type_id, asset.kind, asset.radius, shape, handle);
        item.set_position(point);
        let id = self.registry.add(item);
        self.animator.start(id, AnimationKind::Spawn);
        self.audio.play_click();
        log::info!(
            "Placed {} {} at ({:.2}, {:.2})",
            type_id,
            id,
            point.x,
            point.z
        );
        Ok(id)
    }

    /// Queue collectibles. Each one is placed as soon as its model file is no
    /// longer loading, so it picks up the real mesh when one is available.
    pub fn seed_collectibles(&mut self, specs: &[CollectibleSpec]) {
        let (_, total) = self.ui.collectibles();
        self.ui
            .set_collectible_total(total + specs.len() as u32);
        self.pending_collectibles.extend_from_slice(specs);
        self.flush_pending_collectibles();
    }

    /// Add decorative shapes that are drawn but never picked or validated.
    pub fn add_scenery(&mut self, specs: &[ScenerySpec]) {
        for spec in specs {
            let mut shape = match self.assets.resolve(&spec.type_id) {
                Ok(asset) => asset.shape,
                Err(err) => {
                    log::warn!("Skipping scenery: {}", err);
                    continue;
                }
            };
            shape.set_translation(spec.position.into());
            shape.set_rotation_y(spec.rotation_y);
            BulbAppearance::for_mode(self.lighting.mode()).apply(&mut shape);
            let handle = self.renderer.add_shape(&shape);
            self.scenery.push((handle, shape));
        }
        log::debug!("Scenery holds {} shapes", self.scenery.len());
    }

    /// Advance one frame: finish model loads, step animations, apply their
    /// completions and keep lightpoles in step with the lighting mode.
    pub fn tick(&mut self, dt: f32) {
        let loaded = self.assets.cache_mut().poll();
        if loaded > 0 || !self.pending_collectibles.is_empty() {
            self.flush_pending_collectibles();
        }

        let report = self.animator.step(dt, &mut self.registry);
        for id in &report.touched {
            if let Some(item) = self.registry.get(*id) {
                self.renderer.update_shape(item.handle, &item.shape);
            }
        }
        for finished in report.finished {
            if finished.kind == AnimationKind::Vanish {
                self.finish_collect(finished.item);
            }
        }

        self.refresh_lightpoles();
    }

    fn flush_pending_collectibles(&mut self) {
        if self.pending_collectibles.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.pending_collectibles);
        for spec in pending {
            let loading = self
                .assets
                .definition(&spec.type_id)
                .and_then(|definition| definition.model_path.as_deref())
                .map_or(false, |path| self.assets.cache().is_pending(path));
            if loading {
                self.pending_collectibles.push(spec);
            } else {
                self.spawn_collectible(&spec);
            }
        }
    }

    fn spawn_collectible(&mut self, spec: &CollectibleSpec) {
        let asset = match self.assets.resolve(&spec.type_id) {
            Ok(asset) => asset,
            Err(err) => {
                log::warn!("Skipping collectible: {}", err);
                return;
            }
        };
        let [x, elevation, z] = spec.position;
        let mut shape = asset.shape;
        shape.set_translation(Vec3::new(x, elevation, z));
        shape.set_rotation_y(spec.rotation_y);
        let handle = self.renderer.add_shape(&shape);

        let mut item = PlacedItem::new(&spec.type_id, asset.kind, asset.radius, shape, handle);
        item.elevation = elevation;
        item.set_position(Vec3::new(x, 0.0, z));
        let id = self.registry.add(item);

        if let Some(walk) = spec.walk {
            self.animator.start(
                id,
                AnimationKind::Walk(WalkPath {
                    origin: Vec3::new(x, 0.0, z),
                    heading: spec.rotation_y,
                    distance: walk.distance,
                    path_rotation: walk.path_rotation,
                    speed: walk.speed,
                }),
            );
        }
        log::debug!("Collectible {} ({}) at ({:.2}, {:.2})", id, spec.type_id, x, z);
    }

    fn refresh_lightpoles(&mut self) {
        let appearance = BulbAppearance::for_mode(self.lighting.mode());
        for item in self.registry.iter_mut() {
            if appearance.apply(&mut item.shape) {
                self.renderer.update_shape(item.handle, &item.shape);
            }
        }
        for (handle, shape) in &mut self.scenery {
            if appearance.apply(shape) {
                self.renderer.update_shape(*handle, shape);
            }
        }
    }

    fn pointer_moved(&mut self, x: f32, y: f32) {
        match &mut self.mode {
            Mode::Placing(preview) => {
                let Some(point) = self.pointer.project(x, y) else {
                    return;
                };
                let valid = self
                    .validator
                    .check(point, preview.radius, &preview.type_id, &self.registry, None)
                    .is_ok();
                preview.move_to(point, valid, &mut self.renderer);
            }
            Mode::Dragging(grab) => {
                let Some(point) = self.pointer.project(x, y) else {
                    return;
                };
                let Some(item) = self.registry.get_mut(grab.item) else {
                    return;
                };
                item.set_position(point + grab.pointer_offset);
                self.renderer.update_shape(item.handle, &item.shape);
                highlight::follow(item, &mut self.renderer);
            }
            Mode::Idle | Mode::Selected(_) => {}
        }
    }

    fn primary_pressed(&mut self, x: f32, y: f32) {
        if self.mode.is_placing() {
            self.place_from_preview(x, y);
            return;
        }

        let ray = self.pointer.ray(x, y);
        let Some(id) = self.registry.find_at(&ray, &self.renderer) else {
            self.deselect();
            return;
        };
        let Some(item) = self.registry.get(id) else {
            return;
        };
        if item.is_collectible() {
            self.collect(id);
            return;
        }
        if item.is_selected() {
            self.deselect();
            return;
        }

        self.deselect();
        let ground = self.pointer.project(x, y);
        let Some(item) = self.registry.get_mut(id) else {
            return;
        };
        highlight::apply(item, &mut self.renderer, &mut self.animator);
        item.is_dragging = true;
        let origin = item.position;
        let pointer_offset = ground.map_or(Vec3::ZERO, |point| origin - point);
        self.audio.play_click();
        log::debug!("Selected {} ({})", id, item.type_id);
        self.mode = Mode::Dragging(DragGrab {
            item: id,
            pointer_offset: Vec3::new(pointer_offset.x, 0.0, pointer_offset.z),
            origin,
        });
    }

    fn place_from_preview(&mut self, x: f32, y: f32) {
        let Some(point) = self.pointer.project(x, y) else {
            log::debug!("Click did not reach the ground");
            return;
        };
        let Mode::Placing(preview) = &self.mode else {
            return;
        };
        let type_id = preview.type_id.clone();
        match self.place_at(&type_id, point) {
            Ok(_) => {
                if let Mode::Placing(preview) = std::mem::take(&mut self.mode) {
                    preview.discard(&mut self.renderer);
                }
                self.renderer.set_grid_visible(false);
                self.ui.reset_status();
            }
            Err(rejection) => log::info!("Placement rejected: {}", rejection),
        }
    }

    /// Release after a move: keep the new spot if it is valid, otherwise go
    /// back to where the drag started.
    fn end_drag(&mut self) {
        let Mode::Dragging(grab) = self.mode else {
            return;
        };
        self.mode = Mode::Selected(grab.item);
        let Some(item) = self.registry.get(grab.item) else {
            self.mode = Mode::Idle;
            return;
        };
        let verdict = self.validator.check(
            item.position,
            item.radius,
            &item.type_id,
            &self.registry,
            Some(grab.item),
        );
        let Some(item) = self.registry.get_mut(grab.item) else {
            return;
        };
        item.is_dragging = false;
        match verdict {
            Ok(()) => log::info!(
                "Moved {} to ({:.2}, {:.2})",
                grab.item,
                item.position.x,
                item.position.z
            ),
            Err(rejection) => {
                log::info!("Move rejected ({}); reverting", rejection);
                item.set_position(grab.origin);
                self.renderer.update_shape(item.handle, &item.shape);
                highlight::follow(item, &mut self.renderer);
            }
        }
    }

    fn escape(&mut self) {
        match self.mode {
            Mode::Placing(_) => self.cancel_placement(),
            Mode::Dragging(grab) => {
                if let Some(item) = self.registry.get_mut(grab.item) {
                    item.set_position(grab.origin);
                    item.is_dragging = false;
                    self.renderer.update_shape(item.handle, &item.shape);
                }
                self.mode = Mode::Selected(grab.item);
                self.deselect();
            }
            Mode::Selected(_) => self.deselect(),
            Mode::Idle => {}
        }
    }

    fn collect(&mut self, id: ItemId) {
        let Some(item) = self.registry.get_mut(id) else {
            return;
        };
        if item.vanishing {
            return;
        }
        item.vanishing = true;
        self.animator.cancel_item_where(id, AnimationKind::is_walk);
        self.animator.start(id, AnimationKind::Vanish);
        self.audio.play_click();
        log::debug!("Collecting {} ({})", id, item.type_id);
    }

    fn finish_collect(&mut self, id: ItemId) {
        let Some(item) = self.registry.remove(id) else {
            return;
        };
        self.animator.cancel_item(id);
        self.renderer.remove_shape(item.handle);
        self.ui.collectible_found();
        let (found, total) = self.ui.collectibles();
        log::info!("Found {} ({}/{})", item.type_id, found, total);
    }
}

#[cfg(test)]
mod tests_support {
    use std::cell::Cell;
    use std::rc::Rc;

    use glam::Vec3;

    use super::Editor;
    use crate::assets::{AssetResolver, DefinitionTable};
    use crate::environment::{AudioCue, DayNightCycle};
    use crate::placement::{PlacementValidator, PlotBounds};
    use crate::render::{CameraController, PointerResolver, SceneMirror, Viewport};

    pub const VIEW: f32 = 800.0;
    /// Half the ground span visible from the test camera.
    pub const HALF_SPAN: f32 = 20.0;

    #[derive(Clone, Default)]
    pub struct CountingAudio(pub Rc<Cell<u32>>);

    impl AudioCue for CountingAudio {
        fn play_click(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    /// Editor over a headless mirror, viewed from straight above.
    pub fn editor_with_audio() -> (Editor<SceneMirror>, CountingAudio) {
        let definitions = DefinitionTable::builtin();
        let validator = PlacementValidator::new(PlotBounds::default(), &definitions);
        let assets = AssetResolver::new(definitions, "assets");
        let height = HALF_SPAN / 30f32.to_radians().tan();
        let camera = CameraController::look_at(Vec3::new(0.0, height, 0.0), Vec3::ZERO);
        let pointer = PointerResolver::new(camera, Viewport::new(VIEW, VIEW));
        let audio = CountingAudio::default();
        let editor = Editor::new(
            assets,
            validator,
            pointer,
            SceneMirror::new(),
            Box::new(DayNightCycle::default()),
            Box::new(audio.clone()),
        );
        (editor, audio)
    }

    pub fn editor() -> Editor<SceneMirror> {
        editor_with_audio().0
    }

    /// Pixel above a ground point. Screen right is +z, screen up is +x.
    pub fn pixel(x: f32, z: f32) -> (f32, f32) {
        let ndc_x = z / HALF_SPAN;
        let ndc_y = x / HALF_SPAN;
        ((ndc_x + 1.0) * 0.5 * VIEW, (1.0 - ndc_y) * 0.5 * VIEW)
    }
}
