//! Palette drag-and-drop: an item type dragged from the panel and dropped
//! onto the garden. It shares the validator and the commit path with click
//! placement, and the two are mutually exclusive.

use glam::Vec2;

use super::{Editor, Preview};
use crate::render::Renderer;
use crate::scene::ItemId;

#[derive(Debug, Clone)]
pub struct DragSession {
    pub item_type: String,
    pub start_pointer: Vec2,
    pub current_pointer: Vec2,
    pub preview: Preview,
    /// Validity at the last position over the ground.
    pub last_valid: bool,
}

#[derive(Debug, Default)]
pub struct DragDropBridge {
    session: Option<DragSession>,
}

impl DragDropBridge {
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    fn begin(&mut self, session: DragSession) {
        self.session = Some(session);
    }

    fn take(&mut self) -> Option<DragSession> {
        self.session.take()
    }
}

impl<R: Renderer> Editor<R> {
    /// Start dragging `type_id` from the palette. Ends any click placement or
    /// earlier drag first. Returns false for unknown types.
    pub fn drag_start(&mut self, type_id: &str, x: f32, y: f32) -> bool {
        self.drag_end();
        self.cancel_placement();
        self.deselect();

        match Preview::spawn(&self.assets, type_id, &mut self.renderer) {
            Ok(preview) => {
                let pointer = Vec2::new(x, y);
                self.drag_drop.begin(DragSession {
                    item_type: type_id.to_string(),
                    start_pointer: pointer,
                    current_pointer: pointer,
                    preview,
                    last_valid: true,
                });
                self.renderer.set_grid_visible(true);
                self.ui.set_status(crate::ui::STATUS_PLACING);
                log::debug!("Drag started for {}", type_id);
                true
            }
            Err(err) => {
                log::warn!("Cannot drag {}: {}", type_id, err);
                false
            }
        }
    }

    /// Pointer moved over the viewport during a drag. Returns true when a drop
    /// here would be accepted by the host.
    pub fn drag_over(&mut self, x: f32, y: f32) -> bool {
        let Some(session) = self.drag_drop.session.as_mut() else {
            return false;
        };
        session.current_pointer = Vec2::new(x, y);
        if let Some(point) = self.pointer.project(x, y) {
            let valid = self
                .validator
                .check(
                    point,
                    session.preview.radius,
                    &session.item_type,
                    &self.registry,
                    None,
                )
                .is_ok();
            session.preview.move_to(point, valid, &mut self.renderer);
            session.last_valid = valid;
        }
        true
    }

    /// Drop at the pointer. Invalid spots are rejected and nothing is placed.
    pub fn drop(&mut self, x: f32, y: f32) -> Option<ItemId> {
        let session = self.drag_drop.take()?;
        self.finish_session(session.preview);

        let Some(point) = self.pointer.project(x, y) else {
            log::warn!("Drop of {} missed the ground", session.item_type);
            return None;
        };
        match self.place_at(&session.item_type, point) {
            Ok(id) => Some(id),
            Err(rejection) => {
                log::warn!("Drop rejected: {}", rejection);
                None
            }
        }
    }

    /// Abandon the drag without placing anything. No-op without a session.
    pub fn drag_end(&mut self) {
        if let Some(session) = self.drag_drop.take() {
            log::debug!("Drag of {} ended", session.item_type);
            self.finish_session(session.preview);
        }
    }

    fn finish_session(&mut self, preview: Preview) {
        preview.discard(&mut self.renderer);
        self.renderer.set_grid_visible(false);
        self.ui.reset_status();
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::super::tests_support::{editor, pixel};
    use super::super::{EditorInput, Mode, PointerButton, INVALID_TINT};
    use crate::scene::rgb;

    #[test]
    fn drop_on_valid_spot_places_item() {
        let mut editor = editor();
        assert!(editor.drag_start("fountain", 0.0, 0.0));
        assert!(editor.drag_drop().is_active());
        assert!(editor.renderer().grid_visible());

        let (px, py) = pixel(3.0, 3.0);
        assert!(editor.drag_over(px, py));
        assert!(editor.drag_drop().session().expect("session").last_valid);

        let id = editor.drop(px, py).expect("placed");
        assert!(!editor.drag_drop().is_active());
        assert!(!editor.renderer().grid_visible());
        let item = editor.registry().get(id).expect("fountain");
        assert!((item.position - Vec3::new(3.0, 0.0, 3.0)).length() < 1e-3);
        assert_eq!(editor.renderer().len(), 1);
    }

    #[test]
    fn drop_on_occupied_spot_is_rejected() {
        let mut editor = editor();
        editor.place_at("fountain", Vec3::ZERO).expect("fountain");
        editor.drag_start("bench", 0.0, 0.0);
        let (px, py) = pixel(1.0, 1.0);
        editor.drag_over(px, py);
        let session = editor.drag_drop().session().expect("session");
        assert!(!session.last_valid);
        assert_eq!(
            session.preview.shape.meshes()[0].material.color,
            rgb(INVALID_TINT)
        );

        assert!(editor.drop(px, py).is_none());
        assert_eq!(editor.registry().len(), 1);
        assert_eq!(editor.renderer().len(), 1);
    }

    #[test]
    fn drag_and_click_placement_exclude_each_other() {
        let mut editor = editor();
        editor.choose_item_type("tree");
        editor.drag_start("bench", 0.0, 0.0);
        assert!(!editor.mode().is_placing());
        assert_eq!(editor.renderer().len(), 1);

        editor.choose_item_type("tree");
        assert!(editor.mode().is_placing());
        assert!(!editor.drag_drop().is_active());
        assert_eq!(editor.renderer().len(), 1);
    }

    #[test]
    fn drag_start_mid_move_reverts_overlapping_item() {
        let mut editor = editor();
        let moved = editor.place_at("bench", Vec3::ZERO).expect("moved");
        editor
            .place_at("bench", Vec3::new(8.0, 0.0, 0.0))
            .expect("other");
        for _ in 0..60 {
            editor.tick(1.0 / 60.0);
        }

        let (px, py) = pixel(0.0, 0.0);
        editor.handle_input(EditorInput::PointerPressed {
            x: px,
            y: py,
            button: PointerButton::Primary,
        });
        let (px, py) = pixel(7.5, 0.0);
        editor.handle_input(EditorInput::PointerMoved { x: px, y: py });
        assert!(matches!(editor.mode(), Mode::Dragging(_)));

        assert!(editor.drag_start("tree", px, py));
        assert_eq!(*editor.mode(), Mode::Idle);
        let item = editor.registry().get(moved).expect("bench");
        assert!(item.position.length() < 1e-3);
        assert!(!item.is_selected());
    }

    #[test]
    fn drag_end_and_unknown_types_leave_nothing_behind() {
        let mut editor = editor();
        assert!(!editor.drag_start("unicorn", 0.0, 0.0));
        assert!(!editor.drag_over(10.0, 10.0));
        assert!(editor.drop(10.0, 10.0).is_none());

        editor.drag_start("bench", 0.0, 0.0);
        editor.drag_end();
        editor.drag_end();
        assert!(editor.renderer().is_empty());
        assert!(editor.registry().is_empty());
    }
}
