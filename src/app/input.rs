use winit::event::MouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::interaction::{EditorKey, PointerButton};
use crate::render::CameraOrbit;

/// One-shot action produced by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Editor(EditorKey),
    /// Zero-based palette slot.
    ChoosePalette(usize),
}

/// Held keys steering the camera.
#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    pub orbit: CameraOrbit,
}

impl InputState {
    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> InputAction {
        let PhysicalKey::Code(code) = key else {
            return InputAction::None;
        };
        match code {
            KeyCode::ArrowLeft => self.orbit.aim_left = pressed,
            KeyCode::ArrowRight => self.orbit.aim_right = pressed,
            KeyCode::ArrowUp => self.orbit.aim_up = pressed,
            KeyCode::ArrowDown => self.orbit.aim_down = pressed,
            KeyCode::Equal | KeyCode::NumpadAdd => self.orbit.zoom_in = pressed,
            KeyCode::Minus | KeyCode::NumpadSubtract => self.orbit.zoom_out = pressed,
            _ if pressed => return press_action(code),
            _ => {}
        }
        InputAction::None
    }

    pub fn release_all(&mut self) {
        self.orbit = CameraOrbit::default();
    }
}

fn press_action(code: KeyCode) -> InputAction {
    match code {
        KeyCode::Escape => InputAction::Editor(EditorKey::Escape),
        KeyCode::Delete | KeyCode::Backspace => InputAction::Editor(EditorKey::Delete),
        KeyCode::KeyN => InputAction::Editor(EditorKey::ToggleDayNight),
        KeyCode::Digit1 => InputAction::ChoosePalette(0),
        KeyCode::Digit2 => InputAction::ChoosePalette(1),
        KeyCode::Digit3 => InputAction::ChoosePalette(2),
        KeyCode::Digit4 => InputAction::ChoosePalette(3),
        KeyCode::Digit5 => InputAction::ChoosePalette(4),
        KeyCode::Digit6 => InputAction::ChoosePalette(5),
        KeyCode::Digit7 => InputAction::ChoosePalette(6),
        KeyCode::Digit8 => InputAction::ChoosePalette(7),
        KeyCode::Digit9 => InputAction::ChoosePalette(8),
        _ => InputAction::None,
    }
}

pub fn map_mouse_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        _ => None,
    }
}
