mod input;
mod timing;

use crate::config::EditorConfig;
use crate::environment::{DayNightCycle, LogAudio};
use crate::interaction::{Editor, EditorInput, EditorKey};
use crate::render::SceneMirror;
use input::{map_mouse_button, InputAction, InputState};
use timing::FrameClock;

use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Modifiers, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

const APP_TITLE: &str = "Garden Designer";
/// World units the camera moves per wheel line.
const WHEEL_ZOOM_STEP: f32 = 2.0;
const PIXELS_PER_WHEEL_LINE: f32 = 40.0;

pub struct App {
    window: Option<Arc<Window>>,
    editor: Editor<SceneMirror>,
    initial_size: PhysicalSize<u32>,
    input: InputState,
    modifiers: Modifiers,
    mouse_pos: Option<(f32, f32)>,
    clock: FrameClock,
    target_frame_duration: Duration,
    next_frame_time: Instant,
}

impl App {
    fn new(editor: Editor<SceneMirror>, initial_size: PhysicalSize<u32>) -> Self {
        Self {
            window: None,
            editor,
            initial_size,
            input: InputState::default(),
            modifiers: Modifiers::default(),
            mouse_pos: None,
            clock: FrameClock::new(APP_TITLE.to_string()),
            target_frame_duration: Duration::from_millis(16),
            next_frame_time: Instant::now(),
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.editor
            .pointer_mut()
            .set_viewport(new_size.width as f32, new_size.height as f32);
    }

    fn update_target_frame_duration(&mut self, window: &Window) {
        let mut target = Duration::from_millis(16);
        if let Some(monitor) = window.current_monitor() {
            if let Some(millihz) = monitor.refresh_rate_millihertz() {
                let hz = millihz as f32 / 1000.0;
                if hz > 1.0 {
                    target = Duration::from_secs_f32(1.0 / hz);
                }
            }
        }
        self.target_frame_duration = target;
        self.next_frame_time = Instant::now() + self.target_frame_duration;
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let dt = self.clock.tick(now);

        let pivot = self.editor.validator().bounds().center();
        self.editor
            .pointer_mut()
            .camera_mut()
            .update_orbit(&self.input.orbit, pivot, dt);
        self.editor.tick(dt);

        self.clock
            .update_title(self.window.as_deref(), now, self.editor.ui().summary());
    }

    fn handle_action(&mut self, action: InputAction) {
        match action {
            InputAction::None => {}
            InputAction::Editor(EditorKey::Escape) if self.editor.drag_drop().is_active() => {
                self.editor.drag_end();
            }
            InputAction::Editor(key) => self.editor.handle_input(EditorInput::KeyPressed(key)),
            InputAction::ChoosePalette(slot) => {
                let Some(entry) = self.editor.ui().palette_entry(slot) else {
                    log::debug!("No palette entry in slot {}", slot + 1);
                    return;
                };
                let type_id = entry.type_id.clone();
                if self.modifiers.state().shift_key() {
                    let (x, y) = self.mouse_pos.unwrap_or_default();
                    self.editor.drag_start(&type_id, x, y);
                } else {
                    self.editor.choose_item_type(&type_id);
                }
            }
        }
    }

    fn handle_mouse_button(&mut self, state: ElementState, button: MouseButton) {
        let Some((x, y)) = self.mouse_pos else {
            return;
        };
        if self.editor.drag_drop().is_active() {
            if state == ElementState::Pressed && button == MouseButton::Left {
                self.editor.drop(x, y);
            }
            return;
        }
        let Some(button) = map_mouse_button(button) else {
            return;
        };
        let input = match state {
            ElementState::Pressed => EditorInput::PointerPressed { x, y, button },
            ElementState::Released => EditorInput::PointerReleased { x, y, button },
        };
        self.editor.handle_input(input);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title(APP_TITLE)
            .with_inner_size(self.initial_size)
            .with_resizable(true);

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };

        self.handle_resize(window.inner_size());
        self.update_target_frame_duration(&window);
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                event_loop.exit();
            }
            WindowEvent::Focused(focused) => {
                if !focused {
                    self.mouse_pos = None;
                    self.input.release_all();
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                if pressed && event.repeat {
                    return;
                }
                let action = self.input.handle_key(event.physical_key, pressed);
                self.handle_action(action);
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers;
            }
            WindowEvent::Resized(new_size) => {
                self.handle_resize(new_size);
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::Moved(_) => {
                if let Some(window) = self.window.clone() {
                    self.update_target_frame_duration(&window);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                self.mouse_pos = Some((x, y));
                if self.editor.drag_drop().is_active() {
                    self.editor.drag_over(x, y);
                } else {
                    self.editor.handle_input(EditorInput::PointerMoved { x, y });
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.mouse_pos = None;
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.handle_mouse_button(state, button);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_WHEEL_LINE,
                };
                let pivot = self.editor.validator().bounds().center();
                self.editor
                    .pointer_mut()
                    .camera_mut()
                    .zoom_toward(pivot, lines * WHEEL_ZOOM_STEP);
            }
            WindowEvent::RedrawRequested => {
                self.frame();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_frame_time {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
            self.next_frame_time = now + self.target_frame_duration;
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame_time));
    }
}

pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("{APP_TITLE}");
    log::info!("   1-9 pick an item (Shift to drag it), N toggles night, Esc cancels");

    let config = match EditorConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            log::error!("Config error: {err}; using defaults");
            EditorConfig::default()
        }
    };

    let editor = match Editor::from_config(
        &config,
        SceneMirror::new(),
        Box::new(DayNightCycle::default()),
        Box::new(LogAudio::default()),
    ) {
        Ok(editor) => editor,
        Err(err) => {
            log::error!("Failed to start editor: {err}");
            return;
        }
    };
    log::info!("{}", editor.assets().debug_summary());

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Wait);

    let size = PhysicalSize::new(config.viewport[0], config.viewport[1]);
    let mut app = App::new(editor, size);
    event_loop.run_app(&mut app).expect("Event loop error");

    log::info!("Garden closed");
}
