use std::time::{Duration, Instant};

use winit::window::Window;

/// Longest step handed to the editor, so a stalled frame does not teleport
/// walking gnomes.
const MAX_FRAME_DT: f32 = 0.1;
const TITLE_INTERVAL_SECS: f32 = 0.5;

pub struct FrameClock {
    last_frame_time: Option<Instant>,
    last_title_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
    base_title: String,
}

impl FrameClock {
    pub fn new(base_title: String) -> Self {
        Self {
            last_frame_time: None,
            last_title_time: Instant::now(),
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            base_title,
        }
    }

    /// Measure the time since the previous frame.
    pub fn tick(&mut self, now: Instant) -> f32 {
        let dt_duration = if let Some(last) = self.last_frame_time {
            now.saturating_duration_since(last)
        } else {
            Duration::from_millis(16)
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().clamp(0.0, MAX_FRAME_DT);
        self.frame_count = self.frame_count.saturating_add(1);
        self.frame_dt
    }

    /// Refresh the window title with fps and the editor status, at most twice
    /// a second.
    pub fn update_title(&mut self, window: Option<&Window>, now: Instant, status: &str) {
        let elapsed = now.saturating_duration_since(self.last_title_time);
        if elapsed.as_secs_f32() < TITLE_INTERVAL_SECS {
            return;
        }
        let fps = self.frame_count as f32 / elapsed.as_secs_f32();
        if let Some(window) = window {
            window.set_title(&format_title(&self.base_title, fps, status));
        }
        self.frame_count = 0;
        self.last_title_time = now;
    }
}

pub fn format_title(base: &str, fps: f32, status: &str) -> String {
    format!("{base} - {fps:.1} fps - {status}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_assumes_one_frame() {
        let mut clock = FrameClock::new("Garden".to_string());
        let dt = clock.tick(Instant::now());
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut clock = FrameClock::new("Garden".to_string());
        let start = Instant::now();
        clock.tick(start);
        let dt = clock.tick(start + Duration::from_secs(3));
        assert_eq!(dt, MAX_FRAME_DT);
    }

    #[test]
    fn title_carries_status() {
        assert_eq!(
            format_title("Garden Designer", 59.96, "Click an item to start placing"),
            "Garden Designer - 60.0 fps - Click an item to start placing"
        );
    }
}
