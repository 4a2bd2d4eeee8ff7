//! Day/night lighting and audio feedback seams.

use crate::assets::procedural::{BULB_LIGHT_COLOR, BULB_PART};
use crate::scene::{rgb, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightMode {
    #[default]
    Day,
    Night,
}

impl LightMode {
    pub fn toggled(self) -> Self {
        match self {
            LightMode::Day => LightMode::Night,
            LightMode::Night => LightMode::Day,
        }
    }
}

pub trait LightingQuery {
    fn mode(&self) -> LightMode;

    /// Flip between day and night. Read-only sources ignore the request.
    fn toggle(&mut self) {}
}

#[derive(Debug, Clone, Default)]
pub struct DayNightCycle {
    mode: LightMode,
}

impl DayNightCycle {
    pub fn new(mode: LightMode) -> Self {
        Self { mode }
    }
}

impl LightingQuery for DayNightCycle {
    fn mode(&self) -> LightMode {
        self.mode
    }

    fn toggle(&mut self) {
        self.mode = self.mode.toggled();
        log::info!("Lighting switched to {:?}", self.mode);
    }
}

pub trait AudioCue {
    fn play_click(&mut self);
}

/// Logs cues instead of playing them.
#[derive(Debug, Default)]
pub struct LogAudio {
    clicks: u32,
}

impl LogAudio {
    pub fn clicks(&self) -> u32 {
        self.clicks
    }
}

impl AudioCue for LogAudio {
    fn play_click(&mut self) {
        self.clicks += 1;
        log::debug!("click ({})", self.clicks);
    }
}

/// Lightpole bulb look for a lighting mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulbAppearance {
    pub color: u32,
    pub emissive: u32,
    pub emissive_intensity: f32,
    pub light_intensity: f32,
}

impl BulbAppearance {
    pub fn for_mode(mode: LightMode) -> Self {
        match mode {
            LightMode::Day => Self {
                color: 0xcccccc,
                emissive: 0x000000,
                emissive_intensity: 0.0,
                light_intensity: 0.0,
            },
            LightMode::Night => Self {
                color: BULB_LIGHT_COLOR,
                emissive: BULB_LIGHT_COLOR,
                emissive_intensity: 0.8,
                light_intensity: 1.5,
            },
        }
    }

    /// Restyle the bulb part and the point lights of `shape`. Returns whether
    /// anything changed; shapes without a bulb are left alone.
    pub fn apply(&self, shape: &mut Shape) -> bool {
        let Some(bulb) = shape.part_mut(BULB_PART) else {
            return false;
        };
        let color = rgb(self.color);
        let emissive = rgb(self.emissive);
        let mut changed = false;
        if bulb.material.color != color
            || bulb.material.emissive != emissive
            || bulb.material.emissive_intensity != self.emissive_intensity
        {
            bulb.material.color = color;
            bulb.material.emissive = emissive;
            bulb.material.emissive_intensity = self.emissive_intensity;
            changed = true;
        }
        for light in shape.lights_mut() {
            if light.intensity != self.light_intensity {
                light.intensity = self.light_intensity;
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::procedural::Recipe;

    #[test]
    fn toggle_flips_mode() {
        let mut cycle = DayNightCycle::default();
        assert_eq!(cycle.mode(), LightMode::Day);
        cycle.toggle();
        assert_eq!(cycle.mode(), LightMode::Night);
        cycle.toggle();
        assert_eq!(cycle.mode(), LightMode::Day);
    }

    #[test]
    fn night_lights_the_bulb_once() {
        let mut pole = Recipe::Lightpole.build();
        let night = BulbAppearance::for_mode(LightMode::Night);
        assert!(night.apply(&mut pole));
        assert!(!night.apply(&mut pole));
        assert_eq!(pole.lights_mut()[0].intensity, 1.5);
        let bulb = pole.part_mut(BULB_PART).expect("bulb");
        assert_eq!(bulb.material.emissive_intensity, 0.8);
        assert_eq!(bulb.material.color, rgb(0xffffaa));
    }

    #[test]
    fn day_restores_dark_bulb() {
        let mut pole = Recipe::Lightpole.build();
        BulbAppearance::for_mode(LightMode::Night).apply(&mut pole);
        assert!(BulbAppearance::for_mode(LightMode::Day).apply(&mut pole));
        assert_eq!(pole.lights_mut()[0].intensity, 0.0);
    }

    #[test]
    fn shapes_without_bulb_are_untouched() {
        let mut bench = Recipe::Bench.build();
        let before = bench.clone();
        assert!(!BulbAppearance::for_mode(LightMode::Night).apply(&mut bench));
        assert_eq!(bench, before);
    }

    #[test]
    fn log_audio_counts_clicks() {
        let mut audio = LogAudio::default();
        audio.play_click();
        audio.play_click();
        assert_eq!(audio.clicks(), 2);
    }
}
