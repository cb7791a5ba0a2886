//! Game settings and preferences
//!
//! Persisted as JSON next to the save file, separately from game saves.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::PlayerKind;

/// Default settings file, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "settings.json";

/// Highest settings player-type code (AI difficulty 3)
pub const MAX_PLAYER_TYPE: u8 = 4;

/// Readable names for settings player-type codes
pub const PLAYER_TYPE_NAMES: [&str; 5] = ["None", "Human", "AI 1", "AI 2", "AI 3"];

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid_width: u8,
    pub grid_height: u8,
    /// Per-slot type code: 0 none, 1 human, 2-4 AI difficulty 1-3
    pub player_types: [u8; MAX_PLAYERS],

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_width: 10,
            grid_height: 6,
            player_types: [1, 3, 0, 0],

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Number of slots that aren't "None"
    pub fn player_count(&self) -> usize {
        self.player_types.iter().filter(|&&t| t != 0).count()
    }

    /// Slot kinds for starting a session
    pub fn player_kinds(&self) -> [Option<PlayerKind>; MAX_PLAYERS] {
        self.player_types.map(PlayerKind::from_type_code)
    }

    /// Pull every value into range. Player types fall back to the defaults
    /// when fewer than two players are left.
    pub fn clamp(&mut self) {
        self.grid_width = self.grid_width.clamp(MIN_GRID_WIDTH, MAX_GRID_WIDTH);
        self.grid_height = self.grid_height.clamp(MIN_GRID_HEIGHT, MAX_GRID_HEIGHT);
        for t in &mut self.player_types {
            *t = (*t).min(MAX_PLAYER_TYPE);
        }
        if self.player_count() < 2 {
            log::warn!("Fewer than 2 players configured, resetting player types");
            self.player_types = Self::default().player_types;
        }
        self.master_volume = self.master_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
    }

    /// Step the grid width by `step`, wrapping inside the allowed range
    pub fn cycle_grid_width(&mut self, step: i8) {
        self.grid_width = wrap_step(self.grid_width, step, MIN_GRID_WIDTH, MAX_GRID_WIDTH);
    }

    pub fn cycle_grid_height(&mut self, step: i8) {
        self.grid_height = wrap_step(self.grid_height, step, MIN_GRID_HEIGHT, MAX_GRID_HEIGHT);
    }

    /// Step a slot's player type, wrapping. "None" is skipped while only
    /// two players are configured.
    pub fn cycle_player_type(&mut self, slot: usize, step: i8) {
        let min = if self.player_count() > 2 { 0 } else { 1 };
        let Some(t) = self.player_types.get_mut(slot) else {
            log::error!("cycle_player_type: invalid slot {}", slot);
            return;
        };
        *t = wrap_step(*t, step, min, MAX_PLAYER_TYPE);
    }

    /// Load settings from `path`, falling back to defaults
    pub fn load(path: &Path) -> Self {
        let mut settings = match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        };
        settings.clamp();
        settings
    }

    /// Save settings as JSON to `path`
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(io::Error::other)?;
        fs::write(path, json)?;
        log::info!("Settings saved");
        Ok(())
    }
}

/// `value + step`, wrapping to the other end of `[min, max]` when it leaves the range
fn wrap_step(value: u8, step: i8, min: u8, max: u8) -> u8 {
    let next = i16::from(value) + i16::from(step);
    if next > i16::from(max) {
        min
    } else if next < i16::from(min) {
        max
    } else {
        next as u8
    }
}
