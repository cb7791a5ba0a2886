//! KleleAtoms - a turn-based chain-reaction grid game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (grid, turns, explosion scheduler, tutorial)
//! - `persistence`: KSF save format and the on-disk save slot
//! - `settings`: User settings (grid size, player types, volume)
//! - `audio`: Sound effect ids and the audio sink seam
//! - `app`: Screen state machine (menu / game) with fade transitions

pub mod app;
pub mod audio;
pub mod persistence;
pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{SessionState, TickStatus, tick};

/// Game configuration constants
pub mod consts {
    /// Fixed frame step for headless runs (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Number of player slots
    pub const MAX_PLAYERS: usize = 4;

    /// Grid size limits selectable in settings
    pub const MIN_GRID_WIDTH: u8 = 5;
    pub const MAX_GRID_WIDTH: u8 = 13;
    pub const MIN_GRID_HEIGHT: u8 = 4;
    pub const MAX_GRID_HEIGHT: u8 = 8;
    /// Upper bound on tiles in one grid
    pub const MAX_GRID_CELLS: usize = MAX_GRID_WIDTH as usize * MAX_GRID_HEIGHT as usize;

    /// Base critical mass of an interior tile
    pub const BASE_CRITICAL_MASS: u32 = 4;
    /// Atoms per tile that get their own animated position
    pub const MAX_VISIBLE_ATOMS: usize = 8;

    /// Pending-explosion stack capacity, also the per-turn explosion limit
    pub const ATOM_STACK_SIZE: usize = 5000;
    /// Stack entries examined per tick at most
    pub const MAX_STACK_POPS_PER_TICK: usize = 50;
    /// Explosion count past which chain speed stops growing and explosions go silent
    pub const EXPLOSION_SATURATION: u32 = 1000;

    /// Explosion fade duration at chain speed 1 (seconds)
    pub const BASE_EXPLOSION_TIME: f32 = 0.3;
    /// Atom movement speed at chain speed 1 (pixels per second)
    pub const BASE_ATOM_SPEED: f32 = 42.27;

    /// Tile-relative atom slot coordinates (pixels)
    pub const ATOM_START_POS: f32 = 2.0;
    pub const ATOM_MID_POS: f32 = 10.0;
    pub const ATOM_END_POS: f32 = 18.0;
    /// Jitter range for atoms past the fourth (inclusive, pixels)
    pub const ATOM_JITTER_MIN: i32 = 5;
    pub const ATOM_JITTER_MAX: i32 = 15;

    /// Screen transition fades (seconds)
    pub const FADE_OUT_TIME: f32 = 0.17;
    pub const FADE_IN_TIME: f32 = 0.25;

    /// Tile selector hold-to-repeat timings (seconds)
    pub const SELECTOR_INITIAL_DELAY: f32 = 0.25;
    pub const SELECTOR_REPEAT_DELAY: f32 = 0.15;

    /// Menu button hold-to-repeat timings (seconds)
    pub const MENU_REPEAT_INITIAL_DELAY: f32 = 0.35;
    pub const MENU_REPEAT_DELAY: f32 = 0.15;

    /// Time an AI player waits into its turn before moving (seconds)
    pub const AI_MOVE_DELAY: f32 = 0.5;

    /// Grid used by the tutorial
    pub const TUTORIAL_GRID_WIDTH: u8 = 10;
    pub const TUTORIAL_GRID_HEIGHT: u8 = 6;
}
