//! Deterministic game simulation
//!
//! All gameplay rules live here:
//! - Seeded RNG only
//! - Stable iteration order (column-major tiles, slot order for players)
//! - No rendering or input code; sounds and messages leave as [`GameEvent`]s

pub mod ai;
pub mod grid;
pub mod player;
pub mod scheduler;
pub mod stack;
pub mod state;
pub mod tick;
pub mod turn;
pub mod tutorial;

pub use ai::{AiController, RandomAi};
pub use grid::{Atom, Grid, GridError, NEIGHBOR_ORDER, Tile, TilePos, critical_mass_at};
pub use player::{PlayerId, PlayerKind, PlayerSlot, PlayerStatus, Players};
pub use scheduler::chain_speed;
pub use stack::{ExplosionStack, StackOverflow};
pub use state::{AbortReason, GameEvent, SessionSnapshot, SessionState, TickStatus, TileView};
pub use tick::tick;
pub use tutorial::{TUTORIAL_SCRIPT, Tutorial, TutorialEvent};
