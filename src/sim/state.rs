//! Session state and core simulation types
//!
//! Everything one game needs between ticks lives in [`SessionState`]. The
//! turn engine, explosion scheduler and tick extend it from their own modules.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;
use thiserror::Error;

use super::grid::{Atom, Grid, GridError, TilePos};
use super::player::{PlayerId, PlayerKind, PlayerSlot, PlayerStatus, Players};
use super::stack::{ExplosionStack, StackOverflow};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Side effects for the host, drained after each update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    /// Play a sound
    Sound(SoundEffect),
    /// Show an info message for `seconds`
    Message { text: String, seconds: f32 },
}

/// Why a session stopped itself
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbortReason {
    #[error("more than {limit} simultaneous explosions")]
    RunawayChain { limit: usize },
    #[error(transparent)]
    StackOverflow(#[from] StackOverflow),
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickStatus {
    Running,
    /// Terminal: one player left standing
    Won(PlayerId),
    /// Terminal: the session gave up and the host should leave the game
    Aborted(AbortReason),
}

/// Complete state of one game session
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) grid: Grid,
    pub(crate) players: Players,
    pub(crate) current_player: Option<PlayerId>,
    /// Present players that haven't lost
    pub(crate) current_player_count: u8,
    /// Present players, lost or not
    pub(crate) total_player_count: u8,
    pub(crate) winning_player: Option<PlayerId>,
    /// Explosions since the last placement
    pub(crate) explosion_count: u32,
    /// Tile that explodes on the next idle tick
    pub(crate) pending_explosion: Option<TilePos>,
    pub(crate) stack: ExplosionStack,
    pub(crate) anim_playing: bool,
    /// Seconds since the current turn started (the AI decision timer)
    pub(crate) turn_time: f32,
    pub(crate) abort: Option<AbortReason>,
    events: Vec<GameEvent>,
    pub(crate) rng: Pcg32,
}

impl SessionState {
    /// Start a session on an empty `width` x `height` grid
    pub fn new(
        width: usize,
        height: usize,
        kinds: [Option<PlayerKind>; MAX_PLAYERS],
        seed: u64,
    ) -> Result<Self, GridError> {
        let grid = Grid::new(width, height)?;
        let mut state = Self::with_grid(grid, Pcg32::seed_from_u64(seed));
        state.set_players(kinds);
        log::info!(
            "Session started: {}x{} grid, {} players",
            width,
            height,
            state.total_player_count
        );
        if state.current_player.is_none() || state.total_player_count < 2 {
            state.message("2 or more players required to play!", 3.0);
        }
        Ok(state)
    }

    /// Session with no players on `grid`
    pub(crate) fn with_grid(grid: Grid, rng: Pcg32) -> Self {
        Self {
            grid,
            players: Players::default(),
            current_player: None,
            current_player_count: 0,
            total_player_count: 0,
            winning_player: None,
            explosion_count: 0,
            pending_explosion: None,
            stack: ExplosionStack::new(ATOM_STACK_SIZE),
            anim_playing: false,
            turn_time: 0.0,
            abort: None,
            events: Vec::new(),
            rng,
        }
    }

    /// Assign slot kinds: present slots become `NotStarted`, absent ones
    /// `NotPresent`. Keeps the current player if one is already set.
    pub fn set_players(&mut self, kinds: [Option<PlayerKind>; MAX_PLAYERS]) {
        self.current_player_count = 0;
        for (id, kind) in PlayerId::ALL.into_iter().zip(kinds) {
            let slot = &mut self.players[id];
            match kind {
                Some(kind) => {
                    if self.current_player.is_none() {
                        self.current_player = Some(id);
                    }
                    self.current_player_count += 1;
                    *slot = PlayerSlot {
                        status: PlayerStatus::NotStarted,
                        kind,
                        atom_tally: 0,
                    };
                }
                None => slot.status = PlayerStatus::NotPresent,
            }
        }
        self.total_player_count = self.current_player_count;
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn players(&self) -> &Players {
        &self.players
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.current_player
    }

    pub(crate) fn set_current_player(&mut self, id: Option<PlayerId>) {
        self.current_player = id;
    }

    pub fn current_player_count(&self) -> u8 {
        self.current_player_count
    }

    pub fn total_player_count(&self) -> u8 {
        self.total_player_count
    }

    pub fn winning_player(&self) -> Option<PlayerId> {
        self.winning_player
    }

    pub fn explosion_count(&self) -> u32 {
        self.explosion_count
    }

    pub fn pending_explosion(&self) -> Option<TilePos> {
        self.pending_explosion
    }

    pub fn pending_stack(&self) -> &ExplosionStack {
        &self.stack
    }

    pub fn is_animating(&self) -> bool {
        self.anim_playing
    }

    pub fn turn_time(&self) -> f32 {
        self.turn_time
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        self.abort.as_ref()
    }

    /// No animation and no chain reaction in flight
    pub fn is_idle(&self) -> bool {
        !self.anim_playing && self.stack.is_empty() && self.pending_explosion.is_none()
    }

    /// Whether the current player is computer-controlled
    pub fn current_is_ai(&self) -> bool {
        self.current_player
            .is_some_and(|id| self.players[id].kind.is_ai())
    }

    /// Overwrite a tile without animation or explosion checks.
    ///
    /// `owner == None` with a non-zero count means the current player.
    /// Out-of-bounds positions are logged and ignored.
    pub fn set_tile_direct(&mut self, pos: TilePos, owner: Option<PlayerId>, count: u32) -> bool {
        let owner = owner.or(self.current_player);
        let Some(tile) = self.grid.tile_mut(pos) else {
            log::error!("set_tile_direct: invalid position ({}, {})", pos.x, pos.y);
            return false;
        };
        if count > 0 && owner.is_none() {
            log::error!(
                "set_tile_direct: no owner for {} atoms at ({}, {})",
                count,
                pos.x,
                pos.y
            );
            return false;
        }
        tile.set_direct(owner, count, &mut self.rng);
        true
    }

    /// Empty every tile and put present players back to `NotStarted`
    pub fn clear_grid(&mut self) {
        for id in PlayerId::ALL {
            let slot = &mut self.players[id];
            if slot.status != PlayerStatus::NotPresent {
                slot.status = PlayerStatus::NotStarted;
            }
        }
        self.grid.clear();
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn message(&mut self, text: &str, seconds: f32) {
        log::info!("{}", text);
        self.emit(GameEvent::Message {
            text: text.to_string(),
            seconds,
        });
    }

    /// Events produced since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Stop the session; every later tick reports `Aborted`
    pub(crate) fn abort_session(&mut self, reason: AbortReason) {
        log::error!("Session aborted: {}", reason);
        if matches!(reason, AbortReason::RunawayChain { .. }) {
            let text = format!("More than {} simultaneous explosions! Stopping...", ATOM_STACK_SIZE);
            self.message(&text, 4.0);
        }
        self.abort = Some(reason);
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            tiles: self
                .grid
                .tiles()
                .map(|(pos, tile)| TileView {
                    pos,
                    owner: tile.owner(),
                    atom_count: tile.atom_count(),
                    critical_mass: tile.critical_mass(),
                    explode_timer: tile.explode_timer(),
                    atoms: tile.atoms().to_vec(),
                })
                .collect(),
            players: self.players.iter().map(|(_, slot)| *slot).collect(),
            current_player: self.current_player,
            winning_player: self.winning_player,
            explosion_count: self.explosion_count,
        }
    }
}

/// Serializable view of one tile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub pos: TilePos,
    pub owner: Option<PlayerId>,
    pub atom_count: u32,
    pub critical_mass: u32,
    pub explode_timer: f32,
    pub atoms: Vec<Atom>,
}

/// Serializable view of a whole session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub width: usize,
    pub height: usize,
    /// Column-major, like the grid
    pub tiles: Vec<TileView>,
    pub players: Vec<PlayerSlot>,
    pub current_player: Option<PlayerId>,
    pub winning_player: Option<PlayerId>,
    pub explosion_count: u32,
}
