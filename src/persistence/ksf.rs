//! KSF (KleleAtoms Save Format) codec
//!
//! Layout, all single bytes:
//!
//! ```text
//! "KSF" width height total_players current_players ai_difficulty current_player+1
//! status[4] ai_type[4] seconds minutes hours
//! (owner+1, atom_count) per tile, column-major
//! ```
//!
//! Status codes are 0 lost, 1 not started, 2 playing and anything else not
//! present. AI type 0 is human, 1 an AI using the header difficulty and 2-4
//! an AI of difficulty 1-3.

use thiserror::Error;

use crate::consts::MAX_PLAYERS;
use crate::sim::{Grid, GridError, PlayerId, PlayerKind, PlayerSlot, PlayerStatus, SessionState};

pub const MAGIC: &[u8; 3] = b"KSF";

/// Bytes before the tile records, magic included
pub const HEADER_SIZE: usize = 20;

/// The header difficulty is unused by the game but must stay in 1-3
const HEADER_AI_DIFFICULTY: u8 = 2;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save file is smaller than the 20-byte header ({len} bytes)")]
    TooShort { len: usize },
    #[error("save file magic is {found:?}, expected \"KSF\"")]
    BadMagic { found: [u8; 3] },
    #[error("save file too small for a {width}x{height} grid ({len} < {needed} bytes)")]
    Truncated {
        width: usize,
        height: usize,
        len: usize,
        needed: usize,
    },
    #[error("save file grid is invalid: {0}")]
    InvalidGrid(#[from] GridError),
    #[error("tile ({x}, {y}) has invalid owner byte {owner}")]
    InvalidOwner { x: usize, y: usize, owner: u8 },
    #[error("tile ({x}, {y}) has {count} atoms but no owner")]
    OwnerlessAtoms { x: usize, y: usize, count: u8 },
    #[error("save file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully validated save, ready to replace a session's state
#[derive(Debug, Clone, PartialEq)]
pub struct SaveData {
    pub width: usize,
    pub height: usize,
    pub total_player_count: u8,
    pub current_player_count: u8,
    pub current_player: Option<PlayerId>,
    pub players: [PlayerSlot; MAX_PLAYERS],
    /// Elapsed game time in seconds
    pub elapsed: u64,
    /// Owner and atom count per tile, column-major
    pub tiles: Vec<(Option<PlayerId>, u8)>,
}

fn status_code(status: PlayerStatus) -> u8 {
    match status {
        PlayerStatus::Playing => 2,
        PlayerStatus::NotStarted => 1,
        PlayerStatus::Lost => 0,
        PlayerStatus::NotPresent => 255,
    }
}

fn status_from_code(code: u8) -> PlayerStatus {
    match code {
        0 => PlayerStatus::Lost,
        1 => PlayerStatus::NotStarted,
        2 => PlayerStatus::Playing,
        _ => PlayerStatus::NotPresent,
    }
}

fn ai_code(kind: PlayerKind) -> u8 {
    match kind {
        PlayerKind::Human => 0,
        PlayerKind::Ai { difficulty } => difficulty.clamp(1, 3) + 1,
    }
}

fn kind_from_ai_code(code: u8, header_difficulty: u8) -> PlayerKind {
    match code.min(4) {
        0 => PlayerKind::Human,
        1 => PlayerKind::Ai {
            difficulty: header_difficulty,
        },
        n => PlayerKind::Ai { difficulty: n - 1 },
    }
}

fn player_byte(id: Option<PlayerId>) -> u8 {
    id.map_or(0, |id| id.index() as u8 + 1)
}

/// Serialize a session with `elapsed` seconds of game time
pub fn encode(state: &SessionState, elapsed: u64) -> Vec<u8> {
    let grid = state.grid();
    let mut out = Vec::with_capacity(HEADER_SIZE + 2 * grid.width() * grid.height());
    out.extend_from_slice(MAGIC);
    out.push(grid.width() as u8);
    out.push(grid.height() as u8);
    out.push(state.total_player_count());
    out.push(state.current_player_count());
    out.push(HEADER_AI_DIFFICULTY);
    out.push(player_byte(state.current_player()));
    out.extend(state.players().iter().map(|(_, slot)| status_code(slot.status)));
    out.extend(state.players().iter().map(|(_, slot)| ai_code(slot.kind)));
    out.push((elapsed % 60) as u8);
    out.push(((elapsed / 60) % 60) as u8);
    out.push(((elapsed / 3600) & 0xFF) as u8);
    for (_, tile) in grid.tiles() {
        out.push(player_byte(tile.owner()));
        out.push(tile.atom_count().min(u32::from(u8::MAX)) as u8);
    }
    out
}

/// Parse and validate a save without touching any session
pub fn decode(bytes: &[u8]) -> Result<SaveData, SaveError> {
    if bytes.len() < HEADER_SIZE {
        return Err(SaveError::TooShort { len: bytes.len() });
    }
    if &bytes[..3] != MAGIC {
        return Err(SaveError::BadMagic {
            found: [bytes[0], bytes[1], bytes[2]],
        });
    }
    let width = usize::from(bytes[3]);
    let height = usize::from(bytes[4]);
    let needed = HEADER_SIZE + 2 * width * height;
    if bytes.len() < needed {
        return Err(SaveError::Truncated {
            width,
            height,
            len: bytes.len(),
            needed,
        });
    }
    Grid::new(width, height)?;

    let header_difficulty = bytes[7].clamp(1, 3);
    let mut players = [PlayerSlot::default(); MAX_PLAYERS];
    for (i, slot) in players.iter_mut().enumerate() {
        let status = status_from_code(bytes[9 + i]);
        *slot = PlayerSlot {
            status,
            kind: kind_from_ai_code(bytes[13 + i], header_difficulty),
            atom_tally: u32::from(status == PlayerStatus::Playing),
        };
    }
    let elapsed = u64::from(bytes[17]) + u64::from(bytes[18]) * 60 + u64::from(bytes[19]) * 3600;

    let mut tiles = Vec::with_capacity(width * height);
    let records = bytes[HEADER_SIZE..needed].chunks_exact(2);
    for (i, record) in records.enumerate() {
        let (x, y) = (i / height, i % height);
        let (owner_byte, count) = (record[0], record[1]);
        let owner = match owner_byte {
            0 => None,
            b => Some(PlayerId::new(usize::from(b) - 1).ok_or(SaveError::InvalidOwner {
                x,
                y,
                owner: b,
            })?),
        };
        if owner.is_none() && count > 0 {
            return Err(SaveError::OwnerlessAtoms { x, y, count });
        }
        tiles.push((owner, count));
    }

    Ok(SaveData {
        width,
        height,
        total_player_count: bytes[5].min(MAX_PLAYERS as u8),
        current_player_count: bytes[6].min(MAX_PLAYERS as u8),
        current_player: usize::from(bytes[8].min(MAX_PLAYERS as u8))
            .checked_sub(1)
            .and_then(PlayerId::new),
        players,
        elapsed,
        tiles,
    })
}

/// Replace the session's grid, players and turn state with a decoded save.
///
/// Returns the saved elapsed time. On error the session is left untouched.
pub fn load_into(state: &mut SessionState, bytes: &[u8]) -> Result<u64, SaveError> {
    let data = decode(bytes)?;
    let mut grid = Grid::new(data.width, data.height)?;
    let positions: Vec<_> = grid.positions().collect();
    for (pos, (owner, count)) in positions.into_iter().zip(&data.tiles) {
        if let Some(tile) = grid.tile_mut(pos) {
            tile.set_direct(*owner, u32::from(*count), &mut state.rng);
        }
    }

    state.grid = grid;
    for (id, slot) in PlayerId::ALL.into_iter().zip(data.players) {
        state.players[id] = slot;
    }
    state.total_player_count = data.total_player_count;
    state.current_player_count = data.current_player_count;
    // A missing current player would leave nobody able to move
    state.current_player = data
        .current_player
        .or_else(|| state.players.first_active_from(PlayerId::ALL[0]));
    state.winning_player = None;
    state.explosion_count = 0;
    state.pending_explosion = None;
    state.stack.clear();
    state.anim_playing = false;
    state.turn_time = 0.0;
    state.abort = None;
    log::info!(
        "Loaded {}x{} save, {} players, {}s elapsed",
        data.width,
        data.height,
        data.total_player_count,
        data.elapsed
    );
    Ok(data.elapsed)
}
