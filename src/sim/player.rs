//! Player slots
//!
//! There are always four slots. Slot indices travel through the crate as
//! [`PlayerId`], which can only be built for an index inside the slot array.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::consts::MAX_PLAYERS;

/// Bounds-checked player slot index (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const ALL: [PlayerId; MAX_PLAYERS] = [PlayerId(0), PlayerId(1), PlayerId(2), PlayerId(3)];

    pub fn new(index: usize) -> Option<Self> {
        (index < MAX_PLAYERS).then(|| Self(index as u8))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Next slot in circular order
    #[inline]
    pub fn next(self) -> Self {
        Self((self.0 + 1) % MAX_PLAYERS as u8)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

/// Slot status, ordered so that everything above `Lost` takes turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Slot set to "None" in settings
    #[default]
    NotPresent,
    /// Lost all atoms after having placed at least one
    Lost,
    /// Present but hasn't placed an atom yet
    NotStarted,
    Playing,
}

impl PlayerStatus {
    /// Whether the slot still takes turns
    #[inline]
    pub fn is_active(self) -> bool {
        self > PlayerStatus::Lost
    }
}

/// Who controls a slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerKind {
    #[default]
    Human,
    /// Computer player, difficulty 1-3
    Ai { difficulty: u8 },
}

impl PlayerKind {
    /// Decode a settings player-type code: 0 none, 1 human, 2-4 AI difficulty 1-3.
    /// Codes above 4 are treated as the hardest AI.
    pub fn from_type_code(code: u8) -> Option<Self> {
        match code {
            0 => None,
            1 => Some(PlayerKind::Human),
            n => Some(PlayerKind::Ai {
                difficulty: n.min(4) - 1,
            }),
        }
    }

    /// Inverse of [`PlayerKind::from_type_code`]
    pub fn type_code(kind: Option<Self>) -> u8 {
        match kind {
            None => 0,
            Some(PlayerKind::Human) => 1,
            Some(PlayerKind::Ai { difficulty }) => difficulty.clamp(1, 3) + 1,
        }
    }

    #[inline]
    pub fn is_ai(self) -> bool {
        matches!(self, PlayerKind::Ai { .. })
    }
}

/// One of the four player slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSlot {
    pub status: PlayerStatus,
    pub kind: PlayerKind,
    /// Atoms owned on the grid, recomputed every tick
    pub atom_tally: u32,
}

/// The fixed array of player slots, indexed by [`PlayerId`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Players([PlayerSlot; MAX_PLAYERS]);

impl Players {
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &PlayerSlot)> {
        PlayerId::ALL.into_iter().zip(self.0.iter())
    }

    pub fn count_with(&self, status: PlayerStatus) -> usize {
        self.0.iter().filter(|slot| slot.status == status).count()
    }

    pub(crate) fn reset_tallies(&mut self) {
        for slot in &mut self.0 {
            slot.atom_tally = 0;
        }
    }

    /// First slot taking turns, scanning circularly from `start` (inclusive)
    pub fn first_active_from(&self, start: PlayerId) -> Option<PlayerId> {
        let mut id = start;
        for _ in 0..MAX_PLAYERS {
            if self[id].status.is_active() {
                return Some(id);
            }
            id = id.next();
        }
        None
    }
}

impl Index<PlayerId> for Players {
    type Output = PlayerSlot;

    fn index(&self, id: PlayerId) -> &PlayerSlot {
        &self.0[id.index()]
    }
}

impl IndexMut<PlayerId> for Players {
    fn index_mut(&mut self, id: PlayerId) -> &mut PlayerSlot {
        &mut self.0[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_bounds() {
        assert!(PlayerId::new(3).is_some());
        assert!(PlayerId::new(4).is_none());
        assert_eq!(PlayerId::ALL[3].next(), PlayerId::ALL[0]);
        assert_eq!(PlayerId::ALL[1].to_string(), "Player 2");
    }

    #[test]
    fn test_type_codes() {
        assert_eq!(PlayerKind::from_type_code(0), None);
        assert_eq!(PlayerKind::from_type_code(1), Some(PlayerKind::Human));
        assert_eq!(
            PlayerKind::from_type_code(3),
            Some(PlayerKind::Ai { difficulty: 2 })
        );
        assert_eq!(
            PlayerKind::from_type_code(200),
            Some(PlayerKind::Ai { difficulty: 3 })
        );
        for code in 0..=4 {
            assert_eq!(PlayerKind::type_code(PlayerKind::from_type_code(code)), code);
        }
    }

    #[test]
    fn test_status_ordering() {
        assert!(!PlayerStatus::NotPresent.is_active());
        assert!(!PlayerStatus::Lost.is_active());
        assert!(PlayerStatus::NotStarted.is_active());
        assert!(PlayerStatus::Playing.is_active());
    }

    #[test]
    fn test_first_active_wraps() {
        let mut players = Players::default();
        players[PlayerId::ALL[1]].status = PlayerStatus::Playing;
        assert_eq!(
            players.first_active_from(PlayerId::ALL[2]),
            Some(PlayerId::ALL[1])
        );
        assert_eq!(
            players.first_active_from(PlayerId::ALL[1]),
            Some(PlayerId::ALL[1])
        );
        players[PlayerId::ALL[1]].status = PlayerStatus::Lost;
        assert_eq!(players.first_active_from(PlayerId::ALL[0]), None);
    }
}
