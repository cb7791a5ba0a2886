//! Computer opponents
//!
//! The tick asks an [`AiController`] for a move only when nothing is
//! animating or exploding and the current slot is AI-controlled.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::grid::TilePos;
use super::player::PlayerKind;
use super::state::SessionState;
use crate::consts::AI_MOVE_DELAY;

/// Move selection for AI-controlled slots
pub trait AiController {
    /// Pick a tile for the current player, or `None` to wait for a later tick
    fn select_move(&mut self, session: &SessionState) -> Option<TilePos>;
}

/// Seconds an AI of `difficulty` waits into its turn before moving
pub fn move_delay(difficulty: u8) -> f32 {
    AI_MOVE_DELAY / f32::from(difficulty.max(1))
}

/// Picks random legal tiles; difficulty 2 and up prefer tiles one atom
/// short of exploding.
#[derive(Debug, Clone)]
pub struct RandomAi {
    rng: Pcg32,
}

impl RandomAi {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    fn pick(&mut self, tiles: &[TilePos]) -> Option<TilePos> {
        if tiles.is_empty() {
            return None;
        }
        Some(tiles[self.rng.random_range(0..tiles.len())])
    }
}

impl AiController for RandomAi {
    fn select_move(&mut self, session: &SessionState) -> Option<TilePos> {
        let current = session.current_player()?;
        let PlayerKind::Ai { difficulty } = session.players()[current].kind else {
            return None;
        };
        if session.turn_time() < move_delay(difficulty) {
            return None;
        }

        let legal: Vec<_> = session
            .grid()
            .tiles()
            .filter(|(_, tile)| tile.owner().is_none_or(|owner| owner == current))
            .collect();
        if difficulty >= 2 {
            let primed: Vec<TilePos> = legal
                .iter()
                .filter(|(_, tile)| !tile.is_empty() && tile.atom_count() + 1 >= tile.critical_mass())
                .map(|(pos, _)| *pos)
                .collect();
            if let Some(pos) = self.pick(&primed) {
                return Some(pos);
            }
        }
        let positions: Vec<TilePos> = legal.into_iter().map(|(pos, _)| pos).collect();
        self.pick(&positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::player::PlayerId;

    const H: Option<PlayerKind> = Some(PlayerKind::Human);

    fn ai(difficulty: u8) -> Option<PlayerKind> {
        Some(PlayerKind::Ai { difficulty })
    }

    #[test]
    fn test_waits_for_delay() {
        let mut state = SessionState::new(5, 4, [ai(1), H, None, None], 1).unwrap();
        let mut bot = RandomAi::new(9);
        assert_eq!(bot.select_move(&state), None);
        state.turn_time = move_delay(1);
        assert!(bot.select_move(&state).is_some());
    }

    #[test]
    fn test_never_picks_enemy_tiles() {
        let mut state = SessionState::new(2, 2, [ai(1), H, None, None], 1).unwrap();
        let enemy = PlayerId::new(1);
        state.set_tile_direct(TilePos::new(0, 0), enemy, 1);
        state.set_tile_direct(TilePos::new(0, 1), enemy, 1);
        state.set_tile_direct(TilePos::new(1, 0), enemy, 1);
        state.turn_time = 10.0;
        let mut bot = RandomAi::new(3);
        for _ in 0..20 {
            assert_eq!(bot.select_move(&state), Some(TilePos::new(1, 1)));
        }
    }

    #[test]
    fn test_harder_ai_prefers_primed_tiles() {
        let mut state = SessionState::new(5, 4, [ai(3), H, None, None], 1).unwrap();
        state.set_tile_direct(TilePos::new(2, 2), PlayerId::new(0), 3);
        state.turn_time = 10.0;
        let mut bot = RandomAi::new(5);
        for _ in 0..20 {
            assert_eq!(bot.select_move(&state), Some(TilePos::new(2, 2)));
        }
    }

    #[test]
    fn test_ignores_human_turns() {
        let mut state = SessionState::new(5, 4, [H, ai(2), None, None], 1).unwrap();
        state.turn_time = 10.0;
        assert_eq!(RandomAi::new(1).select_move(&state), None);
    }
}
