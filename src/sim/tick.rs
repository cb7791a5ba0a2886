//! Per-frame session tick
//!
//! Advances animation and explosion timers, recounts atoms, applies loss
//! and victory rules, then either resolves one step of a chain reaction
//! or lets an AI player move.

use super::ai::AiController;
use super::scheduler::chain_speed;
use super::state::{AbortReason, SessionState, TickStatus};
use crate::consts::*;

impl SessionState {
    /// Step timers and atom animation by `dt`, recomputing per-slot tallies.
    ///
    /// Exploding tiles are left out of the tallies until their timer runs out.
    pub(crate) fn update_tiles(&mut self, dt: f32) {
        self.anim_playing = false;
        self.players.reset_tallies();
        let max_step = BASE_ATOM_SPEED * dt * chain_speed(self.explosion_count);
        for tile in self.grid.tiles_mut() {
            if tile.is_exploding() {
                if tile.tick_explosion(dt) {
                    self.anim_playing = true;
                }
            } else if let Some(owner) = tile.owner() {
                self.players[owner].atom_tally += tile.atom_count();
                if tile.step_atoms(max_step) {
                    self.anim_playing = true;
                }
            }
        }
    }

    fn status(&self) -> TickStatus {
        if let Some(reason) = &self.abort {
            TickStatus::Aborted(reason.clone())
        } else if let Some(winner) = self.winning_player {
            TickStatus::Won(winner)
        } else {
            TickStatus::Running
        }
    }
}

/// Advance the session by `dt` seconds
pub fn tick(state: &mut SessionState, ai: &mut dyn AiController, dt: f32) -> TickStatus {
    let status = state.status();
    if status != TickStatus::Running {
        return status;
    }

    if state.explosion_count as usize >= ATOM_STACK_SIZE {
        state.abort_session(AbortReason::RunawayChain {
            limit: ATOM_STACK_SIZE,
        });
        return state.status();
    }

    state.turn_time += dt;
    state.update_tiles(dt);
    state.detect_losses();
    if let Some(winner) = state.check_victory() {
        return TickStatus::Won(winner);
    }
    state.realign_current_player();

    if !state.anim_playing {
        if state.pending_explosion.is_some() || !state.stack.is_empty() {
            state.resolve_chain();
        } else if state.current_is_ai() {
            if let Some(pos) = ai.select_move(state) {
                state.clicked_tile(pos, true);
            }
        }
    }
    state.status()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::TilePos;
    use crate::sim::player::{PlayerId, PlayerKind, PlayerStatus};
    use crate::sim::state::GameEvent;

    const H: Option<PlayerKind> = Some(PlayerKind::Human);
    const AI: Option<PlayerKind> = Some(PlayerKind::Ai { difficulty: 1 });

    fn p(i: usize) -> PlayerId {
        PlayerId::new(i).unwrap()
    }

    /// Plays a fixed list of moves, one per call
    struct Scripted {
        moves: Vec<TilePos>,
        calls: usize,
    }

    impl Scripted {
        fn new(mut moves: Vec<TilePos>) -> Self {
            moves.reverse();
            Self { moves, calls: 0 }
        }
    }

    impl AiController for Scripted {
        fn select_move(&mut self, _session: &SessionState) -> Option<TilePos> {
            self.calls += 1;
            self.moves.pop()
        }
    }

    fn run(state: &mut SessionState, ai: &mut dyn AiController, frames: usize) -> TickStatus {
        let mut status = TickStatus::Running;
        for _ in 0..frames {
            status = tick(state, ai, 1.0 / 60.0);
            if status != TickStatus::Running {
                break;
            }
        }
        status
    }

    #[test]
    fn test_ai_moves_when_idle() {
        let mut state = SessionState::new(5, 4, [AI, H, None, None], 1).unwrap();
        let mut ai = Scripted::new(vec![TilePos::new(2, 2)]);
        assert_eq!(tick(&mut state, &mut ai, 0.016), TickStatus::Running);
        assert_eq!(ai.calls, 1);
        assert_eq!(
            state.grid().tile(TilePos::new(2, 2)).unwrap().atom_count(),
            1
        );
        assert_eq!(state.current_player(), Some(p(1)));

        // Human turn: the AI is not consulted
        tick(&mut state, &mut ai, 0.016);
        assert_eq!(ai.calls, 1);
    }

    #[test]
    fn test_ai_not_asked_during_animation() {
        let mut state = SessionState::new(5, 4, [AI, H, None, None], 1).unwrap();
        state.set_tile_direct(TilePos::new(2, 2), Some(p(0)), 1);
        state.grid.tile_mut(TilePos::new(2, 2)).unwrap().add_atoms(p(0), 1, &mut state.rng);
        let mut ai = Scripted::new(vec![]);
        tick(&mut state, &mut ai, 0.01);
        assert!(state.is_animating());
        assert_eq!(ai.calls, 0);
    }

    #[test]
    fn test_tally_and_loss_detection() {
        let mut state = SessionState::new(5, 4, [H, H, None, None], 1).unwrap();
        state.players[p(0)].status = PlayerStatus::Playing;
        state.players[p(1)].status = PlayerStatus::Playing;
        state.set_tile_direct(TilePos::new(0, 0), Some(p(0)), 1);
        state.set_tile_direct(TilePos::new(3, 3), Some(p(0)), 2);
        let mut ai = Scripted::new(vec![]);

        assert_eq!(tick(&mut state, &mut ai, 0.016), TickStatus::Won(p(0)));
        assert_eq!(state.players()[p(0)].atom_tally, 3);
        assert_eq!(state.players()[p(1)].status, PlayerStatus::Lost);
        assert_eq!(state.current_player_count(), 1);
    }

    #[test]
    fn test_terminal_tick_is_noop() {
        let mut state = SessionState::new(5, 4, [H, H, None, None], 1).unwrap();
        state.players[p(1)].status = PlayerStatus::Playing;
        state.set_tile_direct(TilePos::new(1, 1), Some(p(1)), 1);
        state.current_player_count = 1;
        let mut ai = Scripted::new(vec![]);
        assert_eq!(tick(&mut state, &mut ai, 0.016), TickStatus::Won(p(1)));

        let before = state.grid().clone();
        let turn_time = state.turn_time();
        assert_eq!(tick(&mut state, &mut ai, 0.016), TickStatus::Won(p(1)));
        assert_eq!(state.grid(), &before);
        assert_eq!(state.turn_time(), turn_time);
        assert!(!state.clicked_tile(TilePos::new(0, 0), false));
    }

    #[test]
    fn test_current_player_realigned_after_loss() {
        let mut state = SessionState::new(5, 4, [H, H, H, None], 1).unwrap();
        for i in 0..3 {
            state.players[p(i)].status = PlayerStatus::Playing;
        }
        state.set_tile_direct(TilePos::new(0, 0), Some(p(0)), 1);
        state.set_tile_direct(TilePos::new(4, 3), Some(p(2)), 1);
        state.current_player = Some(p(1));
        let mut ai = Scripted::new(vec![]);
        assert_eq!(tick(&mut state, &mut ai, 0.016), TickStatus::Running);
        assert_eq!(state.players()[p(1)].status, PlayerStatus::Lost);
        assert_eq!(state.current_player(), Some(p(2)));
    }

    #[test]
    fn test_full_turn_with_chain() {
        let mut state = SessionState::new(5, 4, [H, H, None, None], 1).unwrap();
        state.set_tile_direct(TilePos::new(0, 0), Some(p(0)), 1);
        state.set_tile_direct(TilePos::new(4, 3), Some(p(1)), 1);
        state.players[p(1)].status = PlayerStatus::Playing;
        assert!(state.clicked_tile(TilePos::new(0, 0), false));

        let mut ai = Scripted::new(vec![]);
        assert_eq!(run(&mut state, &mut ai, 600), TickStatus::Running);
        assert!(state.is_idle());
        assert_eq!(state.current_player(), Some(p(1)));
        assert_eq!(state.explosion_count(), 1);
        assert_eq!(
            state.grid().tile(TilePos::new(0, 0)).unwrap().explode_timer(),
            0.0
        );
    }

    #[test]
    fn test_runaway_chain_aborts() {
        let mut state = SessionState::new(3, 3, [H, H, None, None], 1).unwrap();
        for pos in state.grid().positions().collect::<Vec<_>>() {
            let crit = state.grid().tile(pos).unwrap().critical_mass();
            state.set_tile_direct(pos, Some(p(0)), crit - 1);
        }
        assert!(state.clicked_tile(TilePos::new(1, 1), false));
        state.drain_events();

        let mut ai = Scripted::new(vec![]);
        let mut status = TickStatus::Running;
        for _ in 0..200_000 {
            status = tick(&mut state, &mut ai, 1.0);
            if status != TickStatus::Running {
                break;
            }
        }
        assert_eq!(
            status,
            TickStatus::Aborted(AbortReason::RunawayChain {
                limit: ATOM_STACK_SIZE
            })
        );
        assert_eq!(tick(&mut state, &mut ai, 1.0), status);
        assert!(state.events().contains(&GameEvent::Message {
            text: "More than 5000 simultaneous explosions! Stopping...".to_string(),
            seconds: 4.0,
        }));
    }
}
