//! Turn engine: rotation, loss detection and victory

use super::player::{PlayerId, PlayerStatus};
use super::state::SessionState;

impl SessionState {
    /// Hand the turn to the next slot that still takes turns.
    ///
    /// Does nothing once fewer than two players remain.
    pub(crate) fn next_player(&mut self) {
        self.turn_time = 0.0;
        if self.current_player_count < 2 {
            return;
        }
        let Some(current) = self.current_player else {
            return;
        };
        self.current_player = self.players.first_active_from(current.next());
        log::debug!("Turn passed to {:?}", self.current_player);
    }

    /// Mark every `Playing` slot with no atoms left as `Lost`
    pub(crate) fn detect_losses(&mut self) {
        for id in PlayerId::ALL {
            let slot = &mut self.players[id];
            if slot.status == PlayerStatus::Playing && slot.atom_tally == 0 {
                slot.status = PlayerStatus::Lost;
                self.current_player_count = self.current_player_count.saturating_sub(1);
                log::info!("{} lost", id);
            }
        }
    }

    /// Declare the last `Playing` slot the winner once fewer than two remain
    pub(crate) fn check_victory(&mut self) -> Option<PlayerId> {
        if self.current_player_count >= 2 {
            return None;
        }
        let winner = self
            .players
            .iter()
            .find(|(_, slot)| slot.status == PlayerStatus::Playing)
            .map(|(id, _)| id)?;
        if self.winning_player.is_none() {
            log::info!("{} won", winner);
        }
        self.winning_player = Some(winner);
        Some(winner)
    }

    /// If the current player just dropped out, move forward to the next
    /// slot still taking turns (the current slot itself counts).
    pub(crate) fn realign_current_player(&mut self) {
        if let Some(current) = self.current_player {
            self.current_player = self.players.first_active_from(current);
        }
    }
}
