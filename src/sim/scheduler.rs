//! Explosion scheduler: atom placement and chain-reaction resolution
//!
//! A placement that makes its tile critical flags it as the pending
//! explosion and pushes it on the stack. Each idle tick then either fires
//! the pending explosion or walks the stack looking for the next critical
//! neighbor, backtracking until the stack drains and the turn passes on.

use super::grid::TilePos;
use super::player::{PlayerId, PlayerStatus};
use super::state::{AbortReason, GameEvent, SessionState};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Chain-length speedup applied to explosion timers and atom movement
pub fn chain_speed(explosion_count: u32) -> f32 {
    (explosion_count.min(EXPLOSION_SATURATION) as f32 / 10.0).max(1.0)
}

impl SessionState {
    /// Place one atom for the current player.
    ///
    /// Silently rejected (returns false) when the tile belongs to someone
    /// else, a human clicks for an AI player, fewer than two players are
    /// active, or anything is still animating or exploding.
    pub fn clicked_tile(&mut self, pos: TilePos, is_ai_move: bool) -> bool {
        if self.winning_player.is_some() || self.abort.is_some() {
            return false;
        }
        let Some(current) = self.current_player else {
            return false;
        };
        let Some(tile) = self.grid.tile(pos) else {
            log::error!("clicked_tile: invalid position ({}, {})", pos.x, pos.y);
            return false;
        };
        if tile.owner().is_some_and(|owner| owner != current) {
            return false;
        }
        if !is_ai_move && self.players[current].kind.is_ai() {
            return false;
        }
        if self.current_player_count < 2 || !self.is_idle() {
            return false;
        }

        self.explosion_count = 0;
        self.players[current].status = PlayerStatus::Playing;
        self.emit(GameEvent::Sound(SoundEffect::Place));
        self.prepare_new_atoms(pos, current);
        true
    }

    fn prepare_new_atoms(&mut self, pos: TilePos, player: PlayerId) {
        let slot = &mut self.players[player];
        slot.atom_tally = slot.atom_tally.max(1);
        if self.put_atoms(pos, player, 1) {
            self.pending_explosion = Some(pos);
            self.push_pending(pos);
        } else {
            self.next_player();
        }
    }

    /// Add atoms to a tile for `owner`; returns true if the tile is now critical
    pub(crate) fn put_atoms(&mut self, pos: TilePos, owner: PlayerId, count: u32) -> bool {
        let Some(tile) = self.grid.tile_mut(pos) else {
            log::error!("put_atoms: invalid position ({}, {})", pos.x, pos.y);
            return false;
        };
        if tile.add_atoms(owner, count, &mut self.rng) {
            self.anim_playing = true;
        }
        tile.is_critical()
    }

    fn push_pending(&mut self, pos: TilePos) {
        if let Err(overflow) = self.stack.push(pos) {
            self.abort_session(AbortReason::StackOverflow(overflow));
        }
    }

    /// Blow up a tile: its atoms go to in-bounds neighbors in fixed order,
    /// with the excess over critical mass riding on the first one.
    pub(crate) fn explode(&mut self, pos: TilePos) {
        self.explosion_count += 1;
        let duration = BASE_EXPLOSION_TIME / chain_speed(self.explosion_count);
        let Some(tile) = self.grid.tile_mut(pos) else {
            log::error!("explode: invalid position ({}, {})", pos.x, pos.y);
            return;
        };
        tile.start_explosion(duration);
        let Some(owner) = tile.owner() else {
            tile.clear_atoms();
            return;
        };
        let mut extra = tile.atom_count().saturating_sub(tile.critical_mass());
        tile.clear_atoms();

        let neighbors: Vec<TilePos> = self.grid.neighbors(pos).collect();
        for neighbor in neighbors {
            self.put_atoms(neighbor, owner, extra + 1);
            extra = 0;
        }
        if self.explosion_count < EXPLOSION_SATURATION {
            self.emit(GameEvent::Sound(SoundEffect::Explode));
        }
    }

    /// First critical neighbor of `pos` in neighbor order
    pub fn critical_neighbor(&self, pos: TilePos) -> Option<TilePos> {
        self.grid
            .neighbors(pos)
            .find(|n| self.grid.tile(*n).is_some_and(|t| t.is_critical()))
    }

    /// One idle step of chain resolution.
    ///
    /// Fires the pending explosion if there is one. Otherwise examines up to
    /// `MAX_STACK_POPS_PER_TICK` stack entries: a critical neighbor of the top
    /// becomes the next pending explosion, an entry without one is popped,
    /// and draining the stack ends the turn.
    pub(crate) fn resolve_chain(&mut self) {
        if let Some(pos) = self.pending_explosion.take() {
            self.explode(pos);
            return;
        }
        let pops = self.stack.len().min(MAX_STACK_POPS_PER_TICK);
        for _ in 0..pops {
            let Some(top) = self.stack.top() else {
                break;
            };
            if let Some(next) = self.critical_neighbor(top) {
                self.pending_explosion = Some(next);
                self.push_pending(next);
                break;
            }
            self.stack.pop();
            if self.stack.is_empty() {
                self.next_player();
                break;
            }
        }
    }
}
