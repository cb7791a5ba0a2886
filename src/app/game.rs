//! Game screen: runs one session (or the tutorial) and handles input

use serde::Serialize;

use super::{AppContext, Button, StateId};
use crate::consts::*;
use crate::sim::{
    GameEvent, GridError, PlayerId, PlayerKind, RandomAi, SessionSnapshot, SessionState,
    TickStatus, TilePos, Tutorial, tick,
};

/// Hold-to-repeat state for the tile selector
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SelectorRepeat {
    moving: bool,
    timer: f32,
    dx: i32,
    dy: i32,
}

impl SelectorRepeat {
    /// A direction was pressed
    pub fn press(&mut self, dx: i32, dy: i32) {
        if self.moving {
            self.timer = 0.0;
            self.dx += dx;
            self.dy += dy;
        } else {
            self.moving = true;
            self.timer = SELECTOR_REPEAT_DELAY - SELECTOR_INITIAL_DELAY;
            self.dx = dx;
            self.dy = dy;
        }
        self.settle();
    }

    /// A direction was released
    pub fn release(&mut self, dx: i32, dy: i32) {
        if !self.moving {
            return;
        }
        self.dx -= dx;
        self.dy -= dy;
        self.settle();
    }

    fn settle(&mut self) {
        self.dx = self.dx.clamp(-1, 1);
        self.dy = self.dy.clamp(-1, 1);
        if self.dx == 0 && self.dy == 0 {
            *self = Self::default();
        }
    }

    /// Returns the step to repeat when the hold timer fires
    pub fn advance(&mut self, dt: f32) -> Option<(i32, i32)> {
        if !self.moving {
            return None;
        }
        self.timer += dt;
        if self.timer >= SELECTOR_REPEAT_DELAY {
            self.timer = 0.0;
            Some((self.dx, self.dy))
        } else {
            None
        }
    }
}

/// What the game screen shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameView {
    pub snapshot: SessionSnapshot,
    /// Hidden while paused, after a win and while the tutorial runs
    pub selector: Option<TilePos>,
    pub paused: bool,
    pub elapsed_secs: u64,
    pub winner: Option<PlayerId>,
    pub tutorial_text: Option<&'static str>,
}

pub struct GameScreen {
    session: SessionState,
    ai: RandomAi,
    tutorial: Option<Tutorial>,
    selector: TilePos,
    repeat: SelectorRepeat,
    /// Game time in seconds
    elapsed: f32,
    paused: bool,
    /// Waiting for the board to settle before pausing
    pausing: bool,
    /// Already asked to go back to the menu
    leaving: bool,
}

impl GameScreen {
    /// Start a session from settings, restoring the save slot if present,
    /// or the tutorial session
    pub fn enter(ctx: &mut AppContext, tutorial: bool) -> Result<Self, GridError> {
        let seed = ctx.next_seed();
        let (session, tutorial) = if tutorial {
            let kinds = [Some(PlayerKind::Human); MAX_PLAYERS];
            let session = SessionState::new(
                usize::from(TUTORIAL_GRID_WIDTH),
                usize::from(TUTORIAL_GRID_HEIGHT),
                kinds,
                seed,
            )?;
            (session, Some(Tutorial::new()))
        } else {
            let settings = &ctx.settings;
            let session = SessionState::new(
                usize::from(settings.grid_width),
                usize::from(settings.grid_height),
                settings.player_kinds(),
                seed,
            )?;
            (session, None)
        };

        let mut screen = Self {
            session,
            ai: RandomAi::new(seed ^ 0x5eed),
            tutorial,
            selector: TilePos::new(0, 0),
            repeat: SelectorRepeat::default(),
            elapsed: 0.0,
            paused: false,
            pausing: false,
            leaving: false,
        };
        if screen.tutorial.is_none() && ctx.save_slot.exists() {
            if let Ok(elapsed) = ctx.save_slot.load(&mut screen.session) {
                screen.elapsed = elapsed as f32;
                ctx.show_message("Saved game loaded.", 3.0);
            }
        }
        screen.forward_events(ctx);
        Ok(screen)
    }

    pub fn is_tutorial(&self) -> bool {
        self.tutorial.is_some()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn selector(&self) -> TilePos {
        self.selector
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut SessionState {
        &mut self.session
    }

    fn tutorial_running(&self) -> bool {
        self.tutorial.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Screen to return to this same game (used by restart)
    fn state_id(&self) -> StateId {
        if self.is_tutorial() {
            StateId::Tutorial
        } else {
            StateId::Game
        }
    }

    /// Ask for the menu once; the game stops updating after that
    fn leave(&mut self, ctx: &mut AppContext) {
        if !self.leaving {
            self.leaving = true;
            ctx.request_transition(StateId::Menu);
        }
    }

    fn forward_events(&mut self, ctx: &mut AppContext) {
        for event in self.session.drain_events() {
            match event {
                GameEvent::Sound(effect) => ctx.audio.play(effect),
                GameEvent::Message { text, seconds } => ctx.show_message(&text, seconds),
            }
        }
    }

    fn move_selector(&mut self, dx: i32, dy: i32) {
        let w = self.session.grid().width() as i32;
        let h = self.session.grid().height() as i32;
        self.selector = TilePos::new(
            (self.selector.x + dx).rem_euclid(w),
            (self.selector.y + dy).rem_euclid(h),
        );
    }

    pub fn update(&mut self, ctx: &mut AppContext, dt: f32) {
        if self.leaving {
            return;
        }
        if self.session.total_player_count() < 2 {
            self.leave(ctx);
            return;
        }
        if self.session.winning_player().is_some() || self.paused {
            return;
        }
        if self.pausing {
            if self.session.is_idle() {
                ctx.message.clear();
                self.pausing = false;
                self.paused = true;
                log::info!("Game paused");
                return;
            }
            ctx.show_message("Pausing...", 1.0);
        }
        self.elapsed += dt;

        let mut blocked = false;
        if let Some(tutorial) = self.tutorial.as_mut() {
            blocked = tutorial.update(&mut self.session, dt);
            if tutorial.quit_requested() {
                blocked = true;
                self.leaving = true;
                ctx.request_transition(StateId::Menu);
            }
        }
        self.forward_events(ctx);
        if blocked {
            return;
        }

        let status = tick(&mut self.session, &mut self.ai, dt);
        self.forward_events(ctx);
        if let TickStatus::Aborted(reason) = status {
            log::warn!("Leaving aborted game: {}", reason);
            self.leave(ctx);
        }

        if let Some((dx, dy)) = self.repeat.advance(dt) {
            self.move_selector(dx, dy);
        }
    }

    pub fn button_down(&mut self, ctx: &mut AppContext, button: Button) {
        if let Some(tutorial) = self.tutorial.as_mut() {
            if button == Button::Start {
                ctx.request_transition(StateId::Menu);
                return;
            }
            if tutorial.dismiss() {
                return;
            }
        }
        if self.session.winning_player().is_some() {
            ctx.request_transition(StateId::Menu);
            return;
        }
        if self.paused {
            self.paused_button(ctx, button);
            return;
        }

        if let Some((dx, dy)) = button.direction() {
            self.move_selector(dx, dy);
            self.repeat.press(dx, dy);
            return;
        }
        match button {
            Button::A | Button::B | Button::X | Button::Y => {
                self.session.clicked_tile(self.selector, false);
                self.forward_events(ctx);
            }
            Button::Start => {
                self.pausing = !self.pausing;
                if !self.pausing {
                    ctx.message.clear();
                }
            }
            _ => {}
        }
    }

    fn paused_button(&mut self, ctx: &mut AppContext, button: Button) {
        match button {
            Button::A => match ctx.save_slot.save(&self.session, self.elapsed as u64) {
                Ok(()) => {
                    ctx.show_message("Game saved successfully!", 3.0);
                    ctx.request_transition(StateId::Menu);
                }
                Err(e) => {
                    log::error!("Couldn't save the game: {}", e);
                    ctx.show_message("Couldn't save the game!", 3.0);
                }
            },
            Button::B | Button::Start => {
                self.paused = false;
                log::info!("Game resumed");
            }
            Button::X => ctx.request_transition(StateId::Menu),
            Button::Y => ctx.request_transition(self.state_id()),
            _ => {}
        }
    }

    pub fn button_up(&mut self, button: Button) {
        if self.tutorial_running() {
            return;
        }
        if let Some((dx, dy)) = button.direction() {
            self.repeat.release(dx, dy);
        }
    }

    pub fn view(&self) -> GameView {
        let winner = self.session.winning_player();
        let selector_visible = !self.paused && winner.is_none() && !self.tutorial_running();
        GameView {
            snapshot: self.session.snapshot(),
            selector: selector_visible.then_some(self.selector),
            paused: self.paused,
            elapsed_secs: self.elapsed as u64,
            winner,
            tutorial_text: self.tutorial.as_ref().and_then(Tutorial::text),
        }
    }

    pub fn exit(self, ctx: &mut AppContext) {
        log::info!(
            "Game closed after {}s, winner: {:?}",
            self.elapsed as u64,
            self.session.winning_player()
        );
        if let Some(tutorial) = &self.tutorial {
            log::debug!("Tutorial finished: {}", tutorial.is_finished());
        }
        if self.pausing {
            ctx.message.clear();
        }
    }
}
