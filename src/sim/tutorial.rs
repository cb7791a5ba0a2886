//! Scripted tutorial driver
//!
//! Replays a fixed list of events against a live session. The next event
//! runs only once the session is idle, no wait is pending and no textbox
//! is on screen. Player numbers in events are 1-based; 0 means the current
//! player.

use super::grid::TilePos;
use super::player::{PlayerId, PlayerKind};
use super::state::SessionState;

/// One scripted step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorialEvent {
    /// Reassign every slot from settings type codes
    PlayerTypes([u8; 4]),
    /// Show text until dismissed
    Textbox(&'static str),
    CurrentPlayer(u8),
    /// Place an atom as if `player` clicked
    PutAtom { player: u8, x: i32, y: i32 },
    /// Overwrite a tile without explosions
    SetAtoms { player: u8, x: i32, y: i32, count: u32 },
    Wait { millis: u32 },
    /// Empty the grid and put present players back to "not started"
    Clear,
    /// End the tutorial and leave the game
    Quit,
}

use TutorialEvent::*;

/// The built-in rules walkthrough, played on a 10x6 grid
pub const TUTORIAL_SCRIPT: &[TutorialEvent] = &[
    PlayerTypes([1, 1, 1, 1]),
    Textbox(
        "Welcome to the KleleAtoms tutorial! It will teach you all the game rules.\n\nYou can always press START button to quit the tutorial.\n\nPress any other button to continue...",
    ),
    Textbox("Each player can place one atom per turn on empty or their own tiles."),
    SetAtoms { player: 3, x: 3, y: 1, count: 1 },
    SetAtoms { player: 4, x: 4, y: 1, count: 2 },
    Wait { millis: 500 },
    PutAtom { player: 1, x: 1, y: 1 },
    CurrentPlayer(2),
    Wait { millis: 500 },
    PutAtom { player: 2, x: 2, y: 1 },
    CurrentPlayer(3),
    Wait { millis: 500 },
    PutAtom { player: 3, x: 3, y: 1 },
    CurrentPlayer(4),
    Wait { millis: 500 },
    PutAtom { player: 4, x: 4, y: 1 },
    CurrentPlayer(1),
    Wait { millis: 1000 },
    Textbox(
        "The atoms will explode if too many are present on one tile.\n\nAtoms in the corners explode if 2 or more are present.",
    ),
    Clear,
    SetAtoms { player: 1, x: 0, y: 0, count: 1 },
    Wait { millis: 500 },
    PutAtom { player: 1, x: 0, y: 0 },
    Wait { millis: 1000 },
    Textbox("On the sides they explode if 3 or more are present."),
    Clear,
    SetAtoms { player: 2, x: 0, y: 1, count: 2 },
    Wait { millis: 500 },
    PutAtom { player: 2, x: 0, y: 1 },
    Wait { millis: 1000 },
    Textbox("Anywhere else they only explode if 4 or more are present."),
    Clear,
    SetAtoms { player: 3, x: 1, y: 1, count: 3 },
    Wait { millis: 500 },
    PutAtom { player: 3, x: 1, y: 1 },
    Wait { millis: 1000 },
    Textbox("Atom explosions can make nearby atoms explode, causing chain\nreactions."),
    Clear,
    SetAtoms { player: 4, x: 1, y: 1, count: 3 },
    SetAtoms { player: 4, x: 0, y: 0, count: 1 },
    SetAtoms { player: 4, x: 1, y: 0, count: 2 },
    SetAtoms { player: 4, x: 0, y: 1, count: 2 },
    Wait { millis: 500 },
    PutAtom { player: 4, x: 1, y: 1 },
    Wait { millis: 1000 },
    Textbox("Exploding atoms turn nearby enemy atoms into current player's atoms."),
    Clear,
    CurrentPlayer(1),
    SetAtoms { player: 1, x: 1, y: 1, count: 3 },
    SetAtoms { player: 2, x: 0, y: 1, count: 1 },
    SetAtoms { player: 3, x: 1, y: 0, count: 1 },
    SetAtoms { player: 4, x: 2, y: 1, count: 1 },
    SetAtoms { player: 2, x: 1, y: 2, count: 1 },
    SetAtoms { player: 3, x: 4, y: 4, count: 1 },
    Wait { millis: 500 },
    PutAtom { player: 1, x: 1, y: 1 },
    Wait { millis: 1000 },
    Textbox(
        "If the player loses all their atoms, they're out.\n\nThe last standing player wins the game.\n\nThat's it!",
    ),
    Quit,
];

#[derive(Debug, Clone)]
pub struct Tutorial {
    script: &'static [TutorialEvent],
    next: usize,
    text: Option<&'static str>,
    /// Seconds left on the current wait
    wait: f32,
    finished: bool,
    quit_requested: bool,
}

impl Default for Tutorial {
    fn default() -> Self {
        Self::new()
    }
}

impl Tutorial {
    pub fn new() -> Self {
        Self::with_script(TUTORIAL_SCRIPT)
    }

    pub fn with_script(script: &'static [TutorialEvent]) -> Self {
        Self {
            script,
            next: 0,
            text: None,
            wait: 0.0,
            finished: false,
            quit_requested: false,
        }
    }

    /// Text currently on screen
    pub fn text(&self) -> Option<&'static str> {
        self.text
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The script asked to leave the game
    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Run events while the session allows it.
    ///
    /// Returns true while a textbox is shown, in which case the caller must
    /// not tick the session.
    pub fn update(&mut self, state: &mut SessionState, dt: f32) -> bool {
        if self.finished {
            return false;
        }
        self.wait = (self.wait - dt).max(0.0);
        while state.is_idle() && self.text.is_none() {
            if self.wait > 0.0 {
                break;
            }
            if !self.run_next(state) {
                return false;
            }
        }
        self.text.is_some()
    }

    /// Close the textbox; returns false once the tutorial is over
    pub fn dismiss(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.text = None;
        true
    }

    fn slot(state: &SessionState, player: u8) -> Option<PlayerId> {
        match player {
            0 => state.current_player(),
            n => PlayerId::new(usize::from(n) - 1),
        }
    }

    /// Execute one event; returns false when the script is exhausted
    fn run_next(&mut self, state: &mut SessionState) -> bool {
        let Some(&event) = self.script.get(self.next) else {
            self.finished = true;
            return false;
        };
        self.next += 1;
        log::debug!("Tutorial event {}: {:?}", self.next, event);
        match event {
            PlayerTypes(codes) => state.set_players(codes.map(PlayerKind::from_type_code)),
            Textbox(text) => self.text = Some(text),
            CurrentPlayer(player) => match Self::slot(state, player) {
                Some(id) => state.set_current_player(Some(id)),
                None => log::error!("Tutorial: invalid player {}", player),
            },
            PutAtom { player, x, y } => {
                if let Some(id) = Self::slot(state, player) {
                    state.set_current_player(Some(id));
                }
                state.clicked_tile(TilePos::new(x, y), true);
            }
            SetAtoms { player, x, y, count } => {
                let owner = Self::slot(state, player);
                state.set_tile_direct(TilePos::new(x, y), owner, count);
            }
            Wait { millis } => self.wait = millis as f32 / 1000.0,
            Clear => state.clear_grid(),
            Quit => {
                log::info!("Tutorial finished");
                self.finished = true;
                self.quit_requested = true;
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{TUTORIAL_GRID_HEIGHT, TUTORIAL_GRID_WIDTH};
    use crate::sim::ai::AiController;
    use crate::sim::player::PlayerStatus;
    use crate::sim::state::TickStatus;
    use crate::sim::tick::tick;

    struct Idle;

    impl AiController for Idle {
        fn select_move(&mut self, _session: &SessionState) -> Option<TilePos> {
            None
        }
    }

    fn tutorial_session() -> SessionState {
        let human = Some(PlayerKind::Human);
        SessionState::new(
            usize::from(TUTORIAL_GRID_WIDTH),
            usize::from(TUTORIAL_GRID_HEIGHT),
            [human; 4],
            11,
        )
        .unwrap()
    }

    #[test]
    fn test_textbox_blocks_until_dismissed() {
        const SCRIPT: &[TutorialEvent] = &[
            Textbox("hello"),
            SetAtoms { player: 2, x: 0, y: 0, count: 1 },
        ];
        let mut state = tutorial_session();
        let mut tut = Tutorial::with_script(SCRIPT);
        assert!(tut.update(&mut state, 0.016));
        assert_eq!(tut.text(), Some("hello"));
        assert!(tut.update(&mut state, 0.016));
        assert!(state.grid().tile(TilePos::new(0, 0)).unwrap().is_empty());

        assert!(tut.dismiss());
        assert!(!tut.update(&mut state, 0.016));
        let tile = state.grid().tile(TilePos::new(0, 0)).unwrap();
        assert_eq!(tile.owner(), PlayerId::new(1));
        assert!(tut.is_finished());
        assert!(!tut.quit_requested());
    }

    #[test]
    fn test_wait_holds_next_event() {
        const SCRIPT: &[TutorialEvent] = &[
            Wait { millis: 500 },
            SetAtoms { player: 0, x: 2, y: 2, count: 2 },
        ];
        let mut state = tutorial_session();
        let mut tut = Tutorial::with_script(SCRIPT);
        tut.update(&mut state, 0.0);
        tut.update(&mut state, 0.3);
        assert!(state.grid().tile(TilePos::new(2, 2)).unwrap().is_empty());
        tut.update(&mut state, 0.3);
        let tile = state.grid().tile(TilePos::new(2, 2)).unwrap();
        assert_eq!(tile.atom_count(), 2);
        // Player 0 means the current player
        assert_eq!(tile.owner(), state.current_player());
    }

    #[test]
    fn test_put_atom_switches_player() {
        const SCRIPT: &[TutorialEvent] = &[PutAtom { player: 3, x: 5, y: 3 }];
        let mut state = tutorial_session();
        let mut tut = Tutorial::with_script(SCRIPT);
        tut.update(&mut state, 0.016);
        let tile = state.grid().tile(TilePos::new(5, 3)).unwrap();
        assert_eq!(tile.owner(), PlayerId::new(2));
        assert_eq!(state.players()[PlayerId::ALL[2]].status, PlayerStatus::Playing);
        // Placement without explosion passes the turn on
        assert_eq!(state.current_player(), PlayerId::new(3));
    }

    #[test]
    fn test_full_script_runs_to_quit() {
        let mut state = tutorial_session();
        let mut tut = Tutorial::new();
        let mut ai = Idle;
        let mut textboxes = 0;
        let dt = 1.0 / 60.0;
        for _ in 0..20_000 {
            if tut.update(&mut state, dt) {
                textboxes += 1;
                tut.dismiss();
                continue;
            }
            if tut.is_finished() {
                break;
            }
            assert_eq!(tick(&mut state, &mut ai, dt), TickStatus::Running);
        }
        assert!(tut.is_finished());
        assert!(tut.quit_requested());
        assert_eq!(textboxes, 8);
        assert!(state.explosion_count() > 0);
        assert_eq!(state.winning_player(), None);
        assert!(state.abort_reason().is_none());
    }
}
