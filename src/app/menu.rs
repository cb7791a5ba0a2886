//! Main menu: start/tutorial buttons plus the settings grid

use serde::Serialize;

use super::{AppContext, Button, StateId};
use crate::audio::SoundEffect;
use crate::consts::{MENU_REPEAT_DELAY, MENU_REPEAT_INITIAL_DELAY};
use crate::settings::PLAYER_TYPE_NAMES;

const MENU_COLUMNS: usize = 4;
const MENU_ROWS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MenuItem {
    Tutorial,
    /// Starts a new game, or loads the save if there is one
    Start,
    /// Player slot type selector
    PlayerType(usize),
    GridWidth,
    GridHeight,
}

/// Menu layout, row by row
const MENU_LAYOUT: [[MenuItem; MENU_COLUMNS]; MENU_ROWS] = [
    [
        MenuItem::Tutorial,
        MenuItem::Start,
        MenuItem::PlayerType(0),
        MenuItem::PlayerType(1),
    ],
    [
        MenuItem::GridWidth,
        MenuItem::GridHeight,
        MenuItem::PlayerType(2),
        MenuItem::PlayerType(3),
    ],
];

impl MenuItem {
    /// Items that change a setting repeat while their button is held
    fn repeats(self) -> bool {
        !matches!(self, MenuItem::Tutorial | MenuItem::Start)
    }
}

/// What the menu shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuView {
    pub layout: [[MenuItem; MENU_COLUMNS]; MENU_ROWS],
    pub selected: MenuItem,
    pub description: String,
    pub grid_width: u8,
    pub grid_height: u8,
    pub player_types: [u8; 4],
    pub save_present: bool,
}

#[derive(Debug, Clone)]
pub struct MenuScreen {
    column: usize,
    row: usize,
    /// Button being held for repeat, with its timer
    held: Option<(Button, f32)>,
}

impl MenuScreen {
    pub fn enter(ctx: &mut AppContext) -> Self {
        log::debug!("Menu opened, save present: {}", ctx.save_slot.exists());
        Self {
            column: 1,
            row: 0,
            held: None,
        }
    }

    pub fn selected(&self) -> MenuItem {
        MENU_LAYOUT[self.row][self.column]
    }

    pub fn update(&mut self, ctx: &mut AppContext, dt: f32) {
        let Some((button, timer)) = self.held.as_mut() else {
            return;
        };
        *timer += dt;
        if *timer >= MENU_REPEAT_DELAY {
            *timer = 0.0;
            let step = step_for(*button);
            self.activate(ctx, step);
        }
    }

    pub fn button_down(&mut self, ctx: &mut AppContext, button: Button) {
        if let Some((dx, dy)) = button.direction() {
            self.column = wrap(self.column, dx, MENU_COLUMNS);
            self.row = wrap(self.row, dy, MENU_ROWS);
            self.held = None;
            return;
        }
        if self.held.is_some_and(|(held, _)| held == button) {
            return;
        }
        ctx.audio.play(SoundEffect::Click);
        self.activate(ctx, step_for(button));
        self.held = self
            .selected()
            .repeats()
            .then_some((button, MENU_REPEAT_DELAY - MENU_REPEAT_INITIAL_DELAY));
    }

    pub fn button_up(&mut self, button: Button) {
        if self.held.is_some_and(|(held, _)| held == button) {
            self.held = None;
        }
    }

    fn activate(&mut self, ctx: &mut AppContext, step: i8) {
        match self.selected() {
            MenuItem::Tutorial => ctx.request_transition(StateId::Tutorial),
            MenuItem::Start => ctx.request_transition(StateId::Game),
            MenuItem::PlayerType(slot) => ctx.settings.cycle_player_type(slot, step),
            MenuItem::GridWidth => ctx.settings.cycle_grid_width(step),
            MenuItem::GridHeight => ctx.settings.cycle_grid_height(step),
        }
    }

    fn description(&self, ctx: &AppContext) -> String {
        match self.selected() {
            MenuItem::Tutorial => "Start the tutorial.".to_string(),
            MenuItem::Start if ctx.save_slot.exists() => "Load a saved game.".to_string(),
            MenuItem::Start => "Start the game.".to_string(),
            MenuItem::PlayerType(slot) => {
                let code = ctx.settings.player_types.get(slot).copied().unwrap_or(0);
                let name = PLAYER_TYPE_NAMES
                    .get(usize::from(code))
                    .copied()
                    .unwrap_or("?");
                format!("Player {} type ({})", slot + 1, name)
            }
            MenuItem::GridWidth => "Set grid width. (5-13)".to_string(),
            MenuItem::GridHeight => "Set grid height. (4-8)".to_string(),
        }
    }

    pub fn view(&self, ctx: &AppContext) -> MenuView {
        MenuView {
            layout: MENU_LAYOUT,
            selected: self.selected(),
            description: self.description(ctx),
            grid_width: ctx.settings.grid_width,
            grid_height: ctx.settings.grid_height,
            player_types: ctx.settings.player_types,
            save_present: ctx.save_slot.exists(),
        }
    }
}

/// B and Y step values backwards
fn step_for(button: Button) -> i8 {
    match button {
        Button::B | Button::Y => -1,
        _ => 1,
    }
}

fn wrap(value: usize, delta: i32, len: usize) -> usize {
    (value as i32 + delta).rem_euclid(len as i32) as usize
}
