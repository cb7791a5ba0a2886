//! Screen state machine
//!
//! The app owns one [`Screen`] at a time and swaps screens behind a fade.
//! Screens talk to the rest of the app through the shared [`AppContext`]:
//! settings, audio, the save slot, the message line and transition requests.

pub mod fade;
pub mod game;
pub mod menu;

use std::path::PathBuf;

use serde::Serialize;

use crate::audio::AudioManager;
use crate::persistence::SaveSlot;
use crate::settings::Settings;

pub use fade::{Fade, FadeDirection, Transition};
pub use game::{GameScreen, GameView};
pub use menu::{MenuItem, MenuScreen, MenuView};

/// Screen identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StateId {
    Menu,
    Game,
    /// The game screen running the tutorial script
    Tutorial,
}

/// Controller buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Button {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    Start,
}

impl Button {
    /// Selector offset for D-pad buttons
    pub fn direction(self) -> Option<(i32, i32)> {
        match self {
            Button::Up => Some((0, -1)),
            Button::Down => Some((0, 1)),
            Button::Left => Some((-1, 0)),
            Button::Right => Some((1, 0)),
            _ => None,
        }
    }
}

/// Info message shown at the bottom of the screen
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessageLine {
    text: String,
    remaining: f32,
}

impl MessageLine {
    /// Show `text` for `seconds`; an empty text clears the line
    pub fn show(&mut self, text: &str, seconds: f32) {
        self.text = text.to_string();
        self.remaining = if text.is_empty() { 0.0 } else { seconds };
    }

    pub fn clear(&mut self) {
        self.show("", 0.0);
    }

    pub fn update(&mut self, dt: f32) {
        self.remaining = (self.remaining - dt).max(0.0);
    }

    pub fn current(&self) -> Option<&str> {
        (self.remaining > 0.0).then_some(self.text.as_str())
    }
}

/// State shared by every screen
pub struct AppContext {
    pub settings: Settings,
    pub settings_path: PathBuf,
    pub audio: AudioManager,
    pub save_slot: SaveSlot,
    pub message: MessageLine,
    next_seed: u64,
    pending: Option<StateId>,
}

impl AppContext {
    pub fn new(settings: Settings, settings_path: PathBuf, save_slot: SaveSlot, audio: AudioManager, seed: u64) -> Self {
        let mut audio = audio;
        audio.set_master_volume(settings.master_volume);
        audio.set_sfx_volume(settings.sfx_volume);
        audio.set_muted(settings.muted);
        Self {
            settings,
            settings_path,
            audio,
            save_slot,
            message: MessageLine::default(),
            next_seed: seed,
            pending: None,
        }
    }

    /// Ask the app to switch screens after a fade
    pub fn request_transition(&mut self, target: StateId) {
        self.pending = Some(target);
    }

    pub fn show_message(&mut self, text: &str, seconds: f32) {
        log::info!("{}", text);
        self.message.show(text, seconds);
    }

    /// Seed for the next session's RNG
    pub fn next_seed(&mut self) -> u64 {
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);
        seed
    }

    pub fn save_settings(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            log::error!("Couldn't save settings to {}: {}", self.settings_path.display(), e);
        }
    }

    fn take_pending(&mut self) -> Option<StateId> {
        self.pending.take()
    }
}

/// Render view of the active screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum View {
    Menu(MenuView),
    Game(GameView),
}

/// The active screen
pub enum Screen {
    Menu(MenuScreen),
    Game(GameScreen),
}

impl Screen {
    /// Build and enter the screen for `id`
    pub fn enter(id: StateId, ctx: &mut AppContext) -> Self {
        log::info!("Entering {:?}", id);
        match id {
            StateId::Menu => Screen::Menu(MenuScreen::enter(ctx)),
            StateId::Game | StateId::Tutorial => {
                match GameScreen::enter(ctx, id == StateId::Tutorial) {
                    Ok(screen) => Screen::Game(screen),
                    Err(e) => {
                        log::error!("Couldn't start the game: {}", e);
                        ctx.show_message("Couldn't start the game!", 3.0);
                        Screen::Menu(MenuScreen::enter(ctx))
                    }
                }
            }
        }
    }

    pub fn id(&self) -> StateId {
        match self {
            Screen::Menu(_) => StateId::Menu,
            Screen::Game(game) if game.is_tutorial() => StateId::Tutorial,
            Screen::Game(_) => StateId::Game,
        }
    }

    pub fn update(&mut self, ctx: &mut AppContext, dt: f32) {
        match self {
            Screen::Menu(menu) => menu.update(ctx, dt),
            Screen::Game(game) => game.update(ctx, dt),
        }
    }

    pub fn button_down(&mut self, ctx: &mut AppContext, button: Button) {
        match self {
            Screen::Menu(menu) => menu.button_down(ctx, button),
            Screen::Game(game) => game.button_down(ctx, button),
        }
    }

    pub fn button_up(&mut self, button: Button) {
        match self {
            Screen::Menu(menu) => menu.button_up(button),
            Screen::Game(game) => game.button_up(button),
        }
    }

    pub fn view(&self, ctx: &AppContext) -> View {
        match self {
            Screen::Menu(menu) => View::Menu(menu.view(ctx)),
            Screen::Game(game) => View::Game(game.view()),
        }
    }

    pub fn exit(self, ctx: &mut AppContext) {
        log::info!("Leaving {:?}", self.id());
        if let Screen::Game(game) = self {
            game.exit(ctx);
        }
    }
}

/// Everything the host needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppView {
    pub screen: View,
    /// Black overlay opacity from the running fade
    pub fade_alpha: f32,
    pub message: Option<String>,
}

/// Top-level application: active screen plus transitions
pub struct App {
    ctx: AppContext,
    /// `None` only while screens are being swapped
    screen: Option<Screen>,
    transition: Transition,
}

impl App {
    /// Start on the menu, fading in
    pub fn new(mut ctx: AppContext) -> Self {
        let screen = Screen::enter(StateId::Menu, &mut ctx);
        let mut transition = Transition::default();
        transition.fade_in();
        Self {
            ctx,
            screen: Some(screen),
            transition,
        }
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    pub fn state_id(&self) -> StateId {
        self.screen.as_ref().map_or(StateId::Menu, Screen::id)
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.in_progress()
    }

    pub fn update(&mut self, dt: f32) {
        self.ctx.message.update(dt);
        if let Some(target) = self.transition.advance(dt) {
            self.change_screen(target);
        }
        // Screens are frozen while a fade runs
        if self.transition.in_progress() {
            return;
        }
        if let Some(screen) = self.screen.as_mut() {
            screen.update(&mut self.ctx, dt);
        }
        self.poll_requests();
    }

    /// Input is dropped while a fade runs
    pub fn button_down(&mut self, button: Button) {
        if self.transition.in_progress() {
            return;
        }
        if let Some(screen) = self.screen.as_mut() {
            screen.button_down(&mut self.ctx, button);
        }
        self.poll_requests();
    }

    pub fn button_up(&mut self, button: Button) {
        if self.transition.in_progress() {
            return;
        }
        if let Some(screen) = self.screen.as_mut() {
            screen.button_up(button);
        }
        self.poll_requests();
    }

    pub fn view(&self) -> Option<AppView> {
        let screen = self.screen.as_ref()?;
        Some(AppView {
            screen: screen.view(&self.ctx),
            fade_alpha: self.transition.alpha(),
            message: self.ctx.message.current().map(str::to_string),
        })
    }

    fn poll_requests(&mut self) {
        if let Some(target) = self.ctx.take_pending() {
            self.transition.request(target);
        }
    }

    fn change_screen(&mut self, target: StateId) {
        self.ctx.save_settings();
        if let Some(old) = self.screen.take() {
            old.exit(&mut self.ctx);
        }
        self.screen = Some(Screen::enter(target, &mut self.ctx));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::ATOM_STACK_SIZE;
    use crate::sim::{AbortReason, TilePos};
    use tempfile::{TempDir, tempdir};

    pub(crate) fn test_context(dir: &TempDir) -> AppContext {
        AppContext::new(
            Settings::default(),
            dir.path().join("settings.json"),
            SaveSlot::new(dir.path().join("savegame.ksf")),
            AudioManager::silent(),
            7,
        )
    }

    fn run(app: &mut App, seconds: f32) {
        let frames = (seconds * 60.0) as usize;
        for _ in 0..frames {
            app.update(1.0 / 60.0);
        }
    }

    /// Update until `id` is the active screen, for at most `seconds`
    fn run_until(app: &mut App, id: StateId, seconds: f32) -> bool {
        let frames = (seconds * 60.0) as usize;
        for _ in 0..frames {
            app.update(1.0 / 60.0);
            if app.state_id() == id {
                return true;
            }
        }
        false
    }

    fn game_mut(app: &mut App) -> &mut GameScreen {
        match app.screen.as_mut() {
            Some(Screen::Game(game)) => game,
            _ => panic!("expected game screen"),
        }
    }

    #[test]
    fn test_message_line_expires() {
        let mut line = MessageLine::default();
        line.show("hi", 1.0);
        assert_eq!(line.current(), Some("hi"));
        line.update(0.6);
        assert_eq!(line.current(), Some("hi"));
        line.update(0.6);
        assert_eq!(line.current(), None);
        line.show("x", 3.0);
        line.clear();
        assert_eq!(line.current(), None);
    }

    #[test]
    fn test_start_game_from_menu() {
        let dir = tempdir().unwrap();
        let mut app = App::new(test_context(&dir));
        assert_eq!(app.state_id(), StateId::Menu);
        run(&mut app, 0.5);
        assert!(!app.is_transitioning());

        // Start is selected initially
        app.button_down(Button::A);
        app.button_up(Button::A);
        assert!(app.is_transitioning());
        assert_eq!(app.state_id(), StateId::Menu);
        run(&mut app, 0.5);
        assert_eq!(app.state_id(), StateId::Game);
        // Settings are written on every screen change
        assert!(dir.path().join("settings.json").is_file());

        let Some(AppView { screen: View::Game(view), .. }) = app.view() else {
            panic!("expected game view");
        };
        assert_eq!(view.snapshot.width, 10);
        assert_eq!(view.snapshot.height, 6);
    }

    #[test]
    fn test_tutorial_quits_to_menu_on_start() {
        let dir = tempdir().unwrap();
        let mut app = App::new(test_context(&dir));
        run(&mut app, 0.5);
        app.button_down(Button::Left);
        app.button_down(Button::A);
        app.button_up(Button::A);
        run(&mut app, 0.5);
        assert_eq!(app.state_id(), StateId::Tutorial);

        app.button_down(Button::Start);
        run(&mut app, 0.5);
        assert_eq!(app.state_id(), StateId::Menu);
    }

    #[test]
    fn test_direction_buttons() {
        assert_eq!(Button::Down.direction(), Some((0, 1)));
        assert_eq!(Button::Left.direction(), Some((-1, 0)));
        assert_eq!(Button::A.direction(), None);
    }

    #[test]
    fn test_too_few_players_returns_to_menu() {
        let dir = tempdir().unwrap();
        let mut ctx = test_context(&dir);
        ctx.settings.player_types = [1, 0, 0, 0];
        let mut app = App::new(ctx);
        run(&mut app, 0.5);
        app.button_down(Button::A);
        assert!(run_until(&mut app, StateId::Game, 1.0));
        assert!(run_until(&mut app, StateId::Menu, 2.0));
        run(&mut app, 0.5);
        assert!(!app.is_transitioning());
        assert_eq!(app.state_id(), StateId::Menu);
        assert_eq!(
            app.context().message.current(),
            Some("2 or more players required to play!")
        );
    }

    #[test]
    fn test_aborted_game_returns_to_menu() {
        let dir = tempdir().unwrap();
        let mut app = App::new(test_context(&dir));
        run(&mut app, 0.5);
        app.button_down(Button::A);
        assert!(run_until(&mut app, StateId::Game, 1.0));
        game_mut(&mut app)
            .session_mut()
            .abort_session(AbortReason::RunawayChain {
                limit: ATOM_STACK_SIZE,
            });

        assert!(run_until(&mut app, StateId::Menu, 2.0));
        run(&mut app, 0.5);
        assert_eq!(app.state_id(), StateId::Menu);
        assert_eq!(
            app.context().message.current(),
            Some("More than 5000 simultaneous explosions! Stopping...")
        );
    }

    #[test]
    fn test_tutorial_script_ends_in_menu() {
        let dir = tempdir().unwrap();
        let mut app = App::new(test_context(&dir));
        run(&mut app, 0.5);
        app.button_down(Button::Left);
        app.button_down(Button::A);
        assert!(run_until(&mut app, StateId::Tutorial, 1.0));

        let mut textboxes = 0;
        for _ in 0..20_000 {
            app.update(1.0 / 60.0);
            if app.state_id() == StateId::Menu {
                break;
            }
            let showing_text = matches!(
                app.view(),
                Some(AppView { screen: View::Game(GameView { tutorial_text: Some(_), .. }), .. })
            );
            if showing_text && !app.is_transitioning() {
                app.button_down(Button::A);
                app.button_up(Button::A);
                textboxes += 1;
            }
        }
        assert_eq!(app.state_id(), StateId::Menu);
        assert_eq!(textboxes, 8);
    }

    #[test]
    fn test_buttons_ignored_during_fades() {
        let dir = tempdir().unwrap();
        let mut app = App::new(test_context(&dir));
        run(&mut app, 0.5);

        // Start the game, then try to switch to the tutorial mid fade-out
        app.button_down(Button::A);
        app.button_up(Button::A);
        app.button_down(Button::Left);
        app.button_down(Button::A);
        assert!(run_until(&mut app, StateId::Game, 1.0));

        // Fade-in still running: no atom gets placed
        assert!(app.is_transitioning());
        app.button_down(Button::A);
        let corner = TilePos::new(0, 0);
        assert!(game_mut(&mut app).session().grid().tile(corner).unwrap().is_empty());

        run(&mut app, 0.5);
        app.button_down(Button::A);
        assert!(!game_mut(&mut app).session().grid().tile(corner).unwrap().is_empty());
    }
}
