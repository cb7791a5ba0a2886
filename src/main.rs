//! KleleAtoms headless entry point
//!
//! Plays one AI-only game from the saved settings and logs how it went.
//! Set `RUST_LOG=debug` to also get the final board as JSON.

use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use klele_atoms::consts::SIM_DT;
use klele_atoms::settings::DEFAULT_SETTINGS_PATH;
use klele_atoms::sim::{PlayerKind, RandomAi, SessionState, TickStatus, tick};
use klele_atoms::Settings;

/// Give up after this many simulated frames (one hour at 60 Hz)
const MAX_FRAMES: u64 = 60 * 60 * 60;

fn main() {
    env_logger::init();
    log::info!("KleleAtoms (headless) starting...");

    let settings = Settings::load(Path::new(DEFAULT_SETTINGS_PATH));
    let kinds = settings.player_kinds().map(|kind| {
        kind.map(|kind| match kind {
            PlayerKind::Human => PlayerKind::Ai { difficulty: 2 },
            ai => ai,
        })
    });

    let seed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    log::info!("Seed: {}", seed);

    let mut session = match SessionState::new(
        usize::from(settings.grid_width),
        usize::from(settings.grid_height),
        kinds,
        seed,
    ) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Couldn't start the game: {}", e);
            std::process::exit(1);
        }
    };
    if session.total_player_count() < 2 {
        log::error!("2 or more players required to play!");
        std::process::exit(1);
    }

    let mut ai = RandomAi::new(seed.rotate_left(17));
    let mut frames = 0u64;
    let mut status = TickStatus::Running;
    while status == TickStatus::Running && frames < MAX_FRAMES {
        status = tick(&mut session, &mut ai, SIM_DT);
        frames += 1;
        session.drain_events();
    }

    let seconds = frames as f32 * SIM_DT;
    match &status {
        TickStatus::Won(winner) => log::info!("{} won after {:.1}s", winner, seconds),
        TickStatus::Aborted(reason) => log::warn!("Game aborted after {:.1}s: {}", seconds, reason),
        TickStatus::Running => log::warn!("No winner after {:.1}s, giving up", seconds),
    }

    if log::log_enabled!(log::Level::Debug) {
        match serde_json::to_string(&session.snapshot()) {
            Ok(json) => log::debug!("Final board: {}", json),
            Err(e) => log::error!("Couldn't serialize the board: {}", e),
        }
    }
}
