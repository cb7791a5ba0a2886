//! Save game persistence
//!
//! One save slot on disk in the KSF format. Loading consumes the file:
//! it is removed after reading whether or not it decoded.

pub mod ksf;

use std::fs;
use std::path::{Path, PathBuf};

pub use ksf::{SaveData, SaveError};

use crate::sim::SessionState;

/// Default save file, relative to the working directory
pub const DEFAULT_SAVE_PATH: &str = "savegame.ksf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlot {
    path: PathBuf,
}

impl Default for SaveSlot {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_PATH)
    }
}

impl SaveSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Write the session with `elapsed` seconds of game time
    pub fn save(&self, state: &SessionState, elapsed: u64) -> Result<(), SaveError> {
        fs::write(&self.path, ksf::encode(state, elapsed))?;
        log::info!("Game saved to {}", self.path.display());
        Ok(())
    }

    /// Load into `state` and delete the file. Returns the saved elapsed time.
    pub fn load(&self, state: &mut SessionState) -> Result<u64, SaveError> {
        let bytes = fs::read(&self.path)?;
        let result = ksf::load_into(state, &bytes);
        if let Err(e) = fs::remove_file(&self.path) {
            log::warn!("Couldn't remove {}: {}", self.path.display(), e);
        }
        if let Err(e) = &result {
            log::error!("Save file is not valid: {}", e);
        }
        result
    }
}
