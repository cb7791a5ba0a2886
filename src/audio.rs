//! Audio seam
//!
//! The simulation only names sounds; playing them is up to whatever
//! [`AudioSink`] the host plugs into the [`AudioManager`].

use serde::Serialize;

/// Sounds the game can ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoundEffect {
    /// Atom placed by a player
    Place,
    /// Tile exploded
    Explode,
    /// Menu button activated
    Click,
}

/// Fire-and-forget sound backend
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, volume: f32);
}

/// Volume-aware front for the host's [`AudioSink`]
pub struct AudioManager {
    sink: Option<Box<dyn AudioSink>>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::silent()
    }
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>) -> Self {
        Self::with_sink(Some(sink))
    }

    /// Manager without a backend; every sound is dropped
    pub fn silent() -> Self {
        Self::with_sink(None)
    }

    fn with_sink(sink: Option<Box<dyn AudioSink>>) -> Self {
        Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Clamped to 0.0 - 1.0
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.sfx_volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Volume handed to the sink, 0.0 when muted
    pub fn effective_volume(&self) -> f32 {
        match self.muted {
            true => 0.0,
            false => self.master_volume * self.sfx_volume,
        }
    }

    pub fn play(&mut self, effect: SoundEffect) {
        let volume = self.effective_volume();
        if volume <= 0.0 {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            log::trace!("No audio sink, dropping {:?}", effect);
            return;
        };
        sink.play(effect, volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<(SoundEffect, f32)>>>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect, volume: f32) {
            self.0.borrow_mut().push((effect, volume));
        }
    }

    #[test]
    fn test_volume_and_mute() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut audio = AudioManager::new(Box::new(Recorder(log.clone())));
        audio.set_master_volume(0.5);
        audio.set_sfx_volume(2.0);
        audio.play(SoundEffect::Place);
        audio.set_muted(true);
        audio.play(SoundEffect::Explode);
        assert_eq!(*log.borrow(), vec![(SoundEffect::Place, 0.5)]);
    }

    #[test]
    fn test_silent_manager_drops_sounds() {
        let mut audio = AudioManager::silent();
        audio.play(SoundEffect::Click);
        assert!(audio.effective_volume() > 0.0);
    }
}
