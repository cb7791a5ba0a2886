//! Screen transition fades
//!
//! A transition fades out, swaps screens at full black, then fades back in.

use super::StateId;
use crate::consts::{FADE_IN_TIME, FADE_OUT_TIME};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeDirection {
    /// Transparent to opaque
    Out,
    /// Opaque to transparent
    In,
}

/// A single timed fade
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub direction: FadeDirection,
    duration: f32,
    elapsed: f32,
}

impl Fade {
    pub fn new(direction: FadeDirection, duration: f32) -> Self {
        Self {
            direction,
            duration,
            elapsed: 0.0,
        }
    }

    /// 0.0 at start, 1.0 when done
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).min(1.0)
        }
    }

    /// Overlay opacity
    pub fn alpha(&self) -> f32 {
        match self.direction {
            FadeDirection::Out => self.progress(),
            FadeDirection::In => 1.0 - self.progress(),
        }
    }

    /// Returns true once the fade has completed
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.progress() >= 1.0
    }
}

/// Pending screen change driven by a fade-out/fade-in pair
#[derive(Debug, Clone, Default)]
pub struct Transition {
    fade: Option<Fade>,
    target: Option<StateId>,
}

impl Transition {
    /// Start fading out toward `target`, replacing any transition in flight
    pub fn request(&mut self, target: StateId) {
        log::debug!("Transition to {:?} requested", target);
        self.target = Some(target);
        self.fade = Some(Fade::new(FadeDirection::Out, FADE_OUT_TIME));
    }

    /// Plain fade-in, used when the app starts
    pub fn fade_in(&mut self) {
        self.fade = Some(Fade::new(FadeDirection::In, FADE_IN_TIME));
    }

    /// Advance the fade; yields the target state when the screen must change now
    pub fn advance(&mut self, dt: f32) -> Option<StateId> {
        let fade = self.fade.as_mut()?;
        if !fade.advance(dt) {
            return None;
        }
        match fade.direction {
            FadeDirection::Out => {
                let target = self.target.take();
                self.fade = target.map(|_| Fade::new(FadeDirection::In, FADE_IN_TIME));
                target
            }
            FadeDirection::In => {
                self.fade = None;
                None
            }
        }
    }

    pub fn in_progress(&self) -> bool {
        self.fade.is_some()
    }

    /// Current overlay opacity, 0.0 when no fade runs
    pub fn alpha(&self) -> f32 {
        self.fade.map_or(0.0, |f| f.alpha())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fade_progress() {
        let mut fade = Fade::new(FadeDirection::Out, 0.5);
        assert_eq!(fade.alpha(), 0.0);
        assert!(!fade.advance(0.25));
        assert!((fade.alpha() - 0.5).abs() < 1e-6);
        assert!(fade.advance(0.5));
        assert_eq!(fade.alpha(), 1.0);

        let fade_in = Fade::new(FadeDirection::In, 0.5);
        assert_eq!(fade_in.alpha(), 1.0);
    }

    #[test]
    fn test_transition_swaps_at_full_black() {
        let mut transition = Transition::default();
        transition.request(StateId::Game);
        assert_eq!(transition.advance(0.1), None);
        assert_eq!(transition.advance(0.1), Some(StateId::Game));
        assert!(transition.in_progress());
        assert!((transition.alpha() - 1.0).abs() < 1e-6);

        assert_eq!(transition.advance(FADE_IN_TIME), None);
        assert!(!transition.in_progress());
        assert_eq!(transition.alpha(), 0.0);
    }

    #[test]
    fn test_newer_request_replaces_old() {
        let mut transition = Transition::default();
        transition.request(StateId::Game);
        transition.advance(0.1);
        transition.request(StateId::Menu);
        // The fade restarts from transparent
        assert_eq!(transition.advance(0.1), None);
        assert_eq!(transition.advance(0.1), Some(StateId::Menu));
    }
}
