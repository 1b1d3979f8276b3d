//! Audio cues
//!
//! The simulation raises events; this module turns them into sound cues at
//! the player's chosen volume. Synthesis is the host's job: a cue names the
//! sound and how loud to play it, nothing more.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::sim::{CollectibleKind, GameEvent};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Player left the ground
    Jump,
    /// Bounce pad launch
    Bounce,
    /// Pickup taken
    Collect(CollectibleKind),
    /// Hurt by a hazard or enemy
    Damage,
    /// A key opened a secret area
    SecretUnlocked,
    /// Portal reached
    Win,
    /// Attempt lost
    Lose,
    /// Next phrase of the background melody
    MelodyPhrase,
}

impl SoundEffect {
    pub fn is_music(&self) -> bool {
        matches!(self, SoundEffect::MelodyPhrase)
    }
}

/// A sound for the host to play
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub effect: SoundEffect,
    /// Effective volume (0.0 - 1.0)
    pub volume: f32,
}

/// Maps game events to cues under the current settings
#[derive(Debug, Clone)]
pub struct AudioDirector {
    settings: Settings,
    /// Host window has focus
    focused: bool,
}

impl Default for AudioDirector {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AudioDirector {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            focused: true,
        }
    }

    /// Track host window focus; unfocused play is silent under `mute_on_blur`
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_silenced(&self) -> bool {
        !self.focused && self.settings.mute_on_blur
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.settings = settings;
    }

    /// Sound for a game event, if it has one
    pub fn effect_for(event: &GameEvent) -> Option<SoundEffect> {
        match event {
            GameEvent::Jumped => Some(SoundEffect::Jump),
            GameEvent::Bounced { .. } => Some(SoundEffect::Bounce),
            GameEvent::Collected { kind, .. } => Some(SoundEffect::Collect(*kind)),
            GameEvent::Damaged { .. } => Some(SoundEffect::Damage),
            GameEvent::SecretUnlocked { .. } => Some(SoundEffect::SecretUnlocked),
            GameEvent::Won { .. } => Some(SoundEffect::Win),
            GameEvent::Lost { .. } => Some(SoundEffect::Lose),
            GameEvent::MelodyCue => Some(SoundEffect::MelodyPhrase),
            GameEvent::SpikeHit
            | GameEvent::PortalReached
            | GameEvent::InvulnerabilityEnded => None,
        }
    }

    /// Cue for a game event, or None when silent
    pub fn cue_for(&self, event: &GameEvent) -> Option<Cue> {
        if self.is_silenced() {
            return None;
        }
        let effect = Self::effect_for(event)?;
        let volume = if effect.is_music() {
            self.settings.effective_music_volume()
        } else {
            self.settings.effective_sfx_volume()
        };
        if volume <= 0.0 {
            return None;
        }
        Some(Cue { effect, volume })
    }
}
