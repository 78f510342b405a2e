//! Audio system
//!
//! The game only names sound cues; an [`AudioSink`] decides what playing one
//! means. Headless runs use [`LogAudio`].

use crate::settings::Settings;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundEffect {
    /// Board slides onto the table
    Table,
    /// Stone panel slides in
    Stone,
    /// Wager adjusted
    Coin,
    /// Dice cast
    DiceRoll,
    /// Player won a round
    Win,
    /// Player lost a round
    Lose,
    /// Game over theme
    GameOverMusic,
    /// Background music
    Music,
    /// Tavern ambiance loop
    Ambiance,
}

impl SoundEffect {
    /// Music follows the music volume, everything else the sfx volume
    pub fn is_music(self) -> bool {
        matches!(
            self,
            SoundEffect::GameOverMusic | SoundEffect::Music | SoundEffect::Ambiance
        )
    }
}

/// Backend that actually produces (or records) sound
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect, gain: f32);
    fn stop(&mut self, effect: SoundEffect);
    fn stop_all(&mut self);
}

/// Number of recent cues [`LogAudio`] keeps
pub const PLAYED_HISTORY: usize = 64;

/// Sink that logs cues and remembers what is playing
#[derive(Debug, Default)]
pub struct LogAudio {
    played: Vec<SoundEffect>,
    looping: Vec<SoundEffect>,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last [`PLAYED_HISTORY`] cues played, oldest first
    pub fn played(&self) -> &[SoundEffect] {
        &self.played
    }

    /// Music tracks currently playing
    pub fn looping(&self) -> &[SoundEffect] {
        &self.looping
    }
}

impl AudioSink for LogAudio {
    fn play(&mut self, effect: SoundEffect, gain: f32) {
        log::debug!("play {effect:?} at {gain:.2}");
        if self.played.len() == PLAYED_HISTORY {
            self.played.remove(0);
        }
        self.played.push(effect);
        if effect.is_music() && !self.looping.contains(&effect) {
            self.looping.push(effect);
        }
    }

    fn stop(&mut self, effect: SoundEffect) {
        self.looping.retain(|e| *e != effect);
    }

    fn stop_all(&mut self) {
        self.looping.clear();
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sink: Box<dyn AudioSink>,
    master_volume: f32,
    sfx_volume: f32,
    music_volume: f32,
    muted: bool,
}

impl AudioManager {
    pub fn new(sink: Box<dyn AudioSink>, settings: &Settings) -> Self {
        let mut manager = Self {
            sink,
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        };
        manager.apply_settings(settings);
        manager
    }

    /// Manager that only logs
    pub fn headless(settings: &Settings) -> Self {
        Self::new(Box::new(LogAudio::new()), settings)
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_music_volume(settings.music_volume);
        self.set_muted(settings.muted);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Set music volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume for a cue
    pub fn effective_volume(&self, effect: SoundEffect) -> f32 {
        if self.muted {
            return 0.0;
        }
        let channel = if effect.is_music() {
            self.music_volume
        } else {
            self.sfx_volume
        };
        self.master_volume * channel
    }

    /// Play a sound effect
    pub fn play(&mut self, effect: SoundEffect) {
        let vol = self.effective_volume(effect);
        if vol <= 0.0 {
            return;
        }
        self.sink.play(effect, vol);
    }

    pub fn stop(&mut self, effect: SoundEffect) {
        self.sink.stop(effect);
    }

    pub fn stop_all(&mut self) {
        self.sink.stop_all();
    }
}

impl std::fmt::Debug for AudioManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioManager")
            .field("master_volume", &self.master_volume)
            .field("sfx_volume", &self.sfx_volume)
            .field("music_volume", &self.music_volume)
            .field("muted", &self.muted)
            .finish_non_exhaustive()
    }
}
