//! Game settings and preferences
//!
//! Persisted separately from game saves in the key-value store.

use serde::{Deserialize, Serialize};

use crate::consts::OPPONENT_ROLL_DELAY;
use crate::error::PersistenceError;
use crate::persistence::KeyValueStore;

/// How quickly the opponent takes its turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Pace {
    Relaxed,
    #[default]
    Normal,
    Brisk,
}

impl Pace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pace::Relaxed => "Relaxed",
            Pace::Normal => "Normal",
            Pace::Brisk => "Brisk",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "slow" => Some(Pace::Relaxed),
            "normal" => Some(Pace::Normal),
            "brisk" | "fast" => Some(Pace::Brisk),
            _ => None,
        }
    }

    /// Opponent roll delay for this pace (seconds)
    pub fn opponent_roll_delay(&self) -> f32 {
        match self {
            Pace::Relaxed => OPPONENT_ROLL_DELAY * 2.0,
            Pace::Normal => OPPONENT_ROLL_DELAY,
            Pace::Brisk => OPPONENT_ROLL_DELAY * 0.25,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Gameplay ===
    pub pace: Pace,
    /// Seconds the opponent waits before a non-first roll
    pub opponent_roll_delay: f32,

    // === Accessibility ===
    /// Reduced motion (panels and fades appear instantly)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Audio
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,

            // Gameplay
            pace: Pace::Normal,
            opponent_roll_delay: OPPONENT_ROLL_DELAY,

            // Accessibility
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a pace (applies its opponent delay)
    pub fn from_pace(pace: Pace) -> Self {
        let mut settings = Self::default();
        settings.apply_pace(pace);
        settings
    }

    pub fn apply_pace(&mut self, pace: Pace) {
        self.pace = pace;
        self.opponent_roll_delay = pace.opponent_roll_delay();
    }

    /// Duration of a UI transition (respects reduced_motion)
    pub fn transition(&self, seconds: f32) -> f32 {
        if self.reduced_motion { 0.0 } else { seconds }
    }

    /// Store key
    pub const STORAGE_KEY: &'static str = "settings";

    /// Load settings from the store, falling back to defaults
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.load(Self::STORAGE_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {e}"),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(self)?;
        store.save(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
