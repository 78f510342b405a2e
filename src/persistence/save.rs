//! Saved roster
//!
//! Everyone's purse, keyed by opponent name so a save never lands on a
//! different line-up.

use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::error::PersistenceError;
use crate::sim::Roster;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedOpponent {
    pub name: String,
    pub money: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveGame {
    pub player_money: u32,
    pub opponents: Vec<SavedOpponent>,
}

impl SaveGame {
    /// Store key
    pub const KEY: &'static str = "game";

    pub fn capture(roster: &Roster) -> Self {
        Self {
            player_money: roster.player.money,
            opponents: roster
                .opponents
                .iter()
                .map(|o| SavedOpponent {
                    name: o.name.clone(),
                    money: o.character.money,
                })
                .collect(),
        }
    }

    /// Write the saved purses into `roster`; leaves it untouched on mismatch
    pub fn apply(&self, roster: &mut Roster) -> Result<(), PersistenceError> {
        if self.opponents.len() != roster.opponents.len() {
            return Err(PersistenceError::Invalid(format!(
                "save has {} opponents, roster has {}",
                self.opponents.len(),
                roster.opponents.len()
            )));
        }
        if let Some((saved, _)) = self
            .opponents
            .iter()
            .zip(&roster.opponents)
            .find(|(saved, current)| saved.name != current.name)
        {
            return Err(PersistenceError::Invalid(format!(
                "unknown opponent {:?}",
                saved.name
            )));
        }

        roster.player.money = self.player_money;
        for (opponent, saved) in roster.opponents.iter_mut().zip(&self.opponents) {
            opponent.character.money = saved.money;
        }
        Ok(())
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(self)?;
        store.save(Self::KEY, &json)
    }

    /// Saved game, or `None` (with a warning) if missing or unreadable
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let json = store.load(Self::KEY)?;
        match serde_json::from_str(&json) {
            Ok(save) => Some(save),
            Err(e) => {
                log::warn!("Discarding saved game: {e}");
                None
            }
        }
    }
}
