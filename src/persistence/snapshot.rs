//! In-flight match snapshot
//!
//! Dice are saved as value, position and hold only. Physics bodies are
//! never saved: a restored match creates fresh ones and puts every die to
//! rest where it was.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::KeyValueStore;
use crate::consts::{DIE_MAX_VALUE, DIE_MIN_VALUE};
use crate::error::PersistenceError;
use crate::physics::PhysicsWorld;
use crate::sim::rules::{RuleKind, RuleVariant, Rules};
use crate::sim::{DiceMatch, Phase};

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DieSnapshot {
    pub value: u8,
    pub position: Vec2,
    pub held: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub version: u32,
    pub phase: Phase,
    pub rolled_value: u8,
    pub wager_amount: u32,
    pub is_player_turn: bool,
    pub is_first_roll: bool,
    pub did_player_win: bool,
    pub player_mark: u8,
    pub opponent_mark: u8,
    pub opponent_index: usize,
    pub rule_kind: RuleKind,
    pub rules: Rules,
    pub dice: Vec<DieSnapshot>,
    /// Player and opponent purses when the snapshot was taken
    #[serde(default)]
    pub purses: Option<(u32, u32)>,
}

impl MatchSnapshot {
    /// Store key
    pub const KEY: &'static str = "match";

    pub fn capture(game: &DiceMatch, physics: &dyn PhysicsWorld) -> Self {
        let dice = game
            .dice
            .iter()
            .map(|die| DieSnapshot {
                value: die.value(),
                position: die.position(physics).unwrap_or(Vec2::ZERO),
                held: die.is_held(),
            })
            .collect();

        Self {
            version: SNAPSHOT_VERSION,
            phase: game.phase,
            rolled_value: game.rolled_value,
            wager_amount: game.wager_amount,
            is_player_turn: game.is_player_turn,
            is_first_roll: game.is_first_roll,
            did_player_win: game.did_player_win,
            player_mark: game.player_mark,
            opponent_mark: game.opponent_mark,
            opponent_index: game.opponent_index,
            rule_kind: game.rules.kind(),
            rules: game.rules.clone(),
            dice,
            purses: None,
        }
    }

    /// Record the purses the match is being saved with
    pub fn with_purses(mut self, player: u32, opponent: u32) -> Self {
        self.purses = Some((player, opponent));
        self
    }

    /// Whether the given purses are the ones this snapshot was taken with
    ///
    /// Snapshots without recorded purses accept any.
    pub fn purses_match(&self, player: u32, opponent: u32) -> bool {
        self.purses.is_none_or(|saved| saved == (player, opponent))
    }

    /// Reject snapshots describing an impossible match
    pub fn validate(&self) -> Result<(), PersistenceError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(PersistenceError::Invalid(format!(
                "unsupported version {}",
                self.version
            )));
        }
        if self.dice.len() != 3 {
            return Err(PersistenceError::Invalid(format!(
                "expected 3 dice, found {}",
                self.dice.len()
            )));
        }
        if let Some(die) = self
            .dice
            .iter()
            .find(|d| !(DIE_MIN_VALUE..=DIE_MAX_VALUE).contains(&d.value))
        {
            return Err(PersistenceError::Invalid(format!("die value {}", die.value)));
        }
        if self.rules.kind() != self.rule_kind {
            return Err(PersistenceError::Invalid(format!(
                "rule state is {} but kind is {}",
                self.rules.kind(),
                self.rule_kind
            )));
        }
        if self.phase != Phase::Wager && self.wager_amount == 0 {
            return Err(PersistenceError::Invalid(format!(
                "no wager in phase {:?}",
                self.phase
            )));
        }
        if let Some((player, opponent)) = self.purses
            && self.phase != Phase::Wager
            && self.wager_amount > player.min(opponent)
        {
            return Err(PersistenceError::Invalid(format!(
                "wager {} exceeds purses {player} and {opponent}",
                self.wager_amount
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let snapshot: Self = serde_json::from_str(json)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    /// Rebuild the match with fresh bodies
    ///
    /// `expected` is the rule of the opponent the snapshot claims to be
    /// against; a mismatch means the save belongs to a different roster.
    pub fn restore(
        &self,
        expected: RuleKind,
        physics: &mut dyn PhysicsWorld,
        opponent_delay: f32,
    ) -> Result<DiceMatch, PersistenceError> {
        self.validate()?;
        if self.rule_kind != expected {
            return Err(PersistenceError::Invalid(format!(
                "snapshot plays {} but opponent plays {expected}",
                self.rule_kind
            )));
        }

        let mut game = DiceMatch::new(self.rule_kind, self.opponent_index, physics, opponent_delay);
        game.phase = self.phase;
        game.rolled_value = self.rolled_value;
        game.wager_amount = self.wager_amount;
        game.is_player_turn = self.is_player_turn;
        game.is_first_roll = self.is_first_roll;
        game.did_player_win = self.did_player_win;
        game.player_mark = self.player_mark;
        game.opponent_mark = self.opponent_mark;
        game.rules = self.rules.clone();
        for (die, saved) in game.dice.iter_mut().zip(&self.dice) {
            die.restore(saved.value, saved.position, saved.held, physics);
        }
        game.settle_restored(physics);

        log::info!(
            "Restored {} match in {:?} (wager {})",
            self.rule_kind,
            self.phase,
            self.wager_amount
        );
        Ok(game)
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), PersistenceError> {
        store.save(Self::KEY, &self.to_json()?)
    }

    /// Saved snapshot, or `None` (with a warning) if missing or unusable
    pub fn load(store: &dyn KeyValueStore) -> Option<Self> {
        let json = store.load(Self::KEY)?;
        match Self::from_json(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                log::warn!("Discarding saved match: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::physics::TableWorld;

    fn sample(world: &mut TableWorld) -> MatchSnapshot {
        let game = DiceMatch::new(RuleKind::Triga, 2, world, 1.0);
        MatchSnapshot::capture(&game, world)
    }

    #[test]
    fn test_capture_records_positions_not_bodies() {
        let mut world = TableWorld::new();
        let snapshot = sample(&mut world);
        assert_eq!(snapshot.dice.len(), 3);
        assert_eq!(snapshot.opponent_index, 2);
        let json = snapshot.to_json().unwrap();
        assert!(!json.contains("body"));
    }

    #[test]
    fn test_round_trip_mid_turn() {
        let mut world = TableWorld::new();
        let mut game = DiceMatch::new(RuleKind::Triga, 1, &mut world, 1.0);
        game.phase = Phase::ToRoll;
        game.wager_amount = 40;
        game.is_player_turn = false;
        game.is_first_roll = false;
        game.player_mark = 2;
        game.opponent_mark = 5;
        for (die, value) in game.dice.iter_mut().zip([4, 2, 6]) {
            die.set_value(value);
        }
        let mut store = MemoryStore::new();
        MatchSnapshot::capture(&game, &world).save(&mut store).unwrap();

        let mut fresh = TableWorld::new();
        let snapshot = MatchSnapshot::load(&store).unwrap();
        let restored = snapshot.restore(RuleKind::Triga, &mut fresh, 1.0).unwrap();

        assert_eq!(restored.phase(), Phase::ToRoll);
        assert_eq!(restored.wager(), 40);
        assert!(!restored.is_player_turn());
        assert!(!restored.is_first_roll());
        assert_eq!(restored.battle_marks(), (2, 5));
        assert_eq!(restored.rules(), game.rules());
        let values: Vec<u8> = restored.dice().iter().map(|d| d.value()).collect();
        assert_eq!(values, [4, 2, 6]);
        assert!(restored.dice().iter().all(|d| !d.is_rolling()));
        assert_eq!(fresh.body_count(), 3);
        for (die, saved) in restored.dice().iter().zip(&snapshot.dice) {
            assert_eq!(die.position(&fresh), Some(saved.position));
        }
    }

    #[test]
    fn test_rejects_wrong_dice_count() {
        let mut world = TableWorld::new();
        let mut snapshot = sample(&mut world);
        snapshot.dice.pop();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(matches!(
            MatchSnapshot::from_json(&json),
            Err(PersistenceError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_value() {
        let mut world = TableWorld::new();
        let mut snapshot = sample(&mut world);
        snapshot.dice[1].value = 7;
        assert!(snapshot.validate().is_err());
        snapshot.dice[1].value = 0;
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_rejects_mismatched_rule() {
        let mut world = TableWorld::new();
        let mut snapshot = sample(&mut world);
        assert!(matches!(
            snapshot.restore(RuleKind::Riffa, &mut world, 1.0),
            Err(PersistenceError::Invalid(_))
        ));

        snapshot.rules = Rules::new(RuleKind::Panquist);
        assert!(snapshot.validate().is_err());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            MatchSnapshot::from_json("{\"phase\":"),
            Err(PersistenceError::Codec(_))
        ));
    }

    #[test]
    fn test_load_discards_bad_blob() {
        let mut store = MemoryStore::new();
        assert_eq!(MatchSnapshot::load(&store), None);
        store.save(MatchSnapshot::KEY, "[1,2,3]").unwrap();
        assert_eq!(MatchSnapshot::load(&store), None);
    }

    #[test]
    fn test_failed_restore_creates_no_bodies() {
        let mut world = TableWorld::new();
        let mut snapshot = sample(&mut world);
        world.clear();
        snapshot.dice[0].value = 9;
        assert!(snapshot.restore(RuleKind::Triga, &mut world, 1.0).is_err());
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_rejects_wager_above_recorded_purses() {
        let mut world = TableWorld::new();
        let mut snapshot = sample(&mut world).with_purses(100, 30);
        snapshot.phase = Phase::ToRoll;
        snapshot.wager_amount = 30;
        assert!(snapshot.validate().is_ok());

        snapshot.wager_amount = 31;
        assert!(matches!(snapshot.validate(), Err(PersistenceError::Invalid(_))));

        // Purses have already moved once the round is back at the wager
        snapshot.phase = Phase::Wager;
        assert!(snapshot.validate().is_ok());
    }

    #[test]
    fn test_purses_recorded_in_blob() {
        let mut world = TableWorld::new();
        let snapshot = sample(&mut world).with_purses(120, 45);
        let loaded = MatchSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(loaded.purses, Some((120, 45)));
        assert!(loaded.purses_match(120, 45));
        assert!(!loaded.purses_match(130, 35));
    }

    #[test]
    fn test_blob_without_purses_still_loads() {
        let mut world = TableWorld::new();
        let snapshot = sample(&mut world);
        let mut value = serde_json::to_value(&snapshot).unwrap();
        value.as_object_mut().unwrap().remove("purses");
        let loaded = MatchSnapshot::from_json(&value.to_string()).unwrap();
        assert_eq!(loaded.purses, None);
        assert!(loaded.purses_match(7, 9));
    }
}
