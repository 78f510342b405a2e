//! Game configuration
//!
//! Opponents, rule instructions and starting money. A default configuration
//! is embedded in the binary; `--config` replaces it with a file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::rng::RandomSource;
use crate::sim::{PortraitRef, RuleKind};

const EMBEDDED: &str = include_str!("../assets/config.json");

/// One opponent as written in the configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpponentDefinition {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub greetings: Vec<String>,
    /// Rule tag; opponents without one are dealt a rule at load
    #[serde(default)]
    pub game: Option<String>,
    #[serde(default)]
    pub portrait: PortraitRef,
    /// Fixed purse instead of a random one
    #[serde(default)]
    pub starting_money: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    #[serde(default = "default_player_money")]
    pub player_starting_money: u32,
    #[serde(default = "default_min_money")]
    pub min_starting_money: u32,
    #[serde(default = "default_max_money")]
    pub max_starting_money: u32,
    pub opponents: Vec<OpponentDefinition>,
    /// How to play, by rule name
    #[serde(default)]
    pub instructions: HashMap<String, String>,
}

fn default_player_money() -> u32 {
    PLAYER_STARTING_MONEY
}

fn default_min_money() -> u32 {
    OPPONENT_MIN_STARTING_MONEY
}

fn default_max_money() -> u32 {
    OPPONENT_MAX_STARTING_MONEY
}

impl GameConfig {
    /// The configuration shipped with the game
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_json(EMBEDDED)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded {} opponents from {}", config.opponents.len(), path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.opponents.is_empty() {
            return Err(ConfigError::NoOpponents);
        }
        if self.min_starting_money > self.max_starting_money || self.max_starting_money == 0 {
            return Err(ConfigError::InvalidMoneyRange {
                min: self.min_starting_money,
                max: self.max_starting_money,
            });
        }

        for (index, def) in self.opponents.iter().enumerate() {
            if def.name.trim().is_empty() {
                return Err(ConfigError::MalformedOpponent {
                    index,
                    reason: "empty name".into(),
                });
            }
            if def.starting_money == Some(0) {
                return Err(ConfigError::MalformedOpponent {
                    index,
                    reason: "starts broke".into(),
                });
            }
            if let Some(tag) = &def.game {
                tag.parse::<RuleKind>()?;
            }
        }
        Ok(())
    }

    /// Give every opponent without a rule tag a rule
    ///
    /// The first opponents take each rule in turn so every rule is played by
    /// someone; later ones are dealt a random rule.
    pub fn assign_rules(&mut self, rng: &mut dyn RandomSource) {
        let count = RuleKind::ALL.len();
        for (index, def) in self.opponents.iter_mut().enumerate() {
            if def.game.is_some() {
                continue;
            }
            let pick = if index < count {
                index
            } else {
                rng.uniform_int(0, count as i32 - 1) as usize
            };
            def.game = Some(RuleKind::ALL[pick].as_str().to_string());
        }
    }

    /// Instructions for a rule (empty if the configuration has none)
    pub fn instructions_for(&self, kind: RuleKind) -> &str {
        self.instructions
            .get(kind.as_str())
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    #[test]
    fn test_embedded_config_is_valid() {
        let config = GameConfig::embedded().unwrap();
        assert!(!config.opponents.is_empty());
        assert_eq!(config.player_starting_money, PLAYER_STARTING_MONEY);
        for kind in RuleKind::ALL {
            assert!(!config.instructions_for(kind).is_empty(), "{kind} has no instructions");
        }
    }

    #[test]
    fn test_unknown_rule_is_fatal() {
        let json = r#"{"opponents": [{"name": "Pedro", "game": "Mus"}]}"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::UnknownRule(tag)) if tag == "Mus"
        ));
    }

    #[test]
    fn test_empty_roster_is_fatal() {
        assert!(matches!(
            GameConfig::from_json(r#"{"opponents": []}"#),
            Err(ConfigError::NoOpponents)
        ));
    }

    #[test]
    fn test_malformed_opponent() {
        let json = r#"{"opponents": [{"name": "Ana"}, {"name": "  "}]}"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::MalformedOpponent { index: 1, .. })
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"opponents": [{"greetings": []}]}"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_money_range_checked() {
        let json = r#"{"minStartingMoney": 50, "maxStartingMoney": 10, "opponents": [{"name": "Ana"}]}"#;
        assert!(matches!(
            GameConfig::from_json(json),
            Err(ConfigError::InvalidMoneyRange { min: 50, max: 10 })
        ));
    }

    #[test]
    fn test_assign_rules_covers_every_rule_first() {
        let json = r#"{"opponents": [{"name": "A"}, {"name": "B"}, {"name": "C"}, {"name": "D", "game": "Triga"}, {"name": "E"}]}"#;
        let mut config = GameConfig::from_json(json).unwrap();
        config.assign_rules(&mut ScriptedRng::new([2]));

        let games: Vec<_> = config.opponents.iter().filter_map(|o| o.game.as_deref()).collect();
        assert_eq!(games, ["Riffa", "Triga", "Panquist", "Triga", "Panquist"]);
    }
}
