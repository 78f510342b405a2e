//! Characters, opponents, and the roster of everyone at the tavern

use serde::{Deserialize, Serialize};

use super::rules::RuleKind;
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::rng::RandomSource;

/// One side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    /// The side whose turn it is
    pub fn from_turn(is_player_turn: bool) -> Self {
        if is_player_turn { Side::Player } else { Side::Opponent }
    }

    pub fn other(self) -> Self {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn is_player(self) -> bool {
        self == Side::Player
    }

    /// Display name used in announcements
    pub fn label(self) -> &'static str {
        match self {
            Side::Player => "You",
            Side::Opponent => "Your opponent",
        }
    }
}

/// Anyone holding a purse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub money: u32,
}

impl Character {
    pub fn new(money: u32) -> Self {
        Self { money }
    }

    /// True once the purse is empty
    pub fn is_broke(&self) -> bool {
        self.money == 0
    }

    pub fn win_money(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    /// Remove money from the purse
    ///
    /// Callers bound every payout by the wager, which never exceeds either
    /// purse, so this can never go below zero.
    pub fn lose_money(&mut self, amount: u32) {
        debug_assert!(amount <= self.money, "payout {amount} exceeds purse {}", self.money);
        self.money = self.money.saturating_sub(amount);
    }
}

/// Sprite sheet offset of an opponent's portrait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortraitRef {
    pub x: u32,
    pub y: u32,
}

/// Someone the player can challenge
#[derive(Debug, Clone, PartialEq)]
pub struct Opponent {
    pub name: String,
    pub full_name: String,
    pub greetings: Vec<String>,
    pub rule: RuleKind,
    pub portrait: PortraitRef,
    pub character: Character,
    /// Purse fixed by the configuration, refilled on a new game
    starting_money: Option<u32>,
}

impl Opponent {
    /// A random line from the opponent's greetings
    pub fn random_greeting(&self, rng: &mut dyn RandomSource) -> Option<&str> {
        if self.greetings.is_empty() {
            return None;
        }
        let last = self.greetings.len() as i32 - 1;
        let index = rng.uniform_int(0, last) as usize;
        self.greetings.get(index).map(String::as_str)
    }

    pub fn is_broke(&self) -> bool {
        self.character.is_broke()
    }
}

/// The player and every opponent
#[derive(Debug, Clone)]
pub struct Roster {
    pub player: Character,
    pub opponents: Vec<Opponent>,
    player_starting_money: u32,
    money_range: (u32, u32),
}

impl Roster {
    /// Build the roster from validated configuration
    pub fn from_config(config: &GameConfig, rng: &mut dyn RandomSource) -> Result<Self, ConfigError> {
        let money_range = (config.min_starting_money, config.max_starting_money);
        let mut config = config.clone();
        config.assign_rules(rng);

        let opponents = config
            .opponents
            .iter()
            .enumerate()
            .map(|(index, def)| {
                let rule = match &def.game {
                    Some(tag) => tag.parse::<RuleKind>()?,
                    None => {
                        return Err(ConfigError::MalformedOpponent {
                            index,
                            reason: "no rule".into(),
                        });
                    }
                };
                let money = def
                    .starting_money
                    .unwrap_or_else(|| random_money(rng, money_range));
                Ok(Opponent {
                    name: def.name.clone(),
                    full_name: def.full_name.clone().unwrap_or_else(|| def.name.clone()),
                    greetings: def.greetings.clone(),
                    rule,
                    portrait: def.portrait,
                    character: Character::new(money),
                    starting_money: def.starting_money,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self {
            player: Character::new(config.player_starting_money),
            opponents,
            player_starting_money: config.player_starting_money,
            money_range,
        })
    }

    /// Start a new game: refill the player's purse and re-randomize opponents
    pub fn reset(&mut self, rng: &mut dyn RandomSource) {
        self.player = Character::new(self.player_starting_money);
        for opponent in &mut self.opponents {
            let money = opponent
                .starting_money
                .unwrap_or_else(|| random_money(rng, self.money_range));
            opponent.character = Character::new(money);
        }
        log::info!("Roster reset ({} opponents)", self.opponents.len());
    }

    pub fn opponent(&self, index: usize) -> Option<&Opponent> {
        self.opponents.get(index)
    }

    /// Every opponent has been cleaned out
    pub fn all_opponents_broke(&self) -> bool {
        !self.opponents.is_empty() && self.opponents.iter().all(Opponent::is_broke)
    }

    /// Total money in play (player plus all opponents)
    pub fn total_money(&self) -> u64 {
        self.player.money as u64 + self.opponents.iter().map(|o| o.character.money as u64).sum::<u64>()
    }
}

fn random_money(rng: &mut dyn RandomSource, (min, max): (u32, u32)) -> u32 {
    rng.uniform_int(min as i32, max as i32).max(0) as u32
}
