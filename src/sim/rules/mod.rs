//! Rule variants sharing one turn engine
//!
//! The match asks the active variant two questions: what a settled roll
//! means ([`RuleVariant::check_roll`]) and how much changes hands once the
//! round is decided ([`RuleVariant::deal_out_winnings`]).

mod panquist;
mod riffa;
pub mod stakes;
mod triga;

pub use panquist::{Panquist, payout};
pub use riffa::Riffa;
pub use stakes::{Stake, StakesTable};
pub use triga::Triga;

use std::fmt;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

use super::character::{Character, Side};
use super::die::Die;
use crate::error::ConfigError;

/// Which dice game an opponent plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Riffa,
    Triga,
    Panquist,
}

impl RuleKind {
    pub const ALL: [RuleKind; 3] = [RuleKind::Riffa, RuleKind::Triga, RuleKind::Panquist];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Riffa => "Riffa",
            RuleKind::Triga => "Triga",
            RuleKind::Panquist => "Panquist",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "riffa" => Ok(RuleKind::Riffa),
            "triga" => Ok(RuleKind::Triga),
            "panquist" => Ok(RuleKind::Panquist),
            _ => Err(ConfigError::UnknownRule(s.to_string())),
        }
    }
}

/// What the match should do after a settled roll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollOutcome {
    /// Same player rolls again
    RollAgain,
    /// Turn passes to the other player
    PassTurn,
    /// Scores were wiped; start over with the given first roller
    Replay { player_first: bool },
    /// Round is over
    Decided { player_won: bool },
}

/// Outcome plus an optional line for the result panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollVerdict {
    pub outcome: RollOutcome,
    pub announcement: Option<String>,
}

impl RollVerdict {
    pub fn new(outcome: RollOutcome) -> Self {
        Self {
            outcome,
            announcement: None,
        }
    }

    pub fn announce(outcome: RollOutcome, text: impl Into<String>) -> Self {
        Self {
            outcome,
            announcement: Some(text.into()),
        }
    }

    /// Round won by `side`
    pub fn decided(side: Side, text: impl Into<String>) -> Self {
        Self::announce(
            RollOutcome::Decided {
                player_won: side.is_player(),
            },
            text,
        )
    }
}

/// The match state a variant may look at (and hold dice in) after a roll
pub struct RollView<'a> {
    pub dice: &'a mut [Die; 3],
    pub rolled_value: u8,
    pub is_player_turn: bool,
}

impl RollView<'_> {
    pub fn roller(&self) -> Side {
        Side::from_turn(self.is_player_turn)
    }

    pub fn faces(&self) -> [u8; 3] {
        [self.dice[0].value(), self.dice[1].value(), self.dice[2].value()]
    }

    pub fn is_triple(&self) -> bool {
        let [a, b, c] = self.faces();
        a == b && b == c
    }
}

/// Facts about a decided round needed to pay it out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub wager: u32,
    pub winner: Side,
    pub rolled_value: u8,
    pub faces: [u8; 3],
}

/// Move `amount` from the loser to the winner; returns the amount moved
pub fn transfer(winner: Side, amount: u32, player: &mut Character, opponent: &mut Character) -> u32 {
    let (winner, loser) = match winner {
        Side::Player => (player, opponent),
        Side::Opponent => (opponent, player),
    };
    let amount = amount.min(loser.money);
    loser.lose_money(amount);
    winner.win_money(amount);
    amount
}

/// Behaviour every dice game supplies to the match
#[enum_dispatch]
pub trait RuleVariant {
    fn kind(&self) -> RuleKind;

    /// Forget everything about the current round
    fn reset(&mut self);

    /// Interpret a settled roll
    fn check_roll(&mut self, roll: &mut RollView<'_>) -> RollVerdict;

    /// Pay out a decided round; returns what the loser paid
    fn deal_out_winnings(
        &mut self,
        settlement: &Settlement,
        player: &mut Character,
        opponent: &mut Character,
    ) -> u32 {
        transfer(settlement.winner, settlement.wager, player, opponent)
    }

    /// Winner implied by the variant's own bookkeeping, if any
    fn check_victory(&self) -> Option<Side> {
        None
    }
}

/// The active variant and its round state
#[enum_dispatch(RuleVariant)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rules {
    Riffa(Riffa),
    Triga(Triga),
    Panquist(Panquist),
}

impl Rules {
    pub fn new(kind: RuleKind) -> Self {
        match kind {
            RuleKind::Riffa => Riffa::default().into(),
            RuleKind::Triga => Triga::default().into(),
            RuleKind::Panquist => Panquist::default().into(),
        }
    }

    /// Build a variant from a configuration tag
    pub fn from_tag(tag: &str) -> Result<Self, ConfigError> {
        Ok(Self::new(tag.parse()?))
    }
}

/// Both players' marks (Triga and Panquist)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marks {
    pub player: Option<u8>,
    pub opponent: Option<u8>,
}

impl Marks {
    pub fn get(&self, side: Side) -> Option<u8> {
        match side {
            Side::Player => self.player,
            Side::Opponent => self.opponent,
        }
    }

    pub fn set(&mut self, side: Side, mark: u8) {
        match side {
            Side::Player => self.player = Some(mark),
            Side::Opponent => self.opponent = Some(mark),
        }
    }

    /// Holder of the mark equal to `total`, checking the roller's own first
    pub fn holder_of(&self, total: u8, roller: Side) -> Option<Side> {
        [roller, roller.other()]
            .into_iter()
            .find(|&side| self.get(side) == Some(total))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec2;

    use crate::physics::TableWorld;
    use crate::sim::die::Die;

    /// Three idle dice showing `faces`
    pub fn dice(world: &mut TableWorld, faces: [u8; 3]) -> [Die; 3] {
        faces.map(|face| {
            let mut die = Die::new(world, Vec2::ZERO);
            die.set_value(face);
            die
        })
    }
}
