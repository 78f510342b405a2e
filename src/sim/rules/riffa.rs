use serde::{Deserialize, Serialize};

use super::{RollOutcome, RollVerdict, RollView, RuleKind, RuleVariant};
use crate::sim::character::Side;

/// Roll for a double, then one final roll for the score; higher score wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Riffa {
    player_score: Option<u8>,
    opponent_score: Option<u8>,
    /// Side making its final roll with a held pair
    final_roller: Option<Side>,
    /// Whoever rolled first this round; replays start with them again
    first_roller: Option<Side>,
}

impl Riffa {
    pub fn score(&self, side: Side) -> Option<u8> {
        match side {
            Side::Player => self.player_score,
            Side::Opponent => self.opponent_score,
        }
    }

    fn set_score(&mut self, side: Side, score: u8) {
        match side {
            Side::Player => self.player_score = Some(score),
            Side::Opponent => self.opponent_score = Some(score),
        }
    }

    pub fn final_roller(&self) -> Option<Side> {
        self.final_roller
    }

    fn score_final_roll(&mut self, roll: &mut RollView<'_>, roller: Side) -> RollVerdict {
        let score = roll.rolled_value;
        self.set_score(roller, score);
        self.final_roller = None;
        for die in roll.dice.iter_mut() {
            die.release_hold();
        }

        let (Some(player), Some(opponent)) = (self.player_score, self.opponent_score) else {
            return RollVerdict::announce(
                RollOutcome::PassTurn,
                format!("{} scored {score}", roller.label()),
            );
        };

        if player == opponent {
            let player_first = self.first_roller.unwrap_or(Side::Player).is_player();
            self.player_score = None;
            self.opponent_score = None;
            log::info!("Riffa tie at {score}, replaying");
            return RollVerdict::announce(
                RollOutcome::Replay { player_first },
                format!("Tie at {score}! Roll again"),
            );
        }

        let winner = if player > opponent { Side::Player } else { Side::Opponent };
        RollVerdict::decided(winner, format!("{player} against {opponent}"))
    }
}

/// Indices of two dice showing the same face
fn find_pair(faces: [u8; 3]) -> Option<(usize, usize)> {
    [(0, 1), (0, 2), (1, 2)]
        .into_iter()
        .find(|&(i, j)| faces[i] == faces[j])
}

impl RuleVariant for Riffa {
    fn kind(&self) -> RuleKind {
        RuleKind::Riffa
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn check_roll(&mut self, roll: &mut RollView<'_>) -> RollVerdict {
        let roller = roll.roller();
        self.first_roller.get_or_insert(roller);

        if self.final_roller == Some(roller) {
            return self.score_final_roll(roll, roller);
        }

        if let Some((i, j)) = find_pair(roll.faces()) {
            roll.dice[i].hold();
            roll.dice[j].hold();
            self.final_roller = Some(roller);
            return RollVerdict::announce(
                RollOutcome::RollAgain,
                format!("Double {}! One final roll", roll.dice[i].value()),
            );
        }

        // Once one side has a score the other keeps rolling alone
        if self.score(roller.other()).is_some() {
            RollVerdict::new(RollOutcome::RollAgain)
        } else {
            RollVerdict::new(RollOutcome::PassTurn)
        }
    }

    fn check_victory(&self) -> Option<Side> {
        match (self.player_score, self.opponent_score) {
            (Some(p), Some(o)) if p > o => Some(Side::Player),
            (Some(p), Some(o)) if o > p => Some(Side::Opponent),
            _ => None,
        }
    }
}
