use serde::{Deserialize, Serialize};

use super::stakes::{MARK_TOTALS, StakesTable};
use super::{Marks, RollOutcome, RollVerdict, RollView, RuleKind, RuleVariant, Settlement, transfer};
use crate::sim::character::{Character, Side};

/// Marks like Triga, but only 7 to 14 count and the payout depends on the dice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panquist {
    marks: Marks,
    percentage_won: f32,
}

impl Default for Panquist {
    fn default() -> Self {
        Self {
            marks: Marks::default(),
            percentage_won: 1.0,
        }
    }
}

impl Panquist {
    pub fn marks(&self) -> Marks {
        self.marks
    }

    pub fn percentage_won(&self) -> f32 {
        self.percentage_won
    }

    /// Record the share of the wager the winning roll is worth
    pub fn set_percentage_won(&mut self, total: u8, faces: [u8; 3]) {
        let stake = StakesTable::standard().lookup(total, faces);
        self.percentage_won = stake.fraction();
        log::debug!("Panquist stake {stake:?} for {total} from {faces:?}");
    }

    fn decide(&mut self, winner: Side, roll: &RollView<'_>, text: String) -> RollVerdict {
        self.set_percentage_won(roll.rolled_value, roll.faces());
        RollVerdict::decided(winner, text)
    }
}

/// `ceil(wager * fraction)`, never more than the wager
pub fn payout(wager: u32, fraction: f32) -> u32 {
    let paid = (wager as f64 * fraction as f64).ceil();
    (paid.max(0.0) as u32).min(wager)
}

impl RuleVariant for Panquist {
    fn kind(&self) -> RuleKind {
        RuleKind::Panquist
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn check_roll(&mut self, roll: &mut RollView<'_>) -> RollVerdict {
        let roller = roll.roller();
        let total = roll.rolled_value;

        if self.marks.get(roller).is_none() {
            if !MARK_TOTALS.contains(&total) {
                return RollVerdict::announce(RollOutcome::RollAgain, format!("{total} can't be a mark"));
            }
            if self.marks.get(roller.other()) == Some(total) {
                return self.decide(roller.other(), roll, format!("{total} is taken"));
            }
            self.marks.set(roller, total);
            return RollVerdict::announce(
                RollOutcome::PassTurn,
                format!("{}: mark {total}", roller.label()),
            );
        }

        match self.marks.holder_of(total, roller) {
            Some(holder) => self.decide(holder, roll, format!("{total} hits the mark")),
            None => RollVerdict::new(RollOutcome::PassTurn),
        }
    }

    fn deal_out_winnings(
        &mut self,
        settlement: &Settlement,
        player: &mut Character,
        opponent: &mut Character,
    ) -> u32 {
        let amount = payout(settlement.wager, self.percentage_won);
        transfer(settlement.winner, amount, player, opponent)
    }
}
