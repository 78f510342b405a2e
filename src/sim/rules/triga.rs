use serde::{Deserialize, Serialize};

use super::{Marks, RollOutcome, RollVerdict, RollView, RuleKind, RuleVariant};

/// First-roll totals that win outright
pub const TRIGA_TOTALS: [u8; 8] = [3, 4, 5, 6, 15, 16, 17, 18];

/// Set a mark, then race to roll either mark; a triga on the first roll wins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Triga {
    marks: Marks,
}

impl Triga {
    pub fn marks(&self) -> Marks {
        self.marks
    }

    fn is_triga(roll: &RollView<'_>) -> bool {
        TRIGA_TOTALS.contains(&roll.rolled_value) || roll.is_triple()
    }
}

impl RuleVariant for Triga {
    fn kind(&self) -> RuleKind {
        RuleKind::Triga
    }

    fn reset(&mut self) {
        self.marks = Marks::default();
    }

    fn check_roll(&mut self, roll: &mut RollView<'_>) -> RollVerdict {
        let roller = roll.roller();
        let total = roll.rolled_value;

        if self.marks.get(roller).is_none() {
            if Self::is_triga(roll) {
                return RollVerdict::decided(roller, format!("Triga! {total}"));
            }
            if self.marks.get(roller.other()) == Some(total) {
                return RollVerdict::decided(roller.other(), format!("{total} is taken"));
            }
            self.marks.set(roller, total);
            return RollVerdict::announce(
                RollOutcome::PassTurn,
                format!("{}: mark {total}", roller.label()),
            );
        }

        match self.marks.holder_of(total, roller) {
            Some(holder) => RollVerdict::decided(holder, format!("{total} hits the mark")),
            None => RollVerdict::new(RollOutcome::PassTurn),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::TableWorld;
    use crate::sim::rules::test_support::dice;

    fn check(triga: &mut Triga, world: &mut TableWorld, faces: [u8; 3], is_player_turn: bool) -> RollOutcome {
        let mut dice = dice(world, faces);
        let mut view = RollView {
            dice: &mut dice,
            rolled_value: faces.iter().sum(),
            is_player_turn,
        };
        triga.check_roll(&mut view).outcome
    }

    #[test]
    fn test_first_roll_triga_wins_without_mark() {
        let mut world = TableWorld::new();
        let mut triga = Triga::default();
        assert_eq!(
            check(&mut triga, &mut world, [3, 1, 2], true),
            RollOutcome::Decided { player_won: true }
        );
        assert_eq!(triga.marks(), Marks::default());
    }

    #[test]
    fn test_first_roll_triple_wins() {
        let mut world = TableWorld::new();
        let mut triga = Triga::default();
        // 12 is not a triga total, but three of a kind is
        assert_eq!(
            check(&mut triga, &mut world, [4, 4, 4], false),
            RollOutcome::Decided { player_won: false }
        );
    }

    #[test]
    fn test_marks_then_race() {
        let mut world = TableWorld::new();
        let mut triga = Triga::default();

        assert_eq!(check(&mut triga, &mut world, [5, 3, 1], true), RollOutcome::PassTurn);
        assert_eq!(check(&mut triga, &mut world, [6, 4, 2], false), RollOutcome::PassTurn);
        assert_eq!(triga.marks().player, Some(9));
        assert_eq!(triga.marks().opponent, Some(12));

        // Later rolls: a triga total is no longer special
        assert_eq!(check(&mut triga, &mut world, [1, 1, 1], true), RollOutcome::PassTurn);
        // Player rolls the opponent's mark
        assert_eq!(
            check(&mut triga, &mut world, [6, 5, 1], true),
            RollOutcome::Decided { player_won: false }
        );
    }

    #[test]
    fn test_rolling_own_mark_wins() {
        let mut world = TableWorld::new();
        let mut triga = Triga::default();
        check(&mut triga, &mut world, [5, 3, 1], true);
        check(&mut triga, &mut world, [6, 4, 2], false);

        assert_eq!(check(&mut triga, &mut world, [2, 2, 3], true), RollOutcome::PassTurn);
        assert_eq!(
            check(&mut triga, &mut world, [5, 5, 2], false),
            RollOutcome::Decided { player_won: false }
        );

        triga.reset();
        check(&mut triga, &mut world, [5, 3, 1], true);
        check(&mut triga, &mut world, [6, 4, 2], false);
        assert_eq!(
            check(&mut triga, &mut world, [4, 4, 1], true),
            RollOutcome::Decided { player_won: true }
        );
    }

    #[test]
    fn test_first_roll_matching_other_mark_loses() {
        let mut world = TableWorld::new();
        let mut triga = Triga::default();
        check(&mut triga, &mut world, [5, 3, 2], true);
        assert_eq!(
            check(&mut triga, &mut world, [4, 4, 2], false),
            RollOutcome::Decided { player_won: true }
        );
    }

    #[test]
    fn test_reset_clears_marks() {
        let mut world = TableWorld::new();
        let mut triga = Triga::default();
        check(&mut triga, &mut world, [5, 3, 1], true);
        triga.reset();
        assert_eq!(triga.marks(), Marks::default());
    }
}
