//! Panquist stakes table
//!
//! Keyed by the winning total and the faces that produced it, sorted from
//! high to low. Only totals that can be marks (7 through 14) have entries.

use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Totals a Panquist mark may take
pub const MARK_TOTALS: RangeInclusive<u8> = 7..=14;

/// Share of the wager paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stake {
    Quarter,
    Half,
    ThreeQuarters,
    Full,
}

impl Stake {
    pub fn fraction(self) -> f32 {
        match self {
            Stake::Quarter => 0.25,
            Stake::Half => 0.5,
            Stake::ThreeQuarters => 0.75,
            Stake::Full => 1.0,
        }
    }

    /// Classify faces already sorted high to low
    fn classify(sorted: [u8; 3]) -> Self {
        let [high, mid, low] = sorted;
        if high == low {
            Stake::Full
        } else if high == mid || mid == low {
            Stake::ThreeQuarters
        } else if high == 6 && low == 1 {
            Stake::Half
        } else {
            Stake::Quarter
        }
    }
}

#[derive(Debug)]
pub struct StakesTable {
    entries: HashMap<(u8, [u8; 3]), Stake>,
}

impl StakesTable {
    /// Shared table, built on first use
    pub fn standard() -> &'static StakesTable {
        static TABLE: OnceLock<StakesTable> = OnceLock::new();
        TABLE.get_or_init(Self::build)
    }

    fn build() -> Self {
        let mut entries = HashMap::new();
        for high in 1..=6u8 {
            for mid in 1..=high {
                for low in 1..=mid {
                    let total = high + mid + low;
                    if MARK_TOTALS.contains(&total) {
                        let sorted = [high, mid, low];
                        entries.insert((total, sorted), Stake::classify(sorted));
                    }
                }
            }
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stake for a winning roll; unlisted rolls pay a quarter
    pub fn lookup(&self, total: u8, faces: [u8; 3]) -> Stake {
        let mut sorted = faces;
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        match self.entries.get(&(total, sorted)) {
            Some(stake) => *stake,
            None => {
                log::debug!("No stake for {total} from {sorted:?}; paying a quarter");
                Stake::Quarter
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_mark_totals_only() {
        let table = StakesTable::standard();
        assert!(!table.is_empty());
        for (total, faces) in table.entries.keys() {
            assert!(MARK_TOTALS.contains(total));
            assert_eq!(faces.iter().sum::<u8>(), *total);
            assert!(faces[0] >= faces[1] && faces[1] >= faces[2]);
        }
    }

    #[test]
    fn test_lookup_sorts_faces() {
        let table = StakesTable::standard();
        assert_eq!(table.lookup(10, [1, 3, 6]), Stake::Half);
        assert_eq!(table.lookup(10, [6, 3, 1]), Stake::Half);
        assert_eq!(table.lookup(12, [4, 4, 4]), Stake::Full);
        assert_eq!(table.lookup(11, [5, 1, 5]), Stake::ThreeQuarters);
        assert_eq!(table.lookup(9, [2, 3, 4]), Stake::Quarter);
    }

    #[test]
    fn test_unlisted_roll_pays_quarter() {
        let table = StakesTable::standard();
        assert_eq!(table.lookup(3, [1, 1, 1]), Stake::Quarter);
    }
}
