//! Match simulation
//!
//! All gameplay rules live here. The match never renders, plays audio, or
//! polls input directly:
//! - Input arrives as a [`TickInput`] per tick
//! - Money is borrowed per tick through [`MatchEnv`]
//! - Side effects leave as [`MatchSignal`]s for the owning screen

pub mod character;
pub mod dice_match;
pub mod die;
pub mod rules;

pub use character::{Character, Opponent, PortraitRef, Roster, Side};
pub use dice_match::{DiceMatch, MatchEnd, MatchEnv, MatchSignal, Phase, TickInput, WagerError, break_tie};
pub use die::{Die, DieState, Direction};
pub use rules::{RollOutcome, RollVerdict, RollView, RuleKind, RuleVariant, Rules, Settlement};
