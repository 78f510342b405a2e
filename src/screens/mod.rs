//! Game screens
//!
//! Every screen works on the shared [`GameContext`] and asks for stack changes
//! through the returned [`Transition`].

mod ending;
mod help;
mod play;
mod result;
mod selection;
mod title;
mod wager;

pub use ending::{Ending, EndingScreen};
pub use help::HelpScreen;
pub use play::PlayScreen;
pub use result::ResultScreen;
pub use selection::OpponentSelectionScreen;
pub use title::TitleScreen;
pub use wager::WagerScreen;

use glam::Vec2;

use crate::app::GameContext;
use crate::consts::*;
use crate::state::Transition;

pub type GameTransition = Transition<GameContext>;

/// Resting spot of a centered stone panel
pub(crate) fn panel_rest() -> Vec2 {
    Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0)
}

/// Line `n` of text inside a panel at `origin`
pub(crate) fn line(origin: Vec2, n: usize) -> Vec2 {
    origin + Vec2::new(0.0, -120.0 + n as f32 * 48.0)
}
