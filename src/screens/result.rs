use glam::Vec2;

use super::{GameTransition, line, panel_rest};
use crate::app::GameContext;
use crate::consts::*;
use crate::render::{DrawCommand, Frame, PanelKind};
use crate::state::{Screen, Transition};
use crate::timer::{Easing, Timer, TweenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultEvent {
    PannedIn,
    Held,
    PannedOut,
}

/// Announcement panel: pans in, holds, pans out, pops itself
#[derive(Debug)]
pub struct ResultScreen {
    text: String,
    timer: Timer<ResultEvent>,
    /// Horizontal offset from the resting spot
    pan: Option<TweenId>,
}

impl ResultScreen {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timer: Timer::new(),
            pan: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Screen<GameContext> for ResultScreen {
    fn name(&self) -> &'static str {
        "result"
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameTransition {
        log::info!("{}", self.text);
        let duration = ctx.settings.transition(PANEL_TRANSITION);
        self.pan = Some(self.timer.tween(
            -CANVAS_WIDTH,
            0.0,
            duration,
            Easing::EaseOutQuad,
            Some(ResultEvent::PannedIn),
        ));
        Transition::None
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> GameTransition {
        for event in self.timer.update(dt) {
            match event {
                ResultEvent::PannedIn => {
                    self.timer.schedule(RESULT_HOLD, ResultEvent::Held);
                }
                ResultEvent::Held => {
                    let duration = ctx.settings.transition(PANEL_TRANSITION);
                    self.pan = Some(self.timer.tween(
                        0.0,
                        CANVAS_WIDTH,
                        duration,
                        Easing::Linear,
                        Some(ResultEvent::PannedOut),
                    ));
                }
                ResultEvent::PannedOut => return Transition::Pop,
            }
        }
        Transition::None
    }

    fn render(&self, _ctx: &GameContext, frame: &mut Frame) {
        let offset = self.pan.and_then(|id| self.timer.value(id)).unwrap_or(0.0);
        let origin = panel_rest() + Vec2::new(offset, 0.0);
        frame.push(DrawCommand::Panel {
            kind: PanelKind::Result,
            position: origin,
        });
        frame.text(self.text.as_str(), line(origin, 2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::GameContext;

    #[test]
    fn test_pops_after_pan_hold_pan() {
        let mut ctx = GameContext::headless(1).unwrap();
        let mut screen = ResultScreen::new("Triga! You win 10!");
        screen.enter(&mut ctx);

        let total = 2.0 * PANEL_TRANSITION + RESULT_HOLD;
        let mut elapsed = 0.0;
        let mut popped_at = None;
        while elapsed < total + 1.0 {
            elapsed += SIM_DT;
            if matches!(screen.update(&mut ctx, SIM_DT), Transition::Pop) {
                popped_at = Some(elapsed);
                break;
            }
        }

        let popped_at = popped_at.expect("result screen never popped");
        assert!(popped_at >= total - 0.05, "popped too early at {popped_at}");
        assert!(popped_at <= total + 0.05, "popped too late at {popped_at}");
    }

    #[test]
    fn test_renders_its_line() {
        let ctx = GameContext::headless(1).unwrap();
        let screen = ResultScreen::new("You roll first");
        let mut frame = Frame::new();
        screen.render(&ctx, &mut frame);
        assert!(frame.contains_text("You roll first"));
    }
}
