use glam::Vec2;

use super::{EndingScreen, GameTransition, PlayScreen, line, panel_rest};
use crate::app::GameContext;
use crate::consts::FADE_DURATION;
use crate::input::Key;
use crate::persistence::{MatchSnapshot, SaveGame};
use crate::render::{DrawCommand, Frame, PanelKind};
use crate::state::{Screen, ScreenResult, Transition};
use crate::timer::{Easing, Timer, TweenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionEvent {
    FadedOut,
}

/// Carousel of opponents to challenge
#[derive(Debug)]
pub struct OpponentSelectionScreen {
    selected: usize,
    greeting: Option<String>,
    notice: Option<String>,
    timer: Timer<SelectionEvent>,
    /// Black overlay opacity
    fade: Option<TweenId>,
    leaving: bool,
    resume: Option<MatchSnapshot>,
}

impl Default for OpponentSelectionScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl OpponentSelectionScreen {
    pub fn new() -> Self {
        Self {
            selected: 0,
            greeting: None,
            notice: None,
            timer: Timer::new(),
            fade: None,
            leaving: false,
            resume: None,
        }
    }

    /// Selection that jumps straight back into a saved match
    pub fn resuming(snapshot: Option<MatchSnapshot>) -> Self {
        Self {
            selected: snapshot.as_ref().map_or(0, |s| s.opponent_index),
            resume: snapshot,
            ..Self::new()
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Replace the current fade with one running from `from` to `to`
    fn start_fade(&mut self, ctx: &GameContext, from: f32, to: f32, event: Option<SelectionEvent>) {
        if let Some(old) = self.fade.take() {
            self.timer.forget(old);
        }
        let duration = ctx.settings.transition(FADE_DURATION);
        self.fade = Some(self.timer.tween(from, to, duration, Easing::Linear, event));
    }

    fn fade_in(&mut self, ctx: &GameContext) {
        self.start_fade(ctx, 1.0, 0.0, None);
    }

    fn greet(&mut self, ctx: &mut GameContext) {
        self.notice = None;
        self.greeting = ctx
            .roster
            .opponents
            .get(self.selected)
            .and_then(|o| o.random_greeting(ctx.rng.as_mut()))
            .map(str::to_owned);
    }

    fn step(&mut self, ctx: &mut GameContext, forward: bool) {
        let count = ctx.roster.opponents.len();
        if count == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % count
        } else {
            (self.selected + count - 1) % count
        };
        self.greet(ctx);
    }

    fn challenge(&mut self, ctx: &mut GameContext) {
        let Some(opponent) = ctx.roster.opponent(self.selected) else {
            return;
        };
        if opponent.is_broke() {
            self.notice = Some(format!("{} has nothing left to wager", opponent.name));
            return;
        }
        log::info!("Challenging {} at {}", opponent.name, opponent.rule);
        self.leaving = true;
        self.start_fade(ctx, 0.0, 1.0, Some(SelectionEvent::FadedOut));
    }

    fn start_match(&mut self, ctx: &mut GameContext) -> GameTransition {
        match PlayScreen::new(ctx, self.selected) {
            Some(play) => Transition::Push(Box::new(play)),
            None => Transition::None,
        }
    }
}

impl Screen<GameContext> for OpponentSelectionScreen {
    fn name(&self) -> &'static str {
        "opponent_selection"
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameTransition {
        self.fade_in(ctx);
        self.greet(ctx);

        if let Some(snapshot) = self.resume.take()
            && let Some(play) = PlayScreen::resume(ctx, &snapshot)
        {
            return Transition::Push(Box::new(play));
        }
        Transition::None
    }

    fn re_enter(&mut self, ctx: &mut GameContext, _result: Option<ScreenResult>) -> GameTransition {
        if let Err(e) = SaveGame::capture(&ctx.roster).save(ctx.store.as_mut()) {
            log::warn!("Failed to save game: {e}");
        }
        if ctx.roster.all_opponents_broke() {
            return Transition::Reset(Box::new(EndingScreen::victory()));
        }

        self.leaving = false;
        self.fade_in(ctx);
        self.greet(ctx);
        Transition::None
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> GameTransition {
        if let Some(SelectionEvent::FadedOut) = self.timer.update(dt).into_iter().next() {
            return self.start_match(ctx);
        }
        if self.leaving {
            return Transition::None;
        }

        if ctx.input.is_key_pressed(Key::Escape) {
            return Transition::Quit;
        }
        if ctx.input.any_pressed(&[Key::A, Key::ArrowLeft]) {
            self.step(ctx, false);
        }
        if ctx.input.any_pressed(&[Key::D, Key::ArrowRight]) {
            self.step(ctx, true);
        }
        if ctx.input.is_key_pressed(Key::Enter) {
            self.challenge(ctx);
        }
        Transition::None
    }

    fn render(&self, ctx: &GameContext, frame: &mut Frame) {
        let origin = panel_rest();
        frame.push(DrawCommand::Panel {
            kind: PanelKind::Selection,
            position: origin,
        });
        frame.text(format!("Your purse: {}", ctx.roster.player.money), line(origin, 0));

        if let Some(opponent) = ctx.roster.opponent(self.selected) {
            frame.push(DrawCommand::Portrait {
                x: opponent.portrait.x,
                y: opponent.portrait.y,
                position: origin - Vec2::new(0.0, 220.0),
            });
            frame.text(opponent.full_name.as_str(), line(origin, 1));
            frame.text(format!("Plays {}", opponent.rule), line(origin, 2));
            frame.text(format!("Purse: {}", opponent.character.money), line(origin, 3));
            if let Some(greeting) = &self.greeting {
                frame.text(format!("\"{greeting}\""), line(origin, 4));
            }
        }
        if let Some(notice) = &self.notice {
            frame.text(notice.as_str(), line(origin, 6));
        }

        let alpha = self.fade.and_then(|id| self.timer.value(id)).unwrap_or(0.0);
        if alpha > 0.0 {
            frame.push(DrawCommand::Fade { alpha });
        }
    }
}
