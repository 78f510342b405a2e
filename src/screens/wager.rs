use glam::Vec2;

use super::{GameTransition, HelpScreen, line, panel_rest};
use crate::app::GameContext;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::input::Key;
use crate::render::{DrawCommand, Frame, PanelKind};
use crate::sim::RuleKind;
use crate::state::{Screen, ScreenResult, Transition};
use crate::timer::{Easing, Timer, TweenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WagerEvent {
    SlidIn,
    SlidOut,
}

/// Stone panel asking how much to stake on the next round
#[derive(Debug)]
pub struct WagerScreen {
    max: u32,
    amount: u32,
    kind: RuleKind,
    timer: Timer<WagerEvent>,
    /// Panel offset below its resting spot
    slide: Option<TweenId>,
    ready: bool,
    closing: Option<ScreenResult>,
}

impl WagerScreen {
    /// Offers `[1, max]`, starting from the last wager placed
    pub fn new(ctx: &GameContext, max: u32, kind: RuleKind) -> Self {
        let max = max.max(1);
        Self {
            max,
            amount: ctx.last_wager.clamp(1, max),
            kind,
            timer: Timer::new(),
            slide: None,
            ready: false,
            closing: None,
        }
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    fn adjust(&mut self, ctx: &mut GameContext, raise: bool) {
        let next = if raise {
            (self.amount + 1).min(self.max)
        } else {
            self.amount.saturating_sub(1).max(1)
        };
        if next != self.amount {
            self.amount = next;
            ctx.audio.play(SoundEffect::Coin);
        }
    }

    fn close(&mut self, ctx: &GameContext, result: ScreenResult) {
        self.ready = false;
        self.closing = Some(result);
        let duration = ctx.settings.transition(PANEL_TRANSITION);
        self.slide = Some(self.timer.tween(
            0.0,
            CANVAS_HEIGHT,
            duration,
            Easing::EaseOutQuad,
            Some(WagerEvent::SlidOut),
        ));
    }
}

impl Screen<GameContext> for WagerScreen {
    fn name(&self) -> &'static str {
        "wager"
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameTransition {
        let duration = ctx.settings.transition(PANEL_TRANSITION);
        self.slide = Some(self.timer.tween(
            CANVAS_HEIGHT,
            0.0,
            duration,
            Easing::EaseOutQuad,
            Some(WagerEvent::SlidIn),
        ));
        ctx.audio.play(SoundEffect::Stone);
        Transition::None
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> GameTransition {
        for event in self.timer.update(dt) {
            match event {
                WagerEvent::SlidIn => self.ready = true,
                WagerEvent::SlidOut => {
                    let result = self.closing.take().unwrap_or(ScreenResult::Cancelled);
                    return Transition::PopWith(result);
                }
            }
        }
        if !self.ready {
            return Transition::None;
        }

        if ctx.input.is_key_pressed(Key::H) {
            return Transition::Push(Box::new(HelpScreen::new(ctx, self.kind)));
        }
        if ctx.input.any_pressed(&[Key::W, Key::ArrowUp]) {
            self.adjust(ctx, true);
        }
        if ctx.input.any_pressed(&[Key::S, Key::ArrowDown]) {
            self.adjust(ctx, false);
        }
        if ctx.input.is_key_pressed(Key::Enter) {
            log::debug!("Wagering {}", self.amount);
            ctx.last_wager = self.amount;
            self.close(ctx, ScreenResult::Wager(self.amount));
        } else if ctx.input.is_key_pressed(Key::Escape) {
            self.close(ctx, ScreenResult::Cancelled);
        }
        Transition::None
    }

    fn render(&self, _ctx: &GameContext, frame: &mut Frame) {
        let offset = self.slide.and_then(|id| self.timer.value(id)).unwrap_or(0.0);
        let origin = panel_rest() + Vec2::new(0.0, offset);
        frame.push(DrawCommand::Panel {
            kind: PanelKind::Wager,
            position: origin,
        });
        frame.text(format!("{} - how much will you wager?", self.kind), line(origin, 0));
        frame.text(format!("{}", self.amount), line(origin, 2));
        frame.text(format!("W/S to change (1 - {})", self.max), line(origin, 4));
        frame.text("ENTER to wager, ESC to leave the table", line(origin, 5));
    }
}
