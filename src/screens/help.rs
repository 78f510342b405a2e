use glam::Vec2;

use super::{GameTransition, line, panel_rest};
use crate::app::GameContext;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::input::Key;
use crate::render::{DrawCommand, Frame, PanelKind};
use crate::sim::RuleKind;
use crate::state::{Screen, Transition};
use crate::timer::{Easing, Timer, TweenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HelpEvent {
    SlidIn,
    SlidOut,
}

/// How to play the current rule
#[derive(Debug)]
pub struct HelpScreen {
    kind: RuleKind,
    lines: Vec<String>,
    timer: Timer<HelpEvent>,
    slide: Option<TweenId>,
    ready: bool,
}

impl HelpScreen {
    pub fn new(ctx: &GameContext, kind: RuleKind) -> Self {
        let lines = ctx
            .config
            .instructions_for(kind)
            .lines()
            .map(str::to_owned)
            .collect();
        Self {
            kind,
            lines,
            timer: Timer::new(),
            slide: None,
            ready: false,
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }
}

impl Screen<GameContext> for HelpScreen {
    fn name(&self) -> &'static str {
        "help"
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameTransition {
        let duration = ctx.settings.transition(PANEL_TRANSITION);
        self.slide = Some(self.timer.tween(
            -CANVAS_HEIGHT,
            0.0,
            duration,
            Easing::EaseOutQuad,
            Some(HelpEvent::SlidIn),
        ));
        ctx.audio.play(SoundEffect::Stone);
        Transition::None
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> GameTransition {
        for event in self.timer.update(dt) {
            match event {
                HelpEvent::SlidIn => self.ready = true,
                HelpEvent::SlidOut => return Transition::Pop,
            }
        }

        if self.ready && ctx.input.any_pressed(&[Key::H, Key::Enter, Key::Escape]) {
            self.ready = false;
            let duration = ctx.settings.transition(PANEL_TRANSITION);
            self.slide = Some(self.timer.tween(
                0.0,
                -CANVAS_HEIGHT,
                duration,
                Easing::Linear,
                Some(HelpEvent::SlidOut),
            ));
        }
        Transition::None
    }

    fn render(&self, _ctx: &GameContext, frame: &mut Frame) {
        let offset = self.slide.and_then(|id| self.timer.value(id)).unwrap_or(0.0);
        let origin = panel_rest() + Vec2::new(0.0, offset);
        frame.push(DrawCommand::Panel {
            kind: PanelKind::Help,
            position: origin,
        });
        frame.text(format!("How to play {}", self.kind), line(origin, 0));
        for (i, text) in self.lines.iter().enumerate() {
            frame.text(text.as_str(), line(origin, i + 2));
        }
    }
}
