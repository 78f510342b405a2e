use super::{GameTransition, TitleScreen, line, panel_rest};
use crate::app::GameContext;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::input::Key;
use crate::persistence::{MatchSnapshot, SaveGame};
use crate::render::{DrawCommand, Frame, PanelKind};
use crate::state::{Screen, Transition};
use crate::timer::{Easing, Timer, TweenId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// The player is broke
    GameOver,
    /// Every opponent is broke
    Victory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EndingEvent {
    FadedIn,
}

/// Terminal screen; ENTER goes back to the title
#[derive(Debug)]
pub struct EndingScreen {
    ending: Ending,
    timer: Timer<EndingEvent>,
    fade: Option<TweenId>,
    ready: bool,
}

impl EndingScreen {
    fn new(ending: Ending) -> Self {
        Self {
            ending,
            timer: Timer::new(),
            fade: None,
            ready: false,
        }
    }

    pub fn game_over() -> Self {
        Self::new(Ending::GameOver)
    }

    pub fn victory() -> Self {
        Self::new(Ending::Victory)
    }

    pub fn ending(&self) -> Ending {
        self.ending
    }
}

impl Screen<GameContext> for EndingScreen {
    fn name(&self) -> &'static str {
        match self.ending {
            Ending::GameOver => "game_over",
            Ending::Victory => "victory",
        }
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameTransition {
        log::info!("Game ended: {:?}", self.ending);
        ctx.audio.stop_all();
        let fade = match self.ending {
            Ending::GameOver => {
                ctx.audio.play(SoundEffect::GameOverMusic);
                GAME_OVER_FADE
            }
            Ending::Victory => {
                ctx.audio.play(SoundEffect::Win);
                VICTORY_FADE
            }
        };
        // A finished game cannot be continued
        ctx.store.remove(SaveGame::KEY);
        ctx.store.remove(MatchSnapshot::KEY);

        let duration = ctx.settings.transition(fade);
        self.fade = Some(self.timer.tween(
            0.0,
            1.0,
            duration,
            Easing::Linear,
            Some(EndingEvent::FadedIn),
        ));
        Transition::None
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> GameTransition {
        for event in self.timer.update(dt) {
            match event {
                EndingEvent::FadedIn => self.ready = true,
            }
        }
        if self.ready && ctx.input.is_key_pressed(Key::Enter) {
            return Transition::Reset(Box::new(TitleScreen::new()));
        }
        Transition::None
    }

    fn render(&self, ctx: &GameContext, frame: &mut Frame) {
        let alpha = self.fade.and_then(|id| self.timer.value(id)).unwrap_or(0.0);
        frame.push(DrawCommand::Fade { alpha });

        let origin = panel_rest();
        let (kind, headline) = match self.ending {
            Ending::GameOver => (PanelKind::GameOver, "You have lost everything"),
            Ending::Victory => (PanelKind::Victory, "Toledo has nothing left to wager"),
        };
        frame.push(DrawCommand::Panel { kind, position: origin });
        frame.text_alpha(headline, line(origin, 1), alpha);
        frame.text_alpha(format!("Final purse: {}", ctx.roster.player.money), line(origin, 3), alpha);
        if self.ready {
            frame.text("Press ENTER", line(origin, 5));
        }
    }
}
