use super::{GameTransition, OpponentSelectionScreen, line, panel_rest};
use crate::app::GameContext;
use crate::audio::SoundEffect;
use crate::input::Key;
use crate::persistence::{MatchSnapshot, SaveGame};
use crate::render::{DrawCommand, Frame, PanelKind};
use crate::state::{Screen, Transition};

const OPTIONS: [&str; 2] = ["New Game", "Load Game"];

/// New game or continue
#[derive(Debug, Default)]
pub struct TitleScreen {
    selected: usize,
}

impl TitleScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &'static str {
        OPTIONS[self.selected]
    }

    fn new_game(ctx: &mut GameContext) -> GameTransition {
        ctx.roster.reset(ctx.rng.as_mut());
        ctx.store.remove(MatchSnapshot::KEY);
        ctx.store.remove(SaveGame::KEY);
        ctx.last_wager = 0;
        log::info!("New game");
        Transition::Push(Box::new(OpponentSelectionScreen::new()))
    }

    fn load_game(ctx: &mut GameContext) -> GameTransition {
        let Some(save) = SaveGame::load(ctx.store.as_ref()) else {
            log::info!("No saved game, starting a new one");
            return Self::new_game(ctx);
        };
        if let Err(e) = save.apply(&mut ctx.roster) {
            log::warn!("Saved game does not fit this roster ({e}), starting a new one");
            return Self::new_game(ctx);
        }

        log::info!("Loaded saved game");
        let resume = MatchSnapshot::load(ctx.store.as_ref());
        Transition::Push(Box::new(OpponentSelectionScreen::resuming(resume)))
    }
}

impl Screen<GameContext> for TitleScreen {
    fn name(&self) -> &'static str {
        "title"
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameTransition {
        ctx.audio.stop_all();
        ctx.audio.play(SoundEffect::Ambiance);
        ctx.audio.play(SoundEffect::Music);
        Transition::None
    }

    fn update(&mut self, ctx: &mut GameContext, _dt: f32) -> GameTransition {
        if ctx.input.any_pressed(&[Key::W, Key::ArrowUp, Key::S, Key::ArrowDown]) {
            self.selected = (self.selected + 1) % OPTIONS.len();
        }
        if ctx.input.is_key_pressed(Key::Escape) {
            return Transition::Quit;
        }
        if ctx.input.is_key_pressed(Key::Enter) {
            return match self.selected {
                0 => Self::new_game(ctx),
                _ => Self::load_game(ctx),
            };
        }
        Transition::None
    }

    fn render(&self, _ctx: &GameContext, frame: &mut Frame) {
        let origin = panel_rest();
        frame.push(DrawCommand::Panel {
            kind: PanelKind::Title,
            position: origin,
        });
        frame.text("Dedos de Toledo", line(origin, 0));
        for (i, option) in OPTIONS.iter().enumerate() {
            let marker = if i == self.selected { "> " } else { "  " };
            frame.text(format!("{marker}{option}"), line(origin, i + 2));
        }
    }
}
