//! Game driver
//!
//! [`GameContext`] is the shared state every screen works on. [`Game`] owns
//! it together with the screen stack and runs the fixed-timestep loop.

use crate::audio::AudioManager;
use crate::config::GameConfig;
use crate::consts::*;
use crate::error::ConfigError;
use crate::input::{InputState, Key};
use crate::persistence::{KeyValueStore, MemoryStore};
use crate::physics::{PhysicsWorld, TableWorld};
use crate::render::Frame;
use crate::rng::{GameRng, RandomSource};
use crate::screens::TitleScreen;
use crate::settings::Settings;
use crate::sim::Roster;
use crate::state::StateStack;

/// Everything the screens share
pub struct GameContext {
    pub config: GameConfig,
    pub settings: Settings,
    pub rng: Box<dyn RandomSource>,
    pub physics: Box<dyn PhysicsWorld>,
    pub input: InputState,
    pub audio: AudioManager,
    pub store: Box<dyn KeyValueStore>,
    pub roster: Roster,
    /// Wager placed last, offered first next time
    pub last_wager: u32,
}

impl GameContext {
    pub fn new(
        config: GameConfig,
        settings: Settings,
        mut rng: Box<dyn RandomSource>,
        physics: Box<dyn PhysicsWorld>,
        audio: AudioManager,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, ConfigError> {
        let roster = Roster::from_config(&config, rng.as_mut())?;
        Ok(Self {
            config,
            settings,
            rng,
            physics,
            input: InputState::new(),
            audio,
            store,
            roster,
            last_wager: 0,
        })
    }

    /// Embedded configuration, seeded RNG, in-memory store, silent audio
    pub fn headless(seed: u64) -> Result<Self, ConfigError> {
        let settings = Settings::default();
        let audio = AudioManager::headless(&settings);
        Self::new(
            GameConfig::embedded()?,
            settings,
            Box::new(GameRng::new(seed)),
            Box::new(TableWorld::new()),
            audio,
            Box::new(MemoryStore::new()),
        )
    }
}

impl std::fmt::Debug for GameContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameContext")
            .field("settings", &self.settings)
            .field("bodies", &self.physics.body_count())
            .field("player_money", &self.roster.player.money)
            .field("last_wager", &self.last_wager)
            .finish_non_exhaustive()
    }
}

/// Game instance: context plus screen stack
pub struct Game {
    ctx: GameContext,
    stack: StateStack<GameContext>,
    accumulator: f32,
    ticks: u64,
}

impl Game {
    /// Start at the title screen
    pub fn new(mut ctx: GameContext) -> Self {
        let mut stack = StateStack::new();
        stack.push(Box::new(TitleScreen::new()), &mut ctx);
        Self {
            ctx,
            stack,
            accumulator: 0.0,
            ticks: 0,
        }
    }

    /// Advance by a frame's worth of wall time using fixed ticks
    pub fn frame(&mut self, dt: f32) {
        let dt = dt.min(MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    /// One fixed tick; key presses are consumed or dropped by the end of it
    pub fn tick(&mut self) {
        self.stack.update(&mut self.ctx, SIM_DT);
        self.ctx.input.clear();
        self.ticks += 1;
    }

    pub fn press(&mut self, key: Key) {
        self.ctx.input.press(key);
    }

    pub fn render(&self) -> Frame {
        let mut frame = Frame::new();
        self.stack.render(&self.ctx, &mut frame);
        frame
    }

    pub fn is_running(&self) -> bool {
        !self.stack.is_quitting() && !self.stack.is_empty()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn context(&self) -> &GameContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut GameContext {
        &mut self.ctx
    }

    pub fn stack(&self) -> &StateStack<GameContext> {
        &self.stack
    }

    pub fn top_name(&self) -> Option<&'static str> {
        self.stack.top_name()
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("screens", &self.stack.names())
            .field("ticks", &self.ticks)
            .finish_non_exhaustive()
    }
}

/// Presses keys on a fixed cadence so the game plays itself headless
#[derive(Debug, Clone)]
pub struct AutoPilot {
    interval: f32,
    elapsed: f32,
    presses: u64,
}

impl AutoPilot {
    pub fn new(interval: f32) -> Self {
        Self {
            interval: interval.max(SIM_DT),
            elapsed: 0.0,
            presses: 0,
        }
    }

    /// Key to press this frame for the active screen, if any
    pub fn next_key(&mut self, dt: f32, top: Option<&str>) -> Option<Key> {
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return None;
        }
        self.elapsed = 0.0;

        let key = match top? {
            "title" | "wager" | "help" | "game_over" | "victory" => Key::Enter,
            // Walk the carousel past broke opponents
            "opponent_selection" if self.presses % 2 == 1 => Key::D,
            "opponent_selection" => Key::Enter,
            "play" => Key::Space,
            _ => return None,
        };
        self.presses += 1;
        Some(key)
    }
}

impl Default for AutoPilot {
    fn default() -> Self {
        Self::new(0.25)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_on_title() {
        let game = Game::new(GameContext::headless(3).unwrap());
        assert_eq!(game.top_name(), Some("title"));
        assert!(game.is_running());
        assert!(game.render().contains_text("Dedos de Toledo"));
    }

    #[test]
    fn test_frame_runs_fixed_ticks() {
        let mut game = Game::new(GameContext::headless(3).unwrap());
        game.frame(SIM_DT * 3.5);
        assert_eq!(game.ticks(), 3);

        // Long frames are clamped to MAX_SUBSTEPS ticks
        game.frame(5.0);
        assert_eq!(game.ticks(), 3 + MAX_SUBSTEPS as u64);
    }

    #[test]
    fn test_unconsumed_input_is_dropped() {
        let mut game = Game::new(GameContext::headless(3).unwrap());
        game.press(Key::Space);
        game.tick();
        assert!(game.context().input.is_empty());
    }

    #[test]
    fn test_escape_on_title_quits() {
        let mut game = Game::new(GameContext::headless(3).unwrap());
        game.press(Key::Escape);
        game.tick();
        assert!(!game.is_running());
    }

    #[test]
    fn test_autopilot_cadence() {
        let mut pilot = AutoPilot::new(0.5);
        assert_eq!(pilot.next_key(0.25, Some("title")), None);
        assert_eq!(pilot.next_key(0.25, Some("title")), Some(Key::Enter));
        assert_eq!(pilot.next_key(0.5, Some("result")), None);
        assert_eq!(pilot.next_key(0.5, Some("play")), Some(Key::Space));
        assert_eq!(pilot.next_key(0.5, None), None);
    }
}
