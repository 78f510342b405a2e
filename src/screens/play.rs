use std::collections::VecDeque;

use glam::Vec2;

use super::{EndingScreen, GameTransition, HelpScreen, ResultScreen, WagerScreen};
use crate::app::GameContext;
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::input::Key;
use crate::persistence::{MatchSnapshot, SaveGame};
use crate::physics::{BodyHandle, add_board_edges};
use crate::render::{DrawCommand, Frame};
use crate::sim::{DiceMatch, MatchEnd, MatchEnv, MatchSignal, Phase, RuleKind, TickInput};
use crate::state::{Screen, ScreenResult, Transition};
use crate::timer::{Easing, Timer, TweenId};
use crate::{board_center, board_origin};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayEvent {
    BoardInPlace,
}

/// Sub-screens the match is waiting to show, in order
#[derive(Debug, Clone, PartialEq)]
enum Overlay {
    Announce(String),
    Wager { max: u32 },
    End(MatchEnd),
}

/// The table: owns the match and drives it one tick at a time
#[derive(Debug)]
pub struct PlayScreen {
    opponent_index: usize,
    dice_match: DiceMatch,
    edges: [BodyHandle; 4],
    timer: Timer<PlayEvent>,
    board_slide: Option<TweenId>,
    starting: bool,
    overlays: VecDeque<Overlay>,
}

impl PlayScreen {
    /// Fresh match against opponent `opponent_index`
    pub fn new(ctx: &mut GameContext, opponent_index: usize) -> Option<Self> {
        let Some(kind) = ctx.roster.opponent(opponent_index).map(|o| o.rule) else {
            log::error!("No opponent at index {opponent_index}");
            return None;
        };
        let edges = Self::prepare_table(ctx);
        let dice_match = DiceMatch::new(
            kind,
            opponent_index,
            ctx.physics.as_mut(),
            ctx.settings.opponent_roll_delay,
        );
        Some(Self::with_match(opponent_index, dice_match, edges))
    }

    /// Continue a saved match; `None` if the snapshot no longer fits
    pub fn resume(ctx: &mut GameContext, snapshot: &MatchSnapshot) -> Option<Self> {
        let index = snapshot.opponent_index;
        let Some(opponent) = ctx.roster.opponent(index) else {
            log::warn!("Saved match against unknown opponent {index}");
            return Self::discard(ctx);
        };
        if opponent.is_broke() || ctx.roster.player.is_broke() {
            log::warn!("Saved match has a broke player, discarding");
            return Self::discard(ctx);
        }
        let kind = opponent.rule;
        let max = DiceMatch::max_wager(&ctx.roster.player, &opponent.character);
        let (player_money, opponent_money) = (ctx.roster.player.money, opponent.character.money);

        if snapshot.phase != Phase::Wager && snapshot.wager_amount > max {
            log::warn!(
                "Saved wager {} is more than the purses cover ({max}), discarding",
                snapshot.wager_amount
            );
            return Self::discard(ctx);
        }
        if !snapshot.purses_match(player_money, opponent_money) {
            log::warn!(
                "Saved match was left with purses {:?}, not ({player_money}, {opponent_money}), discarding",
                snapshot.purses
            );
            return Self::discard(ctx);
        }

        let edges = Self::prepare_table(ctx);
        match snapshot.restore(kind, ctx.physics.as_mut(), ctx.settings.opponent_roll_delay) {
            Ok(dice_match) => Some(Self::with_match(index, dice_match, edges)),
            Err(e) => {
                log::warn!("Cannot resume saved match: {e}");
                ctx.physics.clear();
                Self::discard(ctx)
            }
        }
    }

    fn discard(ctx: &mut GameContext) -> Option<Self> {
        ctx.store.remove(MatchSnapshot::KEY);
        None
    }

    /// Clear leftovers from earlier matches and build the board edges
    fn prepare_table(ctx: &mut GameContext) -> [BodyHandle; 4] {
        ctx.physics.clear();
        add_board_edges(
            ctx.physics.as_mut(),
            board_origin(),
            Vec2::new(BOARD_WIDTH, BOARD_HEIGHT),
            BOARD_EDGE_THICKNESS,
        )
    }

    fn with_match(opponent_index: usize, dice_match: DiceMatch, edges: [BodyHandle; 4]) -> Self {
        Self {
            opponent_index,
            dice_match,
            edges,
            timer: Timer::new(),
            board_slide: None,
            starting: true,
            overlays: VecDeque::new(),
        }
    }

    pub fn dice_match(&self) -> &DiceMatch {
        &self.dice_match
    }

    pub fn kind(&self) -> RuleKind {
        self.dice_match.kind()
    }

    /// Save the match together with the purses it has moved so far
    ///
    /// Snapshot first, roster second. A roster write that fails after the
    /// snapshot landed is caught on resume by the purses it records.
    fn save(&self, ctx: &mut GameContext) {
        let mut snapshot = MatchSnapshot::capture(&self.dice_match, ctx.physics.as_ref());
        if let Some(opponent) = ctx.roster.opponent(self.opponent_index) {
            snapshot = snapshot.with_purses(ctx.roster.player.money, opponent.character.money);
        }
        let saved = snapshot
            .save(ctx.store.as_mut())
            .and_then(|()| SaveGame::capture(&ctx.roster).save(ctx.store.as_mut()));
        if let Err(e) = saved {
            log::warn!("Failed to save match: {e}");
        }
    }

    fn handle_signals(&mut self, ctx: &mut GameContext, signals: Vec<MatchSignal>) {
        for signal in signals {
            match signal {
                MatchSignal::PhaseChanged(Phase::PostGame) => ctx.store.remove(MatchSnapshot::KEY),
                MatchSignal::PhaseChanged(_) => self.save(ctx),
                MatchSignal::RequestWager { max } => self.overlays.push_back(Overlay::Wager { max }),
                MatchSignal::Announce(text) => self.overlays.push_back(Overlay::Announce(text)),
                MatchSignal::Payout { .. } => {}
                MatchSignal::Finished(end) => self.overlays.push_back(Overlay::End(end)),
                MatchSignal::Sound(effect) => ctx.audio.play(effect),
            }
        }
    }

    /// Suspend the match behind the next pending sub-screen
    fn next_overlay(&mut self, ctx: &GameContext) -> GameTransition {
        let Some(overlay) = self.overlays.pop_front() else {
            return Transition::None;
        };
        match overlay {
            Overlay::Announce(text) => Transition::Push(Box::new(ResultScreen::new(text))),
            Overlay::Wager { max } => Transition::Push(Box::new(WagerScreen::new(ctx, max, self.kind()))),
            Overlay::End(MatchEnd::PlayerBroke) => Transition::Replace(Box::new(EndingScreen::game_over())),
            Overlay::End(MatchEnd::OpponentBroke) => Transition::Pop,
        }
    }

    fn accept_wager(&mut self, ctx: &mut GameContext, amount: u32) {
        let Some(opponent) = ctx.roster.opponent(self.opponent_index) else {
            return;
        };
        if let Err(e) = self
            .dice_match
            .accept_wager(amount, &ctx.roster.player, &opponent.character)
        {
            log::warn!("Wager rejected: {e}");
            let max = DiceMatch::max_wager(&ctx.roster.player, &opponent.character);
            self.overlays.push_front(Overlay::Wager { max });
        }
    }
}

impl Screen<GameContext> for PlayScreen {
    fn name(&self) -> &'static str {
        "play"
    }

    fn enter(&mut self, ctx: &mut GameContext) -> GameTransition {
        let duration = ctx.settings.transition(PANEL_TRANSITION);
        self.board_slide = Some(self.timer.tween(
            CANVAS_WIDTH,
            0.0,
            duration,
            Easing::EaseOutQuad,
            Some(PlayEvent::BoardInPlace),
        ));
        ctx.audio.play(SoundEffect::Table);
        self.save(ctx);
        Transition::None
    }

    fn exit(&mut self, ctx: &mut GameContext) -> GameTransition {
        self.dice_match.release(ctx.physics.as_mut());
        for edge in self.edges {
            ctx.physics.remove_body(edge);
        }
        ctx.store.remove(MatchSnapshot::KEY);
        Transition::None
    }

    fn re_enter(&mut self, ctx: &mut GameContext, result: Option<ScreenResult>) -> GameTransition {
        match result {
            Some(ScreenResult::Wager(amount)) => self.accept_wager(ctx, amount),
            Some(ScreenResult::Cancelled) => {
                log::info!("Backed out of the match");
                return Transition::Pop;
            }
            None => {}
        }
        self.next_overlay(ctx)
    }

    fn update(&mut self, ctx: &mut GameContext, dt: f32) -> GameTransition {
        for event in self.timer.update(dt) {
            match event {
                PlayEvent::BoardInPlace => self.starting = false,
            }
        }
        if self.starting {
            return Transition::None;
        }

        let pending = self.next_overlay(ctx);
        if !matches!(pending, Transition::None) {
            return pending;
        }

        if ctx.input.is_key_pressed(Key::H) {
            return Transition::Push(Box::new(HelpScreen::new(ctx, self.kind())));
        }

        ctx.physics.step(dt);
        let input = TickInput {
            roll: ctx.input.any_pressed(&[Key::Space, Key::Enter]),
        };

        let Some(opponent) = ctx.roster.opponents.get_mut(self.opponent_index) else {
            log::error!("Opponent {} vanished mid-match", self.opponent_index);
            return Transition::Pop;
        };
        let mut env = MatchEnv {
            physics: ctx.physics.as_mut(),
            rng: ctx.rng.as_mut(),
            player: &mut ctx.roster.player,
            opponent: &mut opponent.character,
        };
        let signals = self.dice_match.update(dt, &input, &mut env);
        self.handle_signals(ctx, signals);

        self.next_overlay(ctx)
    }

    fn render(&self, ctx: &GameContext, frame: &mut Frame) {
        let offset_x = self
            .board_slide
            .and_then(|id| self.timer.value(id))
            .unwrap_or(0.0);
        frame.push(DrawCommand::Board { offset_x });

        let shift = Vec2::new(offset_x, 0.0);
        for die in self.dice_match.dice() {
            let Some(position) = die.position(ctx.physics.as_ref()) else {
                continue;
            };
            frame.push(DrawCommand::Die {
                position: position + shift,
                angle: die.angle(ctx.physics.as_ref()),
                value: die.value(),
                rolling: die.is_rolling(),
                held: die.is_held(),
            });
        }

        let hud = board_origin() + shift + Vec2::new(BOARD_WIDTH + 40.0, 80.0);
        let Some(opponent) = ctx.roster.opponent(self.opponent_index) else {
            return;
        };
        frame.text(format!("{} ({})", opponent.name, self.kind()), hud);
        frame.text(format!("Purse: {}", opponent.character.money), hud + Vec2::new(0.0, 40.0));
        frame.text(format!("Your purse: {}", ctx.roster.player.money), hud + Vec2::new(0.0, 100.0));
        if self.dice_match.wager() > 0 {
            frame.text(format!("Wager: {}", self.dice_match.wager()), hud + Vec2::new(0.0, 140.0));
        }
        if matches!(self.dice_match.phase(), Phase::ToRoll | Phase::Rolling | Phase::Result) {
            let (player, rival) = self.dice_match.battle_marks();
            frame.text(format!("Battle: {player} vs {rival}"), hud + Vec2::new(0.0, 180.0));
        }

        let prompt = board_center() + shift + Vec2::new(0.0, BOARD_HEIGHT / 2.0 + 40.0);
        if self.dice_match.awaiting_player_roll() {
            frame.text("Press SPACE to roll", prompt);
        } else if self.dice_match.phase() == Phase::ToRoll {
            frame.text(format!("{} is about to roll", opponent.name), prompt);
        }
    }
}
