//! Match phase state machine
//!
//! One match is a series of rounds against a single opponent:
//! wager, battle roll for turn order, alternate rolls until the rule variant
//! decides, pay out, repeat until someone is broke.

use glam::Vec2;

use super::character::{Character, Side};
use super::die::{Die, Direction};
use super::rules::{RollOutcome, RollView, RuleKind, RuleVariant, Rules, Settlement};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::ConfigError;
use crate::physics::PhysicsWorld;
use crate::rng::RandomSource;
use crate::timer::{TaskId, Timer};
use crate::{board_center, board_origin};

/// Match phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    /// Waiting for a wager amount
    Wager,
    /// Casting the battle dice
    Battle,
    /// Battle dice in motion
    BattleRolling,
    /// Waiting for the current roller to cast
    ToRoll,
    /// Dice in motion
    Rolling,
    /// Round decided, money about to change hands
    Result,
    /// Someone is broke
    PostGame,
}

/// Player input for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub roll: bool,
}

/// How a finished match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEnd {
    PlayerBroke,
    OpponentBroke,
}

/// Side effects for the owning screen
#[derive(Debug, Clone, PartialEq)]
pub enum MatchSignal {
    PhaseChanged(Phase),
    /// Suspend and ask for a wager in `[1, max]`
    RequestWager { max: u32 },
    Announce(String),
    Payout { winner: Side, amount: u32 },
    Finished(MatchEnd),
    Sound(SoundEffect),
}

/// Everything a match borrows from the game for one tick
pub struct MatchEnv<'a> {
    pub physics: &'a mut dyn PhysicsWorld,
    pub rng: &'a mut dyn RandomSource,
    pub player: &'a mut Character,
    pub opponent: &'a mut Character,
}

/// Rejected wager requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum WagerError {
    #[error("match is not waiting for a wager")]
    NotAwaiting,
    #[error("wager {amount} outside 1..={max}")]
    OutOfRange { amount: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchEvent {
    OpponentReady,
}

/// Resolve a battle tie in the player's favour
///
/// Returns the (player, opponent) faces, which are always different.
pub fn break_tie(player: u8, opponent: u8) -> (u8, u8) {
    if player != opponent {
        (player, opponent)
    } else if player < DIE_MAX_VALUE {
        (player + 1, opponent)
    } else {
        (player, DIE_MAX_VALUE - 1)
    }
}

/// Where and which way a die is cast
fn cast_origin(side: Side, battle: bool, index: usize) -> (Direction, Vec2) {
    let origin = board_origin();
    let center = board_center();
    let inset = BOARD_EDGE_THICKNESS + DIE_SIZE;

    if battle {
        return match side {
            Side::Player => (
                Direction::Up,
                Vec2::new(center.x - DIE_SIZE, origin.y + BOARD_HEIGHT - inset),
            ),
            Side::Opponent => (
                Direction::Down,
                Vec2::new(center.x + DIE_SIZE, origin.y + inset),
            ),
        };
    }

    let y = center.y + (index as f32 - 1.0) * DIE_SIZE * 1.5;
    match side {
        Side::Player => (Direction::Right, Vec2::new(origin.x + inset, y)),
        Side::Opponent => (Direction::Left, Vec2::new(origin.x + BOARD_WIDTH - inset, y)),
    }
}

#[derive(Debug)]
pub struct DiceMatch {
    pub(crate) phase: Phase,
    pub(crate) dice: [Die; 3],
    pub(crate) rolled_value: u8,
    pub(crate) wager_amount: u32,
    pub(crate) is_player_turn: bool,
    pub(crate) did_player_win: bool,
    pub(crate) is_first_roll: bool,
    pub(crate) player_mark: u8,
    pub(crate) opponent_mark: u8,
    pub(crate) rules: Rules,
    pub(crate) opponent_index: usize,
    opponent_delay: f32,
    awaiting_wager: bool,
    opponent_wait: Option<TaskId>,
    opponent_ready: bool,
    /// Rule announcement held back to go out with the payout
    verdict_line: Option<String>,
    finished: bool,
    released: bool,
    timer: Timer<MatchEvent>,
    signals: Vec<MatchSignal>,
}

impl DiceMatch {
    /// New match waiting for its first wager
    pub fn new(
        kind: RuleKind,
        opponent_index: usize,
        physics: &mut dyn PhysicsWorld,
        opponent_delay: f32,
    ) -> Self {
        let center = board_center();
        let dice = [-1.5, 0.0, 1.5].map(|k| Die::new(physics, center + Vec2::new(k * DIE_SIZE, 0.0)));

        Self {
            phase: Phase::Wager,
            dice,
            rolled_value: 0,
            wager_amount: 0,
            is_player_turn: true,
            did_player_win: false,
            is_first_roll: true,
            player_mark: 0,
            opponent_mark: 0,
            rules: Rules::new(kind),
            opponent_index,
            opponent_delay: opponent_delay.max(0.0),
            awaiting_wager: false,
            opponent_wait: None,
            opponent_ready: false,
            verdict_line: None,
            finished: false,
            released: false,
            timer: Timer::new(),
            signals: Vec::new(),
        }
    }

    /// New match from a configuration rule tag
    pub fn from_tag(
        tag: &str,
        opponent_index: usize,
        physics: &mut dyn PhysicsWorld,
        opponent_delay: f32,
    ) -> Result<Self, ConfigError> {
        let kind = tag.parse::<RuleKind>()?;
        Ok(Self::new(kind, opponent_index, physics, opponent_delay))
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn dice(&self) -> &[Die; 3] {
        &self.dice
    }

    pub fn rolled_value(&self) -> u8 {
        self.rolled_value
    }

    pub fn wager(&self) -> u32 {
        self.wager_amount
    }

    pub fn is_player_turn(&self) -> bool {
        self.is_player_turn
    }

    pub fn is_first_roll(&self) -> bool {
        self.is_first_roll
    }

    pub fn did_player_win(&self) -> bool {
        self.did_player_win
    }

    /// Battle marks (player, opponent)
    pub fn battle_marks(&self) -> (u8, u8) {
        (self.player_mark, self.opponent_mark)
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn kind(&self) -> RuleKind {
        self.rules.kind()
    }

    pub fn opponent_index(&self) -> usize {
        self.opponent_index
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The player is expected to press the roll key
    pub fn awaiting_player_roll(&self) -> bool {
        self.phase == Phase::ToRoll && self.is_player_turn
    }

    /// Largest wager both purses can cover
    pub fn max_wager(player: &Character, opponent: &Character) -> u32 {
        player.money.min(opponent.money)
    }

    fn set_phase(&mut self, phase: Phase) {
        if self.phase == phase {
            return;
        }
        log::debug!("Match phase {:?} -> {:?}", self.phase, phase);
        self.phase = phase;
        self.signals.push(MatchSignal::PhaseChanged(phase));
    }

    fn announce(&mut self, text: impl Into<String>) {
        self.signals.push(MatchSignal::Announce(text.into()));
    }

    /// Take the wager the player chose
    pub fn accept_wager(
        &mut self,
        amount: u32,
        player: &Character,
        opponent: &Character,
    ) -> Result<(), WagerError> {
        if self.phase != Phase::Wager {
            return Err(WagerError::NotAwaiting);
        }
        let max = Self::max_wager(player, opponent);
        if amount == 0 || amount > max {
            return Err(WagerError::OutOfRange { amount, max });
        }

        log::info!("Wager accepted: {amount}");
        self.wager_amount = amount;
        self.awaiting_wager = false;
        self.set_phase(Phase::Battle);
        Ok(())
    }

    /// Advance one tick; the caller has already stepped the physics world
    pub fn update(&mut self, dt: f32, input: &TickInput, env: &mut MatchEnv<'_>) -> Vec<MatchSignal> {
        for event in self.timer.update(dt) {
            match event {
                MatchEvent::OpponentReady => {
                    self.opponent_wait = None;
                    self.opponent_ready = true;
                }
            }
        }

        for die in &mut self.dice {
            die.update(env.physics);
        }

        match self.phase {
            Phase::Wager => self.request_wager(env),
            Phase::Battle => {
                self.roll_battle(env);
                self.set_phase(Phase::BattleRolling);
            }
            Phase::BattleRolling => {
                if !self.dice[0].is_rolling() && !self.dice[1].is_rolling() {
                    self.resolve_battle();
                    self.set_phase(Phase::ToRoll);
                }
            }
            Phase::ToRoll => self.await_roll(input, env),
            Phase::Rolling => {
                if self.dice.iter().all(|d| !d.is_rolling()) {
                    self.resolve_roll();
                }
            }
            Phase::Result => self.settle(env),
            Phase::PostGame => {
                if !self.finished {
                    self.finished = true;
                    let end = if env.player.is_broke() {
                        MatchEnd::PlayerBroke
                    } else {
                        MatchEnd::OpponentBroke
                    };
                    log::info!("Match over: {end:?}");
                    self.signals.push(MatchSignal::Finished(end));
                }
            }
        }

        std::mem::take(&mut self.signals)
    }

    fn request_wager(&mut self, env: &mut MatchEnv<'_>) {
        if self.awaiting_wager {
            return;
        }
        let max = Self::max_wager(env.player, env.opponent);
        if max == 0 {
            self.set_phase(Phase::PostGame);
            return;
        }
        self.awaiting_wager = true;
        self.signals.push(MatchSignal::RequestWager { max });
    }

    fn roll_battle(&mut self, env: &mut MatchEnv<'_>) {
        for (index, side) in [Side::Player, Side::Opponent].into_iter().enumerate() {
            let (direction, start) = cast_origin(side, true, index);
            self.dice[index].on_roll(direction, start, env.physics, env.rng);
        }
        self.signals.push(MatchSignal::Sound(SoundEffect::DiceRoll));
    }

    fn resolve_battle(&mut self) {
        let (player, opponent) = break_tie(self.dice[0].value(), self.dice[1].value());
        self.dice[0].set_value(player);
        self.dice[1].set_value(opponent);
        self.player_mark = player;
        self.opponent_mark = opponent;
        self.is_player_turn = player > opponent;
        self.is_first_roll = true;

        log::debug!("Battle {player} vs {opponent}");
        if self.is_player_turn {
            self.announce("You roll first");
        } else {
            self.announce("Your opponent rolls first");
        }
    }

    fn await_roll(&mut self, input: &TickInput, env: &mut MatchEnv<'_>) {
        if self.is_player_turn {
            if input.roll {
                self.roll_dice(env);
            }
            return;
        }

        if self.is_first_roll || self.opponent_ready {
            self.opponent_ready = false;
            self.roll_dice(env);
        } else if self.opponent_wait.is_none() {
            self.opponent_wait = Some(self.timer.schedule(self.opponent_delay, MatchEvent::OpponentReady));
        }
    }

    fn roll_dice(&mut self, env: &mut MatchEnv<'_>) {
        let side = Side::from_turn(self.is_player_turn);
        self.is_first_roll = false;
        for (index, die) in self.dice.iter_mut().enumerate() {
            let (direction, start) = cast_origin(side, false, index);
            die.on_roll(direction, start, env.physics, env.rng);
        }
        self.rolled_value = self.dice.iter().map(Die::value).sum();
        self.signals.push(MatchSignal::Sound(SoundEffect::DiceRoll));
        self.set_phase(Phase::Rolling);
    }

    fn resolve_roll(&mut self) {
        let is_player_turn = self.is_player_turn;
        let mut view = RollView {
            dice: &mut self.dice,
            rolled_value: self.rolled_value,
            is_player_turn,
        };
        let verdict = self.rules.check_roll(&mut view);
        log::debug!(
            "{:?} rolled {} -> {:?}",
            Side::from_turn(is_player_turn),
            self.rolled_value,
            verdict.outcome
        );

        match verdict.outcome {
            RollOutcome::RollAgain => {
                self.emit_line(verdict.announcement);
                self.set_phase(Phase::ToRoll);
            }
            RollOutcome::PassTurn => {
                self.emit_line(verdict.announcement);
                self.is_player_turn = !self.is_player_turn;
                self.set_phase(Phase::ToRoll);
            }
            RollOutcome::Replay { player_first } => {
                self.emit_line(verdict.announcement);
                self.is_player_turn = player_first;
                self.is_first_roll = true;
                self.set_phase(Phase::ToRoll);
            }
            RollOutcome::Decided { player_won } => {
                self.did_player_win = player_won;
                self.verdict_line = verdict.announcement;
                self.set_phase(Phase::Result);
            }
        }
    }

    fn emit_line(&mut self, line: Option<String>) {
        if let Some(text) = line {
            self.announce(text);
        }
    }

    fn settle(&mut self, env: &mut MatchEnv<'_>) {
        let winner = Side::from_turn(self.did_player_win);
        let settlement = Settlement {
            wager: self.wager_amount,
            winner,
            rolled_value: self.rolled_value,
            faces: [self.dice[0].value(), self.dice[1].value(), self.dice[2].value()],
        };
        let paid = self.rules.deal_out_winnings(&settlement, env.player, env.opponent);
        log::info!("{winner:?} wins {paid} (wager {})", self.wager_amount);

        let outcome = if winner.is_player() {
            format!("You win {paid}!")
        } else {
            format!("You lose {paid}")
        };
        let line = match self.verdict_line.take() {
            Some(verdict) => format!("{verdict}. {outcome}"),
            None => outcome,
        };
        self.announce(line);
        self.signals.push(MatchSignal::Payout { winner, amount: paid });
        self.signals.push(MatchSignal::Sound(if winner.is_player() {
            SoundEffect::Win
        } else {
            SoundEffect::Lose
        }));

        if env.player.is_broke() || env.opponent.is_broke() {
            self.set_phase(Phase::PostGame);
        } else {
            self.reset_round();
            self.set_phase(Phase::Wager);
        }
    }

    fn reset_round(&mut self) {
        self.rules.reset();
        for die in &mut self.dice {
            die.release_hold();
        }
        self.wager_amount = 0;
        self.is_first_roll = true;
        self.did_player_win = false;
        self.awaiting_wager = false;
        self.verdict_line = None;
        if let Some(task) = self.opponent_wait.take() {
            self.timer.cancel(task);
        }
        self.opponent_ready = false;
    }

    /// Put restored dice to rest and forget transient waits
    pub(crate) fn settle_restored(&mut self, physics: &mut dyn PhysicsWorld) {
        for die in &mut self.dice {
            die.force_idle(physics);
        }
        self.timer.clear();
        self.opponent_wait = None;
        self.opponent_ready = false;
        self.awaiting_wager = false;
    }

    /// Remove all dice bodies from the world (idempotent)
    pub fn release(&mut self, physics: &mut dyn PhysicsWorld) {
        if self.released {
            return;
        }
        for die in &self.dice {
            die.release(physics);
        }
        self.timer.clear();
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{TableWorld, add_board_edges};
    use crate::rng::ScriptedRng;

    struct Harness {
        world: TableWorld,
        rng: ScriptedRng,
        player: Character,
        opponent: Character,
    }

    impl Harness {
        fn new(faces: impl IntoIterator<Item = i32>, player: u32, opponent: u32) -> Self {
            let mut world = TableWorld::new();
            add_board_edges(
                &mut world,
                board_origin(),
                Vec2::new(BOARD_WIDTH, BOARD_HEIGHT),
                BOARD_EDGE_THICKNESS,
            );
            Self {
                world,
                rng: ScriptedRng::new(faces),
                player: Character::new(player),
                opponent: Character::new(opponent),
            }
        }

        fn tick(&mut self, game: &mut DiceMatch, roll: bool) -> Vec<MatchSignal> {
            self.world.step(SIM_DT);
            let mut env = MatchEnv {
                physics: &mut self.world,
                rng: &mut self.rng,
                player: &mut self.player,
                opponent: &mut self.opponent,
            };
            game.update(SIM_DT, &TickInput { roll }, &mut env)
        }

        /// Tick until `done` holds; returns every signal seen and the tick count
        fn run_until(
            &mut self,
            game: &mut DiceMatch,
            roll: bool,
            done: impl Fn(&DiceMatch) -> bool,
        ) -> (Vec<MatchSignal>, u32) {
            let mut signals = Vec::new();
            for ticks in 1..=120 * 30 {
                signals.extend(self.tick(game, roll));
                if done(game) {
                    return (signals, ticks);
                }
            }
            panic!("match stuck in {:?}", game.phase());
        }
    }

    fn start(h: &mut Harness, kind: RuleKind, delay: f32, wager: u32) -> DiceMatch {
        let mut game = DiceMatch::new(kind, 0, &mut h.world, delay);
        let signals = h.tick(&mut game, false);
        let max = h.player.money.min(h.opponent.money);
        assert!(signals.contains(&MatchSignal::RequestWager { max }));
        game.accept_wager(wager, &h.player, &h.opponent).unwrap();
        game
    }

    #[test]
    fn test_break_tie() {
        assert_eq!(break_tie(3, 3), (4, 3));
        assert_eq!(break_tie(6, 6), (6, 5));
        assert_eq!(break_tie(2, 5), (2, 5));
    }

    #[test]
    fn test_wager_bounds() {
        let mut h = Harness::new([], 30, 80);
        let mut game = DiceMatch::new(RuleKind::Triga, 0, &mut h.world, 1.0);
        h.tick(&mut game, false);

        assert_eq!(
            game.accept_wager(0, &h.player, &h.opponent),
            Err(WagerError::OutOfRange { amount: 0, max: 30 })
        );
        assert_eq!(
            game.accept_wager(31, &h.player, &h.opponent),
            Err(WagerError::OutOfRange { amount: 31, max: 30 })
        );
        assert_eq!(game.phase(), Phase::Wager);

        game.accept_wager(30, &h.player, &h.opponent).unwrap();
        assert_eq!(game.phase(), Phase::Battle);
        assert_eq!(
            game.accept_wager(10, &h.player, &h.opponent),
            Err(WagerError::NotAwaiting)
        );
    }

    #[test]
    fn test_wager_requested_once() {
        let mut h = Harness::new([], 50, 50);
        let mut game = DiceMatch::new(RuleKind::Riffa, 0, &mut h.world, 1.0);
        let requests = (0..10)
            .flat_map(|_| h.tick(&mut game, false))
            .filter(|s| matches!(s, MatchSignal::RequestWager { .. }))
            .count();
        assert_eq!(requests, 1);
    }

    #[test]
    fn test_full_triga_round() {
        // Battle 3 vs 5, opponent marks 12, player rolls a triga
        let mut h = Harness::new([3, 5, 6, 4, 2, 3, 1, 2], 100, 100);
        let mut game = start(&mut h, RuleKind::Triga, 1.0, 40);

        h.run_until(&mut game, false, |g| g.phase() == Phase::ToRoll);
        assert_eq!(game.battle_marks(), (3, 5));
        assert!(!game.is_player_turn());
        assert!(game.is_first_roll());

        // Opponent's first roll is immediate
        h.tick(&mut game, false);
        assert_eq!(game.phase(), Phase::Rolling);
        assert_eq!(game.rolled_value(), 12);

        h.run_until(&mut game, false, |g| g.awaiting_player_roll());
        for _ in 0..240 {
            h.tick(&mut game, false);
        }
        assert!(game.awaiting_player_roll(), "player turn waits for input");

        h.tick(&mut game, true);
        assert_eq!(game.phase(), Phase::Rolling);
        let (signals, _) = h.run_until(&mut game, false, |g| g.phase() == Phase::Wager);

        assert!(signals.contains(&MatchSignal::Payout {
            winner: Side::Player,
            amount: 40
        }));
        assert!(signals.contains(&MatchSignal::Sound(SoundEffect::Win)));
        assert_eq!((h.player.money, h.opponent.money), (140, 60));
        assert_eq!(game.wager(), 0);
        assert!(game.is_first_roll());
    }

    #[test]
    fn test_opponent_waits_before_non_first_roll() {
        // Battle 5 vs 3: player first, marks 12; opponent waits, then rolls
        let mut h = Harness::new([5, 3, 6, 4, 2, 1, 2, 4], 100, 100);
        let mut game = start(&mut h, RuleKind::Triga, 1.0, 10);

        h.run_until(&mut game, false, |g| g.awaiting_player_roll());
        h.tick(&mut game, true);
        h.run_until(&mut game, false, |g| g.phase() == Phase::ToRoll);
        assert!(!game.is_player_turn());

        let (_, ticks) = h.run_until(&mut game, false, |g| g.phase() == Phase::Rolling);
        assert!((115..=125).contains(&ticks), "waited {ticks} ticks");
    }

    #[test]
    fn test_broke_player_finishes_match() {
        // Player marks 10, opponent rolls a triple on its first roll
        let mut h = Harness::new([5, 3, 6, 3, 1, 1, 1, 1], 40, 100);
        let mut game = start(&mut h, RuleKind::Triga, 0.0, 40);

        h.run_until(&mut game, false, |g| g.awaiting_player_roll());
        h.tick(&mut game, true);
        let (signals, _) = h.run_until(&mut game, false, DiceMatch::is_finished);

        assert!(signals.contains(&MatchSignal::Finished(MatchEnd::PlayerBroke)));
        assert_eq!(game.phase(), Phase::PostGame);
        assert_eq!((h.player.money, h.opponent.money), (0, 140));

        // Finished is reported once
        let later: Vec<_> = (0..5).flat_map(|_| h.tick(&mut game, false)).collect();
        assert!(later.is_empty());
    }

    #[test]
    fn test_riffa_final_roll_keeps_held_pair() {
        // Battle 6 vs 2; player doubles 4s, final roll moves only die 2
        let mut h = Harness::new([6, 2, 4, 4, 1, 5], 100, 100);
        let mut game = start(&mut h, RuleKind::Riffa, 1.0, 10);

        h.run_until(&mut game, false, |g| g.awaiting_player_roll());
        h.tick(&mut game, true);
        h.run_until(&mut game, false, |g| g.phase() == Phase::ToRoll);
        assert!(game.is_player_turn(), "double keeps the dice");
        assert!(game.dice()[0].is_held() && game.dice()[1].is_held());

        h.tick(&mut game, true);
        assert_eq!(game.rolled_value(), 13);
        assert_eq!(h.rng.remaining(), 0);
        h.run_until(&mut game, false, |g| g.phase() == Phase::ToRoll);
        assert!(!game.is_player_turn());
        assert!(game.dice().iter().all(|d| !d.is_held()));
    }

    #[test]
    fn test_release_removes_bodies_once() {
        let mut world = TableWorld::new();
        let mut game = DiceMatch::new(RuleKind::Panquist, 0, &mut world, 1.0);
        assert_eq!(world.body_count(), 3);
        game.release(&mut world);
        game.release(&mut world);
        assert_eq!(world.body_count(), 0);
    }

    #[test]
    fn test_from_tag_rejects_unknown() {
        let mut world = TableWorld::new();
        assert!(matches!(
            DiceMatch::from_tag("Mus", 0, &mut world, 1.0),
            Err(ConfigError::UnknownRule(_))
        ));
        assert!(DiceMatch::from_tag("riffa", 0, &mut world, 1.0).is_ok());
    }
}
