//! End-to-end flows through the screen stack, driven headless
use dedos::app::{AutoPilot, Game, GameContext};
use dedos::audio::AudioManager;
use dedos::config::GameConfig;
use dedos::consts::SIM_DT;
use dedos::input::Key;
use dedos::persistence::{FileStore, KeyValueStore, MatchSnapshot, SaveGame};
use dedos::physics::TableWorld;
use dedos::render::DrawCommand;
use dedos::rng::GameRng;
use dedos::settings::Settings;
use dedos::sim::Phase;

const MAX_TICKS: u32 = 120 * 600;

fn quick_settings() -> Settings {
    Settings {
        reduced_motion: true,
        ..Settings::default()
    }
}

fn headless_game(seed: u64) -> Game {
    let mut ctx = GameContext::headless(seed).unwrap();
    ctx.settings = quick_settings();
    Game::new(ctx)
}

fn file_game(seed: u64, dir: &std::path::Path) -> Game {
    let settings = quick_settings();
    let ctx = GameContext::new(
        GameConfig::embedded().unwrap(),
        settings.clone(),
        Box::new(GameRng::new(seed)),
        Box::new(TableWorld::new()),
        AudioManager::headless(&settings),
        Box::new(FileStore::new(dir).unwrap()),
    )
    .unwrap();
    Game::new(ctx)
}

/// Tick until `done` holds; panics with the stack if it never does
fn run_until(game: &mut Game, done: impl Fn(&Game) -> bool) -> u32 {
    for ticks in 1..=MAX_TICKS {
        game.tick();
        if done(game) {
            return ticks;
        }
    }
    panic!("stuck with stack {:?}", game.stack().names());
}

fn at(name: &'static str) -> impl Fn(&Game) -> bool {
    move |g| g.top_name() == Some(name)
}

fn saved_match(game: &Game) -> Option<MatchSnapshot> {
    MatchSnapshot::load(game.context().store.as_ref())
}

#[test]
fn test_new_game_reaches_wager_prompt() {
    let mut game = headless_game(11);
    game.press(Key::Enter);
    game.tick();
    assert_eq!(game.stack().names(), ["title", "opponent_selection"]);

    game.press(Key::Enter);
    run_until(&mut game, at("wager"));
    assert_eq!(
        game.stack().names(),
        ["title", "opponent_selection", "play", "wager"]
    );
    assert!(game.render().contains_text("how much will you wager?"));
}

#[test]
fn test_wager_starts_battle_and_announces_order() {
    let mut game = headless_game(12);
    game.press(Key::Enter);
    game.tick();
    game.context_mut().last_wager = 25;
    game.press(Key::Enter);
    run_until(&mut game, at("wager"));

    game.press(Key::Enter);
    run_until(&mut game, at("result"));
    assert_eq!(game.context().last_wager, 25);

    let frame = game.render();
    assert!(
        frame.contains_text("You roll first") || frame.contains_text("Your opponent rolls first"),
        "no turn order announced"
    );
    let snapshot = saved_match(&game).expect("match saved on phase change");
    assert_eq!(snapshot.wager_amount, 25);
}

#[test]
fn test_backing_out_of_wager_leaves_table() {
    let mut game = headless_game(13);
    game.press(Key::Enter);
    game.tick();
    game.press(Key::Enter);
    run_until(&mut game, at("wager"));

    game.press(Key::Escape);
    run_until(&mut game, at("opponent_selection"));
    assert_eq!(game.context().physics.body_count(), 0);
    assert!(saved_match(&game).is_none());
}

#[test]
fn test_help_opens_over_table() {
    let mut game = headless_game(14);
    game.press(Key::Enter);
    game.tick();
    game.press(Key::Enter);
    run_until(&mut game, at("wager"));

    game.press(Key::H);
    run_until(&mut game, at("help"));
    assert!(game.render().contains_text("How to play"));

    game.tick();
    game.press(Key::H);
    run_until(&mut game, at("wager"));
}

#[test]
fn test_load_game_resumes_saved_match() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = file_game(21, dir.path());
    first.press(Key::Enter);
    first.tick();
    first.context_mut().last_wager = 40;
    first.press(Key::Enter);
    run_until(&mut first, at("wager"));
    first.press(Key::Enter);
    run_until(&mut first, |g| {
        saved_match(g).is_some_and(|s| matches!(s.phase, Phase::ToRoll | Phase::Rolling))
    });
    let snapshot = saved_match(&first).unwrap();
    let purses = SaveGame::capture(&first.context().roster);
    drop(first);

    let mut second = file_game(99, dir.path());
    second.press(Key::ArrowDown);
    second.press(Key::Enter);
    second.tick();
    assert_eq!(
        second.stack().names(),
        ["title", "opponent_selection", "play"]
    );
    assert_eq!(SaveGame::capture(&second.context().roster), purses);

    let frame = second.render();
    let values: Vec<u8> = frame
        .commands
        .iter()
        .filter_map(|c| match c {
            DrawCommand::Die { value, .. } => Some(*value),
            _ => None,
        })
        .collect();
    let saved: Vec<u8> = snapshot.dice.iter().map(|d| d.value).collect();
    assert_eq!(values, saved);
    assert!(frame.contains_text("Wager: 40"));
}

#[test]
fn test_load_without_save_starts_new_game() {
    let dir = tempfile::tempdir().unwrap();
    let mut game = file_game(5, dir.path());
    game.press(Key::ArrowDown);
    game.press(Key::Enter);
    game.tick();
    assert_eq!(game.stack().names(), ["title", "opponent_selection"]);
}

#[test]
fn test_last_round_ends_the_game() {
    let mut game = headless_game(31);
    game.press(Key::Enter);
    game.tick();

    {
        let ctx = game.context_mut();
        ctx.roster.player.money = 1;
        for opponent in ctx.roster.opponents.iter_mut() {
            opponent.character.money = 0;
        }
        ctx.roster.opponents[0].character.money = 1;
    }
    let total = game.context().roster.total_money();

    let mut pilot = AutoPilot::new(0.05);
    for _ in 0..MAX_TICKS {
        let top = game.top_name();
        if matches!(top, Some("game_over" | "victory")) {
            break;
        }
        if let Some(key) = pilot.next_key(SIM_DT, top) {
            game.press(key);
        }
        game.tick();
    }

    let ending = game.top_name();
    assert!(
        matches!(ending, Some("game_over" | "victory")),
        "ended on {ending:?}"
    );
    assert_eq!(game.context().roster.total_money(), total);
    assert!(!game.context().store.contains(SaveGame::KEY));
    assert!(!game.context().store.contains(MatchSnapshot::KEY));

    game.tick();
    game.press(Key::Enter);
    game.tick();
    assert_eq!(game.stack().names(), ["title"]);
}
