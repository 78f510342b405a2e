//! Headless runner
//!
//! Drives the game at a fixed frame rate without a window. With `--autoplay`
//! an autopilot presses keys so whole matches play out in the log.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dedos::app::{AutoPilot, Game, GameContext};
use dedos::audio::AudioManager;
use dedos::config::GameConfig;
use dedos::persistence::{FileStore, KeyValueStore, MemoryStore};
use dedos::physics::TableWorld;
use dedos::rng::GameRng;
use dedos::settings::{Pace, Settings};

/// Frame length of the headless loop (60 fps)
const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Parser, Debug)]
#[command(name = "dedos", version, about = "Dedos de Toledo - wagering dice in old Toledo")]
struct Args {
    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Configuration file replacing the embedded opponents
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for saves and settings (in-memory if omitted)
    #[arg(long)]
    save_dir: Option<PathBuf>,

    /// Seconds of game time to run
    #[arg(long, default_value_t = 120.0)]
    seconds: f32,

    /// Let the autopilot play
    #[arg(long)]
    autoplay: bool,

    /// Opponent pace: relaxed, normal or brisk
    #[arg(long)]
    pace: Option<String>,
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("dedos: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Dedos de Toledo starting (seed {seed})");

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::embedded()?,
    };

    let store: Box<dyn KeyValueStore> = match &args.save_dir {
        Some(dir) => Box::new(FileStore::new(dir)?),
        None => Box::new(MemoryStore::new()),
    };

    let mut settings = Settings::load(store.as_ref());
    if let Some(name) = &args.pace {
        let pace = Pace::from_str(name).ok_or_else(|| format!("unknown pace '{name}'"))?;
        settings.apply_pace(pace);
    }

    let audio = AudioManager::headless(&settings);
    let ctx = GameContext::new(
        config,
        settings,
        Box::new(GameRng::new(seed)),
        Box::new(TableWorld::new()),
        audio,
        store,
    )?;
    let mut game = Game::new(ctx);
    let mut pilot = args.autoplay.then(AutoPilot::default);

    let frames = (args.seconds.max(0.0) / FRAME_DT).ceil() as u64;
    let mut last_top = game.top_name();
    for _ in 0..frames {
        if !game.is_running() {
            break;
        }
        if let Some(pilot) = pilot.as_mut() {
            if let Some(key) = pilot.next_key(FRAME_DT, game.top_name()) {
                game.press(key);
            }
        }
        game.frame(FRAME_DT);

        let top = game.top_name();
        if top != last_top {
            log::debug!("Screen: {}", top.unwrap_or("-"));
            last_top = top;
        }
    }

    let ctx = game.context_mut();
    if let Err(e) = ctx.settings.save(ctx.store.as_mut()) {
        log::warn!("Could not save settings: {e}");
    }
    let purse = ctx.roster.player.money;
    log::info!(
        "Stopped after {} ticks on '{}', purse {}",
        game.ticks(),
        game.top_name().unwrap_or("-"),
        purse
    );
    Ok(())
}
