//! Tilt Skier headless driver
//!
//! Runs the simulation natively with a fixed-rate tick thread and a synthetic
//! tilt thread, restarting after every crash until the time is up.
//!
//! Usage:
//!   RUST_LOG=info cargo run -- --seconds 20 --seed 42

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use tilt_skier::consts::{TICK_INTERVAL_MS, TOP_SCORES_SHOWN};
use tilt_skier::persistence::FileScoreStore;
use tilt_skier::platform::{SineTilt, Ticker, TiltSource};
use tilt_skier::services::{LogFeedback, ScoreService, Services};
use tilt_skier::{Game, GameEvent, Settings, SharedGame, Tuning};

#[derive(Parser)]
#[command(name = "tilt-skier")]
#[command(about = "Run the Tilt Skier simulation headless")]
struct Args {
    /// Spawner seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Directory holding settings.json and scores.json
    #[arg(long, default_value = "tilt-skier-data")]
    data_dir: PathBuf,

    /// JSON file with tuning overrides
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// How long to play, in seconds
    #[arg(long, default_value_t = 30.0)]
    seconds: f32,

    /// Tick interval in milliseconds
    #[arg(long, default_value_t = TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Peak synthetic tilt (accelerometer units)
    #[arg(long, default_value_t = 1.5)]
    tilt: f32,
}

fn main() -> Result<(), tilt_skier::Error> {
    env_logger::init();
    let args = Args::parse();

    log::info!("Tilt Skier (headless) starting...");

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let settings_path = args.data_dir.join("settings.json");
    let settings = Settings::load(&settings_path);

    let store = FileScoreStore::open(args.data_dir.join("scores.json"));
    let scores = ScoreService::spawn(store)?;
    scores.request_best();
    let mut services = Services::new(scores, Box::new(LogFeedback));

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Seed: {seed}");

    let game = SharedGame::new(Game::new(tuning, settings, seed));
    game.start_run();

    let tick_game = game.clone();
    let ticker = Ticker::spawn("tick", Duration::from_millis(args.tick_ms.max(1)), move |dt| {
        tick_game.tick(dt);
    })?;

    let tilt_game = game.clone();
    let mut source = SineTilt::new(args.tilt, 3.0, 0.01);
    let tilt = Ticker::spawn("tilt", Duration::from_millis(10), move |_| {
        if let Some((ax, ay)) = source.read() {
            tilt_game.on_tilt(ax, ay);
        }
    })?;

    let deadline = Instant::now() + Duration::from_secs_f32(args.seconds.max(0.0));
    let mut runs = 1u32;
    let mut run_scores = Vec::new();
    while Instant::now() < deadline {
        thread::sleep(Duration::from_millis(50));
        for event in services.pump(&game) {
            if let GameEvent::Crashed { score, .. } = event {
                run_scores.push(score);
                runs += 1;
                game.restart();
            }
        }
    }

    ticker.stop();
    tilt.stop();

    let last = game.snapshot();
    if last.is_running() {
        run_scores.push(last.score);
    }

    services.scores.request_top(TOP_SCORES_SHOWN);
    while services.latest_top().is_none() && services.settle(&game, Duration::from_secs(2)) {}

    let last = game.snapshot();
    let settings = Settings {
        sensitivity: last.sensitivity,
        sound_on: last.sound_on,
        haptics_on: last.haptics_on,
    };
    if let Err(e) = settings.save(&settings_path) {
        log::warn!("Could not save settings: {e}");
    }

    println!();
    println!("=== SESSION ===");
    println!("  Seed:       {seed}");
    println!("  Runs:       {runs}");
    println!("  Scores:     {run_scores:?}");
    println!("  Best:       {}", game.snapshot().best_score);
    if let Some(entries) = services.latest_top() {
        println!();
        println!("=== TOP {TOP_SCORES_SHOWN} ===");
        for (i, entry) in entries.iter().enumerate() {
            println!("  {:>2}. {:>5}", i + 1, entry.score);
        }
    }

    Ok(())
}
