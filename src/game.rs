//! Game facade
//!
//! [`Game`] owns the current [`Snapshot`] and the spawner, and is the only way
//! hosts drive a run. Every call swaps in a complete new snapshot, so anyone
//! holding an `Arc<Snapshot>` sees a consistent frame.
//!
//! Run states:
//!
//! ```text
//! Ready ──start_run──▶ Running ──pause──▶ Paused
//!                        ▲  │  ◀──resume──┘
//!                        │  └──crash──▶ GameOver
//!   (any) ──start_run / restart──┘
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::settings::Settings;
use crate::sim::{Obstacle, RunState, SkierPose, Snapshot, Spawner, TickOutcome, steer, tick};
use crate::tuning::Tuning;

/// Notifications for the host, drained with [`Game::drain_events`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    RunStarted,
    Paused,
    Resumed,
    /// Run ended; the host should play crash feedback and record the score
    Crashed {
        score: u32,
        sound_on: bool,
        haptics_on: bool,
    },
}

#[derive(Debug)]
pub struct Game {
    snapshot: Arc<Snapshot>,
    spawner: Spawner,
    tuning: Tuning,
    events: Vec<GameEvent>,
}

impl Game {
    /// Tuning that fails [`Tuning::validate`] is replaced by the defaults
    pub fn new(tuning: Tuning, settings: Settings, seed: u64) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Rejected tuning ({e}), using defaults");
                Tuning::default()
            }
        };
        let settings = settings.sanitized();
        Self {
            snapshot: Arc::new(Snapshot::new(&tuning, &settings)),
            spawner: Spawner::new(seed),
            tuning,
            events: Vec::new(),
        }
    }

    /// Seed the snapshot with a best score already known at start-up
    pub fn with_best_score(mut self, best: u32) -> Self {
        self.fold_best_score(best);
        self
    }

    /// Current snapshot; cheap to clone and safe to hold across calls
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn run_state(&self) -> RunState {
        self.snapshot.run_state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Steer from a tilt reading. `_ay` is accepted for future use.
    pub fn on_tilt(&mut self, ax: f32, _ay: f32) {
        if !self.snapshot.is_running() {
            return;
        }
        let (x, pose) = steer(
            self.snapshot.skier_x,
            ax,
            self.snapshot.sensitivity,
            &self.tuning,
        );
        let state = Arc::make_mut(&mut self.snapshot);
        state.skier_x = x;
        state.pose = pose;
    }

    /// Advance the run by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> TickOutcome {
        if !self.snapshot.is_running() {
            return TickOutcome::Idle;
        }

        let outcome = tick(
            Arc::make_mut(&mut self.snapshot),
            &mut self.spawner,
            &self.tuning,
            dt,
        );
        if let TickOutcome::Crashed { obstacle } = outcome {
            self.crash(&obstacle);
        }
        outcome
    }

    /// Begin a fresh run from any state
    pub fn start_run(&mut self) {
        self.spawner.reset();

        let tuning = &self.tuning;
        let state = Arc::make_mut(&mut self.snapshot);
        state.run_state = RunState::Running;
        state.score = 0;
        state.world_speed = tuning.base_speed;
        state.obstacles.clear();
        state.skier_x = tuning.skier_start_x;
        state.pose = SkierPose::Straight;

        self.events.push(GameEvent::RunStarted);
        log::info!("Run started");
    }

    /// Begin a fresh run with the spawner stream restarted from `seed`
    pub fn start_run_seeded(&mut self, seed: u64) {
        self.spawner.reseed(seed);
        log::debug!("Spawner reseeded with {seed}");
        self.start_run();
    }

    /// Start over after a game over (same as [`Game::start_run`])
    pub fn restart(&mut self) {
        self.start_run();
    }

    /// Freeze a running game. Returns false (and does nothing) otherwise.
    pub fn pause(&mut self) -> bool {
        self.transition(RunState::Running, RunState::Paused, GameEvent::Paused)
    }

    /// Continue a paused game. Returns false (and does nothing) otherwise.
    pub fn resume(&mut self) -> bool {
        self.transition(RunState::Paused, RunState::Running, GameEvent::Resumed)
    }

    /// Fold the latest settings into the snapshot
    pub fn apply_settings(&mut self, settings: Settings) {
        let settings = settings.sanitized();
        let state = Arc::make_mut(&mut self.snapshot);
        state.sensitivity = settings.sensitivity;
        state.sound_on = settings.sound_on;
        state.haptics_on = settings.haptics_on;
    }

    /// Fold a best score reported by the score store into the snapshot
    pub fn fold_best_score(&mut self, best: u32) {
        if self.snapshot.best_score != best {
            Arc::make_mut(&mut self.snapshot).best_score = best;
        }
    }

    /// Install a prepared snapshot (replays, tests). The spawner is untouched.
    pub fn load_state(&mut self, snapshot: Snapshot) {
        self.snapshot = Arc::new(snapshot);
    }

    fn transition(&mut self, from: RunState, to: RunState, event: GameEvent) -> bool {
        if self.snapshot.run_state != from {
            log::debug!("Ignoring {:?} in {:?}", event, self.snapshot.run_state);
            return false;
        }
        Arc::make_mut(&mut self.snapshot).run_state = to;
        self.events.push(event);
        true
    }

    fn crash(&mut self, obstacle: &Obstacle) {
        let state = Arc::make_mut(&mut self.snapshot);
        state.run_state = RunState::GameOver;

        log::info!(
            "Crashed into {:?} #{} with score {}",
            obstacle.kind,
            obstacle.id,
            state.score
        );
        self.events.push(GameEvent::Crashed {
            score: state.score,
            sound_on: state.sound_on,
            haptics_on: state.haptics_on,
        });
    }
}

/// A [`Game`] shared between a tick driver, a tilt driver and readers.
///
/// Calls are serialized by a single lock; none of them block on anything but
/// that lock.
#[derive(Debug, Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<Game>>,
}

impl SharedGame {
    pub fn new(game: Game) -> Self {
        Self {
            inner: Arc::new(Mutex::new(game)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Game> {
        // A panicking caller cannot leave a half-written snapshot behind
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` with exclusive access to the game
    pub fn with<R>(&self, f: impl FnOnce(&mut Game) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.lock().snapshot()
    }

    pub fn tick(&self, dt: f32) -> TickOutcome {
        self.lock().tick(dt)
    }

    pub fn on_tilt(&self, ax: f32, ay: f32) {
        self.lock().on_tilt(ax, ay)
    }

    pub fn start_run(&self) {
        self.lock().start_run()
    }

    pub fn restart(&self) {
        self.lock().restart()
    }

    pub fn pause(&self) -> bool {
        self.lock().pause()
    }

    pub fn resume(&self) -> bool {
        self.lock().resume()
    }

    pub fn apply_settings(&self, settings: Settings) {
        self.lock().apply_settings(settings)
    }

    pub fn fold_best_score(&self, best: u32) {
        self.lock().fold_best_score(best)
    }

    pub fn drain_events(&self) -> Vec<GameEvent> {
        self.lock().drain_events()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::ObstacleKind;

    fn game() -> Game {
        Game::new(Tuning::default(), Settings::default(), 12345)
    }

    fn rock_on_skier(snapshot: &Snapshot) -> Obstacle {
        Obstacle {
            id: 99,
            x: snapshot.skier_x,
            y: snapshot.skier_y,
            radius: 0.03,
            kind: ObstacleKind::Rock,
        }
    }

    #[test]
    fn test_starts_ready_and_idle() {
        let mut game = game();
        assert_eq!(game.run_state(), RunState::Ready);
        assert_eq!(game.tick(1.0), TickOutcome::Idle);
        game.on_tilt(-5.0, 0.0);
        assert_eq!(game.snapshot().skier_x, 0.5);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_invalid_tuning_falls_back() {
        let stalled = Tuning {
            spawn_spacing: 0.0,
            ..Tuning::default()
        };
        let mut game = Game::new(stalled, Settings::default(), 1);
        assert_eq!(*game.tuning(), Tuning::default());
        game.start_run();
        assert!(matches!(game.tick(1.0), TickOutcome::Advanced { .. }));

        let inverted = Tuning {
            cluster_min: 4,
            cluster_max: 2,
            cluster_chance: 1.0,
            ..Tuning::default()
        };
        let mut game = Game::new(inverted, Settings::default(), 1);
        assert_eq!(game.tuning().cluster_max, Tuning::default().cluster_max);
        game.start_run();
        game.tick(1.0);

        let custom = Tuning {
            spawn_spacing: 0.8,
            ..Tuning::default()
        };
        assert_eq!(Game::new(custom.clone(), Settings::default(), 1).tuning(), &custom);
    }

    #[test]
    fn test_pause_resume() {
        let mut game = game();
        assert!(!game.pause(), "cannot pause before running");
        assert!(!game.resume(), "cannot resume when not paused");

        game.start_run();
        assert!(game.pause());
        assert_eq!(game.run_state(), RunState::Paused);
        assert!(!game.pause());
        assert!(game.resume());
        assert_eq!(game.run_state(), RunState::Running);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::RunStarted, GameEvent::Paused, GameEvent::Resumed]
        );
    }

    #[test]
    fn test_crash_transition() {
        let mut game = game();
        game.start_run();
        let mut snapshot = (*game.snapshot()).clone();
        snapshot.score = 17;
        snapshot.sound_on = false;
        snapshot.obstacles.push(rock_on_skier(&snapshot));
        game.load_state(snapshot);
        game.drain_events();

        assert!(matches!(game.tick(0.016), TickOutcome::Crashed { .. }));
        assert_eq!(game.run_state(), RunState::GameOver);
        assert_eq!(game.snapshot().score, 17);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::Crashed {
                score: 17,
                sound_on: false,
                haptics_on: true,
            }]
        );

        // Nothing moves after the crash
        assert_eq!(game.tick(1.0), TickOutcome::Idle);
        assert!(game.drain_events().is_empty());
        assert!(!game.pause());
    }

    #[test]
    fn test_restart_resets_run() {
        let mut game = game();
        game.start_run();
        for _ in 0..200 {
            game.tick(0.05);
            if game.run_state() != RunState::Running {
                break;
            }
        }
        game.on_tilt(-3.0, 0.0);
        game.restart();

        let snapshot = game.snapshot();
        assert_eq!(snapshot.run_state, RunState::Running);
        assert_eq!(snapshot.score, 0);
        assert_eq!(snapshot.world_speed, 0.4);
        assert!(snapshot.obstacles.is_empty());
        assert_eq!(snapshot.skier_x, 0.5);
        assert_eq!(game.spawner().last_kind(), None);
        assert_eq!(game.spawner().distance_since_last_spawn(), 0.0);
    }

    #[test]
    fn test_readers_keep_their_frame() {
        let mut game = game();
        game.start_run();
        let before = game.snapshot();
        game.on_tilt(-1.0, 0.0);
        game.tick(0.5);
        assert_eq!(before.skier_x, 0.5);
        assert_eq!(before.world_speed, 0.4);
        assert!(game.snapshot().skier_x > 0.5);
    }

    #[test]
    fn test_settings_and_best_fold_in() {
        let mut game = game();
        game.apply_settings(Settings {
            sensitivity: 2.0,
            sound_on: false,
            haptics_on: false,
        });
        game.fold_best_score(42);

        let snapshot = game.snapshot();
        assert_eq!(
            Game::new(Tuning::default(), Settings::default(), 0)
                .with_best_score(9)
                .snapshot()
                .best_score,
            9
        );
        assert_eq!(snapshot.sensitivity, 2.0);
        assert!(!snapshot.sound_on);
        assert!(!snapshot.haptics_on);
        assert_eq!(snapshot.best_score, 42);
        assert_eq!(snapshot.run_state, RunState::Ready);

        game.start_run();
        game.on_tilt(-1.0, 0.0);
        assert!((game.snapshot().skier_x - 0.52).abs() < 1e-6);
    }

    #[test]
    fn test_seeded_runs_replay() {
        let mut a = game();
        let mut b = Game::new(Tuning::default(), Settings::default(), 1);
        a.start_run_seeded(77);
        b.start_run_seeded(77);
        for _ in 0..40 {
            a.tick(0.1);
            b.tick(0.1);
        }
        assert_eq!(a.snapshot().obstacles, b.snapshot().obstacles);
    }

    #[test]
    fn test_shared_game_recovers_from_poison() {
        let shared = SharedGame::new(game());
        let clone = shared.clone();
        let _ = std::thread::spawn(move || {
            clone.with(|_| panic!("boom"));
        })
        .join();
        shared.start_run();
        assert_eq!(shared.snapshot().run_state, RunState::Running);
    }
}
