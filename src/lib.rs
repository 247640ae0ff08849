//! Tilt Skier - an endless downhill arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, motion, collisions, scoring)
//! - `game`: Run state machine and the facade hosts call into
//! - `services`: Background score persistence and crash feedback
//! - `platform`: Tilt sources and fixed-rate drivers
//! - `persistence`: Versioned JSON files on disk
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod services;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use game::{Game, GameEvent, SharedGame};
pub use highscores::{HighScores, ScoreStore};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
///
/// World coordinates are normalized: x in [0, 1] across the slope, y = 0 at the
/// bottom edge and y = 1 at the top edge of the visible field.
pub mod consts {
    /// Top edge of the visible field; obstacles spawn just above it
    pub const WORLD_TOP: f32 = 1.0;

    /// Lateral displacement per unit of tilt at sensitivity 1.0
    pub const TILT_GAIN: f32 = 0.01;
    /// Displacement magnitude above which the skier leans into a turn
    pub const POSE_DEAD_ZONE: f32 = 0.0085;

    /// Distance travelled between obstacle rows
    pub const SPAWN_SPACING: f32 = 0.4;
    /// Probability a row becomes a cluster
    pub const CLUSTER_CHANCE: f32 = 0.25;
    pub const CLUSTER_MIN: u32 = 2;
    pub const CLUSTER_MAX: u32 = 4;
    /// Horizontal distance between neighbouring cluster members
    pub const CLUSTER_OFFSET_STEP: f32 = 0.18;
    /// Obstacles never spawn closer than this to either edge
    pub const EDGE_MARGIN: f32 = 0.1;
    /// Probability the next obstacle kind differs from the previous one
    pub const KIND_FLIP_CHANCE: f32 = 0.7;

    pub const TREE_RADIUS: f32 = 0.06;
    pub const ROCK_RADIUS: f32 = 0.03;

    /// World speed at the start of a run (world units per second)
    pub const BASE_SPEED: f32 = 0.4;
    /// Speed gained per second of running
    pub const SPEED_RAMP: f32 = 0.01;
    pub const SPEED_CAP: f32 = 3.0;

    /// Skier geometry (the skier only moves laterally)
    pub const SKIER_START_X: f32 = 0.5;
    pub const SKIER_Y: f32 = 0.85;
    pub const SKIER_RADIUS: f32 = 0.015;

    /// Most rows one tick may emit; any backlog beyond this is dropped
    pub const MAX_ROWS_PER_TICK: u32 = 256;
    /// Nominal driver cadence (~60 Hz)
    pub const TICK_INTERVAL_MS: u64 = 16;

    /// Leaderboard sizes
    pub const MAX_HIGH_SCORES: usize = 10;
    pub const TOP_SCORES_SHOWN: usize = 5;
}

/// Milliseconds since the Unix epoch (0 if the clock is before the epoch)
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
