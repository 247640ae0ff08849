//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied time steps only
//! - Seeded RNG only
//! - Stable obstacle order (spawn order)
//! - No platform or storage dependencies

pub mod collision;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{circles_overlap, first_collision};
pub use spawner::Spawner;
pub use state::{Obstacle, ObstacleKind, RunState, SkierPose, Snapshot};
pub use tick::{TickOutcome, advance_obstacles, pose_for, ramp_speed, sanitize_dt, steer, tick};
