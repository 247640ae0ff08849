//! Fixed timestep simulation tick
//!
//! One tick moves the slope, prunes passed obstacles, spawns new rows, checks
//! for a crash and ramps the speed. A tick either applies completely or, on a
//! crash, not at all.

use super::collision::first_collision;
use super::spawner::Spawner;
use super::state::{Obstacle, SkierPose, Snapshot};
use crate::tuning::Tuning;

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Run is not active; nothing changed
    Idle,
    /// Slope advanced without incident
    Advanced { passed: u32, spawned: usize },
    /// Skier hit an obstacle; the state was left as it was before the tick
    Crashed { obstacle: Obstacle },
}

/// Negative, zero and non-finite steps mean no motion
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Move every obstacle down by `distance` and drop the ones that left the field.
///
/// Returns the retained obstacles (order preserved) and how many were passed.
pub fn advance_obstacles(obstacles: &[Obstacle], distance: f32) -> (Vec<Obstacle>, u32) {
    let mut retained = Vec::with_capacity(obstacles.len());
    let mut passed = 0;
    for moved in obstacles.iter().map(|o| o.descended(distance)) {
        if moved.is_visible() {
            retained.push(moved);
        } else {
            passed += 1;
        }
    }
    (retained, passed)
}

/// Next world speed after `dt` seconds of running
pub fn ramp_speed(speed: f32, dt: f32, tuning: &Tuning) -> f32 {
    (speed + dt * tuning.speed_ramp).min(tuning.speed_cap)
}

/// Pose for a lateral displacement
pub fn pose_for(displacement: f32, dead_zone: f32) -> SkierPose {
    if displacement > dead_zone {
        SkierPose::Right
    } else if displacement < -dead_zone {
        SkierPose::Left
    } else {
        SkierPose::Straight
    }
}

/// Apply one tilt reading to the skier's lateral position.
///
/// Only the horizontal axis steers; tilting the device left (negative `ax`
/// on most sensors) moves the skier right. Non-finite readings count as no
/// tilt.
pub fn steer(skier_x: f32, ax: f32, sensitivity: f32, tuning: &Tuning) -> (f32, SkierPose) {
    let mut displacement = -ax * sensitivity * tuning.tilt_gain;
    if !displacement.is_finite() {
        displacement = 0.0;
    }
    let x = (skier_x + displacement).clamp(0.0, 1.0);
    (x, pose_for(displacement, tuning.pose_dead_zone))
}

/// Advance a running game by `dt` seconds.
///
/// `state` and `spawner` are only written when the tick completes without a
/// crash; run state transitions are left to the caller.
pub fn tick(state: &mut Snapshot, spawner: &mut Spawner, tuning: &Tuning, dt: f32) -> TickOutcome {
    if !state.is_running() {
        return TickOutcome::Idle;
    }

    let dt = sanitize_dt(dt);
    let speed = state.world_speed;
    let distance = speed * dt;

    let (mut obstacles, passed) = advance_obstacles(&state.obstacles, distance);

    let mut next_spawner = spawner.clone();
    let spawned = next_spawner.advance(distance, tuning, &mut obstacles);

    if let Some(hit) = first_collision(state.skier_center(), state.skier_radius, &obstacles) {
        return TickOutcome::Crashed { obstacle: *hit };
    }

    *spawner = next_spawner;
    state.obstacles = obstacles;
    state.score = state.score.saturating_add(passed);
    state.world_speed = ramp_speed(speed, dt, tuning);

    TickOutcome::Advanced { passed, spawned }
}
