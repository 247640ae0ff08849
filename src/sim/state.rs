//! Run state and core simulation types
//!
//! A [`Snapshot`] is the single source of truth for one moment of a run. It is
//! never edited while visible to readers; every operation builds a new one.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::WORLD_TOP;
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// Before the first run
    #[default]
    Ready,
    /// Active gameplay
    Running,
    /// Frozen; ticks and tilt are ignored
    Paused,
    /// Run ended in a crash
    GameOver,
}

/// Steering pose shown for the skier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkierPose {
    #[default]
    Straight,
    Left,
    Right,
}

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Tree,
    Rock,
}

impl ObstacleKind {
    /// Collision radius for this kind
    pub fn radius(self, tuning: &Tuning) -> f32 {
        match self {
            ObstacleKind::Tree => tuning.tree_radius,
            ObstacleKind::Rock => tuning.rock_radius,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            ObstacleKind::Tree => ObstacleKind::Rock,
            ObstacleKind::Rock => ObstacleKind::Tree,
        }
    }
}

/// An obstacle on the slope
///
/// Value object: moving an obstacle produces a copy with a new `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u64,
    /// Lateral position in [0, 1]
    pub x: f32,
    /// Vertical position; decreases as the obstacle approaches the skier
    pub y: f32,
    pub radius: f32,
    pub kind: ObstacleKind,
}

impl Obstacle {
    /// A fresh obstacle sitting just above the visible top edge
    pub fn spawned(id: u64, x: f32, kind: ObstacleKind, tuning: &Tuning) -> Self {
        let radius = kind.radius(tuning);
        Self {
            id,
            x,
            y: WORLD_TOP + radius,
            radius,
            kind,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Copy of this obstacle moved down the slope by `distance`
    pub fn descended(&self, distance: f32) -> Self {
        Self {
            y: self.y - distance,
            ..*self
        }
    }

    /// True while any part of the obstacle is still on the field
    pub fn is_visible(&self) -> bool {
        self.y + self.radius > 0.0
    }
}

/// Complete observable state of the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub run_state: RunState,
    /// Obstacles passed this run
    pub score: u32,
    /// Best score reported by the score store
    pub best_score: u32,
    /// Lateral skier position in [0, 1]
    pub skier_x: f32,
    pub skier_y: f32,
    pub skier_radius: f32,
    /// Slope speed in world units per second
    pub world_speed: f32,
    // Settings folded in from the settings collaborator
    pub sensitivity: f32,
    pub sound_on: bool,
    pub haptics_on: bool,
    /// Obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    pub pose: SkierPose,
}

impl Snapshot {
    /// Initial snapshot before any run has started
    pub fn new(tuning: &Tuning, settings: &Settings) -> Self {
        Self {
            run_state: RunState::Ready,
            score: 0,
            best_score: 0,
            skier_x: tuning.skier_start_x,
            skier_y: tuning.skier_y,
            skier_radius: tuning.skier_radius,
            world_speed: tuning.base_speed,
            sensitivity: settings.sensitivity,
            sound_on: settings.sound_on,
            haptics_on: settings.haptics_on,
            obstacles: Vec::new(),
            pose: SkierPose::Straight,
        }
    }

    pub fn skier_center(&self) -> Vec2 {
        Vec2::new(self.skier_x, self.skier_y)
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }
}
