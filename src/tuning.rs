//! Data-driven game balance
//!
//! Every gameplay constant can be overridden from a JSON file. Missing fields
//! keep their design values from [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Steering ===
    pub tilt_gain: f32,
    pub pose_dead_zone: f32,

    // === Spawning ===
    pub spawn_spacing: f32,
    pub cluster_chance: f32,
    pub cluster_min: u32,
    pub cluster_max: u32,
    pub cluster_offset_step: f32,
    pub edge_margin: f32,
    pub kind_flip_chance: f32,
    pub tree_radius: f32,
    pub rock_radius: f32,

    // === Speed ramp ===
    pub base_speed: f32,
    pub speed_ramp: f32,
    pub speed_cap: f32,

    // === Skier ===
    pub skier_start_x: f32,
    pub skier_y: f32,
    pub skier_radius: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            tilt_gain: TILT_GAIN,
            pose_dead_zone: POSE_DEAD_ZONE,

            spawn_spacing: SPAWN_SPACING,
            cluster_chance: CLUSTER_CHANCE,
            cluster_min: CLUSTER_MIN,
            cluster_max: CLUSTER_MAX,
            cluster_offset_step: CLUSTER_OFFSET_STEP,
            edge_margin: EDGE_MARGIN,
            kind_flip_chance: KIND_FLIP_CHANCE,
            tree_radius: TREE_RADIUS,
            rock_radius: ROCK_RADIUS,

            base_speed: BASE_SPEED,
            speed_ramp: SPEED_RAMP,
            speed_cap: SPEED_CAP,

            skier_start_x: SKIER_START_X,
            skier_y: SKIER_Y,
            skier_radius: SKIER_RADIUS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) tuning document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning overrides from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> Result<()> {
            Err(Error::InvalidTuning {
                field,
                reason: reason.into(),
            })
        }
        fn positive(field: &'static str, value: f32) -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                invalid(field, format!("must be positive, got {value}"))
            }
        }
        fn probability(field: &'static str, value: f32) -> Result<()> {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                invalid(field, format!("must be within [0, 1], got {value}"))
            }
        }

        // Spacing bounds the spawn loop; zero would never terminate
        positive("spawn_spacing", self.spawn_spacing)?;
        positive("tree_radius", self.tree_radius)?;
        positive("rock_radius", self.rock_radius)?;
        positive("skier_radius", self.skier_radius)?;
        positive("base_speed", self.base_speed)?;
        probability("cluster_chance", self.cluster_chance)?;
        probability("kind_flip_chance", self.kind_flip_chance)?;
        probability("skier_start_x", self.skier_start_x)?;

        if !self.tilt_gain.is_finite() {
            return invalid("tilt_gain", "must be finite");
        }
        if !(self.pose_dead_zone.is_finite() && self.pose_dead_zone >= 0.0) {
            return invalid("pose_dead_zone", "must be non-negative");
        }
        if !(self.speed_ramp.is_finite() && self.speed_ramp >= 0.0) {
            return invalid("speed_ramp", "must be non-negative");
        }
        if !(self.speed_cap.is_finite() && self.speed_cap >= self.base_speed) {
            return invalid("speed_cap", "must be at least base_speed");
        }
        if self.cluster_min == 0 || self.cluster_min > self.cluster_max {
            return invalid("cluster_min", "cluster range must be non-empty and start at 1 or more");
        }
        if !(0.0..0.5).contains(&self.edge_margin) {
            return invalid("edge_margin", "must be within [0, 0.5)");
        }
        if !self.cluster_offset_step.is_finite() {
            return invalid("cluster_offset_step", "must be finite");
        }
        if !self.skier_y.is_finite() {
            return invalid("skier_y", "must be finite");
        }
        Ok(())
    }
}
