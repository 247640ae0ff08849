//! Procedural obstacle spawner
//!
//! Rows are spawned by distance travelled, not per frame, so obstacle density
//! is independent of tick rate. A single seeded stream drives every draw for
//! the lifetime of the spawner.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Obstacle, ObstacleKind};
use crate::consts::MAX_ROWS_PER_TICK;
use crate::tuning::Tuning;

#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    /// Distance covered since the last row was emitted
    distance_since_last_spawn: f32,
    /// Kind of the most recent obstacle, shared across rows and clusters
    last_kind: Option<ObstacleKind>,
    next_id: u64,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            distance_since_last_spawn: 0.0,
            last_kind: None,
            next_id: 1,
        }
    }

    /// Restart the random stream from `seed` and clear run state
    pub fn reseed(&mut self, seed: u64) {
        *self = Self::new(seed);
    }

    /// Clear per-run state; the random stream keeps advancing
    pub fn reset(&mut self) {
        self.distance_since_last_spawn = 0.0;
        self.last_kind = None;
        self.next_id = 1;
    }

    pub fn distance_since_last_spawn(&self) -> f32 {
        self.distance_since_last_spawn
    }

    pub fn last_kind(&self) -> Option<ObstacleKind> {
        self.last_kind
    }

    /// Account for `distance` travelled and append any rows that are due.
    ///
    /// Returns the number of obstacles appended.
    pub fn advance(&mut self, distance: f32, tuning: &Tuning, obstacles: &mut Vec<Obstacle>) -> usize {
        if !(distance.is_finite() && distance > 0.0) {
            return 0;
        }

        let before = obstacles.len();
        self.distance_since_last_spawn += distance;

        // Every row of one tick appears at the top edge, so a backlog past the
        // cap would only pile up on the same line
        let owed = self.distance_since_last_spawn / tuning.spawn_spacing;
        if owed > MAX_ROWS_PER_TICK as f32 {
            log::warn!("Dropping {} spawn rows owed by one tick", owed.floor() - MAX_ROWS_PER_TICK as f32);
            self.distance_since_last_spawn = self.distance_since_last_spawn.rem_euclid(tuning.spawn_spacing);
            for _ in 0..MAX_ROWS_PER_TICK {
                self.spawn_row(tuning, obstacles);
            }
        } else {
            while self.distance_since_last_spawn >= tuning.spawn_spacing {
                self.distance_since_last_spawn -= tuning.spawn_spacing;
                self.spawn_row(tuning, obstacles);
            }
        }

        let spawned = obstacles.len() - before;
        if spawned > 0 {
            log::debug!("Spawned {} obstacle(s)", spawned);
        }
        spawned
    }

    /// Emit one row: a single obstacle or a cluster spread around a base x
    fn spawn_row(&mut self, tuning: &Tuning, obstacles: &mut Vec<Obstacle>) {
        let base_x: f32 = self.rng.random();

        let cluster_size = if self.rng.random::<f32>() < tuning.cluster_chance {
            self.rng.random_range(tuning.cluster_min..=tuning.cluster_max)
        } else {
            1
        };

        let center = (cluster_size - 1) as f32 / 2.0;
        let min_x = tuning.edge_margin;
        let max_x = 1.0 - tuning.edge_margin;

        for slot in 0..cluster_size {
            let kind = self.next_kind(tuning);
            let offset = (slot as f32 - center) * tuning.cluster_offset_step;
            let x = (base_x + offset).clamp(min_x, max_x);

            let id = self.next_id;
            self.next_id += 1;
            obstacles.push(Obstacle::spawned(id, x, kind, tuning));
        }
    }

    /// Pick the next kind, biased away from repeating the previous one
    fn next_kind(&mut self, tuning: &Tuning) -> ObstacleKind {
        let kind = match self.last_kind {
            None => {
                if self.rng.random_bool(0.5) {
                    ObstacleKind::Tree
                } else {
                    ObstacleKind::Rock
                }
            }
            Some(last) => {
                if self.rng.random::<f32>() < tuning.kind_flip_chance {
                    last.flipped()
                } else {
                    last
                }
            }
        };
        self.last_kind = Some(kind);
        kind
    }
}
