//! Collision detection between the skier and obstacles
//!
//! Both are circles. Touching exactly at the rim is not a hit.

use glam::Vec2;

use super::state::Obstacle;

/// Strict circle-circle overlap: `distance < ra + rb`
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// First obstacle (in spawn order) overlapping the skier, if any
pub fn first_collision<'a>(
    skier: Vec2,
    skier_radius: f32,
    obstacles: &'a [Obstacle],
) -> Option<&'a Obstacle> {
    obstacles
        .iter()
        .find(|o| circles_overlap(skier, skier_radius, o.center(), o.radius))
}
