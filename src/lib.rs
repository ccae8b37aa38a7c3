//! Frost Arena - A top-down wave survival arena shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, waves, game state)
//! - `input`: Held-action input source and tick input sampling
//! - `platform`: Frame driver and browser loop
//! - `persistence`: Key/value storage abstraction
//! - `tuning`: Data-driven game balance

pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::Records;
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta fed to the simulation (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Arena dimensions (x spans width, z spans height)
    pub const ARENA_WIDTH: f32 = 960.0;
    pub const ARENA_HEIGHT: f32 = 540.0;
    /// Spawn lanes are snapped to this grid
    pub const LANE_GRID: f32 = 48.0;
    /// Enemies spawn this far outside the arena edge
    pub const SPAWN_PADDING: f32 = 40.0;
    /// Enemies further than this outside the arena are culled
    pub const CULL_MARGIN: f32 = 160.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 18.0;
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    /// Subtracted from summed radii in every hit test
    pub const FORGIVENESS: f32 = 3.0;
    /// Width of the near-miss band outside the hit radius
    pub const NEAR_MISS_BAND: f32 = 10.0;

    /// Projectile defaults
    pub const PROJECTILE_RADIUS: f32 = 6.0;
    /// Projectiles appear this far in front of the player
    pub const PROJECTILE_MUZZLE: f32 = 20.0;

    /// Particle gravity on the height axis
    pub const PARTICLE_GRAVITY: f32 = 400.0;
    /// Hard cap on live particles (settings may lower it)
    pub const MAX_PARTICLES: usize = 256;
}

/// Linear interpolation between two vectors
#[inline]
pub fn lerp(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    a + (b - a) * t
}

/// Sign of a value with zero mapped to zero
#[inline]
pub fn sign0(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Snap a coordinate to the centre of its spawn lane
#[inline]
pub fn lane_snap(v: f32) -> f32 {
    use consts::LANE_GRID;
    (v / LANE_GRID).floor() * LANE_GRID + LANE_GRID / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_snap() {
        assert_eq!(lane_snap(0.0), 24.0);
        assert_eq!(lane_snap(47.9), 24.0);
        assert_eq!(lane_snap(48.0), 72.0);
        assert_eq!(lane_snap(270.0), 264.0);
    }

    #[test]
    fn test_sign0() {
        assert_eq!(sign0(3.0), 1.0);
        assert_eq!(sign0(-0.5), -1.0);
        assert_eq!(sign0(0.0), 0.0);
    }
}
