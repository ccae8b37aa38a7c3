//! Movement integration
//!
//! Semi-implicit Euler, one step per tick. Player and enemies move along one
//! axis at a time, which gives the game its blocky, readable motion.

use glam::Vec2;

use super::state::{Axis, Direction, Enemy, EnemyKind, Particle, Player, Projectile};
use crate::consts::*;
use crate::{lerp, sign0};

/// Player movement limits, pulled from tuning
#[derive(Debug, Clone, Copy)]
pub struct PlayerMotion {
    pub speed: f32,
    pub accel: f32,
    pub decel: f32,
}

/// Ease the player's velocity toward the held direction, integrate, and
/// clamp to the arena.
pub fn move_player(player: &mut Player, dir: Option<Direction>, motion: PlayerMotion, dt: f32) {
    let dir_vec = dir.map(Direction::unit).unwrap_or(Vec2::ZERO);
    let target = dir_vec * motion.speed;
    let rate = if dir.is_some() {
        motion.accel
    } else {
        motion.decel
    };
    let t = (rate * dt / motion.speed).clamp(0.0, 1.0);
    player.vel = lerp(player.vel, target, t);
    player.pos += player.vel * dt;
    player.pos = clamp_to_arena(player.pos, player.radius);

    // Cosmetic lean toward the direction of travel
    player.lean = lerp(player.lean, dir_vec * 8.0, 0.07);
}

/// Clamp a position so a circle of `radius` stays inside the arena
pub fn clamp_to_arena(pos: Vec2, radius: f32) -> Vec2 {
    Vec2::new(
        pos.x.clamp(radius, ARENA_WIDTH - radius),
        pos.y.clamp(radius, ARENA_HEIGHT - radius),
    )
}

/// Whether a position has drifted further than `margin` outside the arena
pub fn is_outside_arena(pos: Vec2, margin: f32) -> bool {
    pos.x < -margin
        || pos.x > ARENA_WIDTH + margin
        || pos.y < -margin
        || pos.y > ARENA_HEIGHT + margin
}

/// Pick the steering axis for this tick.
///
/// Weak and heavy enemies chase along the larger delta every tick. Fast
/// enemies only reassess once their commit window has run out.
pub fn steer_enemy(enemy: &mut Enemy, target: Vec2, now: f64, commit_secs: f32) {
    let delta = target - enemy.pos;
    match enemy.kind {
        EnemyKind::Weak | EnemyKind::Heavy => {
            enemy.axis = Axis::dominant(delta);
        }
        EnemyKind::Fast => {
            if now >= enemy.commit_until {
                enemy.axis = Axis::dominant(delta);
                enemy.commit_until = now + f64::from(commit_secs);
            }
        }
    }
}

/// Step an enemy along its axis toward the target
pub fn move_enemy(enemy: &mut Enemy, target: Vec2, dt: f32) {
    let delta = target - enemy.pos;
    let step = enemy.speed * dt;
    match enemy.axis {
        Axis::X => enemy.pos.x += sign0(delta.x) * step,
        Axis::Z => enemy.pos.y += sign0(delta.y) * step,
    }
}

/// Constant-velocity flight
pub fn move_projectile(projectile: &mut Projectile, dt: f32) {
    projectile.pos += projectile.vel * dt;
}

/// Drift, fall and age a particle
pub fn move_particle(particle: &mut Particle, dt: f32) {
    particle.pos += particle.vel * dt;
    particle.height = (particle.height + particle.vel_height * dt).max(0.0);
    particle.vel_height -= PARTICLE_GRAVITY * dt;
    particle.life += dt;
}
