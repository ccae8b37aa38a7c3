//! Collision detection and response
//!
//! Everything here is circle-circle. Hits require slightly deeper overlap than
//! touching (the forgiveness margin), and the same margin is used for every
//! pair so grazes behave identically for the player and for snowballs.

use glam::Vec2;
use rand::Rng;

use super::state::{GameEvent, Particle, ParticleKind, SimulationWorld};
use super::store::Entity;
use crate::consts::*;

/// How close two circles are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    /// Overlapping past the forgiveness margin
    Hit,
    /// Just outside the hit radius, inside the near-miss band
    NearMiss,
    Clear,
}

/// Effective hit distance for two radii
#[inline]
pub fn hit_radius(radius_a: f32, radius_b: f32) -> f32 {
    radius_a + radius_b - FORGIVENESS
}

/// Circle overlap with the forgiveness margin applied
#[inline]
pub fn circles_hit(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> bool {
    let reach = hit_radius(radius_a, radius_b);
    reach > 0.0 && pos_a.distance_squared(pos_b) < reach * reach
}

/// Classify the distance between the player and an enemy
pub fn proximity(pos_a: Vec2, radius_a: f32, pos_b: Vec2, radius_b: f32) -> Proximity {
    let dist = pos_a.distance(pos_b);
    let reach = hit_radius(radius_a, radius_b);
    if dist < reach {
        Proximity::Hit
    } else if dist < reach + NEAR_MISS_BAND {
        Proximity::NearMiss
    } else {
        Proximity::Clear
    }
}

/// Snowballs against enemies.
///
/// Projectiles are processed in id order and each one tests enemies in id
/// order. The first living enemy it overlaps takes one point of damage, the
/// projectile is spent, and no further enemies are tested for it.
pub fn resolve_projectile_hits(world: &mut SimulationWorld) {
    let now = world.time;
    let lifetime = world.tuning.projectile_lifetime_secs;
    let mut events = Vec::new();
    let mut kills = Vec::new();

    let enemies = &mut world.enemies;
    for projectile in world.projectiles.iter_mut() {
        if projectile.spent || projectile.is_expired(now, lifetime) {
            continue;
        }

        let target = enemies.iter_mut().find(|enemy| {
            enemy.is_alive()
                && circles_hit(projectile.pos, projectile.radius, enemy.pos, enemy.radius)
        });

        if let Some(enemy) = target {
            enemy.health -= 1;
            projectile.spent = true;
            events.push(GameEvent::EnemyHit {
                id: enemy.id,
                remaining: enemy.health.max(0),
            });
            if !enemy.is_alive() {
                kills.push((enemy.id, enemy.kind, enemy.pos));
            }
        }
    }

    world.events.extend(events);

    for (id, kind, pos) in kills {
        let score = world.tuning.enemy(kind).score;
        world.session.score += score;
        spawn_burst(world, pos, ParticleKind::EnemyDeath, 5, 50.0);
        world.emit(GameEvent::EnemyKilled { id, kind, score });
    }
}

/// Enemies touching the player.
///
/// A hit while invulnerable is ignored. The first landed hit starts the
/// invulnerability window, so one tick never stacks damage from several
/// enemies. Grazes inside the near-miss band feed [`trigger_near_miss`].
pub fn resolve_player_contacts(world: &mut SimulationWorld) {
    if !world.player.is_alive() {
        return;
    }

    let player_pos = world.player.pos;
    let player_radius = world.player.radius;
    let mut hits = Vec::new();
    let mut grazed = false;

    for enemy in world.enemies.iter().filter(|e| e.is_alive()) {
        match proximity(player_pos, player_radius, enemy.pos, enemy.radius) {
            Proximity::Hit => hits.push(enemy.damage),
            Proximity::NearMiss => grazed = true,
            Proximity::Clear => {}
        }
    }

    for damage in hits {
        apply_player_hit(world, damage);
    }
    // No reward for a graze on the tick the player goes down
    if grazed && world.player.is_alive() {
        trigger_near_miss(world);
    }
}

/// Apply one enemy's damage to the player. Returns false if the player was
/// invulnerable or already down.
pub fn apply_player_hit(world: &mut SimulationWorld, damage: i32) -> bool {
    let now = world.time;
    if !world.player.is_alive() || world.player.is_invulnerable(now) {
        return false;
    }

    let player = &mut world.player;
    player.health = (player.health - damage).max(0);
    player.invulnerable_until = now + f64::from(world.tuning.invulnerability_secs);
    let health = player.health;
    let pos = player.pos;

    world.wave.shake = world.tuning.hit_shake;
    spawn_burst(world, pos, ParticleKind::Damage, 10, 100.0);
    world.emit(GameEvent::PlayerHit { damage, health });
    true
}

/// Reward a graze with score and a short slow-motion. Rate limited by the
/// near-miss cooldown. Returns true if the reward was granted.
pub fn trigger_near_miss(world: &mut SimulationWorld) -> bool {
    let now = world.time;
    let cooldown = f64::from(world.tuning.near_miss_cooldown_secs);
    if world
        .wave
        .last_near_miss
        .is_some_and(|last| now - last < cooldown)
    {
        return false;
    }

    world.wave.last_near_miss = Some(now);
    world.wave.time_scale = world.tuning.near_miss_time_scale;
    world.wave.dilation_hold = world.tuning.dilation_hold_secs;
    let bonus = world.tuning.near_miss_score;
    world.session.score += bonus;
    world.emit(GameEvent::NearMiss { bonus });
    true
}

/// Scatter cosmetic particles from a point, respecting the particle cap
pub fn spawn_burst(
    world: &mut SimulationWorld,
    pos: Vec2,
    kind: ParticleKind,
    count: u32,
    speed: f32,
) {
    for _ in 0..count {
        if world.particles.len() >= world.particle_cap {
            break;
        }
        let angle = world.rng.random::<f32>() * std::f32::consts::TAU;
        let mag = world.rng.random::<f32>() * speed;
        let rise = world.rng.random::<f32>() * speed;
        let max_life = 0.5 + world.rng.random::<f32>() * 0.5;
        let size = 2.0 + world.rng.random::<f32>() * 4.0;

        let id = world.next_entity_id();
        world.particles.add(Particle {
            id,
            kind,
            pos,
            vel: Vec2::new(angle.cos(), angle.sin()) * mag,
            height: 10.0,
            vel_height: rise,
            life: 0.0,
            max_life,
            size,
        });
    }
}
