//! Read-only view of the world for presentation
//!
//! A presentation layer only ever sees this. It carries entity ids so a
//! renderer can keep its own drawables keyed by id without the simulation
//! knowing they exist.

use glam::Vec2;
use serde::Serialize;

use super::state::{EnemyKind, GameEvent, GamePhase, ParticleKind, SimulationWorld};
use super::store::EntityId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub vel: Vec2,
    pub lean: Vec2,
    pub health: i32,
    pub max_health: i32,
    pub invulnerable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectileView {
    pub id: EntityId,
    pub pos: Vec2,
    pub radius: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleView {
    pub id: EntityId,
    pub kind: ParticleKind,
    pub pos: Vec2,
    pub height: f32,
    pub size: f32,
    /// 1.0 fresh, 0.0 about to disappear
    pub fade: f32,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub score: u64,
    pub high_score: u64,
    pub wave: u32,
    pub best_wave: u32,
    pub breather: bool,
    pub time_scale: f32,
    pub shake: f32,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub particles: Vec<ParticleView>,
    /// Events from the tick that produced this snapshot
    pub events: Vec<GameEvent>,
}

impl Snapshot {
    pub fn capture(world: &SimulationWorld) -> Self {
        let player = &world.player;
        Self {
            phase: world.session.phase,
            score: world.session.score,
            high_score: world.session.high_score,
            wave: world.wave.wave,
            best_wave: world.session.best_wave,
            breather: world.wave.breather,
            time_scale: world.wave.time_scale,
            shake: world.wave.shake,
            player: PlayerView {
                pos: player.pos,
                vel: player.vel,
                lean: player.lean,
                health: player.health,
                max_health: player.max_health,
                invulnerable: player.is_invulnerable(world.time),
            },
            enemies: world
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    kind: e.kind,
                    pos: e.pos,
                    radius: e.radius,
                    health: e.health,
                })
                .collect(),
            projectiles: world
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    pos: p.pos,
                    radius: p.radius,
                })
                .collect(),
            particles: world
                .particles
                .iter()
                .map(|p| ParticleView {
                    id: p.id,
                    kind: p.kind,
                    pos: p.pos,
                    height: p.height,
                    size: p.size,
                    fade: p.fade(),
                })
                .collect(),
            events: world.events.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
