//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering or platform dependencies

pub mod clock;
pub mod collision;
pub mod movement;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod store;
pub mod tick;

pub use clock::{Clock, FrameDelta};
pub use snapshot::Snapshot;
pub use state::{
    Direction, Enemy, EnemyKind, GameEvent, GamePhase, Particle, ParticleKind, Player, Projectile,
    SimulationWorld,
};
pub use store::{Entity, EntityId, EntityStore};
pub use tick::{TickInput, tick};
