//! World state and core simulation types
//!
//! Everything the tick mutates lives in [`SimulationWorld`]; nothing is global.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::store::{Entity, EntityId, EntityStore, IdAllocator};
use crate::consts::*;
use crate::tuning::Tuning;

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for a start trigger, nothing advances
    #[default]
    Menu,
    /// Full tick pipeline runs
    Playing,
    /// Frozen until resumed
    Paused,
    /// Run ended, frozen until restart or menu
    GameOver,
}

/// Cardinal direction on the arena floor. Up is towards z = 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn unit(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    /// Dominant-axis direction of a delta (x wins only when strictly larger)
    pub fn from_delta(delta: Vec2) -> Option<Self> {
        if delta == Vec2::ZERO {
            None
        } else if delta.x.abs() > delta.y.abs() {
            Some(if delta.x > 0.0 {
                Direction::Right
            } else {
                Direction::Left
            })
        } else {
            Some(if delta.y > 0.0 {
                Direction::Down
            } else {
                Direction::Up
            })
        }
    }
}

/// Movement axis for Manhattan steering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Z,
}

impl Axis {
    /// Axis with the larger component (ties go to Z)
    pub fn dominant(delta: Vec2) -> Self {
        if delta.x.abs() > delta.y.abs() {
            Axis::X
        } else {
            Axis::Z
        }
    }
}

/// The player-controlled snowman
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: i32,
    pub max_health: i32,
    /// Sim time of the last shot (None until the first one)
    pub last_shot: Option<f64>,
    /// Hits are ignored until sim time reaches this
    pub invulnerable_until: f64,
    /// Cosmetic body offset (movement lean and shot recoil)
    pub lean: Vec2,
}

impl Player {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            pos: Vec2::new(ARENA_WIDTH / 2.0, ARENA_HEIGHT / 2.0),
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            last_shot: None,
            invulnerable_until: 0.0,
            lean: Vec2::ZERO,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_invulnerable(&self, now: f64) -> bool {
        now < self.invulnerable_until
    }

    /// Whether the fire cooldown has elapsed
    pub fn can_shoot(&self, now: f64, cooldown: f32) -> bool {
        self.last_shot
            .is_none_or(|last| now - last >= f64::from(cooldown))
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Re-picks its axis every tick
    #[default]
    Weak,
    /// Commits to an axis for a while before reassessing
    Fast,
    /// Slow and tough, steers like `Weak`
    Heavy,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Weak, EnemyKind::Fast, EnemyKind::Heavy];
}

/// A hostile entity
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub health: i32,
    pub damage: i32,
    pub speed: f32,
    pub axis: Axis,
    /// Fast enemies keep `axis` until sim time reaches this
    pub commit_until: f64,
}

impl Entity for Enemy {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_alive(&self) -> bool {
        self.health > 0
    }
}

/// A player snowball
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub owner: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Sim time the projectile was fired
    pub birth: f64,
    /// Set on first hit; spent projectiles never hit again
    pub spent: bool,
}

impl Projectile {
    pub fn age(&self, now: f64) -> f64 {
        now - self.birth
    }

    pub fn is_expired(&self, now: f64, lifetime: f32) -> bool {
        self.age(now) >= f64::from(lifetime)
    }
}

impl Entity for Projectile {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_alive(&self) -> bool {
        !self.spent
    }
}

/// What spawned a particle (for colour lookup on the presentation side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Damage,
    EnemyDeath,
    PlayerDeath,
}

/// A cosmetic particle. Never takes part in collisions.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: EntityId,
    pub kind: ParticleKind,
    /// Position on the arena floor
    pub pos: Vec2,
    pub vel: Vec2,
    /// Height above the floor
    pub height: f32,
    pub vel_height: f32,
    /// Seconds lived so far
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
}

impl Particle {
    /// 1.0 when fresh, 0.0 when about to be culled
    pub fn fade(&self) -> f32 {
        (1.0 - self.life / self.max_life).clamp(0.0, 1.0)
    }
}

impl Entity for Particle {
    fn id(&self) -> EntityId {
        self.id
    }

    fn is_alive(&self) -> bool {
        self.life < self.max_life
    }
}

/// Wave progression and global effects
#[derive(Debug, Clone, PartialEq)]
pub struct WaveState {
    /// Current wave (1-based)
    pub wave: u32,
    pub to_spawn: u32,
    pub spawned: u32,
    /// Seconds between spawns for this wave
    pub spawn_interval: f32,
    pub last_spawn: f64,
    /// Remaining kinds to spawn this wave, popped from the back
    pub queue: Vec<EnemyKind>,
    /// Between-wave pause
    pub breather: bool,
    pub breather_started: f64,
    /// Gameplay time multiplier, in (0, 1]
    pub time_scale: f32,
    /// Real seconds before the time scale starts recovering
    pub dilation_hold: f32,
    /// Screen shake magnitude (decays every tick)
    pub shake: f32,
    pub last_near_miss: Option<f64>,
}

impl Default for WaveState {
    fn default() -> Self {
        Self {
            wave: 1,
            to_spawn: 0,
            spawned: 0,
            spawn_interval: 0.55,
            last_spawn: 0.0,
            queue: Vec::new(),
            breather: true,
            breather_started: 0.0,
            time_scale: 1.0,
            dilation_hold: 0.0,
            shake: 0.0,
            last_near_miss: None,
        }
    }
}

impl WaveState {
    /// All spawns for the current wave are out
    pub fn spawns_exhausted(&self) -> bool {
        self.spawned >= self.to_spawn
    }
}

/// Score bookkeeping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub phase: GamePhase,
    pub score: u64,
    /// Best score across sessions (loaded from storage)
    pub high_score: u64,
    /// Best wave across sessions (loaded from storage)
    pub best_wave: u32,
}

/// Something the presentation or driver may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    SessionStarted,
    Paused,
    Resumed,
    ReturnedToMenu,
    WaveStarted {
        wave: u32,
        enemies: u32,
    },
    WaveCleared {
        wave: u32,
        bonus: u64,
    },
    EnemySpawned {
        id: EntityId,
        kind: EnemyKind,
    },
    ShotFired {
        id: EntityId,
        direction: Direction,
    },
    EnemyHit {
        id: EntityId,
        remaining: i32,
    },
    EnemyKilled {
        id: EntityId,
        kind: EnemyKind,
        score: u64,
    },
    PlayerHit {
        damage: i32,
        health: i32,
    },
    NearMiss {
        bonus: u64,
    },
    GameOver {
        score: u64,
        wave: u32,
        new_high_score: bool,
        new_best_wave: bool,
    },
}

/// The whole simulation, owned by the driver and passed into every system
#[derive(Debug, Clone)]
pub struct SimulationWorld {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Gameplay seconds elapsed this session (scaled by time dilation)
    pub time: f64,
    pub session: Session,
    pub player: Player,
    pub enemies: EntityStore<Enemy>,
    pub projectiles: EntityStore<Projectile>,
    pub particles: EntityStore<Particle>,
    pub wave: WaveState,
    /// Events emitted by the last tick
    pub events: Vec<GameEvent>,
    /// Maximum live particles
    pub particle_cap: usize,
    ids: IdAllocator,
}

impl SimulationWorld {
    /// Create a world sitting in the menu
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let mut ids = IdAllocator::default();
        let player = Player::new(ids.next());
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            time: 0.0,
            session: Session::default(),
            player,
            enemies: EntityStore::new(),
            projectiles: EntityStore::new(),
            particles: EntityStore::new(),
            wave: WaveState::default(),
            events: Vec::new(),
            particle_cap: MAX_PARTICLES,
            ids,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        self.ids.next()
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    /// Reset everything a run owns. Records and the RNG stream survive.
    pub fn reset_session(&mut self) {
        let player_id = self.next_entity_id();
        self.player = Player::new(player_id);
        self.enemies.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.wave = WaveState {
            spawn_interval: self.tuning.base_spawn_interval,
            ..WaveState::default()
        };
        self.time = 0.0;
        self.session.score = 0;
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_delta() {
        assert_eq!(Direction::from_delta(Vec2::new(5.0, 1.0)), Some(Direction::Right));
        assert_eq!(Direction::from_delta(Vec2::new(-5.0, 1.0)), Some(Direction::Left));
        assert_eq!(Direction::from_delta(Vec2::new(1.0, -5.0)), Some(Direction::Up));
        // Ties resolve to the vertical axis
        assert_eq!(Direction::from_delta(Vec2::new(3.0, 3.0)), Some(Direction::Down));
        assert_eq!(Direction::from_delta(Vec2::ZERO), None);
    }

    #[test]
    fn test_player_shoot_cooldown() {
        let mut player = Player::new(EntityId(1));
        assert!(player.can_shoot(0.0, 0.25));
        player.last_shot = Some(1.0);
        assert!(!player.can_shoot(1.1, 0.25));
        assert!(player.can_shoot(1.25, 0.25));
    }

    #[test]
    fn test_reset_session_clears_run() {
        let mut world = SimulationWorld::new(7, Tuning::default());
        world.session.score = 120;
        world.session.high_score = 500;
        world.wave.wave = 4;
        world.time = 33.0;
        world.player.health = 5;
        let old_player = world.player.id;

        world.reset_session();

        assert_eq!(world.session.score, 0);
        assert_eq!(world.session.high_score, 500);
        assert_eq!(world.wave.wave, 1);
        assert!(world.wave.breather);
        assert_eq!(world.time, 0.0);
        assert_eq!(world.player.health, PLAYER_MAX_HEALTH);
        assert_ne!(world.player.id, old_player);
    }
}
