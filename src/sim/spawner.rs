//! Wave composition, spawn cadence and wave transitions

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;

use super::state::{Axis, Enemy, EnemyKind, GameEvent, SimulationWorld};
use super::store::EntityId;
use crate::consts::*;
use crate::lane_snap;

/// Enemy counts for one wave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveComposition {
    pub weak: u32,
    pub fast: u32,
    pub heavy: u32,
}

impl WaveComposition {
    pub fn total(&self) -> u32 {
        self.weak + self.fast + self.heavy
    }

    pub fn count(&self, kind: EnemyKind) -> u32 {
        match kind {
            EnemyKind::Weak => self.weak,
            EnemyKind::Fast => self.fast,
            EnemyKind::Heavy => self.heavy,
        }
    }
}

/// Enemy counts for a wave (1-based). Fast enemies join at wave 3, heavy
/// ones at wave 5, after which every count grows linearly.
pub fn wave_composition(wave: u32) -> WaveComposition {
    let (weak, fast, heavy) = match wave {
        0 | 1 => (8, 0, 0),
        2 => (12, 0, 0),
        3 => (14, 4, 0),
        4 => (16, 6, 0),
        5 => (18, 6, 2),
        w => {
            let past = w - 5;
            (18 + past * 2, 6 + past * 3 / 2, 2 + past / 2)
        }
    };
    WaveComposition { weak, fast, heavy }
}

/// Pop the next kind to spawn. An empty queue falls back to the weakest kind.
pub fn next_kind(queue: &mut Vec<EnemyKind>) -> EnemyKind {
    queue.pop().unwrap_or_else(|| {
        log::debug!("Spawn queue exhausted, falling back to {:?}", EnemyKind::default());
        EnemyKind::default()
    })
}

/// Begin spawning the current wave
pub fn start_wave(world: &mut SimulationWorld) {
    let wave = world.wave.wave;
    let composition = wave_composition(wave);

    let mut queue = Vec::with_capacity(composition.total() as usize);
    for kind in EnemyKind::ALL {
        queue.extend(std::iter::repeat_n(kind, composition.count(kind) as usize));
    }
    queue.shuffle(&mut world.rng);

    world.wave.queue = queue;
    world.wave.to_spawn = composition.total();
    world.wave.spawned = 0;
    world.wave.spawn_interval = world.tuning.spawn_interval(wave);
    world.wave.breather = false;
    world.wave.last_spawn = world.time;

    log::info!(
        "Wave {}: {} weak, {} fast, {} heavy, interval {:.2}s",
        wave,
        composition.weak,
        composition.fast,
        composition.heavy,
        world.wave.spawn_interval
    );
    world.emit(GameEvent::WaveStarted {
        wave,
        enemies: composition.total(),
    });
}

/// Advance the breather timer or release the next enemy when due
pub fn update(world: &mut SimulationWorld) {
    if world.wave.breather {
        let waited = world.time - world.wave.breather_started;
        if waited >= f64::from(world.tuning.breather_secs) {
            start_wave(world);
        }
        return;
    }

    let due = world.time - world.wave.last_spawn >= f64::from(world.wave.spawn_interval);
    if !world.wave.spawns_exhausted() && due {
        let kind = next_kind(&mut world.wave.queue);
        spawn_enemy(world, kind);
        world.wave.spawned += 1;
        world.wave.last_spawn = world.time;
    }
}

/// Spawn position for a side (0 left, 1 right, 2 top, 3 bottom), lined up
/// with the player's lane. Returns the initial movement axis too.
pub fn spawn_point(side: u32, player_pos: Vec2) -> (Vec2, Axis) {
    match side {
        0 => (Vec2::new(-SPAWN_PADDING, lane_snap(player_pos.y)), Axis::X),
        1 => (
            Vec2::new(ARENA_WIDTH + SPAWN_PADDING, lane_snap(player_pos.y)),
            Axis::X,
        ),
        2 => (Vec2::new(lane_snap(player_pos.x), -SPAWN_PADDING), Axis::Z),
        _ => (
            Vec2::new(lane_snap(player_pos.x), ARENA_HEIGHT + SPAWN_PADDING),
            Axis::Z,
        ),
    }
}

/// Place one enemy on a random side of the arena
pub fn spawn_enemy(world: &mut SimulationWorld, kind: EnemyKind) -> EntityId {
    let side = world.rng.random_range(0..4u32);
    let (pos, axis) = spawn_point(side, world.player.pos);
    let stats = *world.tuning.enemy(kind);
    let speed_mult = world.tuning.speed_multiplier(world.wave.wave);

    let id = world.next_entity_id();
    world.enemies.add(Enemy {
        id,
        kind,
        pos,
        radius: stats.radius,
        health: stats.health,
        damage: stats.damage,
        speed: stats.speed * speed_mult,
        axis,
        commit_until: 0.0,
    });
    world.emit(GameEvent::EnemySpawned { id, kind });
    id
}

/// Close the wave once every spawn is out and nothing is left alive.
/// Returns true if the wave advanced.
pub fn check_wave_clear(world: &mut SimulationWorld) -> bool {
    if world.wave.breather || !world.wave.spawns_exhausted() || world.enemies.alive_count() > 0 {
        return false;
    }

    let cleared = world.wave.wave;
    let bonus = world.tuning.wave_clear_bonus;
    world.session.score += bonus;
    world.wave.wave += 1;
    world.wave.breather = true;
    world.wave.breather_started = world.time;
    world.wave.queue.clear();

    log::info!("Wave {} cleared (+{}), score {}", cleared, bonus, world.session.score);
    world.emit(GameEvent::WaveCleared {
        wave: cleared,
        bonus,
    });
    true
}
