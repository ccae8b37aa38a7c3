//! Per-frame simulation tick
//!
//! Core game loop that advances the world by one variable timestep.

use glam::Vec2;

use super::clock;
use super::collision::{resolve_player_contacts, resolve_projectile_hits, spawn_burst};
use super::movement::{
    PlayerMotion, is_outside_arena, move_enemy, move_particle, move_player, move_projectile,
    steer_enemy,
};
use super::spawner;
use super::state::{
    Direction, GameEvent, GamePhase, ParticleKind, Projectile, SimulationWorld, WaveState,
};
use super::store::Entity;
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Held movement direction, already resolved to one axis
    pub move_dir: Option<Direction>,
    /// Held shooting direction from the keyboard
    pub shoot_dir: Option<Direction>,
    /// Pointer position while the pointer is held (overrides `shoot_dir`)
    pub aim: Option<Vec2>,
    /// Start a session from the menu
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Pause if playing (focus lost); never resumes
    pub auto_pause: bool,
    /// Start over after a game over
    pub restart: bool,
    /// Back to the menu after a game over
    pub menu: bool,
}

/// Advance the world by one frame of `dt` raw seconds
pub fn tick(world: &mut SimulationWorld, input: &TickInput, dt: f32) {
    world.events.clear();
    apply_commands(world, input);

    // Menu, Paused and GameOver are frozen
    if world.phase() != GamePhase::Playing {
        return;
    }

    let delta = clock::step(dt, MAX_FRAME_DT, world.wave.time_scale);

    // Decay screen shake
    world.wave.shake *= world.tuning.shake_decay;
    if world.wave.shake < 0.01 {
        world.wave.shake = 0.0;
    }

    // Slow-motion runs on wall-clock time
    recover_time_scale(&mut world.wave, delta.raw, world.tuning.dilation_recovery_rate);

    let dt = delta.scaled;
    world.time += f64::from(dt);

    // --- PLAYER ---
    let motion = PlayerMotion {
        speed: world.tuning.player_speed,
        accel: world.tuning.player_accel,
        decel: world.tuning.player_decel,
    };
    move_player(&mut world.player, input.move_dir, motion, dt);
    fire(world, input);

    // --- SPAWNING ---
    spawner::update(world);

    // --- MOVEMENT ---
    let target = world.player.pos;
    let now = world.time;
    let commit = world.tuning.fast_commit_secs;
    for enemy in world.enemies.iter_mut().filter(|e| e.is_alive()) {
        steer_enemy(enemy, target, now, commit);
        move_enemy(enemy, target, dt);
    }
    for projectile in world.projectiles.iter_mut() {
        move_projectile(projectile, dt);
    }
    for particle in world.particles.iter_mut() {
        move_particle(particle, dt);
    }

    // --- COLLISIONS ---
    resolve_projectile_hits(world);
    resolve_player_contacts(world);
    if !world.player.is_alive() {
        enter_game_over(world);
    }

    // --- CULL ---
    let lifetime = world.tuning.projectile_lifetime_secs;
    world
        .enemies
        .remove_where(|e| !e.is_alive() || is_outside_arena(e.pos, CULL_MARGIN));
    world
        .projectiles
        .remove_where(|p| !p.is_alive() || p.is_expired(now, lifetime));
    world.particles.cull_dead();

    if world.phase() == GamePhase::Playing {
        spawner::check_wave_clear(world);
    }
}

/// Apply one-shot phase commands. Anything that doesn't fit the current
/// phase is dropped.
fn apply_commands(world: &mut SimulationWorld, input: &TickInput) {
    if input.start || input.restart {
        match world.phase() {
            GamePhase::Menu | GamePhase::GameOver => start_session(world),
            phase => log::debug!("Ignoring start in {:?}", phase),
        }
    }

    if input.pause {
        match world.phase() {
            GamePhase::Playing => {
                world.session.phase = GamePhase::Paused;
                world.emit(GameEvent::Paused);
            }
            GamePhase::Paused => {
                world.session.phase = GamePhase::Playing;
                world.emit(GameEvent::Resumed);
            }
            phase => log::debug!("Ignoring pause toggle in {:?}", phase),
        }
    }

    if input.auto_pause && world.phase() == GamePhase::Playing {
        world.session.phase = GamePhase::Paused;
        world.emit(GameEvent::Paused);
    }

    if input.menu {
        match world.phase() {
            GamePhase::GameOver => {
                world.session.phase = GamePhase::Menu;
                world.emit(GameEvent::ReturnedToMenu);
            }
            phase => log::debug!("Ignoring menu command in {:?}", phase),
        }
    }
}

/// Fresh run: player, collections, waves and score all reset
fn start_session(world: &mut SimulationWorld) {
    world.reset_session();
    world.session.phase = GamePhase::Playing;
    log::info!(
        "Session started (seed {}, high score {}, best wave {})",
        world.seed,
        world.session.high_score,
        world.session.best_wave
    );
    world.emit(GameEvent::SessionStarted);
}

fn recover_time_scale(wave: &mut WaveState, raw_dt: f32, rate: f32) {
    if wave.dilation_hold > 0.0 {
        wave.dilation_hold = (wave.dilation_hold - raw_dt).max(0.0);
    } else if wave.time_scale < 1.0 {
        wave.time_scale = (wave.time_scale + raw_dt * rate).min(1.0);
    }
}

/// Spawn a snowball if a shot is requested and the cooldown allows it
fn fire(world: &mut SimulationWorld, input: &TickInput) {
    let aimed = input
        .aim
        .and_then(|target| Direction::from_delta(target - world.player.pos));
    let Some(dir) = aimed.or(input.shoot_dir) else {
        return;
    };

    let now = world.time;
    if !world.player.can_shoot(now, world.tuning.fire_cooldown_secs) {
        return;
    }

    let unit = dir.unit();
    world.player.last_shot = Some(now);
    world.player.lean = -unit * 6.0;

    let id = world.next_entity_id();
    let projectile = Projectile {
        id,
        owner: world.player.id,
        pos: world.player.pos + unit * PROJECTILE_MUZZLE,
        vel: unit * world.tuning.projectile_speed,
        radius: PROJECTILE_RADIUS,
        birth: now,
        spent: false,
    };
    world.projectiles.add(projectile);
    world.emit(GameEvent::ShotFired { id, direction: dir });
}

/// Freeze the run and settle the records exactly once
fn enter_game_over(world: &mut SimulationWorld) {
    if world.phase() == GamePhase::GameOver {
        return;
    }
    world.session.phase = GamePhase::GameOver;
    world.wave.shake = world.tuning.game_over_shake;
    let pos = world.player.pos;
    spawn_burst(world, pos, ParticleKind::PlayerDeath, 12, 240.0);

    let score = world.session.score;
    let wave = world.wave.wave;
    let new_high_score = score > world.session.high_score;
    let new_best_wave = wave > world.session.best_wave;
    if new_high_score {
        world.session.high_score = score;
    }
    if new_best_wave {
        world.session.best_wave = wave;
    }

    log::info!(
        "Game over: score {}, wave {}{}",
        score,
        wave,
        if new_high_score { " (new high score)" } else { "" }
    );
    world.emit(GameEvent::GameOver {
        score,
        wave,
        new_high_score,
        new_best_wave,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Axis, Enemy, EnemyKind};
    use crate::sim::store::EntityId;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn started(seed: u64) -> SimulationWorld {
        let mut world = SimulationWorld::new(seed, Tuning::default());
        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut world, &input, 0.0);
        world
    }

    fn add_enemy(world: &mut SimulationWorld, kind: EnemyKind, pos: Vec2) -> EntityId {
        let stats = *world.tuning.enemy(kind);
        let id = world.next_entity_id();
        world.enemies.add(Enemy {
            id,
            kind,
            pos,
            radius: stats.radius,
            health: stats.health,
            damage: stats.damage,
            speed: stats.speed,
            axis: Axis::X,
            commit_until: 0.0,
        });
        id
    }

    fn positions(world: &SimulationWorld) -> Vec<Vec2> {
        let mut out = vec![world.player.pos];
        out.extend(world.enemies.iter().map(|e| e.pos));
        out.extend(world.projectiles.iter().map(|p| p.pos));
        out.extend(world.particles.iter().map(|p| p.pos));
        out
    }

    #[test]
    fn test_tick_menu_to_playing() {
        let mut world = SimulationWorld::new(12345, Tuning::default());
        assert_eq!(world.phase(), GamePhase::Menu);

        // Without a start the menu stays frozen
        tick(&mut world, &TickInput::default(), DT);
        assert_eq!(world.phase(), GamePhase::Menu);
        assert_eq!(world.time, 0.0);

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut world, &input, DT);
        assert_eq!(world.phase(), GamePhase::Playing);
        assert!(world.events.contains(&GameEvent::SessionStarted));
    }

    #[test]
    fn test_start_twice_equals_start_once() {
        let start = TickInput {
            start: true,
            ..Default::default()
        };
        let mut once = SimulationWorld::new(8, Tuning::default());
        let mut twice = SimulationWorld::new(8, Tuning::default());

        tick(&mut once, &start, DT);
        tick(&mut once, &TickInput::default(), DT);
        tick(&mut twice, &start, DT);
        tick(&mut twice, &start, DT);

        assert_eq!(once.player, twice.player);
        assert_eq!(once.session, twice.session);
        assert_eq!(once.wave, twice.wave);
        assert_eq!(once.time, twice.time);
    }

    #[test]
    fn test_tick_pause() {
        let mut world = started(12345);
        let input = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut world, &input, DT);
        assert_eq!(world.phase(), GamePhase::Paused);

        tick(&mut world, &input, DT);
        assert_eq!(world.phase(), GamePhase::Playing);
        assert!(world.events.contains(&GameEvent::Resumed));
    }

    #[test]
    fn test_auto_pause_only_pauses() {
        let mut world = started(12345);
        let auto = TickInput {
            auto_pause: true,
            ..Default::default()
        };
        tick(&mut world, &auto, DT);
        assert_eq!(world.phase(), GamePhase::Paused);

        // A second focus loss keeps it paused
        tick(&mut world, &auto, DT);
        assert_eq!(world.phase(), GamePhase::Paused);

        // Toggle-resume plus focus loss in the same frame stays paused
        let both = TickInput {
            pause: true,
            auto_pause: true,
            ..Default::default()
        };
        tick(&mut world, &both, DT);
        assert_eq!(world.phase(), GamePhase::Paused);
    }

    #[test]
    fn test_pause_freezes_world() {
        let mut world = started(3);
        for _ in 0..120 {
            tick(&mut world, &TickInput::default(), 0.05);
        }
        assert!(!world.enemies.is_empty());

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut world, &pause, 0.05);
        let before = positions(&world);
        let time = world.time;
        let health: Vec<i32> = world.enemies.iter().map(|e| e.health).collect();

        for _ in 0..50 {
            tick(&mut world, &TickInput::default(), 0.05);
        }
        assert_eq!(positions(&world), before);
        assert_eq!(world.time, time);
        assert_eq!(world.enemies.iter().map(|e| e.health).collect::<Vec<_>>(), health);
    }

    #[test]
    fn test_wave_one_cleared_by_kills() {
        let mut world = started(21);
        let mut kills = 0;

        for _ in 0..400 {
            // Park a stationary snowball on every living enemy
            let targets: Vec<Vec2> = world
                .enemies
                .iter()
                .filter(|e| e.is_alive())
                .map(|e| e.pos)
                .collect();
            for pos in targets {
                let id = world.next_entity_id();
                let owner = world.player.id;
                let birth = world.time;
                world.projectiles.add(Projectile {
                    id,
                    owner,
                    pos,
                    vel: Vec2::ZERO,
                    radius: PROJECTILE_RADIUS,
                    birth,
                    spent: false,
                });
            }

            tick(&mut world, &TickInput::default(), 0.05);
            kills += world
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
                .count();
            if world.wave.wave == 2 {
                break;
            }
        }

        assert_eq!(world.wave.wave, 2);
        assert_eq!(kills, 8);
        assert_eq!(world.session.score, 8 * 10 + 50);
        assert!(world.wave.breather);
    }

    #[test]
    fn test_projectile_expires_after_lifetime() {
        let mut world = SimulationWorld::new(4, Tuning::default());
        let input = TickInput {
            start: true,
            shoot_dir: Some(Direction::Right),
            ..Default::default()
        };
        tick(&mut world, &input, 0.0);
        assert_eq!(world.projectiles.len(), 1);
        let birth = world.projectiles.as_slice()[0].birth;

        loop {
            tick(&mut world, &TickInput::default(), 0.05);
            let age = world.time - birth;
            if world.projectiles.is_empty() {
                assert!(age >= 1.25);
                assert!(age < 1.25 + 0.06);
                break;
            }
            assert!(age < 1.25);
        }
    }

    #[test]
    fn test_shooting_respects_cooldown() {
        let mut world = started(9);
        let shoot = TickInput {
            shoot_dir: Some(Direction::Up),
            ..Default::default()
        };
        tick(&mut world, &shoot, 0.05);
        assert_eq!(world.projectiles.len(), 1);
        // Recoil pushes against the shot
        assert_eq!(world.player.lean.y, 6.0);

        tick(&mut world, &shoot, 0.05);
        assert_eq!(world.projectiles.len(), 1);

        for _ in 0..3 {
            tick(&mut world, &shoot, 0.05);
        }
        assert_eq!(world.projectiles.len(), 2);
    }

    #[test]
    fn test_pointer_overrides_keys() {
        let mut world = started(9);
        let target = world.player.pos + Vec2::new(-100.0, 20.0);
        let input = TickInput {
            shoot_dir: Some(Direction::Up),
            aim: Some(target),
            ..Default::default()
        };
        tick(&mut world, &input, 0.0);
        assert!(world.events.iter().any(|e| matches!(
            e,
            GameEvent::ShotFired {
                direction: Direction::Left,
                ..
            }
        )));
        assert!(world.projectiles.as_slice()[0].vel.x < 0.0);
    }

    #[test]
    fn test_game_over_updates_records_once() {
        let mut world = started(11);
        world.session.score = 40;
        world.player.health = 5;
        let pos = world.player.pos;
        add_enemy(&mut world, EnemyKind::Weak, pos);

        tick(&mut world, &TickInput::default(), 0.0);

        assert_eq!(world.phase(), GamePhase::GameOver);
        assert_eq!(world.player.health, 0);
        assert_eq!(world.session.high_score, 40);
        assert_eq!(world.session.best_wave, 1);
        assert_eq!(world.wave.shake, 18.0);
        assert!(world.events.contains(&GameEvent::GameOver {
            score: 40,
            wave: 1,
            new_high_score: true,
            new_best_wave: true,
        }));

        // Frozen afterwards
        let time = world.time;
        tick(&mut world, &TickInput::default(), 0.05);
        assert_eq!(world.time, time);
        assert!(world.events.is_empty());
    }

    #[test]
    fn test_restart_and_menu_from_game_over() {
        let mut world = started(11);
        world.session.score = 70;
        world.player.health = 1;
        let pos = world.player.pos;
        add_enemy(&mut world, EnemyKind::Heavy, pos);
        tick(&mut world, &TickInput::default(), 0.0);
        assert_eq!(world.phase(), GamePhase::GameOver);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut world, &restart, 0.0);
        assert_eq!(world.phase(), GamePhase::Playing);
        assert_eq!(world.session.score, 0);
        assert_eq!(world.session.high_score, 70);
        assert_eq!(world.player.health, PLAYER_MAX_HEALTH);
        assert!(world.enemies.is_empty());

        // Menu is only reachable from game over
        let menu = TickInput {
            menu: true,
            ..Default::default()
        };
        tick(&mut world, &menu, 0.0);
        assert_eq!(world.phase(), GamePhase::Playing);

        world.player.health = 1;
        let pos = world.player.pos;
        add_enemy(&mut world, EnemyKind::Heavy, pos);
        tick(&mut world, &TickInput::default(), 0.0);
        tick(&mut world, &menu, 0.0);
        assert_eq!(world.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_near_miss_slows_time_then_recovers() {
        let mut world = started(6);
        let pos = world.player.pos + Vec2::new(33.0, 0.0);
        add_enemy(&mut world, EnemyKind::Heavy, pos + Vec2::new(8.0, 0.0));

        tick(&mut world, &TickInput::default(), 0.0);
        assert_eq!(world.wave.time_scale, 0.55);

        // Hold lasts 0.12s of raw time, then recovery at 5/s
        world.enemies.clear();
        tick(&mut world, &TickInput::default(), 0.1);
        assert_eq!(world.wave.time_scale, 0.55);
        tick(&mut world, &TickInput::default(), 0.1);
        tick(&mut world, &TickInput::default(), 0.05);
        assert!(world.wave.time_scale > 0.55);
        for _ in 0..10 {
            tick(&mut world, &TickInput::default(), 0.1);
        }
        assert_eq!(world.wave.time_scale, 1.0);
    }

    #[test]
    fn test_dead_entities_gone_after_tick() {
        let mut world = started(2);
        for _ in 0..300 {
            let input = TickInput {
                shoot_dir: Some(Direction::Left),
                ..Default::default()
            };
            tick(&mut world, &input, 0.05);
            assert!(world.enemies.iter().all(|e| e.health > 0));
            assert!(world.projectiles.iter().all(|p| !p.spent));
            if world.phase() != GamePhase::Playing {
                break;
            }
        }
    }

    #[test]
    fn test_determinism() {
        // Two worlds with the same seed produce identical runs
        let mut world1 = started(99999);
        let mut world2 = started(99999);

        let inputs = [
            TickInput {
                move_dir: Some(Direction::Left),
                ..Default::default()
            },
            TickInput {
                shoot_dir: Some(Direction::Up),
                ..Default::default()
            },
            TickInput::default(),
        ];

        for i in 0..300 {
            let input = &inputs[i % inputs.len()];
            tick(&mut world1, input, 0.05);
            tick(&mut world2, input, 0.05);
        }

        assert_eq!(world1.time, world2.time);
        assert_eq!(world1.session, world2.session);
        assert_eq!(positions(&world1), positions(&world2));
    }

    fn direction_strategy() -> impl Strategy<Value = Option<Direction>> {
        prop_oneof![
            Just(None),
            Just(Some(Direction::Up)),
            Just(Some(Direction::Down)),
            Just(Some(Direction::Left)),
            Just(Some(Direction::Right)),
        ]
    }

    proptest! {
        #[test]
        fn prop_player_stays_in_arena(
            steps in prop::collection::vec((direction_strategy(), 0.0f32..0.3), 1..200),
        ) {
            let mut world = started(17);
            for (dir, dt) in steps {
                let input = TickInput { move_dir: dir, ..Default::default() };
                tick(&mut world, &input, dt);
                let p = world.player.pos;
                let r = world.player.radius;
                prop_assert!(p.x >= r && p.x <= ARENA_WIDTH - r);
                prop_assert!(p.y >= r && p.y <= ARENA_HEIGHT - r);
            }
        }

        #[test]
        fn prop_paused_world_is_frozen(
            warmup in 0usize..120,
            steps in prop::collection::vec((direction_strategy(), 0.0f32..0.5), 1..50),
        ) {
            let mut world = started(23);
            for _ in 0..warmup {
                tick(&mut world, &TickInput::default(), 0.05);
            }
            prop_assume!(world.phase() == GamePhase::Playing);

            let pause = TickInput { pause: true, ..Default::default() };
            tick(&mut world, &pause, 0.0);
            let before = positions(&world);
            let time = world.time;

            for (dir, dt) in steps {
                let input = TickInput {
                    move_dir: dir,
                    shoot_dir: dir,
                    ..Default::default()
                };
                tick(&mut world, &input, dt);
            }
            prop_assert_eq!(positions(&world), before);
            prop_assert_eq!(world.time, time);
        }
    }
}
