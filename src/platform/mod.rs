//! Platform layer
//!
//! [`FrameDriver`] owns the world and does the per-frame chores a host needs:
//! - Turning frame timestamps into deltas
//! - Running one tick
//! - Persisting records when a run ends
//! - Producing the snapshot for presentation
//!
//! The browser binding in `web` wraps it with input handlers and a
//! `requestAnimationFrame` loop.

#[cfg(target_arch = "wasm32")]
pub mod web;

use crate::highscores::{GAME_KEY, Records};
use crate::persistence::KeyValueStore;
use crate::settings::Settings;
use crate::sim::{Clock, GameEvent, SimulationWorld, Snapshot, TickInput, tick};
use crate::tuning::Tuning;

/// Host-agnostic frame loop body
pub struct FrameDriver<S: KeyValueStore> {
    world: SimulationWorld,
    clock: Clock,
    store: S,
    records: Records,
    settings: Settings,
}

impl<S: KeyValueStore> FrameDriver<S> {
    /// Load records and settings from `store` and build a world in the menu
    pub fn new(store: S, seed: u64, tuning: Tuning) -> Self {
        let records = Records::load(&store, GAME_KEY);
        let settings = Settings::load(&store);

        let mut world = SimulationWorld::new(seed, tuning);
        world.session.high_score = records.high_score;
        world.session.best_wave = records.best_wave;
        world.particle_cap = settings.max_particles();
        log::info!("Frame driver ready (seed {seed})");

        Self {
            world,
            clock: Clock::new(),
            store,
            records,
            settings,
        }
    }

    /// Run one frame stamped `now_ms` (host clock, milliseconds)
    pub fn frame(&mut self, now_ms: f64, input: &TickInput) -> Snapshot {
        let dt = self.clock.advance(now_ms);
        self.step(dt, input)
    }

    /// Run one frame with an explicit delta in seconds
    pub fn step(&mut self, dt: f32, input: &TickInput) -> Snapshot {
        tick(&mut self.world, input, dt);
        self.persist_records();

        let mut snapshot = Snapshot::capture(&self.world);
        snapshot.shake *= self.settings.shake_scale();
        snapshot
    }

    /// Forget the last timestamp so the next frame after a loop restart
    /// doesn't see the whole gap
    pub fn resync_clock(&mut self) {
        self.clock.reset();
    }

    pub fn world(&self) -> &SimulationWorld {
        &self.world
    }

    pub fn records(&self) -> Records {
        self.records
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace and persist settings
    pub fn apply_settings(&mut self, settings: Settings) {
        self.world.particle_cap = settings.max_particles();
        if let Err(err) = settings.save(&mut self.store) {
            log::warn!("Could not save settings: {err}");
        }
        self.settings = settings;
    }

    /// Write records once per finished run, and only when one improved
    fn persist_records(&mut self) {
        let finished = self.world.events.iter().find_map(|event| match event {
            GameEvent::GameOver {
                score,
                wave,
                new_high_score,
                new_best_wave,
            } => Some((*score, *wave, *new_high_score || *new_best_wave)),
            _ => None,
        });

        let Some((score, wave, improved)) = finished else {
            return;
        };
        if !improved {
            return;
        }
        self.records.submit(score, wave);
        match self.records.save(&mut self.store, GAME_KEY) {
            Ok(()) => log::info!(
                "Saved records: high score {}, best wave {}",
                self.records.high_score,
                self.records.best_wave
            ),
            Err(err) => log::warn!("Could not save records: {err}"),
        }
    }
}
