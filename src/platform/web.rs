//! Browser binding
//!
//! `WebGame` is what the JS presentation layer talks to: it forwards DOM
//! input, runs the frame loop on `requestAnimationFrame`, and hands each
//! frame's snapshot to a JS callback as JSON.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use super::FrameDriver;
use crate::input::{Command, InputState};
use crate::persistence::LocalStore;
use crate::settings::{QualityPreset, Settings};
use crate::sim::{GamePhase, Snapshot};
use crate::tuning::Tuning;

type FrameCallback = Closure<dyn FnMut(f64)>;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Frost Arena (wasm) starting...");
}

struct Game {
    driver: FrameDriver<LocalStore>,
    input: InputState,
}

impl Game {
    fn frame(&mut self, now_ms: f64) -> Result<String, JsValue> {
        let input = self.input.take_tick_input();
        let snapshot = self.driver.frame(now_ms, &input);
        encode(&snapshot)
    }
}

fn encode(snapshot: &Snapshot) -> Result<String, JsValue> {
    snapshot
        .to_json()
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

fn request_frame(callback: &FrameCallback) -> Option<i32> {
    let window = web_sys::window()?;
    window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .ok()
}

#[wasm_bindgen]
pub struct WebGame {
    game: Rc<RefCell<Game>>,
    /// Self-rescheduling frame closure, created on first start
    frame: Rc<RefCell<Option<FrameCallback>>>,
    on_frame: Rc<RefCell<Option<js_sys::Function>>>,
    /// Pending animation frame request while the loop runs
    handle: Rc<Cell<Option<i32>>>,
}

#[wasm_bindgen]
impl WebGame {
    /// Create a game. `seed` defaults to the current time; `tuning_json`
    /// overrides balance values.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>, tuning_json: Option<String>) -> WebGame {
        let seed = seed.unwrap_or_else(js_sys::Date::now) as u64;
        let tuning = tuning_json
            .as_deref()
            .map(Tuning::from_json_or_default)
            .unwrap_or_default();

        let driver = FrameDriver::new(LocalStore::open(), seed, tuning);
        let input = InputState::new(driver.settings().arrow_shoot_mode);
        WebGame {
            game: Rc::new(RefCell::new(Game { driver, input })),
            frame: Rc::new(RefCell::new(None)),
            on_frame: Rc::new(RefCell::new(None)),
            handle: Rc::new(Cell::new(None)),
        }
    }

    /// Returns true if the key is bound (caller should preventDefault)
    pub fn key_down(&self, key: &str) -> bool {
        self.game.borrow_mut().input.key_down(key)
    }

    pub fn key_up(&self, key: &str) {
        self.game.borrow_mut().input.key_up(key);
    }

    /// Pointer coordinates are in arena units
    pub fn pointer_move(&self, x: f32, y: f32) {
        self.game.borrow_mut().input.pointer_moved(Vec2::new(x, y));
    }

    pub fn pointer_down(&self, x: f32, y: f32) {
        let mut g = self.game.borrow_mut();
        // Pointer shooting only counts during play
        if g.driver.world().phase() == GamePhase::Playing {
            g.input.pointer_pressed(Vec2::new(x, y));
        }
    }

    pub fn pointer_up(&self) {
        self.game.borrow_mut().input.pointer_released();
    }

    /// Window lost focus or tab hidden: drop held keys and auto-pause
    pub fn blur(&self) {
        let mut g = self.game.borrow_mut();
        g.input.release_all();
        if g.driver.world().phase() == GamePhase::Playing {
            g.input.push_command(Command::Pause);
            log::info!("Auto-paused (focus lost)");
        }
    }

    pub fn start(&self) {
        self.game.borrow_mut().input.push_command(Command::Start);
    }

    pub fn toggle_pause(&self) {
        self.game.borrow_mut().input.push_command(Command::TogglePause);
    }

    pub fn restart(&self) {
        self.game.borrow_mut().input.push_command(Command::Restart);
    }

    pub fn menu(&self) {
        self.game.borrow_mut().input.push_command(Command::Menu);
    }

    pub fn set_quality(&self, preset: &str) {
        let Some(quality) = QualityPreset::parse(preset) else {
            log::warn!("Unknown quality preset {preset:?}");
            return;
        };
        self.update_settings(|s| s.quality = quality);
    }

    pub fn set_screen_shake(&self, enabled: bool) {
        self.update_settings(|s| s.screen_shake = enabled);
    }

    pub fn set_reduced_motion(&self, enabled: bool) {
        self.update_settings(|s| s.reduced_motion = enabled);
    }

    pub fn set_arrow_shoot_mode(&self, enabled: bool) {
        let mut g = self.game.borrow_mut();
        g.input.release_all();
        g.input.arrow_shoot_mode = enabled;
        drop(g);
        self.update_settings(|s| s.arrow_shoot_mode = enabled);
    }

    pub fn high_score(&self) -> f64 {
        self.game.borrow().driver.records().high_score as f64
    }

    pub fn best_wave(&self) -> u32 {
        self.game.borrow().driver.records().best_wave
    }

    /// Current state without advancing
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        encode(&Snapshot::capture(self.game.borrow().driver.world()))
    }

    /// Advance one frame by hand (for hosts that run their own loop)
    pub fn frame(&self, now_ms: f64) -> Result<String, JsValue> {
        self.game.borrow_mut().frame(now_ms)
    }

    /// Start the animation frame loop. `on_frame` receives each frame's
    /// snapshot as a JSON string.
    pub fn start_loop(&self, on_frame: js_sys::Function) -> Result<(), JsValue> {
        *self.on_frame.borrow_mut() = Some(on_frame);
        if self.handle.get().is_some() {
            return Ok(());
        }
        self.game.borrow_mut().driver.resync_clock();

        if self.frame.borrow().is_none() {
            let game = self.game.clone();
            let frame = self.frame.clone();
            let on_frame = self.on_frame.clone();
            let handle = self.handle.clone();

            let callback: FrameCallback = Closure::new(move |now: f64| {
                // Stopped while this frame was queued
                if handle.get().is_none() {
                    return;
                }

                let json = game.borrow_mut().frame(now);
                match json {
                    Ok(json) => {
                        let callback = on_frame.borrow().clone();
                        if let Some(callback) = callback {
                            let arg = JsValue::from_str(&json);
                            if let Err(err) = callback.call1(&JsValue::NULL, &arg) {
                                log::warn!("Frame callback threw: {err:?}");
                            }
                        }
                    }
                    Err(err) => log::warn!("Snapshot encoding failed: {err:?}"),
                }

                // The callback may have stopped the loop
                if handle.get().is_some() {
                    let next = frame.borrow().as_ref().and_then(request_frame);
                    handle.set(next);
                }
            });
            *self.frame.borrow_mut() = Some(callback);
        }

        let id = self
            .frame
            .borrow()
            .as_ref()
            .and_then(request_frame)
            .ok_or_else(|| JsValue::from_str("requestAnimationFrame unavailable"))?;
        self.handle.set(Some(id));
        log::info!("Frame loop started");
        Ok(())
    }

    /// Cancel the pending frame. The loop can be started again later.
    pub fn stop_loop(&self) {
        if let Some(id) = self.handle.take() {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(id);
            }
            log::info!("Frame loop stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.get().is_some()
    }
}

impl WebGame {
    fn update_settings(&self, change: impl FnOnce(&mut Settings)) {
        let mut g = self.game.borrow_mut();
        let mut settings = g.driver.settings().clone();
        change(&mut settings);
        g.driver.apply_settings(settings);
    }
}

impl Drop for WebGame {
    fn drop(&mut self) {
        self.stop_loop();
        // The closure holds an Rc to its own cell; break the cycle
        self.frame.borrow_mut().take();
    }
}
