//! Frost Arena entry point
//!
//! The browser build is driven from JS through `WebGame`. Natively this runs
//! a headless autopilot session and logs how it went.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use frost_arena::Tuning;
    use frost_arena::input::autopilot;
    use frost_arena::persistence::MemoryStore;
    use frost_arena::platform::FrameDriver;
    use frost_arena::sim::GamePhase;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42u64);
    let frames = args.next().and_then(|s| s.parse().ok()).unwrap_or(60 * 120u32);
    let tuning = match std::env::var("FROST_ARENA_TUNING") {
        Ok(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json_or_default(&json),
            Err(err) => {
                log::warn!("Could not read {path}: {err}, using default tuning");
                Tuning::default()
            }
        },
        Err(_) => Tuning::default(),
    };

    log::info!("Frost Arena (native) autopilot: seed {seed}, {frames} frames");
    let mut driver = FrameDriver::new(MemoryStore::new(), seed, tuning);
    let frame_ms = 1000.0 / 60.0;

    for frame in 0..frames {
        let input = autopilot(driver.world());
        let snapshot = driver.frame(f64::from(frame) * frame_ms, &input);
        if snapshot.phase == GamePhase::GameOver {
            log::info!("Run ended after {:.1}s", f64::from(frame) / 60.0);
            break;
        }
    }

    let world = driver.world();
    let records = driver.records();
    log::info!(
        "Final: phase {:?}, score {}, wave {}, high score {}, best wave {}",
        world.phase(),
        world.session.score,
        world.wave.wave,
        records.high_score,
        records.best_wave
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is `wasm_start` in the library, this is just to satisfy the compiler
}
