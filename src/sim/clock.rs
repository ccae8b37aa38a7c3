//! Frame clock
//!
//! Turns host frame timestamps into bounded, time-scaled simulation deltas.

/// Delta for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameDelta {
    /// Clamped wall-clock seconds (drives dilation recovery)
    pub raw: f32,
    /// `raw` multiplied by the current time scale (drives gameplay)
    pub scaled: f32,
}

/// Clamp a raw delta to `[0, max_dt]` and apply the time scale.
///
/// The clamp keeps a stalled tab or long pause from producing one huge step.
pub fn step(raw_dt: f32, max_dt: f32, time_scale: f32) -> FrameDelta {
    let raw = if raw_dt.is_finite() {
        raw_dt.clamp(0.0, max_dt)
    } else {
        0.0
    };
    FrameDelta {
        raw,
        scaled: raw * time_scale,
    }
}

/// Tracks the previous frame timestamp (milliseconds, as the host reports it)
#[derive(Debug, Clone, Default)]
pub struct Clock {
    last_ms: Option<f64>,
}

impl Clock {
    pub fn new() -> Self {
        Self { last_ms: None }
    }

    /// Seconds since the previous frame. The first frame and any backwards
    /// jump yield zero.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let elapsed = match self.last_ms {
            Some(last) if now_ms > last => ((now_ms - last) / 1000.0) as f32,
            _ => 0.0,
        };
        self.last_ms = Some(now_ms);
        elapsed
    }

    /// Forget the last timestamp (loop restarted after a stop)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
