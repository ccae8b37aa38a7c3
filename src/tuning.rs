//! Data-driven game balance
//!
//! Every gameplay number that designers are expected to tweak lives here.
//! Values can be overridden from JSON; missing fields keep their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::EnemyKind;

/// Errors produced while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning json is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning value `{field}` is invalid: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Per-kind enemy stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub radius: f32,
    pub speed: f32,
    pub health: i32,
    pub damage: i32,
    pub score: u64,
}

/// Stat table indexed by [`EnemyKind`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyTable {
    pub weak: EnemyStats,
    pub fast: EnemyStats,
    pub heavy: EnemyStats,
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self {
            weak: EnemyStats {
                radius: 14.0,
                speed: 110.0,
                health: 1,
                damage: 10,
                score: 10,
            },
            fast: EnemyStats {
                radius: 12.0,
                speed: 190.0,
                health: 1,
                damage: 12,
                score: 15,
            },
            heavy: EnemyStats {
                radius: 22.0,
                speed: 70.0,
                health: 5,
                damage: 20,
                score: 40,
            },
        }
    }
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Player ===
    pub player_speed: f32,
    /// Smoothing rate while a direction is held
    pub player_accel: f32,
    /// Smoothing rate while no direction is held
    pub player_decel: f32,
    pub invulnerability_secs: f32,

    // === Shooting ===
    pub fire_cooldown_secs: f32,
    pub projectile_speed: f32,
    pub projectile_lifetime_secs: f32,

    // === Waves ===
    pub breather_secs: f32,
    pub wave_clear_bonus: u64,
    pub base_spawn_interval: f32,
    pub spawn_interval_step: f32,
    pub min_spawn_interval: f32,
    pub speed_ramp_per_wave: f32,
    pub max_speed_multiplier: f32,
    /// How long a fast enemy sticks to its chosen axis
    pub fast_commit_secs: f32,

    // === Near miss / dilation ===
    pub near_miss_cooldown_secs: f32,
    pub near_miss_score: u64,
    pub near_miss_time_scale: f32,
    /// Real seconds the slow-motion holds before recovering
    pub dilation_hold_secs: f32,
    /// Time scale regained per real second
    pub dilation_recovery_rate: f32,

    // === Feedback ===
    pub hit_shake: f32,
    pub game_over_shake: f32,
    pub shake_decay: f32,

    pub enemies: EnemyTable,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player_speed: 320.0,
            player_accel: 2400.0,
            player_decel: 2800.0,
            invulnerability_secs: 0.6,

            fire_cooldown_secs: 1.0 / 6.0,
            projectile_speed: 520.0,
            projectile_lifetime_secs: 1.25,

            breather_secs: 2.0,
            wave_clear_bonus: 50,
            base_spawn_interval: 0.55,
            spawn_interval_step: 0.03,
            min_spawn_interval: 0.20,
            speed_ramp_per_wave: 0.03,
            max_speed_multiplier: 1.45,
            fast_commit_secs: 1.0,

            near_miss_cooldown_secs: 1.2,
            near_miss_score: 5,
            near_miss_time_scale: 0.55,
            dilation_hold_secs: 0.12,
            dilation_recovery_rate: 5.0,

            hit_shake: 8.0,
            game_over_shake: 18.0,
            shake_decay: 0.9,

            enemies: EnemyTable::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate tuning overrides
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse overrides, falling back to defaults on any problem
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning overrides: {}", e);
                Self::default()
            }
        }
    }

    /// Reject values that would break simulation invariants
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("player_speed", self.player_speed),
            ("player_accel", self.player_accel),
            ("player_decel", self.player_decel),
            ("fire_cooldown_secs", self.fire_cooldown_secs),
            ("projectile_speed", self.projectile_speed),
            ("projectile_lifetime_secs", self.projectile_lifetime_secs),
            ("min_spawn_interval", self.min_spawn_interval),
            ("max_speed_multiplier", self.max_speed_multiplier),
            ("dilation_recovery_rate", self.dilation_recovery_rate),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be greater than zero",
                });
            }
        }

        let durations = [
            ("invulnerability_secs", self.invulnerability_secs),
            ("breather_secs", self.breather_secs),
            ("fast_commit_secs", self.fast_commit_secs),
            ("near_miss_cooldown_secs", self.near_miss_cooldown_secs),
            ("dilation_hold_secs", self.dilation_hold_secs),
        ];
        for (field, value) in durations {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be a finite, non-negative duration",
                });
            }
        }

        if !(self.near_miss_time_scale > 0.0 && self.near_miss_time_scale <= 1.0) {
            return Err(TuningError::Invalid {
                field: "near_miss_time_scale",
                reason: "must be in (0, 1]",
            });
        }
        if !(0.0..1.0).contains(&self.shake_decay) {
            return Err(TuningError::Invalid {
                field: "shake_decay",
                reason: "must be in [0, 1)",
            });
        }
        if self.base_spawn_interval < self.min_spawn_interval {
            return Err(TuningError::Invalid {
                field: "base_spawn_interval",
                reason: "must not be below min_spawn_interval",
            });
        }

        for kind in EnemyKind::ALL {
            let stats = self.enemy(kind);
            if stats.health <= 0 || stats.radius <= 0.0 || stats.speed <= 0.0 {
                return Err(TuningError::Invalid {
                    field: "enemies",
                    reason: "radius, speed and health must be positive",
                });
            }
            if stats.damage < 0 {
                return Err(TuningError::Invalid {
                    field: "enemies",
                    reason: "damage must not be negative",
                });
            }
        }
        Ok(())
    }

    /// Stat lookup for an enemy kind
    pub fn enemy(&self, kind: EnemyKind) -> &EnemyStats {
        match kind {
            EnemyKind::Weak => &self.enemies.weak,
            EnemyKind::Fast => &self.enemies.fast,
            EnemyKind::Heavy => &self.enemies.heavy,
        }
    }

    /// Spawn cadence for a wave (1-based)
    pub fn spawn_interval(&self, wave: u32) -> f32 {
        let steps = wave.saturating_sub(1) as f32;
        (self.base_spawn_interval - steps * self.spawn_interval_step).max(self.min_spawn_interval)
    }

    /// Enemy speed multiplier for a wave (1-based)
    pub fn speed_multiplier(&self, wave: u32) -> f32 {
        let steps = wave.saturating_sub(1) as f32;
        (1.0 + steps * self.speed_ramp_per_wave).min(self.max_speed_multiplier)
    }
}
