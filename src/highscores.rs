//! Persistent records: best score and best wave
//!
//! Stored as two decimal strings so the values stay readable in the
//! browser's storage inspector.

use crate::persistence::{KeyValueStore, StorageError};

/// Prefix for record keys
pub const GAME_KEY: &str = "frost_arena";

/// Best results across sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Records {
    pub high_score: u64,
    pub best_wave: u32,
}

impl Records {
    pub fn high_score_key(game: &str) -> String {
        format!("{game}_highScore")
    }

    pub fn best_wave_key(game: &str) -> String {
        format!("{game}_bestWave")
    }

    /// Read records. Missing or malformed values count as zero.
    pub fn load(store: &impl KeyValueStore, game: &str) -> Self {
        let records = Self {
            high_score: read_number(store, &Self::high_score_key(game)),
            best_wave: read_number(store, &Self::best_wave_key(game)),
        };
        log::info!(
            "Loaded records: high score {}, best wave {}",
            records.high_score,
            records.best_wave
        );
        records
    }

    /// Write both records
    pub fn save(&self, store: &mut impl KeyValueStore, game: &str) -> Result<(), StorageError> {
        store.set(&Self::high_score_key(game), &self.high_score.to_string())?;
        store.set(&Self::best_wave_key(game), &self.best_wave.to_string())?;
        Ok(())
    }

    /// Fold in a finished run. Returns true if either record improved.
    pub fn submit(&mut self, score: u64, wave: u32) -> bool {
        let mut improved = false;
        if score > self.high_score {
            self.high_score = score;
            improved = true;
        }
        if wave > self.best_wave {
            self.best_wave = wave;
            improved = true;
        }
        improved
    }
}

fn read_number<T>(store: &impl KeyValueStore, key: &str) -> T
where
    T: std::str::FromStr + Default,
{
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    raw.trim().parse().unwrap_or_else(|_| {
        log::warn!("Ignoring malformed value for {key}: {raw:?}");
        T::default()
    })
}
