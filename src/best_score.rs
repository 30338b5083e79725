//! Best score
//!
//! A single integer persisted under `doodle-hop-best`. Anything unreadable
//! counts as zero.

use crate::persistence::{Storage, StorageError, load_json, save_json};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestScore(pub u64);

impl BestScore {
    pub const STORAGE_KEY: &'static str = "doodle-hop-best";

    pub fn value(&self) -> u64 {
        self.0
    }

    /// Load from storage; missing or malformed values yield zero
    pub fn load_from(storage: &dyn Storage) -> Self {
        let best = load_json::<u64>(storage, Self::STORAGE_KEY).unwrap_or(0);
        log::info!("Best score: {}", best);
        Self(best)
    }

    pub fn save_to(&self, storage: &mut dyn Storage) -> Result<(), StorageError> {
        save_json(storage, Self::STORAGE_KEY, &self.0)?;
        log::info!("Best score saved ({})", self.0);
        Ok(())
    }

    /// Take a finished run's score. Returns true when it beats the record.
    pub fn record(&mut self, score: u64) -> bool {
        if score > self.0 {
            self.0 = score;
            true
        } else {
            false
        }
    }
}
