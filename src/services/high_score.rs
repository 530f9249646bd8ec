use tracing::{info, warn};

use crate::dao::storage::{HIGH_SCORE_KEY, PersistentStore, StorageError};

/// Keeps the best score in memory and mirrors it to the store.
///
/// Storage problems never stop the game: a failed open or load starts from 0,
/// a failed save keeps the in-memory value, and both flag the keeper as
/// degraded.
pub struct HighScoreKeeper {
    store: Box<dyn PersistentStore>,
    value: u32,
    degraded: bool,
}

impl HighScoreKeeper {
    /// Wrap a store; nothing is read until [`load`](Self::load).
    pub fn new(store: Box<dyn PersistentStore>) -> Self {
        Self {
            store,
            value: 0,
            degraded: false,
        }
    }

    /// Open the store and read the record, falling back to 0.
    pub fn load(&mut self) -> u32 {
        let loaded = self
            .store
            .open()
            .and_then(|()| self.store.load(HIGH_SCORE_KEY));

        self.value = match loaded {
            Ok(Some(value)) => {
                info!(high_score = value, "high score loaded");
                value
            }
            Ok(None) => {
                info!("no stored high score; starting from 0");
                0
            }
            Err(err) => {
                self.mark_degraded(&err, "failed to load high score; starting from 0");
                0
            }
        };
        self.value
    }

    /// Current record.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Whether a storage operation failed since startup.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Keep `candidate` if it beats the record; returns whether it did.
    pub fn record(&mut self, candidate: u32) -> bool {
        if candidate <= self.value {
            return false;
        }

        info!(previous = self.value, high_score = candidate, "new high score");
        self.value = candidate;
        self.persist();
        true
    }

    /// Raise the record to `max` after a total victory. A higher record is kept.
    pub fn force_max(&mut self, max: u32) {
        if self.value >= max {
            return;
        }
        info!(high_score = max, "maximum sequence reached; high score set to max");
        self.value = max;
        self.persist();
    }

    /// Clear the record. Safe to call repeatedly.
    pub fn reset(&mut self) -> u32 {
        info!(previous = self.value, "high score reset");
        self.value = 0;
        self.persist();
        self.value
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(HIGH_SCORE_KEY, self.value) {
            self.mark_degraded(&err, "failed to save high score; keeping it in memory");
        }
    }

    fn mark_degraded(&mut self, err: &StorageError, message: &'static str) {
        if !self.degraded {
            warn!(error = %err, "score storage entering degraded mode");
        }
        self.degraded = true;
        warn!(error = %err, "{message}");
    }
}
