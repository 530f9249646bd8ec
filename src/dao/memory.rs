//! Volatile store, used when nothing should touch the disk.

use std::{
    collections::HashMap,
    io,
    sync::{Arc, Mutex},
};

use super::storage::{PersistentStore, StorageError, StorageResult};

#[derive(Debug, Default)]
struct Inner {
    values: HashMap<String, u32>,
    saves: Vec<(String, u32)>,
    fail_open: bool,
    fail_load: bool,
    fail_save: bool,
}

/// In-memory store; clones share the same contents so tests can inspect them.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `key = value`.
    pub fn with_value(key: &str, value: u32) -> Self {
        let store = Self::default();
        store.lock().values.insert(key.to_owned(), value);
        store
    }

    /// Make `open` fail.
    pub fn fail_open(&self, fail: bool) {
        self.lock().fail_open = fail;
    }

    /// Make `load` fail.
    pub fn fail_load(&self, fail: bool) {
        self.lock().fail_load = fail;
    }

    /// Make `save` fail.
    pub fn fail_save(&self, fail: bool) {
        self.lock().fail_save = fail;
    }

    /// Every successful save, oldest first.
    pub fn saves(&self) -> Vec<(String, u32)> {
        self.lock().saves.clone()
    }

    /// Current value under `key`.
    pub fn value(&self, key: &str) -> Option<u32> {
        self.lock().values.get(key).copied()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // Poisoned only by a panicking test; the data is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn injected(operation: &str) -> StorageError {
    StorageError::unavailable(
        format!("memory store {operation} disabled"),
        io::Error::other("injected failure"),
    )
}

impl PersistentStore for MemoryStore {
    fn open(&mut self) -> StorageResult<()> {
        if self.lock().fail_open {
            return Err(injected("open"));
        }
        Ok(())
    }

    fn load(&mut self, key: &str) -> StorageResult<Option<u32>> {
        let inner = self.lock();
        if inner.fail_load {
            return Err(injected("load"));
        }
        Ok(inner.values.get(key).copied())
    }

    fn save(&mut self, key: &str, value: u32) -> StorageResult<()> {
        let mut inner = self.lock();
        if inner.fail_save {
            return Err(injected("save"));
        }
        inner.values.insert(key.to_owned(), value);
        inner.saves.push((key.to_owned(), value));
        Ok(())
    }
}
