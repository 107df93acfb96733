use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::surface::{Surface, SurfaceError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
}

/// String key-value store the board persists into.
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("snapshot export failed: {0}")]
    Export(#[from] SurfaceError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Full-frame snapshot saving and the startup restore.
#[derive(Clone, Debug)]
pub struct PersistenceCycle {
    key: String,
    interval: Duration,
}

impl PersistenceCycle {
    pub fn new(config: &Config) -> Self {
        Self {
            key: config.keys.snapshot.clone(),
            interval: Duration::from_millis(config.save_interval_ms as u64),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Draws the stored snapshot, if any. Returns whether one was applied.
    ///
    /// A snapshot that cannot be read or decoded counts as no snapshot.
    pub fn restore<S: Surface>(&self, surface: &mut S, store: &impl Store) -> bool {
        let snapshot = match store.get(&self.key) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!(key = %self.key, "no snapshot to restore");
                return false;
            }
            Err(err) => {
                warn!(%err, "reading snapshot failed");
                return false;
            }
        };
        match surface.import_snapshot(&snapshot) {
            Ok(()) => {
                info!(bytes = snapshot.len(), "restored snapshot");
                true
            }
            Err(err) => {
                warn!(%err, "ignoring stored snapshot");
                false
            }
        }
    }

    /// One save tick: export the whole surface and overwrite the stored value.
    ///
    /// Skipped while a restore is still decoding, so the pending snapshot is
    /// not replaced by the blank surface underneath it.
    pub fn tick<S: Surface>(&self, surface: &S, store: &mut impl Store) -> Result<(), SaveError> {
        if surface.is_importing() {
            debug!("snapshot still importing, skipping save");
            return Ok(());
        }
        let snapshot = surface.export_snapshot()?;
        store.set(&self.key, &snapshot)?;
        debug!(bytes = snapshot.len(), "saved snapshot");
        Ok(())
    }
}
