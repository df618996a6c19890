//! Shared in-memory store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use pixel_overlay_config::OVERLAY_STATE_KEY;
use pixel_overlay_ipc::OverlayState;

use crate::{StateStore, StoreError};

#[derive(Default)]
struct Shared {
    /// Records keyed by storage key, kept as JSON like a browser storage area
    records: RwLock<HashMap<String, serde_json::Value>>,
    writes: AtomicUsize,
}

/// In-memory snapshot store.
///
/// Cloning yields another handle onto the same storage, so a panel and a
/// renderer in one process observe each other's writes.
#[derive(Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_record = self
            .shared
            .records
            .read()
            .map(|r| r.contains_key(OVERLAY_STATE_KEY))
            .unwrap_or(false);
        f.debug_struct("MemoryStore")
            .field("has_record", &has_record)
            .field("write_count", &self.write_count())
            .finish()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding `state`
    pub fn with_state(state: &OverlayState) -> Result<Self, StoreError> {
        let store = Self::new();
        store.write(state)?;
        store.shared.writes.store(0, Ordering::SeqCst);
        Ok(store)
    }

    /// Number of writes since creation
    pub fn write_count(&self) -> usize {
        self.shared.writes.load(Ordering::SeqCst)
    }
}

impl StateStore for MemoryStore {
    fn read(&self) -> Result<Option<OverlayState>, StoreError> {
        let records = self.shared.records.read().map_err(|_| StoreError::Poisoned)?;
        match records.get(OVERLAY_STATE_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
            None => Ok(None),
        }
    }

    fn write(&self, state: &OverlayState) -> Result<(), StoreError> {
        let value = serde_json::to_value(state)?;
        {
            let mut records = self
                .shared
                .records
                .write()
                .map_err(|_| StoreError::Poisoned)?;
            records.insert(OVERLAY_STATE_KEY.to_string(), value);
        }
        self.shared.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_overlay_ipc::Position;

    #[test]
    fn test_empty_store_reads_none() {
        assert_eq!(MemoryStore::new().read().unwrap(), None);
    }

    #[test]
    fn test_clones_share_storage_last_writer_wins() {
        let panel = MemoryStore::new();
        let renderer = panel.clone();

        let mut a = OverlayState::default();
        a.opacity = 0.2;
        panel.write(&a).unwrap();

        let mut b = OverlayState::default();
        b.position = Position::new(3, 4);
        renderer.write(&b).unwrap();

        let stored = panel.read().unwrap().unwrap();
        assert_eq!(stored, b);
        assert_eq!(panel.write_count(), 2);
    }

    #[test]
    fn test_record_stored_as_camel_case_json() {
        let store = MemoryStore::new();
        store.write(&OverlayState::default()).unwrap();
        let records = store.shared.records.read().unwrap();
        let raw = &records[OVERLAY_STATE_KEY];
        assert_eq!(raw["hasImage"], false);
        assert_eq!(raw["pixelSize"], 16);
    }

    #[test]
    fn test_with_state_starts_count_at_zero() {
        let store = MemoryStore::with_state(&OverlayState::default()).unwrap();
        assert_eq!(store.write_count(), 0);
        assert!(store.read().unwrap().is_some());
    }
}
