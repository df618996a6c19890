//! Durable State Store for the overlay snapshot
//!
//! A single record, keyed `overlayState`, shared by the control panel and the
//! overlay renderer. Writes always replace the whole record and the last
//! writer wins; there is no merging, locking across processes, or versioning.
//!
//! - [`MemoryStore`] - shared in-memory backend (tests, single-process runs)
//! - [`JsonFileStore`] - JSON file backend

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use pixel_overlay_ipc::OverlayState;

/// Errors that can occur while reading or writing the snapshot
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored snapshot is not valid JSON: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// Read/write access to the single persisted snapshot
pub trait StateStore {
    /// Read the stored snapshot, or None if nothing was ever written
    fn read(&self) -> Result<Option<OverlayState>, StoreError>;

    /// Replace the stored snapshot
    fn write(&self, state: &OverlayState) -> Result<(), StoreError>;
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn read(&self) -> Result<Option<OverlayState>, StoreError> {
        (**self).read()
    }

    fn write(&self, state: &OverlayState) -> Result<(), StoreError> {
        (**self).write(state)
    }
}

/// Create the default record on first install.
///
/// A record that no longer parses is replaced by the defaults as well.
/// Returns true if the default record was written.
pub fn ensure_initialized<S: StateStore + ?Sized>(store: &S) -> Result<bool, StoreError> {
    match store.read() {
        Ok(Some(_)) => return Ok(false),
        Ok(None) => {}
        Err(StoreError::Serialize(e)) => {
            tracing::warn!("Stored overlay state is corrupt, resetting to defaults: {}", e);
        }
        Err(e) => return Err(e),
    }
    store.write(&OverlayState::default())?;
    tracing::info!("Initialized overlay state with defaults");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_initialized_writes_once() {
        let store = MemoryStore::new();
        assert!(ensure_initialized(&store).unwrap());
        assert_eq!(store.read().unwrap(), Some(OverlayState::default()));

        let mut state = OverlayState::default();
        state.opacity = 0.9;
        store.write(&state).unwrap();

        assert!(!ensure_initialized(&store).unwrap());
        assert_eq!(store.read().unwrap().unwrap().opacity, 0.9);
    }

    #[test]
    fn test_ensure_initialized_resets_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(store.read().is_err());

        assert!(ensure_initialized(&store).unwrap());
        assert_eq!(store.read().unwrap(), Some(OverlayState::default()));
    }
}
