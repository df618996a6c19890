//! JSON file store.

use std::path::{Path, PathBuf};

use pixel_overlay_config::OVERLAY_STATE_KEY;
use pixel_overlay_ipc::OverlayState;

use crate::{StateStore, StoreError};

type Document = serde_json::Map<String, serde_json::Value>;

/// Snapshot store backed by a JSON object file: `{ "overlayState": {...} }`.
///
/// Writes go to a sibling temporary file that is renamed over the target, so
/// a reader never observes a half-written record.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Option<Document>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }
}

impl StateStore for JsonFileStore {
    fn read(&self) -> Result<Option<OverlayState>, StoreError> {
        let Some(mut document) = self.read_document()? else {
            return Ok(None);
        };
        match document.remove(OVERLAY_STATE_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn write(&self, state: &OverlayState) -> Result<(), StoreError> {
        // Keep unrelated keys another writer may have stored alongside ours
        let mut document = match self.read_document() {
            Ok(document) => document.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Replacing unreadable store file {:?}: {}", self.path, e);
                Document::new()
            }
        };
        document.insert(OVERLAY_STATE_KEY.to_string(), serde_json::to_value(state)?);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&document)?)?;
        std::fs::rename(&tmp, &self.path)?;
        tracing::trace!("Wrote overlay state to {:?}", self.path);
        Ok(())
    }
}
