//! Runtime settings read from the environment

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default delay before an undeliverable command is retried
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Default location of the JSON store file
pub const DEFAULT_STORE_FILE: &str = "overlay_state.json";

/// When a drag persists the overlay position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DragPersistPolicy {
    /// Write the snapshot on every pointer move
    EveryMove,
    /// Keep the live position in memory and write once on pointer up
    #[default]
    DragEnd,
}

impl DragPersistPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "every-move" | "move" => Some(Self::EveryMove),
            "drag-end" | "end" => Some(Self::DragEnd),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the JSON store file
    pub store_path: PathBuf,
    pub drag_persist: DragPersistPolicy,
    /// Delay before the single retry of an undeliverable command
    pub retry_delay: Duration,
    /// Whether the image body (not just the handle) starts a drag
    pub image_drag: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_FILE),
            drag_persist: DragPersistPolicy::default(),
            retry_delay: DEFAULT_RETRY_DELAY,
            image_drag: true,
        }
    }
}

impl AppConfig {
    /// Build the configuration from PIXEL_OVERLAY_* environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; unparseable values fall
    /// back to the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let store_path = lookup("PIXEL_OVERLAY_STORE")
            .map(PathBuf::from)
            .unwrap_or(defaults.store_path);

        let drag_persist = match lookup("PIXEL_OVERLAY_DRAG_PERSIST") {
            Some(value) => DragPersistPolicy::parse(&value).unwrap_or_else(|| {
                tracing::warn!("Unknown drag persist policy {:?}, using default", value);
                defaults.drag_persist
            }),
            None => defaults.drag_persist,
        };

        let retry_delay = match lookup("PIXEL_OVERLAY_RETRY_MS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(ms) => Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!("Invalid PIXEL_OVERLAY_RETRY_MS {:?}, using default", value);
                    defaults.retry_delay
                }
            },
            None => defaults.retry_delay,
        };

        let image_drag = match lookup("PIXEL_OVERLAY_IMAGE_DRAG").as_deref().map(str::trim) {
            Some("0") | Some("false") | Some("off") => false,
            Some(_) | None => defaults.image_drag,
        };

        Self {
            store_path,
            drag_persist,
            retry_delay,
            image_drag,
        }
    }
}
