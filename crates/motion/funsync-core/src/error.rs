//! Error types for settings application and script parsing.

use thiserror::Error;

use crate::axis::DeviceAxis;

/// Errors surfaced when applying or persisting settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("axis {0} links to itself")]
    SelfLink(DeviceAxis),
    #[error("axis link cycle detected starting at {0}")]
    LinkCycle(DeviceAxis),
    #[error("settings json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors surfaced while parsing a funscript.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("script json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("script contains no actions")]
    Empty,
}
