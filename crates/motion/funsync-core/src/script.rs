//! Funscript JSON loading.
//!
//! Parses the common `.funscript` shape `{ "actions": [{ "at": ms, "pos":
//! 0..100 }], ... }` into a frozen [`KeyframeCollection`]. Timestamps become
//! seconds, positions are normalized to [0, 1]. Unknown fields are ignored.

use serde::Deserialize;

use crate::error::ScriptError;
use crate::keyframes::{Keyframe, KeyframeCollection, KeyframeCollectionBuilder};

#[derive(Debug, Deserialize)]
struct RawAction {
    at: f64,
    pos: f64,
}

#[derive(Debug, Deserialize)]
struct RawScript {
    #[serde(default)]
    actions: Vec<RawAction>,
    #[serde(default)]
    inverted: bool,
    /// Present on raw (unsmoothed) recordings; forces linear interpolation.
    #[serde(default, rename = "rawActions")]
    raw_actions: Option<Vec<RawAction>>,
}

/// Parse funscript JSON into a keyframe collection.
///
/// When `rawActions` is present and denser than `actions` it wins, and the
/// collection is flagged raw. An `inverted` script has its values mirrored
/// at load time so downstream consumers never see inverted coordinates.
pub fn parse_funscript_json(s: &str) -> Result<KeyframeCollection, ScriptError> {
    let raw: RawScript = serde_json::from_str(s)?;

    let (actions, is_raw) = match &raw.raw_actions {
        Some(raw_actions) if raw_actions.len() > raw.actions.len() => (raw_actions, true),
        _ => (&raw.actions, false),
    };
    if actions.is_empty() {
        return Err(ScriptError::Empty);
    }

    let mut builder = KeyframeCollectionBuilder::new().raw(is_raw);
    for action in actions {
        let mut value = (action.pos / 100.0).clamp(0.0, 1.0);
        if raw.inverted {
            value = 1.0 - value;
        }
        builder.add(Keyframe::new(action.at / 1000.0, value));
    }
    Ok(builder.build())
}
