//! funsync-core: funscript playback and axis-synchronization engine
//! (application-agnostic).
//!
//! The crate converts "current media position" plus per-axis settings into an
//! output value in [0, 1] for every device axis, every tick: sorted keyframe
//! storage with a monotone cursor, four interpolation schemes with boundary
//! extrapolation, deterministic noise dithering, smooth re-synchronization
//! after seeks/resumes, cross-axis smart limiting, inter-axis script linking
//! and idle auto-homing.
//!
//! Collaborators (media-player adapters, output targets, the settings UI)
//! talk to [`MotionEngine`] / [`ValueReader`]; everything else is internal.

pub mod axis;
pub mod config;
pub mod engine;
pub mod error;
pub mod interp;
pub mod keyframes;
pub mod noise;
pub mod script;
pub mod settings;
pub mod state;
pub mod sync;

// Re-exports for consumers (adapters)
pub use axis::DeviceAxis;
pub use config::EngineConfig;
pub use engine::{MotionEngine, ValueReader};
pub use error::{ScriptError, SettingsError};
pub use interp::InterpolationKind;
pub use keyframes::{Keyframe, KeyframeCollection, KeyframeCollectionBuilder};
pub use noise::NoiseGenerator;
pub use script::parse_funscript_json;
pub use settings::{AxisSettings, SettingsBundle, SyncSettings};
pub use sync::SyncController;
