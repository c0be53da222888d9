//! Engine configuration.

use std::time::Duration;

use crate::axis::DeviceAxis;

/// Scheduling knobs for the update loop. Keep this minimal; persisted
/// behavior settings live in [`crate::settings`].
#[derive(Clone, Copy, Debug)]
pub struct EngineConfig {
    /// Sleep interval while playing and values are changing.
    pub active_interval: Duration,
    /// Sleep interval while paused or idle.
    pub idle_interval: Duration,
    /// Reported position jumps larger than this (seconds) are treated as
    /// seeks and trigger a resync.
    pub seek_threshold: f64,
    /// Axis whose value drives smart-limit damping on the other axes.
    pub smart_limit_reference: DeviceAxis,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            active_interval: Duration::from_millis(2),
            idle_interval: Duration::from_millis(10),
            seek_threshold: 1.0,
            smart_limit_reference: DeviceAxis::L0,
        }
    }
}
