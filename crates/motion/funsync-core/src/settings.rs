//! Per-axis and global settings, plus the persisted JSON bundle.
//!
//! Settings are plain copyable values: the update loop copies them once per
//! tick, so the UI/settings thread can replace them at any time without
//! coordinating with the loop.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::axis::DeviceAxis;
use crate::error::SettingsError;
use crate::interp::InterpolationKind;

/// Per-axis configuration. One instance per [`DeviceAxis`].
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisSettings {
    pub interpolation_type: InterpolationKind,
    /// Mirror the output (`value = 1 - value`).
    pub invert: bool,
    /// Per-axis script time offset in seconds, added on top of the global
    /// offset.
    pub offset: f64,
    /// When set, this axis plays the linked axis's script instead of its own.
    /// Exactly one hop is followed; chains are not resolved transitively.
    pub link_axis: Option<DeviceAxis>,
    pub randomizer_seed: i64,
    /// Blend fraction of noise into the raw value, 0..100.
    pub randomizer_strength: f64,
    /// Noise variation speed, 0..100 (higher is faster).
    pub randomizer_speed: f64,
    /// Damp this axis based on the reference axis's current value.
    pub smart_limit_enabled: bool,
    pub auto_home_enabled: bool,
    /// Idle seconds before auto-home starts easing.
    pub auto_home_delay: f64,
    /// Seconds the easing takes; values below ~1e-4 snap immediately.
    pub auto_home_duration: f64,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            interpolation_type: InterpolationKind::default(),
            invert: false,
            offset: 0.0,
            link_axis: None,
            randomizer_seed: 0,
            randomizer_strength: 0.0,
            randomizer_speed: 50.0,
            smart_limit_enabled: false,
            auto_home_enabled: true,
            auto_home_delay: 5.0,
            auto_home_duration: 3.0,
        }
    }
}

impl AxisSettings {
    /// Noise x-coordinate divisor derived from `randomizer_speed` by an
    /// inverse map: a higher speed setting means a smaller factor and thus
    /// faster noise variation.
    #[inline]
    pub fn randomizer_speed_factor(&self) -> f64 {
        100.0 / self.randomizer_speed.clamp(1.0, 100.0)
    }
}

/// Global synchronization settings.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Length of the blended transition after a discontinuity, in seconds.
    pub duration: f64,
    /// Global script time offset in seconds, applied to every axis.
    pub global_offset: f64,
    pub sync_on_media_changed: bool,
    pub sync_on_resume: bool,
    pub sync_on_seek: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            duration: 4.0,
            global_offset: 0.0,
            sync_on_media_changed: true,
            sync_on_resume: true,
            sync_on_seek: true,
        }
    }
}

/// The persisted settings structure: axis map plus globals.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsBundle {
    pub axes: BTreeMap<DeviceAxis, AxisSettings>,
    pub sync: SyncSettings,
}

impl SettingsBundle {
    /// Settings for an axis, falling back to defaults when absent.
    pub fn axis(&self, axis: DeviceAxis) -> AxisSettings {
        self.axes.get(&axis).copied().unwrap_or_default()
    }

    /// Reject self-links and link cycles. Resolution at runtime follows one
    /// hop only, but a cycle in the persisted settings is still a logic bug
    /// worth surfacing at apply time.
    pub fn validate(&self) -> Result<(), SettingsError> {
        for (&axis, settings) in &self.axes {
            if settings.link_axis == Some(axis) {
                return Err(SettingsError::SelfLink(axis));
            }
        }
        for &start in self.axes.keys() {
            let mut seen = [false; DeviceAxis::COUNT];
            let mut current = start;
            while let Some(next) = self.axis(current).link_axis {
                if seen[next.index()] || next == start {
                    return Err(SettingsError::LinkCycle(start));
                }
                seen[next.index()] = true;
                current = next;
            }
        }
        Ok(())
    }

    /// Parse and validate a persisted bundle.
    pub fn from_json(s: &str) -> Result<Self, SettingsError> {
        let bundle: SettingsBundle = serde_json::from_str(s)?;
        bundle.validate()?;
        Ok(bundle)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_factor_is_inverse() {
        let mut s = AxisSettings::default();
        s.randomizer_speed = 100.0;
        let fast = s.randomizer_speed_factor();
        s.randomizer_speed = 10.0;
        let slow = s.randomizer_speed_factor();
        assert!(fast < slow);
    }

    #[test]
    fn self_link_rejected() {
        let mut bundle = SettingsBundle::default();
        let mut s = AxisSettings::default();
        s.link_axis = Some(DeviceAxis::L0);
        bundle.axes.insert(DeviceAxis::L0, s);
        assert!(matches!(
            bundle.validate(),
            Err(SettingsError::SelfLink(DeviceAxis::L0))
        ));
    }

    #[test]
    fn link_cycle_rejected() {
        let mut bundle = SettingsBundle::default();
        let mut a = AxisSettings::default();
        a.link_axis = Some(DeviceAxis::R0);
        let mut b = AxisSettings::default();
        b.link_axis = Some(DeviceAxis::L0);
        bundle.axes.insert(DeviceAxis::L0, a);
        bundle.axes.insert(DeviceAxis::R0, b);
        assert!(matches!(
            bundle.validate(),
            Err(SettingsError::LinkCycle(_))
        ));
    }

    #[test]
    fn one_hop_link_is_fine() {
        let mut bundle = SettingsBundle::default();
        let mut a = AxisSettings::default();
        a.link_axis = Some(DeviceAxis::L0);
        bundle.axes.insert(DeviceAxis::R0, a);
        assert!(bundle.validate().is_ok());
    }
}
