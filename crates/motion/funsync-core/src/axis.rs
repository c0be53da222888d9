//! Fixed registry of device axes.
//!
//! Axes follow the common TCode naming scheme: L* for linear, R* for rotary,
//! V*/A* for vibration and auxiliary outputs. The set is closed; per-axis
//! settings, state and scripts are stored in dense arrays indexed by
//! [`DeviceAxis::index`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One independently controllable degree of motion/output.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub enum DeviceAxis {
    L0,
    L1,
    L2,
    R0,
    R1,
    R2,
    V0,
    V1,
    A0,
    A1,
}

impl DeviceAxis {
    /// All axes in registry order. Matches [`DeviceAxis::index`].
    pub const ALL: [DeviceAxis; 10] = [
        DeviceAxis::L0,
        DeviceAxis::L1,
        DeviceAxis::L2,
        DeviceAxis::R0,
        DeviceAxis::R1,
        DeviceAxis::R2,
        DeviceAxis::V0,
        DeviceAxis::V1,
        DeviceAxis::A0,
        DeviceAxis::A1,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Dense index into per-axis storage.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Rest/default output value. Centered axes rest at mid-range, intensity
    /// style axes (vibrate/pump/valve/suck) rest at zero.
    #[inline]
    pub fn default_value(self) -> f64 {
        match self {
            DeviceAxis::L0
            | DeviceAxis::L1
            | DeviceAxis::L2
            | DeviceAxis::R0
            | DeviceAxis::R1
            | DeviceAxis::R2 => 0.5,
            DeviceAxis::V0 | DeviceAxis::V1 | DeviceAxis::A0 | DeviceAxis::A1 => 0.0,
        }
    }

    /// Human readable alias, also accepted by [`FromStr`].
    pub fn friendly_name(self) -> &'static str {
        match self {
            DeviceAxis::L0 => "stroke",
            DeviceAxis::L1 => "surge",
            DeviceAxis::L2 => "sway",
            DeviceAxis::R0 => "twist",
            DeviceAxis::R1 => "roll",
            DeviceAxis::R2 => "pitch",
            DeviceAxis::V0 => "vibrate",
            DeviceAxis::V1 => "pump",
            DeviceAxis::A0 => "valve",
            DeviceAxis::A1 => "suck",
        }
    }

    /// TCode-style axis code ("L0", "R2", ...).
    pub fn code(self) -> &'static str {
        match self {
            DeviceAxis::L0 => "L0",
            DeviceAxis::L1 => "L1",
            DeviceAxis::L2 => "L2",
            DeviceAxis::R0 => "R0",
            DeviceAxis::R1 => "R1",
            DeviceAxis::R2 => "R2",
            DeviceAxis::V0 => "V0",
            DeviceAxis::V1 => "V1",
            DeviceAxis::A0 => "A0",
            DeviceAxis::A1 => "A1",
        }
    }
}

impl fmt::Display for DeviceAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for DeviceAxis {
    type Err = UnknownAxis;

    /// Accepts both axis codes ("L0") and friendly aliases ("stroke"),
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        for axis in Self::ALL {
            if needle.eq_ignore_ascii_case(axis.code())
                || needle.eq_ignore_ascii_case(axis.friendly_name())
            {
                return Ok(axis);
            }
        }
        Err(UnknownAxis(needle.to_string()))
    }
}

/// Error returned when parsing an axis name fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown device axis '{0}'")]
pub struct UnknownAxis(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_all_order() {
        for (i, axis) in DeviceAxis::ALL.iter().enumerate() {
            assert_eq!(axis.index(), i);
        }
    }

    #[test]
    fn parse_codes_and_aliases() {
        assert_eq!("L0".parse::<DeviceAxis>().unwrap(), DeviceAxis::L0);
        assert_eq!("stroke".parse::<DeviceAxis>().unwrap(), DeviceAxis::L0);
        assert_eq!("Twist".parse::<DeviceAxis>().unwrap(), DeviceAxis::R0);
        assert!("Z9".parse::<DeviceAxis>().is_err());
    }

    #[test]
    fn centered_axes_rest_at_half() {
        assert_eq!(DeviceAxis::L0.default_value(), 0.5);
        assert_eq!(DeviceAxis::V0.default_value(), 0.0);
    }
}
