//! Interpolation kinds and dispatch.
//!
//! The kind set is closed; dispatch is an exhaustive match so an unsupported
//! kind is unrepresentable rather than a runtime error.

pub mod functions;

use serde::{Deserialize, Serialize};

/// Per-axis interpolation algorithm selection.
///
/// All kinds interpolate over the active segment `[k0, k1]`; Pchip and Makima
/// additionally consume neighboring points supplied by the caller.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum InterpolationKind {
    /// Hold the left keyframe's value across the segment.
    Step,
    /// Two-point linear interpolation.
    Linear,
    /// Monotone cubic Hermite (Fritsch–Carlson tangents, 4 points).
    /// Never overshoots local extrema, so fast transitions do not ring.
    #[default]
    Pchip,
    /// Modified Akima (6 points). Flat near equal values, avoids classic
    /// Akima's sensitivity to nearly-equal slopes.
    Makima,
}

impl InterpolationKind {
    /// Number of neighbor points consumed on each side of the active segment.
    #[inline]
    pub fn neighbor_radius(self) -> usize {
        match self {
            InterpolationKind::Step | InterpolationKind::Linear => 0,
            InterpolationKind::Pchip => 1,
            InterpolationKind::Makima => 2,
        }
    }
}
