//! Mutable runtime state: per-axis cursor/value and the shared playback
//! scalars written by the media-position feed.

use std::sync::atomic::{AtomicBool, Ordering};

use atomic_float::AtomicF64;

/// Per-axis mutable runtime state. Written only by the update loop; read
/// concurrently by output targets through the owning mutex.
#[derive(Clone, Copy, Debug)]
pub struct AxisState {
    /// Index of the active segment, or [`AxisState::INVALID`].
    pub cursor: i64,
    /// Last published output value in [0, 1].
    pub value: f64,
    /// Seconds since playback stopped; drives auto-home.
    pub idle_time: f64,
    /// Value captured when idling began; auto-home eases from here.
    pub home_from: f64,
}

impl AxisState {
    pub const INVALID: i64 = i64::MIN;

    pub fn new(default_value: f64) -> Self {
        Self {
            cursor: Self::INVALID,
            value: default_value,
            idle_time: 0.0,
            home_from: default_value,
        }
    }

    #[inline]
    pub fn valid(&self) -> bool {
        self.cursor != Self::INVALID
    }

    #[inline]
    pub fn invalidate(&mut self) {
        self.cursor = Self::INVALID;
    }
}

/// Shared playback scalars. Atomic assignment with last-writer-wins
/// semantics; no ordering guarantee beyond per-field atomicity is needed.
#[derive(Debug)]
pub struct PlaybackState {
    position: AtomicF64,
    speed: AtomicF64,
    duration: AtomicF64,
    playing: AtomicBool,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            position: AtomicF64::new(f64::NAN),
            speed: AtomicF64::new(1.0),
            duration: AtomicF64::new(f64::NAN),
            playing: AtomicBool::new(false),
        }
    }
}

impl PlaybackState {
    /// Current media position in seconds; NaN while unknown.
    #[inline]
    pub fn position(&self) -> f64 {
        self.position.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_position(&self, position: f64) {
        self.position.store(position, Ordering::Relaxed);
    }

    #[inline]
    pub fn clear_position(&self) {
        self.position.store(f64::NAN, Ordering::Relaxed);
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.speed.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_speed(&self, speed: f64) {
        self.speed.store(speed.max(0.0), Ordering::Relaxed);
    }

    #[inline]
    pub fn duration(&self) -> Option<f64> {
        let d = self.duration.load(Ordering::Relaxed);
        d.is_finite().then_some(d)
    }

    #[inline]
    pub fn set_duration(&self, duration: Option<f64>) {
        self.duration
            .store(duration.unwrap_or(f64::NAN), Ordering::Relaxed);
    }

    #[inline]
    pub fn playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set_playing(&self, playing: bool) {
        self.playing.store(playing, Ordering::Relaxed);
    }
}
