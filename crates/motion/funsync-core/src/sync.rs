//! Re-synchronization easing after playback discontinuities.
//!
//! A single global timer, threaded explicitly through the update loop so
//! tests can drive it with a fake clock.

/// Tracks elapsed time since the last discontinuity and derives an ease-in
/// progress value. Progress is 0 exactly at the start of a sync, rises along
/// `2^(10 * (t/d - 1))` and is 100 once the sync window has passed.
#[derive(Clone, Copy, Debug)]
pub struct SyncController {
    elapsed: f64,
    duration: f64,
}

impl SyncController {
    /// Starts out fully synced (no blend in effect).
    pub fn new(duration: f64) -> Self {
        Self {
            elapsed: duration,
            duration,
        }
    }

    /// `start_syncing` rewinds the timer to zero; otherwise the controller
    /// jumps straight to the "not syncing" state.
    pub fn reset(&mut self, start_syncing: bool) {
        self.elapsed = if start_syncing { 0.0 } else { self.duration };
    }

    pub fn set_duration(&mut self, duration: f64) {
        let was_syncing = self.is_syncing();
        self.duration = duration.max(0.0);
        if !was_syncing {
            self.elapsed = self.duration;
        }
    }

    /// Advance the timer. The caller gates this on "playing and at least one
    /// axis valid".
    pub fn update(&mut self, dt: f64) {
        if self.is_syncing() {
            self.elapsed += dt.max(0.0);
        }
    }

    #[inline]
    pub fn is_syncing(&self) -> bool {
        self.elapsed < self.duration
    }

    /// Blend progress in [0, 100]. 100 when not syncing.
    pub fn progress(&self) -> f64 {
        if self.duration <= 0.0 || !self.is_syncing() {
            return 100.0;
        }
        if self.elapsed <= 0.0 {
            return 0.0;
        }
        (2.0f64).powf(10.0 * (self.elapsed / self.duration - 1.0)) * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_boundaries() {
        let mut sync = SyncController::new(4.0);
        assert!(!sync.is_syncing());
        assert_eq!(sync.progress(), 100.0);

        sync.reset(true);
        assert!(sync.is_syncing());
        assert_eq!(sync.progress(), 0.0);

        sync.update(4.0);
        assert!(!sync.is_syncing());
        assert_eq!(sync.progress(), 100.0);
    }

    #[test]
    fn progress_is_monotone() {
        let mut sync = SyncController::new(2.0);
        sync.reset(true);
        let mut last = sync.progress();
        for _ in 0..250 {
            sync.update(0.01);
            let p = sync.progress();
            assert!(p >= last, "progress regressed: {p} < {last}");
            last = p;
        }
        assert_eq!(last, 100.0);
    }

    #[test]
    fn reset_without_syncing_completes_immediately() {
        let mut sync = SyncController::new(4.0);
        sync.reset(true);
        sync.reset(false);
        assert!(!sync.is_syncing());
        assert_eq!(sync.progress(), 100.0);
    }

    #[test]
    fn zero_duration_never_syncs() {
        let mut sync = SyncController::new(0.0);
        sync.reset(true);
        assert!(!sync.is_syncing());
        assert_eq!(sync.progress(), 100.0);
    }
}
