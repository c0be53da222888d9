//! The per-axis update loop and the engine's external interface.
//!
//! One dedicated thread runs the loop (sleep-driven, no async); it is the
//! sole writer of per-axis state. The media-position feed mutates atomic
//! playback scalars, output targets read values through [`ValueReader`], and
//! the settings thread replaces per-axis settings under short locks. Scripts
//! are swapped by `Arc` reference so the loop never blocks on a reload.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::axis::DeviceAxis;
use crate::config::EngineConfig;
use crate::error::SettingsError;
use crate::interp::functions::lerp;
use crate::keyframes::KeyframeCollection;
use crate::noise::NoiseGenerator;
use crate::settings::{AxisSettings, SettingsBundle, SyncSettings};
use crate::state::{AxisState, PlaybackState};
use crate::sync::SyncController;

/// Reference values at or below this leave the damped axis untouched.
const SMART_LIMIT_FULL_BELOW: f64 = 0.25;
/// Reference values at or above this pin the damped axis to its default.
const SMART_LIMIT_ZERO_ABOVE: f64 = 0.9;
/// Auto-home durations below this snap to the default immediately.
const AUTO_HOME_SNAP_DURATION: f64 = 1e-4;

/// Poisoning never leaves per-axis state half-written (all writes are single
/// scalar stores), so a poisoned lock is recovered rather than propagated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct AxisSlot {
    state: Mutex<AxisState>,
    settings: Mutex<AxisSettings>,
    script: Mutex<Option<Arc<KeyframeCollection>>>,
    noise: Mutex<Arc<NoiseGenerator>>,
}

impl AxisSlot {
    fn new(axis: DeviceAxis) -> Self {
        let settings = AxisSettings::default();
        Self {
            state: Mutex::new(AxisState::new(axis.default_value())),
            noise: Mutex::new(Arc::new(NoiseGenerator::new(settings.randomizer_seed))),
            settings: Mutex::new(settings),
            script: Mutex::new(None),
        }
    }
}

struct EngineShared {
    config: EngineConfig,
    playback: PlaybackState,
    axes: [AxisSlot; DeviceAxis::COUNT],
    sync: Mutex<SyncController>,
    sync_settings: Mutex<SyncSettings>,
    cancelled: AtomicBool,
}

/// Cheap, cloneable handle for output targets. `get_value` is callable from
/// any thread at any rate; it only copies one f64 under a per-axis lock.
#[derive(Clone)]
pub struct ValueReader {
    shared: Arc<EngineShared>,
}

impl ValueReader {
    /// Current output for `axis`, clamped to [0, 1]. Returns the axis
    /// default while the axis has no valid script state.
    pub fn get_value(&self, axis: DeviceAxis) -> f64 {
        self.shared.get_value(axis)
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playback.playing()
    }
}

/// Script playback engine: owns the update thread and all per-axis state.
pub struct MotionEngine {
    shared: Arc<EngineShared>,
    worker: Option<JoinHandle<()>>,
}

impl Default for MotionEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl MotionEngine {
    pub fn new(config: EngineConfig) -> Self {
        let sync_settings = SyncSettings::default();
        let shared = EngineShared {
            config,
            playback: PlaybackState::default(),
            axes: DeviceAxis::ALL.map(AxisSlot::new),
            sync: Mutex::new(SyncController::new(sync_settings.duration)),
            sync_settings: Mutex::new(sync_settings),
            cancelled: AtomicBool::new(false),
        };
        Self {
            shared: Arc::new(shared),
            worker: None,
        }
    }

    /// Handle for output-target threads.
    pub fn values(&self) -> ValueReader {
        ValueReader {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Start the dedicated update thread. Idempotent while running.
    pub fn spawn(&mut self) -> io::Result<()> {
        if self.worker.is_some() {
            return Ok(());
        }
        self.shared.cancelled.store(false, Ordering::Relaxed);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("funsync-update".into())
            .spawn(move || {
                log::debug!("update loop started");
                let mut last = Instant::now();
                while !shared.cancelled.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    let dt = now.duration_since(last).as_secs_f64();
                    last = now;
                    let dirty = shared.tick(dt);
                    // Adaptive rate: tight interval only while motion is
                    // actually occurring.
                    let interval = if shared.playback.playing() && dirty {
                        shared.config.active_interval
                    } else {
                        shared.config.idle_interval
                    };
                    thread::sleep(interval);
                }
                log::debug!("update loop stopped");
            })?;
        self.worker = Some(handle);
        Ok(())
    }

    /// Cooperatively stop and join the update thread.
    pub fn stop(&mut self) {
        self.shared.cancelled.store(true, Ordering::Relaxed);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    /// Advance the engine by `dt` seconds. The spawned worker calls this on
    /// its own; embedders driving their own scheduler (and tests using a
    /// fake clock) call it directly instead of [`MotionEngine::spawn`].
    /// Returns whether any axis value changed.
    pub fn tick(&self, dt: f64) -> bool {
        self.shared.tick(dt)
    }

    // --- position feed -----------------------------------------------------

    /// New reported media position; `None` while unknown. A jump exceeding
    /// the configured seek threshold triggers a resync instead of a snap.
    pub fn on_position_changed(&self, position: Option<f64>) {
        match position {
            None => {
                self.shared.playback.clear_position();
                self.shared.invalidate_cursors();
            }
            Some(position) => {
                let previous = self.shared.playback.position();
                if previous.is_finite()
                    && (position - previous).abs() > self.shared.config.seek_threshold
                {
                    log::debug!("seek detected: {previous:.3}s -> {position:.3}s");
                    self.shared.invalidate_cursors();
                    let start = lock(&self.shared.sync_settings).sync_on_seek;
                    self.shared.resync(start);
                }
                self.shared.playback.set_position(position);
            }
        }
    }

    pub fn on_playing_changed(&self, playing: bool) {
        let was_playing = self.shared.playback.playing();
        self.shared.playback.set_playing(playing);
        if playing && !was_playing {
            let start = lock(&self.shared.sync_settings).sync_on_resume;
            self.shared.resync(start);
        }
    }

    pub fn on_speed_changed(&self, speed: f64) {
        self.shared.playback.set_speed(speed);
    }

    pub fn on_duration_changed(&self, duration: Option<f64>) {
        self.shared.playback.set_duration(duration);
    }

    /// Media changed: forget position/duration, invalidate all axes and
    /// resync. Scripts stay until the supplier replaces them.
    pub fn on_media_changed(&self) {
        self.shared.playback.clear_position();
        self.shared.playback.set_duration(None);
        self.shared.invalidate_cursors();
        let start = lock(&self.shared.sync_settings).sync_on_media_changed;
        self.shared.resync(start);
    }

    // --- script supply -----------------------------------------------------

    /// Replace an axis's active script; `None` invalidates the axis. The old
    /// collection stays alive for any reader mid-read (swap-by-reference).
    pub fn set_script(&self, axis: DeviceAxis, script: Option<Arc<KeyframeCollection>>) {
        let slot = &self.shared.axes[axis.index()];
        *lock(&slot.script) = script;
        lock(&slot.state).invalidate();
        let start = lock(&self.shared.sync_settings).sync_on_media_changed;
        self.shared.resync(start);
    }

    // --- settings ----------------------------------------------------------

    /// Apply per-axis settings. Rejects self-links and link cycles; any
    /// accepted change triggers a resync so the output eases over instead of
    /// snapping.
    pub fn apply_axis_settings(
        &self,
        axis: DeviceAxis,
        settings: AxisSettings,
    ) -> Result<(), SettingsError> {
        self.shared.check_link(axis, settings.link_axis)?;
        self.shared.store_axis_settings(axis, settings);
        self.shared.resync(true);
        Ok(())
    }

    pub fn axis_settings(&self, axis: DeviceAxis) -> AxisSettings {
        *lock(&self.shared.axes[axis.index()].settings)
    }

    pub fn apply_sync_settings(&self, settings: SyncSettings) {
        lock(&self.shared.sync).set_duration(settings.duration);
        *lock(&self.shared.sync_settings) = settings;
    }

    pub fn sync_settings(&self) -> SyncSettings {
        *lock(&self.shared.sync_settings)
    }

    /// Apply a whole persisted bundle at once. The bundle is validated as a
    /// unit; per-axis link checks are skipped so a valid bundle cannot be
    /// rejected by transient old-link/new-link combinations mid-apply.
    pub fn apply_settings(&self, bundle: &SettingsBundle) -> Result<(), SettingsError> {
        bundle.validate()?;
        self.apply_sync_settings(bundle.sync);
        for axis in DeviceAxis::ALL {
            self.shared.store_axis_settings(axis, bundle.axis(axis));
        }
        self.shared.resync(true);
        Ok(())
    }

    /// Snapshot of the current settings, for persistence.
    pub fn settings(&self) -> SettingsBundle {
        let mut bundle = SettingsBundle {
            sync: *lock(&self.shared.sync_settings),
            ..SettingsBundle::default()
        };
        for axis in DeviceAxis::ALL {
            bundle.axes.insert(axis, self.axis_settings(axis));
        }
        bundle
    }

    // --- value sink --------------------------------------------------------

    /// See [`ValueReader::get_value`].
    pub fn get_value(&self, axis: DeviceAxis) -> f64 {
        self.shared.get_value(axis)
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playback.playing()
    }

    /// Current playback position in seconds, if known.
    pub fn position(&self) -> Option<f64> {
        let p = self.shared.playback.position();
        p.is_finite().then_some(p)
    }
}

impl Drop for MotionEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

impl EngineShared {
    fn get_value(&self, axis: DeviceAxis) -> f64 {
        let state = lock(&self.axes[axis.index()].state);
        if state.valid() {
            state.value.clamp(0.0, 1.0)
        } else {
            axis.default_value()
        }
    }

    fn resync(&self, start_syncing: bool) {
        lock(&self.sync).reset(start_syncing);
    }

    fn store_axis_settings(&self, axis: DeviceAxis, settings: AxisSettings) {
        let slot = &self.axes[axis.index()];
        {
            let mut noise = lock(&slot.noise);
            if noise.seed() != settings.randomizer_seed {
                *noise = Arc::new(NoiseGenerator::new(settings.randomizer_seed));
            }
        }
        *lock(&slot.settings) = settings;
    }

    fn invalidate_cursors(&self) {
        for slot in &self.axes {
            lock(&slot.state).invalidate();
        }
    }

    /// Validate a prospective `link_axis` for `axis` against the currently
    /// applied links.
    fn check_link(
        &self,
        axis: DeviceAxis,
        link_axis: Option<DeviceAxis>,
    ) -> Result<(), SettingsError> {
        if link_axis == Some(axis) {
            return Err(SettingsError::SelfLink(axis));
        }
        let mut links: [Option<DeviceAxis>; DeviceAxis::COUNT] =
            DeviceAxis::ALL.map(|a| lock(&self.axes[a.index()].settings).link_axis);
        links[axis.index()] = link_axis;

        let mut seen = [false; DeviceAxis::COUNT];
        let mut current = axis;
        while let Some(next) = links[current.index()] {
            if next == axis || seen[next.index()] {
                return Err(SettingsError::LinkCycle(axis));
            }
            seen[next.index()] = true;
            current = next;
        }
        Ok(())
    }

    fn tick(&self, dt: f64) -> bool {
        let playing = self.playback.playing();
        let mut position = self.playback.position();
        if playing && position.is_finite() && dt > 0.0 {
            position += dt * self.playback.speed();
            self.playback.set_position(position);
        }

        // The sync timer only runs while something can actually move.
        let any_valid = self
            .axes
            .iter()
            .any(|slot| lock(&slot.state).valid());
        let sync_factor = {
            let mut sync = lock(&self.sync);
            if playing && any_valid {
                sync.update(dt);
            }
            sync.progress() / 100.0
        };
        let global_offset = lock(&self.sync_settings).global_offset;

        let mut dirty = false;
        for axis in DeviceAxis::ALL {
            dirty |= self.update_axis(axis, position, playing, dt, sync_factor, global_offset);
        }
        dirty
    }

    /// One axis, one tick. Modifier order: interpolate, invert, link dither,
    /// sync blend, smart limit, publish.
    fn update_axis(
        &self,
        axis: DeviceAxis,
        position: f64,
        playing: bool,
        dt: f64,
        sync_factor: f64,
        global_offset: f64,
    ) -> bool {
        let slot = &self.axes[axis.index()];
        let settings = *lock(&slot.settings);
        let mut state = lock(&slot.state);

        if !playing || !position.is_finite() {
            return auto_home(&mut state, axis, &settings, dt);
        }
        state.idle_time = 0.0;

        let script = match settings.link_axis {
            Some(target) => lock(&self.axes[target.index()].script).clone(),
            None => lock(&slot.script).clone(),
        };
        let script = match script {
            Some(script) if script.len() >= 2 => script,
            _ => {
                state.invalidate();
                return false;
            }
        };

        let axis_position = position - global_offset - settings.offset;

        if !state.valid() {
            state.cursor = script.search_index_before(axis_position);
        } else if cursor_stale(&script, state.cursor, axis_position) {
            // The monotone cursor cannot recover on its own: the position
            // moved backward past it (sub-threshold seek or offset change),
            // or the script was swapped out from under it (a linked axis
            // keeps its cursor when the target's script is replaced).
            state.cursor = script.search_index_before(axis_position);
        } else {
            state.cursor = script.advance_index(state.cursor, axis_position);
        }

        let cursor = state.cursor;
        if cursor < 0 || cursor as usize + 1 >= script.len() {
            // Outside the scripted range this tick; hold the last value.
            return false;
        }

        let raw = script.interpolate(cursor as usize, axis_position, settings.interpolation_type);
        let mut value = raw.clamp(0.0, 1.0);

        if settings.invert {
            value = 1.0 - value;
        }

        if settings.link_axis.is_some() && settings.randomizer_strength > 0.0 {
            let noise = Arc::clone(&lock(&slot.noise));
            let x = axis_position / settings.randomizer_speed_factor();
            let dither = noise.calculate_2d_01(x, axis.index() as f64);
            let strength = (settings.randomizer_strength / 100.0).clamp(0.0, 1.0);
            value = lerp(value, dither, strength);
        }

        if sync_factor < 1.0 {
            value = lerp(state.value, value, sync_factor.clamp(0.0, 1.0));
        }

        let reference_axis = self.config.smart_limit_reference;
        if settings.smart_limit_enabled && axis != reference_axis {
            let reference = lock(&self.axes[reference_axis.index()].state).value;
            value = lerp(axis.default_value(), value, smart_limit_factor(reference));
        }

        if !value.is_finite() {
            log::warn!("non-finite value computed for {axis}, holding last good value");
            return false;
        }

        let changed = (value - state.value).abs() > f64::EPSILON;
        state.value = value;
        changed
    }
}

/// True when the cursor must be re-searched: its keyframe lies ahead of the
/// query position, or the index no longer exists in the (possibly replaced)
/// script. Negative cursors advance normally.
fn cursor_stale(script: &KeyframeCollection, cursor: i64, axis_position: f64) -> bool {
    match usize::try_from(cursor) {
        Err(_) => false,
        Ok(index) => match script.get(index) {
            None => true,
            Some(keyframe) => keyframe.position > axis_position,
        },
    }
}

/// Ease an idle axis back toward its default value. Returns whether the
/// published value changed.
fn auto_home(state: &mut AxisState, axis: DeviceAxis, settings: &AxisSettings, dt: f64) -> bool {
    if state.idle_time == 0.0 {
        state.home_from = state.value;
    }
    state.idle_time += dt;

    if !settings.auto_home_enabled {
        return false;
    }
    let t = state.idle_time - settings.auto_home_delay;
    if t <= 0.0 {
        return false;
    }

    let target = axis.default_value();
    if settings.auto_home_duration < AUTO_HOME_SNAP_DURATION {
        let changed = (state.value - target).abs() > f64::EPSILON;
        state.value = target;
        return changed;
    }

    let progress = (t / settings.auto_home_duration).clamp(0.0, 1.0);
    let eased = if progress >= 1.0 {
        1.0
    } else {
        (2.0f64).powf(10.0 * (progress - 1.0))
    };
    let value = lerp(state.home_from, target, eased);
    let changed = (value - state.value).abs() > f64::EPSILON;
    state.value = value;
    changed
}

/// Piecewise damping factor from the reference axis's current value:
/// 1.0 at or below the lower knee, 0.0 at or above the upper knee, linear
/// in between.
fn smart_limit_factor(reference: f64) -> f64 {
    if reference <= SMART_LIMIT_FULL_BELOW {
        1.0
    } else if reference >= SMART_LIMIT_ZERO_ABOVE {
        0.0
    } else {
        1.0 - (reference - SMART_LIMIT_FULL_BELOW) / (SMART_LIMIT_ZERO_ABOVE - SMART_LIMIT_FULL_BELOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smart_limit_knees() {
        assert_eq!(smart_limit_factor(0.0), 1.0);
        assert_eq!(smart_limit_factor(0.25), 1.0);
        assert_eq!(smart_limit_factor(0.9), 0.0);
        assert_eq!(smart_limit_factor(1.0), 0.0);
        let mid = smart_limit_factor(0.575);
        assert!((mid - 0.5).abs() < 1e-9);
    }
}
