//! Buffer Health Monitor

use serde::Serialize;

use super::TimeRanges;

/// Seconds of media ahead of the playhead that count as a full buffer
pub const HEALTH_WINDOW_SECONDS: f64 = 30.0;

/// Normalized buffered safety margin, always in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
pub struct BufferHealth(f64);

impl BufferHealth {
    pub const EMPTY: BufferHealth = BufferHealth(0.0);
    pub const FULL: BufferHealth = BufferHealth(1.0);

    /// Clamp any value into range; NaN becomes empty
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self::EMPTY
        } else {
            BufferHealth(value.clamp(0.0, 1.0))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Compute health from a playhead position and buffered ranges
///
/// Only the range covering the playhead, or failing that the first range
/// after it, is relevant; data behind the playhead or beyond a later gap
/// does not count.
pub fn compute_health(playhead: f64, buffered: &TimeRanges) -> BufferHealth {
    match buffered.range_at_or_after(playhead) {
        Some(range) => BufferHealth::new((range.end() - playhead) / HEALTH_WINDOW_SECONDS),
        None => BufferHealth::EMPTY,
    }
}

/// Keeps the last computed health for the active binding
#[derive(Debug, Clone, Default)]
pub struct BufferHealthMonitor {
    current: BufferHealth,
}

impl BufferHealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute on a timeline advance or buffer extension
    ///
    /// Returns the new value and whether it differs from the previous one.
    pub fn observe(&mut self, playhead: f64, buffered: &TimeRanges) -> (BufferHealth, bool) {
        let health = compute_health(playhead, buffered);
        let changed = health != self.current;
        self.current = health;
        (health, changed)
    }

    pub fn current(&self) -> BufferHealth {
        self.current
    }

    /// Forget everything on rebind
    pub fn reset(&mut self) {
        self.current = BufferHealth::EMPTY;
    }
}
