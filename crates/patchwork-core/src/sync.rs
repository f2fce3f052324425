//! Value synchronisation between a GUI object and its engine object
//!
//! Every value-carrying widget owns a [`ValueSync`]. It caches the last value
//! seen by the engine and arbitrates between user edits and engine-driven
//! updates:
//!
//! ```text
//!            start_edition                 set_value_*            stop_edition
//!   Idle ───────────────────▶ Editing ──────────────────▶ Committing ─────────▶ Idle
//!    ▲                          │  engine update: buffered                       │
//!    └──────────────────────────┴──── buffered value applied if still newest ◀───┘
//! ```
//!
//! While a gesture is in progress the display may lead the engine. Engine
//! updates arriving mid-gesture are buffered and applied when the gesture
//! ends, unless a later local commit superseded them.
//!
//! Two representations are exposed:
//! - **original**: the engine-native value (normalised `0..1` for bounded ranges)
//! - **scaled**: the value in the UI range `[min, max]`

use crate::types::ValueRange;

/// Outcome of feeding an engine-driven value into a [`ValueSync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineUpdate {
    /// Cached value changed, the widget must repaint
    Applied,
    /// A gesture is in progress, the value was buffered
    Deferred,
    /// Value identical to the cache, nothing to do
    Unchanged,
}

/// Cached engine value plus edit-gesture state for one GUI object
#[derive(Debug, Clone, PartialEq)]
pub struct ValueSync {
    /// Engine-native value
    value: f32,
    range: ValueRange,
    /// True while a user gesture owns the displayed value
    edited: bool,
    /// Newest engine value received during a gesture
    pending: Option<f32>,
}

impl Default for ValueSync {
    fn default() -> Self {
        Self::new(0.0, ValueRange::UNIT)
    }
}

impl ValueSync {
    pub fn new(value: f32, range: ValueRange) -> Self {
        let mut sync = Self {
            value: 0.0,
            range,
            edited: false,
            pending: None,
        };
        sync.value = sync.clamp_original(value);
        sync
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn min(&self) -> f32 {
        self.range.min
    }

    pub fn max(&self) -> f32 {
        self.range.max
    }

    /// Change the UI range, keeping the engine-native value
    pub fn set_range(&mut self, range: ValueRange) {
        self.range = range;
        self.value = self.clamp_original(self.value);
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn value_original(&self) -> f32 {
        self.value
    }

    /// Store an engine-native value, returning what must be pushed to the engine
    ///
    /// Any engine value buffered during the current gesture is now stale.
    pub fn set_value_original(&mut self, value: f32) -> f32 {
        self.value = self.clamp_original(value);
        self.pending = None;
        self.value
    }

    pub fn value_scaled(&self) -> f32 {
        self.range.denormalize(self.value)
    }

    /// Store a value given in the UI range, returning the engine-native value to push
    pub fn set_value_scaled(&mut self, value: f32) -> f32 {
        let original = self.range.normalize(value);
        self.set_value_original(original)
    }

    pub fn start_edition(&mut self) {
        self.edited = true;
    }

    /// End the gesture, applying any engine value that arrived after the last commit
    ///
    /// Returns true if the cached value changed as a result.
    pub fn stop_edition(&mut self) -> bool {
        self.edited = false;

        match self.pending.take() {
            Some(pending) if pending != self.value => {
                self.value = pending;
                true
            }
            _ => false,
        }
    }

    /// Feed a value pushed by the engine
    pub fn receive(&mut self, engine_value: f32) -> EngineUpdate {
        let engine_value = self.clamp_original(engine_value);

        if self.edited {
            self.pending = Some(engine_value);
            return EngineUpdate::Deferred;
        }

        if engine_value == self.value {
            EngineUpdate::Unchanged
        } else {
            self.value = engine_value;
            EngineUpdate::Applied
        }
    }

    fn clamp_original(&self, value: f32) -> f32 {
        if self.range.is_bounded() {
            value.clamp(0.0, 1.0)
        } else {
            value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_scaled_round_trip_across_range() {
        for range in [
            ValueRange::new(0.0, 127.0),
            ValueRange::new(-1.0, 1.0),
            ValueRange::new(100.0, -100.0),
            ValueRange::new(0.001, 0.002),
        ] {
            let mut sync = ValueSync::new(0.0, range);
            for step in 0..=20 {
                let x = range.min + (range.max - range.min) * step as f32 / 20.0;
                sync.set_value_scaled(x);
                assert_abs_diff_eq!(sync.value_scaled(), x, epsilon = 1e-4 * (1.0 + x.abs()));
            }
        }
    }

    #[test]
    fn test_degenerate_range_is_identity() {
        let mut sync = ValueSync::new(0.0, ValueRange::UNBOUNDED);
        assert_eq!(sync.set_value_scaled(-42.5), -42.5);
        assert_eq!(sync.value_scaled(), -42.5);
        assert_eq!(sync.value_original(), -42.5);
    }

    #[test]
    fn test_scaled_input_is_clamped() {
        let mut sync = ValueSync::new(0.0, ValueRange::new(0.0, 10.0));
        sync.set_value_scaled(25.0);
        assert_abs_diff_eq!(sync.value_scaled(), 10.0);
        assert_abs_diff_eq!(sync.value_original(), 1.0);
    }

    #[test]
    fn test_engine_update_applied_when_idle() {
        let mut sync = ValueSync::new(0.2, ValueRange::UNIT);
        assert_eq!(sync.receive(0.7), EngineUpdate::Applied);
        assert_eq!(sync.value_original(), 0.7);
        assert_eq!(sync.receive(0.7), EngineUpdate::Unchanged);
    }

    #[test]
    fn test_engine_update_deferred_during_gesture() {
        let mut sync = ValueSync::new(0.2, ValueRange::UNIT);
        sync.start_edition();
        sync.set_value_original(0.4);

        assert_eq!(sync.receive(0.9), EngineUpdate::Deferred);
        assert_eq!(sync.value_original(), 0.4);

        assert!(sync.stop_edition());
        assert!(!sync.is_edited());
        assert_eq!(sync.value_original(), 0.9);
    }

    #[test]
    fn test_local_commit_supersedes_buffered_engine_value() {
        let mut sync = ValueSync::new(0.2, ValueRange::UNIT);
        sync.start_edition();
        assert_eq!(sync.receive(0.9), EngineUpdate::Deferred);

        // User keeps dragging after the engine update arrived
        sync.set_value_original(0.5);

        assert!(!sync.stop_edition());
        assert_eq!(sync.value_original(), 0.5);
    }

    #[test]
    fn test_set_range_keeps_normalised_value() {
        let mut sync = ValueSync::new(0.5, ValueRange::new(0.0, 100.0));
        assert_abs_diff_eq!(sync.value_scaled(), 50.0);
        sync.set_range(ValueRange::new(0.0, 10.0));
        assert_abs_diff_eq!(sync.value_scaled(), 5.0);
        assert_eq!(sync.min(), 0.0);
        assert_eq!(sync.max(), 10.0);
    }
}
