//! Array mirror with drag editing
//!
//! `vec` holds the last contents read from the engine. During a gesture
//! edits go to `temp` only, and the touched span is written back in one
//! call when the pointer is released, so the engine never sees a half-drawn
//! stroke.

use patchwork_core::engine::{Engine, EngineResult};
use patchwork_core::ValueRange;

#[derive(Debug, Clone)]
pub struct GraphicalArray {
    name: String,
    vec: Vec<f32>,
    temp: Vec<f32>,
    /// Display range, top edge is `max`
    range: ValueRange,
    edited: bool,
    /// Last refresh failed (array missing or unreadable)
    error: bool,
    /// Previous drag sample, interpolation starts here
    last_point: Option<(usize, f32)>,
    /// Inclusive index span touched by the current gesture
    dirty: Option<(usize, usize)>,
}

impl GraphicalArray {
    /// Mirror `name`; a failed initial read leaves the array in error state
    pub fn new(name: impl Into<String>, engine: &dyn Engine) -> Self {
        let mut array = Self {
            name: name.into(),
            vec: Vec::new(),
            temp: Vec::new(),
            range: ValueRange::new(-1.0, 1.0),
            edited: false,
            error: false,
            last_point: None,
            dirty: None,
        };
        array.refresh(engine);
        array
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.vec.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vec.is_empty()
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    pub fn is_edited(&self) -> bool {
        self.edited
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Values to draw: the scratch buffer while editing
    pub fn values(&self) -> &[f32] {
        if self.edited {
            &self.temp
        } else {
            &self.vec
        }
    }

    /// Re-read contents from the engine
    ///
    /// Ignored while a gesture is in progress. Returns true if anything
    /// visible changed.
    pub fn refresh(&mut self, engine: &dyn Engine) -> bool {
        if self.edited {
            return false;
        }

        let read = engine
            .read_array(&self.name)
            .and_then(|values| Ok((values, engine.array_range(&self.name)?)));

        match read {
            Ok((values, range)) => {
                let changed = self.error || values != self.vec || range != self.range;
                self.vec = values;
                self.range = range;
                self.error = false;
                changed
            }
            Err(e) => {
                if !self.error {
                    log::warn!("Array '{}': {}", self.name, e);
                }
                let changed = !self.error;
                self.error = true;
                changed
            }
        }
    }

    /// Map a normalised pointer position onto `(index, value)`
    ///
    /// `index = floor(x * len)` clamped into the array, `value = max - y * (max - min)`.
    pub fn point_at(&self, x: f32, y: f32) -> Option<(usize, f32)> {
        let len = self.vec.len();
        if len == 0 {
            return None;
        }

        let index = ((x.clamp(0.0, 1.0) * len as f32).floor() as usize).min(len - 1);
        let value = self.range.max - y.clamp(0.0, 1.0) * (self.range.max - self.range.min);
        Some((index, self.range.clamp(value)))
    }

    /// Begin a gesture at a pointer position
    pub fn press(&mut self, x: f32, y: f32) {
        if self.error || self.vec.is_empty() {
            return;
        }

        self.edited = true;
        self.temp = self.vec.clone();
        self.dirty = None;
        self.last_point = None;
        self.drag(x, y);
    }

    /// Continue a gesture, filling every index between the previous sample and this one
    pub fn drag(&mut self, x: f32, y: f32) {
        if !self.edited {
            return;
        }
        let Some((index, value)) = self.point_at(x, y) else {
            return;
        };

        let (from_index, from_value) = self.last_point.unwrap_or((index, value));
        self.draw_line(from_index, from_value, index, value);
        self.last_point = Some((index, value));
    }

    fn draw_line(&mut self, i0: usize, v0: f32, i1: usize, v1: f32) {
        let (lo, hi) = (i0.min(i1), i0.max(i1));
        let span = (i1 as f32) - (i0 as f32);

        for i in lo..=hi {
            self.temp[i] = if span == 0.0 {
                v1
            } else {
                let t = (i as f32 - i0 as f32) / span;
                v0 + t * (v1 - v0)
            };
        }

        self.dirty = Some(match self.dirty {
            Some((start, end)) => (start.min(lo), end.max(hi)),
            None => (lo, hi),
        });
    }

    /// End the gesture, writing the touched span to the engine
    ///
    /// On failure the local edit is dropped and the mirror re-reads the engine.
    pub fn release(&mut self, engine: &dyn Engine) -> EngineResult<()> {
        if !self.edited {
            return Ok(());
        }
        self.edited = false;
        self.last_point = None;

        let Some((start, end)) = self.dirty.take() else {
            return Ok(());
        };

        let result = engine.write_array(&self.name, start, &self.temp[start..=end]);
        match &result {
            Ok(()) => self.vec = std::mem::take(&mut self.temp),
            Err(_) => {
                self.temp.clear();
                self.refresh(engine);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use patchwork_core::engine::MemoryEngine;
    use patchwork_core::Bounds;

    fn engine_with_array(len: usize) -> MemoryEngine {
        let engine = MemoryEngine::new();
        engine.add_array(
            None,
            "table",
            vec![0.0; len],
            ValueRange::new(-1.0, 1.0),
            Bounds::new(0, 0, 200, 140),
        )
        .unwrap();
        engine
    }

    #[test]
    fn test_point_mapping() {
        let engine = engine_with_array(10);
        let array = GraphicalArray::new("table", &engine);

        assert_eq!(array.point_at(0.0, 0.0), Some((0, 1.0)));
        assert_eq!(array.point_at(1.0, 1.0), Some((9, -1.0)));
        let (index, value) = array.point_at(0.55, 0.5).unwrap();
        assert_eq!(index, 5);
        assert_abs_diff_eq!(value, 0.0);
    }

    #[test]
    fn test_fast_drag_leaves_no_gaps() {
        let engine = engine_with_array(10);
        let mut array = GraphicalArray::new("table", &engine);

        array.press(0.05, 0.0); // index 0, value 1.0
        array.drag(0.95, 1.0); // index 9, value -1.0

        let values = array.values();
        assert_abs_diff_eq!(values[0], 1.0);
        assert_abs_diff_eq!(values[9], -1.0);
        for pair in values.windows(2) {
            assert!(pair[1] < pair[0], "interpolated stroke must descend: {:?}", values);
        }
    }

    #[test]
    fn test_engine_sees_nothing_until_release() {
        let engine = engine_with_array(8);
        let mut array = GraphicalArray::new("table", &engine);

        array.press(0.0, 0.0);
        array.drag(0.5, 0.0);
        assert!(engine.read_array("table").unwrap().iter().all(|&v| v == 0.0));

        array.release(&engine).unwrap();
        let stored = engine.read_array("table").unwrap();
        assert_abs_diff_eq!(stored[0], 1.0);
        assert_abs_diff_eq!(stored[4], 1.0);
        assert_abs_diff_eq!(stored[7], 0.0);
        assert_eq!(array.values(), stored.as_slice());
    }

    #[test]
    fn test_refresh_ignored_while_editing() {
        let engine = engine_with_array(4);
        let mut array = GraphicalArray::new("table", &engine);

        array.press(0.0, 0.5);
        engine.push_array("table", vec![0.9; 4]).unwrap();
        assert!(!array.refresh(&engine));
        assert!(array.is_edited());

        array.release(&engine).unwrap();
        assert!(array.refresh(&engine));
        assert_abs_diff_eq!(array.values()[3], 0.9);
    }

    #[test]
    fn test_missing_array_sets_error() {
        let engine = MemoryEngine::new();
        let mut array = GraphicalArray::new("nowhere", &engine);
        assert!(array.has_error());

        array.press(0.5, 0.5);
        assert!(!array.is_edited());
    }
}
