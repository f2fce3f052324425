//! Link between one widget and its engine object

use patchwork_core::engine::{Engine, EngineResult};
use patchwork_core::sync::{EngineUpdate, ValueSync};
use patchwork_core::{Bounds, ObjectId};

/// Log an engine failure instead of propagating it into the view layer
pub(crate) fn log_failure<T>(result: EngineResult<T>, context: &str) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("{}: {}", context, e);
            None
        }
    }
}

/// Object id, cached geometry and the value mirror
#[derive(Debug, Clone)]
pub struct Binding {
    pub id: ObjectId,
    pub bounds: Bounds,
    pub sync: ValueSync,
}

impl Binding {
    pub fn new(id: ObjectId, engine: &dyn Engine) -> EngineResult<Self> {
        let bounds = engine.bounds(id)?;
        let range = engine.range(id)?;
        let value = engine.value(id)?;
        Ok(Self {
            id,
            bounds,
            sync: ValueSync::new(value, range),
        })
    }

    /// Re-read geometry and range
    pub fn refresh(&mut self, engine: &dyn Engine) {
        if let Some(bounds) = log_failure(engine.bounds(self.id), "bounds") {
            self.bounds = bounds;
        }
        if let Some(range) = log_failure(engine.range(self.id), "range") {
            if range != self.sync.range() {
                self.sync.set_range(range);
            }
        }
    }

    /// Pull the engine's current value through the sync protocol
    pub fn pull(&mut self, engine: &dyn Engine) -> bool {
        log_failure(engine.value(self.id), "value")
            .map(|value| self.sync.receive(value) == EngineUpdate::Applied)
            .unwrap_or(false)
    }

    pub fn start_edition(&mut self, engine: &dyn Engine) {
        if self.sync.is_edited() {
            return;
        }
        self.sync.start_edition();
        log_failure(engine.set_gesture(self.id, true), "gesture start");
    }

    /// End the gesture; true if a buffered engine value was applied
    pub fn stop_edition(&mut self, engine: &dyn Engine) -> bool {
        if !self.sync.is_edited() {
            return false;
        }
        log_failure(engine.set_gesture(self.id, false), "gesture end");
        self.sync.stop_edition()
    }

    pub fn commit_scaled(&mut self, engine: &dyn Engine, value: f32) {
        let original = self.sync.set_value_scaled(value);
        log_failure(engine.set_value(self.id, original), "set value");
    }

    pub fn commit_original(&mut self, engine: &dyn Engine, value: f32) {
        let original = self.sync.set_value_original(value);
        log_failure(engine.set_value(self.id, original), "set value");
    }
}
