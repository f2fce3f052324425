//! Narrow interface to the dataflow engine
//!
//! The editor never reaches into engine internals. Widgets only use the
//! [`Engine`] trait: get/set values, query bounds, read/write arrays and
//! create objects. Engine-driven changes travel the other way as
//! [`EngineEvent`]s through an [`EngineNotifier`].
//!
//! ```text
//! ┌──────────────────────┐   EngineEvent (flume, non-blocking)  ┌──────────────────┐
//! │ engine thread        │ ───────────────────────────────────▶ │ UI thread (iced) │
//! │ (audio / pd poller)  │                                      │ GuiObject mirror │
//! │                      │ ◀─────────────────────────────────── │                  │
//! └──────────────────────┘   Engine trait calls (set_value…)    └──────────────────┘
//! ```
//!
//! The notifier side may be called from an audio thread, so it never blocks
//! and never allocates beyond the event itself.

mod bridge;
mod error;
mod memory;

pub use bridge::{event_channel, EngineEvents, EngineNotifier, DEFAULT_EVENT_CAPACITY};
pub use error::{EngineError, EngineResult};
pub use memory::{MemoryEngine, SentMessage};

use crate::types::{Bounds, GuiKind, ObjectId, ValueRange};

/// Notification sent from the engine to the UI
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// An object's value changed on the engine side (normalised for bounded ranges)
    ValueChanged { id: ObjectId, value: f32 },
    /// A bang-like object fired
    Bang { id: ObjectId },
    /// The contents of a named array changed
    ArrayChanged { name: String },
    /// Objects were added or removed, the canvas must be rebuilt
    Synchronise,
}

/// The operations the editor consumes from a dataflow engine
///
/// Values crossing this interface use the engine-native representation:
/// normalised `0..1` for objects with a bounded [`ValueRange`], raw values
/// for unbounded ones. Conversion to the UI range happens in
/// [`ValueSync`](crate::sync::ValueSync).
pub trait Engine: Send + Sync {
    /// Ids of the GUI objects on a canvas (`None` = top-level patch)
    fn objects(&self, parent: Option<ObjectId>) -> Vec<ObjectId>;

    fn kind(&self, id: ObjectId) -> EngineResult<GuiKind>;

    fn bounds(&self, id: ObjectId) -> EngineResult<Bounds>;

    fn range(&self, id: ObjectId) -> EngineResult<ValueRange>;

    fn value(&self, id: ObjectId) -> EngineResult<f32>;

    fn set_value(&self, id: ObjectId, value: f32) -> EngineResult<()>;

    /// Text content of message boxes, comments and subpatch labels
    fn text(&self, id: ObjectId) -> EngineResult<String>;

    fn set_text(&self, id: ObjectId, text: &str) -> EngineResult<()>;

    fn send_bang(&self, id: ObjectId) -> EngineResult<()>;

    fn send_list(&self, id: ObjectId, values: &[f32]) -> EngineResult<()>;

    fn send_message(&self, id: ObjectId, selector: &str, args: &[f32]) -> EngineResult<()>;

    /// Mark the start/end of a user gesture on an object
    fn set_gesture(&self, _id: ObjectId, _active: bool) -> EngineResult<()> {
        Ok(())
    }

    /// Name of the array shown by an array/graph object
    fn array_name(&self, id: ObjectId) -> EngineResult<String>;

    fn read_array(&self, name: &str) -> EngineResult<Vec<f32>>;

    fn write_array(&self, name: &str, offset: usize, values: &[f32]) -> EngineResult<()>;

    /// Display range of an array (top edge = `max`)
    fn array_range(&self, name: &str) -> EngineResult<ValueRange>;

    /// Create an object from its class name at a canvas position
    fn create_object(
        &self,
        parent: Option<ObjectId>,
        name: &str,
        position: (i32, i32),
    ) -> EngineResult<ObjectId>;

    /// Create a named array of `size` zeroed floats, shown in a graph
    ///
    /// Fails with `ArrayExists` if the name is taken.
    fn create_array(
        &self,
        parent: Option<ObjectId>,
        name: &str,
        size: usize,
        position: (i32, i32),
    ) -> EngineResult<ObjectId>;

    fn remove_object(&self, id: ObjectId) -> EngineResult<()>;

    /// Ask the engine to write the open patch back to disk
    fn save_patch(&self) -> EngineResult<()>;

    /// Register a notifier for engine-driven changes
    fn subscribe(&self, notifier: EngineNotifier);
}
