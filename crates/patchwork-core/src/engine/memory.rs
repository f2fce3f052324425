//! In-process engine
//!
//! `MemoryEngine` keeps the whole patch state in memory. It stands in for the
//! dataflow runtime when no libpd backend is compiled in, and drives the
//! widget tests. The `push_*` methods simulate the engine changing state on
//! its own (e.g. from a running patch) and emit the matching [`EngineEvent`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use super::{Engine, EngineError, EngineEvent, EngineNotifier, EngineResult};
use crate::types::{Bounds, GuiKind, ObjectId, ValueRange};

/// Size of arrays created through `create_object("array", ..)`
const DEFAULT_ARRAY_SIZE: usize = 100;

/// Outbound message recorded by the engine (for inspection and tests)
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Bang(ObjectId),
    List(ObjectId, Vec<f32>),
    Message(ObjectId, String, Vec<f32>),
}

#[derive(Debug, Clone)]
struct MemoryObject {
    parent: Option<ObjectId>,
    kind: GuiKind,
    bounds: Bounds,
    range: ValueRange,
    value: f32,
    text: String,
    array: Option<String>,
}

impl MemoryObject {
    /// Store an engine-native value, clamped to `0..1` for bounded ranges
    fn store_value(&mut self, value: f32) -> f32 {
        self.value = if self.range.is_bounded() {
            value.clamp(0.0, 1.0)
        } else {
            value
        };
        self.value
    }
}

#[derive(Debug, Clone)]
struct MemoryArray {
    values: Vec<f32>,
    range: ValueRange,
}

#[derive(Debug, Default)]
struct State {
    next_id: ObjectId,
    objects: BTreeMap<ObjectId, MemoryObject>,
    arrays: HashMap<String, MemoryArray>,
    notifiers: Vec<EngineNotifier>,
    sent: Vec<SentMessage>,
    gestures: HashMap<ObjectId, bool>,
    saves: usize,
}

impl State {
    fn object(&self, id: ObjectId) -> EngineResult<&MemoryObject> {
        self.objects.get(&id).ok_or(EngineError::ObjectNotFound(id))
    }

    fn object_mut(&mut self, id: ObjectId) -> EngineResult<&mut MemoryObject> {
        self.objects.get_mut(&id).ok_or(EngineError::ObjectNotFound(id))
    }

    fn notify(&mut self, event: EngineEvent) {
        self.notifiers.retain(|n| !n.is_disconnected());
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    fn insert(&mut self, object: MemoryObject) -> ObjectId {
        self.next_id += 1;
        let id = self.next_id;
        self.objects.insert(id, object);
        id
    }
}

/// Engine implementation backed by plain in-memory data
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: Mutex<State>,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // A panic while holding the lock leaves plain data behind, keep going
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Add an object with explicit geometry and range
    pub fn add_object(
        &self,
        parent: Option<ObjectId>,
        kind: GuiKind,
        bounds: Bounds,
        range: ValueRange,
    ) -> ObjectId {
        let mut state = self.lock();
        state.insert(MemoryObject {
            parent,
            kind,
            bounds,
            range,
            value: 0.0,
            text: String::new(),
            array: None,
        })
    }

    /// Add an object carrying text (message box, comment, subpatch name)
    pub fn add_text_object(
        &self,
        parent: Option<ObjectId>,
        kind: GuiKind,
        bounds: Bounds,
        text: &str,
    ) -> ObjectId {
        let id = self.add_object(parent, kind, bounds, kind.default_range());
        if let Ok(object) = self.lock().object_mut(id) {
            object.text = text.to_string();
        }
        id
    }

    /// Add a named array shown in a graph object
    ///
    /// Array names are unique; an existing array is never replaced.
    pub fn add_array(
        &self,
        parent: Option<ObjectId>,
        name: &str,
        values: Vec<f32>,
        range: ValueRange,
        bounds: Bounds,
    ) -> EngineResult<ObjectId> {
        let mut state = self.lock();
        if state.arrays.contains_key(name) {
            return Err(EngineError::ArrayExists(name.to_string()));
        }
        if let Some(parent_id) = parent {
            state.object(parent_id)?;
        }
        state
            .arrays
            .insert(name.to_string(), MemoryArray { values, range });
        Ok(state.insert(MemoryObject {
            parent,
            kind: GuiKind::Array,
            bounds,
            range,
            value: 0.0,
            text: name.to_string(),
            array: Some(name.to_string()),
        }))
    }

    /// Engine-driven value change
    pub fn push_value(&self, id: ObjectId, value: f32) -> EngineResult<()> {
        let mut state = self.lock();
        let value = state.object_mut(id)?.store_value(value);
        state.notify(EngineEvent::ValueChanged { id, value });
        Ok(())
    }

    /// Engine-driven bang (e.g. a `[bng]` receiving from the patch)
    pub fn push_bang(&self, id: ObjectId) -> EngineResult<()> {
        let mut state = self.lock();
        state.object(id)?;
        state.notify(EngineEvent::Bang { id });
        Ok(())
    }

    /// Engine-driven array rewrite
    pub fn push_array(&self, name: &str, values: Vec<f32>) -> EngineResult<()> {
        let mut state = self.lock();
        let array = state
            .arrays
            .get_mut(name)
            .ok_or_else(|| EngineError::ArrayNotFound(name.to_string()))?;
        array.values = values;
        state.notify(EngineEvent::ArrayChanged {
            name: name.to_string(),
        });
        Ok(())
    }

    /// Messages sent to the engine so far (oldest first), clearing the log
    pub fn take_sent(&self) -> Vec<SentMessage> {
        std::mem::take(&mut self.lock().sent)
    }

    /// Whether a user gesture is currently marked active on an object
    pub fn gesture_active(&self, id: ObjectId) -> bool {
        self.lock().gestures.get(&id).copied().unwrap_or(false)
    }

    /// Number of times the patch was saved
    pub fn save_count(&self) -> usize {
        self.lock().saves
    }

    fn unique_array_name(state: &State) -> String {
        (1..)
            .map(|n| format!("array{}", n))
            .find(|name| !state.arrays.contains_key(name))
            .unwrap_or_else(|| "array".to_string())
    }
}

impl Engine for MemoryEngine {
    fn objects(&self, parent: Option<ObjectId>) -> Vec<ObjectId> {
        self.lock()
            .objects
            .iter()
            .filter(|(_, object)| object.parent == parent)
            .map(|(id, _)| *id)
            .collect()
    }

    fn kind(&self, id: ObjectId) -> EngineResult<GuiKind> {
        Ok(self.lock().object(id)?.kind)
    }

    fn bounds(&self, id: ObjectId) -> EngineResult<Bounds> {
        Ok(self.lock().object(id)?.bounds)
    }

    fn range(&self, id: ObjectId) -> EngineResult<ValueRange> {
        Ok(self.lock().object(id)?.range)
    }

    fn value(&self, id: ObjectId) -> EngineResult<f32> {
        Ok(self.lock().object(id)?.value)
    }

    fn set_value(&self, id: ObjectId, value: f32) -> EngineResult<()> {
        self.lock().object_mut(id)?.store_value(value);
        Ok(())
    }

    fn text(&self, id: ObjectId) -> EngineResult<String> {
        Ok(self.lock().object(id)?.text.clone())
    }

    fn set_text(&self, id: ObjectId, text: &str) -> EngineResult<()> {
        self.lock().object_mut(id)?.text = text.to_string();
        Ok(())
    }

    fn send_bang(&self, id: ObjectId) -> EngineResult<()> {
        let mut state = self.lock();
        state.object(id)?;
        state.sent.push(SentMessage::Bang(id));
        Ok(())
    }

    fn send_list(&self, id: ObjectId, values: &[f32]) -> EngineResult<()> {
        let mut state = self.lock();
        state.object(id)?;
        state.sent.push(SentMessage::List(id, values.to_vec()));
        Ok(())
    }

    fn send_message(&self, id: ObjectId, selector: &str, args: &[f32]) -> EngineResult<()> {
        let mut state = self.lock();
        state.object(id)?;
        state
            .sent
            .push(SentMessage::Message(id, selector.to_string(), args.to_vec()));
        Ok(())
    }

    fn set_gesture(&self, id: ObjectId, active: bool) -> EngineResult<()> {
        let mut state = self.lock();
        state.object(id)?;
        state.gestures.insert(id, active);
        Ok(())
    }

    fn array_name(&self, id: ObjectId) -> EngineResult<String> {
        self.lock()
            .object(id)?
            .array
            .clone()
            .ok_or(EngineError::Unsupported {
                id,
                operation: "array_name",
            })
    }

    fn read_array(&self, name: &str) -> EngineResult<Vec<f32>> {
        self.lock()
            .arrays
            .get(name)
            .map(|array| array.values.clone())
            .ok_or_else(|| EngineError::ArrayNotFound(name.to_string()))
    }

    fn write_array(&self, name: &str, offset: usize, values: &[f32]) -> EngineResult<()> {
        let mut state = self.lock();
        let array = state
            .arrays
            .get_mut(name)
            .ok_or_else(|| EngineError::ArrayNotFound(name.to_string()))?;

        let size = array.values.len();
        if offset + values.len() > size {
            return Err(EngineError::ArrayOutOfRange {
                name: name.to_string(),
                offset,
                len: values.len(),
                size,
            });
        }

        array.values[offset..offset + values.len()].copy_from_slice(values);
        Ok(())
    }

    fn array_range(&self, name: &str) -> EngineResult<ValueRange> {
        self.lock()
            .arrays
            .get(name)
            .map(|array| array.range)
            .ok_or_else(|| EngineError::ArrayNotFound(name.to_string()))
    }

    fn create_object(
        &self,
        parent: Option<ObjectId>,
        name: &str,
        position: (i32, i32),
    ) -> EngineResult<ObjectId> {
        let kind = GuiKind::from_class_name(name).unwrap_or(GuiKind::Object);

        if kind == GuiKind::Array {
            let array_name = Self::unique_array_name(&self.lock());
            return self.create_array(parent, &array_name, DEFAULT_ARRAY_SIZE, position);
        }

        let (w, h) = kind.default_size();
        let text = match kind {
            GuiKind::Object | GuiKind::Message | GuiKind::Comment => name.to_string(),
            GuiKind::Subpatch => "pd subpatch".to_string(),
            _ => String::new(),
        };

        let mut state = self.lock();
        if let Some(parent_id) = parent {
            state.object(parent_id)?;
        }
        let id = state.insert(MemoryObject {
            parent,
            kind,
            bounds: Bounds::new(position.0, position.1, w, h),
            range: kind.default_range(),
            value: 0.0,
            text,
            array: None,
        });
        state.notify(EngineEvent::Synchronise);

        log::debug!("MemoryEngine: created '{}' as {:?} (id={})", name, kind, id);
        Ok(id)
    }

    fn create_array(
        &self,
        parent: Option<ObjectId>,
        name: &str,
        size: usize,
        position: (i32, i32),
    ) -> EngineResult<ObjectId> {
        let (w, h) = GuiKind::Array.default_size();
        let range = GuiKind::Array.default_range();

        let id = self.add_array(
            parent,
            name,
            vec![0.0; size],
            range,
            Bounds::new(position.0, position.1, w, h),
        )?;
        self.lock().notify(EngineEvent::Synchronise);

        log::debug!("MemoryEngine: created array '{}' of size {} (id={})", name, size, id);
        Ok(id)
    }

    fn remove_object(&self, id: ObjectId) -> EngineResult<()> {
        let mut state = self.lock();
        state.object(id)?;

        // Remove the object and everything nested inside it
        let mut pending = vec![id];
        while let Some(current) = pending.pop() {
            if let Some(object) = state.objects.remove(&current) {
                if let Some(array) = object.array {
                    state.arrays.remove(&array);
                }
            }
            pending.extend(
                state
                    .objects
                    .iter()
                    .filter(|(_, object)| object.parent == Some(current))
                    .map(|(child, _)| *child),
            );
        }

        state.notify(EngineEvent::Synchronise);
        Ok(())
    }

    fn save_patch(&self) -> EngineResult<()> {
        self.lock().saves += 1;
        log::debug!("MemoryEngine: patch saved");
        Ok(())
    }

    fn subscribe(&self, notifier: EngineNotifier) {
        self.lock().notifiers.push(notifier);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::event_channel;

    #[test]
    fn test_push_value_notifies_subscribers() {
        let engine = MemoryEngine::new();
        let (notifier, events) = event_channel(8);
        engine.subscribe(notifier);

        let id = engine.add_object(None, GuiKind::HorizontalSlider, Bounds::default(), ValueRange::new(0.0, 127.0));
        engine.push_value(id, 0.5).unwrap();

        assert_eq!(events.drain(), vec![EngineEvent::ValueChanged { id, value: 0.5 }]);
        assert_eq!(engine.value(id).unwrap(), 0.5);
    }

    #[test]
    fn test_set_value_from_ui_does_not_echo() {
        let engine = MemoryEngine::new();
        let (notifier, events) = event_channel(8);
        engine.subscribe(notifier);

        let id = engine.add_object(None, GuiKind::Toggle, Bounds::default(), ValueRange::UNIT);
        engine.set_value(id, 1.0).unwrap();

        assert!(events.drain().is_empty());
        assert_eq!(engine.value(id).unwrap(), 1.0);
    }

    #[test]
    fn test_write_array_bounds_checked() {
        let engine = MemoryEngine::new();
        engine
            .add_array(None, "table", vec![0.0; 4], ValueRange::new(-1.0, 1.0), Bounds::default())
            .unwrap();

        engine.write_array("table", 2, &[0.5, 0.25]).unwrap();
        assert_eq!(engine.read_array("table").unwrap(), vec![0.0, 0.0, 0.5, 0.25]);

        let err = engine.write_array("table", 3, &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, EngineError::ArrayOutOfRange { size: 4, .. }));
        assert!(matches!(engine.read_array("missing"), Err(EngineError::ArrayNotFound(_))));
    }

    #[test]
    fn test_duplicate_array_name_keeps_existing_data() {
        let engine = MemoryEngine::new();
        let first = engine.create_array(None, "array1", 10, (0, 0)).unwrap();
        engine.write_array("array1", 0, &[0.5; 10]).unwrap();

        let err = engine.create_array(None, "array1", 5, (40, 40)).unwrap_err();
        assert!(matches!(err, EngineError::ArrayExists(ref name) if name == "array1"));

        assert_eq!(engine.objects(None), vec![first]);
        assert_eq!(engine.read_array("array1").unwrap(), vec![0.5; 10]);
    }

    #[test]
    fn test_set_value_clamped_like_push_value() {
        let engine = MemoryEngine::new();
        let slider = engine.add_object(None, GuiKind::HorizontalSlider, Bounds::default(), ValueRange::new(0.0, 127.0));
        let number = engine.add_object(None, GuiKind::Number, Bounds::default(), ValueRange::UNBOUNDED);

        engine.set_value(slider, 1.5).unwrap();
        assert_eq!(engine.value(slider).unwrap(), 1.0);
        engine.push_value(slider, -0.5).unwrap();
        assert_eq!(engine.value(slider).unwrap(), 0.0);

        engine.set_value(number, 300.0).unwrap();
        assert_eq!(engine.value(number).unwrap(), 300.0);
    }

    #[test]
    fn test_create_object_resolves_kind_and_synchronises() {
        let engine = MemoryEngine::new();
        let (notifier, events) = event_channel(8);
        engine.subscribe(notifier);

        let slider = engine.create_object(None, "vsl", (10, 20)).unwrap();
        let plain = engine.create_object(None, "osc~", (0, 0)).unwrap();

        assert_eq!(engine.kind(slider).unwrap(), GuiKind::VerticalSlider);
        assert_eq!(engine.bounds(slider).unwrap(), Bounds::new(10, 20, 18, 130));
        assert_eq!(engine.kind(plain).unwrap(), GuiKind::Object);
        assert_eq!(engine.text(plain).unwrap(), "osc~");
        assert_eq!(events.drain(), vec![EngineEvent::Synchronise, EngineEvent::Synchronise]);
    }

    #[test]
    fn test_create_array_via_object_name_gets_unique_name() {
        let engine = MemoryEngine::new();
        let first = engine.create_object(None, "array", (0, 0)).unwrap();
        let second = engine.create_object(None, "array", (0, 0)).unwrap();

        assert_eq!(engine.array_name(first).unwrap(), "array1");
        assert_eq!(engine.array_name(second).unwrap(), "array2");
        assert_eq!(engine.read_array("array2").unwrap().len(), DEFAULT_ARRAY_SIZE);
    }

    #[test]
    fn test_remove_object_removes_children() {
        let engine = MemoryEngine::new();
        let graph = engine.create_object(None, "graph", (0, 0)).unwrap();
        let child = engine.create_array(Some(graph), "inner", 8, (0, 0)).unwrap();

        assert_eq!(engine.objects(Some(graph)), vec![child]);
        engine.remove_object(graph).unwrap();

        assert!(engine.objects(None).is_empty());
        assert!(matches!(engine.kind(child), Err(EngineError::ObjectNotFound(_))));
        assert!(engine.read_array("inner").is_err());
    }

    #[test]
    fn test_outbound_messages_recorded() {
        let engine = MemoryEngine::new();
        let pad = engine.create_object(None, "pad", (0, 0)).unwrap();

        engine.send_message(pad, "click", &[1.0]).unwrap();
        engine.send_list(pad, &[3.0, 4.0]).unwrap();

        assert_eq!(
            engine.take_sent(),
            vec![
                SentMessage::Message(pad, "click".to_string(), vec![1.0]),
                SentMessage::List(pad, vec![3.0, 4.0]),
            ]
        );
        assert!(engine.take_sent().is_empty());
    }

    #[test]
    fn test_save_counted() {
        let engine = MemoryEngine::new();
        assert_eq!(engine.save_count(), 0);
        engine.save_patch().unwrap();
        engine.save_patch().unwrap();
        assert_eq!(engine.save_count(), 2);
    }
}
