//! PdEngine - [`Engine`] implementation over a live libpd instance

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use libpd_rs::functions::receive::{on_bang, on_float};
use libpd_rs::types::Atom;

use super::error::PdResult;
use super::instance::PdInstance;
use super::manifest::{BindingManifest, BoundObject};
use crate::engine::{Engine, EngineError, EngineEvent, EngineNotifier, EngineResult};
use crate::types::{Bounds, GuiKind, ObjectId, ValueRange};

/// How often queued Pd messages are delivered
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Array contents are compared every this many polls
const ARRAY_SCAN_EVERY: u32 = 20;

#[derive(Default)]
struct Mirror {
    objects: BTreeMap<ObjectId, BoundObject>,
    /// Engine-native value per object
    values: HashMap<ObjectId, f32>,
    /// Receive symbol → object
    by_receiver: HashMap<String, ObjectId>,
    /// Last seen array contents, for change detection
    arrays: HashMap<String, Vec<f32>>,
    notifiers: Vec<EngineNotifier>,
    next_id: ObjectId,
}

impl Mirror {
    fn object(&self, id: ObjectId) -> EngineResult<&BoundObject> {
        self.objects.get(&id).ok_or(EngineError::ObjectNotFound(id))
    }

    fn notify(&mut self, event: EngineEvent) {
        self.notifiers.retain(|n| !n.is_disconnected());
        for notifier in &self.notifiers {
            notifier.notify(event.clone());
        }
    }

    fn insert(&mut self, mut object: BoundObject) -> ObjectId {
        self.next_id += 1;
        object.id = self.next_id;
        let id = object.id;
        self.objects.insert(id, object);
        id
    }

    /// Handle a float arriving on a receive symbol (runs inside `poll`)
    fn receive_float(&mut self, source: &str, value: f32) {
        let Some(&id) = self.by_receiver.get(source) else {
            return;
        };
        let Some(object) = self.objects.get(&id) else {
            return;
        };
        let value = object.value_range().normalize(value);
        self.values.insert(id, value);
        self.notify(EngineEvent::ValueChanged { id, value });
    }

    fn receive_bang(&mut self, source: &str) {
        if let Some(&id) = self.by_receiver.get(source) {
            self.notify(EngineEvent::Bang { id });
        }
    }
}

fn lock_mirror(mirror: &Mutex<Mirror>) -> MutexGuard<'_, Mirror> {
    mirror.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Live Pd patch mirrored through a binding manifest
///
/// Lock order is always instance before mirror: receive hooks run with the
/// instance held and lock the mirror, so no method holds the mirror while
/// taking the instance.
pub struct PdEngine {
    instance: Arc<Mutex<PdInstance>>,
    mirror: Arc<Mutex<Mirror>>,
    /// Receiver of the patch canvas (`pd-<file name>`)
    canvas: String,
    stop: Arc<AtomicBool>,
    poller: Option<JoinHandle<()>>,
}

impl PdEngine {
    /// Start libpd, open `patch` and begin mirroring its bound objects
    pub fn open(patch: &Path, search_paths: &[PathBuf], sample_rate: i32) -> PdResult<Self> {
        let manifest = BindingManifest::load_for_patch(patch)?;

        let mut instance = PdInstance::new(sample_rate)?;
        for path in search_paths.iter().filter(|p| p.exists()) {
            instance.add_search_path(path)?;
        }
        instance.open_patch(patch)?;
        instance.set_audio_active(true)?;

        let mut mirror = Mirror::default();
        for object in manifest.objects {
            if let Some(receive) = &object.receive {
                instance.listen(receive)?;
                mirror.by_receiver.insert(receive.clone(), object.id);
            }
            mirror.next_id = mirror.next_id.max(object.id);
            mirror.objects.insert(object.id, object);
        }
        log::info!(
            "PdEngine: mirroring {} objects from {}",
            mirror.objects.len(),
            patch.display()
        );

        let mirror = Arc::new(Mutex::new(mirror));
        register_hooks(&mirror);

        let canvas = format!(
            "pd-{}",
            patch
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        );

        let instance = Arc::new(Mutex::new(instance));
        let stop = Arc::new(AtomicBool::new(false));
        let poller = spawn_poller(instance.clone(), mirror.clone(), stop.clone())?;

        Ok(Self {
            instance,
            mirror,
            canvas,
            stop,
            poller: Some(poller),
        })
    }

    fn mirror(&self) -> MutexGuard<'_, Mirror> {
        lock_mirror(&self.mirror)
    }

    fn with_instance<T>(&self, f: impl FnOnce(&PdInstance) -> PdResult<T>) -> EngineResult<T> {
        let instance = self
            .instance
            .lock()
            .map_err(|_| EngineError::Backend("PD instance lock poisoned".to_string()))?;
        f(&instance).map_err(EngineError::from)
    }

    /// Send symbol of an object, or `Unsupported` if it has none
    fn send_symbol(&self, id: ObjectId, operation: &'static str) -> EngineResult<String> {
        self.mirror()
            .object(id)?
            .send
            .clone()
            .ok_or(EngineError::Unsupported { id, operation })
    }
}

impl Drop for PdEngine {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.poller.take() {
            let _ = handle.join();
        }
    }
}

fn register_hooks(mirror: &Arc<Mutex<Mirror>>) {
    let floats = mirror.clone();
    on_float(move |source: &str, value| {
        lock_mirror(&floats).receive_float(source, f64::from(value) as f32);
    });

    let bangs = mirror.clone();
    on_bang(move |source: &str| {
        lock_mirror(&bangs).receive_bang(source);
    });
}

fn spawn_poller(
    instance: Arc<Mutex<PdInstance>>,
    mirror: Arc<Mutex<Mirror>>,
    stop: Arc<AtomicBool>,
) -> PdResult<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("pd-poll".to_string())
        .spawn(move || {
            let mut ticks: u32 = 0;
            while !stop.load(Ordering::Relaxed) {
                let Ok(guard) = instance.lock() else {
                    log::error!("pd-poll: instance lock poisoned, stopping");
                    return;
                };
                guard.poll();

                ticks = ticks.wrapping_add(1);
                if ticks % ARRAY_SCAN_EVERY == 0 {
                    scan_arrays(&guard, &mirror);
                }
                drop(guard);

                std::thread::sleep(POLL_INTERVAL);
            }
            log::debug!("pd-poll: stopped");
        })?;
    Ok(handle)
}

/// Emit `ArrayChanged` for arrays whose contents moved since the last scan
fn scan_arrays(instance: &PdInstance, mirror: &Mutex<Mirror>) {
    let names: Vec<String> = lock_mirror(mirror)
        .objects
        .values()
        .filter_map(|o| o.array.clone())
        .collect();

    for name in names {
        let Ok(current) = instance.read_array(&name) else {
            continue;
        };
        let mut mirror = lock_mirror(mirror);
        let changed = mirror.arrays.get(&name) != Some(&current);
        if changed {
            let first_seen = !mirror.arrays.contains_key(&name);
            mirror.arrays.insert(name.clone(), current);
            if !first_seen {
                mirror.notify(EngineEvent::ArrayChanged { name });
            }
        }
    }
}

impl Engine for PdEngine {
    fn objects(&self, parent: Option<ObjectId>) -> Vec<ObjectId> {
        self.mirror()
            .objects
            .values()
            .filter(|o| o.parent == parent)
            .map(|o| o.id)
            .collect()
    }

    fn kind(&self, id: ObjectId) -> EngineResult<GuiKind> {
        Ok(self.mirror().object(id)?.kind)
    }

    fn bounds(&self, id: ObjectId) -> EngineResult<Bounds> {
        Ok(self.mirror().object(id)?.bounds)
    }

    fn range(&self, id: ObjectId) -> EngineResult<ValueRange> {
        Ok(self.mirror().object(id)?.value_range())
    }

    fn value(&self, id: ObjectId) -> EngineResult<f32> {
        let mirror = self.mirror();
        mirror.object(id)?;
        Ok(mirror.values.get(&id).copied().unwrap_or(0.0))
    }

    fn set_value(&self, id: ObjectId, value: f32) -> EngineResult<()> {
        let (send, scaled) = {
            let mut mirror = self.mirror();
            let object = mirror.object(id)?;
            let send = object
                .send
                .clone()
                .ok_or(EngineError::Unsupported { id, operation: "set_value" })?;
            let scaled = object.value_range().denormalize(value);
            mirror.values.insert(id, value);
            (send, scaled)
        };
        self.with_instance(|pd| pd.send_float(&send, scaled))
    }

    fn text(&self, id: ObjectId) -> EngineResult<String> {
        Ok(self.mirror().object(id)?.text.clone())
    }

    fn set_text(&self, id: ObjectId, text: &str) -> EngineResult<()> {
        let send = {
            let mut mirror = self.mirror();
            let object = mirror
                .objects
                .get_mut(&id)
                .ok_or(EngineError::ObjectNotFound(id))?;
            object.text = text.to_string();
            object.send.clone()
        };
        // Message boxes take their new content through a `set` message
        match send {
            Some(send) => self.with_instance(|pd| {
                let args: Vec<Atom> = text.split_whitespace().map(atom_from_word).collect();
                pd.send_message(&send, "set", &args)
            }),
            None => Ok(()),
        }
    }

    fn send_bang(&self, id: ObjectId) -> EngineResult<()> {
        let send = self.send_symbol(id, "send_bang")?;
        self.with_instance(|pd| pd.send_bang(&send))
    }

    fn send_list(&self, id: ObjectId, values: &[f32]) -> EngineResult<()> {
        let send = self.send_symbol(id, "send_list")?;
        self.with_instance(|pd| pd.send_list(&send, values))
    }

    fn send_message(&self, id: ObjectId, selector: &str, args: &[f32]) -> EngineResult<()> {
        let send = self.send_symbol(id, "send_message")?;
        self.with_instance(|pd| pd.send_float_message(&send, selector, args))
    }

    fn array_name(&self, id: ObjectId) -> EngineResult<String> {
        self.mirror()
            .object(id)?
            .array
            .clone()
            .ok_or(EngineError::Unsupported { id, operation: "array_name" })
    }

    fn read_array(&self, name: &str) -> EngineResult<Vec<f32>> {
        self.with_instance(|pd| pd.read_array(name))
    }

    fn write_array(&self, name: &str, offset: usize, values: &[f32]) -> EngineResult<()> {
        let size = self.with_instance(|pd| pd.array_len(name))?;
        if offset + values.len() > size {
            return Err(EngineError::ArrayOutOfRange {
                name: name.to_string(),
                offset,
                len: values.len(),
                size,
            });
        }
        self.with_instance(|pd| pd.write_array(name, offset, values))?;

        // Our own write is not a change the UI needs to hear about
        let current = self.read_array(name)?;
        self.mirror().arrays.insert(name.to_string(), current);
        Ok(())
    }

    fn array_range(&self, name: &str) -> EngineResult<ValueRange> {
        let mirror = self.mirror();
        let object = mirror
            .objects
            .values()
            .find(|o| o.array.as_deref() == Some(name))
            .ok_or_else(|| EngineError::ArrayNotFound(name.to_string()))?;
        Ok(object.value_range())
    }

    fn create_object(
        &self,
        parent: Option<ObjectId>,
        name: &str,
        position: (i32, i32),
    ) -> EngineResult<ObjectId> {
        let mut args = vec![
            Atom::from(f64::from(position.0)),
            Atom::from(f64::from(position.1)),
        ];
        args.extend(name.split_whitespace().map(atom_from_word));
        self.with_instance(|pd| pd.send_message(&self.canvas, "obj", &args))?;

        let class = name.split_whitespace().next().unwrap_or_default();
        let kind = GuiKind::from_class_name(class).unwrap_or(GuiKind::Object);
        let (w, h) = kind.default_size();

        let mut mirror = self.mirror();
        let id = mirror.insert(BoundObject {
            id: 0,
            kind,
            parent,
            bounds: Bounds::new(position.0, position.1, w, h),
            range: None,
            send: None,
            receive: None,
            text: name.to_string(),
            array: None,
        });
        mirror.notify(EngineEvent::Synchronise);
        Ok(id)
    }

    fn create_array(
        &self,
        parent: Option<ObjectId>,
        name: &str,
        size: usize,
        position: (i32, i32),
    ) -> EngineResult<ObjectId> {
        let exists = self
            .mirror()
            .objects
            .values()
            .any(|object| object.array.as_deref() == Some(name));
        if exists {
            return Err(EngineError::ArrayExists(name.to_string()));
        }

        let args = [
            Atom::from(f64::from(position.0)),
            Atom::from(f64::from(position.1)),
            Atom::from("array".to_string()),
            Atom::from("define".to_string()),
            Atom::from(name.to_string()),
            Atom::from(size as f64),
        ];
        self.with_instance(|pd| pd.send_message(&self.canvas, "obj", &args))?;

        let (w, h) = GuiKind::Array.default_size();
        let mut mirror = self.mirror();
        let id = mirror.insert(BoundObject {
            id: 0,
            kind: GuiKind::Array,
            parent,
            bounds: Bounds::new(position.0, position.1, w, h),
            range: None,
            send: None,
            receive: None,
            text: String::new(),
            array: Some(name.to_string()),
        });
        mirror.notify(EngineEvent::Synchronise);
        Ok(id)
    }

    fn remove_object(&self, id: ObjectId) -> EngineResult<()> {
        // libpd offers no way to address a single object for deletion
        self.mirror().object(id)?;
        Err(EngineError::Unsupported {
            id,
            operation: "remove_object",
        })
    }

    fn save_patch(&self) -> EngineResult<()> {
        self.with_instance(|pd| pd.send_message(&self.canvas, "menusave", &[]))?;
        log::info!("PdEngine: saved {}", self.canvas);
        Ok(())
    }

    fn subscribe(&self, notifier: EngineNotifier) {
        self.mirror().notifiers.push(notifier);
    }
}

/// Numeric words become floats, everything else a symbol
fn atom_from_word(word: &str) -> Atom {
    match word.parse::<f64>() {
        Ok(number) => Atom::from(number),
        Err(_) => Atom::from(word.to_string()),
    }
}
