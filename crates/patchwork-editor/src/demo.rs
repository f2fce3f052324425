//! Built-in demo patch for running without a Pd backend
//!
//! Populates a [`MemoryEngine`] with one of every object kind and starts a
//! driver thread that changes some of them from the engine side, so the
//! engine-to-UI path is visible on screen.

use std::sync::{Arc, Weak};
use std::thread::JoinHandle;
use std::time::Duration;

use patchwork_core::engine::MemoryEngine;
use patchwork_core::{Bounds, GuiKind, ObjectId, ValueRange};

const DRIVER_INTERVAL: Duration = Duration::from_millis(50);

/// Objects the driver thread animates
#[derive(Debug, Clone, Copy)]
pub struct DemoHandles {
    pub meter: ObjectId,
    pub metro: ObjectId,
}

pub fn build() -> (Arc<MemoryEngine>, DemoHandles) {
    let engine = MemoryEngine::new();

    engine.add_text_object(None, GuiKind::Comment, Bounds::new(20, 10, 300, 22), "patchwork demo: every object kind");

    let metro = engine.add_object(None, GuiKind::Bang, Bounds::new(20, 50, 25, 25), ValueRange::UNIT);
    engine.add_object(None, GuiKind::Toggle, Bounds::new(60, 50, 25, 25), ValueRange::UNIT);
    engine.add_object(None, GuiKind::Number, Bounds::new(100, 50, 60, 22), ValueRange::UNBOUNDED);
    engine.add_text_object(None, GuiKind::Message, Bounds::new(180, 50, 80, 22), "440");
    engine.add_text_object(None, GuiKind::Object, Bounds::new(280, 50, 80, 22), "osc~ 440");

    engine.add_object(None, GuiKind::HorizontalSlider, Bounds::new(20, 100, 130, 18), ValueRange::new(0.0, 127.0));
    let meter = engine.add_object(None, GuiKind::VerticalSlider, Bounds::new(170, 100, 18, 130), ValueRange::new(0.0, 1.0));
    engine.add_object(None, GuiKind::HorizontalRadio, Bounds::new(20, 140, 144, 18), ValueRange::new(0.0, 7.0));
    engine.add_object(None, GuiKind::VerticalRadio, Bounds::new(210, 100, 18, 144), ValueRange::new(0.0, 7.0));

    let sine: Vec<f32> = (0..64)
        .map(|i| (i as f32 / 64.0 * std::f32::consts::TAU).sin() * 0.8)
        .collect();
    if let Err(e) = engine.add_array(None, "table1", sine, ValueRange::new(-1.0, 1.0), Bounds::new(260, 100, 200, 140)) {
        log::warn!("Demo array not added: {}", e);
    }

    let graph = engine.add_object(None, GuiKind::GraphOnParent, Bounds::new(20, 270, 160, 100), ValueRange::UNIT);
    engine.add_object(Some(graph), GuiKind::Toggle, Bounds::new(10, 10, 25, 25), ValueRange::UNIT);
    engine.add_object(Some(graph), GuiKind::HorizontalSlider, Bounds::new(10, 50, 130, 18), ValueRange::new(0.0, 1.0));

    let subpatch = engine.add_text_object(None, GuiKind::Subpatch, Bounds::new(200, 270, 100, 22), "pd synth");
    engine.add_text_object(Some(subpatch), GuiKind::Comment, Bounds::new(20, 10, 200, 22), "inside the subpatch");
    engine.add_object(Some(subpatch), GuiKind::Bang, Bounds::new(20, 50, 25, 25), ValueRange::UNIT);
    engine.add_object(Some(subpatch), GuiKind::Number, Bounds::new(60, 50, 60, 22), ValueRange::UNBOUNDED);

    engine.add_object(None, GuiKind::MousePad, Bounds::new(320, 270, 127, 127), ValueRange::UNBOUNDED);

    (Arc::new(engine), DemoHandles { meter, metro })
}

/// Animate the demo from the engine side until the engine is dropped
pub fn spawn_driver(engine: &Arc<MemoryEngine>, handles: DemoHandles) -> std::io::Result<JoinHandle<()>> {
    let engine: Weak<MemoryEngine> = Arc::downgrade(engine);

    std::thread::Builder::new()
        .name("demo-driver".to_string())
        .spawn(move || {
            let mut step: u64 = 0;
            while let Some(engine) = engine.upgrade() {
                let phase = (step % 40) as f32 / 40.0;
                let level = (phase * std::f32::consts::TAU).sin() * 0.5 + 0.5;
                if let Err(e) = engine.push_value(handles.meter, level) {
                    log::warn!("Demo driver stopped: {}", e);
                    return;
                }
                if step % 20 == 0 {
                    if let Err(e) = engine.push_bang(handles.metro) {
                        log::warn!("Demo driver bang failed: {}", e);
                    }
                }
                drop(engine);

                step += 1;
                std::thread::sleep(DRIVER_INTERVAL);
            }
            log::debug!("Demo driver exiting");
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchwork_core::engine::{event_channel, Engine, EngineEvent};

    #[test]
    fn test_demo_covers_every_kind() {
        let (engine, handles) = build();
        let mut kinds: Vec<GuiKind> = Vec::new();
        let mut pending = vec![None];
        while let Some(parent) = pending.pop() {
            for id in engine.objects(parent) {
                kinds.push(engine.kind(id).unwrap());
                pending.push(Some(id));
            }
        }

        for kind in [
            GuiKind::Bang,
            GuiKind::Toggle,
            GuiKind::Message,
            GuiKind::Number,
            GuiKind::HorizontalSlider,
            GuiKind::VerticalSlider,
            GuiKind::HorizontalRadio,
            GuiKind::VerticalRadio,
            GuiKind::Array,
            GuiKind::GraphOnParent,
            GuiKind::Subpatch,
            GuiKind::Comment,
            GuiKind::MousePad,
            GuiKind::Object,
        ] {
            assert!(kinds.contains(&kind), "demo is missing {:?}", kind);
        }
        assert_eq!(engine.kind(handles.meter).unwrap(), GuiKind::VerticalSlider);
    }

    #[test]
    fn test_driver_pushes_from_engine_side_and_stops_with_engine() {
        let (engine, handles) = build();
        let (notifier, events) = event_channel(64);
        engine.subscribe(notifier);

        let driver = spawn_driver(&engine, handles).unwrap();
        let first = events.receiver().recv_timeout(Duration::from_secs(2)).unwrap();
        let second = events.receiver().recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(matches!(first, EngineEvent::ValueChanged { id, .. } if id == handles.meter));
        assert_eq!(second, EngineEvent::Bang { id: handles.metro });

        drop(engine);
        driver.join().unwrap();
    }
}
