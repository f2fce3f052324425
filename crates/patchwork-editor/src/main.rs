//! Patchwork - patch editor front-end for Pure Data
//!
//! Opens a patch and shows its GUI objects on an editable canvas.
//!
//! ## Usage
//!
//! ```text
//! patchwork [PATCH.pd]
//! ```
//!
//! Built with the `libpd` feature, a patch path opens that patch in an
//! embedded Pd instance. Without it (or without a path) a built-in demo
//! patch runs on the in-memory engine.

mod app;
mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use iced::{window, Size, Task};

use app::{Message, PatchEditor};
use patchwork_core::config::{self, EditorSettings};
use patchwork_core::engine::{event_channel, Engine, DEFAULT_EVENT_CAPACITY};

#[cfg(feature = "libpd")]
const SAMPLE_RATE: i32 = 48_000;

/// Engine plus the name shown in the title bar
fn open_engine(patch: Option<PathBuf>, settings: &EditorSettings) -> (Arc<dyn Engine>, String) {
    #[cfg(feature = "libpd")]
    if let Some(path) = &patch {
        match patchwork_core::pd::PdEngine::open(path, &settings.search_paths, SAMPLE_RATE) {
            Ok(engine) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                return (Arc::new(engine), name);
            }
            Err(e) => log::error!("Could not open {}: {}, running the demo patch", path.display(), e),
        }
    }

    #[cfg(not(feature = "libpd"))]
    {
        let _ = settings;
        if let Some(path) = &patch {
            log::warn!(
                "Built without libpd, ignoring {} and running the demo patch",
                path.display()
            );
        }
    }

    let (engine, handles) = demo::build();
    if let Err(e) = demo::spawn_driver(&engine, handles) {
        log::warn!("Demo driver not started: {}", e);
    }
    let engine: Arc<dyn Engine> = engine;
    (engine, "demo.pd".to_string())
}

fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let patch = std::env::args().nth(1).map(PathBuf::from);

    let config_path = config::default_config_path();
    let settings = config::load_settings(&config_path);
    log::info!(
        "patchwork starting up (latency {} samples, {} search paths)",
        settings.latency_samples,
        settings.search_paths.len()
    );

    let (engine, patch_name) = open_engine(patch, &settings);
    let (notifier, events) = event_channel(DEFAULT_EVENT_CAPACITY);
    engine.subscribe(notifier);

    let window_size = Size::new(settings.window_width, settings.window_height);

    // Boot must be Fn, so everything it hands over is cloned
    iced::application(
        move || {
            let app = PatchEditor::new(
                engine.clone(),
                events.clone(),
                patch_name.clone(),
                settings.clone(),
                config_path.clone(),
            );
            (app, Task::<Message>::none())
        },
        PatchEditor::update,
        PatchEditor::view,
    )
    .subscription(PatchEditor::subscription)
    .theme(PatchEditor::theme)
    .title(PatchEditor::title)
    .window(window::Settings {
        size: window_size,
        exit_on_close_request: false,
        ..Default::default()
    })
    .run()
}
