//! Editor settings and their on-disk YAML representation
//!
//! Settings live in `<config dir>/patchwork/settings.yaml`. A missing or
//! unreadable file never prevents startup: the editor falls back to
//! [`EditorSettings::default`] and logs why.

mod io;
mod paths;
mod settings;

pub use io::{load_config, save_config};
pub use paths::{default_abstractions_path, default_config_path, CONFIG_FILENAME};
pub use settings::{load_settings, EditorSettings, MAX_LATENCY_SAMPLES};
