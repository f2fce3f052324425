//! Persisted editor settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::io::load_config;
use super::paths::default_abstractions_path;

/// Upper bound of the audio latency field (two seconds at 44.1 kHz)
pub const MAX_LATENCY_SAMPLES: u32 = 88_200;

/// Smallest window edge restored from settings
const MIN_WINDOW_EDGE: f32 = 200.0;

/// Load settings from `path` and clamp hand-edited values into range
pub fn load_settings(path: &Path) -> EditorSettings {
    let mut settings: EditorSettings = load_config(path);
    settings.validate();
    settings
}

/// Everything the settings dialog edits, plus window geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Engine audio latency in samples
    pub latency_samples: u32,
    /// Directories searched for abstractions, in lookup order
    pub search_paths: Vec<PathBuf>,
    pub window_width: f32,
    pub window_height: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            latency_samples: 256,
            search_paths: vec![default_abstractions_path()],
            window_width: 1200.0,
            window_height: 800.0,
        }
    }
}

impl EditorSettings {
    /// Store a latency value, clamped to the accepted range
    pub fn set_latency(&mut self, samples: u32) -> u32 {
        self.latency_samples = samples.min(MAX_LATENCY_SAMPLES);
        self.latency_samples
    }

    /// Clamp values that may come from a hand-edited file
    pub fn validate(&mut self) {
        if self.latency_samples > MAX_LATENCY_SAMPLES {
            log::warn!(
                "Latency of {} samples out of range, using {}",
                self.latency_samples,
                MAX_LATENCY_SAMPLES
            );
            self.set_latency(self.latency_samples);
        }

        let defaults = Self::default();
        if !(self.window_width.is_finite() && self.window_width >= MIN_WINDOW_EDGE) {
            self.window_width = defaults.window_width;
        }
        if !(self.window_height.is_finite() && self.window_height >= MIN_WINDOW_EDGE) {
            self.window_height = defaults.window_height;
        }
    }

    /// Append a search path unless it is already present
    ///
    /// Returns false for duplicates and empty paths.
    pub fn add_search_path(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        if path.as_os_str().is_empty() || self.search_paths.iter().any(|p| p == path) {
            return false;
        }
        self.search_paths.push(path.to_path_buf());
        true
    }

    pub fn remove_search_path(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.search_paths.len()).then(|| self.search_paths.remove(index))
    }

    pub fn reset_search_paths(&mut self) {
        self.search_paths = vec![default_abstractions_path()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_is_clamped() {
        let mut settings = EditorSettings::default();
        assert_eq!(settings.set_latency(100_000), MAX_LATENCY_SAMPLES);
        assert_eq!(settings.set_latency(64), 64);
    }

    #[test]
    fn test_search_path_editing() {
        let mut settings = EditorSettings::default();
        assert!(settings.add_search_path("/tmp/abs"));
        assert!(!settings.add_search_path("/tmp/abs"));
        assert!(!settings.add_search_path(""));
        assert_eq!(settings.search_paths.len(), 2);

        assert_eq!(settings.remove_search_path(1), Some(PathBuf::from("/tmp/abs")));
        assert_eq!(settings.remove_search_path(7), None);

        settings.search_paths.clear();
        settings.reset_search_paths();
        assert_eq!(settings.search_paths, vec![default_abstractions_path()]);
    }

    #[test]
    fn test_loaded_settings_are_validated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "latency_samples: 4000000000\nwindow_width: -5.0\nwindow_height: 600.0\n").unwrap();

        let settings = load_settings(&path);
        assert_eq!(settings.latency_samples, MAX_LATENCY_SAMPLES);
        assert_eq!(settings.window_width, 1200.0);
        assert_eq!(settings.window_height, 600.0);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let settings: EditorSettings = serde_yaml::from_str("latency_samples: 1024\n").unwrap();
        assert_eq!(settings.latency_samples, 1024);
        assert_eq!(settings.window_width, 1200.0);
        assert_eq!(settings.search_paths, vec![default_abstractions_path()]);
    }
}
