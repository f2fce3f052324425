//! Generic YAML load/save for any serde settings type

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Read settings from `path`, falling back to `T::default()`
///
/// Missing files are normal on first launch. Unreadable or malformed files
/// are logged and replaced by defaults rather than aborting startup.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        log::info!("load_config: {:?} not found, using defaults", path);
        return T::default();
    }

    let parsed = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings file: {:?}", path))
        .and_then(|contents| {
            serde_yaml::from_str::<T>(&contents)
                .with_context(|| format!("Failed to parse settings file: {:?}", path))
        });

    match parsed {
        Ok(config) => {
            log::info!("load_config: Loaded settings from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("load_config: {:#}, using defaults", e);
            T::default()
        }
    }
}

/// Write settings to `path` as YAML, creating parent directories
pub fn save_config<T>(config: &T, path: &Path) -> Result<()>
where
    T: Serialize,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create settings directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize settings to YAML")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write settings file: {:?}", path))?;

    log::info!("save_config: Saved settings to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Sample {
        latency: u32,
        label: String,
    }

    #[test]
    fn test_missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Sample = load_config(&dir.path().join("absent.yaml"));
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn test_malformed_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        std::fs::write(&path, "latency: [not a number").unwrap();

        let loaded: Sample = load_config(&path);
        assert_eq!(loaded, Sample::default());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("settings.yaml");
        let sample = Sample {
            latency: 512,
            label: "studio".to_string(),
        };

        save_config(&sample, &path).unwrap();
        let loaded: Sample = load_config(&path);
        assert_eq!(loaded, sample);
    }
}
