//! Standard locations for settings and user abstractions

use std::path::PathBuf;

/// Settings file name inside the application config directory
pub const CONFIG_FILENAME: &str = "settings.yaml";

/// `~/.config/patchwork/settings.yaml` (platform equivalent elsewhere)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("patchwork")
        .join(CONFIG_FILENAME)
}

/// Search path restored by "reset to defaults": `<data dir>/Patchwork/Abstractions`
pub fn default_abstractions_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("Patchwork")
        .join("Abstractions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_path_layout() {
        let path = default_config_path();
        assert!(path.ends_with("patchwork/settings.yaml"));
    }

    #[test]
    fn test_abstractions_path_layout() {
        assert!(default_abstractions_path().ends_with("Patchwork/Abstractions"));
    }
}
