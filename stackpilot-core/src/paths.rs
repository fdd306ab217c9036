//! Centralized path configuration for stackpilot.

use std::path::PathBuf;

/// Get the stackpilot configuration directory.
///
/// Resolution order:
/// 1. `STACKPILOT_CONFIG_DIR` environment variable
/// 2. `<platform config dir>/stackpilot` (e.g. `~/.config/stackpilot`)
/// 3. `./.stackpilot` when no home directory can be determined
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STACKPILOT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }

    dirs::config_dir()
        .map(|d| d.join("stackpilot"))
        .unwrap_or_else(|| PathBuf::from(".stackpilot"))
}

/// Get the configuration file path.
///
/// `STACKPILOT_CONFIG` overrides the file location entirely.
pub fn config_file() -> PathBuf {
    if let Ok(file) = std::env::var("STACKPILOT_CONFIG") {
        return PathBuf::from(file);
    }
    config_dir().join("config.json")
}
