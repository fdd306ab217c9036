//! Configuration management.

use crate::error::{Result, StackError};
use crate::paths;
use crate::types::{StackEvent, TagEntry};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Persistent configuration for stackpilot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Template parameter that carries the application version
    pub version_parameter: String,
    /// Template parameter that carries the desired task count
    pub scale_parameter: String,
    /// Version argument meaning "keep the deployed version"
    pub current_version: String,
    pub default_tags: Vec<TagEntry>,
    pub capabilities: Vec<String>,
    pub region: Option<String>,
    pub log_level: String,
    pub wait: WaitTimeouts,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version_parameter: "AppVersion".to_string(),
            scale_parameter: "AppDesiredCount".to_string(),
            current_version: "current".to_string(),
            default_tags: vec![TagEntry::new("ComponentType", "ECS-Service")],
            capabilities: vec!["CAPABILITY_IAM".to_string()],
            region: None,
            log_level: "info".to_string(),
            wait: WaitTimeouts::default(),
        }
    }
}

/// Upper bound on each post-submission wait, in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitTimeouts {
    pub exists_secs: u64,
    pub create_secs: u64,
    pub update_secs: u64,
    pub delete_secs: u64,
}

impl Default for WaitTimeouts {
    fn default() -> Self {
        Self { exists_secs: 100, create_secs: 3600, update_secs: 3600, delete_secs: 3600 }
    }
}

impl WaitTimeouts {
    pub fn for_event(&self, event: StackEvent) -> Duration {
        let secs = match event {
            StackEvent::Exists => self.exists_secs,
            StackEvent::CreateComplete => self.create_secs,
            StackEvent::UpdateComplete => self.update_secs,
            StackEvent::DeleteComplete => self.delete_secs,
        };
        Duration::from_secs(secs)
    }
}

impl Config {
    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        paths::config_file()
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let explicit = path.is_some();
        let path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| StackError::InvalidConfig {
            reason: format!("Failed to read config {}: {}", path.display(), e),
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|e| StackError::InvalidConfig {
            reason: format!("Failed to parse config {}: {}", path.display(), e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check cross-field constraints serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.version_parameter.is_empty() || self.scale_parameter.is_empty() {
            return Err(StackError::InvalidConfig {
                reason: "version_parameter and scale_parameter must not be empty".to_string(),
            });
        }
        if self.version_parameter == self.scale_parameter {
            return Err(StackError::InvalidConfig {
                reason: "version_parameter and scale_parameter must differ".to_string(),
            });
        }
        if self.wait.for_event(StackEvent::Exists).is_zero() {
            return Err(StackError::InvalidConfig {
                reason: "wait.exists_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
