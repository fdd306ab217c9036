//! Parameter reconciliation.
//!
//! Turns caller overrides and the live stack's parameters into the directive
//! list submitted to the control plane.

pub mod filter;
pub mod merge;

pub use filter::filter_to_template;
pub use merge::{directive_summary, merge};

use crate::types::ParameterMap;
use serde_json::Value;

/// Caller-supplied values for the two well-known parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub version: Option<String>,
    pub scale: Option<String>,
}

impl Overrides {
    /// Write the overrides onto `params` under `version_key` / `scale_key`.
    ///
    /// Absent overrides leave any value already in `params` alone. A key that
    /// is already present keeps its position.
    pub fn apply(&self, params: &mut ParameterMap, version_key: &str, scale_key: &str) {
        if let Some(version) = &self.version {
            params.insert(version_key.to_string(), Value::String(version.clone()));
        }
        if let Some(scale) = &self.scale {
            params.insert(scale_key.to_string(), Value::String(scale.clone()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_apply_keeps_file_value_without_override() {
        let mut params = json!({"AppDesiredCount": "2"}).as_object().cloned().unwrap();
        let overrides = Overrides { version: Some("1.4.0".to_string()), scale: None };
        overrides.apply(&mut params, "AppVersion", "AppDesiredCount");

        assert_eq!(
            params.into_iter().collect::<Vec<_>>(),
            vec![
                ("AppDesiredCount".to_string(), json!("2")),
                ("AppVersion".to_string(), json!("1.4.0")),
            ]
        );
    }

    #[test]
    fn test_apply_override_replaces_in_place() {
        let mut params =
            json!({"AppDesiredCount": "2", "Vpc": "vpc-1"}).as_object().cloned().unwrap();
        let overrides = Overrides { version: None, scale: Some("5".to_string()) };
        overrides.apply(&mut params, "AppVersion", "AppDesiredCount");

        assert_eq!(params.keys().collect::<Vec<_>>(), vec!["AppDesiredCount", "Vpc"]);
        assert_eq!(params["AppDesiredCount"], json!("5"));
        assert!(!params.contains_key("AppVersion"));
    }
}
