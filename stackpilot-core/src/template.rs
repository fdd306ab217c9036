//! Template documents.
//!
//! A template is kept as a JSON value with key order preserved. Only two
//! sections are ever inspected: `Parameters` and the first entry of
//! `Resources.TaskDefinition.Properties.ContainerDefinitions`.

use crate::error::{Result, StackError};
use crate::types::EnvEntry;
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

const CONTAINER_DEFINITIONS_PATH: [&str; 4] =
    ["Resources", "TaskDefinition", "Properties", "ContainerDefinitions"];

/// Parsed template body.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDocument {
    body: Value,
}

impl TemplateDocument {
    /// Parse a template from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTemplate` if the text is not JSON or not a JSON object.
    pub fn parse(content: &str) -> Result<Self> {
        let body: Value = serde_json::from_str(content)
            .map_err(|e| StackError::InvalidTemplate { reason: e.to_string() })?;
        Self::from_value(body)
    }

    pub fn from_value(body: Value) -> Result<Self> {
        if !body.is_object() {
            return Err(StackError::InvalidTemplate {
                reason: "template body must be a JSON object".to_string(),
            });
        }
        Ok(Self { body })
    }

    /// Names declared in the `Parameters` section.
    ///
    /// A template without a `Parameters` section declares none.
    pub fn parameter_names(&self) -> HashSet<&str> {
        self.body
            .get("Parameters")
            .and_then(Value::as_object)
            .map(|params| params.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Replace the first container definition's `Environment` with `env`.
    ///
    /// An empty `env` leaves the template exactly as authored.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTemplate` if `env` is non-empty and the template has no
    /// container definition to receive it.
    pub fn splice_environment(&mut self, env: &[EnvEntry]) -> Result<()> {
        if env.is_empty() {
            return Ok(());
        }

        let environment = serde_json::to_value(env)
            .map_err(|e| StackError::InvalidTemplate { reason: e.to_string() })?;

        let container = self.first_container_mut()?;
        container.insert("Environment".to_string(), environment);
        debug!(entries = env.len(), "Spliced environment into first container definition");
        Ok(())
    }

    /// Serialize for submission.
    pub fn to_body_string(&self) -> Result<String> {
        serde_json::to_string(&self.body)
            .map_err(|e| StackError::InvalidTemplate { reason: e.to_string() })
    }

    fn first_container_mut(&mut self) -> Result<&mut serde_json::Map<String, Value>> {
        let missing = || StackError::InvalidTemplate {
            reason: format!("missing {}[0]", CONTAINER_DEFINITIONS_PATH.join(".")),
        };

        let mut node = &mut self.body;
        for segment in CONTAINER_DEFINITIONS_PATH {
            node = node.get_mut(segment).ok_or_else(missing)?;
        }
        node.get_mut(0).and_then(Value::as_object_mut).ok_or_else(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn container(template: &TemplateDocument, index: usize) -> &Value {
        &template.body["Resources"]["TaskDefinition"]["Properties"]["ContainerDefinitions"][index]
    }

    fn service_template() -> TemplateDocument {
        TemplateDocument::from_value(json!({
            "Parameters": {
                "AppVersion": {"Type": "String"},
                "AppDesiredCount": {"Type": "Number"}
            },
            "Resources": {
                "TaskDefinition": {
                    "Type": "AWS::ECS::TaskDefinition",
                    "Properties": {
                        "ContainerDefinitions": [
                            {"Name": "app", "Environment": [{"Name": "OLD", "Value": "1"}]},
                            {"Name": "sidecar"}
                        ]
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_rejects_non_object() {
        assert!(TemplateDocument::parse("[1, 2]").is_err());
        assert!(TemplateDocument::parse("not json").is_err());
    }

    #[test]
    fn test_parameter_names() {
        let template = service_template();
        let names = template.parameter_names();
        assert_eq!(names.len(), 2);
        assert!(names.contains("AppVersion"));
        assert!(names.contains("AppDesiredCount"));
        assert!(!names.contains("Vpc"));
    }

    #[test]
    fn test_parameter_names_without_section() {
        let template = TemplateDocument::from_value(json!({"Resources": {}})).unwrap();
        assert!(template.parameter_names().is_empty());
    }

    #[test]
    fn test_splice_environment_replaces_first_container() {
        let mut template = service_template();
        template
            .splice_environment(&[EnvEntry::new("FOO", "bar"), EnvEntry::new("FOO", "baz")])
            .unwrap();

        assert_eq!(
            container(&template, 0)["Environment"],
            json!([{"Name": "FOO", "Value": "bar"}, {"Name": "FOO", "Value": "baz"}])
        );
        assert!(container(&template, 1).get("Environment").is_none());
    }

    #[test]
    fn test_splice_empty_environment_is_noop() {
        let mut template = service_template();
        let before = template.clone();
        template.splice_environment(&[]).unwrap();
        assert_eq!(template, before);
        assert_eq!(container(&template, 0)["Environment"], json!([{"Name": "OLD", "Value": "1"}]));
    }

    #[test]
    fn test_splice_without_container_definitions() {
        let mut template = TemplateDocument::from_value(json!({"Parameters": {}})).unwrap();
        let err = template.splice_environment(&[EnvEntry::new("FOO", "bar")]).unwrap_err();
        assert!(matches!(err, StackError::InvalidTemplate { .. }));

        // Nothing to splice, nothing to locate.
        assert!(template.splice_environment(&[]).is_ok());
    }

    #[test]
    fn test_body_string_preserves_key_order() {
        let template = TemplateDocument::parse(r#"{"Zeta": 1, "Alpha": 2}"#).unwrap();
        assert_eq!(template.to_body_string().unwrap(), r#"{"Zeta":1,"Alpha":2}"#);
    }
}
