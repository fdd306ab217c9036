//! Parameter merge engine.
//!
//! Computes the exhaustive directive list for a create/update submission. The
//! control plane drops every parameter a submission does not mention, so every
//! live parameter that should survive must come back as a directive.

use crate::types::{is_truthy, parameter_text, ParameterDirective, ParameterMap};
use std::collections::HashSet;

/// Merge caller-supplied parameters with the live stack's parameters.
///
/// 1. Each truthy entry of `new` (in `new` order) becomes `UsePrevious` when the
///    live value is identical, otherwise an explicit `Value`.
/// 2. Each live key not provided truthily in `new` (in `existing` order)
///    becomes `UsePrevious`.
///
/// Falsy entries of `new` without a live value produce nothing.
pub fn merge(existing: &ParameterMap, new: &ParameterMap) -> Vec<ParameterDirective> {
    let provided: Vec<(&String, &serde_json::Value)> =
        new.iter().filter(|(_, value)| is_truthy(value)).collect();

    let mut directives: Vec<ParameterDirective> = provided
        .iter()
        .map(|(key, value)| match existing.get(key.as_str()) {
            Some(live) if live == *value => ParameterDirective::use_previous(key.as_str()),
            _ => ParameterDirective::value(key.as_str(), parameter_text(value)),
        })
        .collect();

    let provided_keys: HashSet<&str> = provided.iter().map(|(key, _)| key.as_str()).collect();
    directives.extend(
        existing
            .keys()
            .filter(|key| !provided_keys.contains(key.as_str()))
            .map(|key| ParameterDirective::use_previous(key.as_str())),
    );

    directives
}

/// Effective value of `key` in a directive list, for logging.
///
/// `UsePrevious` reads as `"current"`.
pub fn directive_summary(directives: &[ParameterDirective], key: &str) -> Option<String> {
    directives.iter().find(|d| d.key() == key).map(|d| match d {
        ParameterDirective::Value { value, .. } => value.clone(),
        ParameterDirective::UsePrevious { .. } => "current".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: serde_json::Value) -> ParameterMap {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_merge_empty_new_keeps_everything() {
        let existing = map(json!({"AppVersion": "1.0.0", "AppDesiredCount": "2", "Vpc": "vpc-1"}));
        let result = merge(&existing, &ParameterMap::new());

        assert_eq!(
            result,
            vec![
                ParameterDirective::use_previous("AppVersion"),
                ParameterDirective::use_previous("AppDesiredCount"),
                ParameterDirective::use_previous("Vpc"),
            ]
        );
    }

    #[test]
    fn test_merge_equal_value_uses_previous() {
        let existing = map(json!({"AppVersion": "1.0.0"}));
        let new = map(json!({"AppVersion": "1.0.0"}));

        assert_eq!(merge(&existing, &new), vec![ParameterDirective::use_previous("AppVersion")]);
    }

    #[test]
    fn test_merge_changed_value_is_explicit() {
        let existing = map(json!({"AppVersion": "1.0.0", "AppDesiredCount": "2"}));
        let new = map(json!({"AppVersion": "1.1.0"}));

        assert_eq!(
            merge(&existing, &new),
            vec![
                ParameterDirective::value("AppVersion", "1.1.0"),
                ParameterDirective::use_previous("AppDesiredCount"),
            ]
        );
    }

    #[test]
    fn test_merge_falsy_values_fall_back() {
        let existing = map(json!({"A": "a", "B": "b", "C": "c", "D": "d"}));
        let new = map(json!({"A": "", "B": null, "C": 0, "D": false, "E": ""}));

        let result = merge(&existing, &new);
        assert_eq!(
            result,
            vec![
                ParameterDirective::use_previous("A"),
                ParameterDirective::use_previous("B"),
                ParameterDirective::use_previous("C"),
                ParameterDirective::use_previous("D"),
            ]
        );
        assert!(result.iter().all(|d| d.key() != "E"));
    }

    #[test]
    fn test_merge_string_zero_survives() {
        let existing = map(json!({"AppDesiredCount": "2"}));
        let new = map(json!({"AppDesiredCount": "0"}));

        assert_eq!(merge(&existing, &new), vec![ParameterDirective::value("AppDesiredCount", "0")]);
    }

    #[test]
    fn test_merge_type_mismatch_is_not_equal() {
        let existing = map(json!({"AppDesiredCount": "2"}));
        let new = map(json!({"AppDesiredCount": 2}));

        assert_eq!(merge(&existing, &new), vec![ParameterDirective::value("AppDesiredCount", "2")]);
    }

    #[test]
    fn test_merge_first_create() {
        let new = map(json!({"AppDesiredCount": "2", "AppVersion": "1.4.0", "Unset": ""}));

        assert_eq!(
            merge(&ParameterMap::new(), &new),
            vec![
                ParameterDirective::value("AppDesiredCount", "2"),
                ParameterDirective::value("AppVersion", "1.4.0"),
            ]
        );
    }

    #[test]
    fn test_merge_keys_are_unique() {
        let existing = map(json!({"A": "1", "B": "2", "C": "3"}));
        let new = map(json!({"C": "3", "B": "9", "D": "4", "A": ""}));

        let result = merge(&existing, &new);
        let mut keys: Vec<&str> = result.iter().map(|d| d.key()).collect();
        let total = keys.len();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), total);
        assert_eq!(total, 4);
    }

    #[test]
    fn test_directive_summary() {
        let directives = vec![
            ParameterDirective::value("AppVersion", "1.4.0"),
            ParameterDirective::use_previous("AppDesiredCount"),
        ];
        assert_eq!(directive_summary(&directives, "AppVersion").as_deref(), Some("1.4.0"));
        assert_eq!(directive_summary(&directives, "AppDesiredCount").as_deref(), Some("current"));
        assert_eq!(directive_summary(&directives, "Missing"), None);
    }
}
