//! Parameter types shared by the merge engine, the filter and the gateway.

use serde_json::Value;

/// Ordered mapping of parameter name to value.
///
/// Insertion order is preserved (`serde_json` is built with `preserve_order`),
/// which keeps merge output deterministic.
pub type ParameterMap = serde_json::Map<String, Value>;

/// One entry of a create/update submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterDirective {
    /// Submit an explicit new value.
    Value { key: String, value: String },

    /// Keep whatever value the live stack currently holds.
    UsePrevious { key: String },
}

impl ParameterDirective {
    pub fn value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Value { key: key.into(), value: value.into() }
    }

    pub fn use_previous(key: impl Into<String>) -> Self {
        Self::UsePrevious { key: key.into() }
    }

    pub fn key(&self) -> &str {
        match self {
            Self::Value { key, .. } | Self::UsePrevious { key } => key,
        }
    }
}

/// JSON truthiness: `null`, `false`, `0`, `NaN` and `""` mean "not provided".
///
/// The string `"0"` is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text form submitted to the control plane.
pub fn parameter_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
