//! Stack domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::parameter::{ParameterDirective, ParameterMap};

/// A deployed stack as reported by the control plane.
#[derive(Debug, Clone, PartialEq)]
pub struct Stack {
    /// Stack name
    pub name: String,

    /// Current parameter values
    pub parameters: ParameterMap,

    /// Tags attached to the stack
    pub tags: Vec<TagEntry>,

    /// Control plane status (e.g. `UPDATE_COMPLETE`)
    pub status: String,
}

/// Environment variable injected into the first container definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvEntry {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Value")]
    pub value: String,
}

impl EnvEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }
}

/// Stack tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagEntry {
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Value")]
    pub value: String,
}

impl TagEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Terminal events the orchestrator waits for after a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackEvent {
    Exists,
    CreateComplete,
    UpdateComplete,
    DeleteComplete,
}

impl StackEvent {
    /// Waiter name used by the control plane SDKs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exists => "stackExists",
            Self::CreateComplete => "stackCreateComplete",
            Self::UpdateComplete => "stackUpdateComplete",
            Self::DeleteComplete => "stackDeleteComplete",
        }
    }
}

impl fmt::Display for StackEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything sent to the control plane for a create or update call.
#[derive(Debug, Clone, PartialEq)]
pub struct StackSubmission {
    pub name: String,
    pub parameters: Vec<ParameterDirective>,
    pub template_body: String,
    pub tags: Vec<TagEntry>,
}
