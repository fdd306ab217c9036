//! Operation domain types.

use super::parameter::ParameterDirective;
use super::stack::{StackEvent, TagEntry};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Lifecycle operation driven by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Create,
    Update,
    Deploy,
    Run,
    Stop,
    Destroy,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Deploy => "deploy",
            Self::Run => "run",
            Self::Stop => "stop",
            Self::Destroy => "destroy",
        }
    }

    /// Progressive verb used in log lines ("Updating svc").
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Create => "Creating",
            Self::Update | Self::Run => "Updating",
            Self::Deploy => "Deploying",
            Self::Stop => "Stopping",
            Self::Destroy => "Deleting",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of a single operation.
///
/// `Pending -> Submitted -> Waiting -> Done`; `Failed` is reachable from any
/// phase and absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Pending,
    Submitted,
    Waiting,
    Done,
    Failed,
}

impl OperationPhase {
    /// Whether moving to `next` is a legal transition.
    pub fn can_advance_to(self, next: OperationPhase) -> bool {
        use OperationPhase::*;
        matches!(
            (self, next),
            (Pending, Submitted)
                | (Submitted, Waiting)
                | (Waiting, Done)
                | (Pending | Submitted | Waiting, Failed)
        )
    }
}

/// Per-invocation options with their defaults resolved in one place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationOptions {
    /// KEY=VALUE file injected into the first container definition
    pub env_file_path: Option<PathBuf>,

    /// Flat JSON object of stack tags
    pub tag_file_path: Option<PathBuf>,

    /// Desired task count
    pub scale: Option<String>,
}

impl OperationOptions {
    pub fn with_scale(scale: impl Into<String>) -> Self {
        Self { scale: Some(scale.into()), ..Self::default() }
    }
}

/// Outcome of a completed operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationReport {
    pub kind: OperationKind,
    pub stack_name: String,

    /// True when the operation created the stack
    pub created: bool,

    /// Parameter directives submitted (empty for destroy)
    pub directives: Vec<ParameterDirective>,

    /// Tags submitted (empty for destroy)
    pub tags: Vec<TagEntry>,

    /// Events waited for, in order
    pub waited_for: Vec<StackEvent>,

    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        use OperationPhase::*;
        assert!(Pending.can_advance_to(Submitted));
        assert!(Submitted.can_advance_to(Waiting));
        assert!(Waiting.can_advance_to(Done));
        assert!(Pending.can_advance_to(Failed));
        assert!(Waiting.can_advance_to(Failed));

        assert!(!Pending.can_advance_to(Done));
        assert!(!Done.can_advance_to(Failed));
        assert!(!Failed.can_advance_to(Pending));
    }

    #[test]
    fn test_options_with_scale() {
        let options = OperationOptions::with_scale("0");
        assert_eq!(options.scale.as_deref(), Some("0"));
        assert!(options.env_file_path.is_none());
        assert!(options.tag_file_path.is_none());
    }
}
