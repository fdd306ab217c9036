//! Core domain types for stackpilot.

pub mod operation;
pub mod parameter;
pub mod stack;

// Re-exports
pub use operation::{OperationKind, OperationOptions, OperationPhase, OperationReport};
pub use parameter::{is_truthy, parameter_text, ParameterDirective, ParameterMap};
pub use stack::{EnvEntry, Stack, StackEvent, StackSubmission, TagEntry};
