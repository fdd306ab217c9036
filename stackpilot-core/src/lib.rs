//! Stackpilot Core Library
//!
//! Parameter reconciliation and deployment orchestration for CloudFormation
//! service stacks.

pub mod config;
pub mod error;
pub mod gateway;
pub mod observability;
pub mod orchestrator;
pub mod overlay;
pub mod params;
pub mod paths;
pub mod source;
pub mod template;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use config::{Config, WaitTimeouts};
pub use error::{Result, StackError};
pub use gateway::{CloudFormationGateway, ConnectOptions, StackGateway};
pub use observability::{format_elapsed, init as init_observability};
pub use orchestrator::{ReconcileSettings, StackOrchestrator};
pub use source::{FileSource, LocalFiles};
pub use template::TemplateDocument;
pub use types::{
    EnvEntry, OperationKind, OperationOptions, OperationPhase, OperationReport,
    ParameterDirective, ParameterMap, Stack, StackEvent, StackSubmission, TagEntry,
};
