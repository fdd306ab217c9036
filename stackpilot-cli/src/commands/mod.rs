//! CLI command implementations

pub mod stack;

pub use stack::{create, deploy, describe, destroy, run, stop, update, TemplateArgs};
