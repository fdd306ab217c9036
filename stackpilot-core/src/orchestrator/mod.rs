//! Operation sequencing for stacks.

mod operation;
pub mod stack;

pub use stack::{ReconcileSettings, StackOrchestrator};
