//! Control plane gateway abstraction.
//!
//! The orchestrator talks to the control plane only through `StackGateway`:
//! - `CloudFormationGateway`: AWS CloudFormation via `aws-sdk-cloudformation`
//! - test doubles in `tests/` that record every call

use crate::error::Result;
use crate::template::TemplateDocument;
use crate::types::{ParameterMap, Stack, StackEvent, StackSubmission};
use async_trait::async_trait;

pub mod cloudformation;

pub use cloudformation::{CloudFormationGateway, ConnectOptions};

/// Remote stack operations.
///
/// All calls may fail with `StackError::RemoteRequest` carrying the provider's
/// error code and message. Implementations are stateless: nothing is cached
/// between calls.
#[async_trait]
pub trait StackGateway: Send + Sync {
    /// Whether a stack with this name currently exists.
    async fn stack_exists(&self, name: &str) -> Result<bool>;

    /// Describe a stack.
    async fn get_stack(&self, name: &str) -> Result<Stack>;

    /// Fetch the template the stack is currently running.
    async fn get_template(&self, name: &str) -> Result<TemplateDocument>;

    /// Current parameter values of the stack.
    async fn get_parameters(&self, name: &str) -> Result<ParameterMap> {
        Ok(self.get_stack(name).await?.parameters)
    }

    /// Submit a new stack. Returns once the control plane accepted the request.
    async fn create_stack(&self, submission: &StackSubmission) -> Result<()>;

    /// Submit an update. Returns once the control plane accepted the request.
    ///
    /// An empty tag list leaves the stack's tags untouched.
    async fn update_stack(&self, submission: &StackSubmission) -> Result<()>;

    /// Request deletion of a stack.
    async fn delete_stack(&self, name: &str) -> Result<()>;

    /// Block until the stack reaches `event`.
    ///
    /// Fails with `WaitTimeout` when the deadline passes first and with
    /// `WaitFailure` when the stack lands in a failure state.
    async fn wait_for(&self, name: &str, event: StackEvent) -> Result<()>;

    /// Gateway name (for logging).
    fn name(&self) -> &str;
}
