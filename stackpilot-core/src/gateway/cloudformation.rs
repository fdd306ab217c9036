//! AWS CloudFormation gateway.
//!
//! Thin adapter over `aws-sdk-cloudformation`. Requests are sent as-is and
//! provider errors are passed through with their code and message; waits use
//! the SDK waiters bounded by the configured per-event deadline.

use super::StackGateway;
use crate::config::{Config, WaitTimeouts};
use crate::error::{Result, StackError};
use crate::template::TemplateDocument;
use crate::types::{ParameterDirective, ParameterMap, Stack, StackEvent, StackSubmission, TagEntry};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_cloudformation::client::Waiters;
use aws_sdk_cloudformation::config::{Credentials, Region};
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{Capability, Parameter, Tag};
use aws_sdk_cloudformation::waiters::stack_exists::WaitUntilStackExistsError;
use aws_sdk_cloudformation::Client;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument};

/// Connection settings from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub region: Option<String>,
}

/// `StackGateway` backed by AWS CloudFormation.
pub struct CloudFormationGateway {
    client: Client,
    capabilities: Vec<Capability>,
    wait: WaitTimeouts,
}

impl CloudFormationGateway {
    /// Build a client from the default AWS configuration chain.
    ///
    /// Explicit keys replace the credential chain; an explicit region wins over
    /// the configured one, which wins over the environment.
    pub async fn connect(options: &ConnectOptions, config: &Config) -> Result<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        if let Some(region) = options.region.clone().or_else(|| config.region.clone()) {
            loader = loader.region(Region::new(region));
        }

        match (&options.access_key_id, &options.secret_access_key) {
            (Some(key_id), Some(secret)) => {
                loader = loader.credentials_provider(Credentials::new(
                    key_id.clone(),
                    secret.clone(),
                    None,
                    None,
                    "stackpilot-cli",
                ));
            }
            (None, None) => {}
            _ => {
                return Err(StackError::validation(
                    "access key id and secret access key must be given together",
                ))
            }
        }

        let sdk_config = loader.load().await;
        info!(region = ?sdk_config.region(), "CloudFormation client configured");

        Ok(Self::from_client(Client::new(&sdk_config), config))
    }

    pub fn from_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            capabilities: config
                .capabilities
                .iter()
                .map(|c| Capability::from(c.as_str()))
                .collect(),
            wait: config.wait.clone(),
        }
    }

    fn sdk_parameters(directives: &[ParameterDirective]) -> Vec<Parameter> {
        directives
            .iter()
            .map(|directive| match directive {
                ParameterDirective::Value { key, value } => {
                    Parameter::builder().parameter_key(key).parameter_value(value).build()
                }
                ParameterDirective::UsePrevious { key } => {
                    Parameter::builder().parameter_key(key).use_previous_value(true).build()
                }
            })
            .collect()
    }

    fn sdk_tags(operation: &str, stack: &str, tags: &[TagEntry]) -> Result<Vec<Tag>> {
        tags.iter()
            .map(|tag| {
                Tag::builder().key(&tag.key).value(&tag.value).build().map_err(|e| {
                    StackError::RequestBuild {
                        operation: operation.to_string(),
                        stack: stack.to_string(),
                        reason: e.to_string(),
                    }
                })
            })
            .collect()
    }
}

#[async_trait]
impl StackGateway for CloudFormationGateway {
    #[instrument(skip(self))]
    async fn stack_exists(&self, name: &str) -> Result<bool> {
        match self.client.describe_stacks().stack_name(name).send().await {
            Ok(output) => Ok(!output.stacks().is_empty()),
            Err(err) => {
                let err = remote_error("DescribeStacks", name, err);
                if is_missing_stack(&err) {
                    debug!(stack = %name, "Stack does not exist");
                    Ok(false)
                } else {
                    Err(err)
                }
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_stack(&self, name: &str) -> Result<Stack> {
        let output = self
            .client
            .describe_stacks()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| remote_error("DescribeStacks", name, e))?;

        let stack = output.stacks().first().ok_or_else(|| StackError::RemoteRequest {
            operation: "DescribeStacks".to_string(),
            stack: name.to_string(),
            code: None,
            message: format!("Stack with id {} does not exist", name),
        })?;

        let parameters: ParameterMap = stack
            .parameters()
            .iter()
            .filter_map(|p| {
                let value = p.parameter_value().unwrap_or_default().to_string();
                Some((p.parameter_key()?.to_string(), Value::String(value)))
            })
            .collect();

        let tags = stack
            .tags()
            .iter()
            .map(|t| TagEntry::new(t.key(), t.value()))
            .collect();

        Ok(Stack {
            name: name.to_string(),
            parameters,
            tags,
            status: stack.stack_status().map(|s| s.as_str().to_string()).unwrap_or_default(),
        })
    }

    #[instrument(skip(self))]
    async fn get_template(&self, name: &str) -> Result<TemplateDocument> {
        let output = self
            .client
            .get_template()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| remote_error("GetTemplate", name, e))?;

        TemplateDocument::parse(output.template_body().unwrap_or_default())
    }

    #[instrument(skip(self, submission), fields(stack = %submission.name))]
    async fn create_stack(&self, submission: &StackSubmission) -> Result<()> {
        let output = self
            .client
            .create_stack()
            .stack_name(&submission.name)
            .template_body(&submission.template_body)
            .set_parameters(Some(Self::sdk_parameters(&submission.parameters)))
            .set_tags(Some(Self::sdk_tags("CreateStack", &submission.name, &submission.tags)?))
            .set_capabilities(Some(self.capabilities.clone()))
            .send()
            .await
            .map_err(|e| remote_error("CreateStack", &submission.name, e))?;

        debug!(stack_id = ?output.stack_id(), "CreateStack accepted");
        Ok(())
    }

    #[instrument(skip(self, submission), fields(stack = %submission.name))]
    async fn update_stack(&self, submission: &StackSubmission) -> Result<()> {
        // An empty tag list removes every tag; omitting it keeps them.
        let tags = if submission.tags.is_empty() {
            None
        } else {
            Some(Self::sdk_tags("UpdateStack", &submission.name, &submission.tags)?)
        };

        let output = self
            .client
            .update_stack()
            .stack_name(&submission.name)
            .template_body(&submission.template_body)
            .set_parameters(Some(Self::sdk_parameters(&submission.parameters)))
            .set_tags(tags)
            .set_capabilities(Some(self.capabilities.clone()))
            .send()
            .await
            .map_err(|e| remote_error("UpdateStack", &submission.name, e))?;

        debug!(stack_id = ?output.stack_id(), "UpdateStack accepted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_stack(&self, name: &str) -> Result<()> {
        self.client
            .delete_stack()
            .stack_name(name)
            .send()
            .await
            .map_err(|e| remote_error("DeleteStack", name, e))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn wait_for(&self, name: &str, event: StackEvent) -> Result<()> {
        let max_wait = self.wait.for_event(event);
        let started = Instant::now();

        // All four waiters poll DescribeStacks and share one error type.
        macro_rules! wait_until {
            ($waiter:ident) => {
                self.client.$waiter().stack_name(name).wait(max_wait).await.map(|_| ())
            };
        }

        let outcome: std::result::Result<(), WaitUntilStackExistsError> = match event {
            StackEvent::Exists => wait_until!(wait_until_stack_exists),
            StackEvent::CreateComplete => wait_until!(wait_until_stack_create_complete),
            StackEvent::UpdateComplete => wait_until!(wait_until_stack_update_complete),
            StackEvent::DeleteComplete => wait_until!(wait_until_stack_delete_complete),
        };

        let waited = started.elapsed();
        match outcome {
            Ok(()) => {
                debug!(stack = %name, %event, waited_secs = waited.as_secs(), "Wait complete");
                Ok(())
            }
            Err(err) => {
                let exceeded = matches!(err, WaitUntilStackExistsError::ExceededMaxWait(_));
                let reason = DisplayErrorContext(&err).to_string();
                Err(wait_error(name, event, waited, exceeded, reason))
            }
        }
    }

    fn name(&self) -> &str {
        "cloudformation"
    }
}

/// Convert an SDK failure into `RemoteRequest`, keeping the provider's code
/// and message.
fn remote_error<E, R>(operation: &str, stack: &str, err: SdkError<E, R>) -> StackError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let service = err.as_service_error();
    let code = service.and_then(|e| e.code()).map(str::to_string);
    let message = service
        .and_then(|e| e.message())
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    StackError::RemoteRequest {
        operation: operation.to_string(),
        stack: stack.to_string(),
        code,
        message,
    }
}

fn is_missing_stack(err: &StackError) -> bool {
    match err {
        StackError::RemoteRequest { code, message, .. } => {
            code.as_deref() == Some("ValidationError") && message.contains("does not exist")
        }
        _ => false,
    }
}

/// Classify a failed wait. Only the waiter giving up at its deadline is a
/// timeout; a failure state or a polling error is a failure.
fn wait_error(
    stack: &str,
    event: StackEvent,
    waited: Duration,
    exceeded_max_wait: bool,
    reason: String,
) -> StackError {
    if exceeded_max_wait {
        StackError::WaitTimeout { stack: stack.to_string(), event, waited }
    } else {
        StackError::WaitFailure { stack: stack.to_string(), event, reason }
    }
}
