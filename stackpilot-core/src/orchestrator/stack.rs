//! Stack orchestration for service deployments.
//!
//! Sequences the reads, parameter reconciliation, submission and waits for
//! each stack operation. All remote access goes through [`StackGateway`] and
//! all file access through [`FileSource`].

use super::operation::{InFlight, Operation};
use crate::config::Config;
use crate::error::{Result, StackError};
use crate::gateway::StackGateway;
use crate::overlay::{add_default_tags, parse_env_file, parse_tag_file};
use crate::params::{directive_summary, filter_to_template, merge, Overrides};
use crate::source::{read_optional, FileSource};
use crate::template::TemplateDocument;
use crate::types::{
    EnvEntry, OperationKind, OperationOptions, OperationReport, ParameterMap, Stack, StackEvent,
    StackSubmission, TagEntry,
};
use crate::validation::{validate_options, validate_stack_name, validate_version};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Parameter names and policies applied during reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcileSettings {
    pub version_key: String,
    pub scale_key: String,
    /// Version argument meaning "keep the deployed version"
    pub current_version: String,
    pub default_tags: Vec<TagEntry>,
}

impl From<&Config> for ReconcileSettings {
    fn from(config: &Config) -> Self {
        Self {
            version_key: config.version_parameter.clone(),
            scale_key: config.scale_parameter.clone(),
            current_version: config.current_version.clone(),
            default_tags: config.default_tags.clone(),
        }
    }
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Everything read before a submission is built.
struct Inputs {
    template: TemplateDocument,
    live: ParameterMap,
    params: ParameterMap,
    env: Vec<EnvEntry>,
    tags: Vec<TagEntry>,
}

/// Stack orchestrator for service deployments.
pub struct StackOrchestrator {
    gateway: Arc<dyn StackGateway>,
    files: Arc<dyn FileSource>,
    settings: ReconcileSettings,
    in_flight: InFlight,
}

impl StackOrchestrator {
    pub fn new(
        gateway: Arc<dyn StackGateway>,
        files: Arc<dyn FileSource>,
        settings: ReconcileSettings,
    ) -> Self {
        debug!(
            gateway = gateway.name(),
            version_key = %settings.version_key,
            "Stack orchestrator ready"
        );
        Self { gateway, files, settings, in_flight: InFlight::default() }
    }

    /// Create a new stack from a template and parameters file.
    ///
    /// Waits for the stack to exist, then for creation to complete.
    #[instrument(skip(self, options), fields(stack = %name))]
    pub async fn create(
        &self,
        name: &str,
        version: &str,
        template_file: &Path,
        params_file: Option<&Path>,
        options: &OperationOptions,
    ) -> Result<OperationReport> {
        validate_stack_name(name)?;
        validate_version(version)?;
        validate_options(options)?;

        let mut op = Operation::begin(OperationKind::Create, name, self.in_flight.claim(name)?);
        let outcome =
            self.create_stack(&mut op, version, template_file, params_file, options).await;
        op.finish(outcome)
    }

    /// Update an existing stack from a template and parameters file.
    ///
    /// Live parameters the new template no longer declares are dropped before
    /// merging.
    #[instrument(skip(self, options), fields(stack = %name))]
    pub async fn update(
        &self,
        name: &str,
        version: &str,
        template_file: &Path,
        params_file: Option<&Path>,
        options: &OperationOptions,
    ) -> Result<OperationReport> {
        validate_stack_name(name)?;
        validate_version(version)?;
        validate_options(options)?;

        let mut op = Operation::begin(OperationKind::Update, name, self.in_flight.claim(name)?);
        let outcome =
            self.update_stack(&mut op, version, template_file, params_file, options).await;
        op.finish(outcome)
    }

    /// Create the stack if it does not exist, otherwise update it.
    #[instrument(skip(self, options), fields(stack = %name))]
    pub async fn deploy(
        &self,
        name: &str,
        version: &str,
        template_file: &Path,
        params_file: Option<&Path>,
        options: &OperationOptions,
    ) -> Result<OperationReport> {
        validate_stack_name(name)?;
        validate_version(version)?;
        validate_options(options)?;

        let mut op = Operation::begin(OperationKind::Deploy, name, self.in_flight.claim(name)?);
        let outcome = async {
            if self.gateway.stack_exists(name).await? {
                info!(stack = %name, "Service already exists");
                self.update_stack(&mut op, version, template_file, params_file, options).await
            } else {
                info!(stack = %name, "No existing service found");
                self.create_stack(&mut op, version, template_file, params_file, options).await
            }
        }
        .await;
        op.finish(outcome)
    }

    /// Redeploy the live template with a new version and/or scale.
    ///
    /// `None` or the configured current-version sentinel keeps the deployed
    /// version.
    #[instrument(skip(self, options), fields(stack = %name))]
    pub async fn run(
        &self,
        name: &str,
        version: Option<&str>,
        options: &OperationOptions,
    ) -> Result<OperationReport> {
        self.run_as(OperationKind::Run, name, version, options).await
    }

    /// Scale the service to zero, keeping everything else as deployed.
    #[instrument(skip(self), fields(stack = %name))]
    pub async fn stop(&self, name: &str) -> Result<OperationReport> {
        self.run_as(OperationKind::Stop, name, None, &OperationOptions::with_scale("0")).await
    }

    /// Delete the stack and wait for the deletion to complete.
    #[instrument(skip(self), fields(stack = %name))]
    pub async fn destroy(&self, name: &str) -> Result<OperationReport> {
        validate_stack_name(name)?;

        let mut op = Operation::begin(OperationKind::Destroy, name, self.in_flight.claim(name)?);
        let outcome = async {
            info!(stack = %name, "{} {}", op.kind.verb(), name);
            self.gateway.delete_stack(name).await?;
            op.submitted(false, Vec::new(), Vec::new());
            self.wait(&mut op, StackEvent::DeleteComplete).await
        }
        .await;
        op.finish(outcome)
    }

    /// Current parameters, tags and status of a stack.
    #[instrument(skip(self), fields(stack = %name))]
    pub async fn describe(&self, name: &str) -> Result<Stack> {
        validate_stack_name(name)?;
        self.gateway.get_stack(name).await
    }

    async fn run_as(
        &self,
        kind: OperationKind,
        name: &str,
        version: Option<&str>,
        options: &OperationOptions,
    ) -> Result<OperationReport> {
        validate_stack_name(name)?;
        if let Some(version) = version {
            validate_version(version)?;
        }
        validate_options(options)?;

        let version = version.filter(|v| *v != self.settings.current_version);

        let mut op = Operation::begin(kind, name, self.in_flight.claim(name)?);
        let outcome = async {
            let (template, live, env, tags) = tokio::try_join!(
                self.gateway.get_template(name),
                self.gateway.get_parameters(name),
                self.read_env(options),
                self.read_tags(options),
            )?;

            let inputs = Inputs { template, live, params: ParameterMap::new(), env, tags };
            let overrides =
                Overrides { version: version.map(str::to_string), scale: options.scale.clone() };
            let submission = self.prepare(name, inputs, &overrides, false)?;

            self.submit(&mut op, submission, false).await?;
            self.wait(&mut op, StackEvent::UpdateComplete).await
        }
        .await;
        op.finish(outcome)
    }

    async fn create_stack(
        &self,
        op: &mut Operation<'_>,
        version: &str,
        template_file: &Path,
        params_file: Option<&Path>,
        options: &OperationOptions,
    ) -> Result<()> {
        let name = op.stack.clone();
        let (template, params, env, tags) = tokio::try_join!(
            self.read_template(template_file),
            self.read_params(params_file),
            self.read_env(options),
            self.read_tags(options),
        )?;

        let inputs = Inputs { template, live: ParameterMap::new(), params, env, tags };
        let overrides =
            Overrides { version: Some(version.to_string()), scale: options.scale.clone() };
        let submission = self.prepare(&name, inputs, &overrides, true)?;

        self.submit(op, submission, true).await?;
        self.wait(op, StackEvent::Exists).await?;
        self.wait(op, StackEvent::CreateComplete).await
    }

    async fn update_stack(
        &self,
        op: &mut Operation<'_>,
        version: &str,
        template_file: &Path,
        params_file: Option<&Path>,
        options: &OperationOptions,
    ) -> Result<()> {
        let name = op.stack.clone();
        let (template, live, params, env, tags) = tokio::try_join!(
            self.read_template(template_file),
            self.gateway.get_parameters(&name),
            self.read_params(params_file),
            self.read_env(options),
            self.read_tags(options),
        )?;

        let inputs = Inputs { template, live, params, env, tags };
        let overrides =
            Overrides { version: Some(version.to_string()), scale: options.scale.clone() };
        let submission = self.prepare(&name, inputs, &overrides, false)?;

        self.submit(op, submission, false).await?;
        self.wait(op, StackEvent::UpdateComplete).await
    }

    /// Reconcile parameters, splice the environment and apply the tag policy.
    fn prepare(
        &self,
        name: &str,
        inputs: Inputs,
        overrides: &Overrides,
        is_new: bool,
    ) -> Result<StackSubmission> {
        let Inputs { mut template, live, mut params, env, tags } = inputs;

        let baseline = filter_to_template(&template, &live);
        overrides.apply(&mut params, &self.settings.version_key, &self.settings.scale_key);
        let directives = merge(&baseline, &params);

        let settings = &self.settings;
        for (label, key) in [("version", &settings.version_key), ("scale", &settings.scale_key)] {
            if let Some(value) = directive_summary(&directives, key) {
                info!(stack = %name, "{}: {}", label, value);
            }
        }

        template.splice_environment(&env)?;

        Ok(StackSubmission {
            name: name.to_string(),
            parameters: directives,
            template_body: template.to_body_string()?,
            tags: add_default_tags(is_new, tags, &self.settings.default_tags),
        })
    }

    async fn submit(
        &self,
        op: &mut Operation<'_>,
        submission: StackSubmission,
        is_new: bool,
    ) -> Result<()> {
        info!(stack = %submission.name, "{} {}", submission_verb(op.kind, is_new), submission.name);

        if is_new {
            self.gateway.create_stack(&submission).await?;
        } else {
            self.gateway.update_stack(&submission).await?;
        }

        op.submitted(is_new, submission.parameters, submission.tags);
        Ok(())
    }

    async fn wait(&self, op: &mut Operation<'_>, event: StackEvent) -> Result<()> {
        op.waiting_for(event);
        self.gateway.wait_for(&op.stack, event).await
    }

    async fn read_template(&self, path: &Path) -> Result<TemplateDocument> {
        let content = self.files.read_to_string(path).await?;
        TemplateDocument::parse(&content)
    }

    async fn read_params(&self, path: Option<&Path>) -> Result<ParameterMap> {
        let content = read_optional(self.files.as_ref(), path, "{}").await?;
        let invalid = |reason: String| StackError::InvalidParameters {
            path: path.map(Path::to_path_buf).unwrap_or_default(),
            reason,
        };

        match serde_json::from_str::<Value>(&content).map_err(|e| invalid(e.to_string()))? {
            Value::Object(map) => Ok(map),
            _ => Err(invalid("expected a JSON object of parameter names to values".to_string())),
        }
    }

    async fn read_env(&self, options: &OperationOptions) -> Result<Vec<EnvEntry>> {
        let content =
            read_optional(self.files.as_ref(), options.env_file_path.as_deref(), "").await?;
        parse_env_file(&content)
    }

    async fn read_tags(&self, options: &OperationOptions) -> Result<Vec<TagEntry>> {
        let content =
            read_optional(self.files.as_ref(), options.tag_file_path.as_deref(), "{}").await?;
        parse_tag_file(&content)
    }
}

/// Log verb for a submission. A deploy reports what it actually does.
fn submission_verb(kind: OperationKind, is_new: bool) -> &'static str {
    match kind {
        _ if is_new => OperationKind::Create.verb(),
        OperationKind::Deploy => OperationKind::Update.verb(),
        other => other.verb(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryFiles(HashMap<PathBuf, String>);

    #[async_trait]
    impl FileSource for MemoryFiles {
        async fn read_to_string(&self, path: &Path) -> Result<String> {
            self.0.get(path).cloned().ok_or_else(|| StackError::FileReadError {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
    }

    #[derive(Default)]
    struct RejectingGateway {
        waits: Mutex<Vec<StackEvent>>,
    }

    #[async_trait]
    impl StackGateway for RejectingGateway {
        async fn stack_exists(&self, _name: &str) -> Result<bool> {
            Ok(false)
        }

        async fn get_stack(&self, name: &str) -> Result<Stack> {
            Ok(Stack {
                name: name.to_string(),
                parameters: ParameterMap::new(),
                tags: Vec::new(),
                status: "CREATE_COMPLETE".to_string(),
            })
        }

        async fn get_template(&self, _name: &str) -> Result<TemplateDocument> {
            TemplateDocument::from_value(json!({}))
        }

        async fn create_stack(&self, submission: &StackSubmission) -> Result<()> {
            Err(StackError::RemoteRequest {
                operation: "CreateStack".to_string(),
                stack: submission.name.clone(),
                code: Some("AlreadyExistsException".to_string()),
                message: format!("Stack [{}] already exists", submission.name),
            })
        }

        async fn update_stack(&self, _submission: &StackSubmission) -> Result<()> {
            Ok(())
        }

        async fn delete_stack(&self, _name: &str) -> Result<()> {
            Ok(())
        }

        async fn wait_for(&self, _name: &str, event: StackEvent) -> Result<()> {
            self.waits.lock().unwrap().push(event);
            Ok(())
        }

        fn name(&self) -> &str {
            "rejecting"
        }
    }

    fn orchestrator(gateway: Arc<RejectingGateway>, files: MemoryFiles) -> StackOrchestrator {
        StackOrchestrator::new(gateway, Arc::new(files), ReconcileSettings::default())
    }

    #[test]
    fn test_settings_from_config() {
        let config = Config { scale_parameter: "DesiredCount".to_string(), ..Config::default() };
        let settings = ReconcileSettings::from(&config);
        assert_eq!(settings.version_key, "AppVersion");
        assert_eq!(settings.scale_key, "DesiredCount");
        assert_eq!(settings.current_version, "current");
    }

    #[tokio::test]
    async fn test_prepare_splices_env_and_tags() {
        let orch = orchestrator(Arc::new(RejectingGateway::default()), MemoryFiles::default());
        let template = TemplateDocument::from_value(json!({
            "Parameters": {"AppVersion": {}},
            "Resources": {"TaskDefinition": {"Properties": {"ContainerDefinitions": [{}]}}}
        }))
        .unwrap();
        let inputs = Inputs {
            template,
            live: ParameterMap::new(),
            params: ParameterMap::new(),
            env: vec![EnvEntry::new("LOG_LEVEL", "debug")],
            tags: Vec::new(),
        };
        let overrides = Overrides { version: Some("2.0.0".to_string()), scale: None };

        let submission = orch.prepare("svc", inputs, &overrides, true).unwrap();
        assert_eq!(submission.tags, vec![TagEntry::new("ComponentType", "ECS-Service")]);
        assert!(submission.template_body.contains("LOG_LEVEL"));
        assert_eq!(submission.parameters.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_create_issues_no_wait() {
        let gateway = Arc::new(RejectingGateway::default());
        let mut files = MemoryFiles::default();
        files.0.insert(PathBuf::from("t.json"), "{}".to_string());
        let orch = orchestrator(gateway.clone(), files);

        let err = orch
            .create("svc", "1.0.0", Path::new("t.json"), None, &OperationOptions::default())
            .await
            .unwrap_err();

        assert_eq!(err.remote_code(), Some("AlreadyExistsException"));
        assert!(gateway.waits.lock().unwrap().is_empty());
    }

    #[test]
    fn test_submission_verb() {
        assert_eq!(submission_verb(OperationKind::Deploy, true), "Creating");
        assert_eq!(submission_verb(OperationKind::Deploy, false), "Updating");
        assert_eq!(submission_verb(OperationKind::Run, false), "Updating");
        assert_eq!(submission_verb(OperationKind::Stop, false), "Stopping");
    }

    #[tokio::test]
    async fn test_params_must_be_object() {
        let mut files = MemoryFiles::default();
        files.0.insert(PathBuf::from("p.json"), "[1, 2]".to_string());
        let orch = orchestrator(Arc::new(RejectingGateway::default()), files);

        let err = orch.read_params(Some(Path::new("p.json"))).await.unwrap_err();
        assert!(matches!(err, StackError::InvalidParameters { .. }));
        assert!(orch.read_params(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_precedes_file_access() {
        let orch = orchestrator(Arc::new(RejectingGateway::default()), MemoryFiles::default());
        let options = OperationOptions::with_scale("x");
        let err = orch
            .create("svc", "1.0.0", Path::new("missing.json"), None, &options)
            .await
            .unwrap_err();
        assert!(matches!(err, StackError::Validation { .. }));
    }
}
