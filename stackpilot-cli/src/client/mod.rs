//! CloudFormation client setup

use anyhow::{Context, Result};
use stackpilot_core::{
    CloudFormationGateway, Config, ConnectOptions, LocalFiles, ReconcileSettings,
    StackOrchestrator,
};
use std::sync::Arc;

/// Connect to CloudFormation and build an orchestrator over local files.
pub async fn connect(options: &ConnectOptions, config: &Config) -> Result<StackOrchestrator> {
    let gateway = CloudFormationGateway::connect(options, config)
        .await
        .context("Failed to configure the CloudFormation client")?;

    Ok(StackOrchestrator::new(
        Arc::new(gateway),
        Arc::new(LocalFiles),
        ReconcileSettings::from(config),
    ))
}
