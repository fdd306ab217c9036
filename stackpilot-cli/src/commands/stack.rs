//! Stack CLI commands.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use stackpilot_core::{
    format_elapsed, OperationKind, OperationOptions, OperationReport, ParameterDirective,
    StackOrchestrator,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tabled::{settings::Style, Table, Tabled};

/// Files and template arguments shared by create, update and deploy.
pub struct TemplateArgs<'a> {
    pub name: &'a str,
    pub version: &'a str,
    pub template_file: &'a Path,
    pub params_file: &'a Path,
}

/// Create a new stack
pub async fn create(
    orch: &StackOrchestrator,
    args: TemplateArgs<'_>,
    options: &OperationOptions,
) -> Result<()> {
    let spinner = spinner(format!("Creating stack '{}'...", args.name));
    let outcome = orch
        .create(args.name, args.version, args.template_file, Some(args.params_file), options)
        .await;
    spinner.finish_and_clear();

    let report = outcome.with_context(|| format!("Failed to create stack '{}'", args.name))?;
    print_report(&report);
    Ok(())
}

/// Update an existing stack
pub async fn update(
    orch: &StackOrchestrator,
    args: TemplateArgs<'_>,
    options: &OperationOptions,
) -> Result<()> {
    let spinner = spinner(format!("Updating stack '{}'...", args.name));
    let outcome = orch
        .update(args.name, args.version, args.template_file, Some(args.params_file), options)
        .await;
    spinner.finish_and_clear();

    let report = outcome.with_context(|| format!("Failed to update stack '{}'", args.name))?;
    print_report(&report);
    Ok(())
}

/// Create or update a stack depending on whether it exists
pub async fn deploy(
    orch: &StackOrchestrator,
    args: TemplateArgs<'_>,
    options: &OperationOptions,
) -> Result<()> {
    let spinner = spinner(format!("Deploying stack '{}'...", args.name));
    let outcome = orch
        .deploy(args.name, args.version, args.template_file, Some(args.params_file), options)
        .await;
    spinner.finish_and_clear();

    let report = outcome.with_context(|| format!("Failed to deploy stack '{}'", args.name))?;
    print_report(&report);
    Ok(())
}

/// Redeploy the live template with a new version
pub async fn run(
    orch: &StackOrchestrator,
    name: &str,
    version: &str,
    options: &OperationOptions,
) -> Result<()> {
    let spinner = spinner(format!("Updating stack '{}'...", name));
    let outcome = orch.run(name, Some(version), options).await;
    spinner.finish_and_clear();

    let report = outcome.with_context(|| format!("Failed to run stack '{}'", name))?;
    print_report(&report);
    Ok(())
}

/// Scale a service to zero
pub async fn stop(orch: &StackOrchestrator, name: &str) -> Result<()> {
    let spinner = spinner(format!("Stopping stack '{}'...", name));
    let outcome = orch.stop(name).await;
    spinner.finish_and_clear();

    let report = outcome.with_context(|| format!("Failed to stop stack '{}'", name))?;
    print_report(&report);
    Ok(())
}

/// Destroy a stack
pub async fn destroy(orch: &StackOrchestrator, name: &str, force: bool) -> Result<()> {
    // Confirm before destroying (unless force)
    if !force && !confirm(&format!("Are you sure you want to destroy stack '{}'?", name.bold()))? {
        println!("Aborted.");
        return Ok(());
    }

    let spinner = spinner(format!("Destroying stack '{}'...", name));
    let outcome = orch.destroy(name).await;
    spinner.finish_and_clear();

    let report = outcome.with_context(|| format!("Failed to destroy stack '{}'", name))?;
    print_report(&report);
    Ok(())
}

/// Show the live parameters and tags of a stack
pub async fn describe(orch: &StackOrchestrator, name: &str) -> Result<()> {
    let stack =
        orch.describe(name).await.with_context(|| format!("Failed to describe stack '{}'", name))?;

    println!("{}", "Stack Details".bold().underline());
    println!();
    println!("{}: {}", "Name".bold(), stack.name);
    println!("{}: {}", "Status".bold(), colorize_status(&stack.status));
    println!();

    if !stack.parameters.is_empty() {
        println!("{}", "Parameters:".bold());
        let rows: Vec<ParameterRow> = stack
            .parameters
            .iter()
            .map(|(key, value)| ParameterRow {
                name: key.clone(),
                value: stackpilot_core::types::parameter_text(value),
            })
            .collect();
        print_table(rows);
    }

    if !stack.tags.is_empty() {
        println!("{}", "Tags:".bold());
        let rows: Vec<TagRow> = stack
            .tags
            .iter()
            .map(|t| TagRow { key: t.key.clone(), value: t.value.clone() })
            .collect();
        print_table(rows);
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

#[derive(Tabled)]
struct ParameterRow {
    #[tabled(rename = "PARAMETER")]
    name: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "KEY")]
    key: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
    println!();
}

/// Display the outcome of a finished operation
fn print_report(report: &OperationReport) {
    println!(
        "{} Stack {}: {}",
        "✓".green().bold(),
        past_tense(report.kind, report.created),
        report.stack_name.bold()
    );
    println!();

    if !report.directives.is_empty() {
        print_table(directive_rows(&report.directives));
    }

    println!("{}", format_elapsed(report.elapsed).dimmed());
}

fn directive_rows(directives: &[ParameterDirective]) -> Vec<ParameterRow> {
    directives
        .iter()
        .map(|d| ParameterRow { name: d.key().to_string(), value: directive_value(d) })
        .collect()
}

fn directive_value(directive: &ParameterDirective) -> String {
    match directive {
        ParameterDirective::Value { value, .. } => value.clone(),
        ParameterDirective::UsePrevious { .. } => "(previous)".dimmed().to_string(),
    }
}

fn past_tense(kind: OperationKind, created: bool) -> &'static str {
    match kind {
        OperationKind::Create => "created",
        OperationKind::Deploy if created => "created",
        OperationKind::Update | OperationKind::Deploy | OperationKind::Run => "updated",
        OperationKind::Stop => "stopped",
        OperationKind::Destroy => "destroyed",
    }
}

/// Colorize a CloudFormation stack status
fn colorize_status(status: &str) -> String {
    if status.ends_with("_FAILED") || status.contains("ROLLBACK") {
        status.red().to_string()
    } else if status.ends_with("_IN_PROGRESS") {
        status.yellow().to_string()
    } else if status.ends_with("_COMPLETE") {
        status.green().to_string()
    } else {
        status.to_string()
    }
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} {} [y/N]: ", "⚠".yellow().bold(), prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).context("Failed to read confirmation")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Overlay options given on the command line.
pub fn operation_options(
    scale: Option<String>,
    env_file: Option<PathBuf>,
    tag_file: Option<PathBuf>,
) -> OperationOptions {
    OperationOptions { env_file_path: env_file, tag_file_path: tag_file, scale }
}
