use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use stackpilot_core::{Config, ConnectOptions};
use std::path::PathBuf;
use std::process::ExitCode;

mod client;
mod commands;

#[derive(Parser)]
#[command(name = "stackpilot", version)]
#[command(about = "Deploy CloudFormation-managed services", long_about = None)]
struct Cli {
    /// AWS access key id
    #[arg(long, env = "AWS_ACCESS_KEY_ID", global = true, hide_env_values = true)]
    access_key_id: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY", global = true, hide_env_values = true)]
    secret_access_key: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION", global = true)]
    region: Option<String>,

    /// Path to the configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Overlay options accepted by commands that submit parameters.
#[derive(Args)]
struct OverlayArgs {
    /// Desired task count
    #[arg(long)]
    scale: Option<String>,

    /// KEY=VALUE file injected into the container environment
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// JSON object of stack tags
    #[arg(long)]
    tag_file: Option<PathBuf>,
}

impl OverlayArgs {
    fn options(&self) -> stackpilot_core::OperationOptions {
        commands::stack::operation_options(
            self.scale.clone(),
            self.env_file.clone(),
            self.tag_file.clone(),
        )
    }
}

/// Positional arguments of create, update and deploy.
#[derive(Args)]
struct TemplateInput {
    /// Stack name
    name: String,

    /// Application version
    version: String,

    /// Path to the JSON template
    template_file: PathBuf,

    /// Path to the JSON parameters file
    params_file: PathBuf,

    #[command(flatten)]
    overlay: OverlayArgs,
}

impl TemplateInput {
    fn args(&self) -> commands::TemplateArgs<'_> {
        commands::TemplateArgs {
            name: &self.name,
            version: &self.version,
            template_file: &self.template_file,
            params_file: &self.params_file,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new stack
    Create(TemplateInput),

    /// Update an existing stack with a new template
    Update(TemplateInput),

    /// Create the stack, or update it if it already exists
    Deploy(TemplateInput),

    /// Redeploy the current template with a new version ("current" keeps it)
    Run {
        /// Stack name
        name: String,

        /// Application version
        version: String,

        #[command(flatten)]
        overlay: OverlayArgs,
    },

    /// Scale a service down to zero
    Stop {
        /// Stack name
        name: String,
    },

    /// Delete a stack
    Destroy {
        /// Stack name
        name: String,

        /// Destroy without confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Show live parameters and tags of a stack
    Describe {
        /// Stack name
        name: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), format!("{:#}", e).red());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let level = if cli.verbose { "debug" } else { config.log_level.as_str() };
    if let Err(e) = stackpilot_core::init_observability(level) {
        eprintln!("{} Logging disabled: {}", "⚠".yellow().bold(), e);
    }

    let connect = ConnectOptions {
        access_key_id: cli.access_key_id,
        secret_access_key: cli.secret_access_key,
        region: cli.region,
    };
    let orch = client::connect(&connect, &config).await?;

    match cli.command {
        Commands::Create(input) => {
            commands::create(&orch, input.args(), &input.overlay.options()).await?;
        }

        Commands::Update(input) => {
            commands::update(&orch, input.args(), &input.overlay.options()).await?;
        }

        Commands::Deploy(input) => {
            commands::deploy(&orch, input.args(), &input.overlay.options()).await?;
        }

        Commands::Run { name, version, overlay } => {
            commands::run(&orch, &name, &version, &overlay.options()).await?;
        }

        Commands::Stop { name } => {
            commands::stop(&orch, &name).await?;
        }

        Commands::Destroy { name, force } => {
            commands::destroy(&orch, &name, force).await?;
        }

        Commands::Describe { name } => {
            commands::describe(&orch, &name).await?;
        }
    }

    Ok(())
}
