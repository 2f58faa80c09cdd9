//! cordova-agent - CI build-agent tasks for Cordova and Ionic projects
//!
//! CLI entry point that provisions the runtime and dispatches to tasks.

use clap::Parser;
use console::style;
use cordova_agent::cli::{Cli, Commands};
use cordova_agent::error::AgentResult;
use cordova_agent::runtime::NodeProvisioner;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            ExitCode::from(e.exit_code().clamp(1, 255) as u8)
        }
    }
}

async fn run() -> AgentResult<()> {
    let cli = Cli::parse();

    // Initialize logging: 0 = info (CI log stream), 1 = debug, 2+ = trace
    let filter = match cli.verbose {
        0 => EnvFilter::new("cordova_agent=info"),
        1 => EnvFilter::new("cordova_agent=debug"),
        _ => EnvFilter::new("cordova_agent=trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let working_dir = cordova_agent::cli::commands::resolve_working_dir(cli.cwd.clone())?;
    debug!("Working directory: {}", working_dir.display());
    std::env::set_current_dir(&working_dir).map_err(|e| {
        cordova_agent::error::AgentError::io(format!("entering {}", working_dir.display()), e)
    })?;

    // Guarantee a compatible Node runtime before anything shells out
    let provisioner = NodeProvisioner::new();
    if cli.min_node_version.is_some() || cli.max_node_version.is_some() {
        provisioner
            .ensure_in_range(
                cli.min_node_version.as_deref(),
                cli.max_node_version.as_deref(),
                &cli.target_node_version,
                cli.install_npm,
            )
            .await?;
    } else {
        NodeProvisioner::use_system_node();
    }

    match cli.command {
        Commands::Cordova(args) => cordova_agent::cli::commands::cordova(args, &working_dir).await,
        Commands::Ionic(args) => cordova_agent::cli::commands::ionic(args, &working_dir).await,
        Commands::Build(args) => cordova_agent::cli::commands::build(args, &working_dir).await,
        Commands::Package(args) => cordova_agent::cli::commands::package(args, &working_dir).await,
    }
}
