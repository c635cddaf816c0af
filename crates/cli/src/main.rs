//! fabricctl - profile fabric CLI
//!
//! Manages versions and profiles stored in a directory-backed registry and
//! shows the overlays they resolve to.

mod commands;
mod completion;
mod error;
mod fleet;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fabric_profile_registry::FileProfileRegistry;
use fabric_profile_service::{ProfileService, ProfileServiceConfig};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{ProfileCommands, VersionCommands};
use crate::fleet::LocalFleet;

#[derive(Parser)]
#[command(name = "fabricctl")]
#[command(about = "Profile fabric CLI - Manage versions, profiles and overlays")]
#[command(version)]
#[command(long_about = "
fabricctl manages versioned configuration profiles kept in a registry
directory. Profiles inherit from parent profiles; `profile show --overlay`
prints the merged view a container would receive.

Use --json for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(
        long,
        global = true,
        help = "Output in JSON format for machine parsing"
    )]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Registry root directory
    #[arg(long, global = true, env = "FABRIC_ROOT", default_value = "fabric")]
    root: PathBuf,

    /// Service configuration file (JSON)
    #[arg(long, global = true, env = "FABRIC_CONFIG")]
    config: Option<PathBuf>,

    /// Environment used to select `<file>#<environment>` variants; overrides FABRIC_ENVIRONMENT
    #[arg(long, global = true)]
    environment: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Version management commands
    #[command(subcommand)]
    Version(VersionCommands),

    /// Profile management commands
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completion for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("fabric={log_level}").into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match execute_command(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            ExitCode::from(error::exit_code(&e))
        }
    }
}

/// Config file, then `FABRIC_ENVIRONMENT`, then `--environment`; later wins.
fn service_config(cli: &Cli) -> Result<ProfileServiceConfig> {
    let mut config = match &cli.config {
        Some(path) => ProfileServiceConfig::load_from_path(path)?,
        None => ProfileServiceConfig::default(),
    };
    if let Some(environment) = ProfileServiceConfig::from_env().environment {
        config = config.with_environment(environment);
    }
    if let Some(environment) = cli.environment.as_deref().filter(|e| !e.trim().is_empty()) {
        config = config.with_environment(environment);
    }
    config.validate()?;
    Ok(config)
}

fn execute_command(cli: &Cli) -> Result<()> {
    if let Commands::Completion { shell } = &cli.command {
        completion::generate_completion(*shell);
        return Ok(());
    }

    let config = service_config(cli)?;
    let registry = FileProfileRegistry::open(&cli.root)?;
    debug!(root = %cli.root.display(), environment = ?config.environment, "Opened registry");

    let service = ProfileService::new(Arc::new(registry), config);
    service.start();

    let result = match &cli.command {
        Commands::Version(cmd) => commands::version::execute(cmd, &service, cli.json),
        Commands::Profile(cmd) => {
            let fleet = LocalFleet::new(&cli.root);
            commands::profile::execute(cmd, &service, &fleet, cli.json)
        }
        Commands::Completion { .. } => Ok(()),
    };
    service.stop();
    result
}
