use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fcu_core::config::ClientConfig;
use fcu_infrastructure::{ConfigService, logging};
use std::path::PathBuf;

mod commands;
mod console;

#[derive(Parser)]
#[command(name = "fcu")]
#[command(about = "FCU - ftrack bridge for the Unity editor", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user configuration directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the installed Unity editors
    Discover {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the environment an editor would be launched with
    Env {
        #[command(flatten)]
        target: commands::launch::TargetArgs,
    },
    /// Launch a Unity editor on a project
    Launch {
        /// Unity project directory
        project: PathBuf,
        /// Editor version to use (defaults to the Hub's default editor)
        #[arg(long)]
        version: Option<String>,
        #[command(flatten)]
        target: commands::launch::TargetArgs,
    },
    /// Run the client process the editor talks to
    Client {
        /// Unity project directory
        #[arg(long)]
        project: PathBuf,
        #[command(flatten)]
        publish: commands::client::PublishArgs,
    },
    /// Import a component file into a project without a running editor
    Import(commands::import::ImportArgs),
    /// Generate the ftrack menu script in a project
    Menus {
        /// Unity project directory
        project: PathBuf,
    },
    /// Show or change the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show version and configuration location
    Version,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Set one setting, e.g. `connection.port 18862`
    Set {
        /// Dotted key
        key: String,
        /// Value; read as JSON when it parses, otherwise as a string
        value: String,
    },
}

fn load_config(path: Option<PathBuf>) -> Result<(ConfigService, ClientConfig)> {
    let service = match path {
        Some(path) => ConfigService::with_path(path),
        None => ConfigService::new().context("Failed to locate the configuration directory")?,
    };
    let config = service
        .get_config()
        .with_context(|| format!("Failed to load {}", service.path().display()))?;
    Ok((service, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config_service, config) = load_config(cli.config)?;
    let _log_guard = logging::init(&config.logging).context("Failed to initialize logging")?;

    // Single-threaded: the client loop owns the thread it runs on.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;

    match cli.command {
        Commands::Discover { json } => commands::discover::run(json)?,
        Commands::Env { target } => commands::env::run(&target, &config)?,
        Commands::Launch {
            project,
            version,
            target,
        } => runtime.block_on(commands::launch::run(
            &project,
            version.as_deref(),
            &target,
            &config,
        ))?,
        Commands::Client { project, publish } => {
            runtime.block_on(commands::client::run(project, &publish, config))?
        }
        Commands::Import(args) => runtime.block_on(commands::import::run(args))?,
        Commands::Menus { project } => commands::menus::run(&project)?,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config_service)?,
            ConfigAction::Set { key, value } => {
                commands::config::set(&config_service, &key, &value)?
            }
        },
        Commands::Version => commands::version::show(&config_service.path()),
    }

    Ok(())
}
