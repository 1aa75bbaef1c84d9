//! cloudx - container control client

mod commands;

use clap::{Parser, Subcommand};
use cloudx_config::GlobalConfig;
use cloudx_core::ButtonKind;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "cloudx")]
#[command(author, version, about = "Container control client", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Backend base URL (overrides backend.url from the config file)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List containers with running/stopped counts
    List,

    /// Stop a running container
    Stop {
        /// Container ID
        container: String,
    },

    /// Restart a container
    Restart {
        /// Container ID
        container: String,
    },

    /// Start a stopped container (sent to the backend as a restart)
    Start {
        /// Container ID
        container: String,
    },

    /// Delete a container
    Delete {
        /// Container ID
        container: String,
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show a container's logs
    Logs {
        /// Container ID
        container: String,
        /// Display name, used for the export file name
        #[arg(long)]
        name: Option<String>,
        /// Write the logs to a file in logs.export_dir instead of printing them
        #[arg(long)]
        export: bool,
    },

    /// Render the inventory as a standalone HTML page
    Html {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        if e.downcast_ref::<commands::AlreadyReported>().is_none() {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // stdout carries command output (logs, html), so diagnostics go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let (mut config, config_path) = match &cli.config {
        Some(path) => (GlobalConfig::load_from(path)?, path.clone()),
        None => (GlobalConfig::load()?, GlobalConfig::config_path()?),
    };
    if let Some(url) = cli.url {
        config.backend.url = url;
    }
    config.validate()?;

    if let Some(Commands::Config) = &cli.command {
        return commands::config(&config, &config_path);
    }

    let backend = cloudx_api::create_backend(&config)?;

    match cli.command {
        None => cloudx_tui::run(config, backend).await?,
        Some(Commands::List) => commands::list(backend).await?,
        Some(Commands::Stop { container }) => {
            commands::action(backend, &config, &container, ButtonKind::Stop).await?
        }
        Some(Commands::Restart { container }) => {
            commands::action(backend, &config, &container, ButtonKind::Restart).await?
        }
        Some(Commands::Start { container }) => {
            commands::action(backend, &config, &container, ButtonKind::Start).await?
        }
        Some(Commands::Delete { container, yes }) => {
            if yes || commands::confirm(&format!("Delete container {}?", container))? {
                commands::action(backend, &config, &container, ButtonKind::Delete).await?;
            } else {
                println!("Cancelled.");
            }
        }
        Some(Commands::Logs {
            container,
            name,
            export,
        }) => commands::logs(backend, &config, &container, name.as_deref(), export).await?,
        Some(Commands::Html { output }) => commands::html(backend, output.as_deref()).await?,
        Some(Commands::Config) => unreachable!(), // Handled above
    }

    Ok(())
}
