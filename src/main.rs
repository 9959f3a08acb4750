#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use agent_hq::config::{Config, JiraConfig};
use agent_hq::jira::JiraClient;
use agent_hq::mcp::{McpServer, JIRA_SERVER_NAME, MONITOR_SERVER_NAME, SERVER_VERSION};
use agent_hq::monitor::{compute_status, LogStore};
use agent_hq::tools::{jira_tools, monitor_tools};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "agent-hq")]
#[command(version = "0.1.0")]
#[command(about = "Agent HQ activity monitor and Jira query tools over MCP.", long_about = None)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve the Agent HQ monitoring tools on stdio
    Monitor {
        /// Directory for the log files (overrides config)
        #[arg(long)]
        logs_dir: Option<PathBuf>,
    },

    /// Serve the Jira query tools on stdio
    Jira,

    /// Print the current status snapshot as JSON
    Status {
        #[arg(long)]
        logs_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout carries the protocol.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    // a missing .env is fine
    dotenv::dotenv().ok();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Monitor { logs_dir } => {
            let store = Arc::new(open_store(&config, logs_dir));
            info!(dir = %store.dir().display(), "Using log directory");
            McpServer::new(MONITOR_SERVER_NAME, SERVER_VERSION, monitor_tools(store))
                .serve_stdio()
                .await
        }

        Commands::Jira => {
            let jira = JiraConfig::from_env(config.jira.clone())?;
            info!(base_url = %jira.base_url, cloud_routing = jira.options.cloud_routing, "Jira site");
            let client = Arc::new(JiraClient::new(jira).context("failed to build HTTP client")?);
            McpServer::new(JIRA_SERVER_NAME, SERVER_VERSION, jira_tools(client))
                .serve_stdio()
                .await
        }

        Commands::Status { logs_dir } => {
            let store = open_store(&config, logs_dir);
            let snapshot = compute_status(&store)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
    }
}

fn open_store(config: &Config, logs_dir: Option<PathBuf>) -> LogStore {
    LogStore::new(logs_dir.unwrap_or_else(|| config.monitor.logs_dir.clone()))
}
