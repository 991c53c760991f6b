//! charter: evidence tracking and application drafting for Chartered Engineer
//! candidates.
//!
//! Evidence is assessed against the competency catalog by a Gemini-backed
//! gateway and persisted under the data directory between runs.

mod commands;
mod config;

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use charter_agent::LlmBackend;
use competency::CompetencyCatalog;
use evidence::{CharterWorkspace, FileStore, WorkspaceOptions};

use config::CliConfig;

#[derive(Parser)]
#[command(name = "charter")]
#[command(about = "Track Chartered Engineer evidence and draft the application")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "charter.toml")]
    config: String,

    /// Data directory
    #[arg(short, long, env = "CHARTER_DATA_DIR")]
    data_dir: Option<String>,

    /// Gemini API key (overrides config file)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("charter=info".parse()?)
                .add_directive("evidence=info".parse()?)
                .add_directive("charter_agent=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(std::path::Path::new(&cli.config))?;
    config.apply_overrides(cli.data_dir, cli.api_key);

    if config.backend.api_key.is_none() {
        warn!("No Gemini API key configured; assessments will be recorded as Red");
    }

    let storage = Arc::new(FileStore::open(&config.storage.data_dir).await?);
    let backend: Arc<dyn LlmBackend> = Arc::new(config.backend.build()?);
    info!(
        data_dir = %config.storage.data_dir.display(),
        model = %config.backend.model,
        "Opening workspace"
    );

    let workspace = CharterWorkspace::open_with(
        storage,
        backend,
        WorkspaceOptions {
            catalog: CompetencyCatalog::default(),
            policy: config.evidence.status_policy,
            gateway: config.gateway,
        },
    )
    .await?;

    let output = commands::execute(&workspace, cli.command).await?;
    println!("{}", output.trim_end());
    Ok(())
}
