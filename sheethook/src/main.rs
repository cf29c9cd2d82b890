use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use sheethook::config::Config;
use sheethook::server;
use sheethook::store::WorkbookStore;
use sheethook::upsert::CellValue;

#[derive(Parser)]
#[command(name = "sheethook", about = "Webhook upsert service for spreadsheet rows")]
struct Cli {
    /// Path to the config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the webhook server
    Serve,
    /// Create a starter workbook with a config sheet and an example destination
    Init {
        /// Overwrite an existing workbook
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve => server::run(&config).await,
        Command::Init { force } => init_workbook(&config, force),
    }
}

/// Write a fresh workbook at the configured path: the config sheet with a
/// destination block and a column block, plus an empty destination sheet
/// whose columns those mappings point at.
fn init_workbook(config: &Config, force: bool) -> Result<()> {
    if config.workbook.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            config.workbook.display()
        );
    }

    let text = |s: &str| CellValue::Text(s.to_string());
    let config_rows = vec![
        vec![
            text("sheet_id"),
            text("sheet_name"),
            text(""),
            text("sheet_id"),
            text("col_id"),
            text("col_name"),
        ],
        vec![
            text("kv1"),
            text("destination"),
            text(""),
            text("kv1"),
            text("k1"),
            text("key"),
        ],
        vec![
            text(""),
            text(""),
            text(""),
            text("kv1"),
            text("v1"),
            text("value"),
        ],
    ];
    let destination_rows = vec![vec![text("key"), text("value")]];

    WorkbookStore::create(
        &config.workbook,
        vec![
            (config.config_sheet.clone(), config_rows),
            ("destination".to_string(), destination_rows),
        ],
    )
    .with_context(|| format!("Failed to create workbook: {}", config.workbook.display()))?;

    log::info!("Created starter workbook at {}", config.workbook.display());
    Ok(())
}
