pub mod browser;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod retry;
pub mod scrapers;
pub mod services;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;

use crate::browser::ChromeLoader;
use crate::cli::Command;
use crate::config::AppConfig;
use crate::database::ImportStore;
use crate::services::SyncOrchestrator;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

fn build_orchestrator(config: &AppConfig) -> Result<SyncOrchestrator<ChromeLoader>> {
    let store = ImportStore::open(&config.database_path)
        .with_context(|| format!("Failed to open database {}", config.database_path))?;
    let loader = ChromeLoader::new(config.browser.clone());
    Ok(SyncOrchestrator::new(loader, store, config))
}

pub fn handle_sync(keyword: &str, json: bool) -> Result<()> {
    let config = AppConfig::from_env();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let orchestrator = build_orchestrator(&config)?;
        let summary = orchestrator.full_sync(keyword).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            summary.print();
        }
        Ok::<(), anyhow::Error>(())
    })
}

pub fn handle_lookup(keyword: &str, nickname: &str, cap: usize, json: bool) -> Result<()> {
    let config = AppConfig::from_env();
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let orchestrator = build_orchestrator(&config)?;
        let result = orchestrator.bounded_lookup(keyword, nickname, cap).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            result.print();
        }
        Ok::<(), anyhow::Error>(())
    })
}

pub fn handle_init_db() -> Result<()> {
    let config = AppConfig::from_env();
    ImportStore::open(&config.database_path)?;
    log::info!("Database ready at {}", config.database_path);
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
