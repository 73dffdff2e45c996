//! Tripcheck CLI - validate, submit and collect bus-trip checklists

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tripcheck_cli::{resolve_config, run, Cli};
use tripcheck_core::{ObservabilityConfig, ObservabilityManager};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let mut observability = ObservabilityManager::new(ObservabilityConfig::from(&config.logging))?;
    observability.initialize()?;
    let observability = Arc::new(observability);

    let passed = run(cli.command, &config, observability, &mut std::io::stdout()).await?;
    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
