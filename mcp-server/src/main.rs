use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use xoso_mcp::config;
use xoso_mcp::loader;
use xoso_mcp::mcp_handler::{MCPHandler, stdio};
use xoso_mcp::use_cases::{BetUseCase, RegistryUseCase, SettlementUseCase};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::info!("Ready to take bets.");

    let snapshots = Arc::new(loader::open(&config)?);

    let bet_use_case = BetUseCase::new(Arc::clone(&snapshots));

    let settlement_use_case = SettlementUseCase::new(Arc::clone(&snapshots), config.settlement);

    let registry_use_case = RegistryUseCase::new(Arc::clone(&snapshots));

    let handler = MCPHandler::new(
        Arc::new(bet_use_case),
        Arc::new(settlement_use_case),
        Arc::new(registry_use_case),
    );

    let (reader, writer) = stdio();

    handler.serve(reader, writer).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    Ok(())
}
