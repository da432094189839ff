use abi_sql_api::config::Config;
use abi_sql_api::etherscan::EtherscanClient;
use abi_sql_api::logging;
use abi_sql_api::server::{self, AppState};

use clap::Parser;
use eyre::{Result, WrapErr};
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};

/// Generates BigQuery parsing queries and table definitions from verified contract ABIs.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// Path to the YAML configuration file. Defaults to the bundled config.yaml.
    #[arg(long, env = "ABI_SQL_CONFIG")]
    config: Option<PathBuf>,
    /// Port to listen on, overriding the configuration file.
    #[arg(long, env = "ABI_SQL_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    let mut config = Config::load(cli.config.as_deref()).wrap_err("Failed to load configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    if config.etherscan.api_key.is_empty() {
        warn!("No Etherscan API key configured, requests will be rate limited");
    }

    let client = EtherscanClient::new(&config.etherscan).wrap_err("Failed to create Etherscan client")?;
    let state = AppState::new(Arc::new(client), config.bigquery.clone());

    let addr = config.listen_addr()?;
    info!(dataset = %config.bigquery.dataset_name, prefix = %config.bigquery.table_prefix, "Starting ABI SQL API");

    server::serve(addr, state).await.wrap_err("Server failed")
}
