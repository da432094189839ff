use eyre::WrapErr;
use serde::{Deserialize, Serialize};
use std::{env, fs, net::SocketAddr, path::Path};

const DEFAULT_CONFIG: &str = include_str!("../config.yaml");
const API_KEY_ENV_VAR: &str = "ETHERSCAN_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub etherscan: EtherscanConfig,
    pub bigquery: BigQueryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtherscanConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

/// Where generated tables live and which public datasets the queries read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigQueryConfig {
    pub dataset_name: String,
    pub table_prefix: String,
    #[serde(default)]
    pub table_description: String,
    pub logs_table: String,
    pub traces_table: String,
    pub ethers_library: String,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Loads the configuration from `path`, or the bundled `config.yaml` when no path is given.
    ///
    /// The Etherscan API key can always be overridden through `ETHERSCAN_API_KEY`.
    pub fn load(path: Option<&Path>) -> eyre::Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
                Self::from_yaml(&raw)?
            }
            None => Self::from_yaml(DEFAULT_CONFIG)?,
        };

        if let Ok(api_key) = env::var(API_KEY_ENV_VAR) {
            if !api_key.is_empty() {
                config.etherscan.api_key = api_key;
            }
        }

        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> eyre::Result<Self> {
        let config: Config = serde_yaml::from_str(raw).wrap_err("Failed to parse configuration")?;
        Ok(config)
    }

    pub fn listen_addr(&self) -> eyre::Result<SocketAddr> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .wrap_err_with(|| format!("Invalid listen address {}:{}", self.server.host, self.server.port))
    }
}
