use crate::abi::AbiEntry;
use crate::config::EtherscanConfig;
use crate::utils::normalize_address;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

/// Source of contract interfaces, keyed by contract address.
#[async_trait]
pub trait AbiSource: Send + Sync {
    /// The full ABI of the contract, in declaration order.
    async fn get_abi(&self, address: &str) -> Result<Vec<AbiEntry>, EtherscanError>;

    /// The verified-source record of the contract.
    async fn get_contract(&self, address: &str) -> Result<ContractMetadata, EtherscanError>;
}

/// Record returned by `action=getsourcecode`.
///
/// Only `ContractName` is interpreted; `SourceCode`, `ABI`, `CompilerVersion`
/// and the rest are passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractMetadata {
    #[serde(rename = "ContractName", default)]
    pub contract_name: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Envelope shared by every Etherscan API response.
#[derive(Debug, Clone, Deserialize)]
struct EtherscanResponse {
    status: String,
    #[serde(default)]
    message: String,
    result: Value,
}

#[derive(Error, Debug)]
pub enum EtherscanError {
    #[error("Invalid Etherscan URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error("Request timeout")]
    TimeoutError,
    #[error("Unexpected HTTP status {0}")]
    HttpStatus(StatusCode),
    #[error("Malformed response: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("Etherscan error: {message} ({result})")]
    ApiError { message: String, result: String },
    #[error("Invalid ABI: {0}")]
    InvalidAbi(#[source] serde_json::Error),
    #[error("No verified contract found at {0}")]
    ContractNotFound(String),
}

#[derive(Debug, Clone)]
pub struct EtherscanClient {
    url: Url,
    api_key: String,
    client: reqwest::Client,
}

impl EtherscanClient {
    pub fn new(config: &EtherscanConfig) -> Result<Self, EtherscanError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            url: Url::parse(&config.base_url)?,
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn contract_url(&self, action: &str, address: &str) -> Url {
        let mut url = self.url.clone();

        let query_string = form_urlencoded::Serializer::new(String::new())
            .append_pair("module", "contract")
            .append_pair("action", action)
            .append_pair("address", address)
            .append_pair("apikey", &self.api_key)
            .finish();

        url.set_query(Some(&query_string));
        url
    }

    /// Issues a single request and unwraps the `{status, message, result}` envelope.
    ///
    /// The URL carries the API key, so only the action and address are logged.
    async fn make_request(&self, action: &str, address: &str) -> Result<Value, EtherscanError> {
        let url = self.contract_url(action, address);

        let response = self.client.get(url).send().await.map_err(|e| {
            warn!(action, address, "Etherscan request failed: {}", e);
            if e.is_timeout() {
                EtherscanError::TimeoutError
            } else {
                EtherscanError::RequestError(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(action, address, %status, "Etherscan returned an error status");
            return Err(EtherscanError::HttpStatus(status));
        }

        let body = response.text().await?;
        let envelope: EtherscanResponse = serde_json::from_str(&body).map_err(|e| {
            warn!(action, address, "Failed to parse Etherscan response: {}", e);
            EtherscanError::MalformedResponse(e)
        })?;

        if envelope.status != "1" {
            let result = match envelope.result {
                Value::String(s) => s,
                other => other.to_string(),
            };
            warn!(action, address, message = %envelope.message, result = %result, "Etherscan rejected the request");
            return Err(EtherscanError::ApiError {
                message: envelope.message,
                result,
            });
        }

        debug!(action, address, "Etherscan request succeeded");
        Ok(envelope.result)
    }
}

#[async_trait]
impl AbiSource for EtherscanClient {
    async fn get_abi(&self, address: &str) -> Result<Vec<AbiEntry>, EtherscanError> {
        let address = normalize_address(address);
        let result = self.make_request("getabi", &address).await?;

        // The ABI itself is a JSON document encoded as a string.
        let raw = match result {
            Value::String(raw) => raw,
            other => {
                return Err(EtherscanError::ApiError {
                    message: "ABI result is not a string".to_string(),
                    result: other.to_string(),
                })
            }
        };

        serde_json::from_str(&raw).map_err(EtherscanError::InvalidAbi)
    }

    async fn get_contract(&self, address: &str) -> Result<ContractMetadata, EtherscanError> {
        let address = normalize_address(address);
        let result = self.make_request("getsourcecode", &address).await?;

        let records: Vec<ContractMetadata> =
            serde_json::from_value(result).map_err(EtherscanError::MalformedResponse)?;

        records
            .into_iter()
            .find(|record| !record.contract_name.is_empty())
            .ok_or(EtherscanError::ContractNotFound(address))
    }
}
