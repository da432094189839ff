//! BigQuery SQL generation for a single ABI item.
//!
//! Each query declares a temporary JavaScript UDF that decodes the raw log or
//! call data with ethers.js, then selects one row per matching log (events) or
//! call trace (functions) from the public Ethereum dataset. The SQL and the
//! embedded script live in `templates/` and are rendered with minijinja.

use crate::abi::{AbiEntry, AbiError, AbiItemType};
use crate::config::BigQueryConfig;
use crate::selectors::selector;
use crate::table_definitions::solidity_to_sql_type;
use crate::utils::normalize_address;
use minijinja::{context, AutoEscape, Environment};
use thiserror::Error;

/// The two fixed query shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryTemplate {
    EventLog,
    FunctionTrace,
}

impl QueryTemplate {
    const ALL: [QueryTemplate; 2] = [QueryTemplate::EventLog, QueryTemplate::FunctionTrace];

    pub fn for_item_type(item_type: AbiItemType) -> Self {
        match item_type {
            AbiItemType::Event => QueryTemplate::EventLog,
            AbiItemType::Function => QueryTemplate::FunctionTrace,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            QueryTemplate::EventLog => "event_log.sql",
            QueryTemplate::FunctionTrace => "function_trace.sql",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            QueryTemplate::EventLog => include_str!("../templates/event_log.sql.j2"),
            QueryTemplate::FunctionTrace => include_str!("../templates/function_trace.sql.j2"),
        }
    }
}

#[derive(Error, Debug)]
pub enum QueryError {
    #[error(transparent)]
    Abi(#[from] AbiError),
    #[error("failed to serialize ABI entry: {0}")]
    AbiJson(#[from] serde_json::Error),
    #[error("invalid query template {name}")]
    Template {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
    #[error("failed to render query template {name}")]
    Render {
        name: &'static str,
        #[source]
        source: minijinja::Error,
    },
}

/// Environment holding both query templates. SQL is never HTML-escaped.
fn create_environment() -> Result<Environment<'static>, QueryError> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);

    for template in QueryTemplate::ALL {
        env.add_template(template.name(), template.source())
            .map_err(|source| QueryError::Template { name: template.name(), source })?;
    }

    Ok(env)
}

/// `` `from` STRING, `to` STRING, `value` STRING ``
pub fn create_struct_fields(entry: &AbiEntry) -> String {
    entry
        .inputs
        .iter()
        .enumerate()
        .map(|(position, param)| {
            format!("`{}` {}", param.column_name(position), solidity_to_sql_type(&param.ty))
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders the query that extracts `entry` occurrences for `contract_address`.
pub fn abi_to_sql(
    entry: &AbiEntry,
    item_type: AbiItemType,
    contract_address: &str,
    config: &BigQueryConfig,
) -> Result<String, QueryError> {
    let template = QueryTemplate::for_item_type(item_type);
    let selector = selector(entry, item_type)?;
    let abi = serde_json::to_string(entry)?;

    let env = create_environment()?;
    let compiled = env
        .get_template(template.name())
        .map_err(|source| QueryError::Template { name: template.name(), source })?;

    compiled
        .render(context! {
            abi => abi,
            contract_address => normalize_address(contract_address),
            selector => selector,
            struct_fields => create_struct_fields(entry),
            columns => entry.input_names(),
            logs_table => &config.logs_table,
            traces_table => &config.traces_table,
            ethers_library => &config.ethers_library,
        })
        .map_err(|source| QueryError::Render { name: template.name(), source })
}
