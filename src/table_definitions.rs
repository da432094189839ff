use crate::abi::{AbiEntry, AbiError, AbiItemType};
use crate::config::BigQueryConfig;
use crate::utils::normalize_address;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Column type used whenever a Solidity type has no dedicated mapping.
pub const DEFAULT_SQL_TYPE: &str = "STRING";

lazy_static! {
    static ref SOLIDITY_TO_SQL_TYPES: HashMap<&'static str, &'static str> = {
        let mut types = HashMap::new();
        types.insert("address", "STRING");
        types
    };
}

/// BigQuery type of a parsed Solidity value, as declared in the UDF return struct.
pub fn solidity_to_sql_type(solidity_type: &str) -> &'static str {
    SOLIDITY_TO_SQL_TYPES
        .get(solidity_type)
        .copied()
        .unwrap_or(DEFAULT_SQL_TYPE)
}

/// Descriptor consumed by the ETL job that materializes one parsed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub parser: ParserDefinition,
    pub table: TableSchema,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserDefinition {
    #[serde(rename = "type")]
    pub parser_type: String,
    pub contract_address: String,
    pub abi: AbiEntry,
    pub field_mapping: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub dataset_name: String,
    pub table_name: String,
    pub table_description: String,
    pub schema: Vec<ColumnDefinition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub sql_type: String,
}

/// `<prefix>_event_<name>` for events, `<prefix>_function_<name>` for functions.
pub fn create_table_name(table_prefix: &str, entry: &AbiEntry, item_type: AbiItemType) -> Result<String, AbiError> {
    Ok(format!("{}_{}_{}", table_prefix, item_type.as_str(), entry.name()?))
}

pub fn abi_to_table_definition(
    entry: &AbiEntry,
    contract_address: &str,
    item_type: AbiItemType,
    config: &BigQueryConfig,
) -> Result<TableDefinition, AbiError> {
    let table_name = create_table_name(&config.table_prefix, entry, item_type)?;

    // Parsing can fail per row, so every column is kept as a nullable STRING.
    let schema = entry
        .inputs
        .iter()
        .enumerate()
        .map(|(position, param)| ColumnDefinition {
            name: param.column_name(position),
            description: String::new(),
            sql_type: DEFAULT_SQL_TYPE.to_string(),
        })
        .collect();

    Ok(TableDefinition {
        parser: ParserDefinition {
            parser_type: item_type.parser_type().to_string(),
            contract_address: normalize_address(contract_address),
            abi: entry.clone(),
            field_mapping: Map::new(),
        },
        table: TableSchema {
            dataset_name: config.dataset_name.clone(),
            table_name,
            table_description: config.table_description.clone(),
            schema,
        },
    })
}
