use crate::abi::{abi_item_key, filter_by_type, AbiEntry, AbiError, AbiItemType};
use crate::config::BigQueryConfig;
use crate::queries::{abi_to_sql, QueryError};
use crate::table_definitions::{abi_to_table_definition, TableDefinition};
use std::collections::BTreeMap;
use tracing::warn;

/// Events first, then functions, matching the order results are keyed in.
const ITEM_TYPES: [AbiItemType; 2] = [AbiItemType::Event, AbiItemType::Function];

/// Runs `build` for every event and function of `abi`, keyed by [`abi_item_key`].
fn build_for_items<T, E>(
    abi: &[AbiEntry],
    mut build: impl FnMut(&AbiEntry, AbiItemType) -> Result<T, E>,
) -> Result<BTreeMap<String, T>, E>
where
    E: From<AbiError>,
{
    let mut result = BTreeMap::new();

    for item_type in ITEM_TYPES {
        for entry in filter_by_type(abi, item_type) {
            let key = abi_item_key(abi, entry)?;
            let value = build(entry, item_type)?;

            if result.insert(key.clone(), value).is_some() {
                warn!(key = %key, item_type = %item_type, "Duplicate ABI item key, keeping the last item");
            }
        }
    }

    Ok(result)
}

/// One rendered query per event and function of the contract.
pub fn contract_to_sqls(
    abi: &[AbiEntry],
    contract_address: &str,
    config: &BigQueryConfig,
) -> Result<BTreeMap<String, String>, QueryError> {
    build_for_items(abi, |entry, item_type| abi_to_sql(entry, item_type, contract_address, config))
}

/// One table definition per event and function of the contract.
pub fn contract_to_table_definitions(
    abi: &[AbiEntry],
    contract_address: &str,
    config: &BigQueryConfig,
) -> Result<BTreeMap<String, TableDefinition>, AbiError> {
    build_for_items(abi, |entry, item_type| {
        abi_to_table_definition(entry, contract_address, item_type, config)
    })
}
