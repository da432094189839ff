use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// One item of a contract interface as returned by the explorer.
///
/// Only the fields the generators look at are typed. Everything else
/// (`anonymous`, `outputs`, `stateMutability`, ...) is carried in `extra`
/// so the entry serializes back to the same JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<Param>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<Param>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Param {
    /// Column name of the parameter; unnamed parameters are called `arg<position>`.
    pub fn column_name(&self, position: usize) -> String {
        if self.name.is_empty() {
            format!("arg{}", position)
        } else {
            self.name.clone()
        }
    }
}

/// The two kinds of ABI items that are turned into queries and tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbiItemType {
    Event,
    Function,
}

impl AbiItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbiItemType::Event => "event",
            AbiItemType::Function => "function",
        }
    }

    /// Parser tag used in table definitions: events come from logs, functions from traces.
    pub fn parser_type(&self) -> &'static str {
        match self {
            AbiItemType::Event => "log",
            AbiItemType::Function => "trace",
        }
    }
}

impl fmt::Display for AbiItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("{item_type} entry has no name")]
    MissingName { item_type: String },
    #[error("tuple parameter `{param}` has no components")]
    MissingComponents { param: String },
}

impl AbiEntry {
    pub fn is(&self, item_type: AbiItemType) -> bool {
        self.item_type == item_type.as_str()
    }

    pub fn name(&self) -> Result<&str, AbiError> {
        self.name.as_deref().ok_or_else(|| AbiError::MissingName {
            item_type: self.item_type.clone(),
        })
    }

    /// Output column names of the input parameters, in declaration order.
    pub fn input_names(&self) -> Vec<String> {
        self.inputs
            .iter()
            .enumerate()
            .map(|(position, p)| p.column_name(position))
            .collect()
    }
}

/// Entries of `abi` with the given type, in their original order.
pub fn filter_by_type(abi: &[AbiEntry], item_type: AbiItemType) -> impl Iterator<Item = &AbiEntry> + '_ {
    abi.iter().filter(move |entry| entry.is(item_type))
}

/// Key under which `item` is reported for this contract.
///
/// The bare name is used unless another named entry in `abi` shares it, in
/// which case the input types are appended: `approve_address_uint256`.
/// An ambiguous entry without inputs keeps its bare name.
pub fn abi_item_key(abi: &[AbiEntry], item: &AbiEntry) -> Result<String, AbiError> {
    let name = item.name()?;

    let mut name_counts: HashMap<&str, usize> = HashMap::new();
    for entry in abi {
        if let Some(entry_name) = entry.name.as_deref() {
            *name_counts.entry(entry_name).or_default() += 1;
        }
    }

    let is_ambiguous = name_counts.get(name).copied().unwrap_or(0) > 1;
    if !is_ambiguous || item.inputs.is_empty() {
        return Ok(name.to_string());
    }

    let input_types: Vec<&str> = item.inputs.iter().map(|p| p.ty.as_str()).collect();
    Ok(format!("{}_{}", name, input_types.join("_")))
}
