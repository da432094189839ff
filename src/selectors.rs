use crate::abi::{AbiEntry, AbiError, AbiItemType, Param};
use alloy::json_abi::{Event, EventParam, Function, Param as JsonParam, StateMutability};
use alloy::primitives::hex;

/// Tuples must declare their components, otherwise the signature silently becomes `()`.
fn to_json_param(param: &Param) -> Result<JsonParam, AbiError> {
    let components = match &param.components {
        Some(components) => components.iter().map(to_json_param).collect::<Result<Vec<_>, _>>()?,
        None if param.ty.starts_with("tuple") => {
            return Err(AbiError::MissingComponents { param: param.name.clone() })
        }
        None => Vec::new(),
    };

    Ok(JsonParam {
        ty: param.ty.clone(),
        name: param.name.clone(),
        components,
        internal_type: None,
    })
}

pub fn to_alloy_event(entry: &AbiEntry) -> Result<Event, AbiError> {
    let inputs = entry
        .inputs
        .iter()
        .map(|param| {
            let JsonParam { ty, name, components, internal_type } = to_json_param(param)?;
            let indexed = param.extra.get("indexed").and_then(|v| v.as_bool()).unwrap_or(false);
            Ok(EventParam { ty, name, indexed, components, internal_type })
        })
        .collect::<Result<Vec<_>, AbiError>>()?;

    Ok(Event {
        name: entry.name()?.to_string(),
        inputs,
        anonymous: entry.extra.get("anonymous").and_then(|v| v.as_bool()).unwrap_or(false),
    })
}

/// Outputs and mutability do not take part in the selector and are left empty.
pub fn to_alloy_function(entry: &AbiEntry) -> Result<Function, AbiError> {
    Ok(Function {
        name: entry.name()?.to_string(),
        inputs: entry.inputs.iter().map(to_json_param).collect::<Result<Vec<_>, _>>()?,
        outputs: Vec::new(),
        state_mutability: StateMutability::NonPayable,
    })
}

/// Full 32-byte keccak of the event signature, matched against `topics[0]`.
pub fn event_topic(entry: &AbiEntry) -> Result<String, AbiError> {
    Ok(hex::encode_prefixed(to_alloy_event(entry)?.selector()))
}

/// First 4 bytes of the keccak of the function signature, matched against call data.
pub fn function_selector(entry: &AbiEntry) -> Result<String, AbiError> {
    Ok(hex::encode_prefixed(to_alloy_function(entry)?.selector()))
}

pub fn selector(entry: &AbiEntry, item_type: AbiItemType) -> Result<String, AbiError> {
    match item_type {
        AbiItemType::Event => event_topic(entry),
        AbiItemType::Function => function_selector(entry),
    }
}
