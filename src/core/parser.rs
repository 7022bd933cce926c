//! DSC-003: YAML loading for schemas, desired state and bridge configuration.
//!
//! Desired-state documents are converted into [`PsValue`] trees:
//! - `!Sensitive value` marks a secret
//! - a mapping with a `cim_instance_type` key is a CIM instance of that class
//! - any other tag, or a non-string key, is rejected as unsupported

use super::types::*;
use crate::error::BridgeError;
use indexmap::IndexMap;
use serde_yaml_ng::value::TaggedValue;
use serde_yaml_ng::Value;
use std::path::Path;

/// Key marking a mapping as a CIM instance.
pub const CIM_INSTANCE_TYPE_KEY: &str = "cim_instance_type";

/// YAML tag marking a value as sensitive.
pub const SENSITIVE_TAG: &str = "Sensitive";

fn read_file(path: &Path) -> Result<String, BridgeError> {
    std::fs::read_to_string(path).map_err(|source| BridgeError::Read {
        path: path.display().to_string(),
        source,
    })
}

/// Parse a resource schema file from disk.
pub fn parse_schema_file(path: &Path) -> Result<ResourceSchema, BridgeError> {
    parse_schema(&read_file(path)?)
}

/// Parse a resource schema from a string.
pub fn parse_schema(yaml: &str) -> Result<ResourceSchema, BridgeError> {
    serde_yaml_ng::from_str(yaml).map_err(|source| BridgeError::Yaml {
        what: "schema".to_string(),
        source,
    })
}

/// Parse a desired-state (or identity) file from disk.
pub fn parse_properties_file(path: &Path) -> Result<Properties, BridgeError> {
    parse_properties(&read_file(path)?)
}

/// Parse a desired-state document: a top-level mapping of property → value.
pub fn parse_properties(yaml: &str) -> Result<Properties, BridgeError> {
    let doc: Value = serde_yaml_ng::from_str(yaml).map_err(|source| BridgeError::Yaml {
        what: "desired state".to_string(),
        source,
    })?;
    match doc {
        Value::Null => Ok(Properties::new()),
        Value::Mapping(_) => match value_from_yaml(doc)? {
            PsValue::Map(m) => Ok(Properties(m)),
            other => Err(BridgeError::unsupported(
                "document",
                format!("{:?}", other),
            )),
        },
        other => Err(BridgeError::unsupported(
            "document",
            format!("{:?}", other),
        )),
    }
}

/// Convert a YAML value into a [`PsValue`].
pub fn value_from_yaml(value: Value) -> Result<PsValue, BridgeError> {
    match value {
        Value::Null => Ok(PsValue::Null),
        Value::Bool(b) => Ok(PsValue::Bool(b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(PsValue::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(PsValue::Float(f))
            } else {
                Err(BridgeError::unsupported("number", n.to_string()))
            }
        }
        Value::String(s) => Ok(PsValue::String(s)),
        Value::Sequence(items) => items
            .into_iter()
            .map(value_from_yaml)
            .collect::<Result<Vec<_>, _>>()
            .map(PsValue::Array),
        Value::Mapping(mapping) => {
            let mut map = IndexMap::new();
            for (k, v) in mapping {
                let key = match k {
                    Value::String(s) => s,
                    other => {
                        return Err(BridgeError::unsupported(
                            "mapping key",
                            format!("{:?}", other),
                        ))
                    }
                };
                map.insert(key, value_from_yaml(v)?);
            }
            match map.shift_remove(CIM_INSTANCE_TYPE_KEY) {
                Some(PsValue::String(class_name)) => Ok(PsValue::Instance(CimInstance {
                    class_name,
                    properties: map,
                })),
                Some(other) => Err(BridgeError::unsupported(
                    CIM_INSTANCE_TYPE_KEY,
                    format!("{:?}", other),
                )),
                None => Ok(PsValue::Map(map)),
            }
        }
        Value::Tagged(tagged) => {
            let TaggedValue { tag, value } = *tagged;
            if tag == SENSITIVE_TAG {
                match value {
                    Value::String(s) => Ok(PsValue::Secret(Secret::new(s))),
                    Value::Number(n) => Ok(PsValue::Secret(Secret::new(n.to_string()))),
                    _ => Err(BridgeError::unsupported(
                        "!Sensitive",
                        "non-scalar sensitive value",
                    )),
                }
            } else {
                Err(BridgeError::unsupported(tag.to_string(), format!("{:?}", value)))
            }
        }
    }
}

/// Load the bridge configuration; a missing file yields the defaults.
pub fn parse_config_file(path: &Path) -> Result<BridgeConfig, BridgeError> {
    if !path.exists() {
        return Ok(BridgeConfig::default());
    }
    parse_config(&read_file(path)?)
}

/// Parse bridge configuration from a string.
pub fn parse_config(yaml: &str) -> Result<BridgeConfig, BridgeError> {
    if yaml.trim().is_empty() {
        return Ok(BridgeConfig::default());
    }
    serde_yaml_ng::from_str(yaml).map_err(|source| BridgeError::Yaml {
        what: "config".to_string(),
        source,
    })
}
