//! DSC-002: Error taxonomy for the bridge.

use thiserror::Error;

/// Errors surfaced by script generation, transport, and the provider.
///
/// Nothing in this crate retries; every variant reaches the caller once.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A value the script formatter cannot express.
    #[error("unsupported type {kind} of value '{value}'")]
    UnsupportedValue { kind: String, value: String },

    /// A desired-state property that the resource schema does not declare.
    #[error("property '{property}' is not an attribute of {resource}")]
    UnknownProperty { property: String, resource: String },

    /// A PSCredential property that is not a `{user, password}` mapping.
    #[error("credential property '{property}' must be a mapping with 'user' and 'password'")]
    InvalidCredential { property: String },

    /// The interpreter produced no output at all.
    #[error("Nothing returned")]
    NothingReturned { stderr: String },

    /// The interpreter answered with something that is not the expected JSON.
    #[error("malformed response from interpreter: {source}")]
    Protocol {
        #[source]
        source: serde_json::Error,
    },

    /// Invoke-DscResource reported a failure; the message is passed through verbatim.
    #[error("{0}")]
    Primitive(String),

    #[error("failed to run interpreter '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error in {what}: {source}")]
    Yaml {
        what: String,
        #[source]
        source: serde_yaml_ng::Error,
    },

    #[error("JSON serialize error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    pub(crate) fn unsupported(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dsc002_primitive_message_is_verbatim() {
        let e = BridgeError::Primitive("boom".to_string());
        assert_eq!(e.to_string(), "boom");
    }

    #[test]
    fn test_dsc002_nothing_returned_display() {
        let e = BridgeError::NothingReturned {
            stderr: "pwsh: not found".to_string(),
        };
        assert_eq!(e.to_string(), "Nothing returned");
    }

    #[test]
    fn test_dsc002_protocol_wraps_parse_error() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let e = BridgeError::Protocol { source };
        assert!(e.to_string().starts_with("malformed response from interpreter"));
    }

    #[test]
    fn test_dsc002_unsupported_value() {
        let e = BridgeError::unsupported("!Binary", "aGVsbG8=");
        assert_eq!(e.to_string(), "unsupported type !Binary of value 'aGVsbG8='");
    }
}
