use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every failure the DN engine can surface to a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DnError {
    #[error("invalid DN syntax (RFC 4514) at offset {position}: {reason}")]
    Syntax { reason: String, position: usize },

    #[error("malformed attribute type and value: {0}")]
    MalformedAva(String),

    #[error("attribute type is empty after removing the OID prefix")]
    EmptyAttributeType,

    #[error("invalid attribute value: {0}")]
    InvalidValue(String),

    #[error("cannot normalize attribute '{attribute}': {reason}")]
    Normalization { attribute: String, reason: String },

    #[error("cannot encode record: missing or invalid field '{field}'")]
    Codec { field: String },

    #[error("cannot decode record: invalid field '{field}'")]
    InvalidRecord { field: String },

    #[error("stream ended while reading field '{field}'")]
    TruncatedStream { field: String },

    #[error("{0} unexpected bytes after the end of the record")]
    TrailingData(usize),

    #[error("position {posn} is out of bounds for a DN of {size} RDNs")]
    IndexOutOfBounds { posn: usize, size: usize },

    #[error("invalid numeric OID: {0}")]
    InvalidOid(String),

    #[error("invalid schema configuration: {0}")]
    Config(String),
}

impl DnError {
    pub(crate) fn syntax(reason: impl Into<String>, position: usize) -> Self {
        DnError::Syntax {
            reason: reason.into(),
            position,
        }
    }

    pub(crate) fn codec(field: &str) -> Self {
        DnError::Codec {
            field: field.to_string(),
        }
    }

    pub(crate) fn invalid_record(field: &str) -> Self {
        DnError::InvalidRecord {
            field: field.to_string(),
        }
    }

    pub(crate) fn truncated(field: &str) -> Self {
        DnError::TruncatedStream {
            field: field.to_string(),
        }
    }
}

impl From<serde_json::Error> for DnError {
    fn from(err: serde_json::Error) -> Self {
        DnError::Config(err.to_string())
    }
}
