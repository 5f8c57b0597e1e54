//! Attribute values carried by an AVA.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumDiscriminants};

use super::escape::hex_dump;

/// An attribute value, either human readable text or an opaque byte string.
///
/// The kind is fixed when the value is created: a hexstring (`#0400`) in a
/// DN always produces [`Value::Binary`], everything else [`Value::Text`].
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumDiscriminants,
)]
#[strum_discriminants(name(ValueKind), derive(StrumDisplay))]
#[serde(tag = "type", content = "value")]
pub enum Value {
    Text(String),
    Binary(Vec<u8>),
}

impl Value {
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn binary(value: impl Into<Vec<u8>>) -> Self {
        Value::Binary(value.into())
    }

    pub fn kind(&self) -> ValueKind {
        ValueKind::from(self)
    }

    pub fn is_binary(&self) -> bool {
        matches!(self, Value::Binary(_))
    }

    /// The text, or `None` for a binary value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Binary(_) => None,
        }
    }

    /// Raw bytes; the UTF-8 encoding for text.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Text(s) => s.as_bytes(),
            Value::Binary(b) => b,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Applies `f` to text values, leaving binary values untouched.
    pub fn map_text(&self, f: impl FnOnce(&str) -> String) -> Value {
        match self {
            Value::Text(s) => Value::Text(f(s)),
            Value::Binary(b) => Value::Binary(b.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Text(s) => write!(f, "{s}"),
            Value::Binary(b) => write!(f, "#{}", hex_dump(b)),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Binary(value)
    }
}
