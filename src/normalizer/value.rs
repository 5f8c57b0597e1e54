//! Value normalizers: the per-attribute-type canonicalization of values.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::DnError;
use crate::types::Value;

/// Turns a user provided value into its canonical form.
///
/// Implemented by [`BuiltinNormalizer`] and by any
/// `Fn(&Value) -> Result<Value, DnError>`.
pub trait ValueNormalizer: Send + Sync {
    fn normalize(&self, value: &Value) -> Result<Value, DnError>;
}

impl<F> ValueNormalizer for F
where
    F: Fn(&Value) -> Result<Value, DnError> + Send + Sync,
{
    fn normalize(&self, value: &Value) -> Result<Value, DnError> {
        self(value)
    }
}

/// Normalizers that can be named in configuration.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum BuiltinNormalizer {
    /// Leaves the value as is.
    #[default]
    NoOp,
    /// Collapses runs of whitespace into one space and trims both ends.
    DeepTrim,
    /// `DeepTrim`, then lower-cases.
    DeepTrimToLower,
    /// Drops spaces; anything but ASCII digits is rejected.
    NumericString,
}

impl ValueNormalizer for BuiltinNormalizer {
    fn normalize(&self, value: &Value) -> Result<Value, DnError> {
        match self {
            BuiltinNormalizer::NoOp => Ok(value.clone()),
            BuiltinNormalizer::DeepTrim => Ok(value.map_text(deep_trim)),
            BuiltinNormalizer::DeepTrimToLower => {
                Ok(value.map_text(|s| deep_trim(s).to_lowercase()))
            }
            BuiltinNormalizer::NumericString => numeric_string(value),
        }
    }
}

fn deep_trim(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn numeric_string(value: &Value) -> Result<Value, DnError> {
    let Some(text) = value.as_str() else {
        return Err(DnError::InvalidValue(
            "a numeric string cannot be binary".to_string(),
        ));
    };

    let digits: String = text.chars().filter(|c| *c != ' ').collect();
    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(DnError::InvalidValue(format!(
            "'{bad}' is not allowed in a numeric string"
        )));
    }
    Ok(Value::Text(digits))
}
