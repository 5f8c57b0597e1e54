//! Attribute type and value, the atomic component of a DN.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};

use crate::error::DnError;

use super::escape::{escape_value, hex_dump};
use super::value::Value;

/// An `attributeType=attributeValue` pair.
///
/// Keeps both the user provided spelling (`up_*`) and the canonical one
/// (`norm_*`). Only the canonical type and value take part in equality,
/// ordering and hashing.
#[derive(Debug, Clone)]
pub struct Ava {
    pub(crate) up_type: String,
    pub(crate) norm_type: String,
    pub(crate) up_value: Value,
    pub(crate) norm_value: Value,
    pub(crate) up_name: String,
    pub(crate) start: usize,
    pub(crate) length: usize,
}

impl Ava {
    /// Create an AVA from its user provided and normalized parts.
    ///
    /// A blank `up_type` falls back to `norm_type` and the other way round;
    /// when both are blank the AVA is malformed. The normalized type is
    /// trimmed and lower-cased. Both values must be of the same kind; an
    /// empty value is allowed, as in `cn=`.
    pub fn new(
        up_type: impl Into<String>,
        norm_type: impl Into<String>,
        up_value: Value,
        norm_value: Value,
    ) -> Result<Self, DnError> {
        let (up_type, norm_type) = resolve_types(up_type.into(), norm_type.into())?;
        let up_name = format!("{up_type}={up_value}");
        Self::assemble(up_type, norm_type, up_value, norm_value, up_name)
    }

    /// Like [`Ava::new`] but keeping an explicit user provided name, as
    /// found in the source text.
    pub fn with_up_name(
        up_type: impl Into<String>,
        norm_type: impl Into<String>,
        up_value: Value,
        norm_value: Value,
        up_name: impl Into<String>,
    ) -> Result<Self, DnError> {
        let (up_type, norm_type) = resolve_types(up_type.into(), norm_type.into())?;
        Self::assemble(up_type, norm_type, up_value, norm_value, up_name.into())
    }

    fn assemble(
        up_type: String,
        norm_type: String,
        up_value: Value,
        norm_value: Value,
        up_name: String,
    ) -> Result<Self, DnError> {
        if up_value.kind() != norm_value.kind() {
            return Err(DnError::MalformedAva(format!(
                "user provided value is {} but normalized value is {}",
                up_value.kind(),
                norm_value.kind()
            )));
        }

        let length = up_name.len();
        Ok(Ava {
            up_type,
            norm_type,
            up_value,
            norm_value,
            up_name,
            start: 0,
            length,
        })
    }

    /// Places the AVA at `start` in the text of its owning DN.
    pub(crate) fn located(mut self, start: usize) -> Self {
        self.start = start;
        self
    }

    pub fn up_type(&self) -> &str {
        &self.up_type
    }

    pub fn norm_type(&self) -> &str {
        &self.norm_type
    }

    pub fn up_value(&self) -> &Value {
        &self.up_value
    }

    pub fn norm_value(&self) -> &Value {
        &self.norm_value
    }

    pub fn up_name(&self) -> &str {
        &self.up_name
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn is_binary(&self) -> bool {
        self.norm_value.is_binary()
    }

    /// The canonical `type=value` form, with the value escaped. Binary
    /// values are written as a `#` hexstring.
    pub fn norm_name(&self) -> String {
        match &self.norm_value {
            Value::Text(s) => format!("{}={}", self.norm_type, escape_value(s)),
            Value::Binary(b) => format!("{}=#{}", self.norm_type, hex_dump(b)),
        }
    }

    /// Replaces the canonical type and value, keeping the user provided
    /// parts.
    pub(crate) fn renormalized(&self, norm_type: String, norm_value: Value) -> Result<Self, DnError> {
        let (_, norm_type) = resolve_types(self.up_type.clone(), norm_type)?;
        let mut ava = Self::assemble(
            self.up_type.clone(),
            norm_type,
            self.up_value.clone(),
            norm_value,
            self.up_name.clone(),
        )?;
        ava.start = self.start;
        ava.length = self.length;
        Ok(ava)
    }
}

fn resolve_types(up_type: String, norm_type: String) -> Result<(String, String), DnError> {
    let up_trimmed = up_type.trim();
    let norm_trimmed = norm_type.trim();

    match (up_trimmed.is_empty(), norm_trimmed.is_empty()) {
        (true, true) => Err(DnError::MalformedAva(
            "attribute type must not be empty".to_string(),
        )),
        (true, false) => Ok((norm_type.clone(), norm_trimmed.to_ascii_lowercase())),
        (false, true) => Ok((up_type.clone(), up_trimmed.to_ascii_lowercase())),
        (false, false) => Ok((up_type.clone(), norm_trimmed.to_ascii_lowercase())),
    }
}

impl PartialEq for Ava {
    fn eq(&self, other: &Self) -> bool {
        self.norm_type == other.norm_type && self.norm_value == other.norm_value
    }
}

impl Eq for Ava {}

impl Hash for Ava {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.norm_type.hash(state);
        self.norm_value.hash(state);
    }
}

impl PartialOrd for Ava {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ava {
    fn cmp(&self, other: &Self) -> Ordering {
        self.norm_type
            .cmp(&other.norm_type)
            .then_with(|| self.norm_value.cmp(&other.norm_value))
    }
}

impl Display for Ava {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.up_name)
    }
}
