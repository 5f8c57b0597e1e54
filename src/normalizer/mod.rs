//! Normalization of attribute types and values.
//!
//! A [`NameNormalizer`] turns the AVAs of a parsed name into their canonical
//! form. Two are provided:
//!
//! - [`ConstantNormalizer`] lower-cases the type and runs one value
//!   normalizer on every value, whatever the type.
//! - [`OidMap`] replaces known types by their OID and runs the value
//!   normalizer registered for that OID. Unknown types are left alone.
//!
//! Both keep the user provided type, value and name of every AVA, and both
//! work from the user provided value, so normalizing twice gives the same
//! result as normalizing once.

mod oid_map;
mod value;

use tracing::trace;

use crate::error::DnError;
use crate::types::{Ava, Value, strip_oid_prefix};

pub use oid_map::{AttributeTypeConfig, OidMap, OidNormalizer};
pub use value::{BuiltinNormalizer, ValueNormalizer};

/// Produces the canonical form of an AVA.
pub trait NameNormalizer: Send + Sync {
    fn normalize_ava(&self, ava: &Ava) -> Result<Ava, DnError>;
}

/// The attribute type as written, trimmed and without its `oid.` prefix.
fn bare_type(ava: &Ava) -> Result<&str, DnError> {
    let ty = strip_oid_prefix(ava.up_type().trim());
    if ty.is_empty() {
        return Err(DnError::EmptyAttributeType);
    }
    Ok(ty)
}

fn normalize_value(
    normalizer: &dyn ValueNormalizer,
    ava: &Ava,
) -> Result<Value, DnError> {
    normalizer
        .normalize(ava.up_value())
        .map_err(|err| DnError::Normalization {
            attribute: ava.up_type().to_string(),
            reason: err.to_string(),
        })
}

/// Applies one value normalizer to every AVA.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConstantNormalizer<V = BuiltinNormalizer> {
    normalizer: V,
}

impl<V: ValueNormalizer> ConstantNormalizer<V> {
    pub fn new(normalizer: V) -> Self {
        ConstantNormalizer { normalizer }
    }
}

impl<V: ValueNormalizer> NameNormalizer for ConstantNormalizer<V> {
    fn normalize_ava(&self, ava: &Ava) -> Result<Ava, DnError> {
        let norm_type = bare_type(ava)?.to_ascii_lowercase();
        let norm_value = normalize_value(&self.normalizer, ava)?;
        ava.renormalized(norm_type, norm_value)
    }
}

impl NameNormalizer for OidMap {
    fn normalize_ava(&self, ava: &Ava) -> Result<Ava, DnError> {
        let ty = bare_type(ava)?;
        let Some(entry) = self.get(ty).or_else(|| self.get(ava.norm_type())) else {
            trace!(
                event = "Normalize",
                phase = "UnknownType",
                attribute = ty
            );
            return Ok(ava.clone());
        };

        let norm_value = normalize_value(entry.normalizer(), ava)?;
        ava.renormalized(entry.oid().to_string(), norm_value)
    }
}
