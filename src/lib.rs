//! Parsing, normalization, ordering and binary encoding of LDAP
//! distinguished names (RFC 4514, with RFC 2253/1779 leniencies).
//!
//! ```
//! use ldap_dn_core::{Dn, OidMap};
//!
//! let dn = Dn::parse("CN=John Smith,dc=example,dc=com")?;
//! assert_eq!(dn.get(0), Some("dc=com"));
//!
//! let normalized = dn.normalize(&OidMap::standard())?;
//! assert_eq!(normalized.up_name(), "CN=John Smith,dc=example,dc=com");
//! assert!(normalized.norm_name().starts_with("2.5.4.3=john smith,"));
//! # Ok::<(), ldap_dn_core::DnError>(())
//! ```
pub use codec::{decode, encode};
pub use error::DnError;
pub use normalizer::{
    AttributeTypeConfig, BuiltinNormalizer, ConstantNormalizer, NameNormalizer, OidMap,
    OidNormalizer, ValueNormalizer,
};
pub use parser::{ParseTier, is_valid, parse_dn, parse_rdn};
pub use traits::WireRecord;
pub use types::{
    Ava, Dn, EMPTY_DN, Rdn, Value, ValueKind, escape_value, hex_dump, is_descr, is_numeric_oid,
    strip_oid_prefix, unescape_value,
};

pub mod codec;
mod error;
mod normalizer;
mod parser;
mod traits;
mod types;

/// Parses `text` into a [`Dn`].
pub fn parse(text: &str) -> Result<Dn, DnError> {
    Dn::parse(text)
}

#[cfg(test)]
mod tests;
