//! Data model for distinguished names.
//!
//! Canonical string forms:
//! - AVA: `normType=escapedValue`, e.g. `cn=Smith\, III`; binary values as
//!   `cn=#0400`
//! - RDN: AVAs joined with `+` in the order they were added
//! - DN: RDNs joined with `,`, leaf first
//!
//! Every type keeps the user provided text next to the canonical form;
//! only the canonical form takes part in comparisons.

mod ava;
mod dn;
mod escape;
mod oid;
mod rdn;
mod value;

pub use ava::Ava;
pub use dn::{Dn, EMPTY_DN};
pub use escape::{escape_value, hex_dump, unescape_value};
pub use oid::{is_descr, is_numeric_oid, strip_oid_prefix};
pub use rdn::Rdn;
pub use value::{Value, ValueKind};
