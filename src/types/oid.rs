//! Syntax checks for attribute type names.

use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_OID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(0|[1-9][0-9]*)(\.(0|[1-9][0-9]*))+$").unwrap());

static DESCR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9-]*$").unwrap());

/// `numericoid = number 1*( DOT number )`, without leading zeros.
pub fn is_numeric_oid(text: &str) -> bool {
    NUMERIC_OID.is_match(text)
}

/// `descr = ALPHA *( ALPHA / DIGIT / HYPHEN )`
pub fn is_descr(text: &str) -> bool {
    DESCR.is_match(text)
}

/// Removes a leading `oid.` or `OID.` in front of a numeric OID.
pub fn strip_oid_prefix(text: &str) -> &str {
    match text.strip_prefix("oid.").or_else(|| text.strip_prefix("OID.")) {
        Some(rest) => rest,
        None => text,
    }
}
