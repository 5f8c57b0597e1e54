//! Text parsing of DNs and RDNs.
//!
//! Two tiers share one grammar (RFC 4514, with the RFC 2253/1779
//! leniencies: `;` separators and spaces around `=`, `,` and `+`):
//!
//! - [`FastParser`] handles plain ASCII names in a single pass and answers
//!   [`FastParseOutcome::TooComplex`] as soon as it meets anything else.
//! - [`ComplexParser`] implements the whole grammar and is the only source
//!   of syntax errors.
//!
//! [`parse_dn`] tries the first and falls back to the second, starting over
//! from the beginning of the text.

mod complex;
mod fast;

use std::ops::Range;

use strum_macros::{AsRefStr, Display};
use tracing::{debug, trace};

use crate::error::DnError;
use crate::types::{Ava, Rdn, Value};

pub(crate) use complex::ComplexParser;
pub(crate) use fast::{FastParseOutcome, FastParser};

/// Which parser produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
pub enum ParseTier {
    Fast,
    Full,
}

/// Parses a DN into its RDNs, leaf first.
pub fn parse_dn(text: &str) -> Result<Vec<Rdn>, DnError> {
    match FastParser::new(text).parse() {
        FastParseOutcome::Done(rdns) => {
            trace!(
                event = "Parse",
                phase = "Done",
                tier = ParseTier::Fast.as_ref(),
                rdns = rdns.len()
            );
            Ok(rdns)
        }
        FastParseOutcome::TooComplex { reason, position } => {
            debug!(
                event = "Parse",
                phase = "Escalate",
                reason = reason,
                position = position
            );
            let rdns = ComplexParser::new(text).parse_dn()?;
            trace!(
                event = "Parse",
                phase = "Done",
                tier = ParseTier::Full.as_ref(),
                rdns = rdns.len()
            );
            Ok(rdns)
        }
    }
}

/// Parses exactly one RDN; a separator after it is a syntax error.
pub fn parse_rdn(text: &str) -> Result<Rdn, DnError> {
    ComplexParser::new(text).parse_rdn()
}

pub fn is_valid(text: &str) -> bool {
    parse_dn(text).is_ok()
}

/// Decodes one attribute value as it would appear after `=`: pairs become
/// the characters they stand for, a `#` hexstring becomes bytes, a quoted
/// string loses its quotes.
pub fn unescape_value(text: &str) -> Result<Value, DnError> {
    ComplexParser::new(text).parse_value()
}

/// Length of the attribute type at the start of `bytes`.
///
/// Accepts `descr` (`ALPHA *(ALPHA / DIGIT / "-")`) and `numericoid`,
/// the latter optionally written with an `oid.`/`OID.` prefix.
pub(crate) fn attribute_type_len(bytes: &[u8]) -> Option<usize> {
    if bytes.starts_with(b"oid.") || bytes.starts_with(b"OID.") {
        if let Some(len) = numericoid_len(&bytes[4..]) {
            return Some(len + 4);
        }
    }

    match bytes.first()? {
        b if b.is_ascii_alphabetic() => Some(
            bytes
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
                .count(),
        ),
        b if b.is_ascii_digit() => numericoid_len(bytes),
        _ => None,
    }
}

fn numericoid_len(bytes: &[u8]) -> Option<usize> {
    let mut pos = number_len(bytes)?;
    let mut arcs = 1;

    while bytes.get(pos) == Some(&b'.') {
        pos += 1;
        pos += number_len(&bytes[pos..])?;
        arcs += 1;
    }

    if arcs < 2 { None } else { Some(pos) }
}

/// `number = DIGIT / ( LDIGIT 1*DIGIT )`
fn number_len(bytes: &[u8]) -> Option<usize> {
    let len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    match len {
        0 => None,
        1 => Some(1),
        _ if bytes[0] == b'0' => None,
        _ => Some(len),
    }
}

/// Builds a parsed AVA. Its user provided name is the source text from the
/// type to the end of the value, trailing unescaped spaces excluded.
pub(crate) fn build_ava(
    input: &str,
    ty: Range<usize>,
    value: Value,
    value_end: usize,
) -> Result<Ava, DnError> {
    let up_type = &input[ty.clone()];
    let up_name = &input[ty.start..value_end];
    Ok(Ava::with_up_name(up_type, up_type, value.clone(), value, up_name)?.located(ty.start))
}

/// Builds a parsed RDN spanning its first to its last AVA.
pub(crate) fn build_rdn(input: &str, avas: Vec<Ava>) -> Rdn {
    let start = avas.first().map(Ava::start).unwrap_or_default();
    let end = avas
        .last()
        .map(|ava| ava.start() + ava.length())
        .unwrap_or(start);
    Rdn::from_parts(avas, input[start..end].to_string(), start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        descr = { "cn=x", Some(2) },
        descr_hyphen = { "x-attr-1 = y", Some(8) },
        numericoid = { "2.5.4.3=x", Some(7) },
        oid_prefix = { "oid.2.5.4.3=x", Some(11) },
        upper_oid_prefix = { "OID.2.5.4.3=x", Some(11) },
        oid_as_descr = { "oid=x", Some(3) },
        single_arc = { "2=x", None },
        leading_zero = { "2.05=x", None },
        trailing_dot = { "2.5.=x", None },
        symbol = { "_cn=x", None },
        empty = { "", None },
    )]
    fn test_attribute_type_len(input: &str, expected: Option<usize>) {
        assert_eq!(attribute_type_len(input.as_bytes()), expected);
    }

    #[test]
    fn test_parse_dn_uses_both_tiers() {
        let simple = parse_dn("cn=a,dc=b").unwrap();
        let escaped = parse_dn("cn=a\\,b,dc=b").unwrap();
        assert_eq!(simple.len(), 2);
        assert_eq!(escaped.len(), 2);
        assert_eq!(escaped[0].norm_value(), Some(&Value::text("a,b")));
    }

    #[test]
    fn test_errors_come_from_the_full_grammar() {
        let err = parse_dn("cn=a,").unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"invalid DN syntax (RFC 4514) at offset 5: expected an attribute type (descr or numericoid)");
    }

    #[test]
    fn test_unescape_value() {
        assert_eq!(unescape_value("\"a, b\"").unwrap(), Value::text("a, b"));
        assert_eq!(unescape_value("a\\2Bb").unwrap(), Value::text("a+b"));
        assert!(unescape_value("a,b").is_err());
    }

    #[test]
    fn test_parse_tier_display() {
        assert_eq!(ParseTier::Fast.to_string(), "Fast");
        assert_eq!(ParseTier::Full.as_ref(), "Full");
    }
}
