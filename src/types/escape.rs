//! Escaping of attribute values for the RFC 4514 string form.

use crate::error::DnError;
use crate::parser;

use super::value::Value;

const HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Upper-case hex pairs, no separator.
pub fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push(HEX_UPPER[(b >> 4) as usize] as char);
        out.push(HEX_UPPER[(b & 0x0f) as usize] as char);
    }
    out
}

/// Escapes a text value so that it parses back to the same characters.
///
/// Specials are prefixed with a backslash, a leading `#` and leading or
/// trailing spaces are escaped, control characters become hex pairs.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    let last = value.chars().count().saturating_sub(1);

    for (i, c) in value.chars().enumerate() {
        match c {
            ' ' if i == 0 || i == last => out.push_str("\\ "),
            '#' if i == 0 => out.push_str("\\#"),
            '"' | '+' | ',' | ';' | '=' | '<' | '>' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            '\u{0}'..='\u{1f}' | '\u{7f}' => {
                out.push('\\');
                out.push_str(&hex_dump(&[c as u8]));
            }
            _ => out.push(c),
        }
    }

    out
}

/// Reverses [`escape_value`], or decodes a `#` hexstring into bytes.
pub fn unescape_value(value: &str) -> Result<Value, DnError> {
    parser::unescape_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    #[parameterized(
        plain = { "John Smith", "John Smith" },
        comma = { "Smith, III", "Smith\\, III" },
        quotes = { "James \"Jim\"", "James \\\"Jim\\\"" },
        leading_hash = { "#1", "\\#1" },
        inner_hash = { "a#1", "a#1" },
        leading_space = { " a", "\\ a" },
        trailing_space = { "a ", "a\\ " },
        single_space = { " ", "\\ " },
        equals_and_plus = { "a=b+c", "a\\=b\\+c" },
        backslash = { "a\\b", "a\\\\b" },
        newline = { "a\nb", "a\\0Ab" },
        delete = { "\u{7f}", "\\7F" },
        non_ascii = { "Émile", "Émile" },
        empty = { "", "" },
    )]
    fn test_escape_value(input: &str, expected: &str) {
        assert_eq!(escape_value(input), expected);
    }

    #[test]
    fn test_hex_dump_is_upper_case() {
        assert_eq!(hex_dump(&[0x00, 0x0f, 0xa0, 0xff]), "000FA0FF");
        assert_eq!(hex_dump(&[]), "");
    }

    #[parameterized(
        comma = { "Smith\\, III" },
        spaces = { "\\ padded\\ " },
        hash = { "\\#tag" },
        controls = { "a\\0Ab" },
        utf8 = { "caf\\C3\\A9" },
    )]
    fn test_unescape_reverses_escape(escaped: &str) {
        let value = unescape_value(escaped).unwrap();
        let text = value.as_str().unwrap().to_string();
        assert_eq!(unescape_value(&escape_value(&text)).unwrap(), value);
    }

    #[test]
    fn test_unescape_hexstring_is_binary() {
        assert_eq!(
            unescape_value("#0400").unwrap(),
            Value::binary(vec![0x04, 0x00])
        );
    }

    #[test]
    fn test_unescape_rejects_bad_escape() {
        assert!(matches!(
            unescape_value("a\\zz"),
            Err(DnError::Syntax { .. })
        ));
    }
}
