use crate::error::DnError;
use crate::types::{Ava, Rdn, Value};

use super::{attribute_type_len, build_ava, build_rdn};

/// Recursive-descent parser for the complete DN grammar:
///
/// ```text
/// distinguishedName := [ relativeDN *( ( "," / ";" ) relativeDN ) ]
/// relativeDN        := attributeTypeAndValue *( "+" attributeTypeAndValue )
/// attributeTypeAndValue := *SPACE attributeType *SPACE "=" *SPACE attributeValue
/// attributeValue    := quotestring *SPACE / hexstring *SPACE / string
/// quotestring       := DQUOTE *( <any but DQUOTE or "\"> / pair ) DQUOTE
/// hexstring         := "#" 1*hexpair
/// pair              := "\" ( "\" / special / hexpair )
/// special           := DQUOTE / "+" / "," / ";" / "<" / ">" / SPACE / "#" / "="
/// ```
///
/// Each instance parses one text and is consumed by doing so.
pub(crate) struct ComplexParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ComplexParser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        ComplexParser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    /// RDNs of the whole input, leaf first. The empty string is the empty DN.
    pub(crate) fn parse_dn(mut self) -> Result<Vec<Rdn>, DnError> {
        let mut rdns = Vec::new();
        if self.bytes.is_empty() {
            return Ok(rdns);
        }

        loop {
            rdns.push(self.relative_dn()?);
            match self.peek() {
                None => return Ok(rdns),
                Some(b',' | b';') => self.pos += 1,
                Some(_) => {
                    return Err(self.error("expected ',' or ';' between RDNs"));
                }
            }
        }
    }

    /// Exactly one RDN covering the whole input.
    pub(crate) fn parse_rdn(mut self) -> Result<Rdn, DnError> {
        let rdn = self.relative_dn()?;
        if self.peek().is_some() {
            return Err(self.error("expected a single RDN"));
        }
        Ok(rdn)
    }

    /// One attribute value covering the whole input.
    pub(crate) fn parse_value(mut self) -> Result<Value, DnError> {
        let (value, _) = self.attribute_value()?;
        if self.peek().is_some() {
            return Err(self.error("unexpected character in attribute value"));
        }
        Ok(value)
    }

    fn relative_dn(&mut self) -> Result<Rdn, DnError> {
        let mut avas = vec![self.attribute_type_and_value()?];
        while self.peek() == Some(b'+') {
            self.pos += 1;
            avas.push(self.attribute_type_and_value()?);
        }
        Ok(build_rdn(self.input, avas))
    }

    fn attribute_type_and_value(&mut self) -> Result<Ava, DnError> {
        self.skip_spaces();
        let type_start = self.pos;
        let type_len = attribute_type_len(&self.bytes[self.pos..])
            .ok_or_else(|| self.error("expected an attribute type (descr or numericoid)"))?;
        self.pos += type_len;

        self.skip_spaces();
        if self.peek() != Some(b'=') {
            return Err(self.error("expected '=' after the attribute type"));
        }
        self.pos += 1;
        self.skip_spaces();

        let (value, value_end) = self.attribute_value()?;
        build_ava(self.input, type_start..type_start + type_len, value, value_end)
    }

    /// The value and the offset right after its last significant character.
    fn attribute_value(&mut self) -> Result<(Value, usize), DnError> {
        match self.peek() {
            Some(b'"') => self.quote_string(),
            Some(b'#') => self.hex_string(),
            _ => self.string(),
        }
    }

    fn quote_string(&mut self) -> Result<(Value, usize), DnError> {
        let start = self.pos;
        self.pos += 1;
        let mut buf = Vec::new();

        loop {
            match self.peek() {
                None => {
                    return Err(DnError::syntax("unterminated quoted string", start));
                }
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => self.pair(&mut buf)?,
                Some(b) => {
                    buf.push(b);
                    self.pos += 1;
                }
            }
        }

        let value_end = self.pos;
        self.expect_value_end("quoted string")?;
        Ok((Value::Text(self.utf8(buf, start)?), value_end))
    }

    fn hex_string(&mut self) -> Result<(Value, usize), DnError> {
        let start = self.pos;
        self.pos += 1;
        let digits = self.bytes[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_hexdigit())
            .count();

        if digits == 0 {
            return Err(self.error("a hexstring needs at least one hex pair"));
        }
        if digits % 2 != 0 {
            return Err(DnError::syntax(
                "a hexstring needs an even number of hex digits",
                start,
            ));
        }

        let bytes = self.bytes[self.pos..self.pos + digits]
            .chunks(2)
            .map(|pair| (hex_value(pair[0]) << 4) | hex_value(pair[1]))
            .collect::<Vec<u8>>();
        self.pos += digits;

        let value_end = self.pos;
        self.expect_value_end("hexstring")?;
        Ok((Value::Binary(bytes), value_end))
    }

    /// Bare string value. Unescaped trailing spaces are not part of it.
    fn string(&mut self) -> Result<(Value, usize), DnError> {
        let start = self.pos;
        let mut buf = Vec::new();
        let mut kept = 0;
        let mut value_end = self.pos;

        while let Some(b) = self.peek() {
            match b {
                b',' | b';' | b'+' => break,
                b'\\' => {
                    self.pair(&mut buf)?;
                    kept = buf.len();
                    value_end = self.pos;
                }
                b'"' | b'<' | b'>' | 0x00 => {
                    return Err(self.error(format!(
                        "character {:?} must be escaped",
                        char::from(b)
                    )));
                }
                b' ' => {
                    buf.push(b);
                    self.pos += 1;
                }
                _ => {
                    buf.push(b);
                    self.pos += 1;
                    kept = buf.len();
                    value_end = self.pos;
                }
            }
        }

        buf.truncate(kept);
        Ok((Value::Text(self.utf8(buf, start)?), value_end))
    }

    /// `pair = "\" ( "\" / special / hexpair )`, appending the byte it
    /// stands for.
    fn pair(&mut self, buf: &mut Vec<u8>) -> Result<(), DnError> {
        let escape = self.pos;
        let first = self.bytes.get(escape + 1).copied();
        let second = self.bytes.get(escape + 2).copied();

        match (first, second) {
            (Some(hi), Some(lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                buf.push((hex_value(hi) << 4) | hex_value(lo));
                self.pos += 3;
            }
            (Some(c @ (b'\\' | b'"' | b'+' | b',' | b';' | b'<' | b'>' | b' ' | b'#' | b'=')), _) => {
                buf.push(c);
                self.pos += 2;
            }
            (None, _) => {
                return Err(DnError::syntax("dangling '\\' at end of input", escape));
            }
            _ => {
                return Err(DnError::syntax(
                    "'\\' must be followed by a special character or a hex pair",
                    escape,
                ));
            }
        }
        Ok(())
    }

    /// After a quoted or hex value only spaces may come before the next
    /// separator.
    fn expect_value_end(&mut self, what: &str) -> Result<(), DnError> {
        self.skip_spaces();
        match self.peek() {
            None | Some(b',' | b';' | b'+') => Ok(()),
            Some(_) => Err(self.error(format!("unexpected character after {what}"))),
        }
    }

    fn utf8(&self, buf: Vec<u8>, start: usize) -> Result<String, DnError> {
        String::from_utf8(buf)
            .map_err(|_| DnError::syntax("escaped bytes are not valid UTF-8", start))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    fn error(&self, reason: impl Into<String>) -> DnError {
        DnError::syntax(reason, self.pos)
    }
}

fn hex_value(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}
