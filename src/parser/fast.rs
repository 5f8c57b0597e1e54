use crate::types::{Ava, Rdn, Value};

use super::{attribute_type_len, build_ava, build_rdn};

/// Result of a fast parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FastParseOutcome {
    Done(Vec<Rdn>),
    /// The text needs the full grammar. Nothing parsed so far is kept.
    TooComplex {
        reason: &'static str,
        position: usize,
    },
}

struct TooComplex {
    reason: &'static str,
    position: usize,
}

/// Single-pass parser for the common case: ASCII attribute types, plain
/// unescaped ASCII values, one AVA per RDN, `,` or `;` separators.
pub(crate) struct FastParser<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FastParser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        FastParser {
            input,
            bytes: input.as_bytes(),
            pos: 0,
        }
    }

    pub(crate) fn parse(mut self) -> FastParseOutcome {
        match self.parse_rdns() {
            Ok(rdns) => FastParseOutcome::Done(rdns),
            Err(TooComplex { reason, position }) => {
                FastParseOutcome::TooComplex { reason, position }
            }
        }
    }

    fn parse_rdns(&mut self) -> Result<Vec<Rdn>, TooComplex> {
        let mut rdns = Vec::new();
        if self.bytes.is_empty() {
            return Ok(rdns);
        }

        loop {
            let ava = self.parse_ava()?;
            rdns.push(build_rdn(self.input, vec![ava]));

            match self.peek() {
                None => return Ok(rdns),
                Some(b',' | b';') => {
                    self.pos += 1;
                    self.skip_spaces();
                    if self.peek().is_none() {
                        return Err(self.too_complex("trailing separator"));
                    }
                }
                Some(b'+') => return Err(self.too_complex("multi-valued RDN")),
                Some(_) => return Err(self.too_complex("unexpected character after value")),
            }
        }
    }

    fn parse_ava(&mut self) -> Result<Ava, TooComplex> {
        self.skip_spaces();
        let type_start = self.pos;
        let type_len = attribute_type_len(&self.bytes[self.pos..])
            .ok_or_else(|| self.too_complex("attribute type"))?;
        self.pos += type_len;

        self.skip_spaces();
        if self.peek() != Some(b'=') {
            return Err(self.too_complex("missing '='"));
        }
        self.pos += 1;
        self.skip_spaces();

        match self.peek() {
            Some(b'#') => return Err(self.too_complex("hexstring value")),
            Some(b'"') => return Err(self.too_complex("quoted value")),
            _ => {}
        }

        let value_start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b',' | b';' | b'+' => break,
                b'\\' => return Err(self.too_complex("escaped character")),
                b'"' | b'=' | b'<' | b'>' => return Err(self.too_complex("special character")),
                0x80.. => return Err(self.too_complex("non-ASCII character")),
                0x00..=0x1f | 0x7f => return Err(self.too_complex("control character")),
                _ => self.pos += 1,
            }
        }

        let mut value_end = self.pos;
        while value_end > value_start && self.bytes[value_end - 1] == b' ' {
            value_end -= 1;
        }

        let value = Value::text(&self.input[value_start..value_end]);
        build_ava(self.input, type_start..type_start + type_len, value, value_end)
            .map_err(|_| self.too_complex("attribute type and value"))
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    fn too_complex(&self, reason: &'static str) -> TooComplex {
        TooComplex {
            reason,
            position: self.pos,
        }
    }
}
