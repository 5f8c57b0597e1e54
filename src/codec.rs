//! Binary records for AVAs, RDNs and DNs.
//!
//! Integers are big-endian `i32`, booleans one byte, strings a big-endian
//! `u16` byte count followed by modified UTF-8 (NUL as `C0 80`,
//! supplementary characters as two three-byte surrogates).
//!
//! ```text
//! AVA  upName start length upType normType isHR
//!      isHR:  upValue normValue              (strings)
//!      !isHR: len upValue len normValue      (i32 + raw bytes)
//! RDN  avaCount upName normName start length AVA*
//! DN   upName normName rdnCount RDN*
//! ```
//!
//! An empty `normName` in an RDN or DN record stands for "same as upName".
//! RDNs are written leaf first. Decoded names are flagged as normalized.

use bytes::{Buf, BufMut, BytesMut};
use tracing::warn;

use crate::error::DnError;
use crate::traits::WireRecord;
use crate::types::{Ava, Dn, Rdn, Value};

/// Encodes a DN record.
pub fn encode(dn: &Dn) -> Result<Vec<u8>, DnError> {
    dn.encode()
}

/// Decodes a DN record spanning all of `bytes`.
pub fn decode(bytes: &[u8]) -> Result<Dn, DnError> {
    Dn::decode(bytes)
}

impl WireRecord for Ava {
    fn write_record(&self, buf: &mut BytesMut) -> Result<(), DnError> {
        require(!self.up_name.is_empty(), "upName")?;
        require(!self.up_type.is_empty(), "upType")?;
        require(!self.norm_type.is_empty(), "normType")?;
        let start = to_i32(self.start, "start")?;
        require(self.length >= 2, "length")?;
        let length = to_i32(self.length, "length")?;

        put_utf(buf, &self.up_name, "upName")?;
        buf.put_i32(start);
        buf.put_i32(length);
        put_utf(buf, &self.up_type, "upType")?;
        put_utf(buf, &self.norm_type, "normType")?;

        match (&self.up_value, &self.norm_value) {
            (Value::Text(up), Value::Text(norm)) => {
                buf.put_u8(1);
                put_utf(buf, up, "upValue")?;
                put_utf(buf, norm, "normValue")?;
            }
            (Value::Binary(up), Value::Binary(norm)) => {
                buf.put_u8(0);
                put_bytes(buf, up, "upValue")?;
                put_bytes(buf, norm, "normValue")?;
            }
            _ => return Err(precondition_failed("normValue")),
        }
        Ok(())
    }

    fn read_record<B: Buf>(buf: &mut B) -> Result<Self, DnError> {
        let up_name = get_utf(buf, "upName")?;
        let start = get_count(buf, "start")?;
        let length = get_count(buf, "length")?;
        let up_type = get_utf(buf, "upType")?;
        let norm_type = get_utf(buf, "normType")?;

        let (up_value, norm_value) = if get_bool(buf, "isHR")? {
            (
                Value::Text(get_utf(buf, "upValue")?),
                Value::Text(get_utf(buf, "normValue")?),
            )
        } else {
            (
                Value::Binary(get_bytes(buf, "upValue")?),
                Value::Binary(get_bytes(buf, "normValue")?),
            )
        };

        Ok(Ava {
            up_type,
            norm_type,
            up_value,
            norm_value,
            up_name,
            start,
            length,
        })
    }
}

impl WireRecord for Rdn {
    fn write_record(&self, buf: &mut BytesMut) -> Result<(), DnError> {
        buf.put_i32(to_i32(self.avas.len(), "avaCount")?);
        put_utf(buf, &self.up_name, "upName")?;
        put_utf(buf, norm_name_sentinel(&self.up_name, &self.norm_name), "normName")?;
        buf.put_i32(to_i32(self.start, "start")?);
        buf.put_i32(to_i32(self.length, "length")?);

        for ava in &self.avas {
            ava.write_record(buf)?;
        }
        Ok(())
    }

    fn read_record<B: Buf>(buf: &mut B) -> Result<Self, DnError> {
        let count = get_count(buf, "avaCount")?;
        let up_name = get_utf(buf, "upName")?;
        let norm_name = or_up_name(get_utf(buf, "normName")?, &up_name);
        let start = get_count(buf, "start")?;
        let length = get_count(buf, "length")?;

        let mut avas = Vec::new();
        for _ in 0..count {
            avas.push(Ava::read_record(buf)?);
        }

        Ok(Rdn {
            avas,
            up_name,
            norm_name,
            start,
            length,
        })
    }
}

impl WireRecord for Dn {
    fn write_record(&self, buf: &mut BytesMut) -> Result<(), DnError> {
        put_utf(buf, self.up_name(), "upName")?;
        put_utf(buf, norm_name_sentinel(self.up_name(), self.norm_name()), "normName")?;
        buf.put_i32(to_i32(self.size(), "rdnCount")?);

        for rdn in self.rdns() {
            rdn.write_record(buf)?;
        }
        Ok(())
    }

    fn read_record<B: Buf>(buf: &mut B) -> Result<Self, DnError> {
        let up_name = get_utf(buf, "upName")?;
        let norm_name = or_up_name(get_utf(buf, "normName")?, &up_name);
        let count = get_count(buf, "rdnCount")?;

        let mut rdns = Vec::new();
        for _ in 0..count {
            rdns.push(Rdn::read_record(buf)?);
        }

        Ok(Dn::from_decoded(up_name, norm_name, rdns))
    }
}

fn norm_name_sentinel<'a>(up_name: &str, norm_name: &'a str) -> &'a str {
    if up_name == norm_name { "" } else { norm_name }
}

fn or_up_name(norm_name: String, up_name: &str) -> String {
    if norm_name.is_empty() {
        up_name.to_string()
    } else {
        norm_name
    }
}

fn precondition_failed(field: &str) -> DnError {
    warn!(event = "Encode", phase = "Precondition", field = field);
    DnError::codec(field)
}

fn require(ok: bool, field: &str) -> Result<(), DnError> {
    if ok { Ok(()) } else { Err(precondition_failed(field)) }
}

fn to_i32(value: usize, field: &str) -> Result<i32, DnError> {
    i32::try_from(value).map_err(|_| precondition_failed(field))
}

fn put_bytes(buf: &mut BytesMut, bytes: &[u8], field: &str) -> Result<(), DnError> {
    buf.put_i32(to_i32(bytes.len(), field)?);
    buf.put_slice(bytes);
    Ok(())
}

/// Writes `text` the way `java.io.DataOutput::writeUTF` does.
fn put_utf(buf: &mut BytesMut, text: &str, field: &str) -> Result<(), DnError> {
    let mut encoded = Vec::with_capacity(text.len());
    let mut units = [0u16; 2];

    for c in text.chars() {
        for unit in c.encode_utf16(&mut units) {
            match *unit {
                0x0001..=0x007f => encoded.push(*unit as u8),
                0x0000 | 0x0080..=0x07ff => {
                    encoded.push(0xc0 | (*unit >> 6) as u8);
                    encoded.push(0x80 | (*unit & 0x3f) as u8);
                }
                _ => {
                    encoded.push(0xe0 | (*unit >> 12) as u8);
                    encoded.push(0x80 | ((*unit >> 6) & 0x3f) as u8);
                    encoded.push(0x80 | (*unit & 0x3f) as u8);
                }
            }
        }
    }

    let len = u16::try_from(encoded.len()).map_err(|_| precondition_failed(field))?;
    buf.put_u16(len);
    buf.put_slice(&encoded);
    Ok(())
}

fn get_utf<B: Buf>(buf: &mut B, field: &str) -> Result<String, DnError> {
    if buf.remaining() < 2 {
        return Err(DnError::truncated(field));
    }
    let len = usize::from(buf.get_u16());
    if buf.remaining() < len {
        return Err(DnError::truncated(field));
    }
    let mut bytes = vec![0; len];
    buf.copy_to_slice(&mut bytes);

    let mut units = Vec::with_capacity(len);
    let mut iter = bytes.into_iter();
    while let Some(b) = iter.next() {
        let unit = match b {
            0x00..=0x7f => u16::from(b),
            0xc0..=0xdf => {
                let b2 = continuation(iter.next(), field)?;
                (u16::from(b & 0x1f) << 6) | b2
            }
            0xe0..=0xef => {
                let b2 = continuation(iter.next(), field)?;
                let b3 = continuation(iter.next(), field)?;
                (u16::from(b & 0x0f) << 12) | (b2 << 6) | b3
            }
            _ => return Err(DnError::invalid_record(field)),
        };
        units.push(unit);
    }

    String::from_utf16(&units).map_err(|_| DnError::invalid_record(field))
}

fn continuation(byte: Option<u8>, field: &str) -> Result<u16, DnError> {
    match byte {
        Some(b) if b & 0xc0 == 0x80 => Ok(u16::from(b & 0x3f)),
        _ => Err(DnError::invalid_record(field)),
    }
}

/// A non-negative `i32`.
fn get_count<B: Buf>(buf: &mut B, field: &str) -> Result<usize, DnError> {
    if buf.remaining() < 4 {
        return Err(DnError::truncated(field));
    }
    usize::try_from(buf.get_i32()).map_err(|_| DnError::invalid_record(field))
}

fn get_bool<B: Buf>(buf: &mut B, field: &str) -> Result<bool, DnError> {
    if !buf.has_remaining() {
        return Err(DnError::truncated(field));
    }
    Ok(buf.get_u8() != 0)
}

fn get_bytes<B: Buf>(buf: &mut B, field: &str) -> Result<Vec<u8>, DnError> {
    let len = get_count(buf, field)?;
    if buf.remaining() < len {
        return Err(DnError::truncated(field));
    }
    let mut bytes = vec![0; len];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}
