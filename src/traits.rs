use bytes::{Buf, BytesMut};

use crate::error::DnError;

/// Anything with a binary record layout, e.g. an AVA, an RDN or a DN.
///
/// Records are length-prefixed and carry no version tag; see
/// [`crate::codec`] for the layouts.
pub trait WireRecord: Sized {
    /// Appends the record to `buf`, or fails naming the first field that
    /// cannot be written.
    fn write_record(&self, buf: &mut BytesMut) -> Result<(), DnError>;

    /// Reads one record from the front of `buf`.
    fn read_record<B: Buf>(buf: &mut B) -> Result<Self, DnError>;

    fn encode(&self) -> Result<Vec<u8>, DnError> {
        let mut buf = BytesMut::new();
        self.write_record(&mut buf)?;
        Ok(buf.to_vec())
    }

    /// Reads one record that must span all of `bytes`.
    fn decode(bytes: &[u8]) -> Result<Self, DnError> {
        let mut buf = bytes;
        let record = Self::read_record(&mut buf)?;
        if buf.has_remaining() {
            return Err(DnError::TrailingData(buf.remaining()));
        }
        Ok(record)
    }
}
