//! Field tags
//!
//! A tag prefixes every field of a record. Its first byte holds the wire type
//! in the low 7 bits and a long-form flag in the high bit. Field ids up to 255
//! follow as one byte, larger ids as two big-endian bytes:
//!
//! ```text
//! short: [wire_type] [id]
//! long:  [0x80 | wire_type] [id >> 8] [id & 0xFF]
//! ```
//!
//! Wire types start at 2, so no tag ever begins with the byte 1 that opens the
//! record terminator.

use crate::cursor::{read_byte, read_window, write_byte, write_window};
use crate::errors::{Error, Result};

/// Long-form flag in the first tag byte
pub const LONG_FORM: u8 = 0x80;

/// How the payload of a tagged field is framed
///
/// This tells a reader how to skip a field, not how to interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// A nested record, terminated by the record terminator
    Record = 2,
    /// A varint byte length followed by that many bytes
    Bytes = 3,
    /// One byte
    Fixed8 = 4,
    /// Two bytes
    Fixed16 = 5,
    /// Four bytes
    Fixed32 = 6,
    /// Eight bytes
    Fixed64 = 7,
}

impl WireType {
    /// Payload width for the fixed wire types
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            WireType::Fixed8 => Some(1),
            WireType::Fixed16 => Some(2),
            WireType::Fixed32 => Some(4),
            WireType::Fixed64 => Some(8),
            WireType::Record | WireType::Bytes => None,
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            2 => Ok(WireType::Record),
            3 => Ok(WireType::Bytes),
            4 => Ok(WireType::Fixed8),
            5 => Ok(WireType::Fixed16),
            6 => Ok(WireType::Fixed32),
            7 => Ok(WireType::Fixed64),
            other => Err(Error::InvalidType(other)),
        }
    }
}

/// A decoded tag
///
/// The wire type stays a raw byte until someone needs to act on it, so that an
/// unknown value only fails where the payload is actually skipped or decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// Raw wire-type byte, long-form flag already removed
    pub wire_type: u8,
    /// Field identifier
    pub id: u16,
}

impl Tag {
    /// The wire type, if it is a known one
    pub fn kind(&self) -> Result<WireType> {
        WireType::try_from(self.wire_type)
    }
}

/// Encoded tag size for a field id
#[inline]
pub const fn size_tag(id: u16) -> usize {
    if id > 0xFF {
        3
    } else {
        2
    }
}

/// Write the tag for field `id` at `n`
pub fn marshal_tag(n: usize, b: &mut [u8], wire_type: WireType, id: u16) -> Result<usize> {
    if id == 0 {
        return Err(Error::InvalidFieldId);
    }

    let kind = wire_type as u8 & 0x7F;
    if id > 0xFF {
        let out = write_window(b, n, 3)?;
        out[0] = LONG_FORM | kind;
        out[1..].copy_from_slice(&id.to_be_bytes());
        Ok(n + 3)
    } else {
        let n = write_byte(b, n, kind)?;
        write_byte(b, n, id as u8)
    }
}

/// Read a tag at `n`
pub fn unmarshal_tag(n: usize, b: &[u8]) -> Result<(usize, Tag)> {
    let first = read_byte(b, n)?;
    let wire_type = first & 0x7F;
    if first & LONG_FORM != 0 {
        let raw = read_window(b, n + 1, 2)?;
        let id = u16::from_be_bytes([raw[0], raw[1]]);
        Ok((n + 3, Tag { wire_type, id }))
    } else {
        let id = u16::from(read_byte(b, n + 1)?);
        Ok((n + 2, Tag { wire_type, id }))
    }
}

/// Advance past a tag without building it
pub fn skip_tag(n: usize, b: &[u8]) -> Result<usize> {
    let first = read_byte(b, n)?;
    let len = if first & LONG_FORM != 0 { 3 } else { 2 };
    read_window(b, n, len).map(|_| n + len)
}
