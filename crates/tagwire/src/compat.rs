//! Record framing and schema-evolution handling
//!
//! A record is a run of tagged fields in ascending id order closed by the
//! two-byte [`TERMINATOR`]. Readers walk their declared fields in the same
//! order and ask [`handle_compatibility`] whether each one is in the data.
//! Fields the reader does not know are skipped by wire type alone, which is
//! what lets writers add fields and retire them (as reserved ids) without
//! breaking older or newer readers.

use log::{debug, trace};

use crate::bytes::skip_bytes;
use crate::cursor::{advance, read_window, write_window};
use crate::errors::{Error, Result};
use crate::tag::{unmarshal_tag, WireType};

/// Bytes closing every record
pub const TERMINATOR: [u8; 2] = [1, 1];

/// Size of [`TERMINATOR`]
pub const TERMINATOR_SIZE: usize = TERMINATOR.len();

/// Deepest record nesting the wire-type skip will follow
pub const MAX_SKIP_DEPTH: usize = 128;

/// Outcome of looking for the next expected field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// The field is next; its payload follows with the given wire type
    Present(WireType),
    /// The field is not in the data; the cursor was left where it was
    Absent,
    /// The buffer ended before another tag could be read
    EndOfData,
}

impl Presence {
    /// Whether the field's payload follows
    pub fn is_present(&self) -> bool {
        matches!(self, Presence::Present(_))
    }
}

#[inline]
fn at_terminator(b: &[u8], n: usize) -> bool {
    b.get(n) == Some(&TERMINATOR[0])
}

/// Write the record terminator at `n`
pub fn marshal_terminator(n: usize, b: &mut [u8]) -> Result<usize> {
    write_window(b, n, TERMINATOR_SIZE)?.copy_from_slice(&TERMINATOR);
    Ok(n + TERMINATOR_SIZE)
}

/// Consume the record terminator at `n`
pub fn unmarshal_terminator(n: usize, b: &[u8]) -> Result<usize> {
    if read_window(b, n, TERMINATOR_SIZE)? != TERMINATOR {
        return Err(Error::InvalidData);
    }
    Ok(n + TERMINATOR_SIZE)
}

/// Find out whether field `expected` is the next field of the record at `n`
///
/// Fields whose id is reserved, or lower than `expected` (and therefore not
/// declared by the reader), are skipped on the way. On [`Presence::Present`]
/// the returned cursor points at the field's payload; otherwise it is the
/// position of the first tag that was not consumed, so the caller can try
/// its next declared field against the same tag.
///
/// # Errors
///
/// Errors from skipping a field, annotated with the id of the skipped field,
/// or [`Error::InvalidType`] annotated with `expected` if the matching tag
/// carries an unknown wire type.
pub fn handle_compatibility(
    mut n: usize,
    b: &[u8],
    reserved: &[u16],
    expected: u16,
) -> Result<(usize, Presence)> {
    loop {
        if at_terminator(b, n) {
            trace!("field {expected} absent: record ends");
            return Ok((n, Presence::Absent));
        }

        let (next, tag) = match unmarshal_tag(n, b) {
            Ok(read) => read,
            Err(Error::BufferTooSmall) => return Ok((n, Presence::EndOfData)),
            Err(err) => return Err(err),
        };

        if tag.id == expected {
            let wire_type = tag.kind().map_err(|e| e.in_field(expected))?;
            return Ok((next, Presence::Present(wire_type)));
        }

        if tag.id < expected || reserved.contains(&tag.id) {
            trace!(
                "skipping field {} (wire type {}) while looking for field {expected}",
                tag.id,
                tag.wire_type
            );
            n = skip_payload(next, b, tag.wire_type, 0).map_err(|e| e.in_field(tag.id))?;
            continue;
        }

        trace!("field {expected} absent: next field is {}", tag.id);
        return Ok((n, Presence::Absent));
    }
}

/// Skip whatever fields remain in the record at `n` and consume its terminator
///
/// Called after the last declared field, this tolerates fields appended by
/// newer writers.
pub fn finish_record(mut n: usize, b: &[u8], reserved: &[u16]) -> Result<usize> {
    loop {
        if at_terminator(b, n) {
            return unmarshal_terminator(n, b);
        }

        let (next, tag) = unmarshal_tag(n, b)?;
        if reserved.contains(&tag.id) {
            trace!("skipping reserved trailing field {}", tag.id);
        } else {
            debug!(
                "skipping unknown trailing field {} (wire type {})",
                tag.id, tag.wire_type
            );
        }
        n = skip_payload(next, b, tag.wire_type, 0).map_err(|e| e.in_field(tag.id))?;
    }
}

/// Skip one payload at `n` knowing only its wire type
///
/// # Errors
///
/// [`Error::InvalidType`] if `wire_type` is not a known wire type.
pub fn skip_by_type(n: usize, b: &[u8], wire_type: u8) -> Result<usize> {
    skip_payload(n, b, wire_type, 0)
}

/// Skip a whole record at `n`, terminator included
pub fn skip_record(n: usize, b: &[u8]) -> Result<usize> {
    skip_record_at(n, b, 0)
}

fn skip_payload(n: usize, b: &[u8], wire_type: u8, depth: usize) -> Result<usize> {
    match WireType::try_from(wire_type)? {
        WireType::Record => skip_record_at(n, b, depth + 1),
        WireType::Bytes => skip_bytes(n, b),
        WireType::Fixed8 => advance(b, n, 1),
        WireType::Fixed16 => advance(b, n, 2),
        WireType::Fixed32 => advance(b, n, 4),
        WireType::Fixed64 => advance(b, n, 8),
    }
}

fn skip_record_at(mut n: usize, b: &[u8], depth: usize) -> Result<usize> {
    if depth > MAX_SKIP_DEPTH {
        return Err(Error::NestingTooDeep);
    }
    loop {
        if at_terminator(b, n) {
            return unmarshal_terminator(n, b);
        }
        let (next, tag) = unmarshal_tag(n, b)?;
        n = skip_payload(next, b, tag.wire_type, depth)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytes::{marshal_str, size_str};
    use crate::primitives::{marshal_fixed, unmarshal_fixed};
    use crate::tag::{marshal_tag, size_tag};

    /// Writes `fields` as (id, u32 value) pairs followed by the terminator
    fn record(fields: &[(u16, u32)]) -> Vec<u8> {
        let size: usize = fields.iter().map(|(id, _)| size_tag(*id) + 4).sum();
        let mut buf = vec![0u8; size + TERMINATOR_SIZE];
        let mut n = 0;
        for &(id, value) in fields {
            n = marshal_tag(n, &mut buf, WireType::Fixed32, id).unwrap();
            n = marshal_fixed(n, &mut buf, value).unwrap();
        }
        n = marshal_terminator(n, &mut buf).unwrap();
        assert_eq!(n, buf.len());
        buf
    }

    /// Decodes the declared `ids` like generated code would
    fn read(buf: &[u8], reserved: &[u16], ids: &[u16]) -> Result<(usize, Vec<Option<u32>>)> {
        let mut n = 0;
        let mut values = Vec::new();
        for &id in ids {
            let (next, presence) = handle_compatibility(n, buf, reserved, id)?;
            n = next;
            if presence.is_present() {
                let (next, value) = unmarshal_fixed::<u32>(n, buf)?;
                n = next;
                values.push(Some(value));
            } else {
                values.push(None);
            }
        }
        let n = finish_record(n, buf, reserved)?;
        Ok((n, values))
    }

    #[test]
    fn test_all_fields_present() {
        let buf = record(&[(1, 10), (2, 20)]);
        assert_eq!(read(&buf, &[], &[1, 2]), Ok((buf.len(), vec![Some(10), Some(20)])));
    }

    #[test]
    fn test_reserved_field_is_skipped() {
        let buf = record(&[(1, 10), (2, 20), (3, 30)]);

        // field 3 retired by the reader
        let (n, values) = read(&buf, &[3], &[1, 2]).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(values, vec![Some(10), Some(20)]);

        // field 2 retired, 3 still read
        let (n, values) = read(&buf, &[2], &[1, 3]).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(values, vec![Some(10), Some(30)]);
    }

    #[test]
    fn test_new_field_is_absent() {
        let buf = record(&[(1, 10), (2, 20)]);
        let (n, values) = read(&buf, &[], &[1, 2, 3]).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(values, vec![Some(10), Some(20), None]);
    }

    #[test]
    fn test_field_missing_in_the_middle() {
        let buf = record(&[(1, 10), (3, 30)]);
        let (next, presence) = handle_compatibility(6, &buf, &[], 2).unwrap();
        assert_eq!(presence, Presence::Absent);
        assert_eq!(next, 6, "cursor is rewound to the tag");

        let (_, values) = read(&buf, &[], &[1, 2, 3]).unwrap();
        assert_eq!(values, vec![Some(10), None, Some(30)]);
    }

    #[test]
    fn test_unknown_lower_field_is_skipped() {
        // the reader never declared field 2
        let buf = record(&[(1, 10), (2, 20), (3, 30)]);
        let (_, values) = read(&buf, &[], &[1, 3]).unwrap();
        assert_eq!(values, vec![Some(10), Some(30)]);
    }

    #[test]
    fn test_unknown_trailing_fields_are_skipped() {
        let buf = record(&[(1, 10), (40, 1), (300, 2)]);
        let (n, values) = read(&buf, &[], &[1]).unwrap();
        assert_eq!(n, buf.len());
        assert_eq!(values, vec![Some(10)]);
    }

    #[test]
    fn test_empty_record() {
        let buf = record(&[]);
        // the terminator must not be mistaken for a tag of field 1
        assert_eq!(read(&buf, &[], &[1]), Ok((2, vec![None])));
    }

    #[test]
    fn test_end_of_data() {
        let buf = [4u8];
        assert_eq!(handle_compatibility(0, &buf, &[], 1), Ok((0, Presence::EndOfData)));
        assert_eq!(handle_compatibility(1, &buf, &[], 1), Ok((1, Presence::EndOfData)));
        assert_eq!(finish_record(1, &buf, &[]), Err(Error::BufferTooSmall));
    }

    #[test]
    fn test_truncated_terminator() {
        let mut buf = record(&[(1, 10)]);
        buf.pop();
        assert_eq!(read(&buf, &[], &[1]), Err(Error::BufferTooSmall));
    }

    #[test]
    fn test_broken_terminator() {
        assert_eq!(unmarshal_terminator(0, &[1, 2]), Err(Error::InvalidData));
        assert_eq!(skip_record(0, &[1, 0]), Err(Error::InvalidData));
    }

    #[test]
    fn test_nested_records_are_skipped_by_wire_type() {
        let inner = record(&[(1, 7), (2, 8)]);
        let text = "nested";

        let size = 2 + inner.len() + 2 + size_str(text) + 2 + 4 + TERMINATOR_SIZE;
        let mut buf = vec![0u8; size];
        let n = marshal_tag(0, &mut buf, WireType::Record, 1).unwrap();
        write_window(&mut buf, n, inner.len()).unwrap().copy_from_slice(&inner);
        let n = marshal_tag(n + inner.len(), &mut buf, WireType::Bytes, 2).unwrap();
        let n = marshal_str(n, &mut buf, text).unwrap();
        let n = marshal_tag(n, &mut buf, WireType::Fixed32, 3).unwrap();
        let n = marshal_fixed(n, &mut buf, 99u32).unwrap();
        let n = marshal_terminator(n, &mut buf).unwrap();
        assert_eq!(n, size);

        assert_eq!(skip_record(0, &buf), Ok(size));
        assert_eq!(skip_by_type(0, &buf, WireType::Record as u8), Ok(size));

        // fields 1 and 2 are retired: only field 3 is read
        let (next, presence) = handle_compatibility(0, &buf, &[1, 2], 3).unwrap();
        assert_eq!(presence, Presence::Present(WireType::Fixed32));
        assert_eq!(unmarshal_fixed::<u32>(next, &buf), Ok((size - 2, 99)));
    }

    #[test]
    fn test_invalid_wire_type() {
        for bad in [0u8, 1, 8, 0x7F] {
            assert_eq!(skip_by_type(0, &[0; 8], bad), Err(Error::InvalidType(bad)));
        }

        // a reserved field with a corrupt wire type
        let buf = [0x09, 3, 0, 0, 1, 1];
        assert_eq!(
            handle_compatibility(0, &buf, &[3], 4),
            Err(Error::InvalidType(9).in_field(3))
        );
        assert_eq!(finish_record(0, &buf, &[]), Err(Error::InvalidType(9).in_field(3)));

        // the expected field itself with a corrupt wire type
        assert_eq!(
            handle_compatibility(0, &buf, &[], 3),
            Err(Error::InvalidType(9).in_field(3))
        );
        assert_eq!(skip_record(0, &buf), Err(Error::InvalidType(9)));
    }

    #[test]
    fn test_skip_errors_name_the_skipped_field() {
        // field 2 claims 0x7F bytes of payload, field 3 is the one wanted
        let buf = [WireType::Bytes as u8, 2, 0x7F, b'x', WireType::Fixed8 as u8, 3, 9, 1, 1];
        assert_eq!(
            handle_compatibility(0, &buf, &[], 3),
            Err(Error::BufferTooSmall.in_field(2))
        );
        assert_eq!(finish_record(0, &buf, &[]), Err(Error::BufferTooSmall.in_field(2)));
    }

    #[test]
    fn test_fixed_widths() {
        let buf = [0u8; 8];
        assert_eq!(skip_by_type(0, &buf, WireType::Fixed8 as u8), Ok(1));
        assert_eq!(skip_by_type(0, &buf, WireType::Fixed16 as u8), Ok(2));
        assert_eq!(skip_by_type(0, &buf, WireType::Fixed32 as u8), Ok(4));
        assert_eq!(skip_by_type(0, &buf, WireType::Fixed64 as u8), Ok(8));
        assert_eq!(skip_by_type(1, &buf, WireType::Fixed64 as u8), Err(Error::BufferTooSmall));
    }

    #[test]
    fn test_nesting_limit() {
        // each level opens another record field and never closes it
        let buf: Vec<u8> = [WireType::Record as u8, 1].repeat(MAX_SKIP_DEPTH + 2);
        assert_eq!(skip_record(0, &buf), Err(Error::NestingTooDeep));
    }
}
