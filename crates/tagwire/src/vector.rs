//! Sequence codec
//!
//! A sequence is written as a varint element count, the elements back to
//! back, and a 4-byte sentinel:
//!
//! ```text
//! [count] [element 0] ... [element count-1] [1 1 1 1]
//! ```
//!
//! Decoding and skipping are driven by the count; the sentinel is only
//! checked once all elements are consumed. Element encodings are supplied by
//! the caller, so sequences nest freely (sequences of sequences, of maps, of
//! records).

use crate::cursor::{read_window, remaining, write_window};
use crate::errors::{Error, Result};
use crate::varint::{marshal_uint, size_uint, unmarshal_uint};

/// Bytes closing every sequence and map
pub const SENTINEL: [u8; 4] = [1, 1, 1, 1];

/// Size of [`SENTINEL`]
pub const SENTINEL_SIZE: usize = SENTINEL.len();

pub(crate) fn marshal_sentinel(n: usize, b: &mut [u8]) -> Result<usize> {
    write_window(b, n, SENTINEL_SIZE)?.copy_from_slice(&SENTINEL);
    Ok(n + SENTINEL_SIZE)
}

pub(crate) fn unmarshal_sentinel(n: usize, b: &[u8]) -> Result<usize> {
    if read_window(b, n, SENTINEL_SIZE)? != SENTINEL {
        return Err(Error::InvalidData);
    }
    Ok(n + SENTINEL_SIZE)
}

/// Capacity to reserve for `count` announced items, bounded by what the
/// buffer could possibly hold
#[inline]
pub(crate) fn bounded_capacity(count: usize, b: &[u8], n: usize) -> usize {
    count.min(remaining(b, n))
}

/// Encoded size of a sequence
pub fn size_slice<T, F>(values: &[T], size_elem: F) -> usize
where
    F: Fn(&T) -> usize,
{
    let elements: usize = values.iter().map(size_elem).sum();
    size_uint(values.len()) + elements + SENTINEL_SIZE
}

/// Write a sequence at `n`
pub fn marshal_slice<T, F>(n: usize, b: &mut [u8], values: &[T], marshal_elem: F) -> Result<usize>
where
    F: Fn(usize, &mut [u8], &T) -> Result<usize>,
{
    let mut n = marshal_uint(n, b, values.len())?;
    for (index, value) in values.iter().enumerate() {
        n = marshal_elem(n, b, value).map_err(|e| e.in_element(index))?;
    }
    marshal_sentinel(n, b)
}

/// Read a sequence at `n`
///
/// # Errors
///
/// The first element error, annotated with the element index.
/// [`Error::InvalidData`] if the elements are not followed by the sentinel.
pub fn unmarshal_slice<'a, T, F>(n: usize, b: &'a [u8], unmarshal_elem: F) -> Result<(usize, Vec<T>)>
where
    F: Fn(usize, &'a [u8]) -> Result<(usize, T)>,
{
    let (mut n, count) = unmarshal_uint::<usize>(n, b)?;
    let mut values = Vec::with_capacity(bounded_capacity(count, b, n));
    for index in 0..count {
        let (next, value) = unmarshal_elem(n, b).map_err(|e| e.in_element(index))?;
        values.push(value);
        n = next;
    }
    let n = unmarshal_sentinel(n, b)?;
    Ok((n, values))
}

/// Advance past a sequence, skipping exactly as many elements as announced
pub fn skip_slice<'a, F>(n: usize, b: &'a [u8], skip_elem: F) -> Result<usize>
where
    F: Fn(usize, &'a [u8]) -> Result<usize>,
{
    let (mut n, count) = unmarshal_uint::<usize>(n, b)?;
    for index in 0..count {
        n = skip_elem(n, b).map_err(|e| e.in_element(index))?;
    }
    unmarshal_sentinel(n, b)
}
