//! Map codec
//!
//! Same framing as sequences, with each entry written as key then value:
//!
//! ```text
//! [count] [key 0] [value 0] ... [1 1 1 1]
//! ```
//!
//! Entries are written in whatever order the source map iterates, so two
//! encodings of equal maps are not guaranteed to be byte-identical.

use crate::errors::Result;
use crate::varint::{marshal_uint, size_uint, unmarshal_uint};
use crate::vector::{marshal_sentinel, unmarshal_sentinel, SENTINEL_SIZE};

/// Encoded size of a map
pub fn size_map<'m, K, V, I, FK, FV>(entries: I, size_key: FK, size_value: FV) -> usize
where
    K: 'm + ?Sized,
    V: 'm + ?Sized,
    I: IntoIterator<Item = (&'m K, &'m V)>,
    I::IntoIter: ExactSizeIterator,
    FK: Fn(&K) -> usize,
    FV: Fn(&V) -> usize,
{
    let entries = entries.into_iter();
    let mut size = size_uint(entries.len()) + SENTINEL_SIZE;
    for (key, value) in entries {
        size += size_key(key) + size_value(value);
    }
    size
}

/// Write a map at `n`
pub fn marshal_map<'m, K, V, I, FK, FV>(
    n: usize,
    b: &mut [u8],
    entries: I,
    marshal_key: FK,
    marshal_value: FV,
) -> Result<usize>
where
    K: 'm + ?Sized,
    V: 'm + ?Sized,
    I: IntoIterator<Item = (&'m K, &'m V)>,
    I::IntoIter: ExactSizeIterator,
    FK: Fn(usize, &mut [u8], &K) -> Result<usize>,
    FV: Fn(usize, &mut [u8], &V) -> Result<usize>,
{
    let entries = entries.into_iter();
    let mut n = marshal_uint(n, b, entries.len())?;
    for (index, (key, value)) in entries.enumerate() {
        n = marshal_key(n, b, key).map_err(|e| e.in_map_key(index))?;
        n = marshal_value(n, b, value).map_err(|e| e.in_map_value(index))?;
    }
    marshal_sentinel(n, b)
}

/// Read a map at `n` into any map type
///
/// A key that appears twice keeps the value decoded last.
pub fn unmarshal_map<'a, M, K, V, FK, FV>(
    n: usize,
    b: &'a [u8],
    unmarshal_key: FK,
    unmarshal_value: FV,
) -> Result<(usize, M)>
where
    M: Default + Extend<(K, V)>,
    FK: Fn(usize, &'a [u8]) -> Result<(usize, K)>,
    FV: Fn(usize, &'a [u8]) -> Result<(usize, V)>,
{
    let (mut n, count) = unmarshal_uint::<usize>(n, b)?;
    let mut map = M::default();
    for index in 0..count {
        let (next, key) = unmarshal_key(n, b).map_err(|e| e.in_map_key(index))?;
        let (next, value) = unmarshal_value(next, b).map_err(|e| e.in_map_value(index))?;
        map.extend(core::iter::once((key, value)));
        n = next;
    }
    let n = unmarshal_sentinel(n, b)?;
    Ok((n, map))
}

/// Advance past a map, skipping exactly as many entries as announced
pub fn skip_map<'a, FK, FV>(n: usize, b: &'a [u8], skip_key: FK, skip_value: FV) -> Result<usize>
where
    FK: Fn(usize, &'a [u8]) -> Result<usize>,
    FV: Fn(usize, &'a [u8]) -> Result<usize>,
{
    let (mut n, count) = unmarshal_uint::<usize>(n, b)?;
    for index in 0..count {
        n = skip_key(n, b).map_err(|e| e.in_map_key(index))?;
        n = skip_value(n, b).map_err(|e| e.in_map_value(index))?;
    }
    unmarshal_sentinel(n, b)
}
