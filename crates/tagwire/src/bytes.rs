//! Length-prefixed strings and byte blobs
//!
//! Both are a varint byte count followed by the raw bytes. Decoding hands out
//! views into the source buffer; they stay valid for as long as the buffer is
//! borrowed, which the lifetime `'a` enforces.

use crate::cursor::{advance, read_window, write_window};
use crate::errors::Result;
use crate::varint::{marshal_uint, size_uint, unmarshal_uint};

/// Encoded size of a byte blob
#[inline]
pub fn size_bytes(value: &[u8]) -> usize {
    size_uint(value.len()) + value.len()
}

/// Write a byte blob at `n`
pub fn marshal_bytes(n: usize, b: &mut [u8], value: &[u8]) -> Result<usize> {
    let n = marshal_uint(n, b, value.len())?;
    write_window(b, n, value.len())?.copy_from_slice(value);
    Ok(n + value.len())
}

/// Read a byte blob at `n`, borrowing it from `b`
pub fn unmarshal_bytes<'a>(n: usize, b: &'a [u8]) -> Result<(usize, &'a [u8])> {
    let (n, len) = unmarshal_uint::<usize>(n, b)?;
    let value = read_window(b, n, len)?;
    Ok((n + len, value))
}

/// Read a byte blob at `n` into an owned buffer
pub fn unmarshal_byte_buf(n: usize, b: &[u8]) -> Result<(usize, Vec<u8>)> {
    let (n, value) = unmarshal_bytes(n, b)?;
    Ok((n, value.to_vec()))
}

/// Advance past a byte blob without copying it
pub fn skip_bytes(n: usize, b: &[u8]) -> Result<usize> {
    let (n, len) = unmarshal_uint::<usize>(n, b)?;
    advance(b, n, len)
}

/// Encoded size of a string
#[inline]
pub fn size_str(value: &str) -> usize {
    size_bytes(value.as_bytes())
}

/// Write a string at `n`
#[inline]
pub fn marshal_str(n: usize, b: &mut [u8], value: &str) -> Result<usize> {
    marshal_bytes(n, b, value.as_bytes())
}

/// Read a string at `n`, borrowing it from `b`
///
/// # Errors
///
/// [`crate::Error::InvalidUtf8`] if the bytes are not valid UTF-8.
pub fn unmarshal_str<'a>(n: usize, b: &'a [u8]) -> Result<(usize, &'a str)> {
    let (n, raw) = unmarshal_bytes(n, b)?;
    Ok((n, core::str::from_utf8(raw)?))
}

/// Read a string at `n` into an owned `String`
pub fn unmarshal_string(n: usize, b: &[u8]) -> Result<(usize, String)> {
    let (n, value) = unmarshal_str(n, b)?;
    Ok((n, value.to_owned()))
}

/// Advance past a string without validating it
#[inline]
pub fn skip_str(n: usize, b: &[u8]) -> Result<usize> {
    skip_bytes(n, b)
}
