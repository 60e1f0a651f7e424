//! Buffer and cursor helpers
//!
//! Every codec function takes the current offset `n` into a caller-owned
//! buffer and returns the offset just past what it wrote or read. These
//! helpers do the bounds checking so no codec path indexes out of range.

use crate::errors::{Error, Result};

/// Number of bytes left after the cursor, or 0 once past the end
#[inline]
pub fn remaining(b: &[u8], n: usize) -> usize {
    b.len().saturating_sub(n)
}

/// Borrow exactly `len` bytes starting at `n`
#[inline]
pub fn read_window(b: &[u8], n: usize, len: usize) -> Result<&[u8]> {
    let end = n.checked_add(len).ok_or(Error::BufferTooSmall)?;
    b.get(n..end).ok_or(Error::BufferTooSmall)
}

/// Mutably borrow exactly `len` bytes starting at `n`
#[inline]
pub fn write_window(b: &mut [u8], n: usize, len: usize) -> Result<&mut [u8]> {
    let end = n.checked_add(len).ok_or(Error::BufferTooSmall)?;
    b.get_mut(n..end).ok_or(Error::BufferTooSmall)
}

/// Advance the cursor by `len` bytes without looking at them
#[inline]
pub fn advance(b: &[u8], n: usize, len: usize) -> Result<usize> {
    read_window(b, n, len).map(|_| n + len)
}

#[inline]
pub(crate) fn read_byte(b: &[u8], n: usize) -> Result<u8> {
    b.get(n).copied().ok_or(Error::BufferTooSmall)
}

#[inline]
pub(crate) fn write_byte(b: &mut [u8], n: usize, value: u8) -> Result<usize> {
    let slot = b.get_mut(n).ok_or(Error::BufferTooSmall)?;
    *slot = value;
    Ok(n + 1)
}
