//! Read-side entry points and the message frame reader

use crate::builder::{verify, FRAME_HEADER_SIZE};
use crate::cursor::read_window;
use crate::errors::Result;
use crate::field::Unmarshal;

/// Decode a value that must span the whole buffer
///
/// Borrowed fields of the result point into `b`.
///
/// # Errors
///
/// Any unmarshal error, or [`crate::Error::VerifyMismatch`] if bytes are left
/// over after the value.
pub fn decode<'a, T: Unmarshal<'a>>(b: &'a [u8]) -> Result<T> {
    let (n, value) = T::unmarshal(0, b)?;
    verify(b.len(), n)?;
    Ok(value)
}

/// Decode a value from the start of the buffer, returning the bytes consumed
pub fn decode_prefix<'a, T: Unmarshal<'a>>(b: &'a [u8]) -> Result<(usize, T)> {
    T::unmarshal(0, b)
}

/// Iterates over the payloads of a buffer written by [`crate::FrameBuilder`]
///
/// A frame cut short yields one error, after which iteration stops.
#[derive(Debug, Clone)]
pub struct FrameReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    failed: bool,
}

impl<'a> FrameReader<'a> {
    /// Create a frame reader over `buffer`
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            failed: false,
        }
    }

    /// Bytes not yet consumed
    pub fn remainder(&self) -> &'a [u8] {
        self.buffer.get(self.offset..).unwrap_or_default()
    }

    /// Decode the next frame as a `T`
    pub fn next_decoded<T: Unmarshal<'a>>(&mut self) -> Option<Result<T>> {
        self.next().map(|frame| frame.and_then(decode))
    }

    fn read_frame(&self) -> Result<(usize, &'a [u8])> {
        let header = read_window(self.buffer, self.offset, FRAME_HEADER_SIZE)?;
        let len = usize::from(u16::from_le_bytes([header[0], header[1]]));
        let start = self.offset + FRAME_HEADER_SIZE;
        let payload = read_window(self.buffer, start, len)?;
        Ok((start + len, payload))
    }
}

impl<'a> Iterator for FrameReader<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.buffer.len() {
            return None;
        }
        match self.read_frame() {
            Ok((next, payload)) => {
                self.offset = next;
                Some(Ok(payload))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
