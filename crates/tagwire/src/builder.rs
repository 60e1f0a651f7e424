//! Write-side entry points and the message frame builder

use crate::cursor::write_window;
use crate::errors::{Error, Result};
use crate::field::Marshal;

/// Size of the length header in front of every framed message
pub const FRAME_HEADER_SIZE: usize = 2;

/// Largest payload a single frame can carry
pub const MAX_FRAME_PAYLOAD: usize = u16::MAX as usize;

/// Fail unless the announced and actual byte counts agree
#[inline]
pub(crate) fn verify(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::VerifyMismatch { expected, actual });
    }
    Ok(())
}

/// Encode a value into a freshly allocated buffer of exactly its size
///
/// # Errors
///
/// Any marshal error, or [`Error::VerifyMismatch`] if the value wrote a
/// different number of bytes than its `size` announced.
pub fn encode<T: Marshal + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let size = value.size();
    let mut buf = vec![0u8; size];
    let written = value.marshal(0, &mut buf)?;
    verify(size, written)?;
    Ok(buf)
}

/// Encode a value at the start of `buf`, returning the number of bytes used
///
/// Nothing is written if `buf` is shorter than the encoded size.
pub fn encode_into<T: Marshal + ?Sized>(value: &T, buf: &mut [u8]) -> Result<usize> {
    let size = value.size();
    let out = write_window(buf, 0, size)?;
    let written = value.marshal(0, out)?;
    verify(size, written)?;
    Ok(written)
}

/// Concatenates messages, each behind a 2-byte little-endian length
#[derive(Debug, Default)]
pub struct FrameBuilder {
    buffer: Vec<u8>,
    frames: usize,
}

impl FrameBuilder {
    /// Create an empty frame builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a frame builder with room for `capacity` bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            frames: 0,
        }
    }

    /// Number of frames written so far
    pub fn len(&self) -> usize {
        self.frames
    }

    /// Whether no frame has been written
    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Append an already encoded message
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSize`] if the payload is longer than [`MAX_FRAME_PAYLOAD`].
    pub fn push_bytes(&mut self, payload: &[u8]) -> Result<()> {
        let len = u16::try_from(payload.len()).map_err(|_| Error::InvalidSize)?;
        self.buffer.reserve(FRAME_HEADER_SIZE + payload.len());
        self.buffer.extend_from_slice(&len.to_le_bytes());
        self.buffer.extend_from_slice(payload);
        self.frames += 1;
        Ok(())
    }

    /// Encode `value` as the next frame
    ///
    /// On error the builder is left as it was before the call.
    pub fn push<T: Marshal + ?Sized>(&mut self, value: &T) -> Result<()> {
        let size = value.size();
        let len = u16::try_from(size).map_err(|_| Error::InvalidSize)?;

        let start = self.buffer.len();
        self.buffer.extend_from_slice(&len.to_le_bytes());
        self.buffer.resize(start + FRAME_HEADER_SIZE + size, 0);

        let payload = &mut self.buffer[start + FRAME_HEADER_SIZE..];
        let written = value.marshal(0, payload).and_then(|written| {
            verify(size, written)?;
            Ok(written)
        });
        if let Err(err) = written {
            self.buffer.truncate(start);
            return Err(err);
        }

        self.frames += 1;
        Ok(())
    }

    /// Finish building and return the framed bytes
    pub fn finish(self) -> Vec<u8> {
        self.buffer
    }
}
