//! Fixed-width scalar codec
//!
//! Integers and floats are written little-endian at their natural width,
//! booleans as a single `0` or `1` byte. None of these carry a tag of their
//! own; record fields get one from [`crate::field`].

use core::mem::size_of;

use crate::cursor::{advance, read_window, write_window};
use crate::errors::{Error, Result};
use crate::tag::WireType;

mod sealed {
    pub trait Sealed {}
}

/// Scalar types with a constant encoded width
pub trait Fixed: sealed::Sealed + Copy {
    /// Encoded width in bytes
    const WIDTH: usize;

    /// Wire type a field of this type is tagged with
    const WIRE_TYPE: WireType;

    /// Write the value into exactly [`Fixed::WIDTH`] bytes
    fn write_le(self, out: &mut [u8]);

    /// Read the value from exactly [`Fixed::WIDTH`] bytes
    fn read_le(bytes: &[u8]) -> Result<Self>;
}

macro_rules! impl_fixed {
    ($($ty:ty => $wire:ident),* $(,)?) => { $(
        impl sealed::Sealed for $ty {}

        impl Fixed for $ty {
            const WIDTH: usize = size_of::<$ty>();
            const WIRE_TYPE: WireType = WireType::$wire;

            #[inline]
            fn write_le(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Result<Self> {
                let mut raw = [0u8; size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                Ok(<$ty>::from_le_bytes(raw))
            }
        }
    )* };
}

impl_fixed!(
    u8 => Fixed8,
    i8 => Fixed8,
    u16 => Fixed16,
    i16 => Fixed16,
    u32 => Fixed32,
    i32 => Fixed32,
    f32 => Fixed32,
    u64 => Fixed64,
    i64 => Fixed64,
    f64 => Fixed64,
);

impl sealed::Sealed for bool {}

impl Fixed for bool {
    const WIDTH: usize = 1;
    const WIRE_TYPE: WireType = WireType::Fixed8;

    #[inline]
    fn write_le(self, out: &mut [u8]) {
        out[0] = u8::from(self);
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Result<Self> {
        match bytes[0] {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(Error::InvalidData),
        }
    }
}

/// Encoded width of `T`
#[inline]
pub const fn size_fixed<T: Fixed>() -> usize {
    T::WIDTH
}

/// Write `value` at `n`
#[inline]
pub fn marshal_fixed<T: Fixed>(n: usize, b: &mut [u8], value: T) -> Result<usize> {
    value.write_le(write_window(b, n, T::WIDTH)?);
    Ok(n + T::WIDTH)
}

/// Read a `T` at `n`
#[inline]
pub fn unmarshal_fixed<T: Fixed>(n: usize, b: &[u8]) -> Result<(usize, T)> {
    let value = T::read_le(read_window(b, n, T::WIDTH)?)?;
    Ok((n + T::WIDTH, value))
}

/// Advance past a `T` without decoding it
#[inline]
pub fn skip_fixed<T: Fixed>(n: usize, b: &[u8]) -> Result<usize> {
    advance(b, n, T::WIDTH)
}
