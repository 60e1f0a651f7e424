//! Base-128 varint and zig-zag encoding
//!
//! Unsigned integers are split into 7-bit groups, least significant group
//! first. Every byte but the last has the continuation bit (0x80) set.
//! Signed integers are zig-zag mapped onto their unsigned counterpart first,
//! so small negative values stay short.

use core::ops::{BitOrAssign, Shl, Shr, ShrAssign};

use crate::cursor::{read_byte, write_byte};
use crate::errors::{Error, Result};

mod sealed {
    pub trait Sealed {}
}

/// Unsigned integer types that can be varint encoded
pub trait Unsigned:
    sealed::Sealed
    + Copy
    + Default
    + PartialEq
    + PartialOrd
    + From<u8>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
    + ShrAssign<u32>
    + BitOrAssign
{
    /// Bit width of the type
    const BITS: u32;

    /// The low 8 bits of the value
    fn low_byte(self) -> u8;
}

/// Signed integer types that can be zig-zag varint encoded
pub trait Signed: sealed::Sealed + Copy {
    /// Unsigned type of the same width
    type Unsigned: Unsigned;

    /// Map to unsigned so that small magnitudes produce small values
    fn encode_zigzag(self) -> Self::Unsigned;

    /// Inverse of [`Signed::encode_zigzag`]
    fn decode_zigzag(value: Self::Unsigned) -> Self;
}

macro_rules! impl_unsigned {
    ($($ty:ty),* $(,)?) => { $(
        impl sealed::Sealed for $ty {}

        impl Unsigned for $ty {
            const BITS: u32 = <$ty>::BITS;

            #[inline]
            fn low_byte(self) -> u8 {
                self as u8
            }
        }
    )* };
}

macro_rules! impl_signed {
    ($($ty:ty as $unsigned:ty),* $(,)?) => { $(
        impl sealed::Sealed for $ty {}

        impl Signed for $ty {
            type Unsigned = $unsigned;

            #[inline]
            fn encode_zigzag(self) -> $unsigned {
                let x = (self as $unsigned) << 1;
                if self < 0 { !x } else { x }
            }

            #[inline]
            fn decode_zigzag(value: $unsigned) -> Self {
                let x = value >> 1;
                (if value & 1 != 0 { !x } else { x }) as $ty
            }
        }
    )* };
}

impl_unsigned!(u16, u32, u64, u128, usize);
impl_signed!(
    i16 as u16,
    i32 as u32,
    i64 as u64,
    i128 as u128,
    isize as usize,
);

/// Longest encoding a value of `T` can have: u16 → 3, u32 → 5, u64 → 10
pub const fn max_varint_len<T: Unsigned>() -> usize {
    ((T::BITS + 6) / 7) as usize
}

/// Zig-zag map a signed value onto its unsigned counterpart
#[inline]
pub fn encode_zigzag<T: Signed>(value: T) -> T::Unsigned {
    value.encode_zigzag()
}

/// Undo [`encode_zigzag`]
#[inline]
pub fn decode_zigzag<T: Signed>(value: T::Unsigned) -> T {
    T::decode_zigzag(value)
}

/// Number of bytes `value` takes as a varint
#[inline]
pub fn size_uint<T: Unsigned>(mut value: T) -> usize {
    let mut size = 1;
    while value >= T::from(0x80) {
        value >>= 7;
        size += 1;
    }
    size
}

/// Write `value` as a varint at `n`
pub fn marshal_uint<T: Unsigned>(mut n: usize, b: &mut [u8], mut value: T) -> Result<usize> {
    while value >= T::from(0x80) {
        n = write_byte(b, n, value.low_byte() | 0x80)?;
        value >>= 7;
    }
    write_byte(b, n, value.low_byte())
}

/// Read a varint into `T`
///
/// # Errors
///
/// [`Error::BufferTooSmall`] if the buffer ends before the final byte,
/// [`Error::Overflow`] if the encoded value does not fit into `T`.
pub fn unmarshal_uint<T: Unsigned>(mut n: usize, b: &[u8]) -> Result<(usize, T)> {
    let mut value = T::default();
    let mut shift = 0u32;
    loop {
        let byte = read_byte(b, n)?;
        n += 1;

        if shift >= T::BITS {
            return Err(Error::Overflow);
        }

        // the last byte that fits `T` cannot continue
        if byte >= 0x80 && shift + 7 >= T::BITS {
            return Err(Error::Overflow);
        }

        // every bit of the group must survive the shift into `T`
        let bits = T::from(byte & 0x7F);
        let shifted = bits << shift;
        if shifted >> shift != bits {
            return Err(Error::Overflow);
        }

        value |= shifted;
        if byte < 0x80 {
            return Ok((n, value));
        }
        shift += 7;
    }
}

/// Advance past a varint that fits into `T`
pub fn skip_uint<T: Unsigned>(n: usize, b: &[u8]) -> Result<usize> {
    unmarshal_uint::<T>(n, b).map(|(n, _)| n)
}

/// Number of bytes `value` takes as a zig-zag varint
#[inline]
pub fn size_int<T: Signed>(value: T) -> usize {
    size_uint(value.encode_zigzag())
}

/// Write `value` as a zig-zag varint at `n`
pub fn marshal_int<T: Signed>(n: usize, b: &mut [u8], value: T) -> Result<usize> {
    marshal_uint(n, b, value.encode_zigzag())
}

/// Read a zig-zag varint into `T`
///
/// # Errors
///
/// Same as [`unmarshal_uint`].
pub fn unmarshal_int<T: Signed>(n: usize, b: &[u8]) -> Result<(usize, T)> {
    let (n, value) = unmarshal_uint::<T::Unsigned>(n, b)?;
    Ok((n, T::decode_zigzag(value)))
}

/// Advance past a zig-zag varint that fits into `T`
pub fn skip_int<T: Signed>(n: usize, b: &[u8]) -> Result<usize> {
    skip_uint::<T::Unsigned>(n, b)
}
