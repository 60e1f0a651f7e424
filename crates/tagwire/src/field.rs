//! Typed codec traits and record-field helpers
//!
//! [`Marshal`] and [`Unmarshal`] tie the free codec functions to Rust types, so
//! record implementations (derived or hand-written) can treat every field the
//! same way. [`Wire::FRAMING`] decides which wire type a field is tagged with
//! and whether its payload needs a length envelope to be skippable.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::ops::{Deref, DerefMut};

use crate::bytes::{
    marshal_bytes, marshal_str, size_bytes, size_str, skip_bytes, skip_str, unmarshal_byte_buf,
    unmarshal_bytes, unmarshal_str, unmarshal_string,
};
use crate::errors::{Error, Result};
use crate::map::{marshal_map, size_map, skip_map, unmarshal_map};
use crate::primitives::{marshal_fixed, size_fixed, skip_fixed, unmarshal_fixed, Fixed};
use crate::tag::{marshal_tag, size_tag, WireType};
use crate::varint::{
    marshal_int, marshal_uint, size_int, size_uint, skip_int, skip_uint, unmarshal_int,
    unmarshal_uint,
};
use crate::vector::{marshal_slice, size_slice, skip_slice, unmarshal_slice};

/// How values of a type are carried as a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Constant-width payload with its own wire type
    Fixed(WireType),
    /// Varint length followed by raw bytes
    LengthPrefixed,
    /// Nested record closed by the record terminator
    Record,
    /// Payload whose extent the wire type alone cannot describe, wrapped in a
    /// varint byte-length envelope and tagged as bytes
    Enveloped,
}

impl Framing {
    /// Wire type written in the field tag
    pub const fn wire_type(self) -> WireType {
        match self {
            Framing::Fixed(wire_type) => wire_type,
            Framing::LengthPrefixed | Framing::Enveloped => WireType::Bytes,
            Framing::Record => WireType::Record,
        }
    }
}

/// Types with a known field framing
pub trait Wire {
    /// Framing used when a value of this type is a record field
    const FRAMING: Framing;
}

/// Types that can be written to a buffer
pub trait Marshal: Wire {
    /// Exact number of bytes [`Marshal::marshal`] will write
    fn size(&self) -> usize;

    /// Write the value at `n`, returning the offset past it
    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize>;
}

/// Types that can be read from a buffer, possibly borrowing from it
pub trait Unmarshal<'a>: Wire + Sized {
    /// Read a value at `n`, returning the offset past it
    fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)>;

    /// Advance past a value at `n` without building it
    fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
        Self::unmarshal(n, b).map(|(n, _)| n)
    }
}

impl<T: Wire + ?Sized> Wire for &T {
    const FRAMING: Framing = T::FRAMING;
}

impl<T: Marshal + ?Sized> Marshal for &T {
    #[inline]
    fn size(&self) -> usize {
        (**self).size()
    }

    #[inline]
    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
        (**self).marshal(n, b)
    }
}

macro_rules! impl_fixed_field {
    ($($ty:ty),* $(,)?) => { $(
        impl Wire for $ty {
            const FRAMING: Framing = Framing::Fixed(<$ty as Fixed>::WIRE_TYPE);
        }

        impl Marshal for $ty {
            #[inline]
            fn size(&self) -> usize {
                size_fixed::<$ty>()
            }

            #[inline]
            fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
                marshal_fixed(n, b, *self)
            }
        }

        impl<'a> Unmarshal<'a> for $ty {
            #[inline]
            fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
                unmarshal_fixed(n, b)
            }

            #[inline]
            fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
                skip_fixed::<$ty>(n, b)
            }
        }
    )* };
}

impl_fixed_field!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64, bool);

/// An integer written as a varint instead of at its full width
///
/// Signed integers are zig-zag mapped first. As a record field the varint sits
/// in a byte-length envelope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Varint<T>(pub T);

impl<T> From<T> for Varint<T> {
    fn from(value: T) -> Self {
        Varint(value)
    }
}

macro_rules! impl_varint_field {
    ($size:ident, $marshal:ident, $unmarshal:ident, $skip:ident => $($ty:ty),*) => { $(
        impl Wire for Varint<$ty> {
            const FRAMING: Framing = Framing::Enveloped;
        }

        impl Marshal for Varint<$ty> {
            #[inline]
            fn size(&self) -> usize {
                $size(self.0)
            }

            #[inline]
            fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
                $marshal(n, b, self.0)
            }
        }

        impl<'a> Unmarshal<'a> for Varint<$ty> {
            #[inline]
            fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
                let (n, value) = $unmarshal::<$ty>(n, b)?;
                Ok((n, Varint(value)))
            }

            #[inline]
            fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
                $skip::<$ty>(n, b)
            }
        }
    )* };
}

impl_varint_field!(size_uint, marshal_uint, unmarshal_uint, skip_uint => u16, u32, u64, u128, usize);
impl_varint_field!(size_int, marshal_int, unmarshal_int, skip_int => i16, i32, i64, i128, isize);

impl Wire for str {
    const FRAMING: Framing = Framing::LengthPrefixed;
}

impl Marshal for str {
    #[inline]
    fn size(&self) -> usize {
        size_str(self)
    }

    #[inline]
    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
        marshal_str(n, b, self)
    }
}

impl<'a> Unmarshal<'a> for &'a str {
    #[inline]
    fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
        unmarshal_str(n, b)
    }

    #[inline]
    fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
        skip_str(n, b)
    }
}

impl Wire for String {
    const FRAMING: Framing = Framing::LengthPrefixed;
}

impl Marshal for String {
    #[inline]
    fn size(&self) -> usize {
        size_str(self)
    }

    #[inline]
    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
        marshal_str(n, b, self)
    }
}

impl<'a> Unmarshal<'a> for String {
    #[inline]
    fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
        unmarshal_string(n, b)
    }

    #[inline]
    fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
        skip_str(n, b)
    }
}

impl Wire for [u8] {
    const FRAMING: Framing = Framing::LengthPrefixed;
}

impl Marshal for [u8] {
    #[inline]
    fn size(&self) -> usize {
        size_bytes(self)
    }

    #[inline]
    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
        marshal_bytes(n, b, self)
    }
}

impl<'a> Unmarshal<'a> for &'a [u8] {
    #[inline]
    fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
        unmarshal_bytes(n, b)
    }

    #[inline]
    fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
        skip_bytes(n, b)
    }
}

/// Owned byte blob
///
/// `Vec<u8>` is a sequence of `u8` elements; wrap it in `ByteBuf` to get the
/// compact length-prefixed blob encoding instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteBuf(pub Vec<u8>);

impl From<Vec<u8>> for ByteBuf {
    fn from(bytes: Vec<u8>) -> Self {
        ByteBuf(bytes)
    }
}

impl From<ByteBuf> for Vec<u8> {
    fn from(buf: ByteBuf) -> Self {
        buf.0
    }
}

impl Deref for ByteBuf {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.0
    }
}

impl DerefMut for ByteBuf {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.0
    }
}

impl Wire for ByteBuf {
    const FRAMING: Framing = Framing::LengthPrefixed;
}

impl Marshal for ByteBuf {
    #[inline]
    fn size(&self) -> usize {
        size_bytes(&self.0)
    }

    #[inline]
    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
        marshal_bytes(n, b, &self.0)
    }
}

impl<'a> Unmarshal<'a> for ByteBuf {
    fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
        let (n, bytes) = unmarshal_byte_buf(n, b)?;
        Ok((n, ByteBuf(bytes)))
    }

    #[inline]
    fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
        skip_bytes(n, b)
    }
}

impl<T> Wire for Vec<T> {
    const FRAMING: Framing = Framing::Enveloped;
}

impl<T: Marshal> Marshal for Vec<T> {
    fn size(&self) -> usize {
        size_slice(self, |v| v.size())
    }

    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
        marshal_slice(n, b, self, |n, b, v| v.marshal(n, b))
    }
}

impl<'a, T: Unmarshal<'a>> Unmarshal<'a> for Vec<T> {
    fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
        unmarshal_slice(n, b, T::unmarshal)
    }

    fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
        skip_slice(n, b, T::skip)
    }
}

impl<K, V, S> Wire for HashMap<K, V, S> {
    const FRAMING: Framing = Framing::Enveloped;
}

impl<K: Marshal, V: Marshal, S> Marshal for HashMap<K, V, S> {
    fn size(&self) -> usize {
        size_map(self, |k| k.size(), |v| v.size())
    }

    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
        marshal_map(n, b, self, |n, b, k| k.marshal(n, b), |n, b, v| v.marshal(n, b))
    }
}

impl<'a, K, V, S> Unmarshal<'a> for HashMap<K, V, S>
where
    K: Unmarshal<'a> + Eq + Hash,
    V: Unmarshal<'a>,
    S: BuildHasher + Default,
{
    fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
        unmarshal_map(n, b, K::unmarshal, V::unmarshal)
    }

    fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
        skip_map(n, b, K::skip, V::skip)
    }
}

impl<K, V> Wire for BTreeMap<K, V> {
    const FRAMING: Framing = Framing::Enveloped;
}

impl<K: Marshal, V: Marshal> Marshal for BTreeMap<K, V> {
    fn size(&self) -> usize {
        size_map(self, |k| k.size(), |v| v.size())
    }

    fn marshal(&self, n: usize, b: &mut [u8]) -> Result<usize> {
        marshal_map(n, b, self, |n, b, k| k.marshal(n, b), |n, b, v| v.marshal(n, b))
    }
}

impl<'a, K, V> Unmarshal<'a> for BTreeMap<K, V>
where
    K: Unmarshal<'a> + Ord,
    V: Unmarshal<'a>,
{
    fn unmarshal(n: usize, b: &'a [u8]) -> Result<(usize, Self)> {
        unmarshal_map(n, b, K::unmarshal, V::unmarshal)
    }

    fn skip(n: usize, b: &'a [u8]) -> Result<usize> {
        skip_map(n, b, K::skip, V::skip)
    }
}

/// Encoded size of `value` as field `id`, tag and envelope included
pub fn size_field<T: Marshal + ?Sized>(id: u16, value: &T) -> usize {
    let payload = value.size();
    let payload = match T::FRAMING {
        Framing::Enveloped => size_uint(payload) + payload,
        _ => payload,
    };
    size_tag(id) + payload
}

/// Write `value` as field `id` at `n`
pub fn marshal_field<T: Marshal + ?Sized>(
    n: usize,
    b: &mut [u8],
    id: u16,
    value: &T,
) -> Result<usize> {
    let n = marshal_tag(n, b, T::FRAMING.wire_type(), id)?;
    if T::FRAMING != Framing::Enveloped {
        return value.marshal(n, b);
    }

    let len = value.size();
    let start = marshal_uint(n, b, len)?;
    let end = value.marshal(start, b)?;
    let actual = end.saturating_sub(start);
    if actual != len {
        return Err(Error::VerifyMismatch {
            expected: len,
            actual,
        });
    }
    Ok(end)
}

/// Read the payload of a field whose tag announced `wire_type`
///
/// Call this once [`crate::handle_compatibility`] reported the field present.
///
/// # Errors
///
/// [`Error::WireTypeMismatch`] if `T` is carried under a different wire type.
/// [`Error::InvalidSize`] if an envelope length disagrees with its payload.
pub fn unmarshal_field<'a, T: Unmarshal<'a>>(
    n: usize,
    b: &'a [u8],
    wire_type: WireType,
) -> Result<(usize, T)> {
    let expected = T::FRAMING.wire_type();
    if wire_type != expected {
        return Err(Error::WireTypeMismatch {
            expected,
            found: wire_type,
        });
    }
    if T::FRAMING != Framing::Enveloped {
        return T::unmarshal(n, b);
    }

    let (start, len) = unmarshal_uint::<usize>(n, b)?;
    let end = start.checked_add(len).ok_or(Error::BufferTooSmall)?;
    let envelope = b.get(..end).ok_or(Error::BufferTooSmall)?;
    let (next, value) = T::unmarshal(start, envelope)?;
    if next != end {
        return Err(Error::InvalidSize);
    }
    Ok((end, value))
}
