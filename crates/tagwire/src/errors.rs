//! Error types for tagwire

use crate::tag::WireType;

/// Result type for tagwire operations
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while sizing, encoding or decoding
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Not enough bytes remain for the requested operation
    #[error("buffer too small")]
    BufferTooSmall,
    /// A varint carries more bits than the target integer type can hold
    #[error("varint overflows the target integer type")]
    Overflow,
    /// A wire-type byte does not name any known wire type
    #[error("invalid wire type {0}")]
    InvalidType(u8),
    /// A tag announces a different wire type than the field's type is framed with
    #[error("wire type mismatch: expected {expected:?}, found {found:?}")]
    WireTypeMismatch {
        /// Wire type the decoding type is framed with
        expected: WireType,
        /// Wire type read from the tag
        found: WireType,
    },
    /// A decoded length disagrees with the bytes it is supposed to describe
    #[error("invalid size")]
    InvalidSize,
    /// A decoded marker byte has an unexpected value
    #[error("invalid data")]
    InvalidData,
    /// Invalid UTF-8 in a string payload
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    /// Nested records go deeper than the skip logic will follow
    #[error("records nested too deeply")]
    NestingTooDeep,
    /// Field identifier 0 is not a legal field identifier
    #[error("field id 0 is not a valid field id")]
    InvalidFieldId,
    /// The size, marshal and unmarshal steps disagree on the byte count
    #[error("size mismatch: expected {expected} bytes, got {actual}")]
    VerifyMismatch {
        /// Byte count that was announced
        expected: usize,
        /// Byte count that was actually produced or consumed
        actual: usize,
    },
    /// Error while handling the field with the given id
    #[error("field {id}: {source}")]
    Field {
        /// Field identifier
        id: u16,
        /// Underlying error
        source: Box<Error>,
    },
    /// Error while handling the sequence element at the given index
    #[error("element {index}: {source}")]
    Element {
        /// Element position
        index: usize,
        /// Underlying error
        source: Box<Error>,
    },
    /// Error while handling the key of the map entry at the given index
    #[error("map key {index}: {source}")]
    MapKey {
        /// Entry position
        index: usize,
        /// Underlying error
        source: Box<Error>,
    },
    /// Error while handling the value of the map entry at the given index
    #[error("map value {index}: {source}")]
    MapValue {
        /// Entry position
        index: usize,
        /// Underlying error
        source: Box<Error>,
    },
}

impl Error {
    /// Strip field, element and map context, returning the underlying error
    pub fn root(&self) -> &Error {
        match self {
            Error::Field { source, .. }
            | Error::Element { source, .. }
            | Error::MapKey { source, .. }
            | Error::MapValue { source, .. } => source.root(),
            other => other,
        }
    }

    /// Annotate this error with the id of the field being processed
    pub fn in_field(self, id: u16) -> Self {
        Error::Field {
            id,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_element(self, index: usize) -> Self {
        Error::Element {
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_map_key(self, index: usize) -> Self {
        Error::MapKey {
            index,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_map_value(self, index: usize) -> Self {
        Error::MapValue {
            index,
            source: Box::new(self),
        }
    }
}

impl From<core::str::Utf8Error> for Error {
    fn from(_: core::str::Utf8Error) -> Self {
        Error::InvalidUtf8
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(_: std::string::FromUtf8Error) -> Self {
        Error::InvalidUtf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_strips_context() {
        let err = Error::BufferTooSmall.in_element(3).in_field(7);
        assert_eq!(err.root(), &Error::BufferTooSmall);
    }

    #[test]
    fn test_display_includes_context() {
        let err = Error::Overflow.in_map_value(2).in_field(4);
        assert_eq!(
            err.to_string(),
            "field 4: map value 2: varint overflows the target integer type"
        );
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = Error::InvalidUtf8.in_map_key(0);
        let source = err.source().expect("context carries a source");
        assert_eq!(source.to_string(), "invalid utf-8 in string");
    }
}
