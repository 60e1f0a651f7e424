//! tagwire - Tagged binary serialization runtime
//!
//! This crate provides the runtime of a compact binary wire format:
//! - Codecs for varints, fixed-width scalars, strings, blobs, sequences and maps
//! - Tagged records that stay readable as their schema gains and retires fields
//! - [`Marshal`] / [`Unmarshal`] traits, with `#[derive(Record)]` behind the
//!   `derive` feature
//! - Entry points, message framing and a reusable buffer pool
//!
//! Every codec function takes a buffer and a cursor `n` and returns the cursor
//! just past what it wrote or read, so calls chain with `?`.
//!
//! # Quick Start
//!
//! ```rust
//! use std::collections::BTreeMap;
//!
//! // Serialize
//! let scores = BTreeMap::from([("ada", vec![3u32, 5]), ("lin", vec![])]);
//! let data = tagwire::encode(&scores)?;
//!
//! // Deserialize, borrowing the keys from `data`
//! let back: BTreeMap<&str, Vec<u32>> = tagwire::decode(&data)?;
//! assert_eq!(back, scores);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Records
//!
//! ```rust
//! # #[cfg(feature = "derive")]
//! # fn main() -> tagwire::Result<()> {
//! use tagwire::Record;
//!
//! #[derive(Debug, Default, PartialEq, Record)]
//! #[tagwire(reserved(2))]
//! struct User<'a> {
//!     #[tagwire(id = 1, varint)]
//!     id: u64,
//!     #[tagwire(id = 3)]
//!     name: &'a str,
//! }
//!
//! let data = tagwire::encode(&User { id: 7, name: "ada" })?;
//! let user: User = tagwire::decode(&data)?;
//! assert_eq!(user.name, "ada");
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "derive"))]
//! # fn main() {}
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod builder;
mod errors;
mod pool;
mod reader;

pub mod bytes;
pub mod compat;
pub mod cursor;
pub mod field;
pub mod map;
pub mod primitives;
pub mod tag;
pub mod varint;
pub mod vector;

pub use builder::{encode, encode_into, FrameBuilder};
pub use compat::{
    finish_record, handle_compatibility, marshal_terminator, skip_by_type, skip_record, Presence,
};
pub use errors::{Error, Result};
pub use field::{
    marshal_field, size_field, unmarshal_field, ByteBuf, Framing, Marshal, Unmarshal, Varint, Wire,
};
pub use pool::{BufferPool, PoolConfig, PooledBuffer};
pub use reader::{decode, decode_prefix, FrameReader};
pub use tag::{Tag, WireType};

/// Derive [`Wire`], [`Marshal`] and [`Unmarshal`] for a struct with named fields
#[cfg(feature = "derive")]
#[cfg_attr(docsrs, doc(cfg(feature = "derive")))]
pub use tagwire_macros::Record;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        builder::{encode, FrameBuilder},
        errors::{Error, Result},
        field::{ByteBuf, Marshal, Unmarshal, Varint, Wire},
        pool::{BufferPool, PoolConfig},
        reader::{decode, FrameReader},
        tag::WireType,
    };

    #[cfg(feature = "derive")]
    pub use tagwire_macros::Record;
}

/// Core constants of the tagwire format
pub mod constants {
    pub use crate::builder::{FRAME_HEADER_SIZE, MAX_FRAME_PAYLOAD};
    pub use crate::compat::{MAX_SKIP_DEPTH, TERMINATOR, TERMINATOR_SIZE};
    pub use crate::tag::LONG_FORM;
    pub use crate::vector::{SENTINEL, SENTINEL_SIZE};

    /// Lowest legal field identifier
    pub const MIN_FIELD_ID: u16 = 1;

    /// Field identifiers above this use the 3-byte long-form tag
    pub const MAX_SHORT_FIELD_ID: u16 = 0xFF;
}
