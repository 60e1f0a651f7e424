//! Property tests over derived records

use std::collections::BTreeMap;

use proptest::prelude::*;
use tagwire::{decode, encode, Error, FrameBuilder, FrameReader, Marshal, Varint};
use tagwire_macros::Record;

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Current {
    #[tagwire(id = 1)]
    id: u64,
    #[tagwire(id = 2)]
    name: String,
    #[tagwire(id = 3, varint)]
    balance: i64,
    #[tagwire(id = 4)]
    blob: Vec<u8>,
    #[tagwire(id = 5)]
    labels: BTreeMap<String, Varint<u32>>,
    #[tagwire(id = 700)]
    extra: Vec<Vec<String>>,
}

#[derive(Debug, Default, PartialEq, Record)]
#[tagwire(reserved(4, 5))]
struct Legacy {
    #[tagwire(id = 1)]
    id: u64,
    #[tagwire(id = 2)]
    name: String,
    #[tagwire(id = 3, varint)]
    balance: i64,
}

fn current() -> impl Strategy<Value = Current> {
    (
        any::<u64>(),
        ".{0,12}",
        any::<i64>(),
        prop::collection::vec(any::<u8>(), 0..16),
        prop::collection::btree_map(".{0,4}", any::<u32>().prop_map(Varint), 0..4),
        prop::collection::vec(prop::collection::vec(".{0,3}", 0..3), 0..3),
    )
        .prop_map(|(id, name, balance, blob, labels, extra)| Current {
            id,
            name,
            balance,
            blob,
            labels,
            extra,
        })
}

proptest! {
    #[test]
    fn prop_record_roundtrip(value in current()) {
        let data = encode(&value).unwrap();
        prop_assert_eq!(data.len(), value.size());
        prop_assert_eq!(decode::<Current>(&data).unwrap(), value);
    }

    #[test]
    fn prop_old_reader_sees_its_fields(value in current()) {
        let data = encode(&value).unwrap();
        let legacy: Legacy = decode(&data).unwrap();
        prop_assert_eq!(legacy.id, value.id);
        prop_assert_eq!(legacy.name, value.name);
        prop_assert_eq!(legacy.balance, value.balance);
    }

    #[test]
    fn prop_truncation_never_decodes(value in current(), cut in any::<prop::sample::Index>()) {
        let data = encode(&value).unwrap();
        let cut = cut.index(data.len());
        let err = decode::<Current>(&data[..cut]).unwrap_err();
        prop_assert_eq!(err.root(), &Error::BufferTooSmall);
    }

    #[test]
    fn prop_arbitrary_bytes_do_not_panic(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode::<Current>(&bytes);
        let _ = decode::<Legacy>(&bytes);
        let _ = FrameReader::new(&bytes).count();
    }

    #[test]
    fn prop_frames_preserve_order(values in prop::collection::vec(current(), 0..5)) {
        let mut frames = FrameBuilder::new();
        for value in &values {
            frames.push(value).unwrap();
        }
        let data = frames.finish();

        let back: Vec<Current> = FrameReader::new(&data)
            .map(|frame| decode(frame.unwrap()).unwrap())
            .collect();
        prop_assert_eq!(back, values);
    }
}
