//! Integration tests for tagwire records

use std::collections::{BTreeMap, HashMap};

use tagwire::{
    decode, decode_prefix, encode, BufferPool, ByteBuf, Error, FrameBuilder, FrameReader, Marshal,
    Unmarshal, Varint, WireType,
};
use tagwire_macros::Record;

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Point {
    #[tagwire(id = 1)]
    x: i32,
    #[tagwire(id = 2)]
    y: i32,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Everything {
    #[tagwire(id = 1)]
    flag: bool,
    #[tagwire(id = 2)]
    byte: u8,
    #[tagwire(id = 3)]
    small: i16,
    #[tagwire(id = 4)]
    count: u32,
    #[tagwire(id = 5)]
    big: i64,
    #[tagwire(id = 6)]
    ratio: f32,
    #[tagwire(id = 7)]
    precise: f64,
    #[tagwire(id = 8, varint)]
    id: u64,
    #[tagwire(id = 9, varint)]
    delta: i32,
    #[tagwire(id = 10)]
    name: String,
    #[tagwire(id = 11)]
    payload: ByteBuf,
    #[tagwire(id = 12)]
    tags: Vec<String>,
    #[tagwire(id = 13)]
    scores: HashMap<String, Varint<u32>>,
    #[tagwire(id = 14)]
    matrix: Vec<Vec<i32>>,
    #[tagwire(id = 300)]
    far: u16,
}

#[derive(Debug, Default, Clone, PartialEq, Record)]
struct Address {
    #[tagwire(id = 1)]
    street: String,
    #[tagwire(id = 2)]
    zip: u32,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Person {
    #[tagwire(id = 1)]
    name: String,
    #[tagwire(id = 2)]
    home: Address,
    #[tagwire(id = 3)]
    previous: Vec<Address>,
    #[tagwire(id = 4)]
    contacts: BTreeMap<String, Address>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct View<'a> {
    #[tagwire(id = 1)]
    title: &'a str,
    #[tagwire(id = 2)]
    body: &'a [u8],
    #[tagwire(id = 3)]
    words: Vec<&'a str>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Empty {}

#[derive(Debug, Default, PartialEq, Record)]
struct Named {
    #[tagwire(id = 1)]
    x: String,
}

fn everything() -> Everything {
    Everything {
        flag: true,
        byte: 0xAB,
        small: -300,
        count: 70_000,
        big: i64::MIN,
        ratio: 0.5,
        precise: -1.25e300,
        id: u64::MAX,
        delta: -64,
        name: "everything".to_owned(),
        payload: ByteBuf(vec![0, 1, 1, 1, 1, 255]),
        tags: vec!["a".to_owned(), String::new(), "ccc".to_owned()],
        scores: HashMap::from([("x".to_owned(), Varint(1)), ("y".to_owned(), Varint(u32::MAX))]),
        matrix: vec![vec![1, 2], vec![], vec![-3]],
        far: 9,
    }
}

#[test]
fn test_point_layout() {
    let data = encode(&Point { x: 1, y: -1 }).unwrap();
    let fixed32 = WireType::Fixed32 as u8;
    assert_eq!(
        data,
        [fixed32, 1, 1, 0, 0, 0, fixed32, 2, 0xFF, 0xFF, 0xFF, 0xFF, 1, 1]
    );
}

#[test]
fn test_every_field_kind_roundtrips() {
    let value = everything();
    let data = encode(&value).unwrap();
    assert_eq!(data.len(), value.size());

    let back: Everything = decode(&data).unwrap();
    assert_eq!(back, value);
    assert_eq!(Everything::skip(0, &data), Ok(data.len()));
}

#[test]
fn test_default_record_roundtrips() {
    let data = encode(&Everything::default()).unwrap();
    let back: Everything = decode(&data).unwrap();
    assert_eq!(back, Everything::default());
}

#[test]
fn test_nested_records() {
    let home = Address {
        street: "1 Main St".to_owned(),
        zip: 12345,
    };
    let person = Person {
        name: "Ada".to_owned(),
        home: home.clone(),
        previous: vec![Address::default(), home.clone()],
        contacts: BTreeMap::from([("work".to_owned(), home)]),
    };

    let data = encode(&person).unwrap();
    let back: Person = decode(&data).unwrap();
    assert_eq!(back, person);
}

#[test]
fn test_borrowed_fields_point_into_the_buffer() {
    let view = View {
        title: "zero copy",
        body: b"\x00\x01\x02",
        words: vec!["zero", "copy"],
    };
    let data = encode(&view).unwrap();
    let back: View = decode(&data).unwrap();
    assert_eq!(back, view);

    let range = data.as_ptr_range();
    assert!(range.contains(&back.title.as_ptr()));
    assert!(range.contains(&back.body.as_ptr()));
    assert!(range.contains(&back.words[1].as_ptr()));
}

#[test]
fn test_empty_record() {
    let data = encode(&Empty {}).unwrap();
    assert_eq!(data, [1, 1]);
    assert_eq!(decode::<Empty>(&data), Ok(Empty {}));

    // a record with nothing in it decodes every field as its default
    assert_eq!(decode::<Person>(&data), Ok(Person::default()));
}

#[test]
fn test_truncated_records() {
    let data = encode(&Point { x: 1, y: 2 }).unwrap();

    let err = decode::<Point>(&data[..10]).unwrap_err();
    assert!(matches!(err, Error::Field { id: 2, .. }), "{err}");
    assert_eq!(err.root(), &Error::BufferTooSmall);

    // both fields present, terminator missing
    assert_eq!(decode::<Point>(&data[..12]), Err(Error::BufferTooSmall));
    assert_eq!(decode::<Point>(&data[..13]), Err(Error::BufferTooSmall));

    // the buffer ends after the first field
    assert_eq!(decode::<Point>(&data[..6]), Err(Error::BufferTooSmall));
    assert_eq!(decode::<Point>(&[]), Err(Error::BufferTooSmall));
}

#[test]
fn test_errors_name_the_failing_field() {
    let mut data = encode(&Named { x: "ab".to_owned() }).unwrap();
    // tag (2) + length (1) + 'a'
    data[3] = 0xFF;
    let err = decode::<Named>(&data).unwrap_err();
    assert_eq!(
        err,
        Error::Field {
            id: 1,
            source: Box::new(Error::InvalidUtf8)
        }
    );
    assert_eq!(err.to_string(), "field 1: invalid utf-8 in string");
}

#[test]
fn test_changed_field_type_is_rejected() {
    let data = encode(&Point { x: 1, y: 2 }).unwrap();
    let err = decode::<Named>(&data).unwrap_err();
    assert_eq!(
        err.root(),
        &Error::WireTypeMismatch {
            expected: WireType::Bytes,
            found: WireType::Fixed32,
        }
    );
}

#[test]
fn test_trailing_bytes_after_record() {
    let mut data = encode(&Point { x: 3, y: 4 }).unwrap();
    let len = data.len();
    data.extend_from_slice(&[9, 9]);

    assert!(matches!(
        decode::<Point>(&data),
        Err(Error::VerifyMismatch { .. })
    ));
    assert_eq!(decode_prefix::<Point>(&data), Ok((len, Point { x: 3, y: 4 })));
}

#[test]
fn test_records_in_frames() {
    let points: Vec<Point> = (0..5).map(|i| Point { x: i, y: -i }).collect();

    let mut frames = FrameBuilder::new();
    for point in &points {
        frames.push(point).unwrap();
    }
    let data = frames.finish();

    let mut reader = FrameReader::new(&data);
    let mut back = Vec::new();
    while let Some(point) = reader.next_decoded::<Point>() {
        back.push(point.unwrap());
    }
    assert_eq!(back, points);
}

#[test]
fn test_pooled_encoding() {
    let pool = BufferPool::default();
    let value = everything();
    for _ in 0..3 {
        let buf = pool.encode(&value).unwrap();
        assert_eq!(decode::<Everything>(&buf), Ok(everything()));
    }
    assert_eq!(pool.idle(), 1);
}

#[test]
fn test_records_as_sequence_elements() {
    let points = vec![Point { x: 1, y: 1 }, Point::default()];
    let data = encode(&points).unwrap();
    let back: Vec<Point> = decode(&data).unwrap();
    assert_eq!(back, points);
}
