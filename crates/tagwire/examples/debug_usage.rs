//! Debug example that walks the wire layout of a record by hand

use tagwire::compat::{skip_by_type, TERMINATOR};
use tagwire::tag::unmarshal_tag;
use tagwire::{encode, Varint, WireType};
use tagwire_macros::Record;

#[derive(Debug, Default, Record)]
struct Probe {
    #[tagwire(id = 1)]
    small: u16,
    #[tagwire(id = 2, varint)]
    counter: i32,
    #[tagwire(id = 3)]
    label: String,
    #[tagwire(id = 4)]
    values: Vec<u8>,
    #[tagwire(id = 400)]
    far_away: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("tagwire Debug Example");
    println!("=====================");

    let probe = Probe {
        small: 0x0102,
        counter: -3,
        label: "probe".to_owned(),
        values: vec![1, 1, 1, 1],
        far_away: true,
    };
    let data = encode(&probe)?;

    println!("Serialized data: {:?}", data);
    println!("Data length: {}", data.len());
    println!("Varint(-3) alone: {:?}", encode(&Varint(-3i32))?);

    let mut n = 0;
    while data.get(n) != Some(&TERMINATOR[0]) {
        let (payload, tag) = unmarshal_tag(n, &data)?;
        let next = skip_by_type(payload, &data, tag.wire_type)?;
        let kind = WireType::try_from(tag.wire_type)?;
        println!(
            "Field {:>3} - {:?}, tag {:?}, payload {:?}",
            tag.id,
            kind,
            &data[n..payload],
            &data[payload..next]
        );
        n = next;
    }
    println!("Terminator: {:?} at offset {}", &data[n..], n);

    Ok(())
}
