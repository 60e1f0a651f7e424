//! Basic usage example for tagwire

use std::collections::BTreeMap;

use tagwire::{decode, encode, ByteBuf, FrameBuilder, FrameReader};
use tagwire_macros::Record;

#[derive(Debug, Default, Record)]
struct Sensor<'a> {
    #[tagwire(id = 1)]
    name: &'a str,
    #[tagwire(id = 2)]
    location: Location,
}

#[derive(Debug, Default, Record)]
struct Location {
    #[tagwire(id = 1)]
    lat: f64,
    #[tagwire(id = 2)]
    lon: f64,
}

#[derive(Debug, Default, Record)]
struct Reading<'a> {
    #[tagwire(id = 1, varint)]
    id: u64,
    #[tagwire(id = 2)]
    celsius: f32,
    #[tagwire(id = 3)]
    ok: bool,
    #[tagwire(id = 4)]
    sensor: Sensor<'a>,
    #[tagwire(id = 5)]
    samples: Vec<i16>,
    #[tagwire(id = 6)]
    raw: ByteBuf,
    #[tagwire(id = 7)]
    tags: BTreeMap<&'a str, &'a str>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("tagwire Basic Usage Example");
    println!("===========================");

    let reading = Reading {
        id: 12345,
        celsius: 21.5,
        ok: true,
        sensor: Sensor {
            name: "greenhouse-3",
            location: Location {
                lat: 52.52,
                lon: 13.405,
            },
        },
        samples: vec![212, 214, 215, -3],
        raw: ByteBuf(b"binary\x00data\x01".to_vec()),
        tags: BTreeMap::from([("unit", "celsius"), ("rack", "b2")]),
    };

    let data = encode(&reading)?;
    println!("✅ Serialized reading: {} bytes", data.len());
    println!("   First few bytes: {:?}", &data[..data.len().min(16)]);

    // Strings in the decoded value borrow from `data`
    let back: Reading = decode(&data)?;

    println!("\n📖 Reading it back:");
    println!("   ID: {}", back.id);
    println!("   Temperature: {:.1}°C (ok: {})", back.celsius, back.ok);
    println!(
        "   Sensor: {} at ({}, {})",
        back.sensor.name, back.sensor.location.lat, back.sensor.location.lon
    );
    println!("   Samples: {:?}", back.samples);
    println!("   Raw: {:?} ({} bytes)", back.raw.as_slice(), back.raw.len());
    println!("   Tags: {:?}", back.tags);

    let name_ptr = back.sensor.name.as_ptr();
    println!("\n🔍 Zero-copy verification:");
    println!("   Name pointer:   {:p}", name_ptr);
    println!("   Buffer pointer: {:p}", data.as_ptr());
    println!(
        "   Name lives in buffer: {}",
        data.as_ptr_range().contains(&name_ptr)
    );

    // Several messages in one buffer
    let mut frames = FrameBuilder::new();
    for id in 0..3u64 {
        frames.push(&Reading {
            id,
            ..Default::default()
        })?;
    }
    let stream = frames.finish();

    println!("\n📦 Framed stream: {} bytes", stream.len());
    let mut reader = FrameReader::new(&stream);
    while let Some(frame) = reader.next_decoded::<Reading>() {
        println!("   frame with reading {}", frame?.id);
    }

    Ok(())
}
