//! Old and new readers sharing one wire format

use tagwire::{decode, encode};
use tagwire_macros::Record;

/// The first published shape
#[derive(Debug, Default, Record)]
struct OrderV1 {
    #[tagwire(id = 1, varint)]
    id: u64,
    #[tagwire(id = 2)]
    customer: String,
    #[tagwire(id = 3)]
    amount_cents: u32,
}

/// `amount_cents` retired, currency-aware fields added
#[derive(Debug, Default, Record)]
#[tagwire(reserved(3))]
struct OrderV2 {
    #[tagwire(id = 1, varint)]
    id: u64,
    #[tagwire(id = 2)]
    customer: String,
    #[tagwire(id = 4)]
    currency: String,
    #[tagwire(id = 5, varint)]
    amount_minor: i64,
    #[tagwire(id = 6)]
    notes: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("tagwire Schema Evolution Example");
    println!("================================");

    let old = OrderV1 {
        id: 7,
        customer: "ada".to_owned(),
        amount_cents: 1999,
    };
    let old_bytes = encode(&old)?;

    // New code reading old data: the retired field is skipped, new fields default
    let upgraded: OrderV2 = decode(&old_bytes)?;
    println!("\n⬆️  v1 bytes read as v2: {upgraded:?}");

    let new = OrderV2 {
        id: 8,
        customer: "lin".to_owned(),
        currency: "EUR".to_owned(),
        amount_minor: 4250,
        notes: vec!["gift wrap".to_owned()],
    };
    let new_bytes = encode(&new)?;

    // Old code reading new data: fields it never heard of are skipped
    let downgraded: OrderV1 = decode(&new_bytes)?;
    println!("⬇️  v2 bytes read as v1: {downgraded:?}");

    assert_eq!(upgraded.customer, old.customer);
    assert_eq!(downgraded.customer, new.customer);
    assert_eq!(downgraded.amount_cents, 0);

    println!("\n🎉 Both directions decode cleanly.");
    Ok(())
}
