//! Basic usage example for MicroTLV
//!
//! Run with: cargo run --example basic_usage

use microtlv::messages::{msg_types, SensorData, Value};
use microtlv::*;

#[derive(Default)]
struct Station {
    reports: usize,
    last_value: u32,
}

fn on_report(msg: &SensorData, station: &mut Station) {
    station.reports += 1;
    station.last_value = msg.value.value;
    println!(
        "  handler: sensor #{} {:?} = {} {:?}",
        msg.id,
        msg.name.as_str().unwrap_or("?"),
        msg.value.value,
        msg.value.unit.as_str().unwrap_or("?")
    );
}

static REPORTS: Handler<SensorData, Station> = Handler::new(on_report);
static VALUES: Handler<Value, Station> = Handler::discard();

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("MicroTLV Basic Usage Example");
    println!("============================");

    // Example 1: Encode and decode one report
    println!("\n1. Sensor Report Roundtrip:");
    {
        let report = SensorData::new(7, "boiler", Value::new(1250, "mV")?)?;

        let mut buf = [0u8; 128];
        let size = to_slice(&report, &mut buf)?;
        println!("  Encoded {} bytes: {:02X?}", size, &buf[..size]);

        let decoded: SensorData = from_slice(&buf[..size])?;
        println!("  Decoded: {:?}", decoded);
        assert_eq!(decoded, report);
    }

    // Example 2: Size pass before encoding
    println!("\n2. Size Computation:");
    {
        let report = SensorData::new(8, "", Value::default())?;
        let payload = message::payload_size(&report)?;
        let total = message_size(&report, &EnvelopeConfig::STANDARD)?;
        println!("  Payload {} bytes, with envelope {} bytes", payload, total);

        let mut small = [0u8; 4];
        if let Err(e) = to_slice(&report, &mut small) {
            println!("  Encoding into 4 bytes fails: {} (code {})", e, e.code());
        }
    }

    // Example 3: Forward compatibility
    println!("\n3. Unknown Fields Are Skipped:");
    {
        let payload = [
            0x00, 0x01, 0x2A, // id = 42
            0x0F, 0x02, 0xBE, 0xEF, // field 15, unknown to this receiver
            0x01, 0x03, b'f', b'a', b'n', // name = "fan"
        ];
        let config = EnvelopeConfig::STANDARD;
        let envelope = Envelope {
            header: EnvelopeHeader::new(&config, msg_types::SENSOR_DATA, payload.len()),
            payload: &payload,
        };

        let mut buf = [0u8; 32];
        let mut w = WriteCursor::new(&mut buf);
        envelope.encode(&config, &mut w)?;
        let size = w.position();

        let decoded: SensorData = from_slice(&buf[..size])?;
        println!("  Decoded id={} name={:?}", decoded.id, decoded.name.as_str());
    }

    // Example 4: Dispatching a stream
    println!("\n4. Dispatching a Stream:");
    {
        let mut dispatcher = Dispatcher::<Station, 4>::new(EnvelopeConfig::STANDARD);
        dispatcher.register(&REPORTS)?;
        dispatcher.register(&VALUES)?;

        let mut buf = [0u8; 256];
        let mut w = WriteCursor::new(&mut buf);
        for (id, name, value) in [(1, "pump", 300), (2, "valve", 42), (3, "fan", 7)] {
            let report = SensorData::new(id, name, Value::new(value, "rpm")?)?;
            encode_message(&report, &EnvelopeConfig::STANDARD, &mut w)?;
        }
        encode_message(&Value::new(5, "A")?, &EnvelopeConfig::STANDARD, &mut w)?;
        let size = w.position();

        let mut station = Station::default();
        let mut r = ReadCursor::new(&buf[..size]);
        while !r.is_empty() {
            let outcome = dispatcher.dispatch(&mut r, &mut station)?;
            println!(
                "  {} (type {}): {} bytes, handled={}",
                outcome.name, outcome.type_id, outcome.consumed, outcome.handled
            );
        }
        println!("  {} reports, last value {}", station.reports, station.last_value);
    }

    // Example 5: Compact header profile
    println!("\n5. Compact Envelope:");
    {
        let value = Value::new(99, "%")?;
        let mut buf = [0u8; 32];

        let mut w = WriteCursor::new(&mut buf);
        let standard = encode_message(&value, &EnvelopeConfig::STANDARD, &mut w)?;
        let compact = encode_message(&value, &EnvelopeConfig::COMPACT, &mut w)?;
        println!("  Standard: {} bytes, compact: {} bytes", standard, compact);
    }

    println!("\nAll examples completed successfully!");
    Ok(())
}
