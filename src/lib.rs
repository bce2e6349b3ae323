//! MicroTLV: compact tag-length-value wire codec for embedded messaging
//!
//! This crate encodes fixed-layout records into caller-provided byte buffers
//! and decodes them back in place, without allocating. Messages are
//! described by static schemas, framed field by field so that receivers can
//! skip what they do not understand, and wrapped in a small envelope that a
//! dispatcher routes to typed handlers.
//!
//! # Wire Format
//!
//! ```text
//! Envelope
//! +------------+-----------------------+---------------------+-----------+
//! | Version u8 | TypeId u16 LE (or u8) | PayloadLen varint   | Payload   |
//! |            |                       | (or u8)             |           |
//! +------------+-----------------------+---------------------+-----------+
//!
//! Payload: zero or more field frames, in any order
//! +-----------------+---------------------+----------------------------+
//! | FieldId varint  | Len varint          | Value (Len bytes)          |
//! +-----------------+---------------------+----------------------------+
//! ```
//!
//! Field values are raw little-endian for 8/16-bit integers, floats and
//! booleans, varints for 32/64-bit integers (zigzag for signed ones), the
//! concatenated elements for arrays and strings, and a nested frame
//! sequence for embedded messages.
//!
//! # Features
//!
//! - Allocation-free encoding and decoding over bounds-checked cursors
//! - One generic codec driven by compile-time schemas ([`message!`])
//! - Forward compatibility: unknown fields are skipped
//! - Nested messages, bounded arrays and fixed-capacity strings
//! - Fixed-capacity dispatcher with optional per-type handlers
//! - `no_std` support
//!
//! # Example
//!
//! ```rust
//! use microtlv::messages::{SensorData, Value};
//! use microtlv::{from_slice, to_slice};
//!
//! let report = SensorData::new(7, "boiler", Value::new(1250, "mV")?)?;
//!
//! let mut buf = [0u8; 128];
//! let len = to_slice(&report, &mut buf)?;
//!
//! let decoded: SensorData = from_slice(&buf[..len])?;
//! assert_eq!(decoded, report);
//! assert_eq!(decoded.name.as_str(), Some("boiler"));
//! # Ok::<(), microtlv::Error>(())
//! ```

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

pub mod array;
pub mod cursor;
pub mod dispatch;
pub mod envelope;
pub mod error;
pub mod field;
pub mod message;
pub mod messages;
pub mod primitive;
pub mod schema;
pub mod varint;

// Re-export main types
pub use array::{BoundedArray, FixedString};
pub use cursor::{ReadCursor, WriteCursor};
pub use dispatch::{DispatchState, Dispatched, Dispatcher, Handler, Receiver, Route};
pub use envelope::{Envelope, EnvelopeConfig, EnvelopeHeader, LengthPrefix, TypeIdWidth};
pub use error::{Error, Result};
pub use message::{
    decode_message, decode_message_into, encode_message, from_slice, message_size, to_slice,
};
pub use primitive::{Primitive, Scalar, ScalarKind};
pub use schema::{FieldDescriptor, Message, MessageDescriptor, MessageType, WireKind};

/// Current protocol version
pub const PROTOCOL_VERSION: u8 = 1;

/// Longest varint the codec accepts (a full 64-bit value)
pub const MAX_VARINT_LEN: usize = varint::MAX_VARINT_U64_SIZE;

/// Capacity used for string fields of the bundled schema
pub const DEFAULT_STRING_CAPACITY: usize = 32;
