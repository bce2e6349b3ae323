//! Generic message codec driven by the static schema
//!
//! Encoding walks the descriptor's field table in declared order and emits
//! one frame per field. Decoding loops over whatever frames arrive, in any
//! order and any subset, and routes each to its field by id.

use tracing::trace;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::envelope::{Envelope, EnvelopeConfig, EnvelopeHeader};
use crate::error::{Error, Result};
use crate::field;
use crate::schema::{FieldMut, Message, MessageType};

/// Total size of all field frames of `msg`
pub fn payload_size(msg: &dyn Message) -> Result<usize> {
    let mut total = 0usize;
    for desc in msg.descriptor().fields {
        let value = msg.field(desc.id).ok_or(Error::InvalidArguments)?;
        let payload_len = field::payload_size(desc, &value)?;
        total = total
            .checked_add(field::frame_size(desc.id, payload_len)?)
            .ok_or(Error::ValueExceedsLimit)?;
    }
    Ok(total)
}

/// Write every field frame of `msg`, returning the bytes written
///
/// Nothing is written unless the whole payload is valid and fits.
pub fn encode_payload(msg: &dyn Message, w: &mut WriteCursor<'_>) -> Result<usize> {
    let size = payload_size(msg)?;
    if w.remaining() < size {
        return Err(Error::BufferTooSmall);
    }

    w.put_scoped(size, |payload| {
        for desc in msg.descriptor().fields {
            let value = msg.field(desc.id).ok_or(Error::InvalidArguments)?;
            field::encode_field(desc, &value, payload)?;
        }
        Ok(())
    })?;
    Ok(size)
}

/// Populate `msg` from a sequence of field frames that fills `r`
///
/// Array fields are emptied first and then filled by every frame carrying
/// their id. Scalar fields that never arrive keep their current values.
/// Frames with unknown ids are skipped.
pub fn decode_payload(msg: &mut dyn Message, r: &mut ReadCursor<'_>) -> Result<()> {
    let descriptor = msg.descriptor();

    for desc in descriptor.fields.iter().filter(|d| d.is_array()) {
        if let Some(FieldMut::Array(array)) = msg.field_mut(desc.id) {
            array.clear();
        }
    }

    while !r.is_empty() {
        let (id, mut frame) = field::next_frame(r)?;

        let known = u32::try_from(id).ok().and_then(|id| descriptor.field(id));
        match known {
            Some(desc) => {
                let slot = msg.field_mut(desc.id).ok_or(Error::InvalidArguments)?;
                field::decode_field(desc, slot, &mut frame)?;
            }
            None => {
                trace!(
                    message_type = descriptor.name,
                    field_id = id,
                    len = frame.remaining(),
                    "skipping unknown field"
                );
            }
        }
    }
    Ok(())
}

/// Size of `msg` wrapped in an envelope
pub fn message_size(msg: &dyn Message, config: &EnvelopeConfig) -> Result<usize> {
    let payload_len = payload_size(msg)?;
    EnvelopeHeader::new(config, msg.descriptor().type_id, payload_len).total_len(config)
}

/// Write `msg` as a complete envelope, returning bytes written
#[inline]
pub fn encode_message(
    msg: &dyn Message,
    config: &EnvelopeConfig,
    w: &mut WriteCursor<'_>,
) -> Result<usize> {
    Envelope::encode_with(config, msg, w)
}

/// Read one envelope into `msg`
///
/// The envelope's type id must match the message's descriptor, otherwise
/// `Error::InvalidId`. The cursor only advances when decoding succeeds.
pub fn decode_message_into(
    msg: &mut dyn Message,
    config: &EnvelopeConfig,
    r: &mut ReadCursor<'_>,
) -> Result<()> {
    let mut ahead = *r;
    let envelope = Envelope::decode(config, &mut ahead)?;
    if envelope.header.type_id != msg.descriptor().type_id {
        return Err(Error::InvalidId);
    }

    decode_payload(msg, &mut ReadCursor::new(envelope.payload))?;
    *r = ahead;
    Ok(())
}

/// Read one envelope into a fresh `T`
pub fn decode_message<T: MessageType>(
    config: &EnvelopeConfig,
    r: &mut ReadCursor<'_>,
) -> Result<T> {
    let mut msg = T::default();
    decode_message_into(&mut msg, config, r)?;
    Ok(msg)
}

/// Encode `msg` with the standard envelope at the start of `buf`
#[inline]
pub fn to_slice(msg: &dyn Message, buf: &mut [u8]) -> Result<usize> {
    encode_message(msg, &EnvelopeConfig::STANDARD, &mut WriteCursor::new(buf))
}

/// Decode a buffer holding exactly one standard envelope
pub fn from_slice<T: MessageType>(buf: &[u8]) -> Result<T> {
    let mut r = ReadCursor::new(buf);
    let msg = decode_message(&EnvelopeConfig::STANDARD, &mut r)?;
    if !r.is_empty() {
        return Err(Error::InvalidData);
    }
    Ok(msg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{BoundedArray, FixedString};

    crate::message! {
        struct Point(3) {
            0 => x: i32,
            1 => y: i32,
        }
    }

    crate::message! {
        struct Track(4) {
            0 => id: u16,
            1 => label: FixedString<8>,
            2 => origin: Point,
            3 => deltas: BoundedArray<i8, 4>,
        }
    }

    fn sample() -> Track {
        Track {
            id: 0x0102,
            label: FixedString::try_from_str("t1").unwrap(),
            origin: Point { x: -1, y: 64 },
            deltas: BoundedArray::from_slice(&[1, -1, 0]).unwrap(),
        }
    }

    #[test]
    fn test_payload_layout() {
        let track = sample();
        let mut buf = [0u8; 64];
        let mut w = WriteCursor::new(&mut buf);
        let written = encode_payload(&track, &mut w).unwrap();

        let expected: &[u8] = &[
            0x00, 0x02, 0x02, 0x01, // id
            0x01, 0x02, b't', b'1', // label
            0x02, 0x07, // origin, nested frames follow
            0x00, 0x01, 0x01, // x = zigzag(-1)
            0x01, 0x02, 0x80, 0x01, // y = zigzag(64)
            0x03, 0x03, 0x01, 0xFF, 0x00, // deltas
        ];
        assert_eq!(w.written(), expected);
        assert_eq!(written, expected.len());
        assert_eq!(payload_size(&track).unwrap(), expected.len());
    }

    #[test]
    fn test_payload_roundtrip() {
        let track = sample();
        let mut buf = [0u8; 64];
        let mut w = WriteCursor::new(&mut buf);
        let written = encode_payload(&track, &mut w).unwrap();

        let mut decoded = Track::default();
        decode_payload(&mut decoded, &mut ReadCursor::new(&buf[..written])).unwrap();
        assert_eq!(decoded, track);
    }

    #[test]
    fn test_empty_payload_decodes_to_defaults() {
        let mut decoded = Track::default();
        decode_payload(&mut decoded, &mut ReadCursor::new(&[])).unwrap();
        assert_eq!(decoded, Track::default());
    }

    #[test]
    fn test_out_of_order_and_unknown_fields() {
        let data = [
            0x01, 0x01, b'z', // label
            0x09, 0x03, 0xDE, 0xAD, 0x00, // unknown field 9
            0x00, 0x02, 0x07, 0x00, // id
        ];
        let mut decoded = Track::default();
        decode_payload(&mut decoded, &mut ReadCursor::new(&data)).unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.label.as_str(), Some("z"));
    }

    #[test]
    fn test_repeated_array_frames_append() {
        let data = [0x03, 0x01, 0x05, 0x03, 0x02, 0x06, 0x07];
        let mut decoded = Track::default();
        decoded.deltas = BoundedArray::from_slice(&[9, 9, 9, 9]).unwrap();
        decode_payload(&mut decoded, &mut ReadCursor::new(&data)).unwrap();
        assert_eq!(decoded.deltas.as_slice(), &[5, 6, 7]);
    }

    #[test]
    fn test_nested_frame_cannot_overrun() {
        // origin declares 2 bytes but its inner frame claims 3
        let data = [0x02, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
        let mut decoded = Track::default();
        assert_eq!(
            decode_payload(&mut decoded, &mut ReadCursor::new(&data)),
            Err(Error::InvalidData)
        );
    }

    #[test]
    fn test_array_overflow_on_decode() {
        let data = [0x03, 0x05, 1, 2, 3, 4, 5];
        let mut decoded = Track::default();
        assert_eq!(
            decode_payload(&mut decoded, &mut ReadCursor::new(&data)),
            Err(Error::ArraySizeExceeded)
        );
    }

    #[test]
    fn test_message_roundtrip() {
        let track = sample();
        let config = EnvelopeConfig::STANDARD;
        let mut buf = [0u8; 64];
        let written = to_slice(&track, &mut buf).unwrap();
        assert_eq!(written, message_size(&track, &config).unwrap());
        assert_eq!(&buf[..3], &[0x01, 0x04, 0x00]);

        let decoded: Track = from_slice(&buf[..written]).unwrap();
        assert_eq!(decoded, track);
    }

    #[test]
    fn test_decode_message_wrong_type() {
        let point = Point { x: 1, y: 2 };
        let config = EnvelopeConfig::STANDARD;
        let mut buf = [0u8; 32];
        let written = to_slice(&point, &mut buf).unwrap();

        let mut r = ReadCursor::new(&buf[..written]);
        assert_eq!(
            decode_message::<Track>(&config, &mut r),
            Err(Error::InvalidId)
        );
        assert_eq!(r.position(), 0);
        assert_eq!(decode_message::<Point>(&config, &mut r).unwrap(), point);
        assert!(r.is_empty());
    }

    #[test]
    fn test_encode_message_buffer_too_small() {
        let track = sample();
        let size = message_size(&track, &EnvelopeConfig::STANDARD).unwrap();
        let mut buf = [0u8; 64];
        assert_eq!(
            to_slice(&track, &mut buf[..size - 1]),
            Err(Error::BufferTooSmall)
        );
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_from_slice_rejects_trailing_bytes() {
        let point = Point { x: 1, y: 2 };
        let mut buf = [0u8; 32];
        let written = to_slice(&point, &mut buf).unwrap();
        assert_eq!(
            from_slice::<Point>(&buf[..written + 1]),
            Err(Error::InvalidData)
        );
    }
}
