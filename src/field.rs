//! Tag-length-value field framing
//!
//! ```text
//! +------------------+-----------------------+------------------------+
//! | field id varint  | payload length varint | payload (length bytes) |
//! +------------------+-----------------------+------------------------+
//! ```
//!
//! The payload is a primitive, the concatenated elements of an array, or a
//! nested message's own sequence of frames. Readers skip frames whose id
//! they do not know, so newer senders can add fields safely.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::message;
use crate::primitive::{Scalar, ScalarKind};
use crate::schema::{FieldDescriptor, FieldMut, FieldRef, WireKind};
use crate::varint;

/// Bytes a whole frame occupies given its payload size
#[inline]
pub fn frame_size(id: u32, payload_len: usize) -> Result<usize> {
    varint::encoded_len(id as u64)
        .checked_add(varint::encoded_len(payload_len as u64))
        .and_then(|n| n.checked_add(payload_len))
        .ok_or(Error::ValueExceedsLimit)
}

/// Payload size of one field, recursing into nested messages
///
/// Array fields whose element count exceeds their declared capacity are
/// rejected here, before anything is written.
pub fn payload_size(desc: &FieldDescriptor, field: &FieldRef<'_>) -> Result<usize> {
    match (desc.kind, field) {
        (WireKind::Scalar(kind), FieldRef::Scalar(value)) if !desc.is_array() => {
            check_kind(kind, value.kind())?;
            Ok(value.encoded_len())
        }
        (WireKind::Scalar(kind), FieldRef::Array(array)) => {
            check_kind(kind, array.kind())?;
            check_capacity(desc, array.len())?;
            if let Some(width) = kind.fixed_width() {
                return array.len().checked_mul(width).ok_or(Error::ValueExceedsLimit);
            }
            let mut total = 0usize;
            for index in 0..array.len() {
                let element = array.get(index).ok_or(Error::InvalidArguments)?;
                total = total
                    .checked_add(element.encoded_len())
                    .ok_or(Error::ValueExceedsLimit)?;
            }
            Ok(total)
        }
        (WireKind::Message(nested), FieldRef::Message(msg)) => {
            if nested != msg.descriptor() {
                return Err(Error::InvalidArguments);
            }
            message::payload_size(*msg)
        }
        _ => Err(Error::InvalidArguments),
    }
}

/// Write one complete frame for a field
///
/// The payload size is computed first; nothing is written if the field is
/// invalid or the frame does not fit.
pub fn encode_field(
    desc: &FieldDescriptor,
    field: &FieldRef<'_>,
    w: &mut WriteCursor<'_>,
) -> Result<()> {
    let payload_len = payload_size(desc, field)?;
    if w.remaining() < frame_size(desc.id, payload_len)? {
        return Err(Error::BufferTooSmall);
    }

    w.put_varint_u32(desc.id)?;
    w.put_varint(payload_len as u64)?;
    w.put_scoped(payload_len, |payload| encode_payload(field, payload))
}

fn encode_payload(field: &FieldRef<'_>, w: &mut WriteCursor<'_>) -> Result<()> {
    match field {
        FieldRef::Scalar(value) => value.encode(w),
        FieldRef::Array(array) => {
            if let Some(bytes) = array.as_bytes() {
                return w.put_bytes(bytes);
            }
            for index in 0..array.len() {
                array.get(index).ok_or(Error::InvalidArguments)?.encode(w)?;
            }
            Ok(())
        }
        FieldRef::Message(msg) => message::encode_payload(*msg, w).map(|_| ()),
    }
}

/// Decode one known field from its frame payload
///
/// `frame` covers exactly the declared payload. Every byte must be consumed;
/// a value that would run past the frame is `Error::InvalidData`.
pub fn decode_field(
    desc: &FieldDescriptor,
    field: FieldMut<'_>,
    frame: &mut ReadCursor<'_>,
) -> Result<()> {
    let result = match (desc.kind, field) {
        (WireKind::Scalar(kind), FieldMut::Scalar(slot)) if !desc.is_array() => {
            Scalar::decode(kind, frame).and_then(|value| slot.set(value))
        }
        (WireKind::Scalar(kind), FieldMut::Array(array)) => {
            check_kind(kind, array.kind())?;
            let capacity = desc.capacity.ok_or(Error::InvalidArguments)?;
            let limit = capacity.min(array.capacity());
            let mut outcome = Ok(());
            while !frame.is_empty() {
                outcome = Scalar::decode(kind, frame).and_then(|value| {
                    if array.len() >= limit {
                        return Err(Error::ArraySizeExceeded);
                    }
                    array.push(value)
                });
                if outcome.is_err() {
                    break;
                }
            }
            outcome
        }
        (WireKind::Message(nested), FieldMut::Message(msg)) => {
            if nested != msg.descriptor() {
                return Err(Error::InvalidArguments);
            }
            message::decode_payload(msg, frame)
        }
        _ => return Err(Error::InvalidArguments),
    };

    match result {
        Err(Error::BufferTooSmall) => Err(Error::InvalidData),
        Err(e) => Err(e),
        Ok(()) if !frame.is_empty() => Err(Error::InvalidData),
        Ok(()) => Ok(()),
    }
}

/// Read the next frame header and split off its payload
///
/// Returns the raw field id and a cursor scoped to exactly the payload.
/// A declared length larger than what remains is `Error::InvalidData`.
pub fn next_frame<'a>(r: &mut ReadCursor<'a>) -> Result<(u64, ReadCursor<'a>)> {
    let mut ahead = *r;
    let id = ahead.get_varint()?;
    let len = ahead.get_varint()?;
    let len = usize::try_from(len).map_err(|_| Error::ValueExceedsLimit)?;
    let frame = ahead.take(len).map_err(|_| Error::InvalidData)?;
    *r = ahead;
    Ok((id, frame))
}

#[inline]
fn check_kind(declared: ScalarKind, stored: ScalarKind) -> Result<()> {
    if declared != stored {
        return Err(Error::InvalidArguments);
    }
    Ok(())
}

#[inline]
fn check_capacity(desc: &FieldDescriptor, len: usize) -> Result<()> {
    match desc.capacity {
        Some(capacity) if len <= capacity => Ok(()),
        Some(_) => Err(Error::ArraySizeExceeded),
        None => Err(Error::InvalidArguments),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{ArraySlot, BoundedArray, FixedString};

    fn scalar_desc(id: u32, kind: ScalarKind) -> FieldDescriptor {
        FieldDescriptor {
            id,
            name: "f",
            kind: WireKind::Scalar(kind),
            capacity: None,
        }
    }

    fn array_desc(id: u32, kind: ScalarKind, capacity: usize) -> FieldDescriptor {
        FieldDescriptor {
            id,
            name: "a",
            kind: WireKind::Scalar(kind),
            capacity: Some(capacity),
        }
    }

    #[test]
    fn test_scalar_frame_layout() {
        let desc = scalar_desc(3, ScalarKind::U32);
        let mut buf = [0u8; 16];
        let mut w = WriteCursor::new(&mut buf);

        encode_field(&desc, &FieldRef::Scalar(Scalar::U32(300)), &mut w).unwrap();
        assert_eq!(w.written(), &[0x03, 0x02, 0xAC, 0x02]);
        assert_eq!(frame_size(3, 2).unwrap(), 4);
    }

    #[test]
    fn test_string_frame_layout() {
        let desc = array_desc(1, ScalarKind::Char, 8);
        let name = FixedString::<8>::try_from_str("abc").unwrap();
        let mut buf = [0u8; 16];
        let mut w = WriteCursor::new(&mut buf);

        encode_field(&desc, &FieldRef::Array(&name), &mut w).unwrap();
        assert_eq!(w.written(), &[0x01, 0x03, b'a', b'b', b'c']);
    }

    #[test]
    fn test_varint_array_size() {
        let desc = array_desc(2, ScalarKind::I64, 4);
        let values = BoundedArray::<i64, 4>::from_slice(&[0, -1, 64, i64::MIN]).unwrap();
        let size = payload_size(&desc, &FieldRef::Array(&values)).unwrap();
        assert_eq!(size, 1 + 1 + 2 + 10);
    }

    #[test]
    fn test_capacity_checked_before_write() {
        // Storage allows 4, the schema only 2
        let desc = array_desc(2, ScalarKind::U16, 2);
        let values = BoundedArray::<u16, 4>::from_slice(&[1, 2, 3]).unwrap();
        let mut buf = [0u8; 16];
        let mut w = WriteCursor::new(&mut buf);

        assert_eq!(
            encode_field(&desc, &FieldRef::Array(&values), &mut w),
            Err(Error::ArraySizeExceeded)
        );
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn test_frame_that_does_not_fit_writes_nothing() {
        let desc = scalar_desc(1, ScalarKind::F64);
        let mut buf = [0u8; 9];
        let mut w = WriteCursor::new(&mut buf);

        assert_eq!(
            encode_field(&desc, &FieldRef::Scalar(Scalar::F64(1.0)), &mut w),
            Err(Error::BufferTooSmall)
        );
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn test_kind_mismatch_is_invalid_arguments() {
        let desc = scalar_desc(1, ScalarKind::U16);
        assert_eq!(
            payload_size(&desc, &FieldRef::Scalar(Scalar::U32(1))),
            Err(Error::InvalidArguments)
        );
    }

    #[test]
    fn test_decode_scalar_must_fill_frame() {
        let desc = scalar_desc(1, ScalarKind::U16);

        // Frame declares 3 bytes but a u16 only uses 2
        let mut value = 0u16;
        let mut frame = ReadCursor::new(&[0x01, 0x02, 0x03]);
        assert_eq!(
            decode_field(&desc, FieldMut::Scalar(&mut value), &mut frame),
            Err(Error::InvalidData)
        );

        // Frame declares 1 byte; reading a u16 would run past it
        let mut frame = ReadCursor::new(&[0x01]);
        assert_eq!(
            decode_field(&desc, FieldMut::Scalar(&mut value), &mut frame),
            Err(Error::InvalidData)
        );

        let mut frame = ReadCursor::new(&[0x34, 0x12]);
        decode_field(&desc, FieldMut::Scalar(&mut value), &mut frame).unwrap();
        assert_eq!(value, 0x1234);
    }

    #[test]
    fn test_decode_array_overflow() {
        let desc = array_desc(1, ScalarKind::Char, 2);
        let mut name = FixedString::<2>::new();
        let mut frame = ReadCursor::new(b"abc");
        assert_eq!(
            decode_field(&desc, FieldMut::Array(&mut name), &mut frame),
            Err(Error::ArraySizeExceeded)
        );
    }

    #[test]
    fn test_decode_array_honours_schema_capacity() {
        let desc = array_desc(1, ScalarKind::U8, 2);
        let mut values = BoundedArray::<u8, 8>::new();
        let mut frame = ReadCursor::new(&[1, 2, 3]);
        assert_eq!(
            decode_field(&desc, FieldMut::Array(&mut values), &mut frame),
            Err(Error::ArraySizeExceeded)
        );
        assert_eq!(ArraySlot::len(&values), 2);
    }

    #[test]
    fn test_array_storage_without_capacity_is_invalid_arguments() {
        let desc = scalar_desc(1, ScalarKind::U8);
        let mut values = BoundedArray::<u8, 4>::from_slice(&[1]).unwrap();

        assert_eq!(
            payload_size(&desc, &FieldRef::Array(&values)),
            Err(Error::InvalidArguments)
        );
        let mut frame = ReadCursor::new(&[7]);
        assert_eq!(
            decode_field(&desc, FieldMut::Array(&mut values), &mut frame),
            Err(Error::InvalidArguments)
        );
    }

    #[test]
    fn test_next_frame() {
        let data = [0x05, 0x02, 0xAA, 0xBB, 0x06];
        let mut r = ReadCursor::new(&data);

        let (id, mut frame) = next_frame(&mut r).unwrap();
        assert_eq!(id, 5);
        assert_eq!(frame.get_bytes(2).unwrap(), &[0xAA, 0xBB]);
        assert_eq!(r.remaining(), 1);

        // Truncated header leaves the cursor where it was
        assert_eq!(next_frame(&mut r).map(|_| ()), Err(Error::BufferTooSmall));
        assert_eq!(r.remaining(), 1);

        // Declared length beyond the buffer
        let mut r = ReadCursor::new(&[0x01, 0x05, 0x00]);
        assert_eq!(next_frame(&mut r).map(|_| ()), Err(Error::InvalidData));
        assert_eq!(r.position(), 0);
    }
}
