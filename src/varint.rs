//! Variable-length integer encoding (LEB128) and zigzag mapping
//!
//! Each byte carries 7 payload bits, least-significant group first; the high
//! bit is set on every byte except the last. Signed 32/64-bit values are
//! zigzag-mapped first so small negative numbers stay short on the wire.

use crate::error::{Error, Result};

/// Maximum bytes needed for a u32 varint (5 bytes)
pub const MAX_VARINT_U32_SIZE: usize = 5;

/// Maximum bytes needed for a u64 varint (10 bytes)
pub const MAX_VARINT_U64_SIZE: usize = 10;

/// Number of bytes `value` occupies once varint-encoded
#[inline]
pub const fn encoded_len(value: u64) -> usize {
    let mut value = value >> 7;
    let mut len = 1;
    while value != 0 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Encode a u64 as varint into the given buffer
///
/// Returns the number of bytes written, or `Error::BufferTooSmall` if the
/// whole encoding does not fit. Nothing is written on failure.
#[inline]
pub fn encode_u64(value: u64, buf: &mut [u8]) -> Result<usize> {
    let len = encoded_len(value);
    if buf.len() < len {
        return Err(Error::BufferTooSmall);
    }

    let mut value = value;
    for byte in buf[..len - 1].iter_mut() {
        *byte = (value as u8) | 0x80;
        value >>= 7;
    }
    buf[len - 1] = value as u8;

    Ok(len)
}

/// Decode a u64 varint from the given buffer
///
/// Returns (value, bytes_consumed) or an error:
/// - `BufferTooSmall` if the buffer ends before the terminating byte
/// - `InvalidData` if more than ten groups are present
/// - `ValueExceedsLimit` if the tenth group carries bits above bit 63
#[inline]
pub fn decode_u64(buf: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0u32;
    let mut pos = 0;

    loop {
        if pos >= buf.len() {
            return Err(Error::BufferTooSmall);
        }

        if pos >= MAX_VARINT_U64_SIZE {
            return Err(Error::InvalidData);
        }

        let byte = buf[pos];
        pos += 1;

        let group = (byte & 0x7F) as u64;
        // Only bit 63 is left for the tenth group
        if shift == 63 && group > 1 && byte & 0x80 == 0 {
            return Err(Error::ValueExceedsLimit);
        }
        result |= group << shift;

        if byte & 0x80 == 0 {
            return Ok((result, pos));
        }

        shift += 7;
    }
}

/// Map a signed 32-bit value onto the unsigned domain
#[inline]
pub const fn zigzag_encode_32(value: i32) -> u32 {
    ((value << 1) ^ (value >> 31)) as u32
}

/// Inverse of [`zigzag_encode_32`]
#[inline]
pub const fn zigzag_decode_32(value: u32) -> i32 {
    ((value >> 1) as i32) ^ -((value & 1) as i32)
}

/// Map a signed 64-bit value onto the unsigned domain
#[inline]
pub const fn zigzag_encode_64(value: i64) -> u64 {
    ((value << 1) ^ (value >> 63)) as u64
}

/// Inverse of [`zigzag_encode_64`]
#[inline]
pub const fn zigzag_decode_64(value: u64) -> i64 {
    ((value >> 1) as i64) ^ -((value & 1) as i64)
}
