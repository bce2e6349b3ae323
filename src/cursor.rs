//! Bounds-checked cursors over caller-owned buffers
//!
//! Every operation either moves exactly the bytes it asked for and advances
//! the position, or fails and leaves the cursor untouched. There are no
//! short reads or writes.

use crate::error::{Error, Result};
use crate::varint;

/// Write position over a caller-owned output buffer
#[derive(Debug)]
pub struct WriteCursor<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> WriteCursor<'a> {
    /// Create new cursor at the start of the given buffer
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Get current position in buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining buffer capacity
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Bytes written so far
    #[inline]
    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    #[inline]
    fn ensure(&self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::BufferTooSmall);
        }
        Ok(())
    }

    /// Write raw bytes without length prefix
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure(bytes.len())?;
        self.buf[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Write a u8 value
    #[inline]
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.put_bytes(&[value])
    }

    /// Write an i8 value
    #[inline]
    pub fn put_i8(&mut self, value: i8) -> Result<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Write a u16 value (little-endian)
    #[inline]
    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Write an i16 value (little-endian)
    #[inline]
    pub fn put_i16(&mut self, value: i16) -> Result<()> {
        self.put_bytes(&value.to_le_bytes())
    }

    /// Write a varint-encoded u64
    #[inline]
    pub fn put_varint(&mut self, value: u64) -> Result<()> {
        let varint_len = varint::encode_u64(value, &mut self.buf[self.pos..])?;
        self.pos += varint_len;
        Ok(())
    }

    /// Write a varint-encoded u32
    #[inline]
    pub fn put_varint_u32(&mut self, value: u32) -> Result<()> {
        self.put_varint(value as u64)
    }

    /// Write a zigzag varint-encoded i32
    #[inline]
    pub fn put_zigzag_i32(&mut self, value: i32) -> Result<()> {
        self.put_varint(varint::zigzag_encode_32(value) as u64)
    }

    /// Write a zigzag varint-encoded i64
    #[inline]
    pub fn put_zigzag_i64(&mut self, value: i64) -> Result<()> {
        self.put_varint(varint::zigzag_encode_64(value))
    }

    /// Write an f32 as its IEEE-754 bits (little-endian)
    #[inline]
    pub fn put_f32(&mut self, value: f32) -> Result<()> {
        self.put_bytes(&value.to_bits().to_le_bytes())
    }

    /// Write an f64 as its IEEE-754 bits (little-endian)
    #[inline]
    pub fn put_f64(&mut self, value: f64) -> Result<()> {
        self.put_bytes(&value.to_bits().to_le_bytes())
    }

    /// Write a boolean as a single 0/1 byte
    #[inline]
    pub fn put_bool(&mut self, value: bool) -> Result<()> {
        self.put_u8(value as u8)
    }

    /// Write exactly `len` bytes through a scoped sub-cursor
    ///
    /// `f` sees a cursor over the next `len` bytes only. The position is
    /// advanced only if `f` succeeds and fills the region completely; a
    /// short fill is `Error::InvalidData`.
    pub fn put_scoped<F>(&mut self, len: usize, f: F) -> Result<()>
    where
        F: FnOnce(&mut WriteCursor<'_>) -> Result<()>,
    {
        self.ensure(len)?;
        let mut sub = WriteCursor::new(&mut self.buf[self.pos..self.pos + len]);
        f(&mut sub)?;
        if sub.remaining() != 0 {
            return Err(Error::InvalidData);
        }
        self.pos += len;
        Ok(())
    }
}

/// Read position over a borrowed input buffer
///
/// Reads of byte sequences are zero-copy and borrow from the original
/// buffer, not from the cursor.
#[derive(Debug, Clone, Copy)]
pub struct ReadCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    /// Create new cursor at the start of the given buffer
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Get current read position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get remaining bytes in cursor
    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Check if cursor is at end
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Unread bytes, without advancing
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Skip bytes in the cursor
    #[inline]
    pub fn skip(&mut self, n: usize) -> Result<()> {
        if self.remaining() < n {
            return Err(Error::BufferTooSmall);
        }
        self.pos += n;
        Ok(())
    }

    /// Advance to the next occurrence of `byte`, or to the end
    ///
    /// Returns the number of bytes passed over.
    #[inline]
    pub fn skip_until(&mut self, byte: u8) -> usize {
        let skipped = self
            .rest()
            .iter()
            .position(|&b| b == byte)
            .unwrap_or(self.remaining());
        self.pos += skipped;
        skipped
    }

    /// Peek at bytes without advancing cursor
    #[inline]
    pub fn peek_bytes(&self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::BufferTooSmall);
        }
        Ok(&self.buf[self.pos..self.pos + len])
    }

    /// Peek at the next byte without advancing cursor
    #[inline]
    pub fn peek_u8(&self) -> Result<u8> {
        Ok(self.peek_bytes(1)?[0])
    }

    /// Read raw bytes without length prefix
    #[inline]
    pub fn get_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(len)?;
        self.pos += len;
        Ok(bytes)
    }

    /// Fill `dst` completely from the cursor
    #[inline]
    pub fn copy_to(&mut self, dst: &mut [u8]) -> Result<()> {
        let bytes = self.get_bytes(dst.len())?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Split off the next `len` bytes as an independent cursor
    ///
    /// The parent advances past them; the sub-cursor can never read beyond
    /// its own region.
    #[inline]
    pub fn take(&mut self, len: usize) -> Result<ReadCursor<'a>> {
        Ok(ReadCursor::new(self.get_bytes(len)?))
    }

    #[inline]
    fn get_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        self.copy_to(&mut out)?;
        Ok(out)
    }

    /// Read a u8 value
    #[inline]
    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.get_array::<1>()?[0])
    }

    /// Read an i8 value
    #[inline]
    pub fn get_i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.get_array()?))
    }

    /// Read a u16 value (little-endian)
    #[inline]
    pub fn get_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.get_array()?))
    }

    /// Read an i16 value (little-endian)
    #[inline]
    pub fn get_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.get_array()?))
    }

    /// Read a varint-encoded u64
    #[inline]
    pub fn get_varint(&mut self) -> Result<u64> {
        let (value, varint_size) = varint::decode_u64(self.rest())?;
        self.pos += varint_size;
        Ok(value)
    }

    /// Read a varint-encoded u32
    ///
    /// Values that do not fit 32 bits are `Error::ValueExceedsLimit`.
    #[inline]
    pub fn get_varint_u32(&mut self) -> Result<u32> {
        let (value, varint_size) = varint::decode_u64(self.rest())?;
        let value = u32::try_from(value).map_err(|_| Error::ValueExceedsLimit)?;
        self.pos += varint_size;
        Ok(value)
    }

    /// Read a zigzag varint-encoded i32
    #[inline]
    pub fn get_zigzag_i32(&mut self) -> Result<i32> {
        Ok(varint::zigzag_decode_32(self.get_varint_u32()?))
    }

    /// Read a zigzag varint-encoded i64
    #[inline]
    pub fn get_zigzag_i64(&mut self) -> Result<i64> {
        Ok(varint::zigzag_decode_64(self.get_varint()?))
    }

    /// Read an f32 from its IEEE-754 bits (little-endian)
    #[inline]
    pub fn get_f32(&mut self) -> Result<f32> {
        Ok(f32::from_bits(u32::from_le_bytes(self.get_array()?)))
    }

    /// Read an f64 from its IEEE-754 bits (little-endian)
    #[inline]
    pub fn get_f64(&mut self) -> Result<f64> {
        Ok(f64::from_bits(u64::from_le_bytes(self.get_array()?)))
    }

    /// Read a boolean; any nonzero byte is `true`
    #[inline]
    pub fn get_bool(&mut self) -> Result<bool> {
        Ok(self.get_u8()? != 0)
    }
}
