//! Fixed-capacity storage for repeated fields
//!
//! Array and string fields live inline in the message record: a static
//! buffer plus a count of valid elements that never exceeds the capacity.

use core::fmt;

use crate::error::{Error, Result};
use crate::primitive::{Primitive, Scalar, ScalarKind};

/// Storage for a repeated primitive field that the codec can walk and fill
pub trait ArraySlot {
    /// Wire kind of every element
    fn kind(&self) -> ScalarKind;

    /// Static capacity
    fn capacity(&self) -> usize;

    /// Number of elements to transmit
    fn len(&self) -> usize;

    /// Whether there is nothing to transmit
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`, if `index < len()`
    fn get(&self, index: usize) -> Option<Scalar>;

    /// Transmitted elements as raw bytes, for one-byte kinds
    fn as_bytes(&self) -> Option<&[u8]> {
        None
    }

    /// Append a decoded element
    ///
    /// Fails with `Error::ArraySizeExceeded` when full and with
    /// `Error::InvalidArguments` on a kind mismatch.
    fn push(&mut self, value: Scalar) -> Result<()>;

    /// Drop all elements
    fn clear(&mut self);
}

/// Inline array of up to `N` primitive values
#[derive(Clone, Copy)]
pub struct BoundedArray<T: Primitive, const N: usize> {
    items: [T; N],
    len: usize,
}

impl<T: Primitive, const N: usize> BoundedArray<T, N> {
    /// Static capacity
    pub const CAPACITY: usize = N;

    /// Create an empty array
    #[inline]
    pub const fn new() -> Self {
        Self {
            items: [T::ZERO; N],
            len: 0,
        }
    }

    /// Copy `values` into a new array
    pub fn from_slice(values: &[T]) -> Result<Self> {
        if values.len() > N {
            return Err(Error::ArraySizeExceeded);
        }
        let mut array = Self::new();
        array.items[..values.len()].copy_from_slice(values);
        array.len = values.len();
        Ok(array)
    }

    /// Valid elements
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.items[..self.len]
    }

    /// Number of valid elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether there are no valid elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a value
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<()> {
        if self.len >= N {
            return Err(Error::ArraySizeExceeded);
        }
        self.items[self.len] = value;
        self.len += 1;
        Ok(())
    }

    /// Drop all elements
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<T: Primitive, const N: usize> Default for BoundedArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Primitive, const N: usize> PartialEq for BoundedArray<T, N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Primitive, const N: usize> fmt::Debug for BoundedArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T: Primitive, const N: usize> ArraySlot for BoundedArray<T, N> {
    fn kind(&self) -> ScalarKind {
        T::KIND
    }

    fn capacity(&self) -> usize {
        N
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> Option<Scalar> {
        self.as_slice().get(index).map(|v| v.to_scalar())
    }

    fn push(&mut self, value: Scalar) -> Result<()> {
        let value = T::from_scalar(value).ok_or(Error::InvalidArguments)?;
        self.try_push(value)
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}

/// Inline character string of up to `N` bytes
///
/// Follows the C convention of the embedded peers: a NUL byte inside the
/// valid range ends the transmitted text. No terminator is stored or sent.
#[derive(Clone, Copy)]
pub struct FixedString<const N: usize> {
    bytes: [u8; N],
    len: usize,
}

impl<const N: usize> FixedString<N> {
    /// Static capacity
    pub const CAPACITY: usize = N;

    /// Create an empty string
    #[inline]
    pub const fn new() -> Self {
        Self {
            bytes: [0; N],
            len: 0,
        }
    }

    /// Copy `text` into a new string
    pub fn try_from_str(text: &str) -> Result<Self> {
        Self::try_from_bytes(text.as_bytes())
    }

    /// Copy raw bytes into a new string
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > N {
            return Err(Error::ArraySizeExceeded);
        }
        let mut s = Self::new();
        s.bytes[..bytes.len()].copy_from_slice(bytes);
        s.len = bytes.len();
        Ok(s)
    }

    /// Bytes up to the first NUL or the valid count, whichever comes first
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        let valid = &self.bytes[..self.len];
        let end = valid.iter().position(|&b| b == 0).unwrap_or(self.len);
        &valid[..end]
    }

    /// Text view, if the bytes are valid UTF-8
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }

    /// Transmitted length
    #[inline]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Whether nothing would be transmitted
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one byte
    #[inline]
    pub fn try_push(&mut self, byte: u8) -> Result<()> {
        if self.len >= N {
            return Err(Error::ArraySizeExceeded);
        }
        self.bytes[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    /// Drop all bytes
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> PartialEq for FixedString<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> fmt::Debug for FixedString<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => fmt::Debug::fmt(text, f),
            None => fmt::Debug::fmt(self.as_bytes(), f),
        }
    }
}

impl<const N: usize> ArraySlot for FixedString<N> {
    fn kind(&self) -> ScalarKind {
        ScalarKind::Char
    }

    fn capacity(&self) -> usize {
        N
    }

    fn len(&self) -> usize {
        FixedString::len(self)
    }

    fn get(&self, index: usize) -> Option<Scalar> {
        self.as_bytes().get(index).map(|&b| Scalar::Char(b))
    }

    fn as_bytes(&self) -> Option<&[u8]> {
        Some(FixedString::as_bytes(self))
    }

    fn push(&mut self, value: Scalar) -> Result<()> {
        match value {
            Scalar::Char(b) => self.try_push(b),
            _ => Err(Error::InvalidArguments),
        }
    }

    fn clear(&mut self) {
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_array_capacity() {
        let mut array = BoundedArray::<u16, 2>::new();
        assert!(array.is_empty());

        array.try_push(1).unwrap();
        array.try_push(2).unwrap();
        assert_eq!(array.try_push(3), Err(Error::ArraySizeExceeded));
        assert_eq!(array.as_slice(), &[1, 2]);

        assert_eq!(
            BoundedArray::<u16, 2>::from_slice(&[1, 2, 3]),
            Err(Error::ArraySizeExceeded)
        );
    }

    #[test]
    fn test_bounded_array_slot() {
        let mut array = BoundedArray::<i32, 4>::new();
        let slot: &mut dyn ArraySlot = &mut array;

        slot.push(Scalar::I32(-7)).unwrap();
        assert_eq!(slot.push(Scalar::U32(7)), Err(Error::InvalidArguments));
        assert_eq!(slot.len(), 1);
        assert_eq!(slot.get(0), Some(Scalar::I32(-7)));
        assert_eq!(slot.get(1), None);
        assert_eq!(slot.capacity(), 4);
        assert_eq!(slot.kind(), ScalarKind::I32);
        assert!(slot.as_bytes().is_none());

        slot.clear();
        assert!(slot.is_empty());
    }

    #[test]
    fn test_equality_ignores_unused_storage() {
        let mut a = BoundedArray::<u8, 4>::from_slice(&[1, 2, 3]).unwrap();
        let b = BoundedArray::<u8, 4>::from_slice(&[1, 2]).unwrap();
        a.clear();
        a.try_push(1).unwrap();
        a.try_push(2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fixed_string_stops_at_nul() {
        let s = FixedString::<8>::try_from_bytes(b"ab\0cd").unwrap();
        assert_eq!(s.as_bytes(), b"ab");
        assert_eq!(s.len(), 2);
        assert_eq!(s.as_str(), Some("ab"));
        assert_eq!(s, FixedString::<8>::try_from_str("ab").unwrap());
    }

    #[test]
    fn test_fixed_string_capacity() {
        let full = FixedString::<4>::try_from_str("abcd").unwrap();
        assert_eq!(full.len(), 4);
        assert_eq!(
            FixedString::<4>::try_from_str("abcde"),
            Err(Error::ArraySizeExceeded)
        );

        let mut s = full;
        assert_eq!(s.try_push(b'e'), Err(Error::ArraySizeExceeded));
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn test_fixed_string_slot() {
        let mut s = FixedString::<4>::new();
        let slot: &mut dyn ArraySlot = &mut s;
        slot.push(Scalar::Char(b'h')).unwrap();
        slot.push(Scalar::Char(b'i')).unwrap();
        assert_eq!(slot.push(Scalar::U8(b'!')), Err(Error::InvalidArguments));
        assert_eq!(slot.as_bytes(), Some(&b"hi"[..]));
        assert_eq!(slot.get(1), Some(Scalar::Char(b'i')));
        assert_eq!(s.as_str(), Some("hi"));
    }
}
