//! Primitive value codec
//!
//! Fixed-width 8/16-bit integers, varint 32/64-bit integers (zigzag for the
//! signed ones), raw IEEE floats, booleans and single chars. A [`Scalar`]
//! is one such value tagged with its [`ScalarKind`].

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::varint;

/// Wire representation of a primitive field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    /// 1 byte, raw
    U8,
    /// 1 byte, raw two's complement
    I8,
    /// 2 bytes, little-endian
    U16,
    /// 2 bytes, little-endian two's complement
    I16,
    /// varint
    U32,
    /// zigzag varint
    I32,
    /// varint
    U64,
    /// zigzag varint
    I64,
    /// 4 bytes, IEEE-754 little-endian
    F32,
    /// 8 bytes, IEEE-754 little-endian
    F64,
    /// 1 byte, zero is false
    Bool,
    /// 1 byte text unit
    Char,
}

impl ScalarKind {
    /// Encoded width for fixed-width kinds, `None` for varint kinds
    #[inline]
    pub const fn fixed_width(&self) -> Option<usize> {
        match self {
            ScalarKind::U8 | ScalarKind::I8 | ScalarKind::Bool | ScalarKind::Char => Some(1),
            ScalarKind::U16 | ScalarKind::I16 => Some(2),
            ScalarKind::F32 => Some(4),
            ScalarKind::F64 => Some(8),
            ScalarKind::U32 | ScalarKind::I32 | ScalarKind::U64 | ScalarKind::I64 => None,
        }
    }

    /// Whether the kind is one byte wide and can be block-copied
    #[inline]
    pub const fn is_byte(&self) -> bool {
        matches!(self.fixed_width(), Some(1))
    }
}

/// A primitive value tagged with its wire kind
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Unsigned 8-bit
    U8(u8),
    /// Signed 8-bit
    I8(i8),
    /// Unsigned 16-bit
    U16(u16),
    /// Signed 16-bit
    I16(i16),
    /// Unsigned 32-bit
    U32(u32),
    /// Signed 32-bit
    I32(i32),
    /// Unsigned 64-bit
    U64(u64),
    /// Signed 64-bit
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// Boolean
    Bool(bool),
    /// Single byte character
    Char(u8),
}

impl Scalar {
    /// Wire kind of this value
    pub const fn kind(&self) -> ScalarKind {
        match self {
            Scalar::U8(_) => ScalarKind::U8,
            Scalar::I8(_) => ScalarKind::I8,
            Scalar::U16(_) => ScalarKind::U16,
            Scalar::I16(_) => ScalarKind::I16,
            Scalar::U32(_) => ScalarKind::U32,
            Scalar::I32(_) => ScalarKind::I32,
            Scalar::U64(_) => ScalarKind::U64,
            Scalar::I64(_) => ScalarKind::I64,
            Scalar::F32(_) => ScalarKind::F32,
            Scalar::F64(_) => ScalarKind::F64,
            Scalar::Bool(_) => ScalarKind::Bool,
            Scalar::Char(_) => ScalarKind::Char,
        }
    }

    /// Number of bytes this value occupies on the wire
    pub const fn encoded_len(&self) -> usize {
        match *self {
            Scalar::U32(v) => varint::encoded_len(v as u64),
            Scalar::I32(v) => varint::encoded_len(varint::zigzag_encode_32(v) as u64),
            Scalar::U64(v) => varint::encoded_len(v),
            Scalar::I64(v) => varint::encoded_len(varint::zigzag_encode_64(v)),
            _ => match self.kind().fixed_width() {
                Some(width) => width,
                None => 0,
            },
        }
    }

    /// Write this value at the cursor
    pub fn encode(&self, w: &mut WriteCursor<'_>) -> Result<()> {
        match *self {
            Scalar::U8(v) | Scalar::Char(v) => w.put_u8(v),
            Scalar::I8(v) => w.put_i8(v),
            Scalar::U16(v) => w.put_u16(v),
            Scalar::I16(v) => w.put_i16(v),
            Scalar::U32(v) => w.put_varint_u32(v),
            Scalar::I32(v) => w.put_zigzag_i32(v),
            Scalar::U64(v) => w.put_varint(v),
            Scalar::I64(v) => w.put_zigzag_i64(v),
            Scalar::F32(v) => w.put_f32(v),
            Scalar::F64(v) => w.put_f64(v),
            Scalar::Bool(v) => w.put_bool(v),
        }
    }

    /// Read one value of the given kind from the cursor
    pub fn decode(kind: ScalarKind, r: &mut ReadCursor<'_>) -> Result<Self> {
        Ok(match kind {
            ScalarKind::U8 => Scalar::U8(r.get_u8()?),
            ScalarKind::I8 => Scalar::I8(r.get_i8()?),
            ScalarKind::U16 => Scalar::U16(r.get_u16()?),
            ScalarKind::I16 => Scalar::I16(r.get_i16()?),
            ScalarKind::U32 => Scalar::U32(r.get_varint_u32()?),
            ScalarKind::I32 => Scalar::I32(r.get_zigzag_i32()?),
            ScalarKind::U64 => Scalar::U64(r.get_varint()?),
            ScalarKind::I64 => Scalar::I64(r.get_zigzag_i64()?),
            ScalarKind::F32 => Scalar::F32(r.get_f32()?),
            ScalarKind::F64 => Scalar::F64(r.get_f64()?),
            ScalarKind::Bool => Scalar::Bool(r.get_bool()?),
            ScalarKind::Char => Scalar::Char(r.get_u8()?),
        })
    }
}

/// Rust types that map one-to-one onto a [`ScalarKind`]
pub trait Primitive: Copy + PartialEq + core::fmt::Debug + 'static {
    /// Wire kind used for this type
    const KIND: ScalarKind;
    /// Value used to fill unused storage
    const ZERO: Self;

    /// Tag the value
    fn to_scalar(self) -> Scalar;

    /// Untag a value of the matching kind
    fn from_scalar(value: Scalar) -> Option<Self>;
}

macro_rules! impl_primitive {
    ($($ty:ty => $variant:ident, $zero:expr;)*) => {
        $(
            impl Primitive for $ty {
                const KIND: ScalarKind = ScalarKind::$variant;
                const ZERO: Self = $zero;

                #[inline]
                fn to_scalar(self) -> Scalar {
                    Scalar::$variant(self)
                }

                #[inline]
                fn from_scalar(value: Scalar) -> Option<Self> {
                    match value {
                        Scalar::$variant(v) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_primitive! {
    u8 => U8, 0;
    i8 => I8, 0;
    u16 => U16, 0;
    i16 => I16, 0;
    u32 => U32, 0;
    i32 => I32, 0;
    u64 => U64, 0;
    i64 => I64, 0;
    f32 => F32, 0.0;
    f64 => F64, 0.0;
    bool => Bool, false;
}

/// Storage for a single primitive value that a decoder can assign
pub trait ScalarSlot {
    /// Current value
    fn get(&self) -> Scalar;

    /// Assign a decoded value; a kind mismatch is `Error::InvalidArguments`
    fn set(&mut self, value: Scalar) -> Result<()>;
}

impl<T: Primitive> ScalarSlot for T {
    #[inline]
    fn get(&self) -> Scalar {
        self.to_scalar()
    }

    #[inline]
    fn set(&mut self, value: Scalar) -> Result<()> {
        *self = T::from_scalar(value).ok_or(Error::InvalidArguments)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(value: Scalar) -> (Scalar, usize) {
        let mut buf = [0u8; 16];
        let mut w = WriteCursor::new(&mut buf);
        value.encode(&mut w).unwrap();
        let written = w.position();
        assert_eq!(written, value.encoded_len());

        let mut r = ReadCursor::new(&buf[..written]);
        let decoded = Scalar::decode(value.kind(), &mut r).unwrap();
        assert!(r.is_empty());
        (decoded, written)
    }

    #[test]
    fn test_scalar_widths() {
        let cases = [
            (Scalar::U8(200), 1),
            (Scalar::I8(-5), 1),
            (Scalar::U16(0xFFFF), 2),
            (Scalar::I16(i16::MIN), 2),
            (Scalar::U32(0), 1),
            (Scalar::U32(u32::MAX), 5),
            (Scalar::I32(-1), 1),
            (Scalar::I32(i32::MIN), 5),
            (Scalar::U64(u64::MAX), 10),
            (Scalar::I64(-64), 1),
            (Scalar::I64(64), 2),
            (Scalar::F32(1.25), 4),
            (Scalar::F64(-0.5), 8),
            (Scalar::Bool(true), 1),
            (Scalar::Char(b'x'), 1),
        ];

        for (value, width) in cases {
            let (decoded, written) = roundtrip(value);
            assert_eq!(decoded, value);
            assert_eq!(written, width);
        }
    }

    #[test]
    fn test_bool_nonzero_is_true() {
        let mut r = ReadCursor::new(&[0x02]);
        assert_eq!(Scalar::decode(ScalarKind::Bool, &mut r).unwrap(), Scalar::Bool(true));
    }

    #[test]
    fn test_slot_kind_mismatch() {
        let mut slot = 0u16;
        slot.set(Scalar::U16(9)).unwrap();
        assert_eq!(slot, 9);
        assert_eq!(slot.set(Scalar::U32(9)), Err(Error::InvalidArguments));
        assert_eq!(slot.get(), Scalar::U16(9));
    }

    #[test]
    fn test_primitive_kinds() {
        assert_eq!(<u32 as Primitive>::KIND, ScalarKind::U32);
        assert_eq!(<f64 as Primitive>::KIND, ScalarKind::F64);
        assert_eq!(i64::from_scalar(Scalar::I64(-3)), Some(-3));
        assert_eq!(i64::from_scalar(Scalar::U64(3)), None);
        assert!(ScalarKind::Char.is_byte());
        assert!(!ScalarKind::U32.is_byte());
    }
}
