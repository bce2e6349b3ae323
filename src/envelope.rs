//! Message envelope: version, type id and payload length

use crate::cursor::{ReadCursor, WriteCursor};
use crate::error::{Error, Result};
use crate::message;
use crate::schema::Message;
use crate::varint;
use crate::PROTOCOL_VERSION;

/// Width of the type id field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeIdWidth {
    /// One byte, type ids up to 255
    U8,
    /// Two bytes, little-endian
    U16,
}

impl TypeIdWidth {
    /// Bytes occupied on the wire
    #[inline]
    pub const fn width(&self) -> usize {
        match self {
            TypeIdWidth::U8 => 1,
            TypeIdWidth::U16 => 2,
        }
    }
}

/// Encoding of the payload length field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthPrefix {
    /// Varint, no practical limit
    Varint,
    /// One byte, payloads up to 255 bytes
    U8,
}

/// Header layout shared by both ends of a link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeConfig {
    /// Expected protocol version byte
    pub version: u8,
    /// Type id width
    pub type_id_width: TypeIdWidth,
    /// Payload length encoding
    pub length_prefix: LengthPrefix,
}

impl EnvelopeConfig {
    /// General profile: 2-byte type id, varint payload length
    pub const STANDARD: Self = Self {
        version: PROTOCOL_VERSION,
        type_id_width: TypeIdWidth::U16,
        length_prefix: LengthPrefix::Varint,
    };

    /// Legacy header shape: 1-byte type id, 1-byte payload length
    pub const COMPACT: Self = Self {
        version: PROTOCOL_VERSION,
        type_id_width: TypeIdWidth::U8,
        length_prefix: LengthPrefix::U8,
    };

    /// Same layout with another version byte
    #[inline]
    pub const fn with_version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    /// Largest header this layout can produce
    #[inline]
    pub const fn max_header_len(&self) -> usize {
        1 + self.type_id_width.width()
            + match self.length_prefix {
                LengthPrefix::Varint => varint::MAX_VARINT_U64_SIZE,
                LengthPrefix::U8 => 1,
            }
    }
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Decoded envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    /// Protocol version byte
    pub version: u8,
    /// Message type id
    pub type_id: u16,
    /// Exact number of payload bytes that follow the header
    pub payload_len: usize,
}

impl EnvelopeHeader {
    /// Header for a payload under the given layout
    #[inline]
    pub fn new(config: &EnvelopeConfig, type_id: u16, payload_len: usize) -> Self {
        Self {
            version: config.version,
            type_id,
            payload_len,
        }
    }

    /// Check that the header is representable under `config`
    pub fn validate(&self, config: &EnvelopeConfig) -> Result<()> {
        if self.version != config.version {
            return Err(Error::InvalidProtocolVersion);
        }
        if config.type_id_width == TypeIdWidth::U8 && self.type_id > u8::MAX as u16 {
            return Err(Error::ValueExceedsLimit);
        }
        if config.length_prefix == LengthPrefix::U8 && self.payload_len > u8::MAX as usize {
            return Err(Error::ValueExceedsLimit);
        }
        Ok(())
    }

    /// Header size in bytes
    #[inline]
    pub fn encoded_len(&self, config: &EnvelopeConfig) -> usize {
        let len_field = match config.length_prefix {
            LengthPrefix::Varint => varint::encoded_len(self.payload_len as u64),
            LengthPrefix::U8 => 1,
        };
        1 + config.type_id_width.width() + len_field
    }

    /// Header plus payload size, overflow-checked
    #[inline]
    pub fn total_len(&self, config: &EnvelopeConfig) -> Result<usize> {
        self.encoded_len(config)
            .checked_add(self.payload_len)
            .ok_or(Error::ValueExceedsLimit)
    }

    /// Write the header; nothing is written on failure
    pub fn encode(&self, config: &EnvelopeConfig, w: &mut WriteCursor<'_>) -> Result<()> {
        self.validate(config)?;
        if w.remaining() < self.encoded_len(config) {
            return Err(Error::BufferTooSmall);
        }

        w.put_u8(self.version)?;
        match config.type_id_width {
            TypeIdWidth::U8 => w.put_u8(self.type_id as u8)?,
            TypeIdWidth::U16 => w.put_u16(self.type_id)?,
        }
        match config.length_prefix {
            LengthPrefix::Varint => w.put_varint(self.payload_len as u64),
            LengthPrefix::U8 => w.put_u8(self.payload_len as u8),
        }
    }

    /// Read and validate a header, advancing only on success
    ///
    /// A version mismatch is reported as soon as the first byte is seen;
    /// a truncated header is `Error::BufferTooSmall`.
    pub fn decode(config: &EnvelopeConfig, r: &mut ReadCursor<'_>) -> Result<Self> {
        let mut ahead = *r;
        let header = Self::read(config, &mut ahead)?;
        *r = ahead;
        Ok(header)
    }

    /// Read and validate a header without advancing
    #[inline]
    pub fn peek(config: &EnvelopeConfig, r: &ReadCursor<'_>) -> Result<Self> {
        let mut ahead = *r;
        Self::read(config, &mut ahead)
    }

    fn read(config: &EnvelopeConfig, r: &mut ReadCursor<'_>) -> Result<Self> {
        let version = r.get_u8()?;
        if version != config.version {
            return Err(Error::InvalidProtocolVersion);
        }

        let type_id = match config.type_id_width {
            TypeIdWidth::U8 => r.get_u8()? as u16,
            TypeIdWidth::U16 => r.get_u16()?,
        };
        let payload_len = match config.length_prefix {
            LengthPrefix::Varint => {
                usize::try_from(r.get_varint()?).map_err(|_| Error::ValueExceedsLimit)?
            }
            LengthPrefix::U8 => r.get_u8()? as usize,
        };

        Ok(Self {
            version,
            type_id,
            payload_len,
        })
    }
}

/// A complete envelope borrowed from a receive buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// Validated header
    pub header: EnvelopeHeader,
    /// Exactly `header.payload_len` bytes
    pub payload: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Read one whole envelope, advancing past header and payload
    ///
    /// The cursor is left untouched on failure. A payload that is not
    /// fully present is `Error::InvalidData`.
    pub fn decode(config: &EnvelopeConfig, r: &mut ReadCursor<'a>) -> Result<Self> {
        let mut ahead = *r;
        let header = EnvelopeHeader::read(config, &mut ahead)?;
        let payload = ahead
            .get_bytes(header.payload_len)
            .map_err(|_| Error::InvalidData)?;
        *r = ahead;
        Ok(Self { header, payload })
    }

    /// Header plus payload size
    #[inline]
    pub fn encoded_len(&self, config: &EnvelopeConfig) -> Result<usize> {
        self.header.total_len(config)
    }

    /// Write header and a pre-encoded payload
    pub fn encode(&self, config: &EnvelopeConfig, w: &mut WriteCursor<'_>) -> Result<()> {
        if self.payload.len() != self.header.payload_len {
            return Err(Error::InvalidArguments);
        }
        self.header.validate(config)?;
        if w.remaining() < self.encoded_len(config)? {
            return Err(Error::BufferTooSmall);
        }
        self.header.encode(config, w)?;
        w.put_bytes(self.payload)
    }

    /// Encode `msg` with its header in one pass, returning bytes written
    ///
    /// The whole message is sized and validated first; nothing is written
    /// on failure.
    pub fn encode_with(
        config: &EnvelopeConfig,
        msg: &dyn Message,
        w: &mut WriteCursor<'_>,
    ) -> Result<usize> {
        let payload_len = message::payload_size(msg)?;
        let header = EnvelopeHeader::new(config, msg.descriptor().type_id, payload_len);
        header.validate(config)?;
        let total = header.total_len(config)?;
        if w.remaining() < total {
            return Err(Error::BufferTooSmall);
        }

        header.encode(config, w)?;
        message::encode_payload(msg, w)?;
        Ok(total)
    }
}
