//! Error types for the MicroTLV codec

/// Errors that can occur while sizing, encoding, decoding or dispatching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// Degenerate call parameters (e.g. storage that does not match its descriptor)
    InvalidArguments,
    /// Write would overflow the destination or read would underflow the source
    BufferTooSmall,
    /// Message type id does not match the expected message type
    InvalidId,
    /// Envelope version byte does not match the configured protocol version
    InvalidProtocolVersion,
    /// Varint width overflow or cumulative size overflow
    ValueExceedsLimit,
    /// Structurally malformed frame
    InvalidData,
    /// Static array or string capacity overrun
    ArraySizeExceeded,
    /// Dispatcher has no route for the envelope's type id
    UnknownMessageId,
}

impl Error {
    /// Returns a human-readable description of the error
    pub const fn description(&self) -> &'static str {
        match self {
            Error::InvalidArguments => "invalid call arguments",
            Error::BufferTooSmall => "buffer too small for operation",
            Error::InvalidId => "message type id does not match",
            Error::InvalidProtocolVersion => "unsupported protocol version",
            Error::ValueExceedsLimit => "value exceeds representable limit",
            Error::InvalidData => "malformed frame data",
            Error::ArraySizeExceeded => "array capacity exceeded",
            Error::UnknownMessageId => "unknown message type id",
        }
    }

    /// Stable integer code, compatible with the C runtime's return codes.
    ///
    /// Codec errors occupy `-10..=-16`; dispatcher errors start at `-100`.
    pub const fn code(&self) -> i32 {
        match self {
            Error::InvalidArguments => -10,
            Error::BufferTooSmall => -11,
            Error::InvalidId => -12,
            Error::InvalidProtocolVersion => -13,
            Error::InvalidData => -14,
            Error::ValueExceedsLimit => -15,
            Error::ArraySizeExceeded => -16,
            Error::UnknownMessageId => -102,
        }
    }

    /// Maps a code produced by [`Error::code`] back to the error.
    ///
    /// The dispatcher aliases `-100` (invalid data) and `-101` (bad version)
    /// are accepted as well.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            -10 => Some(Error::InvalidArguments),
            -11 => Some(Error::BufferTooSmall),
            -12 => Some(Error::InvalidId),
            -13 | -101 => Some(Error::InvalidProtocolVersion),
            -14 | -100 => Some(Error::InvalidData),
            -15 => Some(Error::ValueExceedsLimit),
            -16 => Some(Error::ArraySizeExceeded),
            -102 => Some(Error::UnknownMessageId),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias for MicroTLV operations
pub type Result<T> = core::result::Result<T, Error>;
