use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Codec errors
    #[error("Invalid BCD byte 0x{byte:02X} at position {position}")]
    InvalidBcd { byte: u8, position: usize },

    #[error("Value {value} does not fit in {digits} BCD digits")]
    BcdOverflow { value: u64, digits: usize },

    #[error("Value {value} does not fit in {bytes} binary bytes")]
    BinaryOverflow { value: u64, bytes: usize },

    #[error("CRC mismatch: expected 0x{expected:04X}, got 0x{actual:04X}")]
    CrcMismatch { expected: u16, actual: u16 },

    #[error("Invalid date/time: {message}")]
    InvalidDateTime { message: String },

    // Layout errors
    #[error("Payload too short: needed {needed} bytes, {available} available")]
    PayloadTooShort { needed: usize, available: usize },

    #[error("Length mismatch: declared {declared} bytes, found {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Unexpected trailing data: {remaining} bytes")]
    TrailingData { remaining: usize },

    #[error("Invalid {field} code: 0x{value:02X}")]
    InvalidCode { field: &'static str, value: u8 },

    #[error("Field 0x{code:02X} exceeds maximum length {max} (got {actual} bytes)")]
    FieldTooLong { code: u8, max: usize, actual: usize },

    #[error("Invalid field format: {message}")]
    InvalidFieldFormat { message: String },

    #[error("Asset number mismatch: expected {expected}, got {actual}")]
    AssetMismatch { expected: u32, actual: u32 },

    // Registry errors
    #[error("Unknown long poll code: 0x{code:02X}")]
    UnknownLongPoll { code: u8 },

    #[error("Parser already registered for long poll 0x{code:02X}")]
    DuplicateParser { code: u8 },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// Create a new invalid field format error.
    pub fn invalid_field(message: impl Into<String>) -> Self {
        Self::InvalidFieldFormat {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new invalid code error for an enumerated byte.
    pub fn invalid_code(field: &'static str, value: u8) -> Self {
        Self::InvalidCode { field, value }
    }

    /// Returns `true` if the error comes from encoding a value that does not
    /// fit its field, as opposed to a malformed inbound command.
    pub fn is_overflow(&self) -> bool {
        matches!(self, Self::BcdOverflow { .. } | Self::BinaryOverflow { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
