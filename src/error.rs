//! # Error Types
//!
//! Custom error types for CRSF Link using `thiserror`.

use thiserror::Error;

/// Main error type for CRSF Link
#[derive(Debug, Error)]
pub enum CrsfLinkError {
    /// Frame shorter than sync + length + type + crc
    #[error("Frame too short: {0} bytes")]
    FrameTooShort(usize),

    /// Frame longer than the 64-byte protocol maximum
    #[error("Frame too long: {0} bytes")]
    FrameTooLong(usize),

    /// Outbound payload does not fit in a single frame
    #[error("Payload size {size} exceeds maximum {max}")]
    PayloadTooLarge { size: usize, max: usize },

    /// Inbound frame is too short for the fields of its packet type
    #[error("{packet} payload too short: frame has {actual} bytes, need {needed}")]
    PayloadTooShort {
        packet: &'static str,
        actual: usize,
        needed: usize,
    },

    /// CRC check failed
    #[error("CRC mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// Stick value outside the accepted span
    #[error("Channel {channel} value {value} out of range ({min}..={max})")]
    ChannelValueOutOfRange {
        channel: usize,
        value: i32,
        min: i32,
        max: i32,
    },

    /// Channel index outside 0..16
    #[error("Invalid channel index: {0}")]
    InvalidChannel(usize),

    /// External control line could not be understood
    #[error("Malformed control line: {0}")]
    MalformedControlLine(String),

    /// Serial port errors
    #[error("Serial error: {0}")]
    Serial(String),

    /// None of the candidate device paths could be opened
    #[error("No serial device found (tried: {0})")]
    SerialPortNotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// JSON encoding errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CRSF Link
pub type Result<T> = std::result::Result<T, CrsfLinkError>;
