//! Error types for booking-engine operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Local time {time} does not exist in {timezone}")]
    NonexistentLocalTime { time: String, timezone: String },

    #[error("Local time {time} is ambiguous in {timezone}")]
    AmbiguousLocalTime { time: String, timezone: String },

    #[error("Invalid UTC timestamp: {0}")]
    InvalidUtc(String),

    #[error("Missing booking selection: {0}")]
    MissingSelection(&'static str),

    #[error("Failed to encode booking data: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Failures talking to the booking backend.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx response that is not a `{success: true, ...}` envelope.
    #[error("{0}")]
    Envelope(String),

    /// The envelope's `data` does not have the expected shape.
    #[error("Failed to decode response data: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BookingError>;
