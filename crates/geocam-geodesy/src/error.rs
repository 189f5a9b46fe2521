//! Error types for the geodesy crate.

use thiserror::Error;

/// Errors that can occur during geodetic conversions.
#[derive(Debug, Error)]
pub enum GeodesyError {
    /// UTM zone outside 1..=60.
    #[error("Invalid UTM zone {0} (must be 1-60)")]
    InvalidZone(u8),

    /// A context record could not be decoded.
    #[error("Context decode error at offset {offset}: {message}")]
    Decode {
        /// Byte offset where the error occurred.
        offset: usize,
        /// Description of the error.
        message: String,
    },

    /// The context record carries a version this build cannot read.
    #[error("Unsupported context record version {0}")]
    UnsupportedVersion(u16),

    /// Text that does not follow the context dump format.
    #[error("Cannot parse {0}")]
    Parse(String),
}

impl GeodesyError {
    /// Create a text parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        GeodesyError::Parse(message.into())
    }

    /// Create a decode error at a specific offset.
    pub fn decode_at(offset: usize, message: impl Into<String>) -> Self {
        GeodesyError::Decode {
            offset,
            message: message.into(),
        }
    }
}
