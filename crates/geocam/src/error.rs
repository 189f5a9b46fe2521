//! Error types for the geocam crate.

use geocam_geodesy::GeodesyError;
use thiserror::Error;

/// Errors that can occur when building, querying or decoding a geo camera.
#[derive(Debug, Error)]
pub enum GeoCameraError {
    /// The source metadata cannot describe a usable transform.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Malformed input text (filename token, world file content).
    #[error("Format error: {0}")]
    Format(String),

    /// Binary camera record with a version this build cannot read.
    #[error("Unsupported camera record version {0}")]
    UnsupportedVersion(u16),

    /// Binary camera record that ends early or carries invalid fields.
    #[error("Camera record decode error at offset {offset}: {message}")]
    Decode {
        /// Byte offset where the error occurred.
        offset: usize,
        /// Description of the error.
        message: String,
    },

    /// The operation needs a coordinate context and none is attached.
    #[error("No coordinate context attached to the camera")]
    NoContext,

    /// The operation needs a UTM-addressed camera.
    #[error("Camera is not UTM-addressed")]
    NotUtm,

    /// I/O error reading or writing a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error.
    #[error("TIFF decode error: {0}")]
    TiffDecode(#[from] tiff::TiffError),

    /// Camera configuration could not be parsed.
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Geodetic conversion or context record error.
    #[error(transparent)]
    Geodesy(#[from] GeodesyError),
}

impl GeoCameraError {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        GeoCameraError::Configuration(message.into())
    }

    /// Create a format error.
    pub fn format(message: impl Into<String>) -> Self {
        GeoCameraError::Format(message.into())
    }

    /// Create a decode error at a specific offset.
    pub fn decode_at(offset: usize, message: impl Into<String>) -> Self {
        GeoCameraError::Decode {
            offset,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeoCameraError::decode_at(10, "unexpected end of record");
        assert!(err.to_string().contains("offset 10"));

        let err = GeoCameraError::format("missing hemisphere marker");
        assert!(err.to_string().contains("missing hemisphere marker"));

        let err: GeoCameraError = GeodesyError::InvalidZone(99).into();
        assert!(err.to_string().contains("99"));
    }
}
