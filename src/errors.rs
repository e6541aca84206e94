//! Error types for the photo booth
//!
//! Filter parsing, image decoding during a bake and loading a stored
//! collection all recover locally with a safe default and never surface here.
//! `BoothError` covers the plumbing around them: persistence, storage
//! backends, configuration and explicit decode requests.

use thiserror::Error;

/// Result type alias using BoothError
pub type Result<T> = std::result::Result<T, BoothError>;

/// Main error type
#[derive(Debug, Error)]
pub enum BoothError {
    /// Image could not be decoded or encoded
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Local gallery database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed base64 payload in a data URL
    #[error("invalid data URL payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The image reference cannot be resolved to bytes locally
    #[error("unsupported image reference: {0}")]
    UnsupportedReference(String),

    /// Upload target already holds a file with that name
    #[error("a photo named {0} already exists")]
    AlreadyExists(String),

    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Gallery index out of range
    #[error("photo index {index} out of range (gallery has {len} photos)")]
    IndexOutOfRange { index: usize, len: usize },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_error_message() {
        let err = BoothError::IndexOutOfRange { index: 4, len: 2 };
        assert_eq!(
            err.to_string(),
            "photo index 4 out of range (gallery has 2 photos)"
        );
    }

    #[test]
    fn test_io_conversion() {
        fn open_missing() -> Result<Vec<u8>> {
            Ok(std::fs::read("/nonexistent/photo-booth/file.jpg")?)
        }

        assert!(matches!(open_missing(), Err(BoothError::Io(_))));
    }
}
