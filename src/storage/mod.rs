//! Photo storage backends
//!
//! The gallery keeps its photos in a storage backend (a cloud bucket in a
//! hosted deployment, a folder here). Backends only move encoded bytes;
//! filter settings travel in the local library.

pub mod folder;

pub use folder::FolderStorage;

use crate::errors::Result;
use crate::render::ImageRef;

/// Where captured photos are uploaded
///
/// Retries and timeouts are the backend's business.
pub trait RemoteStorage: Send {
    /// Store `bytes` under `name` and return a reference to the stored photo
    fn upload(&self, bytes: &[u8], name: &str) -> Result<ImageRef>;

    /// List stored photos, newest first
    fn list(&self) -> Result<Vec<ImageRef>>;

    /// Delete a stored photo; `Ok(false)` if there was nothing to delete
    fn delete(&self, reference: &ImageRef) -> Result<bool>;

    /// Whether `reference` points into this backend
    fn owns(&self, reference: &ImageRef) -> bool;
}

/// File name for a photo captured at `timestamp` (Unix milliseconds)
pub fn photo_file_name(timestamp: i64) -> String {
    format!("photo_{}.jpg", timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_file_name() {
        assert_eq!(photo_file_name(1_700_000_000_123), "photo_1700000000123.jpg");
    }
}
