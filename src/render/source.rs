//! Image references
//!
//! A captured photo is addressed by an opaque string: a `data:` URL produced
//! by a bake, a local file path, or a URL handed out by a storage backend.
//! Only the first two can be read back into bytes here.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::errors::{BoothError, Result};

const DATA_URL_PREFIX: &str = "data:";
const JPEG_DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";
const FILE_URL_PREFIX: &str = "file://";

/// Opaque reference to an encoded image
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Wrap JPEG bytes in a `data:image/jpeg;base64,` URL
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self(format!("{}{}", JPEG_DATA_URL_PREFIX, STANDARD.encode(bytes)))
    }

    /// Reference to a local file
    pub fn from_path(path: &Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_data_url(&self) -> bool {
        self.0.starts_with(DATA_URL_PREFIX)
    }

    /// Local filesystem path, if this reference names one
    ///
    /// Anything with a URL scheme other than `file://` is not a path.
    pub fn local_path(&self) -> Option<&Path> {
        if let Some(path) = self.0.strip_prefix(FILE_URL_PREFIX) {
            return Some(Path::new(path));
        }
        if self.is_data_url() || self.0.contains("://") || self.0.is_empty() {
            return None;
        }
        Some(Path::new(&self.0))
    }

    /// Last path segment (e.g. `photo_1700000000000.jpg`)
    pub fn file_name(&self) -> Option<&str> {
        if self.is_data_url() {
            return None;
        }
        let trimmed = self.0.split(|c: char| c == '?' || c == '#').next().unwrap_or_default();
        trimmed
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .filter(|name| !name.is_empty())
    }

    /// Resolve the reference to encoded image bytes
    ///
    /// # Returns
    /// * `Ok(bytes)` - Decoded data URL payload or file contents
    /// * `Err(BoothError)` - Malformed data URL, unreadable file, or a
    ///   reference that only a remote backend could resolve
    pub fn load_bytes(&self) -> Result<Vec<u8>> {
        if self.is_data_url() {
            let (header, payload) = self
                .0
                .split_once(',')
                .ok_or_else(|| BoothError::UnsupportedReference("data URL without payload".into()))?;
            if !header.ends_with(";base64") {
                return Err(BoothError::UnsupportedReference(
                    "data URL is not base64-encoded".into(),
                ));
            }
            return Ok(STANDARD.decode(payload.trim())?);
        }

        match self.local_path() {
            Some(path) => Ok(std::fs::read(path)?),
            None => Err(BoothError::UnsupportedReference(self.summary())),
        }
    }

    /// Short description safe for logs (data URLs can be megabytes long)
    pub fn summary(&self) -> String {
        if self.is_data_url() {
            let header = self.0.split(',').next().unwrap_or_default();
            format!("{},… ({} bytes)", header, self.0.len())
        } else {
            self.0.clone()
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ImageRef {
    fn from(reference: String) -> Self {
        Self(reference)
    }
}

impl From<&str> for ImageRef {
    fn from(reference: &str) -> Self {
        Self(reference.to_string())
    }
}
