//! Gallery session
//!
//! Owns the photo collection for one run of the booth. Every capture and
//! delete is written through to the local library, so the gallery survives
//! restarts and outages of the photo storage.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{BoothError, Result};
use crate::render::{bake, ImageRef, DEFAULT_JPEG_QUALITY};
use crate::state::filters::FilterModel;
use crate::state::library::Library;
use crate::state::photo::{self, PhotoRecord, StoredEntry};
use crate::storage::{photo_file_name, RemoteStorage};

/// The photo collection plus the places it is kept
pub struct PhotoSession {
    /// Newest first
    records: Vec<PhotoRecord>,
    library: Library,
    remote: Option<Box<dyn RemoteStorage>>,
    jpeg_quality: u8,
}

impl PhotoSession {
    /// Open a session and load the gallery
    ///
    /// With a remote configured, its listing decides which photos exist;
    /// filters come from matching local records. If the remote cannot be
    /// listed, the local collection is used as is.
    pub fn open(library: Library, remote: Option<Box<dyn RemoteStorage>>) -> Self {
        let local = library.load_photos().unwrap_or_else(|e| {
            warn!(error = %e, "Error loading photos from library");
            Vec::new()
        });

        let records = match remote.as_deref() {
            Some(remote) => match remote.list() {
                Ok(listed) => merge_listing(listed, local, remote),
                Err(e) => {
                    warn!(error = %e, "Failed to list photos, using local library only");
                    local
                }
            },
            None => local,
        };

        info!(count = records.len(), "Gallery loaded");

        Self {
            records,
            library,
            remote,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    /// Set the JPEG quality used for baked captures
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Capture a snapshot with the given filters
    ///
    /// The filters are baked into the image, the result is uploaded when a
    /// remote is configured (keeping the local image if that fails), and the
    /// new record goes to the front of the gallery.
    pub async fn capture(&mut self, snapshot: &ImageRef, filters: FilterModel) -> &PhotoRecord {
        let baked = bake(snapshot.clone(), filters, self.jpeg_quality).await;
        let timestamp = photo::now_millis();

        let url = match self.remote.as_deref() {
            Some(remote) => upload_or_keep(remote, baked, &photo_file_name(timestamp)),
            None => baked,
        };

        info!(url = %url.summary(), active = filters.is_active(), "Photo captured");

        self.records.insert(0, PhotoRecord::new(url, filters, timestamp));
        self.persist();
        &self.records[0]
    }

    /// Remove the photo at `index`
    ///
    /// The local library is updated first; the remote copy is deleted on a
    /// best-effort basis.
    pub fn delete(&mut self, index: usize) -> Result<PhotoRecord> {
        if index >= self.records.len() {
            return Err(BoothError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }

        let record = self.records.remove(index);
        self.persist();

        if let Some(remote) = self.remote.as_deref() {
            if remote.owns(&record.url) {
                match remote.delete(&record.url) {
                    Ok(true) => debug!(url = %record.url, "Deleted remote photo"),
                    Ok(false) => debug!(url = %record.url, "Remote photo already gone"),
                    Err(e) => warn!(url = %record.url, error = %e, "Delete error"),
                }
            }
        }

        Ok(record)
    }

    /// Save the photo at `index` to a file
    ///
    /// Without a destination the photo's own file name is used in the
    /// current directory (`photo_<timestamp>.jpg` for data URLs).
    pub fn export(&self, index: usize, dest: Option<&Path>) -> Result<PathBuf> {
        let record = self.records.get(index).ok_or(BoothError::IndexOutOfRange {
            index,
            len: self.records.len(),
        })?;

        let bytes = record.url.load_bytes()?;
        let dest = match dest {
            Some(dest) => dest.to_path_buf(),
            None => PathBuf::from(
                record
                    .url
                    .file_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| photo_file_name(record.timestamp)),
            ),
        };

        std::fs::write(&dest, bytes)?;
        info!(url = %record.url.summary(), dest = %dest.display(), "Photo exported");
        Ok(dest)
    }

    /// All photos, newest first
    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    /// Image references for gallery display
    pub fn urls(&self) -> Vec<ImageRef> {
        photo::urls(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    /// Whether captures are uploaded anywhere
    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn persist(&self) {
        if let Err(e) = self.library.save_photos(&self.records) {
            warn!(error = %e, "Failed to save photos to library");
        }
    }
}

impl std::fmt::Debug for PhotoSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoSession")
            .field("records", &self.records.len())
            .field("library", &self.library)
            .field("has_remote", &self.remote.is_some())
            .finish()
    }
}

/// Upload baked bytes, falling back to the baked reference itself
fn upload_or_keep(remote: &dyn RemoteStorage, baked: ImageRef, name: &str) -> ImageRef {
    let bytes = match baked.load_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "Captured image unreadable, not uploading");
            return baked;
        }
    };

    match remote.upload(&bytes, name) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "Upload error, keeping local image");
            baked
        }
    }
}

/// Combine a remote listing with the local collection
///
/// Listed photos keep their local record when one exists and are upgraded
/// from bare references otherwise. Local records the remote does not own
/// (offline captures) follow the listed ones.
fn merge_listing(
    listed: Vec<ImageRef>,
    mut local: Vec<PhotoRecord>,
    remote: &dyn RemoteStorage,
) -> Vec<PhotoRecord> {
    let now = photo::now_millis();
    let mut records = Vec::with_capacity(listed.len() + local.len());

    for url in listed {
        match local.iter().position(|record| record.url == url) {
            Some(pos) => records.push(local.remove(pos)),
            None => records.push(StoredEntry::Legacy(url).upgrade_at(now)),
        }
    }

    records.extend(local.into_iter().filter(|record| !remote.owns(&record.url)));
    records
}
