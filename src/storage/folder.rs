//! Folder-backed photo storage
//!
//! Uploads land as plain files in one directory; listing scans that
//! directory for images, newest first.

use std::cmp::Reverse;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::RemoteStorage;
use crate::errors::{BoothError, Result};
use crate::render::ImageRef;

/// Maximum number of photos returned by `list`
const LIST_LIMIT: usize = 100;

/// Image extensions picked up when listing
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Stores photos as files in a single directory
#[derive(Debug, Clone)]
pub struct FolderStorage {
    dir: PathBuf,
}

impl FolderStorage {
    /// Use `dir` as the photo folder, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        info!(dir = %dir.display(), "Folder storage ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, reference: &ImageRef) -> Option<PathBuf> {
        let path = reference.local_path()?;
        (path.parent() == Some(self.dir.as_path())).then(|| path.to_path_buf())
    }
}

impl RemoteStorage for FolderStorage {
    fn upload(&self, bytes: &[u8], name: &str) -> Result<ImageRef> {
        let has_separator = name.contains(|c: char| c == '/' || c == '\\');
        if name.is_empty() || has_separator || name == "." || name == ".." {
            return Err(BoothError::Storage(format!("invalid photo name: {:?}", name)));
        }

        let path = self.dir.join(name);

        // Never overwrite an existing photo
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(BoothError::AlreadyExists(name.to_string()));
            }
            Err(e) => return Err(e.into()),
        };
        write_or_discard(&mut file, bytes, &path)?;

        debug!(path = %path.display(), size = bytes.len(), "Uploaded photo");
        Ok(ImageRef::from_path(&path))
    }

    fn list(&self) -> Result<Vec<ImageRef>> {
        let mut entries: Vec<(SystemTime, PathBuf)> = Vec::new();

        for entry in WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let is_image = entry
                .path()
                .extension()
                .map(|ext| {
                    let ext = ext.to_string_lossy().to_lowercase();
                    IMAGE_EXTENSIONS.contains(&ext.as_str())
                })
                .unwrap_or(false);
            if !is_image {
                continue;
            }

            let modified = entry
                .metadata()
                .ok()
                .and_then(|m| m.modified().ok())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push((modified, entry.into_path()));
        }

        // Newest first; names break ties (photo_<ms> sorts by capture time)
        entries.sort_by_key(|(modified, path)| Reverse((*modified, path.clone())));

        Ok(entries
            .into_iter()
            .take(LIST_LIMIT)
            .map(|(_, path)| ImageRef::from_path(&path))
            .collect())
    }

    fn delete(&self, reference: &ImageRef) -> Result<bool> {
        let Some(path) = self.path_for(reference) else {
            return Ok(false);
        };

        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted photo");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn owns(&self, reference: &ImageRef) -> bool {
        self.path_for(reference).is_some()
    }
}

/// Write an upload, removing the file again if the write fails
///
/// A partial photo would otherwise show up in `list`.
fn write_or_discard(writer: &mut impl Write, bytes: &[u8], path: &Path) -> Result<()> {
    if let Err(e) = writer.write_all(bytes) {
        if let Err(cleanup) = fs::remove_file(path) {
            warn!(path = %path.display(), error = %cleanup, "Failed to remove partial upload");
        }
        return Err(e.into());
    }
    Ok(())
}
