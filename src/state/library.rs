use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::photo::{self, PhotoRecord};
use crate::errors::Result;

/// Key under which the photo collection is stored
const PHOTOS_KEY: &str = "photos";

/// The Library is the local gallery database.
/// It is a small key-value store that keeps the serialized photo collection
/// as an offline fallback for the remote storage.
pub struct Library {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Library {
    /// Open (or create) the library at `db_path` and initialize the schema.
    ///
    /// Parent directories are created as needed.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        info!(path = %db_path.display(), "Library opened");

        let library = Library {
            conn,
            db_path: Some(db_path.to_path_buf()),
        };
        library.init_schema()?;

        Ok(library)
    }

    /// Open a throwaway in-memory library
    pub fn open_in_memory() -> Result<Self> {
        let library = Library {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Get the path where the database should be stored by default
    ///
    /// - Linux: ~/.local/share/photo-booth/photo_booth.db
    /// - macOS: ~/Library/Application Support/photo-booth/photo_booth.db
    /// - Windows: %APPDATA%\photo-booth\photo_booth.db
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("photo-booth");
        path.push("photo_booth.db");
        Some(path)
    }

    /// Create the key-value table if it doesn't exist.
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key             TEXT PRIMARY KEY,
                value           TEXT NOT NULL,
                updated_at      INTEGER NOT NULL
            )",
            [],
        )?;

        debug!("Library schema initialized");
        Ok(())
    }

    /// Get the path to the database file (None for in-memory libraries)
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    /// Read a raw value
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Insert or replace a raw value
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, photo::now_millis()],
        )?;
        Ok(())
    }

    /// Remove a value; returns whether it existed
    pub fn remove(&self, key: &str) -> Result<bool> {
        let removed = self.conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(removed > 0)
    }

    /// Store the whole photo collection
    pub fn save_photos(&self, records: &[PhotoRecord]) -> Result<()> {
        self.set(PHOTOS_KEY, &photo::save_collection(records))?;
        debug!(count = records.len(), "Saved photos to library");
        Ok(())
    }

    /// Load the photo collection
    ///
    /// Legacy entries are upgraded and malformed ones dropped; a missing or
    /// unreadable collection loads as empty.
    pub fn load_photos(&self) -> Result<Vec<PhotoRecord>> {
        Ok(self
            .get(PHOTOS_KEY)?
            .map(|text| photo::load_collection(&text))
            .unwrap_or_default())
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
