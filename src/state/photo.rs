//! Gallery data structures
//!
//! A `PhotoRecord` ties a captured image to the filters that were active
//! when it was taken. Older galleries stored bare image references only;
//! those are read as `StoredEntry::Legacy` and upgraded on load.

use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::codec;
use super::filters::FilterModel;
use crate::render::ImageRef;

/// A single captured photo
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PhotoRecord {
    /// Where the image lives (remote URL, local path or data URL)
    pub url: ImageRef,
    /// Filters that were active at capture time
    #[serde(default, deserialize_with = "lenient_filters")]
    pub filters: FilterModel,
    /// Capture time in Unix milliseconds (0 if never recorded)
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: i64,
}

impl PhotoRecord {
    pub fn new(url: ImageRef, filters: FilterModel, timestamp: i64) -> Self {
        Self {
            url,
            filters,
            timestamp,
        }
    }

    /// Record captured right now
    pub fn captured_now(url: ImageRef, filters: FilterModel) -> Self {
        Self::new(url, filters, now_millis())
    }
}

/// One element of a stored collection, as found on disk
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum StoredEntry {
    /// Bare image reference from before filters were recorded
    Legacy(ImageRef),
    /// Structured record
    Record(PhotoRecord),
}

impl StoredEntry {
    /// Turn this entry into a record, stamping legacy entries with `now`
    pub fn upgrade_at(self, now: i64) -> PhotoRecord {
        match self {
            StoredEntry::Legacy(url) => PhotoRecord::new(url, FilterModel::default(), now),
            StoredEntry::Record(record) => record,
        }
    }
}

impl From<PhotoRecord> for StoredEntry {
    fn from(record: PhotoRecord) -> Self {
        StoredEntry::Record(record)
    }
}

impl From<ImageRef> for StoredEntry {
    fn from(url: ImageRef) -> Self {
        StoredEntry::Legacy(url)
    }
}

/// Upgrade an entry using the current time
///
/// Records pass through unchanged, so upgrading twice is the same as once.
pub fn upgrade(entry: impl Into<StoredEntry>) -> PhotoRecord {
    entry.into().upgrade_at(now_millis())
}

/// Upgrade an entry with an explicit timestamp for legacy entries
pub fn upgrade_at(entry: impl Into<StoredEntry>, now: i64) -> PhotoRecord {
    entry.into().upgrade_at(now)
}

/// Parse a stored collection, tolerating legacy and malformed entries
///
/// Entries that are neither a string nor an object with a string `url`
/// are dropped. Text that is not a JSON array yields an empty gallery.
pub fn load_collection(text: &str) -> Vec<PhotoRecord> {
    let entries = match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(entries)) => entries,
        Ok(_) => {
            warn!("Stored photo collection is not a list, ignoring it");
            return Vec::new();
        }
        Err(e) => {
            warn!(error = %e, "Error loading photos from storage");
            return Vec::new();
        }
    };

    let now = now_millis();
    let total = entries.len();
    let records: Vec<PhotoRecord> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value::<StoredEntry>(entry) {
            Ok(entry) => Some(entry.upgrade_at(now)),
            Err(e) => {
                debug!(error = %e, "Dropping malformed stored photo");
                None
            }
        })
        .collect();

    if records.len() < total {
        debug!(kept = records.len(), dropped = total - records.len(), "Loaded photo collection");
    }

    records
}

/// Serialize a collection for storage
pub fn save_collection(records: &[PhotoRecord]) -> String {
    // Records hold only strings and integers, which always serialize
    serde_json::to_string(records).unwrap_or_else(|_| "[]".to_string())
}

/// Image references for gallery display
pub fn urls(records: &[PhotoRecord]) -> Vec<ImageRef> {
    records.iter().map(|record| record.url.clone()).collect()
}

/// Current time in Unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Read a `filters` field with the codec's fallback policy
fn lenient_filters<'de, D>(deserializer: D) -> Result<FilterModel, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(codec::from_value(&value).unwrap_or_default())
}

/// Read a `timestamp` field; fractional values are truncated, anything
/// that is not a number reads as 0
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_i64()
        .or_else(|| value.as_f64().map(|ms| ms as i64))
        .unwrap_or(0))
}
