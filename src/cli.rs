use clap::{Parser, Subcommand};
use std::path::PathBuf;

use photo_booth::render::{bake_image, css_filter, encode_jpeg, ImageRef};
use photo_booth::state::codec;
use photo_booth::state::library::Library;
use photo_booth::storage::{FolderStorage, RemoteStorage};
use photo_booth::{Config, FilterKey, FilterModel, PhotoSession};

#[derive(Parser)]
#[command(name = "photo-booth")]
#[command(about = "Photo booth filters, baking and gallery", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the filter parameters with their ranges and defaults
    Filters,

    /// Print the CSS filter string for a filter setting
    Css {
        /// Filter setting as JSON (missing fields use defaults)
        #[arg(short, long, default_value = "{}")]
        filters: String,
    },

    /// Bake filters into an image and write a JPEG
    Bake {
        /// Input image (path or data URL)
        input: String,

        /// Filter setting as JSON
        #[arg(short, long, default_value = "{}")]
        filters: String,

        /// Output file (default: <input stem>_baked.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Capture an image into the gallery
    Capture {
        /// Snapshot to capture (path or data URL)
        input: String,

        /// Filter setting as JSON
        #[arg(short, long, default_value = "{}")]
        filters: String,
    },

    /// List the gallery, newest first
    List,

    /// Delete a photo from the gallery by its list index
    Delete {
        index: usize,
    },

    /// Save a gallery photo to a file
    Export {
        /// List index of the photo
        index: usize,

        /// Output file (default: the photo's own file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Parse a filter setting; unreadable text yields the default model
fn parse_filters(text: &str) -> FilterModel {
    codec::deserialize(text)
}

fn open_session(config: &Config) -> Result<PhotoSession, Box<dyn std::error::Error>> {
    let library = Library::open(&config.resolved_database_path()?)?;

    let remote: Option<Box<dyn RemoteStorage>> = match &config.storage_dir {
        Some(dir) => Some(Box::new(FolderStorage::new(dir.clone())?)),
        None => None,
    };

    Ok(PhotoSession::open(library, remote).with_jpeg_quality(config.jpeg_quality))
}

pub fn print_filters() {
    println!("{:<14} {:<10} {:>9} {:>8}", "KEY", "LABEL", "RANGE", "DEFAULT");
    for key in FilterKey::ALL {
        let range = key.range();
        println!(
            "{:<14} {:<10} {:>9} {:>8}",
            key.name(),
            key.label(),
            format!("{}-{}", range.start(), range.end()),
            key.default_value()
        );
    }
}

pub fn print_css(filters: &str) {
    println!("{}", css_filter(&parse_filters(filters)));
}

pub fn bake_file(
    input: &str,
    filters: &str,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let reference = ImageRef::new(input);
    let filters = parse_filters(filters);

    let image = image::load_from_memory(&reference.load_bytes()?)?;
    let baked = bake_image(&image, &filters);
    let jpeg = encode_jpeg(&baked, config.jpeg_quality)?;

    let output = output.unwrap_or_else(|| default_output(&reference));
    std::fs::write(&output, jpeg)?;

    println!("Baked {} -> {}", reference.summary(), output.display());
    Ok(())
}

fn default_output(reference: &ImageRef) -> PathBuf {
    let stem = reference
        .local_path()
        .and_then(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    PathBuf::from(format!("{}_baked.jpg", stem))
}

pub async fn capture(
    input: &str,
    filters: &str,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(config)?;
    let snapshot = ImageRef::new(input);

    let record = session.capture(&snapshot, parse_filters(filters)).await;
    println!("Captured {}", record.url.summary());
    if record.filters.is_active() {
        println!("  filter: {}", css_filter(&record.filters));
    }
    Ok(())
}

pub fn list(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(config)?;

    if session.is_empty() {
        println!("No photos yet.");
        return Ok(());
    }

    for (index, record) in session.records().iter().enumerate() {
        let captured = chrono::DateTime::from_timestamp_millis(record.timestamp)
            .map(|time| time.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        let filter = if record.filters.is_active() {
            css_filter(&record.filters)
        } else {
            "none".to_string()
        };
        println!("{:>3}  {}  {}  [{}]", index, captured, record.url.summary(), filter);
    }
    Ok(())
}

pub fn delete(index: usize, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = open_session(config)?;
    let removed = session.delete(index)?;
    println!("Deleted {}", removed.url.summary());
    Ok(())
}

pub fn export(
    index: usize,
    output: Option<PathBuf>,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = open_session(config)?;
    let dest = session.export(index, output.as_deref())?;
    println!("Saved {}", dest.display());
    Ok(())
}
