//! State management module
//!
//! This module handles all persistent state, including:
//! - Filter settings and their ranges (filters.rs)
//! - The filter text form (codec.rs)
//! - Photo records and legacy migration (photo.rs)
//! - The local gallery database (library.rs)

pub mod codec;
pub mod filters;
pub mod library;
pub mod photo;
