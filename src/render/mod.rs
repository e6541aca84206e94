//! Filter rendering module
//!
//! This module handles:
//! - Composing the declarative filter stack (`stack.rs`)
//! - Baking filters into pixels (`bake.rs`)
//! - Resolving and producing image references (`source.rs`)

pub mod bake;
pub mod source;
pub mod stack;

pub use bake::{bake, bake_image, encode_jpeg, Pixel, DEFAULT_JPEG_QUALITY};
pub use source::ImageRef;
pub use stack::{compose_stack, css_filter, FilterOp};
