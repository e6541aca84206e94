//! Photo booth core
//!
//! A twelve-parameter filter model, its declarative CSS rendition, a CPU
//! bake of the same effect into pixels, and a gallery of captured photos
//! kept in a local library and an optional photo storage.

pub mod color;
pub mod config;
pub mod errors;
pub mod render;
pub mod session;
pub mod state;
pub mod storage;

pub use config::Config;
pub use errors::{BoothError, Result};
pub use render::ImageRef;
pub use session::PhotoSession;
pub use state::filters::{FilterKey, FilterModel};
pub use state::photo::PhotoRecord;
