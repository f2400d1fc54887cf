//! stickerforge-core: shared error taxonomy, data model, and configuration.
//!
//! This crate is the foundational dependency for the other stickerforge
//! crates. It carries the [`Error`] type every conversion step reports
//! through, the input/request types that flow from the resolver down to the
//! transcoder, and the configuration sections each component reads.

pub mod config;
pub mod error;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use media::*;
