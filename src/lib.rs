//! Stickerforge - media-to-sticker transcoding engine
//!
//! Turns images, animated images, and videos into size-constrained WebP
//! stickers tagged with pack metadata. The library crate exposes the engine
//! for embedding and integration testing.

pub mod config;
pub mod delivery;
pub mod engine;
pub mod metadata;
pub mod resolve;

pub use delivery::{DeliveryContext, FileSink, StickerSink};
pub use engine::StickerEngine;
pub use metadata::{embed_metadata, read_sticker_metadata, StickerMetadata};
pub use resolve::{Fetcher, HttpFetcher, InputResolver};
