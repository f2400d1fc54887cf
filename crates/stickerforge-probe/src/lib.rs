//! Magic-byte format detection and WebP container handling
//!
//! This crate classifies media buffers by their leading bytes and walks the
//! chunk structure of WebP (RIFF) files, without decoding any pixels.
//!
//! # Example
//!
//! ```
//! use stickerforge_probe::detect;
//!
//! let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
//! let file_type = detect(&png);
//! assert_eq!(file_type.extension, "png");
//! assert_eq!(file_type.mime_type, "image/png");
//! ```

pub mod cache;
pub mod error;
pub mod riff;
pub mod signature;
pub mod sniff;

pub use cache::{configure_global_cache, DetectionCache};
pub use error::ProbeError;
pub use signature::{FileType, Resolution, Signature, SIGNATURES};
pub use sniff::{detect, detect_uncached};
