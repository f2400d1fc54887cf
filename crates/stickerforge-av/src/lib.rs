//! # stickerforge-av
//!
//! External encoder orchestration for the sticker pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache the path to
//!   ffmpeg, honoring a configured override.
//! - **Command execution** ([`ToolCommand`]) -- async builder with optional
//!   timeout for running external processes.
//! - **Scratch files** ([`ScratchDir`], [`ScratchFile`]) -- uniquely named
//!   files in the scratch directory, deleted when the guard drops.
//! - **Encoding** ([`WebpEncoder`], [`FfmpegEncoder`]) -- one encode at one
//!   quality, behind a trait so tests can inject fakes.
//! - **Size fitting** ([`QualityLadder`], [`Transcoder`]) -- the adaptive
//!   quality search that brings a sticker under the byte budget.

pub mod command;
pub mod encoder;
pub mod ladder;
pub mod scratch;
pub mod tools;
pub mod transcode;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use encoder::{EncodeJob, FfmpegEncoder, Geometry, WebpEncoder};
pub use ladder::{EncodeAttempt, LadderStep, QualityLadder, SIZE_BUDGET};
pub use scratch::{ScratchDir, ScratchFile};
pub use tools::{ToolInfo, ToolRegistry};
pub use transcode::{Transcoded, Transcoder};
