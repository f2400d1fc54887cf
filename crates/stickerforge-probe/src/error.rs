//! Error types for stickerforge-probe

/// Errors that can occur while reading a WebP container
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    /// The buffer does not start with a RIFF/WEBP header
    #[error("Not a WebP container")]
    NotWebp,

    /// A chunk or header extends past the end of the buffer
    #[error("Truncated container: {0}")]
    Truncated(String),
}
