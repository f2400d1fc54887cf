//! Unified error type for the sticker pipeline.
//!
//! Every failure a conversion can surface to its caller is a variant of
//! [`Error`]. Best-effort steps (scratch deletion, metadata embedding) never
//! produce one; they log and carry on.

/// Failures surfaced by a sticker conversion.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input matched none of the recognized input shapes.
    #[error("Invalid input kind: {0}")]
    InvalidInputKind(String),

    /// The requested sticker kind is neither `image` nor `video`.
    #[error("Unsupported sticker kind: {0}")]
    UnsupportedKind(String),

    /// Fetching a URL-shaped input failed or returned an empty body.
    #[error("Fetch failed for {url}: {message}")]
    FetchFailed {
        /// The URL that was requested.
        url: String,
        /// Human-readable failure description.
        message: String,
    },

    /// The resolved buffer is too small to be a media file.
    #[error("Invalid buffer: {len} bytes is too small to be a media file")]
    InvalidBuffer {
        /// Length of the rejected buffer.
        len: usize,
    },

    /// The encoder invocation errored or produced an empty file.
    #[error("Encode failed: {0}")]
    EncodeFailed(String),

    /// An external tool is missing or could not be run.
    #[error("Tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Configuration or request data failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}

impl Error {
    /// Convenience constructor for [`Error::FetchFailed`].
    pub fn fetch_failed(url: impl Into<String>, message: impl Into<String>) -> Self {
        Error::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::EncodeFailed`].
    pub fn encode_failed(message: impl Into<String>) -> Self {
        Error::EncodeFailed(message.into())
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
