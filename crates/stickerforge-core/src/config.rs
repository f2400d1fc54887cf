//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from TOML by the binary and
//! carries the sub-configs read by tool discovery, scratch storage, the HTTP
//! fetcher, the encoder, and format detection. Every section defaults
//! sensibly so a completely empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Name of the scratch subdirectory under the state root.
pub const SCRATCH_DIR_NAME: &str = "tmp";

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tools: ToolsConfig,
    pub storage: StorageConfig,
    pub fetch: FetchConfig,
    pub encoder: EncoderConfig,
    pub detection: DetectionConfig,
}

impl Config {
    /// Return a list of validation warnings (non-fatal issues).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for settings that cannot work at all.
    pub fn validate(&self) -> Result<Vec<String>> {
        let mut warnings = Vec::new();

        if self.detection.cache_capacity == 0 {
            return Err(Error::Validation(
                "detection.cache_capacity must be at least 1".into(),
            ));
        }

        if self.fetch.timeout_secs == 0 {
            return Err(Error::Validation("fetch.timeout_secs must be at least 1".into()));
        }

        if let Some(path) = &self.tools.ffmpeg_path {
            if !path.exists() {
                warnings.push(format!(
                    "tools.ffmpeg_path {} does not exist; falling back to PATH",
                    path.display()
                ));
            }
        }

        if self.encoder.timeout_secs == Some(0) {
            warnings.push("encoder.timeout_secs is 0; every encode will time out".into());
        }

        Ok(warnings)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// Overrides for external tool locations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Explicit path to the ffmpeg executable; `PATH` lookup otherwise.
    pub ffmpeg_path: Option<PathBuf>,
}

/// Persistent-state location.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root directory for application state.
    pub state_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from("./data"),
        }
    }
}

impl StorageConfig {
    /// Directory scratch files are created in.
    pub fn scratch_dir(&self) -> PathBuf {
        self.state_dir.join(SCRATCH_DIR_NAME)
    }
}

/// Remote fetch settings for URL-shaped inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("stickerforge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Encoder invocation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Wall-clock bound for a single encoder run. Unbounded when absent.
    pub timeout_secs: Option<u64>,
}

/// Format detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Maximum number of memoized detection results.
    pub cache_capacity: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 1024,
        }
    }
}
