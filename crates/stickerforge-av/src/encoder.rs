//! WebP encoding through an external encoder.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Output edge length of a sticker, in pixels.
pub const STICKER_EDGE: u32 = 320;
/// Frame-rate cap for animated stickers.
pub const ANIMATED_FPS: u32 = 15;
/// Duration cap for animated stickers, in seconds.
pub const ANIMATED_MAX_SECS: u32 = 8;
/// libwebp compression effort (0 = fastest, 6 = slowest).
pub const COMPRESSION_LEVEL: u32 = 4;

/// How the source is fitted into the square sticker canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Geometry {
    /// Stretch to exactly 320x320, ignoring aspect ratio.
    Stretch,
    /// Scale to fit inside 320x320 and pad with transparent bars.
    Pad,
}

impl Geometry {
    pub fn from_force_square(force_square: bool) -> Self {
        if force_square {
            Geometry::Stretch
        } else {
            Geometry::Pad
        }
    }

    /// The ffmpeg `-vf` filter chain for this geometry.
    pub fn filter_chain(self, animated: bool) -> String {
        let edge = STICKER_EDGE;
        let mut chain = match self {
            Geometry::Stretch => format!("scale={edge}:{edge}"),
            Geometry::Pad => format!(
                "scale={edge}:{edge}:force_original_aspect_ratio=decrease,format=rgba,\
                 pad={edge}:{edge}:(ow-iw)/2:(oh-ih)/2:color=#00000000"
            ),
        };
        if animated {
            chain.push_str(&format!(",fps={ANIMATED_FPS}"));
        }
        chain
    }
}

/// One encoder invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub filter: String,
    /// 0-100.
    pub quality: u8,
    pub animated: bool,
}

impl EncodeJob {
    /// ffmpeg arguments producing a lossy WebP at `quality`.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "-y".into(),
            "-i".into(),
            path_arg(&self.input),
            "-vcodec".into(),
            "libwebp".into(),
            "-vf".into(),
            self.filter.clone(),
            "-lossless".into(),
            "0".into(),
            "-compression_level".into(),
            COMPRESSION_LEVEL.to_string(),
            "-q:v".into(),
            self.quality.to_string(),
        ];
        if self.animated {
            args.extend(["-loop", "0", "-an", "-vsync", "0", "-t"].map(String::from));
            args.push(ANIMATED_MAX_SECS.to_string());
        }
        args.push(path_arg(&self.output));
        args
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Something that turns an input file into a WebP file at a given quality.
///
/// Implementations write `job.output`; the caller measures and reads it.
#[async_trait]
pub trait WebpEncoder: Send + Sync {
    /// Short identifier used in logs (e.g. `"ffmpeg"`).
    fn name(&self) -> &str;

    /// Run one encode.
    ///
    /// # Errors
    ///
    /// Returns [`stickerforge_core::Error::EncodeFailed`] when the encoder
    /// cannot be run or reports failure.
    async fn encode(&self, job: &EncodeJob) -> stickerforge_core::Result<()>;
}

/// [`WebpEncoder`] backed by the ffmpeg CLI with libwebp.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl FfmpegEncoder {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            timeout: None,
        }
    }

    /// Resolve ffmpeg from the registry.
    pub fn from_registry(tools: &ToolRegistry) -> stickerforge_core::Result<Self> {
        Ok(Self::new(tools.require("ffmpeg")?.to_path_buf()))
    }

    /// Bound each invocation by wall-clock time.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl WebpEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn encode(&self, job: &EncodeJob) -> stickerforge_core::Result<()> {
        let mut cmd = ToolCommand::new(self.program.clone());
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        cmd.args(job.ffmpeg_args());
        if let Some(limit) = self.timeout {
            cmd.timeout(limit);
        }

        tracing::debug!(
            "ffmpeg encode: {:?} -> {:?} (quality={}, animated={})",
            job.input,
            job.output,
            job.quality,
            job.animated
        );

        cmd.execute()
            .await
            .map(|_| ())
            .map_err(|e| stickerforge_core::Error::encode_failed(e.to_string()))
    }
}
