//! Shared fixtures for integration tests.
//!
//! [`FakeEncoder`] stands in for ffmpeg: it records what it was asked to
//! encode and writes a small but real WebP (or fails, on request).

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};

use stickerforge::{Fetcher, HttpFetcher, InputResolver, StickerEngine};
use stickerforge_av::{EncodeJob, ScratchDir, Transcoder, WebpEncoder};
use stickerforge_core::config::FetchConfig;
use stickerforge_core::{Error, Result};

pub fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90, 255])
    });
    let mut buf = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img)
            .to_rgb8()
            .write_to(&mut buf, format)
            .unwrap(),
        _ => img.write_to(&mut buf, format).unwrap(),
    }
    buf.into_inner()
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(ImageFormat::Png, width, height)
}

pub fn webp(width: u32, height: u32) -> Vec<u8> {
    encode(ImageFormat::WebP, width, height)
}

pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    use base64::Engine as _;
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// What the fake saw for one encode.
#[derive(Debug, Clone)]
pub struct SeenJob {
    pub job: EncodeJob,
    pub input_bytes: Vec<u8>,
}

#[derive(Default)]
pub struct FakeEncoder {
    pub fail: bool,
    seen: Mutex<Vec<SeenJob>>,
}

impl FakeEncoder {
    pub fn working() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }

    pub fn seen(&self) -> Vec<SeenJob> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebpEncoder for FakeEncoder {
    fn name(&self) -> &str {
        "fake"
    }

    async fn encode(&self, job: &EncodeJob) -> Result<()> {
        let input_bytes = tokio::fs::read(&job.input).await?;
        self.seen.lock().unwrap().push(SeenJob {
            job: job.clone(),
            input_bytes,
        });
        if self.fail {
            return Err(Error::encode_failed("fake encoder refused"));
        }
        tokio::fs::write(&job.output, webp(32, 32)).await?;
        Ok(())
    }
}

pub fn engine_with(
    scratch: &Path,
    encoder: Arc<dyn WebpEncoder>,
    fetcher: Arc<dyn Fetcher>,
) -> StickerEngine {
    StickerEngine::new(
        InputResolver::new(fetcher),
        Transcoder::new(encoder, ScratchDir::new(scratch)),
    )
}

pub fn engine(scratch: &Path, encoder: Arc<dyn WebpEncoder>) -> StickerEngine {
    engine_with(
        scratch,
        encoder,
        Arc::new(HttpFetcher::new(&FetchConfig::default())),
    )
}

/// True when `dir` is missing or holds no entries.
pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir)
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

/// Whether an ffmpeg with the libwebp encoder is installed.
pub fn ffmpeg_with_libwebp() -> bool {
    let tools = stickerforge_av::ToolRegistry::discover(&Default::default());
    let Ok(ffmpeg) = tools.require("ffmpeg") else {
        return false;
    };
    std::process::Command::new(ffmpeg)
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|out| String::from_utf8_lossy(&out.stdout).contains("libwebp"))
        .unwrap_or(false)
}
