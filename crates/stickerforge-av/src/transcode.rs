//! Size-fitting WebP transcoder.
//!
//! [`Transcoder`] writes the source buffer to a scratch file, then runs the
//! encoder at decreasing qualities (see [`QualityLadder`]) until the output
//! fits [`SIZE_BUDGET`] or the ladder gives up. Scratch files are released
//! with an async delete after use; their [`ScratchFile`](crate::ScratchFile)
//! guards cover cancellation.

use std::path::Path;
use std::sync::Arc;

use stickerforge_core::{Error, Result};
use stickerforge_probe::{detect, riff};

use crate::encoder::{EncodeJob, Geometry, WebpEncoder};
use crate::ladder::{EncodeAttempt, LadderStep, QualityLadder, SIZE_BUDGET};
use crate::scratch::ScratchDir;

/// Result of a transcode, with the attempt history.
#[derive(Debug, Clone)]
pub struct Transcoded {
    pub data: Vec<u8>,
    /// Empty when the source was passed through without encoding.
    pub attempts: Vec<EncodeAttempt>,
    /// `false` when the ladder hit its floor with the output still over
    /// budget. Passthrough results report `true` without measuring.
    pub within_budget: bool,
}

impl Transcoded {
    pub fn passed_through(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Quality of the returned encode, if one was made.
    pub fn final_quality(&self) -> Option<u8> {
        self.attempts.last().map(|a| a.quality)
    }
}

/// Drives an encoder through the quality ladder.
#[derive(Clone)]
pub struct Transcoder {
    encoder: Arc<dyn WebpEncoder>,
    scratch: ScratchDir,
}

impl Transcoder {
    pub fn new(encoder: Arc<dyn WebpEncoder>, scratch: ScratchDir) -> Self {
        Self { encoder, scratch }
    }

    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Convert `data` to a sticker-sized WebP.
    ///
    /// An over-budget result at the quality floor is returned as-is; use
    /// [`transcode_with_report`](Self::transcode_with_report) to tell the
    /// two apart.
    pub async fn transcode(&self, data: &[u8], animated: bool, force_square: bool) -> Result<Vec<u8>> {
        Ok(self
            .transcode_with_report(data, animated, force_square)
            .await?
            .data)
    }

    /// Like [`transcode`](Self::transcode), also returning every attempt and
    /// whether the result fits the budget.
    ///
    /// # Errors
    ///
    /// - [`Error::EncodeFailed`] if the encoder fails, or an attempt leaves a
    ///   missing or empty output file. No further attempts are made.
    /// - [`Error::Io`] if the scratch directory cannot be written.
    pub async fn transcode_with_report(
        &self,
        data: &[u8],
        animated: bool,
        force_square: bool,
    ) -> Result<Transcoded> {
        if !animated && riff::is_webp(data) {
            tracing::debug!("Source is already WebP, skipping encode");
            return Ok(Transcoded {
                data: data.to_vec(),
                attempts: Vec::new(),
                within_budget: true,
            });
        }

        let input = self.scratch.reserve(input_extension(data, animated)).await?;
        let result = match input.write(data).await {
            Ok(()) => self.run_ladder(input.path(), animated, force_square).await,
            Err(e) => Err(e),
        };
        input.cleanup().await;
        result
    }

    async fn run_ladder(
        &self,
        input: &Path,
        animated: bool,
        force_square: bool,
    ) -> Result<Transcoded> {
        let filter = Geometry::from_force_square(force_square).filter_chain(animated);
        let mut ladder = QualityLadder::for_source(animated);
        let mut attempts = Vec::new();

        loop {
            let quality = ladder.quality();
            let output = self.scratch.reserve("webp").await?;
            let job = EncodeJob {
                input: input.to_path_buf(),
                output: output.path().to_path_buf(),
                filter: filter.clone(),
                quality,
                animated,
            };

            let encoded = match self.encoder.encode(&job).await {
                Ok(()) => output.read().await.map_err(|e| {
                    Error::encode_failed(format!(
                        "{} wrote no output at quality {quality}: {e}",
                        self.encoder.name()
                    ))
                }),
                Err(e) => Err(e),
            };
            output.cleanup().await;
            let encoded = encoded?;

            if encoded.is_empty() {
                return Err(Error::encode_failed(format!(
                    "{} produced an empty file at quality {quality}",
                    self.encoder.name()
                )));
            }

            let attempt = EncodeAttempt {
                attempt_index: attempts.len() as u32,
                quality,
                output_size: encoded.len() as u64,
            };
            attempts.push(attempt);
            tracing::debug!(
                "Attempt {}: quality {} -> {} bytes",
                attempt.attempt_index,
                quality,
                attempt.output_size
            );

            match ladder.observe(attempt.output_size) {
                LadderStep::Accept => {
                    return Ok(Transcoded {
                        data: encoded,
                        attempts,
                        within_budget: true,
                    });
                }
                LadderStep::AcceptBestEffort => {
                    tracing::warn!(
                        "Sticker is {} bytes after {} attempts (budget {SIZE_BUDGET}); keeping quality {quality} result",
                        attempt.output_size,
                        attempts.len()
                    );
                    return Ok(Transcoded {
                        data: encoded,
                        attempts,
                        within_budget: false,
                    });
                }
                LadderStep::Retry(next) => {
                    tracing::debug!("Over budget, retrying at quality {next}");
                }
            }
        }
    }
}

/// Scratch extension for the source. Encoders pick demuxers from it, so use
/// the sniffed type when it is a media type and fall back on the kind.
fn input_extension(data: &[u8], animated: bool) -> &'static str {
    let file_type = detect(data);
    if file_type.is_image() || file_type.is_video() {
        file_type.extension
    } else if animated {
        "mp4"
    } else {
        "png"
    }
}
