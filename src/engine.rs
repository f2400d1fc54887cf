//! The sticker pipeline: resolve, validate, transcode, tag, deliver.

use std::sync::Arc;
use std::time::Duration;

use stickerforge_av::{FfmpegEncoder, ScratchDir, ToolRegistry, Transcoded, Transcoder, WebpEncoder};
use stickerforge_core::config::Config;
use stickerforge_core::{ConversionRequest, Error, MediaInput, Result, TOO_SMALL_BYTES};

use crate::delivery::{DeliveryContext, StickerSink};
use crate::metadata::{embed_metadata, StickerMetadata};
use crate::resolve::InputResolver;

/// Entry point for producing stickers.
#[derive(Clone)]
pub struct StickerEngine {
    resolver: InputResolver,
    transcoder: Transcoder,
}

impl StickerEngine {
    pub fn new(resolver: InputResolver, transcoder: Transcoder) -> Self {
        Self { resolver, transcoder }
    }

    /// Wire up ffmpeg, the scratch directory, and the HTTP fetcher from
    /// configuration. Also sizes the process-wide detection cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tool`] if ffmpeg cannot be found.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !stickerforge_probe::configure_global_cache(config.detection.cache_capacity) {
            tracing::debug!("Detection cache already initialized; capacity unchanged");
        }

        let tools = ToolRegistry::discover(&config.tools);
        let encoder = FfmpegEncoder::from_registry(&tools)?
            .with_timeout(config.encoder.timeout_secs.map(Duration::from_secs));
        Ok(Self::with_encoder(config, Arc::new(encoder)))
    }

    /// Like [`from_config`](Self::from_config) with a caller-supplied encoder.
    pub fn with_encoder(config: &Config, encoder: Arc<dyn WebpEncoder>) -> Self {
        let scratch = ScratchDir::new(config.storage.scratch_dir());
        Self::new(
            InputResolver::from_config(&config.fetch),
            Transcoder::new(encoder, scratch),
        )
    }

    /// Produce a sticker from `input`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidBuffer`] if the resolved input is at most
    ///   [`TOO_SMALL_BYTES`] long; nothing is encoded.
    /// - Any resolver or transcoder error, unchanged.
    pub async fn produce_sticker(
        &self,
        input: MediaInput,
        request: &ConversionRequest,
    ) -> Result<Vec<u8>> {
        Ok(self.produce_with_report(input, request).await?.data)
    }

    /// Like [`produce_sticker`](Self::produce_sticker), keeping the attempt
    /// history and budget flag. `data` already carries the metadata.
    pub async fn produce_with_report(
        &self,
        input: MediaInput,
        request: &ConversionRequest,
    ) -> Result<Transcoded> {
        let data = self.resolver.resolve(input).await?;
        if data.len() <= TOO_SMALL_BYTES {
            return Err(Error::InvalidBuffer { len: data.len() });
        }

        tracing::info!(
            "Converting {} byte {} source ({})",
            data.len(),
            request.kind,
            stickerforge_probe::detect(&data)
        );

        let mut transcoded = self
            .transcoder
            .transcode_with_report(&data, request.kind.is_animated(), request.force_square)
            .await?;

        if request.wants_metadata() {
            let metadata = StickerMetadata::new(&request.pack_name, &request.author);
            transcoded.data = embed_metadata(std::mem::take(&mut transcoded.data), &metadata);
        }

        tracing::info!(
            "Sticker ready: {} bytes after {} encode(s)",
            transcoded.data.len(),
            transcoded.attempts.len()
        );
        Ok(transcoded)
    }

    /// Produce a sticker and hand it to `sink`.
    pub async fn deliver(
        &self,
        sink: &dyn StickerSink,
        context: &DeliveryContext,
        input: MediaInput,
        request: &ConversionRequest,
    ) -> Result<()> {
        let sticker = self.produce_sticker(input, request).await?;
        sink.send_sticker(context, sticker).await
    }
}
