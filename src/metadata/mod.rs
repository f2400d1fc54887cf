//! Sticker pack metadata embedded in the WebP container.
//!
//! The EXIF block is attached with libwebp's mux API through `webpx`, which
//! promotes simple files to the extended layout and keeps chunk order.
//! Embedding is best-effort: [`embed_metadata`] never fails, it logs and
//! hands back the untouched sticker when the container cannot be rewritten.

pub mod exif;

pub use exif::{build_exif, parse_exif, StickerMetadata, PACK_ID, STICKER_TAG};

/// Errors from building, attaching, or reading a metadata block.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("metadata JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("WebP mux: {0}")]
    Mux(String),

    #[error("malformed EXIF block: {0}")]
    Malformed(String),

    #[error("metadata payload too large: {0} bytes")]
    TooLarge(usize),
}

/// Attach `metadata` to `webp`, replacing any existing EXIF chunk.
///
/// Returns `webp` unchanged if it cannot be parsed or rewritten.
pub fn embed_metadata(webp: Vec<u8>, metadata: &StickerMetadata) -> Vec<u8> {
    match try_embed(&webp, metadata) {
        Ok(tagged) => {
            tracing::debug!(
                "Embedded pack metadata ({} -> {} bytes)",
                webp.len(),
                tagged.len()
            );
            tagged
        }
        Err(e) => {
            tracing::warn!("Skipping sticker metadata: {e}");
            webp
        }
    }
}

fn try_embed(webp: &[u8], metadata: &StickerMetadata) -> Result<Vec<u8>, MetadataError> {
    let block = build_exif(metadata)?;
    webpx::embed_exif(webp, &block).map_err(mux_error)
}

/// Read the sticker metadata of a WebP, if it carries an EXIF chunk.
pub fn read_sticker_metadata(webp: &[u8]) -> Result<Option<StickerMetadata>, MetadataError> {
    match webpx::get_exif(webp).map_err(mux_error)? {
        Some(block) => parse_exif(&block).map(Some),
        None => Ok(None),
    }
}

fn mux_error(e: impl std::fmt::Debug) -> MetadataError {
    MetadataError::Mux(format!("{e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use image::{ImageFormat, Rgba, RgbaImage};

    fn tiny_webp() -> Vec<u8> {
        let img = RgbaImage::from_pixel(16, 16, Rgba([10, 200, 30, 255]));
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::WebP).unwrap();
        buf.into_inner()
    }

    #[test]
    fn round_trip() {
        let tagged = embed_metadata(tiny_webp(), &StickerMetadata::new("P", "A"));
        let meta = read_sticker_metadata(&tagged).unwrap().unwrap();
        assert_eq!(meta.pack_name, "P");
        assert_eq!(meta.publisher, "A");
        assert_eq!(meta.pack_id, PACK_ID);
        assert_eq!(meta.emojis, vec![STICKER_TAG.to_string()]);
    }

    #[test]
    fn embedding_twice_replaces() {
        let once = embed_metadata(tiny_webp(), &StickerMetadata::new("first", ""));
        let twice = embed_metadata(once, &StickerMetadata::new("second", ""));
        let meta = read_sticker_metadata(&twice).unwrap().unwrap();
        assert_eq!(meta.pack_name, "second");
    }

    #[test]
    fn garbage_is_returned_untouched() {
        let junk = b"definitely not a webp".to_vec();
        assert_eq!(embed_metadata(junk.clone(), &StickerMetadata::new("P", "A")), junk);
    }

    #[test]
    fn tagged_sticker_still_decodes() {
        let tagged = embed_metadata(tiny_webp(), &StickerMetadata::new("P", "A"));
        let img = image::load_from_memory_with_format(&tagged, ImageFormat::WebP).unwrap();
        assert_eq!((img.width(), img.height()), (16, 16));
    }

    #[test]
    fn non_webp_read_is_mux_error() {
        assert!(matches!(
            read_sticker_metadata(b"not a webp at all"),
            Err(MetadataError::Mux(_))
        ));
    }

    #[test]
    fn untagged_webp_has_no_metadata() {
        assert_eq!(read_sticker_metadata(&tiny_webp()).unwrap(), None);
    }
}
