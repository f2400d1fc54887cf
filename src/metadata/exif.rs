//! The sticker EXIF block: a fixed little-endian TIFF prefix with a single
//! `0x5741` entry whose value is a JSON document.
//!
//! ```text
//! offset  0  49 49 2A 00            "II*\0"  little-endian TIFF magic
//!         4  08 00 00 00            IFD offset
//!         8  01 00                  one IFD entry
//!        10  41 57                  tag 0x5741
//!        12  07 00                  type 7 (undefined)
//!        14  LL LL LL LL            JSON length (patched)
//!        18  16 00 00 00            value offset = 22
//!        22  { ...json... }
//! ```

use serde::{Deserialize, Serialize};

use super::MetadataError;

/// Prefix of every sticker EXIF block; bytes 14..18 are overwritten with the
/// payload length.
pub const EXIF_HEADER: [u8; 22] = [
    0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01, 0x00, 0x41, 0x57, 0x07, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x16, 0x00, 0x00, 0x00,
];

/// Where the little-endian JSON length lives in [`EXIF_HEADER`].
pub const LENGTH_OFFSET: usize = 14;

/// Identifier of the producing application, written as `sticker-pack-id`.
pub const PACK_ID: &str = "stickerforge";

/// Tag written as the single `emojis` entry.
pub const STICKER_TAG: &str = "stickerforge";

/// JSON payload of the EXIF block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StickerMetadata {
    #[serde(rename = "sticker-pack-id")]
    pub pack_id: String,
    #[serde(rename = "sticker-pack-name", default)]
    pub pack_name: String,
    #[serde(rename = "sticker-pack-publisher", default)]
    pub publisher: String,
    #[serde(default)]
    pub emojis: Vec<String>,
}

impl StickerMetadata {
    pub fn new(pack_name: impl Into<String>, publisher: impl Into<String>) -> Self {
        Self {
            pack_id: PACK_ID.to_string(),
            pack_name: pack_name.into(),
            publisher: publisher.into(),
            emojis: vec![STICKER_TAG.to_string()],
        }
    }
}

/// Serialize `metadata` into a complete EXIF block.
pub fn build_exif(metadata: &StickerMetadata) -> Result<Vec<u8>, MetadataError> {
    let json = serde_json::to_vec(metadata)?;
    let len = u32::try_from(json.len()).map_err(|_| MetadataError::TooLarge(json.len()))?;

    let mut block = Vec::with_capacity(EXIF_HEADER.len() + json.len());
    block.extend_from_slice(&EXIF_HEADER);
    block[LENGTH_OFFSET..LENGTH_OFFSET + 4].copy_from_slice(&len.to_le_bytes());
    block.extend_from_slice(&json);
    Ok(block)
}

/// Decode a block produced by [`build_exif`] (or a compatible writer).
pub fn parse_exif(block: &[u8]) -> Result<StickerMetadata, MetadataError> {
    if block.len() < EXIF_HEADER.len() {
        return Err(MetadataError::Malformed(format!(
            "EXIF block is {} bytes, header needs {}",
            block.len(),
            EXIF_HEADER.len()
        )));
    }
    if block[..4] != EXIF_HEADER[..4] {
        return Err(MetadataError::Malformed("missing little-endian TIFF magic".into()));
    }

    let len_bytes = [
        block[LENGTH_OFFSET],
        block[LENGTH_OFFSET + 1],
        block[LENGTH_OFFSET + 2],
        block[LENGTH_OFFSET + 3],
    ];
    let len = u32::from_le_bytes(len_bytes) as usize;
    let start = EXIF_HEADER.len();
    let json = block
        .get(start..start.saturating_add(len))
        .ok_or_else(|| {
            MetadataError::Malformed(format!(
                "declared payload of {len} bytes exceeds block ({} bytes)",
                block.len()
            ))
        })?;

    Ok(serde_json::from_slice(json)?)
}
