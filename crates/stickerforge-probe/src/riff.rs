//! WebP RIFF container checks
//!
//! A WebP file is `RIFF <size> WEBP` followed by chunks of
//! `<fourcc> <u32 le size> <payload> [pad]`. Only the chunk walk needed to
//! tell still and animated files apart lives here; metadata muxing goes
//! through libwebp.

use crate::error::ProbeError;

/// `RIFF` + size + `WEBP`.
pub const RIFF_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// VP8X animation flag.
pub const ANIMATION_FLAG: u8 = 0x02;

/// A borrowed chunk inside a WebP buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub fourcc: [u8; 4],
    pub payload: &'a [u8],
}

/// Whether `data` starts with a RIFF/WEBP header.
pub fn is_webp(data: &[u8]) -> bool {
    data.len() >= RIFF_HEADER_LEN && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP"
}

/// Whether `data` is an animated WebP (VP8X animation flag or an ANIM chunk).
pub fn is_animated_webp(data: &[u8]) -> bool {
    let Ok(chunks) = parse_chunks(data) else {
        return false;
    };
    chunks.iter().any(|c| {
        (&c.fourcc == b"VP8X" && c.payload.first().is_some_and(|f| f & ANIMATION_FLAG != 0))
            || &c.fourcc == b"ANIM"
    })
}

/// Split a WebP buffer into its chunks.
///
/// # Errors
///
/// Returns [`ProbeError::NotWebp`] without a RIFF/WEBP header and
/// [`ProbeError::Truncated`] if any chunk runs past the declared RIFF size
/// or the end of the buffer.
pub fn parse_chunks(data: &[u8]) -> Result<Vec<Chunk<'_>>, ProbeError> {
    if !is_webp(data) {
        return Err(ProbeError::NotWebp);
    }

    let riff_size = read_u32_le(&data[4..8]) as usize;
    let end = 8usize
        .checked_add(riff_size)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| {
            ProbeError::Truncated(format!(
                "RIFF declares {riff_size} bytes but buffer holds {}",
                data.len() - 8
            ))
        })?;

    let mut chunks = Vec::new();
    let mut offset = RIFF_HEADER_LEN;
    while offset < end {
        if end - offset < CHUNK_HEADER_LEN {
            return Err(ProbeError::Truncated(format!(
                "chunk header at offset {offset}"
            )));
        }
        let mut fourcc = [0u8; 4];
        fourcc.copy_from_slice(&data[offset..offset + 4]);
        let size = read_u32_le(&data[offset + 4..offset + 8]) as usize;

        let start = offset + CHUNK_HEADER_LEN;
        if size > end - start {
            return Err(ProbeError::Truncated(format!(
                "chunk {} at offset {offset} declares {size} bytes",
                String::from_utf8_lossy(&fourcc)
            )));
        }
        chunks.push(Chunk {
            fourcc,
            payload: &data[start..start + size],
        });

        // Odd-sized chunks carry one pad byte, which may be missing at the very end.
        offset = (start + size + (size & 1)).min(end);
    }

    Ok(chunks)
}

fn read_u32_le(b: &[u8]) -> u32 {
    u32::from_le_bytes([b[0], b[1], b[2], b[3]])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(chunks: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut out = b"RIFF\0\0\0\0WEBP".to_vec();
        for (fourcc, payload) in chunks {
            out.extend_from_slice(fourcc);
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(payload);
            if payload.len() % 2 == 1 {
                out.push(0);
            }
        }
        let size = (out.len() - 8) as u32;
        out[4..8].copy_from_slice(&size.to_le_bytes());
        out
    }

    fn still() -> Vec<u8> {
        wrap(&[(*b"VP8L", vec![0x2F, 0, 0, 0, 0, 0xAA, 0xBB])])
    }

    #[test]
    fn parses_simple_container() {
        let data = still();
        let chunks = parse_chunks(&data).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(&chunks[0].fourcc, b"VP8L");
        assert_eq!(chunks[0].payload.len(), 7);
    }

    #[test]
    fn rejects_non_webp_and_truncation() {
        assert!(matches!(parse_chunks(b"not a webp"), Err(ProbeError::NotWebp)));

        let mut data = still();
        data.truncate(data.len() - 2);
        assert!(matches!(parse_chunks(&data), Err(ProbeError::Truncated(_))));
    }

    #[test]
    fn animation_flag_or_anim_chunk() {
        let flagged = wrap(&[(*b"VP8X", vec![ANIMATION_FLAG, 0, 0, 0, 9, 0, 0, 9, 0, 0])]);
        assert!(is_animated_webp(&flagged));

        let anim_only = wrap(&[(*b"VP8X", vec![0; 10]), (*b"ANIM", vec![0; 6])]);
        assert!(is_animated_webp(&anim_only));
    }

    #[test]
    fn static_file_is_not_animated() {
        assert!(!is_animated_webp(&still()));
        assert!(!is_animated_webp(b"garbage"));
    }
}
