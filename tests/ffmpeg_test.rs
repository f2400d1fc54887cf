//! Conversions through a real ffmpeg. Skipped when ffmpeg (with libwebp) is
//! not installed.

mod common;

use std::io::Cursor;

use image::{ImageFormat, Rgb, RgbImage};
use stickerforge::{read_sticker_metadata, StickerEngine};
use stickerforge_av::SIZE_BUDGET;
use stickerforge_core::config::Config;
use stickerforge_core::{ConversionRequest, MediaInput, StickerKind};

fn engine_in(state_dir: &std::path::Path) -> StickerEngine {
    let mut config = Config::default();
    config.storage.state_dir = state_dir.to_path_buf();
    StickerEngine::from_config(&config).unwrap()
}

/// Large, poorly compressible JPEG (xorshift noise).
fn noisy_jpeg(width: u32, height: u32) -> Vec<u8> {
    let mut state: u32 = 0x9E37_79B9;
    let mut next = move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    };
    let img = RgbImage::from_fn(width, height, |_, _| {
        let v = next();
        Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Jpeg).unwrap();
    buf.into_inner()
}

#[tokio::test]
async fn large_jpeg_fits_budget_and_is_padded() {
    if !common::ffmpeg_with_libwebp() {
        eprintln!("Skipping: ffmpeg with libwebp not installed");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let source = noisy_jpeg(2000, 1250);
    assert!(source.len() > 500_000, "fixture only {} bytes", source.len());

    let report = engine_in(tmp.path())
        .produce_with_report(
            MediaInput::Bytes(source),
            &ConversionRequest::new(StickerKind::Image),
        )
        .await
        .unwrap();

    assert!(report.within_budget);
    assert!(report.data.len() as u64 <= SIZE_BUDGET);

    let img = image::load_from_memory_with_format(&report.data, ImageFormat::WebP)
        .unwrap()
        .to_rgba8();
    assert_eq!(img.dimensions(), (320, 320));
    // 2000x1250 scales to 320x200: transparent bars above and below.
    assert_eq!(img.get_pixel(160, 5)[3], 0);
    assert_eq!(img.get_pixel(160, 314)[3], 0);
    assert!(img.get_pixel(160, 160)[3] > 0);

    assert!(common::dir_is_empty(&tmp.path().join("tmp")));
}

#[tokio::test]
async fn force_square_stretches() {
    if !common::ffmpeg_with_libwebp() {
        eprintln!("Skipping: ffmpeg with libwebp not installed");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new(StickerKind::Image)
        .force_square(true)
        .pack_name("Squares");

    let sticker = engine_in(tmp.path())
        .produce_sticker(MediaInput::Bytes(common::png(300, 60)), &request)
        .await
        .unwrap();

    let img = image::load_from_memory_with_format(&sticker, ImageFormat::WebP)
        .unwrap()
        .to_rgba8();
    assert_eq!(img.dimensions(), (320, 320));
    assert!(img.get_pixel(160, 5)[3] > 0);

    let meta = read_sticker_metadata(&sticker).unwrap().unwrap();
    assert_eq!(meta.pack_name, "Squares");
}

#[tokio::test]
async fn garbage_input_fails_to_encode_without_leaks() {
    if !common::ffmpeg_with_libwebp() {
        eprintln!("Skipping: ffmpeg with libwebp not installed");
        return;
    }

    let tmp = tempfile::tempdir().unwrap();
    let err = engine_in(tmp.path())
        .produce_sticker(
            MediaInput::Bytes(b"this is not an image at all".to_vec()),
            &ConversionRequest::new(StickerKind::Image),
        )
        .await
        .unwrap_err();

    assert!(
        matches!(err, stickerforge_core::Error::EncodeFailed(_)),
        "{err}"
    );
    assert!(common::dir_is_empty(&tmp.path().join("tmp")));
}
