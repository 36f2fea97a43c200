//! Integration tests for preview decoding.
//!
//! Tests cover:
//! - Multi-page TIFF containers decoded from the first page only
//! - TIFF page 0 decoded to RGBA at its declared size and exported as PNG
//! - Deterministic preview output
//! - Pass-through of natively displayable formats
//! - Soft failures for corrupt data and unhandled extensions

mod common;

use fingerprint_access::DecodeError;
use fingerprint_access::decode::{self, RasterKind};

use common::*;

#[test]
fn test_tiff_decodes_to_declared_dimensions() -> anyhow::Result<()> {
    let bytes = create_test_tiff(40, 30);

    let decoded = decode::decode("101_1.tif", &bytes)?;
    let raster = decoded.raster.as_ref().expect("TIFF should yield a raster");

    assert_eq!((raster.width, raster.height), (40, 30));
    assert_eq!(raster.pixel_count(), 40 * 30);
    assert_eq!(raster.rgba.as_raw().len(), 40 * 30 * 4);
    assert_eq!(decoded.dimensions(), Some((40, 30)));

    // Grayscale source expands to opaque RGBA
    let px = raster.rgba.get_pixel(3, 2);
    let expected = ((3 * 7 + 2 * 3) % 256) as u8;
    assert_eq!(px.0, [expected, expected, expected, 255]);

    Ok(())
}

#[test]
fn test_multi_page_tiff_uses_first_page() -> anyhow::Result<()> {
    let bytes = create_two_page_tiff((4, 3, 10), (7, 5, 200));

    let decoded = decode::decode("capture.tif", &bytes)?;
    let raster = decoded.raster.as_ref().expect("TIFF should yield a raster");

    assert_eq!((raster.width, raster.height), (4, 3));
    assert_eq!(raster.pixel_count(), 12);
    assert!(raster.rgba.pixels().all(|px| px.0 == [10, 10, 10, 255]));

    let reloaded = image::load_from_memory(&decoded.preview.bytes)?;
    assert_eq!((reloaded.width(), reloaded.height()), (4, 3));

    Ok(())
}

#[test]
fn test_tiff_preview_is_png() -> anyhow::Result<()> {
    let bytes = create_test_tiff(16, 12);
    let decoded = decode::decode("scan.tiff", &bytes)?;

    assert_eq!(decoded.preview.mime, "image/png");
    assert_eq!(
        image::guess_format(&decoded.preview.bytes)?,
        image::ImageFormat::Png
    );
    let reloaded = image::load_from_memory(&decoded.preview.bytes)?;
    assert_eq!((reloaded.width(), reloaded.height()), (16, 12));
    assert!(decoded.preview.data_url().starts_with("data:image/png;base64,"));

    Ok(())
}

#[test]
fn test_tiff_preview_is_deterministic() -> anyhow::Result<()> {
    let bytes = create_test_tiff(64, 48);

    let first = decode::decode("a.tif", &bytes)?;
    let second = decode::decode("a.tif", &bytes)?;

    assert_eq!(first.preview, second.preview);
    assert_eq!(first.preview.data_url(), second.preview.data_url());

    Ok(())
}

#[test]
fn test_extension_case_is_ignored() -> anyhow::Result<()> {
    let bytes = create_test_tiff(8, 8);
    let decoded = decode::decode("CAPTURE.TIF", &bytes)?;
    assert!(decoded.raster.is_some());
    assert_eq!(RasterKind::from_extension("TIFF"), Some(RasterKind::MultiPage));
    Ok(())
}

#[test]
fn test_bmp_passes_through_unchanged() -> anyhow::Result<()> {
    let bytes = create_test_bmp(10, 10);

    let decoded = decode::decode("101_1.bmp", &bytes)?;

    assert!(decoded.raster.is_none());
    assert_eq!(decoded.preview.mime, "image/bmp");
    assert_eq!(decoded.preview.bytes, bytes);
    assert!(decoded.preview.data_url().starts_with("data:image/bmp;base64,"));

    Ok(())
}

#[test]
fn test_corrupt_tiff_fails() {
    let mut bytes = create_test_tiff(20, 20);
    bytes.truncate(12);

    let result = decode::decode("broken.tif", &bytes);
    assert!(matches!(result, Err(DecodeError::Corrupt(_))));

    let garbage = decode::decode("noise.tiff", b"definitely not a tiff");
    assert!(matches!(garbage, Err(DecodeError::Corrupt(_))));
}

#[test]
fn test_unhandled_extensions_fail_soft() {
    let result = decode::decode("notes.txt", b"hello");
    assert!(matches!(result, Err(DecodeError::UnsupportedExtension(ext)) if ext == "txt"));

    let result = decode::decode("fingerprint", b"hello");
    assert!(matches!(result, Err(DecodeError::MissingExtension)));
}
