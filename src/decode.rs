//! Raster decoding for fingerprint previews.
//!
//! Formats a display surface can show directly are passed through untouched.
//! Multi-page TIFF captures are decoded (page 0 only) to RGBA8 and re-encoded
//! as PNG. The preview is for the operator only; the original bytes are what
//! gets submitted.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::tiff::TiffDecoder;
use image::{DynamicImage, ImageDecoder, ImageFormat, RgbaImage};
use tracing::debug;

use crate::error::DecodeError;

/// Extensions offered by the file picker.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["bmp", "tif", "tiff"];

/// How a file's preview is produced, chosen from its declared extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterKind {
    /// Shown as-is, with the given MIME type
    Native(&'static str),
    /// Tag-based multi-page raster (TIFF)
    MultiPage,
}

impl RasterKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "bmp" => Some(Self::Native("image/bmp")),
            "png" => Some(Self::Native("image/png")),
            "jpg" | "jpeg" => Some(Self::Native("image/jpeg")),
            "gif" => Some(Self::Native("image/gif")),
            "tif" | "tiff" => Some(Self::MultiPage),
            _ => None,
        }
    }
}

/// Lower-cased extension of a file name, if it has one.
pub fn extension_of(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// A displayable encoding of the selected image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl Preview {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

/// Page 0 of a multi-page raster, decoded to RGBA8.
#[derive(Debug, Clone)]
pub struct DecodedRaster {
    pub width: u32,
    pub height: u32,
    pub rgba: RgbaImage,
}

impl DecodedRaster {
    pub fn pixel_count(&self) -> usize {
        (self.rgba.as_raw().len()) / 4
    }
}

/// Output of decoding one file.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub preview: Preview,
    /// Only present for multi-page rasters
    pub raster: Option<DecodedRaster>,
}

impl DecodedImage {
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.raster.as_ref().map(|r| (r.width, r.height))
    }
}

/// Produce a preview for `bytes`, choosing the strategy from `file_name`'s extension.
pub fn decode(file_name: &str, bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let ext = extension_of(file_name).ok_or(DecodeError::MissingExtension)?;
    let kind = RasterKind::from_extension(&ext)
        .ok_or_else(|| DecodeError::UnsupportedExtension(ext.clone()))?;

    match kind {
        RasterKind::Native(mime) => {
            debug!(file_name, mime, "passing image through unchanged");
            Ok(DecodedImage {
                preview: Preview {
                    mime,
                    bytes: bytes.to_vec(),
                },
                raster: None,
            })
        }
        RasterKind::MultiPage => {
            let raster = decode_first_page(bytes)?;
            let preview = encode_png(&raster)?;
            debug!(
                file_name,
                width = raster.width,
                height = raster.height,
                preview_len = preview.bytes.len(),
                "decoded multi-page raster"
            );
            Ok(DecodedImage {
                preview,
                raster: Some(raster),
            })
        }
    }
}

/// Read the first image directory and decode it to RGBA8 at its declared size.
///
/// Strip data that does not cover the declared width and height is rejected
/// by the TIFF decoder and surfaces as [`DecodeError::Corrupt`].
pub fn decode_first_page(bytes: &[u8]) -> Result<DecodedRaster, DecodeError> {
    let decoder = TiffDecoder::new(Cursor::new(bytes))?;
    let (width, height) = decoder.dimensions();
    let rgba = DynamicImage::from_decoder(decoder)?.to_rgba8();

    Ok(DecodedRaster {
        width,
        height,
        rgba,
    })
}

fn encode_png(raster: &DecodedRaster) -> Result<Preview, DecodeError> {
    let mut out = Cursor::new(Vec::new());
    raster
        .rgba
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| DecodeError::Export(e.to_string()))?;
    Ok(Preview {
        mime: "image/png",
        bytes: out.into_inner(),
    })
}
