//! In-process raster image operations on top of the `image` crate.
//!
//! Everything here is synchronous and CPU-bound; the orchestrator calls it
//! from `spawn_blocking`.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgba, RgbaImage};

use crate::catalog::ImageTarget;
use crate::error::ConversionError;
use crate::filesystem::FsUtils;

/// JPEG quality used for plain format conversions.
const DEFAULT_JPEG_QUALITY: u8 = 90;

/// An encoded image and the extension it should be saved under.
#[derive(Debug)]
pub struct EncodedImage {
    /// Encoded bytes.
    pub data: Vec<u8>,
    /// Output extension without dot.
    pub extension: &'static str,
}

/// Decode `data`, sniffing the format from content.
pub fn decode(data: &[u8], file_name: &str) -> Result<DynamicImage, ConversionError> {
    let undecodable = |detail: String| ConversionError::Undecodable {
        file_name: file_name.to_string(),
        detail,
    };
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| undecodable(e.to_string()))?
        .decode()
        .map_err(|e| undecodable(format!("not a readable image ({e})")))
}

/// Re-encode in another format. JPEG output is flattened onto white.
pub fn convert(data: &[u8], file_name: &str, target: ImageTarget) -> Result<EncodedImage, ConversionError> {
    let img = decode(data, file_name)?;
    let data = encode(&img, target.image_format(), None)?;
    Ok(EncodedImage {
        data,
        extension: target.extension(),
    })
}

/// Resize to exactly `width × height`; aspect ratio is not preserved.
pub fn resize(data: &[u8], file_name: &str, width: u32, height: u32) -> Result<EncodedImage, ConversionError> {
    let img = decode(data, file_name)?;
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    let (format, extension) = output_format_for(file_name);
    Ok(EncodedImage {
        data: encode(&resized, format, None)?,
        extension,
    })
}

/// Re-encode at `quality` in `[0, 1]` without resizing.
pub fn compress(data: &[u8], file_name: &str, quality: f32) -> Result<EncodedImage, ConversionError> {
    let img = decode(data, file_name)?;
    let (format, extension) = output_format_for(file_name);
    Ok(EncodedImage {
        data: encode(&img, format, Some(quality))?,
        extension,
    })
}

/// Convert to 8-bit luma, re-encoded in the original format.
pub fn grayscale(data: &[u8], file_name: &str) -> Result<EncodedImage, ConversionError> {
    let img = decode(data, file_name)?;
    let gray = DynamicImage::ImageLuma8(img.to_luma8());
    let (format, extension) = output_format_for(file_name);
    Ok(EncodedImage {
        data: encode(&gray, format, None)?,
        extension,
    })
}

/// Encode `img` as `format`.
///
/// `quality` only affects JPEG (mapped to 1..=100) and PNG (best
/// compression when set).
pub fn encode(img: &DynamicImage, format: ImageFormat, quality: Option<f32>) -> Result<Vec<u8>, ConversionError> {
    let mut buf = Vec::new();
    match format {
        ImageFormat::Jpeg => {
            let q = quality.map(jpeg_quality).unwrap_or(DEFAULT_JPEG_QUALITY);
            let flat = flatten_onto_white(img);
            flat.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, q))?;
        }
        ImageFormat::Png if quality.is_some() => {
            let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)?;
        }
        ImageFormat::Gif | ImageFormat::WebP => {
            // These encoders take 8-bit RGBA only.
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut Cursor::new(&mut buf), format)?;
        }
        other => {
            img.write_to(&mut Cursor::new(&mut buf), other)?;
        }
    }
    Ok(buf)
}

/// Quality factor in `[0, 1]` to JPEG quality `1..=100`.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Composite onto an opaque white background and drop alpha.
fn flatten_onto_white(img: &DynamicImage) -> DynamicImage {
    if !img.color().has_alpha() {
        return match img {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img.clone(),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        };
    }
    let mut canvas = RgbaImage::from_pixel(img.width(), img.height(), Rgba([255, 255, 255, 255]));
    imageops::overlay(&mut canvas, &img.to_rgba8(), 0, 0);
    DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8())
}

/// Encoder format and extension matching the uploaded file's extension.
/// Unknown or decode-only extensions fall back to PNG.
pub(crate) fn output_format_for(file_name: &str) -> (ImageFormat, &'static str) {
    match FsUtils::extension_lower(file_name).as_deref() {
        Some("jpg") | Some("jpeg") => (ImageFormat::Jpeg, "jpg"),
        Some("gif") => (ImageFormat::Gif, "gif"),
        Some("bmp") => (ImageFormat::Bmp, "bmp"),
        Some("webp") => (ImageFormat::WebP, "webp"),
        _ => (ImageFormat::Png, "png"),
    }
}
