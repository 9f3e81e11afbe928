// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — load, flip, and export. Everything it hands out has been
// narrowed to one of the 8-bit layouts the engines accept.

use std::path::Path;

use image::{DynamicImage, ImageFormat};
use pixelwerk_core::error::{PixelwerkError, Result};
use pixelwerk_core::types::FlipAxis;
use tracing::{debug, info, instrument};

use crate::buffer::to_8bit;

/// Formats the editor can write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Jpeg,
    Png,
    Bmp,
    WebP,
}

impl ExportFormat {
    /// Infer the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            "webp" => Ok(Self::WebP),
            other => Err(PixelwerkError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Infer the format from a path's extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let ext = path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| PixelwerkError::UnsupportedFormat(path.as_ref().display().to_string()))?;
        Self::from_extension(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Bmp => "bmp",
            Self::WebP => "webp",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Bmp => ImageFormat::Bmp,
            Self::WebP => ImageFormat::WebP,
        }
    }
}

/// Owns one in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// chain:
///
/// ```ignore
/// let bytes = ImageProcessor::open("photo.jpg")?
///     .flip(FlipAxis::Horizontal)
///     .encode(ExportFormat::Png, 95)?;
/// ```
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let img = image::open(path.as_ref()).map_err(|err| {
            PixelwerkError::ImageError(format!(
                "failed to open {}: {}",
                path.as_ref().display(),
                err
            ))
        })?;
        info!(width = img.width(), height = img.height(), "Image loaded");
        Ok(Self::from_dynamic(img))
    }

    /// Create a processor from raw encoded bytes (JPEG, PNG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let img = image::load_from_memory(data)
            .map_err(|err| PixelwerkError::ImageError(format!("failed to decode image: {}", err)))?;
        debug!(width = img.width(), height = img.height(), "Image decoded from bytes");
        Ok(Self::from_dynamic(img))
    }

    /// Wrap an already-decoded image, narrowing it to 8 bits.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image: to_8bit(image),
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Mirror the image. Layout and alpha are unchanged.
    #[instrument(skip(self))]
    pub fn flip(self, axis: FlipAxis) -> Self {
        info!(?axis, "Flipping image");
        let image = match axis {
            FlipAxis::Horizontal => self.image.fliph(),
            FlipAxis::Vertical => self.image.flipv(),
        };
        Self { image }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the image. JPEG drops any alpha channel and uses `jpeg_quality`
    /// (clamped to 1-100); the other formats keep the layout as is.
    pub fn encode(&self, format: ExportFormat, jpeg_quality: u8) -> Result<Vec<u8>> {
        match format {
            ExportFormat::Jpeg => {
                let mut buffer = Vec::new();
                let rgb = self.image.to_rgb8();
                let encoder =
                    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, jpeg_quality.clamp(1, 100));
                rgb.write_with_encoder(encoder)
                    .map_err(|err| PixelwerkError::ImageError(format!("JPEG encoding failed: {}", err)))?;
                Ok(buffer)
            }
            ExportFormat::WebP => {
                // The WebP encoder only takes RGB8/RGBA8.
                let image = if self.image.color().has_alpha() {
                    DynamicImage::ImageRgba8(self.image.to_rgba8())
                } else {
                    DynamicImage::ImageRgb8(self.image.to_rgb8())
                };
                encode_to_format(&image, format.image_format())
            }
            other => encode_to_format(&self.image, other.image_format()),
        }
    }

    /// Write the image to a file. The format is inferred from the extension.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>, jpeg_quality: u8) -> Result<()> {
        let format = ExportFormat::from_path(path.as_ref())?;
        let bytes = self.encode(format, jpeg_quality)?;
        std::fs::write(path.as_ref(), &bytes)?;
        info!(bytes = bytes.len(), format = format.extension(), "Image saved");
        Ok(())
    }
}

/// Encode a `DynamicImage` into the specified format, returning the raw bytes.
fn encode_to_format(image: &DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    image
        .write_to(&mut cursor, format)
        .map_err(|err| PixelwerkError::ImageError(format!("image encoding failed: {}", err)))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage, Rgba, RgbaImage};

    fn rgba_sample() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8 * 50, y as u8 * 80, 10, 128])))
    }

    #[test]
    fn extension_inference() {
        assert_eq!(ExportFormat::from_path("a/b.JPEG").unwrap(), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path("x.webp").unwrap(), ExportFormat::WebP);
        assert!(matches!(
            ExportFormat::from_path("scan.tiff"),
            Err(PixelwerkError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            ExportFormat::from_path("no_extension"),
            Err(PixelwerkError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn jpeg_export_of_rgba_drops_alpha() {
        let bytes = ImageProcessor::from_dynamic(rgba_sample())
            .encode(ExportFormat::Jpeg, 95)
            .unwrap();
        let decoded = ImageProcessor::from_bytes(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
        assert!(!decoded.as_dynamic().color().has_alpha());
    }

    #[test]
    fn png_round_trip_is_lossless() {
        let original = rgba_sample();
        let bytes = ImageProcessor::from_dynamic(original.clone())
            .encode(ExportFormat::Png, 95)
            .unwrap();
        assert_eq!(ImageProcessor::from_bytes(&bytes).unwrap().into_dynamic(), original);
    }

    #[test]
    fn flip_mirrors_pixels() {
        let img = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 0]));
        let flipped = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .flip(FlipAxis::Horizontal)
            .into_dynamic()
            .to_rgb8();
        assert_eq!(flipped.get_pixel(0, 0).0, [2, 0, 0]);

        let img = RgbImage::from_fn(3, 2, |x, y| Rgb([x as u8, y as u8, 0]));
        let flipped = ImageProcessor::from_dynamic(DynamicImage::ImageRgb8(img))
            .flip(FlipAxis::Vertical)
            .into_dynamic()
            .to_rgb8();
        assert_eq!(flipped.get_pixel(0, 0).0, [0, 1, 0]);
    }

    #[test]
    fn sixteen_bit_input_is_narrowed() {
        let deep = DynamicImage::ImageRgb16(ImageBuffer::from_pixel(2, 2, Rgb([65535u16, 0, 0])));
        let processor = ImageProcessor::from_dynamic(deep);
        assert_eq!(processor.as_dynamic().to_rgb8().get_pixel(0, 0).0, [255, 0, 0]);
        assert!(processor.as_dynamic().as_rgb8().is_some());
    }

    #[test]
    fn save_and_open_via_tempfile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.bmp");
        ImageProcessor::from_dynamic(rgba_sample()).save(&path, 90).unwrap();
        let reopened = ImageProcessor::open(&path).unwrap();
        assert_eq!((reopened.width(), reopened.height()), (5, 3));
    }

    #[test]
    fn corrupt_bytes_are_an_image_error() {
        assert!(matches!(
            ImageProcessor::from_bytes(b"definitely not an image"),
            Err(PixelwerkError::ImageError(_))
        ));
    }
}
