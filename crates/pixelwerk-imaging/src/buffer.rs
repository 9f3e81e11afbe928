// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// 8-bit buffer model shared by every engine.
//
// Engines accept `Luma8`, `LumaA8`, `Rgb8` and `Rgba8` images. Channel order is
// R, G, B(, A). The alpha plane is split off before processing and re-attached
// untouched afterwards, so engines only ever see the color samples.

use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageBuffer, Luma, LumaA, RgbImage, Rgba, RgbaImage};
use pixelwerk_core::error::{PixelwerkError, Result};

/// BT.601 luma weights (R, G, B).
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// A single-channel floating-point plane, as consumed by
/// `imageproc::filter::gaussian_blur_f32`.
pub type PlaneImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// BT.601 luma of one RGB sample, unrounded.
#[inline]
pub fn luma_601(r: u8, g: u8, b: u8) -> f32 {
    LUMA_WEIGHTS[0] * r as f32 + LUMA_WEIGHTS[1] * g as f32 + LUMA_WEIGHTS[2] * b as f32
}

/// Clamp to the displayable range and truncate to 8 bits.
#[inline]
pub fn to_u8(value: f32) -> u8 {
    if value.is_nan() {
        0
    } else {
        value.clamp(0.0, 255.0) as u8
    }
}

/// Clamp to the displayable range and round to the nearest 8-bit level.
/// Used where a filter averages samples, so flat regions stay exact.
#[inline]
pub fn round_u8(value: f32) -> u8 {
    to_u8(value.round())
}

/// The color samples of an 8-bit image.
#[derive(Debug, Clone, PartialEq)]
pub enum ColorData {
    Gray(GrayImage),
    Rgb(RgbImage),
}

impl ColorData {
    pub fn width(&self) -> u32 {
        match self {
            Self::Gray(img) => img.width(),
            Self::Rgb(img) => img.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Gray(img) => img.height(),
            Self::Rgb(img) => img.height(),
        }
    }

    /// Number of interleaved color channels (1 or 3).
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray(_) => 1,
            Self::Rgb(_) => 3,
        }
    }

    /// Interleaved samples, row-major.
    pub fn as_raw(&self) -> &[u8] {
        match self {
            Self::Gray(img) => img.as_raw(),
            Self::Rgb(img) => img.as_raw(),
        }
    }

    /// Rebuild from interleaved samples with the same layout as `self`.
    pub fn with_raw(&self, raw: Vec<u8>) -> Result<Self> {
        let (w, h) = (self.width(), self.height());
        let rebuilt = match self {
            Self::Gray(_) => GrayImage::from_raw(w, h, raw).map(Self::Gray),
            Self::Rgb(_) => RgbImage::from_raw(w, h, raw).map(Self::Rgb),
        };
        rebuilt.ok_or_else(|| {
            PixelwerkError::InvalidInput(format!("sample buffer does not match {w}x{h}"))
        })
    }

    /// Rebuild from planar floating-point channels, clamping and truncating.
    pub fn with_planes(&self, planes: &[Vec<f32>]) -> Result<Self> {
        let channels = self.channels();
        if planes.len() != channels {
            return Err(PixelwerkError::InvalidInput(format!(
                "expected {channels} planes, got {}",
                planes.len()
            )));
        }
        let len = self.as_raw().len() / channels;
        let mut raw = Vec::with_capacity(len * channels);
        for i in 0..len {
            for plane in planes {
                raw.push(to_u8(plane[i]));
            }
        }
        self.with_raw(raw)
    }

    /// One channel as a floating-point plane.
    pub fn plane(&self, channel: usize) -> Vec<f32> {
        let channels = self.channels();
        self.as_raw()
            .iter()
            .skip(channel)
            .step_by(channels)
            .map(|&v| v as f32)
            .collect()
    }

    /// All channels as floating-point planes.
    pub fn planes(&self) -> Vec<Vec<f32>> {
        (0..self.channels()).map(|c| self.plane(c)).collect()
    }

    /// 8-bit BT.601 luma plane, rounded to the nearest level. Gray data is
    /// returned as is.
    pub fn luma(&self) -> Vec<u8> {
        match self {
            Self::Gray(img) => img.as_raw().clone(),
            Self::Rgb(img) => img
                .pixels()
                .map(|p| round_u8(luma_601(p.0[0], p.0[1], p.0[2])))
                .collect(),
        }
    }
}

/// An 8-bit image split into color samples and an optional alpha plane.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitImage {
    pub color: ColorData,
    pub alpha: Option<GrayImage>,
}

impl SplitImage {
    /// Split a validated 8-bit image. Fails with `InvalidInput` for empty or
    /// non-8-bit images.
    pub fn from_dynamic(image: &DynamicImage) -> Result<Self> {
        ensure_processable(image)?;
        let split = match image {
            DynamicImage::ImageLuma8(img) => Self {
                color: ColorData::Gray(img.clone()),
                alpha: None,
            },
            DynamicImage::ImageRgb8(img) => Self {
                color: ColorData::Rgb(img.clone()),
                alpha: None,
            },
            DynamicImage::ImageLumaA8(img) => {
                let gray = GrayImage::from_fn(img.width(), img.height(), |x, y| {
                    Luma([img.get_pixel(x, y).0[0]])
                });
                let alpha = GrayImage::from_fn(img.width(), img.height(), |x, y| {
                    Luma([img.get_pixel(x, y).0[1]])
                });
                Self {
                    color: ColorData::Gray(gray),
                    alpha: Some(alpha),
                }
            }
            DynamicImage::ImageRgba8(img) => {
                let rgb = RgbImage::from_fn(img.width(), img.height(), |x, y| {
                    let [r, g, b, _] = img.get_pixel(x, y).0;
                    image::Rgb([r, g, b])
                });
                let alpha = GrayImage::from_fn(img.width(), img.height(), |x, y| {
                    Luma([img.get_pixel(x, y).0[3]])
                });
                Self {
                    color: ColorData::Rgb(rgb),
                    alpha: Some(alpha),
                }
            }
            other => {
                return Err(PixelwerkError::InvalidInput(format!(
                    "unsupported pixel layout {:?}",
                    other.color()
                )));
            }
        };
        Ok(split)
    }

    /// Replace the color samples, keeping the alpha plane.
    pub fn with_color(self, color: ColorData) -> Self {
        Self {
            color,
            alpha: self.alpha,
        }
    }

    /// Re-attach alpha (if any) and return the original layout.
    pub fn into_dynamic(self) -> DynamicImage {
        match (self.color, self.alpha) {
            (ColorData::Gray(gray), None) => DynamicImage::ImageLuma8(gray),
            (ColorData::Rgb(rgb), None) => DynamicImage::ImageRgb8(rgb),
            (ColorData::Gray(gray), Some(alpha)) => {
                let merged = GrayAlphaImage::from_fn(gray.width(), gray.height(), |x, y| {
                    LumaA([gray.get_pixel(x, y).0[0], alpha.get_pixel(x, y).0[0]])
                });
                DynamicImage::ImageLumaA8(merged)
            }
            (ColorData::Rgb(rgb), Some(alpha)) => {
                let merged = RgbaImage::from_fn(rgb.width(), rgb.height(), |x, y| {
                    let [r, g, b] = rgb.get_pixel(x, y).0;
                    Rgba([r, g, b, alpha.get_pixel(x, y).0[0]])
                });
                DynamicImage::ImageRgba8(merged)
            }
        }
    }
}

/// Check that an image is non-empty and uses one of the 8-bit layouts.
pub fn ensure_processable(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(PixelwerkError::InvalidInput("image is empty".into()));
    }
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => Ok(()),
        other => Err(PixelwerkError::InvalidInput(format!(
            "expected an 8-bit image, got {:?}",
            other.color()
        ))),
    }
}

/// Narrow any decoded image to the closest 8-bit layout.
pub fn to_8bit(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageLuma8(_)
        | DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageRgb8(_)
        | DynamicImage::ImageRgba8(_) => image,
        DynamicImage::ImageLuma16(_) => DynamicImage::ImageLuma8(image.to_luma8()),
        DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLumaA8(image.to_luma_alpha8()),
        other if other.color().has_alpha() => DynamicImage::ImageRgba8(other.to_rgba8()),
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Wrap a plane for the `imageproc` filters.
pub fn plane_image(width: u32, height: u32, plane: Vec<f32>) -> Result<PlaneImage> {
    PlaneImage::from_raw(width, height, plane)
        .ok_or_else(|| PixelwerkError::InvalidInput(format!("plane does not match {width}x{height}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba_split_and_merge_round_trip() {
        let img = RgbaImage::from_fn(4, 3, |x, y| Rgba([x as u8 * 10, y as u8 * 20, 7, 100 + x as u8]));
        let dynamic = DynamicImage::ImageRgba8(img);
        let split = SplitImage::from_dynamic(&dynamic).expect("split");
        assert_eq!(split.color.channels(), 3);
        assert!(split.alpha.is_some());
        assert_eq!(split.into_dynamic(), dynamic);
    }

    #[test]
    fn gray_alpha_keeps_layout() {
        let img = GrayAlphaImage::from_pixel(2, 2, LumaA([50, 200]));
        let dynamic = DynamicImage::ImageLumaA8(img);
        let split = SplitImage::from_dynamic(&dynamic).expect("split");
        assert_eq!(split.color.channels(), 1);
        assert_eq!(split.into_dynamic(), dynamic);
    }

    #[test]
    fn empty_and_16bit_images_are_rejected() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 5));
        assert!(matches!(ensure_processable(&empty), Err(PixelwerkError::InvalidInput(_))));

        let deep = DynamicImage::ImageRgb16(ImageBuffer::new(2, 2));
        assert!(matches!(SplitImage::from_dynamic(&deep), Err(PixelwerkError::InvalidInput(_))));
        assert!(ensure_processable(&to_8bit(deep)).is_ok());
    }

    #[test]
    fn planes_truncate_and_clamp() {
        let data = ColorData::Gray(GrayImage::new(3, 1));
        let rebuilt = data.with_planes(&[vec![-4.0, 12.9, 300.0]]).expect("planes");
        assert_eq!(rebuilt.as_raw(), &[0, 12, 255]);
    }

    #[test]
    fn luma_uses_bt601_weights() {
        let data = ColorData::Rgb(RgbImage::from_pixel(1, 1, image::Rgb([255, 0, 0])));
        assert_eq!(data.luma(), vec![76]);
        assert!((luma_601(255, 0, 0) - 76.245).abs() < 1e-3);
    }

    #[test]
    fn luma_rounds_to_nearest_level() {
        // 2.402 and 2.744 land on either side of the rounding boundary.
        let data = ColorData::Rgb(RgbImage::from_fn(2, 1, |x, _| {
            if x == 0 { image::Rgb([1, 3, 3]) } else { image::Rgb([1, 3, 6]) }
        }));
        assert_eq!(data.luma(), vec![2, 3]);
    }
}
