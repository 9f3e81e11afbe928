// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preset color grading blended with the original by an intensity percentage.

pub mod lut;

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use pixelwerk_core::error::Result;
use pixelwerk_core::types::{GradeParams, GradePreset};
use tracing::{debug, instrument};

use crate::buffer::{ColorData, SplitImage, luma_601, round_u8};
pub use lut::{ToneLut, build_lut};

/// Applies a [`GradeParams`] preset at a given strength.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorGradingEngine;

impl ColorGradingEngine {
    pub fn new() -> Self {
        Self
    }

    /// Grade `image`. The result is `round((1 - a) * original + a * graded)`
    /// with `a = intensity / 100`.
    #[instrument(skip_all, fields(preset = %params.preset, intensity = params.intensity))]
    pub fn apply_grade(&self, image: &DynamicImage, params: &GradeParams) -> Result<DynamicImage> {
        let split = SplitImage::from_dynamic(image)?;
        if params.is_identity() {
            debug!("grade is a no-op, returning copy");
            return Ok(image.clone());
        }

        let alpha = params.alpha();
        let graded = graded_copy(&split.color, params.preset);
        let blended: Vec<u8> = split
            .color
            .as_raw()
            .iter()
            .zip(graded.as_raw())
            .map(|(&o, &g)| round_u8((1.0 - alpha) * o as f32 + alpha * g as f32))
            .collect();

        let color = split.color.with_raw(blended)?;
        Ok(split.with_color(color).into_dynamic())
    }
}

/// The fully graded image, before blending.
fn graded_copy(color: &ColorData, preset: GradePreset) -> ColorData {
    match (color, build_lut(preset)) {
        (ColorData::Rgb(img), Some(lut)) => ColorData::Rgb(RgbImage::from_fn(img.width(), img.height(), |x, y| {
            let [r, g, b] = img.get_pixel(x, y).0;
            Rgb([lut[r as usize][0], lut[g as usize][1], lut[b as usize][2]])
        })),
        (ColorData::Gray(img), Some(lut)) => ColorData::Gray(GrayImage::from_fn(img.width(), img.height(), |x, y| {
            let [r, g, b] = lut[img.get_pixel(x, y).0[0] as usize];
            Luma([round_u8(luma_601(r, g, b))])
        })),
        (ColorData::Rgb(img), None) if preset == GradePreset::Grayscale => {
            ColorData::Rgb(RgbImage::from_fn(img.width(), img.height(), |x, y| {
                let [r, g, b] = img.get_pixel(x, y).0;
                let l = round_u8(luma_601(r, g, b));
                Rgb([l, l, l])
            }))
        }
        _ => color.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn swatch() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(6, 4, |x, y| Rgb([(x * 40) as u8, (y * 60) as u8, 128])))
    }

    fn params(preset: GradePreset, intensity: f32) -> GradeParams {
        GradeParams { preset, intensity }
    }

    #[test]
    fn none_preset_is_byte_identical() {
        let input = swatch();
        let out = ColorGradingEngine::new()
            .apply_grade(&input, &params(GradePreset::None, 0.0))
            .unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn zero_intensity_returns_original_for_any_preset() {
        let input = swatch();
        let engine = ColorGradingEngine::new();
        for preset in GradePreset::ALL {
            assert_eq!(engine.apply_grade(&input, &params(preset, 0.0)).unwrap(), input);
        }
    }

    #[test]
    fn full_intensity_is_the_lut_output() {
        let input = swatch();
        let out = ColorGradingEngine::new()
            .apply_grade(&input, &params(GradePreset::Warm, 100.0))
            .unwrap();
        let lut = build_lut(GradePreset::Warm).unwrap();
        let (src, out) = (input.to_rgb8(), out.to_rgb8());
        for (o, g) in src.pixels().zip(out.pixels()) {
            assert_eq!(g.0, [lut[o.0[0] as usize][0], lut[o.0[1] as usize][1], lut[o.0[2] as usize][2]]);
        }
    }

    #[test]
    fn half_intensity_rounds_half_up() {
        let input = DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([100, 100, 101])));
        let out = ColorGradingEngine::new()
            .apply_grade(&input, &params(GradePreset::Grayscale, 50.0))
            .unwrap();
        // Luma rounds to 100; blue blends 101 and 100 to 100.5, which rounds up.
        assert_eq!(out.to_rgb8().get_pixel(0, 0).0, [100, 100, 101]);
    }

    #[test]
    fn grayscale_broadcasts_luma() {
        let input = DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([255, 0, 0])));
        let out = ColorGradingEngine::new()
            .apply_grade(&input, &params(GradePreset::Grayscale, 100.0))
            .unwrap();
        assert_eq!(out.to_rgb8().get_pixel(1, 1).0, [76, 76, 76]);
    }

    #[test]
    fn intensity_is_clamped() {
        let input = swatch();
        let engine = ColorGradingEngine::new();
        assert_eq!(
            engine.apply_grade(&input, &params(GradePreset::Sepia, 250.0)).unwrap(),
            engine.apply_grade(&input, &params(GradePreset::Sepia, 100.0)).unwrap()
        );
    }

    #[test]
    fn gray_input_stays_single_channel() {
        let input = DynamicImage::ImageLuma8(GrayImage::from_pixel(3, 3, Luma([100])));
        let out = ColorGradingEngine::new()
            .apply_grade(&input, &params(GradePreset::Sepia, 100.0))
            .unwrap();
        let gray = out.as_luma8().expect("still gray");
        // Sepia(100) = (135, 120, 93); BT.601 luma rounds to 121.
        assert_eq!(gray.get_pixel(0, 0).0[0], 121);
    }

    #[test]
    fn alpha_is_preserved() {
        let img = RgbaImage::from_fn(3, 3, |x, y| Rgba([90, 90, 90, (x * 50 + y) as u8]));
        let out = ColorGradingEngine::new()
            .apply_grade(&DynamicImage::ImageRgba8(img.clone()), &params(GradePreset::Cool, 70.0))
            .unwrap();
        let out = out.as_rgba8().unwrap();
        assert!(out.pixels().zip(img.pixels()).all(|(a, b)| a.0[3] == b.0[3]));
    }
}
