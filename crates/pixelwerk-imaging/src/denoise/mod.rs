// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Denoising engine: bilateral or non-local means, with an optional median pass
// for salt-and-pepper noise.

pub mod bilateral;
pub mod nl_means;

use image::DynamicImage;
use imageproc::filter::median_filter;
use pixelwerk_core::error::Result;
use pixelwerk_core::types::DenoiseParams;
use tracing::{debug, instrument};

use crate::buffer::{ColorData, SplitImage};
use bilateral::BilateralKernel;

/// Strength above which the median cleanup uses a 5x5 window instead of 3x3.
const WIDE_MEDIAN_ABOVE: u8 = 10;

/// Applies a [`DenoiseParams`] to an image. Output has the input's size and
/// layout; alpha passes through untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct DenoiseEngine;

impl DenoiseEngine {
    pub fn new() -> Self {
        Self
    }

    /// Denoise `image`. Strength is clamped to `1..=30`; callers treat a
    /// requested strength of 0 as "do not denoise" and never get here.
    #[instrument(skip_all, fields(
        strength = params.strength,
        edge_preserving = params.edge_preserving,
        impulse_fix = params.impulse_fix,
    ))]
    pub fn denoise(&self, image: &DynamicImage, params: &DenoiseParams) -> Result<DynamicImage> {
        let split = SplitImage::from_dynamic(image)?;
        let strength = params.clamped_strength();

        let mut color = if params.edge_preserving {
            bilateral::filter(&split.color, BilateralKernel::for_strength(strength))?
        } else {
            nl_means::filter(&split.color, strength)?
        };

        if params.impulse_fix {
            let radius = if strength > WIDE_MEDIAN_ABOVE { 2 } else { 1 };
            color = median(&color, radius);
        }

        debug!("denoise complete");
        Ok(split.with_color(color).into_dynamic())
    }
}

fn median(color: &ColorData, radius: u32) -> ColorData {
    match color {
        ColorData::Gray(img) => ColorData::Gray(median_filter(img, radius, radius)),
        ColorData::Rgb(img) => ColorData::Rgb(median_filter(img, radius, radius)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};

    #[test]
    fn output_keeps_size_and_alpha() {
        let img = RgbaImage::from_fn(12, 9, |x, y| Rgba([(x * 20) as u8, (y * 25) as u8, 60, (x * 10 + y) as u8]));
        let input = DynamicImage::ImageRgba8(img.clone());
        let params = DenoiseParams {
            strength: 6,
            edge_preserving: true,
            impulse_fix: true,
        };
        let out = DenoiseEngine::new().denoise(&input, &params).unwrap();
        let out = out.as_rgba8().expect("layout preserved");
        assert_eq!(out.dimensions(), (12, 9));
        for (a, b) in out.pixels().zip(img.pixels()) {
            assert_eq!(a.0[3], b.0[3]);
        }
    }

    #[test]
    fn median_pass_removes_isolated_impulses() {
        let mut img = GrayImage::from_pixel(9, 9, Luma([120]));
        img.put_pixel(4, 4, Luma([255]));
        img.put_pixel(1, 6, Luma([0]));
        let params = DenoiseParams {
            strength: 1,
            edge_preserving: true,
            impulse_fix: true,
        };
        let out = DenoiseEngine::new()
            .denoise(&DynamicImage::ImageLuma8(img), &params)
            .unwrap();
        assert!(out.as_luma8().unwrap().pixels().all(|p| p.0[0] == 120));
    }

    #[test]
    fn nl_means_branch_preserves_flat_color() {
        let img = GrayImage::from_pixel(6, 6, Luma([42]));
        let params = DenoiseParams {
            strength: 12,
            edge_preserving: false,
            impulse_fix: false,
        };
        let out = DenoiseEngine::new()
            .denoise(&DynamicImage::ImageLuma8(img.clone()), &params)
            .unwrap();
        assert_eq!(out, DynamicImage::ImageLuma8(img));
    }

    #[test]
    fn empty_image_is_rejected() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 3));
        assert!(DenoiseEngine::new().denoise(&empty, &DenoiseParams::default()).is_err());
    }
}
