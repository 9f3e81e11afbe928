// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scene analysis: noise-level and impulse-noise estimation, and the decision
// table that turns them into denoising parameters.

use image::DynamicImage;
use pixelwerk_core::error::Result;
use pixelwerk_core::types::{DenoiseParams, NoiseProfile};
use tracing::{debug, instrument};

use crate::buffer::SplitImage;

/// Luma at or below this value counts as an impulse (pepper) sample.
const IMPULSE_LOW: u8 = 2;
/// Luma at or above this value counts as an impulse (salt) sample.
const IMPULSE_HIGH: u8 = 253;
/// Impulse ratio above which the median cleanup is suggested.
const IMPULSE_FIX_RATIO: f64 = 0.005;

/// Estimates noise characteristics of an image and suggests denoising
/// parameters. Stateless; every call is a pure function of the image.
#[derive(Debug, Default, Clone, Copy)]
pub struct SceneAnalyzer;

impl SceneAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Measure the Laplacian variance and the impulse ratio of the luma plane.
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    pub fn estimate_noise(&self, image: &DynamicImage) -> Result<NoiseProfile> {
        let split = SplitImage::from_dynamic(image)?;
        let (width, height) = (split.color.width() as usize, split.color.height() as usize);
        let luma = split.color.luma();

        let variance = laplacian_variance(&luma, width, height);
        let impulses = luma
            .iter()
            .filter(|&&y| y <= IMPULSE_LOW || y >= IMPULSE_HIGH)
            .count();
        let impulse_ratio = impulses as f64 / luma.len() as f64;

        debug!(variance, impulse_ratio, "noise profile estimated");
        Ok(NoiseProfile {
            variance,
            impulse_ratio,
        })
    }

    /// Suggest denoising parameters from the image's noise profile.
    ///
    /// | variance      | strength | edge preserving |
    /// |---------------|----------|-----------------|
    /// | `< 150`       | 5        | yes             |
    /// | `150 ..< 600` | 10       | yes             |
    /// | `>= 600`      | 12       | no (NL-means)   |
    ///
    /// The impulse fix is suggested whenever more than 0.5% of the samples
    /// are near pure black or white, independent of the table.
    pub fn suggest_denoise_params(&self, image: &DynamicImage) -> Result<DenoiseParams> {
        let profile = self.estimate_noise(image)?;
        Ok(suggest_from_profile(&profile))
    }
}

/// The decision table behind [`SceneAnalyzer::suggest_denoise_params`].
pub fn suggest_from_profile(profile: &NoiseProfile) -> DenoiseParams {
    let (strength, edge_preserving) = if profile.variance < 150.0 {
        (5, true)
    } else if profile.variance < 600.0 {
        (10, true)
    } else {
        (12, false)
    };
    DenoiseParams {
        strength,
        edge_preserving,
        impulse_fix: profile.impulse_ratio > IMPULSE_FIX_RATIO,
    }
}

/// Population variance of the 4-neighbour Laplacian, reflect-101 borders.
fn laplacian_variance(luma: &[u8], width: usize, height: usize) -> f64 {
    let at = |x: isize, y: isize| -> f64 {
        let xi = reflect101(x, width);
        let yi = reflect101(y, height);
        luma[yi * width + xi] as f64
    };

    let n = (width * height) as f64;
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    for y in 0..height as isize {
        for x in 0..width as isize {
            let response =
                at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4.0 * at(x, y);
            sum += response;
            sum_sq += response * response;
        }
    }
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Mirror an out-of-range index without repeating the edge sample
/// (`dcb|abcd|cba`).
fn reflect101(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }
    let last = len as isize - 1;
    let period = 2 * last;
    let mut m = i.rem_euclid(period);
    if m > last {
        m = period - m;
    }
    m as usize
}
