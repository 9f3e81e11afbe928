// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-scale retinex.

use imageproc::filter::gaussian_blur_f32;
use pixelwerk_core::error::Result;

use crate::buffer::plane_image;

/// Offset keeping the logarithms finite on black samples.
pub const EPS: f32 = 1e-6;
/// Surround sigma at `detail = 0`.
pub const SIGMA_MAX: f32 = 80.0;
/// Surround sigma at `detail = 1`.
pub const SIGMA_MIN: f32 = 10.0;
/// Responses spanning less than this are treated as constant.
const FLAT_RANGE: f32 = 1e-4;

/// Surround sigma for a detail level in `0..=1`. More detail, tighter surround.
pub fn surround_sigma(detail: f32) -> f32 {
    SIGMA_MAX - (SIGMA_MAX - SIGMA_MIN) * detail
}

/// `ln(c + eps) - ln(gauss(c + eps) + eps)` for one plane, min-max normalised
/// to `0..=255` and truncated to whole levels. A constant response maps to 0.
pub fn single_scale(plane: &[f32], width: u32, height: u32, sigma: f32) -> Result<Vec<f32>> {
    let lifted: Vec<f32> = plane.iter().map(|&c| c + EPS).collect();
    let surround = gaussian_blur_f32(&plane_image(width, height, lifted.clone())?, sigma);

    let response: Vec<f32> = lifted
        .iter()
        .zip(surround.as_raw())
        .map(|(&c, &s)| c.ln() - (s.max(0.0) + EPS).ln())
        .collect();

    let (min, max) = response
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !range.is_finite() || range <= FLAT_RANGE {
        return Ok(vec![0.0; response.len()]);
    }

    Ok(response
        .iter()
        .map(|&v| ((v - min) / range * 255.0).clamp(0.0, 255.0).trunc())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigma_tracks_detail() {
        assert_eq!(surround_sigma(0.0), 80.0);
        assert_eq!(surround_sigma(1.0), 10.0);
        assert!(surround_sigma(0.3) < surround_sigma(0.2));
    }

    #[test]
    fn constant_plane_normalises_to_zero() {
        let plane = vec![77.0; 16 * 16];
        let out = single_scale(&plane, 16, 16, 10.0).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn output_spans_full_range() {
        let plane: Vec<f32> = (0..24 * 24).map(|i| ((i * 37) % 200) as f32 + 5.0).collect();
        let out = single_scale(&plane, 24, 24, 10.0).unwrap();
        let max = out.iter().cloned().fold(0.0f32, f32::max);
        let min = out.iter().cloned().fold(255.0f32, f32::min);
        assert_eq!(min, 0.0);
        assert_eq!(max, 255.0);
        assert!(out.iter().all(|v| v.fract() == 0.0));
    }
}
