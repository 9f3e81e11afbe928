// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edge-preserving bilateral filter over interleaved 8-bit samples.

use pixelwerk_core::error::Result;

use crate::buffer::{ColorData, round_u8};

/// Spatial sigma, fixed regardless of strength.
pub const SIGMA_SPACE: f32 = 75.0;

/// Filter geometry derived from a (clamped) strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BilateralKernel {
    /// Window diameter; the effective radius is `diameter / 2`.
    pub diameter: u32,
    pub sigma_color: f32,
    pub sigma_space: f32,
}

impl BilateralKernel {
    /// Diameter and color tolerance both grow with strength.
    pub fn for_strength(strength: u8) -> Self {
        let strength = strength as u32;
        Self {
            diameter: strength / 2 + 1,
            sigma_color: strength as f32 * 5.0,
            sigma_space: SIGMA_SPACE,
        }
    }

    pub fn radius(&self) -> i64 {
        (self.diameter / 2) as i64
    }
}

/// Apply the bilateral filter. The range distance is the L1 distance across
/// the color channels; neighbours outside the image are clamped to the edge.
pub fn filter(color: &ColorData, kernel: BilateralKernel) -> Result<ColorData> {
    let radius = kernel.radius();
    if radius == 0 {
        return Ok(color.clone());
    }

    let (width, height) = (color.width() as i64, color.height() as i64);
    let channels = color.channels();
    let src = color.as_raw();

    // Circular window with precomputed spatial weights.
    let space_coeff = -0.5 / (kernel.sigma_space * kernel.sigma_space);
    let mut offsets: Vec<(i64, i64, f32)> = Vec::new();
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let r2 = (dx * dx + dy * dy) as f32;
            if r2.sqrt() > radius as f32 {
                continue;
            }
            offsets.push((dx, dy, (r2 * space_coeff).exp()));
        }
    }

    // Range weights indexed by the integer L1 distance.
    let color_coeff = -0.5 / (kernel.sigma_color * kernel.sigma_color);
    let color_lut: Vec<f32> = (0..=255 * channels)
        .map(|d| ((d * d) as f32 * color_coeff).exp())
        .collect();

    let mut out = vec![0u8; src.len()];
    let mut acc = vec![0f32; channels];

    for y in 0..height {
        for x in 0..width {
            let center = ((y * width + x) as usize) * channels;
            acc.iter_mut().for_each(|a| *a = 0.0);
            let mut weight_sum = 0.0f32;

            for &(dx, dy, space_w) in &offsets {
                let nx = (x + dx).clamp(0, width - 1);
                let ny = (y + dy).clamp(0, height - 1);
                let idx = ((ny * width + nx) as usize) * channels;

                let distance: usize = (0..channels)
                    .map(|c| (src[idx + c] as i32 - src[center + c] as i32).unsigned_abs() as usize)
                    .sum();
                let w = space_w * color_lut[distance];

                for c in 0..channels {
                    acc[c] += w * src[idx + c] as f32;
                }
                weight_sum += w;
            }

            for c in 0..channels {
                out[center + c] = round_u8(acc[c] / weight_sum);
            }
        }
    }

    color.with_raw(out)
}
