// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use imageproc::filter::gaussian_blur_f32;
use pixelwerk_core::error::Result;

use crate::buffer::{plane_image, to_u8};

/// Unsharp-mask settings derived from the detail level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnsharpMask {
    pub amount: f32,
    pub sigma: f32,
}

impl UnsharpMask {
    pub fn for_detail(detail: f32) -> Self {
        Self {
            amount: 0.6 * detail + 0.1,
            sigma: 1.0 + 10.0 * detail,
        }
    }

    /// `c + amount * (c - blur(c))`, clamped and truncated per sample.
    pub fn apply(&self, plane: &[f32], width: u32, height: u32) -> Result<Vec<f32>> {
        let blurred = gaussian_blur_f32(&plane_image(width, height, plane.to_vec())?, self.sigma);
        Ok(plane
            .iter()
            .zip(blurred.as_raw())
            .map(|(&c, &b)| to_u8(c + self.amount * (c - b)) as f32)
            .collect())
    }
}
