// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Low-light enhancement: CLAHE on luma, single-scale retinex per channel, and
// an adaptive blend of the two with a little unsharp detail and a little of
// the original.

pub mod clahe;
pub mod retinex;
pub mod sharpen;

use image::DynamicImage;
use pixelwerk_core::error::Result;
use pixelwerk_core::types::EnhanceParams;
use tracing::{debug, instrument};

use crate::buffer::{ColorData, LUMA_WEIGHTS, SplitImage, round_u8};
use sharpen::UnsharpMask;

/// Share of the sharpened CLAHE image in the blend.
const SHARPEN_SHARE: f32 = 0.15;
/// Share of the untouched original in the blend.
const ORIGINAL_SHARE: f32 = 0.05;

// BT.601 YCrCb chroma scales and their inverses.
const CR_SCALE: f32 = 0.713;
const CB_SCALE: f32 = 0.564;
const R_FROM_CR: f32 = 1.403;
const G_FROM_CR: f32 = 0.714;
const G_FROM_CB: f32 = 0.344;
const B_FROM_CB: f32 = 1.773;

/// Brightens and clarifies under-exposed images.
#[derive(Debug, Default, Clone, Copy)]
pub struct LowLightEnhancer;

impl LowLightEnhancer {
    pub fn new() -> Self {
        Self
    }

    /// Enhance `image`. Parameters are clamped into range first; an
    /// intensity of zero returns the input unchanged.
    #[instrument(skip_all, fields(
        intensity = params.intensity,
        detail = params.detail,
        clip_limit = params.clip_limit,
    ))]
    pub fn enhance(&self, image: &DynamicImage, params: &EnhanceParams) -> Result<DynamicImage> {
        let split = SplitImage::from_dynamic(image)?;
        let params = params.clamped();
        if params.intensity <= f32::EPSILON {
            debug!("intensity is zero, returning input");
            return Ok(image.clone());
        }

        let (width, height) = (split.color.width(), split.color.height());
        let original = split.color.planes();

        let equalized = clahe_color(&split.color, params.clip_limit)?;
        let equalized_planes = equalized.planes();

        let sigma = retinex::surround_sigma(params.detail);
        let unsharp = UnsharpMask::for_detail(params.detail);
        let i = params.intensity;

        let mut blended = Vec::with_capacity(original.len());
        for (orig, eq) in original.iter().zip(&equalized_planes) {
            let ssr = retinex::single_scale(orig, width, height, sigma)?;
            let sharp = unsharp.apply(eq, width, height)?;
            let plane: Vec<f32> = (0..orig.len())
                .map(|k| {
                    let mix = (1.0 - i) * eq[k] + i * ssr[k];
                    let mix = (1.0 - SHARPEN_SHARE) * mix + SHARPEN_SHARE * sharp[k];
                    (1.0 - ORIGINAL_SHARE) * mix + ORIGINAL_SHARE * orig[k]
                })
                .collect();
            blended.push(plane);
        }

        let color = split.color.with_planes(&blended)?;
        debug!("enhance complete");
        Ok(split.with_color(color).into_dynamic())
    }
}

/// CLAHE on the luma of color data. RGB goes through YCrCb and back; gray is
/// equalised directly.
fn clahe_color(color: &ColorData, clip_limit: f32) -> Result<ColorData> {
    let (width, height) = (color.width() as usize, color.height() as usize);
    match color {
        ColorData::Gray(img) => {
            let out = clahe::equalize(img.as_raw(), width, height, clip_limit);
            color.with_raw(out)
        }
        ColorData::Rgb(img) => {
            let raw = img.as_raw();
            let mut y_plane = Vec::with_capacity(width * height);
            let mut chroma = Vec::with_capacity(width * height);
            for px in raw.chunks_exact(3) {
                let (r, g, b) = (px[0] as f32, px[1] as f32, px[2] as f32);
                let y = LUMA_WEIGHTS[0] * r + LUMA_WEIGHTS[1] * g + LUMA_WEIGHTS[2] * b;
                y_plane.push(round_u8(y));
                chroma.push(((r - y) * CR_SCALE, (b - y) * CB_SCALE));
            }

            let y_eq = clahe::equalize(&y_plane, width, height, clip_limit);

            let mut out = Vec::with_capacity(raw.len());
            for (&y, &(cr, cb)) in y_eq.iter().zip(&chroma) {
                let y = y as f32;
                out.push(round_u8(y + R_FROM_CR * cr));
                out.push(round_u8(y - G_FROM_CR * cr - G_FROM_CB * cb));
                out.push(round_u8(y + B_FROM_CB * cb));
            }
            color.with_raw(out)
        }
    }
}
