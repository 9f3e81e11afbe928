// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Non-local means.
//
// Instead of comparing patches pixel by pixel, the search runs one offset at a
// time: the squared difference between the image and its shifted copy is
// summed into an integral image, so every patch distance for that offset is a
// four-lookup region sum.

use pixelwerk_core::error::Result;

use crate::buffer::{ColorData, round_u8};

/// Patch radius (7x7 template).
pub const PATCH_RADIUS: i64 = 3;
/// Search radius (21x21 window).
pub const SEARCH_RADIUS: i64 = 10;

/// Filter strength `h`. A zero strength is lifted to 1.
pub fn filter_strength(strength: u8) -> f32 {
    strength.max(1) as f32
}

/// Apply non-local means with the given strength.
pub fn filter(color: &ColorData, strength: u8) -> Result<ColorData> {
    filter_with(color, strength, PATCH_RADIUS, SEARCH_RADIUS)
}

pub(crate) fn filter_with(
    color: &ColorData,
    strength: u8,
    patch_radius: i64,
    search_radius: i64,
) -> Result<ColorData> {
    let (width, height) = (color.width() as usize, color.height() as usize);
    let channels = color.channels();
    let src = color.as_raw();
    let h = filter_strength(strength);
    let h2 = (h * h) as f64;

    let pixels = width * height;
    let mut acc = vec![0f64; pixels * channels];
    let mut weight_sum = vec![0f64; pixels];
    let mut diff = vec![0f64; pixels];

    let shifted = |x: usize, y: usize, dx: i64, dy: i64| -> usize {
        let sx = (x as i64 + dx).clamp(0, width as i64 - 1) as usize;
        let sy = (y as i64 + dy).clamp(0, height as i64 - 1) as usize;
        sy * width + sx
    };

    for dy in -search_radius..=search_radius {
        for dx in -search_radius..=search_radius {
            for y in 0..height {
                for x in 0..width {
                    let p = y * width + x;
                    let q = shifted(x, y, dx, dy);
                    diff[p] = (0..channels)
                        .map(|c| {
                            let d = src[p * channels + c] as f64 - src[q * channels + c] as f64;
                            d * d
                        })
                        .sum();
                }
            }

            let integral = SummedAreaTable::new(&diff, width, height);
            for y in 0..height {
                for x in 0..width {
                    let p = y * width + x;
                    let (sum, area) = integral.region_sum(x, y, patch_radius as usize);
                    let mean_sq = sum / (area * channels) as f64;
                    let w = (-mean_sq / h2).exp();

                    let q = shifted(x, y, dx, dy);
                    for c in 0..channels {
                        acc[p * channels + c] += w * src[q * channels + c] as f64;
                    }
                    weight_sum[p] += w;
                }
            }
        }
    }

    let out: Vec<u8> = acc
        .iter()
        .enumerate()
        .map(|(i, &v)| round_u8((v / weight_sum[i / channels]) as f32))
        .collect();
    color.with_raw(out)
}

/// Summed-area table over a dense `f64` plane.
///
/// `table[y * (width+1) + x]` holds the sum of all values in the rectangle
/// `[0, 0)` to `(x, y)`, exclusive on both axes, with a zero-padded border.
struct SummedAreaTable {
    table: Vec<f64>,
    width: usize,
    height: usize,
}

impl SummedAreaTable {
    fn new(values: &[f64], width: usize, height: usize) -> Self {
        let stride = width + 1;
        let mut table = vec![0f64; stride * (height + 1)];
        for y in 0..height {
            let mut row_sum = 0.0;
            for x in 0..width {
                row_sum += values[y * width + x];
                table[(y + 1) * stride + x + 1] = row_sum + table[y * stride + x + 1];
            }
        }
        Self {
            table,
            width,
            height,
        }
    }

    /// Sum and area of the square centred on `(cx, cy)`, clamped to bounds.
    fn region_sum(&self, cx: usize, cy: usize, radius: usize) -> (f64, usize) {
        let stride = self.width + 1;
        let x1 = cx.saturating_sub(radius);
        let y1 = cy.saturating_sub(radius);
        let x2 = (cx + radius + 1).min(self.width);
        let y2 = (cy + radius + 1).min(self.height);

        let sum = self.table[y2 * stride + x2] - self.table[y1 * stride + x2]
            - self.table[y2 * stride + x1]
            + self.table[y1 * stride + x1];
        (sum.max(0.0), (x2 - x1) * (y2 - y1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn summed_area_table_matches_direct_sum() {
        let values: Vec<f64> = (0..20).map(|v| v as f64).collect();
        let sat = SummedAreaTable::new(&values, 5, 4);
        // 3x3 around (2, 1): rows 0..=2, cols 1..=3.
        let direct: f64 = (0..3)
            .flat_map(|y| (1..4).map(move |x| (y * 5 + x) as f64))
            .sum();
        assert_eq!(sat.region_sum(2, 1, 1), (direct, 9));
        // Corner region is clipped to 2x2.
        assert_eq!(sat.region_sum(0, 0, 1).1, 4);
    }

    #[test]
    fn flat_image_is_unchanged() {
        let color = ColorData::Rgb(RgbImage::from_pixel(8, 6, Rgb([10, 200, 77])));
        let out = filter_with(&color, 12, 1, 2).unwrap();
        assert_eq!(out, color);
    }

    #[test]
    fn noisy_stripe_is_pulled_toward_neighbours() {
        // Alternating +-6 noise on a flat field should be averaged away.
        let img = GrayImage::from_fn(10, 10, |x, y| {
            Luma([if (x + y) % 2 == 0 { 106 } else { 94 }])
        });
        let out = filter_with(&ColorData::Gray(img), 20, 1, 2).unwrap();
        for &v in out.as_raw() {
            assert!((95..=105).contains(&v), "sample {v} was not smoothed");
        }
    }

    #[test]
    fn zero_strength_is_lifted() {
        assert_eq!(filter_strength(0), 1.0);
        assert_eq!(filter_strength(12), 12.0);
    }
}
