// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Contrast-limited adaptive histogram equalisation on an 8-bit plane.

use crate::buffer::round_u8;

/// Tiles per axis, capped by the plane size.
pub const GRID: usize = 8;

const BINS: usize = 256;

/// Equalise a single 8-bit plane of `width x height` samples.
pub fn equalize(plane: &[u8], width: usize, height: usize, clip_limit: f32) -> Vec<u8> {
    let tiles_x = GRID.min(width).max(1);
    let tiles_y = GRID.min(height).max(1);

    // One 256-entry LUT per tile, row-major by tile.
    let mut luts = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        let (y0, y1) = (ty * height / tiles_y, (ty + 1) * height / tiles_y);
        for tx in 0..tiles_x {
            let (x0, x1) = (tx * width / tiles_x, (tx + 1) * width / tiles_x);

            let mut hist = [0u32; BINS];
            for y in y0..y1 {
                for &v in &plane[y * width + x0..y * width + x1] {
                    hist[v as usize] += 1;
                }
            }
            let area = ((x1 - x0) * (y1 - y0)) as u32;
            luts.push(tile_lut(&mut hist, area, clip_limit));
        }
    }

    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;
    let mut out = vec![0u8; plane.len()];

    for y in 0..height {
        let (ty1, ty2, ya) = neighbours(y, tile_h, tiles_y);
        for x in 0..width {
            let (tx1, tx2, xa) = neighbours(x, tile_w, tiles_x);
            let v = plane[y * width + x] as usize;

            let top = luts[ty1 * tiles_x + tx1][v] as f32 * (1.0 - xa)
                + luts[ty1 * tiles_x + tx2][v] as f32 * xa;
            let bottom = luts[ty2 * tiles_x + tx1][v] as f32 * (1.0 - xa)
                + luts[ty2 * tiles_x + tx2][v] as f32 * xa;
            out[y * width + x] = round_u8(top * (1.0 - ya) + bottom * ya);
        }
    }
    out
}

/// The two tiles whose centres bracket `pos`, and the weight of the second.
fn neighbours(pos: usize, tile_size: f32, tiles: usize) -> (usize, usize, f32) {
    let f = pos as f32 / tile_size - 0.5;
    let lower = f.floor();
    let weight = f - lower;
    let last = tiles as isize - 1;
    let first = (lower as isize).clamp(0, last) as usize;
    let second = (lower as isize + 1).clamp(0, last) as usize;
    (first, second, weight)
}

/// Clip the histogram, redistribute the excess, and build the cumulative LUT.
fn tile_lut(hist: &mut [u32; BINS], area: u32, clip_limit: f32) -> [u8; BINS] {
    let limit = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);

    let mut excess = 0u32;
    for count in hist.iter_mut() {
        if *count > limit {
            excess += *count - limit;
            *count = limit;
        }
    }

    let batch = excess / BINS as u32;
    let mut residual = excess % BINS as u32;
    for count in hist.iter_mut() {
        *count += batch;
    }
    if residual > 0 {
        let step = (BINS as u32 / residual).max(1) as usize;
        let mut i = 0;
        while i < BINS && residual > 0 {
            hist[i] += 1;
            residual -= 1;
            i += step;
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut lut = [0u8; BINS];
    let mut cumulative = 0u32;
    for (entry, &count) in lut.iter_mut().zip(hist.iter()) {
        cumulative += count;
        *entry = round_u8(cumulative as f32 * scale);
    }
    lut
}
