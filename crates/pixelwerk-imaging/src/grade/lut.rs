// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-preset tone curves, one RGB triple per input level.

use pixelwerk_core::types::GradePreset;

use crate::buffer::to_u8;

/// 256 RGB triples indexed by the input sample value.
pub type ToneLut = [[u8; 3]; 256];

/// Sepia matrix rows, summed: the response of a neutral input.
const SEPIA: [f32; 3] = [0.393 + 0.769 + 0.189, 0.349 + 0.686 + 0.168, 0.272 + 0.534 + 0.131];

/// Build the tone curve for `preset`. `None` and `Grayscale` are not
/// curve-based and return `None`.
pub fn build_lut(preset: GradePreset) -> Option<ToneLut> {
    let gains: fn(f32) -> [f32; 3] = match preset {
        GradePreset::None | GradePreset::Grayscale => return None,
        GradePreset::Warm => |_| [1.25, 1.05, 0.85],
        GradePreset::Cool => |_| [0.85, 1.05, 1.25],
        GradePreset::Sepia => |_| SEPIA,
        GradePreset::Cinematic => |i| {
            if i < 128.0 {
                [0.90, 1.05, 1.15]
            } else {
                [1.20, 1.05, 0.95]
            }
        },
    };

    let mut lut = [[0u8; 3]; 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let level = i as f32;
        let [r, g, b] = gains(level);
        *entry = [to_u8(level * r), to_u8(level * g), to_u8(level * b)];
    }
    Some(lut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_curve_presets_have_no_lut() {
        assert!(build_lut(GradePreset::None).is_none());
        assert!(build_lut(GradePreset::Grayscale).is_none());
    }

    #[test]
    fn warm_boosts_red_and_cuts_blue() {
        let lut = build_lut(GradePreset::Warm).unwrap();
        assert_eq!(lut[100][0], 125);
        assert_eq!(lut[100][2], 85);
        assert_eq!(lut[255], [255, 255, 216]);
        assert_eq!(lut[0], [0, 0, 0]);
    }

    #[test]
    fn cool_mirrors_warm() {
        let warm = build_lut(GradePreset::Warm).unwrap();
        let cool = build_lut(GradePreset::Cool).unwrap();
        for i in 0..256 {
            assert_eq!(warm[i][0], cool[i][2]);
            assert_eq!(warm[i][2], cool[i][0]);
        }
    }

    #[test]
    fn sepia_saturates_early() {
        let lut = build_lut(GradePreset::Sepia).unwrap();
        assert_eq!(lut[200][0], 255);
        assert!(lut[100][0] > lut[100][1] && lut[100][1] > lut[100][2]);
    }

    #[test]
    fn cinematic_splits_at_mid_gray() {
        let lut = build_lut(GradePreset::Cinematic).unwrap();
        // Shadows lean teal, highlights lean orange.
        assert!(lut[100][2] > lut[100][0]);
        assert!(lut[200][0] > lut[200][2]);
    }
}
