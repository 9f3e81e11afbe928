// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Pixelwerk restoration pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edit session (one per loaded image).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three parameterised transforms. Each one also names the interactive
/// control (slider group) that drives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransformKind {
    Denoise,
    Enhance,
    Grade,
}

impl TransformKind {
    pub const ALL: [TransformKind; 3] = [Self::Denoise, Self::Enhance, Self::Grade];
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Denoise => write!(f, "denoise"),
            Self::Enhance => write!(f, "enhance"),
            Self::Grade => write!(f, "grade"),
        }
    }
}

/// Result of scene analysis. Purely a computation result, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseProfile {
    /// Variance of the Laplacian response over the luma plane.
    pub variance: f64,
    /// Fraction of luma samples at or below 2 or at or above 253.
    pub impulse_ratio: f64,
}

/// Denoising parameters.
///
/// A `strength` of 0 is the "disabled" baseline: callers treat it as identity
/// and never pass it to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenoiseParams {
    /// Filter strength (1..=30 when enabled).
    pub strength: u8,
    /// Bilateral (edge preserving) when true, non-local means otherwise.
    pub edge_preserving: bool,
    /// Run a median pass afterwards to remove salt-and-pepper noise.
    pub impulse_fix: bool,
}

impl DenoiseParams {
    pub const MIN_STRENGTH: u8 = 1;
    pub const MAX_STRENGTH: u8 = 30;

    /// Whether these parameters leave the image untouched.
    pub fn is_disabled(&self) -> bool {
        self.strength == 0
    }

    /// Strength clamped into the engine's accepted range.
    pub fn clamped_strength(&self) -> u8 {
        self.strength.clamp(Self::MIN_STRENGTH, Self::MAX_STRENGTH)
    }
}

impl Default for DenoiseParams {
    fn default() -> Self {
        Self {
            strength: 0,
            edge_preserving: true,
            impulse_fix: false,
        }
    }
}

/// Low-light enhancement parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnhanceParams {
    /// Blend weight of the retinex output against the CLAHE output (0..=1).
    pub intensity: f32,
    /// Detail recovery (0..=1): drives the retinex sigma and the unsharp mask.
    pub detail: f32,
    /// CLAHE clip limit (1..=5).
    pub clip_limit: f32,
}

impl EnhanceParams {
    /// Copy with every field clamped into its documented range.
    pub fn clamped(&self) -> Self {
        Self {
            intensity: clamp_or(self.intensity, 0.0, 1.0, 0.0),
            detail: clamp_or(self.detail, 0.0, 1.0, 0.0),
            clip_limit: clamp_or(self.clip_limit, 1.0, 5.0, 2.0),
        }
    }

    /// Whether these parameters leave the image untouched.
    pub fn is_disabled(&self) -> bool {
        self.clamped().intensity <= f32::EPSILON
    }
}

impl Default for EnhanceParams {
    fn default() -> Self {
        Self {
            intensity: 0.0,
            detail: 0.3,
            clip_limit: 2.0,
        }
    }
}

/// Named color grading looks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GradePreset {
    #[default]
    None,
    Warm,
    Cool,
    Sepia,
    Cinematic,
    Grayscale,
}

impl GradePreset {
    pub const ALL: [GradePreset; 6] = [
        Self::None,
        Self::Warm,
        Self::Cool,
        Self::Sepia,
        Self::Cinematic,
        Self::Grayscale,
    ];

    /// Human-readable label, as shown in a preset picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Warm => "Warm",
            Self::Cool => "Cool",
            Self::Sepia => "Sepia",
            Self::Cinematic => "Cinematic",
            Self::Grayscale => "Black & White",
        }
    }
}

impl std::fmt::Display for GradePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for GradePreset {
    type Err = crate::error::PixelwerkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "warm" => Ok(Self::Warm),
            "cool" => Ok(Self::Cool),
            "sepia" => Ok(Self::Sepia),
            "cinematic" => Ok(Self::Cinematic),
            "grayscale" | "greyscale" | "black & white" | "black and white" | "bw" => {
                Ok(Self::Grayscale)
            }
            other => Err(crate::error::PixelwerkError::InvalidInput(format!(
                "unknown grade preset '{other}'"
            ))),
        }
    }
}

/// Color grading parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradeParams {
    pub preset: GradePreset,
    /// Blend strength in percent (0..=100).
    pub intensity: f32,
}

impl GradeParams {
    /// Blend factor in 0..=1 after clamping the percentage.
    pub fn alpha(&self) -> f32 {
        clamp_or(self.intensity, 0.0, 100.0, 0.0) / 100.0
    }

    /// Whether grading with these parameters leaves the image unchanged:
    /// no preset, or zero intensity.
    pub fn is_identity(&self) -> bool {
        self.preset == GradePreset::None || self.alpha() == 0.0
    }
}

impl Default for GradeParams {
    fn default() -> Self {
        Self {
            preset: GradePreset::None,
            intensity: 0.0,
        }
    }
}

/// Mirror axis for the flip helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipAxis {
    /// Mirror left-to-right.
    Horizontal,
    /// Mirror top-to-bottom.
    Vertical,
}

/// A rectangle in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ImageRect {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Clamp `value` into `[min, max]`, mapping NaN to `fallback`.
fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_nan() {
        fallback
    } else {
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denoise_strength_clamps_into_range() {
        let params = DenoiseParams {
            strength: 99,
            ..Default::default()
        };
        assert_eq!(params.clamped_strength(), 30);
        assert!(DenoiseParams::default().is_disabled());
        assert_eq!(DenoiseParams::default().clamped_strength(), 1);
    }

    #[test]
    fn enhance_clamps_and_handles_nan() {
        let params = EnhanceParams {
            intensity: 3.0,
            detail: f32::NAN,
            clip_limit: 0.2,
        }
        .clamped();
        assert_eq!(params.intensity, 1.0);
        assert_eq!(params.detail, 0.0);
        assert_eq!(params.clip_limit, 1.0);
    }

    #[test]
    fn grade_alpha_clamps_percentage() {
        let over = GradeParams {
            preset: GradePreset::Warm,
            intensity: 250.0,
        };
        assert_eq!(over.alpha(), 1.0);
        let under = GradeParams {
            preset: GradePreset::Warm,
            intensity: -5.0,
        };
        assert_eq!(under.alpha(), 0.0);
        assert!(under.is_identity());
        assert!(!over.is_identity());
        assert!(GradeParams::default().is_identity());
    }

    #[test]
    fn preset_parses_labels_and_aliases() {
        for preset in GradePreset::ALL {
            assert_eq!(preset.label().parse::<GradePreset>().unwrap(), preset);
        }
        assert_eq!("  WARM ".parse::<GradePreset>().unwrap(), GradePreset::Warm);
        assert!("vintage".parse::<GradePreset>().is_err());
    }

    #[test]
    fn zero_sized_rect_is_empty() {
        let rect = ImageRect {
            x: 4,
            y: 4,
            width: 0,
            height: 10,
        };
        assert!(rect.is_empty());
        assert!(!ImageRect { width: 3, height: 5, ..rect }.is_empty());
    }
}
