// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pixelwerk-imaging — The numeric engines behind the Pixelwerk editor.
//
// Provides noise analysis with parameter suggestion, bilateral and non-local
// means denoising, CLAHE + retinex low-light enhancement, LUT-based color
// grading, and the image load/flip/export helper.

pub mod analysis;
pub mod buffer;
pub mod denoise;
pub mod enhance;
pub mod grade;
pub mod image;

// Re-export the engines so callers can use `pixelwerk_imaging::DenoiseEngine` etc.
pub use analysis::SceneAnalyzer;
pub use denoise::DenoiseEngine;
pub use enhance::LowLightEnhancer;
pub use grade::{ColorGradingEngine, ToneLut, build_lut};
pub use self::image::processor::{ExportFormat, ImageProcessor};
