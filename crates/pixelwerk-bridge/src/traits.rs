// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Trait definitions for the external editing collaborators.

use image::{DynamicImage, RgbaImage};
use pixelwerk_core::error::Result;

/// Everything the editor needs from outside the workspace, as one object.
pub trait EditorBridge: BackgroundRemover + ObjectRemover {
    /// Human-readable backend name (e.g. "onnx", "stub").
    fn backend_name(&self) -> &str;
}

/// Cut the subject out of a photo.
pub trait BackgroundRemover {
    /// Return the image with a transparent background, same dimensions as the
    /// input.
    fn remove_background(&self, image: &DynamicImage) -> Result<RgbaImage>;
}

/// Inpaint a rectangular region.
///
/// Driven as a small state machine: `set_image`, then `set_selection`, then
/// `process`, then `result`. Calling out of order is an error.
pub trait ObjectRemover {
    fn set_image(&mut self, image: &DynamicImage) -> Result<()>;

    /// Region to remove, in image pixels.
    fn set_selection(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<()>;

    fn process(&mut self) -> Result<()>;

    /// The processed image. Same dimensions as the input.
    fn result(&self) -> Result<DynamicImage>;
}
