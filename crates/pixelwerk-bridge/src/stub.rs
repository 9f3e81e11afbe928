// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub bridge for builds without a segmentation model or inpainting engine.
//
// Every trait method returns `CollaboratorFailure`.

use image::{DynamicImage, RgbaImage};
use pixelwerk_core::error::{PixelwerkError, Result};

use crate::traits::*;

const UNAVAILABLE: &str = "not available in this build";

/// No-op bridge returned when no collaborator is compiled in.
#[derive(Debug, Default, Clone, Copy)]
pub struct StubBridge;

impl EditorBridge for StubBridge {
    fn backend_name(&self) -> &str {
        "stub"
    }
}

impl BackgroundRemover for StubBridge {
    fn remove_background(&self, _image: &DynamicImage) -> Result<RgbaImage> {
        tracing::warn!("BackgroundRemover::remove_background called on stub bridge");
        Err(unavailable("background removal"))
    }
}

impl ObjectRemover for StubBridge {
    fn set_image(&mut self, _image: &DynamicImage) -> Result<()> {
        tracing::warn!("ObjectRemover::set_image called on stub bridge");
        Err(unavailable("object removal"))
    }

    fn set_selection(&mut self, _x: u32, _y: u32, _width: u32, _height: u32) -> Result<()> {
        Err(unavailable("object removal"))
    }

    fn process(&mut self) -> Result<()> {
        Err(unavailable("object removal"))
    }

    fn result(&self) -> Result<DynamicImage> {
        Err(unavailable("object removal"))
    }
}

fn unavailable(capability: &str) -> PixelwerkError {
    PixelwerkError::CollaboratorFailure(format!("{capability} is {UNAVAILABLE}"))
}
