// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Mapping between the on-screen preview and image pixels.
//
// The preview is the image scaled to fit the viewport (never past an optional
// longest-side cap) and centred. A drag rectangle in UI coordinates maps back
// to a clipped rectangle in image pixels.

use image::DynamicImage;
use pixelwerk_core::error::{PixelwerkError, Result};
use pixelwerk_core::types::ImageRect;
use serde::{Deserialize, Serialize};

/// Size of the area the preview is drawn into, in UI pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

/// A drag from `start` to `end` in UI coordinates. Either corner may be the
/// top-left one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UiRect {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

impl UiRect {
    pub fn new(start: (f32, f32), end: (f32, f32)) -> Self {
        Self { start, end }
    }
}

/// How an image is placed inside a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub image_width: u32,
    pub image_height: u32,
}

impl DisplayMapping {
    /// Fit `image` into `viewport`.
    pub fn fit(image: &DynamicImage, viewport: Viewport, max_side: Option<u32>) -> Result<Self> {
        Self::fit_dimensions(image.width(), image.height(), viewport, max_side)
    }

    /// Fit an image of the given size: `scale = min(vw / iw, vh / ih)`, then
    /// shrunk further if the longest displayed side would exceed `max_side`.
    pub fn fit_dimensions(
        image_width: u32,
        image_height: u32,
        viewport: Viewport,
        max_side: Option<u32>,
    ) -> Result<Self> {
        if image_width == 0 || image_height == 0 {
            return Err(PixelwerkError::InvalidInput("image is empty".into()));
        }
        if !(viewport.width > 0.0 && viewport.height > 0.0) {
            return Err(PixelwerkError::InvalidInput(format!(
                "viewport {}x{} has no area",
                viewport.width, viewport.height
            )));
        }

        let (iw, ih) = (image_width as f32, image_height as f32);
        let mut scale = (viewport.width / iw).min(viewport.height / ih);
        if let Some(cap) = max_side.filter(|&c| c > 0) {
            let longest = iw.max(ih) * scale;
            if longest > cap as f32 {
                scale *= cap as f32 / longest;
            }
        }

        Ok(Self {
            scale,
            offset_x: (viewport.width - iw * scale) / 2.0,
            offset_y: (viewport.height - ih * scale) / 2.0,
            image_width,
            image_height,
        })
    }

    /// Displayed width and height in UI pixels.
    pub fn display_size(&self) -> (f32, f32) {
        (
            self.image_width as f32 * self.scale,
            self.image_height as f32 * self.scale,
        )
    }

    /// Image pixel position to UI position.
    pub fn to_display(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.scale + self.offset_x, y * self.scale + self.offset_y)
    }

    /// UI drag rectangle to image pixels, clipped to the image. Edges round to
    /// the nearest pixel boundary. An empty result is `InvalidInput`.
    pub fn to_image_rect(&self, rect: UiRect) -> Result<ImageRect> {
        let (left, right) = min_max(rect.start.0, rect.end.0);
        let (top, bottom) = min_max(rect.start.1, rect.end.1);

        let to_x = |ui: f32| ((ui - self.offset_x) / self.scale).clamp(0.0, self.image_width as f32).round() as u32;
        let to_y = |ui: f32| ((ui - self.offset_y) / self.scale).clamp(0.0, self.image_height as f32).round() as u32;

        let (x0, x1) = (to_x(left), to_x(right));
        let (y0, y1) = (to_y(top), to_y(bottom));
        let mapped = ImageRect {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        };
        if mapped.is_empty() {
            return Err(PixelwerkError::InvalidInput(
                "selection is empty after clipping to the image".into(),
            ));
        }
        Ok(mapped)
    }
}

fn min_max(a: f32, b: f32) -> (f32, f32) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: f32, height: f32) -> Viewport {
        Viewport { width, height }
    }

    #[test]
    fn wide_image_is_letterboxed() {
        let mapping = DisplayMapping::fit_dimensions(400, 200, viewport(200.0, 200.0), None).unwrap();
        assert_eq!(mapping.scale, 0.5);
        assert_eq!(mapping.display_size(), (200.0, 100.0));
        assert_eq!((mapping.offset_x, mapping.offset_y), (0.0, 50.0));
    }

    #[test]
    fn side_cap_shrinks_the_preview() {
        let mapping = DisplayMapping::fit_dimensions(100, 50, viewport(800.0, 800.0), Some(200)).unwrap();
        assert_eq!(mapping.scale, 2.0);
        assert_eq!(mapping.display_size(), (200.0, 100.0));
        assert_eq!((mapping.offset_x, mapping.offset_y), (300.0, 350.0));
    }

    #[test]
    fn mapping_inverts_the_display_transform() {
        let mapping = DisplayMapping::fit_dimensions(640, 480, viewport(500.0, 300.0), None).unwrap();
        let expected = ImageRect {
            x: 100,
            y: 60,
            width: 200,
            height: 120,
        };
        let start = mapping.to_display(100.0, 60.0);
        let end = mapping.to_display(300.0, 180.0);
        assert_eq!(mapping.to_image_rect(UiRect::new(start, end)).unwrap(), expected);
        // Dragging the other way selects the same pixels.
        assert_eq!(mapping.to_image_rect(UiRect::new(end, start)).unwrap(), expected);
    }

    #[test]
    fn selection_is_clipped_to_the_image() {
        let mapping = DisplayMapping::fit_dimensions(100, 100, viewport(300.0, 100.0), None).unwrap();
        // The image occupies x in [100, 200]; drag across the left margin.
        let rect = mapping.to_image_rect(UiRect::new((20.0, -10.0), (150.0, 40.0))).unwrap();
        assert_eq!(
            rect,
            ImageRect {
                x: 0,
                y: 0,
                width: 50,
                height: 40,
            }
        );
    }

    #[test]
    fn selection_outside_the_image_is_invalid() {
        let mapping = DisplayMapping::fit_dimensions(100, 100, viewport(300.0, 100.0), None).unwrap();
        let err = mapping.to_image_rect(UiRect::new((10.0, 10.0), (90.0, 90.0))).unwrap_err();
        assert!(matches!(err, PixelwerkError::InvalidInput(ref m) if m.contains("selection")));
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert!(DisplayMapping::fit_dimensions(0, 10, viewport(10.0, 10.0), None).is_err());
        assert!(DisplayMapping::fit_dimensions(10, 10, viewport(0.0, 10.0), None).is_err());
    }
}
