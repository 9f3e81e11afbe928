// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the editor surface.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Nothing here triggers a retry; the user decides whether to try again.

use crate::error::PixelwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Trying the same thing again may work (external tool hiccup, busy disk).
    Transient,
    /// The user must do something first (open an image, pick a region).
    ActionRequired,
    /// Cannot be fixed by trying again (damaged file, unknown format).
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `PixelwerkError` into a `HumanError` for display.
pub fn humanize_error(err: &PixelwerkError) -> HumanError {
    match err {
        PixelwerkError::InvalidInput(detail) => {
            if detail.contains("selection") {
                HumanError {
                    message: "The selected area is empty.".into(),
                    suggestion: "Drag a rectangle over the object you want to remove, then try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "This image can't be processed.".into(),
                    suggestion: format!("Try opening the image again or converting it to an 8-bit JPEG or PNG. ({detail})"),
                    severity: Severity::Permanent,
                }
            }
        }

        PixelwerkError::NoImageLoaded => HumanError {
            message: "No image is open.".into(),
            suggestion: "Choose an image first, then apply your edits.".into(),
            severity: Severity::ActionRequired,
        },

        PixelwerkError::CollaboratorFailure(detail) => HumanError {
            message: "That tool didn't finish.".into(),
            suggestion: format!("Your image was left as it was. Try again, or try a smaller selection. ({detail})"),
            severity: Severity::Transient,
        },

        PixelwerkError::ImageError(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            severity: Severity::Permanent,
        },

        PixelwerkError::UnsupportedFormat(detail) => HumanError {
            message: "That file type isn't supported.".into(),
            suggestion: format!("Save as .jpg, .png, .bmp or .webp instead. (Requested: {detail})"),
            severity: Severity::ActionRequired,
        },

        PixelwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file couldn't be found.".into(),
                suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "The app doesn't have permission to use that file.".into(),
                suggestion: "Check the file permissions, or pick a different folder.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "There was a problem reading or writing a file.".into(),
                suggestion: "Try again. If this keeps happening, your disk may be full.".into(),
                severity: Severity::Transient,
            },
        },

        PixelwerkError::Serialization(_) => HumanError {
            message: "The editor settings couldn't be read.".into(),
            suggestion: "Default settings will be used. Saving your settings again will repair the file.".into(),
            severity: Severity::Permanent,
        },
    }
}
