// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Pixelwerk.

use thiserror::Error;

/// Top-level error type for all Pixelwerk operations.
#[derive(Debug, Error)]
pub enum PixelwerkError {
    // -- Engine errors --
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // -- Session errors --
    #[error("no image loaded")]
    NoImageLoaded,

    // -- External collaborators --
    #[error("external collaborator failed: {0}")]
    CollaboratorFailure(String),

    // -- Codec errors --
    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PixelwerkError>;
