// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pixelwerk — Collaborator bridge abstractions.
//
// The segmentation model behind background removal and the object-removal
// engine are external. This crate defines the narrow traits the editor calls
// them through, and the stub used when neither is compiled in.

pub mod stub;
pub mod traits;

pub use stub::StubBridge;
pub use traits::{BackgroundRemover, EditorBridge, ObjectRemover};

/// The bridge for this build. Only the stub ships with the workspace.
pub fn editor_bridge() -> Box<dyn EditorBridge> {
    Box::new(stub::StubBridge)
}
