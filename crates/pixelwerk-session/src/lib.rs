// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pixelwerk-session — The non-destructive editing model.
//
// Holds the loaded image and its edits, decides which image each transform
// reads, debounces live-preview recomputes, maps UI selections into image
// pixels, and dispatches editor commands to the engines and collaborators.

pub mod controller;
pub mod logging;
pub mod scheduler;
pub mod selection;
pub mod session;

pub use controller::{Command, EditSessionController, TransformParams};
pub use logging::init_logging;
pub use scheduler::{PendingRecompute, PreviewScheduler, TaskToken};
pub use selection::{DisplayMapping, UiRect, Viewport};
pub use session::{EditSession, SessionState};
