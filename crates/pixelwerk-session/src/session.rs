// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Non-destructive edit session: the loaded image, the edited image, and the
// anchor the active control recomputes from.

use image::DynamicImage;
use pixelwerk_core::config::SourcePolicy;
use pixelwerk_core::types::{SessionId, TransformKind};
use tracing::{debug, info};

/// Lifecycle state of the editor, derived from the session buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded.
    Empty,
    /// An image is loaded and nothing has been applied to it.
    Loaded,
    /// At least one edit produced a current image.
    Edited,
}

/// The image a control's live preview recomputes from.
#[derive(Debug, Clone)]
struct Anchor {
    kind: TransformKind,
    image: DynamicImage,
}

/// One loaded image and its edits. `base` never changes after load.
#[derive(Debug, Clone)]
pub struct EditSession {
    id: SessionId,
    base: DynamicImage,
    current: Option<DynamicImage>,
    anchor: Option<Anchor>,
}

impl EditSession {
    pub fn new(base: DynamicImage) -> Self {
        let id = SessionId::new();
        info!(session = %id, width = base.width(), height = base.height(), "edit session started");
        Self {
            id,
            base,
            current: None,
            anchor: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn base(&self) -> &DynamicImage {
        &self.base
    }

    pub fn current(&self) -> Option<&DynamicImage> {
        self.current.as_ref()
    }

    /// What the user sees: `current`, else `base`.
    pub fn display(&self) -> &DynamicImage {
        self.current.as_ref().unwrap_or(&self.base)
    }

    pub fn state(&self) -> SessionState {
        if self.current.is_some() {
            SessionState::Edited
        } else {
            SessionState::Loaded
        }
    }

    /// The control whose anchor is held, if any.
    pub fn anchor_kind(&self) -> Option<TransformKind> {
        self.anchor.as_ref().map(|a| a.kind)
    }

    /// The image `policy` selects right now, ignoring any anchor.
    pub fn policy_source(&self, policy: SourcePolicy) -> &DynamicImage {
        match policy {
            SourcePolicy::Chained => self.display(),
            SourcePolicy::Base => &self.base,
        }
    }

    /// The image a preview recompute of `kind` should read: its anchor when
    /// it holds one, else whatever `policy` selects now.
    pub fn recompute_source(&self, kind: TransformKind, policy: SourcePolicy) -> &DynamicImage {
        match &self.anchor {
            Some(anchor) if anchor.kind == kind => &anchor.image,
            _ => self.policy_source(policy),
        }
    }

    /// Store the output of a preview recompute of `kind`. The first preview
    /// of a control captures its anchor before `current` is replaced.
    pub fn commit(&mut self, kind: TransformKind, policy: SourcePolicy, output: DynamicImage) {
        if self.anchor_kind() != Some(kind) {
            let image = self.policy_source(policy).clone();
            debug!(session = %self.id, %kind, ?policy, "anchor captured");
            self.anchor = Some(Anchor { kind, image });
        }
        self.current = Some(output);
    }

    /// Replace `current` with the output of a one-shot operation (an explicit
    /// apply, flip, removals). The anchor is dropped so the next preview starts
    /// from here.
    pub fn replace(&mut self, output: DynamicImage) {
        self.anchor = None;
        self.current = Some(output);
    }

    /// Discard every edit.
    pub fn reset(&mut self) {
        self.anchor = None;
        self.current = None;
        info!(session = %self.id, "edit session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn solid(value: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(2, 2, Rgb([value; 3])))
    }

    #[test]
    fn fresh_session_is_loaded() {
        let session = EditSession::new(solid(10));
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(session.display(), &solid(10));
        assert!(session.anchor_kind().is_none());
    }

    #[test]
    fn anchor_is_captured_once_per_control() {
        let mut session = EditSession::new(solid(10));
        let policy = SourcePolicy::Chained;

        session.commit(TransformKind::Denoise, policy, solid(20));
        assert_eq!(session.recompute_source(TransformKind::Denoise, policy), &solid(10));

        // A second tick still reads the anchor, not its own output.
        session.commit(TransformKind::Denoise, policy, solid(30));
        assert_eq!(session.recompute_source(TransformKind::Denoise, policy), &solid(10));

        // Another control chains on what is shown now.
        assert_eq!(session.recompute_source(TransformKind::Enhance, policy), &solid(30));
        session.commit(TransformKind::Enhance, policy, solid(40));
        assert_eq!(session.anchor_kind(), Some(TransformKind::Enhance));
        assert_eq!(session.recompute_source(TransformKind::Enhance, policy), &solid(30));
    }

    #[test]
    fn base_policy_ignores_edits() {
        let mut session = EditSession::new(solid(10));
        session.commit(TransformKind::Denoise, SourcePolicy::Chained, solid(50));
        assert_eq!(
            session.recompute_source(TransformKind::Grade, SourcePolicy::Base),
            &solid(10)
        );
    }

    #[test]
    fn replace_and_reset_drop_the_anchor() {
        let mut session = EditSession::new(solid(10));
        session.commit(TransformKind::Grade, SourcePolicy::Base, solid(20));
        session.replace(solid(99));
        assert!(session.anchor_kind().is_none());
        assert_eq!(session.state(), SessionState::Edited);

        session.reset();
        assert_eq!(session.state(), SessionState::Loaded);
        assert_eq!(session.display(), &solid(10));
    }
}
