// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Edit session controller — owns the session, the control values and the
// preview timers, and routes every editor command to the engines.
//
// Failed operations leave the session untouched: the engine output is only
// committed after it has been produced.

use std::path::{Path, PathBuf};
use std::time::Instant;

use image::DynamicImage;
use pixelwerk_bridge::{BackgroundRemover, ObjectRemover};
use pixelwerk_core::EditorConfig;
use pixelwerk_core::error::{PixelwerkError, Result};
use pixelwerk_core::types::{DenoiseParams, EnhanceParams, FlipAxis, GradeParams, ImageRect, TransformKind};
use pixelwerk_imaging::buffer::{ensure_processable, to_8bit};
use pixelwerk_imaging::{
    ColorGradingEngine, DenoiseEngine, ExportFormat, ImageProcessor, LowLightEnhancer, SceneAnalyzer,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::scheduler::{PreviewScheduler, TaskToken};
use crate::selection::{DisplayMapping, UiRect, Viewport};
use crate::session::{EditSession, SessionState};

/// Parameters for one transform, tagged by kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TransformParams {
    Denoise(DenoiseParams),
    Enhance(EnhanceParams),
    Grade(GradeParams),
}

impl TransformParams {
    pub fn kind(&self) -> TransformKind {
        match self {
            Self::Denoise(_) => TransformKind::Denoise,
            Self::Enhance(_) => TransformKind::Enhance,
            Self::Grade(_) => TransformKind::Grade,
        }
    }
}

/// Editor commands, as sent by a host UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    Load(PathBuf),
    Reset,
    Flip(FlipAxis),
    /// Apply immediately, bypassing the debounce.
    Apply(TransformParams),
    SetDenoise(DenoiseParams),
    SetEnhance(EnhanceParams),
    SetGrade(GradeParams),
    AutoDenoise,
    AutoEnhance,
    Export(PathBuf),
    /// Fire any debounced recomputes that are due.
    Poll,
}

/// What triggered a recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trigger {
    /// A debounced slider recompute; reads and keeps the control's anchor.
    Preview,
    /// An explicit apply; reads the policy source and chains onto it.
    Explicit,
}

/// Drives one editor window.
#[derive(Debug, Default)]
pub struct EditSessionController {
    config: EditorConfig,
    session: Option<EditSession>,
    denoise: DenoiseParams,
    enhance: EnhanceParams,
    grade: GradeParams,
    scheduler: PreviewScheduler,
    analyzer: SceneAnalyzer,
    denoiser: DenoiseEngine,
    enhancer: LowLightEnhancer,
    grader: ColorGradingEngine,
}

impl EditSessionController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    // -- Accessors ------------------------------------------------------------

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.session.as_ref().map_or(SessionState::Empty, EditSession::state)
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn denoise_params(&self) -> DenoiseParams {
        self.denoise
    }

    pub fn enhance_params(&self) -> EnhanceParams {
        self.enhance
    }

    pub fn grade_params(&self) -> GradeParams {
        self.grade
    }

    pub fn scheduler(&self) -> &PreviewScheduler {
        &self.scheduler
    }

    /// Placement of the shown image inside `viewport`, honouring the
    /// configured display cap.
    pub fn display_mapping(&self, viewport: Viewport) -> Result<DisplayMapping> {
        DisplayMapping::fit(self.export_current()?, viewport, self.config.max_display_side)
    }

    // -- Loading and reset ----------------------------------------------------

    /// Decode `path` and start a new session on it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load_image(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let image = ImageProcessor::open(path.as_ref())?.into_dynamic();
        self.load_dynamic(image)
    }

    /// Start a new session on an already decoded image.
    pub fn load_dynamic(&mut self, image: DynamicImage) -> Result<()> {
        let image = to_8bit(image);
        ensure_processable(&image)?;
        self.session = Some(EditSession::new(image));
        self.scheduler.cancel_all();
        self.restore_defaults();
        Ok(())
    }

    /// Discard every edit and restore the default control values.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
        self.scheduler.cancel_all();
        self.restore_defaults();
    }

    fn restore_defaults(&mut self) {
        self.denoise = DenoiseParams::default();
        self.enhance = EnhanceParams::default();
        self.grade = GradeParams::default();
    }

    // -- Immediate edits ------------------------------------------------------

    /// Record `params` as its control's values and recompute at once from the
    /// image the control's source policy selects. Repeated applies chain.
    pub fn apply_transform(&mut self, params: TransformParams) -> Result<()> {
        let kind = params.kind();
        self.recompute(&params, Trigger::Explicit)?;
        self.scheduler.cancel(kind);
        self.store(params);
        Ok(())
    }

    /// Mirror the shown image.
    pub fn flip(&mut self, axis: FlipAxis) -> Result<()> {
        let session = self.session.as_mut().ok_or(PixelwerkError::NoImageLoaded)?;
        let flipped = ImageProcessor::from_dynamic(session.display().clone())
            .flip(axis)
            .into_dynamic();
        session.replace(flipped);
        Ok(())
    }

    /// Replace the shown image with the remover's cut-out.
    pub fn remove_background(&mut self, remover: &dyn BackgroundRemover) -> Result<()> {
        let session = self.session.as_mut().ok_or(PixelwerkError::NoImageLoaded)?;
        let source = session.display();

        let cutout = remover
            .remove_background(source)
            .map_err(|e| collaborator_failure("background removal", e))?;
        if cutout.dimensions() != (source.width(), source.height()) {
            return Err(collaborator_failure(
                "background removal",
                PixelwerkError::InvalidInput(format!(
                    "result is {}x{}, expected {}x{}",
                    cutout.width(),
                    cutout.height(),
                    source.width(),
                    source.height()
                )),
            ));
        }

        session.replace(DynamicImage::ImageRgba8(cutout));
        info!(session = %session.id(), "background removed");
        Ok(())
    }

    /// Inpaint the region under a UI drag rectangle.
    pub fn remove_object(
        &mut self,
        remover: &mut dyn ObjectRemover,
        rect: UiRect,
        mapping: &DisplayMapping,
    ) -> Result<()> {
        let session = self.session.as_mut().ok_or(PixelwerkError::NoImageLoaded)?;
        let source = session.display();
        if (mapping.image_width, mapping.image_height) != (source.width(), source.height()) {
            return Err(PixelwerkError::InvalidInput(format!(
                "display mapping is for a {}x{} image, shown image is {}x{}",
                mapping.image_width,
                mapping.image_height,
                source.width(),
                source.height()
            )));
        }
        let region = mapping.to_image_rect(rect)?;

        let output = run_object_remover(remover, source, region)
            .map_err(|e| collaborator_failure("object removal", e))?;
        let output = to_8bit(output);
        if (output.width(), output.height()) != (source.width(), source.height()) {
            return Err(PixelwerkError::CollaboratorFailure(format!(
                "object removal returned {}x{}, expected {}x{}",
                output.width(),
                output.height(),
                source.width(),
                source.height()
            )));
        }

        session.replace(output);
        info!(session = %session.id(), ?region, "object removed");
        Ok(())
    }

    // -- Live preview ---------------------------------------------------------

    /// Commit new denoise values and schedule a debounced recompute.
    pub fn set_denoise(&mut self, params: DenoiseParams, now: Instant) -> Result<TaskToken> {
        self.require_image()?;
        self.denoise = params;
        Ok(self.schedule(TransformKind::Denoise, now))
    }

    /// Commit new enhance values and schedule a debounced recompute.
    pub fn set_enhance(&mut self, params: EnhanceParams, now: Instant) -> Result<TaskToken> {
        self.require_image()?;
        self.enhance = params;
        Ok(self.schedule(TransformKind::Enhance, now))
    }

    /// Commit new grade values and schedule a debounced recompute.
    pub fn set_grade(&mut self, params: GradeParams, now: Instant) -> Result<TaskToken> {
        self.require_image()?;
        self.grade = params;
        Ok(self.schedule(TransformKind::Grade, now))
    }

    fn schedule(&mut self, kind: TransformKind, now: Instant) -> TaskToken {
        let delay = self.config.debounce.delay(kind);
        self.scheduler.schedule(kind, now, delay)
    }

    /// Run every recompute due at `now` with the latest committed values.
    /// Returns the transforms that were recomputed. If one fails, the others
    /// still run and the first error is returned.
    pub fn poll(&mut self, now: Instant) -> Result<Vec<TransformKind>> {
        let mut fired = Vec::new();
        let mut first_error = None;
        for pending in self.scheduler.take_due(now) {
            let params = self.committed(pending.kind);
            match self.recompute(&params, Trigger::Preview) {
                Ok(()) => fired.push(pending.kind),
                Err(e) => {
                    warn!(kind = %pending.kind, error = %e, "preview recompute failed");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(fired),
        }
    }

    /// Suggest denoise values for the image denoise would read and apply them
    /// to it at once. The suggested strength is never below 1.
    pub fn auto_denoise(&mut self) -> Result<DenoiseParams> {
        let policy = self.config.sources.for_kind(TransformKind::Denoise);
        let session = self.session.as_ref().ok_or(PixelwerkError::NoImageLoaded)?;
        let mut params = self.analyzer.suggest_denoise_params(session.policy_source(policy))?;
        params.strength = params.strength.max(DenoiseParams::MIN_STRENGTH);
        info!(
            strength = params.strength,
            edge_preserving = params.edge_preserving,
            impulse_fix = params.impulse_fix,
            "auto denoise"
        );
        self.apply_transform(TransformParams::Denoise(params))?;
        Ok(params)
    }

    /// Apply the configured auto-enhance values at once.
    pub fn auto_enhance(&mut self) -> Result<EnhanceParams> {
        let params = self.config.auto_enhance;
        self.apply_transform(TransformParams::Enhance(params))?;
        Ok(params)
    }

    // -- Export ---------------------------------------------------------------

    /// The image an export would write: `current`, else `base`.
    pub fn export_current(&self) -> Result<&DynamicImage> {
        self.session
            .as_ref()
            .map(EditSession::display)
            .ok_or(PixelwerkError::NoImageLoaded)
    }

    /// Encode the export image.
    pub fn encode(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let image = self.export_current()?;
        ImageProcessor::from_dynamic(image.clone()).encode(format, self.config.jpeg_quality)
    }

    /// Write the export image; the format follows the file extension.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let image = self.export_current()?;
        ImageProcessor::from_dynamic(image.clone()).save(path, self.config.jpeg_quality)
    }

    // -- Dispatch -------------------------------------------------------------

    /// Route a command. Returns the transforms recomputed as a result.
    pub fn dispatch(&mut self, command: Command, now: Instant) -> Result<Vec<TransformKind>> {
        match command {
            Command::Load(path) => self.load_image(path).map(|()| Vec::new()),
            Command::Reset => {
                self.reset();
                Ok(Vec::new())
            }
            Command::Flip(axis) => self.flip(axis).map(|()| Vec::new()),
            Command::Apply(params) => self.apply_transform(params).map(|()| vec![params.kind()]),
            Command::SetDenoise(params) => self.set_denoise(params, now).map(|_| Vec::new()),
            Command::SetEnhance(params) => self.set_enhance(params, now).map(|_| Vec::new()),
            Command::SetGrade(params) => self.set_grade(params, now).map(|_| Vec::new()),
            Command::AutoDenoise => self.auto_denoise().map(|_| vec![TransformKind::Denoise]),
            Command::AutoEnhance => self.auto_enhance().map(|_| vec![TransformKind::Enhance]),
            Command::Export(path) => self.export_to(path).map(|()| Vec::new()),
            Command::Poll => self.poll(now),
        }
    }

    // -- Internals ------------------------------------------------------------

    fn require_image(&self) -> Result<()> {
        self.session.as_ref().map(|_| ()).ok_or(PixelwerkError::NoImageLoaded)
    }

    fn committed(&self, kind: TransformKind) -> TransformParams {
        match kind {
            TransformKind::Denoise => TransformParams::Denoise(self.denoise),
            TransformKind::Enhance => TransformParams::Enhance(self.enhance),
            TransformKind::Grade => TransformParams::Grade(self.grade),
        }
    }

    fn store(&mut self, params: TransformParams) {
        match params {
            TransformParams::Denoise(p) => self.denoise = p,
            TransformParams::Enhance(p) => self.enhance = p,
            TransformParams::Grade(p) => self.grade = p,
        }
    }

    /// Render `params` and store the result. Previews read and keep the
    /// control's anchor; explicit applies read the policy source and drop it.
    fn recompute(&mut self, params: &TransformParams, trigger: Trigger) -> Result<()> {
        let kind = params.kind();
        let policy = self.config.sources.for_kind(kind);
        let session = self.session.as_ref().ok_or(PixelwerkError::NoImageLoaded)?;
        let source = match trigger {
            Trigger::Preview => session.recompute_source(kind, policy),
            Trigger::Explicit => session.policy_source(policy),
        };
        let output = self.render(params, source)?;

        let session = self.session.as_mut().ok_or(PixelwerkError::NoImageLoaded)?;
        match trigger {
            Trigger::Preview => session.commit(kind, policy, output),
            Trigger::Explicit => session.replace(output),
        }
        Ok(())
    }

    fn render(&self, params: &TransformParams, source: &DynamicImage) -> Result<DynamicImage> {
        match params {
            TransformParams::Denoise(p) if p.is_disabled() => Ok(source.clone()),
            TransformParams::Denoise(p) => self.denoiser.denoise(source, p),
            TransformParams::Enhance(p) if p.is_disabled() => Ok(source.clone()),
            TransformParams::Enhance(p) => self.enhancer.enhance(source, p),
            TransformParams::Grade(p) => self.grader.apply_grade(source, p),
        }
    }
}

/// Drive the remover through its full call sequence.
fn run_object_remover(
    remover: &mut dyn ObjectRemover,
    source: &DynamicImage,
    region: ImageRect,
) -> Result<DynamicImage> {
    remover.set_image(source)?;
    remover.set_selection(region.x, region.y, region.width, region.height)?;
    remover.process()?;
    remover.result()
}

fn collaborator_failure(operation: &str, err: PixelwerkError) -> PixelwerkError {
    let wrapped = match err {
        PixelwerkError::CollaboratorFailure(detail) => PixelwerkError::CollaboratorFailure(detail),
        other => PixelwerkError::CollaboratorFailure(format!("{operation}: {other}")),
    };
    warn!(operation, error = %wrapped, "collaborator failed, image left unchanged");
    wrapped
}
