// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Editor configuration: debounce delays, source policies, auto constants, and
// export settings. Persisted as pretty-printed JSON.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::types::{EnhanceParams, TransformKind};

/// Which image a transform reads when its control recomputes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourcePolicy {
    /// Read the session's current image (`current`, else `base`).
    Chained,
    /// Always read the originally loaded image.
    Base,
}

/// Per-transform source policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePolicies {
    pub denoise: SourcePolicy,
    pub enhance: SourcePolicy,
    pub grade: SourcePolicy,
}

impl SourcePolicies {
    pub fn for_kind(&self, kind: TransformKind) -> SourcePolicy {
        match kind {
            TransformKind::Denoise => self.denoise,
            TransformKind::Enhance => self.enhance,
            TransformKind::Grade => self.grade,
        }
    }
}

impl Default for SourcePolicies {
    fn default() -> Self {
        Self {
            denoise: SourcePolicy::Chained,
            enhance: SourcePolicy::Chained,
            grade: SourcePolicy::Base,
        }
    }
}

/// Debounce delays, in milliseconds, per interactive control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebounceConfig {
    pub denoise_ms: u64,
    pub enhance_ms: u64,
    pub grade_ms: u64,
}

impl DebounceConfig {
    pub fn delay(&self, kind: TransformKind) -> Duration {
        let ms = match kind {
            TransformKind::Denoise => self.denoise_ms,
            TransformKind::Enhance => self.enhance_ms,
            TransformKind::Grade => self.grade_ms,
        };
        Duration::from_millis(ms)
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            denoise_ms: 180,
            enhance_ms: 120,
            grade_ms: 50,
        }
    }
}

/// Persistent editor settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Live-preview debounce delays.
    pub debounce: DebounceConfig,
    /// Which image each transform reads.
    pub sources: SourcePolicies,
    /// Parameters written by the "auto" enhancement action.
    pub auto_enhance: EnhanceParams,
    /// JPEG export quality (1-100).
    pub jpeg_quality: u8,
    /// Upper bound on the longest displayed side, in UI pixels.
    pub max_display_side: Option<u32>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce: DebounceConfig::default(),
            sources: SourcePolicies::default(),
            auto_enhance: EnhanceParams {
                intensity: 0.2,
                detail: 0.3,
                clip_limit: 2.0,
            },
            jpeg_quality: 95,
            max_display_side: None,
        }
    }
}

impl EditorConfig {
    /// Read a config file written by [`EditorConfig::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&data)?;
        debug!(path = %path.as_ref().display(), "editor config loaded");
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it is missing or
    /// malformed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.as_ref().display(), error = %e, "using default editor config");
                Self::default()
            }
        }
    }

    /// Persist as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }
}
