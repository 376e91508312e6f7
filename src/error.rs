//! Front-end error kinds

use std::fmt;
use std::path::PathBuf;

use crate::screen::RenderError;

/// Failures the shell can observe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontendError {
    /// The ROM could not be opened or the engine session could not start
    EngineInitFailed { path: PathBuf, reason: String },
    /// The engine raised during a step; the run ends as if done
    FrameStepFailed,
    /// A step produced no picture without reporting done
    FrameNullUnexpected,
    /// The picture could not be turned into a bitmap
    RenderFailed(RenderError),
}

impl fmt::Display for FrontendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontendError::EngineInitFailed { reason, .. } => {
                write!(f, "Failed to load ROM: {}", reason)
            }
            FrontendError::FrameStepFailed => write!(f, "emulation step failed"),
            FrontendError::FrameNullUnexpected => write!(f, "step produced no frame"),
            FrontendError::RenderFailed(e) => write!(f, "render frame failed: {}", e),
        }
    }
}

impl std::error::Error for FrontendError {}

impl From<RenderError> for FrontendError {
    fn from(e: RenderError) -> Self {
        FrontendError::RenderFailed(e)
    }
}
