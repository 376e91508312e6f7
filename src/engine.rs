//! Engine capability
//!
//! The emulation itself lives outside this crate. Everything the front-end
//! needs from it is captured by the [`Engine`] trait, and sessions are
//! created through an [`EngineLoader`].

use std::fmt;
use std::path::Path;

/// NES picture width in pixels
pub const FRAME_WIDTH: usize = 256;
/// NES picture height in pixels
pub const FRAME_HEIGHT: usize = 240;
/// Color channels per pixel (RGB)
pub const FRAME_CHANNELS: usize = 3;
/// Length in bytes of one row-major RGB frame
pub const FRAME_LEN: usize = FRAME_WIDTH * FRAME_HEIGHT * FRAME_CHANNELS;

/// One open emulation session for a single ROM.
///
/// The frame returned by [`Engine::screen`] borrows the engine, so it can
/// never be held across the next `step` or `reset`.
pub trait Engine {
    /// Restart the loaded ROM from power-on state
    fn reset(&mut self) -> Result<(), EngineError>;

    /// Advance exactly one frame with the given controller bitmask
    fn step(&mut self, buttons: u8) -> Result<(), EngineError>;

    /// Current picture, `FRAME_LEN` bytes of RGB, if the engine has one
    fn screen(&self) -> Option<&[u8]>;

    /// Release the session
    fn close(&mut self) -> Result<(), EngineError>;
}

/// Opens engine sessions for ROM files
pub trait EngineLoader {
    fn open(&mut self, path: &Path) -> Result<Box<dyn Engine>, EngineError>;
}

impl<F> EngineLoader for F
where
    F: FnMut(&Path) -> Result<Box<dyn Engine>, EngineError>,
{
    fn open(&mut self, path: &Path) -> Result<Box<dyn Engine>, EngineError> {
        self(path)
    }
}

/// Engine error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine library could not be reached at all
    Unavailable(String),
    /// The engine raised while handling a call
    Fault(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Unavailable(msg) => write!(f, "engine unavailable: {}", msg),
            EngineError::Fault(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for EngineError {}
