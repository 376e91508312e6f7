//! Emulator handle
//!
//! Wraps one engine session for one loaded ROM and turns engine failures into
//! the `(frame, done)` pair the frame loop consumes.

use std::path::{Path, PathBuf};

use crate::engine::{Engine, EngineError, EngineLoader};
use crate::error::FrontendError;

enum Session {
    Ready(Box<dyn Engine>),
    Closed,
}

/// One loaded ROM and its engine session
pub struct NesSystem {
    session: Session,
    rom_path: PathBuf,
}

impl NesSystem {
    /// Open an engine session for `path` and reset it so a first frame is
    /// available straight away.
    pub fn open<L>(loader: &mut L, path: &Path) -> Result<Self, FrontendError>
    where
        L: EngineLoader + ?Sized,
    {
        let init_failed = |e: EngineError| FrontendError::EngineInitFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        };

        let mut engine = loader.open(path).map_err(init_failed)?;
        if let Err(e) = engine.reset() {
            log::error!("Error initializing engine: {}", e);
            if let Err(e) = engine.close() {
                log::error!("Failed to close engine after init error: {}", e);
            }
            return Err(init_failed(e));
        }

        let system = Self {
            session: Session::Ready(engine),
            rom_path: path.to_path_buf(),
        };
        log::info!("Initialized with ROM: {}", system.rom_name());
        Ok(system)
    }

    /// Restart the ROM from power-on state
    pub fn reset(&mut self) {
        if let Session::Ready(engine) = &mut self.session {
            match engine.reset() {
                Ok(()) => log::info!("ROM reset"),
                Err(e) => log::error!("reset() failed: {}", e),
            }
        }
    }

    /// Advance one frame under `buttons`.
    ///
    /// An engine failure ends the run: the result is `(None, true)`.
    ///
    /// # Panics
    ///
    /// Panics if the session has already been closed.
    pub fn step(&mut self, buttons: u8) -> (Option<&[u8]>, bool) {
        let engine = match &mut self.session {
            Session::Ready(engine) => engine,
            Session::Closed => panic!("step() called on a closed emulator session"),
        };

        if let Err(e) = engine.step(buttons) {
            log::error!("step() failed: {}", e);
            return (None, true);
        }

        let frame = engine.screen();
        if frame.is_none() {
            log::warn!("Frame is None!");
        }
        (frame, false)
    }

    /// Current frame without stepping
    pub fn frame(&self) -> Option<&[u8]> {
        match &self.session {
            Session::Ready(engine) => engine.screen(),
            Session::Closed => None,
        }
    }

    /// Release the engine session. Calling this again is a no-op.
    pub fn close(&mut self) {
        if let Session::Ready(mut engine) = std::mem::replace(&mut self.session, Session::Closed) {
            match engine.close() {
                Ok(()) => log::info!("Closed NES environment"),
                Err(e) => log::error!("close() failed: {}", e),
            }
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.session, Session::Ready(_))
    }

    /// Path the session was opened from
    pub fn rom_path(&self) -> &Path {
        &self.rom_path
    }

    /// File name of the ROM, for display
    pub fn rom_name(&self) -> String {
        self.rom_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.rom_path.display().to_string())
    }
}

impl Drop for NesSystem {
    fn drop(&mut self) {
        self.close();
    }
}
