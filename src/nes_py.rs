//! nes_py backend
//!
//! Embeds the Python interpreter and drives `nes_py.NESEnv`. The engine's
//! screen is a `(240, 256, 3)` uint8 array that nes_py rewrites in place, so
//! it is copied out after every reset and step.

use std::path::Path;

use numpy::PyReadonlyArray3;
use pyo3::exceptions::PyImportError;
use pyo3::prelude::*;

use crate::engine::{Engine, EngineError, EngineLoader, FRAME_CHANNELS, FRAME_HEIGHT, FRAME_LEN, FRAME_WIDTH};

/// One `NESEnv` instance
pub struct NesPyEngine {
    env: Option<PyObject>,
    frame: Vec<u8>,
    has_frame: bool,
}

impl NesPyEngine {
    /// Construct `nes_py.NESEnv(path)`
    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let env = Python::with_gil(|py| -> PyResult<PyObject> {
            let nes_py = py.import("nes_py")?;
            let env = nes_py
                .getattr("NESEnv")?
                .call1((path.to_string_lossy().into_owned(),))?;
            Ok(env.into_py(py))
        })
        .map_err(|e| {
            let missing = Python::with_gil(|py| e.is_instance_of::<PyImportError>(py));
            if missing {
                EngineError::Unavailable(e.to_string())
            } else {
                EngineError::Fault(e.to_string())
            }
        })?;

        Ok(Self {
            env: Some(env),
            frame: vec![0; FRAME_LEN],
            has_frame: false,
        })
    }

    fn env(&self) -> Result<&PyObject, EngineError> {
        self.env
            .as_ref()
            .ok_or_else(|| EngineError::Fault("environment has been closed".into()))
    }

    /// Copy `env.screen` into the local frame buffer
    fn refresh_screen(&mut self, py: Python<'_>) -> PyResult<()> {
        let Some(env) = self.env.as_ref() else {
            self.has_frame = false;
            return Ok(());
        };

        let screen = env.getattr(py, "screen")?;
        let screen = screen.as_ref(py);
        if screen.is_none() {
            self.has_frame = false;
            return Ok(());
        }

        let array: PyReadonlyArray3<'_, u8> = screen.extract()?;
        let view = array.as_array();
        if view.shape() != [FRAME_HEIGHT, FRAME_WIDTH, FRAME_CHANNELS] {
            log::warn!("Unexpected screen shape {:?}", view.shape());
            self.has_frame = false;
            return Ok(());
        }

        self.frame.clear();
        self.frame.extend(view.iter().copied());
        self.has_frame = true;
        Ok(())
    }
}

impl Engine for NesPyEngine {
    fn reset(&mut self) -> Result<(), EngineError> {
        let env = self.env()?.clone();
        Python::with_gil(|py| {
            env.call_method0(py, "reset")?;
            self.refresh_screen(py)
        })
        .map_err(|e| EngineError::Fault(e.to_string()))
    }

    fn step(&mut self, buttons: u8) -> Result<(), EngineError> {
        let env = self.env()?.clone();
        Python::with_gil(|py| {
            env.call_method1(py, "step", (buttons,))?;
            self.refresh_screen(py)
        })
        .map_err(|e| EngineError::Fault(e.to_string()))
    }

    fn screen(&self) -> Option<&[u8]> {
        self.has_frame.then_some(self.frame.as_slice())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        let Some(env) = self.env.take() else {
            return Ok(());
        };
        self.has_frame = false;
        Python::with_gil(|py| env.call_method0(py, "close").map(drop))
            .map_err(|e| EngineError::Fault(e.to_string()))
    }
}

impl Drop for NesPyEngine {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::error!("close() failed: {}", e);
        }
    }
}

/// Opens [`NesPyEngine`] sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct NesPyLoader;

impl EngineLoader for NesPyLoader {
    fn open(&mut self, path: &Path) -> Result<Box<dyn Engine>, EngineError> {
        Ok(Box::new(NesPyEngine::open(path)?))
    }
}
