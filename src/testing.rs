//! Testing utilities for the front-end
//!
//! Scripted stand-ins for the engine, the timer and the canvas, so the shell
//! can be driven without a window or the Python engine.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use crate::engine::{Engine, EngineError, EngineLoader, FRAME_LEN};
use crate::screen::{check_frame, FrameSink, RenderError};
use crate::timer::Scheduler;

/// Calls observed by scripted engines, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Open(PathBuf),
    Reset(PathBuf),
    Step(PathBuf, u8),
    Close(PathBuf),
}

/// Shared call log, readable after the engine has been moved into a shell
#[derive(Debug, Clone, Default)]
pub struct EngineProbe {
    events: Rc<RefCell<Vec<EngineEvent>>>,
}

impl EngineProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, event: EngineEvent) {
        self.events.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.borrow().clone()
    }

    pub fn steps(&self) -> usize {
        self.count(|e| matches!(e, EngineEvent::Step(..)))
    }

    pub fn resets(&self) -> usize {
        self.count(|e| matches!(e, EngineEvent::Reset(_)))
    }

    pub fn closes(&self) -> usize {
        self.count(|e| matches!(e, EngineEvent::Close(_)))
    }

    /// Controller masks passed to `step`, oldest first
    pub fn step_inputs(&self) -> Vec<u8> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                EngineEvent::Step(_, buttons) => Some(*buttons),
                _ => None,
            })
            .collect()
    }

    fn count(&self, pred: impl Fn(&EngineEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

/// How a scripted engine behaves. Step numbers count from 1 per session.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// `step` fails from this call on
    pub fail_from_step: Option<usize>,
    /// `screen` returns nothing after this step and later ones
    pub null_from_step: Option<usize>,
    /// `reset` fails
    pub fail_reset: bool,
    /// Length of the frame handed out, `FRAME_LEN` when `None`
    pub frame_len: Option<usize>,
}

/// Engine that follows a [`Script`] and records every call
pub struct ScriptedEngine {
    path: PathBuf,
    script: Script,
    probe: EngineProbe,
    frame: Vec<u8>,
    steps: usize,
    has_frame: bool,
}

impl ScriptedEngine {
    pub fn new(path: &Path, script: Script, probe: EngineProbe) -> Self {
        let frame = vec![0u8; script.frame_len.unwrap_or(FRAME_LEN)];
        Self {
            path: path.to_path_buf(),
            script,
            probe,
            frame,
            steps: 0,
            has_frame: false,
        }
    }
}

impl Engine for ScriptedEngine {
    fn reset(&mut self) -> Result<(), EngineError> {
        self.probe.record(EngineEvent::Reset(self.path.clone()));
        if self.script.fail_reset {
            return Err(EngineError::Fault("scripted reset failure".into()));
        }
        self.has_frame = true;
        Ok(())
    }

    fn step(&mut self, buttons: u8) -> Result<(), EngineError> {
        self.steps += 1;
        self.probe.record(EngineEvent::Step(self.path.clone(), buttons));
        if self.script.fail_from_step.is_some_and(|n| self.steps >= n) {
            return Err(EngineError::Fault(format!("scripted failure on step {}", self.steps)));
        }
        self.has_frame = !self.script.null_from_step.is_some_and(|n| self.steps >= n);
        // Frame content tracks the step count so paints can be told apart.
        self.frame.fill(self.steps as u8);
        Ok(())
    }

    fn screen(&self) -> Option<&[u8]> {
        self.has_frame.then_some(self.frame.as_slice())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.probe.record(EngineEvent::Close(self.path.clone()));
        Ok(())
    }
}

/// Loader handing out [`ScriptedEngine`]s that share one probe
pub struct ScriptedLoader {
    script: Script,
    probe: EngineProbe,
    rejected: HashSet<PathBuf>,
}

impl ScriptedLoader {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            probe: EngineProbe::new(),
            rejected: HashSet::new(),
        }
    }

    /// Make opening `path` fail
    pub fn reject(mut self, path: impl Into<PathBuf>) -> Self {
        self.rejected.insert(path.into());
        self
    }

    pub fn probe(&self) -> EngineProbe {
        self.probe.clone()
    }
}

impl EngineLoader for ScriptedLoader {
    fn open(&mut self, path: &Path) -> Result<Box<dyn Engine>, EngineError> {
        if self.rejected.contains(path) {
            return Err(EngineError::Fault(format!("not a valid ROM: {}", path.display())));
        }
        self.probe.record(EngineEvent::Open(path.to_path_buf()));
        Ok(Box::new(ScriptedEngine::new(path, self.script.clone(), self.probe.clone())))
    }
}

/// Timer that only fires when told to
#[derive(Debug, Default)]
pub struct ManualTimer {
    pending: Option<Duration>,
    scheduled: Vec<Duration>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disarm and report whether a tick was pending
    pub fn fire(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn pending(&self) -> Option<Duration> {
        self.pending
    }

    /// Every delay ever scheduled, oldest first
    pub fn scheduled(&self) -> &[Duration] {
        &self.scheduled
    }
}

impl Scheduler for ManualTimer {
    fn schedule(&mut self, delay: Duration) {
        self.pending = Some(delay);
        self.scheduled.push(delay);
    }

    fn cancel(&mut self) {
        self.pending = None;
    }

    fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Canvas that keeps a copy of the last successful paint
#[derive(Debug, Default)]
pub struct RecordingSink {
    paints: usize,
    failures: usize,
    last: Option<Vec<u8>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Successful paints
    pub fn paints(&self) -> usize {
        self.paints
    }

    pub fn failures(&self) -> usize {
        self.failures
    }

    pub fn last_frame(&self) -> Option<&[u8]> {
        self.last.as_deref()
    }
}

impl FrameSink for RecordingSink {
    fn paint(&mut self, frame: &[u8]) -> Result<(), RenderError> {
        if let Err(e) = check_frame(frame) {
            self.failures += 1;
            return Err(e);
        }
        self.paints += 1;
        self.last = Some(frame.to_vec());
        Ok(())
    }
}
