//! Application shell
//!
//! The toolkit-independent half of the front-end: the load / run / pause /
//! reset state machine and the timer-driven frame loop. The egui layer in
//! `app` only forwards clicks, key events and timer expiry to this type.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use crate::controller::{Controller, Key};
use crate::engine::EngineLoader;
use crate::error::FrontendError;
use crate::screen::FrameSink;
use crate::system::NesSystem;
use crate::timer::Scheduler;

/// Delay between the end of one tick and the start of the next
pub const TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Where the shell is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NoRom,
    Paused,
    Running,
    Terminated,
}

/// Text shown in the status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    NoRom,
    Loaded(String),
    LoadFailed,
    Running,
    Paused,
    Reset,
    FrameError,
    GameOver,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NoRom => write!(f, "No ROM loaded"),
            Status::Loaded(name) => write!(f, "Loaded: {}", name),
            Status::LoadFailed => write!(f, "Load failed"),
            Status::Running => write!(f, "Running"),
            Status::Paused => write!(f, "Paused"),
            Status::Reset => write!(f, "Reset"),
            Status::FrameError => write!(f, "Frame error"),
            Status::GameOver => write!(f, "Game Over"),
        }
    }
}

pub struct Shell<L, S, T> {
    loader: L,
    sink: S,
    timer: T,
    system: Option<NesSystem>,
    controller: Controller,
    phase: Phase,
    status: Status,
    last_error: Option<FrontendError>,
}

impl<L, S, T> Shell<L, S, T>
where
    L: EngineLoader,
    S: FrameSink,
    T: Scheduler,
{
    pub fn new(loader: L, sink: S, timer: T) -> Self {
        Self {
            loader,
            sink,
            timer,
            system: None,
            controller: Controller::new(),
            phase: Phase::NoRom,
            status: Status::NoRom,
            last_error: None,
        }
    }

    /// Open `path`, replacing any loaded ROM. The previous session is closed
    /// before the new one is opened, so a failed load leaves no ROM at all.
    pub fn load_rom(&mut self, path: &Path) -> Result<(), FrontendError> {
        if self.phase == Phase::Terminated {
            return Ok(());
        }

        self.timer.cancel();
        if let Some(mut previous) = self.system.take() {
            previous.close();
        }
        self.phase = Phase::NoRom;

        let system = match NesSystem::open(&mut self.loader, path) {
            Ok(system) => system,
            Err(e) => {
                log::error!("{}", e);
                self.status = Status::LoadFailed;
                self.last_error = Some(e.clone());
                return Err(e);
            }
        };

        match system.frame() {
            Some(frame) => {
                log::info!("Got initial frame: {} bytes", frame.len());
                if let Err(e) = self.sink.paint(frame) {
                    log::error!("Render frame failed: {}", e);
                    self.last_error = Some(e.into());
                }
            }
            None => log::info!("Initial frame is None"),
        }

        self.status = Status::Loaded(system.rom_name());
        self.system = Some(system);
        self.phase = Phase::Paused;
        Ok(())
    }

    /// The Start/Pause button
    pub fn toggle_run(&mut self) {
        match self.phase {
            Phase::Paused => self.start(),
            Phase::Running => self.pause(),
            Phase::NoRom | Phase::Terminated => {}
        }
    }

    /// Begin ticking. The first tick fires as soon as the toolkit gets
    /// around to it.
    pub fn start(&mut self) {
        if self.phase != Phase::Paused {
            return;
        }
        self.phase = Phase::Running;
        self.status = Status::Running;
        self.timer.schedule(Duration::ZERO);
    }

    pub fn pause(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        self.timer.cancel();
        self.phase = Phase::Paused;
        self.status = Status::Paused;
    }

    /// Restart the loaded ROM and repaint. Always lands in `Paused`.
    pub fn reset(&mut self) {
        if !matches!(self.phase, Phase::Paused | Phase::Running) {
            return;
        }
        self.timer.cancel();
        self.phase = Phase::Paused;

        if let Some(system) = self.system.as_mut() {
            system.reset();
            if let Some(frame) = system.frame() {
                if let Err(e) = self.sink.paint(frame) {
                    log::error!("Render frame failed: {}", e);
                    self.last_error = Some(e.into());
                }
            }
        }
        self.status = Status::Reset;
    }

    /// One step-then-paint cycle. Called when the pending timer expires.
    pub fn tick(&mut self) {
        if self.phase != Phase::Running {
            return;
        }
        let Some(system) = self.system.as_mut() else {
            return;
        };

        let (frame, done) = system.step(self.controller.bitmask());
        let has_frame = frame.is_some();
        if let Some(frame) = frame {
            if let Err(e) = self.sink.paint(frame) {
                log::error!("Render frame failed: {}", e);
                self.last_error = Some(e.into());
            }
        }

        if done {
            self.phase = Phase::Paused;
            self.status = Status::GameOver;
            if !has_frame {
                self.last_error = Some(FrontendError::FrameStepFailed);
            }
        } else if !has_frame {
            log::warn!("Frame from step() is None");
            self.phase = Phase::Paused;
            self.status = Status::FrameError;
            self.last_error = Some(FrontendError::FrameNullUnexpected);
        } else {
            self.timer.schedule(TICK_INTERVAL);
        }
    }

    pub fn key_down(&mut self, key: Key) {
        self.controller.key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.controller.key_up(key);
    }

    /// Window close. Cancels the loop and releases the engine; every later
    /// call is ignored.
    pub fn shutdown(&mut self) {
        if self.phase == Phase::Terminated {
            return;
        }
        self.timer.cancel();
        if let Some(mut system) = self.system.take() {
            system.close();
        }
        self.phase = Phase::Terminated;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Label for the Start/Pause button
    pub fn run_label(&self) -> &'static str {
        if self.phase == Phase::Running {
            "Pause"
        } else {
            "Start"
        }
    }

    /// Whether Start/Pause and Reset accept clicks
    pub fn controls_enabled(&self) -> bool {
        self.system.is_some()
    }

    pub fn last_error(&self) -> Option<&FrontendError> {
        self.last_error.as_ref()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn system(&self) -> Option<&NesSystem> {
        self.system.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}
