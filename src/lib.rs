//! NESTICLE
//!
//! A desktop front-end for an external NES emulation engine:
//! - Engine capability traits and the nes_py backend
//! - Emulator handle with fail-closed stepping
//! - Keyboard to controller bitmask mapping
//! - Frame rendering into an egui canvas
//! - The load / run / pause / reset shell and its frame timer

pub mod app;
pub mod controller;
pub mod engine;
pub mod error;
#[cfg(feature = "nes-py")]
pub mod nes_py;
pub mod screen;
pub mod shell;
pub mod system;
pub mod testing;
pub mod timer;

pub use controller::{Button, Controller, Key, KEY_MAP};
pub use engine::{Engine, EngineError, EngineLoader, FRAME_CHANNELS, FRAME_HEIGHT, FRAME_LEN, FRAME_WIDTH};
pub use error::FrontendError;
pub use screen::{FrameSink, RenderError, Screen};
pub use shell::{Phase, Shell, Status, TICK_INTERVAL};
pub use system::NesSystem;
pub use timer::{FrameTimer, Scheduler};
