//! Desktop window
//!
//! egui layout around a [`Shell`]: the button row, the canvas, the status
//! line, keyboard forwarding and the native file dialog.

use std::time::Instant;

use egui::{Color32, RichText};

use crate::controller::Key;
use crate::engine::EngineLoader;
use crate::screen::Screen;
use crate::shell::Shell;
use crate::timer::FrameTimer;

pub const WINDOW_TITLE: &str = "NESTICLE-TK";
pub const WINDOW_SIZE: [f32; 2] = [600.0, 480.0];

const BACKGROUND: Color32 = Color32::from_rgb(0x1a, 0x1a, 0x1a);
const BUTTON_BAR: Color32 = Color32::from_rgb(0x2e, 0x2e, 0x2e);
const BUTTON_FILL: Color32 = Color32::from_rgb(0x4a, 0x4a, 0x4a);
const STATUS_BAR: Color32 = Color32::from_rgb(0x1e, 0x1e, 0x1e);

/// Translate an egui key into a host key
pub fn host_key(key: egui::Key) -> Option<Key> {
    let key = match key {
        egui::Key::ArrowUp => Key::Up,
        egui::Key::ArrowDown => Key::Down,
        egui::Key::ArrowLeft => Key::Left,
        egui::Key::ArrowRight => Key::Right,
        egui::Key::Enter => Key::Return,
        egui::Key::Space => Key::Space,
        egui::Key::Escape => Key::Escape,
        egui::Key::Tab => Key::Tab,
        other => {
            let mut chars = other.name().chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                _ => return None,
            }
        }
    };
    Some(key)
}

pub struct NesticleApp<L: EngineLoader> {
    shell: Shell<L, Screen, FrameTimer>,
    shift_down: bool,
}

impl<L: EngineLoader> NesticleApp<L> {
    pub fn new(ctx: &egui::Context, loader: L) -> Self {
        let shell = Shell::new(
            loader,
            Screen::new(ctx.clone()),
            FrameTimer::new(ctx.clone()),
        );
        Self {
            shell,
            shift_down: false,
        }
    }

    fn open_rom_dialog(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Select NES ROM")
            .add_filter("NES ROM", &["nes"])
            .add_filter("All", &["*"])
            .pick_file();
        let Some(path) = picked else {
            return;
        };

        if let Err(e) = self.shell.load_rom(&path) {
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Error)
                .set_title("Error")
                .set_description(e.to_string())
                .set_buttons(rfd::MessageButtons::Ok)
                .show();
        }
    }

    fn handle_keys(&mut self, ctx: &egui::Context) {
        let (events, shift) = ctx.input(|i| (i.events.clone(), i.modifiers.shift));

        for event in events {
            if let egui::Event::Key { key, pressed, .. } = event {
                let Some(key) = host_key(key) else {
                    continue;
                };
                if pressed {
                    self.shell.key_down(key);
                } else {
                    self.shell.key_up(key);
                }
            }
        }

        // Shift only shows up as a modifier.
        if shift != self.shift_down {
            self.shift_down = shift;
            if shift {
                self.shell.key_down(Key::ShiftLeft);
            } else {
                self.shell.key_up(Key::ShiftLeft);
            }
        }
    }

    fn render_controls(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("controls")
            .frame(egui::Frame::none().fill(BUTTON_BAR).inner_margin(5.0))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if control_button(ui, true, "Load ROM") {
                        self.open_rom_dialog();
                    }

                    let enabled = self.shell.controls_enabled();
                    if control_button(ui, enabled, self.shell.run_label()) {
                        self.shell.toggle_run();
                    }
                    if control_button(ui, enabled, "Reset") {
                        self.shell.reset();
                    }
                });
            });
    }

    fn render_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar")
            .frame(egui::Frame::none().fill(STATUS_BAR).inner_margin(4.0))
            .show(ctx, |ui| {
                ui.label(RichText::new(self.shell.status().to_string()).color(Color32::GREEN));
            });
    }

    fn render_canvas(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(BACKGROUND))
            .show(ctx, |ui| {
                ui.add_space(10.0);
                ui.vertical_centered(|ui| self.shell.sink().show(ui));
            });
    }
}

/// Draw one button of the control row and report a click. Buttons never keep
/// keyboard focus, otherwise Enter would click them instead of pressing Start.
fn control_button(ui: &mut egui::Ui, enabled: bool, label: &str) -> bool {
    let button = egui::Button::new(RichText::new(label).monospace().color(Color32::WHITE)).fill(BUTTON_FILL);
    let response = ui.add_enabled(enabled, button);
    response.surrender_focus();
    response.clicked()
}

impl<L: EngineLoader> eframe::App for NesticleApp<L> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_keys(ctx);

        if self.shell.timer_mut().take_due(Instant::now()) {
            self.shell.tick();
        }
        self.shell.timer().request_wakeup(Instant::now());

        self.render_controls(ctx);
        self.render_status_bar(ctx);
        self.render_canvas(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shell.shutdown();
    }
}
