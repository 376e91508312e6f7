//! Render sink
//!
//! Turns engine frames into an egui texture and draws it into the fixed
//! 256x240 viewport.

use std::fmt;

use egui::{Color32, ColorImage, TextureHandle, TextureOptions};

use crate::engine::{FRAME_HEIGHT, FRAME_LEN, FRAME_WIDTH};

/// Anything frames can be painted into
pub trait FrameSink {
    fn paint(&mut self, frame: &[u8]) -> Result<(), RenderError>;
}

/// Frame conversion failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    BadLength { expected: usize, actual: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::BadLength { expected, actual } => {
                write!(f, "frame is {} bytes, expected {}", actual, expected)
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// Check that `frame` is one full RGB picture
pub fn check_frame(frame: &[u8]) -> Result<(), RenderError> {
    if frame.len() != FRAME_LEN {
        return Err(RenderError::BadLength {
            expected: FRAME_LEN,
            actual: frame.len(),
        });
    }
    Ok(())
}

/// Convert a row-major RGB frame to an egui image
pub fn to_color_image(frame: &[u8]) -> Result<ColorImage, RenderError> {
    check_frame(frame)?;
    Ok(ColorImage::from_rgb([FRAME_WIDTH, FRAME_HEIGHT], frame))
}

/// The on-screen canvas. Holds a single texture that is overwritten in place
/// on every paint.
pub struct Screen {
    ctx: egui::Context,
    texture: Option<TextureHandle>,
}

impl Screen {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx, texture: None }
    }

    pub fn texture(&self) -> Option<&TextureHandle> {
        self.texture.as_ref()
    }

    /// Draw the canvas at native resolution with a 1px white border
    pub fn show(&self, ui: &mut egui::Ui) {
        let size = egui::vec2(FRAME_WIDTH as f32, FRAME_HEIGHT as f32);
        let (rect, _) = ui.allocate_exact_size(size, egui::Sense::hover());
        let painter = ui.painter();

        painter.rect_filled(rect, 0.0, Color32::BLACK);
        if let Some(texture) = &self.texture {
            let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
            painter.image(texture.id(), rect, uv, Color32::WHITE);
        }
        painter.rect_stroke(rect.expand(1.0), 0.0, egui::Stroke::new(1.0, Color32::WHITE));
    }
}

impl FrameSink for Screen {
    fn paint(&mut self, frame: &[u8]) -> Result<(), RenderError> {
        let image = to_color_image(frame)?;
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(self.ctx.load_texture("nes_screen", image, TextureOptions::NEAREST));
            }
        }
        Ok(())
    }
}
