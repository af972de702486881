//! In-memory display for tests: records every call.

use super::{Display, DisplayError, Font, Rgb};

/// A recorded `draw_text` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub x: i32,
    pub y: i32,
    pub color: Rgb,
    pub font: Font,
    pub text: String,
}

/// One call made on the display, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Clear,
    Draw(DrawCall),
    Present,
}

/// Records calls; `frames` holds the draws of each presented frame.
#[derive(Debug, Default)]
pub struct MemoryDisplay {
    pub calls: Vec<Call>,
    pub frames: Vec<Vec<DrawCall>>,
    pending: Vec<DrawCall>,
}

impl MemoryDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last presented frame.
    pub fn last_frame(&self) -> &[DrawCall] {
        self.frames.last().map_or(&[], Vec::as_slice)
    }

    /// Text drawn at baseline `y` in the last frame.
    pub fn text_at(&self, y: i32) -> Option<&str> {
        self.last_frame().iter().find(|d| d.y == y).map(|d| d.text.as_str())
    }
}

impl Display for MemoryDisplay {
    fn clear(&mut self) {
        self.pending.clear();
        self.calls.push(Call::Clear);
    }

    fn draw_text(&mut self, x: i32, y: i32, color: Rgb, font: Font, text: &str) {
        let call = DrawCall {
            x,
            y,
            color,
            font,
            text: text.to_string(),
        };
        self.pending.push(call.clone());
        self.calls.push(Call::Draw(call));
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        self.frames.push(std::mem::take(&mut self.pending));
        self.calls.push(Call::Present);
        Ok(())
    }
}
