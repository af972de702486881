//! Display: the surface a composed frame is drawn on.
//!
//! The render loop talks to a [`Display`] in a fixed order every tick:
//! `clear` → `draw_text` (time, date, ticker) → `present`. Coordinates are in
//! panel pixels with `y` as the text baseline, matching an LED matrix driver.
//!
//! - [`canvas`]: character-cell grid emulating the panel
//! - [`diff`]: minimal ANSI output between two canvases
//! - [`TerminalDisplay`]: the panel emulated in a terminal

pub mod canvas;
pub mod diff;
pub mod terminal;

#[cfg(test)]
pub(crate) mod memory;

pub use canvas::{Canvas, Cell, Rgb};
pub use terminal::TerminalDisplay;

#[cfg(test)]
pub(crate) use memory::{Call, MemoryDisplay};

use std::io;
use thiserror::Error;

/// Rendering failure. Not recoverable: the display is the clock's only output.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// Writing to the output failed.
    #[error("display I/O error: {0}")]
    Io(#[from] io::Error),

    /// The output cannot fit the panel.
    #[error("terminal is {cols}x{rows}, panel needs {needed_cols}x{needed_rows}")]
    TooSmall {
        /// Available columns.
        cols: u16,
        /// Available rows.
        rows: u16,
        /// Columns the panel needs.
        needed_cols: u16,
        /// Rows the panel needs.
        needed_rows: u16,
    },
}

/// Bitmap font sizes used on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    /// 5x7 font: date line and ticker.
    Small,
    /// 7x13 font: time line.
    Large,
}

impl Font {
    /// Horizontal advance per glyph in pixels.
    #[inline]
    pub const fn glyph_width(self) -> i32 {
        match self {
            Self::Small => 5,
            Self::Large => 7,
        }
    }
}

/// A surface frames are drawn on.
pub trait Display {
    /// Start a new frame: everything dark.
    fn clear(&mut self);

    /// Draw `text` with its left edge at `x` and baseline at `y` (pixels).
    ///
    /// `x` may be negative or past the right edge; the text is clipped.
    fn draw_text(&mut self, x: i32, y: i32, color: Rgb, font: Font, text: &str);

    /// Show the frame.
    fn present(&mut self) -> Result<(), DisplayError>;
}
