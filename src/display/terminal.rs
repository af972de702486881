//! Terminal display: the LED panel emulated with ANSI true-color text.
//!
//! Pixel coordinates are quantized to character cells: one column per
//! small-font glyph advance and one row per text line. Frames are double
//! buffered; only cells that changed since the last present are written,
//! in a single write per frame.

use super::canvas::{Canvas, Rgb};
use super::diff::{render_diff, render_full, DiffState};
use super::{Display, DisplayError, Font};
use crossterm::{
    cursor, execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};
use std::time::Instant;

/// Panel pixels per terminal column.
pub const PIXELS_PER_COLUMN: i32 = Font::Small.glyph_width();
/// Panel pixels per terminal row.
pub const PIXELS_PER_ROW: i32 = 8;

/// Render statistics for debugging.
#[derive(Debug, Clone, Copy, Default)]
struct RenderStats {
    frames: u64,
    bytes_written: u64,
    last_render_us: u64,
}

/// A [`Display`] that draws into a terminal (or any writer).
pub struct TerminalDisplay<W: Write = Stdout> {
    /// What is on screen.
    current: Canvas,
    /// What the frame being composed will show.
    next: Canvas,
    diff_state: DiffState,
    /// Pre-allocated output buffer.
    output: Vec<u8>,
    writer: W,
    needs_full_redraw: bool,
    /// Restore the terminal on drop.
    owns_terminal: bool,
    stats: RenderStats,
}

/// Terminal grid size for a panel of `width_px` x `height_px`.
pub fn grid_size(width_px: u16, height_px: u16) -> (u16, u16) {
    let cols = width_px.div_ceil(PIXELS_PER_COLUMN.unsigned_abs() as u16);
    let rows = height_px.div_ceil(PIXELS_PER_ROW.unsigned_abs() as u16);
    (cols.max(1), rows.max(1))
}

impl TerminalDisplay<Stdout> {
    /// Take over the terminal: alternate screen, hidden cursor.
    ///
    /// # Errors
    ///
    /// Returns [`DisplayError::TooSmall`] if the terminal cannot fit the
    /// panel, or an I/O error if terminal setup fails.
    pub fn new(width_px: u16, height_px: u16) -> Result<Self, DisplayError> {
        let (cols, rows) = terminal::size()?;
        let (needed_cols, needed_rows) = grid_size(width_px, height_px);
        if cols < needed_cols || rows < needed_rows {
            return Err(DisplayError::TooSmall {
                cols,
                rows,
                needed_cols,
                needed_rows,
            });
        }

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide, Clear(ClearType::All))?;

        let mut display = Self::with_writer(stdout, width_px, height_px);
        display.owns_terminal = true;
        Ok(display)
    }
}

impl<W: Write> TerminalDisplay<W> {
    /// Draw into an arbitrary writer without touching terminal modes.
    pub fn with_writer(writer: W, width_px: u16, height_px: u16) -> Self {
        let (cols, rows) = grid_size(width_px, height_px);
        Self {
            current: Canvas::new(cols, rows),
            next: Canvas::new(cols, rows),
            diff_state: DiffState::new(),
            output: Vec::with_capacity(4096),
            writer,
            needs_full_redraw: true,
            owns_terminal: false,
            stats: RenderStats::default(),
        }
    }

    /// The canvas currently on screen.
    pub const fn shown(&self) -> &Canvas {
        &self.current
    }

    /// The underlying writer.
    pub const fn writer(&self) -> &W {
        &self.writer
    }

    /// Frames presented so far.
    pub const fn frames(&self) -> u64 {
        self.stats.frames
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn clear(&mut self) {
        self.next.clear();
    }

    fn draw_text(&mut self, x: i32, y: i32, color: Rgb, _font: Font, text: &str) {
        let col = x.div_euclid(PIXELS_PER_COLUMN);
        let row = y.div_euclid(PIXELS_PER_ROW);
        self.next.put_str(col, row, text, color);
    }

    fn present(&mut self) -> Result<(), DisplayError> {
        let start = Instant::now();
        self.output.clear();

        if self.needs_full_redraw {
            render_full(&self.next, &mut self.output);
            self.needs_full_redraw = false;
            self.diff_state.reset();
        } else {
            render_diff(&self.current, &self.next, &mut self.output, &mut self.diff_state);
        }

        if !self.output.is_empty() {
            self.writer.write_all(&self.output)?;
            self.writer.flush()?;
        }

        self.current.clone_from(&self.next);

        self.stats.frames += 1;
        self.stats.bytes_written += self.output.len() as u64;
        self.stats.last_render_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);
        if self.stats.frames % 1000 == 0 {
            tracing::debug!(
                frames = self.stats.frames,
                bytes = self.stats.bytes_written,
                last_render_us = self.stats.last_render_us,
                "display stats"
            );
        }
        Ok(())
    }
}

impl<W: Write> Drop for TerminalDisplay<W> {
    fn drop(&mut self) {
        if !self.owns_terminal {
            return;
        }
        // Restore terminal state
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show, LeaveAlternateScreen);
    }
}

impl<W: Write> std::fmt::Debug for TerminalDisplay<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalDisplay")
            .field("grid", &(self.current.width(), self.current.height()))
            .field("frames", &self.stats.frames)
            .field("owns_terminal", &self.owns_terminal)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_size_for_standard_panel() {
        assert_eq!(grid_size(64, 32), (13, 4));
        assert_eq!(grid_size(128, 32), (26, 4));
    }

    #[test]
    fn test_pixel_to_cell_mapping() {
        let mut display = TerminalDisplay::with_writer(Vec::new(), 64, 32);
        display.clear();
        display.draw_text(2, 30, Rgb::AMBER, Font::Small, "Loading data");
        display.draw_text(10, 11, Rgb::AMBER, Font::Large, "1:05 PM");
        display.present().unwrap();

        assert_eq!(display.shown().row_text(3), "Loading data ");
        assert_eq!(display.shown().row_text(1), "  1:05 PM    ");
    }

    #[test]
    fn test_negative_x_scrolls_off_left() {
        let mut display = TerminalDisplay::with_writer(Vec::new(), 64, 32);
        display.clear();
        // -6px is two columns left of the panel's edge.
        display.draw_text(-6, 30, Rgb::AMBER, Font::Small, "abcdef");
        display.present().unwrap();
        assert!(display.shown().row_text(3).starts_with("cdef"));
    }

    #[test]
    fn test_second_frame_writes_only_changes() {
        let mut display = TerminalDisplay::with_writer(Vec::new(), 64, 32);
        display.clear();
        display.draw_text(0, 20, Rgb::AMBER, Font::Small, "Monday");
        display.present().unwrap();
        let after_first = display.writer().len();

        display.clear();
        display.draw_text(0, 20, Rgb::AMBER, Font::Small, "Monday");
        display.present().unwrap();
        assert_eq!(display.writer().len(), after_first);

        display.clear();
        display.draw_text(0, 20, Rgb::AMBER, Font::Small, "Mondax");
        display.present().unwrap();
        let written = &display.writer()[after_first..];
        assert!(written.ends_with(b"x"));
        assert_eq!(display.frames(), 3);
    }
}
