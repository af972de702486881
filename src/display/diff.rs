//! Diffing: minimal ANSI output to move the terminal from one canvas to the next.
//!
//! 1. Compare the shown and the next canvas cell by cell
//! 2. Skip the cursor move when the next changed cell is adjacent
//! 3. Only emit a color when it differs from the last one emitted
//!
//! Output accumulates in one byte buffer so a frame is flushed with a single write.

use super::canvas::{Canvas, Cell, Rgb};
use std::io::Write;

/// What the terminal currently looks like, as far as the renderer knows.
#[derive(Debug, Clone)]
pub struct DiffState {
    cursor_x: u16,
    cursor_y: u16,
    fg: Option<Rgb>,
}

impl Default for DiffState {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffState {
    /// Cursor at home, color unknown.
    pub const fn new() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            fg: None,
        }
    }

    /// Forget everything (e.g., after a full redraw).
    pub const fn reset(&mut self) {
        self.fg = None;
        // Force a cursor move on the next write.
        self.cursor_x = u16::MAX;
        self.cursor_y = u16::MAX;
    }
}

/// Counters from one diff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffResult {
    /// Cells that were different.
    pub cells_changed: usize,
    /// Cursor move sequences emitted.
    pub cursor_moves: usize,
    /// Color sequences emitted.
    pub color_changes: usize,
}

/// Append the sequences that turn `current` into `next`.
pub fn render_diff(current: &Canvas, next: &Canvas, output: &mut Vec<u8>, state: &mut DiffState) -> DiffResult {
    debug_assert_eq!(current.width(), next.width());
    debug_assert_eq!(current.height(), next.height());

    let mut result = DiffResult::default();
    let width = usize::from(next.width());

    for (idx, (shown, wanted)) in current.cells().iter().zip(next.cells()).enumerate() {
        if shown == wanted || wanted.is_continuation() {
            continue;
        }
        result.cells_changed += 1;

        let x = u16::try_from(idx % width).unwrap_or(u16::MAX);
        let y = u16::try_from(idx / width).unwrap_or(u16::MAX);
        if state.cursor_x != x || state.cursor_y != y {
            emit_cursor_move(output, x, y);
            state.cursor_x = x;
            state.cursor_y = y;
            result.cursor_moves += 1;
        }

        if state.fg != Some(wanted.fg()) {
            emit_fg_color(output, wanted.fg());
            state.fg = Some(wanted.fg());
            result.color_changes += 1;
        }

        emit_cell(output, wanted);
        state.cursor_x = state.cursor_x.saturating_add(u16::from(wanted.width().max(1)));
    }

    result
}

/// Append a full repaint of `canvas`, ignoring what is on screen.
pub fn render_full(canvas: &Canvas, output: &mut Vec<u8>) {
    output.extend_from_slice(b"\x1b[H\x1b[48;2;0;0;0m");

    let mut last_fg: Option<Rgb> = None;
    for (y, row) in canvas.cells().chunks(usize::from(canvas.width())).enumerate() {
        if y > 0 {
            output.extend_from_slice(b"\r\n");
        }
        for cell in row.iter().filter(|c| !c.is_continuation()) {
            if last_fg != Some(cell.fg()) {
                emit_fg_color(output, cell.fg());
                last_fg = Some(cell.fg());
            }
            emit_cell(output, cell);
        }
    }

    output.extend_from_slice(b"\x1b[0m");
}

/// Emit a cursor move, using the short forms where possible.
#[inline]
fn emit_cursor_move(output: &mut Vec<u8>, x: u16, y: u16) {
    // ANSI uses 1-indexed positions
    let row = u32::from(y) + 1;
    let col = u32::from(x) + 1;

    if row == 1 && col == 1 {
        output.extend_from_slice(b"\x1b[H");
    } else if col == 1 {
        let _ = write!(output, "\x1b[{row}H");
    } else {
        let _ = write!(output, "\x1b[{row};{col}H");
    }
}

#[inline]
fn emit_fg_color(output: &mut Vec<u8>, color: Rgb) {
    let _ = write!(output, "\x1b[38;2;{};{};{}m", color.r, color.g, color.b);
}

#[inline]
fn emit_cell(output: &mut Vec<u8>, cell: &Cell) {
    let mut utf8 = [0u8; 4];
    output.extend_from_slice(cell.ch().encode_utf8(&mut utf8).as_bytes());
}
