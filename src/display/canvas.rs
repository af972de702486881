//! Canvas: a grid of character cells standing in for the LED panel.
//!
//! Cells are stored row-major in one contiguous `Vec`. Every cell is one
//! column wide except wide (CJK) glyphs, which take two columns; the second
//! is a continuation cell the renderer skips.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// True-color RGB representation.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black, an unlit LED.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// The clock's default amber text color.
    pub const AMBER: Self = Self::new(255, 235, 59);
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<[u8; 3]> for Rgb {
    #[inline]
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

/// One character position on the canvas.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    ch: char,
    /// Display width: 1 normally, 2 for wide glyphs, 0 for a continuation.
    width: u8,
    fg: Rgb,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// A dark cell.
    pub const EMPTY: Self = Self {
        ch: ' ',
        width: 1,
        fg: Rgb::BLACK,
    };

    const CONTINUATION: Self = Self {
        ch: ' ',
        width: 0,
        fg: Rgb::BLACK,
    };

    /// A lit cell showing `ch`.
    #[inline]
    pub const fn new(ch: char, fg: Rgb) -> Self {
        Self { ch, width: 1, fg }
    }

    /// The character shown.
    #[inline]
    pub const fn ch(&self) -> char {
        self.ch
    }

    /// The foreground color.
    #[inline]
    pub const fn fg(&self) -> Rgb {
        self.fg
    }

    /// Display width (0, 1, or 2).
    #[inline]
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Check if this is the second half of a wide glyph.
    #[inline]
    pub const fn is_continuation(&self) -> bool {
        self.width == 0
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell")
            .field("ch", &self.ch)
            .field("width", &self.width)
            .field("fg", &self.fg)
            .finish()
    }
}

/// A grid of cells.
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    cells: Vec<Cell>,
    width: u16,
    height: u16,
}

impl Canvas {
    /// Create a dark canvas.
    ///
    /// # Panics
    /// Panics if width or height is 0.
    pub fn new(width: u16, height: u16) -> Self {
        assert!(width > 0 && height > 0, "Canvas dimensions must be non-zero");
        Self {
            cells: vec![Cell::EMPTY; usize::from(width) * usize::from(height)],
            width,
            height,
        }
    }

    /// Width in columns.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in rows.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// The cells, row-major.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    fn index_of(&self, col: u16, row: u16) -> Option<usize> {
        (col < self.width && row < self.height)
            .then(|| usize::from(row) * usize::from(self.width) + usize::from(col))
    }

    /// The cell at (col, row), if in bounds.
    #[inline]
    pub fn get(&self, col: u16, row: u16) -> Option<&Cell> {
        self.index_of(col, row).map(|i| &self.cells[i])
    }

    /// Darken every cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::EMPTY);
    }

    /// Write `text` starting at column `col` of `row`, clipping at both edges.
    ///
    /// `col` may be negative: the leading graphemes that fall left of the
    /// canvas are skipped, which is how the ticker scrolls off the left side.
    pub fn put_str(&mut self, col: i32, row: i32, text: &str, fg: Rgb) {
        let Ok(row) = u16::try_from(row) else {
            return;
        };
        if row >= self.height {
            return;
        }

        let mut col = col;
        for grapheme in text.graphemes(true) {
            if col >= i32::from(self.width) {
                break;
            }
            let width = UnicodeWidthStr::width(grapheme).max(1);
            if let Ok(c) = u16::try_from(col) {
                self.put_grapheme(c, row, grapheme, width, fg);
            }
            col += i32::try_from(width).unwrap_or(1);
        }
    }

    fn put_grapheme(&mut self, col: u16, row: u16, grapheme: &str, width: usize, fg: Rgb) {
        let Some(idx) = self.index_of(col, row) else {
            return;
        };
        let ch = grapheme.chars().next().unwrap_or(' ');

        if width == 2 {
            // A wide glyph that would straddle the right edge is not drawn.
            let Some(next) = self.index_of(col + 1, row) else {
                return;
            };
            self.cells[idx] = Cell { ch, width: 2, fg };
            self.cells[next] = Cell::CONTINUATION;
        } else {
            self.cells[idx] = Cell::new(ch, fg);
        }
    }

    /// The text of one row, continuation cells omitted.
    pub fn row_text(&self, row: u16) -> String {
        (0..self.width)
            .filter_map(|col| self.get(col, row))
            .filter(|cell| !cell.is_continuation())
            .map(Cell::ch)
            .collect()
    }
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
