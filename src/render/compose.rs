//! Frame composition: turn the display state and the time into positioned text.
//!
//! ```text
//!  ┌──────────────────────────────┐
//!  │           1:05 PM            │  y=11  Large, centred
//!  │           Monday             │  y=20  Small, centred
//!  │ No weather data yet.    No m │  y=30  Small, x = scroll offset
//!  └──────────────────────────────┘
//! ```

use super::state::{DisplayState, Face};
use crate::display::{Display, DisplayError, Font, Rgb};
use chrono::{DateTime, Local};
use unicode_width::UnicodeWidthStr;

/// Baseline of the time line.
pub const TIME_BASELINE: i32 = 11;
/// Baseline of the date line.
pub const DATE_BASELINE: i32 = 20;
/// Baseline of the ticker.
pub const TICKER_BASELINE: i32 = 30;
/// Shown in place of the ticker while warming up.
pub const LOADING_TEXT: &str = "Loading data";
/// Left edge of the loading text.
pub const LOADING_X: i32 = 2;

/// One piece of text at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    /// Left edge in pixels.
    pub x: i32,
    /// Baseline in pixels.
    pub y: i32,
    /// Font the text is drawn in.
    pub font: Font,
    /// The text.
    pub text: String,
}

impl TextRun {
    /// A run horizontally centred on a panel `width` pixels wide.
    pub fn centred(width: i32, y: i32, font: Font, text: String) -> Self {
        let len = i32::try_from(UnicodeWidthStr::width(text.as_str())).unwrap_or(i32::MAX);
        let x = width.saturating_sub(len.saturating_mul(font.glyph_width())) / 2;
        Self { x, y, font, text }
    }
}

/// Everything drawn in one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Time line.
    pub time: TextRun,
    /// Date line.
    pub date: TextRun,
    /// Ticker, or the loading text while warming up.
    pub ticker: TextRun,
}

impl Frame {
    /// The runs in drawing order.
    pub const fn runs(&self) -> [&TextRun; 3] {
        [&self.time, &self.date, &self.ticker]
    }

    /// Hand the frame to the display: clear, draw each run, present.
    ///
    /// # Errors
    ///
    /// Propagates the display's failure to present.
    pub fn draw(&self, display: &mut dyn Display, color: Rgb) -> Result<(), DisplayError> {
        display.clear();
        for run in self.runs() {
            display.draw_text(run.x, run.y, color, run.font, &run.text);
        }
        display.present()
    }
}

/// The (date line, time line) text for `face` at `now`.
pub fn face_text(face: Face, now: &DateTime<Local>) -> (String, String) {
    match face {
        Face::ClockFace => (now.format("%A").to_string(), now.format("%-I:%M %p").to_string()),
        Face::DateFace => (
            now.format("%b %d, %Y").to_string(),
            now.format("%H:%M:%S").to_string(),
        ),
    }
}

/// Lay out one frame on a panel `width` pixels wide.
pub fn compose(state: &DisplayState, now: &DateTime<Local>, width: u16) -> Frame {
    let width = i32::from(width);
    let (date, time) = face_text(state.current_face(), now);

    let ticker = if state.is_warming_up() {
        TextRun {
            x: LOADING_X,
            y: TICKER_BASELINE,
            font: Font::Small,
            text: LOADING_TEXT.to_string(),
        }
    } else {
        TextRun {
            x: state.scroll_offset(),
            y: TICKER_BASELINE,
            font: Font::Small,
            text: state.ticker_text().to_string(),
        }
    };

    Frame {
        time: TextRun::centred(width, TIME_BASELINE, Font::Large, time),
        date: TextRun::centred(width, DATE_BASELINE, Font::Small, date),
        ticker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::{Call, MemoryDisplay};
    use crate::time::{Clock, ManualClock};
    use crate::topic::Topic;
    use std::time::Duration;

    #[test]
    fn test_clock_face_text() {
        let clock = ManualClock::at(2024, 3, 4, 13, 5, 9);
        let (date, time) = face_text(Face::ClockFace, &clock.now());
        assert_eq!(date, "Monday");
        assert_eq!(time, "1:05 PM");
    }

    #[test]
    fn test_date_face_text() {
        let clock = ManualClock::at(2024, 3, 4, 13, 5, 9);
        let (date, time) = face_text(Face::DateFace, &clock.now());
        assert_eq!(date, "Mar 04, 2024");
        assert_eq!(time, "13:05:09");
    }

    #[test]
    fn test_centred_positions() {
        // (64 - 7*7) / 2
        let run = TextRun::centred(64, TIME_BASELINE, Font::Large, "1:05 PM".into());
        assert_eq!(run.x, 7);
        // (64 - 12*5) / 2
        let run = TextRun::centred(64, DATE_BASELINE, Font::Small, "Mar 04, 2024".into());
        assert_eq!(run.x, 2);
        // Wider than the panel: truncates toward zero like the panel driver.
        let run = TextRun::centred(64, DATE_BASELINE, Font::Small, "Wednesday, really".into());
        assert_eq!(run.x, -10);
    }

    #[test]
    fn test_compose_warming_up_shows_loading() {
        let clock = ManualClock::at(2024, 3, 4, 9, 30, 0);
        let state = DisplayState::new(64, Duration::from_secs(5), clock.now());
        let frame = compose(&state, &clock.now(), 64);

        assert_eq!(frame.ticker.text, LOADING_TEXT);
        assert_eq!(frame.ticker.x, LOADING_X);
        assert_eq!(frame.time.text, "9:30 AM");
        assert_eq!(frame.date.text, "Monday");
    }

    #[test]
    fn test_compose_ticker_at_scroll_offset() {
        let clock = ManualClock::at(2024, 3, 4, 9, 30, 0);
        let mut state = DisplayState::new(64, Duration::from_secs(5), clock.now());
        for topic in Topic::ALL {
            state.receive(topic, topic.name().to_string());
        }
        state.advance_scroll(Font::Small.glyph_width());

        let frame = compose(&state, &clock.now(), 64);
        assert_eq!(frame.ticker.x, 63);
        assert_eq!(frame.ticker.y, TICKER_BASELINE);
        assert_eq!(frame.ticker.text, state.ticker_text());
    }

    #[test]
    fn test_draw_order() {
        let clock = ManualClock::at(2024, 3, 4, 9, 30, 0);
        let state = DisplayState::new(64, Duration::from_secs(5), clock.now());
        let frame = compose(&state, &clock.now(), 64);

        let mut display = MemoryDisplay::new();
        frame.draw(&mut display, Rgb::AMBER).unwrap();

        assert!(matches!(display.calls.first(), Some(Call::Clear)));
        assert!(matches!(display.calls.last(), Some(Call::Present)));
        let ys: Vec<i32> = display.last_frame().iter().map(|d| d.y).collect();
        assert_eq!(ys, vec![TIME_BASELINE, DATE_BASELINE, TICKER_BASELINE]);
    }
}
