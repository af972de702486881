//! The render loop's mutable state: which face is up, where the ticker is,
//! and the latest string received for every topic.

use crate::topic::{Topic, TopicSet};
use chrono::{DateTime, Local, TimeDelta};
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

/// Spaces between two topic strings in the ticker.
pub const TICKER_PADDING: &str = "        ";
/// Pixels the ticker moves left each frame.
pub const SCROLL_STEP: i32 = 1;

/// The two alternating clock presentations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Face {
    /// Weekday name over 12-hour time.
    #[default]
    ClockFace,
    /// Calendar date over 24-hour time with seconds.
    DateFace,
}

impl Face {
    /// The other face.
    #[inline]
    pub const fn flipped(self) -> Self {
        match self {
            Self::ClockFace => Self::DateFace,
            Self::DateFace => Self::ClockFace,
        }
    }
}

/// Everything the render loop changes from tick to tick.
#[derive(Debug, Clone)]
pub struct DisplayState {
    current_face: Face,
    last_face_switch: DateTime<Local>,
    flip_rate: TimeDelta,
    scroll_offset: i32,
    /// Where the ticker starts and wraps back to: the panel width.
    scroll_origin: i32,
    cached_topic_strings: [Option<String>; 3],
    received: TopicSet,
    /// Cached concatenation of the topic strings.
    ticker: String,
}

impl DisplayState {
    /// Initial state: clock face up, ticker just off the right edge,
    /// nothing received.
    pub fn new(width: u16, flip_rate: Duration, now: DateTime<Local>) -> Self {
        let mut state = Self {
            current_face: Face::ClockFace,
            last_face_switch: now,
            flip_rate: TimeDelta::from_std(flip_rate).unwrap_or(TimeDelta::MAX),
            scroll_offset: i32::from(width),
            scroll_origin: i32::from(width),
            cached_topic_strings: Default::default(),
            received: TopicSet::empty(),
            ticker: String::new(),
        };
        state.rebuild_ticker();
        state
    }

    /// The face currently shown.
    #[inline]
    pub const fn current_face(&self) -> Face {
        self.current_face
    }

    /// When the face last changed.
    #[inline]
    pub const fn last_face_switch(&self) -> DateTime<Local> {
        self.last_face_switch
    }

    /// Ticker x position in pixels.
    #[inline]
    pub const fn scroll_offset(&self) -> i32 {
        self.scroll_offset
    }

    /// True until every topic has been received at least once.
    #[inline]
    pub fn is_warming_up(&self) -> bool {
        !self.received.is_all()
    }

    /// Topics received at least once.
    #[inline]
    pub const fn received(&self) -> TopicSet {
        self.received
    }

    /// The latest string for `topic`, or its pending placeholder.
    pub fn topic_text(&self, topic: Topic) -> &str {
        self.cached_topic_strings[topic.index()]
            .as_deref()
            .unwrap_or_else(|| topic.pending())
    }

    /// The full ticker line: every topic in order, padded apart.
    #[inline]
    pub fn ticker_text(&self) -> &str {
        &self.ticker
    }

    /// Store a freshly received string for `topic`.
    pub fn receive(&mut self, topic: Topic, text: String) {
        self.received |= topic.flag();
        self.cached_topic_strings[topic.index()] = Some(text);
        self.rebuild_ticker();
    }

    fn rebuild_ticker(&mut self) {
        let mut ticker = String::with_capacity(self.ticker.len());
        for (i, topic) in Topic::ALL.into_iter().enumerate() {
            if i > 0 {
                ticker.push_str(TICKER_PADDING);
            }
            ticker.push_str(self.topic_text(topic));
        }
        self.ticker = ticker;
    }

    /// Flip the face once the flip rate has elapsed since the last switch.
    ///
    /// Returns `true` if the face changed.
    pub fn update_face(&mut self, now: DateTime<Local>) -> bool {
        if now - self.last_face_switch >= self.flip_rate {
            self.current_face = self.current_face.flipped();
            self.last_face_switch = now;
            return true;
        }
        false
    }

    /// Move the ticker one step left, wrapping back to the right edge once
    /// the whole line has scrolled off.
    ///
    /// Holds still while warming up, so the ticker enters from the right edge
    /// once all topics are in.
    pub fn advance_scroll(&mut self, glyph_width: i32) {
        if self.is_warming_up() {
            return;
        }
        let len = i32::try_from(UnicodeWidthStr::width(self.ticker.as_str())).unwrap_or(i32::MAX);
        self.scroll_offset -= SCROLL_STEP;
        if self.scroll_offset < len.saturating_mul(-glyph_width) {
            self.scroll_offset = self.scroll_origin;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{Clock, ManualClock};

    fn all_received(width: u16, now: DateTime<Local>) -> DisplayState {
        let mut state = DisplayState::new(width, Duration::from_secs(5), now);
        state.receive(Topic::Weather, "W".into());
        state.receive(Topic::Market, "M".into());
        state.receive(Topic::Headlines, "H".into());
        state
    }

    #[test]
    fn test_face_flips_once_per_rate() {
        let clock = ManualClock::at(2024, 3, 4, 9, 0, 0);
        let mut state = DisplayState::new(64, Duration::from_secs(5), clock.now());
        assert_eq!(state.current_face(), Face::ClockFace);

        let mut faces = Vec::new();
        for second in 1..=20 {
            clock.advance(TimeDelta::seconds(1));
            if state.update_face(clock.now()) {
                faces.push((second, state.current_face()));
            }
        }

        assert_eq!(
            faces,
            vec![
                (5, Face::DateFace),
                (10, Face::ClockFace),
                (15, Face::DateFace),
                (20, Face::ClockFace),
            ]
        );
    }

    #[test]
    fn test_face_holds_within_rate() {
        let clock = ManualClock::at(2024, 3, 4, 9, 0, 0);
        let start = clock.now();
        let mut state = DisplayState::new(64, Duration::from_secs(5), start);
        clock.advance(TimeDelta::milliseconds(4_999));
        assert!(!state.update_face(clock.now()));
        assert_eq!(state.last_face_switch(), start);
    }

    #[test]
    fn test_scroll_wraps_past_text_length() {
        let clock = ManualClock::at(2024, 3, 4, 9, 0, 0);
        let mut state = all_received(64, clock.now());
        // "W" + 8 + "M" + 8 + "H"
        assert_eq!(state.ticker_text().len(), 19);

        let mut ticks = 0;
        while state.scroll_offset() >= -(19 * 5) {
            let before = state.scroll_offset();
            state.advance_scroll(5);
            ticks += 1;
            if state.scroll_offset() == 64 {
                assert_eq!(before, -(19 * 5));
                break;
            }
            assert_eq!(state.scroll_offset(), before - SCROLL_STEP);
        }
        assert_eq!(ticks, 64 + 19 * 5 + 1);
        assert_eq!(state.scroll_offset(), 64);
    }

    #[test]
    fn test_scroll_holds_while_warming_up() {
        let clock = ManualClock::at(2024, 3, 4, 9, 0, 0);
        let mut state = DisplayState::new(64, Duration::from_secs(5), clock.now());
        state.receive(Topic::Weather, "W".into());
        state.advance_scroll(5);
        assert_eq!(state.scroll_offset(), 64);
    }

    #[test]
    fn test_warm_up_needs_every_topic() {
        let clock = ManualClock::at(2024, 3, 4, 9, 0, 0);
        let mut state = DisplayState::new(64, Duration::from_secs(5), clock.now());
        assert!(state.is_warming_up());

        state.receive(Topic::Market, "m".into());
        state.receive(Topic::Market, "m2".into());
        state.receive(Topic::Headlines, "h".into());
        assert!(state.is_warming_up());

        state.receive(Topic::Weather, "w".into());
        assert!(!state.is_warming_up());
        assert_eq!(state.received(), TopicSet::all());
    }

    #[test]
    fn test_ticker_uses_placeholders_until_received() {
        let clock = ManualClock::at(2024, 3, 4, 9, 0, 0);
        let mut state = DisplayState::new(64, Duration::from_secs(5), clock.now());
        state.receive(Topic::Market, "DJI up".into());

        assert_eq!(
            state.ticker_text(),
            format!(
                "No weather data yet.{TICKER_PADDING}DJI up{TICKER_PADDING}No headlines data yet."
            )
        );
        assert_eq!(state.topic_text(Topic::Market), "DJI up");
    }

    #[test]
    fn test_face_flipped() {
        assert_eq!(Face::ClockFace.flipped(), Face::DateFace);
        assert_eq!(Face::DateFace.flipped().flipped(), Face::DateFace);
    }
}
