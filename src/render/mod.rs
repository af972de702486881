//! Render loop: the single control loop that owns the display.
//!
//! Every tick it drains the mailboxes, advances the [`DisplayState`] and
//! hands a composed [`Frame`] to the [`Display`]. It never touches a data
//! source or the network; the only time it blocks is its own pacing sleep.

mod compose;
mod state;

pub use compose::{
    compose, face_text, Frame, TextRun, DATE_BASELINE, LOADING_TEXT, LOADING_X, TICKER_BASELINE,
    TIME_BASELINE,
};
pub use state::{DisplayState, Face, SCROLL_STEP, TICKER_PADDING};

use crate::display::{Display, DisplayError, Font, Rgb};
use crate::mailbox::Mailboxes;
use crate::time::Clock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Fixed parameters of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// Panel width in pixels.
    pub width: u16,
    /// Time each face stays up.
    pub face_flip_rate: Duration,
    /// Time between frames.
    pub interval: Duration,
    /// Text color.
    pub color: Rgb,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 64,
            face_flip_rate: Duration::from_secs(5),
            interval: Duration::from_millis(60),
            color: Rgb::AMBER,
        }
    }
}

/// Drives a [`Display`] at a fixed cadence.
pub struct RenderLoop<D: Display> {
    mailboxes: Mailboxes,
    display: D,
    clock: Arc<dyn Clock>,
    settings: RenderSettings,
    state: DisplayState,
    frame: u64,
}

impl<D: Display> RenderLoop<D> {
    /// Build a loop reading from `mailboxes` and drawing on `display`.
    pub fn new(mailboxes: Mailboxes, display: D, clock: Arc<dyn Clock>, settings: RenderSettings) -> Self {
        let state = DisplayState::new(settings.width, settings.face_flip_rate, clock.now());
        Self {
            mailboxes,
            display,
            clock,
            settings,
            state,
            frame: 0,
        }
    }

    /// Current display state.
    #[inline]
    pub const fn state(&self) -> &DisplayState {
        &self.state
    }

    /// The display being drawn on.
    #[inline]
    pub const fn display(&self) -> &D {
        &self.display
    }

    /// Frames rendered so far.
    #[inline]
    pub const fn frames(&self) -> u64 {
        self.frame
    }

    /// Give the display back, e.g. to restore the terminal.
    pub fn into_display(self) -> D {
        self.display
    }

    /// Render one frame.
    ///
    /// # Errors
    ///
    /// Returns the display's error; the loop cannot continue without it.
    pub fn tick(&mut self) -> Result<(), DisplayError> {
        let now = self.clock.now();

        for (topic, text) in self.mailboxes.drain() {
            tracing::debug!(%topic, "received");
            self.state.receive(topic, text);
        }
        if self.state.update_face(now) {
            tracing::trace!(face = ?self.state.current_face(), "face flipped");
        }

        let frame = compose(&self.state, &now, self.settings.width);
        self.state.advance_scroll(Font::Small.glyph_width());
        frame.draw(&mut self.display, self.settings.color)?;

        self.frame += 1;
        Ok(())
    }

    /// Tick at the configured cadence until `shutdown` is set.
    ///
    /// The flag is checked between frames, so the current frame always
    /// completes. Returns the number of frames rendered.
    ///
    /// # Errors
    ///
    /// Stops at the first display error and returns it.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<u64, DisplayError> {
        let interval = self.settings.interval;
        let mut next_tick = Instant::now();
        tracing::info!(?interval, "render loop started");

        while !shutdown.load(Ordering::Relaxed) {
            self.tick()?;

            next_tick += interval;
            let now = Instant::now();
            if next_tick < now {
                // Behind: don't try to catch up.
                next_tick = now + interval;
            }
            thread::sleep(next_tick - now);
        }

        tracing::info!(frames = self.frame, "render loop stopped");
        Ok(self.frame)
    }
}

impl<D: Display> std::fmt::Debug for RenderLoop<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("frame", &self.frame)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryDisplay;
    use crate::time::ManualClock;
    use crate::topic::Topic;
    use chrono::TimeDelta;

    fn render_loop(clock: &Arc<ManualClock>) -> (Mailboxes, RenderLoop<MemoryDisplay>) {
        let mailboxes = Mailboxes::new();
        let clock: Arc<dyn Clock> = clock.clone();
        let render = RenderLoop::new(mailboxes.clone(), MemoryDisplay::new(), clock, RenderSettings::default());
        (mailboxes, render)
    }

    #[test]
    fn test_end_to_end_warm_up_then_ticker() {
        let clock = Arc::new(ManualClock::at(2024, 3, 4, 9, 30, 0));
        let (mailboxes, mut render) = render_loop(&clock);

        render.tick().unwrap();
        assert_eq!(render.display().text_at(TICKER_BASELINE), Some(LOADING_TEXT));

        mailboxes.get(Topic::Headlines).publish("* Headlines *  A.".into());
        mailboxes.get(Topic::Weather).publish("* Weather *  Town".into());
        render.tick().unwrap();
        assert_eq!(render.display().text_at(TICKER_BASELINE), Some(LOADING_TEXT));

        mailboxes.get(Topic::Market).publish("* Market update *".into());
        render.tick().unwrap();
        render.tick().unwrap();

        let expected = format!(
            "* Weather *  Town{TICKER_PADDING}* Market update *{TICKER_PADDING}* Headlines *  A."
        );
        let ticker = &render.display().last_frame()[2];
        assert_eq!(ticker.text, expected);
        // First ticker frame was drawn at the right edge, this one a step in.
        assert_eq!(ticker.x, 64 - SCROLL_STEP);
        assert_eq!(render.frames(), 4);
        assert_eq!(render.display().frames.len(), 4);
    }

    #[test]
    fn test_latest_value_wins_between_ticks() {
        let clock = Arc::new(ManualClock::at(2024, 3, 4, 9, 30, 0));
        let (mailboxes, mut render) = render_loop(&clock);

        mailboxes.get(Topic::Market).publish("old".into());
        mailboxes.get(Topic::Market).publish("new".into());
        render.tick().unwrap();
        assert_eq!(render.state().topic_text(Topic::Market), "new");

        // Nothing new: the cached string stays.
        render.tick().unwrap();
        assert_eq!(render.state().topic_text(Topic::Market), "new");
    }

    #[test]
    fn test_faces_alternate_with_simulated_clock() {
        let clock = Arc::new(ManualClock::at(2024, 3, 4, 13, 5, 0));
        let (_mailboxes, mut render) = render_loop(&clock);

        let mut dates = Vec::new();
        for _ in 0..11 {
            render.tick().unwrap();
            dates.push(render.display().text_at(DATE_BASELINE).unwrap_or_default().to_string());
            clock.advance(TimeDelta::seconds(1));
        }

        assert!(dates[..5].iter().all(|d| d == "Monday"));
        assert!(dates[5..10].iter().all(|d| d == "Mar 04, 2024"));
        assert_eq!(dates[10], "Monday");
    }

    #[test]
    fn test_run_stops_on_shutdown_flag() {
        let clock = Arc::new(ManualClock::at(2024, 3, 4, 9, 30, 0));
        let (_mailboxes, mut render) = render_loop(&clock);

        let shutdown = AtomicBool::new(true);
        assert_eq!(render.run(&shutdown).unwrap(), 0);
    }

    #[test]
    fn test_run_paces_frames() {
        let clock = Arc::new(ManualClock::at(2024, 3, 4, 9, 30, 0));
        let mailboxes = Mailboxes::new();
        let settings = RenderSettings {
            interval: Duration::from_millis(10),
            ..RenderSettings::default()
        };
        let mut render = RenderLoop::new(mailboxes, MemoryDisplay::new(), clock, settings);

        let shutdown = Arc::new(AtomicBool::new(false));
        let stopper = {
            let shutdown = shutdown.clone();
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                shutdown.store(true, Ordering::Relaxed);
            })
        };
        let frames = render.run(&shutdown).unwrap();
        stopper.join().unwrap();

        assert!((3..=15).contains(&frames), "rendered {frames} frames");
    }
}
