//! # Marquee
//!
//! An always-on status clock for a small LED matrix: a clock face that
//! alternates between two presentations over a horizontally scrolling ticker
//! of weather, market and news headlines.
//!
//! ## Core Concepts
//!
//! - **One thread per feed**: each provider refreshes on its own timer, so a
//!   slow or failing provider only delays its own topic
//! - **Latest-wins mailboxes**: a single-slot, non-blocking handoff from the
//!   feed threads to the render loop
//! - **Fixed-cadence render loop**: face toggling and ticker scrolling never
//!   wait on the network
//! - **Retained values**: a failing feed keeps showing its last good string
//!
//! ## Example
//!
//! ```rust,ignore
//! use marquee::{App, Config, TerminalDisplay};
//! use std::sync::atomic::AtomicBool;
//!
//! let config = Config::default();
//! let display = TerminalDisplay::new(config.display.width, config.display.height)?;
//! let mut app = App::new(&config, display)?;
//! app.run(&AtomicBool::new(false))?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod config;
pub mod display;
pub mod holidays;
pub mod mailbox;
pub mod render;
pub mod scheduler;
pub mod source;
pub mod time;
pub mod topic;

// Re-exports for convenience
pub use app::{App, AppError, RunSummary};
pub use config::{Config, ConfigError};
pub use display::{Display, DisplayError, Font, Rgb, TerminalDisplay};
pub use mailbox::{Mailbox, Mailboxes};
pub use render::{DisplayState, Face, RenderLoop, RenderSettings};
pub use scheduler::{Job, Scheduler, StopReport};
pub use source::{DataSource, Feed, FetchError, FormatError, SourceError};
pub use time::{Clock, SystemClock};
pub use topic::{Topic, TopicSet};
