//! Wall-clock access, abstracted so face toggling, market hours and alert
//! windows can be driven by a simulated clock in tests.

use chrono::{DateTime, Local};

/// Source of the current local time.
pub trait Clock: Send + Sync {
    /// The current local date and time.
    fn now(&self) -> DateTime<Local>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::Clock;
    use chrono::{DateTime, Local, TimeDelta, TimeZone};
    use std::sync::Mutex;

    /// A clock that only moves when told to.
    #[derive(Debug)]
    pub struct ManualClock {
        now: Mutex<DateTime<Local>>,
    }

    impl ManualClock {
        pub fn new(now: DateTime<Local>) -> Self {
            Self { now: Mutex::new(now) }
        }

        /// Local wall time; panics on nonexistent/ambiguous instants.
        pub fn at(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> Self {
            Self::new(
                Local
                    .with_ymd_and_hms(year, month, day, hour, min, sec)
                    .single()
                    .expect("unambiguous local time"),
            )
        }

        pub fn advance(&self, delta: TimeDelta) {
            *self.now.lock().unwrap() += delta;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            *self.now.lock().unwrap()
        }
    }
}
