//! Scheduler: one timer thread per job, publishing into the job's mailbox.
//!
//! Each job fires once as soon as the scheduler starts (the warm-up fetch) and
//! then every `interval` after that, measured from the start instant. The
//! fetch runs on the job's own thread, so a slow or failing provider only
//! delays its own topic. A firing that comes due while the previous one is
//! still running is skipped rather than queued.
//!
//! ```text
//!            start()
//!               │
//!   ┌───────────┼────────────┐
//!   ▼           ▼            ▼
//! [weather]  [market]  [headlines]      one thread each
//!   │ fire      │ fire       │ fire
//!   │ wait ...  │ wait ...   │ wait ...  recv_timeout(shutdown)
//!   ▼           ▼            ▼
//!  mailbox    mailbox     mailbox
//! ```

use crate::mailbox::{Mailbox, Mailboxes};
use crate::source::Feed;
use crate::topic::Topic;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default time `stop()` waits for in-flight fetches.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(2);

/// A feed refreshed on a fixed interval.
#[derive(Debug)]
pub struct Job {
    interval: Duration,
    feed: Feed,
}

impl Job {
    /// Bind a feed to its refresh interval.
    pub const fn new(interval: Duration, feed: Feed) -> Self {
        Self { interval, feed }
    }

    /// The topic this job publishes.
    #[inline]
    pub fn topic(&self) -> Topic {
        self.feed.topic()
    }

    /// Time between firings.
    #[inline]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

/// Outcome of [`Scheduler::stop`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopReport {
    /// Jobs whose thread exited within the grace period.
    pub finished: Vec<Topic>,
    /// Jobs still mid-fetch when the grace period ran out; their threads are detached.
    pub abandoned: Vec<Topic>,
}

/// A running job thread.
struct Worker {
    topic: Topic,
    handle: Option<JoinHandle<()>>,
    /// Disconnects when the worker thread exits (its sender is dropped).
    exited: Receiver<()>,
}

/// Runs every job on its own timer thread.
pub struct Scheduler {
    mailboxes: Mailboxes,
    pending: Vec<Job>,
    workers: Vec<Worker>,
    /// Dropping this sender tells every worker to stop.
    shutdown: Option<Sender<()>>,
    grace: Duration,
}

impl Scheduler {
    /// Create a scheduler that publishes into `mailboxes`.
    pub fn new(mailboxes: Mailboxes) -> Self {
        Self {
            mailboxes,
            pending: Vec::new(),
            workers: Vec::new(),
            shutdown: None,
            grace: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Set how long `stop()` waits for in-flight fetches.
    #[must_use]
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    /// Register a job; it runs from the next `start()`.
    pub fn add_job(&mut self, job: Job) {
        self.pending.push(job);
    }

    /// Check whether any worker threads are running.
    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Launch one timer thread per registered job.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler is already running, or if the OS
    /// refuses to spawn a thread (workers spawned before the failure keep
    /// running until `stop()`).
    pub fn start(&mut self) -> io::Result<()> {
        if self.is_running() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "scheduler already running",
            ));
        }
        let (shutdown_tx, shutdown_rx) = bounded::<()>(0);
        self.shutdown = Some(shutdown_tx);

        for job in self.pending.drain(..) {
            let topic = job.topic();
            let mailbox = self.mailboxes.get(topic).clone();
            let shutdown = shutdown_rx.clone();
            let (exited_tx, exited_rx) = bounded::<()>(0);

            tracing::info!(%topic, interval = ?job.interval(), "starting job");
            let handle = thread::Builder::new()
                .name(format!("marquee-{topic}"))
                .spawn(move || {
                    let _exited = exited_tx;
                    Self::run_loop(job, &mailbox, &shutdown);
                })?;

            self.workers.push(Worker {
                topic,
                handle: Some(handle),
                exited: exited_rx,
            });
        }
        Ok(())
    }

    /// Stop every worker.
    ///
    /// No new fetch starts after this is called. Workers that are mid-fetch
    /// get the grace period to finish; any still busy after that are detached
    /// and reported as abandoned.
    pub fn stop(&mut self) -> StopReport {
        let mut report = StopReport::default();
        if self.shutdown.take().is_none() {
            return report;
        }

        let deadline = Instant::now() + self.grace;
        for mut worker in self.workers.drain(..) {
            match worker.exited.recv_deadline(deadline) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                    if let Some(handle) = worker.handle.take() {
                        if handle.join().is_err() {
                            tracing::error!(topic = %worker.topic, "job thread panicked");
                        }
                    }
                    report.finished.push(worker.topic);
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(topic = %worker.topic, "abandoning in-flight fetch");
                    report.abandoned.push(worker.topic);
                }
            }
        }

        tracing::info!(
            finished = report.finished.len(),
            abandoned = report.abandoned.len(),
            "scheduler stopped"
        );
        report
    }

    /// Timer loop for one job.
    fn run_loop(mut job: Job, mailbox: &Mailbox<String>, shutdown: &Receiver<()>) {
        let topic = job.topic();
        let mut next_fire = Instant::now();

        loop {
            let wait = next_fire.saturating_duration_since(Instant::now());
            match shutdown.recv_timeout(wait) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            tracing::info!(%topic, "updating");
            let text = job.feed.refresh();
            mailbox.publish(text);

            // Periodic from the start instant; ticks missed during a slow
            // fetch are dropped, not replayed.
            next_fire += job.interval;
            let now = Instant::now();
            if next_fire <= now {
                next_fire = now + job.interval;
            }
        }

        tracing::debug!(%topic, "job stopped");
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending.len())
            .field("workers", &self.workers.iter().map(|w| w.topic).collect::<Vec<_>>())
            .field("running", &self.is_running())
            .field("grace", &self.grace)
            .finish()
    }
}
