//! Wiring: one context object owns the mailboxes, the scheduler and the
//! render loop, and runs them for the life of the process.
//!
//! ```text
//! Scheduler ──publish──▶ Mailboxes ──drain──▶ RenderLoop ──▶ Display
//! ```

use crate::config::Config;
use crate::display::{Display, DisplayError};
use crate::mailbox::Mailboxes;
use crate::render::RenderLoop;
use crate::scheduler::{Job, Scheduler, StopReport, DEFAULT_GRACE_PERIOD};
use crate::source::{Feed, FetchError, Headlines, HttpClient, Market, ReqwestClient, Weather};
use crate::time::{Clock, SystemClock};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure to start or keep running.
#[derive(Debug, Error)]
pub enum AppError {
    /// The HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Client(#[from] FetchError),

    /// A job thread could not be spawned.
    #[error("failed to start scheduler: {0}")]
    Spawn(#[from] std::io::Error),

    /// Rendering failed; the clock cannot continue.
    #[error(transparent)]
    Display(#[from] DisplayError),
}

/// How a run ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Frames rendered.
    pub frames: u64,
    /// What happened to the job threads.
    pub jobs: StopReport,
}

/// The three provider jobs described by `config`.
pub fn build_jobs(config: &Config, client: &Arc<dyn HttpClient>, clock: &Arc<dyn Clock>) -> Vec<Job> {
    let weather = Weather::new(
        client.clone(),
        clock.clone(),
        config.weather.zip.as_str(),
        config.weather.api_key.as_str(),
    );
    let market = Market::new(client.clone(), clock.clone(), &config.market.symbols);
    let headlines = Headlines::new(
        client.clone(),
        config.headlines.source.as_str(),
        config.headlines.api_key.as_str(),
    );

    vec![
        Job::new(config.weather_interval(), Feed::new(Box::new(weather))),
        Job::new(config.market_interval(), Feed::new(Box::new(market))),
        Job::new(config.headlines_interval(), Feed::new(Box::new(headlines))),
    ]
}

/// The running clock.
pub struct App<D: Display> {
    scheduler: Scheduler,
    render: RenderLoop<D>,
}

impl<D: Display> App<D> {
    /// Build the production clock: real providers, the system clock.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Client`] if the HTTP client cannot be built.
    pub fn new(config: &Config, display: D) -> Result<Self, AppError> {
        if config.weather.api_key.is_empty() || config.headlines.api_key.is_empty() {
            tracing::warn!("missing provider API key, affected feeds will show no data");
        }
        let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new()?);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let jobs = build_jobs(config, &client, &clock);
        Ok(Self::with_jobs(jobs, display, clock, config, DEFAULT_GRACE_PERIOD))
    }

    /// Build a clock from prepared jobs.
    pub fn with_jobs(jobs: Vec<Job>, display: D, clock: Arc<dyn Clock>, config: &Config, grace: Duration) -> Self {
        let mailboxes = Mailboxes::new();
        let mut scheduler = Scheduler::new(mailboxes.clone()).with_grace_period(grace);
        for job in jobs {
            scheduler.add_job(job);
        }
        let render = RenderLoop::new(mailboxes, display, clock, config.render_settings());
        Self { scheduler, render }
    }

    /// The render loop.
    pub const fn render(&self) -> &RenderLoop<D> {
        &self.render
    }

    /// Start the jobs and render until `shutdown` is set or the display fails.
    ///
    /// The scheduler is always stopped before returning, giving in-flight
    /// fetches the grace period.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Spawn`] if the jobs cannot start, or
    /// [`AppError::Display`] if rendering failed.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<RunSummary, AppError> {
        if let Err(err) = self.scheduler.start() {
            self.scheduler.stop();
            return Err(err.into());
        }
        tracing::info!("clock running");

        let rendered = self.render.run(shutdown);
        let jobs = self.scheduler.stop();

        let frames = rendered.inspect_err(|err| tracing::error!(error = %err, "display failed"))?;
        Ok(RunSummary { frames, jobs })
    }
}

impl<D: Display> std::fmt::Debug for App<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("scheduler", &self.scheduler)
            .field("render", &self.render)
            .finish()
    }
}
