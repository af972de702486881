use anyhow::{Context, Result};
use clap::Parser;
use marquee::{App, Config, TerminalDisplay};
use signal_hook::consts::signal::{SIGINT, SIGTERM};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "marquee", about = "LED clock with a scrolling weather, market and news ticker.")]
struct Cli {
    /// Configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "marquee.toml")]
    config: PathBuf,

    /// Append logs to this file; the terminal itself shows the panel
    #[arg(long, default_value = "marquee.log")]
    log_file: PathBuf,
}

fn open_log(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

fn init_logging(log_file: &Path) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("marquee=info".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(open_log(log_file)?))
        .init();
    Ok(())
}

/// Flag raised by SIGINT or SIGTERM.
fn register_shutdown_signals() -> Result<Arc<AtomicBool>> {
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context("failed to register signal handler")?;
    }
    Ok(shutdown)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_file)?;

    let config = Config::load(&cli.config)?;
    info!(config = %cli.config.display(), "marquee starting");

    let shutdown = register_shutdown_signals()?;

    let display = TerminalDisplay::new(config.display.width, config.display.height)?;
    let mut app = App::new(&config, display)?;
    let summary = app.run(&shutdown)?;
    // Restores the terminal.
    drop(app);

    info!(
        frames = summary.frames,
        abandoned = summary.jobs.abandoned.len(),
        "marquee stopped"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use signal_hook::low_level::raise;
    use std::io::Write;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_logs_go_to_a_file_by_default() {
        let cli = Cli::parse_from(["marquee"]);
        assert_eq!(cli.log_file, PathBuf::from("marquee.log"));

        let cli = Cli::parse_from(["marquee", "--log-file", "/tmp/other.log"]);
        assert_eq!(cli.log_file, PathBuf::from("/tmp/other.log"));
    }

    #[test]
    fn test_open_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marquee.log");
        writeln!(open_log(&path).unwrap(), "first").unwrap();
        writeln!(open_log(&path).unwrap(), "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");

        assert!(open_log(&dir.path().join("missing/marquee.log")).is_err());
    }

    #[test]
    fn test_signals_raise_shutdown_flag() {
        let shutdown = register_shutdown_signals().unwrap();
        assert!(!shutdown.load(Ordering::SeqCst));

        raise(SIGTERM).unwrap();
        assert!(shutdown.load(Ordering::SeqCst));

        shutdown.store(false, Ordering::SeqCst);
        raise(SIGINT).unwrap();
        assert!(shutdown.load(Ordering::SeqCst));
    }
}
