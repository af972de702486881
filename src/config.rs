//! Configuration: a TOML file, defaults for everything, credentials from the
//! environment.
//!
//! ```toml
//! face_flip_rate_seconds = 5
//! render_interval_ms = 60
//!
//! [weather]
//! update_interval_minutes = 15
//! zip = "02134"
//!
//! [market]
//! symbols = ["AAPL"]
//!
//! [display]
//! color = [255, 235, 59]
//! ```
//!
//! The configuration is read once at startup and never changes afterwards.

use crate::display::Rgb;
use crate::render::RenderSettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Overrides `weather.api_key`.
pub const WEATHER_API_KEY_VAR: &str = "MARQUEE_WEATHER_API_KEY";
/// Overrides `headlines.api_key`.
pub const NEWS_API_KEY_VAR: &str = "MARQUEE_NEWS_API_KEY";

/// Smallest panel the layout fits on, in pixels per side.
const MIN_PANEL_SIDE: u16 = 16;

/// Failure to load the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML or has wrongly typed keys.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Weather feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Minutes between refreshes.
    pub update_interval_minutes: u64,
    /// US zip code to report on.
    pub zip: String,
    /// OpenWeatherMap key.
    pub api_key: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            update_interval_minutes: 15,
            zip: String::new(),
            api_key: String::new(),
        }
    }
}

/// Market feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Minutes between refreshes.
    pub update_interval_minutes: u64,
    /// Symbols quoted after the fixed indexes.
    pub symbols: Vec<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            update_interval_minutes: 5,
            symbols: Vec::new(),
        }
    }
}

/// Headlines feed settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadlinesConfig {
    /// Minutes between refreshes.
    pub update_interval_minutes: u64,
    /// NewsAPI source id.
    pub source: String,
    /// NewsAPI key.
    pub api_key: String,
}

impl Default for HeadlinesConfig {
    fn default() -> Self {
        Self {
            update_interval_minutes: 60,
            source: "associated-press".to_string(),
            api_key: String::new(),
        }
    }
}

/// Panel geometry and color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// Text color as `[r, g, b]`.
    pub color: [u8; 3],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 32,
            color: [255, 235, 59],
        }
    }
}

/// Everything configurable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds each clock face stays up.
    pub face_flip_rate_seconds: u64,
    /// Milliseconds between frames.
    pub render_interval_ms: u64,
    /// Weather feed.
    pub weather: WeatherConfig,
    /// Market feed.
    pub market: MarketConfig,
    /// Headlines feed.
    pub headlines: HeadlinesConfig,
    /// Panel.
    pub display: DisplayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            face_flip_rate_seconds: 5,
            render_interval_ms: 60,
            weather: WeatherConfig::default(),
            market: MarketConfig::default(),
            headlines: HeadlinesConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Config {
    /// Load from `path`, then apply environment overrides and validate.
    ///
    /// A missing file is not an error: defaults are used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// value is out of range.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Replace credentials with the values `lookup` finds for the override
    /// variables. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(WEATHER_API_KEY_VAR).filter(|k| !k.is_empty()) {
            self.weather.api_key = key;
        }
        if let Some(key) = lookup(NEWS_API_KEY_VAR).filter(|k| !k.is_empty()) {
            self.headlines.api_key = key;
        }
    }

    /// Check every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("face_flip_rate_seconds", self.face_flip_rate_seconds),
            ("render_interval_ms", self.render_interval_ms),
            ("weather.update_interval_minutes", self.weather.update_interval_minutes),
            ("market.update_interval_minutes", self.market.update_interval_minutes),
            ("headlines.update_interval_minutes", self.headlines.update_interval_minutes),
        ];
        if let Some((key, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Invalid(format!("{key} must be greater than zero")));
        }

        let DisplayConfig { width, height, .. } = self.display;
        if width < MIN_PANEL_SIDE || height < MIN_PANEL_SIDE {
            return Err(ConfigError::Invalid(format!(
                "display must be at least {MIN_PANEL_SIDE}x{MIN_PANEL_SIDE}, got {width}x{height}"
            )));
        }
        Ok(())
    }

    /// Time between weather refreshes.
    pub const fn weather_interval(&self) -> Duration {
        minutes(self.weather.update_interval_minutes)
    }

    /// Time between market refreshes.
    pub const fn market_interval(&self) -> Duration {
        minutes(self.market.update_interval_minutes)
    }

    /// Time between headline refreshes.
    pub const fn headlines_interval(&self) -> Duration {
        minutes(self.headlines.update_interval_minutes)
    }

    /// The render loop's parameters.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            width: self.display.width,
            face_flip_rate: Duration::from_secs(self.face_flip_rate_seconds),
            interval: Duration::from_millis(self.render_interval_ms),
            color: Rgb::from(self.display.color),
        }
    }
}

const fn minutes(n: u64) -> Duration {
    Duration::from_secs(n.saturating_mul(60))
}
